use assert_cmd::Command;
use tempfile::TempDir;

#[test]
fn command_to_rdf() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("charmat")?;
    let output = cmd.arg("to-rdf").arg("tests/nexus/small.nex").output()?;
    let stdout = String::from_utf8(output.stdout)?;

    let expected = "          123456\n\n\n\n\n\
H_1       aabNac  1\n\
H_2       abaNac  1\n\
H_3       babNbc  1\n\
H_4       bbNNac  1\n\
H_5       NaNNac  1\n\
\n\
101010101010\n";
    assert_eq!(stdout, expected);

    Ok(())
}

#[test]
fn command_to_rdf_ignore_missing() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("charmat")?;
    let output = cmd
        .arg("to-rdf")
        .arg("tests/nexus/small.nex")
        .arg("--ignore-missing")
        .arg("--placeholder")
        .arg("X")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.starts_with("          12356\n"));
    assert!(stdout.contains("H_5       XaXac  1\n"));
    assert!(stdout.ends_with("\n1010101010\n"));

    Ok(())
}

#[test]
fn command_relabel() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let labels = temp.path().join("labels.json");

    let mut cmd = Command::cargo_bin("charmat")?;
    cmd.arg("to-rdf")
        .arg("tests/nexus/small.nex")
        .arg("--labels")
        .arg(&labels)
        .assert()
        .success();

    let json = std::fs::read_to_string(&labels)?;
    assert!(json.contains("\"H_1\": \"01\""));
    assert!(json.contains("\"H_5\": \"2127\""));

    let mut cmd = Command::cargo_bin("charmat")?;
    let output = cmd
        .arg("relabel")
        .arg("tests/nexus/network.nwk")
        .arg(&labels)
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout, "((01,03),(P46,(1739,2127)));\n");

    Ok(())
}
