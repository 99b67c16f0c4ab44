use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn command_stat() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("charmat")?;
    let output = cmd.arg("stat").arg("tests/nexus/small.nex").output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(
        stdout,
        "Matrix has 5 taxa and 6 characters\n  2 characters are informative\n  4 characters are uninformative\n"
    );

    Ok(())
}

#[test]
fn command_stat_columns() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("charmat")?;
    cmd.arg("stat")
        .arg("tests/nexus/small.nex")
        .arg("--columns")
        .assert()
        .success()
        .stdout(predicate::str::contains("  informative: 1,2\n"));

    Ok(())
}

#[test]
fn command_stat_stdin() -> anyhow::Result<()> {
    let content = std::fs::read_to_string("tests/nexus/part1.nex")?;

    let mut cmd = Command::cargo_bin("charmat")?;
    cmd.arg("stat")
        .arg("stdin")
        .write_stdin(content)
        .assert()
        .success()
        .stdout(predicate::str::contains("Matrix has 2 taxa and 2 characters"));

    Ok(())
}

#[test]
fn command_stat_strict() -> anyhow::Result<()> {
    // declared and observed symbols agree
    let mut cmd = Command::cargo_bin("charmat")?;
    cmd.arg("stat")
        .arg("tests/nexus/small.nex")
        .arg("--strict")
        .assert()
        .success();

    let temp = TempDir::new()?;
    let input = temp.path().join("extra.nex");
    let content = std::fs::read_to_string("tests/nexus/small.nex")?
        .replace("symbols=\"a b c\"", "symbols=\"a b c d\"");
    std::fs::write(&input, content)?;

    let mut cmd = Command::cargo_bin("charmat")?;
    cmd.arg("stat").arg(&input).assert().success();

    let mut cmd = Command::cargo_bin("charmat")?;
    cmd.arg("stat")
        .arg(&input)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("never observed: \"d\""));

    Ok(())
}

#[test]
fn command_stat_broken() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("charmat")?;
    cmd.arg("stat")
        .arg("tests/nexus/broken.nex")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Format error at line 18"))
        .stderr(predicate::str::contains("has 2 characters, expected 3"));

    let mut cmd = Command::cargo_bin("charmat")?;
    cmd.arg("stat")
        .arg("tests/nexus/not-there.nex")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not open"));

    Ok(())
}

#[test]
fn command_singular() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("charmat")?;
    let output = cmd.arg("singular").arg("tests/nexus/small.nex").output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout, "3\t03\ta\n5\tP46\tb\n");

    Ok(())
}
