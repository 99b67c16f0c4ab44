use super::matrix::Matrix;
use itertools::Itertools;
use std::fmt::Write;

/// Serializes a matrix into the TAXA + CHARACTERS block layout read by
/// [`parse_str`](super::parse_str).
///
/// Taxa are written in matrix order, symbols sorted. The output is
/// deterministic, so `parse_str(&write_nexus(&m)) == m`.
///
/// ```
/// use charmat::libs::nexus::{parse_str, write_nexus, Matrix};
///
/// let mut matrix = Matrix::new(2);
/// matrix.push_row("A", b"a?").unwrap();
/// matrix.push_row("B", b"ba").unwrap();
///
/// let text = write_nexus(&matrix);
/// assert!(text.contains("symbols=\"a b\""));
/// assert_eq!(parse_str(&text).unwrap(), matrix);
/// ```
pub fn write_nexus(matrix: &Matrix) -> String {
    let mut s = String::new();

    // The String sink can't fail
    let _ = write_into(&mut s, matrix);

    s
}

fn write_into(s: &mut String, matrix: &Matrix) -> std::fmt::Result {
    writeln!(s, "#NEXUS")?;
    writeln!(s, "BEGIN Taxa;")?;
    writeln!(s, "DIMENSIONS ntax={};", matrix.ntax())?;
    writeln!(s, "TAXLABELS")?;
    for taxon in matrix.taxa() {
        writeln!(s, "{}", taxon)?;
    }
    writeln!(s, ";")?;
    writeln!(s, "END;")?;

    writeln!(s, "BEGIN Characters;")?;
    writeln!(s, "DIMENSIONS nchar={};", matrix.nchar())?;
    writeln!(s, "FORMAT")?;
    writeln!(s, "    datatype=STANDARD")?;
    writeln!(s, "    missing={}", matrix.missing() as char)?;
    writeln!(s, "    gap={}", matrix.gap() as char)?;
    writeln!(
        s,
        "    symbols=\"{}\"",
        matrix.symbols().iter().map(|&c| c as char).join(" ")
    )?;
    writeln!(s, ";")?;
    writeln!(s, "MATRIX")?;
    for (taxon, states) in matrix.rows() {
        // rows only ever hold ASCII
        writeln!(s, "{} {}", taxon, String::from_utf8_lossy(states))?;
    }
    writeln!(s, ";")?;
    writeln!(s, "END;")?;

    Ok(())
}
