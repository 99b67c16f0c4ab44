use super::error::MatrixError;
use super::matrix::Matrix;
use super::merge::filter_extant;
use super::symbol::SymbolTable;
use indexmap::IndexMap;
use std::io::BufRead;

/// One reading of one witness at one variant unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attestation {
    pub witness: String,
    pub unit: String,
    pub ident: String,
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Idents meaning "physically lost here", coded as `gap`
    pub lacuna: Vec<String>,
    /// Idents meaning "can't be cited for one reading", coded as `missing`
    pub unciteable: Vec<String>,
    /// Passed to [`filter_extant`] when set
    pub extant_pct: Option<f64>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            lacuna: vec!["zz".to_string()],
            unciteable: vec!["zw".to_string()],
            extant_pct: None,
        }
    }
}

/// Reads `witness<TAB>unit<TAB>ident` records. Blank lines and `#` comments
/// are skipped.
pub fn read_attestations<R: BufRead>(reader: R) -> anyhow::Result<Vec<Attestation>> {
    let mut records = vec![];
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').map(|f| f.trim()).collect();
        if fields.len() < 3 || fields[..3].iter().any(|f| f.is_empty()) {
            anyhow::bail!(
                "Line {}: expected witness, unit and ident separated by tabs, found '{}'",
                i + 1,
                line
            );
        }
        records.push(Attestation {
            witness: fields[0].to_string(),
            unit: fields[1].to_string(),
            ident: fields[2].to_string(),
        });
    }
    Ok(records)
}

/// Turns attestation records into a matrix.
///
/// Witnesses become taxa and units become columns, both in order of first
/// appearance. Idents are coded through `table`, which is shared with any
/// other call of the same run. A unit without a record for a witness is
/// `missing`.
///
/// ```
/// use charmat::libs::nexus::{build_matrix, Attestation, BuildOptions, SymbolTable};
///
/// let rec = |w: &str, u: &str, i: &str| Attestation {
///     witness: w.to_string(),
///     unit: u.to_string(),
///     ident: i.to_string(),
/// };
/// let records = vec![rec("01", "1", "a"), rec("03", "1", "b"), rec("03", "2", "zz")];
///
/// let mut table = SymbolTable::new();
/// let (m, _) = build_matrix(&records, &mut table, &BuildOptions::default()).unwrap();
/// assert_eq!(m.row("01"), Some(&b"A?"[..]));
/// assert_eq!(m.row("03"), Some(&b"B-"[..]));
/// ```
pub fn build_matrix(
    records: &[Attestation],
    table: &mut SymbolTable,
    opts: &BuildOptions,
) -> Result<(Matrix, Vec<(String, usize)>), MatrixError> {
    let mut units: IndexMap<&str, usize> = IndexMap::new();
    let mut cells: IndexMap<&str, IndexMap<usize, &str>> = IndexMap::new();
    for rec in records {
        let next = units.len();
        let col = *units.entry(rec.unit.as_str()).or_insert(next);
        cells
            .entry(rec.witness.as_str())
            .or_default()
            .insert(col, rec.ident.as_str());
    }

    let mut matrix = Matrix::new(units.len());
    let (missing, gap) = (matrix.missing(), matrix.gap());
    for (witness, readings) in &cells {
        let mut states = vec![missing; units.len()];
        for (&col, &ident) in readings {
            states[col] = if opts.lacuna.iter().any(|l| l == ident) {
                gap
            } else if opts.unciteable.iter().any(|u| u == ident) {
                missing
            } else {
                table.allocate(ident)?
            };
        }
        matrix.push_row(witness, &states)?;
    }

    tracing::info!(
        "Built {} witnesses over {} variant units, {} distinct readings",
        matrix.ntax(),
        matrix.nchar(),
        table.len()
    );

    match opts.extant_pct {
        Some(pct) => filter_extant(&matrix, pct),
        None => Ok((matrix, vec![])),
    }
}
