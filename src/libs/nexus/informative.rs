use super::matrix::Matrix;
use indexmap::IndexMap;

/// Parsimony-informative test for one column.
///
/// After discarding `missing` and `gap`, at least two distinct states must
/// each occur more than once. A state seen in a single taxon can't group
/// taxa, and one recurring state alone can't separate two groupings.
///
/// Counts reported by external inference programs (MrBayes' "incompatible
/// with the specified coding bias") may differ from this rule; that
/// divergence is known and left unresolved.
///
/// ```
/// use charmat::libs::nexus::informative::is_informative;
///
/// assert!(is_informative(b"aabb?", b'?', b'-'));
/// assert!(!is_informative(b"aab-", b'?', b'-'));
/// assert!(!is_informative(b"abc-", b'?', b'-'));
/// ```
pub fn is_informative(states: &[u8], missing: u8, gap: u8) -> bool {
    let mut count_of: IndexMap<u8, usize> = IndexMap::new();
    for &c in states {
        if c == missing || c == gap {
            continue;
        }
        *count_of.entry(c).or_insert(0) += 1;
    }

    count_of.values().filter(|&&n| n > 1).count() >= 2
}

/// Informative/uninformative tally over a whole matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformativeReport {
    pub ntax: usize,
    pub nchar: usize,
    pub informative: usize,
    pub uninformative: usize,
    /// 0-based indices of the informative columns
    pub informative_columns: Vec<usize>,
}

impl std::fmt::Display for InformativeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Matrix has {} taxa and {} characters",
            self.ntax, self.nchar
        )?;
        writeln!(f, "  {} characters are informative", self.informative)?;
        writeln!(f, "  {} characters are uninformative", self.uninformative)
    }
}

pub fn analyse(matrix: &Matrix) -> InformativeReport {
    let informative_columns: Vec<usize> = matrix
        .columns()
        .filter(|col| col.is_informative())
        .map(|col| col.index())
        .collect();

    tracing::debug!(
        "{} of {} columns are informative",
        informative_columns.len(),
        matrix.nchar()
    );

    InformativeReport {
        ntax: matrix.ntax(),
        nchar: matrix.nchar(),
        informative: informative_columns.len(),
        uninformative: matrix.nchar() - informative_columns.len(),
        informative_columns,
    }
}

/// A state attested by exactly one taxon in a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingularReading {
    /// 0-based column index
    pub column: usize,
    pub taxon: String,
    pub state: u8,
}

/// Lists singular readings column by column, taxa in matrix order.
pub fn singular_readings(matrix: &Matrix) -> Vec<SingularReading> {
    let mut readings = vec![];

    for col in matrix.columns() {
        // state => (count, first taxon)
        let mut seen: IndexMap<u8, (usize, usize)> = IndexMap::new();
        for (i, c) in col.states().enumerate() {
            if matrix.is_reserved(c) {
                continue;
            }
            seen.entry(c).or_insert((0, i)).0 += 1;
        }

        for (&state, &(count, taxon_idx)) in &seen {
            if count != 1 {
                continue;
            }
            // taxa() is an ExactSizeIterator in row order
            if let Some(taxon) = matrix.taxa().nth(taxon_idx) {
                readings.push(SingularReading {
                    column: col.index(),
                    taxon: taxon.to_string(),
                    state,
                });
            }
        }
    }

    readings
}
