use super::error::MatrixError;
use super::matrix::Matrix;
use std::collections::BTreeSet;

/// Nucleotide alphabet used for recoding.
pub const DNA: &[u8] = b"ACTG";
/// Amino-acid alphabet used for recoding. `N` is left out on purpose, the
/// network tools that consume these files misread it.
pub const PROTEIN: &[u8] = b"FSTKEYVQMCLAWPHDRIG";

/// Which taxa enter a subset.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TaxonSelection {
    #[default]
    All,
    Named(Vec<String>),
}

/// What to do with a column holding more states than the target alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    #[default]
    Abort,
    Skip,
}

impl std::str::FromStr for OverflowPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(OverflowPolicy::Abort),
            "skip" => Ok(OverflowPolicy::Skip),
            _ => anyhow::bail!("Unknown overflow policy '{}'", s),
        }
    }
}

/// Resolves `dna`, `protein` and `none` to an alphabet.
pub fn named_alphabet(name: &str) -> anyhow::Result<Option<Vec<u8>>> {
    match name {
        "dna" => Ok(Some(DNA.to_vec())),
        "protein" => Ok(Some(PROTEIN.to_vec())),
        "none" => Ok(None),
        _ => anyhow::bail!("Unknown alphabet '{}'", name),
    }
}

#[derive(Debug, Clone)]
pub struct SubsetOptions {
    pub taxa: TaxonSelection,
    /// Recode every kept column into this alphabet
    pub alphabet: Option<Vec<u8>>,
    /// Taxa with more than this percentage of `missing`/`gap` are excluded.
    /// 100 disables the filter.
    pub frag_threshold: f64,
    pub on_overflow: OverflowPolicy,
}

impl Default for SubsetOptions {
    fn default() -> Self {
        Self {
            taxa: TaxonSelection::All,
            alphabet: None,
            frag_threshold: 100.0,
            on_overflow: OverflowPolicy::Abort,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubsetResult {
    pub matrix: Matrix,
    /// 0-based source indices of columns dropped by the overflow policy
    pub skipped: Vec<usize>,
    /// 0-based source indices of invariant columns
    pub invariant: Vec<usize>,
    /// Taxa removed by the fragmentation filter, with their percentage
    pub fragmentary: Vec<(String, f64)>,
}

/// Builds a filtered, optionally recoded copy of `matrix`.
///
/// Steps, in order:
/// 1. select taxa (`UnknownTaxon` for names not in the matrix),
/// 2. exclude fragmentary taxa, measured on their full-length rows,
/// 3. drop columns where all surviving taxa read the same character,
/// 4. recode states into `alphabet`, first-seen state taking the first
///    letter, scanning taxa in matrix order. `missing` and `gap` are kept.
///
/// ```
/// use charmat::libs::nexus::{subset, Matrix, SubsetOptions};
///
/// let mut m = Matrix::new(2);
/// m.push_row("T1", b"cb").unwrap();
/// m.push_row("T2", b"ca").unwrap();
/// m.push_row("T3", b"ca").unwrap();
///
/// let opts = SubsetOptions {
///     alphabet: Some(b"XY".to_vec()),
///     ..Default::default()
/// };
/// let result = subset(&m, &opts).unwrap();
/// assert_eq!(result.matrix.nchar(), 1);
/// assert_eq!(result.matrix.row("T1"), Some(&b"X"[..]));
/// assert_eq!(result.matrix.row("T2"), Some(&b"Y"[..]));
/// ```
pub fn subset(matrix: &Matrix, opts: &SubsetOptions) -> Result<SubsetResult, MatrixError> {
    if let Some(alphabet) = &opts.alphabet {
        if let Some(&c) = alphabet.iter().find(|&&c| matrix.is_reserved(c)) {
            return Err(MatrixError::ReservedInAlphabet(c as char));
        }
        let mut letters = BTreeSet::new();
        if let Some(&c) = alphabet.iter().find(|&&c| !letters.insert(c)) {
            return Err(MatrixError::DuplicateInAlphabet(c as char));
        }
    }

    //----------------------------
    // Taxa
    //----------------------------
    let selected: Vec<&str> = match &opts.taxa {
        TaxonSelection::All => matrix.taxa().collect(),
        TaxonSelection::Named(names) => {
            if let Some(unknown) = names.iter().find(|n| !matrix.contains(n)) {
                return Err(MatrixError::UnknownTaxon(unknown.to_string()));
            }
            let wanted: BTreeSet<&str> = names.iter().map(|n| n.as_str()).collect();
            matrix.taxa().filter(|t| wanted.contains(t)).collect()
        }
    };

    let mut fragmentary = vec![];
    let mut survivors: Vec<(&str, &[u8])> = vec![];
    for taxon in selected {
        let pct = matrix.missing_pct(taxon).unwrap_or_default();
        if pct > opts.frag_threshold {
            tracing::info!(
                "Excluding {}: {:.1}% missing exceeds {}%",
                taxon,
                pct,
                opts.frag_threshold
            );
            fragmentary.push((taxon.to_string(), pct));
            continue;
        }
        if let Some(states) = matrix.row(taxon) {
            survivors.push((taxon, states));
        }
    }

    if survivors.is_empty() {
        return Err(MatrixError::EmptyMatrix {
            threshold: opts.frag_threshold,
        });
    }

    //----------------------------
    // Columns
    //----------------------------
    let mut columns: Vec<Vec<u8>> = vec![];
    let mut invariant = vec![];
    let mut skipped = vec![];
    for i in 0..matrix.nchar() {
        let column: Vec<u8> = survivors.iter().map(|(_, states)| states[i]).collect();

        if column.iter().all(|&c| c == column[0]) {
            tracing::debug!("Column {} is invariant", i);
            invariant.push(i);
            continue;
        }

        match &opts.alphabet {
            None => columns.push(column),
            Some(alphabet) => match recode(matrix, &column, alphabet) {
                Some(recoded) => columns.push(recoded),
                None => {
                    let states = distinct_states(matrix, &column).len();
                    match opts.on_overflow {
                        OverflowPolicy::Abort => {
                            return Err(MatrixError::EncodingOverflow {
                                column: i,
                                states,
                                alphabet: alphabet.len(),
                            })
                        }
                        OverflowPolicy::Skip => {
                            tracing::info!(
                                "Skipping column {}: {} states don't fit into {} symbols",
                                i,
                                states,
                                alphabet.len()
                            );
                            skipped.push(i);
                        }
                    }
                }
            },
        }
    }

    //----------------------------
    // Output
    //----------------------------
    let mut result = matrix.blank_like(columns.len());
    for (row, (taxon, _)) in survivors.iter().enumerate() {
        let states: Vec<u8> = columns.iter().map(|col| col[row]).collect();
        result.push_row(taxon, &states)?;
    }

    tracing::info!(
        "Subset has {} taxa and {} characters ({} invariant, {} skipped)",
        result.ntax(),
        result.nchar(),
        invariant.len(),
        skipped.len()
    );

    Ok(SubsetResult {
        matrix: result,
        skipped,
        invariant,
        fragmentary,
    })
}

fn distinct_states(matrix: &Matrix, column: &[u8]) -> Vec<u8> {
    let mut seen: Vec<u8> = vec![];
    for &c in column {
        if !matrix.is_reserved(c) && !seen.contains(&c) {
            seen.push(c);
        }
    }
    seen
}

/// Positional recoding; `None` when the column has more states than
/// `alphabet`.
fn recode(matrix: &Matrix, column: &[u8], alphabet: &[u8]) -> Option<Vec<u8>> {
    let states = distinct_states(matrix, column);
    if states.len() > alphabet.len() {
        return None;
    }

    let recoded = column
        .iter()
        .map(|&c| match states.iter().position(|&s| s == c) {
            Some(pos) => alphabet[pos],
            None => c,
        })
        .collect();
    Some(recoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn matrix(nchar: usize, rows: &[(&str, &str)]) -> Matrix {
        let mut m = Matrix::new(nchar);
        for (t, s) in rows {
            m.push_row(t, s.as_bytes()).unwrap();
        }
        m
    }

    fn column(m: &Matrix, i: usize) -> String {
        String::from_utf8(m.column(i).unwrap().states().collect()).unwrap()
    }

    #[test]
    fn test_invariant_columns_dropped() {
        let m = matrix(3, &[("A", "cab"), ("B", "cba"), ("C", "c??")]);

        let result = subset(&m, &SubsetOptions::default()).unwrap();
        assert_eq!(result.invariant, vec![0]);
        assert_eq!(result.matrix.nchar(), 2);
        assert_eq!(result.matrix.row("A"), Some(&b"ab"[..]));

        let opts = SubsetOptions {
            alphabet: Some(DNA.to_vec()),
            ..Default::default()
        };
        let result = subset(&m, &opts).unwrap();
        assert_eq!(result.invariant, vec![0]);
        assert_eq!(result.matrix.nchar(), 2);
    }

    #[test]
    fn test_recode_first_seen_order() {
        let m = matrix(2, &[("T1", "bx"), ("T2", "a?"), ("T3", "ay")]);
        let opts = SubsetOptions {
            alphabet: Some(b"XY".to_vec()),
            ..Default::default()
        };
        let result = subset(&m, &opts).unwrap();

        assert_eq!(column(&result.matrix, 0), "XYY");
        // missing passes through untouched
        assert_eq!(column(&result.matrix, 1), "X?Y");
        assert_eq!(
            result.matrix.symbols().iter().copied().collect::<Vec<_>>(),
            b"XY".to_vec()
        );
    }

    #[test]
    fn test_overflow_policy() {
        let m = matrix(
            2,
            &[("A", "aa"), ("B", "bb"), ("C", "cb"), ("D", "da"), ("E", "eb")],
        );

        let opts = SubsetOptions {
            alphabet: Some(DNA.to_vec()),
            ..Default::default()
        };
        assert_eq!(
            subset(&m, &opts).unwrap_err(),
            MatrixError::EncodingOverflow {
                column: 0,
                states: 5,
                alphabet: 4
            }
        );

        let opts = SubsetOptions {
            alphabet: Some(DNA.to_vec()),
            on_overflow: OverflowPolicy::Skip,
            ..Default::default()
        };
        let result = subset(&m, &opts).unwrap();
        assert_eq!(result.skipped, vec![0]);
        assert_eq!(result.matrix.nchar(), 1);
        assert_eq!(column(&result.matrix, 0), "ACCAC");
    }

    #[test]
    fn test_fragmentation_on_full_rows() {
        // B is 50% missing over all four columns. Pruning the invariant
        // columns 0 and 1 would leave it 100% missing.
        let m = matrix(4, &[("A", "aaab"), ("B", "aa??"), ("C", "aaba")]);

        let opts = SubsetOptions {
            frag_threshold: 50.0,
            ..Default::default()
        };
        let result = subset(&m, &opts).unwrap();
        assert_eq!(result.matrix.taxa().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert!(result.fragmentary.is_empty());

        let opts = SubsetOptions {
            frag_threshold: 49.0,
            ..Default::default()
        };
        let result = subset(&m, &opts).unwrap();
        assert_eq!(result.matrix.taxa().collect::<Vec<_>>(), vec!["A", "C"]);
        assert_eq!(result.fragmentary.len(), 1);
        assert_relative_eq!(result.fragmentary[0].1, 50.0);
    }

    #[test]
    fn test_threshold_extremes() {
        let m = matrix(2, &[("A", "ab"), ("B", "b?")]);

        let opts = SubsetOptions {
            frag_threshold: 0.0,
            ..Default::default()
        };
        let result = subset(&m, &opts).unwrap();
        assert_eq!(result.matrix.taxa().collect::<Vec<_>>(), vec!["A"]);

        let none = matrix(2, &[("A", "?a"), ("B", "b?")]);
        assert!(matches!(
            subset(&none, &opts),
            Err(MatrixError::EmptyMatrix { .. })
        ));
    }

    #[test]
    fn test_named_taxa() {
        let m = matrix(2, &[("A", "ab"), ("B", "ba"), ("C", "bb")]);

        let opts = SubsetOptions {
            taxa: TaxonSelection::Named(vec!["C".to_string(), "A".to_string()]),
            ..Default::default()
        };
        let result = subset(&m, &opts).unwrap();
        // matrix order, not selection order
        assert_eq!(result.matrix.taxa().collect::<Vec<_>>(), vec!["A", "C"]);

        let opts = SubsetOptions {
            taxa: TaxonSelection::Named(vec!["Q".to_string()]),
            ..Default::default()
        };
        assert_eq!(
            subset(&m, &opts).unwrap_err(),
            MatrixError::UnknownTaxon("Q".to_string())
        );
    }

    #[test]
    fn test_alphabet_with_reserved_code() {
        let m = matrix(1, &[("A", "a"), ("B", "b")]);
        let opts = SubsetOptions {
            alphabet: Some(b"A-".to_vec()),
            ..Default::default()
        };
        assert_eq!(
            subset(&m, &opts).unwrap_err(),
            MatrixError::ReservedInAlphabet('-')
        );
    }

    #[test]
    fn test_alphabet_with_repeated_letter() {
        let m = matrix(1, &[("A", "a"), ("B", "b")]);
        let opts = SubsetOptions {
            alphabet: Some(b"XX".to_vec()),
            ..Default::default()
        };
        assert_eq!(
            subset(&m, &opts).unwrap_err(),
            MatrixError::DuplicateInAlphabet('X')
        );

        let opts = SubsetOptions {
            alphabet: Some(b"XYX".to_vec()),
            on_overflow: OverflowPolicy::Skip,
            ..Default::default()
        };
        assert!(subset(&m, &opts).is_err());
    }

    #[test]
    fn test_named_alphabet() {
        assert_eq!(named_alphabet("dna").unwrap(), Some(b"ACTG".to_vec()));
        assert_eq!(named_alphabet("protein").unwrap().unwrap().len(), 19);
        assert_eq!(named_alphabet("none").unwrap(), None);
        assert!(named_alphabet("rna").is_err());
        assert_eq!("skip".parse::<OverflowPolicy>().unwrap(), OverflowPolicy::Skip);
    }
}
