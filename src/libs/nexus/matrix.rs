use super::error::MatrixError;
use super::informative;
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Default code for "state not attested".
pub const DEFAULT_MISSING: u8 = b'?';
/// Default code for "structural absence" (lacuna).
pub const DEFAULT_GAP: u8 = b'-';

/// Can `c` be written into a matrix row?
///
/// `;` terminates the MATRIX command and `"` delimits the symbols list, so
/// neither can ever be a state.
pub fn is_state_code(c: u8) -> bool {
    c.is_ascii_graphic() && c != b';' && c != b'"'
}

pub fn is_valid_label(label: &str) -> bool {
    !label.is_empty() && !label.chars().any(|c| c.is_whitespace() || c == ';')
}

/// A character-state matrix.
///
/// Each taxon owns exactly one state string of length `nchar`; taxa keep
/// their insertion order. `symbols` is the set of codes observed in the
/// rows, excluding `missing` and `gap`.
///
/// ```
/// use charmat::libs::nexus::Matrix;
///
/// let mut matrix = Matrix::new(3);
/// matrix.push_row("A", b"ab?").unwrap();
/// matrix.push_row("B", b"aa-").unwrap();
///
/// assert_eq!(matrix.ntax(), 2);
/// assert_eq!(matrix.taxa().collect::<Vec<_>>(), vec!["A", "B"]);
/// assert_eq!(matrix.symbols().iter().copied().collect::<Vec<_>>(), b"ab".to_vec());
/// assert!(matrix.push_row("C", b"ab").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Matrix {
    rows: IndexMap<String, Vec<u8>>,
    nchar: usize,
    symbols: BTreeSet<u8>,
    missing: u8,
    gap: u8,
}

impl Matrix {
    /// An empty matrix of `nchar` columns using the default reserved codes.
    pub fn new(nchar: usize) -> Self {
        Self {
            rows: IndexMap::new(),
            nchar,
            symbols: BTreeSet::new(),
            missing: DEFAULT_MISSING,
            gap: DEFAULT_GAP,
        }
    }

    /// The matrix with no taxa and no columns; identity element of
    /// [`merge`](super::merge::merge).
    pub fn empty() -> Self {
        Self::new(0)
    }

    pub fn with_reserved(nchar: usize, missing: u8, gap: u8) -> Result<Self, MatrixError> {
        if missing == gap || !is_state_code(missing) || !is_state_code(gap) {
            return Err(MatrixError::InvalidReserved {
                missing: missing as char,
                gap: gap as char,
            });
        }

        Ok(Self {
            missing,
            gap,
            ..Self::new(nchar)
        })
    }

    /// Appends a taxon, checking every matrix invariant first. A rejected row
    /// leaves the matrix untouched.
    pub fn push_row(&mut self, label: &str, states: &[u8]) -> Result<(), MatrixError> {
        if !is_valid_label(label) {
            return Err(MatrixError::InvalidLabel(label.to_string()));
        }
        if self.rows.contains_key(label) {
            return Err(MatrixError::DuplicateTaxon(label.to_string()));
        }
        if states.len() != self.nchar {
            return Err(MatrixError::Shape {
                taxon: label.to_string(),
                expected: self.nchar,
                actual: states.len(),
            });
        }
        if let Some(&bad) = states.iter().find(|&&c| !is_state_code(c)) {
            return Err(MatrixError::SymbolConflict {
                taxon: label.to_string(),
                symbol: bad as char,
            });
        }

        for &c in states {
            if !self.is_reserved(c) {
                self.symbols.insert(c);
            }
        }
        self.rows.insert(label.to_string(), states.to_vec());

        Ok(())
    }

    /// A matrix with the same shape and reserved codes but no rows.
    pub fn blank_like(&self, nchar: usize) -> Self {
        Self {
            missing: self.missing,
            gap: self.gap,
            ..Self::new(nchar)
        }
    }

    pub fn ntax(&self) -> usize {
        self.rows.len()
    }

    pub fn nchar(&self) -> usize {
        self.nchar
    }

    /// No taxa and no columns
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.nchar == 0
    }

    pub fn missing(&self) -> u8 {
        self.missing
    }

    pub fn gap(&self) -> u8 {
        self.gap
    }

    pub fn is_reserved(&self, c: u8) -> bool {
        c == self.missing || c == self.gap
    }

    pub fn symbols(&self) -> &BTreeSet<u8> {
        &self.symbols
    }

    pub fn taxa(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.rows.keys().map(|k| k.as_str())
    }

    pub fn contains(&self, taxon: &str) -> bool {
        self.rows.contains_key(taxon)
    }

    pub fn row(&self, taxon: &str) -> Option<&[u8]> {
        self.rows.get(taxon).map(|v| v.as_slice())
    }

    /// `(label, states)` pairs in taxon order
    pub fn rows(&self) -> impl ExactSizeIterator<Item = (&str, &[u8])> + '_ {
        self.rows.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of cells of `states` that are neither `missing` nor `gap`.
    pub fn attested(&self, states: &[u8]) -> usize {
        states.iter().filter(|&&c| !self.is_reserved(c)).count()
    }

    /// Share of `taxon`'s row taken by `missing`/`gap`, in percent.
    pub fn missing_pct(&self, taxon: &str) -> Option<f64> {
        let states = self.row(taxon)?;
        if self.nchar == 0 {
            return Some(0.0);
        }
        let absent = self.nchar - self.attested(states);
        Some(absent as f64 / self.nchar as f64 * 100.0)
    }

    /// `None` when `index` is past the last column.
    pub fn column(&self, index: usize) -> Option<Column<'_>> {
        (index < self.nchar).then_some(Column {
            matrix: self,
            index,
        })
    }

    pub fn columns(&self) -> impl Iterator<Item = Column<'_>> + '_ {
        (0..self.nchar).map(move |index| Column {
            matrix: self,
            index,
        })
    }
}

impl PartialEq for Matrix {
    /// Structural equality; unlike `IndexMap`'s own comparison, taxon order
    /// matters.
    fn eq(&self, other: &Self) -> bool {
        self.nchar == other.nchar
            && self.missing == other.missing
            && self.gap == other.gap
            && self.symbols == other.symbols
            && self.rows.iter().eq(other.rows.iter())
    }
}

impl Eq for Matrix {}

/// A transient view of one column, states listed in taxon order.
#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    matrix: &'a Matrix,
    index: usize,
}

impl<'a> Column<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn states(&self) -> impl Iterator<Item = u8> + 'a {
        let matrix = self.matrix;
        let index = self.index;
        matrix.rows.values().map(move |row| row[index])
    }

    /// Non-reserved states in first-encountered order
    pub fn distinct_states(&self) -> Vec<u8> {
        let mut seen: Vec<u8> = vec![];
        for c in self.states() {
            if !self.matrix.is_reserved(c) && !seen.contains(&c) {
                seen.push(c);
            }
        }
        seen
    }

    /// Every taxon shows the same character (reserved codes included)
    pub fn is_invariant(&self) -> bool {
        let mut states = self.states();
        match states.next() {
            Some(first) => states.all(|c| c == first),
            None => true,
        }
    }

    pub fn is_informative(&self) -> bool {
        let states: Vec<u8> = self.states().collect();
        informative::is_informative(&states, self.matrix.missing, self.matrix.gap)
    }
}
