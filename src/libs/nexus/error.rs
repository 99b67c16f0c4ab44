use thiserror::Error;

/// Errors raised by the matrix engine.
///
/// All of them are deterministic data errors: the message names the
/// offending line, taxon or column together with the expected and actual
/// values, so a failing run can be diagnosed without re-running it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    /// Malformed matrix block
    #[error("Format error at line {line}: {message}")]
    Format {
        /// The line number (1-based)
        line: usize,
        /// A human-readable message explaining the error
        message: String,
    },

    /// A state string whose length differs from `nchar`
    #[error("Row of taxon '{taxon}' has {actual} characters, expected {expected}")]
    Shape {
        taxon: String,
        expected: usize,
        actual: usize,
    },

    #[error("Taxon '{0}' appears more than once")]
    DuplicateTaxon(String),

    #[error("Invalid taxon label '{0}': labels must be non-empty and contain no whitespace")]
    InvalidLabel(String),

    /// `MISSING` and `GAP` must be distinct, printable, non-whitespace ASCII
    #[error("Invalid reserved codes: missing='{missing}', gap='{gap}'")]
    InvalidReserved { missing: char, gap: char },

    /// A state code that can't live in this matrix
    #[error("Symbol '{symbol}' of taxon '{taxon}' conflicts with the reserved codes or is not ASCII")]
    SymbolConflict { taxon: String, symbol: char },

    #[error("Target alphabet contains the reserved code '{0}'")]
    ReservedInAlphabet(char),

    /// Recoding needs one letter per state
    #[error("Target alphabet lists '{0}' more than once")]
    DuplicateInAlphabet(char),

    #[error("Unknown taxon '{0}'")]
    UnknownTaxon(String),

    /// Filtering removed every taxon
    #[error("No taxon survives filtering at {threshold}%")]
    EmptyMatrix { threshold: f64 },

    #[error("Column {column} has {states} distinct states, but the target alphabet only has {alphabet}")]
    EncodingOverflow {
        column: usize,
        states: usize,
        alphabet: usize,
    },

    #[error("Symbol pool exhausted: can't allocate a code for '{ident}', all {capacity} codes are in use")]
    AlphabetExhausted { ident: String, capacity: usize },
}

impl MatrixError {
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        MatrixError::Format {
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = MatrixError::Shape {
            taxon: "P46".to_string(),
            expected: 10,
            actual: 9,
        };
        assert_eq!(
            err.to_string(),
            "Row of taxon 'P46' has 9 characters, expected 10"
        );

        let err = MatrixError::EncodingOverflow {
            column: 3,
            states: 5,
            alphabet: 4,
        };
        assert!(err.to_string().contains("Column 3 has 5 distinct states"));

        let err = MatrixError::format(12, "missing terminator");
        assert_eq!(err.to_string(), "Format error at line 12: missing terminator");
    }
}
