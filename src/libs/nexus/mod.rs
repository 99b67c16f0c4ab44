//! Character-state matrices in NEXUS block format.
//!
//! Rows are taxa (e.g. manuscript witnesses), columns are comparative
//! characters (variant units), each cell a single-character state. Two codes
//! are reserved per matrix: `missing` (not attested) and `gap` (structural
//! absence such as a lacuna).
//!
//! * [`parse_str`] / [`write_nexus`] read and write the block format
//! * [`merge()`] concatenates matrices over the union of their taxa
//! * [`informative::analyse`] counts parsimony-informative columns
//! * [`subset()`] filters taxa, drops invariant columns and recodes states
//! * [`to_rdf`] writes the fixed-width format of network tools
//! * [`build_matrix`] codes attestation records through a [`SymbolTable`]

use anyhow::Context;

pub mod build;
pub mod error;
pub mod informative;
pub mod matrix;
pub mod merge;
pub mod parser;
pub mod rdf;
pub mod subset;
pub mod symbol;
pub mod writer;

pub use build::{build_matrix, read_attestations, Attestation, BuildOptions};
pub use error::MatrixError;
pub use informative::{analyse, InformativeReport};
pub use matrix::{Column, Matrix};
pub use merge::{filter_extant, merge, merge_all};
pub use parser::{parse_str, parse_str_with, ParseOptions};
pub use rdf::{relabel, to_rdf, RdfExport, RdfOptions};
pub use subset::{subset, OverflowPolicy, SubsetOptions, SubsetResult, TaxonSelection};
pub use symbol::SymbolTable;
pub use writer::write_nexus;

/// Reads and parses a matrix file, see [`crate::reader`] for accepted inputs.
pub fn from_file(infile: &str, opts: &ParseOptions) -> anyhow::Result<Matrix> {
    let text = crate::libs::io::read_to_string(infile)?;
    let matrix =
        parse_str_with(&text, opts).with_context(|| format!("Failed to parse {}", infile))?;
    tracing::info!(
        "Loaded {}: {} taxa, {} characters, {} symbols",
        infile,
        matrix.ntax(),
        matrix.nchar(),
        matrix.symbols().len()
    );
    Ok(matrix)
}
