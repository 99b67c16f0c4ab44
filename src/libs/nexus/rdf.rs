use super::matrix::Matrix;
use anyhow::Context;
use indexmap::IndexMap;
use std::fmt::Write;

/// Options of the fixed-width export consumed by network/distance tools.
#[derive(Debug, Clone)]
pub struct RdfOptions {
    /// Leave out columns where every taxon reads `missing` or `gap`
    pub ignore_missing: bool,
    /// Written in place of retained `missing`/`gap` cells; the target format
    /// has no notion of missing data
    pub placeholder: u8,
}

impl Default for RdfOptions {
    fn default() -> Self {
        Self {
            ignore_missing: false,
            placeholder: b'N',
        }
    }
}

/// The exported text plus the `H_<n> => label` mapping needed to put the
/// original labels back afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RdfExport {
    pub text: String,
    pub labels: IndexMap<String, String>,
}

/// Renders `matrix` in the fixed-width layout:
///
/// * column-number header, one line per decimal digit of `nchar`,
///   10 spaces of indent, 1-based numbers read top to bottom
/// * four empty lines
/// * one `H_<n>` line per taxon: the ordinal left-justified to width 8,
///   the states, two spaces and `1`
/// * an empty line and the weight trailer, `10` for every column
///
/// ```
/// use charmat::libs::nexus::{to_rdf, Matrix, RdfOptions};
///
/// let mut m = Matrix::new(2);
/// m.push_row("P46", b"a?").unwrap();
///
/// let export = to_rdf(&m, &RdfOptions::default());
/// assert!(export.text.contains("H_1       aN  1\n"));
/// assert_eq!(export.labels["H_1"], "P46");
/// ```
pub fn to_rdf(matrix: &Matrix, opts: &RdfOptions) -> RdfExport {
    let kept: Vec<usize> = matrix
        .columns()
        .filter(|col| !opts.ignore_missing || col.states().any(|c| !matrix.is_reserved(c)))
        .map(|col| col.index())
        .collect();
    if kept.len() < matrix.nchar() {
        tracing::info!(
            "Ignoring {} characters without any attested state",
            matrix.nchar() - kept.len()
        );
    }

    let mut text = String::new();
    let mut labels = IndexMap::new();

    // header, one line per digit
    let width = matrix.nchar().to_string().len();
    let numbers: Vec<Vec<u8>> = kept
        .iter()
        .map(|i| format!("{:<width$}", i + 1, width = width).into_bytes())
        .collect();
    for digit in 0..width {
        text.push_str(&" ".repeat(10));
        for n in &numbers {
            text.push(n[digit] as char);
        }
        text.push('\n');
    }
    text.push_str(&"\n".repeat(4));

    for (n, (taxon, states)) in matrix.rows().enumerate() {
        let id = format!("H_{}", n + 1);
        let stripe: String = kept
            .iter()
            .map(|&i| {
                let c = states[i];
                if matrix.is_reserved(c) {
                    opts.placeholder as char
                } else {
                    c as char
                }
            })
            .collect();
        // Infallible on String
        let _ = writeln!(text, "{:<10}{}  1", id, stripe);
        tracing::debug!("{} is {}", id, taxon);
        labels.insert(id, taxon.to_string());
    }

    text.push('\n');
    text.push_str(&"10".repeat(kept.len()));
    text.push('\n');

    RdfExport { text, labels }
}

/// Writes the label mapping as a JSON object.
pub fn labels_to_json(labels: &IndexMap<String, String>) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(labels)?)
}

pub fn labels_from_json(json: &str) -> anyhow::Result<IndexMap<String, String>> {
    serde_json::from_str(json).context("Invalid label mapping")
}

/// Substitutes the original labels back into `text`, longest placeholder
/// first so that `H_1` doesn't clobber `H_10`.
pub fn relabel(text: &str, labels: &IndexMap<String, String>) -> String {
    let mut keys: Vec<&String> = labels.keys().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut out = text.to_string();
    for key in keys {
        tracing::debug!("Replacing {} with {}", key, labels[key]);
        out = out.replace(key.as_str(), &labels[key]);
    }
    out
}
