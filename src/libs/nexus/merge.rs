use super::error::MatrixError;
use super::matrix::Matrix;

/// Concatenates the columns of `a` and `b` over the union of their taxa.
///
/// `a`'s taxa come first in their own order, then the taxa only `b` knows,
/// in `b`'s order. A taxon absent from one side is padded with `missing`
/// over that side's columns, never with `gap`: "no data from this source"
/// and "lacuna" are different signals.
///
/// The result uses `a`'s reserved codes; `b`'s reserved cells are translated.
/// An empty `a` (no taxa, no columns) adopts `b`'s codes, so the empty
/// matrix is a two-sided identity.
///
/// ```
/// use charmat::libs::nexus::{merge, Matrix};
///
/// let mut a = Matrix::new(3);
/// a.push_row("X", b"abc").unwrap();
/// let mut b = Matrix::new(2);
/// b.push_row("Y", b"de").unwrap();
///
/// let m = merge(&a, &b).unwrap();
/// assert_eq!(m.row("X"), Some(&b"abc??"[..]));
/// assert_eq!(m.row("Y"), Some(&b"???de"[..]));
/// ```
pub fn merge(a: &Matrix, b: &Matrix) -> Result<Matrix, MatrixError> {
    if a.is_empty() {
        return Ok(b.clone());
    }

    let (missing, gap) = (a.missing(), a.gap());
    for (taxon, states) in b.rows() {
        if let Some(&c) = states
            .iter()
            .find(|&&c| !b.is_reserved(c) && a.is_reserved(c))
        {
            return Err(MatrixError::SymbolConflict {
                taxon: taxon.to_string(),
                symbol: c as char,
            });
        }
    }

    // b's cells in a's reserved scheme
    let translate = |c: u8| -> u8 {
        if c == b.missing() {
            missing
        } else if c == b.gap() {
            gap
        } else {
            c
        }
    };

    let mut merged = a.blank_like(a.nchar() + b.nchar());

    let taxa: Vec<&str> = a
        .taxa()
        .chain(b.taxa().filter(|t| !a.contains(t)))
        .collect();

    for taxon in taxa {
        let mut states: Vec<u8> = Vec::with_capacity(merged.nchar());
        match a.row(taxon) {
            Some(row) => states.extend_from_slice(row),
            None => states.resize(a.nchar(), missing),
        }
        match b.row(taxon) {
            Some(row) => states.extend(row.iter().map(|&c| translate(c))),
            None => states.resize(merged.nchar(), missing),
        }
        merged.push_row(taxon, &states)?;
    }

    Ok(merged)
}

/// Folds any number of matrices, left to right, starting from the empty
/// matrix.
pub fn merge_all<'a, I>(matrices: I) -> Result<Matrix, MatrixError>
where
    I: IntoIterator<Item = &'a Matrix>,
{
    let mut merged = Matrix::empty();
    for m in matrices {
        merged = merge(&merged, m)?;
    }
    Ok(merged)
}

/// Drops taxa attested (neither `missing` nor `gap`) in fewer than
/// `extant_pct` percent of the columns.
///
/// Returns the filtered matrix and the removed taxa with their attested
/// counts. Removing every taxon is an error.
pub fn filter_extant(
    matrix: &Matrix,
    extant_pct: f64,
) -> Result<(Matrix, Vec<(String, usize)>), MatrixError> {
    let target = matrix.nchar() as f64 * extant_pct / 100.0;
    tracing::info!(
        "Only including taxa extant in {} ({}%) of characters",
        target,
        extant_pct
    );

    let mut kept = matrix.blank_like(matrix.nchar());
    let mut removed = vec![];
    for (taxon, states) in matrix.rows() {
        let extant = matrix.attested(states);
        if (extant as f64) < target {
            tracing::info!(
                "Deleting {} as it's only extant in {} characters",
                taxon,
                extant
            );
            removed.push((taxon.to_string(), extant));
            continue;
        }
        kept.push_row(taxon, states)?;
    }

    if kept.ntax() == 0 && matrix.ntax() > 0 {
        return Err(MatrixError::EmptyMatrix {
            threshold: extant_pct,
        });
    }

    Ok((kept, removed))
}
