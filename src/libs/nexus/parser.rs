use super::error::MatrixError;
use super::matrix::{is_valid_label, Matrix, DEFAULT_GAP, DEFAULT_MISSING};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

lazy_static! {
    static ref RE_BEGIN: Regex = Regex::new(r"(?i)^begin\s+(\w+)\s*;$").unwrap();
    static ref RE_END: Regex = Regex::new(r"(?i)^end(block)?\s*;$").unwrap();
    static ref RE_NTAX: Regex = Regex::new(r"(?i)\bntax\s*=\s*(\d+)").unwrap();
    static ref RE_NCHAR: Regex = Regex::new(r"(?i)\bnchar\s*=\s*(\d+)").unwrap();
    // value is "double quoted", 'single quoted' or bare
    static ref RE_FORMAT_KV: Regex =
        Regex::new(r#"(\w+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s;]+))"#).unwrap();
}

#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Fail if a non-empty declared `symbols` list differs from the states
    /// actually observed in the matrix
    pub strict_symbols: bool,
}

/// Parser states. Each line is handled by exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the `#NEXUS` tag
    Start,
    /// Between blocks
    Header,
    Taxa,
    TaxLabels,
    Characters,
    Format,
    Matrix,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Taxa,
    Characters,
    /// `BEGIN DATA;` carries `ntax` and `nchar` and has no label list
    Data,
}

#[derive(Default)]
struct Collected {
    ntax: Option<(usize, usize)>,
    nchar: Option<usize>,
    labels: Vec<(String, usize)>,
    format: String,
    format_line: usize,
    rows: IndexMap<String, (Vec<u8>, usize)>,
}

/// Parses a NEXUS character matrix with default options.
///
/// ```
/// use charmat::libs::nexus::parse_str;
///
/// let text = "#NEXUS
/// BEGIN Taxa;
/// DIMENSIONS ntax=2;
/// TAXLABELS
/// A
/// B
/// ;
/// END;
/// BEGIN Characters;
/// DIMENSIONS nchar=3;
/// FORMAT
///     datatype=STANDARD
///     missing=?
///     gap=-
///     symbols=\"a b\"
/// ;
/// MATRIX
/// A ab?
/// B aa-
/// ;
/// END;
/// ";
/// let matrix = parse_str(text).unwrap();
/// assert_eq!(matrix.ntax(), 2);
/// assert_eq!(matrix.nchar(), 3);
/// assert_eq!(matrix.row("A"), Some(&b"ab?"[..]));
/// ```
pub fn parse_str(text: &str) -> Result<Matrix, MatrixError> {
    parse_str_with(text, &ParseOptions::default())
}

pub fn parse_str_with(text: &str, opts: &ParseOptions) -> Result<Matrix, MatrixError> {
    let mut state = State::Start;
    let mut block: Option<Block> = None;
    let mut c = Collected::default();
    let mut last_line = 0;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        last_line = line_no;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        match state {
            State::Start => {
                if !line.starts_with('#') {
                    return Err(MatrixError::format(line_no, "expected a #NEXUS tag"));
                }
                state = State::Header;
            }
            State::Header => {
                if let Some(caps) = RE_BEGIN.captures(line) {
                    let name = caps[1].to_ascii_lowercase();
                    let (next_block, next_state) = match name.as_str() {
                        "taxa" => (Block::Taxa, State::Taxa),
                        "characters" => (Block::Characters, State::Characters),
                        "data" => (Block::Data, State::Characters),
                        _ => {
                            return Err(MatrixError::format(
                                line_no,
                                format!("unsupported block '{}'", &caps[1]),
                            ))
                        }
                    };
                    block = Some(next_block);
                    state = next_state;
                } else {
                    return Err(MatrixError::format(
                        line_no,
                        format!("expected BEGIN <block>;, found '{}'", line),
                    ));
                }
            }
            State::Taxa => {
                let lower = line.to_ascii_lowercase();
                if RE_END.is_match(line) {
                    state = State::Header;
                } else if lower.starts_with("dimensions") {
                    c.ntax = Some((capture_count(&RE_NTAX, line, line_no, "ntax")?, line_no));
                } else if lower.starts_with("taxlabels") {
                    state = State::TaxLabels;
                    // labels may follow on the same line
                    if take_labels(&line["taxlabels".len()..], line_no, &mut c.labels) {
                        state = State::Taxa;
                    }
                } else {
                    return Err(MatrixError::format(
                        line_no,
                        format!("unexpected command in TAXA block: '{}'", line),
                    ));
                }
            }
            State::TaxLabels => {
                if take_labels(line, line_no, &mut c.labels) {
                    state = State::Taxa;
                }
            }
            State::Characters => {
                let lower = line.to_ascii_lowercase();
                if RE_END.is_match(line) {
                    return Err(MatrixError::format(line_no, "block ended without a MATRIX"));
                } else if lower.starts_with("dimensions") {
                    if let Some(caps) = RE_NCHAR.captures(line) {
                        c.nchar = Some(parse_count(&caps[1], line_no, "nchar")?);
                    }
                    if block == Some(Block::Data) || RE_NTAX.is_match(line) {
                        c.ntax = Some((capture_count(&RE_NTAX, line, line_no, "ntax")?, line_no));
                    }
                } else if lower.starts_with("format") {
                    c.format_line = line_no;
                    c.format.push_str(&line["format".len()..]);
                    if !line.contains(';') {
                        state = State::Format;
                    }
                } else if lower == "matrix" {
                    state = State::Matrix;
                } else {
                    return Err(MatrixError::format(
                        line_no,
                        format!("unexpected command in CHARACTERS block: '{}'", line),
                    ));
                }
            }
            State::Format => {
                c.format.push(' ');
                c.format.push_str(line);
                if line.contains(';') {
                    state = State::Characters;
                }
            }
            State::Matrix => {
                if line == ";" {
                    state = State::Done;
                    break;
                }
                let (label, states, terminated) = split_row(line, line_no)?;
                if c.rows.contains_key(label) {
                    return Err(MatrixError::format(
                        line_no,
                        format!("taxon '{}' has more than one row", label),
                    ));
                }
                c.rows
                    .insert(label.to_string(), (states.as_bytes().to_vec(), line_no));
                if terminated {
                    state = State::Done;
                    break;
                }
            }
            State::Done => unreachable!(),
        }
    }

    if state != State::Done {
        let message = match state {
            State::Matrix => "MATRIX is not terminated by ';'",
            State::Start => "empty input",
            _ => "no MATRIX command found",
        };
        return Err(MatrixError::format(last_line + 1, message));
    }

    assemble(c, block, opts)
}

/// Checks the collected pieces against each other and builds the matrix.
fn assemble(c: Collected, block: Option<Block>, opts: &ParseOptions) -> Result<Matrix, MatrixError> {
    let format = parse_format(&c.format, c.format_line)?;

    let nchar = c
        .nchar
        .ok_or_else(|| MatrixError::format(c.format_line, "no nchar declared"))?;

    let mut matrix = Matrix::with_reserved(nchar, format.missing, format.gap)
        .map_err(|e| MatrixError::format(c.format_line, e.to_string()))?;

    // Label order: TAXLABELS if present, otherwise the rows themselves
    let labels: Vec<(String, usize)> = if c.labels.is_empty() && block == Some(Block::Data) {
        c.rows.iter().map(|(k, (_, l))| (k.clone(), *l)).collect()
    } else {
        c.labels
    };

    if let Some((ntax, line)) = c.ntax {
        if ntax != labels.len() {
            return Err(MatrixError::format(
                line,
                format!("ntax={} declared, but {} taxa found", ntax, labels.len()),
            ));
        }
    }

    let mut declared: BTreeSet<&str> = BTreeSet::new();
    for (label, line) in &labels {
        if !declared.insert(label.as_str()) {
            return Err(MatrixError::format(
                *line,
                format!("taxon '{}' is declared more than once", label),
            ));
        }
    }

    for (label, line) in &labels {
        if !c.rows.contains_key(label) {
            return Err(MatrixError::format(
                *line,
                format!("taxon '{}' has no row in MATRIX", label),
            ));
        }
    }
    for (label, (_, line)) in &c.rows {
        if !declared.contains(label.as_str()) {
            return Err(MatrixError::format(
                *line,
                format!("row label '{}' is not a declared taxon", label),
            ));
        }
    }

    for (label, _) in &labels {
        let (states, row_line) = &c.rows[label];
        matrix
            .push_row(label, states)
            .map_err(|e| MatrixError::format(*row_line, e.to_string()))?;
    }

    if opts.strict_symbols && !format.symbols.is_empty() {
        let observed = matrix.symbols();
        if &format.symbols != observed {
            let unused: String = format.symbols.difference(observed).map(|&b| b as char).collect();
            let undeclared: String = observed.difference(&format.symbols).map(|&b| b as char).collect();
            return Err(MatrixError::format(
                c.format_line,
                format!(
                    "declared symbols don't match the matrix (never observed: \"{}\", undeclared: \"{}\")",
                    unused, undeclared
                ),
            ));
        }
    }

    tracing::debug!(
        "Parsed matrix of {} taxa and {} characters",
        matrix.ntax(),
        matrix.nchar()
    );

    Ok(matrix)
}

struct Format {
    missing: u8,
    gap: u8,
    symbols: BTreeSet<u8>,
}

fn parse_format(text: &str, line: usize) -> Result<Format, MatrixError> {
    let mut format = Format {
        missing: DEFAULT_MISSING,
        gap: DEFAULT_GAP,
        symbols: BTreeSet::new(),
    };

    for caps in RE_FORMAT_KV.captures_iter(text) {
        let key = caps[1].to_ascii_lowercase();
        // only the quotes enclosing a quoted value go, a bare `'` is a code
        let value = match caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4)) {
            Some(m) => m.as_str(),
            None => continue,
        };
        match key.as_str() {
            "missing" | "gap" => {
                let c = match value.as_bytes() {
                    [c] => *c,
                    _ => {
                        return Err(MatrixError::format(
                            line,
                            format!("{} must be a single character, found '{}'", key, value),
                        ))
                    }
                };
                if key == "missing" {
                    format.missing = c;
                } else {
                    format.gap = c;
                }
            }
            "symbols" => {
                // both "a b c" and "abc" are in use
                format.symbols = value.bytes().filter(|c| !c.is_ascii_whitespace()).collect();
            }
            _ => {}
        }
    }

    Ok(format)
}

/// Collects whitespace separated labels, returns `true` once the closing `;`
/// has been seen.
fn take_labels(text: &str, line_no: usize, labels: &mut Vec<(String, usize)>) -> bool {
    let (body, done) = match text.find(';') {
        Some(pos) => (&text[..pos], true),
        None => (text, false),
    };
    for label in body.split_whitespace() {
        labels.push((label.to_string(), line_no));
    }
    done
}

/// Splits `label states` and reports whether a trailing `;` closed the block.
fn split_row(line: &str, line_no: usize) -> Result<(&str, &str, bool), MatrixError> {
    let mut parts = line.split_whitespace();
    let label = parts.next().unwrap_or_default();
    let states = parts.next().unwrap_or_default();
    if parts.next().is_some() {
        return Err(MatrixError::format(
            line_no,
            format!("expected '<label> <states>', found '{}'", line),
        ));
    }

    let (label, states, terminated) = match (label.strip_suffix(';'), states.strip_suffix(';')) {
        (_, Some(s)) => (label, s, true),
        (Some(l), None) if states.is_empty() => (l, states, true),
        _ => (label, states, false),
    };
    if !is_valid_label(label) {
        return Err(MatrixError::format(
            line_no,
            format!("invalid taxon label '{}'", label),
        ));
    }
    if !states.is_ascii() {
        return Err(MatrixError::format(
            line_no,
            format!("row of taxon '{}' contains non-ASCII states", label),
        ));
    }

    Ok((label, states, terminated))
}

fn capture_count(re: &Regex, line: &str, line_no: usize, key: &str) -> Result<usize, MatrixError> {
    match re.captures(line) {
        Some(caps) => parse_count(&caps[1], line_no, key),
        None => Err(MatrixError::format(line_no, format!("no {} declared", key))),
    }
}

fn parse_count(value: &str, line_no: usize, key: &str) -> Result<usize, MatrixError> {
    value
        .parse::<usize>()
        .map_err(|_| MatrixError::format(line_no, format!("invalid {} '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::nexus::write_nexus;

    const SMALL: &str = "#nexus
BEGIN Taxa;
DIMENSIONS ntax=3;
TAXLABELS
720
020
P78
;
END;
BEGIN Characters;
DIMENSIONS nchar=5;

FORMAT
    datatype=STANDARD
    missing=-
    gap=?
    symbols=\"a b c\"
;
MATRIX
720 -aaab
020 paaac
P78 ----?
;
END;
";

    fn expect_format_error(text: &str) -> (usize, String) {
        match parse_str(text) {
            Err(MatrixError::Format { line, message }) => (line, message),
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_small() {
        let m = parse_str(SMALL).unwrap();
        assert_eq!(m.taxa().collect::<Vec<_>>(), vec!["720", "020", "P78"]);
        assert_eq!(m.nchar(), 5);
        assert_eq!(m.missing(), b'-');
        assert_eq!(m.gap(), b'?');
        // `p` is observed though not declared
        assert_eq!(
            m.symbols().iter().copied().collect::<Vec<_>>(),
            b"abcp".to_vec()
        );
        assert_eq!(m.row("P78"), Some(&b"----?"[..]));
    }

    #[test]
    fn test_strict_symbols() {
        let opts = ParseOptions {
            strict_symbols: true,
        };
        let err = parse_str_with(SMALL, &opts).unwrap_err();
        assert!(matches!(err, MatrixError::Format { line: 13, .. }));
        assert!(err.to_string().contains("undeclared: \"p\""));

        let fixed = SMALL.replace("symbols=\"a b c\"", "symbols=\"a b c p\"");
        assert!(parse_str_with(&fixed, &opts).is_ok());

        // empty declarations are not checked
        let empty = SMALL.replace("symbols=\"a b c\"", "symbols=\"\"");
        assert!(parse_str_with(&empty, &opts).is_ok());
    }

    #[test]
    fn test_ntax_mismatch() {
        let text = SMALL.replace("ntax=3", "ntax=4");
        let (line, message) = expect_format_error(&text);
        assert_eq!(line, 3);
        assert!(message.contains("ntax=4 declared, but 3 taxa found"));
    }

    #[test]
    fn test_row_length() {
        let text = SMALL.replace("020 paaac", "020 paaa");
        let (line, message) = expect_format_error(&text);
        assert_eq!(line, 21);
        assert!(message.contains("has 4 characters, expected 5"));
    }

    #[test]
    fn test_missing_terminator() {
        let text = SMALL.replace("P78 ----?\n;\nEND;\n", "P78 ----?\n");
        let (_, message) = expect_format_error(&text);
        assert!(message.contains("not terminated"));
    }

    #[test]
    fn test_duplicates() {
        let text = SMALL.replace("P78\n;", "720\n;");
        let (line, message) = expect_format_error(&text);
        assert_eq!(line, 7);
        assert!(message.contains("more than once"));

        let text = SMALL.replace("P78 ----?", "720 ----?");
        let (line, message) = expect_format_error(&text);
        assert_eq!(line, 22);
        assert!(message.contains("more than one row"));
    }

    #[test]
    fn test_orphan_and_absent_rows() {
        let text = SMALL.replace("P78 ----?", "X ----?");
        let (line, message) = expect_format_error(&text);
        assert_eq!(line, 7);
        assert!(message.contains("'P78' has no row"));

        let text = SMALL
            .replace("ntax=3", "ntax=2")
            .replace("P78\n;", ";")
            .replace("P78 ----?", "X ----?");
        let (line, message) = expect_format_error(&text);
        assert_eq!(line, 21);
        assert!(message.contains("'X' is not a declared taxon"));
    }

    #[test]
    fn test_terminator_ends_parsing() {
        let text = format!("{}\nBEGIN Trees;\nthis is not parsed at all\n", SMALL);
        assert!(parse_str(&text).is_ok());
    }

    #[test]
    fn test_compact_layout() {
        // one-line TAXLABELS and FORMAT, row carrying the terminator
        let text = "#NEXUS
begin taxa;
  dimensions ntax=2;
  taxlabels A B;
end;
begin characters;
  dimensions nchar=2;
  format datatype=standard missing=? gap=- symbols=\"01\";
  matrix
A 01
B 1?;
end;
";
        let m = parse_str(text).unwrap();
        assert_eq!(m.taxa().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(m.row("B"), Some(&b"1?"[..]));
        assert_eq!(m.missing(), b'?');
    }

    #[test]
    fn test_data_block() {
        let text = "#NEXUS
begin data;
dimensions ntax=2 nchar=3;
format missing=? gap=- matchchar=. datatype=dna;
matrix
B ACT
A AC?
;
END;
";
        let m = parse_str(text).unwrap();
        assert_eq!(m.taxa().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(m.nchar(), 3);
    }

    #[test]
    fn test_bad_header() {
        let (line, _) = expect_format_error("BEGIN Taxa;\n");
        assert_eq!(line, 1);
        let (_, message) = expect_format_error("");
        assert_eq!(message, "empty input");
        let (_, message) = expect_format_error("#NEXUS\nBEGIN Taxa;\nEND;\n");
        assert_eq!(message, "no MATRIX command found");
    }

    #[test]
    fn test_quote_codes_round_trip() {
        let mut m = Matrix::with_reserved(2, b'\'', b'-').unwrap();
        m.push_row("A", b"a'").unwrap();
        m.push_row("B", b"b-").unwrap();
        let text = write_nexus(&m);
        assert!(text.contains("    missing='\n"));
        assert_eq!(parse_str(&text).unwrap(), m);

        // `'` as an observed state survives a strict read of our own output
        let mut m = Matrix::new(2);
        m.push_row("A", b"'a").unwrap();
        m.push_row("B", b"'a").unwrap();
        let text = write_nexus(&m);
        assert!(text.contains("symbols=\"' a\""));
        let opts = ParseOptions {
            strict_symbols: true,
        };
        assert_eq!(parse_str_with(&text, &opts).unwrap(), m);
    }

    #[test]
    fn test_quoted_format_values() {
        let text = SMALL
            .replace("missing=-", "missing='-'")
            .replace("symbols=\"a b c\"", "symbols='a b c p'");
        let opts = ParseOptions {
            strict_symbols: true,
        };
        let m = parse_str_with(&text, &opts).unwrap();
        assert_eq!(m.missing(), b'-');
    }

    #[test]
    fn test_same_reserved_codes() {
        let text = SMALL.replace("gap=?", "gap=-");
        let (line, message) = expect_format_error(&text);
        assert_eq!(line, 13);
        assert!(message.contains("Invalid reserved codes"));
    }
}
