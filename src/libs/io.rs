use anyhow::Context;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};

/// Opens `input` for buffered reading. `stdin` reads standard input, a `.gz`
/// extension is decompressed on the fly.
///
/// ```
/// use std::io::BufRead;
/// let reader = charmat::reader("tests/nexus/small.nex").unwrap();
/// let first = reader.lines().next().unwrap().unwrap();
/// assert_eq!(first, "#NEXUS");
/// ```
pub fn reader(input: &str) -> anyhow::Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = if input == "stdin" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let path = std::path::Path::new(input);
        let file = std::fs::File::open(path)
            .with_context(|| format!("could not open {}", path.display()))?;

        if path.extension() == Some(std::ffi::OsStr::new("gz")) {
            Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        }
    };

    Ok(reader)
}

pub fn writer(output: &str) -> anyhow::Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = if output == "stdout" {
        Box::new(BufWriter::new(std::io::stdout()))
    } else {
        let file = std::fs::File::create(output)
            .with_context(|| format!("could not create {}", output))?;
        Box::new(BufWriter::new(file))
    };

    Ok(writer)
}

/// Slurps the whole input, see [`reader`].
pub fn read_to_string(input: &str) -> anyhow::Result<String> {
    let mut reader = reader(input)?;
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .with_context(|| format!("could not read {}", input))?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use tempfile::tempdir;

    #[test]
    fn test_read_plain_and_gz() {
        let dir = tempdir().unwrap();

        let plain = dir.path().join("m.nex");
        std::fs::write(&plain, "#NEXUS\n").unwrap();
        assert_eq!(read_to_string(plain.to_str().unwrap()).unwrap(), "#NEXUS\n");

        let gz = dir.path().join("m.nex.gz");
        {
            let file = std::fs::File::create(&gz).unwrap();
            let mut encoder = GzEncoder::new(file, flate2::Compression::default());
            writeln!(encoder, "#NEXUS").unwrap();
            encoder.finish().unwrap();
        }
        assert_eq!(read_to_string(gz.to_str().unwrap()).unwrap(), "#NEXUS\n");
    }

    #[test]
    fn test_missing_file() {
        let err = reader("no/such/file.nex").err().unwrap();
        assert!(err.to_string().contains("could not open"));
    }
}
