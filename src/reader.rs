//src/reader.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::AlexError;

/// Open a text input, transparently decompressing it if the name ends in `.gz`.
pub fn open_text<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>, AlexError> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|e| AlexError::io(path, e))?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn BufRead> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };
    Ok(reader)
}

/// Visit every line of `path` with its 1-based line number, line endings stripped.
pub fn for_each_line<P, F>(path: P, mut visit: F) -> Result<(), AlexError>
where
    P: AsRef<Path>,
    F: FnMut(usize, &str) -> Result<(), AlexError>,
{
    let path = path.as_ref();
    let mut reader = open_text(path)?;
    let mut line = String::new();
    let mut line_no = 0usize;

    loop {
        line.clear();
        if reader
            .read_line(&mut line)
            .map_err(|e| AlexError::io(path, e))?
            == 0
        {
            break; // EOF
        }
        line_no += 1;
        visit(line_no, line.trim_end_matches(&['\n', '\r'][..]))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn reads_plain_and_gzipped_lines() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("hits.tsv");
        std::fs::write(&plain, "a\tb\r\nc\n").unwrap();

        let gz = dir.path().join("hits.tsv.gz");
        let mut enc = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        enc.write_all(b"a\tb\nc\n").unwrap();
        enc.finish().unwrap();

        for path in [plain, gz] {
            let mut seen = Vec::new();
            for_each_line(&path, |n, l| {
                seen.push((n, l.to_string()));
                Ok(())
            })
            .unwrap();
            assert_eq!(seen, vec![(1, "a\tb".to_string()), (2, "c".to_string())]);
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = open_text("/definitely/not/here.tsv").err().unwrap();
        assert!(matches!(err, AlexError::Io { .. }));
    }
}
