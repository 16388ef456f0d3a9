use std::path::Path;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// FormatKind – the closed set of input encodings
// ---------------------------------------------------------------------------

/// Input encodings the pipeline can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// Column-oriented text with a header row. `None` sniffs the delimiter
    /// from the header line.
    Delimited(Option<u8>),
    /// Nested document (vendor XML export or JSON).
    Markup(MarkupDialect),
    /// Undocumented vendor binary; only the interleaved-float32 heuristic applies.
    Binary,
    /// Canonical record archive written by [`crate::data::loader::write_archive`].
    Archive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupDialect {
    Xml,
    Json,
}

const PARQUET_MAGIC: &[u8] = b"PAR1";
const DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

impl FormatKind {
    /// Map a file extension (case-insensitive) to a format.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Some(FormatKind::Delimited(Some(b','))),
            "tsv" => Some(FormatKind::Delimited(Some(b'\t'))),
            "txt" => Some(FormatKind::Delimited(None)),
            "xml" => Some(FormatKind::Markup(MarkupDialect::Xml)),
            "json" => Some(FormatKind::Markup(MarkupDialect::Json)),
            "bin" | "dat" | "raw" => Some(FormatKind::Binary),
            "parquet" | "pq" => Some(FormatKind::Archive),
            _ => None,
        }
    }

    /// Guess a format from the leading bytes of the file.
    ///
    /// Text containing NUL bytes or invalid UTF-8 is treated as binary.
    /// Text that looks like neither markup nor a delimited table is left
    /// undecided rather than guessed.
    pub fn from_content(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(PARQUET_MAGIC) {
            return Some(FormatKind::Archive);
        }
        if bytes.contains(&0) {
            return Some(FormatKind::Binary);
        }
        let Ok(text) = std::str::from_utf8(bytes) else {
            return Some(FormatKind::Binary);
        };

        let text = text.trim_start_matches('\u{feff}').trim_start();
        match text.chars().next() {
            Some('<') => Some(FormatKind::Markup(MarkupDialect::Xml)),
            Some('{') | Some('[') => Some(FormatKind::Markup(MarkupDialect::Json)),
            Some(_) => {
                let header = text.lines().next().unwrap_or("");
                header
                    .bytes()
                    .any(|b| DELIMITERS.contains(&b))
                    .then_some(FormatKind::Delimited(None))
            }
            None => None,
        }
    }
}

/// Resolve the format of `path`: extension first, then content.
pub fn detect(path: &Path, bytes: &[u8]) -> Result<FormatKind> {
    let kind = FormatKind::from_extension(path)
        .or_else(|| FormatKind::from_content(bytes))
        .ok_or_else(|| Error::UndetectedFormat(path.to_path_buf()))?;
    log::debug!("detected {kind:?} for {}", path.display());
    Ok(kind)
}

/// Pick the most frequent of `,` `;` `\t` in the header line (comma on ties).
pub fn sniff_delimiter(source: &[u8]) -> u8 {
    let header = source.split(|b| *b == b'\n').next().unwrap_or(&[]);
    let mut best = (b',', 0usize);
    for d in DELIMITERS {
        let count = header.iter().filter(|b| **b == d).count();
        if count > best.1 {
            best = (d, count);
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_wins_and_is_case_insensitive() {
        assert_eq!(
            FormatKind::from_extension(Path::new("sweep.CSV")),
            Some(FormatKind::Delimited(Some(b',')))
        );
        assert_eq!(
            FormatKind::from_extension(Path::new("a/b/run.Xml")),
            Some(FormatKind::Markup(MarkupDialect::Xml))
        );
        assert_eq!(FormatKind::from_extension(Path::new("dump.DAT")), Some(FormatKind::Binary));
        assert_eq!(FormatKind::from_extension(Path::new("x.pq")), Some(FormatKind::Archive));
        assert_eq!(FormatKind::from_extension(Path::new("noext")), None);
    }

    #[test]
    fn content_sniffing() {
        assert_eq!(
            FormatKind::from_content(b"  <?xml version=\"1.0\"?><a/>"),
            Some(FormatKind::Markup(MarkupDialect::Xml))
        );
        assert_eq!(
            FormatKind::from_content(b"\n{\"frequency\": []}"),
            Some(FormatKind::Markup(MarkupDialect::Json))
        );
        assert_eq!(
            FormatKind::from_content(b"Frequency;Magnitude\n1;2\n"),
            Some(FormatKind::Delimited(None))
        );
        assert_eq!(FormatKind::from_content(b"PAR1...."), Some(FormatKind::Archive));
        assert_eq!(FormatKind::from_content(&10f32.to_le_bytes()), Some(FormatKind::Binary));
        assert_eq!(FormatKind::from_content(&[0xff, 0xfe, 0x41]), Some(FormatKind::Binary));
        assert_eq!(FormatKind::from_content(b"just some words"), None);
        assert_eq!(FormatKind::from_content(b"   "), None);
    }

    #[test]
    fn undetected_is_an_error() {
        let err = detect(Path::new("mystery"), b"hello").unwrap_err();
        assert!(matches!(err, Error::UndetectedFormat(_)));
    }

    #[test]
    fn delimiter_sniffing() {
        assert_eq!(sniff_delimiter(b"f;m;p\n1,5;2;3"), b';');
        assert_eq!(sniff_delimiter(b"f\tm\n1\t2"), b'\t');
        assert_eq!(sniff_delimiter(b"frequency"), b',');
    }
}
