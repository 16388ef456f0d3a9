use std::path::Path;

use crate::config::PipelineConfig;
use crate::data::format::{self, FormatKind};
use crate::data::model::SignalRecord;
use crate::error::{Error, Result};

mod archive;
mod binary;
mod delimited;
mod markup;

pub use archive::{record_batch, write_archive, ArchiveParser};
pub use binary::BinaryParser;
pub use delimited::{complex_to_polar, DelimitedParser};
pub use markup::{to_numbers, MarkupParser, TreeSearch};

/// Shared capability of every format parser: raw bytes in, canonical record out.
///
/// Parsers never fall back to one another; a failure is final for that input.
pub trait SignalParser {
    fn parse(&self, source: &[u8]) -> Result<SignalRecord>;
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load one measurement file.
///
/// The format comes from `hint` when given, otherwise from the extension and
/// then the content (see [`FormatKind::from_content`]). The file is read in
/// full and closed before parsing begins.
pub fn load_file(path: &Path, hint: Option<FormatKind>, config: &PipelineConfig) -> Result<SignalRecord> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    let kind = match hint {
        Some(kind) => kind,
        None => format::detect(path, &bytes)?,
    };
    log::info!("parsing {} as {kind:?} ({} bytes)", path.display(), bytes.len());
    parse_bytes(kind, &bytes, config)
}

/// Dispatch `source` to the parser for `kind`.
pub fn parse_bytes(kind: FormatKind, source: &[u8], config: &PipelineConfig) -> Result<SignalRecord> {
    match kind {
        FormatKind::Delimited(delimiter) => DelimitedParser::new(&config.delimited, delimiter).parse(source),
        FormatKind::Markup(dialect) => MarkupParser::new(&config.markup, dialect).parse(source),
        FormatKind::Binary => BinaryParser.parse(source),
        FormatKind::Archive => ArchiveParser.parse(source),
    }
}
