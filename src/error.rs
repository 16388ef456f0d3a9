use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while ingesting or preparing an FRA measurement.
///
/// None of these are transient: a file that fails once fails every time, so
/// callers should surface them rather than retry.
#[derive(Debug, Error)]
pub enum Error {
    /// Required columns or nodes absent after trying every known alias.
    #[error("missing data: {0}")]
    MissingData(String),

    /// Markup document has no recognisable frequency/magnitude subtree.
    #[error("schema error: {0}")]
    Schema(String),

    /// A located node or column is not one of the recognised numeric encodings.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Binary fallback heuristic does not apply; a vendor-specific parser is required.
    #[error("unknown binary schema: {0} (vendor-specific parser required)")]
    UnknownSchema(String),

    /// Paired sequences have unequal lengths.
    #[error("dimension mismatch: {field} has {actual} values, expected {expected}")]
    DimensionMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Values violate the canonical record or resampling invariants.
    #[error("invalid signal: {0}")]
    InvalidSignal(String),

    /// A cell in a used column could not be read as a number.
    #[error("row {row}, column '{column}': '{value}' is not a number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Neither the extension nor the content identifies the input format.
    #[error("could not detect input format of {}", .0.display())]
    UndetectedFormat(PathBuf),

    /// The classifier returned something outside its contract.
    #[error("invalid prediction: {0}")]
    InvalidPrediction(String),

    #[error("classifier failed: {0}")]
    Classifier(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
