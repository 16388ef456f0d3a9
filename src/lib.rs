//! Ingestion and normalization of transformer FRA (Frequency Response
//! Analysis) sweeps.
//!
//! Heterogeneous vendor exports (delimited text, XML/JSON, raw float32
//! binaries, and the crate's own Parquet archive) are parsed into a
//! [`SignalRecord`], then resampled onto a log-spaced grid, median-denoised
//! and z-scored into a fixed-length vector that any [`Classifier`] can consume.
//!
//! ```no_run
//! use std::path::Path;
//! use fra_ingest::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(PipelineConfig::default());
//! let prepared = pipeline.run(Path::new("sweep.csv"), None)?;
//! assert_eq!(prepared.vector.len(), 1024);
//! # Ok::<(), fra_ingest::Error>(())
//! ```

pub mod config;
pub mod data;
pub mod diagnosis;
pub mod error;
pub mod pipeline;
pub mod signal;

pub use config::PipelineConfig;
pub use data::format::{FormatKind, MarkupDialect};
pub use data::loader::{load_file, parse_bytes, write_archive, SignalParser};
pub use data::model::{Metadata, PreparedSignal, ResampledSignal, SignalRecord, SignalSummary};
pub use diagnosis::{recommendation_for, Analysis, Classifier, Prediction};
pub use error::{Error, Result};
pub use pipeline::Pipeline;
