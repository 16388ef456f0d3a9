use std::path::Path;

use crate::config::PipelineConfig;
use crate::data::format::FormatKind;
use crate::data::loader;
use crate::data::model::{PreparedSignal, SignalRecord};
use crate::diagnosis::{recommendation_for, Analysis, Classifier};
use crate::error::{Error, Result};
use crate::signal::{denoise, normalize, resample};

// ---------------------------------------------------------------------------
// Pipeline – detect → parse → resample → denoise → normalize
// ---------------------------------------------------------------------------

/// Orchestrates one measurement end to end.
///
/// Holds only immutable configuration, so a single `Pipeline` can be shared
/// across threads to process independent files. Errors from any stage are
/// returned unchanged; nothing is retried and no partial result escapes.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Parse a file into a canonical record.
    pub fn ingest(&self, path: &Path, hint: Option<FormatKind>) -> Result<SignalRecord> {
        loader::load_file(path, hint, &self.config)
    }

    /// Turn a record into the fixed-length model input.
    pub fn prepare(&self, record: &SignalRecord) -> Result<PreparedSignal> {
        let resampled = resample(record.frequency(), record.magnitude_db(), &self.config.resample)?;
        let smoothed = denoise(&resampled.magnitude_db, self.config.denoise);
        let vector = normalize(&smoothed);
        log::debug!(
            "prepared {} → {} points (denoise={})",
            record.len(),
            vector.len(),
            self.config.denoise.name()
        );

        Ok(PreparedSignal {
            metadata: record.metadata().clone(),
            grid: resampled.grid,
            vector,
        })
    }

    /// [`Self::ingest`] followed by [`Self::prepare`].
    pub fn run(&self, path: &Path, hint: Option<FormatKind>) -> Result<PreparedSignal> {
        let record = self.ingest(path, hint)?;
        self.prepare(&record)
    }

    /// Run the pipeline and hand the vector to `classifier`.
    pub fn analyze(&self, path: &Path, hint: Option<FormatKind>, classifier: &dyn Classifier) -> Result<Analysis> {
        let prepared = self.run(path, hint)?;
        let prediction = classifier.classify(&prepared.vector).map_err(Error::Classifier)?;
        prediction.validate()?;
        log::info!(
            "{}: {} ({:.0}%)",
            path.display(),
            prediction.label,
            prediction.confidence * 100.0
        );

        Ok(Analysis {
            recommendation: recommendation_for(&prediction.label),
            metadata: prepared.metadata,
            prediction,
        })
    }
}
