use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Error, Result};

/// Best-effort measurement metadata: transformer id, tap, operator, date, …
pub type Metadata = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// SignalRecord – the canonical output of every parser
// ---------------------------------------------------------------------------

/// One FRA sweep in format-independent form.
///
/// Built only through [`SignalRecord::new`], which enforces the pairing and
/// finiteness invariants. The record is immutable afterwards; every later
/// stage derives new values from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRecord {
    metadata: Metadata,
    frequency: Vec<f64>,
    magnitude_db: Vec<f64>,
    phase_deg: Option<Vec<f64>>,
}

impl SignalRecord {
    /// Validate and assemble a record.
    ///
    /// * `magnitude_db` and `phase_deg` (when present) must match `frequency`
    ///   in length → [`Error::DimensionMismatch`]
    /// * at least one sample, all values finite, frequencies `>= 0`
    ///   → [`Error::InvalidSignal`]
    ///
    /// Frequencies need not be sorted.
    pub fn new(
        metadata: Metadata,
        frequency: Vec<f64>,
        magnitude_db: Vec<f64>,
        phase_deg: Option<Vec<f64>>,
    ) -> Result<Self> {
        let n = frequency.len();
        check_len("magnitude_db", n, magnitude_db.len())?;
        if let Some(phase) = &phase_deg {
            check_len("phase_deg", n, phase.len())?;
        }
        if n == 0 {
            return Err(Error::InvalidSignal("record has no samples".into()));
        }

        if let Some((i, f)) = frequency
            .iter()
            .enumerate()
            .find(|(_, f)| !f.is_finite() || **f < 0.0)
        {
            return Err(Error::InvalidSignal(format!(
                "frequency[{i}] = {f} is not a finite non-negative value"
            )));
        }
        check_finite("magnitude_db", &magnitude_db)?;
        if let Some(phase) = &phase_deg {
            check_finite("phase_deg", phase)?;
        }

        Ok(Self {
            metadata,
            frequency,
            magnitude_db,
            phase_deg,
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Frequency axis in Hz, in source order.
    pub fn frequency(&self) -> &[f64] {
        &self.frequency
    }

    /// Magnitude in dB, paired with [`Self::frequency`].
    pub fn magnitude_db(&self) -> &[f64] {
        &self.magnitude_db
    }

    /// Phase in degrees, or `None` when the source format carries no phase.
    pub fn phase_deg(&self) -> Option<&[f64]> {
        self.phase_deg.as_deref()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    /// Always false for a constructed record; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// Descriptive statistics for display.
    pub fn summary(&self) -> SignalSummary {
        let (freq_min, freq_max) = min_max(&self.frequency);
        let (mag_min, mag_max) = min_max(&self.magnitude_db);
        let (mag_mean, mag_std) = mean_std(&self.magnitude_db);
        SignalSummary {
            points: self.len(),
            freq_min,
            freq_max,
            mag_min,
            mag_max,
            mag_mean,
            mag_std,
            has_phase: self.phase_deg.is_some(),
        }
    }
}

fn check_len(field: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::DimensionMismatch {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_finite(field: &str, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(Error::InvalidSignal(format!(
            "{field}[{i}] = {} is not finite",
            values[i]
        ))),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// SignalSummary
// ---------------------------------------------------------------------------

/// Summary table shown by `fra-ingest inspect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalSummary {
    pub points: usize,
    pub freq_min: f64,
    pub freq_max: f64,
    pub mag_min: f64,
    pub mag_max: f64,
    pub mag_mean: f64,
    /// Population standard deviation.
    pub mag_std: f64,
    pub has_phase: bool,
}

pub(crate) fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Mean and population standard deviation; `(0, 0)` for an empty slice.
pub(crate) fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

// ---------------------------------------------------------------------------
// ResampledSignal / PreparedSignal – derived per request, never persisted
// ---------------------------------------------------------------------------

/// Magnitude interpolated onto a fixed-length log-spaced grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResampledSignal {
    /// Log-uniform frequency grid (Hz), ascending.
    pub grid: Vec<f64>,
    /// Magnitude (dB) at each grid point.
    pub magnitude_db: Vec<f64>,
}

impl ResampledSignal {
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }
}

/// Final pipeline output handed to a classifier.
///
/// `vector` has exactly `n_points` entries with zero mean and unit variance
/// (unless the resampled curve was constant, in which case it is all zeros).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedSignal {
    pub metadata: Metadata,
    pub grid: Vec<f64>,
    pub vector: Vec<f64>,
}
