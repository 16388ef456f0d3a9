use serde::{Deserialize, Serialize};

use crate::data::model::ResampledSignal;
use crate::error::{Error, Result};

/// Default grid length expected by downstream models.
pub const DEFAULT_POINTS: usize = 1024;

/// Lower bound for the default `fmin`, so zero-Hz samples cannot break log spacing.
pub const MIN_DEFAULT_FMIN: f64 = 1e-3;

/// What to do with grid points outside the measured frequency range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extrapolation {
    /// Extend the first/last segment linearly. Can produce unphysical edge
    /// values when `fmin`/`fmax` lie far outside the data.
    #[default]
    Linear,
    /// Hold the first/last measured magnitude.
    Clamp,
}

/// Grid resampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResampleOptions {
    pub n_points: usize,
    /// Grid start (Hz). Defaults to `max(min(frequency), 1e-3)`.
    pub fmin: Option<f64>,
    /// Grid end (Hz). Defaults to `max(frequency)`.
    pub fmax: Option<f64>,
    pub extrapolation: Extrapolation,
}

impl Default for ResampleOptions {
    fn default() -> Self {
        Self {
            n_points: DEFAULT_POINTS,
            fmin: None,
            fmax: None,
            extrapolation: Extrapolation::Linear,
        }
    }
}

impl ResampleOptions {
    pub fn with_points(n_points: usize) -> Self {
        Self {
            n_points,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_points == 0 {
            return Err(Error::InvalidConfig("n_points must be at least 1".into()));
        }
        for (name, bound) in [("fmin", self.fmin), ("fmax", self.fmax)] {
            if let Some(v) = bound {
                if !v.is_finite() || v <= 0.0 {
                    return Err(Error::InvalidConfig(format!(
                        "{name} must be a positive finite frequency, got {v}"
                    )));
                }
            }
        }
        if let (Some(lo), Some(hi)) = (self.fmin, self.fmax) {
            if lo > hi {
                return Err(Error::InvalidConfig(format!("fmin {lo} exceeds fmax {hi}")));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Resampling
// ---------------------------------------------------------------------------

/// Interpolate `(frequency, magnitude_db)` onto a log-uniform grid.
///
/// Samples may arrive in any order; they are stably sorted by frequency and
/// repeated frequencies keep their first magnitude. Identical inputs always
/// produce bit-identical output.
pub fn resample(
    frequency: &[f64],
    magnitude_db: &[f64],
    options: &ResampleOptions,
) -> Result<ResampledSignal> {
    if frequency.len() != magnitude_db.len() {
        return Err(Error::DimensionMismatch {
            field: "magnitude_db",
            expected: frequency.len(),
            actual: magnitude_db.len(),
        });
    }
    options.validate()?;

    if frequency.iter().chain(magnitude_db).any(|v| !v.is_finite()) {
        return Err(Error::InvalidSignal("cannot resample non-finite samples".into()));
    }

    let mut points: Vec<(f64, f64)> = frequency
        .iter()
        .copied()
        .zip(magnitude_db.iter().copied())
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    points.dedup_by(|later, earlier| later.0 == earlier.0);

    if points.len() < 2 {
        return Err(Error::InvalidSignal(format!(
            "need at least 2 distinct frequencies to resample, got {}",
            points.len()
        )));
    }

    let (first, last) = (points[0].0, points[points.len() - 1].0);
    if last <= 0.0 {
        return Err(Error::InvalidSignal("no strictly positive frequency".into()));
    }
    let fmin = options.fmin.unwrap_or_else(|| first.max(MIN_DEFAULT_FMIN));
    let fmax = options.fmax.unwrap_or(last);
    if fmin > fmax {
        return Err(Error::InvalidSignal(format!(
            "grid start {fmin} Hz lies above grid end {fmax} Hz"
        )));
    }

    let grid = log_grid(fmin, fmax, options.n_points);
    let magnitude_db = grid
        .iter()
        .map(|&f| interpolate(&points, f, options.extrapolation))
        .collect();

    log::debug!(
        "resampled {} samples onto {} points [{fmin}, {fmax}] Hz",
        points.len(),
        grid.len()
    );
    Ok(ResampledSignal { grid, magnitude_db })
}

/// `n` points spaced uniformly in log10 between `fmin` and `fmax`.
///
/// The endpoints are exactly `fmin` and `fmax`.
pub fn log_grid(fmin: f64, fmax: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![fmin],
        _ => {
            let (lo, hi) = (fmin.log10(), fmax.log10());
            let step = (hi - lo) / (n - 1) as f64;
            (0..n)
                .map(|i| match i {
                    0 => fmin,
                    i if i == n - 1 => fmax,
                    i => 10f64.powf(lo + i as f64 * step),
                })
                .collect()
        }
    }
}

/// Piecewise-linear lookup in sorted, de-duplicated `points`.
fn interpolate(points: &[(f64, f64)], x: f64, policy: Extrapolation) -> f64 {
    let last = points.len() - 1;
    if policy == Extrapolation::Clamp {
        if x <= points[0].0 {
            return points[0].1;
        }
        if x >= points[last].0 {
            return points[last].1;
        }
    }

    // Segment [i, i+1]; edge segments double as extrapolation lines.
    let i = points.partition_point(|p| p.0 <= x).clamp(1, last) - 1;
    let (x0, y0) = points[i];
    let (x1, y1) = points[i + 1];
    let t = (x - x0) / (x1 - x0);
    y0 + t * (y1 - y0)
}
