use serde::Serialize;

use crate::data::model::Metadata;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Classifier seam
// ---------------------------------------------------------------------------

/// External fault model: fixed-length normalized vector in, label out.
///
/// The pipeline guarantees the vector length (`n_points`) and the
/// zero-mean/unit-variance scaling; it knows nothing about the model behind
/// this trait.
pub trait Classifier {
    fn classify(&self, vector: &[f64]) -> std::result::Result<Prediction, Box<dyn std::error::Error + Send + Sync>>;
}

/// A classifier's answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    /// Probability in `[0, 1]`.
    pub confidence: f64,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Reject empty labels and confidences outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(Error::InvalidPrediction("empty fault label".into()));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(Error::InvalidPrediction(format!(
                "confidence {} outside [0, 1]",
                self.confidence
            )));
        }
        Ok(())
    }
}

/// Prediction plus the maintenance advice that goes with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub metadata: Metadata,
    pub prediction: Prediction,
    pub recommendation: &'static str,
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

const RECOMMENDATIONS: &[(&str, &str)] = &[
    ("normal", "No fault detected. Continue routine FRA testing every 12 months."),
    (
        "healthy transformer",
        "No major fault detected. Continue with routine maintenance schedule.",
    ),
    (
        "axial displacement",
        "Inspect the clamping structure and axial end winding supports.",
    ),
    (
        "radial deformation",
        "Possible radial bulging of windings. Perform internal inspection.",
    ),
    (
        "core grounding",
        "Verify insulation between core laminations and ground path.",
    ),
    (
        "core grounding or shorted turns",
        "Inspect transformer core grounding and perform insulation resistance testing. Possible winding short detected.",
    ),
    (
        "turn-to-turn fault",
        "Severe issue. Immediate isolation and offline diagnostic recommended.",
    ),
    (
        "open circuit",
        "Check for discontinuities in winding connections or broken leads.",
    ),
    (
        "tap changer fault",
        "Inspect OLTC (On Load Tap Changer) contacts for carbonization or wear.",
    ),
    (
        "partial discharge or dielectric fault",
        "Conduct PD testing and DGA to evaluate insulation health.",
    ),
];

const UNKNOWN_RECOMMENDATION: &str =
    "Unrecognised fault category. Refer the measurement for expert review before acting.";

/// Maintenance advice for a fault label (case-insensitive).
pub fn recommendation_for(label: &str) -> &'static str {
    let label = label.trim().to_lowercase();
    RECOMMENDATIONS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, advice)| *advice)
        .unwrap_or(UNKNOWN_RECOMMENDATION)
}
