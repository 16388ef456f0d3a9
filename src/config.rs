use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::signal::{DenoiseMethod, ResampleOptions};

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// All tunables of the ingestion pipeline.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides:
///
/// ```json
/// {
///   "resample": { "n_points": 512, "extrapolation": "clamp" },
///   "denoise": "none",
///   "markup": { "max_depth": 8 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub resample: ResampleOptions,
    pub denoise: DenoiseMethod,
    pub delimited: DelimitedKeys,
    pub markup: MarkupKeys,
}

impl PipelineConfig {
    /// Load a JSON config file and validate it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: PipelineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every run fail or misbehave.
    pub fn validate(&self) -> Result<()> {
        self.resample.validate()?;
        require_keys("delimited.magnitude", &self.delimited.magnitude)?;
        require_keys("markup.frequency", &self.markup.frequency)?;
        require_keys("markup.magnitude", &self.markup.magnitude)?;
        if self.markup.max_depth == 0 {
            return Err(Error::InvalidConfig("markup.max_depth must be at least 1".into()));
        }
        Ok(())
    }
}

fn require_keys(name: &str, keys: &[String]) -> Result<()> {
    if keys.iter().all(|k| k.trim().is_empty()) {
        return Err(Error::InvalidConfig(format!("{name} needs at least one non-empty alias")));
    }
    Ok(())
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Column aliases for delimited text
// ---------------------------------------------------------------------------

/// Header aliases, matched case-insensitively as substrings.
///
/// Order matters: for each role the first alias that matches any column wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelimitedKeys {
    pub frequency: Vec<String>,
    pub magnitude: Vec<String>,
    pub phase: Vec<String>,
    pub real: Vec<String>,
    pub imag: Vec<String>,
    /// Metadata hints; the value comes from the first data row.
    pub metadata: Vec<String>,
}

impl Default for DelimitedKeys {
    fn default() -> Self {
        Self {
            frequency: strings(&["frequency"]),
            magnitude: strings(&["magnitude", "magnitude_db", "mag_db", "mag"]),
            phase: strings(&["phase"]),
            real: strings(&["real"]),
            imag: strings(&["imag"]),
            metadata: strings(&["transformer", "id", "tap", "operator", "date"]),
        }
    }
}

// ---------------------------------------------------------------------------
// Search keys for structured markup
// ---------------------------------------------------------------------------

/// Candidate node names for the breadth-first markup search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupKeys {
    pub frequency: Vec<String>,
    pub magnitude: Vec<String>,
    pub phase: Vec<String>,
    pub metadata: Vec<String>,
    /// Mappings nested deeper than this are not visited.
    pub max_depth: usize,
}

impl Default for MarkupKeys {
    fn default() -> Self {
        Self {
            frequency: strings(&["frequency", "frequencies"]),
            magnitude: strings(&["magnitude", "magnitudelist", "mag"]),
            phase: strings(&["phase", "phaselist"]),
            metadata: strings(&["instrument", "operator", "date", "tap", "transformer"]),
            max_depth: 32,
        }
    }
}
