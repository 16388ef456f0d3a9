use crate::data::model::mean_std;

/// Added to the standard deviation so constant signals map to zeros instead of NaN.
pub const NORMALIZE_EPSILON: f64 = 1e-12;

/// Z-score a vector: `(v - mean) / (std + ε)` with the population std.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let (mean, std) = mean_std(values);
    let scale = std + NORMALIZE_EPSILON;
    values.iter().map(|v| (v - mean) / scale).collect()
}
