use serde::{Deserialize, Serialize};

/// Window length of the median denoiser.
pub const MEDIAN_WINDOW: usize = 5;

/// Denoising option applied after resampling.
///
/// Parsed leniently from a name: anything other than `"median"` selects
/// [`DenoiseMethod::PassThrough`], because denoising is optional rather than
/// a required transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DenoiseMethod {
    /// Sliding median over [`MEDIAN_WINDOW`] samples.
    #[default]
    Median,
    /// Leave the signal untouched.
    PassThrough,
}

impl DenoiseMethod {
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("median") {
            DenoiseMethod::Median
        } else {
            if !name.trim().eq_ignore_ascii_case("none") {
                log::debug!("unknown denoise method '{name}', passing signal through");
            }
            DenoiseMethod::PassThrough
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DenoiseMethod::Median => "median",
            DenoiseMethod::PassThrough => "none",
        }
    }
}

impl From<String> for DenoiseMethod {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<DenoiseMethod> for String {
    fn from(method: DenoiseMethod) -> Self {
        method.name().to_string()
    }
}

/// Apply `method` to a magnitude curve. Output length equals input length.
pub fn denoise(magnitude_db: &[f64], method: DenoiseMethod) -> Vec<f64> {
    match method {
        DenoiseMethod::Median => median_filter(magnitude_db, MEDIAN_WINDOW),
        DenoiseMethod::PassThrough => magnitude_db.to_vec(),
    }
}

/// Centred sliding median, zero-padded outside the input (scipy `medfilt`).
///
/// Once the input is at least `window / 2 + 1` samples long, no output leaves
/// the input's range and resonance peaks wider than half the window stay in
/// place.
pub fn median_filter(values: &[f64], window: usize) -> Vec<f64> {
    if values.is_empty() || window <= 1 {
        return values.to_vec();
    }
    let half = window / 2;
    let mut buf = Vec::with_capacity(window);

    (0..values.len())
        .map(|i| {
            buf.clear();
            buf.extend((0..window).map(|k| {
                (i + k)
                    .checked_sub(half)
                    .and_then(|j| values.get(j))
                    .copied()
                    .unwrap_or(0.0)
            }));
            buf.sort_by(|a, b| a.total_cmp(b));
            buf[half]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_single_spike() {
        let input = [-10.0, -11.0, -10.0, 40.0, -10.0, -11.0, -10.0];
        let out = denoise(&input, DenoiseMethod::Median);
        assert_eq!(out.len(), input.len());
        assert!(out.iter().all(|v| *v < 0.0));
    }

    #[test]
    fn edges_are_zero_padded() {
        // Window at index 0 is [0, 0, -5, -1, -3] → median -1
        let out = median_filter(&[-5.0, -1.0, -3.0, -4.0, -2.0], 5);
        assert_eq!(out, vec![-1.0, -3.0, -3.0, -2.0, -2.0]);
    }

    #[test]
    fn shorter_than_window() {
        assert_eq!(median_filter(&[3.0], 5), vec![0.0]);
        assert_eq!(median_filter(&[4.0, 2.0, 6.0], 5), vec![2.0, 2.0, 2.0]);
        assert_eq!(median_filter(&[], 5), Vec::<f64>::new());
    }

    #[test]
    fn unknown_method_passes_through() {
        assert_eq!(DenoiseMethod::from_name("savgol"), DenoiseMethod::PassThrough);
        assert_eq!(DenoiseMethod::from_name(" Median "), DenoiseMethod::Median);
        let input = [1.0, 100.0, 1.0];
        assert_eq!(denoise(&input, DenoiseMethod::from_name("wavelet")), input.to_vec());
    }

    #[test]
    fn serde_uses_names() {
        let m: DenoiseMethod = serde_json::from_str("\"bogus\"").unwrap();
        assert_eq!(m, DenoiseMethod::PassThrough);
        assert_eq!(serde_json::to_string(&DenoiseMethod::Median).unwrap(), "\"median\"");
    }
}
