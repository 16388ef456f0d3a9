/// Preprocessing stages applied to a canonical record, in pipeline order:
///
/// ```text
///   SignalRecord (irregular f, |H| dB)
///        │
///        ▼
///   ┌──────────┐
///   │ resample  │  log-uniform grid, n_points long
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ denoise   │  median(5) or pass-through
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ normalize │  zero mean, unit variance
///   └──────────┘
/// ```
///
/// Each stage is a pure function from slices to a new `Vec`.

pub mod denoise;
pub mod normalize;
pub mod resample;

pub use denoise::{denoise, DenoiseMethod};
pub use normalize::normalize;
pub use resample::{resample, Extrapolation, ResampleOptions};
