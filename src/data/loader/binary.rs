use super::SignalParser;
use crate::data::model::{Metadata, SignalRecord};
use crate::error::{Error, Result};

/// Fallback for undocumented vendor binaries.
///
/// Assumes the whole payload is little-endian `f32` pairs:
/// `[freq0, mag0, freq1, mag1, …]`. That layout is a placeholder, not a
/// vendor contract; anything that does not fit is reported as
/// [`Error::UnknownSchema`] instead of being guessed at further.
pub struct BinaryParser;

/// Fewest float32 values the heuristic accepts (two frequency/magnitude pairs).
pub const MIN_VALUES: usize = 4;

impl SignalParser for BinaryParser {
    fn parse(&self, source: &[u8]) -> Result<SignalRecord> {
        if source.len() % 4 != 0 {
            return Err(Error::UnknownSchema(format!(
                "{} bytes is not a whole number of float32 values",
                source.len()
            )));
        }

        let values: Vec<f64> = source
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64)
            .collect();

        if values.len() < MIN_VALUES || values.len() % 2 != 0 {
            return Err(Error::UnknownSchema(format!(
                "{} float32 values cannot be interleaved frequency/magnitude pairs",
                values.len()
            )));
        }

        let frequency = values.iter().step_by(2).copied().collect();
        let magnitude_db = values.iter().skip(1).step_by(2).copied().collect();

        SignalRecord::new(Metadata::new(), frequency, magnitude_db, None)
            .map_err(|e| Error::UnknownSchema(format!("interleaved float32 layout rejected: {e}")))
    }
}
