use csv::StringRecord;

use super::SignalParser;
use crate::config::DelimitedKeys;
use crate::data::format::sniff_delimiter;
use crate::data::model::{Metadata, SignalRecord};
use crate::error::{Error, Result};

/// Guards `log10` when a complex sample is exactly zero.
pub const LOG_EPSILON: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Delimited-text parser
// ---------------------------------------------------------------------------

/// Header row + one sample per line.
///
/// Columns are located by case-insensitive substring match against the
/// aliases in [`DelimitedKeys`]:
/// * frequency: falls back to the first column when nothing matches
/// * magnitude (dB), or failing that a `real`/`imag` pair
/// * phase (deg), optional
pub struct DelimitedParser<'a> {
    keys: &'a DelimitedKeys,
    delimiter: Option<u8>,
}

impl<'a> DelimitedParser<'a> {
    pub fn new(keys: &'a DelimitedKeys, delimiter: Option<u8>) -> Self {
        Self { keys, delimiter }
    }
}

impl SignalParser for DelimitedParser<'_> {
    fn parse(&self, source: &[u8]) -> Result<SignalRecord> {
        let delimiter = self.delimiter.unwrap_or_else(|| sniff_delimiter(source));
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(source);

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let lower: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
        let rows: Vec<StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;

        if headers.is_empty() || rows.is_empty() {
            return Err(Error::MissingData("delimited input has no header or no data rows".into()));
        }

        let real_idx = find_column(&lower, &self.keys.real, &[]);
        let imag_idx = find_column(&lower, &self.keys.imag, &[]);

        let freq_idx = find_column(&lower, &self.keys.frequency, &[]).unwrap_or_else(|| {
            log::warn!(
                "no column matches {:?}; assuming first column '{}' is frequency",
                self.keys.frequency,
                headers[0]
            );
            0
        });

        // `imag` contains `mag`, so columns claimed by the complex pair are off limits.
        let claimed: Vec<usize> = [Some(freq_idx), real_idx, imag_idx].into_iter().flatten().collect();
        let mag_idx = find_column(&lower, &self.keys.magnitude, &claimed);

        let frequency = numeric_column(&rows, freq_idx, &headers[freq_idx])?;

        let (magnitude_db, phase_deg) = match (mag_idx, real_idx, imag_idx) {
            (Some(m), _, _) => {
                let magnitude = numeric_column(&rows, m, &headers[m])?;
                let phase = find_column(&lower, &self.keys.phase, &[])
                    .map(|p| numeric_column(&rows, p, &headers[p]))
                    .transpose()?;
                (magnitude, phase)
            }
            (None, Some(re), Some(im)) => {
                log::debug!("deriving magnitude/phase from '{}' + '{}'", headers[re], headers[im]);
                let real = numeric_column(&rows, re, &headers[re])?;
                let imag = numeric_column(&rows, im, &headers[im])?;
                let (magnitude, phase): (Vec<f64>, Vec<f64>) = real
                    .iter()
                    .zip(&imag)
                    .map(|(&r, &i)| complex_to_polar(r, i))
                    .unzip();
                (magnitude, Some(phase))
            }
            _ => {
                return Err(Error::MissingData(format!(
                    "no magnitude column (tried {:?}) and no real/imag pair in header {:?}",
                    self.keys.magnitude, headers
                )))
            }
        };

        let metadata = extract_metadata(&lower, &rows[0], &self.keys.metadata);
        SignalRecord::new(metadata, frequency, magnitude_db, phase_deg)
    }
}

/// `(20·log10(|z| + ε), arg(z)°)` for `z = re + i·im`.
pub fn complex_to_polar(re: f64, im: f64) -> (f64, f64) {
    let magnitude = 20.0 * (re.hypot(im) + LOG_EPSILON).log10();
    (magnitude, im.atan2(re).to_degrees())
}

/// First column whose lowercase name contains an alias, trying aliases in order.
fn find_column(lower_headers: &[String], aliases: &[String], exclude: &[usize]) -> Option<usize> {
    aliases
        .iter()
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .find_map(|alias| {
            lower_headers
                .iter()
                .enumerate()
                .find(|(i, h)| !exclude.contains(i) && h.contains(&alias))
                .map(|(i, _)| i)
        })
}

fn numeric_column(rows: &[StringRecord], idx: usize, name: &str) -> Result<Vec<f64>> {
    rows.iter()
        .enumerate()
        .map(|(row, record)| {
            let cell = record.get(idx).unwrap_or("");
            cell.parse::<f64>().map_err(|_| Error::InvalidNumber {
                row: row + 1,
                column: name.to_string(),
                value: cell.to_string(),
            })
        })
        .collect()
}

/// First-row value of the first column containing each hint key.
fn extract_metadata(lower_headers: &[String], first_row: &StringRecord, hints: &[String]) -> Metadata {
    let mut metadata = Metadata::new();
    for hint in hints {
        let key = hint.to_lowercase();
        if let Some(value) = lower_headers
            .iter()
            .position(|h| h.contains(&key))
            .and_then(|i| first_row.get(i))
        {
            metadata.insert(hint.clone(), value.to_string());
        }
    }
    metadata
}
