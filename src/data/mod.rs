/// Data layer: format detection, parsing, and the canonical record.
///
/// Architecture:
/// ```text
///  .csv/.tsv/.txt   .xml/.json   .bin/.dat   .parquet
///        │              │            │           │
///        ▼              ▼            ▼           ▼
///   ┌───────────────────────────────────────────────┐
///   │ format   extension → content → FormatKind      │
///   └───────────────────────────────────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  one SignalParser per FormatKind
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SignalRecord  │  metadata, frequency, magnitude_db, phase_deg?
///   └──────────────┘
/// ```

pub mod format;
pub mod loader;
pub mod model;
