use std::fs;
use std::path::{Path, PathBuf};

use fra_ingest::signal::ResampleOptions;
use fra_ingest::{
    load_file, write_archive, Classifier, Error, FormatKind, Metadata, Pipeline, PipelineConfig,
    Prediction, SignalRecord,
};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn float32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn default_load(path: &Path) -> fra_ingest::Result<SignalRecord> {
    load_file(path, None, &PipelineConfig::default())
}

#[test]
fn csv_frequency_magnitude_example() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "sweep.csv", b"Frequency,Magnitude\n10,-1\n100,-3\n1000,-5\n");
    let rec = default_load(&path).unwrap();
    assert_eq!(rec.frequency(), &[10.0, 100.0, 1000.0]);
    assert_eq!(rec.magnitude_db(), &[-1.0, -3.0, -5.0]);
    assert_eq!(rec.phase_deg(), None);
}

#[test]
fn csv_real_imag_example() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "complex.csv", b"real,imag\n1,1\n");
    let rec = default_load(&path).unwrap();
    assert!((rec.magnitude_db()[0] - 20.0 * 2f64.sqrt().log10()).abs() < 1e-9);
    assert!((rec.phase_deg().unwrap()[0] - 45.0).abs() < 1e-9);
}

#[test]
fn csv_without_magnitude_is_missing_data() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "bad.csv", b"Frequency,Temperature\n10,25\n20,26\n");
    assert!(matches!(default_load(&path), Err(Error::MissingData(_))));
}

#[test]
fn binary_interleaved_example() {
    let dir = tempdir().unwrap();
    let bytes = float32_bytes(&[10.0, -1.0, 20.0, -2.0, 30.0, -3.0, 40.0, -4.0]);
    let path = write(dir.path(), "vendor.bin", &bytes);
    let rec = default_load(&path).unwrap();
    assert_eq!(rec.frequency(), &[10.0, 20.0, 30.0, 40.0]);
    assert_eq!(rec.magnitude_db(), &[-1.0, -2.0, -3.0, -4.0]);
}

#[test]
fn unknown_binary_layout_is_fatal() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "vendor.dat", &float32_bytes(&[10.0, -1.0, 20.0]));
    assert!(matches!(default_load(&path), Err(Error::UnknownSchema(_))));
}

#[test]
fn content_detection_without_extension() {
    let dir = tempdir().unwrap();
    let xml = write(
        dir.path(),
        "export_a",
        b"<Sweep><Frequency>1 2 3</Frequency><Magnitude>4 5 6</Magnitude></Sweep>",
    );
    let txt = write(dir.path(), "export_b", b"freq;mag\n1;4\n2;5\n3;6\n");
    let bin = write(
        dir.path(),
        "export_c",
        &float32_bytes(&[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]),
    );
    let a = default_load(&xml).unwrap();
    let b = default_load(&txt).unwrap();
    let c = default_load(&bin).unwrap();
    assert_eq!(a.magnitude_db(), b.magnitude_db());
    assert_eq!(b.magnitude_db(), c.magnitude_db());

    let prose = write(dir.path(), "notes", b"operator forgot the export");
    assert!(matches!(default_load(&prose), Err(Error::UndetectedFormat(_))));
}

#[test]
fn format_hint_overrides_extension() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "sweep.xml", b"frequency\tmagnitude\n1\t2\n3\t4\n");
    let rec = load_file(&path, Some(FormatKind::Delimited(Some(b'\t'))), &PipelineConfig::default()).unwrap();
    assert_eq!(rec.frequency(), &[1.0, 3.0]);
}

#[test]
fn archive_round_trip_preserves_record() {
    let dir = tempdir().unwrap();
    let mut metadata = Metadata::new();
    metadata.insert("transformer".into(), "TX-9".into());
    metadata.insert("date".into(), "2024-05-02".into());
    let original = SignalRecord::new(
        metadata,
        vec![20.0, 200.0, 2000.0],
        vec![-3.5, -12.25, -40.0],
        Some(vec![10.0, -30.0, -85.5]),
    )
    .unwrap();

    let path = dir.path().join("sweep.parquet");
    write_archive(&original, &path).unwrap();
    assert_eq!(default_load(&path).unwrap(), original);

    let no_phase = SignalRecord::new(Metadata::new(), vec![1.0, 2.0], vec![0.5, 0.25], None).unwrap();
    let path = dir.path().join("bare.pq");
    write_archive(&no_phase, &path).unwrap();
    assert_eq!(default_load(&path).unwrap(), no_phase);
}

#[test]
fn pipeline_vector_has_configured_length() {
    let dir = tempdir().unwrap();
    let mut csv = String::from("Frequency (Hz),Magnitude (dB),Phase (deg),Operator\n");
    for i in 0..300 {
        let f = 20.0 * 1.03f64.powi(i);
        csv.push_str(&format!("{f},{},{},Lee\n", -(f.log10() * 7.0), i % 90));
    }
    let path = write(dir.path(), "long.csv", csv.as_bytes());

    let pipeline = Pipeline::new(PipelineConfig {
        resample: ResampleOptions::with_points(256),
        ..PipelineConfig::default()
    });
    let prepared = pipeline.run(&path, None).unwrap();
    assert_eq!(prepared.vector.len(), 256);
    assert_eq!(prepared.grid.len(), 256);
    assert_eq!(prepared.metadata.get("operator").map(String::as_str), Some("Lee"));
    assert!(prepared.vector.iter().all(|v| v.is_finite()));
}

#[test]
fn config_file_drives_pipeline() {
    let dir = tempdir().unwrap();
    let cfg = write(
        dir.path(),
        "pipeline.json",
        br#"{ "resample": { "n_points": 32 }, "denoise": "none",
              "delimited": { "magnitude": ["gain"] } }"#,
    );
    let config = PipelineConfig::from_file(&cfg).unwrap();
    let data = write(dir.path(), "gain.csv", b"frequency,gain\n10,1\n100,2\n1000,3\n");
    let prepared = Pipeline::new(config).run(&data, None).unwrap();
    assert_eq!(prepared.vector.len(), 32);
}

#[test]
fn invalid_config_file_is_rejected() {
    let dir = tempdir().unwrap();
    let cfg = write(dir.path(), "bad.json", br#"{ "resample": { "n_points": 0 } }"#);
    assert!(matches!(PipelineConfig::from_file(&cfg), Err(Error::InvalidConfig(_))));
}

struct FixedClassifier(&'static str, f64);

impl Classifier for FixedClassifier {
    fn classify(&self, vector: &[f64]) -> Result<Prediction, Box<dyn std::error::Error + Send + Sync>> {
        if vector.len() != 1024 {
            return Err(format!("expected 1024 inputs, got {}", vector.len()).into());
        }
        Ok(Prediction::new(self.0, self.1))
    }
}

#[test]
fn analyze_attaches_recommendation() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "sweep.json",
        br#"{"test": {"transformer": "T-1", "frequencies": [10, 100, 1000, 10000],
             "magnitude": [-1, -10, -30, -20]}}"#,
    );
    let pipeline = Pipeline::default();

    let analysis = pipeline
        .analyze(&path, None, &FixedClassifier("Radial Deformation", 0.87))
        .unwrap();
    assert_eq!(analysis.prediction.label, "Radial Deformation");
    assert!(analysis.recommendation.contains("radial bulging"));
    assert_eq!(analysis.metadata.get("transformer").map(String::as_str), Some("T-1"));

    let err = pipeline
        .analyze(&path, None, &FixedClassifier("Normal", 1.5))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPrediction(_)));
}

#[test]
fn classifier_failure_is_wrapped() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "s.csv", b"frequency,magnitude\n10,1\n100,2\n");
    let pipeline = Pipeline::new(PipelineConfig {
        resample: ResampleOptions::with_points(16),
        ..PipelineConfig::default()
    });
    let err = pipeline
        .analyze(&path, None, &FixedClassifier("Normal", 0.9))
        .unwrap_err();
    assert!(matches!(err, Error::Classifier(_)));
}

#[test]
fn parse_errors_propagate_through_pipeline() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "s.xml", b"<a><frequency>1 2</frequency></a>");
    assert!(matches!(Pipeline::default().run(&path, None), Err(Error::Schema(_))));
}
