use fra_ingest::data::loader::complex_to_polar;
use fra_ingest::signal::{denoise, normalize, resample, DenoiseMethod, Extrapolation, ResampleOptions};
use fra_ingest::{Metadata, SignalRecord};
use proptest::prelude::*;

/// Strictly increasing positive frequencies with paired magnitudes.
fn sweep() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    prop::collection::vec((0.01f64..50.0, -80.0f64..20.0), 2..120).prop_map(|steps| -> (Vec<f64>, Vec<f64>) {
        let mut f = 1.0;
        steps
            .into_iter()
            .map(|(step, mag)| {
                f += step;
                (f, mag)
            })
            .unzip()
    })
}

fn mean_std(v: &[f64]) -> (f64, f64) {
    let n = v.len() as f64;
    let mean = v.iter().sum::<f64>() / n;
    let var = v.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

proptest! {
    #[test]
    fn record_lengths_always_pair(
        values in prop::collection::vec((0.0f64..1e6, -100.0f64..100.0, -180.0f64..180.0), 1..64)
    ) {
        let freq: Vec<f64> = values.iter().map(|v| v.0).collect();
        let mag: Vec<f64> = values.iter().map(|v| v.1).collect();
        let phase: Vec<f64> = values.iter().map(|v| v.2).collect();
        let rec = SignalRecord::new(Metadata::new(), freq, mag, Some(phase)).unwrap();
        prop_assert_eq!(rec.frequency().len(), rec.magnitude_db().len());
        prop_assert_eq!(rec.frequency().len(), rec.phase_deg().unwrap().len());
    }

    #[test]
    fn normalize_standardises_non_constant_vectors(
        v in prop::collection::vec(-1e3f64..1e3, 2..500)
    ) {
        let (_, std) = mean_std(&v);
        prop_assume!(std > 1e-3);
        let out = normalize(&v);
        let (mean, std) = mean_std(&out);
        prop_assert!(mean.abs() < 1e-9);
        prop_assert!((std - 1.0).abs() < 1e-6);
    }

    #[test]
    fn median_keeps_length(v in prop::collection::vec(-1e3f64..1e3, 0..300)) {
        prop_assert_eq!(denoise(&v, DenoiseMethod::Median).len(), v.len());
    }

    #[test]
    fn median_stays_within_input_range(v in prop::collection::vec(-1e3f64..1e3, 3..300)) {
        let out = denoise(&v, DenoiseMethod::Median);
        let lo = v.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = v.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(out.iter().all(|x| *x >= lo && *x <= hi));
    }

    #[test]
    fn resampling_the_grid_is_near_identity((f, m) in sweep(), n in 2usize..300) {
        let opts = ResampleOptions::with_points(n);
        let first = resample(&f, &m, &opts).unwrap();
        let second = resample(&first.grid, &first.magnitude_db, &opts).unwrap();
        prop_assert_eq!(&first.grid, &second.grid);
        for (a, b) in first.magnitude_db.iter().zip(&second.magnitude_db) {
            prop_assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn resampling_is_deterministic((f, m) in sweep(), n in 1usize..200) {
        let opts = ResampleOptions::with_points(n);
        prop_assert_eq!(resample(&f, &m, &opts).unwrap(), resample(&f, &m, &opts).unwrap());
    }

    #[test]
    fn grid_is_log_uniform((f, m) in sweep(), n in 3usize..200) {
        let out = resample(&f, &m, &ResampleOptions::with_points(n)).unwrap();
        let ratio = out.grid[1] / out.grid[0];
        for pair in out.grid.windows(2) {
            prop_assert!((pair[1] / pair[0] - ratio).abs() < 1e-9 * ratio.max(1.0));
        }
    }

    #[test]
    fn clamp_never_leaves_measured_range(
        (f, m) in sweep(),
        below in 0.001f64..1.0,
        above in 1.0f64..100.0,
    ) {
        let opts = ResampleOptions {
            n_points: 64,
            fmin: Some(below),
            fmax: Some(f[f.len() - 1] * above),
            extrapolation: Extrapolation::Clamp,
        };
        let out = resample(&f, &m, &opts).unwrap();
        let lo = m.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = m.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(out.magnitude_db.iter().all(|x| *x >= lo - 1e-9 && *x <= hi + 1e-9));
    }

    #[test]
    fn polar_conversion_matches_definition(re in -1e3f64..1e3, im in -1e3f64..1e3) {
        let (mag, phase) = complex_to_polar(re, im);
        let expected = 20.0 * ((re * re + im * im).sqrt() + 1e-12).log10();
        prop_assert!((mag - expected).abs() < 1e-9);
        prop_assert!((-180.0..=180.0).contains(&phase));
    }
}
