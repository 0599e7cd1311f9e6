use super::*;

#[test]
fn empty_object_yields_defaults() {
    let cfg = BenchConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, BenchConfig::default());
    assert_eq!(cfg.fractal.workers, 4);
    assert_eq!(cfg.fillrate.max_mpix_per_sec, 3000.0);
    assert_eq!(cfg.fillrate.min_sample_secs, 0.11);
    assert_eq!(cfg.scoring.resolution_baseline, 15_728_640.0);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let cfg =
        BenchConfig::from_json_str(r#"{ "fractal": { "workers": 2 }, "physics": { "duration_secs": 5.0 } }"#)
            .unwrap();
    assert_eq!(cfg.fractal.workers, 2);
    assert_eq!(cfg.fractal.zoom_factor, 0.95);
    assert_eq!(cfg.physics.duration_secs, 5.0);
    assert_eq!(cfg.physics.score_multiplier, 2.5);
}

#[test]
fn invalid_zoom_factor_is_rejected() {
    let err = BenchConfig::from_json_str(r#"{ "fractal": { "zoom_factor": 1.5 } }"#).unwrap_err();
    assert!(err.to_string().contains("zoom_factor"));
}

#[test]
fn malformed_json_is_a_config_error() {
    let err = BenchConfig::from_json_str("{").unwrap_err();
    assert!(err.to_string().contains("config error:"));
}

#[test]
fn zero_workers_uses_available_parallelism() {
    let f = FractalConfig {
        workers: 0,
        ..FractalConfig::default()
    };
    assert!(f.worker_count() >= 1);
}

#[test]
fn config_round_trips_through_json() {
    let cfg = BenchConfig::default();
    let s = serde_json::to_string(&cfg).unwrap();
    assert_eq!(BenchConfig::from_json_str(&s).unwrap(), cfg);
}
