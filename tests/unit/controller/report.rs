use super::*;

fn stage(score: i64, cpu: i64, fill: i64, load: f32) -> StageData {
    StageData {
        score,
        cpu_score: cpu,
        fill_rate_score: fill,
        load_time: load,
        ..StageData::default()
    }
}

#[test]
fn aggregate_sums_sub_scores_and_adds_load_time_score() {
    let stages = [
        stage(454, 567, 0, 1.0),
        stage(123, 0, 123, 2.0),
        stage(454, 0, 0, 3.0),
        stage(644, 0, 0, 4.0),
    ];
    let board = Scoreboard::aggregate(&stages, &ScoringConfig::default());
    assert_eq!(board.load_time, 300);
    assert_eq!(board.overall, 454 + 123 + 454 + 644 + 300);
    assert_eq!(board.cpu, 567);
    assert_eq!(board.fill_rate, 123);
}

#[test]
fn load_time_score_truncates_and_guards_zero() {
    assert_eq!(load_time_score(7.0, 3000.0), 428);
    assert_eq!(load_time_score(0.0, 3000.0), 0);
    assert_eq!(load_time_score(-1.0, 3000.0), 0);
    let board = Scoreboard::aggregate(std::iter::empty::<&StageData>(), &ScoringConfig::default());
    assert_eq!(board, Scoreboard::default());
}

#[test]
fn signature_is_salted_sha256_hex() {
    // sha256("abc")
    assert_eq!(
        sign("ab", "c"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_ne!(sign("ab", "c"), sign("ab", "d"));
}

#[test]
fn report_collects_stages_and_missing_features() {
    let mut chess = stage(100, 0, 0, 0.5);
    chess.missing_features = Some("packed_depth_stencil".into());
    let mut physics = stage(200, 0, 0, 0.5);
    physics.missing_features = Some("depth_texture".into());
    let fractal = stage(50, 50, 0, 0.5);
    let report = ScoreReport::build(
        &DeviceInfo::default(),
        Viewport::new(800, 600).unwrap(),
        [("fractal", &fractal), ("chessboard", &chess), ("physics", &physics)],
        Scoreboard::default(),
    );
    assert_eq!(report.stages.len(), 3);
    assert_eq!(report.device.missing_features, "packed_depth_stencil depth_texture");
    assert_eq!(report.device.screen_width, 800);
    assert!(uuid::Uuid::parse_str(&report.submit_id).is_ok());

    let json = report.to_json().unwrap();
    let back: ScoreReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["stages"][0]["name"], "fractal");
    assert_eq!(value["stages"][0]["cpu_score"], 50);
}

#[test]
fn submit_ids_differ_between_reports() {
    let a = ScoreReport::build(
        &DeviceInfo::default(),
        Viewport::new(1, 1).unwrap(),
        Vec::<(&str, &StageData)>::new(),
        Scoreboard::default(),
    );
    let b = ScoreReport::build(
        &DeviceInfo::default(),
        Viewport::new(1, 1).unwrap(),
        Vec::<(&str, &StageData)>::new(),
        Scoreboard::default(),
    );
    assert_ne!(a.submit_id, b.submit_id);
}

#[test]
fn response_builds_view_url() {
    let resp = SubmitResponse::parse(r#"{"score_uuid":"u-1","nonce":"n2"}"#).unwrap();
    assert_eq!(
        resp.view_url("http://localhost:8000/view_score?c=m&uuid="),
        "http://localhost:8000/view_score?c=m&uuid=u-1&nonce=n2"
    );
    let err = SubmitResponse::parse("<html>").unwrap_err();
    assert!(err.to_string().starts_with("report error:"));
}
