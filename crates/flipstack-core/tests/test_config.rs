use flipstack_core::grid::CardLayout;
use flipstack_core::pipeline::config::PipelineConfig;
use flipstack_core::FlipstackError;

#[test]
fn default_config_is_valid() {
    let config = PipelineConfig::default();
    config.validate().unwrap();
    assert_eq!(config.sampling.fps, 6.0);
    assert_eq!(config.grid.rows, 3);
    assert_eq!(config.grid.cols, 8);
    assert_eq!(config.merge.candidate_count, 3);
    assert!(config.grid.layout.is_some());
}

#[test]
fn toml_round_trip() {
    let mut config = PipelineConfig::default();
    config.sampling.fps = 4.0;
    config.grid.cols = 6;
    config.grid.layout = Some(CardLayout {
        left: 0.1,
        ..CardLayout::default()
    });
    config.sharpening.strength = 0.0;

    let toml_str = config.to_toml_string().unwrap();
    let parsed = PipelineConfig::from_toml_str(&toml_str).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn partial_toml_fills_defaults() {
    let config = PipelineConfig::from_toml_str(
        r#"
        [sampling]
        fps = 3.0

        [grid]
        rows = 2
        cols = 5
        "#,
    )
    .unwrap();
    assert_eq!(config.sampling.fps, 3.0);
    assert_eq!(config.sampling.analysis_scale, 0.25);
    assert_eq!(config.grid.rows, 2);
    assert_eq!(config.grid.cols, 5);
    assert!(config.grid.layout.is_none());
    assert_eq!(config.thresholds.pixel_delta, 28.0);
}

#[test]
fn empty_toml_is_default() {
    assert_eq!(
        PipelineConfig::from_toml_str("").unwrap(),
        PipelineConfig::default()
    );
}

#[test]
fn invalid_values_are_rejected() {
    let cases = [
        "[sampling]\nfps = 0.0",
        "[sampling]\noutput_scale = -1.0",
        "[sampling]\nbaseline_offset_secs = -0.5",
        "[grid]\nrows = 0\ncols = 8",
        "[merge]\ncandidate_count = 0",
        "[active_range]\nmin_baseline_ratio = 0.9\nmax_baseline_ratio = 0.1",
    ];
    for case in cases {
        assert!(
            matches!(
                PipelineConfig::from_toml_str(case),
                Err(FlipstackError::Config(_))
            ),
            "accepted: {case}"
        );
    }
}

#[test]
fn malformed_toml_is_a_config_error() {
    assert!(matches!(
        PipelineConfig::from_toml_str("[sampling\nfps = 1"),
        Err(FlipstackError::Config(_))
    ));
}

#[test]
fn load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flipstack.toml");
    std::fs::write(&path, "[sharpening]\nstrength = 0.0\n").unwrap();
    let config = PipelineConfig::load(&path).unwrap();
    assert_eq!(config.sharpening.strength, 0.0);

    assert!(PipelineConfig::load(&dir.path().join("missing.toml")).is_err());
}
