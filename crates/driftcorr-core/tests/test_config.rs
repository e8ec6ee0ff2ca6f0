use std::path::PathBuf;

use driftcorr_core::error::DriftError;
use driftcorr_core::pipeline::config::{
    AlignConfig, FrameRange, Interpolation, RegistrationConfig, RegistrationMethod,
};
use driftcorr_core::pipeline::{PipelineStage, PipelineState};

#[test]
fn test_registration_method_display() {
    assert_eq!(format!("{}", RegistrationMethod::PhaseCorrelation), "Phase Correlation");
    assert_eq!(format!("{}", RegistrationMethod::CrossCorrelation), "Cross Correlation");
}

#[test]
fn test_registration_defaults() {
    let config = RegistrationConfig::default();
    assert_eq!(config.method, RegistrationMethod::CrossCorrelation);
    assert_eq!(config.interpolation, Interpolation::Linear);
}

#[test]
fn test_interpolation_display() {
    assert_eq!(format!("{}", Interpolation::Linear), "Linear");
    assert_eq!(format!("{}", Interpolation::Nearest), "Nearest");
}

#[test]
fn test_stage_and_state_display() {
    assert_eq!(format!("{}", PipelineStage::Alignment), "Aligning frames");
    assert_eq!(format!("{}", PipelineState::Failed), "Failed");
    assert!(PipelineState::Done.is_terminal());
    assert!(!PipelineState::Aligning.is_terminal());
}

#[test]
fn test_frame_range_defaults() {
    let range = FrameRange::default();
    assert_eq!((range.min, range.max), (0, 9999));
}

#[test]
fn test_frame_range_resolve() {
    assert_eq!(FrameRange::default().resolve(25).unwrap(), 0..25);
    assert_eq!(FrameRange::new(3, 5).resolve(25).unwrap(), 3..6);
    assert_eq!(FrameRange::new(3, 100).resolve(10).unwrap(), 3..10);
    assert_eq!(FrameRange::all().resolve(4).unwrap(), 0..4);
    assert!(matches!(FrameRange::new(5, 3).resolve(10), Err(DriftError::EmptySequence)));
    assert!(matches!(FrameRange::new(0, 10).resolve(0), Err(DriftError::EmptySequence)));
}

#[test]
fn test_frame_range_clamp_warning_only_for_explicit_max() {
    assert!(!FrameRange::default().clamps_explicit_max(60));
    assert!(!FrameRange::all().clamps_explicit_max(60));
    assert!(!FrameRange::new(0, 59).clamps_explicit_max(60));
    assert!(FrameRange::new(0, 60).clamps_explicit_max(60));
    assert!(FrameRange::new(5, 500).clamps_explicit_max(60));
}

#[test]
fn test_minimal_toml_uses_defaults() {
    let config: AlignConfig = toml::from_str(r#"input = "frames""#).unwrap();
    assert_eq!(config.input, PathBuf::from("frames"));
    assert!(config.output.is_none());
    assert!(config.report.is_none());
    assert_eq!(config.range, FrameRange::default());
    assert_eq!(config.registration.method, RegistrationMethod::CrossCorrelation);
}

#[test]
fn test_full_toml() {
    let text = r#"
        input = "capture.ser"
        output = "aligned.ser"

        [range]
        min = 10
        max = 40

        [registration]
        method = "PhaseCorrelation"
        interpolation = "Nearest"

        [report]
        dir = "shifts"
    "#;
    let config: AlignConfig = toml::from_str(text).unwrap();
    assert_eq!(config.output, Some(PathBuf::from("aligned.ser")));
    assert_eq!(config.range, FrameRange::new(10, 40));
    assert_eq!(config.registration.method, RegistrationMethod::PhaseCorrelation);
    assert_eq!(config.registration.interpolation, Interpolation::Nearest);
    let report = config.report.unwrap();
    assert_eq!(report.dir, PathBuf::from("shifts"));
    assert!(report.plot);
}

#[test]
fn test_config_serializes_back() {
    let config = AlignConfig::new("frames");
    let text = toml::to_string_pretty(&config).unwrap();
    let parsed: AlignConfig = toml::from_str(&text).unwrap();
    assert_eq!(parsed.input, config.input);
    assert_eq!(parsed.range, config.range);
}
