//! Loading `TourConfig` from TOML and JSON files.

use std::io::Write;

use waypoint_tour::{ScrollAlign, ScrollBehavior, TourConfig, TourConfigError};

fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

#[test]
fn toml_partial_file_keeps_defaults() {
    let file = write_temp(
        ".toml",
        r#"
card_width = 360.0
gap = 12.0

[scroll]
behavior = "instant"
inline = "nearest"
"#,
    );
    let config = TourConfig::from_file(file.path()).expect("valid config");
    assert_eq!(config.card_width, 360.0);
    assert_eq!(config.gap, 12.0);
    assert_eq!(config.edge_margin, 20.0);
    assert_eq!(config.scroll.behavior, ScrollBehavior::Instant);
    assert_eq!(config.scroll.block, ScrollAlign::Center);
    assert_eq!(config.scroll.inline, ScrollAlign::Nearest);
}

#[test]
fn json_file_selected_by_extension() {
    let file = write_temp(".json", r#"{ "mask_opacity": 0.4, "transition_ms": 150 }"#);
    let config = TourConfig::from_file(file.path()).expect("valid config");
    assert_eq!(config.mask_opacity, 0.4);
    assert_eq!(config.transition_ms, 150);
    assert_eq!(config.card_width, 320.0);
}

#[test]
fn invalid_values_are_rejected_with_every_reason() {
    let file = write_temp(".toml", "mask_opacity = 2.0\ncard_z_index = 40\n");
    match TourConfig::from_file(file.path()) {
        Err(TourConfigError::Validation(errors)) => {
            assert_eq!(errors.len(), 2, "{errors:?}");
            assert!(errors.iter().any(|e| e.contains("mask_opacity")));
            assert!(errors.iter().any(|e| e.contains("card_z_index")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn malformed_toml_reports_parse_error() {
    let file = write_temp(".toml", "card_width = [");
    let err = TourConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, TourConfigError::Toml(_)));
    assert!(err.to_string().starts_with("TOML parse error"));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = TourConfig::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, TourConfigError::Io(_)));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn toml_round_trip_preserves_config() {
    let config = TourConfig::default()
        .card_width(300.0)
        .scroll_behavior(ScrollBehavior::Instant);
    let text = config.to_toml_string().expect("serialize");
    assert_eq!(TourConfig::from_toml_str(&text).expect("reparse"), config);
}
