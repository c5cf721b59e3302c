use super::defaults::{MAX_HOLD_THRESHOLD_MS, MIN_HOLD_THRESHOLD_MS};
use super::{AppConfig, InteractionTimings, RouterConfig};
use clap::Parser;
use std::fs;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn temp_labels_file(contents: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("sightline_labels_{nanos}.txt"));
    fs::write(&path, contents).expect("write labels");
    path
}

#[test]
fn defaults_validate() {
    let mut cfg = AppConfig::parse_from(["test-app"]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.interaction_timings(), InteractionTimings::default());
    assert_eq!(cfg.router_config(), RouterConfig::default());
}

#[test]
fn rejects_hold_threshold_out_of_bounds() {
    let below = (MIN_HOLD_THRESHOLD_MS - 1).to_string();
    let mut cfg = AppConfig::parse_from(["test-app", "--hold-threshold-ms", &below]);
    assert!(cfg.validate().is_err());

    let above = (MAX_HOLD_THRESHOLD_MS + 1).to_string();
    let mut cfg = AppConfig::parse_from(["test-app", "--hold-threshold-ms", &above]);
    assert!(cfg.validate().is_err());
}

#[test]
fn accepts_hold_threshold_bounds() {
    let min = MIN_HOLD_THRESHOLD_MS.to_string();
    let mut cfg = AppConfig::parse_from(["test-app", "--hold-threshold-ms", &min]);
    assert!(cfg.validate().is_ok());

    let max = MAX_HOLD_THRESHOLD_MS.to_string();
    let mut cfg = AppConfig::parse_from(["test-app", "--hold-threshold-ms", &max]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_zero_pulse_lengths() {
    let mut cfg = AppConfig::parse_from(["test-app", "--general-pulse-ms", "0"]);
    assert!(cfg.validate().is_err());

    let mut cfg = AppConfig::parse_from(["test-app", "--target-pulse-ms", "0"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_non_positive_surface_width() {
    let mut cfg = AppConfig::parse_from(["test-app", "--surface-width", "0"]);
    assert!(cfg.validate().is_err());

    let mut cfg = AppConfig::parse_from(["test-app", "--surface-width=-10"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn zero_confirm_timeout_disables_fallback() {
    let mut cfg = AppConfig::parse_from(["test-app", "--confirm-timeout-ms", "0"]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.interaction_timings().confirm_timeout, None);

    let mut cfg = AppConfig::parse_from(["test-app", "--confirm-timeout-ms", "2500"]);
    assert!(cfg.validate().is_ok());
    assert_eq!(
        cfg.interaction_timings().confirm_timeout,
        Some(Duration::from_millis(2500))
    );
}

#[test]
fn rejects_missing_labels_file() {
    let mut cfg = AppConfig::parse_from([
        "test-app",
        "--labels",
        "/definitely/not/a/labels/file.txt",
    ]);
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("--labels"));
}

#[test]
fn canonicalizes_labels_path() {
    let path = temp_labels_file("person\nchair\n");
    let mut cfg = AppConfig::parse_from(["test-app", "--labels", path.to_str().unwrap()]);
    assert!(cfg.validate().is_ok());
    let stored = cfg.labels_path.clone().expect("labels path");
    assert!(stored.is_absolute());
    let _ = fs::remove_file(path);
}

#[test]
fn rejects_blank_ignore_label() {
    let mut cfg = AppConfig::parse_from(["test-app", "--ignore-label", "   "]);
    assert!(cfg.validate().is_err());
}

#[test]
fn denylist_merges_ignore_labels_without_duplicates() {
    let mut cfg = AppConfig::parse_from([
        "test-app",
        "--ignore-label",
        " toilet ",
        "--ignore-label",
        "Couch",
    ]);
    cfg.validate().expect("valid config");
    let denylist = cfg.label_denylist();
    assert!(denylist.iter().any(|label| label == "dining table"));
    assert!(denylist.iter().any(|label| label == "toilet"));
    assert_eq!(
        denylist
            .iter()
            .filter(|label| label.eq_ignore_ascii_case("couch"))
            .count(),
        1
    );
}

#[test]
fn no_default_denylist_keeps_only_explicit_labels() {
    let mut cfg = AppConfig::parse_from([
        "test-app",
        "--no-default-denylist",
        "--ignore-label",
        "tv",
    ]);
    cfg.validate().expect("valid config");
    assert_eq!(cfg.label_denylist(), vec!["tv".to_string()]);
}
