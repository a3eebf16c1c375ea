use solar_insights::models::{DEFAULT_METRICS, KNOWN_METRICS, metric_info};
use solar_insights::{Country, SourceConfig};
use std::path::PathBuf;

#[test]
fn source_config_reads_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sources.json");
    std::fs::write(
        &path,
        r#"{
          "data_files": { "Togo": "https://example.org/togo.csv" },
          "data_base_url": "https://example.org/solar/",
          "data_dir": "/srv/solar"
        }"#,
    )
    .unwrap();
    let cfg = SourceConfig::from_json_file(&path).unwrap();
    assert_eq!(cfg.mapped_url(Country::Togo), Some("https://example.org/togo.csv"));
    assert_eq!(cfg.mapped_url(Country::Benin), None);
    assert_eq!(cfg.base_url(), Some("https://example.org/solar"));
    assert_eq!(cfg.local_path(Country::Benin), PathBuf::from("/srv/solar/benin_clean.csv"));
}

#[test]
fn source_config_reports_bad_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sources.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = SourceConfig::from_json_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("parse source config"));
}

#[test]
fn empty_urls_are_ignored() {
    let cfg: SourceConfig =
        serde_json::from_str(r#"{"data_files": {"Benin": " "}, "data_base_url": ""}"#).unwrap();
    assert!(cfg.mapped_url(Country::Benin).is_none());
    assert!(cfg.base_url().is_none());
}

#[test]
fn default_metrics_are_known() {
    for m in DEFAULT_METRICS {
        assert!(metric_info(m).is_some(), "{m}");
    }
    assert_eq!(KNOWN_METRICS.len(), 5);
    assert_eq!(metric_info("WS").unwrap().definition, "Wind Speed");
    assert!(metric_info("GHT").is_none());
}
