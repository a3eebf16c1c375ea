use crate::models::Country;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default download locations of the cleaned country files.
const DEFAULT_DATA_FILES: [(&str, &str); 3] = [
    (
        "Benin",
        "https://drive.google.com/uc?export=download&id=11yvYlYcIDuCSBot7buK-Xn568eH4ZrkP",
    ),
    (
        "Togo",
        "https://drive.google.com/uc?export=download&id=1RdQu-1O1Ar3D5_Ce02GSbfQ3LaaoI0iB",
    ),
    (
        "Sierra Leone",
        "https://drive.google.com/uc?export=download&id=1mnsM0smG7mBZNuNOe_exxTtgIgYSdGHx",
    ),
];

/// Where country datasets come from.
///
/// Deserializable from JSON, e.g.
/// ```json
/// { "data_files": { "Benin": "https://example.org/benin.csv" },
///   "data_base_url": "https://example.org/solar/",
///   "data_dir": "data" }
/// ```
/// Missing keys fall back to [`SourceConfig::default`]. A supplied
/// `data_files` map replaces the default map entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Explicit download URL per country display name.
    pub data_files: BTreeMap<String, String>,
    /// Base URL joined with the conventional file name for unmapped countries.
    pub data_base_url: Option<String>,
    /// Directory holding local `<country>_clean.csv` files.
    pub data_dir: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            data_files: DEFAULT_DATA_FILES
                .iter()
                .map(|(c, u)| (c.to_string(), u.to_string()))
                .collect(),
            data_base_url: None,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl SourceConfig {
    /// Local files only: no remote map and no base URL.
    pub fn local<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_files: BTreeMap::new(),
            data_base_url: None,
            data_dir: data_dir.into(),
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let txt = std::fs::read_to_string(path)
            .with_context(|| format!("read source config {}", path.display()))?;
        serde_json::from_str(&txt)
            .with_context(|| format!("parse source config {}", path.display()))
    }

    /// Explicitly mapped URL for a country (exact display name).
    pub fn mapped_url(&self, country: Country) -> Option<&str> {
        self.data_files
            .get(country.name())
            .map(String::as_str)
            .filter(|u| !u.trim().is_empty())
    }

    /// Base URL without trailing slashes, if set and non-empty.
    pub fn base_url(&self) -> Option<&str> {
        self.data_base_url
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/'))
            .filter(|u| !u.is_empty())
    }

    pub fn local_path(&self, country: Country) -> PathBuf {
        self.data_dir.join(country.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_map_every_country() {
        let cfg = SourceConfig::default();
        for c in Country::ALL {
            assert!(cfg.mapped_url(c).unwrap().starts_with("https://drive.google.com/"));
        }
        assert_eq!(
            cfg.local_path(Country::SierraLeone),
            PathBuf::from("data/sierra_leone_clean.csv")
        );
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg: SourceConfig = serde_json::from_str(
            r#"{"data_files": {}, "data_base_url": "https://x.org/d//"}"#,
        )
        .unwrap();
        assert!(cfg.mapped_url(Country::Benin).is_none());
        assert_eq!(cfg.base_url(), Some("https://x.org/d"));
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
    }
}
