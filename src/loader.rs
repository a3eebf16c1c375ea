//! Synchronous loader for per-country measurement files.
//!
//! Resolution order for a country:
//! 1. the URL explicitly mapped for it in [`SourceConfig::data_files`],
//! 2. otherwise `data_base_url` + `/` + the conventional file name,
//! 3. the local file `<data_dir>/<country>_clean.csv`.
//!
//! Every source is tried once. A failed download is reported as a warning and
//! the local file is tried next; a missing local file ends the attempt with
//! "no data". Neither case is returned as an `Err`: the caller receives the
//! issues alongside the (possibly absent) dataset and decides how to show them.
//!
//! ```no_run
//! # use solar_insights::{Country, Loader, SourceConfig};
//! let loader = Loader::new(SourceConfig::default());
//! let loaded = loader.load(Country::Benin);
//! for issue in &loaded.issues {
//!     eprintln!("{issue}");
//! }
//! ```
use crate::config::SourceConfig;
use crate::dataset::Dataset;
use crate::models::Country;
use anyhow::{Context, Result, bail};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

// Keep file names readable: -, _, . stay unescaped
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Something that went wrong while resolving a country's data.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum LoadIssue {
    /// Remote download failed; the local file was tried instead.
    #[error("could not download `{url}` for {country}: {reason}")]
    SourceUnreachable {
        country: Country,
        url: String,
        reason: String,
    },
    /// No local file at the conventional path.
    #[error("data file not found for {country}: {}", .path.display())]
    DatasetMissing { country: Country, path: PathBuf },
    /// The local file exists but could not be parsed.
    #[error("data file for {country} is unreadable ({}): {reason}", .path.display())]
    LocalUnreadable {
        country: Country,
        path: PathBuf,
        reason: String,
    },
}

impl LoadIssue {
    /// `true` for issues that left the country without data.
    pub fn is_error(&self) -> bool {
        !matches!(self, LoadIssue::SourceUnreachable { .. })
    }
}

/// Outcome of loading one country.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub dataset: Option<Dataset>,
    pub issues: Vec<LoadIssue>,
}

#[derive(Debug, Clone)]
pub struct Loader {
    config: SourceConfig,
    http: HttpClient,
}

impl Loader {
    pub fn new(config: SourceConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("solar_insights/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("reqwest client build");
        Self { config, http }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Remote URL to try for `country`, if any is configured.
    pub fn remote_url(&self, country: Country) -> Option<String> {
        if let Some(url) = self.config.mapped_url(country) {
            return Some(url.to_string());
        }
        let base = self.config.base_url()?;
        let file = percent_encoding::utf8_percent_encode(&country.file_name(), SAFE).to_string();
        Some(format!("{}/{}", base, file))
    }

    fn fetch_remote(&self, country: Country, url: &str) -> Result<Dataset> {
        let resp = self.http.get(url).send().context("request failed")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("HTTP {}", status);
        }
        let is_html = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.to_ascii_lowercase().contains("text/html"));
        let body = resp.bytes().context("read response body")?;
        // Drive and similar hosts answer large files with an HTML interstitial
        if is_html || body.trim_ascii_start().starts_with(b"<") {
            bail!("response is an HTML page, not CSV");
        }
        let ds = Dataset::from_reader(country, &body[..])?;
        if ds.headers().is_empty() {
            bail!("response has no CSV header");
        }
        if ds.row_count() == 0 {
            bail!("response has no data rows");
        }
        Ok(ds)
    }

    /// Load `country`: remote first (when configured), then the local file.
    pub fn load(&self, country: Country) -> Loaded {
        let mut issues = Vec::new();

        if let Some(url) = self.remote_url(country) {
            log::debug!("fetching {country} from {url}");
            match self.fetch_remote(country, &url) {
                Ok(ds) => {
                    log::info!(
                        "loaded {country} from {url} ({} rows, {} columns)",
                        ds.row_count(),
                        ds.headers().len()
                    );
                    return Loaded {
                        dataset: Some(ds),
                        issues,
                    };
                }
                Err(e) => {
                    let issue = LoadIssue::SourceUnreachable {
                        country,
                        url,
                        reason: format!("{:#}", e),
                    };
                    log::warn!("{issue}");
                    issues.push(issue);
                }
            }
        }

        let path = self.config.local_path(country);
        if !path.is_file() {
            let issue = LoadIssue::DatasetMissing { country, path };
            log::error!("{issue}");
            issues.push(issue);
            return Loaded {
                dataset: None,
                issues,
            };
        }
        match Dataset::from_path(country, &path) {
            Ok(ds) => {
                log::info!(
                    "loaded {country} from {} ({} rows, {} columns)",
                    path.display(),
                    ds.row_count(),
                    ds.headers().len()
                );
                Loaded {
                    dataset: Some(ds),
                    issues,
                }
            }
            Err(e) => {
                let issue = LoadIssue::LocalUnreadable {
                    country,
                    path,
                    reason: format!("{:#}", e),
                };
                log::error!("{issue}");
                issues.push(issue);
                Loaded {
                    dataset: None,
                    issues,
                }
            }
        }
    }
}
