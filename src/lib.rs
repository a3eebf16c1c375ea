//! solar_insights
//!
//! A lightweight Rust library for loading, summarizing, and statistically comparing
//! per-country solar sensor measurements. Pairs with the `solar` CLI.
//!
//! ### Features
//! - Load cleaned per-country CSV files from remote URLs with a local-file fallback
//! - Reconcile metric column variants (e.g. `GHI` vs `GHT`)
//! - Descriptive statistics (count, mean, std, quartiles, min, max)
//! - Cross-country one-way ANOVA and Kruskal-Wallis tests per metric
//! - Region rankings by average metric value
//!
//! ### Example
//! ```no_run
//! use solar_insights::{Country, Dashboard, Render, SourceConfig};
//!
//! let mut dash = Dashboard::new(SourceConfig::default());
//! let countries = [Country::Benin, Country::Togo];
//! let metrics = ["GHI".to_string(), "DNI".to_string()];
//! match dash.render(&countries, &metrics) {
//!     Render::Report(report) => println!("{:#?}", report.statistics),
//!     Render::NothingToDisplay { reason, .. } => eprintln!("{reason}"),
//! }
//! ```

pub mod compare;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod loader;
pub mod models;
pub mod ranking;
pub mod reconcile;
pub mod stats;
pub mod storage;

pub use config::SourceConfig;
pub use dashboard::{Dashboard, DatasetCache, EmptyReason, Render, Report};
pub use dataset::{Cell, Dataset};
pub use loader::{LoadIssue, Loaded, Loader};
pub use models::{Country, MetricInfo};
