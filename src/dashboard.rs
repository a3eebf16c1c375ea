//! One render pass of the comparison dashboard.
//!
//! A [`Dashboard`] owns the loader and a per-session [`DatasetCache`]; each
//! call to [`Dashboard::render`] runs load → reconcile → aggregate / compare /
//! rank for the current selection and returns plain data for the front end.

use crate::compare::{TestResult, compare_all};
use crate::config::SourceConfig;
use crate::dataset::Dataset;
use crate::loader::{LoadIssue, Loaded, Loader};
use crate::models::Country;
use crate::ranking::{RegionRanking, rank_regions};
use crate::reconcile::available_metrics;
use crate::stats::{PerformanceRow, StatisticsRow, performance_table, statistics};
use ahash::AHashMap;
use serde::Serialize;
use std::fmt;

/// Loaded datasets keyed by country, owned by the caller for one session.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: AHashMap<Country, Loaded>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached outcome for `country`, loading it on first use.
    pub fn get_or_load(&mut self, loader: &Loader, country: Country) -> &Loaded {
        self.entries.entry(country).or_insert_with(|| loader.load(country))
    }

    pub fn contains(&self, country: Country) -> bool {
        self.entries.contains_key(&country)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached dataset so the next pass reloads.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Everything the front end shows for one selection.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Selected countries that produced a dataset, in selection order.
    pub countries: Vec<Country>,
    /// Requested metrics available in at least one loaded dataset.
    pub metrics: Vec<String>,
    pub statistics: Vec<StatisticsRow>,
    pub performance: Vec<PerformanceRow>,
    pub tests: Vec<TestResult>,
    pub rankings: Vec<RegionRanking>,
    /// Load warnings/errors collected during the pass.
    pub issues: Vec<LoadIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    NoSelection,
    NoData,
    NoMetrics,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::NoSelection => {
                f.write_str("select at least one country and one metric to begin analysis")
            }
            EmptyReason::NoData => {
                f.write_str("no data could be loaded for the selected countries")
            }
            EmptyReason::NoMetrics => {
                f.write_str("none of the selected metrics are available in the data")
            }
        }
    }
}

/// Result of a render pass.
#[derive(Debug, Clone)]
pub enum Render {
    Report(Report),
    NothingToDisplay {
        reason: EmptyReason,
        issues: Vec<LoadIssue>,
    },
}

#[derive(Debug)]
pub struct Dashboard {
    loader: Loader,
    cache: DatasetCache,
}

impl Dashboard {
    pub fn new(config: SourceConfig) -> Self {
        Self::with_loader(Loader::new(config))
    }

    pub fn with_loader(loader: Loader) -> Self {
        Self {
            loader,
            cache: DatasetCache::new(),
        }
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    /// Start a new session: forget every loaded dataset.
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    /// Load (or reuse) the datasets of `countries`, sequentially and in order.
    /// Duplicated countries are loaded once.
    pub fn datasets(&mut self, countries: &[Country]) -> (Vec<&Dataset>, Vec<LoadIssue>) {
        let mut selected: Vec<Country> = Vec::new();
        for &c in countries {
            if !selected.contains(&c) {
                selected.push(c);
            }
        }
        for &c in &selected {
            if self.cache.contains(c) {
                log::debug!("cache hit for {c}");
            }
            self.cache.get_or_load(&self.loader, c);
        }

        let mut datasets = Vec::new();
        let mut issues = Vec::new();
        for c in selected {
            if let Some(loaded) = self.cache.entries.get(&c) {
                issues.extend(loaded.issues.iter().cloned());
                if let Some(ds) = &loaded.dataset {
                    datasets.push(ds);
                }
            }
        }
        (datasets, issues)
    }

    /// Run one full pass for the selection.
    pub fn render<S: AsRef<str>>(&mut self, countries: &[Country], metrics: &[S]) -> Render {
        if countries.is_empty() || metrics.is_empty() {
            return Render::NothingToDisplay {
                reason: EmptyReason::NoSelection,
                issues: Vec::new(),
            };
        }
        let (datasets, issues) = self.datasets(countries);
        if datasets.is_empty() {
            return Render::NothingToDisplay {
                reason: EmptyReason::NoData,
                issues,
            };
        }
        let metrics = available_metrics(metrics, &datasets);
        let Some(first_metric) = metrics.first() else {
            return Render::NothingToDisplay {
                reason: EmptyReason::NoMetrics,
                issues,
            };
        };

        let rankings = datasets
            .iter()
            .map(|ds| rank_regions(ds, first_metric))
            .collect();
        Render::Report(Report {
            countries: datasets.iter().map(|d| d.country()).collect(),
            statistics: statistics(&datasets, &metrics),
            performance: performance_table(&datasets, &metrics),
            tests: compare_all(&datasets, &metrics),
            rankings,
            metrics,
            issues,
        })
    }
}
