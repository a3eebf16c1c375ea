//! Rank the regions of one country's dataset by the average of a metric.

use crate::dataset::Dataset;
use crate::models::Country;
use crate::reconcile::{is_available, resolve_column};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Substrings (case-insensitive) that mark a region-like column.
pub const REGION_KEYWORDS: [&str; 4] = ["region", "location", "site", "station"];

/// Maximum number of regions kept in a ranking.
pub const TOP_REGIONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    pub region: String,
    pub average: f64,
}

/// Why no ranking could be built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaceholderReason {
    NoRegionColumn,
    NoMetricColumn { metric: String },
    NoGroupedValues { region_column: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegionRanking {
    Ranked {
        country: Country,
        region_column: String,
        metric: String,
        rows: Vec<RankingRow>,
    },
    /// Stand-in table shown instead of a ranking.
    Placeholder {
        country: Country,
        reason: PlaceholderReason,
    },
}

impl RegionRanking {
    /// Ranked rows; empty for a placeholder.
    pub fn rows(&self) -> &[RankingRow] {
        match self {
            RegionRanking::Ranked { rows, .. } => rows,
            RegionRanking::Placeholder { .. } => &[],
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, RegionRanking::Placeholder { .. })
    }
}

impl fmt::Display for PlaceholderReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceholderReason::NoRegionColumn => write!(
                f,
                "no region-like column ({})",
                REGION_KEYWORDS.join(", ")
            ),
            PlaceholderReason::NoMetricColumn { metric } => {
                write!(f, "no usable `{}` column", metric)
            }
            PlaceholderReason::NoGroupedValues { region_column } => {
                write!(f, "no `{}` group has a metric value", region_column)
            }
        }
    }
}

/// First column (in dataset order) whose name contains a region keyword.
pub fn detect_region_column(dataset: &Dataset) -> Option<&str> {
    dataset
        .headers()
        .iter()
        .find(|h| {
            let lower = h.to_lowercase();
            REGION_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .map(String::as_str)
}

/// Group rows by the detected region column and rank groups by the mean of
/// `metric`, highest first. Equal means keep first-encountered order; at most
/// [`TOP_REGIONS`] rows are returned. Missing prerequisites yield a
/// placeholder instead of an error.
pub fn rank_regions(dataset: &Dataset, metric: &str) -> RegionRanking {
    let country = dataset.country();
    let placeholder = |reason| RegionRanking::Placeholder { country, reason };

    let Some(region_column) = detect_region_column(dataset) else {
        return placeholder(PlaceholderReason::NoRegionColumn);
    };
    let metric_column = match resolve_column(dataset, metric) {
        Some(c) if is_available(dataset, metric) => c,
        _ => {
            return placeholder(PlaceholderReason::NoMetricColumn {
                metric: metric.to_string(),
            });
        }
    };
    let (Some(regions), Some(values)) =
        (dataset.column(region_column), dataset.column(metric_column))
    else {
        return placeholder(PlaceholderReason::NoRegionColumn);
    };

    // (label, sum, count) in first-seen order
    let mut groups: Vec<(String, f64, usize)> = Vec::new();
    let mut index: AHashMap<String, usize> = AHashMap::new();
    for (region, value) in regions.iter().zip(values) {
        let (Some(label), Some(v)) = (region.label(), value.as_number()) else {
            continue;
        };
        let i = *index.entry(label.clone()).or_insert_with(|| {
            groups.push((label, 0.0, 0));
            groups.len() - 1
        });
        groups[i].1 += v;
        groups[i].2 += 1;
    }
    if groups.is_empty() {
        return placeholder(PlaceholderReason::NoGroupedValues {
            region_column: region_column.to_string(),
        });
    }

    let mut rows: Vec<RankingRow> = groups
        .into_iter()
        .map(|(region, sum, n)| RankingRow {
            region,
            average: sum / n as f64,
        })
        .collect();
    // sort_by is stable
    rows.sort_by(|a, b| b.average.total_cmp(&a.average));
    rows.truncate(TOP_REGIONS);

    RegionRanking::Ranked {
        country,
        region_column: region_column.to_string(),
        metric: metric.to_string(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Cell;

    fn text(v: &[&str]) -> Vec<Cell> {
        v.iter().map(|s| Cell::parse(s)).collect()
    }

    #[test]
    fn detects_first_region_like_column() {
        let ds = Dataset::from_columns(
            Country::Benin,
            vec![
                ("GHI".into(), text(&["1"])),
                ("Station_ID".into(), text(&["a"])),
                ("Region".into(), text(&["b"])),
            ],
        );
        assert_eq!(detect_region_column(&ds), Some("Station_ID"));
    }

    #[test]
    fn ranks_descending_with_stable_ties() {
        let ds = Dataset::from_columns(
            Country::Togo,
            vec![
                ("Location".into(), text(&["west", "east", "north", "west", "east", "south"])),
                ("GHI".into(), text(&["10", "5", "30", "", "15", "abc"])),
            ],
        );
        let ranking = rank_regions(&ds, "GHI");
        let got: Vec<(&str, f64)> = ranking
            .rows()
            .iter()
            .map(|r| (r.region.as_str(), r.average))
            .collect();
        // west = 10, east = 10 (tie, west seen first), north = 30, south has no value
        assert_eq!(got, vec![("north", 30.0), ("west", 10.0), ("east", 10.0)]);
    }

    #[test]
    fn keeps_top_ten() {
        let labels: Vec<String> = (0..15).map(|i| format!("r{i}")).collect();
        let values: Vec<String> = (0..15).map(|i| i.to_string()).collect();
        let ds = Dataset::from_columns(
            Country::Benin,
            vec![
                ("site".into(), labels.iter().map(|s| Cell::parse(s)).collect()),
                ("GHT".into(), values.iter().map(|s| Cell::parse(s)).collect()),
            ],
        );
        let ranking = rank_regions(&ds, "GHI");
        assert_eq!(ranking.rows().len(), TOP_REGIONS);
        assert_eq!(ranking.rows()[0].region, "r14");
    }

    #[test]
    fn placeholders_instead_of_errors() {
        let no_region = Dataset::from_columns(Country::Benin, vec![("GHI".into(), text(&["1"]))]);
        assert_eq!(
            rank_regions(&no_region, "GHI"),
            RegionRanking::Placeholder {
                country: Country::Benin,
                reason: PlaceholderReason::NoRegionColumn
            }
        );
        let no_metric = Dataset::from_columns(
            Country::Benin,
            vec![("Region".into(), text(&["a"])), ("DNI".into(), text(&[""]))],
        );
        let r = rank_regions(&no_metric, "DNI");
        assert!(r.is_placeholder());
        assert!(r.rows().is_empty());
    }
}
