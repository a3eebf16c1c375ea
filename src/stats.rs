use crate::dataset::Dataset;
use crate::models::Country;
use crate::reconcile::country_sample;
use serde::{Deserialize, Serialize};

/// Descriptive statistics for one (metric, country) sample.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatisticsRow {
    pub metric: String,
    pub country: Country,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` for a single observation.
    pub std: Option<f64>,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

/// Column headers matching [`StatisticsRow::display_cells`].
pub const STATISTICS_HEADERS: [&str; 9] =
    ["Country", "count", "mean", "std", "min", "25%", "50%", "75%", "max"];

impl StatisticsRow {
    /// Display cells rounded to two decimals (`NA` for undefined std).
    pub fn display_cells(&self) -> [String; 9] {
        [
            self.country.to_string(),
            self.count.to_string(),
            fmt2(self.mean),
            self.std.map(fmt2).unwrap_or_else(|| "NA".to_string()),
            fmt2(self.min),
            fmt2(self.p25),
            fmt2(self.p50),
            fmt2(self.p75),
            fmt2(self.max),
        ]
    }
}

/// Format a value with two decimals, the display precision of every derived statistic.
pub fn fmt2(v: f64) -> String {
    format!("{:.2}", v)
}

/// Summary of a non-empty sample (full precision).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Description {
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

/// Describe a sample; `None` when it is empty.
pub fn describe(values: &[f64]) -> Option<Description> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let ss: f64 = sorted.iter().map(|x| (x - mean).powi(2)).sum();
        Some((ss / (count - 1) as f64).sqrt())
    } else {
        None
    };
    Some(Description {
        count,
        mean,
        std,
        min: sorted[0],
        p25: percentile(&sorted, 25.0),
        p50: percentile(&sorted, 50.0),
        p75: percentile(&sorted, 75.0),
        max: sorted[count - 1],
    })
}

/// Percentile `q` (0..=100) of an ascending, non-empty slice using linear
/// interpolation between closest ranks.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = (q / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Statistics rows, grouped by metric (given order) then country (dataset order).
/// Pairs without any usable value produce no row.
pub fn statistics<S: AsRef<str>>(datasets: &[&Dataset], metrics: &[S]) -> Vec<StatisticsRow> {
    let mut out = Vec::new();
    for metric in metrics.iter().map(|m| m.as_ref()) {
        for ds in datasets {
            let Some(d) = country_sample(ds, metric).as_deref().and_then(describe) else {
                continue;
            };
            out.push(StatisticsRow {
                metric: metric.to_string(),
                country: ds.country(),
                count: d.count,
                mean: d.mean,
                std: d.std,
                min: d.min,
                p25: d.p25,
                p50: d.p50,
                p75: d.p75,
                max: d.max,
            });
        }
    }
    out
}

/// Mean and maximum of one metric for a country.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricPeak {
    pub metric: String,
    pub mean: f64,
    pub max: f64,
}

/// One line of the performance table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceRow {
    pub country: Country,
    pub metrics: Vec<MetricPeak>,
}

/// Per-country mean/max for each available metric. Countries without any
/// usable metric are left out.
pub fn performance_table<S: AsRef<str>>(
    datasets: &[&Dataset],
    metrics: &[S],
) -> Vec<PerformanceRow> {
    datasets
        .iter()
        .filter_map(|ds| {
            let peaks: Vec<MetricPeak> = metrics
                .iter()
                .filter_map(|m| {
                    let d = describe(&country_sample(ds, m.as_ref())?)?;
                    Some(MetricPeak {
                        metric: m.as_ref().to_string(),
                        mean: d.mean,
                        max: d.max,
                    })
                })
                .collect();
            if peaks.is_empty() {
                None
            } else {
                Some(PerformanceRow {
                    country: ds.country(),
                    metrics: peaks,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn percentile_interpolates_between_ranks() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(percentile(&v, 25.0), 1.75);
        assert_relative_eq!(percentile(&v, 50.0), 2.5);
        assert_relative_eq!(percentile(&v, 75.0), 3.25);
        assert_relative_eq!(percentile(&[7.0], 75.0), 7.0);
    }

    #[test]
    fn describe_uses_sample_std() {
        let d = describe(&[300.0, 100.0, 200.0]).unwrap();
        assert_eq!(d.count, 3);
        assert_relative_eq!(d.mean, 200.0);
        assert_relative_eq!(d.std.unwrap(), 100.0);
        assert_eq!(d.min, 100.0);
        assert_eq!(d.max, 300.0);
        assert_relative_eq!(d.p25, 150.0);
        assert!(describe(&[]).is_none());
        assert!(describe(&[5.0]).unwrap().std.is_none());
    }

    #[test]
    fn display_rounds_to_two_decimals() {
        let row = StatisticsRow {
            metric: "GHI".into(),
            country: Country::Togo,
            count: 1,
            mean: 1.0 / 3.0,
            std: None,
            min: 0.125,
            p25: 2.0,
            p50: 2.0,
            p75: 2.0,
            max: 1234.5678,
        };
        let cells = row.display_cells();
        assert_eq!(cells[0], "Togo");
        assert_eq!(cells[2], "0.33");
        assert_eq!(cells[3], "NA");
        assert_eq!(cells[8], "1234.57");
    }
}
