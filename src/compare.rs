//! Cross-country hypothesis tests.
//!
//! For every metric the same set of country samples feeds a parametric test
//! (one-way ANOVA) and its rank-based counterpart (Kruskal-Wallis), so the two
//! results can be read side by side. Significance is judged at a fixed
//! `p < 0.05`.

use crate::dataset::Dataset;
use crate::reconcile::country_sample;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor};
use statrs::statistics::Statistics;
use std::fmt;

/// Fixed significance threshold (two-sided reading of the p-value).
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestKind {
    Anova,
    KruskalWallis,
}

impl TestKind {
    /// Conventional symbol of the test statistic.
    pub fn statistic_label(&self) -> &'static str {
        match self {
            TestKind::Anova => "F-statistic",
            TestKind::KruskalWallis => "H-statistic",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestKind::Anova => f.write_str("ANOVA"),
            TestKind::KruskalWallis => f.write_str("Kruskal-Wallis"),
        }
    }
}

/// Why a test could not produce a number.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum TestError {
    #[error("need at least 2 non-empty groups, got {0}")]
    TooFewGroups(usize),
    #[error("no residual degrees of freedom ({observations} observations in {groups} groups)")]
    NoResidualFreedom { observations: usize, groups: usize },
    #[error("all groups have zero within-group variance")]
    ZeroVariance,
    #[error("all numbers are identical")]
    IdenticalValues,
    #[error("statistic is not finite")]
    NonFinite,
    #[error("distribution error: {0}")]
    Distribution(String),
}

/// A computed test statistic and its upper-tail p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestStatistic {
    pub statistic: f64,
    pub p_value: f64,
}

impl TestStatistic {
    pub fn is_significant(&self) -> bool {
        self.p_value < SIGNIFICANCE_LEVEL
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TestOutcome {
    Computed {
        statistic: f64,
        p_value: f64,
        significant: bool,
    },
    Failed {
        reason: TestError,
    },
}

/// Result of one test for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub metric: String,
    pub test: TestKind,
    /// Number of country samples that entered the test.
    pub groups: usize,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn new(
        metric: &str,
        test: TestKind,
        groups: usize,
        r: Result<TestStatistic, TestError>,
    ) -> Self {
        let outcome = match r {
            Ok(s) => TestOutcome::Computed {
                statistic: s.statistic,
                p_value: s.p_value,
                significant: s.is_significant(),
            },
            Err(reason) => TestOutcome::Failed { reason },
        };
        Self {
            metric: metric.to_string(),
            test,
            groups,
            outcome,
        }
    }

    /// Plain-language reading of the outcome.
    pub fn interpretation(&self) -> String {
        match &self.outcome {
            TestOutcome::Computed { significant: true, .. } => {
                "significant difference detected (p < 0.05)".to_string()
            }
            TestOutcome::Computed { .. } => {
                "no significant difference detected (p >= 0.05)".to_string()
            }
            TestOutcome::Failed { reason } => format!("test failed: {}", reason),
        }
    }
}

/// One-way ANOVA over the given groups.
///
/// Group moments come from [`Statistics`]; the F statistic is
/// `(SSB / (k - 1)) / (SSW / (N - k))` with its upper-tail p-value.
pub fn one_way_anova(groups: &[&[f64]]) -> Result<TestStatistic, TestError> {
    let k = groups.len();
    if k < 2 || groups.iter().any(|g| g.is_empty()) {
        return Err(TestError::TooFewGroups(groups.iter().filter(|g| !g.is_empty()).count()));
    }
    let n: usize = groups.iter().map(|g| g.len()).sum();
    if n <= k {
        return Err(TestError::NoResidualFreedom {
            observations: n,
            groups: k,
        });
    }
    let grand_mean = groups.iter().flat_map(|g| g.iter()).mean();
    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for g in groups {
        let len = g.len() as f64;
        ss_between += len * (g.iter().mean() - grand_mean).powi(2);
        // sample variance is undefined for a single observation
        if g.len() > 1 {
            ss_within += (len - 1.0) * g.iter().variance();
        }
    }
    if ss_within <= 0.0 {
        return Err(TestError::ZeroVariance);
    }
    let df_between = (k - 1) as f64;
    let df_within = (n - k) as f64;
    let f = (ss_between / df_between) / (ss_within / df_within);
    if !f.is_finite() {
        return Err(TestError::NonFinite);
    }
    let dist = FisherSnedecor::new(df_between, df_within)
        .map_err(|e| TestError::Distribution(e.to_string()))?;
    Ok(TestStatistic {
        statistic: f,
        p_value: dist.sf(f),
    })
}

/// Average ranks (1-based) of the pooled observations, plus the tie term
/// `sum(t^3 - t)` over groups of tied values.
fn pooled_ranks(pooled: &[f64]) -> (Vec<f64>, f64) {
    let mut order: Vec<usize> = (0..pooled.len()).collect();
    order.sort_by(|&a, &b| pooled[a].total_cmp(&pooled[b]));
    let mut ranks = vec![0.0; pooled.len()];
    let mut ties = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && pooled[order[j + 1]] == pooled[order[i]] {
            j += 1;
        }
        // positions i..=j share the average of ranks i+1..=j+1
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        let t = (j - i + 1) as f64;
        ties += t * t * t - t;
        i = j + 1;
    }
    (ranks, ties)
}

/// Kruskal-Wallis H test with tie correction.
pub fn kruskal_wallis(groups: &[&[f64]]) -> Result<TestStatistic, TestError> {
    let k = groups.len();
    if k < 2 || groups.iter().any(|g| g.is_empty()) {
        return Err(TestError::TooFewGroups(groups.iter().filter(|g| !g.is_empty()).count()));
    }
    let pooled: Vec<f64> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    let n = pooled.len() as f64;
    let (ranks, ties) = pooled_ranks(&pooled);
    let correction = 1.0 - ties / (n * n * n - n);
    if correction <= 0.0 {
        return Err(TestError::IdenticalValues);
    }

    let mut offset = 0;
    let mut sum_term = 0.0;
    for g in groups {
        let r: f64 = ranks[offset..offset + g.len()].iter().sum();
        sum_term += r * r / g.len() as f64;
        offset += g.len();
    }
    let h = (12.0 / (n * (n + 1.0)) * sum_term - 3.0 * (n + 1.0)) / correction;
    if !h.is_finite() {
        return Err(TestError::NonFinite);
    }
    let dist =
        ChiSquared::new((k - 1) as f64).map_err(|e| TestError::Distribution(e.to_string()))?;
    Ok(TestStatistic {
        statistic: h,
        p_value: dist.sf(h),
    })
}

/// Run both tests for `metric` across the datasets that carry it.
///
/// Returns an empty list when fewer than two countries have data for the
/// metric. Otherwise yields exactly one ANOVA and one Kruskal-Wallis result, in
/// that order; a numerical failure in one does not affect the other.
pub fn compare(datasets: &[&Dataset], metric: &str) -> Vec<TestResult> {
    let samples: Vec<Vec<f64>> = datasets
        .iter()
        .filter_map(|ds| country_sample(ds, metric))
        .collect();
    if samples.len() < 2 {
        log::debug!("skipping tests for {metric}: {} sample(s)", samples.len());
        return Vec::new();
    }
    let groups: Vec<&[f64]> = samples.iter().map(Vec::as_slice).collect();
    let anova = one_way_anova(&groups);
    let kruskal = kruskal_wallis(&groups);
    for (kind, r) in [(TestKind::Anova, &anova), (TestKind::KruskalWallis, &kruskal)] {
        if let Err(e) = r {
            log::warn!("{kind} failed for {metric}: {e}");
        }
    }
    vec![
        TestResult::new(metric, TestKind::Anova, groups.len(), anova),
        TestResult::new(metric, TestKind::KruskalWallis, groups.len(), kruskal),
    ]
}

/// [`compare`] for each metric, concatenated in metric order.
pub fn compare_all<S: AsRef<str>>(datasets: &[&Dataset], metrics: &[S]) -> Vec<TestResult> {
    metrics
        .iter()
        .flat_map(|m| compare(datasets, m.as_ref()))
        .collect()
}
