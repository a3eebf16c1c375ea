//! Map requested metric names onto the columns a dataset actually carries.

use crate::dataset::Dataset;

/// Synonym columns per metric, in priority order.
pub const METRIC_ALIASES: &[(&str, &[&str])] = &[("GHI", &["GHT"]), ("GHT", &["GHI"])];

fn aliases(metric: &str) -> &'static [&'static str] {
    METRIC_ALIASES
        .iter()
        .find(|(m, _)| *m == metric)
        .map(|(_, a)| *a)
        .unwrap_or(&[])
}

/// Column to read for `metric`: exact match first, then the first alias present.
pub fn resolve_column<'a>(dataset: &'a Dataset, metric: &'a str) -> Option<&'a str> {
    if dataset.has_column(metric) {
        return Some(metric);
    }
    aliases(metric).iter().copied().find(|a| dataset.has_column(a))
}

/// Non-missing values of `metric` in `dataset`, or `None` when the metric is
/// unavailable (no matching column, or no usable value).
pub fn country_sample(dataset: &Dataset, metric: &str) -> Option<Vec<f64>> {
    let column = resolve_column(dataset, metric)?;
    let values = dataset.numeric_values(column);
    if values.is_empty() { None } else { Some(values) }
}

pub fn is_available(dataset: &Dataset, metric: &str) -> bool {
    resolve_column(dataset, metric)
        .and_then(|c| dataset.column(c))
        .is_some_and(|col| col.iter().any(|cell| cell.as_number().is_some()))
}

/// Requested metrics available in at least one dataset, in request order.
pub fn available_metrics<S: AsRef<str>>(requested: &[S], datasets: &[&Dataset]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for metric in requested.iter().map(|m| m.as_ref()) {
        if out.iter().any(|m| m == metric) {
            continue;
        }
        if datasets.iter().any(|d| is_available(d, metric)) {
            out.push(metric.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Cell;
    use crate::models::Country;

    fn ds(country: Country, cols: &[(&str, &[Option<f64>])]) -> Dataset {
        Dataset::from_columns(
            country,
            cols.iter()
                .map(|(n, v)| {
                    let cells = v.iter().map(|x| x.map_or(Cell::Missing, Cell::Number)).collect();
                    (n.to_string(), cells)
                })
                .collect(),
        )
    }

    #[test]
    fn exact_match_wins_over_alias() {
        let d = ds(Country::Togo, &[("GHT", &[Some(1.0)]), ("GHI", &[Some(2.0)])]);
        assert_eq!(resolve_column(&d, "GHI"), Some("GHI"));
    }

    #[test]
    fn ght_stands_in_for_ghi() {
        let d = ds(Country::Togo, &[("GHT", &[Some(1.0), None, Some(3.0)])]);
        assert_eq!(resolve_column(&d, "GHI"), Some("GHT"));
        assert_eq!(country_sample(&d, "GHI"), Some(vec![1.0, 3.0]));
    }

    #[test]
    fn all_missing_column_is_unavailable() {
        let d = ds(Country::Benin, &[("DNI", &[None, None])]);
        assert!(!is_available(&d, "DNI"));
        assert_eq!(country_sample(&d, "DNI"), None);
        assert_eq!(resolve_column(&d, "WS"), None);
    }

    #[test]
    fn available_metrics_keep_request_order_with_union() {
        let a = ds(Country::Benin, &[("DNI", &[Some(1.0)])]);
        let b = ds(Country::Togo, &[("GHT", &[Some(1.0)]), ("WS", &[None])]);
        let got = available_metrics(&["WS", "GHI", "DNI", "GHI"], &[&a, &b]);
        assert_eq!(got, vec!["GHI".to_string(), "DNI".to_string()]);
    }
}
