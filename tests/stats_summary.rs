use solar_insights::stats::{performance_table, statistics};
use solar_insights::{Cell, Country, Dataset};

fn ds(country: Country, cols: &[(&str, &[Option<f64>])]) -> Dataset {
    Dataset::from_columns(
        country,
        cols.iter()
            .map(|(name, vals)| {
                let cells = vals
                    .iter()
                    .map(|v| v.map_or(Cell::Missing, Cell::Number))
                    .collect();
                (name.to_string(), cells)
            })
            .collect(),
    )
}

#[test]
fn statistics_skip_missing_and_order_by_metric_then_country() {
    // Benin GHI [1,2,3,4] -> quartiles 1.75 / 2.5 / 3.25
    // Togo  GHI [10, None, 30], DNI all missing -> no DNI row for Togo
    let benin = ds(
        Country::Benin,
        &[
            ("GHI", &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            ("DNI", &[Some(7.0), None, None, None]),
        ],
    );
    let togo = ds(
        Country::Togo,
        &[("GHI", &[Some(10.0), None, Some(30.0)]), ("DNI", &[None, None, None])],
    );
    let rows = statistics(&[&benin, &togo], &["GHI", "DNI"]);

    let keys: Vec<(&str, Country)> = rows.iter().map(|r| (r.metric.as_str(), r.country)).collect();
    assert_eq!(
        keys,
        vec![("GHI", Country::Benin), ("GHI", Country::Togo), ("DNI", Country::Benin)]
    );

    let b = &rows[0];
    assert_eq!(b.count, 4);
    assert_eq!(b.min, 1.0);
    assert_eq!(b.max, 4.0);
    assert!((b.mean - 2.5).abs() < 1e-9);
    assert!((b.p25 - 1.75).abs() < 1e-9);
    assert!((b.p50 - 2.5).abs() < 1e-9);
    assert!((b.p75 - 3.25).abs() < 1e-9);

    let t = &rows[1];
    assert_eq!(t.count, 2);
    assert_eq!(t.mean, 20.0);
    assert!((t.std.unwrap() - 14.142135623730951).abs() < 1e-9);

    // single observation: std undefined, shown as NA
    assert_eq!(rows[2].std, None);
    assert_eq!(rows[2].display_cells()[3], "NA");
}

#[test]
fn statistics_are_idempotent() {
    let benin = ds(Country::Benin, &[("GHI", &[Some(0.1), Some(0.2), Some(0.7), None])]);
    let togo = ds(Country::Togo, &[("GHT", &[Some(1.0 / 3.0), Some(2.0 / 3.0)])]);
    let a = statistics(&[&benin, &togo], &["GHI"]);
    let b = statistics(&[&benin, &togo], &["GHI"]);
    assert_eq!(a.len(), 2);
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.mean.to_bits(), y.mean.to_bits());
        assert_eq!(x.std.map(f64::to_bits), y.std.map(f64::to_bits));
        assert_eq!(x.p75.to_bits(), y.p75.to_bits());
    }
    assert_eq!(a, b);
}

#[test]
fn performance_table_lists_only_present_metrics() {
    let benin = ds(Country::Benin, &[("GHI", &[Some(100.0), Some(300.0)]), ("WS", &[None])]);
    let togo = ds(Country::Togo, &[("WS", &[None])]);
    let perf = performance_table(&[&benin, &togo], &["GHI", "WS"]);
    assert_eq!(perf.len(), 1);
    assert_eq!(perf[0].country, Country::Benin);
    assert_eq!(perf[0].metrics.len(), 1);
    assert_eq!(perf[0].metrics[0].metric, "GHI");
    assert_eq!(perf[0].metrics[0].mean, 200.0);
    assert_eq!(perf[0].metrics[0].max, 300.0);
}
