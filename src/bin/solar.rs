use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use num_format::{Locale, ToFormattedString};
use solar_insights::compare::{TestOutcome, TestResult};
use solar_insights::dashboard::Report;
use solar_insights::models::{DEFAULT_METRICS, KNOWN_METRICS};
use solar_insights::ranking::{RegionRanking, rank_regions};
use solar_insights::stats::{STATISTICS_HEADERS, StatisticsRow, fmt2};
use solar_insights::{Country, Dashboard, LoadIssue, Render, SourceConfig, storage};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "solar",
    version,
    about = "Summarize & statistically compare per-country solar sensor data"
)]
struct Cli {
    #[command(flatten)]
    sources: SourceArgs,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// JSON file with `data_files`, `data_base_url` and `data_dir`.
    #[arg(long, global = true)]
    sources: Option<PathBuf>,
    /// Directory holding local `<country>_clean.csv` files.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Base URL for countries without an explicit download URL.
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Skip remote sources and read local files only.
    #[arg(long, global = true, default_value_t = false)]
    local_only: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full comparison: statistics, performance, tests and region rankings.
    Report(SelectArgs),
    /// Descriptive statistics per metric and country.
    Stats(SelectArgs),
    /// ANOVA and Kruskal-Wallis tests per metric.
    Compare(SelectArgs),
    /// Rank one country's regions by the average of a metric.
    Rank(RankArgs),
    /// List known countries, file names and metric definitions.
    Info,
}

#[derive(Args, Debug)]
struct SelectArgs {
    /// Countries separated by comma or semicolon (default: all)
    #[arg(short, long)]
    countries: Option<String>,
    /// Metrics separated by comma or semicolon (default: GHI,DNI)
    #[arg(short, long)]
    metrics: Option<String>,
    /// Save results to file (.csv for statistics, .json for the full report).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RankArgs {
    #[arg(short, long)]
    country: Country,
    #[arg(short, long, default_value = "GHI")]
    metric: String,
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = build_config(&cli.sources)?;
    match cli.cmd {
        Command::Report(args) => cmd_select(config, args, View::Report),
        Command::Stats(args) => cmd_select(config, args, View::Stats),
        Command::Compare(args) => cmd_select(config, args, View::Compare),
        Command::Rank(args) => cmd_rank(config, args),
        Command::Info => {
            cmd_info();
            Ok(())
        }
    }
}

fn build_config(args: &SourceArgs) -> Result<SourceConfig> {
    let mut config = match &args.sources {
        Some(p) => SourceConfig::from_json_file(p)?,
        None => SourceConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(url) = &args.base_url {
        config.data_base_url = Some(url.clone());
    }
    if args.local_only {
        config.data_files.clear();
        config.data_base_url = None;
    }
    Ok(config)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum View {
    Report,
    Stats,
    Compare,
}

fn cmd_select(config: SourceConfig, args: SelectArgs, view: View) -> Result<()> {
    let countries = match &args.countries {
        Some(s) => parse_list(s)
            .iter()
            .map(|c| c.parse::<Country>())
            .collect::<Result<Vec<_>, _>>()?,
        None => Country::ALL.to_vec(),
    };
    let metrics = match &args.metrics {
        Some(s) => parse_list(s),
        None => DEFAULT_METRICS.iter().map(|m| m.to_string()).collect(),
    };

    let mut dash = Dashboard::new(config);
    let report = match dash.render(&countries, &metrics) {
        Render::Report(report) => report,
        Render::NothingToDisplay { reason, issues } => {
            print_issues(&issues);
            println!("Nothing to display: {}", reason);
            return Ok(());
        }
    };
    print_issues(&report.issues);

    if matches!(view, View::Report | View::Stats) {
        print_statistics(&report.statistics);
    }
    if view == View::Report {
        print_performance(&report);
    }
    if matches!(view, View::Report | View::Compare) {
        print_tests(&report.tests);
    }
    if view == View::Report {
        for r in &report.rankings {
            print_ranking(r);
        }
    }

    if let Some(path) = args.out.as_ref() {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("json")
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => storage::save_statistics_csv(&report.statistics, path)?,
            "json" => storage::save_report_json(&report, path)?,
            other => bail!("unsupported format: {}", other),
        }
        eprintln!("Saved results to {}", path.display());
    }
    Ok(())
}

fn cmd_rank(config: SourceConfig, args: RankArgs) -> Result<()> {
    let mut dash = Dashboard::new(config);
    let (datasets, issues) = dash.datasets(&[args.country]);
    print_issues(&issues);
    match datasets.first() {
        Some(ds) => print_ranking(&rank_regions(ds, &args.metric)),
        None => println!("Nothing to display: no data for {}", args.country),
    }
    Ok(())
}

fn cmd_info() {
    println!("Available countries & files");
    for c in Country::ALL {
        println!("  {:<14} {}", c.name(), c.file_name());
    }
    println!();
    println!("Metric definitions");
    for m in KNOWN_METRICS {
        println!("  {:<5} {}", m.name, m.definition);
    }
}

fn print_issues(issues: &[LoadIssue]) {
    for issue in issues {
        let tag = if issue.is_error() { "error" } else { "warning" };
        eprintln!("{}: {}", tag, issue);
    }
}

fn render_line(cells: &[&str], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{:>w$}", c, w = *w))
        .collect::<Vec<_>>()
        .join("  ")
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    println!("{}", render_line(headers, &widths));
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        println!("{}", render_line(&cells, &widths));
    }
}

fn print_statistics(rows: &[StatisticsRow]) {
    let mut metric: Option<&str> = None;
    let mut block: Vec<Vec<String>> = Vec::new();
    for r in rows {
        if metric != Some(r.metric.as_str()) {
            if let Some(m) = metric {
                println!("\n{} Statistical Summary", m);
                print_table(&STATISTICS_HEADERS, &block);
            }
            metric = Some(r.metric.as_str());
            block.clear();
        }
        let mut cells = r.display_cells().to_vec();
        cells[1] = r.count.to_formatted_string(&Locale::en);
        block.push(cells);
    }
    if let Some(m) = metric {
        println!("\n{} Statistical Summary", m);
        print_table(&STATISTICS_HEADERS, &block);
    }
}

fn print_performance(report: &Report) {
    let mut headers = vec!["Country".to_string()];
    for m in &report.metrics {
        headers.push(format!("{} Mean", m));
        headers.push(format!("{} Max", m));
    }
    let rows: Vec<Vec<String>> = report
        .performance
        .iter()
        .map(|p| {
            let mut cells = vec![p.country.to_string()];
            for m in &report.metrics {
                match p.metrics.iter().find(|x| &x.metric == m) {
                    Some(x) => {
                        cells.push(fmt2(x.mean));
                        cells.push(fmt2(x.max));
                    }
                    None => {
                        cells.push(String::new());
                        cells.push(String::new());
                    }
                }
            }
            cells
        })
        .collect();
    println!("\nPerformance Rankings");
    let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
    print_table(&headers, &rows);
}

fn print_tests(tests: &[TestResult]) {
    println!("\nStatistical Tests");
    if tests.is_empty() {
        println!("  (at least two countries with data are needed per metric)");
    }
    for t in tests {
        match &t.outcome {
            TestOutcome::Computed {
                statistic, p_value, ..
            } => println!(
                "  {} {}: {}: {:.4}  p-value: {:.4}  -> {}",
                t.metric,
                t.test,
                t.test.statistic_label(),
                statistic,
                p_value,
                t.interpretation()
            ),
            TestOutcome::Failed { .. } => {
                println!("  {} {}: {}", t.metric, t.test, t.interpretation())
            }
        }
    }
}

fn print_ranking(ranking: &RegionRanking) {
    match ranking {
        RegionRanking::Ranked {
            country,
            region_column,
            metric,
            rows,
        } => {
            println!("\nTop regions in {} by average {} ({})", country, metric, region_column);
            let rows: Vec<Vec<String>> = rows
                .iter()
                .map(|r| vec![r.region.clone(), fmt2(r.average)])
                .collect();
            print_table(&["Region", "Average"], &rows);
        }
        RegionRanking::Placeholder { country, reason } => {
            println!("\nRegion ranking for {}: unavailable ({})", country, reason);
        }
    }
}
