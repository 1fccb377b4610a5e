use analytics::{AnalysisReport, AnalyticsEngine, AnalyticsError, MetricsResult};
use anyhow::{Context, bail};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Table};
use configuration::{Config, Preset, Universe, load_config, parse_asset_list};
use core_types::{AssetCategory, DateRange, FillPolicy, RawSeries, ViewMode};
use std::fs;
use std::path::{Path, PathBuf};

/// The main entry point for the market monitor.
fn main() -> anyhow::Result<()> {
    // Load MONITOR__* overrides from a .env file when one exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    // The guard flushes the file appender on drop and must outlive every command.
    let _guard = configuration::init_logging(&config.logging).context("Failed to initialise logging")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Summary(args) => handle_summary(args, config),
        Commands::Correlation(args) => handle_correlation(args, config),
        Commands::Panel(args) => handle_panel(args, config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Cross-asset performance, risk and correlation monitor.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Return and risk metrics for every asset, ranked by total return.
    Summary(AnalysisArgs),
    /// Pairwise correlation of daily returns.
    Correlation(AnalysisArgs),
    /// Group leaders, credit spread proxies and the yield-curve slope.
    Panel(AnalysisArgs),
}

#[derive(Args)]
struct AnalysisArgs {
    /// JSON file holding the provider's price series.
    #[arg(long)]
    prices: PathBuf,

    /// The start date of the window (format: YYYY-MM-DD).
    #[arg(long, requires = "to", conflicts_with = "preset")]
    from: Option<NaiveDate>,

    /// The end date of the window (format: YYYY-MM-DD).
    #[arg(long, requires = "from", conflicts_with = "preset")]
    to: Option<NaiveDate>,

    /// A quick-select window ending today; overrides `period.preset`.
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Comma-separated asset labels to keep (e.g. "DAX, S&P 500").
    #[arg(long)]
    assets: Option<String>,

    /// Missing-data policy: "none" or "forward_fill".
    #[arg(long)]
    fill_policy: Option<FillPolicy>,

    /// Display view: "normalized" or "absolute".
    #[arg(long)]
    view: Option<ViewMode>,

    /// Print the full report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Request Preparation
// ==============================================================================

/// Loads the price dump, resolves the window and runs the engine.
fn run_analysis(args: &AnalysisArgs, mut config: Config) -> anyhow::Result<AnalysisReport> {
    if let Some(policy) = args.fill_policy {
        config.analysis.fill_policy = policy;
    }
    if let Some(view) = args.view {
        config.analysis.view_mode = view;
    }

    let range = resolve_range(args, &config)?;
    let series = load_series(&args.prices)?;
    let series = select_assets(series, args.assets.as_deref(), &config.universe)?;
    check_universe(&series, &config.universe);

    let engine = AnalyticsEngine::new(config.analysis.clone());
    engine
        .run(&series, range, &config.universe)
        .context("Analysis failed")
}

fn resolve_range(args: &AnalysisArgs, config: &Config) -> anyhow::Result<DateRange> {
    if let (Some(from), Some(to)) = (args.from, args.to) {
        return Ok(DateRange::new(from, to));
    }
    let mut period = config.period.clone();
    if let Some(preset) = args.preset {
        period.preset = preset;
    }
    let today = Local::now().date_naive();
    period
        .resolve(today)
        .context("Failed to resolve the reporting period")
}

fn load_series(path: &Path) -> anyhow::Result<Vec<RawSeries>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read price file {}", path.display()))?;
    let series: Vec<RawSeries> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse price file {}", path.display()))?;
    tracing::info!(series = series.len(), file = %path.display(), "Loaded price series");
    Ok(series)
}

/// Keeps the requested assets; yield series always pass through.
///
/// Entries may name universe groups (e.g. "EU SECTORS"), which stand for
/// every asset of the group.
fn select_assets(
    series: Vec<RawSeries>,
    selection: Option<&str>,
    universe: &Universe,
) -> anyhow::Result<Vec<RawSeries>> {
    let Some(selection) = selection else {
        return Ok(series);
    };
    let wanted = universe.expand_selection(&parse_asset_list(selection));
    if wanted.is_empty() {
        bail!("--assets must name at least one asset");
    }
    if let Some(missing) = wanted
        .iter()
        .find(|label| !series.iter().any(|s| &s.label == *label))
    {
        return Err(AnalyticsError::UnknownAsset {
            asset: missing.clone(),
        })
        .context("--assets names an asset missing from the price file");
    }
    Ok(series
        .into_iter()
        .filter(|s| s.category.is_yield() || wanted.contains(&s.label))
        .collect())
}

/// Warns about series the configured universe does not describe the same way.
fn check_universe(series: &[RawSeries], universe: &Universe) {
    if universe.is_empty() {
        return;
    }
    let tickers = universe.flatten();
    for s in series {
        match (tickers.get(&s.label), universe.category_of(&s.label)) {
            (None, _) => {
                tracing::warn!(asset = %s.label, "Series is not part of the configured universe");
            }
            (Some(ticker), _) if *ticker != s.ticker => {
                tracing::warn!(
                    asset = %s.label,
                    configured = %ticker,
                    supplied = %s.ticker,
                    "Ticker differs from the configured one"
                );
            }
            (_, Some(category)) if category != s.category => {
                tracing::warn!(asset = %s.label, ?category, "Category differs from the configured one");
            }
            _ => {}
        }
    }
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_summary(args: AnalysisArgs, config: Config) -> anyhow::Result<()> {
    let report = run_analysis(&args, config)?;
    if args.json {
        return print_json(&report);
    }

    println!(
        "Performance from {} to {} ({} view, {} fill)",
        report.range.start, report.range.end, report.view_mode, report.fill_policy
    );

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Asset", "Total %", "Ann. Return %", "Ann. Vol %", "Max DD %", "Best Day", "Worst Day",
        "Obs",
    ]);
    for performer in &report.ranking {
        if let Some(Ok(m)) = report.metrics.get(&performer.label) {
            table.add_row(metrics_row(&performer.label, m));
        }
    }
    println!("{table}");

    let overview = &report.overview;
    if let (Some(best), Some(worst)) = (&overview.best, &overview.worst) {
        println!(
            "Best: {} ({:+.2}%)  Worst: {} ({:+.2}%)",
            best.label, best.total_return_pct, worst.label, worst.total_return_pct
        );
    }
    if let (Some(mean), Some(vol), Some(dd)) = (
        overview.mean_total_return_pct,
        overview.median_volatility_pct,
        overview.worst_max_drawdown_pct,
    ) {
        println!("Mean return: {mean:+.2}%  Median vol: {vol:.2}%  Worst drawdown: {dd:.2}%");
    }

    print_warnings(&report);
    Ok(())
}

fn handle_correlation(args: AnalysisArgs, config: Config) -> anyhow::Result<()> {
    let report = run_analysis(&args, config)?;
    if args.json {
        return print_json(&report.correlation);
    }

    let corr = &report.correlation;
    let mut header = vec![String::new()];
    header.extend(corr.assets().iter().cloned());

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    for a in corr.assets() {
        let mut row = vec![Cell::new(a)];
        row.extend(corr.assets().iter().map(|b| match corr.value(a, b) {
            Some(v) => Cell::new(format!("{v:.2}")),
            None => Cell::new("n/a"),
        }));
        table.add_row(row);
    }
    println!("{table}");

    for (a, b, cell) in corr.pairs() {
        if let Err(e) = cell {
            println!("  {a} / {b}: {e}");
        }
    }
    Ok(())
}

fn handle_panel(args: AnalysisArgs, config: Config) -> anyhow::Result<()> {
    let yields_configured = config.universe.is_empty() || config.universe.has_category(AssetCategory::Yield);
    let report = run_analysis(&args, config)?;
    if args.json {
        return print_json(&serde_json::json!({
            "group_leaders": report.group_leaders,
            "spread_proxies": report.spread_proxies,
            "curve_slope_bps": report.curve_slope_bps,
            "warnings": report.warnings,
        }));
    }

    let mut leaders = Table::new();
    leaders
        .load_preset(UTF8_FULL)
        .set_header(vec!["Group", "Top", "Bottom"]);
    for group in &report.group_leaders {
        let describe = |p: &Option<analytics::Performer>| match p {
            Some(p) => format!("{} ({:+.2}%)", p.label, p.total_return_pct),
            None => "n/a".to_string(),
        };
        leaders.add_row(vec![group.group.clone(), describe(&group.top), describe(&group.bottom)]);
    }
    println!("{leaders}");

    if !report.spread_proxies.is_empty() {
        let mut spreads = Table::new();
        spreads
            .load_preset(UTF8_FULL)
            .set_header(vec!["Spread Proxy", "Credit - Govt (pp)"]);
        for proxy in &report.spread_proxies {
            spreads.add_row(vec![proxy.name.clone(), format!("{:+.2}", proxy.value_pct_points)]);
        }
        println!("{spreads}");
    }

    match report.curve_slope_bps {
        Some(slope) => println!("Yield curve slope: {slope:+.0} bps"),
        None if yields_configured => println!("Yield curve slope: n/a"),
        None => println!("Yield curve slope: n/a (no yield group configured)"),
    }

    print_warnings(&report);
    Ok(())
}

// ==============================================================================
// Output Helpers
// ==============================================================================

fn metrics_row(label: &str, m: &MetricsResult) -> Vec<String> {
    vec![
        label.to_string(),
        format!("{:+.2}", m.total_return_pct),
        format!("{:+.2}", m.annualized_return_pct),
        format!("{:.2}", m.annualized_volatility_pct),
        format!("{:.2}", m.max_drawdown_pct),
        format!("{} ({:+.2}%)", m.best_day.date, m.best_day.return_pct),
        format!("{} ({:+.2}%)", m.worst_day.date, m.worst_day.return_pct),
        m.observation_count.to_string(),
    ]
}

fn print_warnings(report: &AnalysisReport) {
    let failures = report
        .metrics
        .iter()
        .filter_map(|(label, r)| r.as_ref().err().map(|e| (label, e)))
        .filter(|(label, _)| !report.warnings.contains_key(*label));
    for (label, error) in report.warnings.iter().chain(failures) {
        eprintln!("warning: {label}: {error}");
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialise report")?;
    println!("{out}");
    Ok(())
}
