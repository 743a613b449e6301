use analytics::{CalculatorRegistry, MetricValue};
use analyzer::{ExclusionReason, PipelineConfig, PipelineOutput, RankingPipeline};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use configuration::{LoggingConfig, RankingConfig, load_config};
use core_types::{DateRange, Direction, StrategyId};
use datasource::JsonFileSource;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// The main entry point for the Meridian ranking application.
fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rank(args) => handle_rank(args),
        Commands::Metrics => {
            init_logging(&LoggingConfig::default())?;
            handle_metrics();
            Ok(())
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Evaluates investment strategies on their return histories and ranks them.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute metrics, score and rank the configured strategies.
    Rank(RankArgs),
    /// List every metric that can be requested in a configuration.
    Metrics,
}

#[derive(Parser)]
struct RankArgs {
    /// Path to the ranking configuration file (TOML).
    #[arg(long, short)]
    config: PathBuf,

    /// Overrides `data.path` from the configuration.
    #[arg(long, short)]
    data: Option<PathBuf>,

    /// Print the full pipeline output as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Logging
// ==============================================================================

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
///
/// Logs go to stderr so that `--json` output on stdout stays machine readable.
/// The returned guard must be held until exit to flush the file writer.
fn init_logging(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .with_context(|| format!("Invalid log level '{}'", logging.level))?;
    let builder = FmtSubscriber::builder().with_env_filter(filter);

    match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &logging.file_prefix);
            let (file_writer, guard) = tracing_appender::non_blocking(appender);
            let subscriber = builder
                .with_ansi(false)
                .with_writer(std::io::stderr.and(file_writer))
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
            Ok(Some(guard))
        }
        None => {
            let subscriber = builder.with_writer(std::io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber)?;
            Ok(None)
        }
    }
}

// ==============================================================================
// Rank Command Logic
// ==============================================================================

fn handle_rank(args: RankArgs) -> Result<()> {
    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    let _guard = init_logging(&config.logging)?;
    log_loaded_config(&args.config, &config);

    let data_path = args.data.unwrap_or_else(|| config.data.path.clone());
    let source = JsonFileSource::open(&data_path)
        .with_context(|| format!("Failed to load return data from {}", data_path.display()))?;

    let range = date_range(config.data.start_date, config.data.end_date)?;
    let strategies: Vec<StrategyId> = config.data.strategies.iter().map(|s| StrategyId::from(s.as_str())).collect();
    let benchmark = config.data.benchmark.as_deref().map(StrategyId::from);

    let pipeline_config = PipelineConfig::try_from(&config.analysis)?;
    let pipeline = RankingPipeline::new(CalculatorRegistry::global(), pipeline_config)?;
    let output = pipeline.run_with_source(&source, &strategies, &range, benchmark.as_ref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&output);
    }

    Ok(())
}

/// Emitted once the subscriber built from the file's own logging section is live.
fn log_loaded_config(path: &Path, config: &RankingConfig) {
    tracing::info!(
        path = %path.display(),
        metrics = config.analysis.metrics.len(),
        groups = config.analysis.groups.len(),
        "Loaded configuration."
    );
}

/// Turns the optional configured dates into an inclusive UTC range.
fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<DateRange> {
    let start = start
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let end = match end {
        Some(d) => d
            .and_hms_opt(23, 59, 59)
            .map(|dt| dt.and_utc())
            .context("Invalid end date")?,
        None => DateTime::<Utc>::MAX_UTC,
    };
    Ok(DateRange::new(start, end)?)
}

fn print_report(output: &PipelineOutput) {
    let metrics = output.raw.metrics();

    let mut header = vec!["Rank".to_string(), "Strategy".to_string(), "Score".to_string()];
    header.extend(metrics.iter().map(|m| {
        let arrow = match output.directions.get(m) {
            Some(Direction::LowerIsBetter) => "↓",
            _ => "↑",
        };
        let weight = output.weights.get(m).copied().unwrap_or(0.0);
        format!("{} {} (w={:.2})", m, arrow, weight)
    }));

    let mut ranking = new_table();
    ranking.set_header(header);
    for entry in &output.ranking.entries {
        let mut row = vec![
            entry.rank.to_string(),
            entry.strategy.to_string(),
            format!("{:.4}", entry.score),
        ];
        row.extend(metrics.iter().map(|m| match output.raw.get(&entry.strategy, m) {
            Some(MetricValue::Value(v)) => format!("{:.4}", v),
            Some(MetricValue::Unavailable(reason)) => format!("n/a ({})", reason),
            None => String::new(),
        }));
        ranking.add_row(row);
    }
    println!("{ranking}");

    if !output.scores.excluded.is_empty() {
        let mut excluded = new_table();
        excluded.set_header(vec!["Excluded Strategy", "Reasons"]);
        for exclusion in &output.scores.excluded {
            let reasons: Vec<String> = exclusion
                .reasons
                .iter()
                .map(|r| match r.reason {
                    ExclusionReason::Unavailable(reason) => format!("{}: {}", r.metric, reason),
                    ExclusionReason::ZeroWeight => format!("{}: zero weight", r.metric),
                })
                .collect();
            excluded.add_row(vec![exclusion.strategy.to_string(), reasons.join(", ")]);
        }
        println!("{excluded}");
    }

    if !output.groups.entries.is_empty() {
        let mut groups = new_table();
        groups.set_header(vec!["Rank", "Group", "Mean Score", "Members"]);
        for group in &output.groups.entries {
            let members: Vec<&str> = group.members.iter().map(StrategyId::as_str).collect();
            groups.add_row(vec![
                group.rank.to_string(),
                group.group.clone(),
                format!("{:.4}", group.score),
                members.join(", "),
            ]);
        }
        println!("{groups}");
    }
}

// ==============================================================================
// Metrics Command Logic
// ==============================================================================

fn handle_metrics() {
    let registry = CalculatorRegistry::global();

    let mut table = new_table();
    table.set_header(vec!["Metric", "Needs Benchmark", "Min Observations", "Direction"]);
    for name in registry.names() {
        if let Ok(calculator) = registry.resolve(name) {
            let direction = match calculator.direction() {
                Direction::HigherIsBetter => "higher is better",
                Direction::LowerIsBetter => "lower is better",
            };
            table.add_row(vec![
                name.to_string(),
                if calculator.requires_benchmark() { "yes" } else { "no" }.to_string(),
                calculator.min_observations().to_string(),
                direction.to_string(),
            ]);
        }
    }
    println!("{table}");
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}
