use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufReader};
use std::path::PathBuf;
use treeseek::aggregate::AggregateView;
use treeseek::cli::{Cli, Command, OutputFormat};
use treeseek::config::ExperimentConfig;
use treeseek::experiment::{self, RunOptions, RunOutcome};
use treeseek::report;
use treeseek::result_store::ResultStore;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    } else {
        // Corrupt-record warnings are still worth seeing without --debug
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
            )
            .with_writer(std::io::stderr)
            .without_time()
            .with_target(false)
            .init();
    }
}

/// Run one search session against stdin
fn run_session(
    config: &ExperimentConfig,
    participant: String,
    dataset: Option<PathBuf>,
    results: Option<PathBuf>,
    tick_ms: Option<u64>,
    seed: Option<u64>,
) -> Result<()> {
    let tick_interval = match tick_ms {
        Some(0) => anyhow::bail!("Invalid value for --tick-ms: 0 (must be > 0)"),
        Some(ms) => std::time::Duration::from_millis(ms),
        None => config.tick_interval(),
    };

    let options = RunOptions {
        participant,
        dataset,
        candidates: config.datasets.clone(),
        results: results.unwrap_or_else(|| config.results_path.clone()),
        tick_interval,
        seed,
    };

    let stdin = BufReader::new(io::stdin());
    let outcome = experiment::run(&options, stdin, &mut io::stdout(), &mut io::stderr())
        .context("Experiment failed")?;

    if outcome == RunOutcome::Abandoned {
        tracing::debug!("no result recorded");
    }
    Ok(())
}

/// Load the results log and print the analysis report
fn analyze(
    config: &ExperimentConfig,
    results: Option<PathBuf>,
    bins: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let bins = bins.unwrap_or(config.histogram_bins);
    if bins == 0 {
        anyhow::bail!("Invalid value for --bins: 0 (must be >= 1)");
    }

    let store = ResultStore::new(results.unwrap_or_else(|| config.results_path.clone()));
    let records = store
        .load_valid()
        .with_context(|| format!("Failed to load results from {}", store.path().display()))?;

    let view = AggregateView::compute(&records, bins);
    match format {
        OutputFormat::Text => print!("{}", report::render_report(&records, view.as_ref())),
        OutputFormat::Json => println!("{}", report::render_json(&records, view.as_ref().ok())?),
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing; --debug raises the level to TRACE
    init_tracing(args.debug);

    let config = ExperimentConfig::load(args.config.as_deref())?;
    config.validate()?;

    match args.command {
        Command::Run {
            participant,
            dataset,
            results,
            tick_ms,
            seed,
        } => run_session(&config, participant, dataset, results, tick_ms, seed),
        Command::Analyze {
            results,
            bins,
            format,
        } => analyze(&config, results, bins, format),
    }
}
