//! # fsmbench CLI
//!
//! Runs the benchmark harness over the built-in subjects and prints one
//! record per (adapter, scenario) pairing. The same binary is the re-exec
//! target for process isolation: when launched with the child subject
//! environment set, it runs exactly one subject and prints its record as
//! JSON on stdout.

use anyhow::{bail, Context};
use clap::Parser;
use fsmbench::protocol::isolation;
use fsmbench::{catalog, logging, report, subjects, BenchConfig, Harness, IsolationMode};

#[derive(Parser)]
#[command(name = "fsmbench")]
#[command(about = "Micro-benchmark harness for finite-state-machine engines")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Comma-separated adapter names to run (default: all registered)
    #[arg(long)]
    adapters: Option<String>,

    /// Comma-separated scenario names to run (default: the full catalog)
    #[arg(long)]
    scenarios: Option<String>,

    /// Warmup iterations per subject
    #[arg(long)]
    warmup_iterations: Option<u32>,

    /// Measurement iterations per subject
    #[arg(long)]
    measurement_iterations: Option<u32>,

    /// Wall-clock budget per iteration in milliseconds
    #[arg(long)]
    iteration_duration_ms: Option<u64>,

    /// Operations fired per iteration
    #[arg(long)]
    operations: Option<u64>,

    /// Trial isolation unit (process or thread)
    #[arg(long)]
    isolation: Option<IsolationMode>,

    /// Output format (table, json)
    #[arg(long, default_value = "table")]
    format: String,
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn main() -> anyhow::Result<()> {
    logging::init_logging();
    let cli = Cli::parse();

    let mut config = BenchConfig::from_env().context("loading configuration")?;
    if let Some(v) = cli.warmup_iterations {
        config.warmup_iterations = v;
    }
    if let Some(v) = cli.measurement_iterations {
        config.measurement_iterations = v;
    }
    if let Some(v) = cli.iteration_duration_ms {
        config.iteration_duration_ms = v;
    }
    if let Some(v) = cli.operations {
        config.operations_per_invocation = v;
    }
    if let Some(v) = cli.isolation {
        config.isolation = v;
    }

    let mut harness = Harness::new(config).context("constructing harness")?;
    subjects::register_all(&harness)?;

    // Child half of process isolation: one subject, one JSON record, done
    if let Some(record) = isolation::run_child_if_requested(harness.registry())? {
        println!("{}", serde_json::to_string(&record)?);
        return Ok(());
    }

    if cli.adapters.is_some() || cli.scenarios.is_some() {
        let adapters = cli
            .adapters
            .as_deref()
            .map(split_list)
            .unwrap_or_else(|| harness.registry().names());
        let scenarios = cli
            .scenarios
            .as_deref()
            .map(split_list)
            .unwrap_or_else(|| catalog::standard().into_iter().map(|s| s.name).collect());
        let pairs = scenarios
            .iter()
            .flat_map(|s| adapters.iter().map(move |a| (a.clone(), s.clone())))
            .collect();
        harness.select(pairs);
    }

    let records = harness.run();

    match cli.format.as_str() {
        "table" => print!("{}", report::render_table(&records)),
        "json" => println!("{}", serde_json::to_string_pretty(&records)?),
        other => bail!("unknown output format '{other}', expected 'table' or 'json'"),
    }

    if !records.is_empty() && records.iter().all(report::SubjectRecord::is_failed) {
        bail!("every subject failed");
    }
    Ok(())
}
