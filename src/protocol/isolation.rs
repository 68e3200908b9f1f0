//! # Subject Isolation
//!
//! Every subject trial runs in a fresh execution unit, torn down completely
//! before the next subject begins, so one engine's warm state, allocation
//! pressure, or background work cannot bleed into another's measurement.
//! This is a correctness requirement for cross-engine comparison, not an
//! optimization.
//!
//! Two units are supported. `thread` spawns a dedicated named OS thread
//! inside the current process. `process` re-executes the harness binary in
//! child mode: the child runs exactly one subject and prints its record as
//! one JSON object on stdout (logging goes to stderr), and the parent
//! parses that record. Isolation failures surface as failed records, never
//! as panics.

use std::process::Command;
use std::sync::Arc;
use std::thread;

use tracing::debug;

use crate::adapter::{AdapterRegistry, EngineAdapter};
use crate::config::{BenchConfig, IsolationMode};
use crate::error::{BenchError, BenchResult};
use crate::protocol::trial::run_trial;
use crate::report::SubjectRecord;
use crate::scenario::{catalog, ScenarioDefinition};

/// Environment variable naming the child's subject as "adapter/scenario"
pub const CHILD_SUBJECT_ENV: &str = "FSMBENCH_CHILD_SUBJECT";

/// Environment variable carrying the child's configuration as JSON
pub const CHILD_CONFIG_ENV: &str = "FSMBENCH_CHILD_CONFIG";

/// Run one subject in the isolation unit the configuration asks for
pub fn run_subject(
    adapter: Arc<dyn EngineAdapter>,
    scenario: &ScenarioDefinition,
    config: &BenchConfig,
) -> SubjectRecord {
    match config.isolation {
        IsolationMode::Thread => run_in_thread(adapter, scenario, config),
        IsolationMode::Process => run_in_process(adapter.name(), &scenario.name, config),
    }
}

fn run_in_thread(
    adapter: Arc<dyn EngineAdapter>,
    scenario: &ScenarioDefinition,
    config: &BenchConfig,
) -> SubjectRecord {
    let label = format!("{}/{}", adapter.name(), scenario.name);
    let thread_name = format!("subject-{}-{}", adapter.name(), scenario.name);
    debug!(subject = %label, thread = %thread_name, "Spawning subject thread");

    let scenario = scenario.clone();
    let trial_config = config.clone();
    let spawned = thread::Builder::new()
        .name(thread_name)
        .spawn(move || run_trial(adapter.as_ref(), &scenario, &trial_config));

    let handle = match spawned {
        Ok(handle) => handle,
        Err(err) => {
            return SubjectRecord::failed(
                label_adapter(&label),
                label_scenario(&label),
                config.operations_per_invocation,
                format!("failed to spawn subject thread: {err}"),
            )
        }
    };

    match handle.join() {
        Ok(record) => record,
        Err(_) => SubjectRecord::failed(
            label_adapter(&label),
            label_scenario(&label),
            config.operations_per_invocation,
            "subject thread panicked",
        ),
    }
}

fn run_in_process(adapter: &str, scenario: &str, config: &BenchConfig) -> SubjectRecord {
    let label = format!("{adapter}/{scenario}");
    let ops = config.operations_per_invocation;

    let fail = |reason: String| SubjectRecord::failed(adapter, scenario, ops, reason);

    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(err) => return fail(format!("cannot locate the harness binary: {err}")),
    };
    let config_json = match serde_json::to_string(config) {
        Ok(json) => json,
        Err(err) => return fail(format!("cannot encode child configuration: {err}")),
    };

    debug!(subject = %label, exe = %exe.display(), "Spawning subject process");
    let output = match Command::new(&exe)
        .env(CHILD_SUBJECT_ENV, &label)
        .env(CHILD_CONFIG_ENV, &config_json)
        .output()
    {
        Ok(output) => output,
        Err(err) => return fail(format!("failed to spawn subject process: {err}")),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail: String = stderr
            .lines()
            .next_back()
            .unwrap_or("no diagnostic output")
            .to_string();
        return fail(format!(
            "subject process exited with {}: {tail}",
            output.status
        ));
    }

    match serde_json::from_slice::<SubjectRecord>(&output.stdout) {
        Ok(record) => record,
        Err(err) => fail(format!("unreadable record from subject process: {err}")),
    }
}

fn label_adapter(label: &str) -> &str {
    label.split_once('/').map_or(label, |(a, _)| a)
}

fn label_scenario(label: &str) -> &str {
    label.split_once('/').map_or("", |(_, s)| s)
}

/// The child half of process isolation. When the subject environment
/// variables are present, run that single subject directly (the fresh
/// process is the isolation unit) and return its record for the caller to
/// print on stdout. Returns `Ok(None)` when not launched as a child.
pub fn run_child_if_requested(registry: &AdapterRegistry) -> BenchResult<Option<SubjectRecord>> {
    let Ok(label) = std::env::var(CHILD_SUBJECT_ENV) else {
        return Ok(None);
    };

    let (adapter_name, scenario_name) = label.split_once('/').ok_or_else(|| {
        BenchError::isolation(&label, "subject label is not of the form adapter/scenario")
    })?;

    let config_json = std::env::var(CHILD_CONFIG_ENV)
        .map_err(|_| BenchError::isolation(&label, "child configuration variable is missing"))?;
    let config: BenchConfig = serde_json::from_str(&config_json)
        .map_err(|err| BenchError::isolation(&label, format!("unreadable configuration: {err}")))?;

    let adapter = registry.get(adapter_name).ok_or_else(|| {
        BenchError::isolation(&label, format!("adapter '{adapter_name}' is not registered"))
    })?;
    let scenario = catalog::by_name(scenario_name).ok_or_else(|| {
        BenchError::isolation(&label, format!("scenario '{scenario_name}' is not in the catalog"))
    })?;

    Ok(Some(run_trial(adapter.as_ref(), &scenario, &config)))
}
