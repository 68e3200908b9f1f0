//! # Trial Execution
//!
//! One complete warmup+measurement run for a single subject. Warmup
//! iterations let the machine and its runtime reach steady state before any
//! number counts; only then are iterations recorded. Each trial gets a
//! fresh context and a fresh machine, so nothing carries over from a
//! previous subject.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapter::EngineAdapter;
use crate::config::BenchConfig;
use crate::context::WorkloadContext;
use crate::driver::drive;
use crate::error::BenchResult;
use crate::protocol::stats::IterationStat;
use crate::report::SubjectRecord;
use crate::scenario::ScenarioDefinition;

/// Phases of a subject trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialPhase {
    /// Nothing built yet
    Cold,
    /// Iterations run and discarded
    Warmup,
    /// Iterations recorded
    Measure,
    /// Statistics reduced
    Done,
}

impl fmt::Display for TrialPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cold => write!(f, "cold"),
            Self::Warmup => write!(f, "warmup"),
            Self::Measure => write!(f, "measure"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Failed iterations tolerated as transient before the subject is marked
/// failed. A partial iteration is always discarded, never averaged in.
const TRANSIENT_FAILURE_TOLERANCE: u32 = 1;

fn build_context(scenario: &ScenarioDefinition) -> BenchResult<WorkloadContext> {
    if scenario.requires_dispatcher() {
        WorkloadContext::with_dispatcher()
    } else {
        Ok(WorkloadContext::new())
    }
}

/// Run the full trial for one subject and reduce it into a record.
/// Failures land in the record; this function never panics on subject
/// misbehavior short of the machine itself panicking.
pub fn run_trial(
    adapter: &dyn EngineAdapter,
    scenario: &ScenarioDefinition,
    config: &BenchConfig,
) -> SubjectRecord {
    let adapter_name = adapter.name().to_string();
    let ops = config.operations_per_invocation;
    let budget = config.iteration_budget();

    let mut phase = TrialPhase::Cold;
    debug!(adapter = %adapter_name, scenario = %scenario.name, phase = %phase, "Trial starting");

    let ctx = match build_context(scenario) {
        Ok(ctx) => Arc::new(ctx),
        Err(err) => {
            warn!(adapter = %adapter_name, scenario = %scenario.name, error = %err, "Context construction failed");
            return SubjectRecord::failed(adapter_name, &scenario.name, ops, err.to_string());
        }
    };
    // Counters are trial-scoped; start the single-writer window from zero
    ctx.reset();

    let mut machine = match adapter.build(scenario, Arc::clone(&ctx)) {
        Ok(machine) => machine,
        Err(err) => {
            warn!(adapter = %adapter_name, scenario = %scenario.name, error = %err, "Engine build failed");
            return SubjectRecord::failed(adapter_name, &scenario.name, ops, err.to_string());
        }
    };

    let mut transient_failures: u32 = 0;

    phase = TrialPhase::Warmup;
    debug!(adapter = %adapter_name, scenario = %scenario.name, phase = %phase, iterations = config.warmup_iterations, "Phase transition");
    for iteration in 0..config.warmup_iterations {
        if let Err(err) = drive(machine.as_mut(), scenario, &ctx, ops, budget) {
            transient_failures += 1;
            warn!(
                adapter = %adapter_name,
                scenario = %scenario.name,
                iteration,
                error = %err,
                "Warmup iteration failed"
            );
            if transient_failures > TRANSIENT_FAILURE_TOLERANCE {
                return SubjectRecord::failed(adapter_name, &scenario.name, ops, err.to_string());
            }
        }
    }

    phase = TrialPhase::Measure;
    debug!(adapter = %adapter_name, scenario = %scenario.name, phase = %phase, iterations = config.measurement_iterations, "Phase transition");
    let mut recorded = Vec::with_capacity(config.measurement_iterations as usize);
    for iteration in 0..config.measurement_iterations {
        match drive(machine.as_mut(), scenario, &ctx, ops, budget) {
            Ok(outcome) => {
                // Consume the checkpoint here as well so the fold above
                // stays observable across inlining
                std::hint::black_box(outcome.checkpoint);
                recorded.push(IterationStat {
                    elapsed: outcome.elapsed,
                    ops: outcome.ops_completed,
                    timed_out: outcome.timed_out,
                });
            }
            Err(err) => {
                transient_failures += 1;
                warn!(
                    adapter = %adapter_name,
                    scenario = %scenario.name,
                    iteration,
                    error = %err,
                    "Measurement iteration failed, partial iteration discarded"
                );
                if transient_failures > TRANSIENT_FAILURE_TOLERANCE {
                    return SubjectRecord::failed(
                        adapter_name,
                        &scenario.name,
                        ops,
                        err.to_string(),
                    );
                }
            }
        }
    }

    phase = TrialPhase::Done;
    debug!(adapter = %adapter_name, scenario = %scenario.name, phase = %phase, "Phase transition");
    SubjectRecord::from_stats(adapter_name, &scenario.name, ops, &recorded)
}
