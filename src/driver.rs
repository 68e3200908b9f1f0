//! # Workload Driver
//!
//! Fires the deterministic event sequence against one machine and keeps the
//! computed side effects observable. After the loop the shared counters and
//! the final state are folded into a checkpoint that passes through
//! `black_box`, so an optimizing build cannot prove the measured work dead
//! and eliminate it.

use std::hint::black_box;
use std::time::{Duration, Instant};

use crate::adapter::MachineHandle;
use crate::context::WorkloadContext;
use crate::error::{BenchError, BenchResult};
use crate::scenario::ScenarioDefinition;

/// Operations between wall-clock reads. Keeps timer cost off the
/// per-operation path while still stopping an overrun near the boundary.
const BUDGET_CHECK_STRIDE: u64 = 64;

/// Outcome of one driven iteration
#[derive(Debug, Clone, Copy)]
pub struct DriveOutcome {
    /// Operations actually completed; less than requested when the budget
    /// elapsed first
    pub ops_completed: u64,
    pub elapsed: Duration,
    /// Whether the iteration was stopped at the wall-clock budget
    pub timed_out: bool,
    /// Folded side-effect value; consume it so the loop stays observable
    pub checkpoint: u64,
}

/// Fire `ops` events sequentially against the machine, stopping at the
/// wall-clock budget. The partial operation count of a stopped iteration is
/// reported faithfully, never rounded up. Any adapter error aborts the
/// iteration and propagates; the driver does not retry.
pub fn drive(
    machine: &mut dyn MachineHandle,
    scenario: &ScenarioDefinition,
    ctx: &WorkloadContext,
    ops: u64,
    budget: Duration,
) -> BenchResult<DriveOutcome> {
    let event = scenario.driving_event().ok_or_else(|| {
        BenchError::transition("-", format!("scenario '{}' has no transitions to drive", scenario.name))
    })?;
    let payload = scenario.payload.as_ref();

    let start = Instant::now();
    let mut completed: u64 = 0;
    let mut timed_out = false;

    while completed < ops {
        if completed % BUDGET_CHECK_STRIDE == 0 && start.elapsed() >= budget {
            timed_out = true;
            break;
        }
        match payload {
            Some(p) => machine.fire_with_payload(event, p)?,
            None => machine.fire(event)?,
        }
        completed += 1;
    }

    let elapsed = start.elapsed();
    let checkpoint = black_box(
        ctx.counter()
            .wrapping_add(ctx.accumulator())
            .wrapping_add(machine.current_state().index() as u64),
    );

    Ok(DriveOutcome {
        ops_completed: completed,
        elapsed,
        timed_out,
        checkpoint,
    })
}
