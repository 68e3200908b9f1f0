//! # Engine Adapter Contract
//!
//! The uniform capability surface wrapping one concrete FSM engine so the
//! harness can build machines from a scenario definition and drive them
//! identically regardless of the underlying implementation.
//!
//! Adapters deliberately do not normalize away each engine's idiomatic API
//! shape. The harness compares engines as used in practice, so an engine
//! that builds message objects or routes payloads through its own channel
//! keeps that cost inside its `fire` implementation.

pub mod registry;

pub use registry::AdapterRegistry;

use std::sync::Arc;

use crate::context::WorkloadContext;
use crate::error::BenchResult;
use crate::scenario::{EventId, EventPayload, ScenarioDefinition, StateId};

/// A running machine, exclusively owned by the trial that built it.
/// Mutated only through event delivery.
pub trait MachineHandle: Send {
    /// Deliver one event. Returns once any attached action has completed
    /// per its own synchronicity semantics and the resulting state is
    /// committed.
    fn fire(&mut self, event: EventId) -> BenchResult<()>;

    /// Payload-carrying delivery. The payload must reach the action through
    /// the engine's native mechanism, not a side channel.
    fn fire_with_payload(&mut self, event: EventId, payload: &EventPayload) -> BenchResult<()>;

    /// Whether the event would currently be accepted. No side effect.
    fn can_fire(&self, event: EventId) -> bool;

    /// The current committed state. No side effect.
    fn current_state(&self) -> StateId;
}

/// Builds and starts machines for one concrete engine implementation
pub trait EngineAdapter: Send + Sync {
    /// Subject name this adapter is registered under
    fn name(&self) -> &str;

    /// Construct and start an engine-specific machine for the scenario.
    /// Construction failures surface as [`crate::BenchError::EngineBuild`];
    /// they exclude the (adapter, scenario) pairing from results and are
    /// never retried.
    fn build(
        &self,
        scenario: &ScenarioDefinition,
        ctx: Arc<WorkloadContext>,
    ) -> BenchResult<Box<dyn MachineHandle>>;
}
