//! # Scenario Model
//!
//! Declarative descriptions of the state/event topologies driven against
//! every engine, plus the fixed catalog of workloads. Scenarios are pure
//! data: they are constructed once at harness startup, validated before any
//! engine is built, and immutable afterwards.

pub mod catalog;
pub mod definition;

pub use definition::{
    ActionSpec, EventId, EventPayload, GuardSpec, ScenarioDefinition, StateId, TransitionDef,
};
