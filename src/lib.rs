#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # fsmbench
//!
//! Cross-implementation micro-benchmark harness for finite-state-machine
//! engines.
//!
//! ## Overview
//!
//! Given several FSM engine implementations wrapped behind pluggable
//! adapters, fsmbench measures per-transition cost under a fixed set of
//! representative workloads and reduces repeated trials into comparable
//! nanoseconds-per-operation numbers. The engines under test are opaque;
//! the harness only depends on the adapter capability surface.
//!
//! ## Architecture
//!
//! Each registered adapter is paired with every workload in the scenario
//! catalog to form a **subject**. Subjects run strictly sequentially, each
//! inside a fresh isolation unit (a child process by default, a dedicated
//! thread otherwise), through a warmup/measurement trial whose recorded
//! iterations are reduced to a single mean time per logical operation.
//!
//! ## Module Organization
//!
//! - [`scenario`] - Declarative workload topologies and the fixed catalog
//! - [`adapter`] - Engine adapter contract and named registration
//! - [`subjects`] - Built-in reference engines
//! - [`context`] - Trial-scoped counters and async dispatch
//! - [`driver`] - The measured event-firing loop
//! - [`protocol`] - Warmup/measurement trials, isolation, statistics
//! - [`report`] - Per-subject result records and table rendering
//! - [`config`] - Harness configuration knobs
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fsmbench::{BenchConfig, Harness, IsolationMode};
//! use fsmbench::subjects::TableDrivenAdapter;
//!
//! # fn main() -> fsmbench::BenchResult<()> {
//! let mut config = BenchConfig::default();
//! config.isolation = IsolationMode::Thread;
//!
//! let harness = Harness::new(config)?;
//! harness.register(Arc::new(TableDrivenAdapter))?;
//!
//! for record in harness.run() {
//!     println!("{}: {:?} ns/op", record.subject_label(), record.mean_ns_per_op);
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod report;
pub mod scenario;
pub mod subjects;

pub use adapter::{AdapterRegistry, EngineAdapter, MachineHandle};
pub use config::{BenchConfig, IsolationMode};
pub use context::WorkloadContext;
pub use error::{BenchError, BenchResult};
pub use protocol::Harness;
pub use report::SubjectRecord;
pub use scenario::{
    catalog, ActionSpec, EventId, EventPayload, GuardSpec, ScenarioDefinition, StateId,
    TransitionDef,
};
