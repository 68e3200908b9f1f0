//! # Workload Context
//!
//! Trial-scoped shared state read by guards and mutated by actions. One
//! context exists per subject trial; guards only ever read the counters and
//! the driver is the only logical writer path, so plain relaxed atomics are
//! sufficient. The context also owns the dispatch runtime used by actions
//! that run their unit of work on a separate execution context, so tearing
//! the context down at trial end reclaims every worker thread before the
//! next subject starts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam::channel::{self, Receiver, Sender};
use futures::FutureExt;
use tokio::runtime::Runtime;

use crate::error::{BenchError, BenchResult};

/// Dispatch target for actions executed on a separate execution context.
struct AsyncDispatcher {
    runtime: Runtime,
    completion_tx: Sender<()>,
    completion_rx: Receiver<()>,
}

impl AsyncDispatcher {
    fn new() -> BenchResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("fsmbench-dispatch")
            .enable_all()
            .build()
            .map_err(|e| {
                BenchError::configuration(format!("failed to start dispatch runtime: {e}"))
            })?;

        // Event delivery is strictly sequential, so at most one completion
        // signal is ever outstanding.
        let (completion_tx, completion_rx) = channel::bounded(1);

        Ok(Self {
            runtime,
            completion_tx,
            completion_rx,
        })
    }
}

/// Shared counters and dispatch facilities scoped to a single trial
pub struct WorkloadContext {
    counter: Arc<AtomicU64>,
    accumulator: Arc<AtomicU64>,
    dispatcher: Option<AsyncDispatcher>,
}

impl WorkloadContext {
    /// Context for scenarios whose actions all run inline
    pub fn new() -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(0)),
            accumulator: Arc::new(AtomicU64::new(0)),
            dispatcher: None,
        }
    }

    /// Context with an owned dispatch runtime for scheduler-hop actions
    pub fn with_dispatcher() -> BenchResult<Self> {
        Ok(Self {
            counter: Arc::new(AtomicU64::new(0)),
            accumulator: Arc::new(AtomicU64::new(0)),
            dispatcher: Some(AsyncDispatcher::new()?),
        })
    }

    /// Whether a dispatch runtime is attached
    pub fn has_dispatcher(&self) -> bool {
        self.dispatcher.is_some()
    }

    /// Current value of the shared counter
    pub fn counter(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    /// Current value of the shared payload accumulator
    pub fn accumulator(&self) -> u64 {
        self.accumulator.load(Ordering::Relaxed)
    }

    /// Zero both counters. Called at trial start.
    pub fn reset(&self) {
        self.counter.store(0, Ordering::Relaxed);
        self.accumulator.store(0, Ordering::Relaxed);
    }

    /// Counter increment executed inline
    pub fn increment_counter(&self) {
        self.counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Add a payload value to the shared accumulator
    pub fn accumulate(&self, value: u64) {
        self.accumulator.fetch_add(value, Ordering::Relaxed);
    }

    /// Counter increment executed on the dispatch runtime. Blocks until the
    /// completion signal is observed, so the calling transition does not
    /// finish before the dispatched work does.
    pub fn dispatched_increment(&self) -> BenchResult<()> {
        let dispatcher = self.dispatcher.as_ref().ok_or_else(|| {
            BenchError::transition(
                "dispatch",
                "scenario requires a dispatch runtime but none was attached",
            )
        })?;

        let counter = Arc::clone(&self.counter);
        let tx = dispatcher.completion_tx.clone();
        dispatcher.runtime.spawn(async move {
            counter.fetch_add(1, Ordering::Relaxed);
            let _ = tx.send(());
        });

        dispatcher.completion_rx.recv().map_err(|_| {
            BenchError::transition("dispatch", "dispatch runtime dropped the completion signal")
        })
    }

    /// The same counter increment wrapped in a future and driven to
    /// completion inline. The future is ready on its first poll; no
    /// scheduler is involved.
    pub fn inline_future_increment(&self) {
        let counter = Arc::clone(&self.counter);
        let done = async move {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        .now_or_never();
        debug_assert!(done.is_some());
    }
}

impl Default for WorkloadContext {
    fn default() -> Self {
        Self::new()
    }
}
