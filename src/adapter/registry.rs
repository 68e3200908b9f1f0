//! # Adapter Registry
//!
//! Named registration of benchmark subjects. Each registered name becomes a
//! subject dimension crossed against the scenario catalog. Registration
//! order is preserved so reports keep a stable shape across runs.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use super::EngineAdapter;
use crate::error::{BenchError, BenchResult};

/// Thread-safe registry of named engine adapters
pub struct AdapterRegistry {
    adapters: RwLock<Vec<Arc<dyn EngineAdapter>>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            adapters: RwLock::new(Vec::new()),
        }
    }

    /// Register an adapter under its own name. Duplicate names are rejected
    /// so two subjects can never be conflated in a report.
    pub fn register(&self, adapter: Arc<dyn EngineAdapter>) -> BenchResult<()> {
        let mut adapters = self.adapters.write();
        if adapters.iter().any(|a| a.name() == adapter.name()) {
            return Err(BenchError::registry(
                adapter.name(),
                "an adapter with this name is already registered",
            ));
        }

        info!(adapter = %adapter.name(), "Registered engine adapter");
        adapters.push(adapter);
        Ok(())
    }

    /// Look up an adapter by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn EngineAdapter>> {
        self.adapters
            .read()
            .iter()
            .find(|a| a.name() == name)
            .cloned()
    }

    /// Registered names, in registration order
    pub fn names(&self) -> Vec<String> {
        self.adapters
            .read()
            .iter()
            .map(|a| a.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.read().is_empty()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
