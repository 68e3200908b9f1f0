//! # Built-in Subjects
//!
//! Reference engines bundled with the harness. They anchor the reported
//! numbers (every run has at least these baselines to compare external
//! engines against) and double as the fixtures the integration tests drive.
//!
//! The two archetypes differ in how the topology reaches the fire path:
//! `table-driven` interprets a runtime transition table, `precompiled`
//! dispatches through code fixed at build time.

pub mod precompiled;
pub mod table_driven;

pub use precompiled::PrecompiledAdapter;
pub use table_driven::TableDrivenAdapter;

use crate::error::BenchResult;
use crate::protocol::Harness;
use std::sync::Arc;

/// Register both built-in engines with a harness
pub fn register_all(harness: &Harness) -> BenchResult<()> {
    harness.register(Arc::new(TableDrivenAdapter))?;
    harness.register(Arc::new(PrecompiledAdapter))?;
    Ok(())
}
