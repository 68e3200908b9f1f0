//! # Measurement Protocol
//!
//! Orchestration of a benchmark run. The registered adapters are crossed
//! with the scenario catalog, every scenario is validated before any engine
//! is built, and then each subject is measured sequentially inside its own
//! isolation unit. A subject failure is recorded and the run continues;
//! subjects never poison each other.

pub mod isolation;
pub mod stats;
pub mod trial;

pub use stats::IterationStat;
pub use trial::{run_trial, TrialPhase};

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::{AdapterRegistry, EngineAdapter};
use crate::config::BenchConfig;
use crate::error::{BenchError, BenchResult};
use crate::report::SubjectRecord;
use crate::scenario::{catalog, ScenarioDefinition};

/// A benchmark run over registered adapters and selected scenarios
pub struct Harness {
    registry: AdapterRegistry,
    config: BenchConfig,
    /// (adapter, scenario) pairs to run; `None` means the full cross-product
    selection: Option<Vec<(String, String)>>,
}

impl Harness {
    pub fn new(config: BenchConfig) -> BenchResult<Self> {
        config.validate()?;
        Ok(Self {
            registry: AdapterRegistry::new(),
            config,
            selection: None,
        })
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Register a named adapter as a subject dimension
    pub fn register(&self, adapter: Arc<dyn EngineAdapter>) -> BenchResult<()> {
        self.registry.register(adapter)
    }

    /// Restrict the run to the given (adapter, scenario) pairs. Unknown
    /// names still produce records, marked failed, so a typo cannot
    /// silently narrow a comparison.
    pub fn select(&mut self, pairs: Vec<(String, String)>) {
        self.selection = Some(pairs);
    }

    /// The (adapter, scenario) pairs this run will measure, scenario-major
    /// so engines stay adjacent within each workload
    fn subject_pairs(&self, scenarios: &[ScenarioDefinition]) -> Vec<(String, String)> {
        match &self.selection {
            Some(pairs) => pairs.clone(),
            None => {
                let adapters = self.registry.names();
                scenarios
                    .iter()
                    .flat_map(|scenario| {
                        adapters
                            .iter()
                            .map(move |adapter| (adapter.clone(), scenario.name.clone()))
                    })
                    .collect()
            }
        }
    }

    /// Run every selected subject sequentially and return all records.
    /// Failures are recorded, never silently dropped, and never abort the
    /// remaining subjects.
    pub fn run(&self) -> Vec<SubjectRecord> {
        let scenarios = catalog::standard();
        let pairs = self.subject_pairs(&scenarios);
        let ops = self.config.operations_per_invocation;

        // Topology invariants are checked once, before any engine is built
        let mut validity: HashMap<&str, Option<BenchError>> = HashMap::new();
        for scenario in &scenarios {
            validity.insert(scenario.name.as_str(), scenario.validate().err());
        }

        info!(
            subjects = pairs.len(),
            isolation = %self.config.isolation,
            "🏁 Benchmark run starting"
        );

        let mut records = Vec::with_capacity(pairs.len());
        for (adapter_name, scenario_name) in pairs {
            let Some(adapter) = self.registry.get(&adapter_name) else {
                warn!(adapter = %adapter_name, "Selected adapter is not registered");
                records.push(SubjectRecord::failed(
                    &adapter_name,
                    &scenario_name,
                    ops,
                    format!("adapter '{adapter_name}' is not registered"),
                ));
                continue;
            };
            let Some(scenario) = scenarios.iter().find(|s| s.name == scenario_name) else {
                warn!(scenario = %scenario_name, "Selected scenario is not in the catalog");
                records.push(SubjectRecord::failed(
                    &adapter_name,
                    &scenario_name,
                    ops,
                    format!("scenario '{scenario_name}' is not in the catalog"),
                ));
                continue;
            };
            if let Some(Some(err)) = validity.get(scenario.name.as_str()) {
                records.push(SubjectRecord::failed(
                    &adapter_name,
                    &scenario_name,
                    ops,
                    err.to_string(),
                ));
                continue;
            }

            info!(adapter = %adapter_name, scenario = %scenario_name, "Running subject");
            let record = isolation::run_subject(adapter, scenario, &self.config);
            match &record.failure {
                Some(reason) => {
                    warn!(subject = %record.subject_label(), reason = %reason, "Subject failed")
                }
                None => info!(
                    subject = %record.subject_label(),
                    mean_ns_per_op = ?record.mean_ns_per_op,
                    timed_out = record.timed_out,
                    "Subject complete"
                ),
            }
            records.push(record);
        }

        info!(records = records.len(), "Benchmark run complete");
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IsolationMode;
    use crate::subjects;

    fn thread_config() -> BenchConfig {
        BenchConfig {
            warmup_iterations: 0,
            measurement_iterations: 1,
            iteration_duration_ms: 5_000,
            operations_per_invocation: 64,
            isolation: IsolationMode::Thread,
        }
    }

    #[test]
    fn test_default_selection_is_the_full_cross_product() {
        let harness = Harness::new(thread_config()).unwrap();
        subjects::register_all(&harness).unwrap();

        let pairs = harness.subject_pairs(&catalog::standard());
        assert_eq!(pairs.len(), 10);
        // Scenario-major: both adapters appear before the next scenario
        assert_eq!(pairs[0], ("table-driven".into(), "basic".into()));
        assert_eq!(pairs[1], ("precompiled".into(), "basic".into()));
    }

    #[test]
    fn test_unknown_selection_names_produce_failed_records() {
        let mut harness = Harness::new(thread_config()).unwrap();
        subjects::register_all(&harness).unwrap();
        harness.select(vec![
            ("no-such-engine".into(), "basic".into()),
            ("table-driven".into(), "no-such-scenario".into()),
        ]);

        let records = harness.run();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(SubjectRecord::is_failed));
    }

    #[test]
    fn test_invalid_config_is_rejected_at_construction() {
        let config = BenchConfig {
            measurement_iterations: 0,
            ..thread_config()
        };
        assert!(Harness::new(config).is_err());
    }
}
