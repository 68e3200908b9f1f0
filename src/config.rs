//! # Harness Configuration
//!
//! Explicit, validated configuration for the measurement protocol. Defaults
//! match the reference workload arrangement (3 warmup iterations, 15
//! measurement iterations, 200ms per iteration, 1024 operations per
//! invocation); every knob can be overridden through `FSMBENCH_*`
//! environment variables or the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::BenchResult;

/// Execution unit each subject's trial runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsolationMode {
    /// Child process per subject, re-executing the harness binary
    Process,
    /// Dedicated OS thread per subject within the current process
    Thread,
}

impl fmt::Display for IsolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Process => write!(f, "process"),
            Self::Thread => write!(f, "thread"),
        }
    }
}

impl FromStr for IsolationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "process" => Ok(Self::Process),
            "thread" => Ok(Self::Thread),
            other => Err(format!(
                "unknown isolation mode '{other}', expected 'process' or 'thread'"
            )),
        }
    }
}

/// Measurement protocol knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Iterations run and discarded before measurement starts
    pub warmup_iterations: u32,

    /// Iterations whose timings are recorded and reduced
    pub measurement_iterations: u32,

    /// Wall-clock budget per iteration; an overrunning iteration stops at
    /// this boundary with its partial operation count recorded
    pub iteration_duration_ms: u64,

    /// Logical operations fired per iteration
    pub operations_per_invocation: u64,

    /// Execution unit per subject trial
    pub isolation: IsolationMode,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            warmup_iterations: 3,
            measurement_iterations: 15,
            iteration_duration_ms: 200,
            operations_per_invocation: 1024,
            isolation: IsolationMode::Process,
        }
    }
}

impl BenchConfig {
    /// Load configuration from `FSMBENCH_*` environment variables overlaid
    /// on the defaults.
    pub fn from_env() -> BenchResult<Self> {
        let source = config::Config::builder()
            .add_source(config::Environment::with_prefix("FSMBENCH").try_parsing(true))
            .build()?;
        let loaded: Self = source.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Wall-clock budget per iteration as a duration
    pub fn iteration_budget(&self) -> Duration {
        Duration::from_millis(self.iteration_duration_ms)
    }

    /// Reject configurations that cannot produce a meaningful measurement
    pub fn validate(&self) -> BenchResult<()> {
        if self.measurement_iterations == 0 {
            return Err(crate::error::BenchError::configuration(
                "measurement_iterations must be at least 1",
            ));
        }
        if self.operations_per_invocation == 0 {
            return Err(crate::error::BenchError::configuration(
                "operations_per_invocation must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_arrangement() {
        let config = BenchConfig::default();
        assert_eq!(config.warmup_iterations, 3);
        assert_eq!(config.measurement_iterations, 15);
        assert_eq!(config.iteration_duration_ms, 200);
        assert_eq!(config.operations_per_invocation, 1024);
        assert_eq!(config.isolation, IsolationMode::Process);
    }

    #[test]
    fn test_isolation_mode_round_trip() {
        assert_eq!(
            "process".parse::<IsolationMode>().unwrap(),
            IsolationMode::Process
        );
        assert_eq!(
            "thread".parse::<IsolationMode>().unwrap(),
            IsolationMode::Thread
        );
        assert!("fork".parse::<IsolationMode>().is_err());
        assert_eq!(IsolationMode::Thread.to_string(), "thread");
    }

    #[test]
    fn test_validate_rejects_zero_iterations() {
        let config = BenchConfig {
            measurement_iterations: 0,
            ..BenchConfig::default()
        };
        assert!(config.validate().is_err());

        let config = BenchConfig {
            operations_per_invocation: 0,
            ..BenchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_duration_budget_is_allowed() {
        // A zero budget is a valid way to probe the timeout path
        let config = BenchConfig {
            iteration_duration_ms: 0,
            ..BenchConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.iteration_budget(), Duration::ZERO);
    }
}
