//! # Harness Error Types
//!
//! Structured error handling for the benchmark harness using thiserror
//! for typed failures instead of `Box<dyn Error>` patterns. Every failure
//! ends up in the affected subject's result record; none abort the run.

use thiserror::Error;

/// Failures surfaced by the harness and the subjects it measures
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Invalid topology in scenario '{scenario}': {reason}")]
    InvalidTopology { scenario: String, reason: String },

    #[error("Engine '{adapter}' failed to build a machine for scenario '{scenario}': {reason}")]
    EngineBuild {
        adapter: String,
        scenario: String,
        reason: String,
    },

    #[error("Transition failed in state '{state}': {reason}")]
    Transition { state: String, reason: String },

    #[error("Adapter registration failed for '{name}': {reason}")]
    Registry { name: String, reason: String },

    #[error("Isolation failure for subject '{subject}': {reason}")]
    Isolation { subject: String, reason: String },

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },
}

impl BenchError {
    /// Create an invalid topology error
    pub fn invalid_topology(scenario: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTopology {
            scenario: scenario.into(),
            reason: reason.into(),
        }
    }

    /// Create an engine build error
    pub fn engine_build(
        adapter: impl Into<String>,
        scenario: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::EngineBuild {
            adapter: adapter.into(),
            scenario: scenario.into(),
            reason: reason.into(),
        }
    }

    /// Create a transition error
    pub fn transition(state: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transition {
            state: state.into(),
            reason: reason.into(),
        }
    }

    /// Create a registration error
    pub fn registry(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Registry {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an isolation error
    pub fn isolation(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Isolation {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Check if this error occurred while delivering an event
    pub fn is_transition(&self) -> bool {
        matches!(self, Self::Transition { .. })
    }
}

/// Conversion from configuration loading errors
impl From<config::ConfigError> for BenchError {
    fn from(err: config::ConfigError) -> Self {
        BenchError::configuration(err.to_string())
    }
}

/// Result type alias for harness operations
pub type BenchResult<T> = Result<T, BenchError>;
