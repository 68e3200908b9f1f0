//! # Scenario Definitions
//!
//! The declarative scenario structure: closed state and event sets, an
//! initial state, and the transition graph with optional guards and actions.
//! Construction is not required to be efficient; it happens once.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{BenchError, BenchResult};

/// Opaque state identifier within a scenario's closed state set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateId(u8);

impl StateId {
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Opaque event identifier within a scenario's closed event set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(u8);

impl EventId {
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Immutable value object attached to a fired event. Lifetime is scoped to a
/// single delivery; actions read `value` and never mutate the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    pub value: u64,
    pub message: String,
}

impl EventPayload {
    pub fn new(value: u64, message: impl Into<String>) -> Self {
        Self {
            value,
            message: message.into(),
        }
    }
}

/// Side-effect-free predicate evaluated before a transition commits.
/// Guards may read the shared counters but never write them, so guard cost
/// stays separable from action cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardSpec {
    /// Permit the transition while the shared counter is below the bound
    CounterBelow(u64),
}

/// Unit of work executed when a transition commits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionSpec {
    /// Increment the shared counter inline
    Increment,
    /// Read the numeric payload field and add it to the shared accumulator
    AccumulatePayload,
    /// Run the counter increment on the dispatch runtime and wait for its
    /// completion signal before the transition finishes
    DispatchedIncrement,
    /// Drive the counter increment as an already-ready future, inline,
    /// with no scheduler involvement
    InlineFutureIncrement,
}

impl ActionSpec {
    /// Whether machines built for this action need a dispatch runtime
    pub fn needs_dispatcher(self) -> bool {
        matches!(self, Self::DispatchedIncrement)
    }

    /// Short label for logging
    pub fn kind(self) -> &'static str {
        match self {
            Self::Increment => "increment",
            Self::AccumulatePayload => "accumulate_payload",
            Self::DispatchedIncrement => "dispatched_increment",
            Self::InlineFutureIncrement => "inline_future_increment",
        }
    }
}

/// One edge of the transition graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionDef {
    pub source: StateId,
    pub target: StateId,
    pub event: EventId,
    pub guard: Option<GuardSpec>,
    pub action: Option<ActionSpec>,
}

/// A complete declarative scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    pub name: String,
    /// Display labels for the closed state set; `StateId` indexes into this
    pub states: Vec<String>,
    /// Display labels for the closed event set; `EventId` indexes into this
    pub events: Vec<String>,
    pub initial: StateId,
    pub transitions: Vec<TransitionDef>,
    /// Payload template attached to every delivery, when present
    pub payload: Option<EventPayload>,
}

impl ScenarioDefinition {
    /// Display label for a state, falling back to the raw identifier
    pub fn state_label(&self, id: StateId) -> &str {
        self.states
            .get(id.index())
            .map(String::as_str)
            .unwrap_or("?")
    }

    /// The event the workload driver fires. This topology family carries a
    /// single event; `None` means there is nothing to drive.
    pub fn driving_event(&self) -> Option<EventId> {
        self.transitions.first().map(|t| t.event)
    }

    /// Whether any transition action needs a dispatch runtime
    pub fn requires_dispatcher(&self) -> bool {
        self.transitions
            .iter()
            .any(|t| t.action.is_some_and(ActionSpec::needs_dispatcher))
    }

    /// Check the topology invariants. Must pass before any engine is built.
    ///
    /// Rejected: an empty state or event set, an initial state outside the
    /// declared set, a transition referencing an undeclared state or event,
    /// and more than one transition for the same (source, event) pair.
    pub fn validate(&self) -> BenchResult<()> {
        if self.states.is_empty() {
            return Err(BenchError::invalid_topology(&self.name, "no states declared"));
        }
        if self.events.is_empty() {
            return Err(BenchError::invalid_topology(&self.name, "no events declared"));
        }
        if self.initial.index() >= self.states.len() {
            return Err(BenchError::invalid_topology(
                &self.name,
                format!(
                    "initial state {} is outside the declared state set",
                    self.initial
                ),
            ));
        }

        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        for transition in &self.transitions {
            if transition.source.index() >= self.states.len() {
                return Err(BenchError::invalid_topology(
                    &self.name,
                    format!(
                        "transition source {} is outside the declared state set",
                        transition.source
                    ),
                ));
            }
            if transition.target.index() >= self.states.len() {
                return Err(BenchError::invalid_topology(
                    &self.name,
                    format!(
                        "transition target {} is outside the declared state set",
                        transition.target
                    ),
                ));
            }
            if transition.event.index() >= self.events.len() {
                return Err(BenchError::invalid_topology(
                    &self.name,
                    format!(
                        "transition event {} is outside the declared event set",
                        transition.event
                    ),
                ));
            }
            if !seen.insert((transition.source.index(), transition.event.index())) {
                return Err(BenchError::invalid_topology(
                    &self.name,
                    format!(
                        "state '{}' has more than one transition for event '{}'",
                        self.state_label(transition.source),
                        self.events[transition.event.index()],
                    ),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn three_state_cycle() -> ScenarioDefinition {
        let next = EventId::new(0);
        ScenarioDefinition {
            name: "cycle".to_string(),
            states: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            events: vec!["next".to_string()],
            initial: StateId::new(0),
            transitions: (0..3u8)
                .map(|i| TransitionDef {
                    source: StateId::new(i),
                    target: StateId::new((i + 1) % 3),
                    event: next,
                    guard: None,
                    action: None,
                })
                .collect(),
            payload: None,
        }
    }

    #[test]
    fn test_valid_cycle_passes() {
        assert!(three_state_cycle().validate().is_ok());
    }

    #[test]
    fn test_duplicate_source_event_pair_is_rejected() {
        let mut scenario = three_state_cycle();
        scenario.transitions.push(TransitionDef {
            source: StateId::new(0),
            target: StateId::new(2),
            event: EventId::new(0),
            guard: None,
            action: None,
        });
        let err = scenario.validate().unwrap_err();
        assert!(matches!(err, BenchError::InvalidTopology { .. }));
    }

    #[test]
    fn test_dangling_state_reference_is_rejected() {
        let mut scenario = three_state_cycle();
        scenario.transitions[1].target = StateId::new(7);
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn test_dangling_event_reference_is_rejected() {
        let mut scenario = three_state_cycle();
        scenario.transitions[2].event = EventId::new(3);
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn test_initial_outside_state_set_is_rejected() {
        let mut scenario = three_state_cycle();
        scenario.initial = StateId::new(3);
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn test_driving_event_and_dispatch_requirement() {
        let mut scenario = three_state_cycle();
        assert_eq!(scenario.driving_event(), Some(EventId::new(0)));
        assert!(!scenario.requires_dispatcher());

        scenario.transitions[0].action = Some(ActionSpec::DispatchedIncrement);
        assert!(scenario.requires_dispatcher());
    }

    proptest! {
        /// Appending any transition that reuses an existing (source, event)
        /// pair must fail validation regardless of its target.
        #[test]
        fn prop_reused_pair_always_rejected(source in 0u8..3, target in 0u8..3) {
            let mut scenario = three_state_cycle();
            scenario.transitions.push(TransitionDef {
                source: StateId::new(source),
                target: StateId::new(target),
                event: EventId::new(0),
                guard: None,
                action: None,
            });
            prop_assert!(scenario.validate().is_err());
        }

        /// A single transition per (source, event) pair keeps any relabeled
        /// cycle valid.
        #[test]
        fn prop_unique_pairs_accepted(rotation in 0u8..3) {
            let mut scenario = three_state_cycle();
            for transition in &mut scenario.transitions {
                transition.target = StateId::new((transition.target.index() as u8 + rotation) % 3);
            }
            prop_assert!(scenario.validate().is_ok());
        }
    }
}
