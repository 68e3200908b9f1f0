//! # Scenario Catalog
//!
//! The fixed set of workloads applied uniformly to every adapter. All five
//! share the same three-state, single-event cycle (A to B to C back to A)
//! and differ only in guard, action, and payload usage, so subject numbers
//! stay comparable across engines.

use super::definition::{
    ActionSpec, EventId, EventPayload, GuardSpec, ScenarioDefinition, StateId, TransitionDef,
};

/// Guard bound for the guarded workload. High enough that the guard always
/// permits progress; its evaluation cost is what gets measured.
const GUARD_BOUND: u64 = u64::MAX;

/// Numeric payload field carried per delivery in the payload workload
pub const PAYLOAD_VALUE: u64 = 42;

/// Pure dispatch overhead: no guard, no action
pub const BASIC: &str = "basic";
/// Guard evaluation plus a counter-increment action
pub const GUARDS_ACTIONS: &str = "guards-actions";
/// Payload plumbing plus a read-and-accumulate action
pub const PAYLOAD: &str = "payload";
/// Action dispatched to another execution context, awaited per transition
pub const ASYNC_YIELD: &str = "async-yield";
/// The same unit of work driven inline, the baseline for the yield overhead
pub const ASYNC_HOT: &str = "async-hot";

fn cycle(
    name: &str,
    guard: Option<GuardSpec>,
    action: Option<ActionSpec>,
    payload: Option<EventPayload>,
) -> ScenarioDefinition {
    let next = EventId::new(0);
    ScenarioDefinition {
        name: name.to_string(),
        states: vec!["A".to_string(), "B".to_string(), "C".to_string()],
        events: vec!["next".to_string()],
        initial: StateId::new(0),
        transitions: (0..3u8)
            .map(|i| TransitionDef {
                source: StateId::new(i),
                target: StateId::new((i + 1) % 3),
                event: next,
                guard,
                action,
            })
            .collect(),
        payload,
    }
}

pub fn basic() -> ScenarioDefinition {
    cycle(BASIC, None, None, None)
}

pub fn guards_actions() -> ScenarioDefinition {
    cycle(
        GUARDS_ACTIONS,
        Some(GuardSpec::CounterBelow(GUARD_BOUND)),
        Some(ActionSpec::Increment),
        None,
    )
}

pub fn payload() -> ScenarioDefinition {
    cycle(
        PAYLOAD,
        None,
        Some(ActionSpec::AccumulatePayload),
        Some(EventPayload::new(PAYLOAD_VALUE, "test")),
    )
}

pub fn async_yield() -> ScenarioDefinition {
    cycle(ASYNC_YIELD, None, Some(ActionSpec::DispatchedIncrement), None)
}

pub fn async_hot() -> ScenarioDefinition {
    cycle(ASYNC_HOT, None, Some(ActionSpec::InlineFutureIncrement), None)
}

/// The full fixed catalog, in reporting order
pub fn standard() -> Vec<ScenarioDefinition> {
    vec![
        basic(),
        guards_actions(),
        payload(),
        async_yield(),
        async_hot(),
    ]
}

/// Look up one catalog scenario by name
pub fn by_name(name: &str) -> Option<ScenarioDefinition> {
    standard().into_iter().find(|s| s.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_catalog_scenario_is_valid() {
        for scenario in standard() {
            scenario
                .validate()
                .unwrap_or_else(|e| panic!("{} failed validation: {e}", scenario.name));
        }
    }

    #[test]
    fn test_catalog_names_are_unique_and_ordered() {
        let names: Vec<String> = standard().into_iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![BASIC, GUARDS_ACTIONS, PAYLOAD, ASYNC_YIELD, ASYNC_HOT]
        );
    }

    #[test]
    fn test_yield_and_hot_share_everything_but_the_dispatch() {
        let yielded = async_yield();
        let hot = async_hot();
        assert_eq!(yielded.states, hot.states);
        assert_eq!(yielded.events, hot.events);
        assert_eq!(yielded.initial, hot.initial);
        assert_eq!(yielded.transitions.len(), hot.transitions.len());
        for (y, h) in yielded.transitions.iter().zip(&hot.transitions) {
            assert_eq!(y.source, h.source);
            assert_eq!(y.target, h.target);
            assert_eq!(y.event, h.event);
            assert_eq!(y.guard, h.guard);
        }
        assert!(yielded.requires_dispatcher());
        assert!(!hot.requires_dispatcher());
    }

    #[test]
    fn test_only_payload_scenario_carries_a_payload() {
        for scenario in standard() {
            assert_eq!(scenario.payload.is_some(), scenario.name == PAYLOAD);
        }
        assert_eq!(by_name(PAYLOAD).unwrap().payload.unwrap().value, PAYLOAD_VALUE);
    }

    #[test]
    fn test_by_name_misses_unknown_scenarios() {
        assert!(by_name("helper").is_none());
    }
}
