//! # Precompiled Reference Engine
//!
//! The generated-code archetype: the three-state cycle is fixed in the
//! dispatch path at build time, so a fire is a branch over the current
//! state rather than a table lookup. Build rejects any scenario whose shape
//! the engine was not generated for; that rejection is how a catalog entry
//! legitimately excludes an engine from a pairing.

use std::sync::Arc;

use crate::adapter::{EngineAdapter, MachineHandle};
use crate::context::WorkloadContext;
use crate::error::{BenchError, BenchResult};
use crate::scenario::{ActionSpec, EventId, EventPayload, GuardSpec, ScenarioDefinition, StateId};

/// Adapter building fixed-shape machines for the canonical cycle
pub struct PrecompiledAdapter;

impl EngineAdapter for PrecompiledAdapter {
    fn name(&self) -> &str {
        "precompiled"
    }

    fn build(
        &self,
        scenario: &ScenarioDefinition,
        ctx: Arc<WorkloadContext>,
    ) -> BenchResult<Box<dyn MachineHandle>> {
        let (guard, action) = check_shape(scenario)
            .map_err(|reason| BenchError::engine_build(self.name(), &scenario.name, reason))?;

        if action.is_some_and(ActionSpec::needs_dispatcher) && !ctx.has_dispatcher() {
            return Err(BenchError::engine_build(
                self.name(),
                &scenario.name,
                "scenario dispatches work but the trial context has no dispatch runtime",
            ));
        }

        Ok(Box::new(PrecompiledMachine {
            current: 0,
            guard,
            action,
            ctx,
        }))
    }
}

/// Accept only the shape this engine's dispatch path was generated for:
/// three states, one event, the forward cycle, one initial state at A, and
/// a uniform guard/action across all transitions.
fn check_shape(
    scenario: &ScenarioDefinition,
) -> Result<(Option<GuardSpec>, Option<ActionSpec>), String> {
    if scenario.states.len() != 3 || scenario.events.len() != 1 {
        return Err(format!(
            "supports exactly 3 states and 1 event, scenario declares {} states and {} events",
            scenario.states.len(),
            scenario.events.len()
        ));
    }
    if scenario.initial != StateId::new(0) {
        return Err("supports only the first declared state as initial".to_string());
    }
    if scenario.transitions.len() != 3 {
        return Err(format!(
            "supports exactly 3 transitions, scenario declares {}",
            scenario.transitions.len()
        ));
    }

    let first = &scenario.transitions[0];
    for (i, transition) in scenario.transitions.iter().enumerate() {
        let source = StateId::new(i as u8);
        let target = StateId::new(((i + 1) % 3) as u8);
        if transition.source != source || transition.target != target {
            return Err(format!(
                "transition {i} does not follow the forward cycle"
            ));
        }
        if transition.event != EventId::new(0) {
            return Err(format!("transition {i} uses an event the dispatch path was not generated for"));
        }
        if transition.guard != first.guard || transition.action != first.action {
            return Err("guards and actions must be uniform across transitions".to_string());
        }
    }

    Ok((first.guard, first.action))
}

struct PrecompiledMachine {
    current: u8,
    guard: Option<GuardSpec>,
    action: Option<ActionSpec>,
    ctx: Arc<WorkloadContext>,
}

impl PrecompiledMachine {
    fn guard_permits(&self) -> bool {
        match self.guard {
            None => true,
            Some(GuardSpec::CounterBelow(bound)) => self.ctx.counter() < bound,
        }
    }

    fn state_label(&self) -> &'static str {
        match self.current {
            0 => "A",
            1 => "B",
            _ => "C",
        }
    }

    fn deliver(&mut self, event: EventId, payload: Option<&EventPayload>) -> BenchResult<()> {
        if event != EventId::new(0) {
            return Err(BenchError::transition(
                self.state_label(),
                format!("no transition for event {event}"),
            ));
        }
        if !self.guard_permits() {
            return Err(BenchError::transition(
                self.state_label(),
                "guard rejected the event",
            ));
        }

        match self.action {
            None => {}
            Some(ActionSpec::Increment) => self.ctx.increment_counter(),
            Some(ActionSpec::AccumulatePayload) => {
                let payload = payload.ok_or_else(|| {
                    BenchError::transition(
                        self.state_label(),
                        "payload-bearing action fired without a payload",
                    )
                })?;
                self.ctx.accumulate(payload.value);
            }
            Some(ActionSpec::DispatchedIncrement) => self.ctx.dispatched_increment()?,
            Some(ActionSpec::InlineFutureIncrement) => self.ctx.inline_future_increment(),
        }

        self.current = match self.current {
            0 => 1,
            1 => 2,
            _ => 0,
        };
        Ok(())
    }
}

impl MachineHandle for PrecompiledMachine {
    fn fire(&mut self, event: EventId) -> BenchResult<()> {
        self.deliver(event, None)
    }

    fn fire_with_payload(&mut self, event: EventId, payload: &EventPayload) -> BenchResult<()> {
        self.deliver(event, Some(payload))
    }

    fn can_fire(&self, event: EventId) -> bool {
        event == EventId::new(0) && self.guard_permits()
    }

    fn current_state(&self) -> StateId {
        StateId::new(self.current)
    }
}
