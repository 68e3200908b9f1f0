//! # Table-Driven Reference Engine
//!
//! Interprets any valid scenario through a dense (state x event) transition
//! table, the archetype of a runtime-configured engine. Every fire pays for
//! one table lookup, an optional guard read, and the attached action.

use std::sync::Arc;

use crate::adapter::{EngineAdapter, MachineHandle};
use crate::context::WorkloadContext;
use crate::error::{BenchError, BenchResult};
use crate::scenario::{ActionSpec, EventId, EventPayload, GuardSpec, ScenarioDefinition, StateId};

/// Adapter building table-interpreting machines
pub struct TableDrivenAdapter;

impl EngineAdapter for TableDrivenAdapter {
    fn name(&self) -> &str {
        "table-driven"
    }

    fn build(
        &self,
        scenario: &ScenarioDefinition,
        ctx: Arc<WorkloadContext>,
    ) -> BenchResult<Box<dyn MachineHandle>> {
        // The table layout below relies on in-range state and event ids
        scenario
            .validate()
            .map_err(|err| BenchError::engine_build(self.name(), &scenario.name, err.to_string()))?;

        if scenario.requires_dispatcher() && !ctx.has_dispatcher() {
            return Err(BenchError::engine_build(
                self.name(),
                &scenario.name,
                "scenario dispatches work but the trial context has no dispatch runtime",
            ));
        }

        let event_count = scenario.events.len();
        let mut table: Vec<Option<CompiledTransition>> =
            vec![None; scenario.states.len() * event_count];
        for transition in &scenario.transitions {
            let slot = transition.source.index() * event_count + transition.event.index();
            table[slot] = Some(CompiledTransition {
                target: transition.target,
                guard: transition.guard,
                action: transition.action,
            });
        }

        Ok(Box::new(TableMachine {
            current: scenario.initial,
            event_count,
            table,
            state_labels: scenario.states.clone(),
            ctx,
        }))
    }
}

#[derive(Debug, Clone, Copy)]
struct CompiledTransition {
    target: StateId,
    guard: Option<GuardSpec>,
    action: Option<ActionSpec>,
}

struct TableMachine {
    current: StateId,
    event_count: usize,
    table: Vec<Option<CompiledTransition>>,
    state_labels: Vec<String>,
    ctx: Arc<WorkloadContext>,
}

impl TableMachine {
    #[inline]
    fn row(&self, event: EventId) -> Option<&CompiledTransition> {
        self.table
            .get(self.current.index() * self.event_count + event.index())
            .and_then(Option::as_ref)
    }

    fn guard_permits(&self, guard: Option<GuardSpec>) -> bool {
        match guard {
            None => true,
            Some(GuardSpec::CounterBelow(bound)) => self.ctx.counter() < bound,
        }
    }

    fn current_label(&self) -> &str {
        self.state_labels
            .get(self.current.index())
            .map(String::as_str)
            .unwrap_or("?")
    }

    fn deliver(&mut self, event: EventId, payload: Option<&EventPayload>) -> BenchResult<()> {
        let transition = *self.row(event).ok_or_else(|| {
            BenchError::transition(
                self.current_label(),
                format!("no transition for event {event}"),
            )
        })?;

        if !self.guard_permits(transition.guard) {
            return Err(BenchError::transition(
                self.current_label(),
                "guard rejected the event",
            ));
        }

        match transition.action {
            None => {}
            Some(ActionSpec::Increment) => self.ctx.increment_counter(),
            Some(ActionSpec::AccumulatePayload) => {
                let payload = payload.ok_or_else(|| {
                    BenchError::transition(
                        self.current_label(),
                        "payload-bearing action fired without a payload",
                    )
                })?;
                self.ctx.accumulate(payload.value);
            }
            Some(ActionSpec::DispatchedIncrement) => self.ctx.dispatched_increment()?,
            Some(ActionSpec::InlineFutureIncrement) => self.ctx.inline_future_increment(),
        }

        self.current = transition.target;
        Ok(())
    }
}

impl MachineHandle for TableMachine {
    fn fire(&mut self, event: EventId) -> BenchResult<()> {
        self.deliver(event, None)
    }

    fn fire_with_payload(&mut self, event: EventId, payload: &EventPayload) -> BenchResult<()> {
        self.deliver(event, Some(payload))
    }

    fn can_fire(&self, event: EventId) -> bool {
        self.row(event)
            .is_some_and(|t| self.guard_permits(t.guard))
    }

    fn current_state(&self) -> StateId {
        self.current
    }
}
