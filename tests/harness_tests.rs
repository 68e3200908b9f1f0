//! End-to-end harness behavior over the built-in subjects. Everything here
//! runs under thread isolation; process isolation would re-execute the test
//! binary.

use std::sync::Arc;

use fsmbench::subjects::{self, PrecompiledAdapter, TableDrivenAdapter};
use fsmbench::{
    catalog, BenchConfig, BenchError, EngineAdapter, EventId, Harness, IsolationMode, StateId,
    SubjectRecord, WorkloadContext,
};

fn thread_config(ops: u64) -> BenchConfig {
    BenchConfig {
        warmup_iterations: 1,
        measurement_iterations: 1,
        iteration_duration_ms: 10_000,
        operations_per_invocation: ops,
        isolation: IsolationMode::Thread,
    }
}

fn build_machine(
    adapter: &dyn EngineAdapter,
    scenario: &fsmbench::ScenarioDefinition,
) -> (Box<dyn fsmbench::MachineHandle>, Arc<WorkloadContext>) {
    let ctx = if scenario.requires_dispatcher() {
        Arc::new(WorkloadContext::with_dispatcher().unwrap())
    } else {
        Arc::new(WorkloadContext::new())
    };
    let machine = adapter.build(scenario, Arc::clone(&ctx)).unwrap();
    (machine, ctx)
}

#[test]
fn three_k_fires_return_to_the_initial_state() {
    let scenario = catalog::basic();
    let event = scenario.driving_event().unwrap();

    for adapter in [
        &TableDrivenAdapter as &dyn EngineAdapter,
        &PrecompiledAdapter,
    ] {
        let (mut machine, _ctx) = build_machine(adapter, &scenario);
        for k in 0..6u32 {
            assert_eq!(
                machine.current_state(),
                StateId::new(0),
                "{} after {} rounds",
                adapter.name(),
                k
            );
            for _ in 0..3 {
                machine.fire(event).unwrap();
            }
        }
        assert_eq!(machine.current_state(), StateId::new(0));
    }
}

#[test]
fn observation_is_idempotent() {
    let scenario = catalog::basic();
    let (mut machine, _ctx) = build_machine(&TableDrivenAdapter, &scenario);
    let event = scenario.driving_event().unwrap();

    machine.fire(event).unwrap();
    let first = machine.current_state();
    let second = machine.current_state();
    assert_eq!(first, second);

    // can_fire is observation too
    assert_eq!(machine.can_fire(event), machine.can_fire(event));
    assert_eq!(machine.current_state(), first);
}

#[test]
fn guarded_counter_equals_the_number_of_fires() {
    let scenario = catalog::guards_actions();
    let event = scenario.driving_event().unwrap();

    for adapter in [
        &TableDrivenAdapter as &dyn EngineAdapter,
        &PrecompiledAdapter,
    ] {
        let (mut machine, ctx) = build_machine(adapter, &scenario);
        for _ in 0..500 {
            machine.fire(event).unwrap();
        }
        assert_eq!(ctx.counter(), 500, "{}", adapter.name());
    }
}

#[test]
fn payload_accumulator_equals_count_times_value() {
    let scenario = catalog::payload();
    let event = scenario.driving_event().unwrap();
    let payload = scenario.payload.clone().unwrap();

    for adapter in [
        &TableDrivenAdapter as &dyn EngineAdapter,
        &PrecompiledAdapter,
    ] {
        let (mut machine, ctx) = build_machine(adapter, &scenario);
        for _ in 0..250 {
            machine.fire_with_payload(event, &payload).unwrap();
        }
        assert_eq!(ctx.accumulator(), 250 * payload.value, "{}", adapter.name());
    }
}

#[test]
fn dispatched_work_costs_at_least_as_much_as_inline_work() {
    // Identical unit of work, identical operation count; only the dispatch
    // mechanism differs, so the ordering must hold (no specific ratio).
    let mut harness = Harness::new(thread_config(2048)).unwrap();
    subjects::register_all(&harness).unwrap();
    harness.select(vec![
        ("table-driven".into(), "async-yield".into()),
        ("table-driven".into(), "async-hot".into()),
    ]);

    let records = harness.run();
    assert_eq!(records.len(), 2);
    let mean_of = |name: &str| {
        let record = records.iter().find(|r| r.scenario == name).unwrap();
        assert!(!record.is_failed(), "{name} failed: {:?}", record.failure);
        record.mean_ns_per_op.unwrap()
    };

    let yielded = mean_of("async-yield");
    let hot = mean_of("async-hot");
    assert!(
        yielded >= hot,
        "dispatch+wait ({yielded} ns/op) should not beat inline ({hot} ns/op)"
    );
}

#[test]
fn end_to_end_basic_run_produces_a_clean_record() {
    let mut harness = Harness::new(thread_config(1024)).unwrap();
    harness.register(Arc::new(TableDrivenAdapter)).unwrap();
    harness.select(vec![("table-driven".into(), "basic".into())]);

    let records = harness.run();
    assert_eq!(records.len(), 1);
    let record = &records[0];

    assert!(!record.is_failed(), "failure: {:?}", record.failure);
    assert_eq!(record.operations_per_invocation, 1024);
    assert_eq!(record.operations_recorded, 1024);
    assert!(record.mean_ns_per_op.unwrap() > 0.0);
}

#[test]
fn zero_budget_flags_every_subject_as_timed_out() {
    let config = BenchConfig {
        iteration_duration_ms: 0,
        ..thread_config(1024)
    };
    let harness = Harness::new(config).unwrap();
    subjects::register_all(&harness).unwrap();

    let records = harness.run();
    assert_eq!(records.len(), 10);
    for record in &records {
        assert!(!record.is_failed(), "{}: {:?}", record.subject_label(), record.failure);
        assert!(record.timed_out, "{} should be timed out", record.subject_label());
        assert_eq!(record.operations_recorded, 0, "{}", record.subject_label());
        assert_eq!(record.mean_ns_per_op, None, "{}", record.subject_label());
    }
}

#[test]
fn full_cross_product_measures_every_subject() {
    let harness = Harness::new(thread_config(192)).unwrap();
    subjects::register_all(&harness).unwrap();

    let records = harness.run();
    assert_eq!(records.len(), 10);
    for record in &records {
        assert!(!record.is_failed(), "{}: {:?}", record.subject_label(), record.failure);
        assert!(record.mean_ns_per_op.unwrap() > 0.0, "{}", record.subject_label());
        assert_eq!(record.operations_recorded, 192, "{}", record.subject_label());
    }

    let mut labels: Vec<String> = records.iter().map(SubjectRecord::subject_label).collect();
    labels.sort();
    labels.dedup();
    assert_eq!(labels.len(), 10, "every pairing appears exactly once");
}

#[test]
fn duplicate_source_event_pairs_are_invalid() {
    let mut scenario = catalog::basic();
    let duplicate = scenario.transitions[0].clone();
    scenario.transitions.push(duplicate);

    let err = scenario.validate().unwrap_err();
    assert!(matches!(err, BenchError::InvalidTopology { .. }));
}

#[test]
fn shape_mismatch_surfaces_as_an_engine_build_failure() {
    let mut scenario = catalog::basic();
    scenario.states.push("D".to_string());
    assert!(scenario.validate().is_ok());

    let ctx = Arc::new(WorkloadContext::new());
    let err = PrecompiledAdapter.build(&scenario, ctx).err().unwrap();
    assert!(matches!(err, BenchError::EngineBuild { .. }));
}

#[test]
fn can_fire_probes_without_changing_state() {
    let scenario = catalog::basic();
    let (machine, _ctx) = build_machine(&TableDrivenAdapter, &scenario);

    for _ in 0..5 {
        assert!(machine.can_fire(EventId::new(0)));
        assert!(!machine.can_fire(EventId::new(3)));
    }
    assert_eq!(machine.current_state(), StateId::new(0));
}
