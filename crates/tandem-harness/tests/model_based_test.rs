//! Model-based property tests.
//!
//! Proptest generates random operation sequences and applies them to both
//! the reference model and the real engine. After EVERY operation the test
//! asserts:
//!
//! - The engine emitted exactly the notifications the model predicts
//! - The session store's structural invariants hold (symmetric pairing
//!   table, duplicate-free queue, disjointness, derived-state agreement)
//! - The observable state (queue order, pairs, known set) matches the model
//! - The population counters agree with the observable state

use proptest::prelude::*;
use tandem_core::{Engine, EngineConfig, SessionState, SkipBehavior};
use tandem_harness::{ModelWorld, ObservableState, Operation, check_store_invariants};

fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        any::<u8>().prop_map(|actor| Operation::RequestMatch { actor }),
        any::<u8>().prop_map(|actor| Operation::Skip { actor }),
        any::<u8>().prop_map(|actor| Operation::Leave { actor }),
        (any::<u8>(), any::<bool>())
            .prop_map(|(actor, clean)| Operation::SendMessage { actor, clean }),
    ]
}

fn run_against_model(
    skip_behavior: SkipBehavior,
    ops: &[Operation],
) -> Result<(), TestCaseError> {
    let mut engine = Engine::new(EngineConfig { skip_behavior });
    let mut model = ModelWorld::new(skip_behavior);

    for op in ops {
        let expected = model.apply(op);
        let actual = engine.handle(op.event());
        prop_assert_eq!(&actual, &expected, "notification mismatch on {:?}", op);

        if let Err(violation) = check_store_invariants(engine.store()) {
            return Err(TestCaseError::fail(violation));
        }

        let observed = ObservableState::of_engine(&engine);
        prop_assert_eq!(&observed, &model.observable_state(), "state mismatch after {:?}", op);

        prop_assert_eq!(engine.count_waiting(), observed.waiting.len());
        prop_assert_eq!(engine.count_active_pairs(), observed.pairs.len());
        prop_assert_eq!(engine.count_all(), observed.known.len());
    }

    Ok(())
}

proptest! {
    #[test]
    fn engine_agrees_with_model_under_rematch(
        ops in proptest::collection::vec(operation_strategy(), 1..64),
    ) {
        run_against_model(SkipBehavior::Rematch, &ops)?;
    }

    #[test]
    fn engine_agrees_with_model_under_requeue(
        ops in proptest::collection::vec(operation_strategy(), 1..64),
    ) {
        run_against_model(SkipBehavior::Requeue, &ops)?;
    }

    /// No operation sequence ever pairs a participant with itself.
    #[test]
    fn no_self_pairing(
        ops in proptest::collection::vec(operation_strategy(), 1..64),
    ) {
        let mut engine = Engine::new(EngineConfig::default());

        for op in &ops {
            engine.handle(op.event());

            for id in 1..=16u64 {
                prop_assert_ne!(engine.state_of(id), SessionState::Paired(id));
            }
        }
    }
}
