//! Fuzz target for the matchmaking engine state machine
//!
//! Differential fuzzing against the reference model: arbitrary operation
//! sequences must produce identical notifications in both, and the session
//! store's structural invariants must hold after every step.
//!
//! # Invariants
//!
//! - Pairing table is symmetric: (a → b) exists iff (b → a) exists
//! - Pairing table never contains a self-pairing
//! - Waiting queue holds no duplicates
//! - No participant is simultaneously waiting and paired
//! - Derived `state_of` agrees with queue/table membership
//! - NEVER panic on any operation sequence

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tandem_core::{Engine, EngineConfig, SkipBehavior};
use tandem_harness::{ModelWorld, Operation, check_store_invariants};

/// Fuzz input: a skip-behavior choice plus an operation sequence.
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    requeue_on_skip: bool,
    ops: Vec<Operation>,
}

fuzz_target!(|input: FuzzInput| {
    let skip_behavior =
        if input.requeue_on_skip { SkipBehavior::Requeue } else { SkipBehavior::Rematch };

    let mut engine = Engine::new(EngineConfig { skip_behavior });
    let mut model = ModelWorld::new(skip_behavior);

    for op in &input.ops {
        let expected = model.apply(op);
        let actual = engine.handle(op.event());
        assert_eq!(actual, expected, "notification mismatch on {op:?}");

        if let Err(violation) = check_store_invariants(engine.store()) {
            panic!("invariant violated after {op:?}: {violation}");
        }
    }
});
