//! Test harness for the tandem engine.
//!
//! Provides a reference model of the matchmaking/relay behavior and the
//! structural invariant checks used by the model-based property tests and
//! the fuzz targets.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod model;

pub use invariants::check_store_invariants;
pub use model::{ActorId, ModelWorld, ObservableState, Operation};
