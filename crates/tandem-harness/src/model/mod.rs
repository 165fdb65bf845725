//! Reference model for model-based testing.
//!
//! The model is a simplified implementation that captures the SPECIFIED
//! matchmaking behavior with the most naive data layout possible: a plain
//! waiting list and a partner dictionary. It serves as the oracle against
//! which the engine is verified.
//!
//! # Design Principles
//!
//! - Simplicity: The model should be obviously correct
//! - Specification not implementation: Captures WHAT, not HOW
//! - Deterministic: Same inputs produce same outputs

pub mod operation;
mod world;

pub use operation::{ActorId, Operation};
pub use world::{ModelWorld, ObservableState};
