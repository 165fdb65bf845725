//! Sans-IO matchmaking and relay engine for anonymous pair chat.
//!
//! Pairs concurrent participants strictly in arrival order and relays
//! messages between paired partners until either leaves. This crate is the
//! engine only: it accepts events, mutates its own state, and returns the
//! notifications to deliver. Transport, delivery, and content policy live
//! outside.
//!
//! ## Architecture
//!
//! ```text
//! tandem-core
//!   ├─ Engine         (event dispatch, known-participants set, counters)
//!   ├─ Matchmaker     (request_match / skip / leave over the store)
//!   ├─ SessionStore   (waiting queue + symmetric pairing table)
//!   └─ Relay          (partner forwarding behind a ContentPolicy)
//! ```
//!
//! ## Concurrency
//!
//! The engine is deliberately synchronous and not internally locked.
//! Inbound events may arrive concurrently from independent participants;
//! the caller must serialize [`Engine::handle`] calls — one mutex around
//! the engine, or one sequential task draining a channel — so that each
//! operation is atomic with respect to all others. No operation blocks on
//! I/O, so the critical section is short. Notifications are returned, not
//! sent: deliver them after releasing the critical section.
//!
//! All state is in memory and rebuilt from zero on restart.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod event;
pub mod matchmaker;
pub mod relay;
pub mod session;

pub use engine::{Engine, EngineConfig};
pub use error::EngineError;
pub use event::{Event, Notification, NotificationBody, Payload};
pub use matchmaker::{Matchmaker, SkipBehavior};
pub use relay::{ContentPolicy, LinkFilter, Relay};
pub use session::{ParticipantId, SessionState, SessionStore};
