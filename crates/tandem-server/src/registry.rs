//! Connection registry: participant → outbound channel.
//!
//! Delivery is decoupled from the engine's critical section: the engine
//! returns notifications, and the caller pushes them through the registry
//! afterwards. A failed delivery is reported and counted, never fed back —
//! the state change that produced the notification is already final.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use tandem_core::ParticipantId;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};

/// A delivery failure for a single outbound line.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// No connection is registered for the recipient.
    #[error("participant {participant} has no registered connection")]
    Unregistered {
        /// The unreachable recipient.
        participant: ParticipantId,
    },

    /// The recipient's connection closed while the line was queued.
    #[error("connection for participant {participant} is closed")]
    Closed {
        /// The unreachable recipient.
        participant: ParticipantId,
    },
}

/// Outcome of a broadcast: per-recipient failures aggregated into counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Lines successfully handed to a connection.
    pub delivered: usize,
    /// Recipients that could not be reached.
    pub failed: usize,
}

/// Maps participants to the outbound side of their connection.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<ParticipantId, mpsc::UnboundedSender<String>>>,
    delivery_failures: AtomicU64,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { connections: Mutex::new(HashMap::new()), delivery_failures: AtomicU64::new(0) }
    }

    /// Register the outbound channel for a newly connected participant.
    pub async fn register(&self, participant: ParticipantId, sender: mpsc::UnboundedSender<String>) {
        self.connections.lock().await.insert(participant, sender);
    }

    /// Drop a participant's connection entry.
    pub async fn unregister(&self, participant: ParticipantId) {
        self.connections.lock().await.remove(&participant);
    }

    /// Number of currently registered connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.lock().await.len()
    }

    /// Total deliveries that have failed since startup.
    pub fn delivery_failures(&self) -> u64 {
        self.delivery_failures.load(Ordering::Relaxed)
    }

    /// Deliver one line to one participant.
    ///
    /// # Errors
    ///
    /// Returns `Unregistered` if the participant has no connection, or
    /// `Closed` if its connection went away; either way the failure is
    /// counted and the entry for a closed connection is dropped.
    pub async fn deliver(
        &self,
        participant: ParticipantId,
        line: String,
    ) -> Result<(), DeliveryError> {
        let mut connections = self.connections.lock().await;

        let Some(sender) = connections.get(&participant) else {
            self.delivery_failures.fetch_add(1, Ordering::Relaxed);
            return Err(DeliveryError::Unregistered { participant });
        };

        if sender.send(line).is_err() {
            connections.remove(&participant);
            self.delivery_failures.fetch_add(1, Ordering::Relaxed);
            return Err(DeliveryError::Closed { participant });
        }

        Ok(())
    }

    /// Deliver one line to every target, aggregating failures into counts.
    pub async fn broadcast(&self, targets: &[ParticipantId], line: &str) -> BroadcastReport {
        let mut report = BroadcastReport { delivered: 0, failed: 0 };

        for &participant in targets {
            match self.deliver(participant, line.to_owned()).await {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    tracing::debug!("broadcast skip: {}", error);
                    report.failed += 1;
                },
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deliver_reaches_registered_participant() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(7, tx).await;

        registry.deliver(7, "hello".to_owned()).await.unwrap();
        assert_eq!(rx.recv().await, Some("hello".to_owned()));
    }

    #[tokio::test]
    async fn deliver_to_unknown_participant_fails_and_counts() {
        let registry = ConnectionRegistry::new();

        let result = registry.deliver(9, "hello".to_owned()).await;
        assert!(matches!(result, Err(DeliveryError::Unregistered { participant: 9 })));
        assert_eq!(registry.delivery_failures(), 1);
    }

    #[tokio::test]
    async fn deliver_to_closed_connection_drops_entry() {
        let registry = ConnectionRegistry::new();
        let (tx, rx) = mpsc::unbounded_channel();
        registry.register(7, tx).await;
        drop(rx);

        let result = registry.deliver(7, "hello".to_owned()).await;
        assert!(matches!(result, Err(DeliveryError::Closed { participant: 7 })));
        assert_eq!(registry.connection_count().await, 0);
    }

    #[tokio::test]
    async fn broadcast_aggregates_failures() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(1, tx).await;

        let report = registry.broadcast(&[1, 2, 3], "announcement").await;
        assert_eq!(report, BroadcastReport { delivered: 1, failed: 2 });
        assert_eq!(rx.recv().await, Some("announcement".to_owned()));
    }
}
