//! Broadcast-channel notifier for in-process observers

use tokio::sync::broadcast;

use super::{DecisionEvent, DecisionNotifier, Delivery};
use crate::error::GateResult;

/// Fans decisions out to every subscriber of a bounded broadcast channel.
///
/// Sending never blocks. Subscribers that fall more than `capacity` events
/// behind lose the oldest ones.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<DecisionEvent>,
    capacity: usize,
}

impl BroadcastNotifier {
    /// A `capacity` of zero is raised to one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, capacity }
    }

    /// Receive all decisions made from now on
    pub fn subscribe(&self) -> broadcast::Receiver<DecisionEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(256)
    }
}

impl DecisionNotifier for BroadcastNotifier {
    fn notify(&self, event: &DecisionEvent) -> GateResult<Delivery> {
        match self.sender.send(event.clone()) {
            Ok(n) => Ok(Delivery::Delivered(n)),
            Err(_) => Ok(Delivery::Unobserved), // No active receivers
        }
    }
}
