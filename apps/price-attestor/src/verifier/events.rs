use std::{
    collections::VecDeque,
    sync::{Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default number of events retained and buffered for slow subscribers.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Emitted once per successful verification. Carries the price only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedPriceEvent {
    pub price: u64,
}

/// Record of the most recent verified prices, with live fan-out to subscribers.
///
/// At most `capacity` events are retained; emitting past that evicts the oldest.
/// Subscribers see every event emitted while they keep up, independent of eviction.
#[derive(Debug)]
pub struct EventLog {
    capacity: usize,
    events: Mutex<VecDeque<VerifiedPriceEvent>>,
    sender: broadcast::Sender<VerifiedPriceEvent>,
}

impl EventLog {
    /// A log retaining up to `capacity` events (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            capacity,
            events: Mutex::new(VecDeque::new()),
            sender,
        }
    }

    /// Record `event` and publish it to current subscribers.
    pub fn emit(&self, event: VerifiedPriceEvent) {
        {
            let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
            if events.len() == self.capacity {
                events.pop_front();
            }
            events.push_back(event);
        }
        // No subscribers is not an error; the event is still recorded.
        let _ = self.sender.send(event);
    }

    /// Snapshot of the retained events, oldest first.
    ///
    /// Only the most recent `capacity` events are returned.
    pub fn events(&self) -> Vec<VerifiedPriceEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Receive events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<VerifiedPriceEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
