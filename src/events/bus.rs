//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking publishing from the supervisor and subscriber workers.
//!
//! ## Architecture
//! ```text
//! Publishers:                          Listener (one):
//!   Supervisor      ──┐
//!   readiness watcher ┼──► Bus ──────► listener task ────► SubscriberSet
//!   subscriber worker ┘ (broadcast)    (in Supervisor)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no receivers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Cheap to clone: clones share the same sender.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (min 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver observing events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_bus_delivers_in_order() {
        let bus = Bus::new(0);
        let mut rx = bus.subscribe();

        bus.publish(Event::new(EventKind::ShutdownRequested));
        let first = rx.recv().await.unwrap();
        bus.publish(Event::new(EventKind::AllStoppedWithin));
        let second = rx.recv().await.unwrap();

        assert_eq!(first.kind, EventKind::ShutdownRequested);
        assert_eq!(second.kind, EventKind::AllStoppedWithin);
        assert!(first.seq < second.seq);
    }

    #[test]
    fn test_publish_without_receivers_is_noop() {
        let bus = Bus::new(4);
        bus.publish(Event::new(EventKind::TreeReady));
    }
}
