//! # Runtime events emitted while a root node is driven.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Tree events**: initialization error, readiness, job failure
//! - **Shutdown events**: request, completion within grace, grace exceeded
//! - **Subscriber events**: worker panic and queue overflow
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use jobtree::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::GraceExceeded)
//!     .with_reason("app: server: timeout expired")
//!     .with_grace(Duration::from_secs(5));
//!
//! assert_eq!(ev.kind, EventKind::GraceExceeded);
//! assert_eq!(ev.reason.as_deref(), Some("app: server: timeout expired"));
//! assert_eq!(ev.grace_ms, Some(5000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Tree events ===
    /// The root carried an error before it was driven.
    ///
    /// Sets:
    /// - `reason`: the error, annotations included
    InitFailed,

    /// Every readiness node of the tree reported ready.
    TreeReady,

    /// A job reported an error (observed after the tree stopped).
    ///
    /// Sets:
    /// - `reason`: the error, annotations included
    JobFailed,

    // === Shutdown events ===
    /// Shutdown requested (OS signal, custom trigger, or every job joined).
    ///
    /// Sets:
    /// - `reason`: what triggered the request
    /// - `grace_ms`: configured grace (ms)
    ShutdownRequested,

    /// The tree finished within the configured grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some job did not stop in time.
    ///
    /// Sets:
    /// - `reason`: annotated path of the stuck subtree
    /// - `grace_ms`: configured grace (ms)
    GraceExceeded,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Configured shutdown grace in milliseconds (compact).
    pub grace_ms: Option<u32>,
    /// Name of the subscriber, for subscriber events.
    pub subscriber: Option<&'static str>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            reason: None,
            grace_ms: None,
            subscriber: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the shutdown grace (stored as milliseconds).
    #[inline]
    pub fn with_grace(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.grace_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"));
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Reports whether this is a [`EventKind::SubscriberOverflow`] event.
    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    /// Reports whether this is a [`EventKind::SubscriberPanicked`] event.
    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::TreeReady);
        let b = Event::new(EventKind::TreeReady);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_grace_saturates() {
        let ev = Event::new(EventKind::ShutdownRequested).with_grace(Duration::from_secs(u64::MAX));
        assert_eq!(ev.grace_ms, Some(u32::MAX));
    }

    #[test]
    fn test_subscriber_events() {
        let ev = Event::subscriber_overflow("log", "full");
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.subscriber, Some("log"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=log reason=full"));

        let ev = Event::subscriber_panicked("log", "boom".into());
        assert!(ev.is_subscriber_panic());
    }
}
