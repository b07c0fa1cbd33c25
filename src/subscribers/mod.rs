//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used by the [`Supervisor`](crate::Supervisor) to deliver runtime
//! events published on the [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! Supervisor ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//!                                                   ┌────────┼─────────┐
//!                                                   ▼        ▼         ▼
//!                                               LogWriter  Metrics  Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use jobtree::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct Alerts;
//!
//! #[async_trait]
//! impl Subscribe for Alerts {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::GraceExceeded {
//!             // page someone
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "alerts"
//!     }
//! }
//! ```

mod embedded;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
