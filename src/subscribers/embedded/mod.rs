//! # Built-in subscribers
//!
//! - [`LogWriter`]: prints events in a human-readable form (feature `logging`).

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
