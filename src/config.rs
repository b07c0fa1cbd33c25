//! # Supervisor configuration.
//!
//! Provides [`Config`], the settings used by [`Supervisor`](crate::Supervisor)
//! to drive a root node.
//!
//! ## Sentinel values
//! - `grace = 0s` → shutdown runs with an already expired deadline: it
//!   succeeds only when the tree finishes without waiting.
//! - `bus_capacity = 0` → clamped to 1 by the bus.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use jobtree::Config;
//!
//! let mut cfg = Config::default();
//! cfg.grace = Duration::from_secs(10);
//! cfg.fail_on_init_error = false;
//!
//! assert_eq!(cfg.bus_capacity_clamped(), 1024);
//! ```

use std::time::Duration;

/// Configuration of the supervisor driver.
///
/// ## Field semantics
/// - `grace`: shutdown deadline handed to [`Node::shutdown`](crate::Node::shutdown)
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `fail_on_init_error`: refuse to drive a tree that already carries an error
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time to wait for the tree to finish after a shutdown request.
    ///
    /// When exceeded, the supervisor returns
    /// [`RuntimeError::GraceExceeded`](crate::RuntimeError::GraceExceeded)
    /// naming the stuck path.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow listeners that lag behind more than `bus_capacity` events skip
    /// the older ones.
    pub bus_capacity: usize,

    /// Whether an error present on the root before it is driven aborts the run.
    ///
    /// Trees usually report initialization failures through
    /// [`with_error`](crate::with_error); with this flag off they are only
    /// published as [`EventKind::InitFailed`](crate::EventKind::InitFailed).
    pub fail_on_init_error: bool,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Reports whether shutdown runs without any waiting.
    #[inline]
    pub fn is_immediate(&self) -> bool {
        self.grace == Duration::ZERO
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 30s`
    /// - `bus_capacity = 1024`
    /// - `fail_on_init_error = true`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(30),
            bus_capacity: 1024,
            fail_on_init_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.grace, Duration::from_secs(30));
        assert!(cfg.fail_on_init_error);
        assert!(!cfg.is_immediate());
    }

    #[test]
    fn test_bus_capacity_is_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
