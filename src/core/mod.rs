//! Runtime core: driving a root node through its lifecycle.
//!
//! The only public API from this module is [`Supervisor`], which waits for a
//! shutdown trigger, shuts the tree down within a grace period and reports
//! what happened as events.
//!
//! Internal modules:
//! - [`supervisor`]: the driver and its event publishing;
//! - [`shutdown`]: cross-platform OS signal handling.

mod shutdown;
mod supervisor;

pub use shutdown::wait_for_shutdown_signal;
pub use supervisor::Supervisor;
