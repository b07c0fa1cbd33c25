//! # Leaf node kinds.
//!
//! Each leaf carries one capability for the job that created it and wraps its
//! children in a group. Constructors return the node, plus a **tail** when
//! the job needs a write side:
//!
//! | Constructor               | Tail                | Capability                      |
//! |---------------------------|---------------------|---------------------------------|
//! | [`with_shutdown`]         | [`ShutdownTail`]    | end/done signal pair            |
//! | [`with_wait`]             | [`WaitTail`]        | join counter                    |
//! | [`with_readiness`]        | [`ReadinessTail`]   | ready announcement              |
//! | [`with_error`]            | -                   | static error                    |
//! | [`with_error_group`]      | [`ErrTail`]         | first-write-wins error          |
//! | [`with_value`]            | -                   | key/value lookup                |
//! | [`with_annotation`]       | -                   | labels errors and timeouts      |
//!
//! Tails are `Clone + Send + Sync`; clones share state with the original.

mod annotation;
mod error;
mod readiness;
mod shutdown;
mod value;
mod wait;

pub use annotation::with_annotation;
pub use error::{with_error, with_error_group, ErrTail};
pub use readiness::{with_readiness, ReadinessTail};
pub use shutdown::{with_shutdown, ShutdownTail};
pub use value::with_value;
pub use wait::{with_wait, WaitGuard, WaitTail};
