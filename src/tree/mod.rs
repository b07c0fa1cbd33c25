//! # Lifecycle tree: composition algebra and shutdown protocol.
//!
//! This module contains the structural node kinds and the primitives they are
//! built from. Leaf kinds live in [`crate::leaves`].
//!
//! ## Architecture
//! ```text
//!               Dependency (parent closes after children finished)
//!               ┌────┴─────────────┐
//!             parent          Group (children, no ordering)
//!               │           ┌─────┼───────────┐
//!           Shutdown      Wait  Annotation  Readiness …   (leaves wrap a Group too)
//!
//! every node ──► Lifecycle { err, wait, ready, value, close, finished, cause }
//!                     ▲
//!                Node (Arc<dyn Lifecycle>) ──► shutdown() ──► protocol::shutdown
//! ```
//!
//! Internal modules:
//! - [`signal`]: fire-once broadcast [`Signal`] and the construct-once `LazySignal`;
//! - [`node`]: the `Lifecycle` capability set and the public [`Node`] handle;
//! - [`group`]: unordered composition ([`merge`]);
//! - [`dependency`]: ordered composition ([`Node::depends_on`]);
//! - [`protocol`]: deadline-bounded shutdown shared by every node kind;
//! - [`empty`]: the no-op node.

mod dependency;
mod empty;
mod group;
mod node;
mod protocol;
mod signal;

pub(crate) use group::Group;
pub(crate) use node::Lifecycle;
pub(crate) use signal::LazySignal;
pub use group::merge;
pub use node::{empty, Node, Value};
pub use signal::Signal;

#[cfg(test)]
pub(crate) mod testutil {
    //! Helpers shared by the tree and leaf tests.

    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use crate::leaves::{ShutdownTail, WaitTail};

    /// Window given to spawned tasks to propagate signals.
    pub(crate) const PROPAGATE: Duration = Duration::from_millis(50);

    pub(crate) async fn propagate() {
        tokio::time::sleep(PROPAGATE).await;
    }

    /// Spawns a job that waits for its end signal, then for `release`, then
    /// reports done.
    pub(crate) fn run_shutdownable(tail: ShutdownTail) -> CancellationToken {
        let release = CancellationToken::new();
        let gate = release.clone();
        tokio::spawn(async move {
            tail.end().await;
            gate.cancelled().await;
            tail.done();
        });
        release
    }

    /// Adds one to the counter and spawns a job releasing it on `release`.
    pub(crate) fn run_waitable(tail: WaitTail) -> CancellationToken {
        let release = CancellationToken::new();
        let gate = release.clone();
        tail.add(1);
        tokio::spawn(async move {
            gate.cancelled().await;
            tail.done();
        });
        release
    }
}
