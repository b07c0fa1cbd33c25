//! # Shutdown leaf: end/done signal pair for one job.
//!
//! ## State machine
//! ```text
//! created ──close()──► end fired ──tail.done()──► done fired (= finished)
//! ```
//! - `close()` first closes the wrapped children, waits until they finished,
//!   then fires `end`.
//! - `done()` may be called at any time; calling it before `end` pre-arms
//!   completion.
//! - Both transitions are idempotent.

use std::any::Any;

use async_trait::async_trait;

use crate::error::Error;
use crate::tree::{Group, Lifecycle, Node, Signal, Value};

struct ShutdownLeaf {
    group: Group,
    end: Signal,
    done: Signal,
}

/// Write side of a shutdown node, kept by the job it represents.
///
/// Cloning is cheap; clones share the same signals.
#[derive(Clone, Debug)]
pub struct ShutdownTail {
    end: Signal,
    done: Signal,
}

impl ShutdownTail {
    /// Returns the signal that fires when the job should stop.
    ///
    /// Successive calls return clones of the same signal.
    pub fn end(&self) -> Signal {
        self.end.clone()
    }

    /// Reports that the job finished its shutdown.
    ///
    /// Not calling `done` blocks the close of every parent and makes
    /// [`Node::shutdown`] time out. Calls after the first do nothing.
    pub fn done(&self) {
        self.done.fire();
    }
}

/// Returns a shutdownable node that depends on `children`, and its tail.
///
/// The tail's [`end`](ShutdownTail::end) fires when the node is shut down
/// (directly or by a parent), after every child finished. The job then
/// cleans up and calls [`done`](ShutdownTail::done).
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (node, tail) = jobtree::with_shutdown(vec![]);
/// tokio::spawn(async move {
///     let end = tail.end();
///     let mut ticker = tokio::time::interval(Duration::from_millis(10));
///     loop {
///         tokio::select! {
///             _ = end.wait() => break,
///             _ = ticker.tick() => { /* some job */ }
///         }
///     }
///     tail.done();
/// });
///
/// node.shutdown(Duration::from_secs(5)).await.unwrap();
/// # }
/// ```
pub fn with_shutdown(children: Vec<Node>) -> (Node, ShutdownTail) {
    let leaf = ShutdownLeaf {
        group: Group::new(children),
        end: Signal::new(),
        done: Signal::new(),
    };
    let tail = ShutdownTail {
        end: leaf.end.clone(),
        done: leaf.done.clone(),
    };
    (Node::new(leaf), tail)
}

#[async_trait]
impl Lifecycle for ShutdownLeaf {
    fn err(&self) -> Option<Error> {
        self.group.err()
    }

    async fn wait(&self) {
        self.group.wait().await
    }

    fn ready(&self) -> Signal {
        self.group.ready()
    }

    fn value(&self, key: &dyn Any) -> Option<Value> {
        self.group.value(key)
    }

    async fn close(&self) {
        self.group.close().await;
        self.group.finished().wait().await;
        self.end.fire();
    }

    fn finished(&self) -> Signal {
        self.done.clone()
    }

    fn has_counters(&self) -> bool {
        self.group.has_counters()
    }

    fn cause(&self) -> Option<Error> {
        if let Some(err) = self.group.cause() {
            return Some(err);
        }
        if self.done.is_fired() {
            None
        } else {
            Some(Error::Timeout)
        }
    }
}
