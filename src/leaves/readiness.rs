//! # Readiness leaf: ready announcement for one job.
//!
//! The node's [`ready`](crate::Node::ready) signal fires after the wrapped
//! children became ready **and then** the job called
//! [`ReadinessTail::ok`]: lower layers become ready before the layer built on
//! top of them announces readiness.

use std::any::Any;

use async_trait::async_trait;

use crate::error::Error;
use crate::tree::{Group, LazySignal, Lifecycle, Node, Signal, Value};

struct ReadinessLeaf {
    group: Group,
    ready: Signal,
    ready_out: LazySignal,
}

/// Write side of a readiness node.
#[derive(Clone, Debug)]
pub struct ReadinessTail {
    ready: Signal,
}

impl ReadinessTail {
    /// Reports that the job is ready.
    ///
    /// Not calling `ok` keeps the readiness of every parent pending forever.
    /// Calls after the first do nothing.
    pub fn ok(&self) {
        self.ready.fire();
    }
}

/// Returns a readiness node that depends on `children`, and its tail.
///
/// # Example
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (node, tail) = jobtree::with_readiness(vec![]);
/// tokio::spawn(async move {
///     // warm caches, bind sockets...
///     tail.ok();
/// });
/// node.ready().await;
/// # }
/// ```
pub fn with_readiness(children: Vec<Node>) -> (Node, ReadinessTail) {
    let leaf = ReadinessLeaf {
        group: Group::new(children),
        ready: Signal::new(),
        ready_out: LazySignal::new(),
    };
    let tail = ReadinessTail {
        ready: leaf.ready.clone(),
    };
    (Node::new(leaf), tail)
}

#[async_trait]
impl Lifecycle for ReadinessLeaf {
    fn err(&self) -> Option<Error> {
        self.group.err()
    }

    async fn wait(&self) {
        self.group.wait().await
    }

    fn ready(&self) -> Signal {
        self.ready_out
            .get_or_fan_in(|| vec![self.group.ready(), self.ready.clone()])
    }

    fn value(&self, key: &dyn Any) -> Option<Value> {
        self.group.value(key)
    }

    async fn close(&self) {
        self.group.close().await
    }

    fn finished(&self) -> Signal {
        self.group.finished()
    }

    fn has_counters(&self) -> bool {
        self.group.has_counters()
    }

    fn cause(&self) -> Option<Error> {
        self.group.cause()
    }
}
