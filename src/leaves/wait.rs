//! # Wait leaf: join counter for one or more jobs.
//!
//! The counter is a [`tokio::sync::watch`] channel holding the current count:
//! `add`/`done` modify it, `wait` subscribes and resolves on zero. Semantics
//! match a standard counting join primitive; going below zero is a
//! programmer error and panics.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::Error;
use crate::tree::{Group, Lifecycle, Node, Signal, Value};

struct WaitLeaf {
    group: Group,
    counter: Arc<watch::Sender<usize>>,
}

/// Write side of a wait node: increments and decrements its counter.
#[derive(Clone, Debug)]
pub struct WaitTail {
    counter: Arc<watch::Sender<usize>>,
}

impl WaitTail {
    /// Adds `delta` to the counter. `delta` may be negative.
    ///
    /// # Panics
    /// Panics if the counter would drop below zero.
    pub fn add(&self, delta: isize) {
        let mut underflow = false;
        self.counter
            .send_modify(|count| match count.checked_add_signed(delta) {
                Some(next) => *count = next,
                None => underflow = true,
            });
        if underflow {
            panic!("jobtree: negative wait counter");
        }
    }

    /// Decrements the counter by one.
    ///
    /// # Panics
    /// Panics if the counter is already zero.
    pub fn done(&self) {
        self.add(-1);
    }

    /// Adds one to the counter and returns a guard that calls
    /// [`done`](WaitTail::done) when dropped.
    ///
    /// # Example
    /// ```
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let (node, tail) = jobtree::with_wait(vec![]);
    /// for i in 0..3 {
    ///     let guard = tail.guard();
    ///     tokio::spawn(async move {
    ///         let _guard = guard;
    ///         let _ = i * 2; // some job
    ///     });
    /// }
    /// node.wait().await;
    /// # }
    /// ```
    #[must_use = "the counter is decremented when the guard is dropped"]
    pub fn guard(&self) -> WaitGuard {
        self.add(1);
        WaitGuard { tail: self.clone() }
    }
}

/// Decrements the counter of a wait node on drop.
#[derive(Debug)]
pub struct WaitGuard {
    tail: WaitTail,
}

impl Drop for WaitGuard {
    fn drop(&mut self) {
        self.tail.done();
    }
}

/// Returns a waitable node that depends on `children`, and its tail.
///
/// [`Node::wait`] resolves once this node's counter and every descendant's
/// counter reached zero.
pub fn with_wait(children: Vec<Node>) -> (Node, WaitTail) {
    let (counter, _) = watch::channel(0usize);
    let counter = Arc::new(counter);
    let tail = WaitTail {
        counter: Arc::clone(&counter),
    };
    let leaf = WaitLeaf {
        group: Group::new(children),
        counter,
    };
    (Node::new(leaf), tail)
}

#[async_trait]
impl Lifecycle for WaitLeaf {
    fn err(&self) -> Option<Error> {
        self.group.err()
    }

    async fn wait(&self) {
        let mut rx = self.counter.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here.
        let _ = rx.wait_for(|count| *count == 0).await;
        self.group.wait().await;
    }

    fn ready(&self) -> Signal {
        self.group.ready()
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
        true
    }

    fn cause(&self) -> Option<Error> {
        self.group.cause()
    }
}
