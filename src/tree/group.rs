//! # Group: unordered composition of sibling nodes.
//!
//! A [`Group`] aggregates errors, wait counters, readiness, values and close
//! across its children. Every leaf kind wraps a `Group` of its own children.
//!
//! ## Close sequence
//! ```text
//! close() ── first call only ──► fire(closing)
//!                                  ├─► spawn child[i].close()   for i in to_close  (one task each)
//!                                  └─► await child[i].finished(); to_close.remove(i)
//!                                  ▼
//!                               fire(finished)
//! ```
//!
//! ## Rules
//! - No ordering between siblings: every tracked child is asked to close at once.
//! - Children already finished at merge time are never tracked.
//! - `finished` fires iff every child's `finished` fired.
//! - Error and value lookups scan children left-to-right.

use std::any::Any;
use std::collections::BTreeSet;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Error;
use crate::tree::node::{Lifecycle, Node, Value};
use crate::tree::signal::{LazySignal, Signal};

/// Unordered composition of sibling nodes.
pub(crate) struct Group {
    children: Vec<Node>,
    /// Indices of children that still owe a close.
    to_close: Mutex<BTreeSet<usize>>,
    /// Fired on the first close request.
    closing: Signal,
    /// Fired once every tracked child finished.
    finished: Signal,
    ready: LazySignal,
}

impl Group {
    pub(crate) fn new(children: Vec<Node>) -> Self {
        if children.is_empty() {
            return Self {
                children,
                to_close: Mutex::new(BTreeSet::new()),
                closing: Signal::fired(),
                finished: Signal::fired(),
                ready: LazySignal::new(),
            };
        }

        let mut kept: Vec<Node> = Vec::with_capacity(children.len());
        for child in children {
            if !kept.iter().any(|k| k.ptr_eq(&child)) {
                kept.push(child);
            }
        }

        let to_close = kept
            .iter()
            .enumerate()
            .filter(|(_, child)| !child.finished().is_fired())
            .map(|(i, _)| i)
            .collect();

        Self {
            children: kept,
            to_close: Mutex::new(to_close),
            closing: Signal::new(),
            finished: Signal::new(),
            ready: LazySignal::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn children(&self) -> &[Node] {
        &self.children
    }
}

#[async_trait]
impl Lifecycle for Group {
    fn err(&self) -> Option<Error> {
        self.children.iter().find_map(Node::err)
    }

    async fn wait(&self) {
        for child in &self.children {
            child.wait().await;
        }
    }

    fn ready(&self) -> Signal {
        self.ready
            .get_or_fan_in(|| self.children.iter().map(Node::ready).collect())
    }

    fn value(&self, key: &dyn Any) -> Option<Value> {
        self.children.iter().find_map(|child| child.lookup(key))
    }

    async fn close(&self) {
        let tracked: Vec<usize> = {
            let to_close = self.to_close.lock().await;
            if self.closing.is_fired() {
                return;
            }
            self.closing.fire();

            for &i in to_close.iter() {
                let child = self.children[i].clone();
                tokio::spawn(async move { child.close().await });
            }
            to_close.iter().copied().collect()
        };

        for i in tracked {
            self.children[i].finished().wait().await;
            self.to_close.lock().await.remove(&i);
        }

        self.finished.fire();
    }

    fn finished(&self) -> Signal {
        self.finished.clone()
    }

    fn has_counters(&self) -> bool {
        self.children.iter().any(Node::has_counters)
    }

    fn cause(&self) -> Option<Error> {
        self.children.iter().find_map(Node::cause)
    }
}

/// Merges independent nodes into one.
///
/// The merged node closes all children concurrently on shutdown, reports the
/// leftmost error and value, is ready once every child is ready and waits for
/// every child. Merging the same node twice keeps a single entry.
///
/// `merge(vec![])` is equivalent to [`empty`](crate::empty).
///
/// # Example
/// ```
/// use jobtree::{merge, with_error, empty, Error};
///
/// let boom = Error::msg("boom");
/// let node = merge(vec![with_error(boom.clone(), vec![]), empty()]);
/// assert!(node.err().unwrap().is(&boom));
/// assert!(merge(vec![empty(), empty()]).err().is_none());
/// ```
pub fn merge(children: Vec<Node>) -> Node {
    Node::new(Group::new(children))
}
