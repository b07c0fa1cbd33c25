//! # Dependency: ordered composition of a parent and its children.
//!
//! Built by [`Node::depends_on`]. Encodes "the parent closes only after its
//! children finished".
//!
//! ## Close sequence
//! ```text
//! close()
//!   ├─► children.close()   ─► await children.finished()
//!   ├─► parent.close()     ─► await parent.finished()
//!   └─► fire(finished)
//! ```
//!
//! ## Rules
//! - Children's end signals fire strictly before the parent's close is requested.
//! - `err`/`value`: parent first, then children left-to-right.
//! - `cause`: children first, then parent (mirrors the close order, so the
//!   reported path is the stage that is actually stuck).
//! - `wait`/`ready`: children first, then parent.

use std::any::Any;

use async_trait::async_trait;

use crate::error::Error;
use crate::tree::group::Group;
use crate::tree::node::{Lifecycle, Node, Value};
use crate::tree::signal::{LazySignal, Signal};

pub(crate) struct Dependency {
    parent: Node,
    children: Group,
    finished: Signal,
    ready: LazySignal,
}

impl Dependency {
    pub(crate) fn new(parent: Node, children: Vec<Node>) -> Self {
        Self {
            parent,
            children: Group::new(children),
            finished: Signal::new(),
            ready: LazySignal::new(),
        }
    }
}

#[async_trait]
impl Lifecycle for Dependency {
    fn err(&self) -> Option<Error> {
        self.parent.err().or_else(|| self.children.err())
    }

    async fn wait(&self) {
        self.children.wait().await;
        self.parent.wait().await;
    }

    fn ready(&self) -> Signal {
        self.ready
            .get_or_fan_in(|| vec![self.children.ready(), self.parent.ready()])
    }

    fn value(&self, key: &dyn Any) -> Option<Value> {
        self.parent
            .lookup(key)
            .or_else(|| self.children.value(key))
    }

    async fn close(&self) {
        self.children.close().await;
        self.children.finished().wait().await;

        self.parent.close().await;
        self.parent.finished().wait().await;

        self.finished.fire();
    }

    fn finished(&self) -> Signal {
        self.finished.clone()
    }

    fn has_counters(&self) -> bool {
        self.parent.has_counters() || self.children.has_counters()
    }

    fn cause(&self) -> Option<Error> {
        self.children.cause().or_else(|| self.parent.cause())
    }
}
