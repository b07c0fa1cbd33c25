//! # Error leaves: static errors and first-write-wins error groups.
//!
//! Both kinds store their error in a [`OnceLock`]: a static error is set at
//! construction, an error group is set by the first [`ErrTail`] write.
//! Later writes are ignored, so [`Node::err`](crate::Node::err) never "un-reports"
//! an error it returned once.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;

use crate::error::Error;
use crate::tree::{Group, Lifecycle, Node, Signal, Value};

struct ErrorLeaf {
    group: Group,
    err: Arc<OnceLock<Error>>,
}

impl ErrorLeaf {
    fn new(err: Option<Error>, children: Vec<Node>) -> Self {
        let cell = OnceLock::new();
        if let Some(err) = err {
            let _ = cell.set(err);
        }
        Self {
            group: Group::new(children),
            err: Arc::new(cell),
        }
    }
}

/// Write side of an error group: assigns its error once.
#[derive(Clone, Debug)]
pub struct ErrTail {
    err: Arc<OnceLock<Error>>,
}

impl ErrTail {
    /// Assigns `err` unless an error is already set.
    pub fn error(&self, err: Error) {
        let _ = self.err.set(err);
    }

    /// Formats a message error and assigns it unless an error is already set.
    ///
    /// # Example
    /// ```
    /// let (node, tail) = jobtree::with_error_group(vec![]);
    /// let port = 8000;
    /// tail.errorf(format_args!("bind :{port}: address in use"));
    /// assert_eq!(node.err().unwrap().to_string(), "bind :8000: address in use");
    /// ```
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.error(Error::format(args));
    }

    /// Assigns an arbitrary job error unless an error is already set.
    pub fn fail<E>(&self, err: E)
    where
        E: StdError + Send + Sync + 'static,
    {
        self.error(Error::job(err));
    }

    /// Assigns `err` prefixed with `context` unless an error is already set.
    pub fn wrap<E>(&self, context: impl Into<Arc<str>>, err: E)
    where
        E: StdError + Send + Sync + 'static,
    {
        self.error(Error::wrap(context, err));
    }
}

/// Returns a node carrying `err`, merged with `children`.
///
/// Use it to report initialization errors as a node.
///
/// # Example
/// ```
/// let node = jobtree::with_error(jobtree::Error::msg("no config"), vec![]);
/// assert_eq!(node.err().unwrap().to_string(), "no config");
/// ```
pub fn with_error(err: Error, children: Vec<Node>) -> Node {
    Node::new(ErrorLeaf::new(Some(err), children))
}

/// Returns a node that can store one error, merged with `children`, and the
/// tail used to assign it.
pub fn with_error_group(children: Vec<Node>) -> (Node, ErrTail) {
    let leaf = ErrorLeaf::new(None, children);
    let tail = ErrTail {
        err: Arc::clone(&leaf.err),
    };
    (Node::new(leaf), tail)
}

#[async_trait]
impl Lifecycle for ErrorLeaf {
    fn err(&self) -> Option<Error> {
        self.err.get().cloned().or_else(|| self.group.err())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("listener closed")]
    struct ListenerClosed;

    #[test]
    fn test_static_error() {
        let err = Error::msg("test");
        let node = with_error(err.clone(), vec![]);
        assert!(node.err().unwrap().is(&err));
        assert!(node.err().unwrap().is(&err));
    }

    #[test]
    fn test_error_group_first_write_wins() {
        let (node, tail) = with_error_group(vec![]);
        assert!(node.err().is_none());

        let first = Error::msg("first");
        tail.error(first.clone());
        tail.error(Error::msg("second"));
        tail.clone().fail(ListenerClosed);

        assert!(node.err().unwrap().is(&first));
    }

    #[test]
    fn test_error_group_errorf() {
        let (node, tail) = with_error_group(vec![]);
        tail.errorf(format_args!("shutdown error from {}", "server"));
        assert_eq!(node.err().unwrap().to_string(), "shutdown error from server");
    }

    #[test]
    fn test_error_group_wrap_keeps_source() {
        let (node, tail) = with_error_group(vec![]);
        tail.wrap("shutdown error from server", ListenerClosed);

        let err = node.err().unwrap();
        assert_eq!(err.to_string(), "shutdown error from server: listener closed");
        assert!(err.find::<ListenerClosed>().is_some());
    }

    #[test]
    fn test_error_leaf_falls_back_to_children() {
        let child = Error::msg("child");
        let (node, _tail) = with_error_group(vec![with_error(child.clone(), vec![])]);
        assert!(node.err().unwrap().is(&child));

        let own = Error::msg("own");
        let node = with_error(own.clone(), vec![with_error(child, vec![])]);
        assert!(node.err().unwrap().is(&own));
    }
}
