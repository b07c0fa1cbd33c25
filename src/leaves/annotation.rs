//! # Annotation: label errors and timeouts of a subtree.
//!
//! Errors returned by [`Node::err`] and shutdown timeouts reported through
//! this node are prefixed with its label. Nested annotations compose into a
//! path:
//!
//! ```text
//! with_annotation("app", [with_annotation("server", [stuck job])])
//!     shutdown ──► "app: server: timeout expired"
//! ```

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Error;
use crate::tree::{Group, Lifecycle, Node, Signal, Value};

struct Annotation {
    group: Group,
    label: Arc<str>,
}

/// Returns a node that annotates errors and timeouts of `children` with
/// `label`.
///
/// Identity checks still see the original error:
/// ```
/// let boom = jobtree::Error::msg("boom");
/// let node = jobtree::with_annotation("server", vec![jobtree::with_error(boom.clone(), vec![])]);
/// let err = node.err().unwrap();
/// assert_eq!(err.to_string(), "server: boom");
/// assert!(err.is(&boom));
/// ```
pub fn with_annotation(label: impl Into<Arc<str>>, children: Vec<Node>) -> Node {
    Node::new(Annotation {
        group: Group::new(children),
        label: label.into(),
    })
}

#[async_trait]
impl Lifecycle for Annotation {
    fn err(&self) -> Option<Error> {
        self.group
            .err()
            .map(|err| err.annotate(Arc::clone(&self.label)))
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
        self.group
            .cause()
            .map(|err| err.annotate(Arc::clone(&self.label)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::testutil::run_shutdownable;
    use crate::{with_error, with_shutdown};
    use std::time::Duration;

    #[test]
    fn test_annotation_error() {
        let err = Error::msg("test");
        let node = with_annotation("annotation", vec![with_error(err.clone(), vec![])]);

        let got = node.err().unwrap();
        assert_eq!(got.to_string(), "annotation: test");
        assert!(got.is(&err));
        assert_eq!(got.labels(), vec!["annotation"]);
    }

    #[test]
    fn test_annotation_nested_path() {
        let err = Error::msg("test");
        let node = with_annotation(
            "outer",
            vec![with_annotation("inner", vec![with_error(err.clone(), vec![])])],
        );
        let got = node.err().unwrap();
        assert_eq!(got.to_string(), "outer: inner: test");
        assert!(got.root().is(&err));
    }

    #[test]
    fn test_annotation_no_error() {
        let node = with_annotation("annotation", vec![]);
        assert!(node.err().is_none());
    }

    #[tokio::test]
    async fn test_annotation_shutdown_timeout() {
        let (bg, tail) = with_shutdown(vec![]);
        let _blocked = run_shutdownable(tail);
        let node = with_annotation("annotation", vec![bg]);

        let err = node.shutdown(Duration::from_millis(50)).await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "annotation: timeout expired");
    }

    #[tokio::test]
    async fn test_annotation_child_shutdown_timeout() {
        let (bg1, t1) = with_shutdown(vec![]);
        let (bg2, t2) = with_shutdown(vec![with_annotation("child", vec![bg1])]);
        let _blocked = run_shutdownable(t1);
        run_shutdownable(t2).cancel();
        let node = with_annotation("parent", vec![bg2]);

        let err = node.shutdown(Duration::from_millis(50)).await.unwrap_err();
        assert_eq!(err.to_string(), "parent: child: timeout expired");
    }

    #[tokio::test]
    async fn test_annotation_no_shutdown_error() {
        let (bg, tail) = with_shutdown(vec![]);
        run_shutdownable(tail).cancel();
        let node = with_annotation("annotation", vec![bg]);

        node.shutdown(Duration::from_secs(1)).await.unwrap();
        assert!(node.cause().is_none());
    }

    #[test]
    fn test_annotation_unclosed_has_no_cause() {
        let node = with_annotation("annotation", vec![]);
        assert!(node.cause().is_none());
    }
}
