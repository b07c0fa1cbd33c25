//! # Node capability set and the public node handle.
//!
//! Every composed value (leaves, groups, dependencies, annotations) implements
//! the crate-private [`Lifecycle`] trait. Callers only ever see [`Node`], a
//! cheap-to-clone handle (`Arc<dyn Lifecycle>`), so the close/finished/cause
//! triad used by the shutdown protocol stays internal.
//!
//! ## Operation table
//! | Operation                 | Blocks | Notes                                   |
//! |---------------------------|--------|-----------------------------------------|
//! | [`Node::err`]             | no     | live query, first error wins            |
//! | [`Node::wait`]            | yes    | until every join counter reaches zero   |
//! | [`Node::shutdown`]        | yes    | bounded by the deadline                 |
//! | [`Node::ready`]           | no     | returns an awaitable [`Signal`]         |
//! | [`Node::value`]           | no     | topmost, then leftmost match            |
//! | [`Node::depends_on`]      | no     | builds a dependency                     |

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Error;
use crate::tree::dependency::Dependency;
use crate::tree::empty::Empty;
use crate::tree::protocol;
use crate::tree::signal::Signal;

/// Value stored in a value node.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Capability set shared by every node kind.
///
/// `close`, `finished` and `cause` are used only by the shutdown protocol:
/// - `close` requests a close and completes once the subtree finished, or
///   immediately when another caller already requested it;
/// - `finished` fires once the subtree's close sequence fully completed;
/// - `cause` walks the still-unfinished path and returns the annotated
///   timeout for it, or `None` when everything finished meanwhile.
#[async_trait]
pub(crate) trait Lifecycle: Send + Sync + 'static {
    fn err(&self) -> Option<Error>;

    async fn wait(&self);

    fn ready(&self) -> Signal;

    fn value(&self, key: &dyn Any) -> Option<Value>;

    async fn close(&self);

    fn finished(&self) -> Signal;

    fn cause(&self) -> Option<Error>;

    /// Reports whether a wait counter exists anywhere in the subtree.
    fn has_counters(&self) -> bool;
}

/// Handle to a node of the lifecycle tree.
///
/// A `Node` carries errors, wait counters, shutdown signals, readiness and
/// values of the background jobs below it. Nodes are composed bottom-up with
/// [`merge`](crate::merge), [`Node::depends_on`] and
/// [`with_annotation`](crate::with_annotation); the root is handed to the
/// supervising layer.
///
/// Nodes are not reusable: once shut down, a node stays shut down.
/// All methods may be called from multiple tasks simultaneously.
#[derive(Clone)]
pub struct Node {
    inner: Arc<dyn Lifecycle>,
}

impl Node {
    pub(crate) fn new<L: Lifecycle>(inner: L) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Returns the first error found in this tree, annotated along the way.
    ///
    /// Successive calls may return different values, but once an error was
    /// observed the result never goes back to `None`.
    pub fn err(&self) -> Option<Error> {
        self.inner.err()
    }

    /// Waits until every wait counter in this tree reaches zero.
    pub async fn wait(&self) {
        self.inner.wait().await
    }

    /// Gracefully shuts the tree down, waiting at most `timeout`.
    ///
    /// Shutdown is bottom-up: dependencies close their children first, wait
    /// until all of them finished and then close themselves.
    ///
    /// On timeout returns [`Error::Timeout`] wrapped in the annotations of the
    /// first unfinished path. If the tree finishes while that path is being
    /// searched, the shutdown counts as complete and `Ok(())` is returned.
    /// The close itself keeps running after the timeout; a later call returns
    /// `Ok(())` once it completed.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let (node, tail) = jobtree::with_shutdown(vec![]);
    /// tokio::spawn(async move {
    ///     tail.end().await;
    ///     tail.done();
    /// });
    /// node.shutdown(Duration::from_secs(1)).await.unwrap();
    /// # }
    /// ```
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), Error> {
        self.shutdown_until(tokio::time::sleep(timeout)).await
    }

    /// Like [`Node::shutdown`], with an arbitrary future as the deadline.
    ///
    /// Useful with an external cancellation source, e.g.
    /// `node.shutdown_until(token.cancelled())`.
    pub async fn shutdown_until<F>(&self, deadline: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        protocol::shutdown(self, deadline).await
    }

    /// Returns a signal that fires once every readiness node in the tree
    /// reported ready. A tree without readiness nodes is ready right away.
    ///
    /// If some readiness node never reports, the signal never fires; it is
    /// the caller's responsibility to bound the wait.
    pub fn ready(&self) -> Signal {
        self.inner.ready()
    }

    /// Returns the topmost, then leftmost value stored under `key`.
    pub fn value<K: Any>(&self, key: &K) -> Option<Value> {
        self.inner.value(key)
    }

    /// Typed variant of [`Node::value`]: `None` when the key is missing or
    /// the stored value is not a `V`.
    ///
    /// # Example
    /// ```
    /// #[derive(PartialEq)]
    /// struct PortKey;
    ///
    /// let node = jobtree::with_value(PortKey, 8080u16, vec![]);
    /// assert_eq!(node.value_of::<_, u16>(&PortKey).as_deref(), Some(&8080));
    /// ```
    pub fn value_of<K, V>(&self, key: &K) -> Option<Arc<V>>
    where
        K: Any,
        V: Any + Send + Sync,
    {
        self.value(key)?.downcast::<V>().ok()
    }

    /// Builds a node that, on shutdown, closes `children` first, waits until
    /// all of them finished and only then closes `self`.
    ///
    /// # Example
    /// ```
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let (db, _db_tail) = jobtree::with_shutdown(vec![]);
    /// let (server, _server_tail) = jobtree::with_shutdown(vec![]);
    ///
    /// // server stops before the database it uses
    /// let app = db.depends_on(vec![server]);
    /// # let _ = app;
    /// # }
    /// ```
    pub fn depends_on(&self, children: Vec<Node>) -> Node {
        Node::new(Dependency::new(self.clone(), children))
    }

    pub(crate) fn lookup(&self, key: &dyn Any) -> Option<Value> {
        self.inner.value(key)
    }

    pub(crate) async fn close(&self) {
        self.inner.close().await
    }

    pub(crate) fn finished(&self) -> Signal {
        self.inner.finished()
    }

    pub(crate) fn cause(&self) -> Option<Error> {
        self.inner.cause()
    }

    pub(crate) fn has_counters(&self) -> bool {
        self.inner.has_counters()
    }

    pub(crate) fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Node {
    /// Returns an [`empty`](crate::empty) node.
    fn default() -> Self {
        empty()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("finished", &self.finished().is_fired())
            .field("err", &self.err())
            .finish()
    }
}

/// Returns a no-op node: finished, ready, error-free and without values.
///
/// Return it instead of "no node" from job-starting functions.
pub fn empty() -> Node {
    Node::new(Empty)
}
