//! # Value leaf: one key/value pair attached to a subtree.
//!
//! Keys are compared with `PartialEq` after a type check, so two keys match
//! only when they have the same concrete type and compare equal. Key types
//! must implement `PartialEq`; anything else is rejected at compile time:
//!
//! ```compile_fail
//! struct NotComparable;
//! let _ = jobtree::with_value(NotComparable, 1u8, vec![]);
//! ```
//!
//! Prefer a private unit struct per key to avoid collisions between
//! independent jobs:
//!
//! ```
//! #[derive(PartialEq)]
//! struct AddrKey;
//!
//! let node = jobtree::with_value(AddrKey, "127.0.0.1:8080", vec![]);
//! let addr = node.value_of::<_, &str>(&AddrKey).unwrap();
//! assert_eq!(*addr, "127.0.0.1:8080");
//! ```

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Error;
use crate::tree::{Group, Lifecycle, Node, Signal, Value};

/// Type-erased key comparison.
trait KeyEq: Send + Sync + 'static {
    fn matches(&self, other: &dyn Any) -> bool;
}

impl<K> KeyEq for K
where
    K: PartialEq + Send + Sync + 'static,
{
    fn matches(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<K>().is_some_and(|other| self == other)
    }
}

struct ValueLeaf {
    group: Group,
    key: Box<dyn KeyEq>,
    value: Value,
}

/// Returns a node holding `value` under `key`, merged with `children`.
///
/// Lookups through [`Node::value`] return the topmost match, so an outer
/// value node shadows the values of its children under the same key.
pub fn with_value<K, V>(key: K, value: V, children: Vec<Node>) -> Node
where
    K: PartialEq + Send + Sync + 'static,
    V: Any + Send + Sync,
{
    Node::new(ValueLeaf {
        group: Group::new(children),
        key: Box::new(key),
        value: Arc::new(value),
    })
}

#[async_trait]
impl Lifecycle for ValueLeaf {
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
        if self.key.matches(key) {
            return Some(Arc::clone(&self.value));
        }
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
    use crate::{empty, merge};

    #[derive(PartialEq)]
    struct K1;

    #[derive(PartialEq)]
    struct K2;

    #[derive(PartialEq)]
    struct Named(&'static str);

    #[test]
    fn test_value_wrap() {
        let bg1 = with_value(K1, "v1", vec![]);
        let bg2 = with_value(K2, "v2", vec![bg1]);

        assert_eq!(bg2.value_of::<_, &str>(&K1).as_deref(), Some(&"v1"));
        assert_eq!(bg2.value_of::<_, &str>(&K2).as_deref(), Some(&"v2"));
        assert!(bg2.value(&"missing").is_none());
    }

    #[test]
    fn test_value_outer_shadows_children() {
        let bg1 = with_value(K1, "v1", vec![]);
        let bg2 = with_value(K1, "v2", vec![bg1.clone()]);

        assert_eq!(bg1.value_of::<_, &str>(&K1).as_deref(), Some(&"v1"));
        assert_eq!(bg2.value_of::<_, &str>(&K1).as_deref(), Some(&"v2"));
    }

    #[test]
    fn test_value_keys_compare_by_type_and_equality() {
        let node = merge(vec![
            with_value(Named("a"), 1u32, vec![]),
            with_value(Named("b"), 2u32, vec![]),
            with_value("a", 3u32, vec![]),
        ]);

        assert_eq!(node.value_of::<_, u32>(&Named("b")).as_deref(), Some(&2));
        assert_eq!(node.value_of::<_, u32>(&Named("a")).as_deref(), Some(&1));
        assert_eq!(node.value_of::<_, u32>(&"a").as_deref(), Some(&3));
        assert!(node.value(&Named("c")).is_none());
    }

    #[test]
    fn test_value_of_wrong_type() {
        let node = with_value(K1, 7u64, vec![empty()]);
        assert!(node.value_of::<_, String>(&K1).is_none());
        assert!(node.value(&K1).is_some());
    }
}
