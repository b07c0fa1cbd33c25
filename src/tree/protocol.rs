//! # Deadline-bounded shutdown protocol.
//!
//! Shared by every node kind; turns a close request into either `Ok(())`
//! (subtree fully finished) or an annotated [`Error::Timeout`].
//!
//! ## Flow
//! ```text
//! shutdown(node, deadline)
//!   ├─► spawn node.close()            (independent; keeps running past the deadline)
//!   └─► select (biased)
//!         ├─ node.finished() ─► Ok(())
//!         └─ deadline        ─► node.cause()
//!                                 ├─ Some(err) ─► Err(labels…: timeout expired)
//!                                 └─ None      ─► Ok(())   (finished during the walk)
//! ```
//!
//! ## Rules
//! - The deadline bounds only how long the **caller** waits; the close work is
//!   never cancelled. A job that never reports done keeps its close task
//!   pending forever.
//! - A timeout and the subtree's completion may cross; when the cause walk
//!   finds nothing unfinished the shutdown counts as complete.
//! - Repeated calls are safe: `close` is idempotent on every node kind.

use std::future::Future;

use crate::error::Error;
use crate::tree::node::Node;

pub(crate) async fn shutdown<F>(node: &Node, deadline: F) -> Result<(), Error>
where
    F: Future<Output = ()>,
{
    let closer = node.clone();
    tokio::spawn(async move { closer.close().await });

    let finished = node.finished();
    tokio::select! {
        biased;
        _ = finished.wait() => Ok(()),
        _ = deadline => match node.cause() {
            Some(err) => Err(err),
            None => Ok(()),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use crate::tree::testutil::{propagate, run_shutdownable};
    use crate::{merge, with_shutdown};

    #[tokio::test]
    async fn test_shutdown_completes() {
        let (node, tail) = with_shutdown(vec![]);
        let release = run_shutdownable(tail);
        release.cancel();

        node.shutdown(Duration::from_secs(1)).await.unwrap();
        assert!(node.finished().is_fired());
    }

    #[tokio::test]
    async fn test_shutdown_timeout_then_success() {
        let (node, tail) = with_shutdown(vec![]);
        let release = run_shutdownable(tail);

        let err = node.shutdown(Duration::from_millis(50)).await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "timeout expired");

        // close keeps running after the deadline
        release.cancel();
        propagate().await;
        assert!(node.finished().is_fired());
        node.shutdown(Duration::from_millis(50)).await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_successive_calls() {
        let (node, tail) = with_shutdown(vec![]);
        let release = run_shutdownable(tail);
        release.cancel();

        for _ in 0..3 {
            node.shutdown(Duration::from_secs(1)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_shutdown_until_external_token() {
        let (node, tail) = with_shutdown(vec![]);
        let _release = run_shutdownable(tail);
        let token = CancellationToken::new();

        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            cancel.cancel();
        });

        let err = node.shutdown_until(token.cancelled()).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_deadline_first_with_nothing_unfinished_succeeds() {
        let (a, ta) = with_shutdown(vec![]);
        ta.done();
        let node = merge(vec![a]);

        // the close task has not run yet, so the deadline wins the race
        node.shutdown_until(std::future::ready(())).await.unwrap();
        assert!(!node.finished().is_fired());

        propagate().await;
        assert!(node.finished().is_fired());
    }

    #[tokio::test]
    async fn test_expired_deadline_on_finished_tree_succeeds() {
        let (a, ta) = with_shutdown(vec![]);
        ta.done();
        let node = merge(vec![a]);
        // finished is checked before the deadline
        node.shutdown(Duration::from_secs(1)).await.unwrap();
        node.shutdown(Duration::ZERO).await.unwrap();
    }
}
