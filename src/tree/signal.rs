//! # One-shot broadcast signals.
//!
//! [`Signal`] is the fire-once, multi-waiter primitive every node is built
//! from: close-requested, finished, ready. It is a thin wrapper over
//! [`CancellationToken`], which already provides the needed semantics:
//!
//! - firing is **idempotent** (repeat calls are no-ops, never a fault);
//! - any number of clones can wait on it, before or after it fired;
//! - once fired it stays fired.
//!
//! [`LazySignal`] is the construct-once cell for aggregate signals
//! (`Node::ready` of groups, dependencies and readiness leaves).
//!
//! ## Fan-in
//! ```text
//! ready() ──► LazySignal::get_or_fan_in(inputs)
//!                 │ first caller only (OnceLock)
//!                 ├─ all inputs fired ─► shared fired signal, no task
//!                 └─ otherwise ─► spawn: await input[0] .. input[n-1] ─► fire(out)
//! later callers ─► clone of the same `out`
//! ```

use std::future::IntoFuture;
use std::sync::OnceLock;

use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// Shared, already fired signal (empty nodes, empty groups).
static FIRED: OnceLock<Signal> = OnceLock::new();

/// Fire-once broadcast signal.
///
/// Cloning is cheap; all clones observe the same state. Only the crate can
/// fire a signal, so a `Signal` handed out by [`Node::ready`](crate::Node::ready)
/// or [`ShutdownTail::end`](crate::ShutdownTail::end) is read-only for callers.
///
/// A `Signal` can be awaited directly:
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (node, tail) = jobtree::with_readiness(vec![]);
/// tail.ok();
/// node.ready().await;
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Signal {
    token: CancellationToken,
}

impl Signal {
    pub(crate) fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Returns a clone of the shared fired signal.
    pub(crate) fn fired() -> Self {
        FIRED
            .get_or_init(|| {
                let s = Signal::new();
                s.fire();
                s
            })
            .clone()
    }

    /// Fires the signal; no-op when already fired.
    pub(crate) fn fire(&self) {
        self.token.cancel();
    }

    /// Reports whether the signal has fired.
    #[inline]
    pub fn is_fired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits until the signal fires. Returns immediately if it already did.
    pub async fn wait(&self) {
        self.token.cancelled().await
    }
}

impl IntoFuture for Signal {
    type Output = ();
    type IntoFuture = WaitForCancellationFutureOwned;

    fn into_future(self) -> Self::IntoFuture {
        self.token.cancelled_owned()
    }
}

/// Lock-guarded, construct-once aggregate signal.
///
/// The first caller builds the output signal and spawns the single fan-in
/// task; concurrent and later callers receive clones of the same signal.
#[derive(Debug, Default)]
pub(crate) struct LazySignal {
    cell: OnceLock<Signal>,
}

impl LazySignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the aggregate signal, building it on first access.
    ///
    /// `inputs` is evaluated at most once. The output fires after every input
    /// fired; inputs are awaited in the given order.
    ///
    /// Must be called from within a tokio runtime unless every input has
    /// already fired.
    pub(crate) fn get_or_fan_in<F>(&self, inputs: F) -> Signal
    where
        F: FnOnce() -> Vec<Signal>,
    {
        self.cell
            .get_or_init(|| {
                let inputs = inputs();
                if inputs.iter().all(Signal::is_fired) {
                    return Signal::fired();
                }

                let out = Signal::new();
                let fire = out.clone();
                tokio::spawn(async move {
                    for input in inputs {
                        input.wait().await;
                    }
                    fire.fire();
                });
                out
            })
            .clone()
    }
}
