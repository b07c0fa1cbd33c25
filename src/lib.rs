//! # jobtree
//!
//! **jobtree** coordinates the lifecycle of long-running background jobs
//! (servers, pollers, pipelines) through a composable tree of nodes.
//!
//! Every job returns a [`Node`] describing what it offers: a shutdown
//! handshake, a join counter, a readiness announcement, an error, values.
//! Nodes are composed bottom-up with [`merge`] and [`Node::depends_on`] and
//! labelled with [`with_annotation`]; the root then answers for the whole
//! process: is everything ready, did something fail, and shut everything down
//! in dependency order within a deadline.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                         root: Annotation("app")
//!                                    │
//!                        Dependency (db after its users)
//!                     ┌──────────────┴──────────────┐
//!               parent: db                   children: Group
//!            Shutdown + Readiness        ┌───────────┴───────────┐
//!                                  Annotation("http")      Annotation("worker")
//!                                        │                       │
//!                                  Shutdown+Error           Wait + Value
//!
//! Supervisor::run(root) ──► trigger ──► root.shutdown(grace)
//!        │                                   │
//!        └─ publish(Event) ──► Bus ──► SubscriberSet ──► LogWriter / custom
//! ```
//!
//! ### Shutdown
//! ```text
//! root.shutdown(timeout)
//!   ├─► spawn close(root)          (bottom-up: children finish before parents close)
//!   └─► select! {
//!          finished fired ─► Ok(())
//!          deadline       ─► cause walk ─► Err("app: http: timeout expired")
//!                                        └► None (finished meanwhile) ─► Ok(())
//!       }
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / functions                                  |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------------------|
//! | **Tree**          | Compose job nodes, query errors/values, shut down in order.   | [`Node`], [`merge`], [`empty`], [`Node::depends_on`]   |
//! | **Leaves**        | One capability per job, with a write side ("tail").           | [`with_shutdown`], [`with_wait`], [`with_readiness`], [`with_error_group`], [`with_value`] |
//! | **Errors**        | Annotated, cloneable errors and runtime errors.               | [`Error`], [`RuntimeError`]                            |
//! | **Supervision**   | Drive a root until a signal, then shut it down with a grace.  | [`Supervisor`], [`Config`]                             |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, custom).        | [`Subscribe`], [`Event`], [`EventKind`]                |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use jobtree::{merge, with_annotation, with_readiness, with_shutdown, Node};
//!
//! fn start_server() -> Node {
//!     let (shutdown, tail) = with_shutdown(vec![]);
//!     let (node, ready) = with_readiness(vec![shutdown]);
//!     tokio::spawn(async move {
//!         ready.ok();
//!         tail.end().await;
//!         // close listeners...
//!         tail.done();
//!     });
//!     with_annotation("server", vec![node])
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), jobtree::Error> {
//!     let root = with_annotation("app", vec![merge(vec![start_server()])]);
//!     if let Some(err) = root.err() {
//!         return Err(err);
//!     }
//!
//!     tokio::time::timeout(Duration::from_secs(1), root.ready())
//!         .await
//!         .expect("app must become ready");
//!     root.shutdown(Duration::from_secs(5)).await
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod leaves;
mod subscribers;
mod tree;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{wait_for_shutdown_signal, Supervisor};
pub use error::{Error, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use leaves::{
    with_annotation, with_error, with_error_group, with_readiness, with_shutdown, with_value,
    with_wait, ErrTail, ReadinessTail, ShutdownTail, WaitGuard, WaitTail,
};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tree::{empty, merge, Node, Signal, Value};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
