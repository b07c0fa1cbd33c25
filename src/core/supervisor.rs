//! # Supervisor: drives a root node from start to shutdown.
//!
//! The [`Supervisor`] owns the event bus, a [`SubscriberSet`] and the runtime
//! [`Config`]. It does not start jobs: the caller builds the tree (jobs are
//! already running) and hands its root over.
//!
//! ## High-level architecture
//! ```text
//! run_until(root, trigger)
//!   ├─ root.err()? ─────────────► publish(InitFailed) ─► Err(InitFailed)   (fail_on_init_error)
//!   ├─ spawn: root.ready() ─────► publish(TreeReady)
//!   ├─ select! {
//!   │     trigger          ─► "trigger" / "os signal"
//!   │     root.wait()      ─► "all jobs joined"   (only when the tree has wait counters)
//!   │  }
//!   ├─ publish(ShutdownRequested)
//!   ├─ root.shutdown(cfg.grace)
//!   │     ├─ Ok   ─► publish(AllStoppedWithin)
//!   │     └─ Err  ─► publish(GraceExceeded) ─► Err(GraceExceeded { cause })
//!   └─ root.err()? ─────────────► publish(JobFailed)
//!
//! Event flow:
//!   Supervisor ── publish ──► Bus ──► listener task ──► SubscriberSet::emit
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use jobtree::{Config, Subscribe, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.grace = Duration::from_secs(5);
//!
//!     #[allow(unused_mut)]
//!     let mut subs: Vec<Arc<dyn Subscribe>> = Vec::new();
//!     #[cfg(feature = "logging")]
//!     subs.push(Arc::new(jobtree::LogWriter::new()));
//!
//!     let (root, tail) = jobtree::with_shutdown(vec![]);
//!     tokio::spawn(async move {
//!         tail.end().await;
//!         tail.done();
//!     });
//!
//!     let sup = Supervisor::new(cfg, subs);
//!     // `run` would wait for SIGINT/SIGTERM instead
//!     sup.run_until(root, tokio::time::sleep(Duration::from_millis(10))).await?;
//!     sup.close().await;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::shutdown;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tree::Node;
use crate::{
    config::Config,
    error::RuntimeError,
    events::Bus,
    events::{Event, EventKind},
};

/// Drives a root node through shutdown and publishes lifecycle events.
pub struct Supervisor {
    /// Runtime configuration.
    pub cfg: Config,
    /// Event bus; subscribe to it for raw access to events.
    pub bus: Bus,
    subs: Arc<SubscriberSet>,
    listener: JoinHandle<()>,
    stop: CancellationToken,
}

impl Supervisor {
    /// Creates a new supervisor with the given config and subscribers.
    ///
    /// Spawns the subscriber workers and the bus listener, so it must be
    /// called from within a tokio runtime.
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(subscribers, bus.clone()));
        let stop = CancellationToken::new();
        let listener = Self::subscriber_listener(&bus, Arc::clone(&subs), stop.clone());
        Self {
            cfg,
            bus,
            subs,
            listener,
            stop,
        }
    }

    /// Runs `root` until a termination signal arrives, then shuts it down
    /// within [`Config::grace`].
    ///
    /// A tree holding wait counters is also shut down once every counter
    /// reached zero.
    pub async fn run(&self, root: Node) -> Result<(), RuntimeError> {
        self.drive(root, "os signal", shutdown::wait_for_shutdown_signal())
            .await
    }

    /// Like [`Supervisor::run`], with `trigger` instead of OS signals.
    pub async fn run_until<F>(&self, root: Node, trigger: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()>,
    {
        self.drive(root, "trigger", async {
            trigger.await;
            Ok(())
        })
        .await
    }

    /// Delivers every event published so far to the subscribers and stops
    /// their workers.
    pub async fn close(self) {
        self.stop.cancel();
        let _ = self.listener.await;
        if let Ok(set) = Arc::try_unwrap(self.subs) {
            set.shutdown().await;
        }
    }

    async fn drive<F>(&self, root: Node, source: &'static str, trigger: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = std::io::Result<()>>,
    {
        if let Some(err) = root.err() {
            self.bus
                .publish(Event::new(EventKind::InitFailed).with_reason(err.to_string()));
            if self.cfg.fail_on_init_error {
                return Err(RuntimeError::InitFailed { cause: err });
            }
        }

        let ready_watcher = self.ready_watcher(&root);

        // without wait counters `wait` resolves at once; only the trigger ends the run
        let joined = async {
            if root.has_counters() {
                root.wait().await
            } else {
                std::future::pending().await
            }
        };

        let mut signal_err = None;
        let reason = tokio::select! {
            res = trigger => match res {
                Ok(()) => source,
                Err(err) => {
                    signal_err = Some(err);
                    "signal listener failed"
                }
            },
            _ = joined => "all jobs joined",
        };

        let grace = self.cfg.grace;
        self.bus.publish(
            Event::new(EventKind::ShutdownRequested)
                .with_reason(reason)
                .with_grace(grace),
        );
        let res = root.shutdown(grace).await;
        ready_watcher.abort();

        match res {
            Ok(()) => self.bus.publish(Event::new(EventKind::AllStoppedWithin)),
            Err(cause) => {
                self.bus.publish(
                    Event::new(EventKind::GraceExceeded)
                        .with_reason(cause.to_string())
                        .with_grace(grace),
                );
                return Err(RuntimeError::GraceExceeded { grace, cause });
            }
        }

        if let Some(err) = root.err() {
            self.bus
                .publish(Event::new(EventKind::JobFailed).with_reason(err.to_string()));
        }

        match signal_err {
            Some(err) => Err(RuntimeError::Signal(err)),
            None => Ok(()),
        }
    }

    /// Publishes `TreeReady` once the root is ready.
    fn ready_watcher(&self, root: &Node) -> JoinHandle<()> {
        let ready = root.ready();
        let bus = self.bus.clone();
        tokio::spawn(async move {
            ready.await;
            bus.publish(Event::new(EventKind::TreeReady));
        })
    }

    /// Subscribes to the bus and forwards events to the subscriber set.
    ///
    /// On `stop`, drains what is already queued and exits.
    fn subscriber_listener(
        bus: &Bus,
        set: Arc<SubscriberSet>,
        stop: CancellationToken,
    ) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    res = rx.recv() => match res {
                        Ok(ev) => set.emit(ev),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => return,
                    },
                    _ = stop.cancelled() => break,
                }
            }
            loop {
                match rx.try_recv() {
                    Ok(ev) => set.emit(ev),
                    Err(TryRecvError::Lagged(_)) => continue,
                    Err(_) => return,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{merge, with_error, with_error_group, with_readiness, with_shutdown, with_wait};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Event>>,
    }

    impl Recorder {
        fn kinds(&self) -> Vec<EventKind> {
            self.seen.lock().unwrap().iter().map(|e| e.kind).collect()
        }

        fn reason_of(&self, kind: EventKind) -> Option<String> {
            self.seen
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.kind == kind)
                .and_then(|e| e.reason.as_deref().map(str::to_string))
        }
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.clone());
        }
    }

    fn supervisor(grace: Duration) -> (Supervisor, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let cfg = Config {
            grace,
            ..Config::default()
        };
        (Supervisor::new(cfg, vec![recorder.clone()]), recorder)
    }

    fn cooperative_job() -> Node {
        let (node, tail) = with_shutdown(vec![]);
        tokio::spawn(async move {
            tail.end().await;
            tail.done();
        });
        node
    }

    #[tokio::test]
    async fn test_run_until_trigger() {
        let (sup, recorder) = supervisor(Duration::from_secs(1));
        let root = cooperative_job();

        sup.run_until(root, tokio::time::sleep(Duration::from_millis(20)))
            .await
            .unwrap();
        sup.close().await;

        let kinds = recorder.kinds();
        assert_eq!(
            kinds,
            vec![
                EventKind::TreeReady,
                EventKind::ShutdownRequested,
                EventKind::AllStoppedWithin
            ]
        );
        assert_eq!(
            recorder.reason_of(EventKind::ShutdownRequested).as_deref(),
            Some("trigger")
        );
    }

    #[tokio::test]
    async fn test_init_error_aborts() {
        let (sup, recorder) = supervisor(Duration::from_secs(1));
        let root = with_error(crate::Error::msg("no config"), vec![]);

        let err = sup
            .run_until(root, std::future::pending())
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "runtime_init_failed");
        sup.close().await;

        assert_eq!(recorder.kinds(), vec![EventKind::InitFailed]);
        assert_eq!(
            recorder.reason_of(EventKind::InitFailed).as_deref(),
            Some("no config")
        );
    }

    #[tokio::test]
    async fn test_init_error_tolerated() {
        let recorder = Arc::new(Recorder::default());
        let cfg = Config {
            fail_on_init_error: false,
            ..Config::default()
        };
        let sup = Supervisor::new(cfg, vec![recorder.clone()]);
        let root = with_error(crate::Error::msg("partial"), vec![cooperative_job()]);

        sup.run_until(root, tokio::time::sleep(Duration::from_millis(10)))
            .await
            .unwrap();
        sup.close().await;

        let kinds = recorder.kinds();
        assert_eq!(kinds.first(), Some(&EventKind::InitFailed));
        assert_eq!(kinds.last(), Some(&EventKind::JobFailed));
    }

    #[tokio::test]
    async fn test_grace_exceeded_names_stuck_path() {
        let (sup, recorder) = supervisor(Duration::from_millis(50));
        let (stuck, _tail) = with_shutdown(vec![]);
        let root = crate::with_annotation("app", vec![crate::with_annotation("stuck", vec![stuck])]);

        let err = sup
            .run_until(root, std::future::ready(()))
            .await
            .unwrap_err();
        match &err {
            RuntimeError::GraceExceeded { grace, cause } => {
                assert_eq!(*grace, Duration::from_millis(50));
                assert_eq!(cause.to_string(), "app: stuck: timeout expired");
            }
            other => panic!("unexpected error: {other}"),
        }
        sup.close().await;

        assert_eq!(recorder.kinds().last(), Some(&EventKind::GraceExceeded));
        assert_eq!(
            recorder.reason_of(EventKind::GraceExceeded).as_deref(),
            Some("app: stuck: timeout expired")
        );
    }

    #[tokio::test]
    async fn test_stops_when_all_jobs_joined() {
        let (sup, recorder) = supervisor(Duration::from_secs(1));
        let (root, tail) = with_wait(vec![]);
        let guard = tail.guard();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            drop(guard);
        });

        tokio::time::timeout(
            Duration::from_secs(1),
            sup.run_until(root, std::future::pending()),
        )
        .await
        .expect("supervisor must stop once jobs joined")
        .unwrap();
        sup.close().await;

        assert_eq!(
            recorder.reason_of(EventKind::ShutdownRequested).as_deref(),
            Some("all jobs joined")
        );
    }

    #[tokio::test]
    async fn test_tree_without_counters_waits_for_trigger() {
        let (sup, recorder) = supervisor(Duration::from_secs(1));
        let root = merge(vec![cooperative_job(), with_readiness(vec![]).0]);

        let started = tokio::time::Instant::now();
        sup.run_until(root, tokio::time::sleep(Duration::from_millis(200)))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(200));
        sup.close().await;

        assert_eq!(
            recorder.reason_of(EventKind::ShutdownRequested).as_deref(),
            Some("trigger")
        );
    }

    #[tokio::test]
    async fn test_job_failure_is_published() {
        let (sup, recorder) = supervisor(Duration::from_secs(1));
        let (root, tail) = with_error_group(vec![]);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            tail.wrap("processor", std::io::Error::other("broken pipe"));
        });

        sup.run_until(root, tokio::time::sleep(Duration::from_millis(50)))
            .await
            .unwrap();
        sup.close().await;

        assert_eq!(
            recorder.reason_of(EventKind::JobFailed).as_deref(),
            Some("processor: broken pipe")
        );
    }

    #[tokio::test]
    async fn test_pending_readiness_is_not_reported() {
        let (sup, recorder) = supervisor(Duration::from_secs(1));
        let (root, _tail) = with_readiness(vec![]);

        sup.run_until(root, tokio::time::sleep(Duration::from_millis(20)))
            .await
            .unwrap();
        sup.close().await;

        assert!(!recorder.kinds().contains(&EventKind::TreeReady));
    }
}
