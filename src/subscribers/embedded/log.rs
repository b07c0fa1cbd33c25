//! # LogWriter: line-per-event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//!
//! ## Example output
//! ```text
//! [tree-ready]
//! [shutdown-requested] reason="os signal" grace=30000ms
//! [grace-exceeded] grace=30000ms stuck="app: http server: timeout expired"
//! [job-failed] err="processor: broken pipe"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn render(e: &Event) -> String {
        let reason = e.reason.as_deref().unwrap_or("unknown");
        match e.kind {
            EventKind::InitFailed => format!("[init-failed] err={reason:?}"),
            EventKind::TreeReady => "[tree-ready]".to_string(),
            EventKind::JobFailed => format!("[job-failed] err={reason:?}"),
            EventKind::ShutdownRequested => format!(
                "[shutdown-requested] reason={reason:?} grace={}ms",
                e.grace_ms.unwrap_or_default()
            ),
            EventKind::AllStoppedWithin => "[all-stopped-within-grace]".to_string(),
            EventKind::GraceExceeded => format!(
                "[grace-exceeded] grace={}ms stuck={reason:?}",
                e.grace_ms.unwrap_or_default()
            ),
            EventKind::SubscriberOverflow => format!(
                "[subscriber-overflow] subscriber={} reason={reason:?}",
                e.subscriber.unwrap_or("unknown")
            ),
            EventKind::SubscriberPanicked => format!(
                "[subscriber-panicked] subscriber={} info={reason}",
                e.subscriber.unwrap_or("unknown")
            ),
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        println!("{}", Self::render(e));
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
