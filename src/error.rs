//! Error types used by jobtree nodes and the supervisor.
//!
//! This module defines two enums:
//!
//! - [`Error`]: errors carried by the node tree: the shutdown sentinel
//!   ([`Error::Timeout`]), job-reported errors and annotation wrappers.
//! - [`RuntimeError`]: errors raised by the [`Supervisor`](crate::Supervisor) driver.
//!
//! Both types provide `as_label` for logs/metrics. [`Error`] additionally
//! exposes chain helpers ([`Error::root`], [`Error::find`], [`Error::is`]) so
//! callers can test the identity of a wrapped error after annotations were
//! layered on top of it.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// # Errors carried by the node tree.
///
/// `Error` is cheap to clone: payloads are reference counted, so the same
/// error can be observed by every [`Node::err`](crate::Node::err) call.
///
/// ## Chain layout
/// ```text
/// Annotated("app") ─► Annotated("http server") ─► Timeout
///        label              label                  root
/// ```
/// `Display` renders the whole chain: `app: http server: timeout expired`.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// A shutdown deadline elapsed before the subtree finished.
    #[error("timeout expired")]
    Timeout,

    /// An error prefixed with an annotation label.
    #[error("{label}: {source}")]
    Annotated {
        /// Label of the annotation node (or wrap context).
        label: Arc<str>,
        /// The wrapped error.
        source: Box<Error>,
    },

    /// An error reported by a job, kept as-is for inspection.
    #[error(transparent)]
    Job(Arc<dyn StdError + Send + Sync + 'static>),

    /// A formatted error message reported by a job.
    #[error("{0}")]
    Message(Arc<str>),
}

impl Error {
    /// Wraps an arbitrary error reported by a job.
    ///
    /// # Example
    /// ```
    /// use jobtree::Error;
    ///
    /// let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
    /// let err = Error::job(io);
    /// assert_eq!(err.to_string(), "disk gone");
    /// assert!(err.find::<std::io::Error>().is_some());
    /// ```
    pub fn job<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error::Job(Arc::new(err))
    }

    /// Builds a message error.
    pub fn msg(message: impl Into<Arc<str>>) -> Self {
        Error::Message(message.into())
    }

    /// Builds a message error from format arguments.
    pub fn format(args: fmt::Arguments<'_>) -> Self {
        match args.as_str() {
            Some(s) => Error::Message(Arc::from(s)),
            None => Error::Message(Arc::from(args.to_string())),
        }
    }

    /// Wraps `err` with `context`, rendering as `"<context>: <err>"`.
    pub fn wrap<E>(context: impl Into<Arc<str>>, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error::job(err).annotate(context)
    }

    /// Prefixes this error with `label`.
    ///
    /// # Example
    /// ```
    /// use jobtree::Error;
    ///
    /// let err = Error::Timeout.annotate("db").annotate("app");
    /// assert_eq!(err.to_string(), "app: db: timeout expired");
    /// assert!(err.is_timeout());
    /// assert_eq!(err.labels(), vec!["app", "db"]);
    /// ```
    pub fn annotate(self, label: impl Into<Arc<str>>) -> Self {
        Error::Annotated {
            label: label.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping every annotation.
    pub fn root(&self) -> &Error {
        let mut cur = self;
        while let Error::Annotated { source, .. } = cur {
            cur = source;
        }
        cur
    }

    /// Returns annotation labels from the outermost to the innermost.
    pub fn labels(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut cur = self;
        while let Error::Annotated { label, source } = cur {
            out.push(label.as_ref());
            cur = source;
        }
        out
    }

    /// Reports whether the root of this chain is [`Error::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), Error::Timeout)
    }

    /// Reports whether `target` appears in this chain.
    ///
    /// Job and message errors compare by identity (the same reported value),
    /// [`Error::Timeout`] compares by variant.
    ///
    /// # Example
    /// ```
    /// use jobtree::Error;
    ///
    /// let original = Error::msg("broken pipe");
    /// let wrapped = original.clone().annotate("processor");
    /// assert!(wrapped.is(&original));
    /// assert!(!wrapped.is(&Error::msg("broken pipe")));
    /// ```
    pub fn is(&self, target: &Error) -> bool {
        let mut cur = self;
        loop {
            if cur.same(target) {
                return true;
            }
            match cur {
                Error::Annotated { source, .. } => cur = source,
                _ => return false,
            }
        }
    }

    /// Finds the first error of type `E` in the chain, looking through
    /// annotations and into the source chain of job errors.
    pub fn find<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        match self.root() {
            Error::Job(inner) => {
                let mut cur: Option<&(dyn StdError + 'static)> = Some(inner.as_ref());
                while let Some(err) = cur {
                    if let Some(found) = err.downcast_ref::<E>() {
                        return Some(found);
                    }
                    cur = err.source();
                }
                None
            }
            _ => None,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// Annotations are transparent: the label describes the root.
    ///
    /// # Example
    /// ```
    /// use jobtree::Error;
    ///
    /// assert_eq!(Error::Timeout.annotate("x").as_label(), "tree_timeout");
    /// assert_eq!(Error::msg("boom").as_label(), "job_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self.root() {
            Error::Timeout => "tree_timeout",
            _ => "job_failed",
        }
    }

    /// Returns a human-readable message: the root error, then the annotation
    /// path it travelled through.
    ///
    /// # Example
    /// ```
    /// use jobtree::Error;
    ///
    /// let err = Error::Timeout.annotate("db").annotate("app");
    /// assert_eq!(err.as_message(), "timeout expired (at app > db)");
    /// assert_eq!(Error::msg("boom").as_message(), "boom");
    /// ```
    pub fn as_message(&self) -> String {
        let labels = self.labels();
        if labels.is_empty() {
            self.root().to_string()
        } else {
            format!("{} (at {})", self.root(), labels.join(" > "))
        }
    }

    fn same(&self, other: &Error) -> bool {
        match (self, other) {
            (Error::Timeout, Error::Timeout) => true,
            (Error::Job(a), Error::Job(b)) => Arc::ptr_eq(a, b),
            (Error::Message(a), Error::Message(b)) => Arc::ptr_eq(a, b),
            (
                Error::Annotated { label: la, source: sa },
                Error::Annotated { label: lb, source: sb },
            ) => la == lb && sa.same(sb),
            _ => false,
        }
    }
}

/// # Errors produced by the supervisor driver.
///
/// These represent failures observed while driving a root node through its
/// lifecycle, such as a shutdown sequence exceeding its grace period.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The root node already carried an error before it was driven.
    #[error("initialization failed: {cause}")]
    InitFailed {
        /// The error reported by the tree.
        #[source]
        cause: Error,
    },

    /// Shutdown grace period was exceeded; `cause` names the stuck path.
    #[error("shutdown grace {grace:?} exceeded: {cause}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Annotated timeout describing where shutdown is stuck.
        #[source]
        cause: Error,
    },

    /// OS signal handlers could not be installed.
    #[error("failed to listen for shutdown signals: {0}")]
    Signal(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use jobtree::{Error, RuntimeError};
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), cause: Error::Timeout };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::InitFailed { .. } => "runtime_init_failed",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::Signal(_) => "runtime_signal_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::InitFailed { cause } => format!("init failed: {cause}"),
            RuntimeError::GraceExceeded { grace, cause } => {
                format!("grace exceeded after {grace:?}; stuck at: {cause}")
            }
            RuntimeError::Signal(err) => format!("signal listener: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("inner")]
    struct Inner;

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[test]
    fn test_annotation_display_and_root() {
        let err = Error::msg("boom").annotate("processor").annotate("app");
        assert_eq!(err.to_string(), "app: processor: boom");
        assert!(matches!(err.root(), Error::Message(m) if m.as_ref() == "boom"));
        assert_eq!(err.labels(), vec!["app", "processor"]);
    }

    #[test]
    fn test_source_chain_follows_annotations() {
        let err = Error::Timeout.annotate("a");
        let source = StdError::source(&err).expect("annotated error has a source");
        assert_eq!(source.to_string(), "timeout expired");
    }

    #[test]
    fn test_find_walks_job_source_chain() {
        let err = Error::job(Outer(Inner)).annotate("ctx");
        assert!(err.find::<Outer>().is_some());
        assert!(err.find::<Inner>().is_some());
        assert!(err.find::<std::io::Error>().is_none());
    }

    #[test]
    fn test_is_uses_identity() {
        let a = Error::job(Inner);
        let b = Error::job(Inner);
        let wrapped = a.clone().annotate("x");
        assert!(wrapped.is(&a));
        assert!(!wrapped.is(&b));
        assert!(Error::Timeout.annotate("y").is(&Error::Timeout));
    }

    #[test]
    fn test_wrap_and_format() {
        let err = Error::wrap("shutdown error from server", Inner);
        assert_eq!(err.to_string(), "shutdown error from server: inner");
        assert!(err.find::<Inner>().is_some());

        let n = 3;
        let err = Error::format(format_args!("attempt {n} failed"));
        assert_eq!(err.to_string(), "attempt 3 failed");
    }

    #[test]
    fn test_runtime_labels() {
        let err = RuntimeError::InitFailed { cause: Error::msg("x") };
        assert_eq!(err.as_label(), "runtime_init_failed");
        assert_eq!(err.to_string(), "initialization failed: x");
    }
}
