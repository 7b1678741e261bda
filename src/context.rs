//! Request-scoped context and the collaborators it exposes.
//!
//! The chain engine builds one [`Context`] per request and threads it through
//! every handler. Middleware never creates one; it only calls
//! [`Context::logger`] and [`Context::report_error`] on the instance it is
//! given.

use std::fmt;
use std::sync::Arc;

use crate::error::Error;

// ── Logger ────────────────────────────────────────────────────────────────────

/// Leveled logging sink reachable from a request.
pub trait Logger: Send + Sync + 'static {
    /// Writes one error-level entry.
    fn error(&self, args: fmt::Arguments<'_>);
}

/// [`Logger`] that forwards to [`tracing`].
///
/// Output formatting and transport belong to whatever subscriber the
/// application installs (e.g. `tracing_subscriber::fmt::init()`).
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!("{args}");
    }
}

// ── ErrorReporter ─────────────────────────────────────────────────────────────

/// Centralized failure handler.
///
/// Receives every error handed over through [`Context::report_error`] and
/// decides what the caller of the pipeline sees. Implemented for any
/// `Fn(Error, &Context)`.
pub trait ErrorReporter: Send + Sync + 'static {
    fn report(&self, err: Error, ctx: &Context);
}

impl<F> ErrorReporter for F
where
    F: Fn(Error, &Context) + Send + Sync + 'static,
{
    fn report(&self, err: Error, ctx: &Context) {
        self(err, ctx);
    }
}

// ── Context ───────────────────────────────────────────────────────────────────

/// Request-scoped handle passed to every handler.
///
/// Cloning is cheap (one atomic increment) and every clone refers to the same
/// request.
#[derive(Clone)]
pub struct Context {
    inner: Arc<Shared>,
}

struct Shared {
    logger: Arc<dyn Logger>,
    reporter: Arc<dyn ErrorReporter>,
}

impl Context {
    /// Builds the context for one request.
    ///
    /// `logger` and `reporter` are usually created once at startup and shared
    /// by every request.
    pub fn new(logger: Arc<dyn Logger>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self { inner: Arc::new(Shared { logger, reporter }) }
    }

    /// Shortcut for a context that logs through [`TracingLogger`].
    pub fn with_reporter(reporter: impl ErrorReporter) -> Self {
        Self::new(Arc::new(TracingLogger), Arc::new(reporter))
    }

    pub fn logger(&self) -> &dyn Logger {
        self.inner.logger.as_ref()
    }

    /// Hands `err` to the centralized failure handler.
    pub fn report_error(&self, err: Error) {
        self.inner.reporter.report(err, self);
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}
