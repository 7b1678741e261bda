//! Panic recovery.
//!
//! [`Recover`] supervises every poll of the next handler. A panic raised
//! anywhere downstream is caught at that boundary, turned into an [`Error`],
//! logged with a stack snapshot, and handed to the request's
//! [`ErrorReporter`](crate::ErrorReporter). The wrapped handler then returns
//! `Ok(())`: the panic never travels past this middleware.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{self, Poll};

use futures::FutureExt;

use crate::context::Context;
use crate::error::Error;
use crate::handler::{BoxedHandler, ErasedHandler, HandlerFuture};
use crate::middleware::Middleware;
use crate::{panic, stack};

/// Marker written at the start of every panic-recovery log entry.
pub const PANIC_RECOVER: &str = "PANIC RECOVER";

/// Stack snapshot capacity used when none is configured: 4 KiB.
pub const DEFAULT_STACK_SIZE: usize = 4 << 10;

/// The configuration used by [`recover()`].
pub const DEFAULT_CONFIG: RecoveryConfig = RecoveryConfig::DEFAULT;

// ── RecoveryConfig ────────────────────────────────────────────────────────────

/// Configuration for [`Recover`].
///
/// ```rust
/// use tsu_recover::middleware::{RecoveryConfig, recover_with_config};
///
/// let quiet = recover_with_config(
///     RecoveryConfig::default()
///         .stack_size(16 << 10)
///         .disable_print_stack(true),
/// );
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RecoveryConfig {
    /// Capacity of the stack snapshot buffer in bytes. Longer snapshots are
    /// truncated. `0` means [`DEFAULT_STACK_SIZE`].
    pub stack_size: usize,

    /// Only snapshot the faulting task, without the summary of the other
    /// tasks on the runtime.
    pub disable_stack_all: bool,

    /// Capture the snapshot but do not log it. The error is still reported.
    pub disable_print_stack: bool,
}

impl RecoveryConfig {
    pub const DEFAULT: Self = Self {
        stack_size: DEFAULT_STACK_SIZE,
        disable_stack_all: false,
        disable_print_stack: false,
    };

    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = bytes;
        self
    }

    pub fn disable_stack_all(mut self, disable: bool) -> Self {
        self.disable_stack_all = disable;
        self
    }

    pub fn disable_print_stack(mut self, disable: bool) -> Self {
        self.disable_print_stack = disable;
        self
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ── Recover ───────────────────────────────────────────────────────────────────

/// Middleware that contains panics raised by the handlers it wraps.
#[derive(Clone, Copy, Debug)]
pub struct Recover {
    config: RecoveryConfig,
}

/// Recover middleware with [`DEFAULT_CONFIG`].
pub fn recover() -> Recover {
    Recover::new()
}

/// Recover middleware from `config`. See [`recover()`].
pub fn recover_with_config(config: RecoveryConfig) -> Recover {
    Recover::with_config(config)
}

impl Recover {
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CONFIG)
    }

    pub fn with_config(mut config: RecoveryConfig) -> Self {
        if config.stack_size == 0 {
            config.stack_size = DEFAULT_STACK_SIZE;
        }
        Self { config }
    }

    /// The effective configuration, after defaults were applied.
    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }
}

impl Default for Recover {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for Recover {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(RecoverHandler { next, config: self.config })
    }
}

struct RecoverHandler {
    next: BoxedHandler,
    config: RecoveryConfig,
}

impl ErasedHandler for RecoverHandler {
    fn call(&self, ctx: Context) -> HandlerFuture {
        let next = Arc::clone(&self.next);
        let config = self.config;
        let downstream = ctx.clone();

        Box::pin(async move {
            // `next.call` runs inside the first supervised poll, so a handler
            // that panics before producing its future is contained as well.
            let supervised = Supervised {
                inner: Box::pin(async move { next.call(downstream).await }),
            };

            match AssertUnwindSafe(supervised).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => {
                    handle_panic(&ctx, &config, payload);
                    Ok(())
                }
            }
        })
    }
}

fn handle_panic(ctx: &Context, config: &RecoveryConfig, payload: Box<dyn Any + Send>) {
    let err = panic::into_error(payload);

    let mut buf = vec![0; config.stack_size];
    let length = stack::capture(&mut buf, !config.disable_stack_all);

    if !config.disable_print_stack {
        ctx.logger().error(format_args!(
            "[{PANIC_RECOVER}] {err} {}",
            String::from_utf8_lossy(&buf[..length]),
        ));
    }

    ctx.report_error(err);
}

// ── Supervision boundary ──────────────────────────────────────────────────────

/// Marks the current thread as supervised for the duration of every poll of
/// `inner`, so the panic hook records the faulting stack. Catching the panic
/// itself is left to `catch_unwind` around this future.
struct Supervised {
    inner: HandlerFuture,
}

impl Future for Supervised {
    type Output = Result<(), Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut task::Context<'_>) -> Poll<Self::Output> {
        let _supervision = stack::supervise();
        let poll = self.inner.as_mut().poll(cx);
        if poll.is_ready() {
            // Panics the handler caught itself must not leak into a later
            // snapshot taken on this thread.
            stack::discard();
        }
        poll
    }
}
