//! Middleware layer.
//!
//! Middleware wraps a handler in another handler of the same shape and is the
//! right place for cross-cutting concerns. A chain engine builds its pipeline
//! by folding [`Middleware::wrap`] over the user's handler:
//!
//! ```rust
//! use tsu_recover::{Context, Error, Handler, Middleware};
//! use tsu_recover::middleware::recover;
//!
//! async fn index(_ctx: Context) -> Result<(), Error> {
//!     Ok(())
//! }
//!
//! let app = recover().wrap(index.into_boxed_handler());
//! ```
//!
//! Built-in middleware:
//! - [`recover()`] — contains panics raised downstream and reports them as errors

mod recover;

pub use recover::{
    DEFAULT_CONFIG, DEFAULT_STACK_SIZE, PANIC_RECOVER, Recover, RecoveryConfig, recover,
    recover_with_config,
};

use crate::handler::BoxedHandler;

/// A transformation from one handler into another.
///
/// Implementations are built once at startup and shared by every request, so
/// `wrap` takes `&self`.
pub trait Middleware: Send + Sync + 'static {
    /// Returns a handler that runs `next` with this middleware's behavior
    /// around it.
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;
}
