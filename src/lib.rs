//! # tsu-recover
//!
//! Panic containment for async request handlers. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! A handler that panics must not take its worker down with it, and must not
//! leave its request without an answer. [`middleware::Recover`] wraps the
//! next handler in the chain and:
//!
//! - passes every ordinary return (`Ok` or `Err`) through untouched
//! - catches a panic raised anywhere downstream, once, and never re-raises it
//! - turns the payload into an [`Error`], keeping error payloads as they are
//! - logs `[PANIC RECOVER] <error> <stack>` through the request's [`Logger`]
//! - hands the error to the request's [`ErrorReporter`] and returns `Ok(())`
//!
//! A panic payload cannot be asked whether it implements
//! `std::error::Error`. Only two payload types count as errors: an [`Error`]
//! (raise it with [`Error::raise`]) and a [`BoxError`]
//! (`std::panic::panic_any(Box::new(err) as BoxError)`). Both reach the
//! reporter with their concrete type intact. Any other error type passed to
//! `panic_any` is neither a string nor a primitive, so it is reported by its
//! `Debug` form as `Any { .. }` and loses its message.
//!
//! What the chain engine around it already owns is left alone: routing,
//! running the chain, log transport, and turning the reported error into a
//! response.
//!
//! ## Quick start
//!
//! ```rust
//! use tsu_recover::{Context, ErasedHandler, Error, Handler, Middleware};
//! use tsu_recover::middleware::recover;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let app = recover().wrap(checkout.into_boxed_handler());
//!
//! // One context per request, built by the chain engine.
//! let ctx = Context::with_reporter(|err: Error, _ctx: &Context| {
//!     eprintln!("500 Internal Server Error: {err}");
//! });
//!
//! assert!(app.call(ctx).await.is_ok());
//! # }
//!
//! async fn checkout(_ctx: Context) -> Result<(), Error> {
//!     let cart: Vec<u32> = Vec::new();
//!     let _first = cart[0]; // index out of bounds: contained by `recover`
//!     Ok(())
//! }
//! ```

mod context;
mod error;
mod handler;
mod stack;

pub mod middleware;
pub mod panic;

pub use context::{Context, ErrorReporter, Logger, TracingLogger};
pub use error::{BoxError, Error};
pub use handler::{BoxedHandler, ErasedHandler, Handler, HandlerFuture};
pub use middleware::Middleware;
pub use stack::capture as capture_stack;
