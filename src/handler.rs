//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! Middleware receives the next handler without knowing its concrete type,
//! and must hand back a handler of the same shape. Both sides therefore talk
//! in **trait objects** (`dyn ErasedHandler`): the concrete handler type is
//! hidden behind a common interface, and every stage of a chain looks the
//! same to the stage in front of it.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn index(ctx: Context) -> Result<(), Error> { … }  ← user writes this
//!        ↓ index.into_boxed_handler()
//! Arc::new(FnHandler(index))                             ← Handler blanket impl
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! recover().wrap(handler)                                ← middleware wraps it
//!        ↓
//! handler.call(ctx)  at request time                     ← one vtable dispatch
//!        ↓
//! Box::pin(index(ctx))                                   ← HandlerFuture
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Error;

/// A heap-allocated, type-erased future that resolves to a handler result.
///
/// `Send + 'static` let tokio move the future across worker threads.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'static>>;

/// Dispatch interface shared by user handlers and middleware-produced
/// handlers.
///
/// Middleware implements this directly for the handler it returns from
/// [`Middleware::wrap`](crate::Middleware::wrap).
pub trait ErasedHandler {
    fn call(&self, ctx: Context) -> HandlerFuture;
}

/// A type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid request handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` (or closure returning a future) with the signature:
///
/// ```text
/// async fn name(ctx: Context) -> Result<(), Error>
/// ```
///
/// The trait is **sealed**: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    /// Erases the handler's type so it can be wrapped by middleware.
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut> private::Sealed for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Error>> + Send + 'static,
{
}

impl<F, Fut> Handler for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Error>> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Newtype wrapper that holds a concrete handler `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut> ErasedHandler for FnHandler<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), Error>> + Send + 'static,
{
    fn call(&self, ctx: Context) -> HandlerFuture {
        Box::pin((self.0)(ctx))
    }
}
