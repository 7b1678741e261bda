//! Minimal tsu-recover demo — one healthy handler, two that panic.
//!
//! Run with:
//!   cargo run --example recover
//!
//! Every request gets its own `Context`; the reporter stands in for the
//! centralized error handler that would render a 500 response.

use std::sync::Arc;

use tsu_recover::middleware::{RecoveryConfig, recover, recover_with_config};
use tsu_recover::{
    BoxedHandler, Context, ErasedHandler, Error, ErrorReporter, Handler, Logger, Middleware,
    TracingLogger,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
    let reporter: Arc<dyn ErrorReporter> = Arc::new(|err: Error, _ctx: &Context| {
        tracing::warn!(%err, "responding 500 Internal Server Error");
    });

    let routes: [(&str, BoxedHandler); 3] = [
        ("GET /users/42", recover().wrap(get_user.into_boxed_handler())),
        ("GET /users/0", recover().wrap(divide_by_user.into_boxed_handler())),
        (
            "POST /orders",
            recover_with_config(RecoveryConfig::default().disable_print_stack(true))
                .wrap(create_order.into_boxed_handler()),
        ),
    ];

    for (route, handler) in routes {
        let ctx = Context::new(Arc::clone(&logger), Arc::clone(&reporter));
        let result = tokio::spawn(async move { handler.call(ctx).await })
            .await
            .expect("request task");
        tracing::info!(route, ok = result.is_ok(), "request finished");
    }
}

async fn get_user(_ctx: Context) -> Result<(), Error> {
    Ok(())
}

// GET /users/0 — division by zero, contained by `recover`.
async fn divide_by_user(_ctx: Context) -> Result<(), Error> {
    let id: u32 = "0".parse().map_err(|_| Error::msg("bad id"))?;
    let share = 100 / id;
    tracing::info!(share, "computed share");
    Ok(())
}

// POST /orders — panics with a typed error; the stack is captured but not logged.
async fn create_order(_ctx: Context) -> Result<(), Error> {
    Error::msg("inventory service unavailable").raise()
}
