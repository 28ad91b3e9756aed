use crate::context::Context;
use crate::route::Handler;
use http::StatusCode;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Catches panics from the rest of the chain, logs them at `error` level
/// and answers with 500 when nothing was written yet.
pub fn recovery() -> impl Handler {
    |ctx: &mut Context| {
        let result = panic::catch_unwind(AssertUnwindSafe(|| ctx.next()));
        let Err(payload) = result else {
            return;
        };

        tracing::error!(
            "panic recovered while serving {} {}: {}",
            ctx.method(),
            ctx.path(),
            panic_message(payload.as_ref())
        );

        if ctx.writer().written() {
            ctx.abort();
        } else {
            ctx.abort_with_status(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}
