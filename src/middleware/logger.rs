use crate::context::Context;
use crate::route::Handler;
use std::time::Instant;

/// Logs one line per request at `info` level, once the rest of the chain
/// has finished.
pub fn logger() -> impl Handler {
    |ctx: &mut Context| {
        let start = Instant::now();
        let method = ctx.method().clone();
        let target = ctx
            .request()
            .uri()
            .path_and_query()
            .map_or_else(|| ctx.path().to_owned(), |pq| pq.as_str().to_owned());

        ctx.next();

        let status = ctx.writer().status();
        tracing::info!(
            status = status.as_u16(),
            latency = ?start.elapsed(),
            size = ctx.writer().size(),
            route = ctx.full_path(),
            "{} {}",
            method,
            target
        );
    }
}
