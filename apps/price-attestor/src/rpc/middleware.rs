use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{info, Instrument};

/// Names of the components behind the API, attached to every request span.
#[derive(Debug, Clone, Copy)]
pub struct LoggingContext {
    pub source: &'static str,
    pub signer: &'static str,
}

/// Logs every API call with a structured span and the request duration.
///
/// Each request gets a span carrying the price source and signer names, the
/// HTTP method and the path. On completion one line is logged with the status
/// code, `durationMs` and `status` (`ok` or `error`). Failure details are logged
/// by the handlers themselves at the point they occur.
///
/// Fields in logs use *camelCase* convention for consistency.
pub async fn logging_middleware(
    State(context): State<LoggingContext>,
    request: Request,
    next: Next,
) -> Response {
    let span = tracing::info_span!(
        "api_request",
        source = context.source,
        signer = context.signer,
        method = %request.method(),
        path = request.uri().path(),
    );

    async move {
        let start = Instant::now();
        let response = next.run(request).await;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let code = response.status();
        if code.is_success() {
            info!(httpStatus = code.as_u16(), durationMs = duration_ms, status = "ok");
        } else {
            info!(httpStatus = code.as_u16(), durationMs = duration_ms, status = "error");
        }

        response
    }
    .instrument(span)
    .await
}
