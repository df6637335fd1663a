use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Adapts HTTP headers to OpenTelemetry's Extractor trait
struct HeaderExtractor<'a>(&'a HeaderMap);

impl opentelemetry::propagation::Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(axum::http::HeaderName::as_str).collect()
    }
}

/// Middleware that joins the caller's trace, if the request carries one
///
/// The W3C `traceparent` header is read with the globally configured propagator
/// and set as the parent of the current request span. Spans created while
/// handling the request inherit it, so their `trace_id` matches the caller's.
pub async fn trace_context(request: Request, next: Next) -> Response {
    let parent_context = opentelemetry::global::get_text_map_propagator(|propagator| {
        propagator.extract(&HeaderExtractor(request.headers()))
    });

    let _ = Span::current().set_parent(parent_context);

    next.run(request).await
}
