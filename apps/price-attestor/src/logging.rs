use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace::SdkTracerProvider};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Name of the OpenTelemetry tracer that stamps `trace_id` and `span_id` on spans.
pub const TRACER_NAME: &str = "price-attestor";

/// Initialize structured JSON logging for the service.
///
/// Events are written as flattened JSON lines with RFC 3339 UTC timestamps,
/// filtered by `RUST_LOG` (default `info`). The W3C trace-context propagator is
/// installed globally so [`crate::rpc::interceptor`] can join incoming traces.
pub fn init_logging() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let provider = SdkTracerProvider::builder().build();
    let otel_layer = OpenTelemetryLayer::new(provider.tracer(TRACER_NAME));

    let fmt_layer = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_current_span(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_file(true)
        .with_target(false)
        .flatten_event(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer)
        .with(fmt_layer)
        .init();

    opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());
}
