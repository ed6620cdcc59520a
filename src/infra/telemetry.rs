use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install the global subscriber: env filter seeded with the configured level, span-trace
/// capture for error reports and the configured formatter.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(formatter(logging.format))
        .try_init()
        .map_err(|err| InfraError::telemetry(format!("subscriber already installed: {err}")))
}

fn formatter<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span> + 'static,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_thread_ids(false)
            .boxed(),
    }
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "clientbooks_email_dispatch_total",
            Unit::Count,
            "Billing e-mail dispatch attempts by kind and result."
        );
        describe_counter!(
            "clientbooks_retry_attempts_total",
            Unit::Count,
            "Retries scheduled after a transient failure, by operation."
        );
        describe_counter!(
            "clientbooks_especialistas_cache_hit_total",
            Unit::Count,
            "Specialist listings served from the process cache."
        );
        describe_counter!(
            "clientbooks_especialistas_cache_miss_total",
            Unit::Count,
            "Specialist listings loaded from the database."
        );
        describe_counter!(
            "clientbooks_requerimentos_transition_total",
            Unit::Count,
            "Requirement lifecycle transitions by target status."
        );
        describe_histogram!(
            "clientbooks_http_request_duration_ms",
            Unit::Milliseconds,
            "HTTP request latency in milliseconds."
        );
    });
}
