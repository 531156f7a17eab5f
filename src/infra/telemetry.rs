use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "vetrina_content_fetch_total",
            Unit::Count,
            "Total number of content documents fetched successfully."
        );
        describe_counter!(
            "vetrina_content_fetch_error_total",
            Unit::Count,
            "Total number of content document fetches that failed."
        );
        describe_counter!(
            "vetrina_relay_accepted_total",
            Unit::Count,
            "Total number of relay submissions dispatched to the mail transport."
        );
        describe_counter!(
            "vetrina_relay_rejected_total",
            Unit::Count,
            "Total number of relay submissions rejected by the origin, parse, or page gates."
        );
        describe_counter!(
            "vetrina_relay_suppressed_total",
            Unit::Count,
            "Total number of relay submissions suppressed by the honeypot."
        );
        describe_histogram!(
            "vetrina_mail_send_ms",
            Unit::Milliseconds,
            "Mail transport send latency in milliseconds."
        );
    });
}
