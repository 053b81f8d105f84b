use opentelemetry::{global, trace::TracerProvider, KeyValue};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{logs::SdkLoggerProvider, trace::SdkTracerProvider, Resource};
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Keeps the OpenTelemetry providers alive so they can be flushed on shutdown.
pub struct Telemetry {
    providers: Option<(SdkTracerProvider, SdkLoggerProvider)>,
}

impl Telemetry {
    pub fn shutdown(self) {
        let Some((tracer_provider, log_provider)) = self.providers else {
            return;
        };

        if let Err(e) = tracer_provider.shutdown() {
            tracing::warn!(err = ?e, "an error occurred when shutting down the tracer provider");
        }

        if let Err(e) = log_provider.shutdown() {
            tracing::warn!(err = ?e, "an error occurred when shutting down the logger provider");
        }
    }
}

fn init_providers(otlp_endpoint: &str) -> anyhow::Result<(SdkTracerProvider, SdkLoggerProvider)> {
    let service_name = env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "quotes-api".to_string());

    let service_version =
        env::var("OTEL_SERVICE_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    let resource = Resource::builder()
        .with_service_name(service_name)
        .with_attribute(KeyValue::new("service.version", service_version))
        .build();

    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(otlp_endpoint)
        .build()?;

    let log_exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(otlp_endpoint)
        .build()?;

    let tracer_provider = SdkTracerProvider::builder()
        .with_resource(resource.clone())
        .with_batch_exporter(span_exporter)
        .build();

    let log_provider = SdkLoggerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(log_exporter)
        .build();

    global::set_tracer_provider(tracer_provider.clone());

    Ok((tracer_provider, log_provider))
}

/// Install the global tracing subscriber.
///
/// Logs always go to stdout. Spans and logs are additionally exported over
/// OTLP when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
pub fn init_telemetry() -> anyhow::Result<Telemetry> {
    let providers = match env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        Ok(endpoint) if !endpoint.trim().is_empty() => Some(init_providers(&endpoint)?),
        _ => None,
    };

    let tracer_layer = providers.as_ref().map(|(tracer_provider, _)| {
        tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer("quotes-api"))
    });
    let logger_layer = providers
        .as_ref()
        .map(|(_, log_provider)| OpenTelemetryTracingBridge::new(log_provider));

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    Registry::default()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(tracer_layer)
        .with(logger_layer)
        .try_init()?;

    if providers.is_some() {
        tracing::info!("OpenTelemetry initialized successfully");
    }

    Ok(Telemetry { providers })
}
