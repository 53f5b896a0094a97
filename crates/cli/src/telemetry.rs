//! Observability wiring.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` (`RUST_LOG`,
//! default `info`) and a text or JSON `fmt` layer writing to stderr. Stdout is
//! reserved for the report itself and for workflow commands. Progress lines on
//! [`CONSOLE_TARGET`] stay enabled whatever `RUST_LOG` says. When
//! `OTEL_EXPORTER_OTLP_ENDPOINT` is set, spans are additionally exported over
//! OTLP/gRPC through `tracing-opentelemetry`.

use anyhow::{Context, Result};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::{runtime, Resource};
use pipeline::CONSOLE_TARGET;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::LogFormat;

const SERVICE_NAME: &str = "git-audit-log-report";

/// Keeps the trace exporter alive until [`Telemetry::shutdown`] flushes it.
pub struct Telemetry {
    provider: Option<TracerProvider>,
}

impl Telemetry {
    /// Flushes and stops the OTLP exporter, if one was installed.
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(error) = provider.shutdown() {
                tracing::warn!(%error, "failed to flush trace exporter");
            }
        }
    }
}

/// Installs the global subscriber. Must be called from within a Tokio runtime.
pub fn init(format: LogFormat) -> Result<Telemetry> {
    let filter = env_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref())?;

    let fmt_layer = match format {
        LogFormat::Text => fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let provider = match std::env::var_os("OTEL_EXPORTER_OTLP_ENDPOINT") {
        Some(_) => {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .build()
                .context("failed to build OTLP span exporter")?;
            Some(
                TracerProvider::builder()
                    .with_batch_exporter(exporter, runtime::Tokio)
                    .with_resource(Resource::new(vec![KeyValue::new(
                        "service.name",
                        SERVICE_NAME,
                    )]))
                    .build(),
            )
        }
        None => None,
    };
    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(SERVICE_NAME)));

    tracing_subscriber::registry()
        .with(otel_layer)
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(Telemetry { provider })
}

/// Builds the level filter from `RUST_LOG`-style `directives`.
///
/// Falls back to `info` when `directives` is absent or unparsable.
fn env_filter(directives: Option<&str>) -> Result<EnvFilter> {
    let filter = directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    let console: Directive = format!("{CONSOLE_TARGET}=info")
        .parse()
        .context("invalid console log directive")?;
    Ok(filter.add_directive(console))
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing::{info, warn};

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(directives: Option<&str>, emit: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter(directives).unwrap())
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, emit);
        captured.text()
    }

    #[test]
    fn console_lines_survive_a_warn_level_filter() {
        let output = capture(Some("warn"), || {
            info!(target: CONSOLE_TARGET, "foo ## Clones: 2, Pushes: 0, Fetches: 0");
            info!("routine detail");
            warn!("something odd");
        });

        assert!(output.contains("foo ## Clones: 2, Pushes: 0, Fetches: 0"));
        assert!(!output.contains("routine detail"));
        assert!(output.contains("something odd"));
    }

    #[test]
    fn unparsable_directives_fall_back_to_info() {
        let output = capture(Some("acme=loudest"), || {
            info!("routine detail");
        });

        assert!(output.contains("routine detail"));
    }
}
