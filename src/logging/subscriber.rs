//! Tracing subscriber for the diagnostic side-channel.
//!
//! Rotation, flush and configuration problems are reported as `tracing`
//! events rather than through the application log, so a failing log file
//! can never recurse into itself. This module renders those events on
//! standard error.

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] printing `<tag> <message>`.
struct DiagnosticFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for DiagnosticFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        writeln!(
            writer,
            "{} {}",
            diagnostic_tag(*event.metadata().level()),
            extractor.message
        )
    }
}

fn diagnostic_tag(level: tracing::Level) -> &'static str {
    match level {
        tracing::Level::ERROR => "\x1b[31m[log error]\x1b[0m",
        tracing::Level::WARN => "\x1b[33m[log warn]\x1b[0m",
        tracing::Level::INFO => "[log]",
        _ => "\x1b[2m[log debug]\x1b[0m",
    }
}

/// Initialise the global [`tracing`] subscriber for diagnostics.
///
/// Info and above are shown by default; `verbose` lowers the threshold
/// to `DEBUG`. `RUST_LOG` overrides both. Call once at startup; later calls
/// are ignored.
pub fn init_subscriber(verbose: bool) {
    use tracing_subscriber::{
        EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
    };

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let layer = fmt::layer()
        .event_format(DiagnosticFormatter)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    let _ = tracing_subscriber::registry().with(layer).try_init();
}
