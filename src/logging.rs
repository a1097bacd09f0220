//! Diagnostic logging setup
//!
//! Script output goes to stdout; everything logged here goes to stderr so the
//! two never interleave in a pipe.

use is_terminal::IsTerminal;

use nu_ansi_term::Color::{Blue, Magenta, Red, Yellow};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Writer},
        FmtContext, FormatEvent, FormatFields,
    },
    registry::LookupSpan,
    EnvFilter,
};

/// Environment variable holding a full `EnvFilter` directive
pub const LOG_ENV: &str = "CANTERBURY_LOG";

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: Vec<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.fields.push(format!("{}={value:?}", field.name()));
        }
    }
}

/// Compact `[LEVEL] message key=value` lines
struct LevelFormatter {
    color: bool,
}

impl LevelFormatter {
    fn tag(&self, level: Level) -> String {
        let (color, label) = match level {
            Level::TRACE => (Magenta, "[TRACE]"),
            Level::DEBUG => (Blue, "[DEBUG]"),
            Level::INFO => (Blue, "[INFO]"),
            Level::WARN => (Yellow, "[WARN]"),
            Level::ERROR => (Red, "[ERROR]"),
        };
        if self.color {
            color.paint(label).to_string()
        } else {
            label.to_string()
        }
    }
}

impl<S, N> FormatEvent<S, N> for LevelFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        write!(writer, "{} ", self.tag(*event.metadata().level()))?;
        if let Some(message) = visitor.message {
            write!(writer, "{message}")?;
        }
        for field in visitor.fields {
            write!(writer, " {field}")?;
        }
        writeln!(writer)
    }
}

/// Map `-q` / `-v` counts to a level
pub fn filter_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        Level::ERROR
    } else if verbose >= 2 {
        Level::TRACE
    } else if verbose == 1 {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

pub fn setup_logging(verbose: u8, quiet: bool, json: bool) {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) if !directive.trim().is_empty() => EnvFilter::new(directive),
        _ => EnvFilter::new(format!("canterbury={}", filter_level(verbose, quiet))),
    };

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .compact()
        .without_time();

    let subscriber: Box<dyn Subscriber + Send + Sync> = if json {
        Box::new(builder.json().flatten_event(true).finish())
    } else {
        let color = std::io::stderr().is_terminal();
        Box::new(builder.event_format(LevelFormatter { color }).finish())
    };

    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing::subscriber::set_global_default(subscriber);
}
