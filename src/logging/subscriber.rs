//! Global subscriber: event classification, field capture, and the console
//! formatter.
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use tracing::{Event, Level as TraceLevel, Metadata};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use super::file::FileLayer;
use super::types::{DRY_RUN_TARGET, RUN_TARGET, STAGE_TARGET};

/// How an event is presented, derived from its level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Kind {
    Run,
    Stage,
    DryRun,
    Error,
    Warn,
    Info,
    Debug,
}

impl Kind {
    pub(super) fn of(metadata: &Metadata<'_>) -> Self {
        match (*metadata.level(), metadata.target()) {
            (TraceLevel::ERROR, _) => Self::Error,
            (TraceLevel::WARN, _) => Self::Warn,
            (TraceLevel::INFO, RUN_TARGET) => Self::Run,
            (TraceLevel::INFO, STAGE_TARGET) => Self::Stage,
            (TraceLevel::INFO, DRY_RUN_TARGET) => Self::DryRun,
            (TraceLevel::INFO, _) => Self::Info,
            _ => Self::Debug,
        }
    }
}

/// Every field of one event, rendered as text.
#[derive(Debug, Default)]
pub(super) struct Fields {
    values: BTreeMap<&'static str, String>,
}

impl Fields {
    pub(super) fn of(event: &Event<'_>) -> Self {
        let mut fields = Self::default();
        event.record(&mut fields);
        fields
    }

    /// Value of `name`, or the empty string if the event did not carry it.
    pub(super) fn get(&self, name: &str) -> &str {
        self.values.get(name).map_or("", String::as_str)
    }

    pub(super) fn message(&self) -> &str {
        self.get("message")
    }
}

impl tracing::field::Visit for Fields {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        self.values.insert(field.name(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.values.insert(field.name(), value.to_string());
    }
}

/// Console formatter: coloured tags for problems and dry-run actions, a bold
/// arrow for stages, an aligned block for the run header, and indented text
/// for everything else.
struct ConsoleFormat;

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let fields = Fields::of(event);
        let msg = fields.message();
        match Kind::of(event.metadata()) {
            Kind::Run => {
                let dry_run = if fields.get("dry_run") == "true" {
                    " \x1b[33m(dry run)\x1b[0m"
                } else {
                    ""
                };
                writeln!(writer, "  plugin: {}", fields.get("plugin"))?;
                writeln!(writer, "  mode:   {}{dry_run}", fields.get("mode"))?;
                writeln!(writer, "  target: {}", fields.get("path"))
            }
            Kind::Stage => writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Kind::DryRun => writeln!(writer, "  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
            Kind::Error => writeln!(writer, "\x1b[31mERROR\x1b[0m {msg}"),
            Kind::Warn => writeln!(writer, "\x1b[33mWARN\x1b[0m  {msg}"),
            Kind::Info => writeln!(writer, "  {msg}"),
            Kind::Debug => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Warnings and errors go to stderr, everything else to stdout; `debug`
/// reaches the console only when `verbose` is set.  When `log_file` is given
/// and can be created, every event down to `debug` is also appended to it.
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, log_file: Option<&Path>) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let make_writer = std::io::stderr
        .with_max_level(TraceLevel::WARN)
        .and(std::io::stdout.with_min_level(TraceLevel::INFO));
    let console_layer = tracing_subscriber::fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = log_file
        .and_then(|path| FileLayer::create(path).ok())
        .map(|layer| layer.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
