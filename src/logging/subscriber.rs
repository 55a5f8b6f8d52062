//! Tracing subscriber setup: console formatter, run-log file layer, and initialisation.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use super::utils::{format_local_timestamp, strip_ansi, version};

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

/// A [`tracing_subscriber::Layer`] that appends all events to the run log
/// with timestamps, severity tags, and ANSI codes stripped.
///
/// Lines are written as events arrive so an interrupted run still leaves a
/// partial, inspectable log.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Create the run log at `path` (and its parent directory), write a run
    /// header, and return a layer appending to it.
    ///
    /// Returns `None` if the directory or file cannot be created.
    pub(super) fn new(path: &Path) -> Option<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()?;
        let header = format!(
            "==========================================\n\
             provision {} {}\n\
             ==========================================\n",
            version(),
            format_local_timestamp(),
        );
        file.write_all(header.as_bytes()).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let level = *metadata.level();
        let target = metadata.target();

        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = strip_ansi(&extractor.message);
        let ts = format_local_timestamp();

        let line = match (level, target) {
            (tracing::Level::INFO, "provision::stage") => format!("{ts} [INFO] ==> {msg}"),
            (tracing::Level::INFO, "provision::success") => format!("{ts} [SUCCESS] {msg}"),
            (tracing::Level::INFO, "provision::dry_run") => {
                format!("{ts} [INFO] [dry run] {msg}")
            }
            (tracing::Level::ERROR, _) => format!("{ts} [ERROR] {msg}"),
            (tracing::Level::WARN, _) => format!("{ts} [WARNING] {msg}"),
            (tracing::Level::DEBUG | tracing::Level::TRACE, _) => format!("{ts} [DEBUG] {msg}"),
            _ => format!("{ts} [INFO] {msg}"),
        };

        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] that emits provision-style
/// colored console output.
struct ProvisionFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ProvisionFormatter
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
        let metadata = event.metadata();
        let level = *metadata.level();
        let target = metadata.target();

        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = &extractor.message;

        match level {
            tracing::Level::ERROR => writeln!(writer, "\x1b[31mERROR\x1b[0m   {msg}"),
            tracing::Level::WARN => writeln!(writer, "\x1b[33mWARNING\x1b[0m {msg}"),
            tracing::Level::INFO if target == "provision::stage" => {
                writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m")
            }
            tracing::Level::INFO if target == "provision::success" => {
                writeln!(writer, "  \x1b[32m✓\x1b[0m {msg}")
            }
            tracing::Level::INFO if target == "provision::dry_run" => {
                writeln!(writer, "  \x1b[33m[DRY RUN]\x1b[0m {msg}")
            }
            tracing::Level::INFO => writeln!(writer, "  {msg}"),
            _ => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Sets up a console layer (warnings and errors to stderr, everything else to
/// stdout) and, when `log_file` is given, a file layer that writes every
/// event including `debug` to the run log.
/// Only the first call installs a subscriber; later calls are no-ops, so a
/// command that failed before setting up its run log can still report.
pub fn init_subscriber(verbose: bool, log_file: Option<&Path>) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .and(std::io::stdout.with_min_level(tracing::Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ProvisionFormatter)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = log_file
        .and_then(FileLayer::new)
        .map(|l| l.with_filter(LevelFilter::DEBUG));

    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
