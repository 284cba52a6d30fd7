//! Logging: the [`Log`] abstraction, its `tracing` and in-memory backends,
//! and the console and log file output of a run.

mod buffered;
mod file;
mod logger;
mod subscriber;
mod types;

pub use buffered::{BufferedLog, LogEntry};
pub use file::log_file;
pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{Level, Log, RunHeader};

/// Route this thread's `tracing` events into a fresh log file inside a
/// temporary directory, and return a [`Logger`] pointing at that file.
///
/// Keep the guard alive for the whole test; dropping it restores the
/// previous thread-local dispatcher.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn capture_to_file() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("deploy.log");
    let layer = file::FileLayer::create(&path).expect("log file");
    let subscriber = tracing_subscriber::registry().with(layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (Logger::new(Some(path)), dir, guard)
}
