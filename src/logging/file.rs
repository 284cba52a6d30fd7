//! The persistent log file: its location, the layer that appends to it, and
//! the plain-text rendering it uses.
use std::borrow::Cow;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};

use super::subscriber::{Fields, Kind};

const ESC: char = '\x1b';
const RULE: &str = "----------------------------------------";

/// Return `$XDG_CACHE_HOME/plugin-deploy/deploy.log`, falling back to
/// `~/.cache/plugin-deploy/deploy.log`.
///
/// Returns `None` when neither a cache directory nor a home directory is
/// known.
#[must_use]
pub fn log_file() -> Option<PathBuf> {
    let cache = std::env::var_os("XDG_CACHE_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME")
                .or_else(|| std::env::var_os("USERPROFILE"))
                .map(|home| PathBuf::from(home).join(".cache"))
        })?;
    Some(cache.join("plugin-deploy").join("deploy.log"))
}

/// Remove ANSI escape sequences.  CSI sequences (`ESC [ ... final`) are
/// dropped whole; any other escape loses only the `ESC` byte.
pub(super) fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains(ESC) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some((text, escape)) = rest.split_once(ESC) {
        out.push_str(text);
        rest = escape.strip_prefix('[').map_or(escape, |csi| {
            csi.split_once(|c: char| ('@'..='~').contains(&c))
                .map_or("", |(_, after)| after)
        });
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// A [`tracing_subscriber::Layer`] that appends every event to the log
/// file, timestamped and without ANSI codes.
///
/// The file is truncated when the layer is created, so it always holds the
/// most recent run only.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate `path`, write the start banner, and return a layer
    /// appending to it.
    pub(super) fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let version = option_env!("PLUGIN_DEPLOY_VERSION")
            .unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let mut file = fs::File::create(path)?;
        writeln!(
            file,
            "plugin-deploy {version}, started {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    fn write(&self, text: &str) {
        if let Ok(mut file) = self.file.lock() {
            file.write_all(text.as_bytes()).ok();
        }
    }
}

/// Render one event as log file text, ending in a newline.
fn render(kind: Kind, fields: &Fields) -> String {
    let ts = Utc::now().format("%H:%M:%S");
    let msg = strip_ansi(fields.message());
    match kind {
        Kind::Run => format!(
            "{RULE}\nplugin:  {}\nmode:    {}\ntarget:  {}\ndry run: {}\n{RULE}\n",
            fields.get("plugin"),
            fields.get("mode"),
            fields.get("path"),
            fields.get("dry_run"),
        ),
        Kind::Stage => format!("[{ts}] ==> {msg}\n"),
        Kind::DryRun => format!("[{ts}]     [dry run] {msg}\n"),
        Kind::Error => format!("[{ts}]     [error] {msg}\n"),
        Kind::Warn => format!("[{ts}]     [warn] {msg}\n"),
        Kind::Debug => format!("[{ts}]     [debug] {msg}\n"),
        Kind::Info => format!("[{ts}]     {msg}\n"),
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let fields = Fields::of(event);
        self.write(&render(Kind::of(event.metadata()), &fields));
    }
}
