//! Parser for the project's dotenv-style environment store.
//!
//! Supported syntax, one assignment per line:
//!
//! ```text
//! # comment
//! VAULT_PATH=/home/me/vault
//! export OTHER="quoted # not a comment"
//! PLAIN=value # trailing comment
//! ```
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Key/value pairs loaded from an environment store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvFile {
    path: PathBuf,
    vars: BTreeMap<String, String>,
}

impl EnvFile {
    /// Load the environment store at `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist, which callers treat as
    /// "nothing configured" rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(Self::from_content(path, &content))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Build an environment store from text, recording `path` for messages.
    #[must_use]
    pub fn from_content(path: &Path, content: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            vars: parse(content),
        }
    }

    /// Look up `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Look up `key`, requiring a non-empty value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingValue`] if the key is absent or empty.
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingValue {
                key: key.to_string(),
                file: self.path.clone(),
            })
    }

    /// Path the store was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse dotenv text into a map. Later assignments win.
#[must_use]
pub fn parse(content: &str) -> BTreeMap<String, String> {
    content.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").map_or(line, str::trim_start);
    let (key, raw) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    Some((key.to_string(), parse_value(raw.trim())))
}

fn parse_value(raw: &str) -> String {
    for quote in ['"', '\''] {
        if let Some(rest) = raw.strip_prefix(quote)
            && let Some((inner, _)) = rest.split_once(quote)
        {
            return inner.to_string();
        }
    }
    // Unquoted: a `#` preceded by whitespace starts a comment.
    let value = raw
        .split_once(" #")
        .or_else(|| raw.split_once("\t#"))
        .map_or(raw, |(value, _)| value);
    value.trim_end().to_string()
}
