//! Plugin manifest (`manifest.json`) lookup and parsing.
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::deploy::paths::is_single_component;
use crate::error::PreconditionError;

/// Identity of the plugin being deployed, read from its manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginManifest {
    /// Plugin identifier; names the folder inside the host plugin directory.
    pub id: String,
    /// Human-readable name, if declared.
    pub name: Option<String>,
    /// Declared version, if any.
    pub version: Option<String>,
    /// File the manifest was read from.
    pub path: PathBuf,
}

impl PluginManifest {
    /// Load the first manifest that exists among `candidates`.
    ///
    /// Candidates are tried in order; the first existing file is parsed and
    /// later candidates are never consulted, even if it turns out invalid.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionError::ManifestMissing`] if no candidate exists,
    /// or any error from [`PluginManifest::parse`].
    pub fn locate(candidates: &[PathBuf]) -> Result<Self, PreconditionError> {
        for path in candidates {
            match std::fs::read_to_string(path) {
                Ok(content) => return Self::parse(path, &content),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(PreconditionError::ManifestInvalid {
                        path: path.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }
        Err(PreconditionError::ManifestMissing {
            checked: candidates.to_vec(),
        })
    }

    /// Parse manifest JSON read from `path`.
    ///
    /// # Errors
    ///
    /// - [`PreconditionError::ManifestInvalid`] if `content` is not a JSON object.
    /// - [`PreconditionError::ManifestMissingId`] if `id` is absent, empty, or
    ///   not a string.
    /// - [`PreconditionError::InvalidPluginId`] if `id` is not a single path
    ///   component.
    pub fn parse(path: &Path, content: &str) -> Result<Self, PreconditionError> {
        let invalid = |message: String| PreconditionError::ManifestInvalid {
            path: path.to_path_buf(),
            message,
        };
        let value: Value = serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;
        let Value::Object(fields) = value else {
            return Err(invalid("expected a JSON object".to_string()));
        };

        let id = fields
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PreconditionError::ManifestMissingId(path.to_path_buf()))?;
        if !is_single_component(id) {
            return Err(PreconditionError::InvalidPluginId(id.to_string()));
        }

        let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
        Ok(Self {
            id: id.to_string(),
            name: text("name"),
            version: text("version"),
            path: path.to_path_buf(),
        })
    }

    /// Short description for log output, e.g. `My Plugin 1.2.0 (my-plugin)`.
    #[must_use]
    pub fn describe(&self) -> String {
        match (&self.name, &self.version) {
            (Some(name), Some(version)) => format!("{name} {version} ({})", self.id),
            (Some(name), None) => format!("{name} ({})", self.id),
            (None, Some(version)) => format!("{} {version}", self.id),
            (None, None) => self.id.clone(),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<PluginManifest, PreconditionError> {
        PluginManifest::parse(Path::new("/p/manifest.json"), content)
    }

    #[test]
    fn reads_id_name_and_version() {
        let m = parse(r#"{"id":"demo","name":"Demo","version":"1.0.0","minAppVersion":"1.4"}"#)
            .unwrap();
        assert_eq!(m.id, "demo");
        assert_eq!(m.name.as_deref(), Some("Demo"));
        assert_eq!(m.version.as_deref(), Some("1.0.0"));
        assert_eq!(m.describe(), "Demo 1.0.0 (demo)");
    }

    #[test]
    fn name_and_version_are_optional() {
        let m = parse(r#"{"id":"demo"}"#).unwrap();
        assert_eq!(m.name, None);
        assert_eq!(m.describe(), "demo");
    }

    #[test]
    fn invalid_json_is_distinct_error() {
        assert!(matches!(
            parse("{not json"),
            Err(PreconditionError::ManifestInvalid { .. })
        ));
        assert!(matches!(
            parse("[1, 2]"),
            Err(PreconditionError::ManifestInvalid { .. })
        ));
    }

    #[test]
    fn missing_empty_or_non_string_id() {
        for content in [r#"{"name":"x"}"#, r#"{"id":""}"#, r#"{"id":42}"#] {
            assert!(
                matches!(parse(content), Err(PreconditionError::ManifestMissingId(_))),
                "{content}"
            );
        }
    }

    #[test]
    fn id_with_separator_is_rejected() {
        for id in ["../escape", "a/b", ".."] {
            let content = format!(r#"{{"id":"{id}"}}"#);
            assert!(
                matches!(parse(&content), Err(PreconditionError::InvalidPluginId(_))),
                "{id}"
            );
        }
    }

    #[test]
    fn locate_prefers_first_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let dist = dir.path().join("dist");
        std::fs::create_dir(&dist).unwrap();
        std::fs::write(dist.join("manifest.json"), r#"{"id":"from-dist"}"#).unwrap();
        std::fs::write(dir.path().join("manifest.json"), r#"{"id":"from-root"}"#).unwrap();

        let candidates = [dist.join("manifest.json"), dir.path().join("manifest.json")];
        let m = PluginManifest::locate(&candidates).unwrap();
        assert_eq!(m.id, "from-dist");
        assert_eq!(m.path, candidates[0]);
    }

    #[test]
    fn locate_falls_back_to_second_candidate() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("manifest.json"), r#"{"id":"from-root"}"#).unwrap();
        let candidates = [
            dir.path().join("dist/manifest.json"),
            dir.path().join("manifest.json"),
        ];
        assert_eq!(PluginManifest::locate(&candidates).unwrap().id, "from-root");
    }

    #[test]
    fn locate_reports_every_checked_location() {
        let dir = tempfile::tempdir().unwrap();
        let candidates = [dir.path().join("a.json"), dir.path().join("b.json")];
        let err = PluginManifest::locate(&candidates).unwrap_err();
        match err {
            PreconditionError::ManifestMissing { checked } => assert_eq!(checked, candidates),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
