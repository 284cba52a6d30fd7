// Shared helpers for integration tests.
//
// Provides a temporary directory holding a plugin project next to a host
// vault, and a fluent builder so each integration test can set up an isolated
// environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use plugin_deploy::commands;
use plugin_deploy::config::Invocation;
use plugin_deploy::deploy::DeployOutcome;
use plugin_deploy::fs::RealFs;
use plugin_deploy::logging::BufferedLog;

/// Plugin identifier written to the default manifest.
pub const PLUGIN_ID: &str = "sample-plugin";

/// An isolated project + vault pair backed by a [`tempfile::TempDir`].
///
/// Layout:
///
/// ```text
/// <root>/project/dist/manifest.json
/// <root>/project/dist/main.js
/// <root>/vault/
/// ```
pub struct IntegrationTestContext {
    /// Temporary directory containing the project and the vault.
    pub root: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a context with a built artifact and an empty vault, but no
    /// environment store.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let ctx = Self { root };
        std::fs::create_dir_all(ctx.artifact()).expect("create artifact dir");
        std::fs::create_dir_all(ctx.vault()).expect("create vault dir");
        std::fs::write(
            ctx.artifact().join("manifest.json"),
            format!(r#"{{"id":"{PLUGIN_ID}","name":"Sample","version":"1.0.0"}}"#),
        )
        .expect("write manifest");
        std::fs::write(ctx.artifact().join("main.js"), "console.log('hi');").expect("write main.js");
        ctx
    }

    /// Project root.
    pub fn project(&self) -> PathBuf {
        self.root.path().join("project")
    }

    /// Artifact root.
    pub fn artifact(&self) -> PathBuf {
        self.project().join("dist")
    }

    /// Host vault.
    pub fn vault(&self) -> PathBuf {
        self.root.path().join("vault")
    }

    /// Where the plugin is deployed.
    pub fn target(&self) -> PathBuf {
        self.vault().join(".obsidian/plugins").join(PLUGIN_ID)
    }

    /// Invocation for `mode` in this project.
    pub fn invocation(&self, mode: Option<&str>) -> Invocation {
        Invocation {
            mode: mode.map(str::to_string),
            base: None,
            project: self.project(),
            dry_run: false,
        }
    }

    /// Run the deploy command with a capturing logger.
    pub fn deploy(&self, invocation: &Invocation) -> (anyhow::Result<DeployOutcome>, BufferedLog) {
        let log = BufferedLog::new();
        let outcome = commands::deploy::run(invocation, &RealFs, &log);
        (outcome, log)
    }

    /// Deploy in `mode`, expecting success.
    pub fn deploy_ok(&self, mode: &str) -> DeployOutcome {
        self.deploy(&self.invocation(Some(mode)))
            .0
            .expect("deployment should succeed")
    }

    /// Every path under the temp root (relative, sorted), with file contents,
    /// for before/after comparisons.  Symlinks are listed but not followed.
    pub fn snapshot(&self) -> Vec<(PathBuf, Option<String>)> {
        Self::tree(self.root.path())
    }

    /// Like [`snapshot`](Self::snapshot), but for the tree below `dir`.
    pub fn tree(dir: &Path) -> Vec<(PathBuf, Option<String>)> {
        let mut out = Vec::new();
        walk(dir, dir, &mut out);
        out.sort();
        out
    }
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<(PathBuf, Option<String>)>) {
    for entry in std::fs::read_dir(dir).expect("read dir") {
        let path = entry.expect("dir entry").path();
        let meta = path.symlink_metadata().expect("lstat");
        let rel = path.strip_prefix(root).expect("under root").to_path_buf();
        if meta.is_dir() {
            out.push((rel, None));
            walk(root, &path, out);
        } else if meta.file_type().is_symlink() {
            let link = std::fs::read_link(&path).expect("read link");
            out.push((rel, Some(format!("-> {}", link.display()))));
        } else {
            out.push((rel, std::fs::read_to_string(&path).ok()));
        }
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// The context being built, for computing paths mid-build.
    pub fn context(&self) -> &IntegrationTestContext {
        &self.ctx
    }

    /// Write an environment store pointing `VAULT_PATH` at the vault.
    pub fn with_env(self) -> Self {
        let content = format!("VAULT_PATH={}\n", self.ctx.vault().display());
        self.with_project_file(".env", &content)
    }

    /// Write `content` to `<project>/<rel>`, creating parent directories.
    pub fn with_project_file(self, rel: &str, content: &str) -> Self {
        write(&self.ctx.project().join(rel), content);
        self
    }

    /// Write `content` to `<artifact>/<rel>`, creating parent directories.
    pub fn with_artifact_file(self, rel: &str, content: &str) -> Self {
        write(&self.ctx.artifact().join(rel), content);
        self
    }

    /// Write `content` to `<target>/<rel>`, making the target a real directory.
    pub fn with_target_file(self, rel: &str, content: &str) -> Self {
        write(&self.ctx.target().join(rel), content);
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}
