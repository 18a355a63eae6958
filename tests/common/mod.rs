// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed project and a fluent builder so each
// integration test can lay out an isolated JavaScript project, plus stub
// executor and confirmation implementations that never touch a real
// package manager or terminal.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use configshift::config::Settings;
use configshift::exec::{ExecResult, Executor, OutputMode};
use configshift::logging::Logger;
use configshift::operations::SystemFileSystemOps;
use configshift::resources::{PackageManager, RunOptions};
use configshift::tasks::{Confirm, Context, MigrateFlags};

/// Date stamped on every backup and report written by these tests.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date")
}

/// An isolated project backed by a [`tempfile::TempDir`].
pub struct TestProject {
    pub dir: tempfile::TempDir,
}

impl TestProject {
    /// Path to the project root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `rel` inside the project.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Read `rel` as a string.
    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).expect("read project file")
    }

    /// Read `rel` as JSON.
    pub fn json(&self, rel: &str) -> serde_json::Value {
        serde_json::from_str(&self.read(rel)).expect("parse project JSON")
    }

    /// Build a task context over the real filesystem and the given stubs.
    pub fn context(
        &self,
        executor: Arc<StubExecutor>,
        opts: RunOptions,
        flags: MigrateFlags,
    ) -> Context {
        Context {
            root: self.root().to_path_buf(),
            settings: Settings::default(),
            log: Arc::new(Logger::new("test")),
            executor,
            fs_ops: Arc::new(SystemFileSystemOps),
            confirm: Arc::new(RefuseConfirm),
            opts,
            flags,
            profile: PackageManager::Npm.profile(),
            today: today(),
        }
    }
}

/// Fluent builder for [`TestProject`].
pub struct ProjectBuilder {
    project: TestProject,
}

impl ProjectBuilder {
    /// Begin building an empty project.
    pub fn new() -> Self {
        Self {
            project: TestProject {
                dir: tempfile::tempdir().expect("create temp dir"),
            },
        }
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn file(self, rel: &str, content: &str) -> Self {
        let path = self.project.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, content).expect("write project file");
        self
    }

    /// Create the directory `rel`.
    pub fn dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.project.path(rel)).expect("create dir");
        self
    }

    /// Finish building.
    pub fn build(self) -> TestProject {
        self.project
    }
}

/// A project carrying the usual Prettier + ESLint + Husky stack.
pub fn legacy_project() -> TestProject {
    ProjectBuilder::new()
        .file(
            "package.json",
            r#"{
  "name": "legacy",
  "scripts": {
    "prepare": "husky",
    "lint": "eslint ."
  },
  "eslintConfig": {
    "extends": ["next"]
  },
  "devDependencies": {
    "eslint": "^9.0.0",
    "eslint-config-next": "15.0.0",
    "husky": "^9.0.0",
    "prettier": "^3.0.0"
  }
}
"#,
        )
        .file(".prettierrc", "{ \"semi\": false }\n")
        .file(".prettierignore", "dist\n")
        .file(".husky/pre-commit", "npx lint-staged\n")
        .file("src/app.css", "body { margin: 0; }\n")
        .file("tsconfig.json", "{}\n")
        .build()
}

/// One recorded subprocess invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

/// [`Executor`] that records invocations and reports success, or failure
/// for programs listed as missing.
#[derive(Debug, Default)]
pub struct StubExecutor {
    calls: Mutex<Vec<Invocation>>,
    missing: Vec<String>,
}

impl StubExecutor {
    /// A stub on whose PATH every program exists.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A stub on whose PATH `programs` do not exist.
    pub fn without(programs: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            missing: programs.iter().map(ToString::to_string).collect(),
            ..Self::default()
        })
    }

    /// Every invocation, in order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("calls poisoned").clone()
    }

    /// Every invocation rendered as one command line.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|c| format!("{} {}", c.program, c.args.join(" ")))
            .collect()
    }
}

impl Executor for StubExecutor {
    fn run_in_unchecked(
        &self,
        _dir: &Path,
        program: &str,
        args: &[String],
        _mode: OutputMode,
    ) -> anyhow::Result<ExecResult> {
        self.calls.lock().expect("calls poisoned").push(Invocation {
            program: program.to_string(),
            args: args.to_vec(),
        });
        Ok(ExecResult {
            success: true,
            code: Some(0),
            ..ExecResult::default()
        })
    }

    fn which(&self, program: &str) -> bool {
        !self.missing.iter().any(|m| m == program)
    }
}

/// [`Confirm`] that always says no.
#[derive(Debug)]
pub struct RefuseConfirm;

impl Confirm for RefuseConfirm {
    fn confirm(&self, _prompt: &str) -> anyhow::Result<bool> {
        Ok(false)
    }
}
