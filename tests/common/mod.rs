// Shared helpers for integration tests.
//
// Provides a temporary provisioning root with its own fake home directory,
// an in-memory stand-in for brew and the editor CLI, and a recording logger,
// so each integration test can drive real tasks without touching the host.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use provision_cli::config::Config;
use provision_cli::exec::{ExecResult, Executor};
use provision_cli::logging::{Log, TaskEntry, TaskStatus};
use provision_cli::reconcile::ReconcileResult;
use provision_cli::resources::package::listed_name;
use provision_cli::tasks::{self, Context};

/// A provisioning root and a fake home directory, both under one
/// [`tempfile::TempDir`] that is deleted on drop.
pub struct TestRoot {
    dir: tempfile::TempDir,
}

impl TestRoot {
    /// Create an empty root (no settings, no manifests) and an empty home.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(dir.path().join("root")).expect("create root");
        std::fs::create_dir_all(dir.path().join("home")).expect("create home");
        Self { dir }
    }

    /// Create a root with the three base manifests.
    pub fn with_base_manifests(packages: &str, applications: &str, extensions: &str) -> Self {
        Self::new()
            .manifest("packages.txt", packages)
            .manifest("applications.txt", applications)
            .manifest("extensions.txt", extensions)
    }

    /// Write `manifests/<name>`.
    pub fn manifest(self, name: &str, content: &str) -> Self {
        write(&self.root().join("manifests").join(name), content);
        self
    }

    /// Write `provision.toml`.
    pub fn settings(self, content: &str) -> Self {
        write(&self.root().join("provision.toml"), content);
        self
    }

    /// Write a file relative to the fake home directory.
    pub fn home_file(self, rel: &str, content: &str) -> Self {
        write(&self.home().join(rel), content);
        self
    }

    /// Provisioning root.
    pub fn root(&self) -> PathBuf {
        self.dir.path().join("root")
    }

    /// Fake home directory.
    pub fn home(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    /// Load configuration, panicking on error.
    pub fn load(&self, full: bool) -> Config {
        Config::load(&self.root(), &self.home(), full).expect("load config")
    }
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().expect("parent")).expect("create parent dir");
    std::fs::write(path, content).expect("write file");
}

#[derive(Debug, Default)]
struct SystemState {
    formulae: BTreeSet<String>,
    casks: BTreeSet<String>,
    extensions: BTreeSet<String>,
    installs: Vec<String>,
}

/// In-memory brew and VS Code CLI.
///
/// Installs add the identifier to the matching listing (formulae by their
/// short name, like brew). Identifiers in `broken` fail to install;
/// identifiers in `phantom` report success but never appear in a listing.
#[derive(Debug)]
pub struct FakeSystem {
    state: Mutex<SystemState>,
    broken: HashSet<String>,
    phantom: HashSet<String>,
    has_brew: bool,
    has_code: bool,
}

impl FakeSystem {
    /// A machine with brew and `code` on `PATH` and nothing installed.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SystemState::default()),
            broken: HashSet::new(),
            phantom: HashSet::new(),
            has_brew: true,
            has_code: true,
        }
    }

    /// Make installs of `id` fail.
    pub fn broken(mut self, id: &str) -> Self {
        self.broken.insert(id.to_string());
        self
    }

    /// Make installs of `id` succeed without it ever being listed.
    pub fn phantom(mut self, id: &str) -> Self {
        self.phantom.insert(id.to_string());
        self
    }

    /// Remove the editor CLI from `PATH`.
    pub fn without_code(mut self) -> Self {
        self.has_code = false;
        self
    }

    /// Pre-install formulae.
    pub fn with_formulae(self, ids: &[&str]) -> Self {
        self.state
            .lock()
            .expect("lock")
            .formulae
            .extend(ids.iter().map(|s| (*s).to_string()));
        self
    }

    /// Every `install` invocation, as `"<kind> <id>"`.
    pub fn installs(&self) -> Vec<String> {
        self.state.lock().expect("lock").installs.clone()
    }

    fn ok(stdout: String) -> ExecResult {
        ExecResult {
            stdout,
            stderr: String::new(),
            success: true,
            code: Some(0),
        }
    }

    fn failed(stderr: String) -> ExecResult {
        ExecResult {
            stdout: String::new(),
            stderr,
            success: false,
            code: Some(1),
        }
    }

    fn install(&self, kind: &str, id: &str) -> ExecResult {
        let mut state = self.state.lock().expect("lock");
        state.installs.push(format!("{kind} {id}"));
        if self.broken.contains(id) {
            return Self::failed(format!("Error: No available {kind} with the name \"{id}\""));
        }
        if !self.phantom.contains(id) {
            match kind {
                "formula" => state.formulae.insert(listed_name(id).to_string()),
                "cask" => state.casks.insert(id.to_string()),
                _ => state.extensions.insert(id.to_string()),
            };
        }
        Self::ok(String::new())
    }

    fn listing(set: &BTreeSet<String>) -> ExecResult {
        Self::ok(set.iter().map(|s| format!("{s}\n")).collect())
    }
}

impl Executor for FakeSystem {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let result = self.run_unchecked(program, args)?;
        if !result.success {
            anyhow::bail!("{program} failed: {}", result.stderr);
        }
        Ok(result)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let result = match (program, args) {
            ("brew", ["list", "--formula", "-1"]) => {
                Self::listing(&self.state.lock().expect("lock").formulae)
            }
            ("brew", ["list", "--cask", "-1"]) => {
                Self::listing(&self.state.lock().expect("lock").casks)
            }
            ("brew", ["install", "--formula", id]) => self.install("formula", id),
            ("brew", ["install", "--cask", id]) => self.install("cask", id),
            ("code", ["--list-extensions"]) => {
                Self::listing(&self.state.lock().expect("lock").extensions)
            }
            ("code", ["--install-extension", id, "--force"]) => self.install("extension", id),
            _ => Self::failed(format!("{program}: command not found")),
        };
        Ok(result)
    }

    fn which(&self, program: &str) -> bool {
        match program {
            "brew" => self.has_brew,
            "code" => self.has_code,
            _ => false,
        }
    }
}

/// A [`Log`] that keeps every message and task entry in memory.
#[derive(Debug, Default)]
pub struct CollectingLog {
    lines: Mutex<Vec<(&'static str, String)>>,
    tasks: Mutex<Vec<TaskEntry>>,
}

impl CollectingLog {
    fn push(&self, level: &'static str, msg: &str) {
        self.lines
            .lock()
            .expect("lock")
            .push((level, msg.to_string()));
    }

    /// Messages logged at `level`.
    pub fn messages(&self, level: &str) -> Vec<String> {
        self.lines
            .lock()
            .expect("lock")
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Status recorded for each task, in execution order.
    pub fn task_statuses(&self) -> Vec<(String, TaskStatus)> {
        self.tasks
            .lock()
            .expect("lock")
            .iter()
            .map(|t| (t.name.clone(), t.status))
            .collect()
    }
}

impl Log for CollectingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn success(&self, msg: &str) {
        self.push("success", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry_run", msg);
    }
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        self.tasks.lock().expect("lock").push(TaskEntry {
            name: name.to_string(),
            status,
            message: message.map(String::from),
        });
    }
}

/// Run every install task once against `system`.
pub fn run_install(
    config: Config,
    system: &Arc<FakeSystem>,
    dry_run: bool,
) -> (ReconcileResult, Arc<CollectingLog>) {
    let log = Arc::new(CollectingLog::default());
    let ctx = Context::new(
        Arc::new(config),
        Arc::clone(&log) as Arc<dyn Log>,
        Arc::clone(system) as Arc<dyn Executor>,
        dry_run,
    );
    for task in tasks::all_install_tasks() {
        tasks::execute(task.as_ref(), &ctx);
    }
    (ctx.take_results(), log)
}
