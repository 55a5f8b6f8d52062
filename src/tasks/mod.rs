//! Named, ordered tasks that drive the install command.
mod context;
pub mod packages;
pub mod shell;
pub mod vscode_extensions;

pub use context::Context;

use anyhow::Result;

use crate::logging::TaskStatus;

/// Outcome of a task that ran without a hard error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Everything is in the desired state.
    Ok,
    /// The task did nothing, for the given reason.
    Skipped(String),
    /// Dry run: changes were reported but not made.
    DryRun,
    /// Some items failed; the rest succeeded.
    Partial(String),
}

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task has anything to do for the loaded configuration.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task cannot run at all. Per-item failures are
    /// reported through [`TaskResult::Partial`] instead.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// The tasks run by the install command, in execution order.
#[must_use]
pub fn all_install_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(packages::InstallPackages),
        Box::new(packages::InstallApplications),
        Box::new(vscode_extensions::InstallExtensions),
        Box::new(shell::ConfigureShell),
    ]
}

/// Execute a task, recording the result in the logger.
pub fn execute(task: &dyn Task, ctx: &Context) {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return;
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
        }
        Ok(TaskResult::Partial(summary)) => {
            ctx.log.warn(&format!("{}: {summary}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Partial, Some(&summary));
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}

/// Shared helpers for task unit tests.
#[cfg(test)]
pub mod test_helpers {
    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::config::Config;
    use crate::config::manifest::{ItemKind, Manifest, parse_str};
    use crate::exec::Executor;
    use crate::logging::RecordingLog;

    use super::Context;

    /// A [`Config`] with no manifests, runtimes, or shell blocks.
    #[must_use]
    pub fn empty_config(root: PathBuf) -> Config {
        Config {
            state_dir: root.join("state"),
            backup_dir: root.join("state/backups"),
            home: root.join("home"),
            root,
            full: false,
            backup_candidates: vec![],
            code_command: None,
            manifests: vec![],
            runtimes: vec![],
            shell_blocks: vec![],
        }
    }

    /// Add an in-memory manifest of `kind` to `config`.
    pub fn add_manifest(config: &mut Config, kind: ItemKind, content: &str) {
        config.manifests.push(Manifest {
            kind,
            path: PathBuf::from(format!("manifests/{}.txt", kind.plural())),
            items: parse_str(content),
        });
    }

    /// Build a [`Context`] with a [`RecordingLog`], returning the log for
    /// assertions.
    #[must_use]
    pub fn make_context(
        config: Config,
        executor: Arc<dyn Executor>,
        dry_run: bool,
    ) -> (Context, Arc<RecordingLog>) {
        let log = Arc::new(RecordingLog::default());
        let ctx = Context::new(
            Arc::new(config),
            Arc::clone(&log) as Arc<dyn crate::logging::Log>,
            executor,
            dry_run,
        );
        (ctx, log)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;
    use std::path::PathBuf;
    use std::sync::Arc;
    use test_helpers::{empty_config, make_context};

    struct MockTask {
        name: &'static str,
        should_run: bool,
        result: Result<TaskResult, String>,
    }

    impl Task for MockTask {
        fn name(&self) -> &str {
            self.name
        }
        fn should_run(&self, _ctx: &Context) -> bool {
            self.should_run
        }
        fn run(&self, _ctx: &Context) -> Result<TaskResult> {
            self.result.clone().map_err(|s| anyhow::anyhow!("{s}"))
        }
    }

    fn run_task(should_run: bool, result: Result<TaskResult, String>) -> Vec<TaskStatus> {
        let (ctx, log) = make_context(
            empty_config(PathBuf::from("/tmp")),
            Arc::new(MockExecutor::fail()),
            false,
        );
        execute(
            &MockTask {
                name: "task",
                should_run,
                result,
            },
            &ctx,
        );
        log.tasks().into_iter().map(|t| t.status).collect()
    }

    #[test]
    fn execute_records_not_applicable() {
        assert_eq!(run_task(false, Ok(TaskResult::Ok)), [TaskStatus::NotApplicable]);
    }

    #[test]
    fn execute_records_each_result() {
        assert_eq!(run_task(true, Ok(TaskResult::Ok)), [TaskStatus::Ok]);
        assert_eq!(
            run_task(true, Ok(TaskResult::Skipped("x".to_string()))),
            [TaskStatus::Skipped]
        );
        assert_eq!(run_task(true, Ok(TaskResult::DryRun)), [TaskStatus::DryRun]);
        assert_eq!(
            run_task(true, Ok(TaskResult::Partial("1 of 2 failed".to_string()))),
            [TaskStatus::Partial]
        );
        assert_eq!(run_task(true, Err("kaboom".to_string())), [TaskStatus::Failed]);
    }

    #[test]
    fn execute_logs_stage_and_error() {
        let (ctx, log) = make_context(
            empty_config(PathBuf::from("/tmp")),
            Arc::new(MockExecutor::fail()),
            false,
        );
        let task = MockTask {
            name: "Install packages",
            should_run: true,
            result: Err("kaboom".to_string()),
        };
        execute(&task, &ctx);
        assert_eq!(log.messages("stage"), ["Install packages"]);
        assert_eq!(log.messages("error"), ["Install packages: kaboom"]);
        assert_eq!(log.tasks()[0].message.as_deref(), Some("kaboom"));
    }

    #[test]
    fn install_tasks_in_order() {
        let names: Vec<String> = all_install_tasks()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(
            names,
            [
                "Install packages",
                "Install applications",
                "Install editor extensions",
                "Configure shell"
            ]
        );
    }
}
