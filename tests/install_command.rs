#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `install` command.
//!
//! These tests run the full install task list against an in-memory brew and
//! editor CLI and check the run-level properties: idempotence, failure
//! isolation, the install/verify distinction, dry runs, and shell blocks.

mod common;

use std::sync::Arc;

use chrono::Local;
use common::{FakeSystem, TestRoot, run_install};
use provision_cli::config::manifest::ItemKind;
use provision_cli::logging::TaskStatus;
use provision_cli::platform::{EnvironmentSnapshot, Os};
use provision_cli::reconcile::{OutcomeStatus, REASON_DRY_RUN};
use provision_cli::report::RunReport;
use provision_cli::tasks;

fn statuses(result: &provision_cli::reconcile::ReconcileResult) -> Vec<(String, OutcomeStatus)> {
    result
        .outcomes
        .iter()
        .map(|o| (o.item.id.clone(), o.status))
        .collect()
}

// ---------------------------------------------------------------------------
// Snapshot: full install task list
// ---------------------------------------------------------------------------

/// Any addition, removal, or rename of an install task fails this test.
#[test]
fn install_task_names() {
    let all_tasks = tasks::all_install_tasks();
    let task_names: Vec<&str> = all_tasks.iter().map(|t| t.name()).collect();
    insta::assert_snapshot!(task_names.join("\n"), @r"
    Install packages
    Install applications
    Install editor extensions
    Configure shell
    ");
}

// ---------------------------------------------------------------------------
// Run-level properties
// ---------------------------------------------------------------------------

#[test]
fn fresh_machine_installs_every_item() {
    let root = TestRoot::with_base_manifests(
        "git   # vcs\n\n# just a comment\ngh\n",
        "firefox\n",
        "rust-lang.rust-analyzer\n",
    );
    let system = Arc::new(FakeSystem::new());

    let (result, log) = run_install(root.load(false), &system, false);

    assert_eq!(
        statuses(&result),
        [
            ("git".to_string(), OutcomeStatus::Installed),
            ("gh".to_string(), OutcomeStatus::Installed),
            ("firefox".to_string(), OutcomeStatus::Installed),
            ("rust-lang.rust-analyzer".to_string(), OutcomeStatus::Installed),
        ]
    );
    assert!(result.skipped.is_empty());
    assert_eq!(log.messages("success").len(), 4);
}

#[test]
fn second_run_is_idempotent() {
    let root = TestRoot::with_base_manifests("git\njq\n", "firefox\n", "github.copilot\n");
    let system = Arc::new(FakeSystem::new());

    run_install(root.load(false), &system, false);
    let installs_after_first = system.installs().len();
    let (second, _) = run_install(root.load(false), &system, false);

    assert_eq!(installs_after_first, 4);
    assert_eq!(system.installs().len(), installs_after_first);
    assert!(
        second
            .outcomes
            .iter()
            .all(|o| o.status == OutcomeStatus::AlreadyPresent)
    );
    assert_eq!(second.outcomes.len(), 4);
}

#[test]
fn one_failure_does_not_abort_the_batch() {
    let root = TestRoot::with_base_manifests("git\nnot-a-formula\njq\n", "", "");
    let system = Arc::new(FakeSystem::new().broken("not-a-formula"));

    let (result, log) = run_install(root.load(false), &system, false);

    assert_eq!(result.outcomes.len(), 3);
    assert_eq!(
        statuses(&result),
        [
            ("git".to_string(), OutcomeStatus::Installed),
            ("not-a-formula".to_string(), OutcomeStatus::InstallFailed),
            ("jq".to_string(), OutcomeStatus::Installed),
        ]
    );
    assert!(
        log.task_statuses()
            .contains(&("Install packages".to_string(), TaskStatus::Partial))
    );
}

#[test]
fn install_success_without_listing_is_a_verify_failure() {
    let root = TestRoot::with_base_manifests("", "ghost-app\n", "");
    let system = Arc::new(FakeSystem::new().phantom("ghost-app"));

    let (result, _) = run_install(root.load(false), &system, false);

    assert_eq!(
        statuses(&result),
        [("ghost-app".to_string(), OutcomeStatus::VerifyFailed)]
    );
}

#[test]
fn tap_qualified_formula_matches_short_name() {
    let root = TestRoot::with_base_manifests("hashicorp/tap/terraform\n", "", "");
    let system = Arc::new(FakeSystem::new().with_formulae(&["terraform"]));

    let (result, _) = run_install(root.load(false), &system, false);

    assert_eq!(result.outcomes[0].status, OutcomeStatus::AlreadyPresent);
    assert!(system.installs().is_empty());
}

#[test]
fn dry_run_installs_nothing_and_reports_skips() {
    let root = TestRoot::with_base_manifests("git\njq\n", "", "");
    let system = Arc::new(FakeSystem::new().with_formulae(&["git"]));

    let (result, log) = run_install(root.load(false), &system, true);

    assert!(system.installs().is_empty());
    assert_eq!(
        statuses(&result),
        [("git".to_string(), OutcomeStatus::AlreadyPresent)]
    );
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].reason, REASON_DRY_RUN);
    assert_eq!(log.messages("dry_run"), ["would install package jq"]);
}

#[test]
fn missing_editor_cli_skips_extensions_only() {
    let root = TestRoot::with_base_manifests("git\n", "", "github.copilot\nms-python.python\n");
    let system = Arc::new(FakeSystem::new().without_code());

    let (result, log) = run_install(root.load(false), &system, false);

    assert_eq!(result.outcomes.len(), 1);
    assert_eq!(result.skipped.len(), 2);
    assert!(result.skipped.iter().all(|s| s.kind == ItemKind::Extension));
    assert!(log.task_statuses().contains(&(
        "Install editor extensions".to_string(),
        TaskStatus::Skipped
    )));
}

#[test]
fn shell_block_applied_once_across_runs() {
    let root = TestRoot::with_base_manifests("", "", "")
        .settings(
            r#"
[[shell_blocks]]
target = "~/.zprofile"
tag = "homebrew"
content = 'eval "$(/opt/homebrew/bin/brew shellenv)"'
"#,
        )
        .home_file(".zprofile", "export EDITOR=vim\n");
    let system = Arc::new(FakeSystem::new());

    run_install(root.load(false), &system, false);
    run_install(root.load(false), &system, false);

    let text = std::fs::read_to_string(root.home().join(".zprofile")).unwrap();
    assert!(text.starts_with("export EDITOR=vim\n"));
    assert_eq!(text.matches("# >>> provision:homebrew >>>").count(), 1);
    assert_eq!(text.matches("brew shellenv").count(), 1);
}

#[test]
fn report_counts_match_the_run() {
    let root = TestRoot::with_base_manifests("git\nbad\n", "firefox\n", "");
    let system = Arc::new(FakeSystem::new().broken("bad").with_formulae(&["git"]));
    let started_at = Local::now();

    let (result, _) = run_install(root.load(false), &system, false);
    let environment = EnvironmentSnapshot::collect(&*system, Os::MacOs, None, &[]);
    let report = RunReport::render(started_at, Local::now(), result, environment);

    let packages = report.counts(ItemKind::Package);
    assert_eq!(packages.already_present, 1);
    assert_eq!(packages.failed, 1);
    assert_eq!(report.counts(ItemKind::Application).installed, 1);
    let failed: Vec<&str> = report.failures().map(|f| f.item.id.as_str()).collect();
    assert_eq!(failed, ["bad"]);
}
