#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the backup guard driven by loaded settings.

mod common;

use chrono::{Local, TimeZone};
use common::{CollectingLog, TestRoot};
use provision_cli::backup::backup;
use provision_cli::error::BackupError;
use provision_cli::paths::RunPaths;

fn root_with_candidates() -> TestRoot {
    TestRoot::with_base_manifests("", "", "")
        .settings(
            r#"
[backup]
files = ["~/.zshrc", "~/.gitconfig", "~/.config/nvim", "~/.vimrc"]
"#,
        )
        .home_file(".zshrc", "export PATH=$HOME/bin:$PATH\n")
        .home_file(".config/nvim/init.lua", "vim.o.number = true\n")
}

#[test]
fn existing_half_is_copied() {
    let root = root_with_candidates();
    let config = root.load(false);
    let started_at = Local.with_ymd_and_hms(2026, 10, 16, 8, 30, 0).unwrap();
    let paths = RunPaths::new(&config, &started_at);
    let log = CollectingLog::default();

    let set = backup(
        &config.backup_candidates,
        &paths.backup_root,
        &paths.stamp,
        &config.home,
        &log,
    )
    .unwrap();

    assert_eq!(set.directory, config.backup_dir.join("20261016-083000"));
    assert_eq!(set.entries.len(), 2);
    assert_eq!(
        std::fs::read_to_string(set.directory.join(".zshrc")).unwrap(),
        "export PATH=$HOME/bin:$PATH\n"
    );
    assert!(set.directory.join(".config/nvim/init.lua").is_file());
    assert!(!set.directory.join(".gitconfig").exists());
}

#[test]
fn uncreatable_directory_is_fatal() {
    let root = root_with_candidates();
    let config = root.load(false);
    // A regular file where the backup root should be.
    let blocker = root.home().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();
    let log = CollectingLog::default();

    let err = backup(
        &config.backup_candidates,
        &blocker,
        "20261016-083000",
        &config.home,
        &log,
    )
    .unwrap_err();
    assert!(matches!(err, BackupError::DirectoryUncreatable { .. }));
}
