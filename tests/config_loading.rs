#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for settings and manifest loading.

mod common;

use common::TestRoot;
use provision_cli::config::Config;
use provision_cli::config::manifest::ItemKind;
use provision_cli::error::{ConfigError, ManifestError, ProvisionError};

fn ids(config: &Config, kind: ItemKind) -> Vec<String> {
    config
        .manifests_of(kind)
        .flat_map(|m| m.items.iter().map(|i| i.id.clone()))
        .collect()
}

#[test]
fn comments_and_blank_lines_are_skipped() {
    let root = TestRoot::with_base_manifests("git   # vcs\n\n# just a comment\ngh\n", "", "");
    let config = root.load(false);
    assert_eq!(ids(&config, ItemKind::Package), ["git", "gh"]);
    let git = &config.manifests_of(ItemKind::Package).next().unwrap().items[0];
    assert_eq!(git.comment.as_deref(), Some("vcs"));
}

#[test]
fn duplicates_are_kept_in_order() {
    let root = TestRoot::with_base_manifests("jq\ngit\njq\n", "", "");
    assert_eq!(ids(&root.load(false), ItemKind::Package), ["jq", "git", "jq"]);
}

#[test]
fn full_manifests_follow_base_manifests() {
    let root = TestRoot::with_base_manifests("git\n", "firefox\n", "")
        .manifest("packages-full.txt", "ffmpeg\n")
        .manifest("applications-full.txt", "blender\n");

    let base = root.load(false);
    assert_eq!(ids(&base, ItemKind::Package), ["git"]);

    let full = root.load(true);
    assert!(full.full);
    assert_eq!(ids(&full, ItemKind::Package), ["git", "ffmpeg"]);
    assert_eq!(ids(&full, ItemKind::Application), ["firefox", "blender"]);
}

#[test]
fn missing_manifest_is_a_fatal_manifest_error() {
    let root = TestRoot::new().manifest("packages.txt", "git\n");
    let err = Config::load(&root.root(), &root.home(), false).unwrap_err();
    assert!(matches!(
        err,
        ProvisionError::Manifest(ManifestError::NotFound { ref path })
            if path.ends_with("manifests/applications.txt")
    ));
}

#[test]
fn missing_full_manifest_is_only_fatal_with_full() {
    let root = TestRoot::with_base_manifests("git\n", "", "");
    assert!(Config::load(&root.root(), &root.home(), false).is_ok());
    assert!(matches!(
        Config::load(&root.root(), &root.home(), true),
        Err(ProvisionError::Manifest(ManifestError::NotFound { .. }))
    ));
}

#[test]
fn empty_path_disables_a_kind() {
    let root = TestRoot::new()
        .manifest("packages.txt", "git\n")
        .settings("[manifests]\napplications = \"\"\nextensions = \"\"\n");
    let config = root.load(false);
    assert_eq!(config.manifests.len(), 1);
    assert_eq!(config.item_count(ItemKind::Application), 0);
}

#[test]
fn unknown_settings_key_is_rejected() {
    let root = TestRoot::with_base_manifests("", "", "").settings("colour = \"always\"\n");
    let err = Config::load(&root.root(), &root.home(), false).unwrap_err();
    assert!(matches!(err, ProvisionError::Config(ConfigError::Parse { .. })));
}

#[test]
fn settings_paths_expand_home() {
    let root = TestRoot::with_base_manifests("", "", "").settings(
        r#"
state_dir = "~/state"
code_command = "code-insiders"

[backup]
files = ["~/.zshrc", "/etc/hosts"]
"#,
    );
    let config = root.load(false);
    assert_eq!(config.state_dir, root.home().join("state"));
    assert_eq!(config.backup_dir, root.home().join("state/backups"));
    assert_eq!(config.code_command.as_deref(), Some("code-insiders"));
    assert_eq!(
        config.backup_candidates,
        [root.home().join(".zshrc"), std::path::PathBuf::from("/etc/hosts")]
    );
}
