//! `provision.toml` settings with defaults for every field.
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// File name of the settings file inside the provisioning root.
pub const SETTINGS_FILE: &str = "provision.toml";

/// Top-level settings.
///
/// Every field has a default so an absent or empty `provision.toml` yields a
/// working configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory for run logs, summaries, and backups (`~` expanded).
    pub state_dir: String,
    /// Editor CLI to use; when unset, `code-insiders` then `code` on `PATH`.
    pub code_command: Option<String>,
    /// Manifest file locations, relative to the root.
    pub manifests: ManifestPaths,
    /// Backup guard settings.
    pub backup: BackupSettings,
    /// Runtime version probes recorded in the environment snapshot.
    pub runtimes: Vec<RuntimeProbe>,
    /// Tagged text blocks ensured in shell configuration files.
    pub shell_blocks: Vec<ShellBlock>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            state_dir: "~/.provision".to_string(),
            code_command: None,
            manifests: ManifestPaths::default(),
            backup: BackupSettings::default(),
            runtimes: default_runtimes(),
            shell_blocks: Vec::new(),
        }
    }
}

/// Manifest paths, relative to the root. An empty string disables that kind.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestPaths {
    /// Homebrew formulae.
    pub packages: String,
    /// Homebrew casks.
    pub applications: String,
    /// Editor extensions.
    pub extensions: String,
    /// Heavier manifests loaded only with `--full`.
    pub full: FullManifestPaths,
}

impl Default for ManifestPaths {
    fn default() -> Self {
        Self {
            packages: "manifests/packages.txt".to_string(),
            applications: "manifests/applications.txt".to_string(),
            extensions: "manifests/extensions.txt".to_string(),
            full: FullManifestPaths::default(),
        }
    }
}

/// Optional manifests enabled by `--full`. An empty string disables that kind.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FullManifestPaths {
    /// Additional Homebrew formulae.
    pub packages: String,
    /// Additional Homebrew casks.
    pub applications: String,
    /// Additional editor extensions.
    pub extensions: String,
}

impl Default for FullManifestPaths {
    fn default() -> Self {
        Self {
            packages: "manifests/packages-full.txt".to_string(),
            applications: "manifests/applications-full.txt".to_string(),
            extensions: String::new(),
        }
    }
}

/// Backup guard configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BackupSettings {
    /// Directory that receives one timestamped sub-directory per run.
    /// Defaults to `<state_dir>/backups`.
    pub dir: Option<String>,
    /// Candidate files and directories to copy if they exist.
    pub files: Vec<String>,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            dir: None,
            files: [
                "~/.zshrc",
                "~/.zprofile",
                "~/.bashrc",
                "~/.bash_profile",
                "~/.gitconfig",
                "~/.vimrc",
                "~/.ssh/config",
                "~/.config/starship.toml",
                "~/Library/Application Support/Code/User/settings.json",
                "~/Library/Application Support/Code/User/keybindings.json",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// A command whose first output line is recorded as a runtime version.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RuntimeProbe {
    /// Display name (e.g. `"node"`).
    pub name: String,
    /// Program followed by its arguments.
    pub command: Vec<String>,
}

fn default_runtimes() -> Vec<RuntimeProbe> {
    let probes: [(&str, &[&str]); 6] = [
        ("git", &["git", "--version"]),
        ("node", &["node", "--version"]),
        ("python3", &["python3", "--version"]),
        ("ruby", &["ruby", "--version"]),
        ("go", &["go", "version"]),
        ("rustc", &["rustc", "--version"]),
    ];
    probes
        .into_iter()
        .map(|(name, command)| RuntimeProbe {
            name: name.to_string(),
            command: command.iter().map(|s| (*s).to_string()).collect(),
        })
        .collect()
}

/// A tagged block of text that must be present in a configuration file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ShellBlock {
    /// File the block belongs in (`~` expanded).
    pub target: String,
    /// Unique tag used in the block markers.
    pub tag: String,
    /// Block body, without markers.
    pub content: String,
}

impl Settings {
    /// Load settings from `path`, returning defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid settings TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
