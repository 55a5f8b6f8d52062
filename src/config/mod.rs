//! Configuration: `provision.toml` settings plus the manifests they point to.
pub mod manifest;
pub mod settings;

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ProvisionError};
use manifest::{ItemKind, Manifest};
use settings::{RuntimeProbe, SETTINGS_FILE, Settings};

/// Environment variable naming the provisioning root.
pub const ENV_ROOT: &str = "PROVISION_ROOT";

/// A shell block with its target path resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellBlockEntry {
    /// File the block belongs in.
    pub target: PathBuf,
    /// Unique tag used in the block markers.
    pub tag: String,
    /// Block body, without markers.
    pub content: String,
}

/// All loaded configuration for one run.
#[derive(Debug)]
pub struct Config {
    /// Provisioning root (holds `provision.toml` and `manifests/`).
    pub root: PathBuf,
    /// User home directory used for `~` expansion.
    pub home: PathBuf,
    /// Whether the `--full` manifests were loaded.
    pub full: bool,
    /// Directory for run logs, summaries, and reports.
    pub state_dir: PathBuf,
    /// Directory receiving one timestamped backup sub-directory per run.
    pub backup_dir: PathBuf,
    /// Candidate configuration files for the backup guard.
    pub backup_candidates: Vec<PathBuf>,
    /// Explicit editor CLI, if configured.
    pub code_command: Option<String>,
    /// Loaded manifests in processing order (base before full, per kind).
    pub manifests: Vec<Manifest>,
    /// Runtime version probes for the environment snapshot.
    pub runtimes: Vec<RuntimeProbe>,
    /// Shell blocks to ensure, in order.
    pub shell_blocks: Vec<ShellBlockEntry>,
}

impl Config {
    /// Load settings and every enabled manifest under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file is invalid or any enabled
    /// manifest is missing or unreadable. Both are fatal pre-flight errors.
    pub fn load(root: &Path, home: &Path, full: bool) -> Result<Self, ProvisionError> {
        let settings = Settings::load(&root.join(SETTINGS_FILE))?;
        Self::from_settings(root, home, full, settings)
    }

    /// Build the configuration from already-parsed settings.
    ///
    /// # Errors
    ///
    /// Returns an error if any enabled manifest is missing or unreadable.
    pub fn from_settings(
        root: &Path,
        home: &Path,
        full: bool,
        settings: Settings,
    ) -> Result<Self, ProvisionError> {
        let paths = &settings.manifests;
        let mut sources = vec![
            (ItemKind::Package, paths.packages.as_str()),
            (ItemKind::Application, paths.applications.as_str()),
            (ItemKind::Extension, paths.extensions.as_str()),
        ];
        if full {
            sources.extend([
                (ItemKind::Package, paths.full.packages.as_str()),
                (ItemKind::Application, paths.full.applications.as_str()),
                (ItemKind::Extension, paths.full.extensions.as_str()),
            ]);
        }
        // Stable sort keeps base before full within each kind.
        sources.sort_by_key(|(kind, _)| *kind);

        let mut manifests = Vec::new();
        for (kind, raw) in sources {
            if raw.trim().is_empty() {
                continue;
            }
            manifests.push(Manifest::load(kind, &expand_path(raw, root, home))?);
        }

        let (state_dir, backup_dir) = state_dirs(&settings, root, home);
        let backup_candidates = settings
            .backup
            .files
            .iter()
            .map(|f| expand_path(f, home, home))
            .collect();
        let shell_blocks = settings
            .shell_blocks
            .iter()
            .map(|b| ShellBlockEntry {
                target: expand_path(&b.target, home, home),
                tag: b.tag.clone(),
                content: b.content.clone(),
            })
            .collect();

        Ok(Self {
            root: root.to_path_buf(),
            home: home.to_path_buf(),
            full,
            state_dir,
            backup_dir,
            backup_candidates,
            code_command: settings.code_command,
            manifests,
            runtimes: settings.runtimes,
            shell_blocks,
        })
    }

    /// Manifests of `kind`, in processing order.
    pub fn manifests_of(&self, kind: ItemKind) -> impl Iterator<Item = &Manifest> {
        self.manifests.iter().filter(move |m| m.kind == kind)
    }

    /// Total number of items of `kind` across its manifests.
    #[must_use]
    pub fn item_count(&self, kind: ItemKind) -> usize {
        self.manifests_of(kind).map(|m| m.items.len()).sum()
    }

    /// Directory holding run logs, summaries, and JSON reports.
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.state_dir.join(LOGS_DIR)
    }
}

/// Sub-directory of the state directory holding per-run artifacts.
pub const LOGS_DIR: &str = "logs";

/// The state directory and backup directory named by `settings`, expanded.
///
/// Needs no manifest, so the run log can be opened before manifests load.
#[must_use]
pub fn state_dirs(settings: &Settings, root: &Path, home: &Path) -> (PathBuf, PathBuf) {
    let state_dir = expand_path(&settings.state_dir, root, home);
    let backup_dir = settings.backup.dir.as_deref().map_or_else(
        || state_dir.join("backups"),
        |dir| expand_path(dir, root, home),
    );
    (state_dir, backup_dir)
}

/// Expand a leading `~` to `home`; resolve other relative paths against `base`.
///
/// # Examples
///
/// ```
/// use provision_cli::config::expand_path;
/// use std::path::Path;
///
/// let home = Path::new("/home/me");
/// let root = Path::new("/srv/setup");
/// assert_eq!(expand_path("~/.zshrc", root, home), home.join(".zshrc"));
/// assert_eq!(expand_path("manifests/a.txt", root, home), root.join("manifests/a.txt"));
/// assert_eq!(expand_path("/etc/hosts", root, home), Path::new("/etc/hosts"));
/// ```
#[must_use]
pub fn expand_path(raw: &str, base: &Path, home: &Path) -> PathBuf {
    let raw = raw.trim();
    if raw == "~" {
        return home.to_path_buf();
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        return home.join(rest);
    }
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Return the user's home directory from `HOME` (or `USERPROFILE`).
///
/// # Errors
///
/// Returns [`ConfigError::HomeNotSet`] if neither variable is set.
pub fn home_dir() -> Result<PathBuf, ConfigError> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .map_err(|_| ConfigError::HomeNotSet)
}

/// Resolve the provisioning root from CLI arguments or auto-detection.
///
/// Order: `--root`, `PROVISION_ROOT`, then the current directory when it
/// contains `provision.toml` or `manifests/`.
///
/// # Errors
///
/// Returns [`ConfigError::RootNotFound`] if no candidate applies.
pub fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(root) = explicit {
        return Ok(canonical(root));
    }

    if let Ok(root) = std::env::var(ENV_ROOT) {
        return Ok(canonical(Path::new(&root)));
    }

    if let Ok(cwd) = std::env::current_dir()
        && (cwd.join(SETTINGS_FILE).exists() || cwd.join("manifests").is_dir())
    {
        return Ok(cwd);
    }

    Err(ConfigError::RootNotFound)
}

fn canonical(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
