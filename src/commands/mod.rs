//! Top-level subcommand orchestration.
pub mod backup;
pub mod install;
pub mod summary;
pub mod version;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Local};

use crate::cli::GlobalOpts;
use crate::config::manifest::ItemKind;
use crate::config::settings::{SETTINGS_FILE, Settings};
use crate::config::{self, Config};
use crate::exec::Executor;
use crate::logging::{self, Logger};
use crate::paths::RunPaths;
use crate::resources::Installer;
use crate::resources::cask::BrewCask;
use crate::resources::package::{BREW, BrewFormula};
use crate::resources::vscode_extension::{EditorExtension, find_code_command};

/// Shared state produced by the common command setup sequence.
///
/// Resolves the root, loads configuration, derives the run's artifact paths,
/// and installs the tracing subscriber writing the run log.
#[derive(Debug)]
pub struct CommandSetup {
    /// Loaded configuration.
    pub config: Arc<Config>,
    /// Artifact paths for this run.
    pub paths: RunPaths,
    /// Local start time shared by every artifact.
    pub started_at: DateTime<Local>,
    /// Logger bound to the run log.
    pub log: Arc<Logger>,
}

impl CommandSetup {
    /// Load configuration and start the run log.
    ///
    /// The run log is opened from the settings alone, before any manifest
    /// is read, so a manifest failure still ends up in it. An invalid
    /// settings file falls back to the default state directory. When the
    /// root or home cannot be resolved only the console subscriber is
    /// installed.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be determined, `HOME` is unset,
    /// the settings file is invalid, or an enabled manifest cannot be read.
    pub fn init(global: &GlobalOpts, verbose: bool) -> Result<Self> {
        let started_at = Local::now();
        let (root, home) = match locate(global) {
            Ok(located) => located,
            Err(e) => {
                logging::init_subscriber(verbose, None);
                return Err(e);
            }
        };

        let settings = Settings::load(&root.join(SETTINGS_FILE));
        let paths = match &settings {
            Ok(settings) => RunPaths::from_settings(settings, &root, &home, &started_at),
            Err(_) => RunPaths::from_settings(&Settings::default(), &root, &home, &started_at),
        };
        logging::init_subscriber(verbose, Some(&paths.log_file));
        let log = Arc::new(Logger::new(Some(&paths.log_file)));

        log.info(&format!("provision {}", logging::version()));
        log.debug(&format!("root: {}", root.display()));

        let settings = settings.context("loading configuration")?;
        let config = Config::from_settings(&root, &home, global.full, settings)
            .context("loading configuration")?;

        for manifest in &config.manifests {
            log.debug(&format!(
                "{} {} in {}",
                manifest.items.len(),
                manifest.kind.plural(),
                manifest.path.display()
            ));
        }
        log.info(&format!(
            "loaded {} packages, {} applications, {} extensions{}",
            config.item_count(ItemKind::Package),
            config.item_count(ItemKind::Application),
            config.item_count(ItemKind::Extension),
            if config.full { " (full)" } else { "" }
        ));

        Ok(Self {
            config: Arc::new(config),
            paths,
            started_at,
            log,
        })
    }
}

fn locate(global: &GlobalOpts) -> Result<(PathBuf, PathBuf)> {
    let root = config::resolve_root(global.root.as_deref())?;
    let home = config::home_dir()?;
    Ok((root, home))
}

/// Emit the final error line of a failed command.
///
/// Goes to the console and, when the command got as far as opening its run
/// log, to the run log as its last line.
pub fn log_fatal(verbose: bool, err: &anyhow::Error) {
    logging::init_subscriber(verbose, None);
    Logger::new(None).error(&format!("{err:#}"));
}

/// One installer per kind whose tool is available, for inventory listings.
#[must_use]
pub fn available_installers(
    config: &Config,
    executor: &Arc<dyn Executor>,
) -> Vec<Box<dyn Installer>> {
    let mut installers: Vec<Box<dyn Installer>> = Vec::new();
    if executor.which(BREW) {
        installers.push(Box::new(BrewFormula::new(Arc::clone(executor))));
        installers.push(Box::new(BrewCask::new(Arc::clone(executor))));
    }
    if let Some(code_cmd) = find_code_command(&**executor, config.code_command.as_deref()) {
        installers.push(Box::new(EditorExtension::new(code_cmd, Arc::clone(executor))));
    }
    installers
}
