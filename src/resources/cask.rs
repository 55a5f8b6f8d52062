//! Homebrew cask installer for GUI applications.
use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;

use super::package::{BREW, brew_install, brew_listing, listed_name};
use super::{InstallResult, Installer};
use crate::config::manifest::ItemKind;
use crate::exec::Executor;

/// Installs applications as Homebrew casks.
#[derive(Debug, Clone)]
pub struct BrewCask {
    executor: Arc<dyn Executor>,
}

impl BrewCask {
    /// Create a cask installer running `brew` through `executor`.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }
}

impl Installer for BrewCask {
    fn kind(&self) -> ItemKind {
        ItemKind::Application
    }

    fn program(&self) -> String {
        BREW.to_string()
    }

    fn install(&self, id: &str) -> Result<InstallResult> {
        brew_install(&*self.executor, "--cask", id)
    }

    fn list_installed(&self) -> Result<HashSet<String>> {
        brew_listing(&*self.executor, &["list", "--cask", "-1"])
    }

    fn is_installed(&self, id: &str) -> Result<bool> {
        Ok(self.list_installed()?.contains(listed_name(id)))
    }
}
