//! VS Code extension installer.
use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;

use super::error::ResourceError;
use super::{InstallResult, Installer};
use crate::config::manifest::ItemKind;
use crate::exec::Executor;

/// Installs editor extensions through the VS Code CLI.
///
/// Extension identifiers are case-insensitive, so listings are lower-cased
/// and lookups compare lower-cased ids.
#[derive(Debug, Clone)]
pub struct EditorExtension {
    code_cmd: String,
    executor: Arc<dyn Executor>,
}

impl EditorExtension {
    /// Create an installer driving `code_cmd` (e.g. `code` or `code-insiders`).
    #[must_use]
    pub fn new(code_cmd: String, executor: Arc<dyn Executor>) -> Self {
        Self { code_cmd, executor }
    }
}

impl Installer for EditorExtension {
    fn kind(&self) -> ItemKind {
        ItemKind::Extension
    }

    fn program(&self) -> String {
        self.code_cmd.clone()
    }

    fn install(&self, id: &str) -> Result<InstallResult> {
        let result = self
            .executor
            .run_unchecked(&self.code_cmd, &["--install-extension", id, "--force"])?;
        if result.success {
            Ok(InstallResult::Succeeded)
        } else {
            Ok(InstallResult::Failed {
                detail: result.detail(),
            })
        }
    }

    fn list_installed(&self) -> Result<HashSet<String>> {
        let args = ["--list-extensions"];
        let result = self.executor.run_unchecked(&self.code_cmd, &args)?;
        if !result.success {
            return Err(ResourceError::ListingFailed {
                program: self.code_cmd.clone(),
                args: args.join(" "),
                exit_code: result.code.unwrap_or(-1),
                detail: result.detail(),
            }
            .into());
        }
        Ok(result
            .stdout
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|id| !id.is_empty())
            .collect())
    }

    fn is_installed(&self, id: &str) -> Result<bool> {
        Ok(self.list_installed()?.contains(&id.to_lowercase()))
    }
}

/// Find the VS Code CLI.
///
/// A configured command wins when it is on `PATH`; otherwise
/// `code-insiders` is preferred over `code`.
#[must_use]
pub fn find_code_command(executor: &dyn Executor, configured: Option<&str>) -> Option<String> {
    if let Some(cmd) = configured {
        return executor.which(cmd).then(|| cmd.to_string());
    }
    ["code-insiders", "code"]
        .into_iter()
        .find(|cmd| executor.which(cmd))
        .map(String::from)
}
