//! Homebrew formula installer, plus the brew helpers shared with casks.
use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;

use super::error::ResourceError;
use super::{InstallResult, Installer};
use crate::config::manifest::ItemKind;
use crate::exec::Executor;

/// Homebrew executable name.
pub const BREW: &str = "brew";

/// Run a `brew list` style query and collect one name per output line.
///
/// # Errors
///
/// Returns an error if the command cannot be spawned, or
/// [`ResourceError::ListingFailed`] if it exits non-zero.
pub(super) fn brew_listing(executor: &dyn Executor, args: &[&str]) -> Result<HashSet<String>> {
    let result = executor.run_unchecked(BREW, args)?;
    if !result.success {
        return Err(ResourceError::ListingFailed {
            program: BREW.to_string(),
            args: args.join(" "),
            exit_code: result.code.unwrap_or(-1),
            detail: result.detail(),
        }
        .into());
    }
    Ok(result
        .stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// Run `brew install <flag> <id>` and map the exit status.
///
/// # Errors
///
/// Returns an error only if `brew` cannot be spawned.
pub(super) fn brew_install(executor: &dyn Executor, flag: &str, id: &str) -> Result<InstallResult> {
    let result = executor.run_unchecked(BREW, &["install", flag, id])?;
    if result.success {
        Ok(InstallResult::Succeeded)
    } else {
        Ok(InstallResult::Failed {
            detail: result.detail(),
        })
    }
}

/// The name brew lists for `id`.
///
/// Tap-qualified identifiers (`owner/tap/name`) are listed by their final
/// segment.
///
/// # Examples
///
/// ```
/// use provision_cli::resources::package::listed_name;
///
/// assert_eq!(listed_name("git"), "git");
/// assert_eq!(listed_name("hashicorp/tap/terraform"), "terraform");
/// ```
#[must_use]
pub fn listed_name(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

/// Installs command-line packages as Homebrew formulae.
#[derive(Debug, Clone)]
pub struct BrewFormula {
    executor: Arc<dyn Executor>,
}

impl BrewFormula {
    /// Create a formula installer running `brew` through `executor`.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }
}

impl Installer for BrewFormula {
    fn kind(&self) -> ItemKind {
        ItemKind::Package
    }

    fn program(&self) -> String {
        BREW.to_string()
    }

    fn install(&self, id: &str) -> Result<InstallResult> {
        brew_install(&*self.executor, "--formula", id)
    }

    fn list_installed(&self) -> Result<HashSet<String>> {
        brew_listing(&*self.executor, &["list", "--formula", "-1"])
    }

    fn is_installed(&self, id: &str) -> Result<bool> {
        Ok(self.list_installed()?.contains(listed_name(id)))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;

    fn formula(executor: MockExecutor) -> (BrewFormula, Arc<MockExecutor>) {
        let executor = Arc::new(executor);
        (BrewFormula::new(Arc::clone(&executor) as Arc<dyn Executor>), executor)
    }

    #[test]
    fn listing_uses_formula_flag_and_one_per_line() {
        let (brew, executor) = formula(MockExecutor::ok("git\njq\n\nripgrep\n"));
        let installed = brew.list_installed().unwrap();
        assert_eq!(installed.len(), 3);
        assert!(installed.contains("ripgrep"));
        assert_eq!(executor.calls(), ["brew list --formula -1"]);
    }

    #[test]
    fn is_installed_never_matches_substrings() {
        let (brew, _) = formula(MockExecutor::with_responses(vec![
            (true, "docker\ndocker-compose\n".to_string()),
            (true, "docker\ndocker-compose\n".to_string()),
        ]));
        assert!(brew.is_installed("docker").unwrap());
        assert!(!brew.is_installed("docker-c").unwrap());
    }

    #[test]
    fn tap_qualified_id_matches_final_segment() {
        let (brew, _) = formula(MockExecutor::ok("terraform\n"));
        assert!(brew.is_installed("hashicorp/tap/terraform").unwrap());
    }

    #[test]
    fn listing_failure_is_error() {
        let (brew, _) = formula(MockExecutor::fail());
        let err = brew.list_installed().unwrap_err();
        assert!(
            err.downcast_ref::<ResourceError>().is_some(),
            "expected ResourceError, got: {err}"
        );
    }

    #[test]
    fn install_success_from_exit_status() {
        let (brew, executor) = formula(MockExecutor::ok("Warning: git is already installed"));
        assert_eq!(brew.install("git").unwrap(), InstallResult::Succeeded);
        assert_eq!(executor.calls(), ["brew install --formula git"]);
    }

    #[test]
    fn install_failure_carries_detail() {
        let (brew, _) = formula(MockExecutor::with_responses(vec![(
            false,
            "Error: No available formula".to_string(),
        )]));
        assert_eq!(
            brew.install("nope").unwrap(),
            InstallResult::Failed {
                detail: "Error: No available formula".to_string()
            }
        );
    }

    #[test]
    fn kind_and_program() {
        let (brew, _) = formula(MockExecutor::fail());
        assert_eq!(brew.kind(), ItemKind::Package);
        assert_eq!(brew.program(), "brew");
    }
}
