//! Installer adapters and idempotent resource primitives.
pub mod cask;
pub mod error;
pub mod fs;
pub mod package;
pub mod shell_block;
pub mod vscode_extension;

use std::collections::HashSet;

use anyhow::Result;

use crate::config::manifest::ItemKind;

/// Result of asking a package manager to install one identifier.
///
/// Determined solely by the manager's exit status. An "already installed"
/// response that exits zero is a success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallResult {
    /// The manager exited zero.
    Succeeded,
    /// The manager exited non-zero.
    Failed {
        /// Combined manager output.
        detail: String,
    },
}

/// One installer per [`ItemKind`]; chosen by manifest kind, never by
/// inspecting the identifier.
#[cfg_attr(test, mockall::automock)]
pub trait Installer: Send + Sync {
    /// The item kind this installer handles.
    fn kind(&self) -> ItemKind;

    /// External program this installer drives (e.g. `brew`).
    fn program(&self) -> String;

    /// Install `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the manager cannot be spawned at all.
    fn install(&self, id: &str) -> Result<InstallResult>;

    /// Every identifier the manager currently reports as installed.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing command cannot be run or fails.
    fn list_installed(&self) -> Result<HashSet<String>>;

    /// Whether `id` appears in the installed listing (exact match).
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be obtained.
    fn is_installed(&self, id: &str) -> Result<bool> {
        Ok(self.list_installed()?.contains(id))
    }
}

/// Minimal interface for resources that can be described and applied.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Bring the resource to its desired state.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failures or permission problems.
    fn apply(&self) -> Result<ResourceChange>;
}

/// State of a file-backed resource.
///
/// # Examples
///
/// ```
/// use provision_cli::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let wrong = ResourceState::Incorrect { current: "old body".into() };
///
/// assert_ne!(missing, ResourceState::Correct);
/// assert_ne!(wrong, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// The current value of the resource.
        current: String,
    },
    /// Resource cannot be applied (e.g. the target is a directory).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct.
    AlreadyCorrect,
    /// Resource was skipped.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// Resources that can determine their own state before applying.
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;

    /// Whether [`apply`](Applicable::apply) would change anything.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`current_state`](Self::current_state).
    fn needs_change(&self) -> Result<bool> {
        Ok(matches!(
            self.current_state()?,
            ResourceState::Missing | ResourceState::Incorrect { .. }
        ))
    }
}
