//! The per-item install loop: pre-check, install, verify, record.
//!
//! One item's failure never aborts the batch. Every recorded event is
//! logged as it happens so an interrupted run leaves a usable log.
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::manifest::{ItemKind, ManifestItem};
use crate::logging::Log;
use crate::resources::{InstallResult, Installer};

/// Terminal state of one attempted item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Installed during this run and confirmed present.
    Installed,
    /// Already present before this run.
    AlreadyPresent,
    /// The installer reported failure or could not be run.
    InstallFailed,
    /// The installer reported success but the item is not listed.
    VerifyFailed,
}

impl OutcomeStatus {
    /// `Installed` and `AlreadyPresent` are successes.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Installed | Self::AlreadyPresent)
    }

    /// Failure class label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::AlreadyPresent => "already present",
            Self::InstallFailed => "install failed",
            Self::VerifyFailed => "verify failed",
        }
    }
}

/// The recorded result for one manifest item. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallOutcome {
    /// The manifest entry.
    pub item: ManifestItem,
    /// Its kind.
    pub kind: ItemKind,
    /// What happened.
    pub status: OutcomeStatus,
    /// Manager output or verification detail for failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// When the outcome was recorded.
    pub timestamp: DateTime<Local>,
}

/// An item deliberately not attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    /// The manifest entry.
    pub item: ManifestItem,
    /// Its kind.
    pub kind: ItemKind,
    /// Why it was not attempted.
    pub reason: String,
}

/// Reason recorded for items left over after an interrupt.
pub const REASON_INTERRUPTED: &str = "interrupted";
/// Reason recorded for missing items during a dry run.
pub const REASON_DRY_RUN: &str = "dry run: would install";

/// Result of the post-install check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The item is listed.
    Verified,
    /// The item is not listed, or the listing failed.
    NotVerified {
        /// Why verification failed.
        detail: String,
    },
}

/// Confirm `id` is present after an install the manager reported as
/// successful. A listing error counts as not verified.
pub fn verify(id: &str, installer: &dyn Installer) -> Verification {
    match installer.is_installed(id) {
        Ok(true) => Verification::Verified,
        Ok(false) => Verification::NotVerified {
            detail: format!("installer reported success but {id} is not listed"),
        },
        Err(e) => Verification::NotVerified {
            detail: format!("could not list installed items: {e:#}"),
        },
    }
}

/// Everything one reconcile pass produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileResult {
    /// One outcome per attempted item, in manifest order.
    pub outcomes: Vec<InstallOutcome>,
    /// Items not attempted, in manifest order.
    pub skipped: Vec<SkippedItem>,
}

impl ReconcileResult {
    /// Number of outcomes with `status`.
    #[must_use]
    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Outcomes that ended in failure.
    pub fn failures(&self) -> impl Iterator<Item = &InstallOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_success())
    }

    /// Record every item in `items` as skipped with `reason`.
    pub fn skip_all(&mut self, items: &[ManifestItem], kind: ItemKind, reason: &str) {
        self.skipped.extend(items.iter().map(|item| SkippedItem {
            item: item.clone(),
            kind,
            reason: reason.to_string(),
        }));
    }

    /// Append another result, keeping order.
    pub fn extend(&mut self, other: Self) {
        self.outcomes.extend(other.outcomes);
        self.skipped.extend(other.skipped);
    }
}

/// Reconcile `items` against the system through `installer`.
///
/// For each item in order: stop if `interrupted` is set, record
/// `AlreadyPresent` if listed, skip in dry-run, otherwise install and
/// verify. A pre-check listing error is treated as "not installed".
pub fn reconcile(
    items: &[ManifestItem],
    installer: &dyn Installer,
    log: &dyn Log,
    dry_run: bool,
    interrupted: &AtomicBool,
) -> ReconcileResult {
    let kind = installer.kind();
    let mut result = ReconcileResult::default();

    for (index, item) in items.iter().enumerate() {
        if interrupted.load(Ordering::SeqCst) {
            let rest = items.get(index..).unwrap_or_default();
            log.warn(&format!(
                "interrupted: skipping {} remaining {}",
                rest.len(),
                kind.plural()
            ));
            result.skip_all(rest, kind, REASON_INTERRUPTED);
            break;
        }

        let id = item.id.as_str();
        let present = installer.is_installed(id).unwrap_or_else(|e| {
            log.warn(&format!(
                "could not check {kind} {id}, assuming not installed: {e:#}"
            ));
            false
        });

        if present {
            log.debug(&format!("{kind} {id} already installed"));
            result.outcomes.push(outcome(item, kind, OutcomeStatus::AlreadyPresent, None));
            continue;
        }

        if dry_run {
            log.dry_run(&format!("would install {kind} {id}"));
            result.skip_all(std::slice::from_ref(item), kind, REASON_DRY_RUN);
            continue;
        }

        log.info(&format!("installing {kind} {id}"));
        let installed = match installer.install(id) {
            Ok(InstallResult::Succeeded) => None,
            Ok(InstallResult::Failed { detail }) => Some(detail),
            Err(e) => Some(format!("{e:#}")),
        };
        if let Some(detail) = installed {
            log.warn(&format!("failed to install {kind} {id}: {detail}"));
            result.outcomes.push(outcome(
                item,
                kind,
                OutcomeStatus::InstallFailed,
                Some(detail),
            ));
            continue;
        }

        match verify(id, installer) {
            Verification::Verified => {
                log.success(&format!("installed {kind} {id}"));
                result.outcomes.push(outcome(item, kind, OutcomeStatus::Installed, None));
            }
            Verification::NotVerified { detail } => {
                log.warn(&format!("{kind} {id} not verified: {detail}"));
                result.outcomes.push(outcome(
                    item,
                    kind,
                    OutcomeStatus::VerifyFailed,
                    Some(detail),
                ));
            }
        }
    }

    result
}

fn outcome(
    item: &ManifestItem,
    kind: ItemKind,
    status: OutcomeStatus,
    detail: Option<String>,
) -> InstallOutcome {
    InstallOutcome {
        item: item.clone(),
        kind,
        status,
        detail,
        timestamp: Local::now(),
    }
}
