//! End-of-run report: per-kind counts, failures, persistence.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::manifest::ItemKind;
use crate::logging::Log;
use crate::paths::stamp;
use crate::platform::EnvironmentSnapshot;
use crate::reconcile::{InstallOutcome, OutcomeStatus, ReconcileResult, SkippedItem};
use crate::resources::Installer;

/// Counts for one item kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    /// Installed during this run.
    pub installed: usize,
    /// Present before this run.
    pub already_present: usize,
    /// Install or verify failures.
    pub failed: usize,
    /// Not attempted.
    pub skipped: usize,
}

impl KindCounts {
    /// Items that appeared in manifests of this kind.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.installed + self.already_present + self.failed + self.skipped
    }
}

/// The immutable record of one run, built once at the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// When the run started.
    pub started_at: DateTime<Local>,
    /// When the run finished.
    pub finished_at: DateTime<Local>,
    /// Wall-clock duration.
    pub duration: Duration,
    /// Every attempted item.
    pub outcomes: Vec<InstallOutcome>,
    /// Every item not attempted.
    pub skipped: Vec<SkippedItem>,
    /// Host versions at run time.
    pub environment: EnvironmentSnapshot,
}

impl RunReport {
    /// Assemble the report. Pure: no I/O and no clock reads.
    #[must_use]
    pub fn render(
        started_at: DateTime<Local>,
        finished_at: DateTime<Local>,
        result: ReconcileResult,
        environment: EnvironmentSnapshot,
    ) -> Self {
        Self {
            started_at,
            finished_at,
            duration: (finished_at - started_at).to_std().unwrap_or_default(),
            outcomes: result.outcomes,
            skipped: result.skipped,
            environment,
        }
    }

    /// Counts for `kind`.
    #[must_use]
    pub fn counts(&self, kind: ItemKind) -> KindCounts {
        let mut counts = KindCounts::default();
        for outcome in self.outcomes.iter().filter(|o| o.kind == kind) {
            match outcome.status {
                OutcomeStatus::Installed => counts.installed += 1,
                OutcomeStatus::AlreadyPresent => counts.already_present += 1,
                OutcomeStatus::InstallFailed | OutcomeStatus::VerifyFailed => counts.failed += 1,
            }
        }
        counts.skipped = self.skipped.iter().filter(|s| s.kind == kind).count();
        counts
    }

    /// Counts for every kind that appeared in the run.
    #[must_use]
    pub fn counts_by_kind(&self) -> BTreeMap<ItemKind, KindCounts> {
        ItemKind::ALL
            .into_iter()
            .map(|kind| (kind, self.counts(kind)))
            .filter(|(_, counts)| counts.total() > 0)
            .collect()
    }

    /// Failed outcomes, in run order.
    pub fn failures(&self) -> impl Iterator<Item = &InstallOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_success())
    }

    /// Whether any item failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Log the per-kind counts and every failure.
    ///
    /// Item failures are warnings; error level is kept for fatal aborts.
    pub fn log_summary(&self, log: &dyn Log) {
        log.stage("Summary");
        let counts = self.counts_by_kind();
        if counts.is_empty() {
            log.info("no manifest items processed");
        }
        for (kind, c) in &counts {
            log.info(&format!("{}: {}", kind.plural(), counts_line(c)));
        }
        for failure in self.failures() {
            log.warn(&format!(
                "{} {}: {}",
                failure.kind,
                failure.item.id,
                failure.status.label()
            ));
        }
        if !self.skipped.is_empty() {
            log.info(&format!("{} items not attempted", self.skipped.len()));
        }
    }

    /// The human-readable summary persisted next to the run log.
    #[must_use]
    pub fn summary_text(&self, inventory: &Inventory) -> String {
        let mut lines = vec![
            "provision run summary".to_string(),
            format!("started:  {}", self.started_at.format("%Y-%m-%dT%H:%M:%S")),
            format!(
                "finished: {} ({}s)",
                self.finished_at.format("%Y-%m-%dT%H:%M:%S"),
                self.duration.as_secs()
            ),
            String::new(),
        ];

        lines.extend(environment_lines(&self.environment));

        lines.push(String::new());
        lines.push("results".to_string());
        for (kind, c) in self.counts_by_kind() {
            lines.push(format!("  {}: {}", kind.plural(), counts_line(&c)));
        }

        lines.push(String::new());
        lines.push("failures".to_string());
        let mut any = false;
        for failure in self.failures() {
            any = true;
            let detail = failure
                .detail
                .as_deref()
                .and_then(|d| d.lines().next())
                .map_or_else(String::new, |d| format!(" ({d})"));
            lines.push(format!(
                "  {} {}: {}{detail}",
                failure.kind,
                failure.item.id,
                failure.status.label()
            ));
        }
        if !any {
            lines.push("  (none)".to_string());
        }

        lines.extend(inventory.lines());

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Write `summary-<stamp>.txt` into `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write_summary(&self, dir: &Path, inventory: &Inventory) -> Result<PathBuf> {
        let path = dir.join(format!("summary-{}.txt", stamp(&self.started_at)));
        write_file(&path, &self.summary_text(inventory))?;
        Ok(path)
    }

    /// Write `report-<stamp>.json` into `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub fn persist_json(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("report-{}.json", stamp(&self.started_at)));
        let json = serde_json::to_string_pretty(self).context("serializing run report")?;
        write_file(&path, &json)?;
        Ok(path)
    }
}

/// Environment and inventory text for `provision summary`, outside a run.
#[must_use]
pub fn snapshot_text(environment: &EnvironmentSnapshot, inventory: &Inventory) -> String {
    let mut lines = environment_lines(environment);
    lines.extend(inventory.lines());
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn environment_lines(env: &EnvironmentSnapshot) -> Vec<String> {
    let mut lines = vec![
        "environment".to_string(),
        format!(
            "  os: {} {}",
            env.os,
            env.os_version.as_deref().unwrap_or("(unknown)")
        ),
        format!("  shell: {}", env.shell.as_deref().unwrap_or("(unknown)")),
    ];
    for runtime in &env.runtimes {
        lines.push(format!(
            "  {}: {}",
            runtime.name,
            runtime.version.as_deref().unwrap_or("(not found)")
        ));
    }
    lines
}

fn counts_line(c: &KindCounts) -> String {
    format!(
        "{} installed, {} already present, {} failed, {} skipped",
        c.installed, c.already_present, c.failed, c.skipped
    )
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    crate::resources::fs::ensure_parent_dir(path)?;
    std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))
}

/// Installed identifiers for one installer, as listed at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventorySection {
    /// Kind the listing belongs to.
    pub kind: ItemKind,
    /// Sorted identifiers, or the listing error.
    pub items: Result<Vec<String>, String>,
}

/// What is installed right now, per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    /// One section per queried installer.
    pub sections: Vec<InventorySection>,
}

impl Inventory {
    /// Query each installer's listing.
    #[must_use]
    pub fn collect(installers: &[&dyn Installer]) -> Self {
        let sections = installers
            .iter()
            .map(|installer| InventorySection {
                kind: installer.kind(),
                items: installer
                    .list_installed()
                    .map(|set| {
                        let mut items: Vec<String> = set.into_iter().collect();
                        items.sort();
                        items
                    })
                    .map_err(|e| format!("{e:#}")),
            })
            .collect();
        Self { sections }
    }

    fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for section in &self.sections {
            lines.push(String::new());
            match &section.items {
                Ok(items) => {
                    lines.push(format!(
                        "installed {} ({})",
                        section.kind.plural(),
                        items.len()
                    ));
                    lines.extend(items.iter().map(|i| format!("  {i}")));
                }
                Err(e) => lines.push(format!(
                    "installed {}: listing unavailable ({e})",
                    section.kind.plural()
                )),
            }
        }
        lines
    }
}
