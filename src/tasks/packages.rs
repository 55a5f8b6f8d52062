//! Install Homebrew formulae and casks from their manifests.
use std::sync::Arc;

use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::config::manifest::ItemKind;
use crate::reconcile::{ReconcileResult, reconcile};
use crate::resources::Installer;
use crate::resources::cask::BrewCask;
use crate::resources::package::{BREW, BrewFormula};

/// Reconcile every manifest of `installer.kind()` and record the outcomes.
pub(super) fn install_manifests(ctx: &Context, installer: &dyn Installer) -> TaskResult {
    let kind = installer.kind();
    let mut total = ReconcileResult::default();

    for manifest in ctx.config.manifests_of(kind) {
        ctx.log.debug(&format!(
            "{} {} from {}",
            manifest.items.len(),
            kind.plural(),
            manifest.path.display()
        ));
        total.extend(reconcile(
            &manifest.items,
            installer,
            &*ctx.log,
            ctx.dry_run,
            &ctx.interrupted,
        ));
    }

    let attempted = total.outcomes.len();
    let failed = total.failures().count();
    let interrupted = ctx.is_interrupted() && !total.skipped.is_empty();
    let dry_run_skips = ctx.dry_run && !total.skipped.is_empty();
    ctx.record(total);

    if failed > 0 {
        TaskResult::Partial(format!("{failed} of {attempted} {} failed", kind.plural()))
    } else if interrupted {
        TaskResult::Skipped("interrupted".to_string())
    } else if dry_run_skips {
        TaskResult::DryRun
    } else {
        TaskResult::Ok
    }
}

/// Record every item of `kind` as skipped because its tool is missing.
pub(super) fn skip_kind(ctx: &Context, kind: ItemKind, reason: &str) -> TaskResult {
    let mut skipped = ReconcileResult::default();
    for manifest in ctx.config.manifests_of(kind) {
        skipped.skip_all(&manifest.items, kind, reason);
    }
    ctx.log.warn(&format!(
        "{reason}: skipping {} {}",
        skipped.skipped.len(),
        kind.plural()
    ));
    ctx.record(skipped);
    TaskResult::Skipped(reason.to_string())
}

/// Install command-line packages as Homebrew formulae.
#[derive(Debug)]
pub struct InstallPackages;

impl Task for InstallPackages {
    fn name(&self) -> &'static str {
        "Install packages"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.item_count(ItemKind::Package) > 0
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if !ctx.executor.which(BREW) {
            return Ok(skip_kind(ctx, ItemKind::Package, "brew not found"));
        }
        let installer = BrewFormula::new(Arc::clone(&ctx.executor));
        Ok(install_manifests(ctx, &installer))
    }
}

/// Install GUI applications as Homebrew casks.
#[derive(Debug)]
pub struct InstallApplications;

impl Task for InstallApplications {
    fn name(&self) -> &'static str {
        "Install applications"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.item_count(ItemKind::Application) > 0
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if !ctx.executor.which(BREW) {
            return Ok(skip_kind(ctx, ItemKind::Application, "brew not found"));
        }
        let installer = BrewCask::new(Arc::clone(&ctx.executor));
        Ok(install_manifests(ctx, &installer))
    }
}
