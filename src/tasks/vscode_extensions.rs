//! Task: install editor extensions.
use std::sync::Arc;

use anyhow::Result;

use super::packages::{install_manifests, skip_kind};
use super::{Context, Task, TaskResult};
use crate::config::manifest::ItemKind;
use crate::resources::vscode_extension::{EditorExtension, find_code_command};

/// Install editor extensions through the VS Code CLI.
///
/// The CLI is looked up when the task runs, so a VS Code cask installed
/// earlier in the same run is picked up.
#[derive(Debug)]
pub struct InstallExtensions;

impl Task for InstallExtensions {
    fn name(&self) -> &'static str {
        "Install editor extensions"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.item_count(ItemKind::Extension) > 0
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let configured = ctx.config.code_command.as_deref();
        let Some(code_cmd) = find_code_command(&*ctx.executor, configured) else {
            return Ok(skip_kind(ctx, ItemKind::Extension, "editor CLI not found"));
        };
        ctx.log.debug(&format!("using editor CLI: {code_cmd}"));
        let installer = EditorExtension::new(code_cmd, Arc::clone(&ctx.executor));
        Ok(install_manifests(ctx, &installer))
    }
}
