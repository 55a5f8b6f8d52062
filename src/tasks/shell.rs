//! Task: ensure tagged blocks in shell startup files.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::resources::shell_block::ShellBlockResource;
use crate::resources::{Applicable, Resource, ResourceChange, ResourceState};

/// Ensure tagged blocks (PATH setup, prompt init, ...) in shell files.
#[derive(Debug)]
pub struct ConfigureShell;

impl Task for ConfigureShell {
    fn name(&self) -> &'static str {
        "Configure shell"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.shell_blocks.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if ctx.is_interrupted() {
            return Ok(TaskResult::Skipped("interrupted".to_string()));
        }

        let mut changed = 0usize;
        let mut failed = 0usize;
        for entry in &ctx.config.shell_blocks {
            let block = ShellBlockResource::new(entry.target.clone(), &entry.tag, &entry.content);
            let desc = block.description();

            if ctx.dry_run {
                match block.current_state() {
                    Ok(ResourceState::Correct) => ctx.log.debug(&format!("ok: {desc}")),
                    Ok(ResourceState::Invalid { reason }) => {
                        ctx.log.warn(&format!("cannot update {desc}: {reason}"));
                    }
                    Ok(_) => {
                        changed += 1;
                        ctx.log.dry_run(&format!("would update {desc}"));
                    }
                    Err(e) => {
                        failed += 1;
                        ctx.log.warn(&format!("cannot check {desc}: {e:#}"));
                    }
                }
                continue;
            }

            match block.apply() {
                Ok(ResourceChange::Applied) => {
                    changed += 1;
                    ctx.log.success(&format!("updated {desc}"));
                }
                Ok(ResourceChange::AlreadyCorrect) => ctx.log.debug(&format!("ok: {desc}")),
                Ok(ResourceChange::Skipped { reason }) => {
                    ctx.log.warn(&format!("skipped {desc}: {reason}"));
                }
                Err(e) => {
                    failed += 1;
                    ctx.log.warn(&format!("failed to update {desc}: {e:#}"));
                }
            }
        }

        let total = ctx.config.shell_blocks.len();
        if failed > 0 {
            Ok(TaskResult::Partial(format!("{failed} of {total} blocks failed")))
        } else if ctx.dry_run && changed > 0 {
            Ok(TaskResult::DryRun)
        } else {
            ctx.log
                .debug(&format!("{changed} of {total} shell blocks changed"));
            Ok(TaskResult::Ok)
        }
    }
}
