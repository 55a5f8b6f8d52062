//! Tagged text blocks in shell configuration files.
use std::ops::Range;
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::error::ResourceError;
use super::fs::ensure_parent_dir;
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A block of text kept between `# >>> provision:<tag> >>>` and
/// `# <<< provision:<tag> <<<` markers in a target file.
///
/// Identical content is left alone, different content is replaced in place,
/// and a missing block is appended.
///
/// # Examples
///
/// ```
/// use provision_cli::resources::shell_block::ShellBlockResource;
///
/// let block = ShellBlockResource::new("/tmp/.zshrc".into(), "starship", "eval \"$(starship init zsh)\"");
/// assert_eq!(
///     block.render(),
///     "# >>> provision:starship >>>\neval \"$(starship init zsh)\"\n# <<< provision:starship <<<\n"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ShellBlockResource {
    /// File the block belongs in.
    pub target: PathBuf,
    /// Marker tag.
    pub tag: String,
    body: String,
}

impl ShellBlockResource {
    /// Create a block for `target`. Trailing newlines in `content` are dropped.
    #[must_use]
    pub fn new(target: PathBuf, tag: &str, content: &str) -> Self {
        Self {
            target,
            tag: tag.to_string(),
            body: content.trim_end_matches(['\n', '\r']).to_string(),
        }
    }

    fn start_marker(&self) -> String {
        format!("# >>> provision:{} >>>", self.tag)
    }

    fn end_marker(&self) -> String {
        format!("# <<< provision:{} <<<", self.tag)
    }

    /// The full block including markers and a trailing newline.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "{}\n{}\n{}\n",
            self.start_marker(),
            self.body,
            self.end_marker()
        )
    }

    /// Locate this block in `text`: the byte range of the whole block and
    /// the body between the markers.
    fn find<'t>(&self, text: &'t str) -> Option<(Range<usize>, &'t str)> {
        let start_marker = self.start_marker();
        let end_marker = self.end_marker();
        let mut offset = 0;
        let mut open: Option<(usize, usize)> = None;
        for line in text.split_inclusive('\n') {
            let bare = line.trim_end_matches(['\n', '\r']);
            match open {
                None if bare == start_marker => open = Some((offset, offset + line.len())),
                Some((start, body_start)) if bare == end_marker => {
                    let body = text.get(body_start..offset)?;
                    return Some((start..offset + line.len(), body));
                }
                _ => {}
            }
            offset += line.len();
        }
        None
    }

    fn read_target(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.target) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("reading {}", self.target.display()))
            }
        }
    }

    fn write_target(&self, text: &str) -> Result<()> {
        ensure_parent_dir(&self.target)?;
        std::fs::write(&self.target, text)
            .with_context(|| format!("writing {}", self.target.display()))
    }
}

impl Applicable for ShellBlockResource {
    fn description(&self) -> String {
        format!("{} [{}]", self.target.display(), self.tag)
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.target.is_dir() {
            return Ok(ResourceChange::Skipped {
                reason: ResourceError::InvalidTarget {
                    path: self.target.clone(),
                    reason: "is a directory".to_string(),
                }
                .to_string(),
            });
        }

        let Some(text) = self.read_target()? else {
            self.write_target(&self.render())?;
            return Ok(ResourceChange::Applied);
        };

        let updated = match self.find(&text) {
            Some((_, body)) if body.trim_end_matches(['\n', '\r']) == self.body => {
                return Ok(ResourceChange::AlreadyCorrect);
            }
            Some((range, _)) => {
                let before = text.get(..range.start).unwrap_or_default();
                let after = text.get(range.end..).unwrap_or_default();
                format!("{before}{}{after}", self.render())
            }
            None => {
                let mut updated = text.clone();
                if !updated.is_empty() && !updated.ends_with('\n') {
                    updated.push('\n');
                }
                updated.push_str(&self.render());
                updated
            }
        };

        self.write_target(&updated)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for ShellBlockResource {
    fn current_state(&self) -> Result<ResourceState> {
        if self.target.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: "target is a directory".to_string(),
            });
        }
        let Some(text) = self.read_target()? else {
            return Ok(ResourceState::Missing);
        };
        Ok(match self.find(&text) {
            None => ResourceState::Missing,
            Some((_, body)) if body.trim_end_matches(['\n', '\r']) == self.body => {
                ResourceState::Correct
            }
            Some((_, body)) => ResourceState::Incorrect {
                current: body.to_string(),
            },
        })
    }
}
