//! Manifest loading: one identifier per line with optional `#` comments.
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ManifestError;

/// The kind of thing a manifest lists; selects the installer used for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Command-line package (Homebrew formula).
    Package,
    /// GUI application (Homebrew cask).
    Application,
    /// Editor extension (VS Code).
    Extension,
}

impl ItemKind {
    /// All kinds, in the order a run processes them.
    pub const ALL: [Self; 3] = [Self::Package, Self::Application, Self::Extension];

    /// Plural label used in headings and summaries.
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Package => "packages",
            Self::Application => "applications",
            Self::Extension => "extensions",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Package => write!(f, "package"),
            Self::Application => write!(f, "application"),
            Self::Extension => write!(f, "extension"),
        }
    }
}

/// One entry of a manifest.
///
/// # Examples
///
/// ```
/// use provision_cli::config::manifest::parse_str;
///
/// let items = parse_str("git   # vcs\n\n# just a comment\ngh\n");
/// let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
/// assert_eq!(ids, ["git", "gh"]);
/// assert_eq!(items[0].comment.as_deref(), Some("vcs"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestItem {
    /// Package, cask, or extension identifier. Never empty.
    pub id: String,
    /// Trailing comment, kept for traceability only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ManifestItem {
    /// Create an item with no comment.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            comment: None,
        }
    }
}

/// A loaded manifest file.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Which installer handles these items.
    pub kind: ItemKind,
    /// File the items were read from.
    pub path: PathBuf,
    /// Items in file order.
    pub items: Vec<ManifestItem>,
}

impl Manifest {
    /// Load the manifest at `path` for `kind`.
    ///
    /// # Errors
    ///
    /// See [`load`].
    pub fn load(kind: ItemKind, path: &Path) -> Result<Self, ManifestError> {
        Ok(Self {
            kind,
            path: path.to_path_buf(),
            items: load(path)?,
        })
    }
}

/// Read a manifest file into an ordered list of items.
///
/// # Errors
///
/// Returns [`ManifestError::NotFound`] if `path` does not exist and
/// [`ManifestError::Unreadable`] on any I/O error, including invalid UTF-8.
pub fn load(path: &Path) -> Result<Vec<ManifestItem>, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_str(&content))
}

/// Parse manifest content.
///
/// Everything from the first `#` on a line is a comment. The remainder is
/// trimmed; blank results are skipped. Identifiers are not validated, and
/// duplicates are kept so each occurrence is attempted.
#[must_use]
pub fn parse_str(content: &str) -> Vec<ManifestItem> {
    content.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<ManifestItem> {
    let (body, comment) = match line.split_once('#') {
        Some((body, comment)) => (body, Some(comment.trim())),
        None => (line, None),
    };
    let id = body.trim();
    if id.is_empty() {
        return None;
    }
    Some(ManifestItem {
        id: id.to_string(),
        comment: comment.filter(|c| !c.is_empty()).map(String::from),
    })
}
