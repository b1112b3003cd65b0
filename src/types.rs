//! Shared types used across the rebuild pass, the writer, and the router.
//!
//! A [`ResourceInfo`] is created once per resource path and mutated on every
//! later rebuild; pages and rendered text hang off it.

use std::path::PathBuf;

/// One file reported by the content lister.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFileInfo {
    /// Absolute path under the content root.
    pub path: PathBuf,
    /// Opaque change token. Not used to skip work.
    pub version: String,
}

impl InputFileInfo {
    pub fn new(path: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
        }
    }
}

/// A single build-visible item keyed by its resource path.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceInfo {
    /// Backing file. `None` for generated artifacts.
    pub input_path: Option<PathBuf>,
    /// Extension of the input file (`md` for pages), as written, no dot.
    pub extension: String,
    pub include_in_output: bool,
    pub canonical_path: String,
    pub content_repo_path: String,
    pub page: Option<Page>,
    /// Generated or rendered text. When absent the input bytes are copied.
    pub output_text: Option<String>,
}

impl ResourceInfo {
    /// A resource whose content is produced by the build rather than read
    /// from the content tree.
    pub fn generated(resource_path: &str, extension: &str, text: String) -> Self {
        Self {
            input_path: None,
            extension: extension.to_string(),
            include_in_output: true,
            canonical_path: crate::paths::canonical_path(resource_path),
            content_repo_path: String::new(),
            page: None,
            output_text: Some(text),
        }
    }

    pub fn is_markdown(&self) -> bool {
        self.extension == "md"
    }
}

/// Metadata block at the top of a markdown file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: Option<String>,
    /// Page type, lowercase letters only.
    pub page_type: String,
    pub summary: String,
    /// Parsed and carried through to the sidebar, but not used for sorting.
    pub order: Option<u32>,
    pub hidden: Option<bool>,
    pub hide_children: Option<bool>,
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            page_type: "document".to_string(),
            summary: String::new(),
            order: None,
            hidden: None,
            hide_children: None,
        }
    }
}

/// A markdown page after front matter has been split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub frontmatter: FrontMatter,
    /// Text of the first `# heading`, set only when no explicit title exists.
    pub title_from_first_h1: Option<String>,
    /// File stem, set only when neither explicit title nor heading exists.
    pub title_from_filename: Option<String>,
    pub title_resolved: String,
    /// Body with the front matter block stripped.
    pub markdown: String,
}

/// Navigation tree node. The root has path `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarNode {
    pub title: String,
    pub path: String,
    pub children: Vec<SidebarNode>,
}

impl SidebarNode {
    /// Empty tree rooted at `/`.
    pub fn root() -> Self {
        Self {
            title: String::new(),
            path: "/".to_string(),
            children: Vec::new(),
        }
    }
}
