//! Shared test utilities for the docsite test suite.
//!
//! Provides a content-tree fixture builder, registry lookups that panic with
//! the available keys on a miss, and sidebar shape assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let reg = SiteFixture::new()
//!     .file("index.md", "# Home")
//!     .file("guide/install.md", "# Install")
//!     .build();
//!
//! assert_eq!(page_title(&reg, "/index.html"), "Home");
//! assert_sidebar_shape(&reg, &[("guide", &["Install"])]);
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::artifacts::is_manifest_path;
use crate::files::list_files;
use crate::registry::ResourceRegistry;
use crate::render::HtmlRenderer;
use crate::types::{InputFileInfo, ResourceInfo, SidebarNode};

/// Public origin used by [`MINIMAL_CONFIG`].
pub const ORIGIN: &str = "https://docs.test";

/// Local origin for serve-mode registries.
pub const LOCAL_ORIGIN: &str = "http://127.0.0.1:8080";

pub const MINIMAL_CONFIG: &str = r#"{
    "product": "P",
    "siteMetadata": { "title": "T", "description": "D", "origin": "https://docs.test" }
}"#;

pub const MINIMAL_CONFIG_NO_ORIGIN: &str = r#"{
    "product": "P",
    "siteMetadata": { "title": "T", "description": "D" }
}"#;

// =========================================================================
// Fixture setup
// =========================================================================

/// A content root in a temp directory, removed on drop.
pub struct SiteFixture {
    dir: TempDir,
}

impl SiteFixture {
    /// Content root holding only a minimal `site.json`.
    pub fn new() -> Self {
        Self::empty().file("site.json", MINIMAL_CONFIG)
    }

    /// Content root with no files at all.
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Add a file, creating parent directories.
    pub fn file(self, rel: &str, content: &str) -> Self {
        self.write(rel, content);
        self
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.dir.path().join(rel)).unwrap();
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Current file list, as the lister reports it.
    pub fn inputs(&self) -> Vec<InputFileInfo> {
        list_files(self.root()).unwrap()
    }

    /// Registry after one successful rebuild with the default renderer.
    pub fn build(&self) -> ResourceRegistry {
        let mut reg = ResourceRegistry::new(self.root());
        reg.rebuild(&self.inputs(), &HtmlRenderer).unwrap();
        reg
    }
}

// =========================================================================
// Registry lookups: panic with a clear message on miss
// =========================================================================

/// Find a resource by resource path. Panics if not found.
pub fn find_resource<'a>(reg: &'a ResourceRegistry, resource_path: &str) -> &'a ResourceInfo {
    reg.get(resource_path).unwrap_or_else(|| {
        let keys: Vec<&str> = reg.resources().keys().map(String::as_str).collect();
        panic!("resource '{resource_path}' not found. Available: {keys:?}")
    })
}

/// Resolved title of a markdown resource. Panics if it has no page.
pub fn page_title<'a>(reg: &'a ResourceRegistry, resource_path: &str) -> &'a str {
    find_resource(reg, resource_path)
        .page
        .as_ref()
        .map(|p| p.title_resolved.as_str())
        .unwrap_or_else(|| panic!("resource '{resource_path}' has no page"))
}

/// All live manifest resource paths.
pub fn manifest_paths(reg: &ResourceRegistry) -> Vec<String> {
    reg.resources()
        .keys()
        .filter(|k| is_manifest_path(k))
        .cloned()
        .collect()
}

// =========================================================================
// Sidebar helpers
// =========================================================================

/// Child titles of a sidebar node, in order.
pub fn child_titles(node: &SidebarNode) -> Vec<&str> {
    node.children.iter().map(|c| c.title.as_str()).collect()
}

/// Assert the top two levels of the sidebar.
///
/// Each entry is `(title, children)`. Use `&[]` for leaf nodes.
pub fn assert_sidebar_shape(reg: &ResourceRegistry, expected: &[(&str, &[&str])]) {
    let sidebar = reg.sidebar();
    let expected_titles: Vec<&str> = expected.iter().map(|(t, _)| *t).collect();
    assert_eq!(
        child_titles(sidebar),
        expected_titles,
        "sidebar top-level titles mismatch"
    );

    for ((title, children), node) in expected.iter().zip(&sidebar.children) {
        assert_eq!(
            child_titles(node),
            children.to_vec(),
            "sidebar children of '{title}' mismatch"
        );
    }
}
