//! CLI output formatting for builds and checks.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each page leads with
//! its positional index and resolved title; the output path follows the `→`
//! and the source file is shown as an indented `Source:` line. Static and
//! generated files have no title, so they are listed by path.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Pages
//! 001 Home → index.html
//!     Source: index.md
//! 002 Install → guide/install.html
//!     Source: guide/install.md
//!     Summary: Getting the CLI onto your machine
//!
//! Static
//!     img/logo.png
//!
//! Generated
//!     app.3f2a….webmanifest
//!     robots.txt
//!     sitemap.xml
//!
//! Excluded
//!     README.md
//!     site.json
//!
//! Built 2 pages, 1 static file, 3 generated files
//! ```
//!
//! ## Sidebar
//!
//! ```text
//! Sidebar
//! Home /
//!     001 Guide /guide
//!         001 Install /guide/install
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::registry::ResourceRegistry;
use crate::types::{ResourceInfo, SidebarNode};
use crate::writer::WriteSummary;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

/// Resource path without the leading slash, as it appears under the output dir.
fn display_path(path: &str) -> &str {
    path.trim_start_matches('/')
}

// ============================================================================
// Tree walker
// ============================================================================

/// A flattened node from walking the sidebar tree.
struct TreeNode<'a> {
    depth: usize,
    position: usize,
    title: &'a str,
    path: &'a str,
}

/// Walk the sidebar below the root, assigning positional indices per sibling
/// level.
fn walk_sidebar(root: &SidebarNode) -> Vec<TreeNode<'_>> {
    let mut nodes = Vec::new();
    walk_sidebar_recursive(&root.children, 0, &mut nodes);
    nodes
}

fn walk_sidebar_recursive<'a>(items: &'a [SidebarNode], depth: usize, nodes: &mut Vec<TreeNode<'a>>) {
    for (i, item) in items.iter().enumerate() {
        nodes.push(TreeNode {
            depth,
            position: i + 1,
            title: &item.title,
            path: &item.path,
        });
        walk_sidebar_recursive(&item.children, depth + 1, nodes);
    }
}

// ============================================================================
// Build output
// ============================================================================

fn page_lines(index: usize, resource_path: &str, resource: &ResourceInfo) -> Vec<String> {
    let Some(page) = &resource.page else {
        return Vec::new();
    };
    let hidden = if page.frontmatter.hidden == Some(true) {
        " (hidden)"
    } else {
        ""
    };
    let mut lines = vec![format!(
        "{} {}{} \u{2192} {}",
        format_index(index),
        page.title_resolved,
        hidden,
        display_path(resource_path)
    )];
    lines.push(format!(
        "    Source: {}",
        display_path(&resource.content_repo_path)
    ));
    let summary = page.frontmatter.summary.trim();
    if !summary.is_empty() {
        lines.push(format!("    Summary: {}", truncate_desc(summary, 60)));
    }
    lines
}

/// Format the contents of a built registry.
pub fn format_build_output(registry: &ResourceRegistry) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pages = 0;
    let mut statics = Vec::new();
    let mut generated = Vec::new();
    let mut excluded = Vec::new();

    lines.push("Pages".to_string());
    for (resource_path, resource) in registry.resources() {
        if !resource.include_in_output {
            excluded.push(display_path(&resource.content_repo_path));
        } else if resource.input_path.is_none() {
            generated.push(display_path(resource_path));
        } else if resource.page.is_some() {
            pages += 1;
            lines.extend(page_lines(pages, resource_path, resource));
        } else {
            statics.push(display_path(resource_path));
        }
    }

    for (heading, paths) in [
        ("Static", &statics),
        ("Generated", &generated),
        ("Excluded", &excluded),
    ] {
        if paths.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(heading.to_string());
        lines.extend(paths.iter().map(|p| format!("    {p}")));
    }

    lines.push(String::new());
    lines.push(format!(
        "Built {}, {}, {}",
        plural(pages, "page", "pages"),
        plural(statics.len(), "static file", "static files"),
        plural(generated.len(), "generated file", "generated files"),
    ));
    lines
}

/// Print build output to stdout.
pub fn print_build_output(registry: &ResourceRegistry) {
    for line in format_build_output(registry) {
        println!("{}", line);
    }
}

/// One-line summary of a finished write.
pub fn format_write_summary(summary: &WriteSummary, dest: &Path) -> String {
    format!(
        "Wrote {} ({} rendered, {} copied) \u{2192} {}",
        plural(summary.total(), "file", "files"),
        summary.rendered,
        summary.copied,
        dest.display()
    )
}

// ============================================================================
// Sidebar output
// ============================================================================

/// Format the sidebar tree with positional indices per level.
pub fn format_sidebar(root: &SidebarNode) -> Vec<String> {
    let mut lines = vec!["Sidebar".to_string()];
    let root_title = if root.title.is_empty() {
        "(untitled)"
    } else {
        &root.title
    };
    lines.push(format!("{} {}", root_title, root.path));
    for node in walk_sidebar(root) {
        lines.push(format!(
            "{}{} {} {}",
            indent(node.depth + 1),
            format_index(node.position),
            node.title,
            node.path
        ));
    }
    lines
}

/// Print the sidebar tree to stdout.
pub fn print_sidebar(root: &SidebarNode) {
    for line in format_sidebar(root) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn node(title: &str, path: &str, children: Vec<SidebarNode>) -> SidebarNode {
        SidebarNode {
            title: title.to_string(),
            path: path.to_string(),
            children,
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn truncate_desc_short() {
        assert_eq!(truncate_desc("Short text", 40), "Short text");
    }

    #[test]
    fn truncate_desc_exact() {
        let text = "a".repeat(40);
        assert_eq!(truncate_desc(&text, 40), text);
    }

    #[test]
    fn truncate_desc_long() {
        let text = "a".repeat(50);
        let expected = format!("{}...", "a".repeat(40));
        assert_eq!(truncate_desc(&text, 40), expected);
    }

    #[test]
    fn truncate_desc_multibyte() {
        assert_eq!(truncate_desc("ééé", 2), "éé...");
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "page", "pages"), "1 page");
        assert_eq!(plural(0, "page", "pages"), "0 pages");
    }

    // =========================================================================
    // Tree walker tests
    // =========================================================================

    #[test]
    fn walk_sidebar_empty() {
        assert!(walk_sidebar(&SidebarNode::root()).is_empty());
    }

    #[test]
    fn walk_sidebar_nested() {
        let tree = node(
            "Home",
            "/",
            vec![
                node("Guide", "/guide", vec![node("Install", "/guide/install", vec![])]),
                node("FAQ", "/faq", vec![]),
            ],
        );
        let nodes = walk_sidebar(&tree);
        assert_eq!(nodes.len(), 3);
        assert_eq!((nodes[0].depth, nodes[0].position, nodes[0].title), (0, 1, "Guide"));
        assert_eq!((nodes[1].depth, nodes[1].position, nodes[1].path), (1, 1, "/guide/install"));
        assert_eq!((nodes[2].depth, nodes[2].position, nodes[2].title), (0, 2, "FAQ"));
    }

    // =========================================================================
    // Format tests
    // =========================================================================

    #[test]
    fn format_sidebar_tree() {
        let tree = node(
            "Home",
            "/",
            vec![node("Guide", "/guide", vec![node("Install", "/guide/install", vec![])])],
        );
        assert_eq!(
            format_sidebar(&tree),
            vec![
                "Sidebar",
                "Home /",
                "    001 Guide /guide",
                "        001 Install /guide/install",
            ]
        );
    }

    #[test]
    fn format_sidebar_untitled_root() {
        let lines = format_sidebar(&SidebarNode::root());
        assert_eq!(lines[1], "(untitled) /");
    }

    #[test]
    fn format_build_lists_sections() {
        let reg = SiteFixture::new()
            .file("index.md", "# Home")
            .file("guide/install.md", "---\nsummary: Getting started\nhidden: true\n---\n# Install")
            .file("img/logo.png", "png")
            .file("README.md", "# Readme")
            .build();
        let lines = format_build_output(&reg);

        assert_eq!(lines[0], "Pages");
        assert!(lines.contains(&"001 Install (hidden) \u{2192} guide/install.html".to_string()));
        assert!(lines.contains(&"    Source: guide/install.md".to_string()));
        assert!(lines.contains(&"    Summary: Getting started".to_string()));
        assert!(lines.contains(&"002 Home \u{2192} index.html".to_string()));
        assert!(lines.contains(&"    img/logo.png".to_string()));
        assert!(lines.contains(&"    robots.txt".to_string()));
        assert!(lines.contains(&"    README.md".to_string()));
        assert!(lines.contains(&"    site.json".to_string()));
        assert_eq!(
            lines.last().unwrap(),
            "Built 2 pages, 1 static file, 3 generated files"
        );
    }

    #[test]
    fn format_write_summary_line() {
        let summary = WriteSummary {
            rendered: 4,
            copied: 1,
        };
        assert_eq!(
            format_write_summary(&summary, Path::new("dist")),
            "Wrote 5 files (4 rendered, 1 copied) \u{2192} dist"
        );
    }
}
