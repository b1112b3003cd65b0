//! Mapping from content files to resource, canonical, and output paths.
//!
//! Every function here is pure. Given a content root, an input file maps to:
//!
//! | Input | Resource path | Canonical path |
//! |-------|---------------|----------------|
//! | `root/index.md` | `/index.html` | `/` |
//! | `root/docs/index.md` | `/docs/index.html` | `/docs/` |
//! | `root/docs/setup.md` | `/docs/setup.html` | `/docs/setup` |
//! | `root/img/logo.png` | `/img/logo.png` | `/img/logo.png` |
//!
//! The content-repo path keeps the original extension (`/docs/setup.md`) and
//! is used for "edit this page" links.

use crate::config::CONFIG_FILE_NAMES;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PathError {
    #[error("{} is not inside content root {}", .path.display(), .root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

/// Extension → `Content-Type`. Only these extensions are written or served.
/// Matching is case-sensitive: `logo.PNG` has no content type.
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("html", "text/html; charset=utf-8"),
    // Markdown resources hold rendered HTML.
    ("md", "text/html; charset=utf-8"),
    ("ico", "image/x-icon"),
    ("jpg", "image/jpeg"),
    ("json", "application/json"),
    ("png", "image/png"),
    ("svg", "image/svg+xml"),
    ("txt", "text/plain; charset=utf-8"),
    ("webmanifest", "application/manifest+json"),
    ("xml", "application/xml"),
];

/// Files copied to the output even though they have no known extension.
const PASSTHROUGH_FILES: &[&str] = &["/_redirects", "/_headers"];

/// Look up the content type for an extension.
pub fn content_type(extension: &str) -> Option<&'static str> {
    CONTENT_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, ct)| *ct)
}

/// Extension of a path without the dot, as written, or empty.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Root-relative path joined with `/`, rejecting anything outside `root`.
fn relative_to_root(input: &Path, root: &Path) -> Result<String, PathError> {
    let outside = || PathError::OutsideRoot {
        path: input.to_path_buf(),
        root: root.to_path_buf(),
    };
    let rel = input.strip_prefix(root).map_err(|_| outside())?;

    let mut segments = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(s) => segments.push(s.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return Err(outside()),
        }
    }
    if segments.is_empty() {
        return Err(outside());
    }
    Ok(segments.join("/"))
}

fn rewrite_markdown(rel: String) -> String {
    match rel.strip_suffix(".md") {
        Some(stem) => format!("{stem}.html"),
        None => rel,
    }
}

/// Output-relative path of an input file, always starting with `/`.
pub fn resource_path(input: &Path, root: &Path) -> Result<String, PathError> {
    let rel = relative_to_root(input, root)?;
    Ok(format!("/{}", rewrite_markdown(rel)))
}

/// User-facing URL path for a resource path.
///
/// - `/index.html` → `/`
/// - `/docs/index.html` → `/docs/`
/// - `/docs/foo.html` → `/docs/foo`
pub fn canonical_path(resource_path: &str) -> String {
    let without_html = resource_path
        .strip_suffix(".html")
        .unwrap_or(resource_path);
    match without_html.strip_suffix("/index") {
        Some(parent) => format!("{parent}/"),
        None => without_html.to_string(),
    }
}

/// Source path relative to the content root, original extension kept.
pub fn content_repo_path(input: &Path, root: &Path) -> Result<String, PathError> {
    Ok(format!("/{}", relative_to_root(input, root)?))
}

/// Where an input file lands under `output_dir`.
pub fn output_path(input: &Path, root: &Path, output_dir: &Path) -> Result<PathBuf, PathError> {
    let rel = rewrite_markdown(relative_to_root(input, root)?);
    Ok(rel.split('/').fold(output_dir.to_path_buf(), |p, s| p.join(s)))
}

/// Where a resource path lands under `output_dir`. Used for generated
/// artifacts, which have no input file.
pub fn output_path_for_resource(resource_path: &str, output_dir: &Path) -> PathBuf {
    resource_path
        .split('/')
        .filter(|s| !s.is_empty())
        .fold(output_dir.to_path_buf(), |p, s| p.join(s))
}

/// Whether a resource is written to the output directory (and listed).
pub fn include_in_output(resource_path: &str, extension: &str) -> bool {
    let is_config = CONFIG_FILE_NAMES
        .iter()
        .any(|name| resource_path.strip_prefix('/') == Some(*name));
    if is_config || resource_path.eq_ignore_ascii_case("/readme.html") {
        return false;
    }
    if PASSTHROUGH_FILES.contains(&resource_path) {
        return true;
    }
    content_type(extension).is_some()
}
