//! Content file listing.
//!
//! Walks the content root and reports every file the build should see, each
//! with a change token. Skipped:
//!
//! - `.git` directories
//! - the ignore file itself (`.siteignore` at the root)
//! - anything matched by an ignore pattern
//!
//! ## Ignore Patterns
//!
//! One glob per line in `.siteignore`; blank lines and `#` comments are
//! skipped.
//!
//! | Pattern | Matches |
//! |---------|---------|
//! | `drafts` | any file or directory named `drafts`, at any depth |
//! | `*.tmp` | any `.tmp` file at any depth |
//! | `build/` | directories named `build` at any depth |
//! | `docs/old.md` | only `old.md` under the root-level `docs/` |
//!
//! An ignored directory is not descended into.

use crate::types::InputFileInfo;
use glob::{MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

pub const IGNORE_FILE: &str = ".siteignore";

#[derive(Error, Debug)]
pub enum ListError {
    #[error("content root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("invalid pattern {pattern:?} in .siteignore: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug)]
struct IgnoreRule {
    pattern: Pattern,
    /// Matches at any depth rather than from the root.
    anywhere: bool,
    dir_only: bool,
}

/// Parsed `.siteignore` patterns.
#[derive(Debug, Default)]
pub struct IgnoreRules {
    rules: Vec<IgnoreRule>,
}

impl IgnoreRules {
    pub fn parse(text: &str) -> Result<Self, ListError> {
        let mut rules = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let dir_only = line.ends_with('/');
            let body = line.trim_end_matches('/');
            let anywhere = dir_only || !body.contains('/');
            let body = body.trim_start_matches('/');
            if body.is_empty() {
                continue;
            }
            let pattern = Pattern::new(body).map_err(|source| ListError::Pattern {
                pattern: line.to_string(),
                source,
            })?;
            rules.push(IgnoreRule {
                pattern,
                anywhere,
                dir_only,
            });
        }
        Ok(Self { rules })
    }

    /// Rules from `root/.siteignore`, or none when the file is absent.
    pub fn load(root: &Path) -> Result<Self, ListError> {
        let path = root.join(IGNORE_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Whether a root-relative, `/`-joined path is ignored.
    pub fn is_ignored(&self, rel: &str, is_dir: bool) -> bool {
        self.rules.iter().any(|rule| {
            if rule.dir_only && !is_dir {
                return false;
            }
            if rule.anywhere {
                suffixes(rel).any(|s| rule.pattern.matches_with(s, MATCH_OPTIONS))
            } else {
                rule.pattern.matches_with(rel, MATCH_OPTIONS)
            }
        })
    }
}

/// `a/b/c` → `a/b/c`, `b/c`, `c`.
fn suffixes(rel: &str) -> impl Iterator<Item = &str> {
    std::iter::once(rel).chain(rel.match_indices('/').map(move |(i, _)| &rel[i + 1..]))
}

fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn version_token(meta: &fs::Metadata) -> String {
    let nanos = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("{nanos}-{}", meta.len())
}

/// List every build-visible file under `root`, in path order.
pub fn list_files(root: &Path) -> Result<Vec<InputFileInfo>, ListError> {
    if !root.is_dir() {
        return Err(ListError::NotADirectory(root.to_path_buf()));
    }
    let rules = IgnoreRules::load(root)?;

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name();
            if name == ".git" || (entry.depth() == 1 && name == IGNORE_FILE) {
                return false;
            }
            !rules.is_ignored(&relative(entry.path(), root), entry.file_type().is_dir())
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let meta = entry.metadata()?;
        files.push(InputFileInfo::new(entry.path(), version_token(&meta)));
    }
    debug!(root = %root.display(), count = files.len(), "listed content files");
    Ok(files)
}
