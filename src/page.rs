//! Markdown page loading: front matter and title resolution.
//!
//! A page may open with a small metadata block:
//!
//! ```text
//! ---
//! title: Getting Started
//! type: guide
//! summary: Install and run your first build
//! order: 2
//! hidden: false
//! hideChildren: true
//! ---
//! # Body starts here
//! ```
//!
//! Every line between the delimiters must be `key: value` with one of the
//! keys above. Anything else is an error that names the offending line.
//!
//! ## Title Resolution
//!
//! First available wins:
//!
//! 1. `title:` from front matter
//! 2. text of the first `# heading` anywhere in the body
//! 3. the file name without extension
//! 4. `untitled`

use crate::types::{FrontMatter, Page};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FrontMatterError {
    #[error("malformed front matter line: {line:?}")]
    MalformedLine { line: String },
    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum PageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),
}

const DELIMITER: &str = "---";
const UNTITLED: &str = "untitled";

/// Read and parse a markdown file.
pub fn load_page(path: &Path) -> Result<Page, PageError> {
    let content = fs::read_to_string(path)?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(parse_page(&content, &stem)?)
}

/// Parse page content. `file_stem` is the title of last resort.
pub fn parse_page(content: &str, file_stem: &str) -> Result<Page, FrontMatterError> {
    let (frontmatter, markdown) = match split_front_matter(content) {
        Some((block, body)) => (parse_front_matter(block)?, body),
        None => (FrontMatter::default(), content),
    };

    let mut page = Page {
        title_resolved: String::new(),
        title_from_first_h1: None,
        title_from_filename: None,
        frontmatter,
        markdown: markdown.to_string(),
    };

    if let Some(title) = &page.frontmatter.title {
        page.title_resolved = title.clone();
    } else if let Some(heading) = first_h1(&page.markdown) {
        page.title_from_first_h1 = Some(heading.clone());
        page.title_resolved = heading;
    } else {
        let from_filename = if file_stem.is_empty() {
            UNTITLED.to_string()
        } else {
            file_stem.to_string()
        };
        page.title_from_filename = Some(from_filename.clone());
        page.title_resolved = from_filename;
    }

    Ok(page)
}

/// Split `---`-delimited front matter from the body.
///
/// Returns `None` when the file does not open with a delimiter line or the
/// block is never closed; the whole file is then body.
fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    let first_line_end = content.find('\n')?;
    if content[..first_line_end].trim_end_matches('\r') != DELIMITER {
        return None;
    }
    let rest = &content[first_line_end + 1..];

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == DELIMITER {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn parse_front_matter(block: &str) -> Result<FrontMatter, FrontMatterError> {
    let mut fm = FrontMatter::default();

    for raw in block.lines() {
        if raw.trim().is_empty() {
            continue;
        }
        let malformed = || FrontMatterError::MalformedLine {
            line: raw.to_string(),
        };
        let (key, value) = raw.split_once(':').ok_or_else(malformed)?;
        let value = value.trim();

        match key.trim() {
            "title" if !value.is_empty() => fm.title = Some(value.to_string()),
            "summary" if !value.is_empty() => fm.summary = value.to_string(),
            "type" => {
                if value.is_empty() || !value.chars().all(|c| c.is_ascii_lowercase()) {
                    return Err(FrontMatterError::InvalidValue {
                        field: "type",
                        value: value.to_string(),
                    });
                }
                fm.page_type = value.to_string();
            }
            "order" => {
                let order = value
                    .parse::<u32>()
                    .map_err(|_| FrontMatterError::InvalidValue {
                        field: "order",
                        value: value.to_string(),
                    })?;
                fm.order = Some(order);
            }
            "hidden" => fm.hidden = Some(parse_bool("hidden", value)?),
            "hideChildren" => fm.hide_children = Some(parse_bool("hideChildren", value)?),
            _ => return Err(malformed()),
        }
    }

    Ok(fm)
}

fn parse_bool(field: &'static str, value: &str) -> Result<bool, FrontMatterError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(FrontMatterError::InvalidValue {
            field,
            value: value.to_string(),
        })
    }
}

fn first_h1(markdown: &str) -> Option<String> {
    markdown
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
}
