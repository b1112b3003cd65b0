//! One-shot output: write the built registry to a directory.
//!
//! Every resource flagged for output lands at its resource path under the
//! destination. Rendered and generated resources write their text; everything
//! else is copied byte for byte from the content tree.
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── docs/
//! │   ├── index.html
//! │   └── setup.html
//! ├── img/logo.png
//! ├── app.<sha256>.webmanifest
//! ├── robots.txt
//! └── sitemap.xml
//! ```
//!
//! The destination is cleared first, so files from earlier builds never
//! linger. It must therefore be disjoint from the content root: neither may
//! contain the other. A production build needs the configured public origin; a registry
//! built with only a local origin is refused.

use crate::paths::{self, PathError};
use crate::registry::ResourceRegistry;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("registry has not been built")]
    NotBuilt,
    #[error("siteMetadata.origin must be set to write output")]
    MissingOrigin,
    #[error("output destination {} exists and is not a directory", .0.display())]
    DestinationIsFile(PathBuf),
    #[error(
        "output destination {} overlaps content root {}",
        .dest.display(),
        .root.display()
    )]
    OverlapsContent { dest: PathBuf, root: PathBuf },
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("IO error writing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What [`write_output`] put on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Resources written from rendered or generated text.
    pub rendered: usize,
    /// Resources copied from the content tree.
    pub copied: usize,
}

impl WriteSummary {
    pub fn total(&self) -> usize {
        self.rendered + self.copied
    }
}

enum Written {
    Rendered,
    Copied,
}

/// Canonical form of a path that may not exist yet: the deepest existing
/// ancestor is canonicalized and the missing tail appended.
fn resolve(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut tail = Vec::new();
    let mut current = absolute.as_path();
    loop {
        if let Ok(real) = current.canonicalize() {
            return tail.iter().rev().fold(real, |acc, name| acc.join(name));
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name);
                current = parent;
            }
            _ => return absolute,
        }
    }
}

/// Clear `dest` and write every included resource into it.
pub fn write_output(registry: &ResourceRegistry, dest: &Path) -> Result<WriteSummary, WriteError> {
    let config = registry.config().ok_or(WriteError::NotBuilt)?;
    if config.public_origin().is_none() {
        return Err(WriteError::MissingOrigin);
    }
    if dest.exists() && !dest.is_dir() {
        return Err(WriteError::DestinationIsFile(dest.to_path_buf()));
    }
    let (dest_real, root_real) = (resolve(dest), resolve(registry.root()));
    if dest_real.starts_with(&root_real) || root_real.starts_with(&dest_real) {
        return Err(WriteError::OverlapsContent {
            dest: dest_real,
            root: root_real,
        });
    }

    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| WriteError::Io { path, source }
    };
    if dest.exists() {
        debug!(dest = %dest.display(), "clearing output directory");
        fs::remove_dir_all(dest).map_err(io_err(dest))?;
    }
    fs::create_dir_all(dest).map_err(io_err(dest))?;

    let results: Vec<Written> = registry
        .resources()
        .par_iter()
        .filter(|(_, r)| r.include_in_output)
        .map(|(resource_path, resource)| -> Result<Written, WriteError> {
            let target = match &resource.input_path {
                Some(input) => paths::output_path(input, registry.root(), dest)?,
                None => paths::output_path_for_resource(resource_path, dest),
            };
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(io_err(parent))?;
            }
            match (&resource.output_text, &resource.input_path) {
                (Some(text), _) => {
                    fs::write(&target, text).map_err(io_err(&target))?;
                    Ok(Written::Rendered)
                }
                (None, Some(input)) => {
                    fs::copy(input, &target).map_err(io_err(input))?;
                    Ok(Written::Copied)
                }
                // Generated resources always carry text.
                (None, None) => Ok(Written::Rendered),
            }
        })
        .collect::<Result<_, WriteError>>()?;

    let mut summary = WriteSummary::default();
    for written in results {
        match written {
            Written::Rendered => summary.rendered += 1,
            Written::Copied => summary.copied += 1,
        }
    }
    info!(
        dest = %dest.display(),
        rendered = summary.rendered,
        copied = summary.copied,
        "output written"
    );
    Ok(summary)
}
