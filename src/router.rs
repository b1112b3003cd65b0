//! Request routing against a built registry.
//!
//! Transport-free: [`handle`] maps a decoded request path to a [`Response`]
//! and knows nothing about sockets. The serve module adapts it to HTTP.
//!
//! ```text
//! /a/b.html   found      → 308 /a/b
//! /a/index    found      → 308 /a/
//! /a/b        found      → 200
//! /a          canonical  → 200  (matches /a or /a/)
//! /a/index    canonical  → 200  (no resource keyed /a/index)
//! anything else          → 404  (custom /404 page when present)
//! ```
//!
//! Both lookups see only resources flagged for output, so a direct hit on
//! `/README.html` or `/site.json` is a 404 even though the registry holds
//! them. The server never exposes what `build` would not write.

use crate::artifacts::NOT_FOUND_PATH;
use crate::paths;
use crate::registry::ResourceRegistry;
use crate::types::ResourceInfo;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

const NOT_FOUND_BODY: &str = "404 Not Found";
const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("no content type for {resource_path} (extension {extension:?})")]
    UnknownContentType {
        resource_path: String,
        extension: String,
    },
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A routed response, ready for any transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// Redirect target for 308 responses.
    pub location: Option<String>,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
}

impl Response {
    fn redirect(location: String) -> Self {
        Self {
            status: 308,
            location: Some(location),
            content_type: None,
            body: Vec::new(),
        }
    }
}

/// Route one request path.
pub fn handle(registry: &ResourceRegistry, path: &str) -> Result<Response, RouteError> {
    if let Some(resource) = routable(registry, path) {
        if let Some(stripped) = path.strip_suffix(".html") {
            return Ok(Response::redirect(stripped.to_string()));
        }
        if path.ends_with("/index") {
            return Ok(Response::redirect(index_parent(path)));
        }
        return respond(path, resource, 200);
    }

    let canonical = paths::canonical_path(path);
    let by_canonical = registry
        .find_by_canonical(&canonical)
        .or_else(|| registry.find_by_canonical(&format!("{canonical}/")));
    if let Some((resource_path, resource)) = by_canonical {
        return respond(resource_path, resource, 200);
    }

    not_found(registry)
}

fn routable<'a>(registry: &'a ResourceRegistry, resource_path: &str) -> Option<&'a ResourceInfo> {
    registry
        .get(resource_path)
        .filter(|r| r.include_in_output)
}

fn index_parent(path: &str) -> String {
    path.strip_suffix("index").unwrap_or(path).to_string()
}

fn not_found(registry: &ResourceRegistry) -> Result<Response, RouteError> {
    match registry.find_by_canonical(NOT_FOUND_PATH) {
        Some((resource_path, resource)) => respond(resource_path, resource, 404),
        None => Ok(Response {
            status: 404,
            location: None,
            content_type: Some(PLAIN_TEXT),
            body: NOT_FOUND_BODY.as_bytes().to_vec(),
        }),
    }
}

fn respond(resource_path: &str, resource: &ResourceInfo, status: u16) -> Result<Response, RouteError> {
    let content_type =
        paths::content_type(&resource.extension).ok_or_else(|| RouteError::UnknownContentType {
            resource_path: resource_path.to_string(),
            extension: resource.extension.clone(),
        })?;
    let body = match (&resource.output_text, &resource.input_path) {
        (Some(text), _) => text.as_bytes().to_vec(),
        (None, Some(input)) => fs::read(input).map_err(|source| RouteError::Io {
            path: input.clone(),
            source,
        })?,
        (None, None) => Vec::new(),
    };
    Ok(Response {
        status,
        location: None,
        content_type: Some(content_type),
        body,
    })
}
