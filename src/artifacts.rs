//! Generated resources: web app manifest, robots file, sitemap.
//!
//! These are derived from the current resource set and the site config on
//! every rebuild and stored as resources with `output_text` and no input file.
//!
//! ## Content-addressed manifest
//!
//! The manifest lives at `/app.<sha256>.webmanifest`, where the hash is the
//! SHA-256 of its serialized JSON. Exactly one manifest resource is live: when
//! the hash changes, the previous path is removed in the same pass that
//! inserts the new one. When it does not change, the existing entry is kept.
//!
//! ## Origins
//!
//! Robots and sitemap need absolute URLs. A local origin override (serve mode)
//! takes precedence over the configured public origin; with neither, URLs are
//! origin-relative.

use crate::config::SiteConfig;
use crate::types::ResourceInfo;
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

pub const ROBOTS_PATH: &str = "/robots.txt";
pub const SITEMAP_PATH: &str = "/sitemap.xml";
/// Canonical path of the custom not-found page.
pub const NOT_FOUND_PATH: &str = "/404";

const MANIFEST_PREFIX: &str = "/app.";
const MANIFEST_SUFFIX: &str = ".webmanifest";
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const DEFAULT_COLOR: &str = "#ffffff";

/// Whether a resource path names a generated manifest.
pub fn is_manifest_path(resource_path: &str) -> bool {
    resource_path.starts_with(MANIFEST_PREFIX) && resource_path.ends_with(MANIFEST_SUFFIX)
}

/// Origin used for absolute URLs: local override, else configured, else empty.
pub fn effective_origin<'a>(config: &'a SiteConfig, local_origin: Option<&'a str>) -> &'a str {
    local_origin
        .filter(|o| !o.is_empty())
        .or_else(|| config.public_origin())
        .unwrap_or("")
}

/// Serialized web app manifest for a config.
pub fn manifest_json(config: &SiteConfig) -> String {
    let meta = &config.site_metadata;
    let icons = match &meta.icon {
        Some(src) => json!([{ "src": src, "sizes": "any" }]),
        None => json!([]),
    };

    let mut manifest = Map::new();
    manifest.insert("short_name".into(), json!(config.product));
    manifest.insert("name".into(), json!(meta.title));
    manifest.insert("description".into(), json!(meta.description));
    manifest.insert("icons".into(), icons);
    manifest.insert(
        "theme_color".into(),
        json!(meta.theme_color.as_deref().unwrap_or(DEFAULT_COLOR)),
    );
    manifest.insert(
        "background_color".into(),
        json!(meta.background_color.as_deref().unwrap_or(DEFAULT_COLOR)),
    );
    manifest.insert("display".into(), json!("standalone"));
    manifest.insert("start_url".into(), json!("/"));
    manifest.insert("lang".into(), json!(meta.lang));
    manifest.insert("dir".into(), json!(meta.dir));

    if let Some(overrides) = &config.manifest {
        for (key, value) in overrides {
            manifest.insert(key.clone(), value.clone());
        }
    }

    // Map serialization cannot fail: keys are strings, values are JSON.
    serde_json::to_string_pretty(&Value::Object(manifest)).unwrap_or_default()
}

/// SHA-256 of a string, returned as a hex string.
pub fn content_hash(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

/// Content-addressed resource path for manifest JSON.
pub fn manifest_path(json: &str) -> String {
    format!("{MANIFEST_PREFIX}{}{MANIFEST_SUFFIX}", content_hash(json))
}

/// `robots.txt` allowing everything and pointing at the sitemap.
pub fn robots_txt(origin: &str) -> String {
    format!("User-agent: *\nAllow: /\nSitemap: {origin}{SITEMAP_PATH}\n")
}

/// Canonical paths that belong in the sitemap, sorted.
pub fn sitemap_paths(resources: &BTreeMap<String, ResourceInfo>) -> Vec<&str> {
    let mut paths: Vec<&str> = resources
        .values()
        .filter(|r| r.include_in_output)
        .filter(|r| matches!(r.extension.as_str(), "md" | "html"))
        .map(|r| r.canonical_path.as_str())
        .filter(|canonical| *canonical != NOT_FOUND_PATH)
        .collect();
    paths.sort_unstable();
    paths
}

/// Sitemap XML listing every included page.
pub fn sitemap_xml(resources: &BTreeMap<String, ResourceInfo>, origin: &str) -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
    xml.push('\n');
    for path in sitemap_paths(resources) {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&format!("{origin}{path}"))));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Insert or replace the generated resources. Returns the live manifest path.
///
/// `current_manifest` is the manifest path tracked from the previous pass.
pub fn apply_artifacts(
    resources: &mut BTreeMap<String, ResourceInfo>,
    current_manifest: Option<&str>,
    config: &SiteConfig,
    local_origin: Option<&str>,
) -> String {
    let json = manifest_json(config);
    let path = manifest_path(&json);
    if current_manifest != Some(path.as_str()) || !resources.contains_key(&path) {
        if let Some(old) = current_manifest {
            resources.remove(old);
        }
        resources.insert(
            path.clone(),
            ResourceInfo::generated(&path, "webmanifest", json),
        );
    }

    let origin = effective_origin(config, local_origin);
    resources.insert(
        ROBOTS_PATH.to_string(),
        ResourceInfo::generated(ROBOTS_PATH, "txt", robots_txt(origin)),
    );
    let sitemap = sitemap_xml(resources, origin);
    resources.insert(
        SITEMAP_PATH.to_string(),
        ResourceInfo::generated(SITEMAP_PATH, "xml", sitemap),
    );

    path
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
