//! Site configuration module.
//!
//! Handles loading and validating the site configuration file. The file is
//! JSON and lives in the content root under one of two names, checked in
//! order:
//!
//! ```text
//! content/
//! ├── site.json      # preferred
//! └── docs.json      # accepted when site.json is absent
//! ```
//!
//! ## Configuration Options
//!
//! ```json
//! {
//!   "product": "Acme",
//!   "siteMetadata": {
//!     "title": "Acme Docs",
//!     "description": "Everything about Acme",
//!     "origin": "https://docs.acme.dev",
//!     "lang": "en",
//!     "dir": "ltr",
//!     "themeColor": "#0f172a",
//!     "backgroundColor": "#ffffff",
//!     "icon": "/favicon.png",
//!     "repository": "acme/docs",
//!     "editBranch": "main"
//!   },
//!   "theme": { "accentColor": "#2563eb" },
//!   "search": { "enabled": true },
//!   "manifest": { "display": "minimal-ui" }
//! }
//! ```
//!
//! `product`, `siteMetadata.title` and `siteMetadata.description` are
//! required. Everything else is optional. Unknown keys are rejected to catch
//! typos early.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Accepted config file names at the content root, in lookup order.
pub const CONFIG_FILE_NAMES: &[&str] = &["site.json", "docs.json"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.json` or `docs.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SiteConfig {
    /// Product name, also the manifest `short_name`.
    pub product: String,
    pub site_metadata: SiteMetadata,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub search: SearchConfig,
    /// Keys merged over the generated web app manifest.
    #[serde(default)]
    pub manifest: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SiteMetadata {
    pub title: String,
    pub description: String,
    /// Public origin such as `https://docs.example.com`, without trailing slash.
    /// Required for writing output; serving can fall back to a local origin.
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_dir")]
    pub dir: String,
    #[serde(default)]
    pub theme_color: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    /// Icon path for the manifest and the page head.
    #[serde(default)]
    pub icon: Option<String>,
    /// `owner/repo` used for "edit this page" links.
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default = "default_edit_branch")]
    pub edit_branch: String,
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_dir() -> String {
    "ltr".to_string()
}

fn default_edit_branch() -> String {
    "main".to_string()
}

/// Theme settings passed through to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ThemeConfig {
    #[serde(default)]
    pub accent_color: Option<String>,
}

/// Search settings passed through to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchConfig {
    #[serde(default)]
    pub enabled: bool,
}

impl SiteConfig {
    /// Validate required fields and value formats.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty("product", &self.product)?;
        let meta = &self.site_metadata;
        require_non_empty("siteMetadata.title", &meta.title)?;
        require_non_empty("siteMetadata.description", &meta.description)?;

        let colors = [
            ("siteMetadata.themeColor", &meta.theme_color),
            ("siteMetadata.backgroundColor", &meta.background_color),
            ("theme.accentColor", &self.theme.accent_color),
        ];
        for (field, value) in colors {
            if let Some(color) = value
                && !is_hex_color(color)
            {
                return Err(ConfigError::Validation(format!(
                    "{field} must be a #rrggbb color, got {color:?}"
                )));
            }
        }

        if let Some(repo) = &meta.repository
            && !is_repo_reference(repo)
        {
            return Err(ConfigError::Validation(format!(
                "siteMetadata.repository must be owner/repo, got {repo:?}"
            )));
        }

        if let Some(origin) = &meta.origin
            && (!(origin.starts_with("http://") || origin.starts_with("https://"))
                || origin.ends_with('/'))
        {
            return Err(ConfigError::Validation(format!(
                "siteMetadata.origin must be an http(s) origin without trailing slash, got {origin:?}"
            )));
        }
        Ok(())
    }

    /// The configured public origin, if set and non-empty.
    pub fn public_origin(&self) -> Option<&str> {
        self.site_metadata
            .origin
            .as_deref()
            .filter(|o| !o.is_empty())
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn is_repo_reference(value: &str) -> bool {
    let valid_part = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    match value.split_once('/') {
        Some((owner, repo)) => valid_part(owner) && valid_part(repo),
        None => false,
    }
}

/// Deserialize and validate raw config JSON.
pub fn parse_config(json: &str) -> Result<SiteConfig, ConfigError> {
    let config: SiteConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a config file from disk.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Returns a starter `site.json` with every option filled in.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_json() -> &'static str {
    r##"{
  "product": "My Product",
  "siteMetadata": {
    "title": "My Product Docs",
    "description": "Documentation for My Product",
    "origin": "https://docs.example.com",
    "lang": "en",
    "dir": "ltr",
    "themeColor": "#111111",
    "backgroundColor": "#ffffff",
    "icon": "/favicon.png",
    "repository": "owner/repo",
    "editBranch": "main"
  },
  "theme": {
    "accentColor": "#2563eb"
  },
  "search": {
    "enabled": false
  }
}
"##
}
