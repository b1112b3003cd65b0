//! The resource registry and its rebuild pass.
//!
//! [`ResourceRegistry`] owns the map of resource path → [`ResourceInfo`] for
//! one content root. A caller feeds it the current file list; the registry
//! derives everything else.
//!
//! ## Rebuild Pass
//!
//! ```text
//! 1. Register   new input paths → ResourceInfo (existing entries untouched),
//!               evict entries whose input vanished
//! 2. Config     site.json / docs.json → SiteConfig
//! 3. Artifacts  manifest, robots.txt, sitemap.xml
//! 4. Pages      front matter + title for every markdown resource
//! 5. Sidebar    tree from included markdown resources
//! 6. Render     every markdown resource → output text
//! ```
//!
//! The pass runs against a copy of the registry and is committed only when
//! all six steps succeed. A failing rebuild leaves the previous state intact,
//! so a served snapshot never mixes old and new resources.
//!
//! Steps 4 and 6 fan out across pages with rayon; results do not depend on
//! scheduling.

use crate::artifacts::{self, ROBOTS_PATH, SITEMAP_PATH};
use crate::config::{self, CONFIG_FILE_NAMES, ConfigError, SiteConfig};
use crate::page::{self, FrontMatterError, PageError};
use crate::paths::{self, PathError};
use crate::render::{RenderContext, Renderer};
use crate::sidebar::{SidebarItem, compute_sidebar, sidebar_path};
use crate::types::{InputFileInfo, ResourceInfo, SidebarNode};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("no site config found in content root (expected site.json or docs.json)")]
    ConfigMissing,
    #[error("invalid site config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
    #[error("{}: {source}", .path.display())]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a rebuild pass produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildSummary {
    pub pages: usize,
    pub static_files: usize,
    pub evicted: usize,
    pub manifest_path: String,
}

/// Resource map for one content root, updated in place by [`rebuild`].
///
/// [`rebuild`]: ResourceRegistry::rebuild
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    root: PathBuf,
    local_origin: Option<String>,
    resources: BTreeMap<String, ResourceInfo>,
    config: Option<SiteConfig>,
    sidebar: SidebarNode,
    manifest_path: Option<String>,
}

impl ResourceRegistry {
    /// Empty registry for content under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            local_origin: None,
            resources: BTreeMap::new(),
            config: None,
            sidebar: SidebarNode::root(),
            manifest_path: None,
        }
    }

    /// Use `origin` instead of the configured public origin for absolute URLs.
    pub fn with_local_origin(mut self, origin: impl Into<String>) -> Self {
        self.local_origin = Some(origin.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn local_origin(&self) -> Option<&str> {
        self.local_origin.as_deref()
    }

    pub fn resources(&self) -> &BTreeMap<String, ResourceInfo> {
        &self.resources
    }

    pub fn get(&self, resource_path: &str) -> Option<&ResourceInfo> {
        self.resources.get(resource_path)
    }

    /// First output resource (in resource-path order) with the given
    /// canonical path. Excluded resources such as `README.md` never match.
    pub fn find_by_canonical(&self, canonical: &str) -> Option<(&str, &ResourceInfo)> {
        self.resources
            .iter()
            .find(|(_, r)| r.include_in_output && r.canonical_path == canonical)
            .map(|(k, r)| (k.as_str(), r))
    }

    /// Config from the last successful rebuild.
    pub fn config(&self) -> Option<&SiteConfig> {
        self.config.as_ref()
    }

    pub fn sidebar(&self) -> &SidebarNode {
        &self.sidebar
    }

    /// Resource path of the live manifest.
    pub fn manifest_path(&self) -> Option<&str> {
        self.manifest_path.as_deref()
    }

    /// Run the six-step rebuild pass over the current file list.
    ///
    /// On error nothing is committed and the registry keeps its prior state.
    pub fn rebuild(
        &mut self,
        files: &[InputFileInfo],
        renderer: &dyn Renderer,
    ) -> Result<RebuildSummary, BuildError> {
        let mut next = self.clone();
        let summary = next.run_pass(files, renderer)?;
        *self = next;
        info!(
            pages = summary.pages,
            static_files = summary.static_files,
            evicted = summary.evicted,
            manifest = %summary.manifest_path,
            "rebuild complete"
        );
        Ok(summary)
    }

    fn run_pass(
        &mut self,
        files: &[InputFileInfo],
        renderer: &dyn Renderer,
    ) -> Result<RebuildSummary, BuildError> {
        let evicted = self.register_inputs(files)?;
        let config = self.read_config()?;

        let manifest_path = artifacts::apply_artifacts(
            &mut self.resources,
            self.manifest_path.as_deref(),
            &config,
            self.local_origin.as_deref(),
        );
        debug!(manifest = %manifest_path, "artifacts generated");
        self.manifest_path = Some(manifest_path.clone());

        self.load_pages()?;
        self.sidebar = compute_sidebar(&self.sidebar_items());
        self.render_pages(&config, &manifest_path, renderer);
        self.config = Some(config);

        let pages = self.resources.values().filter(|r| r.is_markdown()).count();
        let static_files = self
            .resources
            .values()
            .filter(|r| r.input_path.is_some() && !r.is_markdown())
            .count();
        Ok(RebuildSummary {
            pages,
            static_files,
            evicted,
            manifest_path,
        })
    }

    /// Step 1. Returns the number of evicted entries.
    fn register_inputs(&mut self, files: &[InputFileInfo]) -> Result<usize, BuildError> {
        let mut live = HashSet::with_capacity(files.len());

        for file in files {
            let resource_path = paths::resource_path(&file.path, &self.root)?;
            if !live.insert(resource_path.clone()) {
                warn!(
                    path = %file.path.display(),
                    resource = %resource_path,
                    "input maps to an already registered resource, ignoring"
                );
                continue;
            }
            if self.resources.contains_key(&resource_path) {
                continue;
            }
            let extension = paths::extension_of(&file.path);
            let info = ResourceInfo {
                input_path: Some(file.path.clone()),
                include_in_output: paths::include_in_output(&resource_path, &extension),
                canonical_path: paths::canonical_path(&resource_path),
                content_repo_path: paths::content_repo_path(&file.path, &self.root)?,
                extension,
                page: None,
                output_text: None,
            };
            debug!(resource = %resource_path, "registered");
            self.resources.insert(resource_path, info);
        }

        let manifest = self.manifest_path.clone();
        let before = self.resources.len();
        self.resources.retain(|path, _| {
            live.contains(path)
                || path == ROBOTS_PATH
                || path == SITEMAP_PATH
                || manifest.as_deref() == Some(path.as_str())
        });
        let evicted = before - self.resources.len();
        if evicted > 0 {
            debug!(count = evicted, "evicted stale resources");
        }
        Ok(evicted)
    }

    /// Step 2.
    fn read_config(&self) -> Result<SiteConfig, BuildError> {
        let path = CONFIG_FILE_NAMES
            .iter()
            .find_map(|name| {
                self.resources
                    .get(&format!("/{name}"))
                    .and_then(|r| r.input_path.clone())
            })
            .ok_or(BuildError::ConfigMissing)?;
        config::load_config(&path).map_err(|source| BuildError::Config { path, source })
    }

    /// Step 4.
    fn load_pages(&mut self) -> Result<(), BuildError> {
        self.resources
            .par_iter_mut()
            .filter(|(_, r)| r.is_markdown())
            .try_for_each(|(_, resource)| -> Result<(), BuildError> {
                let Some(input) = &resource.input_path else {
                    return Ok(());
                };
                let page = page::load_page(input).map_err(|e| match e {
                    PageError::Io(source) => BuildError::Io {
                        path: input.clone(),
                        source,
                    },
                    PageError::FrontMatter(source) => BuildError::FrontMatter {
                        path: input.clone(),
                        source,
                    },
                })?;
                resource.page = Some(page);
                Ok(())
            })
    }

    /// Step 5 input: every included markdown page in resource-path order.
    fn sidebar_items(&self) -> Vec<SidebarItem> {
        self.resources
            .values()
            .filter(|r| r.is_markdown() && r.include_in_output)
            .filter_map(|r| {
                let page = r.page.as_ref()?;
                let fm = &page.frontmatter;
                Some(SidebarItem {
                    title: page.title_resolved.clone(),
                    path: sidebar_path(&r.canonical_path),
                    order: fm.order,
                    hidden: fm.hidden.unwrap_or(false),
                    hide_children: fm.hide_children.unwrap_or(false),
                })
            })
            .collect()
    }

    /// Step 6.
    fn render_pages(&mut self, config: &SiteConfig, manifest_path: &str, renderer: &dyn Renderer) {
        let sidebar = &self.sidebar;
        let local_origin = self.local_origin.as_deref();
        self.resources
            .par_iter_mut()
            .filter(|(_, r)| r.is_markdown())
            .for_each(|(_, resource)| {
                let Some(page) = &resource.page else {
                    return;
                };
                let html = renderer.render(&RenderContext {
                    markdown: &page.markdown,
                    page,
                    canonical_path: &resource.canonical_path,
                    content_repo_path: &resource.content_repo_path,
                    config,
                    sidebar,
                    manifest_path,
                    local_origin,
                });
                resource.output_text = Some(html);
            });
    }
}
