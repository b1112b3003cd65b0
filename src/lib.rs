//! # docsite
//!
//! A minimal build-and-serve engine for markdown documentation sites. A
//! content directory of markdown pages, static files, and one JSON config
//! becomes a site with a navigation sidebar, a content-addressed web app
//! manifest, `robots.txt`, and a sitemap.
//!
//! # Architecture: One Rebuild Pass, Two Consumers
//!
//! Everything funnels through [`registry::ResourceRegistry::rebuild`], which
//! turns the current file list into a complete map of resources:
//!
//! ```text
//!                       ┌──────────────► writer   (build: dist/)
//! content/ ─► files ─► registry
//!                       └──────────────► router   (serve: HTTP)
//! ```
//!
//! The registry is the only stateful piece. The writer and the router are
//! plain functions over a built registry, so the same pass backs one-shot
//! builds and the development server.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`files`] | Lists content files, honoring `.git` and `.siteignore` |
//! | [`paths`] | Input → resource, canonical, and output paths; content types |
//! | [`page`] | Front matter parsing and title resolution |
//! | [`sidebar`] | Navigation tree from visible pages |
//! | [`artifacts`] | Web app manifest, `robots.txt`, `sitemap.xml` |
//! | [`config`] | `site.json` / `docs.json` loading and validation |
//! | [`render`] | The `Renderer` seam and the default maud-based HTML renderer |
//! | [`registry`] | The six-step rebuild pass |
//! | [`writer`] | Writes a built registry to an output directory |
//! | [`router`] | Maps request paths to responses: redirects, pages, 404 |
//! | [`serve`] | HTTP transport, file watching, snapshot publication |
//! | [`output`] | CLI output formatting |
//! | [`types`] | Shared data model |
//!
//! # Design Decisions
//!
//! ## Canonical URLs Without Extensions
//!
//! `docs/setup.md` is written to `docs/setup.html` but addressed as
//! `/docs/setup`; `docs/index.md` is addressed as `/docs/`. The router
//! redirects the `.html` and `/index` forms with a permanent 308 so every page
//! has exactly one URL, which is also the URL listed in the sitemap.
//!
//! ## Content-Addressed Manifest
//!
//! The manifest's file name embeds the SHA-256 of its content. Browsers and
//! CDNs can cache it forever; a config change produces a new name, and the
//! old entry is dropped in the same pass so exactly one manifest is live.
//!
//! ## Snapshots Instead of Locks
//!
//! The dev server never lets a request observe a half-finished rebuild. A
//! rebuild runs on a private copy of the registry and is published with a
//! single atomic pointer swap (`arc-swap`). Requests in flight keep reading
//! the snapshot they loaded. A failed rebuild publishes nothing.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): malformed markup
//! is a compile error, interpolation is escaped, and there is no template
//! directory to ship. Sites that need a different shell implement
//! [`render::Renderer`].

pub mod artifacts;
pub mod config;
pub mod files;
pub mod output;
pub mod page;
pub mod paths;
pub mod registry;
pub mod render;
pub mod router;
pub mod serve;
pub mod sidebar;
pub mod types;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_helpers;
