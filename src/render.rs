//! Page rendering.
//!
//! The rebuild pass hands every markdown page to a [`Renderer`] and stores the
//! returned document as the resource's output text. [`HtmlRenderer`] is the
//! stock implementation; callers embedding the engine can supply their own.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating and
//! `pulldown-cmark` for the page body. All interpolation is auto-escaped;
//! only the converted markdown is inserted pre-escaped.

use crate::config::SiteConfig;
use crate::sidebar::sidebar_path;
use crate::types::{Page, SidebarNode};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};

/// Everything a renderer sees for one page.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub markdown: &'a str,
    pub page: &'a Page,
    pub canonical_path: &'a str,
    /// Source path relative to the content root, for edit links.
    pub content_repo_path: &'a str,
    pub config: &'a SiteConfig,
    pub sidebar: &'a SidebarNode,
    /// Resource path of the live web app manifest.
    pub manifest_path: &'a str,
    /// Origin override used while serving locally.
    pub local_origin: Option<&'a str>,
}

/// Turns one page into a complete HTML document.
pub trait Renderer: Send + Sync {
    fn render(&self, ctx: &RenderContext<'_>) -> String;
}

/// Default renderer: sidebar, article, and edit link in a plain document.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> String {
        render_document(ctx).into_string()
    }
}

/// Convert markdown to an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_HEADING_ATTRIBUTES;
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    md_html::push_html(&mut out, parser);
    out
}

fn page_title(ctx: &RenderContext<'_>) -> String {
    let site = &ctx.config.site_metadata.title;
    if ctx.canonical_path == "/" || ctx.page.title_resolved == *site {
        site.clone()
    } else {
        format!("{} | {}", ctx.page.title_resolved, site)
    }
}

fn edit_url(ctx: &RenderContext<'_>) -> Option<String> {
    let meta = &ctx.config.site_metadata;
    let repo = meta.repository.as_ref()?;
    Some(format!(
        "https://github.com/{repo}/blob/{}{}",
        meta.edit_branch, ctx.content_repo_path
    ))
}

fn render_document(ctx: &RenderContext<'_>) -> Markup {
    let meta = &ctx.config.site_metadata;
    let origin = ctx
        .local_origin
        .or_else(|| ctx.config.public_origin());
    let summary = &ctx.page.frontmatter.summary;
    let description = if summary.is_empty() {
        &meta.description
    } else {
        summary
    };
    let body_html = markdown_to_html(ctx.markdown);
    let current = sidebar_path(ctx.canonical_path);

    html! {
        (DOCTYPE)
        html lang=(meta.lang) dir=(meta.dir) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (page_title(ctx)) }
                meta name="description" content=(description);
                @if let Some(color) = &meta.theme_color {
                    meta name="theme-color" content=(color);
                }
                link rel="manifest" href=(ctx.manifest_path);
                @if let Some(icon) = &meta.icon {
                    link rel="icon" href=(icon);
                }
                @if let Some(origin) = origin {
                    link rel="canonical" href={ (origin) (ctx.canonical_path) };
                }
                @if let Some(accent) = &ctx.config.theme.accent_color {
                    style { ":root { --accent: " (accent) "; }" }
                }
            }
            body data-page-type=(ctx.page.frontmatter.page_type) data-search=[ctx.config.search.enabled.then_some("on")] {
                header.site-header {
                    a.site-title href="/" { (ctx.config.product) }
                }
                aside.sidebar {
                    nav {
                        (render_sidebar(ctx.sidebar, &current))
                    }
                }
                main {
                    article {
                        (PreEscaped(body_html))
                    }
                    @if let Some(url) = edit_url(ctx) {
                        footer.page-footer {
                            a.edit-link href=(url) rel="noopener" { "Edit this page" }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the sidebar tree, marking the entry for `current_path`.
pub fn render_sidebar(root: &SidebarNode, current_path: &str) -> Markup {
    html! {
        ul {
            @if !root.title.is_empty() {
                li class=[(root.path == current_path).then_some("current")] {
                    a href="/" { (root.title) }
                }
            }
            @for child in &root.children {
                (render_sidebar_item(child, current_path))
            }
        }
    }
}

fn render_sidebar_item(item: &SidebarNode, current_path: &str) -> Markup {
    let is_current = item.path == current_path;
    html! {
        li class=[is_current.then_some("current")] {
            a href=(item.path) { (item.title) }
            @if !item.children.is_empty() {
                ul {
                    @for child in &item.children {
                        (render_sidebar_item(child, current_path))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::page::parse_page;

    fn config() -> SiteConfig {
        parse_config(
            r##"{
                "product": "Acme",
                "siteMetadata": {
                    "title": "Acme Docs",
                    "description": "Site description",
                    "origin": "https://docs.acme.dev",
                    "themeColor": "#101010",
                    "repository": "acme/docs"
                }
            }"##,
        )
        .unwrap()
    }

    fn sidebar() -> SidebarNode {
        SidebarNode {
            title: "Home".to_string(),
            path: "/".to_string(),
            children: vec![SidebarNode {
                title: "Guide".to_string(),
                path: "/guide".to_string(),
                children: vec![],
            }],
        }
    }

    fn render(page: &Page, canonical: &str, local_origin: Option<&str>) -> String {
        let config = config();
        let sidebar = sidebar();
        HtmlRenderer.render(&RenderContext {
            markdown: &page.markdown,
            page,
            canonical_path: canonical,
            content_repo_path: "/guide.md",
            config: &config,
            sidebar: &sidebar,
            manifest_path: "/app.abc.webmanifest",
            local_origin,
        })
    }

    #[test]
    fn document_has_doctype_and_title() {
        let page = parse_page("# Guide\n\nHello **world**.", "guide").unwrap();
        let html = render(&page, "/guide", None);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Guide | Acme Docs</title>"));
        assert!(html.contains("<strong>world</strong>"));
    }

    #[test]
    fn home_page_uses_site_title() {
        let page = parse_page("# Welcome", "index").unwrap();
        let html = render(&page, "/", None);
        assert!(html.contains("<title>Acme Docs</title>"));
    }

    #[test]
    fn head_links_manifest_and_canonical() {
        let page = parse_page("# Guide", "guide").unwrap();
        let html = render(&page, "/guide", None);
        assert!(html.contains(r#"rel="manifest" href="/app.abc.webmanifest""#));
        assert!(html.contains(r#"href="https://docs.acme.dev/guide""#));
        assert!(html.contains(r##"content="#101010""##));
    }

    #[test]
    fn local_origin_used_for_canonical() {
        let page = parse_page("# Guide", "guide").unwrap();
        let html = render(&page, "/guide", Some("http://127.0.0.1:8080"));
        assert!(html.contains(r#"href="http://127.0.0.1:8080/guide""#));
    }

    #[test]
    fn summary_overrides_description() {
        let page = parse_page("---\nsummary: Page summary\n---\n# G", "g").unwrap();
        let html = render(&page, "/guide", None);
        assert!(html.contains(r#"content="Page summary""#));
        assert!(!html.contains("Site description"));
    }

    #[test]
    fn sidebar_marks_current_page() {
        let page = parse_page("# Guide", "guide").unwrap();
        let html = render(&page, "/guide", None);
        assert!(html.contains(r#"<li class="current"><a href="/guide">Guide</a>"#));
    }

    #[test]
    fn edit_link_points_at_repository() {
        let page = parse_page("# Guide", "guide").unwrap();
        let html = render(&page, "/guide", None);
        assert!(html.contains("https://github.com/acme/docs/blob/main/guide.md"));
    }

    #[test]
    fn titles_are_escaped() {
        let page = parse_page("---\ntitle: <script>x</script>\n---\n", "g").unwrap();
        let html = render(&page, "/guide", None);
        assert!(!html.contains("<script>x"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn search_flag_exposed_on_body() {
        let page = parse_page("# Guide", "guide").unwrap();
        let html = render(&page, "/guide", None);
        assert!(!html.contains("data-search"));
        assert!(html.contains(r#"data-page-type="document""#));
    }

    #[test]
    fn markdown_tables_enabled() {
        let html = markdown_to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }
}
