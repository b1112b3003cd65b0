//! End-to-end: list → rebuild → write → route, through the public API.

use docsite::artifacts::is_manifest_path;
use docsite::files::list_files;
use docsite::registry::ResourceRegistry;
use docsite::render::HtmlRenderer;
use docsite::router;
use docsite::writer::write_output;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CONFIG: &str = r##"{
    "product": "Acme",
    "siteMetadata": {
        "title": "Acme Docs",
        "description": "Everything about Acme",
        "origin": "https://docs.acme.dev",
        "themeColor": "#0f172a",
        "repository": "acme/docs"
    }
}"##;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn content_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "site.json", CONFIG);
    write(root, ".siteignore", "drafts/\n*.tmp\n");
    write(root, "index.md", "# Welcome\n\nStart here.");
    write(root, "404.md", "---\nhidden: true\n---\n# Page not found");
    write(root, "guide/index.md", "---\ntitle: Guide\norder: 1\n---\nOverview.");
    write(root, "guide/install.md", "---\nsummary: Get it running\n---\n# Install");
    write(root, "guide/deploy.md", "# Deploy");
    write(root, "drafts/wip.md", "# WIP");
    write(root, "scratch.tmp", "junk");
    write(root, "README.md", "# Repo readme");
    write(root, "img/logo.png", "\u{89}PNG");
    tmp
}

fn build(root: &Path) -> ResourceRegistry {
    let mut registry = ResourceRegistry::new(root);
    registry
        .rebuild(&list_files(root).unwrap(), &HtmlRenderer)
        .unwrap();
    registry
}

#[test]
fn build_write_and_route() {
    let content = content_tree();
    let registry = build(content.path());

    assert!(registry.get("/drafts/wip.html").is_none());
    assert!(registry.get("/scratch.tmp").is_none());

    let sidebar = registry.sidebar();
    assert_eq!(sidebar.title, "Welcome");
    let top: Vec<&str> = sidebar.children.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(top, vec!["Guide"]);
    let guide: Vec<&str> = sidebar.children[0]
        .children
        .iter()
        .map(|c| c.title.as_str())
        .collect();
    assert_eq!(guide, vec!["Deploy", "Install"]);

    let out = TempDir::new().unwrap();
    let dest = out.path().join("dist");
    let summary = write_output(&registry, &dest).unwrap();
    assert_eq!(summary.copied, 1);

    for rel in [
        "index.html",
        "404.html",
        "guide/index.html",
        "guide/install.html",
        "img/logo.png",
        "robots.txt",
        "sitemap.xml",
    ] {
        assert!(dest.join(rel).is_file(), "missing {rel}");
    }
    assert!(!dest.join("README.html").exists());
    assert!(!dest.join("site.json").exists());

    let manifests: Vec<_> = fs::read_dir(&dest)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| is_manifest_path(&format!("/{name}")))
        .collect();
    assert_eq!(manifests.len(), 1);

    let sitemap = fs::read_to_string(dest.join("sitemap.xml")).unwrap();
    assert!(sitemap.contains("<loc>https://docs.acme.dev/</loc>"));
    assert!(sitemap.contains("<loc>https://docs.acme.dev/guide/</loc>"));
    assert!(sitemap.contains("<loc>https://docs.acme.dev/guide/install</loc>"));
    assert!(!sitemap.contains("/404"));

    let install = fs::read_to_string(dest.join("guide/install.html")).unwrap();
    assert!(install.contains("<title>Install | Acme Docs</title>"));
    assert!(install.contains(r#"content="Get it running""#));
    assert!(install.contains("https://github.com/acme/docs/blob/main/guide/install.md"));

    let redirect = router::handle(&registry, "/guide/install.html").unwrap();
    assert_eq!(redirect.status, 308);
    assert_eq!(redirect.location.as_deref(), Some("/guide/install"));

    let page = router::handle(&registry, "/guide/install").unwrap();
    assert_eq!(page.status, 200);
    assert_eq!(page.body, install.as_bytes());

    let missing = router::handle(&registry, "/does/not/exist").unwrap();
    assert_eq!(missing.status, 404);
    assert!(String::from_utf8_lossy(&missing.body).contains("Page not found"));
}

#[test]
fn content_edits_flow_through_rebuild() {
    let content = content_tree();
    let root = content.path();
    let mut registry = build(root);
    let first_manifest = registry.manifest_path().unwrap().to_string();

    fs::remove_file(root.join("guide/deploy.md")).unwrap();
    write(root, "guide/upgrade.md", "# Upgrade");
    let summary = registry
        .rebuild(&list_files(root).unwrap(), &HtmlRenderer)
        .unwrap();

    assert_eq!(summary.evicted, 1);
    assert_eq!(summary.manifest_path, first_manifest);
    assert!(registry.get("/guide/deploy.html").is_none());
    assert_eq!(
        router::handle(&registry, "/guide/deploy").unwrap().status,
        404
    );
    assert_eq!(
        router::handle(&registry, "/guide/upgrade").unwrap().status,
        200
    );
}

#[test]
fn broken_front_matter_reports_file() {
    let content = content_tree();
    write(content.path(), "guide/bad.md", "---\norder: first\n---\n# Bad");
    let mut registry = ResourceRegistry::new(content.path());
    let err = registry
        .rebuild(&list_files(content.path()).unwrap(), &HtmlRenderer)
        .unwrap_err()
        .to_string();
    assert!(err.contains("bad.md"), "{err}");
    assert!(err.contains("first"), "{err}");
}
