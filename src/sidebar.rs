//! Navigation tree built from visible pages.
//!
//! Each page contributes a [`SidebarItem`] keyed by its canonical path. Items
//! are inserted by walking `/`-separated segments, creating intermediate
//! nodes as needed (titled by their segment until a page claims them):
//!
//! ```text
//! /                 Home
//! ├── /guide        Guide
//! │   ├── /guide/install
//! │   └── /guide/deploy
//! └── /reference    reference   ← no page for /reference yet
//!     └── /reference/cli
//! ```
//!
//! After insertion a pruning pass removes hidden branches:
//!
//! - a node with `hideChildren` loses every child, hidden or not, and its
//!   subtree is not visited further;
//! - otherwise each child marked `hidden` is dropped along with everything
//!   under it, and the remaining children are pruned recursively.
//!
//! Children keep insertion order. A page's `order` is carried on the item but
//! does not sort anything.

use crate::types::SidebarNode;

/// One page's contribution to the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarItem {
    pub title: String,
    pub path: String,
    pub order: Option<u32>,
    pub hidden: bool,
    pub hide_children: bool,
}

/// Sidebar path for a canonical path: trailing `/` stripped, except for `/`.
pub fn sidebar_path(canonical: &str) -> String {
    if canonical == "/" {
        return canonical.to_string();
    }
    canonical.trim_end_matches('/').to_string()
}

#[derive(Debug)]
struct Entry {
    title: String,
    path: String,
    hidden: bool,
    hide_children: bool,
    children: Vec<Entry>,
}

impl Entry {
    fn new(title: &str, path: &str) -> Self {
        Self {
            title: title.to_string(),
            path: path.to_string(),
            hidden: false,
            hide_children: false,
            children: Vec::new(),
        }
    }

    fn child_mut(&mut self, segment: &str, path: &str) -> &mut Entry {
        let idx = match self.children.iter().position(|c| c.path == path) {
            Some(idx) => idx,
            None => {
                self.children.push(Entry::new(segment, path));
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }

    fn into_node(self) -> SidebarNode {
        SidebarNode {
            title: self.title,
            path: self.path,
            children: self.children.into_iter().map(Entry::into_node).collect(),
        }
    }
}

/// Build the pruned sidebar tree from page items.
pub fn compute_sidebar(items: &[SidebarItem]) -> SidebarNode {
    let mut root = Entry::new("", "/");

    for item in items {
        let mut node = &mut root;
        let mut path = String::new();
        for segment in item.path.split('/').filter(|s| !s.is_empty()) {
            path.push('/');
            path.push_str(segment);
            node = node.child_mut(segment, &path);
        }
        node.title = item.title.clone();
        node.hidden = item.hidden;
        node.hide_children = item.hide_children;
    }

    trim_hidden(&mut root);
    root.into_node()
}

fn trim_hidden(entry: &mut Entry) {
    if entry.hide_children {
        entry.children.clear();
        return;
    }
    entry.children.retain(|c| !c.hidden);
    for child in &mut entry.children {
        trim_hidden(child);
    }
}
