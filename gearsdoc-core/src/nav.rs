//! Navigation tree.
//!
//! Mirrors the directory layout of every documented file and, for any page
//! being rendered, produces the sidebar entries with page-relative URLs.
//! Rendering also yields the page's relative URL map, which the link
//! resolver and the client-side search use as their address book.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::with_html_extension;

/// Canonical relative pathname → URL to reach it from the current page.
pub type RelativeUrls = BTreeMap<String, String>;

/// Directory that holds the per-extension icons, relative to the output root.
pub const ICON_DIR: &str = "assets/icons";

/// A documented page in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLeaf {
    /// Canonical relative pathname of the source, e.g. `lib/Foo.php`.
    pub relative_pathname: String,
    /// Original extension of the source, used for the icon.
    pub extension: String,
}

impl NavLeaf {
    pub fn new(relative_pathname: &str, extension: &str) -> Self {
        Self {
            relative_pathname: relative_pathname.to_string(),
            extension: extension.to_string(),
        }
    }

    fn file_name(&self) -> &str {
        self.relative_pathname
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_pathname)
    }

    fn dir_segments(&self) -> Vec<&str> {
        let mut segments: Vec<&str> = self.relative_pathname.split('/').collect();
        segments.pop();
        segments
    }
}

/// One node of the tree. Children keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavNode {
    Folder { name: String, children: Vec<NavNode> },
    Leaf(NavLeaf),
}

/// A rendered sidebar entry, serialised in the shape the client tree widget expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NavItem {
    Folder {
        title: String,
        folder: bool,
        expanded: bool,
        children: Vec<NavItem>,
    },
    Leaf {
        title: String,
        href: String,
        active: bool,
        focus: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
    },
}

impl NavItem {
    pub fn is_folder(&self) -> bool {
        matches!(self, NavItem::Folder { .. })
    }
}

/// Output of rendering the tree for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedNav {
    pub items: Vec<NavItem>,
    pub relative_urls: RelativeUrls,
}

/// The hierarchical structure of all documented pages.
#[derive(Debug, Clone, Default)]
pub struct NavTree {
    root: Vec<NavNode>,
}

impl NavTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a leaf under `relative_path` (its slash-separated directory).
    ///
    /// Root files (empty `relative_path`) attach directly at the root rather
    /// than under an empty-named folder.
    pub fn add_file(&mut self, relative_path: &str, leaf: NavLeaf) {
        let mut level = &mut self.root;
        if !relative_path.is_empty() {
            for segment in relative_path.split('/') {
                let idx = match level
                    .iter()
                    .position(|n| matches!(n, NavNode::Folder { name, .. } if name == segment))
                {
                    Some(idx) => idx,
                    None => {
                        level.push(NavNode::Folder {
                            name: segment.to_string(),
                            children: Vec::new(),
                        });
                        level.len() - 1
                    }
                };
                level = match &mut level[idx] {
                    NavNode::Folder { children, .. } => children,
                    NavNode::Leaf(_) => unreachable!("position() only matches folders"),
                };
            }
        }
        level.push(NavNode::Leaf(leaf));
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Render the tree as seen from `current` (a canonical relative pathname).
    ///
    /// Pure apart from the returned relative URL map, which is built fresh
    /// for every call.
    pub fn render(&self, current: &str) -> RenderedNav {
        let page = CurrentPage::new(current);
        let mut relative_urls = RelativeUrls::new();
        let items = render_level(&self.root, &page, &mut relative_urls);
        RenderedNav {
            items,
            relative_urls,
        }
    }
}

struct CurrentPage<'a> {
    pathname: &'a str,
    dir_segments: Vec<&'a str>,
    icon_prefix: String,
}

impl<'a> CurrentPage<'a> {
    fn new(pathname: &'a str) -> Self {
        let mut segments: Vec<&str> = pathname.split('/').collect();
        let depth = segments.len() - 1;
        segments.pop();
        Self {
            pathname,
            dir_segments: segments,
            icon_prefix: format!("{}{}/", "../".repeat(depth), ICON_DIR),
        }
    }
}

fn render_level(nodes: &[NavNode], page: &CurrentPage, urls: &mut RelativeUrls) -> Vec<NavItem> {
    let items: Vec<NavItem> = nodes
        .iter()
        .map(|node| match node {
            NavNode::Folder { name, children } => NavItem::Folder {
                title: name.clone(),
                folder: true,
                expanded: page.dir_segments.contains(&name.as_str()),
                children: render_level(children, page, urls),
            },
            NavNode::Leaf(leaf) => render_leaf(leaf, page, urls),
        })
        .collect();

    // Folders first; order within each group is preserved.
    let (mut folders, leaves): (Vec<_>, Vec<_>) = items.into_iter().partition(NavItem::is_folder);
    folders.extend(leaves);
    folders
}

fn render_leaf(leaf: &NavLeaf, page: &CurrentPage, urls: &mut RelativeUrls) -> NavItem {
    let active = leaf.relative_pathname == page.pathname;
    let href = if active {
        "#".to_string()
    } else {
        relative_url(&page.dir_segments, leaf)
    };
    urls.insert(leaf.relative_pathname.clone(), href.clone());

    NavItem::Leaf {
        title: leaf.file_name().to_string(),
        href,
        active,
        focus: active,
        icon: icon_for(&leaf.extension).map(|icon| format!("{}{icon}", page.icon_prefix)),
    }
}

/// URL of `leaf` as seen from a page in directory `from`.
///
/// Walks both directory lists from the root, climbs out of every segment of
/// `from` past the first mismatch, then descends into what is left of the
/// leaf's directory.
fn relative_url(from: &[&str], leaf: &NavLeaf) -> String {
    let to = leaf.dir_segments();
    let shared = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut url = "../".repeat(from.len() - shared);
    for segment in &to[shared..] {
        url.push_str(segment);
        url.push('/');
    }
    url.push_str(leaf.file_name());
    with_html_extension(&url)
}

/// Icon file for a source extension; `None` for unknown extensions.
pub fn icon_for(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "php" => Some("php.svg"),
        "js" | "mjs" | "ts" => Some("js.svg"),
        "css" | "less" | "sccs" | "scss" | "sass" => Some("css.svg"),
        "md" | "markdown" => Some("md.svg"),
        "html" | "htm" => Some("html.svg"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tree(paths: &[&str]) -> NavTree {
        let mut tree = NavTree::new();
        for path in paths {
            let (dir, _) = path.rsplit_once('/').unwrap_or(("", path));
            let ext = path.rsplit('.').next().unwrap_or("");
            tree.add_file(dir, NavLeaf::new(path, ext));
        }
        tree
    }

    fn href_of<'a>(items: &'a [NavItem], title: &str) -> Option<&'a str> {
        for item in items {
            match item {
                NavItem::Leaf { title: t, href, .. } if t == title => return Some(href),
                NavItem::Folder { children, .. } => {
                    if let Some(h) = href_of(children, title) {
                        return Some(h);
                    }
                }
                _ => {}
            }
        }
        None
    }

    #[test]
    fn root_files_are_not_wrapped_in_a_folder() {
        let t = tree(&["a.php", "b/c.php"]);
        let nav = t.render("a.php");
        assert_eq!(nav.items.len(), 2);
        assert!(nav.items[0].is_folder());
        assert!(matches!(&nav.items[1], NavItem::Leaf { title, .. } if title == "a.php"));
    }

    #[test]
    fn active_leaf_gets_hash() {
        let t = tree(&["a.php", "b/c.php"]);
        let nav = t.render("b/c.php");
        assert_eq!(nav.relative_urls["b/c.php"], "#");
        assert_eq!(nav.relative_urls["a.php"], "../a.html");
        let active: Vec<_> = nav
            .relative_urls
            .iter()
            .filter(|(_, url)| url.as_str() == "#")
            .map(|(path, _)| path.clone())
            .collect();
        assert_eq!(active, vec!["b/c.php".to_string()]);
        assert!(!t.is_empty());
        assert!(NavTree::new().is_empty());
    }

    #[test]
    fn urls_from_root_page_are_full_paths() {
        let t = tree(&["a.php", "x/y/z.js"]);
        let nav = t.render("a.php");
        assert_eq!(nav.relative_urls["x/y/z.js"], "x/y/z.html");
    }

    #[test]
    fn sibling_directories_climb_once() {
        let t = tree(&["a/b/c.php", "a/x.php", "a/b/d/e.php", "q/r.php"]);
        let nav = t.render("a/b/c.php");
        assert_eq!(nav.relative_urls["a/x.php"], "../x.html");
        assert_eq!(nav.relative_urls["a/b/d/e.php"], "d/e.html");
        assert_eq!(nav.relative_urls["q/r.php"], "../../q/r.html");
    }

    #[test]
    fn substring_directory_names_are_not_treated_as_nested() {
        let t = tree(&["lib/a.php", "mylib/b.php"]);
        let nav = t.render("lib/a.php");
        assert_eq!(nav.relative_urls["mylib/b.php"], "../mylib/b.html");
    }

    #[test]
    fn folders_expand_along_current_path() {
        let t = tree(&["a/b/c.php", "z/y.php"]);
        let nav = t.render("a/b/c.php");
        match &nav.items[0] {
            NavItem::Folder { title, expanded, children, .. } => {
                assert_eq!(title, "a");
                assert!(*expanded);
                assert!(matches!(&children[0], NavItem::Folder { expanded: true, .. }));
            }
            other => panic!("Expected folder, got {other:?}"),
        }
        assert!(matches!(&nav.items[1], NavItem::Folder { expanded: false, .. }));
    }

    #[test]
    fn folders_precede_leaves_stably() {
        let t = tree(&["one.php", "dir1/x.php", "two.php", "dir2/y.php"]);
        let nav = t.render("one.php");
        let titles: Vec<&str> = nav
            .items
            .iter()
            .map(|i| match i {
                NavItem::Folder { title, .. } | NavItem::Leaf { title, .. } => title.as_str(),
            })
            .collect();
        assert_eq!(titles, vec!["dir1", "dir2", "one.php", "two.php"]);
    }

    #[test]
    fn icons_are_page_relative() {
        let t = tree(&["a.php", "b/c.rs"]);
        let nav = t.render("b/c.rs");
        match &nav.items[1] {
            NavItem::Leaf { icon, .. } => assert_eq!(icon.as_deref(), Some("../assets/icons/php.svg")),
            other => panic!("Expected leaf, got {other:?}"),
        }
        assert_eq!(href_of(&nav.items, "c.rs"), Some("#"));
        let json = serde_json::to_string(&nav.items[0]).unwrap();
        assert!(!json.contains("icon"), "unknown extension should have no icon: {json}");
    }

    #[test]
    fn serialises_for_tree_widget() {
        let t = tree(&["d/a.php"]);
        let json = serde_json::to_value(t.render("x.php").items).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "title": "d",
                "folder": true,
                "expanded": false,
                "children": [{
                    "title": "a.php",
                    "href": "d/a.html",
                    "active": false,
                    "focus": false,
                    "icon": "assets/icons/php.svg"
                }]
            }])
        );
    }
}
