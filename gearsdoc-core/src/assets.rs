//! Static site assets.
//!
//! The stylesheet and client script are embedded in the binary and written
//! under content-hashed names so browsers never serve a stale copy after a
//! rebuild. Page templates only need [`AssetBundle::stylesheet`] and
//! [`AssetBundle::script`], which are known before any page is rendered.

use sha2::{Digest, Sha256};

use crate::nav::ICON_DIR;

/// Directory of the generated assets, relative to the output root.
pub const ASSET_DIR: &str = "assets";

/// A file to be written below the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Slash-separated path relative to the output root.
    pub path: String,
    pub contents: Vec<u8>,
}

/// Every static file of a generated site.
#[derive(Debug, Clone)]
pub struct AssetBundle {
    stylesheet: String,
    script: String,
    files: Vec<Asset>,
}

impl AssetBundle {
    pub fn new() -> Self {
        let stylesheet = format!("{ASSET_DIR}/gearsdoc.{}.css", fingerprint(GEARSDOC_CSS.as_bytes()));
        let script = format!("{ASSET_DIR}/gearsdoc.{}.js", fingerprint(GEARSDOC_JS.as_bytes()));

        let mut files = vec![
            Asset {
                path: stylesheet.clone(),
                contents: GEARSDOC_CSS.as_bytes().to_vec(),
            },
            Asset {
                path: script.clone(),
                contents: GEARSDOC_JS.as_bytes().to_vec(),
            },
        ];
        for (name, svg) in ICONS {
            files.push(Asset {
                path: format!("{ICON_DIR}/{name}"),
                contents: svg.as_bytes().to_vec(),
            });
        }

        Self {
            stylesheet,
            script,
            files,
        }
    }

    /// Output-relative path of the stylesheet.
    pub fn stylesheet(&self) -> &str {
        &self.stylesheet
    }

    /// Output-relative path of the client script.
    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn files(&self) -> &[Asset] {
        &self.files
    }
}

impl Default for AssetBundle {
    fn default() -> Self {
        Self::new()
    }
}

/// First 10 hex characters of the SHA-256 of `contents`.
pub fn fingerprint(contents: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let digest = format!("{:x}", hasher.finalize());
    digest[..10].to_string()
}

macro_rules! icon_svg {
    ($color:literal, $label:literal) => {
        concat!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16" viewBox="0 0 16 16">"##,
            r##"<path d="M3 1h7l3 3v11H3z" fill="none" stroke=""##,
            $color,
            r##"" stroke-width="1.2"/>"##,
            r##"<text x="8" y="12" font-size="4.5" font-family="monospace" text-anchor="middle" fill=""##,
            $color,
            r##"">"##,
            $label,
            "</text></svg>\n"
        )
    };
}

const ICONS: [(&str, &str); 5] = [
    ("php.svg", icon_svg!("#8892bf", "PHP")),
    ("js.svg", icon_svg!("#e8c93c", "JS")),
    ("css.svg", icon_svg!("#3b82f6", "CSS")),
    ("md.svg", icon_svg!("#8888a0", "MD")),
    ("html.svg", icon_svg!("#e3703c", "HTM")),
];

/// Site stylesheet.
const GEARSDOC_CSS: &str = r#":root {
    --bg: #0a0a0f;
    --bg-card: #12121a;
    --bg-hover: #1a1a26;
    --border: #2a2a3a;
    --border-subtle: #1e1e2e;
    --text: #e8e8f0;
    --text-dim: #8888a0;
    --text-muted: #5a5a72;
    --accent: #3b82f6;
    --primary: #3b82f6;
    --success: #22c55e;
    --info: #06b6d4;
    --warning: #f59e0b;
    --danger: #ef4444;
    --header-height: 3.25rem;
}

*, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
body { background: var(--bg); color: var(--text); font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Oxygen, sans-serif; line-height: 1.7; -webkit-font-smoothing: antialiased; }
a { color: var(--accent); text-decoration: none; }
a:hover { text-decoration: underline; }
code, pre { font-family: "SF Mono", "Fira Code", "Cascadia Code", monospace; }
code { font-size: 0.85em; background: rgba(255,255,255,0.06); padding: 0.15em 0.4em; border-radius: 4px; }
pre { background: #0d1117; border: 1px solid var(--border-subtle); border-radius: 8px; padding: 1rem; overflow-x: auto; margin: 1rem 0; }
pre code { background: transparent; padding: 0; font-size: 0.8rem; line-height: 1.6; }
table { width: 100%; border-collapse: collapse; margin: 1rem 0; font-size: 0.875rem; }
th { text-align: left; padding: 0.5rem 0.75rem; border-bottom: 2px solid var(--border); color: var(--text-dim); }
td { padding: 0.5rem 0.75rem; border-bottom: 1px solid var(--border-subtle); }
p { margin: 0.75rem 0; }
ul, ol { margin: 0.5rem 0; padding-left: 1.5rem; }

/* Header bar */
.gearsdoc-header { position: sticky; top: 0; z-index: 100; height: var(--header-height); display: flex; align-items: center; gap: 1.5rem; padding: 0 1.5rem; background: var(--bg-card); border-bottom: 1px solid var(--border-subtle); }
.gearsdoc-header .brand { font-weight: 700; color: #fff; margin-right: auto; }
.gearsdoc-header .header-links { display: flex; gap: 1rem; list-style: none; padding: 0; margin: 0; }
.gearsdoc-header .header-links a { color: var(--text-dim); font-size: 0.875rem; }
.gearsdoc-header form.search { display: flex; gap: 0.25rem; }
.gearsdoc-header form.search input { background: var(--bg); color: var(--text); border: 1px solid var(--border); border-radius: 4px; padding: 0.25rem 0.5rem; }
.gearsdoc-header form.search button { background: var(--accent); color: #fff; border: 0; border-radius: 4px; padding: 0.25rem 0.75rem; cursor: pointer; }

/* Layout */
.gearsdoc-layout { display: grid; grid-template-columns: 16rem minmax(0, 1fr) 14rem; gap: 2rem; padding: 1.5rem; }
.gearsdoc-sidebar { position: sticky; top: calc(var(--header-height) + 1rem); align-self: start; max-height: calc(100vh - var(--header-height) - 2rem); overflow-y: auto; font-size: 0.875rem; }
.gearsdoc-main { min-width: 0; max-width: 52rem; }
.gearsdoc-main .page-header { font-size: 1.5rem; margin-bottom: 1.5rem; padding-bottom: 0.5rem; border-bottom: 1px solid var(--border-subtle); }

/* Navigation tree */
.nav-tree, .nav-tree ul { list-style: none; padding-left: 0; margin: 0; }
.nav-tree ul { padding-left: 1rem; }
.nav-tree .folder > span { cursor: pointer; color: var(--text-dim); }
.nav-tree .folder > span::before { content: "\25B8  "; }
.nav-tree .folder.expanded > span::before { content: "\25BE  "; }
.nav-tree .folder:not(.expanded) > ul { display: none; }
.nav-tree .leaf a { color: var(--text); display: inline-flex; align-items: center; gap: 0.35rem; }
.nav-tree .leaf.active a { color: var(--accent); font-weight: 600; }
.nav-tree img { width: 16px; height: 16px; }

/* Blocks */
.panel { background: var(--bg-card); border: 1px solid var(--border-subtle); border-left: 3px solid var(--border); border-radius: 6px; margin: 0 0 1.5rem; scroll-margin-top: calc(var(--header-height) + 1rem); }
.panel.primary { border-left-color: var(--primary); }
.panel.success { border-left-color: var(--success); }
.panel.info { border-left-color: var(--info); }
.panel.warning { border-left-color: var(--warning); }
.panel.danger { border-left-color: var(--danger); }
.panel-heading { padding: 0.6rem 1rem; border-bottom: 1px solid var(--border-subtle); }
.panel-title { font-size: 1.05rem; font-weight: 600; display: flex; justify-content: space-between; gap: 1rem; }
.panel-body { padding: 0.5rem 1rem; }
.block-anchor { position: relative; top: calc(-1 * var(--header-height) - 1rem); display: block; }
.view-source { cursor: pointer; font-size: 0.75rem; color: var(--text-muted); }
a.internal-link { border-bottom: 1px dotted var(--accent); }

/* Table of contents */
.toc { position: sticky; top: calc(var(--header-height) + 1rem); align-self: start; font-size: 0.8rem; }
.toc ul { list-style: none; padding: 0; }
.toc a { display: block; padding: 0.2rem 0.5rem; color: var(--text-dim); border-left: 2px solid transparent; }
.toc a.active { color: var(--text); border-left-color: var(--accent); }

/* Source and search dialogs */
.gearsdoc-dialog[hidden] { display: none; }
.gearsdoc-dialog { position: fixed; inset: 2rem; z-index: 200; display: flex; flex-direction: column; background: var(--bg-card); border: 1px solid var(--border); border-radius: 8px; box-shadow: 0 1rem 3rem rgba(0,0,0,0.6); }
.gearsdoc-dialog header { display: flex; justify-content: space-between; padding: 0.75rem 1rem; border-bottom: 1px solid var(--border-subtle); }
.gearsdoc-dialog .close { background: none; border: 0; color: var(--text-dim); font-size: 1.5rem; cursor: pointer; }
.gearsdoc-dialog .dialog-body { overflow: auto; padding: 1rem; }
.line-number { display: block; counter-increment: line; }
.line-number::before { content: attr(data-num); display: inline-block; width: 3.5rem; padding-right: 1rem; text-align: right; color: var(--text-muted); user-select: none; }
.line-number.highlight { background: rgba(245,158,11,0.18); }
.search-result { padding: 0.5rem 0; border-bottom: 1px solid var(--border-subtle); }

@media (max-width: 960px) {
    .gearsdoc-layout { grid-template-columns: 1fr; }
    .gearsdoc-sidebar, .toc { position: static; max-height: none; }
}
"#;

/// Client script: reads `window.GEARSDOC` (nav, relativeUrls, searchRecords,
/// searchLookup) embedded in every page.
const GEARSDOC_JS: &str = r##"(function () {
    "use strict";

    var data = window.GEARSDOC || {};
    var relativeUrls = data.relativeUrls || {};
    var records = data.searchRecords || [];
    var lookup = data.searchLookup || {};
    var SEPARATOR = "--gearsdoc--";

    function $(selector, root) { return (root || document).querySelector(selector); }
    function $all(selector, root) { return Array.prototype.slice.call((root || document).querySelectorAll(selector)); }

    function escapeHtml(text) {
        return String(text)
            .replace(/&/g, "&amp;")
            .replace(/</g, "&lt;")
            .replace(/>/g, "&gt;")
            .replace(/"/g, "&quot;");
    }

    function linkFor(id) {
        var at = id.lastIndexOf(SEPARATOR);
        var file = id.slice(0, at);
        var block = id.slice(at + SEPARATOR.length);
        var url = relativeUrls[file];
        if (url === undefined) { return null; }
        return { file: file, href: url === "#" ? "#" + block : url + "#" + block };
    }

    function search(query) {
        var terms = query.toLowerCase().split(/\s+/).filter(Boolean);
        if (!terms.length) { return []; }
        var scored = [];
        Object.keys(lookup).forEach(function (id) {
            var record = records[lookup[id]];
            var title = (record.title || "").toLowerCase();
            var signature = (record.signature || "").toLowerCase();
            var body = record.body.toLowerCase();
            var score = 0;
            terms.forEach(function (term) {
                if (title.indexOf(term) !== -1) { score += 10; }
                if (signature.indexOf(term) !== -1) { score += 3; }
                if (body.indexOf(term) !== -1) { score += 1; }
            });
            if (score > 0) { scored.push({ ref: id, score: score }); }
        });
        return scored.sort(function (a, b) { return b.score - a.score; });
    }

    function openDialog(dialog) { dialog.hidden = false; }
    function closeDialog(dialog) { dialog.hidden = true; }

    function showResults(query) {
        var dialog = $("#search-dialog");
        if (!dialog) { return; }
        var html = "";
        search(query).forEach(function (result) {
            var record = records[lookup[result.ref]];
            var link = linkFor(result.ref);
            if (!link) { return; }
            html += '<div class="search-result"><h4>File: <a class="search-result-link" href="' + escapeHtml(link.href) + '">' + escapeHtml(link.file) + "</a></h4><ul>";
            if (record.title !== undefined) { html += "<li><b>" + escapeHtml(record.title) + "</b></li>"; }
            if (record.signature !== undefined) { html += "<li><code>" + escapeHtml(record.signature) + "</code></li>"; }
            var body = record.body.length > 140 ? record.body.substr(0, 140) + "…" : record.body;
            html += "<li>" + escapeHtml(body) + "</li></ul></div>";
        });
        $(".dialog-title", dialog).textContent = "Search Results for: " + query;
        $(".dialog-body", dialog).innerHTML = html || "<p>No results.</p>";
        openDialog(dialog);
    }

    function highlightLines(start, end) {
        var dialog = $("#source-dialog");
        if (!dialog) { return; }
        openDialog(dialog);
        var first = null;
        $all(".line-number", dialog).forEach(function (line) {
            var num = parseInt(line.getAttribute("data-num"), 10);
            var hit = num >= start && num <= end;
            line.classList.toggle("highlight", hit);
            if (hit && !first) { first = line; }
        });
        if (first) { first.scrollIntoView({ block: "center" }); }
    }

    function followHash() {
        var hash = window.location.hash.slice(1);
        if (!hash) { return; }
        var line = /^line_(\d+)$/.exec(hash);
        if (line) {
            var num = parseInt(line[1], 10);
            highlightLines(num, num);
            return;
        }
        var block = document.getElementById("block_" + hash);
        if (block) { block.scrollIntoView(); }
    }

    function trackToc() {
        var links = $all(".toc a");
        if (!links.length) { return; }
        var current = null;
        $all(".panel").forEach(function (panel) {
            if (panel.getBoundingClientRect().top <= 80) { current = panel.id; }
        });
        links.forEach(function (link, index) {
            var target = link.getAttribute("data-block-target");
            link.classList.toggle("active", current ? target === "#" + current : index === 0);
        });
    }

    document.addEventListener("DOMContentLoaded", function () {
        $all(".nav-tree .folder > span").forEach(function (label) {
            label.addEventListener("click", function () {
                label.parentNode.classList.toggle("expanded");
            });
        });

        var form = $("form.search");
        if (form) {
            form.addEventListener("submit", function (event) {
                event.preventDefault();
                showResults($("input", form).value);
            });
        }

        $all(".gearsdoc-dialog .close").forEach(function (button) {
            button.addEventListener("click", function () {
                closeDialog(button.closest(".gearsdoc-dialog"));
            });
        });

        document.addEventListener("click", function (event) {
            var link = event.target.closest && event.target.closest("a.search-result-link");
            if (link && link.getAttribute("href").indexOf("#") === 0) {
                closeDialog($("#search-dialog"));
            }
        });

        $all(".view-source").forEach(function (button) {
            button.addEventListener("click", function () {
                var start = parseInt(button.getAttribute("data-start-line"), 10);
                var end = parseInt(button.getAttribute("data-end-line"), 10);
                if (isNaN(start)) { openDialog($("#source-dialog")); return; }
                highlightLines(start, end);
            });
        });

        window.addEventListener("hashchange", followHash);
        window.addEventListener("scroll", trackToc);
        followHash();
        trackToc();
    });
})();
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fingerprint_is_ten_hex_chars() {
        let hash = fingerprint(b"gearsdoc");
        assert_eq!(hash.len(), 10);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, fingerprint(b"gearsdoc"));
        assert_ne!(hash, fingerprint(b"gearsdoc!"));
    }

    #[test]
    fn bundle_names_match_contents() {
        let bundle = AssetBundle::new();
        assert!(bundle.stylesheet().starts_with("assets/gearsdoc."));
        assert!(bundle.stylesheet().ends_with(".css"));
        assert!(bundle.script().ends_with(".js"));

        let css = bundle.files().iter().find(|a| a.path == bundle.stylesheet()).unwrap();
        let expected = format!("assets/gearsdoc.{}.css", fingerprint(&css.contents));
        assert_eq!(bundle.stylesheet(), expected);
    }

    #[test]
    fn every_known_icon_is_shipped() {
        let bundle = AssetBundle::new();
        for ext in ["php", "js", "css", "md", "html"] {
            let icon = crate::nav::icon_for(ext).unwrap();
            let path = format!("{ICON_DIR}/{icon}");
            assert!(bundle.files().iter().any(|a| a.path == path), "missing {path}");
        }
    }
}
