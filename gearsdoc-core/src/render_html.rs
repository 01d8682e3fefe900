//! Full-page HTML rendering.
//!
//! Three layouts share one page shell: `doc` for a scanned source file,
//! `additional` for a merged markdown document and `home` for the site
//! index. Every page embeds the sidebar tree, its own relative URL map and
//! the search data as inline script data. All text taken from the input is
//! HTML-escaped; block bodies are already HTML from the markdown renderer.

use serde::Serialize;

use crate::assets::AssetBundle;
use crate::html::escape_html;
use crate::nav::{NavItem, RenderedNav};
use crate::types::{DocBlock, HeaderLink, SourceFile};

/// Site-wide values shared by every page of a run.
#[derive(Debug, Clone, Copy)]
pub struct SiteData<'a> {
    pub project_name: &'a str,
    pub header_links: &'a [HeaderLink],
    pub assets: &'a AssetBundle,
    /// The search record array, already serialised.
    pub search_records_json: &'a str,
    /// The search id → position object, already serialised.
    pub search_lookup_json: &'a str,
}

/// Render the page of a scanned source file.
pub fn render_doc_page(site: &SiteData, nav: &RenderedNav, file: &SourceFile, blocks: &[DocBlock]) -> String {
    let pathname = escape_html(&file.relative_pathname);
    let extension = escape_html(&file.extension);

    let mut main = format!(
        "<h1 class=\"page-header\">{pathname} <a class=\"view-source\" title=\"View Source\">source</a></h1>\n"
    );
    for (idx, block) in blocks.iter().enumerate() {
        main.push_str(&render_block(idx, block, Some(&extension)));
    }

    let source_dialog = format!(
        r#"<div id="source-dialog" class="gearsdoc-dialog" hidden>
<header><h4 class="dialog-title">{pathname}</h4><button type="button" class="close" aria-label="Close">&times;</button></header>
<div class="dialog-body"><pre><code class="{extension}">{source}</code></pre></div>
</div>
"#,
        source = render_source_lines(&file.contents),
    );

    page_shell(
        site,
        nav,
        &root_prefix(&file.relative_pathname),
        &file.relative_pathname,
        &main,
        &render_toc(blocks),
        &source_dialog,
    )
}

/// Render the page of a merged markdown document. View-source is disabled.
pub fn render_additional_page(site: &SiteData, nav: &RenderedNav, file: &SourceFile, blocks: &[DocBlock]) -> String {
    let mut main = format!("<h1 class=\"page-header\">{}</h1>\n", escape_html(&file.relative_pathname));
    for (idx, block) in blocks.iter().enumerate() {
        main.push_str(&render_block(idx, block, None));
    }

    page_shell(
        site,
        nav,
        &root_prefix(&file.relative_pathname),
        &file.relative_pathname,
        &main,
        &render_toc(blocks),
        "",
    )
}

/// Render `index.html`. `sections` are the pseudo blocks of the index
/// document, or `None` for the placeholder welcome page.
pub fn render_home_page(site: &SiteData, nav: &RenderedNav, sections: Option<&[DocBlock]>) -> String {
    let (main, toc) = match sections {
        Some(blocks) => {
            let mut main = String::new();
            for (idx, block) in blocks.iter().enumerate() {
                let title = block.title.as_deref().map(escape_html).unwrap_or_default();
                main.push_str(&format!(
                    "<section id=\"block_{idx}\" class=\"home-section\">\n<a class=\"block-anchor\" id=\"{idx}\"></a>\n<h1>{title}</h1>\n{html}</section>\n",
                    html = block.html,
                ));
            }
            (main, render_toc(blocks))
        }
        None => (
            format!(
                "<section class=\"home-placeholder\">\n<h1>Welcome to {}</h1>\n<p>Pick a file from the navigation to start browsing the documentation.</p>\n</section>\n",
                escape_html(site.project_name)
            ),
            String::new(),
        ),
    };

    page_shell(site, nav, "", site.project_name, &main, &toc, "")
}

/// `../` repeated once per directory of `relative_pathname`.
pub fn root_prefix(relative_pathname: &str) -> String {
    "../".repeat(relative_pathname.matches('/').count())
}

fn page_shell(
    site: &SiteData,
    nav: &RenderedNav,
    prefix: &str,
    title: &str,
    main: &str,
    toc: &str,
    dialogs: &str,
) -> String {
    let page_title = if title == site.project_name {
        escape_html(title)
    } else {
        format!("{} · {}", escape_html(title), escape_html(site.project_name))
    };

    let mut header_links = String::new();
    for link in site.header_links {
        header_links.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>",
            escape_html(&link.href),
            escape_html(&link.text)
        ));
    }

    let data = ScriptData {
        nav: &nav.items,
        relative_urls: &nav.relative_urls,
    };
    let page_data = script_json(&data);
    // Splice the shared, pre-serialised search data into the object.
    let page_data = format!(
        "{},\"searchRecords\":{},\"searchLookup\":{}}}",
        page_data.strip_suffix('}').unwrap_or(&page_data),
        escape_script(site.search_records_json),
        escape_script(site.search_lookup_json),
    );

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="generator" content="GearsDoc">
    <title>{page_title}</title>
    <link rel="stylesheet" href="{prefix}{stylesheet}">
</head>
<body>
<header class="gearsdoc-header">
<a class="brand" href="{prefix}index.html">{project}</a>
<ul class="header-links">{header_links}</ul>
<form class="search" role="search"><input type="search" placeholder="Search" aria-label="Search"><button type="submit">Search</button></form>
</header>
<div class="gearsdoc-layout">
<nav class="gearsdoc-sidebar" aria-label="Files">
{nav_html}
</nav>
<main class="gearsdoc-main">
{main}</main>
<aside class="toc">
{toc}</aside>
</div>
{dialogs}<div id="search-dialog" class="gearsdoc-dialog" hidden>
<header><h4 class="dialog-title">Search Results</h4><button type="button" class="close" aria-label="Close">&times;</button></header>
<div class="dialog-body"></div>
</div>
<script>window.GEARSDOC = {page_data};</script>
<script src="{prefix}{script}"></script>
</body>
</html>
"#,
        stylesheet = site.assets.stylesheet(),
        script = site.assets.script(),
        project = escape_html(site.project_name),
        nav_html = render_nav(&nav.items),
    )
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScriptData<'a> {
    nav: &'a [NavItem],
    relative_urls: &'a crate::nav::RelativeUrls,
}

/// Serialise for embedding inside a `<script>` element.
fn script_json<T: Serialize>(value: &T) -> String {
    escape_script(&serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string()))
}

fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn render_block(idx: usize, block: &DocBlock, source_extension: Option<&str>) -> String {
    let class = if block.context.is_empty() {
        "panel".to_string()
    } else {
        format!("panel {}", escape_html(&block.context))
    };

    let line_attrs = match (source_extension, block.lines) {
        (Some(_), Some(span)) => format!(
            " data-start-line=\"{}\" data-end-line=\"{}\"",
            span.start_line, span.end_line
        ),
        _ => String::new(),
    };

    let heading = match &block.title {
        Some(title) => {
            let view_source = if line_attrs.is_empty() {
                String::new()
            } else {
                format!("<a class=\"view-source\" title=\"Take me to the code...\"{line_attrs}>source</a>")
            };
            format!(
                "<div class=\"panel-heading\"><h3 class=\"panel-title\">{}{view_source}</h3></div>\n",
                escape_html(title)
            )
        }
        None => String::new(),
    };

    let signature = match (&block.signature, source_extension) {
        (Some(signature), Some(extension)) => format!(
            "<pre><code class=\"{extension}\">{}</code></pre>\n",
            escape_html(signature)
        ),
        _ => String::new(),
    };

    format!(
        "<section id=\"block_{idx}\" class=\"{class}\"{line_attrs}>\n<a class=\"block-anchor\" id=\"{idx}\"></a>\n{heading}<div class=\"panel-body\">\n{signature}{html}</div>\n</section>\n",
        html = block.html,
    )
}

fn render_toc(blocks: &[DocBlock]) -> String {
    let mut entries = String::new();
    let mut first = true;
    for (idx, block) in blocks.iter().enumerate() {
        let Some(title) = &block.title else { continue };
        let active = if first { " class=\"active\"" } else { "" };
        first = false;
        entries.push_str(&format!(
            "<li><a{active} href=\"#{idx}\" data-block-target=\"#block_{idx}\">{}</a></li>\n",
            escape_html(title)
        ));
    }
    if entries.is_empty() {
        return String::new();
    }
    format!("<ul>\n{entries}</ul>\n")
}

/// The sidebar as nested lists; folders on the current page's branch start expanded.
pub fn render_nav(items: &[NavItem]) -> String {
    let mut out = String::from("<ul class=\"nav-tree\">");
    render_nav_items(items, &mut out);
    out.push_str("</ul>");
    out
}

fn render_nav_items(items: &[NavItem], out: &mut String) {
    for item in items {
        match item {
            NavItem::Folder {
                title,
                expanded,
                children,
                ..
            } => {
                let class = if *expanded { "folder expanded" } else { "folder" };
                out.push_str(&format!("<li class=\"{class}\"><span>{}</span><ul>", escape_html(title)));
                render_nav_items(children, out);
                out.push_str("</ul></li>");
            }
            NavItem::Leaf {
                title,
                href,
                active,
                icon,
                ..
            } => {
                let class = if *active { "leaf active" } else { "leaf" };
                let icon = icon
                    .as_deref()
                    .map(|src| format!("<img src=\"{}\" alt=\"\">", escape_html(src)))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "<li class=\"{class}\"><a href=\"{}\">{icon}{}</a></li>",
                    escape_html(href),
                    escape_html(title)
                ));
            }
        }
    }
}

/// Escaped source, one addressable span per line.
fn render_source_lines(contents: &str) -> String {
    contents
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let n = i + 1;
            format!(
                "<span class=\"line-number\" id=\"line_{n}\" data-num=\"{n}\">{}</span>",
                escape_html(line)
            )
        })
        .collect()
}
