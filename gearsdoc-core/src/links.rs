//! Internal link resolution.
//!
//! Rewrites anchors in rendered block HTML so that markdown links written
//! against titles, signatures or code snippets land on the right block or
//! source line of the generated site. Resolution is best effort: a link that
//! cannot be resolved is passed through exactly as written.

use std::collections::BTreeMap;

use html_escape::decode_html_entities;

use crate::html::{attribute_span, attribute_value, escape_html, find_element};
use crate::nav::RelativeUrls;
use crate::types::{DocBlock, FileBlocks, PageKind, with_html_extension};

/// Class set on every rewritten anchor.
pub const INTERNAL_LINK_CLASS: &str = "internal-link";

/// Key of a page in the all-files map: its output path with duplicate
/// slashes collapsed.
pub fn output_key(output_root: &str, relative_pathname: &str) -> String {
    let joined = format!("{}/{}", output_root, with_html_extension(relative_pathname));
    collapse_slashes(&joined)
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Where a link points once its href has been classified.
struct Target<'a> {
    scope: &'a FileBlocks,
    prefix: String,
}

/// Resolves internal links for one rendered page.
pub struct LinkResolver<'a> {
    files: &'a BTreeMap<String, FileBlocks>,
    relative_urls: &'a RelativeUrls,
    output_root: &'a str,
}

impl<'a> LinkResolver<'a> {
    /// `files` is keyed by [`output_key`]; `relative_urls` must be the map
    /// rendered for the page being resolved.
    pub fn new(
        files: &'a BTreeMap<String, FileBlocks>,
        relative_urls: &'a RelativeUrls,
        output_root: &'a str,
    ) -> Self {
        Self {
            files,
            relative_urls,
            output_root,
        }
    }

    /// Return `current`'s blocks with their links rewritten.
    pub fn resolve(&self, current: &FileBlocks) -> Vec<DocBlock> {
        current
            .blocks
            .iter()
            .map(|block| {
                let mut block = block.clone();
                if block.html.contains("<a") {
                    block.html = self.resolve_html(current, &block.html);
                }
                block
            })
            .collect()
    }

    /// Rewrite every resolvable anchor of one HTML fragment.
    pub fn resolve_html(&self, current: &FileBlocks, html: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let mut copied = 0;
        let mut from = 0;

        while let Some(anchor) = find_element(html, "a", from) {
            from = anchor.end;
            let open_tag = &html[anchor.start..anchor.inner_start];
            let link_text = &html[anchor.inner_start..anchor.inner_end];

            let Some(new_href) = self.resolve_anchor(current, open_tag, link_text) else {
                continue;
            };

            out.push_str(&html[copied..anchor.start]);
            out.push_str(&rewrite_open_tag(open_tag, &new_href));
            out.push_str(&html[anchor.inner_start..anchor.end]);
            copied = anchor.end;
        }

        out.push_str(&html[copied..]);
        out
    }

    fn resolve_anchor(&self, current: &FileBlocks, open_tag: &str, link_text: &str) -> Option<String> {
        let href = decode_html_entities(attribute_value(open_tag, "href")?);
        let target = self.target(current, &href)?;

        if let Some(code) = find_element(link_text, "code", 0) {
            let literal = decode_html_entities(&link_text[code.inner_start..code.inner_end]);
            // Markdown documents are rendered without a source view.
            let line = match target.scope.kind {
                PageKind::Doc => find_source_line(&target.scope.file.contents, &literal),
                PageKind::Additional => None,
            };
            let href = match line {
                Some(line) => format!("{}#line_{}", target.prefix, line),
                None => {
                    tracing::debug!(
                        file = %target.scope.file.relative_pathname,
                        snippet = %literal,
                        "code reference not found in source, linking to the page"
                    );
                    if target.prefix.is_empty() {
                        "#".to_string()
                    } else {
                        target.prefix.clone()
                    }
                }
            };
            return Some(href);
        }

        let text = decode_html_entities(link_text).into_owned();
        let found = target.scope.blocks.iter().position(|block| {
            block.title.as_deref() == Some(text.as_str())
                || block.signature.as_deref() == Some(text.as_str())
        });
        match found {
            Some(idx) => Some(format!("{}#{}", target.prefix, idx)),
            None => {
                tracing::debug!(
                    file = %target.scope.file.relative_pathname,
                    text = %text,
                    "no block titled or signed like the link text"
                );
                None
            }
        }
    }

    /// Classify an href into a search scope and URL prefix.
    ///
    /// `#` is the current page, anything with a protocol is external, and
    /// everything else must name a documented page.
    fn target<'b>(&'b self, current: &'b FileBlocks, href: &str) -> Option<Target<'b>> {
        if href == "#" {
            return Some(Target {
                scope: current,
                prefix: String::new(),
            });
        }
        if href.contains("://") {
            return None;
        }

        let Some(url) = self.relative_urls.get(href) else {
            tracing::debug!(%href, "link target is not a documented page");
            return None;
        };
        let key = output_key(self.output_root, href);
        let Some(scope) = self.files.get(&key) else {
            tracing::debug!(%href, %key, "link target has no generated page");
            return None;
        };

        let prefix = if url == "#" { String::new() } else { url.clone() };
        Some(Target { scope, prefix })
    }
}

/// First 1-based line containing `literal` that is not the literal wrapped
/// in a markdown code span (which would be the docblock's own reference).
fn find_source_line(contents: &str, literal: &str) -> Option<usize> {
    if literal.is_empty() {
        return None;
    }
    let code_span = format!("`{literal}`");
    contents
        .lines()
        .position(|line| line.contains(literal) && !line.contains(&code_span))
        .map(|idx| idx + 1)
}

/// Replace the href value and set the internal-link class on an opening tag.
fn rewrite_open_tag(open_tag: &str, href: &str) -> String {
    let mut tag = open_tag.to_string();

    if let Some((_, start, end)) = attribute_span(&tag, "href") {
        tag.replace_range(start..end, &escape_html(href));
    }

    match attribute_span(&tag, "class") {
        Some((_, start, end)) => tag.replace_range(start..end, INTERNAL_LINK_CLASS),
        None => {
            let close = tag.rfind('>').unwrap_or(tag.len());
            tag.insert_str(close, &format!(" class=\"{INTERNAL_LINK_CLASS}\""));
        }
    }

    tag
}
