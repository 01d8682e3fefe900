//! Block classification: markdown rendering plus title, context and
//! signature extraction.

use crate::html::{find_element, text_content};
use crate::markdown::MarkdownRenderer;
use crate::types::{ContextRule, DocBlock, RawBlock};

/// Turns raw scanner output into renderable [`DocBlock`]s.
pub struct Classifier<'a> {
    markdown: &'a dyn MarkdownRenderer,
    rules: &'a [ContextRule],
}

impl<'a> Classifier<'a> {
    pub fn new(markdown: &'a dyn MarkdownRenderer, rules: &'a [ContextRule]) -> Self {
        Self { markdown, rules }
    }

    /// Classify one docblock.
    ///
    /// The first level-1 heading becomes the title and is cut out of the
    /// body. Without one, the first markdown line is the title and the body
    /// is rendered from the remaining lines.
    pub fn classify(&self, raw: &RawBlock) -> DocBlock {
        let rendered = self.markdown.render(&raw.markdown);

        let (title, html) = match find_element(&rendered, "h1", 0) {
            Some(h1) => {
                let title = text_content(&rendered[h1.inner_start..h1.inner_end]);
                (Some(title.trim().to_string()), remove_range(&rendered, h1.start, h1.end))
            }
            None => {
                let (first, rest) = match raw.markdown.split_once('\n') {
                    Some((first, rest)) => (first, rest),
                    None => (raw.markdown.as_str(), ""),
                };
                let title = (!first.is_empty()).then(|| first.to_string());
                (title, self.markdown.render(rest))
            }
        };

        let context = title
            .as_deref()
            .map(|t| classify_context(t, self.rules))
            .unwrap_or_default();

        let signature = raw
            .following_line
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        DocBlock {
            lines: Some(raw.lines),
            markdown: raw.markdown.clone(),
            html,
            title,
            context,
            signature,
        }
    }

    /// Split a freeform markdown document into pseudo blocks, one per
    /// level-1 heading.
    ///
    /// Content before the first heading becomes its own block, titled with
    /// the document's first line. Pseudo blocks never carry a line range or
    /// a signature, and their `markdown` is left empty.
    pub fn classify_pseudo(&self, document: &str) -> Vec<DocBlock> {
        let rendered = self.markdown.render(document);
        let mut headings = Vec::new();
        let mut from = 0;
        while let Some(h1) = find_element(&rendered, "h1", from) {
            from = h1.end;
            headings.push(h1);
        }

        let mut blocks = Vec::new();

        let preamble_end = headings.first().map_or(rendered.len(), |h| h.start);
        let preamble = &rendered[..preamble_end];
        if !text_content(preamble).trim().is_empty() {
            let title = document
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .unwrap_or_default()
                .to_string();
            blocks.push(self.pseudo_block(title, preamble));
        }

        for (i, h1) in headings.iter().enumerate() {
            let body_end = headings.get(i + 1).map_or(rendered.len(), |next| next.start);
            let body = &rendered[h1.end..body_end];
            let title = text_content(&rendered[h1.inner_start..h1.inner_end]);
            blocks.push(self.pseudo_block(
                title.trim().to_string(),
                body.strip_prefix('\n').unwrap_or(body),
            ));
        }

        blocks
    }

    fn pseudo_block(&self, title: String, html: &str) -> DocBlock {
        DocBlock {
            lines: None,
            markdown: String::new(),
            html: html.to_string(),
            context: classify_context(&title, self.rules),
            title: Some(title),
            signature: None,
        }
    }
}

/// Pick the style tag for a title: the first rule whose prefix starts the
/// lowercased title wins. Empty when nothing matches.
pub fn classify_context(title: &str, rules: &[ContextRule]) -> String {
    let lowered = title.to_lowercase();
    rules
        .iter()
        .find(|rule| lowered.starts_with(&rule.prefix))
        .map(|rule| rule.context.clone())
        .unwrap_or_default()
}

/// Remove `html[start..end]` and one newline directly after it.
fn remove_range(html: &str, start: usize, end: usize) -> String {
    let tail = &html[end..];
    let tail = tail.strip_prefix('\n').unwrap_or(tail);
    format!("{}{}", &html[..start], tail)
}
