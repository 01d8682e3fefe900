//! Markdown to HTML conversion.

/// Converts markdown text to an HTML fragment.
///
/// Implementations must be deterministic: the classifier may render the
/// same text more than once and expects identical output.
pub trait MarkdownRenderer {
    fn render(&self, markdown: &str) -> String;
}

/// Default renderer backed by `pulldown-cmark` with GFM extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonMarkRenderer;

impl MarkdownRenderer for CommonMarkRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut options = pulldown_cmark::Options::empty();
        options.insert(pulldown_cmark::Options::ENABLE_TABLES);
        options.insert(pulldown_cmark::Options::ENABLE_STRIKETHROUGH);
        options.insert(pulldown_cmark::Options::ENABLE_TASKLISTS);
        let parser = pulldown_cmark::Parser::new_ext(markdown, options);
        let mut html_output = String::new();
        pulldown_cmark::html::push_html(&mut html_output, parser);
        html_output
    }
}
