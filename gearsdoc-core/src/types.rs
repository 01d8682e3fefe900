use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Inclusive, 1-based line range inside a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start_line: usize,
    pub end_line: usize,
}

/// One input file, as yielded by the tree walker.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Slash-separated path relative to the input root, e.g. `lib/Foo.php`.
    pub relative_pathname: String,
    /// File extension without the leading dot.
    pub extension: String,
    /// Location on disk, shown in log messages.
    pub path: PathBuf,
    /// Raw text content.
    pub contents: String,
}

impl SourceFile {
    /// Build a source file from its relative pathname and contents.
    pub fn new(relative_pathname: impl Into<String>, path: PathBuf, contents: String) -> Self {
        let relative_pathname = relative_pathname.into();
        let extension = extension_of(&relative_pathname).to_string();
        Self {
            relative_pathname,
            extension,
            path,
            contents,
        }
    }

    /// Directory part of the relative pathname; empty for root files.
    pub fn relative_path(&self) -> &str {
        match self.relative_pathname.rfind('/') {
            Some(idx) => &self.relative_pathname[..idx],
            None => "",
        }
    }

    /// File name without any directory part.
    pub fn file_name(&self) -> &str {
        match self.relative_pathname.rfind('/') {
            Some(idx) => &self.relative_pathname[idx + 1..],
            None => &self.relative_pathname,
        }
    }

    /// Output-relative URI of the generated page (`lib/Foo.html`).
    pub fn html_pathname(&self) -> String {
        with_html_extension(&self.relative_pathname)
    }
}

/// A docblock as cut out of the source by the scanner, before markdown rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBlock {
    pub lines: Span,
    /// De-commented markdown.
    pub markdown: String,
    /// The physical line right after the closing marker, untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub following_line: Option<String>,
}

/// One extracted documentation unit, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocBlock {
    /// Location of the comment delimiters. `None` for pseudo blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<Span>,
    pub markdown: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Style tag picked by the context rules; empty when none matched.
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Maps a lowercased title prefix to a style tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRule {
    pub prefix: String,
    pub context: String,
}

impl ContextRule {
    pub fn new(prefix: &str, context: &str) -> Self {
        Self {
            prefix: prefix.to_lowercase(),
            context: context.to_string(),
        }
    }
}

/// The rule table used when none is configured. Order matters: first match wins.
pub fn default_context_rules() -> Vec<ContextRule> {
    vec![
        ContextRule::new("class:", "primary"),
        ContextRule::new("interface:", "primary"),
        ContextRule::new("trait:", "primary"),
        ContextRule::new("property:", "success"),
        ContextRule::new("constant:", "success"),
        ContextRule::new("method:", "info"),
        ContextRule::new("function:", "info"),
        ContextRule::new("section:", "warning"),
        ContextRule::new("event:", "danger"),
    ]
}

/// A link shown in the header bar of every page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderLink {
    pub text: String,
    pub href: String,
}

impl HeaderLink {
    /// Parse a markdown link of the form `[Text](href)`.
    pub fn parse(input: &str) -> Option<Self> {
        let rest = input.trim().strip_prefix('[')?;
        let close = rest.find("](")?;
        let text = &rest[..close];
        let href = rest[close + 2..].strip_suffix(')')?;
        if text.is_empty() || href.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            href: href.to_string(),
        })
    }
}

/// Which page template a generated page uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    /// Docblocks of a scanned source file.
    Doc,
    /// Pseudo blocks of a merged markdown document.
    Additional,
}

/// Everything known about one generated page after pass one.
#[derive(Debug, Clone)]
pub struct FileBlocks {
    pub file: SourceFile,
    pub kind: PageKind,
    pub blocks: Vec<DocBlock>,
}

/// Extension of a slash-separated path, without the dot. Empty if none.
pub fn extension_of(pathname: &str) -> &str {
    let name = pathname.rsplit('/').next().unwrap_or(pathname);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[idx + 1..],
        _ => "",
    }
}

/// Swap the extension of a slash-separated path for `.html`.
pub fn with_html_extension(pathname: &str) -> String {
    let ext = extension_of(pathname);
    if ext.is_empty() {
        format!("{pathname}.html")
    } else {
        format!("{}html", &pathname[..pathname.len() - ext.len()])
    }
}
