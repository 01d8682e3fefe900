//! Small helpers for working with rendered HTML fragments.
//!
//! The fragments handled here all come out of the markdown renderer, so a
//! tolerant byte scanner is enough; no DOM is built.

use html_escape::decode_html_entities;

/// Escape HTML special characters to prevent XSS.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Remove every `<...>` span, leaving text content and order untouched.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' if !in_tag => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Decoded text content of an HTML fragment.
pub fn text_content(html: &str) -> String {
    decode_html_entities(&strip_tags(html)).into_owned()
}

/// Location of an element inside a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementRange {
    /// Byte offset of the opening `<`.
    pub start: usize,
    /// Byte offset just past the closing tag.
    pub end: usize,
    /// Byte range of the inner HTML.
    pub inner_start: usize,
    pub inner_end: usize,
}

/// Find the first `<tag ...>...</tag>` element at or after `from`.
///
/// Elements of the same name are not expected to nest (true for the
/// headings, anchors and code spans this is used for).
pub fn find_element(html: &str, tag: &str, from: usize) -> Option<ElementRange> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut search = from;

    loop {
        let start = search + html.get(search..)?.find(&open)?;
        let after_name = start + open.len();
        let next = html.as_bytes().get(after_name).copied();
        if !matches!(next, Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n')) {
            // `<h1` matched `<h10` or `<abbr` matched `<a`; keep looking.
            search = after_name;
            continue;
        }
        let inner_start = after_name + html[after_name..].find('>')? + 1;
        let inner_end = inner_start + html[inner_start..].find(&close)?;
        return Some(ElementRange {
            start,
            end: inner_end + close.len(),
            inner_start,
            inner_end,
        });
    }
}

/// Read the value of `name="..."` (or single-quoted) from an opening tag.
pub fn attribute_value<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let (_, start, end) = attribute_span(tag, name)?;
    Some(&tag[start..end])
}

/// Byte span of an attribute: `(attr_start, value_start, value_end)`.
///
/// `attr_start` points at the attribute name, `value_end` at the closing quote.
pub fn attribute_span(tag: &str, name: &str) -> Option<(usize, usize, usize)> {
    let bytes = tag.as_bytes();
    let mut search = 0;
    while let Some(found) = tag[search..].find(name) {
        let at = search + found;
        search = at + name.len();
        let boundary = at > 0 && bytes[at - 1].is_ascii_whitespace();
        if !boundary {
            continue;
        }
        let mut pos = at + name.len();
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if bytes.get(pos) != Some(&b'=') {
            continue;
        }
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let quote = match bytes.get(pos) {
            Some(q @ (b'"' | b'\'')) => *q,
            _ => continue,
        };
        let value_start = pos + 1;
        let value_end = value_start + tag[value_start..].find(quote as char)?;
        return Some((at, value_start, value_end));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn escape_special_characters() {
        assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn text_content_decodes_entities() {
        assert_eq!(text_content("<em>&#39;q&#x27;</em> &#233;t&#xe9;"), "'q' été");
        assert_eq!(text_content("AT&amp;T &amp; co"), "AT&T & co");
    }

    #[test]
    fn strip_tags_keeps_text_order() {
        assert_eq!(strip_tags("<p>Hello <em>big</em> world</p>\n"), "Hello big world\n");
        assert_eq!(text_content("<code>a &lt; b</code>"), "a < b");
    }

    #[test]
    fn find_h1() {
        let html = "<p>x</p>\n<h1>Class: Foo</h1>\n<p>y</p>";
        let el = find_element(html, "h1", 0).unwrap();
        assert_eq!(&html[el.start..el.end], "<h1>Class: Foo</h1>");
        assert_eq!(&html[el.inner_start..el.inner_end], "Class: Foo");
    }

    #[test]
    fn find_element_skips_longer_tag_names() {
        let html = "<abbr>x</abbr><a href=\"#\">y</a>";
        let el = find_element(html, "a", 0).unwrap();
        assert_eq!(&html[el.start..el.end], "<a href=\"#\">y</a>");
    }

    #[test]
    fn attributes_anywhere_in_tag() {
        let tag = "<a title=\"t\" href=\"Foo.php\" data-href='no'>";
        assert_eq!(attribute_value(tag, "href"), Some("Foo.php"));
        assert_eq!(attribute_value(tag, "title"), Some("t"));
        assert_eq!(attribute_value(tag, "class"), None);
    }
}
