//! ANSI terminal renderer for classified blocks.
//!
//! Used by the `scan` subcommand to inspect what the generator would extract
//! from a single file without building a site.

use colored::Colorize;

use crate::types::DocBlock;

/// Render `blocks` of `pathname` as colored terminal text.
pub fn to_terminal(pathname: &str, blocks: &[DocBlock]) -> String {
    let mut parts = vec![format!(
        "{} {}",
        pathname.bold(),
        format!("({} blocks)", blocks.len()).dimmed()
    )];
    for (idx, block) in blocks.iter().enumerate() {
        parts.push(render_block(idx, block));
    }
    parts.join("\n\n")
}

fn render_block(idx: usize, block: &DocBlock) -> String {
    let color = context_color(&block.context);
    let border = apply_color("\u{2502}", color); // │

    let location = match block.lines {
        Some(span) => format!("#{idx} lines {}-{}", span.start_line, span.end_line),
        None => format!("#{idx}"),
    };
    let title = block.title.as_deref().unwrap_or("(untitled)");
    let context = if block.context.is_empty() {
        String::new()
    } else {
        format!(" {}", format!("[{}]", block.context).dimmed())
    };

    let mut lines = vec![format!(
        "{border} {} {}{context}",
        location.dimmed(),
        apply_color(title, color).bold()
    )];
    if let Some(signature) = &block.signature {
        lines.push(format!("{border} {}", signature.green()));
    }
    for line in block.markdown.lines() {
        lines.push(format!("{border} {line}"));
    }
    lines.join("\n")
}

fn context_color(context: &str) -> &'static str {
    match context {
        "primary" => "blue",
        "success" => "green",
        "info" => "cyan",
        "warning" => "yellow",
        "danger" => "red",
        _ => "",
    }
}

fn apply_color(text: &str, color: &str) -> String {
    match color {
        "yellow" => format!("{}", text.yellow()),
        "red" => format!("{}", text.red()),
        "blue" => format!("{}", text.blue()),
        "green" => format!("{}", text.green()),
        "cyan" => format!("{}", text.cyan()),
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Span;

    fn block(context: &str) -> DocBlock {
        DocBlock {
            lines: Some(Span {
                start_line: 3,
                end_line: 7,
            }),
            markdown: "# Class: Widget\n\nSome body.".to_string(),
            html: String::new(),
            title: Some("Class: Widget".to_string()),
            context: context.to_string(),
            signature: Some("class Widget".to_string()),
        }
    }

    #[test]
    fn term_block_lists_location_title_and_body() {
        let out = to_terminal("src/App.php", &[block("primary")]);
        assert!(out.contains("src/App.php"));
        assert!(out.contains("(1 blocks)"));
        assert!(out.contains("#0 lines 3-7"));
        assert!(out.contains("Class: Widget"));
        assert!(out.contains("[primary]"));
        assert!(out.contains("class Widget"));
        assert!(out.contains("Some body."));
        assert_eq!(out.matches('\u{2502}').count(), 5);
    }

    #[test]
    fn term_context_has_color() {
        // Force colors on; the colored crate disables them when stdout is not a tty.
        colored::control::set_override(true);
        let out = to_terminal("a.php", &[block("danger")]);
        assert!(out.contains("\x1b["));
        colored::control::unset_override();
    }
}
