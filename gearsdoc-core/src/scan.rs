//! Docblock scanner.
//!
//! Finds delimited comment regions in a source file without understanding
//! the host language: only lines starting with one of the three marker
//! tokens take part, and a two-state machine pairs open and close markers.

use crate::error::{Diagnostic, Severity};
use crate::types::{RawBlock, Span};

/// The literal tokens that delimit a docblock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    /// A line that is exactly this token (after trimming) opens a block.
    pub open: String,
    /// Leading token of every line inside a block.
    pub continuation: String,
    /// A line that is exactly this token (after trimming) closes a block.
    pub close: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            open: "/**".to_string(),
            continuation: "*".to_string(),
            close: "*/".to_string(),
        }
    }
}

/// Result of scanning one file.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Closed blocks, in source order.
    pub blocks: Vec<RawBlock>,
    /// Non-fatal findings, e.g. a block left open at end of file.
    pub diagnostics: Vec<Diagnostic>,
}

enum State {
    Searching,
    Capturing { start: usize, buffer: Vec<String> },
}

/// Scan lines with the default markers and return the closed blocks.
pub fn scan(lines: &[&str]) -> Vec<RawBlock> {
    scan_with(lines, &Markers::default()).blocks
}

/// Scan a whole file's text with the given markers.
pub fn scan_source(text: &str, markers: &Markers) -> ScanResult {
    let lines: Vec<&str> = text.lines().collect();
    scan_with(&lines, markers)
}

/// Scan lines for docblocks delimited by `markers`.
///
/// Never fails: a file without blocks yields an empty result. A block that
/// is still open at end of input is dropped and reported as a warning.
pub fn scan_with(lines: &[&str], markers: &Markers) -> ScanResult {
    let mut result = ScanResult::default();
    let mut state = State::Searching;

    let marked = lines.iter().enumerate().filter(|(_, line)| {
        let s = line.trim_start();
        s.starts_with(&markers.open)
            || s.starts_with(&markers.continuation)
            || s.starts_with(&markers.close)
    });

    for (idx, line) in marked {
        state = match state {
            State::Searching => {
                if line.trim() == markers.open {
                    State::Capturing {
                        start: idx,
                        buffer: Vec::new(),
                    }
                } else {
                    State::Searching
                }
            }
            State::Capturing { start, mut buffer } => {
                if line.trim() == markers.close {
                    result.blocks.push(RawBlock {
                        lines: Span {
                            start_line: start + 1,
                            end_line: idx + 1,
                        },
                        markdown: block_markdown(&buffer),
                        following_line: lines.get(idx + 1).map(|l| (*l).to_string()),
                    });
                    State::Searching
                } else {
                    buffer.push(strip_continuation(line, &markers.continuation).to_string());
                    State::Capturing { start, buffer }
                }
            }
        };
    }

    if let State::Capturing { start, .. } = state {
        result.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message: format!(
                "Docblock opened at line {} is never closed; its content is ignored",
                start + 1
            ),
            span: Some(Span {
                start_line: start + 1,
                end_line: lines.len(),
            }),
            code: Some("S001".into()),
        });
    }

    result
}

/// Join captured lines, dropping blank lines at either end.
fn block_markdown(buffer: &[String]) -> String {
    let first = buffer.iter().position(|line| !line.trim().is_empty()).unwrap_or(buffer.len());
    buffer[first..].join("\n").trim_end().to_string()
}

/// Strip leading whitespace, then one `<continuation><space>` prefix.
fn strip_continuation<'a>(line: &'a str, continuation: &str) -> &'a str {
    let s = line.trim_start();
    if s == continuation {
        return "";
    }
    match s.strip_prefix(continuation) {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(s),
        None => s,
    }
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------
