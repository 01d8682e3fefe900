use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::Span;

/// Fatal errors that abort a generation run.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Output folder '{}' does not exist, please create it first", path.display())]
    OutputMissing { path: PathBuf },

    #[error("Output folder '{}' is not writable", path.display())]
    OutputNotWritable { path: PathBuf },

    #[error("Failed to clean output folder '{}': {source}", path.display())]
    Clean {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to walk '{}': {source}", path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A diagnostic message produced while scanning a source file.
///
/// Diagnostics are non-fatal: the scanner keeps going and produces a
/// best-effort block list even when diagnostics are emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}
