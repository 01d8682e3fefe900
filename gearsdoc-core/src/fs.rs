//! Filesystem collaborators: the input tree walker and the output writer.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::GenerateError;
use crate::types::{SourceFile, extension_of};

/// Yields the documented files below a root directory.
pub trait TreeWalker {
    /// Every file under `root` whose extension is in `extensions` and that no
    /// `ignore` entry matches, in a repeatable order.
    fn walk(&self, root: &Path, extensions: &[String], ignore: &[String]) -> Result<Vec<SourceFile>, GenerateError>;
}

/// Writes generated files.
pub trait OutputWriter {
    /// Write `contents` to `path`, creating parent directories as needed.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), GenerateError>;
}

/// [`TreeWalker`] backed by `walkdir`, sorted by file name.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkdirWalker;

impl TreeWalker for WalkdirWalker {
    fn walk(&self, root: &Path, extensions: &[String], ignore: &[String]) -> Result<Vec<SourceFile>, GenerateError> {
        let ignore = IgnoreSet::new(ignore);
        let mut files = Vec::new();

        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|source| GenerateError::Walk {
                path: root.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = relative_pathname(root, entry.path());
            let extension = extension_of(&relative);
            if !extensions.iter().any(|e| e.eq_ignore_ascii_case(extension)) {
                continue;
            }
            if ignore.matches(&relative) {
                tracing::debug!(file = %relative, "ignored");
                continue;
            }

            let bytes = std::fs::read(entry.path()).map_err(|source| GenerateError::Read {
                path: entry.path().to_path_buf(),
                source,
            })?;
            let contents = String::from_utf8_lossy(&bytes).into_owned();
            files.push(SourceFile::new(relative, entry.path().to_path_buf(), contents));
        }

        Ok(files)
    }
}

/// [`OutputWriter`] that writes straight to disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWriter;

impl OutputWriter for FsWriter {
    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), GenerateError> {
        let to_error = |source| GenerateError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(to_error)?;
        }
        std::fs::write(path, contents).map_err(to_error)
    }
}

/// Exclusion rules for the walker.
///
/// An entry excludes a file when it names one of the file's directories by
/// path prefix (`vendor`, `lib/legacy`) or the file itself, or when it is a
/// glob pattern matching the file's relative path.
#[derive(Debug, Default)]
pub struct IgnoreSet {
    prefixes: Vec<String>,
    patterns: Vec<glob::Pattern>,
}

impl IgnoreSet {
    pub fn new(entries: &[String]) -> Self {
        let mut set = Self::default();
        for entry in entries {
            let entry = normalize_relative(entry);
            if entry.is_empty() {
                continue;
            }
            if entry.contains(['*', '?', '[']) {
                match glob::Pattern::new(&entry) {
                    Ok(pattern) => set.patterns.push(pattern),
                    Err(e) => {
                        tracing::warn!(pattern = %entry, error = %e, "invalid ignore pattern, matching it literally");
                        set.prefixes.push(entry);
                    }
                }
            } else {
                set.prefixes.push(entry);
            }
        }
        set
    }

    pub fn matches(&self, relative_pathname: &str) -> bool {
        self.prefixes.iter().any(|prefix| {
            relative_pathname == prefix
                || relative_pathname
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        }) || self.patterns.iter().any(|p| p.matches(relative_pathname))
    }
}

fn normalize_relative(entry: &str) -> String {
    let entry = entry.trim();
    let entry = entry.strip_prefix("./").unwrap_or(entry);
    strip_trailing_slash(entry).to_string()
}

/// Strip a single trailing `/` from a configured path.
pub fn strip_trailing_slash(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => path,
    }
}

/// Slash-separated path of `path` relative to `root`.
fn relative_pathname(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Check the output root exists and is writable, then empty it.
pub fn prepare_output_root(root: &Path) -> Result<(), GenerateError> {
    let metadata = std::fs::metadata(root).map_err(|_| GenerateError::OutputMissing {
        path: root.to_path_buf(),
    })?;
    if !metadata.is_dir() {
        return Err(GenerateError::OutputMissing {
            path: root.to_path_buf(),
        });
    }
    if metadata.permissions().readonly() {
        return Err(GenerateError::OutputNotWritable {
            path: root.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(root).map_err(|source| GenerateError::Clean {
        path: root.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| GenerateError::Clean {
            path: root.to_path_buf(),
            source,
        })?;
        let path: PathBuf = entry.path();
        let removed = if entry.file_type().is_ok_and(|t| t.is_dir()) {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        removed.map_err(|source| GenerateError::Clean { path, source })?;
    }

    tracing::debug!(root = %root.display(), "output root cleaned");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gearsdoc-fs-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ignore_prefixes_are_segment_aware() {
        let set = IgnoreSet::new(&strings(&["vendor/", "./lib/legacy"]));
        assert!(set.matches("vendor/a.php"));
        assert!(set.matches("lib/legacy/old/x.js"));
        assert!(!set.matches("vendors/a.php"));
        assert!(!set.matches("lib/legacyish.js"));
    }

    #[test]
    fn ignore_globs() {
        let set = IgnoreSet::new(&strings(&["**/*.min.js", "tests/*"]));
        assert!(set.matches("lib/jquery.min.js"));
        assert!(set.matches("tests/a.php"));
        assert!(!set.matches("lib/app.js"));
    }

    #[test]
    fn trailing_slash_stripped_once() {
        assert_eq!(strip_trailing_slash("src/"), "src");
        assert_eq!(strip_trailing_slash("src//"), "src/");
        assert_eq!(strip_trailing_slash("/"), "/");
    }

    #[test]
    fn walker_filters_and_sorts() {
        let root = scratch("walk");
        std::fs::create_dir_all(root.join("b")).unwrap();
        std::fs::create_dir_all(root.join("vendor")).unwrap();
        std::fs::write(root.join("z.php"), "z").unwrap();
        std::fs::write(root.join("a.JS"), "a").unwrap();
        std::fs::write(root.join("b/c.php"), "c").unwrap();
        std::fs::write(root.join("notes.txt"), "n").unwrap();
        std::fs::write(root.join("vendor/v.php"), "v").unwrap();

        let files = WalkdirWalker
            .walk(&root, &strings(&["php", "js"]), &strings(&["vendor"]))
            .unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.relative_pathname.as_str()).collect();
        assert_eq!(names, vec!["a.JS", "b/c.php", "z.php"]);
        assert_eq!(files[1].contents, "c");

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn writer_creates_parents() {
        let root = scratch("write");
        let target = root.join("deep/er/page.html");
        FsWriter.write(&target, b"<html>").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "<html>");
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn prepare_requires_existing_root_and_cleans_it() {
        let missing = std::env::temp_dir().join("gearsdoc-fs-definitely-missing");
        let _ = std::fs::remove_dir_all(&missing);
        assert!(matches!(
            prepare_output_root(&missing),
            Err(GenerateError::OutputMissing { .. })
        ));

        let root = scratch("clean");
        std::fs::create_dir_all(root.join("old/dir")).unwrap();
        std::fs::write(root.join("old/dir/x.html"), "x").unwrap();
        std::fs::write(root.join("stale.html"), "x").unwrap();
        prepare_output_root(&root).unwrap();
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
        let _ = std::fs::remove_dir_all(&root);
    }
}
