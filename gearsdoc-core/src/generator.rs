//! The two-pass site generator.
//!
//! Pass one walks the input, scans and classifies every file, and fills the
//! navigation tree, the search index and the all-pages block map. Pass two
//! renders every page against the now complete tree and map: nav, link
//! resolution, template, write. A page can only be rendered once every
//! other page is known, so the passes never interleave.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::assets::AssetBundle;
use crate::classify::Classifier;
use crate::error::{Diagnostic, GenerateError};
use crate::fs::{FsWriter, OutputWriter, TreeWalker, WalkdirWalker, prepare_output_root, strip_trailing_slash};
use crate::links::{LinkResolver, output_key};
use crate::markdown::{CommonMarkRenderer, MarkdownRenderer};
use crate::nav::{NavLeaf, NavTree};
use crate::render_html::{SiteData, render_additional_page, render_doc_page, render_home_page};
use crate::scan::{Markers, scan_source};
use crate::search::SearchIndex;
use crate::types::{ContextRule, DocBlock, FileBlocks, HeaderLink, PageKind, SourceFile, default_context_rules};

/// Name of the marker file written at the output root.
pub const BASE_MARKER: &str = "base.html";

/// Name of the generated home page.
pub const HOME_PAGE: &str = "index.html";

/// Extensions scanned when none are configured.
pub fn default_extensions() -> Vec<String> {
    ["php", "js", "css", "less", "sccs"].iter().map(|e| e.to_string()).collect()
}

/// Everything a run needs to know, one field per option.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub project_name: String,
    /// Root of the scanned source tree.
    pub input: PathBuf,
    /// Root of the generated site. Must already exist.
    pub output: PathBuf,
    /// Directory prefixes or glob patterns excluded from the walk.
    pub ignore: Vec<String>,
    pub extensions: Vec<String>,
    pub header_links: Vec<HeaderLink>,
    /// Markdown document rendered as the home page.
    pub index: Option<PathBuf>,
    /// Directory of extra markdown documents merged into the site.
    pub additional_docs: Option<PathBuf>,
    pub context_rules: Vec<ContextRule>,
    pub markers: Markers,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            project_name: "GearsDoc".to_string(),
            input: PathBuf::from("./src"),
            output: PathBuf::from("./docs"),
            ignore: Vec::new(),
            extensions: default_extensions(),
            header_links: Vec::new(),
            index: None,
            additional_docs: None,
            context_rules: default_context_rules(),
            markers: Markers::default(),
        }
    }
}

/// What a run produced.
#[derive(Debug, Clone, Default)]
pub struct GenerateReport {
    /// Every file written, in write order.
    pub written: Vec<PathBuf>,
    /// Documented pages (source files and additional documents).
    pub pages: usize,
    pub blocks: usize,
    pub search_records: usize,
    /// Matched source files without a single docblock.
    pub skipped: usize,
    /// Scanner findings, keyed by relative pathname.
    pub diagnostics: Vec<(String, Diagnostic)>,
}

/// Owns the options and the swappable collaborators of a run.
pub struct Generator {
    options: GeneratorOptions,
    markdown: Box<dyn MarkdownRenderer>,
    walker: Box<dyn TreeWalker>,
    writer: Box<dyn OutputWriter>,
}

impl Generator {
    /// A generator with the default collaborators.
    pub fn new(options: GeneratorOptions) -> Self {
        Self::with_collaborators(
            options,
            Box::new(CommonMarkRenderer),
            Box::new(WalkdirWalker),
            Box::new(FsWriter),
        )
    }

    pub fn with_collaborators(
        mut options: GeneratorOptions,
        markdown: Box<dyn MarkdownRenderer>,
        walker: Box<dyn TreeWalker>,
        writer: Box<dyn OutputWriter>,
    ) -> Self {
        options.input = normalize_path(&options.input);
        options.output = normalize_path(&options.output);
        Self {
            options,
            markdown,
            walker,
            writer,
        }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generate the whole site.
    ///
    /// Fails before touching anything if the output root is missing or
    /// read-only; otherwise empties it and writes every page and asset.
    pub fn run(&self) -> Result<GenerateReport, GenerateError> {
        let output = &self.options.output;
        prepare_output_root(output)?;

        let mut report = GenerateReport::default();
        self.write(&mut report, output.join(BASE_MARKER), b"<!-- gearsdoc site root -->\n")?;

        let classifier = Classifier::new(self.markdown.as_ref(), &self.options.context_rules);
        let output_root = output.to_string_lossy().replace('\\', "/");

        // Pass one: everything that later pages may refer to.
        let mut nav = NavTree::new();
        let mut search = SearchIndex::new();
        let mut pages: BTreeMap<String, FileBlocks> = BTreeMap::new();

        let files = self
            .walker
            .walk(&self.options.input, &self.options.extensions, &self.options.ignore)?;
        tracing::debug!(count = files.len(), input = %self.options.input.display(), "input files found");

        for file in files {
            tracing::debug!(path = %file.path.display(), "scanning");
            let scanned = scan_source(&file.contents, &self.options.markers);
            for diagnostic in scanned.diagnostics {
                tracing::warn!(path = %file.path.display(), "{}", diagnostic.message);
                report.diagnostics.push((file.relative_pathname.clone(), diagnostic));
            }
            if scanned.blocks.is_empty() {
                report.skipped += 1;
                continue;
            }
            let blocks: Vec<DocBlock> = scanned.blocks.iter().map(|raw| classifier.classify(raw)).collect();
            add_page(&mut nav, &mut search, &mut pages, &output_root, file, PageKind::Doc, blocks);
        }

        if nav.is_empty() {
            tracing::warn!(input = %self.options.input.display(), "no docblocks found in any source file");
        }

        if let Some(dir) = &self.options.additional_docs {
            let documents = self.walker.walk(dir, &["md".to_string()], &self.options.ignore)?;
            for file in documents {
                let key = output_key(&output_root, &file.relative_pathname);
                if pages.contains_key(&key) {
                    tracing::warn!(
                        file = %file.relative_pathname,
                        "additional document would overwrite a source page, skipped"
                    );
                    continue;
                }
                let blocks = classifier.classify_pseudo(&file.contents);
                if blocks.is_empty() {
                    report.skipped += 1;
                    continue;
                }
                add_page(&mut nav, &mut search, &mut pages, &output_root, file, PageKind::Additional, blocks);
            }
        }

        let home = match &self.options.index {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|source| GenerateError::Read {
                    path: path.clone(),
                    source,
                })?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "index.md".to_string());
                let blocks = classifier.classify_pseudo(&contents);
                Some(FileBlocks {
                    file: SourceFile::new(name, path.clone(), contents),
                    kind: PageKind::Additional,
                    blocks,
                })
            }
            None => None,
        };

        // Pass two: render against the complete tree and block map.
        let assets = AssetBundle::new();
        let records_json = search.records_json();
        let lookup_json = search.lookup_json();
        let site = SiteData {
            project_name: &self.options.project_name,
            header_links: &self.options.header_links,
            assets: &assets,
            search_records_json: &records_json,
            search_lookup_json: &lookup_json,
        };

        for page in pages.values() {
            let rendered_nav = nav.render(&page.file.relative_pathname);
            let resolver = LinkResolver::new(&pages, &rendered_nav.relative_urls, &output_root);
            let blocks = resolver.resolve(page);
            let html = match page.kind {
                PageKind::Doc => render_doc_page(&site, &rendered_nav, &page.file, &blocks),
                PageKind::Additional => render_additional_page(&site, &rendered_nav, &page.file, &blocks),
            };
            let target = output.join(page.file.html_pathname());
            self.write(&mut report, target, html.as_bytes())?;
            report.pages += 1;
            report.blocks += blocks.len();
        }

        if pages.contains_key(&output_key(&output_root, HOME_PAGE)) {
            tracing::warn!("a documented page is named {HOME_PAGE}, home page not generated");
        } else {
            let rendered_nav = nav.render(HOME_PAGE);
            let sections = home.as_ref().map(|home| {
                LinkResolver::new(&pages, &rendered_nav.relative_urls, &output_root).resolve(home)
            });
            let html = render_home_page(&site, &rendered_nav, sections.as_deref());
            self.write(&mut report, output.join(HOME_PAGE), html.as_bytes())?;
        }

        for asset in assets.files() {
            self.write(&mut report, output.join(&asset.path), &asset.contents)?;
        }

        report.search_records = search.len();
        Ok(report)
    }

    fn write(&self, report: &mut GenerateReport, path: PathBuf, contents: &[u8]) -> Result<(), GenerateError> {
        self.writer.write(&path, contents)?;
        tracing::info!(path = %path.display(), "written");
        report.written.push(path);
        Ok(())
    }
}

fn add_page(
    nav: &mut NavTree,
    search: &mut SearchIndex,
    pages: &mut BTreeMap<String, FileBlocks>,
    output_root: &str,
    file: SourceFile,
    kind: PageKind,
    blocks: Vec<DocBlock>,
) {
    nav.add_file(
        file.relative_path(),
        NavLeaf::new(&file.relative_pathname, &file.extension),
    );
    search.index(&file.relative_pathname, &blocks);
    pages.insert(
        output_key(output_root, &file.relative_pathname),
        FileBlocks { file, kind, blocks },
    );
}

fn normalize_path(path: &Path) -> PathBuf {
    PathBuf::from(strip_trailing_slash(&path.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Walker serving an in-memory tree.
    struct MemoryWalker(Vec<(&'static str, &'static str)>);

    impl TreeWalker for MemoryWalker {
        fn walk(&self, _root: &Path, extensions: &[String], _ignore: &[String]) -> Result<Vec<SourceFile>, GenerateError> {
            Ok(self
                .0
                .iter()
                .map(|(path, contents)| SourceFile::new(*path, PathBuf::from(path), contents.to_string()))
                .filter(|f| extensions.contains(&f.extension))
                .collect())
        }
    }

    /// Writer recording into a shared map.
    #[derive(Clone, Default)]
    struct MemoryWriter(Rc<RefCell<BTreeMap<PathBuf, String>>>);

    impl OutputWriter for MemoryWriter {
        fn write(&self, path: &Path, contents: &[u8]) -> Result<(), GenerateError> {
            self.0
                .borrow_mut()
                .insert(path.to_path_buf(), String::from_utf8_lossy(contents).into_owned());
            Ok(())
        }
    }

    fn scratch_output(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gearsdoc-gen-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn run_memory(name: &str, tree: Vec<(&'static str, &'static str)>) -> (GenerateReport, BTreeMap<PathBuf, String>, PathBuf) {
        let output = scratch_output(name);
        let writer = MemoryWriter::default();
        let options = GeneratorOptions {
            output: output.clone(),
            ..GeneratorOptions::default()
        };
        let generator = Generator::with_collaborators(
            options,
            Box::new(CommonMarkRenderer),
            Box::new(MemoryWalker(tree)),
            Box::new(writer.clone()),
        );
        let report = generator.run().unwrap();
        let files = writer.0.borrow().clone();
        (report, files, output)
    }

    #[test]
    fn missing_output_is_fatal() {
        let options = GeneratorOptions {
            output: std::env::temp_dir().join("gearsdoc-gen-no-such-dir/"),
            ..GeneratorOptions::default()
        };
        let err = Generator::new(options).run().unwrap_err();
        assert!(matches!(err, GenerateError::OutputMissing { .. }));
        assert!(err.to_string().contains("gearsdoc-gen-no-such-dir"));
    }

    #[test]
    fn files_without_blocks_get_no_page() {
        let (report, files, output) = run_memory(
            "skip",
            vec![
                ("a.php", "<?php\n/**\n * # Class: A\n */\nclass A {}\n"),
                ("b.php", "<?php\nclass B {}\n"),
            ],
        );
        assert_eq!(report.pages, 1);
        assert_eq!(report.skipped, 1);
        assert!(files.contains_key(&output.join("a.html")));
        assert!(!files.contains_key(&output.join("b.html")));
        assert!(files.contains_key(&output.join(BASE_MARKER)));
        assert!(files.contains_key(&output.join(HOME_PAGE)));
    }

    #[test]
    fn cross_page_links_resolve_in_pass_two() {
        let (_, files, output) = run_memory(
            "links",
            vec![
                ("a.php", "<?php\n/**\n * # Class: A\n *\n * Uses [Method: run](b/c.php).\n */\nclass A {}\n"),
                ("b/c.php", "<?php\n/**\n * # Class: C\n */\nclass C {\n/**\n * # Method: run\n */\npublic function run() {}\n}\n"),
            ],
        );
        let a = &files[&output.join("a.html")];
        assert!(a.contains("<a href=\"b/c.html#1\" class=\"internal-link\">Method: run</a>"), "{a}");
    }

    #[test]
    fn unterminated_blocks_are_reported() {
        let (report, _, _) = run_memory("diag", vec![("a.js", "/**\n * # Fine\n */\nx();\n/**\n * open\n")]);
        assert_eq!(report.blocks, 1);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].0, "a.js");
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let generator = Generator::new(GeneratorOptions {
            input: PathBuf::from("src/"),
            output: PathBuf::from("docs/"),
            ..GeneratorOptions::default()
        });
        assert_eq!(generator.options().input, PathBuf::from("src"));
        assert_eq!(generator.options().output, PathBuf::from("docs"));
    }
}
