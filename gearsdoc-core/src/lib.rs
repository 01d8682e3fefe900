//! Docblock extraction and cross-reference engine for gearsdoc.
//!
//! Scans a source tree for `/** ... */` docblocks, renders their markdown,
//! and emits a static site with a navigation tree, client-side search and
//! links that resolve to other blocks or to exact source lines.
//!
//! # Quick start
//!
//! ```
//! use gearsdoc_core::{Classifier, CommonMarkRenderer, default_context_rules, scan};
//!
//! let source = ["/**", " * # Class: Widget", " *", " * Some body.", " */", "class Widget"];
//! let raw = scan(&source);
//! assert_eq!(raw.len(), 1);
//!
//! let rules = default_context_rules();
//! let block = Classifier::new(&CommonMarkRenderer, &rules).classify(&raw[0]);
//! assert_eq!(block.title.as_deref(), Some("Class: Widget"));
//! assert_eq!(block.context, "primary");
//! assert_eq!(block.signature.as_deref(), Some("class Widget"));
//! ```

pub mod assets;
pub mod classify;
pub mod error;
pub mod fs;
pub mod generator;
pub mod html;
pub mod links;
pub mod markdown;
pub mod nav;
pub mod render_html;
#[cfg(feature = "terminal")]
pub mod render_term;
pub mod scan;
pub mod search;
pub mod types;

pub use classify::{Classifier, classify_context};
pub use error::*;
pub use fs::{FsWriter, OutputWriter, TreeWalker, WalkdirWalker};
pub use generator::{GenerateReport, Generator, GeneratorOptions, default_extensions};
pub use links::LinkResolver;
pub use markdown::{CommonMarkRenderer, MarkdownRenderer};
pub use nav::{NavItem, NavLeaf, NavTree, RenderedNav};
pub use scan::{Markers, ScanResult, scan, scan_source};
pub use search::SearchIndex;
pub use types::*;
