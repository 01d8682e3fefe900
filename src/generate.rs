//! `gearsdoc generate`: build the documentation site.
//!
//! Merges `gearsdoc.json` with the command-line flags, runs the generator
//! and, with `--watch`, keeps rebuilding whenever an input file changes.

use anyhow::{Context, Result};
use colored::Colorize;
use gearsdoc_core::{ContextRule, GenerateReport, Generator, GeneratorOptions, HeaderLink, Severity};
use notify::{EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crate::config::{self, GearsDocConfig};

#[derive(Debug, Default, clap::Args)]
pub struct GenerateArgs {
    /// Project name shown in the header bar
    #[arg(long)]
    pub name: Option<String>,

    /// Source directory to scan (default: ./src)
    #[arg(long)]
    pub input: Option<String>,

    /// Existing directory to write the site into (default: ./docs)
    #[arg(long)]
    pub output: Option<String>,

    /// Directory prefix or glob to exclude (repeatable)
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Markdown file rendered as the home page
    #[arg(long)]
    pub index: Option<String>,

    /// Header link as "[Text](href)" (repeatable)
    #[arg(long)]
    pub link: Vec<String>,

    /// Extra file extension to scan (repeatable)
    #[arg(long)]
    pub ext: Vec<String>,

    /// Directory of extra markdown documents to include
    #[arg(long)]
    pub additional_docs: Option<String>,

    /// Path to a gearsdoc.json config file
    #[arg(long)]
    pub config: Option<String>,

    /// Rebuild whenever an input file changes
    #[arg(long)]
    pub watch: bool,
}

pub fn handle_generate(args: &GenerateArgs, quiet: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let config = config::load_config(&cwd, args.config.as_deref().map(Path::new))?;
    let options = build_options(&config, args)?;

    build(&options, quiet)?;

    if args.watch {
        watch_and_rebuild(&options, quiet)?;
    }
    Ok(())
}

/// Combine config file values and flags. Flags win; `--ext` and `ext` only
/// ever add to the built-in extension list.
pub fn build_options(config: &GearsDocConfig, args: &GenerateArgs) -> Result<GeneratorOptions> {
    let mut options = GeneratorOptions::default();

    if let Some(name) = args.name.as_ref().or(config.name.as_ref()) {
        options.project_name = name.clone();
    }
    if let Some(input) = args.input.as_ref().or(config.input.as_ref()) {
        options.input = PathBuf::from(input);
    }
    if let Some(output) = args.output.as_ref().or(config.output.as_ref()) {
        options.output = PathBuf::from(output);
    }
    options.index = args.index.as_ref().or(config.index.as_ref()).map(PathBuf::from);
    options.additional_docs = args
        .additional_docs
        .as_ref()
        .or(config.additional_docs.as_ref())
        .map(PathBuf::from);

    options.ignore = config.ignore.iter().chain(&args.ignore).cloned().collect();

    for ext in config.ext.iter().chain(&args.ext) {
        let ext = ext.trim_start_matches('.').to_string();
        if !ext.is_empty() && !options.extensions.contains(&ext) {
            options.extensions.push(ext);
        }
    }

    for raw in config.links.iter().chain(&args.link) {
        let link = HeaderLink::parse(raw)
            .ok_or_else(|| anyhow::anyhow!("Invalid link '{}', expected \"[Text](href)\"", raw))?;
        options.header_links.push(link);
    }

    if !config.contexts.is_empty() {
        options.context_rules = config
            .contexts
            .iter()
            .map(|rule| ContextRule::new(&rule.prefix, &rule.context))
            .collect();
    }

    Ok(options)
}

fn build(options: &GeneratorOptions, quiet: bool) -> Result<GenerateReport> {
    let generator = Generator::new(options.clone());
    let report = generator.run()?;

    if !quiet {
        for path in &report.written {
            if path.extension().is_some_and(|e| e == "html") {
                println!("  {} {}", "page".dimmed(), path.display());
            }
        }
        print_summary(&report, &generator.options().output);
    }
    Ok(report)
}

fn print_summary(report: &GenerateReport, output: &Path) {
    println!(
        "{} {} pages, {} blocks, {} search records → {}",
        "Generated".green().bold(),
        report.pages,
        report.blocks,
        report.search_records,
        output.display(),
    );
    if report.skipped > 0 {
        println!("  {} {} files without docblocks", "skipped".dimmed(), report.skipped);
    }
    for (file, diag) in &report.diagnostics {
        let label = match diag.severity {
            Severity::Error => format!("{}", "error".red().bold()),
            Severity::Warning => format!("{}", "warning".yellow().bold()),
            Severity::Info => format!("{}", "info".cyan().bold()),
        };
        let line = diag
            .span
            .map(|span| format!("{}:{}", file, span.start_line))
            .unwrap_or_else(|| file.clone());
        println!("{line}: {label}: {}", diag.message);
    }
}

/// Watch the input directories and rebuild on each change.
///
/// Debounces rapid events (e.g. editors that write in stages) with a 200ms window.
/// Events under the output directory are ignored so a rebuild never triggers
/// itself. Ctrl+C exits cleanly.
pub fn watch_and_rebuild(options: &GeneratorOptions, quiet: bool) -> Result<()> {
    let output = std::fs::canonicalize(&options.output)
        .map_err(|e| anyhow::anyhow!("Cannot resolve path '{}': {}", options.output.display(), e))?;

    let mut watched = vec![options.input.clone()];
    watched.extend(options.additional_docs.clone());
    if let Some(index) = &options.index {
        watched.push(index.clone());
    }

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    for path in &watched {
        watcher
            .watch(path, RecursiveMode::Recursive)
            .map_err(|e| anyhow::anyhow!("Cannot watch '{}': {}", path.display(), e))?;
    }

    println!(
        "{} {} for changes (Ctrl+C to stop)",
        "Watching".cyan().bold(),
        options.input.display()
    );

    let mut last_rebuild = Instant::now();
    let debounce = Duration::from_millis(200);

    loop {
        match rx.recv_timeout(Duration::from_secs(1)) {
            Ok(event) => {
                let relevant = matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_));
                let outside_output = event.paths.iter().any(|p| !is_within(p, &output));

                if relevant && outside_output && last_rebuild.elapsed() > debounce {
                    // Small delay to let the editor finish writing
                    std::thread::sleep(Duration::from_millis(50));

                    match build(options, quiet) {
                        Ok(_) => {
                            last_rebuild = Instant::now();
                        }
                        Err(e) => {
                            eprintln!("{} {}", "Build error:".red().bold(), e);
                        }
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // Keep looping
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}

fn is_within(path: &Path, dir: &Path) -> bool {
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    path.starts_with(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gearsdoc_core::default_extensions;

    #[test]
    fn flags_override_config() {
        let config: GearsDocConfig = serde_json::from_str(
            r#"{ "name": "FromFile", "output": "site", "ignore": ["vendor"], "ext": ["ts"] }"#,
        )
        .unwrap();
        let args = GenerateArgs {
            name: Some("FromFlag".into()),
            ignore: vec!["tests".into()],
            ext: vec![".mjs".into(), "php".into()],
            ..GenerateArgs::default()
        };

        let options = build_options(&config, &args).unwrap();
        assert_eq!(options.project_name, "FromFlag");
        assert_eq!(options.output, PathBuf::from("site"));
        assert_eq!(options.input, PathBuf::from("./src"));
        assert_eq!(options.ignore, vec!["vendor".to_string(), "tests".to_string()]);

        let mut expected = default_extensions();
        expected.push("ts".into());
        expected.push("mjs".into());
        assert_eq!(options.extensions, expected);
    }

    #[test]
    fn links_are_parsed_and_validated() {
        let config = GearsDocConfig::default();
        let args = GenerateArgs {
            link: vec!["[Home](https://example.com)".into()],
            ..GenerateArgs::default()
        };
        let options = build_options(&config, &args).unwrap();
        assert_eq!(options.header_links[0].text, "Home");
        assert_eq!(options.header_links[0].href, "https://example.com");

        let bad = GenerateArgs {
            link: vec!["Home".into()],
            ..GenerateArgs::default()
        };
        let err = build_options(&config, &bad).unwrap_err();
        assert!(err.to_string().contains("Invalid link 'Home'"));
    }

    #[test]
    fn custom_context_rules_replace_defaults() {
        let config: GearsDocConfig =
            serde_json::from_str(r#"{ "contexts": [{ "prefix": "Hook:", "context": "danger" }] }"#).unwrap();
        let options = build_options(&config, &GenerateArgs::default()).unwrap();
        assert_eq!(options.context_rules, vec![ContextRule::new("hook:", "danger")]);
    }
}
