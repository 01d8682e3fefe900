use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use gearsdoc_core::{Classifier, CommonMarkRenderer, DocBlock, Markers, Severity, default_context_rules, scan_source};
use serde::Serialize;

mod config;
mod generate;

#[derive(Parser)]
#[command(name = "gearsdoc", version, about = "Static documentation sites from docblocks")]
struct Cli {
    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Show debug logs, including unresolved links
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ScanFormat {
    Terminal,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the documentation site
    Generate(generate::GenerateArgs),

    /// Show the docblocks extracted from one file
    Scan {
        /// Path to the source file
        file: String,

        /// Output format
        #[arg(long, value_enum, default_value = "terminal")]
        format: ScanFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_logging(&cli)?;

    match cli.command {
        Commands::Generate(args) => {
            generate::handle_generate(&args, cli.quiet)?;
        }
        Commands::Scan { file, format } => {
            handle_scan(&file, format)?;
        }
    }

    Ok(())
}

/// Install the stderr tracing subscriber: WARN by default, DEBUG with
/// `--verbose`, ERROR with `--quiet`.
fn initialize_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else if cli.quiet {
        tracing::Level::ERROR
    } else {
        tracing::Level::WARN
    };

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }
    Ok(())
}

#[derive(Serialize)]
struct ScanOutput<'a> {
    file: &'a str,
    blocks: &'a [DocBlock],
    diagnostics: &'a [gearsdoc_core::Diagnostic],
}

fn handle_scan(file: &str, format: ScanFormat) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Failed to read '{}': {}", file, e))?;

    let result = scan_source(&content, &Markers::default());
    let rules = default_context_rules();
    let classifier = Classifier::new(&CommonMarkRenderer, &rules);
    let blocks: Vec<DocBlock> = result.blocks.iter().map(|raw| classifier.classify(raw)).collect();

    match format {
        ScanFormat::Terminal => {
            println!("{}", gearsdoc_core::render_term::to_terminal(file, &blocks));
        }
        ScanFormat::Json => {
            let output = ScanOutput {
                file,
                blocks: &blocks,
                diagnostics: &result.diagnostics,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    // Print scan diagnostics to stderr
    for diag in &result.diagnostics {
        let severity_str = match diag.severity {
            Severity::Error => format!("{}", "error".red().bold()),
            Severity::Warning => format!("{}", "warning".yellow().bold()),
            Severity::Info => format!("{}", "info".cyan().bold()),
        };
        let line_info = match diag.span {
            Some(span) => format!("{}:{}", file, span.start_line),
            None => file.to_string(),
        };
        let code_str = match &diag.code {
            Some(c) => format!("[{}] ", c),
            None => String::new(),
        };
        eprintln!("{line_info}: {severity_str}: {code_str}{}", diag.message);
    }

    Ok(())
}
