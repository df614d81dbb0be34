use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use deprecheck_core::{Config, RecordingSink, Report, Severity, CONFIG_FILE_NAME};
use deprecheck_engine::{AnalysisPipeline, DeprecationDetector, SymbolIndex, UnitOutcome, Workspace};
use deprecheck_java::{JavaParser, ParseError, SourceUnit};

/// deprecheck - Deprecated API usage checks for Java sources
#[derive(Parser)]
#[command(name = "deprecheck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: <root>/deprecheck.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Workspace root (default: current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report usages of deprecated members
    Check {
        /// Output file for report.json
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Also output markdown report
        #[arg(short, long)]
        markdown: Option<PathBuf>,

        /// Exit with an error when any usage is found
        #[arg(long)]
        deny_warnings: bool,

        /// Files to check (default: every file in the workspace)
        files: Vec<PathBuf>,
    },

    /// List the members known to the symbol index
    Symbols {
        /// Only list deprecated members
        #[arg(short, long)]
        deprecated: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    let config = load_config(cli.config.as_deref(), cli.root.as_deref(), cli.verbose)?;

    match cli.command {
        Commands::Check {
            output,
            markdown,
            deny_warnings,
            files,
        } => check_command(&config, &output, markdown.as_deref(), deny_warnings, &files, cli.verbose).await,
        Commands::Symbols { deprecated } => symbols_command(&config, deprecated, cli.verbose),
    }
}

fn load_config(path: Option<&Path>, root: Option<&Path>, verbose: bool) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            Config::from_file(path).with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            let root = match root {
                Some(root) => root.to_path_buf(),
                None => std::env::current_dir()?,
            };
            Config::discover(&root)?
        }
    };

    if let Some(root) = root {
        config.project_root = root.to_path_buf();
    }

    if verbose {
        if path.is_none() && !config.project_root.join(CONFIG_FILE_NAME).exists() {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        eprintln!("{} {}", "Workspace root:".cyan(), config.project_root.display());
    }

    Ok(config)
}

/// Discover and parse the workspace
fn load_workspace(
    config: &Config,
    parser: &JavaParser,
    verbose: bool,
) -> Result<(Workspace, Vec<SourceUnit>, Vec<ParseError>)> {
    let workspace = Workspace::discover(config)?;

    if verbose {
        eprintln!(
            "{} {} Java files in {} source roots",
            "Found".cyan(),
            workspace.files().len(),
            workspace.source_roots().len()
        );
    }

    let (units, failures) = workspace.load_units(parser);
    if verbose && !failures.is_empty() {
        eprintln!("  {} files failed to parse", failures.len().to_string().red());
    }

    Ok((workspace, units, failures))
}

/// Check command - report deprecated member usages
async fn check_command(
    config: &Config,
    output: &Path,
    markdown: Option<&Path>,
    deny_warnings: bool,
    files: &[PathBuf],
    verbose: bool,
) -> Result<()> {
    let parser = JavaParser::new();
    let (workspace, units, parse_failures) = load_workspace(config, &parser, verbose)?;

    let index = SymbolIndex::from_units(&units);
    let stats = index.stats();
    if verbose {
        eprintln!(
            "{} {} types, {} members ({} deprecated)",
            "Indexed".cyan(),
            stats.types,
            stats.members,
            stats.deprecated
        );
    }

    let mut report = Report::new();
    let targets = if files.is_empty() {
        for failure in &parse_failures {
            report.add_failure(failure.unit(), failure.to_string());
        }
        units
    } else {
        select_units(units, files, &parser, &mut report)
    };

    if verbose {
        eprintln!("{} {} files...", "Checking".cyan(), targets.len());
    }

    let pipeline = AnalysisPipeline::new(
        DeprecationDetector::from_config(config.deprecation.clone()),
        Arc::new(index),
    );
    let sink = Arc::new(RecordingSink::new());

    // Units are independent; analyze them on the blocking pool
    let tasks: Vec<_> = targets
        .into_iter()
        .map(|unit| {
            let pipeline = pipeline.clone();
            let sink = Arc::clone(&sink);
            tokio::task::spawn_blocking(move || {
                let outcome = pipeline.run_unit(&unit, &*sink);
                (unit, outcome)
            })
        })
        .collect();

    for task in tasks {
        let (unit, outcome) = task.await?;
        match outcome {
            UnitOutcome::Published { .. } => {
                let batch = sink.diagnostics_for(unit.id()).unwrap_or_default();
                report.add_unit(unit.id().clone(), unit.fingerprint(), batch);
            }
            UnitOutcome::Failed(err) => report.add_failure(unit.id().clone(), err.to_string()),
        }
    }

    report.metadata = Some(serde_json::json!({
        "root": config.project_root.display().to_string(),
        "sourceRoots": workspace
            .source_roots()
            .iter()
            .map(|p| workspace.relative_path(p))
            .collect::<Vec<_>>(),
        "index": stats,
    }));

    // Save JSON report
    report.save_to_file(output)?;

    if verbose {
        eprintln!("{} {}", "Report saved to:".green(), output.display());
    }

    // Save markdown report if requested
    if let Some(md_path) = markdown {
        std::fs::write(md_path, generate_markdown_report(&report, &workspace))?;
        if verbose {
            eprintln!("{} {}", "Markdown report saved to:".green(), md_path.display());
        }
    }

    print_report_summary(&report, &workspace);

    if report.has_errors() || report.has_failures() || (deny_warnings && report.summary.total > 0) {
        std::process::exit(1);
    }

    Ok(())
}

/// Pick the requested files out of the parsed workspace
///
/// Files outside the source roots are parsed on their own; they are checked
/// against the workspace index but do not contribute to it.
fn select_units(units: Vec<SourceUnit>, files: &[PathBuf], parser: &JavaParser, report: &mut Report) -> Vec<SourceUnit> {
    let mut by_path: HashMap<PathBuf, SourceUnit> = units
        .into_iter()
        .filter_map(|unit| {
            let path = std::fs::canonicalize(unit.id().as_str()).ok()?;
            Some((path, unit))
        })
        .collect();

    let mut selected = Vec::with_capacity(files.len());
    for file in files {
        let found = std::fs::canonicalize(file)
            .ok()
            .and_then(|path| by_path.remove(&path));

        match found {
            Some(unit) => selected.push(unit),
            None => match parser.parse_file(file) {
                Ok(unit) => selected.push(unit),
                Err(err) => report.add_failure(err.unit(), err.to_string()),
            },
        }
    }

    selected
}

/// Symbols command - list indexed members
fn symbols_command(config: &Config, deprecated_only: bool, verbose: bool) -> Result<()> {
    let parser = JavaParser::new();
    let (_, units, _) = load_workspace(config, &parser, verbose)?;
    let index = SymbolIndex::from_units(&units);
    let stats = index.stats();

    let symbols: Vec<_> = index
        .symbols()
        .into_iter()
        .filter(|symbol| !deprecated_only || symbol.deprecated)
        .collect();

    for symbol in &symbols {
        let kind = format!("{:<7}", symbol.kind.to_string());
        if !symbol.deprecated {
            println!("  {} {}", kind.dimmed(), symbol.qualified_name);
            continue;
        }

        print!("  {} {} {}", kind.dimmed(), symbol.qualified_name.yellow(), "deprecated".yellow().bold());
        if symbol.for_removal {
            print!(" {}", "for removal".red().bold());
        }
        if let Some(replacement) = &symbol.replacement {
            print!(" (use {})", replacement.green());
        }
        println!();
    }

    println!();
    println!(
        "{} members listed, {} types indexed, {} deprecated members",
        symbols.len(),
        stats.types,
        stats.deprecated
    );

    Ok(())
}

fn location(workspace: &Workspace, unit: &deprecheck_core::UnitId, diagnostic: &deprecheck_core::Diagnostic) -> String {
    format!(
        "{}:{}",
        workspace.relative_path(Path::new(unit.as_str())),
        diagnostic.span.start
    )
}

/// Print report summary to console
fn print_report_summary(report: &Report, workspace: &Workspace) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Deprecated API Usage Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Version: {}", report.version);
    println!("Timestamp: {}", report.timestamp);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Files analyzed: {}", report.summary.units_analyzed);
    if report.summary.units_failed > 0 {
        println!("  Files failed:   {}", report.summary.units_failed.to_string().red().bold());
    }
    println!("  Total diagnostics: {}", report.summary.total);

    if report.summary.warnings > 0 {
        println!("  Warnings: {}", report.summary.warnings.to_string().yellow());
    } else {
        println!("  Warnings: {}", report.summary.warnings.to_string().green());
    }

    println!("  Info:     {}", report.summary.information);
    println!("  Hints:    {}", report.summary.hints);
    println!();

    if report.summary.total == 0 && report.failures.is_empty() {
        println!("{}", "✓ No deprecated usages found!".green().bold());
    }

    if report.summary.total > 0 {
        println!("{}", "Diagnostics:".bold());
        for (unit, diag) in report.diagnostics() {
            let severity_str = match diag.severity {
                Severity::Error => "ERROR".red().bold(),
                Severity::Warning => "WARN".yellow().bold(),
                Severity::Information => "INFO".cyan(),
                Severity::Hint => "HINT".dimmed(),
            };

            println!("  [{}] {}: {}", severity_str, diag.code, diag.message);
            println!("    at {}", location(workspace, unit, diag));
        }
        println!();
    }

    if !report.failures.is_empty() {
        println!("{}", "Failures:".bold());
        for failure in &report.failures {
            println!("  {} {}", "✗".red(), failure.error);
        }
        println!();
    }

    println!("{}", "=".repeat(60).bright_blue());
}

/// Generate markdown report
fn generate_markdown_report(report: &Report, workspace: &Workspace) -> String {
    let mut md = String::new();

    md.push_str("# Deprecated API Usage Report\n\n");
    md.push_str(&format!("**Version:** {}\n\n", report.version));
    md.push_str(&format!("**Timestamp:** {}\n\n", report.timestamp));

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- Files analyzed: {}\n", report.summary.units_analyzed));
    md.push_str(&format!("- Files failed: {}\n", report.summary.units_failed));
    md.push_str(&format!("- Total diagnostics: {}\n", report.summary.total));
    md.push_str(&format!("- Warnings: {}\n", report.summary.warnings));
    md.push_str(&format!("- Info: {}\n", report.summary.information));
    md.push_str(&format!("- Hints: {}\n", report.summary.hints));
    md.push('\n');

    if report.summary.total == 0 {
        md.push_str("✅ **No deprecated usages found!**\n");
    } else {
        md.push_str("## Diagnostics\n\n");

        for unit in report.units.iter().filter(|u| !u.diagnostics.is_empty()) {
            md.push_str(&format!(
                "### {}\n\n",
                workspace.relative_path(Path::new(unit.unit.as_str()))
            ));

            for diag in &unit.diagnostics {
                let severity_emoji = match diag.severity {
                    Severity::Error => "❌",
                    Severity::Warning => "⚠️",
                    Severity::Information | Severity::Hint => "ℹ️",
                };
                md.push_str(&format!(
                    "- {} **{}** line {}: {}\n",
                    severity_emoji,
                    diag.code,
                    diag.span.start.line + 1,
                    diag.message
                ));
            }
            md.push('\n');
        }
    }

    if !report.failures.is_empty() {
        md.push_str("## Failures\n\n");
        for failure in &report.failures {
            md.push_str(&format!("- `{}`: {}\n", failure.unit, failure.error));
        }
        md.push('\n');
    }

    md
}
