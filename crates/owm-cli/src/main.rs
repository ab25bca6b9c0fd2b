#![forbid(unsafe_code)]

//! OWM CLI - parse and validate Online Wardley Map sources.
//!
//! # Commands
//!
//! - `parse`: Output the map model (or a summary) as JSON
//! - `validate`: Report parse warnings and unresolved component references

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use owm_core::{ParserConfig, WardleyMap};
use owm_parser::{ParseReport, parse_summary_json, parse_with_config};
use serde::Serialize;
use tracing::{debug, info, warn};

/// OWM CLI - parse and validate Online Wardley Map sources.
#[derive(Debug, Parser)]
#[command(
    name = "owm",
    version,
    about = "Parse and validate Online Wardley Map (OWM) sources"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a map and output it as JSON.
    Parse {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output the full map model (default is summary)
        #[arg(long)]
        full: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        #[command(flatten)]
        limits: LimitArgs,
    },

    /// Validate a map and report diagnostics.
    Validate {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON (structured diagnostics)
        #[arg(long)]
        json: bool,

        /// Exit with non-zero status on warnings (not just errors)
        #[arg(long)]
        strict: bool,

        #[command(flatten)]
        limits: LimitArgs,
    },
}

/// Parser limits, from a TOML file and/or flags (flags win).
#[derive(Debug, Args)]
struct LimitArgs {
    /// TOML file with `max_input_bytes` / `max_line_chars`
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ignore input beyond this many bytes
    #[arg(long)]
    max_input_bytes: Option<usize>,

    /// Skip lines longer than this many characters
    #[arg(long)]
    max_line_chars: Option<usize>,
}

/// Result of validating a map.
#[derive(Debug, Serialize)]
struct ValidateResult {
    valid: bool,
    title: Option<String>,
    node_count: usize,
    edge_count: usize,
    blueline_count: usize,
    evolution_count: usize,
    note_count: usize,
    warnings: Vec<ValidationWarning>,
    errors: Vec<ValidationError>,
}

#[derive(Debug, Serialize)]
struct ValidationWarning {
    code: String,
    message: String,
    line: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ValidationError {
    code: String,
    message: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Parse {
            input,
            full,
            pretty,
            limits,
        } => cmd_parse(&input, full, pretty, &limits),

        Command::Validate {
            input,
            json,
            strict,
            limits,
        } => cmd_validate(&input, json, strict, &limits),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if Path::new(input).exists() {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    } else {
        // Treat as inline map text
        Ok(input.to_string())
    }
}

fn resolve_config(limits: &LimitArgs) -> Result<ParserConfig> {
    let mut config = match &limits.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .context(format!("Failed to read config: {}", path.display()))?;
            let config: ParserConfig = toml::from_str(&text)
                .context(format!("Invalid config file: {}", path.display()))?;
            info!("Loaded parser limits from {}", path.display());
            config
        }
        None => ParserConfig::default(),
    };

    if let Some(max_input_bytes) = limits.max_input_bytes {
        config.max_input_bytes = max_input_bytes;
    }
    if let Some(max_line_chars) = limits.max_line_chars {
        config.max_line_chars = max_line_chars;
    }
    config.validate().context("Invalid parser limits")?;

    debug!(
        "Parser limits: max_input_bytes={}, max_line_chars={}",
        config.max_input_bytes, config.max_line_chars
    );
    Ok(config)
}

fn parse_input(input: &str, limits: &LimitArgs) -> Result<ParseReport> {
    let config = resolve_config(limits)?;
    let source = load_input(input)?;
    let report = parse_with_config(&source, &config);

    debug!(
        "Parsed: nodes={}, edges={}, bluelines={}, evolutions={}, notes={}, warnings={}",
        report.map.nodes.len(),
        report.map.edges.len(),
        report.map.bluelines.len(),
        report.map.evolutions.len(),
        report.map.notes.len(),
        report.map.warnings.len()
    );
    Ok(report)
}

// =============================================================================
// Command: parse
// =============================================================================

fn cmd_parse(input: &str, full: bool, pretty: bool, limits: &LimitArgs) -> Result<()> {
    let report = parse_input(input, limits)?;
    let map = &report.map;

    let output = if full {
        if pretty {
            serde_json::to_string_pretty(map)?
        } else {
            serde_json::to_string(map)?
        }
    } else if pretty {
        let value: serde_json::Value = serde_json::from_str(&parse_summary_json(map))?;
        serde_json::to_string_pretty(&value)?
    } else {
        parse_summary_json(map)
    };

    println!("{output}");

    for warning in &map.warnings {
        warn!("Parse warning: {warning}");
    }

    Ok(())
}

// =============================================================================
// Command: validate
// =============================================================================

fn cmd_validate(input: &str, json_output: bool, strict: bool, limits: &LimitArgs) -> Result<()> {
    let report = parse_input(input, limits)?;
    let result = validate_report(&report, strict);

    if json_output {
        let output = serde_json::to_string_pretty(&result)?;
        println!("{output}");
    } else {
        print_validation(&result);
    }

    if !result.valid {
        std::process::exit(1);
    }

    Ok(())
}

fn validate_report(report: &ParseReport, strict: bool) -> ValidateResult {
    let map: &WardleyMap = &report.map;

    let warnings: Vec<ValidationWarning> = report
        .diagnostics
        .iter()
        .map(|diagnostic| ValidationWarning {
            code: diagnostic.code.as_str().to_string(),
            message: diagnostic.message.clone(),
            line: diagnostic.line(),
        })
        .collect();

    let mut errors: Vec<ValidationError> = map
        .unresolved_references()
        .into_iter()
        .map(|reference| ValidationError {
            code: format!("owm/error/unresolved-{}", reference.relation.as_str()),
            message: reference.to_string(),
        })
        .collect();

    if map.nodes.is_empty() {
        errors.push(ValidationError {
            code: "owm/error/empty-map".to_string(),
            message: "Map has no components or anchors".to_string(),
        });
    }

    let valid = errors.is_empty() && (!strict || warnings.is_empty());

    ValidateResult {
        valid,
        title: map.title.clone(),
        node_count: map.nodes.len(),
        edge_count: map.edges.len(),
        blueline_count: map.bluelines.len(),
        evolution_count: map.evolutions.len(),
        note_count: map.notes.len(),
        warnings,
        errors,
    }
}

fn print_validation(result: &ValidateResult) {
    match (&result.title, result.valid) {
        (Some(title), true) => println!("✓ Valid map: {title}"),
        (None, true) => println!("✓ Valid map"),
        (_, false) => println!("✗ Invalid map"),
    }

    println!("  Nodes:      {}", result.node_count);
    println!("  Edges:      {}", result.edge_count);
    println!("  Bluelines:  {}", result.blueline_count);
    println!("  Evolutions: {}", result.evolution_count);
    println!("  Notes:      {}", result.note_count);

    if !result.errors.is_empty() {
        println!("\nErrors:");
        for err in &result.errors {
            println!("  [{}] {}", err.code, err.message);
        }
    }

    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &result.warnings {
            let location = warning
                .line
                .map(|line| format!(" (line {line})"))
                .unwrap_or_default();
            println!("  [{}] {}{}", warning.code, warning.message, location);
        }
    }
}
