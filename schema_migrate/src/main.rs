//! schema_migrate CLI
//!
//! Command-line front end for parsing, diffing, transforming and generating
//! database schemas.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use schema_migrate::config::{self, Config, LoggingConfig};
use schema_migrate::output::{render_changes, render_schema, render_warnings};
use schema_migrate::utils::logging::init_logging;
use schema_migrate::{Dialect, OutputFormat, Schema, SchemaParser};

/// Parse, compare and convert SQL schemas across dialects.
#[derive(Parser)]
#[command(name = "schema_migrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format (defaults to the configured one, then text).
    #[arg(short, long, global = true, value_enum)]
    output: Option<OutputFormat>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a DDL file and print its schema.
    Analyze {
        /// SQL file to parse.
        file: PathBuf,

        /// Dialect used for sql output.
        #[arg(short, long)]
        dialect: Option<String>,
    },

    /// Show structural differences between two DDL files.
    Diff {
        /// Source (current) schema file.
        source: PathBuf,

        /// Target (desired) schema file.
        target: PathBuf,
    },

    /// Convert a schema from one dialect to another.
    Transform {
        /// SQL file to convert.
        input: PathBuf,

        /// Source dialect (postgres, mysql, sqlserver).
        #[arg(long)]
        from: Option<String>,

        /// Target dialect (postgres, mysql, sqlserver).
        #[arg(long)]
        to: Option<String>,
    },

    /// Generate DDL for a dialect from a schema file.
    Generate {
        /// SQL file to regenerate.
        input: PathBuf,

        /// Target dialect (postgres, mysql, sqlserver).
        #[arg(short, long)]
        dialect: Option<String>,
    },

    /// Print version and supported dialects.
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    let mut logging = config.logging.clone().unwrap_or_else(LoggingConfig::default);
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    init_logging(&Some(logging)).context("Failed to initialize logging")?;

    let format = cli.output.unwrap_or(config.output.format);

    match cli.command {
        Commands::Analyze { file, dialect } => {
            let dialect = resolve_dialect(dialect, config.dialects.source)?;
            let schema = load_schema(&file, &config)?;
            print!("{}", render_schema(&schema, format, dialect)?);
        }

        Commands::Diff { source, target } => {
            let source_schema = load_schema(&source, &config)?;
            let target_schema = load_schema(&target, &config)?;
            let changes = schema_migrate::diff(&source_schema, &target_schema);
            print!("{}", render_changes(&changes, format)?);
        }

        Commands::Transform { input, from, to } => {
            let from = resolve_dialect(from, config.dialects.source)?;
            let to = resolve_dialect(to, config.dialects.target)?;
            let schema = load_schema(&input, &config)?;

            let result = schema_migrate::transform(&schema, from.as_str(), to.as_str())?;
            for warning in &result.warnings {
                tracing::warn!(%warning, "Transform warning");
            }
            eprint!("{}", render_warnings(&result.warnings));

            let format = cli.output.unwrap_or(OutputFormat::Sql);
            print!("{}", render_schema(&result.schema, format, to)?);
        }

        Commands::Generate { input, dialect } => {
            let dialect = resolve_dialect(dialect, config.dialects.target)?;
            let schema = load_schema(&input, &config)?;
            print!("{}", schema_migrate::generate_sql(&schema, dialect.as_str())?);
        }

        Commands::Version => {
            println!("schema_migrate {}", env!("CARGO_PKG_VERSION"));
            println!("Supported dialects:");
            for dialect in Dialect::ALL {
                println!("  {:<10} {}", dialect.as_str(), dialect.product_name());
            }
        }
    }

    Ok(())
}

/// Dialect named on the command line, or the configured default
fn resolve_dialect(name: Option<String>, fallback: Dialect) -> anyhow::Result<Dialect> {
    match name {
        Some(name) => Ok(name.parse()?),
        None => Ok(fallback),
    }
}

fn load_schema(path: &Path, config: &Config) -> anyhow::Result<Schema> {
    let sql = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let report = SchemaParser::new().parse_with_report(&sql);

    tracing::info!(
        file = %path.display(),
        tables = report.schema.tables.len(),
        skipped = report.skipped.len(),
        "Parsed schema"
    );
    if config.parser.report_skipped {
        for skipped in &report.skipped {
            eprintln!(
                "skipped statement {} ({}): {}",
                skipped.index + 1,
                skipped.reason,
                skipped.statement
            );
        }
    }

    Ok(report.schema)
}
