//! `sqlfront` — a CLI front end for the lakehouse SQL parser.
//!
//! Wraps [`sql_core`] (lexing, parsing, the Iceberg type grammar, and the
//! canonical formatter) and [`sql_catalog`] (the post-parse validator)
//! behind three subcommands: `parse`, `format`, and `check`.
//!
//! # Exit Codes
//!
//! - `0`: success
//! - `1`: parse error, validation error, or I/O failure

use clap::{Parser, Subcommand};
use serde::Deserialize;
use sql_catalog::{MemoryCatalog, RequestContext, Validator};
use sql_core::error::ParseError;
use sql_core::parser::parse_recovering;
use std::fs;
use std::path::{Path, PathBuf};

/// Command-line interface for `sqlfront`.
#[derive(Parser)]
#[command(name = "sqlfront")]
#[command(about = "Parse, format, and validate lakehouse SQL", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a config file (defaults to `sqlfront.toml` in the current directory if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a SQL file and report every statement and error found.
    Parse {
        file: PathBuf,

        /// Keep going after a recoverable error instead of stopping at the first one.
        #[arg(long)]
        recover: bool,
    },

    /// Parse a SQL file and re-emit it in canonical form.
    Format { file: PathBuf },

    /// Parse a SQL file and validate every table/column/database name
    /// it references against a catalog (currently: an empty in-memory
    /// reference catalog, since this CLI ships no real catalog backend).
    Check {
        file: PathBuf,

        /// Database to validate against, overriding the config file.
        #[arg(long)]
        database: Option<String>,
    },
}

/// `sqlfront.toml`: process-wide defaults, loaded once at startup.
#[derive(Debug, Default, Deserialize)]
struct Config {
    #[serde(default)]
    database: Option<String>,
    #[serde(default = "default_user")]
    user: String,
}

fn default_user() -> String {
    "sqlfront".to_string()
}

impl Config {
    fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => PathBuf::from("sqlfront.toml"),
        };
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = fs::read_to_string(&path)?;
        Ok(toml::from_str(&text)?)
    }
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Parse { file, recover } => cmd_parse(&file, recover),
        Commands::Format { file } => cmd_format(&file),
        Commands::Check { file, database } => cmd_check(&file, database.or(config.database), &config.user),
    }
}

fn read_source(file: &Path) -> Result<String, Box<dyn std::error::Error>> {
    fs::read_to_string(file).map_err(|e| format!("failed to read {}: {e}", file.display()).into())
}

fn print_error(err: &ParseError) {
    log::warn!("{}", err.short());
    eprintln!("{}", err.detailed());
}

fn cmd_parse(file: &Path, recover: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_source(file)?;

    if !recover {
        let statements = sql_core::parser::parse_strict(&source)?;
        println!("parsed {} statement(s)", statements.len());
        return Ok(());
    }

    let (statements, errors) = parse_recovering(&source)?;
    println!("parsed {} statement(s), {} error(s)", statements.len(), errors.len());
    for err in errors.errors() {
        print_error(&err);
    }
    if !errors.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_format(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_source(file)?;
    let statements = sql_core::parser::parse_strict(&source)?;
    for stmt in &statements {
        println!("{}", sql_core::format_statement(stmt));
    }
    Ok(())
}

fn cmd_check(
    file: &Path,
    database: Option<String>,
    user: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_source(file)?;
    let statements = sql_core::parser::parse_strict(&source)?;

    let catalog = match &database {
        Some(db) => MemoryCatalog::new().with_database(db.clone()),
        None => MemoryCatalog::new(),
    };
    let ctx = RequestContext::new(user, database);
    let validator = Validator::new(&catalog);

    let runtime = tokio::runtime::Runtime::new()?;
    let mut failed = false;
    for stmt in &statements {
        if let Err(e) = runtime.block_on(validator.validate(&ctx, stmt)) {
            log::error!("{e}");
            eprintln!("validation error: {e}");
            failed = true;
        }
    }
    if failed {
        std::process::exit(1);
    }
    println!("{} statement(s) validated", statements.len());
    Ok(())
}
