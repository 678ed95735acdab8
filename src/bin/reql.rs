//! PhotonDB ReQL inspection tool
//!
//! Works on captured wire payloads:
//! - `compile`: decode a query term and print its tree (and canonical encoding)
//! - `decode`: convert a server response into native values, or show its error
//!
//! # Examples
//!
//! ```bash
//! # Pretty-print a term
//! echo '[39, [[15, ["users"]], {"active": true}]]' | reql compile
//!
//! # Decode a response, leaving times as raw objects
//! reql decode --time-format raw response.json
//! ```

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use photondb_reql::config::ClientConfig;
use photondb_reql::query::{serialize, QueryCompiler};
use photondb_reql::response::{Deserializer, TimeFormat};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// PhotonDB ReQL - inspect query terms and server responses
#[derive(Parser, Debug)]
#[command(name = "reql")]
#[command(version = photondb_reql::VERSION)]
#[command(about = "PhotonDB ReQL - inspect query terms and server responses", long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Client configuration file (TOML)
    #[arg(long, global = true, env = "PHOTONDB_REQL_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a wire term and print its tree
    Compile(InputArgs),

    /// Decode a server response
    Decode(DecodeArgs),

    /// Show version
    Version,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Input file; reads stdin when omitted
    input: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Override the configured time format (native, raw)
    #[arg(long)]
    time_format: Option<TimeFormat>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli);

    let result = match cli.command {
        Commands::Compile(args) => compile_command(args),
        Commands::Decode(args) => decode_command(cli.config, args),
        Commands::Version => {
            println!("PhotonDB ReQL {}", photondb_reql::VERSION);
            Ok(())
        }
    };

    if let Err(e) = &result {
        error!(error = %e, "Command failed");
    }
    result
}

/// Console logging, optionally as JSON
fn setup_logging(cli: &Cli) {
    let log_level = cli
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::WARN);
    let filter = EnvFilter::from_default_env().add_directive(log_level.into());

    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(!cli.no_color),
            )
            .init();
    }
}

fn read_input(args: &InputArgs) -> anyhow::Result<Value> {
    let text = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("Input is not valid JSON")
}

/// Compile command - wire term to tree
fn compile_command(args: InputArgs) -> anyhow::Result<()> {
    let wire = read_input(&args)?;
    let term = QueryCompiler::compile(&wire)?;
    info!(term_type = %term.term_type(), "Compiled term");

    println!("{}", term.pretty_print(0));
    let canonical = serialize(&term)?;
    if canonical != wire {
        debug!("Input differs from canonical encoding");
        println!("canonical: {}", canonical);
    }
    Ok(())
}

/// Decode command - response to native values
fn decode_command(config: Option<PathBuf>, args: DecodeArgs) -> anyhow::Result<()> {
    let config = ClientConfig::load(config.as_deref())?;
    let mut formats = config.format_options();
    if let Some(time_format) = args.time_format {
        formats.time_format = time_format;
    }

    let payload = read_input(&args.input)?;
    match Deserializer::with_formats(formats).deserialize(&payload) {
        Ok(response) => {
            info!(response_type = ?response.response_type, "Decoded response");
            for value in &response.results {
                println!("{}", value);
            }
            if let Some(profile) = &response.profile {
                println!("profile: {}", profile);
            }
            Ok(())
        }
        Err(photondb_reql::Error::QueryExecution {
            class,
            message,
            backtrace,
        }) => {
            println!("{}: {}", class, message);
            if !backtrace.is_empty() {
                println!("backtrace: {}", Value::Array(backtrace));
            }
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}
