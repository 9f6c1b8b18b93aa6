mod manifest;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clip::{DeclId, HELP_LONG, Outcome, Scalar, Value};
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing_subscriber::{EnvFilter, fmt};

use crate::manifest::Manifest;

#[derive(Parser)]
#[command(name = "clip")]
#[command(version, about = "Check argument vectors against a declaration manifest", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse arguments and print the bound values as JSON
    Parse(ParseArgs),

    /// Print the usage text of a manifest
    Usage(UsageArgs),
}

#[derive(Parser)]
struct ParseArgs {
    /// Path to the declaration manifest
    #[arg(short, long, default_value = "clip.json", value_name = "FILE")]
    manifest: PathBuf,

    /// Program name passed as the first argument (overrides manifest)
    #[arg(short, long, value_name = "NAME")]
    program: Option<String>,

    /// Arguments to parse, after `--`
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

#[derive(Parser)]
struct UsageArgs {
    /// Path to the declaration manifest
    #[arg(short, long, default_value = "clip.json", value_name = "FILE")]
    manifest: PathBuf,

    /// Program name shown on the usage line (overrides manifest)
    #[arg(short, long, value_name = "NAME")]
    program: Option<String>,
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse(args) => parse_command(args),
        Commands::Usage(args) => usage_command(args),
    }
}

fn parse_command(args: ParseArgs) -> Result<ExitCode> {
    let manifest = Manifest::from_file(&args.manifest)?;
    let mut parser = manifest
        .build_parser()
        .with_context(|| format!("invalid declarations in {}", args.manifest.display()))?;
    let program = program_name(args.program, &manifest, &args.manifest);
    tracing::debug!(%program, args = args.args.len(), "executing parse command");

    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut out = stdout.lock();
    let mut err = stderr.lock();

    let argv = std::iter::once(program).chain(args.args);
    let outcome = parser.parse_with(argv, &mut out, &mut err);

    match outcome {
        Outcome::Success => {
            let report = bound_values(&parser);
            serde_json::to_writer_pretty(&mut out, &report)
                .context("failed to write parse report")?;
            writeln!(out)?;
            Ok(ExitCode::SUCCESS)
        }
        Outcome::HelpShown => Ok(ExitCode::SUCCESS),
        Outcome::Failure => {
            // the parser already printed the message when configured to
            if !parser.config().show_errors {
                writeln!(err, "{}", parser.error_message())?;
            }
            parser.show_usage_to(&mut err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn usage_command(args: UsageArgs) -> Result<ExitCode> {
    let manifest = Manifest::from_file(&args.manifest)?;
    let mut parser = manifest
        .build_parser()
        .with_context(|| format!("invalid declarations in {}", args.manifest.display()))?;
    let program = program_name(args.program, &manifest, &args.manifest);
    parser.set_app_name(&program);

    let stdout = io::stdout();
    parser
        .show_usage_to(&mut stdout.lock())
        .context("failed to write usage")?;
    Ok(ExitCode::SUCCESS)
}

/// `--program`, then the manifest's `program`, then the manifest file stem.
fn program_name(explicit: Option<String>, manifest: &Manifest, path: &Path) -> String {
    explicit
        .or_else(|| manifest.program.clone())
        .or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| "app".to_string())
}

/// Every declaration's bound (or default) value, keyed by long key and
/// argument name. The help switch is left out.
fn bound_values(parser: &clip::Parser<'_>) -> serde_json::Value {
    let registry = parser.registry();
    let options: serde_json::Map<String, serde_json::Value> = registry
        .options()
        .enumerate()
        .filter(|(_, opt)| opt.long() != HELP_LONG)
        .map(|(i, opt)| {
            let value = parser.bound_value(DeclId::Option(i));
            (opt.long().to_string(), value.map_or(serde_json::Value::Null, value_json))
        })
        .collect();
    let arguments: serde_json::Map<String, serde_json::Value> = registry
        .arguments()
        .enumerate()
        .map(|(i, arg)| {
            let value = parser.bound_value(DeclId::Argument(i));
            (arg.name().to_string(), value.map_or(serde_json::Value::Null, value_json))
        })
        .collect();

    serde_json::json!({
        "options": options,
        "arguments": arguments,
    })
}

fn value_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Single(scalar) => scalar_json(scalar),
        Value::Multi(items) => serde_json::Value::Array(items.iter().map(scalar_json).collect()),
    }
}

fn scalar_json(scalar: &Scalar) -> serde_json::Value {
    match scalar {
        Scalar::Bool(v) => serde_json::json!(v),
        Scalar::I32(v) => serde_json::json!(v),
        Scalar::I64(v) => serde_json::json!(v),
        Scalar::U32(v) => serde_json::json!(v),
        Scalar::U64(v) => serde_json::json!(v),
        Scalar::Usize(v) => serde_json::json!(v),
        Scalar::F32(v) => serde_json::json!(v),
        Scalar::F64(v) => serde_json::json!(v),
        Scalar::Char(v) => serde_json::json!(v.to_string()),
        Scalar::String(v) => serde_json::json!(v),
        Scalar::Path(v) => serde_json::json!(v.to_string_lossy()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}
