use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

use console_api::api_registry;
use script_bridge::{extract_outline_with, BridgeConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspection harness for console scripts", long_about = None)]
struct Args {
    /// Bridge config JSON (defaults to the builtin config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the def/class outline of a script as JSON
    Outline {
        script: PathBuf,
    },
    /// Print the native routine table
    Api {
        /// Emit JSON instead of one signature per line
        #[arg(long)]
        json: bool,
    },
    /// Validate and print the effective bridge config
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Outline { script } => print_outline(&script, &config),
        Command::Api { json } => print_api(json),
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<BridgeConfig> {
    match path {
        Some(path) => {
            let config = BridgeConfig::from_file(path)
                .with_context(|| format!("Failed to load bridge config {}", path.display()))?;
            info!(path = %path.display(), "bridge config loaded");
            Ok(config)
        }
        None => Ok(BridgeConfig::builtin()),
    }
}

fn print_outline(script: &Path, config: &BridgeConfig) -> Result<()> {
    let file_name = script
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    if !config.syntax.matches_file(file_name) {
        debug!(
            script = %script.display(),
            extension = %config.syntax.file_extension,
            "script does not use the configured extension"
        );
    }

    let source = fs::read_to_string(script)
        .with_context(|| format!("Failed to read script at {}", script.display()))?;
    let outline = extract_outline_with(&source, &config.syntax);
    let report = json!({
        "script": script.display().to_string(),
        "language": config.syntax.name,
        "items": outline,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_api(as_json: bool) -> Result<()> {
    let registry = api_registry();
    if !as_json {
        for descriptor in registry.descriptors() {
            println!("{}", descriptor.signature());
        }
        return Ok(());
    }

    let routines: Vec<JsonValue> = registry
        .descriptors()
        .iter()
        .map(|descriptor| {
            json!({
                "name": descriptor.name,
                "signature": descriptor.signature(),
                "doc": descriptor.doc,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&routines)?);
    Ok(())
}
