use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;

use jsonschema::JSONSchema;
use serde_json::Value as JsonValue;

use console_api::api_registry;
use script_bridge::{config_schema, BridgeConfig};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("config-schema") => config_schema_cmd(args.next()),
        Some("validate-config") => {
            let pattern = args
                .next()
                .unwrap_or_else(|| "**/bridge_config*.json".to_string());
            validate_config(&pattern)
        }
        Some("api-docs") => api_docs(args.next()),
        Some("help") | None => {
            print_usage();
            Ok(())
        }
        Some(cmd) => {
            eprintln!("Unknown xtask '{cmd}'.");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: cargo xtask config-schema [out.json]");
    eprintln!("       cargo xtask validate-config [glob]");
    eprintln!("       cargo xtask api-docs [out.md]");
    eprintln!("       cargo xtask help");
}

fn config_schema_cmd(out: Option<String>) -> Result<(), Box<dyn Error>> {
    let schema = serde_json::to_string_pretty(&config_schema())?;
    write_or_print(out.as_deref(), &schema)
}

fn validate_config(pattern: &str) -> Result<(), Box<dyn Error>> {
    let schema = serde_json::to_value(config_schema())?;
    let compiled = JSONSchema::compile(&schema).map_err(|err| format!("invalid schema: {err}"))?;

    let mut checked = 0usize;
    let mut failures = 0usize;
    for entry in glob::glob(pattern)? {
        let path = entry?;
        if path.components().any(|part| part.as_os_str() == "target") {
            continue;
        }
        checked += 1;
        let text = fs::read_to_string(&path)?;
        let document: JsonValue = serde_json::from_str(&text)
            .map_err(|err| format!("{}: {err}", path.display()))?;

        let mut problems: Vec<String> = match compiled.validate(&document) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|error| format!("{}: {error}", error.instance_path))
                .collect(),
        };
        if problems.is_empty() {
            if let Err(err) = BridgeConfig::from_json_str(&text) {
                problems.push(err.to_string());
            }
        }

        if problems.is_empty() {
            println!("ok      {}", path.display());
        } else {
            failures += 1;
            println!("invalid {}", path.display());
            for problem in problems {
                println!("        {problem}");
            }
        }
    }

    if checked == 0 {
        return Err(format!("no files matched '{pattern}'").into());
    }
    if failures > 0 {
        return Err(format!("{failures} of {checked} config files failed validation").into());
    }
    Ok(())
}

fn api_docs(out: Option<String>) -> Result<(), Box<dyn Error>> {
    let mut doc = String::from("# Console API\n\n");
    doc.push_str("| Routine | Signature | Description |\n");
    doc.push_str("| --- | --- | --- |\n");
    for descriptor in api_registry().descriptors() {
        doc.push_str(&format!(
            "| `{}` | `{}` | {} |\n",
            descriptor.name,
            descriptor.signature(),
            descriptor.doc
        ));
    }
    write_or_print(out.as_deref(), &doc)
}

fn write_or_print(out: Option<&str>, contents: &str) -> Result<(), Box<dyn Error>> {
    match out {
        Some(path) => {
            let path = Path::new(path);
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, contents)?;
            println!("Wrote {}", path.display());
        }
        None => println!("{contents}"),
    }
    Ok(())
}
