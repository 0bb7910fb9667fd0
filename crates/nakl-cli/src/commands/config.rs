//! Config command - inspect, create and check parser configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use nakl_core::{ParserConfig, WaybillParser};

use super::load_config;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write the built-in defaults to a configuration file
    Init(InitArgs),

    /// Print one value by dotted key (e.g. "labels.supplier.0")
    Get {
        key: String,
    },

    /// Compile every pattern and label and report problems
    Validate {
        /// File to check (default: the effective configuration)
        file: Option<PathBuf>,
    },

    /// Show the default configuration file location
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Where to write the file (default: the standard location)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Replace an existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(config_path),
        ConfigCommand::Init(init_args) => init_config(init_args),
        ConfigCommand::Get { key } => get_config(config_path, &key),
        ConfigCommand::Validate { file } => validate_config(config_path, file.as_deref()),
        ConfigCommand::Path => show_path(),
    }
}

/// `<config dir>/nakl/config.json`, or `./nakl/config.json` when the
/// platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nakl")
        .join("config.json")
}

fn show_config(config_path: Option<&str>) -> anyhow::Result<()> {
    if config_path.is_none() && !default_config_path().exists() {
        eprintln!("{} Using built-in defaults.", style("ℹ").blue());
    }

    let config = load_config(config_path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs) -> anyhow::Result<()> {
    let target = args.output.unwrap_or_else(default_config_path);

    if target.exists() && !args.force {
        anyhow::bail!(
            "{} already exists; pass --force to replace it",
            target.display()
        );
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    ParserConfig::default().save(&target)?;

    println!("{} Wrote default configuration to {}", style("✓").green(), target.display());
    Ok(())
}

/// Look up a dotted key; numeric segments index into label and pattern lists.
fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(root, |node, segment| match node {
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => node.get(segment),
    })
}

fn get_config(config_path: Option<&str>, key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(load_config(config_path)?)?;
    let value = lookup(&json, key).ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", key))?;

    match value {
        Value::String(text) => println!("{}", text),
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}

fn validate_config(config_path: Option<&str>, file: Option<&Path>) -> anyhow::Result<()> {
    let config = match file {
        Some(path) => ParserConfig::from_file(path)?,
        None => load_config(config_path)?,
    };

    let parser = WaybillParser::new(config)
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    let config = parser.config();

    let patterns = &config.patterns;
    let labels = &config.labels;
    println!("{} Configuration is valid", style("✓").green());
    println!(
        "   patterns: number {}, date {}, totals {}/{}/{}, VAT exclusions {}",
        patterns.number.len(),
        patterns.date.len(),
        patterns.total_without_vat.len(),
        patterns.vat.len(),
        patterns.total_with_vat.len(),
        patterns.vat_exclusions.len(),
    );
    println!(
        "   labels: supplier {}, buyer {}, shipper {}, consignee {}",
        labels.supplier.len(),
        labels.buyer.len(),
        labels.shipper.len(),
        labels.consignee.len(),
    );

    Ok(())
}

fn show_path() -> anyhow::Result<()> {
    let path = default_config_path();
    println!("{}", path.display());

    if !path.exists() {
        eprintln!(
            "{} Not created yet; run 'nakl config init'.",
            style("ℹ").yellow()
        );
    } else if let Err(e) = ParserConfig::from_file(&path) {
        eprintln!("{} Present but unreadable: {}", style("✗").red(), e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_nested_and_indexed() {
        let json = serde_json::to_value(ParserConfig::default()).unwrap();

        assert_eq!(lookup(&json, "max_lines_section"), Some(&Value::from(8)));
        assert_eq!(lookup(&json, "labels.supplier.0"), Some(&Value::from("Поставщик")));
        assert_eq!(lookup(&json, "labels.supplier.9"), None);
        assert_eq!(lookup(&json, "labels.missing"), None);
    }

    #[test]
    fn test_validate_reports_bad_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"patterns": {"kpp": "КПП[:\\s]*([0-9]{9}"}}"#).unwrap();

        let err = validate_config(None, Some(&path)).unwrap_err();
        assert!(err.to_string().contains("kpp"));

        let good = dir.path().join("good.json");
        ParserConfig::default().save(&good).unwrap();
        assert!(validate_config(None, Some(&good)).is_ok());
    }
}
