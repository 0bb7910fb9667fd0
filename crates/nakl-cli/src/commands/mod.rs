//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod input;
pub mod parse;

use std::path::Path;

use nakl_core::{ParserConfig, WaybillParser};

/// Load the configuration from an explicit path, the default location, or
/// fall back to built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ParserConfig> {
    if let Some(path) = config_path {
        return Ok(ParserConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        Ok(ParserConfig::from_file(&default_path)?)
    } else {
        Ok(ParserConfig::default())
    }
}

/// Build a parser from the loaded configuration.
pub fn build_parser(config: ParserConfig) -> anyhow::Result<WaybillParser> {
    Ok(WaybillParser::new(config)?)
}
