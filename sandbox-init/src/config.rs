use anyhow::{Context, Result};
use client::config::NodeConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    pub nodes: Vec<NodeConfig>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn read_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let s = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file '{}'", path.as_ref().display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s).context("failed to parse TOML config")?;
    if cfg.nodes.is_empty() {
        anyhow::bail!("config declares no nodes");
    }
    Ok(cfg)
}

pub fn read_config_from_toml() -> Result<Config> {
    // ./config/config.toml first, then CARGO_MANIFEST_DIR/config/config.toml for cargo run.
    let cwd_config = PathBuf::from("config").join("config.toml");
    if cwd_config.exists() {
        return read_config(&cwd_config);
    }

    if let Ok(crate_root) = std::env::var("CARGO_MANIFEST_DIR") {
        let cargo_config = PathBuf::from(&crate_root).join("config").join("config.toml");
        if cargo_config.exists() {
            return read_config(&cargo_config);
        }
    }

    anyhow::bail!(
        "Could not find config.toml in ./config/config.toml or CARGO_MANIFEST_DIR/config/config.toml. Use --config-file to specify a path."
    )
}
