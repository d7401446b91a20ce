//! Startup configuration: CLI flags plus an optional TOML file.
//!
//! The spec's "Configuration surface" (§9) only enumerates the knobs
//! themselves; a real binary needs a concrete way to select them at
//! startup. `clap` for the CLI surface and `serde`/`toml` for the file are
//! the pattern the wider corpus (and `curve25519-dalek`'s own optional
//! `serde` feature) uses, carried here even though the distilled spec is
//! silent on it.

use clap::Parser;
use ecc_lab_core::config::Configuration;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ecc-lab-device", about = "Command-channel ECC research engine")]
pub struct Cli {
    /// Path to a TOML configuration file; falls back to `Configuration::default()`.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// `tracing-subscriber` env-filter directive, e.g. `debug` or `ecc_lab_device=trace`.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Errors loading/parsing the TOML config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Loads the configuration named by `cli.config`, or the default if none
/// was given.
pub fn load(cli: &Cli) -> Result<Configuration, ConfigError> {
    match &cli.config {
        None => Ok(Configuration::default()),
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_path_falls_back_to_default() {
        let cli = Cli {
            config: None,
            log_level: "info".to_string(),
        };
        let config = load(&cli).unwrap();
        assert_eq!(config.hash, ecc_lab_core::config::HashAlgorithm::Sha256);
    }
}
