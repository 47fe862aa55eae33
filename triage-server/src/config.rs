//! Configuration resolution.
//!
//! CLI arguments (with env fallbacks) merged over an optional TOML file:
//! CLI > TOML > built-in defaults.

use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Parser, Debug)]
#[clap(about = "Audio emotion triage service")]
pub struct CliArgs {
    /// Path to TOML configuration file.
    #[clap(long, env = "TRIAGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the ONNX classification model.
    #[clap(long, env = "TRIAGE_MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Path to the JSON label manifest. Defaults to labels.json beside the model.
    #[clap(long, env = "TRIAGE_LABELS_PATH")]
    pub labels_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, env = "TRIAGE_PORT")]
    pub port: Option<u16>,

    /// Origin allowed to call the API cross-origin.
    #[clap(long, env = "TRIAGE_ALLOWED_ORIGIN")]
    pub allowed_origin: Option<String>,
}

/// Optional TOML configuration file shape.
#[derive(Debug, Default, Deserialize)]
pub struct TomlConfig {
    pub model_path: Option<PathBuf>,
    pub labels_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub allowed_origin: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    pub port: u16,
    pub allowed_origin: String,
}

impl Config {
    pub fn resolve(args: CliArgs) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            None => TomlConfig::default(),
        };

        let model_path = args
            .model_path
            .or(file.model_path)
            .unwrap_or_else(|| PathBuf::from("contact_center_model.onnx"));

        let labels_path = args
            .labels_path
            .or(file.labels_path)
            .unwrap_or_else(|| model_path.with_file_name("labels.json"));

        Ok(Self {
            model_path,
            labels_path,
            port: args.port.or(file.port).unwrap_or(8000),
            allowed_origin: args
                .allowed_origin
                .or(file.allowed_origin)
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
        })
    }
}
