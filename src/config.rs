//! Application configuration
//!
//! Every value has a built-in default, so the tool works without a config
//! file. A TOML file can override any subset of the sections.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Config file picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "gpu-p2p-check.toml";

const DEFAULT_BENCHMARK_PATH: &str =
    "/home/bizon/cuda-samples2/bin/x86_64/linux/release/p2pBandwidthLatencyTest";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub benchmark: BenchmarkSettings,
    pub thresholds: Thresholds,
    pub uuid: UuidSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkSettings {
    /// Path to the `p2pBandwidthLatencyTest` executable
    pub path: PathBuf,
}

/// Bandwidth floors in GB/s
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum for diagonal (same GPU) entries
    pub on_chip_min: f64,
    /// Minimum between two GPUs whose ordinals are both below 3 (x16 links)
    pub high_link_min: f64,
    /// Minimum between two GPUs whose ordinals are both 3 or above (x8 links)
    pub low_link_min: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UuidSettings {
    pub command: String,
    pub args: Vec<String>,
    /// Where the collected records are written, overwritten on every run
    pub output: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for BenchmarkSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_BENCHMARK_PATH),
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            on_chip_min: 900.0,
            high_link_min: 22.0,
            low_link_min: 13.0,
        }
    }
}

impl Default for UuidSettings {
    fn default() -> Self {
        Self {
            command: "nvidia-smi".to_string(),
            args: vec!["-L".to_string()],
            output: PathBuf::from("gpu_uuids.json"),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from an explicit path, the default file in the
    /// working directory, or fall back to built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) if path.exists() => Some(path.to_path_buf()),
            Some(path) => {
                return Err(Error::ConfigNotFound {
                    path: path.to_path_buf(),
                })
            }
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.exists().then_some(local)
            }
        };

        let config = match path {
            Some(path) => {
                debug!(path = %path.display(), "Loading configuration file");
                let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
                let config = Self::from_toml(&content).map_err(|source| Error::ConfigParse {
                    path: path.clone(),
                    source,
                })?;
                info!(path = %path.display(), "Configuration loaded from file");
                config
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.benchmark.path.as_os_str().is_empty() {
            return Err(invalid("benchmark.path", "must not be empty"));
        }
        if self.uuid.command.trim().is_empty() {
            return Err(invalid("uuid.command", "must not be empty"));
        }
        if self.uuid.output.as_os_str().is_empty() {
            return Err(invalid("uuid.output", "must not be empty"));
        }

        let t = &self.thresholds;
        for (field, value) in [
            ("thresholds.on_chip_min", t.on_chip_min),
            ("thresholds.high_link_min", t.high_link_min),
            ("thresholds.low_link_min", t.low_link_min),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(
                    field,
                    &format!("must be a finite, non-negative number (got {value})"),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> Error {
    Error::ConfigValidation {
        field: field.to_string(),
        message: message.to_string(),
    }
}
