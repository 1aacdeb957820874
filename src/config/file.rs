//! Configuration files
//!
//! A config file is a versioned wrapper around `AppConfig`, stored as YAML
//! or JSON depending on the extension.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{AppConfig, TargetConfig};
use crate::executor::PartitionStrategy;
use crate::target::StatusWeights;

const CURRENT_VERSION: &str = "1.0";

/// Searched in order; the first existing file wins
const SEARCH_PATHS: &[&str] = &[
    "./stress-test.yaml",
    "./stress-test.yml",
    "./.stress-test.yaml",
    "~/.config/stress-test/config.yaml",
    "~/.stress-test.yaml",
];

/// On-disk encoding, picked from the file extension
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Encoding {
    Yaml,
    Json,
}

impl Encoding {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Encoding::Yaml,
            _ => Encoding::Json,
        }
    }

    fn decode(self, content: &str) -> Result<ConfigFile> {
        Ok(match self {
            Encoding::Yaml => serde_yaml::from_str(content).context("Invalid YAML")?,
            Encoding::Json => serde_json::from_str(content).context("Invalid JSON")?,
        })
    }

    fn encode(self, config: &ConfigFile) -> Result<String> {
        Ok(match self {
            Encoding::Yaml => serde_yaml::to_string(config)?,
            Encoding::Json => serde_json::to_string_pretty(config)?,
        })
    }
}

/// Versioned configuration file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default = "current_version")]
    pub version: String,

    #[serde(default)]
    pub app: AppConfig,
}

fn current_version() -> String {
    CURRENT_VERSION.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: current_version(),
            app: AppConfig::default(),
        }
    }
}

impl ConfigFile {
    /// First config file found in the search paths
    pub fn find() -> Option<PathBuf> {
        SEARCH_PATHS
            .iter()
            .map(|candidate| expand_home(candidate))
            .find(|path| path.is_file())
    }

    /// Load the discovered file, or defaults when there is none
    pub fn load_default() -> Result<Self> {
        Self::find()
            .map(Self::load)
            .unwrap_or_else(|| Ok(Self::default()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Encoding::of(path)
            .decode(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the file, creating missing parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = Encoding::of(path).encode(self)?;

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != CURRENT_VERSION {
            anyhow::bail!(
                "Unsupported config version {} (expected {})",
                self.version,
                CURRENT_VERSION
            );
        }
        self.app.validate()
    }

    /// Configuration written by `config init`
    pub fn example() -> Self {
        let target = TargetConfig {
            status_weights: StatusWeights::parse("200:80,404:10,500:10").unwrap_or_default(),
            ..TargetConfig::default()
        };

        Self {
            version: current_version(),
            app: AppConfig {
                timeout_secs: 10,
                default_concurrency: 10,
                partition: PartitionStrategy::RoundRobin,
                target,
                ..AppConfig::default()
            },
        }
    }
}

/// Resolve a leading `~/` against the home directory
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
