// ABOUTME: Configuration types and parsing for imgdrop.yml.
// ABOUTME: Handles YAML parsing, file discovery, defaults, and environment overrides.

mod init;
mod transport;

pub use init::init_config;
pub use transport::{SimulatedConfig, TransportConfig};

use crate::error::{Error, Result};
use crate::remote::Endpoint;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "imgdrop.yml";
pub const CONFIG_FILENAME_ALT: &str = "imgdrop.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".imgdrop/config.yml";

pub const ENV_SERVER: &str = "IMGDROP_SERVER";
pub const ENV_TRANSPORT: &str = "IMGDROP_TRANSPORT";
pub const ENV_DATA_DIR: &str = "IMGDROP_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Base URL of the image server.
    #[serde(default = "default_server")]
    pub server: String,

    #[serde(default)]
    pub endpoints: EndpointsConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub transport: TransportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_upload_path")]
    pub upload_path: String,

    #[serde(default = "default_list_path")]
    pub list_path: String,

    /// Path prefix the server serves uploaded images under.
    #[serde(default = "default_images_prefix")]
    pub images_prefix: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            upload_path: default_upload_path(),
            list_path: default_list_path(),
            images_prefix: default_images_prefix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub backup_quota: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backup_quota: None,
        }
    }
}

fn default_server() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_upload_path() -> String {
    "/api/upload".to_string()
}

fn default_list_path() -> String {
    "/api/images".to_string()
}

fn default_images_prefix() -> String {
    "/images/".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".imgdrop")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: default_server(),
            endpoints: EndpointsConfig::default(),
            storage: StorageConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document means "all defaults".
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config");
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Like [`Config::discover`], but a missing file yields the defaults.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Apply `IMGDROP_SERVER`, `IMGDROP_TRANSPORT` and `IMGDROP_DATA_DIR`.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(server) = std::env::var(ENV_SERVER) {
            self.server = server;
        }

        if let Ok(mode) = std::env::var(ENV_TRANSPORT) {
            // Keep configured simulated settings when the mode already matches.
            let wanted = TransportConfig::from_mode(&mode).ok_or_else(|| {
                Error::InvalidConfig(format!("{ENV_TRANSPORT} must be http or simulated, got '{mode}'"))
            })?;
            if wanted.is_simulated() != self.transport.is_simulated() {
                self.transport = wanted;
            }
        }

        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            self.storage.data_dir = PathBuf::from(dir);
        }

        Ok(self)
    }

    /// Check values serde cannot: the server URL and the simulated success rate.
    pub fn validate(&self) -> Result<()> {
        self.endpoint()?;

        if let TransportConfig::Simulated(sim) = &self.transport
            && !(0.0..=1.0).contains(&sim.success_rate)
        {
            return Err(Error::InvalidConfig(format!(
                "transport.success_rate must be between 0 and 1, got {}",
                sim.success_rate
            )));
        }

        Ok(())
    }

    pub fn endpoint(&self) -> Result<Endpoint> {
        Endpoint::parse(&self.server).map_err(Error::from)
    }
}
