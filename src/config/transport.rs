// ABOUTME: Upload transport selection: real HTTP or the simulated demo transport.
// ABOUTME: Parsed from `transport.mode` with per-mode settings.

use serde::Deserialize;
use std::time::Duration;

use crate::upload::{DEFAULT_LATENCY, DEFAULT_SHARE_HOST, DEFAULT_SUCCESS_RATE};

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Upload to the configured server.
    #[default]
    Http,

    /// Fake uploads that succeed at `success_rate`. Demo use only.
    Simulated(SimulatedConfig),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulatedConfig {
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,

    #[serde(default = "default_latency", with = "humantime_serde")]
    pub latency: Duration,

    #[serde(default = "default_share_host")]
    pub share_host: String,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            success_rate: default_success_rate(),
            latency: default_latency(),
            share_host: default_share_host(),
        }
    }
}

fn default_success_rate() -> f64 {
    DEFAULT_SUCCESS_RATE
}

fn default_latency() -> Duration {
    DEFAULT_LATENCY
}

fn default_share_host() -> String {
    DEFAULT_SHARE_HOST.to_string()
}

impl TransportConfig {
    pub fn is_simulated(&self) -> bool {
        matches!(self, TransportConfig::Simulated(_))
    }

    /// Parse the value of the `IMGDROP_TRANSPORT` override.
    pub fn from_mode(mode: &str) -> Option<Self> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "http" => Some(TransportConfig::Http),
            "simulated" => Some(TransportConfig::Simulated(SimulatedConfig::default())),
            _ => None,
        }
    }
}
