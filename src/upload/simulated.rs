// ABOUTME: Demo transport for environments without an image server.
// ABOUTME: Succeeds at a configured rate after an artificial delay, returning a fake share URL.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

use super::transport::{UploadError, UploadResponse, UploadTransport};
use super::UploadFile;
use crate::types::now_millis;

pub const DEFAULT_SUCCESS_RATE: f64 = 0.8;
pub const DEFAULT_LATENCY: Duration = Duration::from_secs(2);
pub const DEFAULT_SHARE_HOST: &str = "sharefile.xyz";

/// Probabilistic transport used only behind the simulate flag.
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    success_rate: f64,
    latency: Duration,
    share_host: String,
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_RATE, DEFAULT_LATENCY, DEFAULT_SHARE_HOST)
    }
}

impl SimulatedTransport {
    /// `success_rate` is clamped to `0.0..=1.0`; non-finite rates never succeed.
    pub fn new(success_rate: f64, latency: Duration, share_host: impl Into<String>) -> Self {
        let success_rate = if success_rate.is_finite() {
            success_rate.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            success_rate,
            latency,
            share_host: share_host.into(),
        }
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    fn share_url(&self, name: &str) -> String {
        format!(
            "https://{}/{}-{}",
            self.share_host,
            now_millis().timestamp_millis(),
            dash_whitespace(name)
        )
    }
}

#[async_trait]
impl UploadTransport for SimulatedTransport {
    async fn send(&self, file: &UploadFile) -> Result<UploadResponse, UploadError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let succeeded = rand::rng().random_bool(self.success_rate);
        if !succeeded {
            tracing::debug!(name = %file.name, "simulated upload failed");
            return Err(UploadError::Simulated);
        }

        Ok(UploadResponse {
            filename: None,
            url: Some(self.share_url(&file.name)),
        })
    }
}

/// Replace each run of whitespace with a single `-`.
fn dash_whitespace(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}
