// ABOUTME: Base URL of the image server.
// ABOUTME: Parses plain-HTTP URLs into host, port, and a path prefix.

use hyper::Uri;
use thiserror::Error;
use tokio::net::TcpStream;

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid server URL '{url}': {reason}")]
    Invalid { url: String, reason: String },

    #[error("unsupported URL scheme '{0}' (only http is supported)")]
    UnsupportedScheme(String),

    #[error("server URL has no host: {0}")]
    MissingHost(String),
}

/// Parsed server base URL, e.g. `http://localhost:8000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
    base_path: String,
}

impl Endpoint {
    pub fn parse(url: &str) -> Result<Self, EndpointError> {
        let uri = url
            .trim()
            .parse::<Uri>()
            .map_err(|e| EndpointError::Invalid {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        match uri.scheme_str() {
            Some("http") => {}
            Some(other) => return Err(EndpointError::UnsupportedScheme(other.to_string())),
            None => {
                return Err(EndpointError::Invalid {
                    url: url.to_string(),
                    reason: "missing scheme".to_string(),
                });
            }
        }

        let host = uri
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| EndpointError::MissingHost(url.to_string()))?;

        Ok(Self {
            host: host.to_string(),
            port: uri.port_u16().unwrap_or(80),
            base_path: uri.path().trim_end_matches('/').to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Value for the `Host` header.
    pub fn authority(&self) -> String {
        if self.port == 80 {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Request target for `path` under the base path.
    pub fn path(&self, path: &str) -> String {
        format!("{}/{}", self.base_path, path.trim_start_matches('/'))
    }

    pub(crate) async fn connect(&self) -> std::io::Result<TcpStream> {
        TcpStream::connect((self.host.as_str(), self.port)).await
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "http://{}{}", self.authority(), self.base_path)
    }
}
