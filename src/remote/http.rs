// ABOUTME: One-shot HTTP/1.1 requests over a fresh TCP connection.
// ABOUTME: Returns the status and collected body; callers interpret both.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Request, StatusCode};
use hyper_util::rt::TokioIo;

use super::Endpoint;

/// Transport-level failure talking to the server.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        source: std::io::Error,
    },

    #[error("HTTP handshake failed: {0}")]
    Handshake(hyper::Error),

    #[error("failed to build request: {0}")]
    Build(String),

    #[error("request failed: {0}")]
    Request(hyper::Error),

    #[error("failed to read response: {0}")]
    Body(hyper::Error),
}

impl HttpError {
    pub(crate) fn build(e: impl std::fmt::Display) -> Self {
        HttpError::Build(e.to_string())
    }
}

/// Send `req` to `endpoint` and collect the full response body.
pub(crate) async fn send(
    endpoint: &Endpoint,
    req: Request<Full<Bytes>>,
) -> Result<(StatusCode, Bytes), HttpError> {
    let stream = endpoint.connect().await.map_err(|source| HttpError::Connect {
        endpoint: endpoint.to_string(),
        source,
    })?;

    let io = TokioIo::new(stream);
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(HttpError::Handshake)?;

    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!("image server connection error: {}", e);
        }
    });

    tracing::debug!(method = %req.method(), uri = %req.uri(), "sending request");
    let resp = sender.send_request(req).await.map_err(HttpError::Request)?;
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .map_err(HttpError::Body)?
        .to_bytes();

    Ok((status, body))
}
