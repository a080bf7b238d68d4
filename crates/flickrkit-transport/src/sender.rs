//! The HTTP exchange seam.
//!
//! [`SoapTransport`](crate::SoapTransport) hands each signed request to an
//! [`HttpSender`] and gets back the status and the fully read body. The
//! default implementation is [`ReqwestSender`].

use bytes::Bytes;
use tracing::debug;

use crate::error::SendError;

/// A received HTTP reply with its body fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// The HTTP status code.
    pub status: http::StatusCode,
    /// The complete response body.
    pub body: Bytes,
}

/// Sends one HTTP request and waits for the complete reply.
#[async_trait::async_trait]
pub trait HttpSender: Send + Sync + std::fmt::Debug {
    /// Send `request` and read the whole reply body.
    async fn send(&self, request: http::Request<String>) -> Result<RawResponse, SendError>;
}

/// [`HttpSender`] backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestSender {
    client: reqwest::Client,
}

impl ReqwestSender {
    /// Create a sender with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sender that uses an existing client (connection pool, proxy,
    /// timeouts).
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl HttpSender for ReqwestSender {
    async fn send(&self, request: http::Request<String>) -> Result<RawResponse, SendError> {
        let request = reqwest::Request::try_from(request)?;
        debug!(method = %request.method(), url = %request.url(), "sending request");

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!(status = %status, len = body.len(), "received response");
        Ok(RawResponse { status, body })
    }
}
