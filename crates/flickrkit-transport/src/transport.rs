//! The transport abstraction shared by API method bindings.

use std::fmt;

use flickrkit_auth::AccessToken;
use flickrkit_core::{Endpoint, Parameters};

use crate::error::TransportError;
use crate::response::Response;

/// Wire protocol of a [`Transport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportType {
    /// XML envelopes over HTTP POST.
    Soap,
    /// Plain HTTP requests with query parameters.
    Rest,
}

impl TransportType {
    /// Lowercase name of the protocol.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Soap => "soap",
            Self::Rest => "rest",
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sends signed API calls and returns parsed replies.
///
/// `path` selects the service path on the configured host; an empty path
/// uses the transport's default path.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// The reply type produced by this transport.
    type Response: Response;

    /// The wire protocol.
    fn transport_type(&self) -> TransportType;

    /// The configured call target.
    fn endpoint(&self) -> &Endpoint;

    /// Call an API method that only reads.
    async fn get(
        &self,
        path: &str,
        parameters: &Parameters,
        token: &AccessToken,
    ) -> Result<Self::Response, TransportError>;

    /// Call an API method that may write.
    async fn post(
        &self,
        path: &str,
        parameters: &Parameters,
        token: &AccessToken,
    ) -> Result<Self::Response, TransportError>;
}
