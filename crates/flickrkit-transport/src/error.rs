//! Transport error types.

use flickrkit_auth::AuthError;
use flickrkit_soap_xml::XmlError;

/// Failure category of a [`TransportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request envelope could not be built.
    Encoding,
    /// The signer rejected the credentials or the request.
    Signing,
    /// The outbound HTTP request could not be built.
    Request,
    /// The network exchange failed.
    Http,
    /// The reply could not be parsed as an envelope.
    Parse,
}

/// Errors returned by a transport call.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Envelope construction failed.
    #[error("failed to encode request envelope")]
    Encoding(#[source] XmlError),

    /// Request signing failed.
    #[error("failed to sign request")]
    Signing(#[source] AuthError),

    /// The outbound request could not be built.
    #[error("invalid request: {0}")]
    Request(String),

    /// Sending the request or reading the reply failed.
    #[error("HTTP exchange failed")]
    Http(#[source] SendError),

    /// The reply is not a valid envelope.
    #[error("failed to parse reply envelope")]
    Parse(#[source] XmlError),
}

impl TransportError {
    /// The failure category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Encoding(_) => ErrorKind::Encoding,
            Self::Signing(_) => ErrorKind::Signing,
            Self::Request(_) => ErrorKind::Request,
            Self::Http(_) => ErrorKind::Http,
            Self::Parse(_) => ErrorKind::Parse,
        }
    }
}

/// Join an error and its sources with `": "`.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

/// Errors raised by an [`HttpSender`](crate::HttpSender).
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The HTTP client failed.
    #[error("HTTP client error")]
    Reqwest(#[from] reqwest::Error),

    /// An I/O error on the connection.
    #[error("connection I/O error")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_should_map_variants_to_kinds() {
        let err = TransportError::Signing(AuthError::InvalidCredential("empty token".into()));
        assert_eq!(err.kind(), ErrorKind::Signing);

        let err = TransportError::Request("bad uri".into());
        assert_eq!(err.kind(), ErrorKind::Request);

        let err = TransportError::Parse(XmlError::MissingElement("Body".into()));
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_should_keep_cause_as_source() {
        let err = TransportError::Http(SendError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        )));
        assert_eq!(err.kind(), ErrorKind::Http);
        assert_eq!(err.to_string(), "HTTP exchange failed");

        let send = err.source().expect("send error");
        assert_eq!(send.to_string(), "connection I/O error");
        assert_eq!(send.source().expect("io error").to_string(), "refused");
    }

    #[test]
    fn test_should_print_each_cause_once_in_chain() {
        let err = TransportError::Signing(AuthError::InvalidCredential("access token is empty".into()));
        assert_eq!(
            error_chain(&err),
            "failed to sign request: Invalid credential: access token is empty"
        );
    }
}
