//! Error types for OAuth 1.0a signing and verification.
//!
//! All signing and verification failures are represented by [`AuthError`].

/// Errors that can occur while signing or verifying an OAuth 1.0a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The credential pair cannot be used to sign a request.
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// The request URI is not absolute or cannot be normalized.
    #[error("Invalid request URI: {0}")]
    InvalidRequestUri(String),

    /// The computed `Authorization` header is not a valid header value.
    #[error("Invalid Authorization header value")]
    InvalidHeaderValue,

    /// The `Authorization` header is missing from the request.
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    /// The `Authorization` header could not be parsed.
    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    /// A required `oauth_*` protocol parameter is missing.
    #[error("Missing OAuth parameter: {0}")]
    MissingParameter(String),

    /// The signature method is not supported (only HMAC-SHA1 is supported).
    #[error("Unsupported signature method: {0}")]
    UnsupportedSignatureMethod(String),

    /// The request was signed for a different consumer key.
    #[error("Consumer key does not match: {0}")]
    ConsumerKeyMismatch(String),

    /// The access token was not found in the credential store.
    #[error("Access token not found: {0}")]
    TokenNotFound(String),

    /// The computed signature does not match the provided signature.
    #[error("Signature does not match")]
    SignatureDoesNotMatch,
}
