//! Error types for the flickrkit core.

/// Core error type for flickrkit configuration and endpoints.
#[derive(Debug, thiserror::Error)]
pub enum FlickrError {
    /// The endpoint scheme is neither `http` nor `https`.
    #[error("unsupported URL scheme: {0} (expected http or https)")]
    UnsupportedScheme(String),

    /// The endpoint host is empty or contains characters not allowed in a host.
    #[error("invalid endpoint host: {0:?}")]
    InvalidHost(String),

    /// The endpoint path does not start with `/`.
    #[error("invalid endpoint path: {0:?} (must start with '/')")]
    InvalidPath(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}
