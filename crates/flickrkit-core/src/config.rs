//! Client configuration.
//!
//! Provides [`FlickrConfig`] for configuring API credentials and the service
//! endpoint. Values are loaded from environment variables with defaults that
//! point at the public Flickr API.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::types::{Endpoint, Scheme};
use crate::FlickrError;

/// Default API host.
pub const DEFAULT_HOST: &str = "api.flickr.com";

/// Default path of the SOAP service.
pub const DEFAULT_SOAP_PATH: &str = "/services/soap/";

/// flickrkit client configuration.
///
/// # Examples
///
/// ```
/// use flickrkit_core::FlickrConfig;
///
/// let config = FlickrConfig::default();
/// assert_eq!(config.host, "api.flickr.com");
/// assert_eq!(config.endpoint().unwrap().url(), "https://api.flickr.com/services/soap/");
/// ```
#[derive(Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct FlickrConfig {
    /// Application API key (OAuth consumer key).
    #[builder(default)]
    pub api_key: String,

    /// Application shared secret (OAuth consumer secret).
    #[builder(default)]
    pub shared_secret: String,

    /// URL scheme used to reach the API host.
    #[builder(default)]
    pub scheme: Scheme,

    /// API host name.
    #[builder(default = String::from(DEFAULT_HOST))]
    pub host: String,

    /// Explicit port; `None` uses the scheme default.
    #[builder(default)]
    pub port: Option<u16>,

    /// Path of the SOAP service on the API host.
    #[builder(default = String::from(DEFAULT_SOAP_PATH))]
    pub soap_path: String,

    /// Whether outbound envelopes and raw replies are emitted as diagnostics.
    #[builder(default = false)]
    pub debug_stream: bool,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl std::fmt::Debug for FlickrConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlickrConfig")
            .field("api_key", &self.api_key)
            .field("shared_secret", &"...")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("soap_path", &self.soap_path)
            .field("debug_stream", &self.debug_stream)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Default for FlickrConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            shared_secret: String::new(),
            scheme: Scheme::Https,
            host: String::from(DEFAULT_HOST),
            port: None,
            soap_path: String::from(DEFAULT_SOAP_PATH),
            debug_stream: false,
            log_level: String::from("info"),
        }
    }
}

impl FlickrConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables (falling back to defaults):
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `FLICKR_API_KEY` | *(empty)* |
    /// | `FLICKR_SHARED_SECRET` | *(empty)* |
    /// | `FLICKR_SCHEME` | `https` |
    /// | `FLICKR_HOST` | `api.flickr.com` |
    /// | `FLICKR_PORT` | *(unset)* |
    /// | `FLICKR_SOAP_PATH` | `/services/soap/` |
    /// | `FLICKR_DEBUG_STREAM` | `false` |
    /// | `LOG_LEVEL` | `info` |
    ///
    /// # Errors
    /// Returns an error if `FLICKR_SCHEME` or `FLICKR_PORT` cannot be parsed.
    pub fn from_env() -> Result<Self, FlickrError> {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("FLICKR_API_KEY") {
            config.api_key = v;
        }
        if let Ok(v) = std::env::var("FLICKR_SHARED_SECRET") {
            config.shared_secret = v;
        }
        if let Ok(v) = std::env::var("FLICKR_SCHEME") {
            config.scheme = v.parse()?;
        }
        if let Ok(v) = std::env::var("FLICKR_HOST") {
            config.host = v;
        }
        if let Ok(v) = std::env::var("FLICKR_PORT") {
            let port = v
                .parse::<u16>()
                .map_err(|e| FlickrError::Config(format!("invalid FLICKR_PORT {v:?}: {e}")))?;
            config.port = Some(port);
        }
        if let Ok(v) = std::env::var("FLICKR_SOAP_PATH") {
            config.soap_path = v;
        }
        if let Ok(v) = std::env::var("FLICKR_DEBUG_STREAM") {
            config.debug_stream = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        Ok(config)
    }

    /// Validate the host, port, and SOAP path into an [`Endpoint`].
    ///
    /// # Errors
    /// Returns an error if the host or path is invalid.
    pub fn endpoint(&self) -> Result<Endpoint, FlickrError> {
        Endpoint::new(self.scheme, self.host.clone(), self.port, self.soap_path.clone())
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
