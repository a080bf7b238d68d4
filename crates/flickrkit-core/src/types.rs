//! Common type definitions shared across the flickrkit crates.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::FlickrError;

/// API method arguments: parameter name to string value.
///
/// Keys are unique. A `BTreeMap` keeps serialization deterministic, so two
/// calls with the same parameters always produce the same request body.
pub type Parameters = BTreeMap<String, String>;

/// URL scheme used to reach the API host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    #[default]
    Https,
}

impl Scheme {
    /// Get the scheme as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    /// The port implied by this scheme when none is given.
    #[must_use]
    pub fn default_port(self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }
}

impl FromStr for Scheme {
    type Err = FlickrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            _ => Err(FlickrError::UnsupportedScheme(s.to_owned())),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated service endpoint: scheme, host, optional port, and path.
///
/// This is the single place the call target is configured. Transports build
/// every request URL from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    scheme: Scheme,
    host: String,
    port: Option<u16>,
    path: String,
}

impl Endpoint {
    /// Create a new endpoint.
    ///
    /// # Errors
    /// Returns an error if the host is empty or malformed, or the path does
    /// not start with `/`.
    pub fn new(
        scheme: Scheme,
        host: impl Into<String>,
        port: Option<u16>,
        path: impl Into<String>,
    ) -> Result<Self, FlickrError> {
        let host = host.into();
        let path = path.into();

        if host.is_empty()
            || !host
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.'))
        {
            return Err(FlickrError::InvalidHost(host));
        }
        validate_path(&path)?;

        Ok(Self {
            scheme,
            host: host.to_ascii_lowercase(),
            port,
            path,
        })
    }

    /// The URL scheme.
    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// The host name.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The explicitly configured port, if any.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// The configured request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The full URL of the configured path.
    #[must_use]
    pub fn url(&self) -> String {
        self.url_with_path(&self.path)
    }

    /// The URL for `path` on this endpoint's host.
    ///
    /// An empty `path` falls back to the configured path.
    ///
    /// # Errors
    /// Returns an error if a non-empty `path` does not start with `/`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flickrkit_core::{Endpoint, Scheme};
    ///
    /// let endpoint = Endpoint::new(Scheme::Https, "api.flickr.com", None, "/services/soap/").unwrap();
    /// assert_eq!(endpoint.url_for("").unwrap(), "https://api.flickr.com/services/soap/");
    /// assert_eq!(endpoint.url_for("/services/rest/").unwrap(), "https://api.flickr.com/services/rest/");
    /// ```
    pub fn url_for(&self, path: &str) -> Result<String, FlickrError> {
        if path.is_empty() {
            return Ok(self.url());
        }
        validate_path(path)?;
        Ok(self.url_with_path(path))
    }

    fn url_with_path(&self, path: &str) -> String {
        match self.port {
            Some(port) if port != self.scheme.default_port() => {
                format!("{}://{}:{port}{path}", self.scheme, self.host)
            }
            _ => format!("{}://{}{path}", self.scheme, self.host),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

fn validate_path(path: &str) -> Result<(), FlickrError> {
    if !path.starts_with('/') || path.chars().any(|c| c.is_whitespace() || c == '#') {
        return Err(FlickrError::InvalidPath(path.to_owned()));
    }
    Ok(())
}
