//! Signature base string construction for OAuth 1.0a.
//!
//! The signature base string has the form:
//!
//! ```text
//! HTTP-Method & encode(BaseStringURI) & encode(NormalizedParameters)
//! ```
//!
//! Each component is normalized per RFC 5849 section 3.4.1 so that the signer
//! and the verifier derive identical bytes.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::AuthError;

/// The set of characters that must be percent-encoded.
///
/// Everything except the RFC 3986 unreserved characters
/// (A-Z, a-z, 0-9, `-`, `_`, `.`, `~`) is encoded.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a string with the OAuth encoding rules.
///
/// Spaces become `%20` (never `+`) and hex digits are uppercase.
///
/// # Examples
///
/// ```
/// use flickrkit_auth::encoding::percent_encode;
///
/// assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
/// assert_eq!(percent_encode("a-b_c.d~e"), "a-b_c.d~e");
/// ```
#[must_use]
pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Build the base string URI: lowercase scheme and host, the port only when it
/// is not the scheme default, and the path without query or fragment.
///
/// # Errors
///
/// Returns [`AuthError::InvalidRequestUri`] if the URI has no scheme or host.
///
/// # Examples
///
/// ```
/// use flickrkit_auth::encoding::base_string_uri;
///
/// let uri: http::Uri = "https://API.Flickr.com:443/services/soap/?x=1".parse().unwrap();
/// assert_eq!(base_string_uri(&uri).unwrap(), "https://api.flickr.com/services/soap/");
/// ```
pub fn base_string_uri(uri: &http::Uri) -> Result<String, AuthError> {
    let scheme = uri
        .scheme_str()
        .ok_or_else(|| AuthError::InvalidRequestUri(uri.to_string()))?
        .to_ascii_lowercase();
    let host = uri
        .host()
        .ok_or_else(|| AuthError::InvalidRequestUri(uri.to_string()))?
        .to_ascii_lowercase();

    let default_port = match scheme.as_str() {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    };
    let authority = match uri.port_u16() {
        Some(port) if Some(port) != default_port => format!("{host}:{port}"),
        _ => host,
    };
    let path = if uri.path().is_empty() { "/" } else { uri.path() };

    Ok(format!("{scheme}://{authority}{path}"))
}

/// Decode the query parameters of a URI into (name, value) pairs.
#[must_use]
pub fn query_parameters(uri: &http::Uri) -> Vec<(String, String)> {
    uri.query()
        .map(|query| {
            form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        })
        .unwrap_or_default()
}

/// Normalize request parameters: encode every name and value, sort by name
/// then value, and join as `name=value` pairs separated by `&`.
///
/// # Examples
///
/// ```
/// use flickrkit_auth::encoding::normalize_parameters;
///
/// let params = vec![
///     ("b".to_owned(), "2".to_owned()),
///     ("a".to_owned(), "x y".to_owned()),
/// ];
/// assert_eq!(normalize_parameters(&params), "a=x%20y&b=2");
/// ```
#[must_use]
pub fn normalize_parameters(params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();

    encoded.sort_unstable();

    encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the complete signature base string.
#[must_use]
pub fn signature_base_string(
    method: &str,
    base_uri: &str,
    params: &[(String, String)],
) -> String {
    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(base_uri),
        percent_encode(&normalize_parameters(params))
    )
}
