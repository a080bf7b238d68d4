//! Verification of OAuth 1.0a signed requests.
//!
//! The receiving side recomputes the signature from the request line and the
//! `Authorization` header, then compares it with the provided one in constant
//! time. Timestamp freshness and nonce replay checks are left to the caller.

use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::credentials::{ConsumerCredentials, CredentialProvider};
use crate::encoding::{base_string_uri, query_parameters, signature_base_string};
use crate::error::AuthError;
use crate::oauth1::{SIGNATURE_METHOD, compute_signature};

/// Result of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedRequest {
    /// The consumer key the request was signed for.
    pub consumer_key: String,
    /// The access token the request was signed with.
    pub token: String,
    /// The `oauth_timestamp` value, in unix seconds.
    pub timestamp: i64,
    /// The `oauth_nonce` value.
    pub nonce: String,
}

/// Verify an OAuth 1.0a signed request received over plain HTTP.
///
/// An origin-form request line (`POST /services/soap/`) is resolved against
/// the `Host` header with the `http` scheme. Servers terminating TLS must use
/// [`verify_oauth1_with_scheme`] with `"https"`, otherwise the rebuilt base
/// string URI differs from the signed one.
///
/// # Errors
///
/// Returns an [`AuthError`] if the header is missing or malformed, the request
/// was signed for another consumer, the token is unknown, or the signature
/// does not match.
pub fn verify_oauth1(
    parts: &http::request::Parts,
    consumer: &ConsumerCredentials,
    credential_provider: &dyn CredentialProvider,
) -> Result<VerifiedRequest, AuthError> {
    verify_oauth1_with_scheme(parts, "http", consumer, credential_provider)
}

/// Verify an OAuth 1.0a signed request, resolving origin-form request lines
/// with `scheme`.
///
/// Absolute request URIs keep their own scheme.
///
/// # Errors
///
/// See [`verify_oauth1`].
pub fn verify_oauth1_with_scheme(
    parts: &http::request::Parts,
    scheme: &str,
    consumer: &ConsumerCredentials,
    credential_provider: &dyn CredentialProvider,
) -> Result<VerifiedRequest, AuthError> {
    let auth_header = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let mut oauth_params = parse_authorization_header(auth_header)?;

    let provided_signature = oauth_params
        .remove("oauth_signature")
        .ok_or_else(|| AuthError::MissingParameter("oauth_signature".to_owned()))?;
    oauth_params.remove("realm");

    let method = required(&oauth_params, "oauth_signature_method")?;
    if method != SIGNATURE_METHOD {
        return Err(AuthError::UnsupportedSignatureMethod(method.to_owned()));
    }

    let consumer_key = required(&oauth_params, "oauth_consumer_key")?;
    if consumer_key != consumer.key() {
        return Err(AuthError::ConsumerKeyMismatch(consumer_key.to_owned()));
    }

    let token = required(&oauth_params, "oauth_token")?.to_owned();
    let nonce = required(&oauth_params, "oauth_nonce")?.to_owned();
    let timestamp = required(&oauth_params, "oauth_timestamp")?
        .parse::<i64>()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    debug!(token = %token, "Verifying OAuth signature");

    let token_secret = credential_provider.get_token_secret(&token)?;

    let mut params = query_parameters(&parts.uri);
    params.extend(oauth_params);

    // Behind a proxy the request line may be origin-form; fall back to the Host header.
    let base_uri = match base_string_uri(&parts.uri) {
        Ok(uri) => uri,
        Err(_) => base_string_uri(&absolute_uri(parts, scheme)?)?,
    };
    let base_string = signature_base_string(parts.method.as_str(), &base_uri, &params);
    let expected_signature = compute_signature(consumer.secret(), &token_secret, &base_string)?;

    if provided_signature
        .as_bytes()
        .ct_eq(expected_signature.as_bytes())
        .into()
    {
        debug!(token = %token, "OAuth verification succeeded");
        Ok(VerifiedRequest {
            consumer_key: consumer.key().to_owned(),
            token,
            timestamp,
            nonce,
        })
    } else {
        debug!(
            expected = %expected_signature,
            provided = %provided_signature,
            "OAuth signature mismatch"
        );
        Err(AuthError::SignatureDoesNotMatch)
    }
}

/// Parse an `Authorization: OAuth k="v", ...` header into decoded pairs.
///
/// # Errors
///
/// Returns [`AuthError::InvalidAuthHeader`] if the scheme is not `OAuth` or a
/// field is not a quoted `name="value"` pair.
///
/// # Examples
///
/// ```
/// use flickrkit_auth::verify::parse_authorization_header;
///
/// let params = parse_authorization_header(r#"OAuth oauth_token="a%20b", oauth_version="1.0""#).unwrap();
/// assert_eq!(params["oauth_token"], "a b");
/// assert_eq!(params["oauth_version"], "1.0");
/// ```
pub fn parse_authorization_header(header: &str) -> Result<BTreeMap<String, String>, AuthError> {
    let rest = header
        .strip_prefix("OAuth ")
        .ok_or(AuthError::InvalidAuthHeader)?;

    let mut params = BTreeMap::new();
    for field in rest.split(',').map(str::trim).filter(|f| !f.is_empty()) {
        let (name, quoted) = field.split_once('=').ok_or(AuthError::InvalidAuthHeader)?;
        let value = quoted
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .ok_or(AuthError::InvalidAuthHeader)?;
        let value = percent_decode_str(value)
            .decode_utf8()
            .map_err(|_| AuthError::InvalidAuthHeader)?;
        params.insert(name.trim().to_owned(), value.into_owned());
    }

    Ok(params)
}

fn required<'a>(params: &'a BTreeMap<String, String>, name: &str) -> Result<&'a str, AuthError> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| AuthError::MissingParameter(name.to_owned()))
}

/// Rebuild an absolute URI from the `Host` header and an origin-form request line.
fn absolute_uri(parts: &http::request::Parts, scheme: &str) -> Result<http::Uri, AuthError> {
    let host = parts
        .headers
        .get(http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AuthError::InvalidRequestUri(parts.uri.to_string()))?;
    let path_and_query = parts
        .uri
        .path_and_query()
        .map_or("/", http::uri::PathAndQuery::as_str);

    format!("{scheme}://{host}{path_and_query}")
        .parse()
        .map_err(|_| AuthError::InvalidRequestUri(parts.uri.to_string()))
}
