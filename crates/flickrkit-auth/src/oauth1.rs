//! OAuth 1.0a request signing (HMAC-SHA1, header placement).
//!
//! The signature is carried in the `Authorization` header:
//!
//! ```text
//! OAuth oauth_consumer_key="...", oauth_nonce="...", oauth_signature="...",
//!       oauth_signature_method="HMAC-SHA1", oauth_timestamp="...",
//!       oauth_token="...", oauth_version="1.0"
//! ```
//!
//! Where `oauth_signature = Base64(HMAC-SHA1(key, SignatureBaseString))` and
//! `key = encode(consumer_secret) & encode(token_secret)`.
//!
//! Only the query string and the `oauth_*` protocol parameters are signed. The
//! request body is an XML document, not a form, so it does not contribute.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, KeyInit, Mac};
use sha1::Sha1;
use tracing::debug;

use crate::credentials::{AccessToken, ConsumerCredentials};
use crate::encoding::{base_string_uri, percent_encode, query_parameters, signature_base_string};
use crate::error::AuthError;

type HmacSha1 = Hmac<Sha1>;

/// The only signature method this crate produces and accepts.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";

/// The OAuth protocol version sent with every request.
pub const OAUTH_VERSION: &str = "1.0";

/// A signing service: applies credentials to an outbound request in place.
///
/// Transports call this after the payload is attached and before the request
/// is transmitted, so implementations observe the complete request.
pub trait RequestSigner: Send + Sync + fmt::Debug {
    /// Sign `request` on behalf of `token`.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the credentials or the request cannot be
    /// signed.
    fn sign(&self, token: &AccessToken, request: &mut http::Request<String>)
    -> Result<(), AuthError>;
}

/// OAuth 1.0a `HMAC-SHA1` signer for a single application.
#[derive(Debug, Clone)]
pub struct OAuth1Signer {
    consumer: ConsumerCredentials,
}

impl OAuth1Signer {
    /// Create a signer for the given application credentials.
    #[must_use]
    pub fn new(consumer: ConsumerCredentials) -> Self {
        Self { consumer }
    }

    /// The application credentials this signer uses.
    #[must_use]
    pub fn consumer(&self) -> &ConsumerCredentials {
        &self.consumer
    }

    /// Sign with an explicit timestamp and nonce.
    ///
    /// [`RequestSigner::sign`] calls this with the current time and a random
    /// nonce; tests call it directly to get reproducible signatures.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredential`] if the consumer key or token is
    /// empty, and [`AuthError::InvalidRequestUri`] if the request URI is not
    /// absolute.
    pub fn sign_with(
        &self,
        token: &AccessToken,
        request: &mut http::Request<String>,
        timestamp: i64,
        nonce: &str,
    ) -> Result<(), AuthError> {
        if self.consumer.key().is_empty() {
            return Err(AuthError::InvalidCredential(
                "consumer key is empty".to_owned(),
            ));
        }
        if token.token().is_empty() {
            return Err(AuthError::InvalidCredential(
                "access token is empty".to_owned(),
            ));
        }

        let mut oauth_params = vec![
            ("oauth_consumer_key".to_owned(), self.consumer.key().to_owned()),
            ("oauth_nonce".to_owned(), nonce.to_owned()),
            ("oauth_signature_method".to_owned(), SIGNATURE_METHOD.to_owned()),
            ("oauth_timestamp".to_owned(), timestamp.to_string()),
            ("oauth_token".to_owned(), token.token().to_owned()),
            ("oauth_version".to_owned(), OAUTH_VERSION.to_owned()),
        ];

        let base_uri = base_string_uri(request.uri())?;
        let mut params = query_parameters(request.uri());
        params.extend(oauth_params.iter().cloned());

        let base_string = signature_base_string(request.method().as_str(), &base_uri, &params);

        debug!(base_string = %base_string, "Built OAuth signature base string");

        let signature = compute_signature(self.consumer.secret(), token.secret(), &base_string)?;
        oauth_params.push(("oauth_signature".to_owned(), signature));

        let header = http::HeaderValue::from_str(&build_authorization_header(&oauth_params))
            .map_err(|_| AuthError::InvalidHeaderValue)?;
        request
            .headers_mut()
            .insert(http::header::AUTHORIZATION, header);

        Ok(())
    }
}

impl RequestSigner for OAuth1Signer {
    fn sign(
        &self,
        token: &AccessToken,
        request: &mut http::Request<String>,
    ) -> Result<(), AuthError> {
        let timestamp = chrono::Utc::now().timestamp();
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        self.sign_with(token, request, timestamp, &nonce)
    }
}

/// Compute the signature: `Base64(HMAC-SHA1(encode(cs) & encode(ts), base_string))`.
///
/// # Errors
///
/// Returns [`AuthError::InvalidCredential`] if the HMAC key is rejected.
pub fn compute_signature(
    consumer_secret: &str,
    token_secret: &str,
    base_string: &str,
) -> Result<String, AuthError> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| AuthError::InvalidCredential(e.to_string()))?;
    mac.update(base_string.as_bytes());
    let result = mac.finalize().into_bytes();
    Ok(BASE64.encode(result))
}

/// Format protocol parameters as an `OAuth` authorization header value.
fn build_authorization_header(params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_unstable();

    let fields: Vec<String> = sorted
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect();

    format!("OAuth {}", fields.join(", "))
}
