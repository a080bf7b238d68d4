//! OAuth credential types and token secret lookup.
//!
//! A request is signed with two credential pairs: the application's
//! [`ConsumerCredentials`] and the user's [`AccessToken`]. The
//! [`CredentialProvider`] trait resolves token secrets on the verifying side.

use std::collections::HashMap;
use std::fmt;

use crate::error::AuthError;

/// Application credentials: API key and shared secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ConsumerCredentials {
    key: String,
    secret: String,
}

impl ConsumerCredentials {
    /// Create consumer credentials from an API key and shared secret.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// The API key, sent as `oauth_consumer_key`.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The shared secret, used only to derive the signing key.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for ConsumerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerCredentials")
            .field("key", &self.key)
            .field("secret", &"...")
            .finish()
    }
}

/// A user's delegated authorization: access token and token secret.
///
/// Passed explicitly to every call. Nothing in flickrkit stores it.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: String,
    secret: String,
}

impl AccessToken {
    /// Create an access token from the token and its secret.
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }

    /// The token, sent as `oauth_token`.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The token secret.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &self.token)
            .field("secret", &"...")
            .finish()
    }
}

/// Trait for looking up token secrets by access token.
///
/// Implementations may back this with a database, configuration file,
/// or any other credential store.
pub trait CredentialProvider: Send + Sync {
    /// Retrieve the token secret for the given access token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenNotFound`] if the token is not recognized.
    fn get_token_secret(&self, token: &str) -> Result<String, AuthError>;
}

/// A simple in-memory credential provider backed by a `HashMap`.
///
/// # Examples
///
/// ```
/// use flickrkit_auth::credentials::{CredentialProvider, StaticCredentialProvider};
///
/// let provider = StaticCredentialProvider::new(vec![
///     ("72157-token".to_owned(), "token-secret".to_owned()),
/// ]);
///
/// let secret = provider.get_token_secret("72157-token").unwrap();
/// assert_eq!(secret, "token-secret");
/// ```
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    tokens: HashMap<String, String>,
}

impl StaticCredentialProvider {
    /// Create a new `StaticCredentialProvider` from (token, token_secret) pairs.
    pub fn new(tokens: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn get_token_secret(&self, token: &str) -> Result<String, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::TokenNotFound(token.to_owned()))
    }
}
