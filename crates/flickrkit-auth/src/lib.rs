//! OAuth 1.0a request signing and verification for flickrkit.
//!
//! Flickr authorizes API calls with delegated OAuth 1.0a credentials: an
//! application key/secret pair (the consumer) plus a per-user access token and
//! token secret. Every outbound request carries an `Authorization` header with
//! an `HMAC-SHA1` signature computed over the request method, URL, and
//! parameters.
//!
//! # Usage
//!
//! ```rust
//! use flickrkit_auth::{AccessToken, ConsumerCredentials, OAuth1Signer, RequestSigner};
//!
//! let signer = OAuth1Signer::new(ConsumerCredentials::new("api-key", "api-secret"));
//! let token = AccessToken::new("72157-token", "token-secret");
//!
//! let mut request = http::Request::builder()
//!     .method("POST")
//!     .uri("https://api.flickr.com/services/soap/")
//!     .body(String::from("<envelope/>"))
//!     .unwrap();
//!
//! signer.sign(&token, &mut request).unwrap();
//! assert!(request.headers().contains_key(http::header::AUTHORIZATION));
//! ```
//!
//! # Modules
//!
//! - [`credentials`] - Consumer and access-token credentials, token secret lookup
//! - [`encoding`] - Percent encoding and signature base string construction
//! - [`error`] - Authentication error types
//! - [`oauth1`] - The [`RequestSigner`] seam and the `HMAC-SHA1` signer
//! - [`verify`] - Server-side verification of signed requests

pub mod credentials;
pub mod encoding;
pub mod error;
pub mod oauth1;
pub mod verify;

pub use credentials::{AccessToken, ConsumerCredentials, CredentialProvider, StaticCredentialProvider};
pub use error::AuthError;
pub use oauth1::{OAuth1Signer, RequestSigner, compute_signature};
pub use verify::{VerifiedRequest, verify_oauth1, verify_oauth1_with_scheme};
