//! Signed SOAP transport for the Flickr API.
//!
//! [`SoapTransport`] turns an API parameter set into a `FlickrRequest`
//! envelope, signs it with OAuth 1.0a, posts it to the configured endpoint and
//! parses the reply into a [`SoapResponse`].
//!
//! ```no_run
//! use flickrkit_auth::AccessToken;
//! use flickrkit_core::{FlickrConfig, Parameters};
//! use flickrkit_transport::{Response, SoapTransport};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = SoapTransport::from_config(&FlickrConfig::from_env()?)?;
//! let token = AccessToken::new("72157-token", "token-secret");
//!
//! let mut params = Parameters::new();
//! params.insert("method".to_owned(), "flickr.test.login".to_owned());
//!
//! let response = transport.send("", &params, &token).await?;
//! if response.is_error() {
//!     eprintln!("{:?}: {:?}", response.error_code(), response.error_message());
//! } else {
//!     println!("{}", response.payload().unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

pub mod diagnostics;
pub mod error;
pub mod response;
pub mod sender;
pub mod soap;
pub mod transport;

pub use diagnostics::{Diagnostics, NoDiagnostics, TracingDiagnostics};
pub use error::{ErrorKind, SendError, TransportError};
pub use response::{Response, SoapResponse};
pub use sender::{HttpSender, RawResponse, ReqwestSender};
pub use soap::{SOAP_CONTENT_TYPE, SoapTransport};
pub use transport::{Transport, TransportType};
