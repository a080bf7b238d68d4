//! The SOAP transport.

use std::sync::Arc;

use flickrkit_auth::{AccessToken, ConsumerCredentials, OAuth1Signer, RequestSigner};
use flickrkit_core::{Endpoint, FlickrConfig, FlickrError, Parameters};
use flickrkit_soap_xml::{RequestEnvelope, ResponseEnvelope};
use tracing::{debug, error};

use crate::diagnostics::{Diagnostics, NoDiagnostics, TracingDiagnostics};
use crate::error::{TransportError, error_chain};
use crate::response::{Response, SoapResponse};
use crate::sender::{HttpSender, ReqwestSender};
use crate::transport::{Transport, TransportType};

/// `Content-Type` of every outbound envelope.
pub const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Sends API calls as signed SOAP envelopes.
///
/// The transport holds no per-call state; share it behind an `Arc` to issue
/// calls concurrently.
#[derive(Debug, Clone)]
pub struct SoapTransport {
    endpoint: Endpoint,
    signer: Arc<dyn RequestSigner>,
    sender: Arc<dyn HttpSender>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl SoapTransport {
    /// Create a transport that signs with `signer` and sends with a default
    /// [`ReqwestSender`].
    #[must_use]
    pub fn new(endpoint: Endpoint, signer: Arc<dyn RequestSigner>) -> Self {
        Self {
            endpoint,
            signer,
            sender: Arc::new(ReqwestSender::new()),
            diagnostics: Arc::new(NoDiagnostics),
        }
    }

    /// Build a transport from client configuration.
    ///
    /// The signer uses the configured API key and shared secret. When
    /// `debug_stream` is set, envelopes and replies are logged through
    /// [`TracingDiagnostics`].
    ///
    /// # Errors
    /// Returns an error if the configured endpoint is invalid.
    pub fn from_config(config: &FlickrConfig) -> Result<Self, FlickrError> {
        let endpoint = config.endpoint()?;
        let consumer = ConsumerCredentials::new(config.api_key.clone(), config.shared_secret.clone());
        let transport = Self::new(endpoint, Arc::new(OAuth1Signer::new(consumer)));

        if config.debug_stream {
            Ok(transport.with_diagnostics(Arc::new(TracingDiagnostics)))
        } else {
            Ok(transport)
        }
    }

    /// Replace the HTTP sender.
    #[must_use]
    pub fn with_sender(mut self, sender: Arc<dyn HttpSender>) -> Self {
        self.sender = sender;
        self
    }

    /// Replace the diagnostics sink.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Send one API call and return the parsed reply.
    ///
    /// A non-empty `path` replaces the configured service path. Service errors
    /// (SOAP faults) are returned as an `Ok` response whose
    /// [`is_error`](Response::is_error) is true, whatever the HTTP status.
    ///
    /// # Errors
    /// Returns [`TransportError`] if the envelope cannot be built, signing
    /// fails, the exchange fails, or the reply is not a valid envelope.
    pub async fn send(
        &self,
        path: &str,
        parameters: &Parameters,
        token: &AccessToken,
    ) -> Result<SoapResponse, TransportError> {
        let result = self.exchange(path, parameters, token).await;
        if let Err(e) = &result {
            error!(
                error = %error_chain(e),
                kind = ?e.kind(),
                method = parameters.get("method").map_or("", String::as_str),
                "SOAP call failed"
            );
        }
        result
    }

    async fn exchange(
        &self,
        path: &str,
        parameters: &Parameters,
        token: &AccessToken,
    ) -> Result<SoapResponse, TransportError> {
        let envelope = RequestEnvelope::new(parameters).map_err(TransportError::Encoding)?;
        let xml = envelope.to_xml().map_err(TransportError::Encoding)?;

        let url = self
            .endpoint
            .url_for(path)
            .map_err(|e| TransportError::Request(e.to_string()))?;
        self.diagnostics.outbound_envelope(&url, &xml);

        let mut request = http::Request::builder()
            .method(http::Method::POST)
            .uri(url.as_str())
            .header(http::header::CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .body(xml)
            .map_err(|e| TransportError::Request(e.to_string()))?;

        self.signer
            .sign(token, &mut request)
            .map_err(TransportError::Signing)?;

        debug!(url = %url, fields = envelope.fields().len(), "sending SOAP request");
        let raw = self
            .sender
            .send(request)
            .await
            .map_err(TransportError::Http)?;
        self.diagnostics.inbound_body(raw.status, &raw.body);

        let reply = ResponseEnvelope::from_bytes(&raw.body).map_err(TransportError::Parse)?;
        let mut response = SoapResponse::new(reply).with_status(raw.status);
        response.parse().map_err(TransportError::Parse)?;

        debug!(
            status = %raw.status,
            is_error = response.is_error(),
            "received SOAP reply"
        );
        Ok(response)
    }
}

#[async_trait::async_trait]
impl Transport for SoapTransport {
    type Response = SoapResponse;

    fn transport_type(&self) -> TransportType {
        TransportType::Soap
    }

    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn get(
        &self,
        path: &str,
        parameters: &Parameters,
        token: &AccessToken,
    ) -> Result<SoapResponse, TransportError> {
        self.send(path, parameters, token).await
    }

    async fn post(
        &self,
        path: &str,
        parameters: &Parameters,
        token: &AccessToken,
    ) -> Result<SoapResponse, TransportError> {
        self.send(path, parameters, token).await
    }
}
