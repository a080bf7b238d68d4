//! Parsed replies.
//!
//! [`Response`] is the reply abstraction shared by every transport;
//! [`SoapResponse`] is the SOAP implementation. A response is created from
//! the reply envelope, parsed once, and then only read.

use flickrkit_soap_xml::{BodyContent, ResponseEnvelope, XmlError, find_attribute, find_text};

/// A reply returned by a [`Transport`](crate::Transport).
pub trait Response: Send + Sync + std::fmt::Debug {
    /// Extract the payload or the fault from the reply document.
    ///
    /// # Errors
    /// Returns `XmlError` if the reply has no usable body.
    fn parse(&mut self) -> Result<(), XmlError>;

    /// Whether the service reported an error.
    fn is_error(&self) -> bool;

    /// The service error code, if the reply is an error.
    fn error_code(&self) -> Option<&str>;

    /// The service error message, if the reply is an error.
    fn error_message(&self) -> Option<&str>;

    /// The payload XML, if the reply is a success.
    fn payload(&self) -> Option<&str>;
}

/// A reply to a SOAP call.
///
/// # Examples
///
/// ```
/// use flickrkit_soap_xml::{ResponseEnvelope, fault_to_xml};
/// use flickrkit_transport::{Response, SoapResponse};
///
/// let envelope = ResponseEnvelope::from_bytes(&fault_to_xml("1", "Photo not found")).unwrap();
/// let mut response = SoapResponse::new(envelope);
/// response.parse().unwrap();
///
/// assert!(response.is_error());
/// assert_eq!(response.error_code(), Some("1"));
/// assert_eq!(response.error_message(), Some("Photo not found"));
/// ```
#[derive(Debug, Clone)]
pub struct SoapResponse {
    envelope: ResponseEnvelope,
    status: Option<http::StatusCode>,
    content: Option<BodyContent>,
}

impl SoapResponse {
    /// Wrap an unparsed reply envelope.
    #[must_use]
    pub fn new(envelope: ResponseEnvelope) -> Self {
        Self {
            envelope,
            status: None,
            content: None,
        }
    }

    /// Record the HTTP status the reply arrived with.
    #[must_use]
    pub fn with_status(mut self, status: http::StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// The HTTP status, when the reply came over the network.
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        self.status
    }

    /// The reply envelope as received.
    #[must_use]
    pub fn envelope(&self) -> &ResponseEnvelope {
        &self.envelope
    }

    /// Whether [`parse`](Response::parse) has succeeded.
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        self.content.is_some()
    }

    /// Text of the first payload element named `tag`.
    ///
    /// Returns `Ok(None)` for error replies, unparsed replies, and payloads
    /// without such an element.
    ///
    /// # Errors
    /// Returns `XmlError` if the payload is not well-formed.
    pub fn payload_text(&self, tag: &str) -> Result<Option<String>, XmlError> {
        match self.payload() {
            Some(payload) => find_text(payload, tag),
            None => Ok(None),
        }
    }

    /// Attribute `attr` of the first payload element named `tag`.
    ///
    /// # Errors
    /// Returns `XmlError` if the payload is not well-formed.
    pub fn payload_attribute(&self, tag: &str, attr: &str) -> Result<Option<String>, XmlError> {
        match self.payload() {
            Some(payload) => find_attribute(payload, tag, attr),
            None => Ok(None),
        }
    }
}

impl Response for SoapResponse {
    fn parse(&mut self) -> Result<(), XmlError> {
        self.content = Some(self.envelope.body()?);
        Ok(())
    }

    fn is_error(&self) -> bool {
        matches!(self.content, Some(BodyContent::Fault { .. }))
    }

    fn error_code(&self) -> Option<&str> {
        match &self.content {
            Some(BodyContent::Fault { code, .. }) => Some(code),
            _ => None,
        }
    }

    fn error_message(&self) -> Option<&str> {
        match &self.content {
            Some(BodyContent::Fault { message, .. }) => Some(message),
            _ => None,
        }
    }

    fn payload(&self) -> Option<&str> {
        match &self.content {
            Some(BodyContent::Payload(payload)) => Some(payload),
            _ => None,
        }
    }
}
