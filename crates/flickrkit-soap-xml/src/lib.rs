//! SOAP envelope serialization and parsing for flickrkit.
//!
//! This crate provides the XML layer of the Flickr SOAP protocol:
//!
//! - [`RequestEnvelope`] builds the outbound `FlickrRequest` envelope from an
//!   API parameter set, and can read one back (used by test servers).
//! - [`ResponseEnvelope`] wraps a reply document and extracts its body as
//!   either a payload or a fault ([`BodyContent`]).
//! - [`find_text`] and [`find_attribute`] pull single values out of a payload.
//! - [`response_to_xml`] and [`fault_to_xml`] produce reply envelopes.
//!
//! # Wire conventions
//!
//! - Envelope namespace: `http://schemas.xmlsoap.org/soap/envelope/`
//! - Extra declarations: `xsi` and `xsd` (1999 XML Schema namespaces)
//! - Body element: `x:FlickrRequest` / `x:FlickrResponse` in `urn:flickr`
//! - First request field: `<format>soap2</format>`

pub mod deserialize;
pub mod error;
pub mod serialize;

pub use deserialize::{BodyContent, ResponseEnvelope, find_attribute, find_text};
pub use error::{XmlError, fault_to_xml};
pub use serialize::{
    FLICKR_URN, FORMAT_FIELD, FORMAT_VERSION, REQUEST_ELEMENT, RESPONSE_ELEMENT, RequestEnvelope,
    SOAP_ENVELOPE_NS, XSD_NS, XSI_NS, response_to_xml,
};
