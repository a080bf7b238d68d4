//! SOAP XML serialization: building Flickr request and reply envelopes.
//!
//! A request envelope looks like this:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/"
//!                   xmlns:xsi="http://www.w3.org/1999/XMLSchema-instance"
//!                   xmlns:xsd="http://www.w3.org/1999/XMLSchema">
//!   <soapenv:Body>
//!     <x:FlickrRequest xmlns:x="urn:flickr">
//!       <format>soap2</format>
//!       <method>flickr.test.echo</method>
//!     </x:FlickrRequest>
//!   </soapenv:Body>
//! </soapenv:Envelope>
//! ```

use std::io::{self, Write};

use flickrkit_core::Parameters;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};

use crate::error::XmlError;

/// The SOAP 1.1 envelope namespace.
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// The `xsi` namespace declared on every envelope.
pub const XSI_NS: &str = "http://www.w3.org/1999/XMLSchema-instance";

/// The `xsd` namespace declared on every envelope.
pub const XSD_NS: &str = "http://www.w3.org/1999/XMLSchema";

/// Namespace of the Flickr body elements.
pub const FLICKR_URN: &str = "urn:flickr";

/// Qualified name of the request body element.
pub const REQUEST_ELEMENT: &str = "x:FlickrRequest";

/// Qualified name of the reply body element.
pub const RESPONSE_ELEMENT: &str = "x:FlickrResponse";

/// Name of the fixed protocol-version field.
pub const FORMAT_FIELD: &str = "format";

/// Value of the fixed protocol-version field.
pub const FORMAT_VERSION: &str = "soap2";

/// An outbound `FlickrRequest` envelope.
///
/// Holds the body fields in wire order: the fixed `format` field first, then
/// one field per API parameter.
///
/// # Examples
///
/// ```
/// use flickrkit_core::Parameters;
/// use flickrkit_soap_xml::RequestEnvelope;
///
/// let mut params = Parameters::new();
/// params.insert("method".to_owned(), "flickr.test.echo".to_owned());
///
/// let envelope = RequestEnvelope::new(&params).unwrap();
/// assert_eq!(envelope.fields().len(), 2);
///
/// let xml = envelope.to_xml().unwrap();
/// assert!(xml.contains("<format>soap2</format><method>flickr.test.echo</method>"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEnvelope {
    fields: Vec<(String, String)>,
}

impl RequestEnvelope {
    /// Build an envelope for the given parameters.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::InvalidElementName`] if a parameter name cannot be
    /// used as an XML element name.
    pub fn new(parameters: &Parameters) -> Result<Self, XmlError> {
        let mut fields = Vec::with_capacity(parameters.len() + 1);
        fields.push((FORMAT_FIELD.to_owned(), FORMAT_VERSION.to_owned()));

        for (name, value) in parameters {
            validate_element_name(name)?;
            fields.push((name.clone(), value.clone()));
        }

        Ok(Self { fields })
    }

    /// Wrap already-ordered fields, as read back from the wire.
    pub(crate) fn from_fields(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// The body fields in wire order.
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// The value of the first field with the given name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Serialize the envelope as an XML document.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if writing fails.
    pub fn to_xml(&self) -> Result<String, XmlError> {
        let mut buf = Vec::with_capacity(512);
        let mut writer = Writer::new(&mut buf);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        write_envelope(&mut writer, |w| {
            w.create_element(REQUEST_ELEMENT)
                .with_attribute(("xmlns:x", FLICKR_URN))
                .write_inner_content(|w| {
                    for (name, value) in &self.fields {
                        write_text_element(w, name, value)?;
                    }
                    Ok(())
                })?;
            Ok(())
        })?;

        String::from_utf8(buf).map_err(|e| XmlError::InvalidUtf8(e.to_string()))
    }
}

/// Serialize a reply envelope carrying `payload` as escaped text.
///
/// Flickr sends the response payload XML escaped inside `x:FlickrResponse`;
/// [`ResponseEnvelope`](crate::ResponseEnvelope) unescapes it again.
///
/// # Errors
///
/// Returns `XmlError` if writing fails.
pub fn response_to_xml(payload: &str) -> Result<String, XmlError> {
    let mut buf = Vec::with_capacity(256 + payload.len());
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_envelope(&mut writer, |w| {
        w.create_element(RESPONSE_ELEMENT)
            .with_attribute(("xmlns:x", FLICKR_URN))
            .write_text_content(BytesText::new(payload))?;
        Ok(())
    })?;

    String::from_utf8(buf).map_err(|e| XmlError::InvalidUtf8(e.to_string()))
}

// ---------------------------------------------------------------------------
// Helper functions for writing common XML patterns
// ---------------------------------------------------------------------------

/// Write `<soapenv:Envelope ...><soapenv:Body>` around the given content.
pub(crate) fn write_envelope<W, F>(writer: &mut Writer<W>, body: F) -> io::Result<()>
where
    W: Write,
    F: FnOnce(&mut Writer<W>) -> io::Result<()>,
{
    writer
        .create_element("soapenv:Envelope")
        .with_attribute(("xmlns:soapenv", SOAP_ENVELOPE_NS))
        .with_attribute(("xmlns:xsi", XSI_NS))
        .with_attribute(("xmlns:xsd", XSD_NS))
        .write_inner_content(|w| {
            w.create_element("soapenv:Body").write_inner_content(body)?;
            Ok(())
        })?;
    Ok(())
}

/// Write a simple `<tag>text</tag>` element.
pub(crate) fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

/// Check that `name` can be written as an unprefixed XML element name.
fn validate_element_name(name: &str) -> Result<(), XmlError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        }
        _ => false,
    };

    if valid && !name.to_ascii_lowercase().starts_with("xml") {
        Ok(())
    } else {
        Err(XmlError::InvalidElementName(name.to_owned()))
    }
}
