//! SOAP fault XML formatting and error types.
//!
//! This module provides the `XmlError` type for envelope serialization and
//! parsing errors and the `fault_to_xml` function for formatting SOAP faults.

use std::io;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, Event};

use crate::serialize::{write_envelope, write_text_element};

/// Prefix Flickr puts in front of numeric error codes in `faultcode`.
pub const FAULT_CODE_PREFIX: &str = "flickr.error.";

/// Errors that can occur during envelope serialization or parsing.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// An I/O error during XML writing.
    #[error("I/O error while writing XML")]
    Io(#[from] io::Error),

    /// An error from the underlying quick-xml library.
    #[error("XML processing error")]
    QuickXml(#[from] quick_xml::Error),

    /// An error from quick-xml attribute handling.
    #[error("XML attribute error")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// The document bytes are not valid UTF-8.
    #[error("invalid UTF-8 in XML document: {0}")]
    InvalidUtf8(String),

    /// A parameter name cannot be written as an XML element name.
    #[error("invalid XML element name: {0:?}")]
    InvalidElementName(String),

    /// A required XML element was missing.
    #[error("missing required XML element: {0}")]
    MissingElement(String),

    /// An unexpected XML element was encountered.
    #[error("unexpected XML element: {0}")]
    UnexpectedElement(String),

    /// An error parsing a value from XML text content.
    #[error("failed to parse value: {0}")]
    ParseError(String),
}

/// Format a Flickr SOAP fault envelope.
///
/// `code` is the bare Flickr error code; it is written to `faultcode` with the
/// `flickr.error.` prefix.
///
/// # Example output
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <soapenv:Envelope ...>
///   <soapenv:Body>
///     <soapenv:Fault>
///       <faultcode>flickr.error.98</faultcode>
///       <faultstring>Invalid auth token</faultstring>
///       <faultactor>http://www.flickr.com/services/soap/</faultactor>
///       <details>Please see http://www.flickr.com/services/docs/ for more details</details>
///     </soapenv:Fault>
///   </soapenv:Body>
/// </soapenv:Envelope>
/// ```
pub fn fault_to_xml(code: &str, message: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(512);
    // Writing to Vec<u8> is infallible; if this fails it means a logic error.
    if let Err(e) = write_fault_xml(&mut buf, code, message) {
        tracing::error!(error = %e, "failed to serialize SOAP fault XML");
        buf.clear();
    }
    buf
}

fn write_fault_xml(buf: &mut Vec<u8>, code: &str, message: &str) -> io::Result<()> {
    let mut writer = Writer::new(buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    write_envelope(&mut writer, |w| {
        w.create_element("soapenv:Fault").write_inner_content(|w| {
            write_text_element(w, "faultcode", &format!("{FAULT_CODE_PREFIX}{code}"))?;
            write_text_element(w, "faultstring", message)?;
            write_text_element(w, "faultactor", "http://www.flickr.com/services/soap/")?;
            write_text_element(
                w,
                "details",
                "Please see http://www.flickr.com/services/docs/ for more details",
            )?;
            Ok(())
        })?;
        Ok(())
    })
}
