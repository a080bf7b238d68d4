//! SOAP XML deserialization: reading Flickr envelopes and payload values.
//!
//! Elements are matched by local name, so any namespace prefix the peer
//! chooses for the envelope (`soapenv:`, `s:`, ...) is accepted.

use quick_xml::Reader;
use quick_xml::events::{BytesRef, BytesStart, Event};

use crate::error::{FAULT_CODE_PREFIX, XmlError};
use crate::serialize::RequestEnvelope;

/// The content of a reply envelope's body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyContent {
    /// A successful reply; the unescaped payload of `FlickrResponse`.
    Payload(String),
    /// A SOAP fault.
    Fault {
        /// The Flickr error code, with the `flickr.error.` prefix removed.
        code: String,
        /// The human-readable `faultstring`.
        message: String,
    },
}

/// A reply document that has been checked to be a well-formed envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    xml: String,
}

impl ResponseEnvelope {
    /// Wrap raw reply bytes, decoding them as UTF-8.
    ///
    /// The whole document is read once to make sure it is well-formed and its
    /// root element is an `Envelope`.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if the bytes are not UTF-8, the document is
    /// malformed, or the root is not an `Envelope`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, XmlError> {
        let xml = std::str::from_utf8(bytes).map_err(|e| XmlError::InvalidUtf8(e.to_string()))?;
        Self::from_xml(xml.to_owned())
    }

    /// Wrap an already-decoded reply document.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if the document is malformed or the root is not an
    /// `Envelope`.
    pub fn from_xml(xml: String) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(&xml);
        open_root(&mut reader, "Envelope")?;
        skip_to_end(&mut reader, 1)?;
        Ok(Self { xml })
    }

    /// The raw document text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.xml
    }

    /// Extract the first element of `Envelope/Body`.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if there is no `Body`, the body is empty, or a fault
    /// is missing its `faultcode`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flickrkit_soap_xml::{BodyContent, ResponseEnvelope};
    ///
    /// let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>
    ///     <x:FlickrResponse xmlns:x="urn:flickr">&lt;method&gt;flickr.test.echo&lt;/method&gt;</x:FlickrResponse>
    /// </s:Body></s:Envelope>"#;
    ///
    /// let envelope = ResponseEnvelope::from_xml(xml.to_owned()).unwrap();
    /// assert_eq!(
    ///     envelope.body().unwrap(),
    ///     BodyContent::Payload("<method>flickr.test.echo</method>".to_owned())
    /// );
    /// ```
    pub fn body(&self) -> Result<BodyContent, XmlError> {
        let mut reader = Reader::from_str(&self.xml);
        open_root(&mut reader, "Envelope")?;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    if local_name(&e)? == "Body" {
                        return read_body(&mut reader);
                    }
                    skip_element(&mut reader)?;
                }
                Event::Empty(e) if local_name(&e)? == "Body" => {
                    return Err(XmlError::MissingElement("Body content".to_owned()));
                }
                Event::End(_) | Event::Eof => {
                    return Err(XmlError::MissingElement("Body".to_owned()));
                }
                _ => {}
            }
        }
    }
}

impl RequestEnvelope {
    /// Read a `FlickrRequest` envelope back into its ordered fields.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if the document is malformed or is not a request
    /// envelope.
    pub fn from_xml(xml: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(xml);
        open_root(&mut reader, "Envelope")?;
        open_child(&mut reader, "Body")?;
        open_child(&mut reader, "FlickrRequest")?;

        let mut fields = Vec::new();
        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = local_name(&e)?;
                    fields.push((name, read_text_content(&mut reader)?));
                }
                Event::Empty(e) => fields.push((local_name(&e)?, String::new())),
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::UnexpectedElement(
                        "unexpected EOF in FlickrRequest".to_owned(),
                    ));
                }
                _ => {}
            }
        }

        Ok(Self::from_fields(fields))
    }
}

/// Find the text of the first element named `tag` (by local name) in a payload.
///
/// Returns `Ok(None)` if no such element exists.
///
/// # Examples
///
/// ```
/// use flickrkit_soap_xml::find_text;
///
/// let payload = "<method>flickr.test.echo</method><foo>a &amp; b</foo>";
/// assert_eq!(find_text(payload, "foo").unwrap().as_deref(), Some("a & b"));
/// assert_eq!(find_text(payload, "bar").unwrap(), None);
/// ```
pub fn find_text(payload: &str, tag: &str) -> Result<Option<String>, XmlError> {
    let mut reader = Reader::from_str(payload);

    loop {
        match reader.read_event()? {
            Event::Start(e) if local_name(&e)? == tag => {
                return read_text_content(&mut reader).map(Some);
            }
            Event::Empty(e) if local_name(&e)? == tag => return Ok(Some(String::new())),
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Find attribute `attr` on the first element named `tag` in a payload.
///
/// Returns `Ok(None)` if the element or the attribute is absent.
///
/// # Examples
///
/// ```
/// use flickrkit_soap_xml::find_attribute;
///
/// let payload = r#"<user id="12037949754@N01"><username>Bees</username></user>"#;
/// assert_eq!(
///     find_attribute(payload, "user", "id").unwrap().as_deref(),
///     Some("12037949754@N01")
/// );
/// ```
pub fn find_attribute(payload: &str, tag: &str, attr: &str) -> Result<Option<String>, XmlError> {
    let mut reader = Reader::from_str(payload);

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if local_name(&e)? == tag => {
                return attribute_value(&e, attr);
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Helper functions for reading common XML patterns
// ---------------------------------------------------------------------------

/// Read the first element of the body; the reader is just inside `Body`.
fn read_body(reader: &mut Reader<&[u8]>) -> Result<BodyContent, XmlError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                return if local_name(&e)? == "Fault" {
                    read_fault(reader)
                } else {
                    read_inner_content(reader).map(|p| BodyContent::Payload(p.trim().to_owned()))
                };
            }
            Event::Empty(e) => {
                return if local_name(&e)? == "Fault" {
                    Err(XmlError::MissingElement("faultcode".to_owned()))
                } else {
                    Ok(BodyContent::Payload(String::new()))
                };
            }
            Event::End(_) | Event::Eof => {
                return Err(XmlError::MissingElement("Body content".to_owned()));
            }
            _ => {}
        }
    }
}

/// Read `faultcode` and `faultstring`; the reader is just inside `Fault`.
fn read_fault(reader: &mut Reader<&[u8]>) -> Result<BodyContent, XmlError> {
    let mut code = None;
    let mut message = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match local_name(&e)?.as_str() {
                "faultcode" => code = Some(read_text_content(reader)?),
                "faultstring" => message = Some(read_text_content(reader)?),
                _ => skip_element(reader)?,
            },
            Event::Empty(e) => match local_name(&e)?.as_str() {
                "faultcode" => code = Some(String::new()),
                "faultstring" => message = Some(String::new()),
                _ => {}
            },
            Event::End(_) => break,
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF in Fault".to_owned(),
                ));
            }
            _ => {}
        }
    }

    let code = code.ok_or_else(|| XmlError::MissingElement("faultcode".to_owned()))?;
    let code = code.trim();
    let code = code.strip_prefix(FAULT_CODE_PREFIX).unwrap_or(code).to_owned();

    Ok(BodyContent::Fault {
        code,
        message: message.unwrap_or_default(),
    })
}

/// Advance to the root element and check its local name.
fn open_root(reader: &mut Reader<&[u8]>, expected: &str) -> Result<(), XmlError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = local_name(&e)?;
                if name == expected {
                    return Ok(());
                }
                return Err(XmlError::UnexpectedElement(format!(
                    "expected root {expected}, found {name}"
                )));
            }
            Event::Empty(e) => {
                return Err(XmlError::UnexpectedElement(format!(
                    "expected root {expected}, found empty {}",
                    local_name(&e)?
                )));
            }
            Event::Eof => {
                return Err(XmlError::MissingElement("root element".to_owned()));
            }
            // Skip declaration, comments, processing instructions, whitespace.
            _ => {}
        }
    }
}

/// Advance to the child element `expected`, skipping siblings before it.
fn open_child(reader: &mut Reader<&[u8]>, expected: &str) -> Result<(), XmlError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if local_name(&e)? == expected {
                    return Ok(());
                }
                skip_element(reader)?;
            }
            Event::End(_) | Event::Eof => {
                return Err(XmlError::MissingElement(expected.to_owned()));
            }
            _ => {}
        }
    }
}

/// Read the text content of the current element and consume its end tag.
///
/// Text of nested elements is concatenated; markup is dropped.
fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut text = String::new();
    let mut depth: u32 = 0;
    loop {
        match reader.read_event()? {
            Event::Text(e) => text.push_str(&unescape(utf8(&e)?)?),
            Event::CData(e) => text.push_str(utf8(&e)?),
            Event::GeneralRef(e) => text.push_str(&resolve_reference(&e)?),
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                if depth == 0 {
                    return Ok(text);
                }
                depth -= 1;
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while reading text content".to_owned(),
                ));
            }
            _ => {}
        }
    }
}

/// Read everything inside the current element as a string and consume its
/// end tag.
///
/// Top-level text is unescaped (Flickr's escaped payload becomes markup);
/// nested elements are reproduced verbatim.
fn read_inner_content(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut out = String::new();
    let mut depth: u32 = 0;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                out.push('<');
                out.push_str(utf8(&e)?);
                out.push('>');
            }
            Event::Empty(e) => {
                out.push('<');
                out.push_str(utf8(&e)?);
                out.push_str("/>");
            }
            Event::End(e) => {
                if depth == 0 {
                    return Ok(out);
                }
                depth -= 1;
                out.push_str("</");
                out.push_str(utf8(e.name().as_ref())?);
                out.push('>');
            }
            Event::Text(e) => {
                let raw = utf8(&e)?;
                if depth == 0 {
                    out.push_str(&unescape(raw)?);
                } else {
                    out.push_str(raw);
                }
            }
            Event::CData(e) => {
                let raw = utf8(&e)?;
                if depth == 0 {
                    out.push_str(raw);
                } else {
                    out.push_str("<![CDATA[");
                    out.push_str(raw);
                    out.push_str("]]>");
                }
            }
            Event::GeneralRef(e) => {
                if depth == 0 {
                    out.push_str(&resolve_reference(&e)?);
                } else {
                    out.push('&');
                    out.push_str(utf8(&e)?);
                    out.push(';');
                }
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while reading element content".to_owned(),
                ));
            }
            _ => {}
        }
    }
}

/// Skip over an element and all its children.
fn skip_element(reader: &mut Reader<&[u8]>) -> Result<(), XmlError> {
    skip_to_end(reader, 1)
}

/// Read until `depth` open elements have been closed.
fn skip_to_end(reader: &mut Reader<&[u8]>, mut depth: u32) -> Result<(), XmlError> {
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while skipping element".to_owned(),
                ));
            }
            _ => {}
        }
    }
}

/// The local (unprefixed) name of an element.
fn local_name(e: &BytesStart<'_>) -> Result<String, XmlError> {
    let name = e.local_name();
    utf8(name.as_ref()).map(ToOwned::to_owned)
}

/// The unescaped value of attribute `attr` (matched by local name).
fn attribute_value(e: &BytesStart<'_>, attr: &str) -> Result<Option<String>, XmlError> {
    for attribute in e.attributes() {
        let attribute = attribute?;
        if attribute.key.local_name().as_ref() == attr.as_bytes() {
            let raw = utf8(&attribute.value)?;
            return unescape(raw).map(Some);
        }
    }
    Ok(None)
}

/// Resolve a character or predefined entity reference (`&#60;`, `&lt;`).
fn resolve_reference(e: &BytesRef<'_>) -> Result<String, XmlError> {
    if let Some(ch) = e
        .resolve_char_ref()
        .map_err(|err| XmlError::ParseError(err.to_string()))?
    {
        return Ok(ch.to_string());
    }

    let name = e
        .decode()
        .map_err(|err| XmlError::ParseError(err.to_string()))?;
    quick_xml::escape::resolve_predefined_entity(&name)
        .map(ToOwned::to_owned)
        .ok_or_else(|| XmlError::ParseError(format!("unknown entity: &{name};")))
}

fn unescape(raw: &str) -> Result<String, XmlError> {
    quick_xml::escape::unescape(raw)
        .map(std::borrow::Cow::into_owned)
        .map_err(|err| XmlError::ParseError(err.to_string()))
}

fn utf8(bytes: &[u8]) -> Result<&str, XmlError> {
    std::str::from_utf8(bytes).map_err(|e| XmlError::InvalidUtf8(e.to_string()))
}
