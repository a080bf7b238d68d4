//! Wire-level diagnostics.
//!
//! A transport reports every outbound envelope and every raw reply body to
//! its [`Diagnostics`]. Which implementation is installed is decided when the
//! transport is built (`FlickrConfig::debug_stream`).

use tracing::info;

/// Receives the raw documents exchanged by a transport.
pub trait Diagnostics: Send + Sync + std::fmt::Debug {
    /// Called with the serialized envelope before it is signed and sent.
    fn outbound_envelope(&self, url: &str, envelope: &str);

    /// Called with the raw reply body before it is parsed.
    fn inbound_body(&self, status: http::StatusCode, body: &[u8]);
}

/// Emits both documents as `tracing` events at info level.
///
/// Installed only when the debug stream is requested, so the documents show
/// up under the default `info` filter. Events use the
/// `flickrkit_transport::diagnostics` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn outbound_envelope(&self, url: &str, envelope: &str) {
        info!(url = %url, envelope = %envelope, "outbound SOAP envelope");
    }

    fn inbound_body(&self, status: http::StatusCode, body: &[u8]) {
        info!(
            status = %status,
            body = %String::from_utf8_lossy(body),
            "inbound SOAP body"
        );
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiagnostics;

impl Diagnostics for NoDiagnostics {
    fn outbound_envelope(&self, _url: &str, _envelope: &str) {}

    fn inbound_body(&self, _status: http::StatusCode, _body: &[u8]) {}
}
