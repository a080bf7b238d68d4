//! End-to-end tests for the flickrkit SOAP transport.
//!
//! Each test starts an in-process [`StubServer`] on an ephemeral localhost
//! port. The stub verifies the OAuth signature of every request, reads the
//! `FlickrRequest` envelope, and answers like the Flickr SOAP endpoint would.
//! No external network is used.
//!
//! Run them with:
//! ```text
//! cargo test -p flickrkit-integration
//! ```
//!
//! Stub methods:
//!
//! | Method | Reply |
//! |--------|-------|
//! | `flickr.test.echo` | every request field echoed back as an element |
//! | `flickr.test.login` | `<user id="{token}"><username>stub-user</username></user>` |
//! | anything else | fault `112` (method not found) |
//!
//! Requests to `/broken/` get a `502` HTML page instead of an envelope.

mod test_soap;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Once};

use bytes::Bytes;
use flickrkit_auth::{
    AccessToken, AuthError, ConsumerCredentials, StaticCredentialProvider, verify_oauth1,
};
use flickrkit_core::{FlickrConfig, Scheme};
use flickrkit_soap_xml::{FORMAT_VERSION, RequestEnvelope, fault_to_xml, response_to_xml};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// API key the stub accepts.
pub const API_KEY: &str = "stub-api-key";
/// Shared secret the stub accepts.
pub const SHARED_SECRET: &str = "stub-shared-secret";
/// Access token the stub knows.
pub const TOKEN: &str = "72157000000000001-stub";
/// Secret of [`TOKEN`].
pub const TOKEN_SECRET: &str = "stub-token-secret";

static INIT: Once = Once::new();

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// The access token the stub knows.
#[must_use]
pub fn valid_token() -> AccessToken {
    AccessToken::new(TOKEN, TOKEN_SECRET)
}

/// A request as received by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: http::Method,
    /// Request path.
    pub path: String,
    /// `Content-Type` header value.
    pub content_type: Option<String>,
    /// `Authorization` header value.
    pub authorization: Option<String>,
    /// Raw request body.
    pub body: String,
}

#[derive(Debug)]
struct StubState {
    consumer: ConsumerCredentials,
    credentials: StaticCredentialProvider,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// An in-process Flickr SOAP endpoint.
///
/// The accept loop is aborted when the server is dropped.
#[derive(Debug)]
pub struct StubServer {
    addr: SocketAddr,
    state: Arc<StubState>,
    handle: JoinHandle<()>,
}

impl StubServer {
    /// Bind to an ephemeral localhost port and start serving.
    pub async fn start() -> Self {
        init_tracing();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("failed to bind stub server: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("stub server has no local address: {e}"));

        let state = Arc::new(StubState {
            consumer: ConsumerCredentials::new(API_KEY, SHARED_SECRET),
            credentials: StaticCredentialProvider::new(vec![(
                TOKEN.to_owned(),
                TOKEN_SECRET.to_owned(),
            )]),
            requests: Mutex::new(Vec::new()),
        });

        let handle = tokio::spawn(serve(listener, Arc::clone(&state)));
        debug!(%addr, "stub server listening");

        Self {
            addr,
            state,
            handle,
        }
    }

    /// The bound address.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Client configuration pointing at this server.
    #[must_use]
    pub fn config(&self) -> FlickrConfig {
        FlickrConfig::builder()
            .api_key(API_KEY.to_owned())
            .shared_secret(SHARED_SECRET.to_owned())
            .scheme(Scheme::Http)
            .host(self.addr.ip().to_string())
            .port(Some(self.addr.port()))
            .build()
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(listener: TcpListener, state: Arc<StubState>) {
    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "failed to accept connection");
                continue;
            }
        };

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let service = service_fn(move |req| handle(Arc::clone(&state), req));
            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                warn!(peer_addr = %peer_addr, error = %e, "connection error");
            }
        });
    }
}

async fn handle(
    state: Arc<StubState>,
    req: http::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => return Ok(fault_reply("0", &format!("failed to read body: {e}"))),
    };
    let body = String::from_utf8_lossy(&body).into_owned();

    let header = |name: http::header::HeaderName| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned)
    };
    state.requests.lock().push(RecordedRequest {
        method: parts.method.clone(),
        path: parts.uri.path().to_owned(),
        content_type: header(http::header::CONTENT_TYPE),
        authorization: header(http::header::AUTHORIZATION),
        body: body.clone(),
    });

    if parts.uri.path() == "/broken/" {
        return Ok(reply(
            http::StatusCode::BAD_GATEWAY,
            "text/html",
            "<html><body>Bad Gateway</body></html>",
        ));
    }

    let verified = match verify_oauth1(&parts, &state.consumer, &state.credentials) {
        Ok(verified) => verified,
        Err(AuthError::TokenNotFound(_)) => return Ok(fault_reply("98", "Invalid auth token")),
        Err(AuthError::ConsumerKeyMismatch(_)) => {
            return Ok(fault_reply("100", "Invalid API Key (Key not found)"));
        }
        Err(e) => {
            debug!(error = %e, "rejecting request");
            return Ok(fault_reply("96", "Invalid signature"));
        }
    };

    let envelope = match RequestEnvelope::from_xml(&body) {
        Ok(envelope) => envelope,
        Err(e) => return Ok(fault_reply("0", &format!("malformed request: {e}"))),
    };

    if envelope.field("format") != Some(FORMAT_VERSION) {
        return Ok(fault_reply("111", "Format not found"));
    }

    let payload = match envelope.field("method") {
        Some("flickr.test.echo") => echo_payload(&envelope),
        Some("flickr.test.login") => format!(
            "<user id=\"{}\"><username>stub-user</username></user>",
            quick_xml::escape::escape(verified.token.as_str())
        ),
        other => {
            let method = other.unwrap_or_default();
            return Ok(fault_reply("112", &format!("Method \"{method}\" not found")));
        }
    };

    match response_to_xml(&payload) {
        Ok(xml) => Ok(reply(http::StatusCode::OK, "text/xml; charset=utf-8", xml)),
        Err(e) => Ok(fault_reply("0", &e.to_string())),
    }
}

fn echo_payload(envelope: &RequestEnvelope) -> String {
    envelope
        .fields()
        .iter()
        .filter(|(name, _)| name != "format")
        .map(|(name, value)| format!("<{name}>{}</{name}>", quick_xml::escape::escape(value.as_str())))
        .collect()
}

fn fault_reply(code: &str, message: &str) -> http::Response<Full<Bytes>> {
    reply(
        http::StatusCode::INTERNAL_SERVER_ERROR,
        "text/xml; charset=utf-8",
        fault_to_xml(code, message),
    )
}

fn reply(
    status: http::StatusCode,
    content_type: &'static str,
    body: impl Into<Bytes>,
) -> http::Response<Full<Bytes>> {
    let mut response = http::Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static(content_type),
    );
    response
}
