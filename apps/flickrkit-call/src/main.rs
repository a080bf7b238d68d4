//! flickrkit-call - call one Flickr API method from the command line.
//!
//! The method is sent as a signed SOAP envelope and the reply payload is
//! printed to stdout. A service error is printed to stderr and the process
//! exits with status 1.
//!
//! # Usage
//!
//! ```text
//! flickrkit-call flickr.test.echo foo=bar
//! flickrkit-call flickr.photos.search text=sunset per_page=5
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FLICKR_API_KEY` | *(empty)* | Application API key |
//! | `FLICKR_SHARED_SECRET` | *(empty)* | Application shared secret |
//! | `FLICKR_AUTH_TOKEN` | *(required)* | OAuth access token |
//! | `FLICKR_AUTH_TOKEN_SECRET` | *(required)* | OAuth access token secret |
//! | `FLICKR_SCHEME` | `https` | URL scheme |
//! | `FLICKR_HOST` | `api.flickr.com` | API host |
//! | `FLICKR_PORT` | *(unset)* | API port |
//! | `FLICKR_SOAP_PATH` | `/services/soap/` | SOAP service path |
//! | `FLICKR_DEBUG_STREAM` | `false` | Log envelopes and raw replies |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use anyhow::{Context, Result};
use flickrkit_auth::AccessToken;
use flickrkit_core::{FlickrConfig, Parameters};
use flickrkit_transport::{Response, SoapTransport, Transport};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

const USAGE: &str = "usage: flickrkit-call <method> [name=value ...]";

/// Tracing target of the envelope and reply diagnostics.
const DIAGNOSTICS_TARGET: &str = "flickrkit_transport::diagnostics";

/// Build the log filter.
///
/// Uses `rust_log` (`RUST_LOG`) if set, otherwise the `LOG_LEVEL` config value.
/// With `debug_stream` the diagnostics target is enabled at info level
/// whatever the base filter says.
fn build_filter(log_level: &str, debug_stream: bool, rust_log: Option<&str>) -> Result<EnvFilter> {
    let filter = match rust_log {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid RUST_LOG filter: {directives}"))?,
        None => EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?,
    };

    if debug_stream {
        let directive: Directive = format!("{DIAGNOSTICS_TARGET}=info")
            .parse()
            .context("invalid diagnostics directive")?;
        Ok(filter.add_directive(directive))
    } else {
        Ok(filter)
    }
}

/// Initialize the tracing subscriber.
///
/// Logs go to stderr so stdout carries only the payload.
fn init_tracing(config: &FlickrConfig) -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = build_filter(&config.log_level, config.debug_stream, rust_log.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Build the API parameters from `<method> [name=value ...]`.
fn parse_args<I>(args: I) -> Result<Parameters>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let method = args.next().context(USAGE)?;

    let mut params = Parameters::new();
    params.insert("method".to_owned(), method);

    for arg in args {
        let (name, value) = arg
            .split_once('=')
            .with_context(|| format!("expected name=value, got {arg:?}\n{USAGE}"))?;
        anyhow::ensure!(!name.is_empty(), "empty parameter name in {arg:?}");
        params.insert(name.to_owned(), value.to_owned());
    }

    Ok(params)
}

/// Read the caller's access token from the environment.
fn token_from_env() -> Result<AccessToken> {
    let token = std::env::var("FLICKR_AUTH_TOKEN").context("FLICKR_AUTH_TOKEN is not set")?;
    let secret =
        std::env::var("FLICKR_AUTH_TOKEN_SECRET").context("FLICKR_AUTH_TOKEN_SECRET is not set")?;
    Ok(AccessToken::new(token, secret))
}

#[tokio::main]
async fn main() -> Result<()> {
    let params = parse_args(std::env::args().skip(1))?;
    let config = FlickrConfig::from_env().context("invalid configuration")?;

    init_tracing(&config)?;

    let token = token_from_env()?;
    let transport = SoapTransport::from_config(&config).context("invalid endpoint")?;

    info!(
        endpoint = %transport.endpoint(),
        method = %params["method"],
        "calling Flickr API"
    );

    let response = transport
        .post("", &params, &token)
        .await
        .context("SOAP call failed")?;

    if response.is_error() {
        eprintln!(
            "error {}: {}",
            response.error_code().unwrap_or_default(),
            response.error_message().unwrap_or_default()
        );
        std::process::exit(1);
    }

    println!("{}", response.payload().unwrap_or_default());
    Ok(())
}
