//! Core types, configuration, and endpoint handling for flickrkit.
//!
//! This crate provides the building blocks shared by the signing, XML, and
//! transport crates: the API parameter set, the service [`Endpoint`], and the
//! environment-driven [`FlickrConfig`].

mod config;
mod error;
mod types;

pub use config::FlickrConfig;
pub use error::FlickrError;
pub use types::{Endpoint, Parameters, Scheme};
