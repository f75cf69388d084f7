//! # Schema introspection
//!
//! Browses the model registry of a host project: its applications, their
//! models, each model's fields and the relations other models declare
//! towards it.
//!
//! The registry is read once from a [`manifest`] at startup and indexed into
//! an immutable [`registry::Registry`]. [`SchemaBrowser`] answers every
//! browsing query from that index; descriptions are resolved per request
//! against the caller's translator ([`describe`]), and fields are split into
//! forward fields and reverse relations by [`extract`].
//!
//! With the `server` feature the slice also exposes the HTTP routes in
//! [`server`].

pub mod describe;
mod error;
pub mod extract;
pub mod manifest;
pub mod model;
pub mod registry;
#[cfg(feature = "server")]
pub mod server;
mod service;

pub use crate::error::{IntrospectionError, IntrospectionErrorExt};
pub use crate::service::SchemaBrowser;
use atlas_kernel::domain::config::ApiConfig;
use atlas_kernel::domain::registry::InitializedSlice;
use manifest::Manifest;
use registry::Registry;

/// Introspection feature state
#[atlas_derive::atlas_slice]
pub struct Introspection {
    pub browser: SchemaBrowser,
}

/// Loads the configured manifest and indexes it against the project root.
///
/// # Errors
/// Returns an error when the manifest cannot be read, parsed or indexed.
pub fn init(config: &ApiConfig) -> Result<InitializedSlice, IntrospectionError> {
    let manifest = Manifest::load(&config.schema.manifest)?;
    let registry = Registry::new(manifest, &config.schema.project_root)?;

    tracing::info!("Introspection slice initialized");

    Ok(InitializedSlice::new(Introspection::new(IntrospectionInner {
        browser: SchemaBrowser::new(registry),
    })))
}
