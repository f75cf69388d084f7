//! Facade crate for Atlas features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `atlas` with the `server` feature to get the HTTP routers.
//! - Call [`init`] to build every feature slice from the loaded configuration.

pub use atlas_domain as domain;
use atlas_domain::config::ApiConfig;
pub use atlas_kernel as kernel;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use atlas_introspection::server::router as schema_router;
        pub use atlas_kernel::server::router::system_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use atlas_introspection as introspection;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        "introspection",
        #[cfg(feature = "server")]
        "server",
    ];
}

/// Initialize all enabled features.
///
/// # Errors
/// Returns an error if any feature initialization fails.
pub fn init(
    config: &ApiConfig,
) -> Result<Vec<domain::registry::InitializedSlice>, Box<dyn std::error::Error + Send + Sync>> {
    let mut slices = Vec::new();

    // Schema introspection
    slices.push(features::introspection::init(config)?);

    Ok(slices)
}
