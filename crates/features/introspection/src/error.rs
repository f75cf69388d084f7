use std::borrow::Cow;

/// A specialized [`IntrospectionError`] enum of this crate.
///
/// Requests only ever see [`IntrospectionError::NotFound`]; the remaining
/// variants are raised while loading the manifest at startup.
#[atlas_derive::atlas_error]
pub enum IntrospectionError {
    /// The requested application or model is not in the project registry.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Manifest I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Manifest JSON error{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Manifest TOML error{}: {source}", format_context(.context))]
    Toml { source: toml::de::Error, context: Option<Cow<'static, str>> },

    /// Structurally valid manifest with inconsistent content (duplicate labels, ...).
    #[error("Invalid manifest{}: {message}", format_context(.context))]
    InvalidManifest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
