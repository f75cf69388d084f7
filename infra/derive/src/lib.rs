#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Attribute macros that keep error enums, feature slices and API DTOs uniform
//! across the Atlas workspace.
//!
//! Examples below are `ignore`d because a proc-macro crate cannot use its own
//! macros in doctests; the crate's `tests/` directory exercises them.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Turns an enum into a workspace error type.
///
/// # Injected items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * A `<Name>Ext` trait adding `.context(..)` to `Result<T, Name>` and to
///   `Result<T, Source>` for every variant that wraps a `source`.
/// * `From<Source>` for every variant with a `source` field.
/// * `From<&'static str>` / `From<String>` when an `Internal` variant exists.
/// * A private `format_context` helper for `#[error(..)]` strings.
///
/// Every variant must use named fields. Variants with a `source` must also carry
/// `context: Option<Cow<'static, str>>`.
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[atlas_derive::atlas_error]
/// pub enum ManifestError {
///     #[error("Manifest I/O error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal manifest error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &std::path::Path) -> Result<String, ManifestError> {
///     std::fs::read_to_string(path).context("Reading schema manifest")
/// }
/// ```
#[proc_macro_attribute]
pub fn atlas_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}

/// Turns a struct into a shareable feature slice.
///
/// The annotated struct becomes `<Name>Inner`; `<Name>` is generated as an
/// `Arc` wrapper that derefs to the inner state and implements
/// `atlas_kernel::domain::registry::FeatureSlice`.
///
/// ```rust,ignore
/// #[atlas_derive::atlas_slice]
/// pub struct Introspection {
///     pub registry: Registry,
/// }
///
/// let slice = Introspection::new(IntrospectionInner { registry });
/// ```
#[proc_macro_attribute]
pub fn atlas_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand(input).into()
}

/// Declares a response DTO.
///
/// Adds `Debug`, `Clone` and `serde::Serialize` derives when missing, and
/// `utoipa::ToSchema` behind the consumer's `server` feature. Field names stay
/// `snake_case` unless `rename_all = "..."` is given.
///
/// ```rust,ignore
/// #[atlas_derive::api_model]
/// pub struct RelationTarget {
///     pub app_label: String,
///     pub model_name: String,
///     pub label: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_model(attr.into(), input).into()
}

/// Registers an axum handler with `utoipa::path` when the consumer's `server`
/// feature is enabled. Arguments are forwarded unchanged.
///
/// ```rust,ignore
/// #[atlas_derive::api_handler(
///     get,
///     path = "/health",
///     responses((status = OK, body = HealthResponse)),
///     tag = "System"
/// )]
/// pub async fn health_handler() -> impl IntoResponse { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_handler(args.into(), input).into()
}
