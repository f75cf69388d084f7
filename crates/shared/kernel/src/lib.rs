//! Kernel utilities shared across slices.
//! Keep this crate lightweight: configuration loading, translation catalogs,
//! bearer-token access checks and (behind `server`) the Axum state and system routes.
//!
//! ## Translations
//! ```rust
//! use atlas_kernel::i18n::Catalog;
//!
//! let catalog = Catalog::empty("en");
//! let t = catalog.translator("en");
//! assert_eq!(t.tr("[No description.]"), "No description.");
//! ```
//!
//! ## Config loading
//! ```rust,no_run
//! use atlas_kernel::config::load_config;
//! use atlas_kernel::domain::config::ApiConfig;
//!
//! let cfg: ApiConfig = load_config(Some("server.toml")).unwrap();
//! ```
pub mod config;
pub mod i18n;
pub mod prelude;
pub mod security;
#[cfg(feature = "server")]
pub mod server;

pub use atlas_domain as domain;
