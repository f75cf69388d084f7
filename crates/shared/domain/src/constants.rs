//! Well-known names shared across crates.

/// `OpenAPI` tag for operational endpoints.
pub const SYSTEM_TAG: &str = "System";

/// `OpenAPI` tag for schema browsing endpoints.
pub const SCHEMA_TAG: &str = "Schema";

/// Permission every schema page requires unless configured otherwise.
pub const DEFAULT_PERMISSION: &str = "schema_browser.can_access_schema_browser";

/// Locale used when a request carries no locale prefix.
pub const DEFAULT_LOCALE: &str = "en";

/// Prefix for environment overrides (`ATLAS__SCHEMA__MANIFEST=...`).
pub const ENV_PREFIX: &str = "ATLAS";
