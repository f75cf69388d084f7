use crate::constants::{DEFAULT_LOCALE, DEFAULT_PERMISSION};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level API configuration shared across services.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub schema: SchemaConfig,
    pub i18n: I18nConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Log output. `level` is a `tracing` level name; `filter` adds
/// `target=level` directives on top of it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub filter: Option<String>,
    pub console: bool,
    /// Directory for daily-rotated log files; console only when absent.
    pub dir: Option<PathBuf>,
    pub max_files: usize,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            filter: None,
            console: true,
            dir: None,
            max_files: 10,
            json: false,
        }
    }
}

/// Where the schema manifest lives and which directory counts as "the project".
///
/// Only applications whose path is inside `project_root` are browsable;
/// everything else in the manifest is still used to resolve relation targets.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub manifest: PathBuf,
    pub project_root: PathBuf,
}

/// Access control for the schema pages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// The single permission every schema page requires.
    pub permission: String,
    pub jwt: JwtConfig,
}

/// Bearer token validation (HS256).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: Option<String>,
    pub clock_skew_seconds: u64,
}

/// Translation catalogs and the locales accepted as URL prefixes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    pub default_locale: String,
    pub languages: Vec<String>,
    /// Directory holding `<code>.json` msgid → translation maps.
    pub catalog_dir: Option<PathBuf>,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 4583, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self { manifest: PathBuf::from("schema.json"), project_root: PathBuf::from(".") }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self { permission: DEFAULT_PERMISSION.to_owned(), jwt: JwtConfig::default() }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "dev-only-change-me".to_owned(),
            issuer: "atlas".to_owned(),
            audience: None,
            clock_skew_seconds: 60,
        }
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_owned(),
            languages: vec![DEFAULT_LOCALE.to_owned()],
            catalog_dir: None,
        }
    }
}
