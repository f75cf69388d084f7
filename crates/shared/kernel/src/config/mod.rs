use crate::domain::constants::ENV_PREFIX;
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default base name of the configuration file (`server.toml`, `server.json`, ...).
const DEFAULT_CONFIG_FILE: &str = "server";

/// Custom error type for config loading.
#[atlas_derive::atlas_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads layered configuration: a base file overlaid with environment variables.
///
/// 1. **Base file**: `path` if given (must exist), otherwise `server.*` in the
///    working directory (optional, so a pure-environment setup works).
/// 2. **Environment**: variables prefixed with `ATLAS__`, nested with `__`
///    (e.g. `ATLAS__SCHEMA__MANIFEST` maps to `schema.manifest`).
///
/// # Errors
/// Returns an error if an explicit file is missing, a source is malformed, or
/// the merged values do not deserialize into `T`.
///
/// # Example
/// ```rust,no_run
/// use atlas_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local.toml")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (effective_path, required) = path.map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        |p| (p.as_ref().to_path_buf(), true),
    );

    info!(path = %effective_path.display(), required, "Loading configuration");

    Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("i18n.languages")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::ApiConfig;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn explicit_file_is_required() {
        let result = load_config::<ApiConfig>(Some("/definitely/not/here.toml"));
        assert!(matches!(result, Err(ConfigError::Config { .. })));
    }

    #[test]
    fn reads_toml_sections() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("server.toml");
        fs::write(
            &path,
            r#"
            [server]
            port = 9100

            [schema]
            manifest = "demo/schema.json"
            project_root = "demo"

            [i18n]
            languages = ["en", "fr"]
            "#,
        )?;

        let cfg: ApiConfig = load_config(Some(&path))?;
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.schema.project_root, PathBuf::from("demo"));
        assert_eq!(cfg.i18n.languages, vec!["en".to_owned(), "fr".to_owned()]);
        assert_eq!(cfg.security.jwt.issuer, "atlas");
        Ok(())
    }
}
