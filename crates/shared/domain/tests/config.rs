use atlas_domain::config::{ApiConfig, I18nConfig, SchemaConfig, SecurityConfig, ServerConfig};
use atlas_domain::constants::DEFAULT_PERMISSION;
use serde_json::json;
use std::path::PathBuf;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 4583);
    assert!(server.ssl.is_none());

    let schema = SchemaConfig::default();
    assert_eq!(schema.manifest, PathBuf::from("schema.json"));
    assert_eq!(schema.project_root, PathBuf::from("."));

    let security = SecurityConfig::default();
    assert_eq!(security.permission, DEFAULT_PERMISSION);
    assert_eq!(security.jwt.issuer, "atlas");

    let i18n = I18nConfig::default();
    assert_eq!(i18n.default_locale, "en");
    assert_eq!(i18n.languages, vec!["en".to_owned()]);
}

#[test]
fn api_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 8080 },
        "schema": { "manifest": "/srv/app/schema.toml", "project_root": "/srv/app" },
        "security": { "permission": "docs.view", "jwt": { "secret": "s3cret" } },
        "i18n": { "languages": ["en", "fr"], "catalog_dir": "/srv/app/locale" }
    });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.schema.project_root, PathBuf::from("/srv/app"));
    assert_eq!(cfg.security.permission, "docs.view");
    assert_eq!(cfg.security.jwt.secret, "s3cret");
    assert_eq!(cfg.security.jwt.clock_skew_seconds, 60);
    assert_eq!(cfg.i18n.languages.len(), 2);
    assert_eq!(cfg.i18n.default_locale, "en");
}

#[test]
fn api_config_clones_share_until_mutated() {
    let original = ApiConfig::default();
    let mut changed = original.clone();
    changed.server.port = 9000;

    assert_eq!(original.server.port, 4583);
    assert_eq!(changed.server.port, 9000);
}

#[test]
fn logging_section_is_optional() {
    let cfg: ApiConfig =
        serde_json::from_value(json!({ "logging": { "level": "debug", "dir": "logs" } })).unwrap();
    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.logging.dir, Some(PathBuf::from("logs")));
    assert!(cfg.logging.console);
    assert_eq!(cfg.logging.max_files, 10);

    let cfg = ApiConfig::default();
    assert!(cfg.logging.dir.is_none());
}
