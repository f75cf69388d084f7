//! Translation catalogs keyed by English msgids.
//!
//! Msgids are written in brackets (`"[No description.]"`). A lookup returns the
//! catalog entry for the active locale, or the msgid itself when there is none;
//! `%(name)s` placeholders are then substituted and the outer brackets stripped.
//! An untranslated msgid therefore renders as plain English.

use crate::domain::config::I18nConfig;
use fxhash::FxHashMap;
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use walkdir::WalkDir;

const CATALOG_EXTENSION: &str = "json";

type Messages = FxHashMap<String, String>;

#[atlas_derive::atlas_error]
pub enum I18nError {
    #[error("Catalog I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Catalog parse error{}: {source}", format_context(.context))]
    Parse { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Catalog directory error{}: {source}", format_context(.context))]
    Walk { source: walkdir::Error, context: Option<Cow<'static, str>> },

    #[error("Invalid i18n configuration{}: {message}", format_context(.context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// All loaded translation tables plus the set of accepted locale codes.
#[derive(Debug, Clone)]
pub struct Catalog {
    default_locale: Arc<str>,
    languages: Arc<[String]>,
    tables: Arc<FxHashMap<String, Arc<Messages>>>,
}

impl Catalog {
    /// A catalog with no translations that only accepts `default_locale`.
    #[must_use]
    pub fn empty(default_locale: &str) -> Self {
        Self {
            default_locale: default_locale.into(),
            languages: vec![default_locale.to_owned()].into(),
            tables: Arc::default(),
        }
    }

    /// Builds a catalog from configuration, reading `<code>.json` files from
    /// `catalog_dir` when one is configured. Files for codes outside
    /// `languages` are ignored.
    ///
    /// # Errors
    /// Fails when the default locale is not among `languages`, or when a
    /// catalog file cannot be read or is not a flat JSON object of strings.
    pub fn from_config(config: &I18nConfig) -> Result<Self, I18nError> {
        let mut languages = config.languages.clone();
        if languages.is_empty() {
            languages.push(config.default_locale.clone());
        }
        if !languages.contains(&config.default_locale) {
            return Err(I18nError::InvalidConfiguration {
                message: format!(
                    "default locale '{}' is not listed in languages {languages:?}",
                    config.default_locale
                )
                .into(),
                context: None,
            });
        }

        let tables = match &config.catalog_dir {
            Some(dir) => load_tables(dir, &languages)?,
            None => FxHashMap::default(),
        };

        info!(
            default_locale = %config.default_locale,
            languages = ?languages,
            catalogs = tables.len(),
            "Translation catalogs ready"
        );

        Ok(Self {
            default_locale: config.default_locale.as_str().into(),
            languages: languages.into(),
            tables: Arc::new(tables),
        })
    }

    /// Adds (or replaces) the table for `locale`, accepting it as a URL prefix.
    #[must_use]
    pub fn with_messages<I, K, V>(mut self, locale: &str, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table: Messages = messages.into_iter().map(|(k, v)| (k.into(), v.into())).collect();

        let mut tables = (*self.tables).clone();
        tables.insert(locale.to_owned(), Arc::new(table));
        self.tables = Arc::new(tables);

        if !self.languages.iter().any(|code| code == locale) {
            let mut languages = self.languages.to_vec();
            languages.push(locale.to_owned());
            self.languages = languages.into();
        }
        self
    }

    #[must_use]
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    #[must_use]
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    #[must_use]
    pub fn supports(&self, locale: &str) -> bool {
        self.languages.iter().any(|code| code == locale)
    }

    /// Returns a translator for `locale`, falling back to the default locale
    /// when the code is not supported.
    #[must_use]
    pub fn translator(&self, locale: &str) -> Translator {
        let code = if self.supports(locale) { locale } else { self.default_locale() };
        Translator { locale: code.into(), messages: self.tables.get(code).cloned() }
    }

    #[must_use]
    pub fn default_translator(&self) -> Translator {
        self.translator(&self.default_locale)
    }
}

/// A locale-bound view of the catalog, cheap to clone and pass around.
#[derive(Debug, Clone)]
pub struct Translator {
    locale: Arc<str>,
    messages: Option<Arc<Messages>>,
}

impl Translator {
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Translates a bracketed msgid.
    #[must_use]
    pub fn tr(&self, msgid: &str) -> String {
        self.tr_with(msgid, &[])
    }

    /// Translates a bracketed msgid and substitutes `%(name)s` placeholders.
    #[must_use]
    pub fn tr_with(&self, msgid: &str, args: &[(&str, &str)]) -> String {
        let template = self
            .messages
            .as_ref()
            .and_then(|table| table.get(msgid))
            .map_or(msgid, String::as_str);

        interpolate(strip_brackets(template), args)
    }
}

/// Substitutes `%(name)s` placeholders in one pass; substituted values are not
/// scanned again and unknown placeholders are kept verbatim.
fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("%(") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find(")s") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after[..end];
        match args.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Removes one pair of enclosing square brackets, if present.
#[must_use]
pub fn strip_brackets(text: &str) -> &str {
    text.strip_prefix('[').and_then(|t| t.strip_suffix(']')).unwrap_or(text)
}

fn load_tables(dir: &Path, languages: &[String]) -> Result<FxHashMap<String, Arc<Messages>>, I18nError> {
    let mut tables = FxHashMap::default();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.context(format!("Scanning {}", dir.display()))?;
        let path = entry.path();

        if !entry.file_type().is_file()
            || path.extension().and_then(|ext| ext.to_str()) != Some(CATALOG_EXTENSION)
        {
            continue;
        }
        let Some(code) = path.file_stem().and_then(|stem| stem.to_str()) else { continue };
        if !languages.iter().any(|lang| lang == code) {
            debug!(path = %path.display(), "Skipping catalog for unlisted locale");
            continue;
        }

        let raw = fs::read_to_string(path).context(format!("Reading {}", path.display()))?;
        let messages: Messages =
            serde_json::from_str(&raw).context(format!("Parsing {}", path.display()))?;

        debug!(locale = code, entries = messages.len(), "Loaded translation catalog");
        tables.insert(code.to_owned(), Arc::new(messages));
    }

    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn french() -> Catalog {
        Catalog::empty("en").with_messages(
            "fr",
            [
                ("[No description.]", "[Aucune description.]"),
                ("[App not found: %(app_label)s]", "[Application introuvable : %(app_label)s]"),
            ],
        )
    }

    #[test]
    fn untranslated_msgid_renders_as_english() {
        let t = Catalog::empty("en").translator("en");
        assert_eq!(t.tr("[No description.]"), "No description.");
        assert_eq!(t.tr("plain text"), "plain text");
    }

    #[test]
    fn translation_and_interpolation() {
        let t = french().translator("fr");
        assert_eq!(t.locale(), "fr");
        assert_eq!(t.tr("[No description.]"), "Aucune description.");
        assert_eq!(
            t.tr_with("[App not found: %(app_label)s]", &[("app_label", "ghost")]),
            "Application introuvable : ghost"
        );
    }

    #[test]
    fn substituted_values_are_not_expanded_again() {
        let t = Catalog::empty("en").default_translator();
        let text = t.tr_with(
            "[Field %(field)s of model %(model)s]",
            &[("field", "odd_%(model)s"), ("model", "catalog.Product")],
        );
        assert_eq!(text, "Field odd_%(model)s of model catalog.Product");

        assert_eq!(t.tr_with("[Keep %(missing)s and %(open]", &[]), "Keep %(missing)s and %(open");
    }

    #[test]
    fn unsupported_locale_falls_back_to_default() {
        let t = french().translator("de");
        assert_eq!(t.locale(), "en");
        assert_eq!(t.tr("[No description.]"), "No description.");
    }

    #[test]
    fn strip_brackets_only_strips_enclosing_pair() {
        assert_eq!(strip_brackets("[x]"), "x");
        assert_eq!(strip_brackets("[x"), "[x");
        assert_eq!(strip_brackets("a [b]"), "a [b]");
    }

    #[test]
    fn loads_catalog_files_for_listed_languages() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("fr.json"), r#"{"[No description.]": "[Aucune description.]"}"#)?;
        fs::write(dir.path().join("de.json"), r#"{"[No description.]": "[Keine Beschreibung.]"}"#)?;
        fs::write(dir.path().join("notes.txt"), "ignored")?;

        let config = I18nConfig {
            default_locale: "en".to_owned(),
            languages: vec!["en".to_owned(), "fr".to_owned()],
            catalog_dir: Some(dir.path().to_path_buf()),
        };
        let catalog = Catalog::from_config(&config)?;

        assert!(catalog.supports("fr"));
        assert!(!catalog.supports("de"));
        assert_eq!(catalog.translator("fr").tr("[No description.]"), "Aucune description.");
        Ok(())
    }

    #[test]
    fn default_locale_must_be_listed() {
        let config = I18nConfig {
            default_locale: "en".to_owned(),
            languages: vec!["fr".to_owned()],
            catalog_dir: None,
        };
        assert!(matches!(
            Catalog::from_config(&config),
            Err(I18nError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn malformed_catalog_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("en.json"), "[1, 2, 3]")?;

        let config = I18nConfig {
            catalog_dir: Some(PathBuf::from(dir.path())),
            ..I18nConfig::default()
        };
        assert!(matches!(Catalog::from_config(&config), Err(I18nError::Parse { .. })));
        Ok(())
    }
}
