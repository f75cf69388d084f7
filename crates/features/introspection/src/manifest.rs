//! On-disk schema manifest.
//!
//! A host project exports its model registry once (JSON or TOML); the shapes
//! below mirror what a runtime registry reports for each application, model
//! and field, including the auto-created reverse entries.

use crate::error::{IntrospectionError, IntrospectionErrorExt};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub apps: Vec<AppEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppEntry {
    pub label: String,
    /// Dotted module path of the application package.
    pub name: String,
    #[serde(default)]
    pub verbose_name: Option<String>,
    /// Source directory; relative paths resolve against the manifest's directory.
    pub path: PathBuf,
    #[serde(default)]
    pub docs: AppDocs,
    /// Package initializer file, relative to `path`.
    #[serde(default)]
    pub init_file: Option<PathBuf>,
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

/// Documentation attached to an application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppDocs {
    /// Declared directly on the application's config class (never inherited).
    #[serde(default)]
    pub config_class: Option<String>,
    /// Module that declares the config class.
    #[serde(default)]
    pub config_module: Option<String>,
    /// The package itself.
    #[serde(default)]
    pub package: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelEntry {
    /// Class name, e.g. `Product`.
    pub name: String,
    /// Normalized name; defaults to the lowercased class name.
    #[serde(default)]
    pub model_name: Option<String>,
    /// Storage table; defaults to `{app_label}_{model_name}`.
    #[serde(default)]
    pub db_table: Option<String>,
    #[serde(default)]
    pub verbose_name: Option<String>,
    /// Documentation declared on the class itself.
    #[serde(default)]
    pub doc: Option<String>,
    /// Documentation inherited from a base class.
    #[serde(default)]
    pub inherited_doc: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldEntry {
    pub name: String,
    /// Field category (class) name, e.g. `CharField` or `ManyToOneRel`.
    pub kind: String,
    #[serde(default)]
    pub internal_type: Option<String>,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub verbose_name: Option<String>,
    #[serde(default)]
    pub auto_created: bool,
    #[serde(default = "default_true")]
    pub concrete: bool,
    #[serde(default)]
    pub is_relation: bool,
    /// `app_label.ClassName` of the related model.
    #[serde(default)]
    pub related_model: Option<String>,
    /// For reverse entries: the originating field on `related_model`.
    #[serde(default)]
    pub remote_field: Option<String>,
    /// For reverse entries: how the relation is addressed from this model.
    #[serde(default)]
    pub accessor_name: Option<String>,
}

const fn default_true() -> bool {
    true
}

impl Manifest {
    /// Reads a manifest, choosing the format from the file extension
    /// (`.toml`, anything else is JSON). Relative application paths are
    /// resolved against the manifest's directory.
    ///
    /// # Errors
    /// Fails when the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IntrospectionError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).context(format!("Reading {}", path.display()))?;

        let mut manifest: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&raw).context(format!("Parsing {}", path.display()))?,
            _ => serde_json::from_str(&raw).context(format!("Parsing {}", path.display()))?,
        };

        if let Some(base) = path.parent() {
            manifest.rebase(base);
        }

        info!(
            path = %path.display(),
            apps = manifest.apps.len(),
            models = manifest.apps.iter().map(|app| app.models.len()).sum::<usize>(),
            "Loaded schema manifest"
        );
        Ok(manifest)
    }

    /// Makes relative application paths relative to `base`.
    pub fn rebase(&mut self, base: &Path) {
        for app in &mut self.apps {
            if app.path.is_relative() {
                app.path = base.join(&app.path);
            }
        }
    }
}
