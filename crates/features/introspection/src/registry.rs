//! Immutable registry index built from a [`Manifest`].
//!
//! Every application of the manifest is kept so relation targets can point
//! at framework or third-party models, but only applications installed under
//! the project root are browsable.

use crate::error::IntrospectionError;
use crate::manifest::{AppDocs, AppEntry, FieldEntry, Manifest, ModelEntry};
use fxhash::{FxHashMap, FxHashSet};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// An installed application.
#[derive(Debug, Clone)]
pub struct AppRecord {
    pub label: String,
    pub name: String,
    pub verbose_name: Option<String>,
    pub path: PathBuf,
    pub docs: AppDocs,
    pub init_file: Option<PathBuf>,
    pub models: Vec<ModelRecord>,
    in_project: bool,
}

impl AppRecord {
    /// Whether the application lives under the project root.
    #[must_use]
    pub const fn in_project(&self) -> bool {
        self.in_project
    }

    /// Case-insensitive lookup by normalized model name or class name.
    #[must_use]
    pub fn model(&self, model_name: &str) -> Option<&ModelRecord> {
        let needle = model_name.to_lowercase();
        self.models
            .iter()
            .find(|model| model.model_name == needle || model.name.to_lowercase() == needle)
    }
}

/// A model with its defaults filled in.
#[derive(Debug, Clone)]
pub struct ModelRecord {
    pub app_label: String,
    pub name: String,
    pub model_name: String,
    pub db_table: String,
    pub verbose_name: Option<String>,
    pub doc: Option<String>,
    pub inherited_doc: Option<String>,
    pub fields: Vec<FieldEntry>,
}

impl ModelRecord {
    fn from_entry(app_label: &str, entry: ModelEntry) -> Self {
        let model_name = entry.model_name.as_deref().unwrap_or(&entry.name).to_lowercase();
        let db_table = entry.db_table.unwrap_or_else(|| format!("{app_label}_{model_name}"));

        Self {
            app_label: app_label.to_owned(),
            name: entry.name,
            model_name,
            db_table,
            verbose_name: entry.verbose_name,
            doc: entry.doc,
            inherited_doc: entry.inherited_doc,
            fields: entry.fields,
        }
    }

    /// Fully-qualified `app_label.ClassName`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}.{}", self.app_label, self.name)
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldEntry> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    apps: Vec<AppRecord>,
    by_label: FxHashMap<String, usize>,
}

impl Registry {
    /// Indexes the manifest and marks the applications installed under `project_root`.
    ///
    /// # Errors
    /// Returns [`IntrospectionError::InvalidManifest`] on duplicate application
    /// labels or duplicate model names within an application.
    pub fn new(manifest: Manifest, project_root: impl AsRef<Path>) -> Result<Self, IntrospectionError> {
        let project_root = resolve_path(project_root.as_ref());
        let mut apps = Vec::with_capacity(manifest.apps.len());
        let mut by_label = FxHashMap::default();

        for entry in manifest.apps {
            if by_label.contains_key(&entry.label) {
                return Err(IntrospectionError::InvalidManifest {
                    message: format!("Duplicate application label '{}'", entry.label).into(),
                    context: None,
                });
            }
            let record = Self::index_app(entry, &project_root)?;
            by_label.insert(record.label.clone(), apps.len());
            apps.push(record);
        }

        let registry = Self { apps, by_label };
        info!(
            root = %project_root.display(),
            apps = registry.apps.len(),
            project_apps = registry.project_apps().count(),
            "Registry indexed"
        );
        Ok(registry)
    }

    fn index_app(entry: AppEntry, project_root: &Path) -> Result<AppRecord, IntrospectionError> {
        let AppEntry { label, name, verbose_name, path, docs, init_file, models } = entry;

        let mut seen = FxHashSet::default();
        let mut records = Vec::with_capacity(models.len());
        for model in models {
            let record = ModelRecord::from_entry(&label, model);
            if !seen.insert(record.model_name.clone()) {
                return Err(IntrospectionError::InvalidManifest {
                    message: format!("Duplicate model '{}' in application '{label}'", record.name)
                        .into(),
                    context: None,
                });
            }
            records.push(record);
        }

        let in_project = is_within(&path, project_root);
        debug!(app = %label, path = %path.display(), in_project, "Indexed application");

        Ok(AppRecord {
            label,
            name,
            verbose_name,
            path,
            docs,
            init_file,
            models: records,
            in_project,
        })
    }

    /// Applications installed under the project root, in manifest order.
    pub fn project_apps(&self) -> impl Iterator<Item = &AppRecord> {
        self.apps.iter().filter(|app| app.in_project)
    }

    /// Exact-label lookup restricted to project applications.
    #[must_use]
    pub fn project_app(&self, label: &str) -> Option<&AppRecord> {
        self.app(label).filter(|app| app.in_project)
    }

    /// Exact-label lookup across every installed application.
    #[must_use]
    pub fn app(&self, label: &str) -> Option<&AppRecord> {
        self.by_label.get(label).map(|&idx| &self.apps[idx])
    }

    /// Resolves an `app_label.ClassName` reference.
    #[must_use]
    pub fn resolve(&self, model_label: &str) -> Option<&ModelRecord> {
        let (app_label, model_name) = model_label.split_once('.')?;
        self.app(app_label)?.model(model_name)
    }
}

/// Canonical form of `path`, or its lexically normalized absolute form when
/// it does not exist.
fn resolve_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        normalize_lexically(&absolute)
    })
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                out.pop();
            },
            other => out.push(other),
        }
    }
    out
}

fn is_within(path: &Path, root: &Path) -> bool {
    resolve_path(path).starts_with(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn manifest(json: &str) -> Manifest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn lexical_normalization_drops_dot_segments() {
        assert_eq!(
            normalize_lexically(Path::new("/srv/project/./apps/../catalog")),
            PathBuf::from("/srv/project/catalog")
        );
    }

    #[test]
    fn containment_works_for_missing_paths() {
        assert!(is_within(Path::new("/nowhere/project/catalog"), Path::new("/nowhere/project")));
        assert!(!is_within(Path::new("/nowhere/project/../site"), Path::new("/nowhere/project")));
        assert!(!is_within(Path::new("/nowhere/projects"), Path::new("/nowhere/project")));
    }

    #[test]
    fn only_apps_under_the_root_are_project_apps() -> Result<(), Box<dyn std::error::Error>> {
        let root = tempdir()?;
        std::fs::create_dir_all(root.path().join("catalog"))?;

        let mut manifest = manifest(
            r#"{ "apps": [
                { "label": "catalog", "name": "shop.catalog", "path": "catalog" },
                { "label": "auth", "name": "framework.auth", "path": "/usr/lib/framework/auth" }
            ] }"#,
        );
        manifest.rebase(root.path());

        let registry = Registry::new(manifest, root.path())?;
        let labels: Vec<_> = registry.project_apps().map(|app| app.label.as_str()).collect();
        assert_eq!(labels, ["catalog"]);
        assert!(registry.project_app("auth").is_none());
        assert!(registry.app("auth").is_some());
        Ok(())
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let manifest = manifest(
            r#"{ "apps": [
                { "label": "catalog", "name": "a", "path": "/x" },
                { "label": "catalog", "name": "b", "path": "/y" }
            ] }"#,
        );
        let err = Registry::new(manifest, "/x").unwrap_err();
        assert!(matches!(err, IntrospectionError::InvalidManifest { .. }));
    }

    #[test]
    fn duplicate_models_are_rejected() {
        let manifest = manifest(
            r#"{ "apps": [ { "label": "catalog", "name": "a", "path": "/x",
                "models": [ { "name": "Product" }, { "name": "PRODUCT" } ] } ] }"#,
        );
        assert!(Registry::new(manifest, "/x").is_err());
    }

    #[test]
    fn model_defaults_and_resolution() -> Result<(), Box<dyn std::error::Error>> {
        let manifest = manifest(
            r#"{ "apps": [ { "label": "catalog", "name": "shop.catalog", "path": "/x/catalog",
                "models": [ { "name": "ProductVariant" } ] } ] }"#,
        );
        let registry = Registry::new(manifest, "/x")?;

        let model = registry.resolve("catalog.ProductVariant").unwrap();
        assert_eq!(model.model_name, "productvariant");
        assert_eq!(model.db_table, "catalog_productvariant");
        assert_eq!(model.label(), "catalog.ProductVariant");
        assert!(registry.resolve("catalog.Missing").is_none());
        assert!(registry.resolve("catalog").is_none());
        Ok(())
    }

    #[test]
    fn declared_model_name_is_lowercased() -> Result<(), Box<dyn std::error::Error>> {
        let manifest = manifest(
            r#"{ "apps": [ { "label": "catalog", "name": "shop.catalog", "path": "/x/catalog",
                "models": [ { "name": "ProductVariant", "model_name": "Product_Variant" } ] } ] }"#,
        );
        let registry = Registry::new(manifest, "/x")?;

        let app = registry.app("catalog").unwrap();
        let model = app.model("PRODUCT_VARIANT").unwrap();
        assert_eq!(model.model_name, "product_variant");
        assert_eq!(model.db_table, "catalog_product_variant");
        assert_eq!(app.model("product_variant").unwrap().name, "ProductVariant");
        Ok(())
    }
}
