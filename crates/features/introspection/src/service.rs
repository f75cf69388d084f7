//! Read-only schema browsing operations over a [`Registry`].

use crate::describe::{
    app_description, app_display_name, has_description, model_detail_description,
    model_list_description,
};
use crate::error::IntrospectionError;
use crate::extract::{forward_field_count, forward_fields, reverse_relations};
use crate::model::{AppModels, Application, ModelDetail, ModelSummary};
use crate::registry::{AppRecord, ModelRecord, Registry};
use atlas_kernel::i18n::Translator;

/// Schema browser bound to an immutable registry. Every operation is a pure
/// read; translated text comes from the caller's [`Translator`].
#[derive(Debug, Clone)]
pub struct SchemaBrowser {
    registry: Registry,
}

impl SchemaBrowser {
    #[must_use]
    pub const fn new(registry: Registry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Project applications sorted by display name, case-insensitively.
    #[must_use]
    pub fn list_applications(&self, t: &Translator) -> Vec<Application> {
        let mut apps: Vec<Application> =
            self.registry.project_apps().map(|app| Self::application(app, t)).collect();
        apps.sort_by_cached_key(|app| app.name.to_lowercase());
        apps
    }

    /// # Errors
    /// [`IntrospectionError::NotFound`] when no project application has this label.
    pub fn get_application(&self, app_label: &str, t: &Translator) -> Result<Application, IntrospectionError> {
        self.app(app_label, t).map(|app| Self::application(app, t))
    }

    /// Models of an application sorted by class name, case-insensitively.
    ///
    /// # Errors
    /// [`IntrospectionError::NotFound`] when the application does not exist.
    pub fn list_models(&self, app_label: &str, t: &Translator) -> Result<Vec<ModelSummary>, IntrospectionError> {
        let app = self.app(app_label, t)?;
        let mut models: Vec<ModelSummary> = app
            .models
            .iter()
            .map(|model| {
                let description = model_list_description(model, t);
                ModelSummary {
                    name: model.name.clone(),
                    model_name: model.model_name.clone(),
                    db_table: model.db_table.clone(),
                    has_description: has_description(&description, t),
                    description,
                    fields_count: forward_field_count(model),
                }
            })
            .collect();
        models.sort_by_cached_key(|model| model.name.to_lowercase());
        Ok(models)
    }

    /// Application plus its model listing, as served by the application page.
    ///
    /// # Errors
    /// [`IntrospectionError::NotFound`] when the application does not exist.
    pub fn app_models(&self, app_label: &str, t: &Translator) -> Result<AppModels, IntrospectionError> {
        Ok(AppModels { app: self.get_application(app_label, t)?, models: self.list_models(app_label, t)? })
    }

    /// Matches `model_name` case-insensitively against the normalized name
    /// or the class name.
    ///
    /// # Errors
    /// [`IntrospectionError::NotFound`] when the application or the model does not exist.
    pub fn find_model(
        &self,
        app_label: &str,
        model_name: &str,
        t: &Translator,
    ) -> Result<&ModelRecord, IntrospectionError> {
        self.app(app_label, t)?.model(model_name).ok_or_else(|| IntrospectionError::NotFound {
            message: t
                .tr_with(
                    "[Model not found: %(app_label)s.%(model_name)s]",
                    &[("app_label", app_label), ("model_name", model_name)],
                )
                .into(),
            context: None,
        })
    }

    /// # Errors
    /// [`IntrospectionError::NotFound`] when the application or the model does not exist.
    pub fn get_model_details(
        &self,
        app_label: &str,
        model_name: &str,
        t: &Translator,
    ) -> Result<ModelDetail, IntrospectionError> {
        let model = self.find_model(app_label, model_name, t)?;
        let description = model_detail_description(model, t);

        Ok(ModelDetail {
            app_label: model.app_label.clone(),
            model_name: model.model_name.clone(),
            model_label: model.label(),
            db_table: model.db_table.clone(),
            has_description: has_description(&description, t),
            description,
            fields: forward_fields(model, &self.registry, t),
            reverse_relations: reverse_relations(model, &self.registry, t),
        })
    }

    fn app(&self, app_label: &str, t: &Translator) -> Result<&AppRecord, IntrospectionError> {
        self.registry.project_app(app_label).ok_or_else(|| IntrospectionError::NotFound {
            message: t.tr_with("[App not found: %(app_label)s]", &[("app_label", app_label)]).into(),
            context: None,
        })
    }

    fn application(app: &AppRecord, t: &Translator) -> Application {
        let description = app_description(app, t);
        Application {
            label: app.label.clone(),
            name: app_display_name(app, t),
            module: app.name.clone(),
            has_description: has_description(&description, t),
            description,
            models_count: app.models.len(),
        }
    }
}
