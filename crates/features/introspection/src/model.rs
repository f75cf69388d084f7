//! Response models of the schema browser.

use atlas_derive::api_model;

/// Identity of a related model.
#[api_model]
#[derive(PartialEq, Eq)]
pub struct RelationTarget {
    pub app_label: String,
    /// Normalized (lowercase) model name
    pub model_name: String,
    /// Fully-qualified `app_label.ClassName`
    pub label: String,
}

/// An installed project application.
#[api_model]
pub struct Application {
    pub label: String,
    /// Display name
    pub name: String,
    /// Dotted module path
    pub module: String,
    pub description: String,
    pub has_description: bool,
    pub models_count: usize,
}

/// A model as shown in its application's listing.
#[api_model]
pub struct ModelSummary {
    /// Class name
    pub name: String,
    pub model_name: String,
    pub db_table: String,
    pub description: String,
    pub has_description: bool,
    /// Number of forward fields
    pub fields_count: usize,
}

/// Application page payload.
#[api_model]
pub struct AppModels {
    pub app: Application,
    pub models: Vec<ModelSummary>,
}

/// A field declared on the model itself.
#[api_model]
pub struct Field {
    pub name: String,
    /// Internal type name, or the field category when unavailable
    #[serde(rename = "type")]
    pub type_label: String,
    pub description: String,
    pub has_description: bool,
    /// True only when the related model resolves
    pub is_relation: bool,
    pub related_target: Option<RelationTarget>,
}

/// A relation declared on another model that points at this one.
#[api_model]
pub struct ReverseRelation {
    /// Accessor name on this model
    pub name: String,
    #[serde(rename = "type")]
    pub type_label: String,
    pub description: String,
    pub source_field_name: String,
    pub source_model_label: String,
    pub source_target: RelationTarget,
}

/// Model page payload.
#[api_model]
pub struct ModelDetail {
    pub app_label: String,
    pub model_name: String,
    pub model_label: String,
    pub db_table: String,
    pub description: String,
    pub has_description: bool,
    pub fields: Vec<Field>,
    pub reverse_relations: Vec<ReverseRelation>,
}
