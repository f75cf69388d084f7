//! Forward field and reverse relation extraction.

use crate::describe::{field_description, has_description, pick};
use crate::manifest::FieldEntry;
use crate::model::{Field, RelationTarget, ReverseRelation};
use crate::registry::{ModelRecord, Registry};
use atlas_kernel::i18n::Translator;
use tracing::{debug, warn};

/// Canonical type naming for a field.
///
/// `internal_type` is an optional capability; implementors that cannot
/// provide it keep the default and the category name is used.
pub trait TypeLabel {
    /// Category (class) name, always available.
    fn category(&self) -> &str;

    /// Framework-internal type name.
    ///
    /// `None` when unsupported, `Some(Err(..))` when the lookup fails.
    fn internal_type(&self) -> Option<Result<&str, String>> {
        None
    }

    fn type_label(&self) -> &str {
        match self.internal_type() {
            Some(Ok(name)) => name,
            Some(Err(reason)) => {
                warn!(category = self.category(), %reason, "Internal type unavailable");
                self.category()
            },
            None => self.category(),
        }
    }
}

impl TypeLabel for FieldEntry {
    fn category(&self) -> &str {
        &self.kind
    }

    fn internal_type(&self) -> Option<Result<&str, String>> {
        let raw = self.internal_type.as_deref()?;
        let name = raw.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Some(Err(format!("invalid internal type '{raw}'")));
        }
        Some(Ok(name))
    }
}

impl From<&ModelRecord> for RelationTarget {
    fn from(model: &ModelRecord) -> Self {
        Self {
            app_label: model.app_label.clone(),
            model_name: model.model_name.clone(),
            label: model.label(),
        }
    }
}

/// Reverse entries only exist because a relation elsewhere points here.
fn is_reverse(field: &FieldEntry) -> bool {
    field.auto_created && !field.concrete && field.is_relation
}

fn related<'r>(registry: &'r Registry, field: &FieldEntry) -> Option<&'r ModelRecord> {
    field.related_model.as_deref().and_then(|label| registry.resolve(label))
}

/// Fields declared on the model, sorted by name case-insensitively.
pub fn forward_fields(model: &ModelRecord, registry: &Registry, t: &Translator) -> Vec<Field> {
    let mut fields: Vec<Field> = model
        .fields
        .iter()
        .filter(|field| !(field.auto_created && !field.concrete))
        .map(|field| {
            let target = field
                .is_relation
                .then(|| related(registry, field))
                .flatten()
                .map(RelationTarget::from);
            if field.is_relation && target.is_none() {
                debug!(
                    model = %model.label(),
                    field = %field.name,
                    related = ?field.related_model,
                    "Related model not resolvable"
                );
            }

            let description = field_description(field, t);
            Field {
                name: field.name.clone(),
                type_label: field.type_label().to_owned(),
                has_description: has_description(&description, t),
                description,
                is_relation: target.is_some(),
                related_target: target,
            }
        })
        .collect();

    fields.sort_by_cached_key(|field| field.name.to_lowercase());
    fields
}

/// Number of fields [`forward_fields`] would return.
#[must_use]
pub fn forward_field_count(model: &ModelRecord) -> usize {
    model.fields.iter().filter(|field| !(field.auto_created && !field.concrete)).count()
}

/// Relations declared elsewhere that point at `model`, sorted by origin
/// model label and origin field name. Entries whose origin model does not
/// resolve are dropped.
pub fn reverse_relations(
    model: &ModelRecord,
    registry: &Registry,
    t: &Translator,
) -> Vec<ReverseRelation> {
    let mut relations: Vec<ReverseRelation> = model
        .fields
        .iter()
        .filter(|field| is_reverse(field))
        .filter_map(|field| {
            let Some(origin) = related(registry, field) else {
                debug!(model = %model.label(), relation = %field.name, "Dropping unresolvable reverse relation");
                return None;
            };
            let origin_field_name = field.remote_field.as_deref().unwrap_or(&field.name);
            let origin_label = origin.label();
            let fallback = t.tr_with(
                "[Field %(field_name)s of model %(model_label)s]",
                &[("field_name", origin_field_name), ("model_label", &origin_label)],
            );
            let help = origin.field(origin_field_name).and_then(|f| f.help_text.as_deref());

            Some(ReverseRelation {
                name: field.accessor_name.clone().unwrap_or_else(|| field.name.clone()),
                type_label: field.type_label().to_owned(),
                description: pick([help, Some(fallback.as_str())], t),
                source_field_name: origin_field_name.to_owned(),
                source_model_label: origin_label,
                source_target: RelationTarget::from(origin),
            })
        })
        .collect();

    relations.sort_by_cached_key(|rel| {
        (rel.source_model_label.to_lowercase(), rel.source_field_name.to_lowercase())
    });
    relations
}
