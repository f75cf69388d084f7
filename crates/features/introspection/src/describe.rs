//! Description resolution for applications, models and fields.
//!
//! Every text goes through whitespace normalization; the first (or every, for
//! composite descriptions) non-empty candidate wins and the localized
//! "no description" marker is the last resort.

use crate::manifest::FieldEntry;
use crate::registry::{AppRecord, ModelRecord};
use atlas_kernel::i18n::Translator;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const NO_DESCRIPTION: &str = "[No description.]";
pub const SEPARATOR: &str = " | ";

/// Collapses whitespace runs into single spaces and trims.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First non-empty normalized candidate, or the localized marker.
pub fn pick<'a, I>(candidates: I, t: &Translator) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(normalize)
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| t.tr(NO_DESCRIPTION))
}

/// Every distinct non-empty normalized candidate joined by [`SEPARATOR`], or the marker.
pub fn join<I>(candidates: I, t: &Translator) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut parts: Vec<String> = Vec::new();
    for text in candidates.into_iter().map(|text| normalize(&text)) {
        if !text.is_empty() && !parts.contains(&text) {
            parts.push(text);
        }
    }

    if parts.is_empty() { t.tr(NO_DESCRIPTION) } else { parts.join(SEPARATOR) }
}

#[must_use]
pub fn has_description(text: &str, t: &Translator) -> bool {
    text != t.tr(NO_DESCRIPTION)
}

/// `verbose` unless it merely restates `name` with underscores as spaces.
fn distinct_verbose(verbose: Option<&str>, name: &str) -> Option<String> {
    let verbose = normalize(verbose?);
    let derived = name.replace('_', " ");
    (verbose.to_lowercase() != derived.to_lowercase()).then_some(verbose)
}

/// Display name of an application: the translated verbose name, else the
/// title-cased label.
#[must_use]
pub fn app_display_name(app: &AppRecord, t: &Translator) -> String {
    app.verbose_name.as_deref().map_or_else(|| title_case(&app.label), |name| t.tr(name))
}

pub fn app_description(app: &AppRecord, t: &Translator) -> String {
    let verbose = app.verbose_name.as_deref().map(|name| t.tr(name));
    let init_doc = app.init_file.as_ref().map(|file| init_file_doc(&app.path.join(file)));

    join(
        [
            distinct_verbose(verbose.as_deref(), &app.label),
            app.docs.config_class.clone(),
            app.docs.config_module.clone(),
            init_doc,
            app.docs.package.clone(),
        ]
        .into_iter()
        .flatten(),
        t,
    )
}

/// Listing description: declared or inherited class documentation, then the
/// verbose name.
pub fn model_list_description(model: &ModelRecord, t: &Translator) -> String {
    let doc = model.doc.as_deref().or(model.inherited_doc.as_deref());
    let verbose = model.verbose_name.as_deref().map(|name| t.tr(name));

    pick([doc, distinct_verbose(verbose.as_deref(), &model.name).as_deref()], t)
}

/// Detail description: only documentation declared on the class itself.
pub fn model_detail_description(model: &ModelRecord, t: &Translator) -> String {
    pick([model.doc.as_deref()], t)
}

pub fn field_description(field: &FieldEntry, t: &Translator) -> String {
    let verbose = field.verbose_name.as_deref().map(|name| t.tr(name));

    pick(
        [field.help_text.as_deref(), distinct_verbose(verbose.as_deref(), &field.name).as_deref()],
        t,
    )
}

/// Leading documentation block of a package initializer; empty when the file
/// is unreadable or carries none.
#[must_use]
pub fn init_file_doc(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(source) => leading_doc_block(&source),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "Initializer file not readable");
            String::new()
        },
    }
}

/// Extracts the module docstring: the string literal opening the file after
/// blank and `#` comment lines, or a leading `//!` run.
#[must_use]
pub fn leading_doc_block(source: &str) -> String {
    let mut lines =
        source.lines().map(str::trim).skip_while(|line| line.is_empty() || line.starts_with('#'));

    let Some(first) = lines.next() else {
        return String::new();
    };

    if first.starts_with("//!") {
        let rest = lines.take_while(|line| line.starts_with("//!"));
        return std::iter::once(first)
            .chain(rest)
            .map(|line| line.trim_start_matches("//!"))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let literal = first.strip_prefix(['r', 'R', 'u', 'U']).unwrap_or(first);

    for quote in [r#"""""#, "'''"] {
        let Some(opening) = literal.strip_prefix(quote) else {
            continue;
        };
        if let Some((body, _)) = opening.split_once(quote) {
            return body.to_owned();
        }

        let mut body = vec![opening];
        for line in lines {
            if let Some((tail, _)) = line.split_once(quote) {
                body.push(tail);
                return body.join("\n");
            }
            body.push(line);
        }
        // Unterminated string literal.
        return String::new();
    }

    for quote in ['"', '\''] {
        if let Some(opening) = literal.strip_prefix(quote) {
            return closing_quote(opening, quote)
                .map_or_else(String::new, |end| opening[..end].to_owned());
        }
    }

    String::new()
}

/// Byte offset of the first unescaped `quote` in `body`.
fn closing_quote(body: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in body.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ch if ch == quote => return Some(idx),
            _ => {},
        }
    }
    None
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut boundary = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if boundary {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            boundary = false;
        } else {
            out.push(ch);
            boundary = true;
        }
    }
    out
}
