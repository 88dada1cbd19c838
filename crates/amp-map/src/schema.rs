//! Schema key canonicalization.
//!
//! The enrichment process names entity properties after their schema:
//! `iglu:com.acme/myEntity/jsonschema/1-0-2` becomes the property
//! `contexts_com_acme_my_entity_1`. Rules may reference an entity by either
//! form, so both are reduced to the property-name form before matching.

use thiserror::Error;

/// Prefix of entity properties.
pub const CONTEXTS_PREFIX: &str = "contexts_";
/// Prefix of self-describing event properties.
pub const SELF_DESCRIBING_PREFIX: &str = "unstruct_event_";

const IGLU_PREFIX: &str = "iglu:";
const JSON_SCHEMA_FORMAT: &str = "jsonschema";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaKeyError {
    #[error("schema URI must start with 'iglu:'")]
    MissingPrefix,
    #[error("schema URI must have the form vendor/name/format/version")]
    Segments,
    #[error("schema {0} must not be empty")]
    EmptyPart(&'static str),
    #[error("unsupported schema format '{0}'")]
    Format(String),
    #[error("schema version '{0}' is not MODEL-REVISION-ADDITION")]
    Version(String),
}

/// A parsed `iglu:vendor/name/jsonschema/MODEL-REVISION-ADDITION` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaKey<'a> {
    pub vendor: &'a str,
    pub name: &'a str,
    /// Model digits as written; property names keep leading zeros.
    pub model_text: &'a str,
    pub model: u32,
    pub revision: u32,
    pub addition: u32,
}

impl<'a> SchemaKey<'a> {
    pub fn parse(uri: &'a str) -> Result<Self, SchemaKeyError> {
        let path = uri
            .strip_prefix(IGLU_PREFIX)
            .ok_or(SchemaKeyError::MissingPrefix)?;
        let parts: Vec<&str> = path.split('/').collect();
        let [vendor, name, format, version] = parts[..] else {
            return Err(SchemaKeyError::Segments);
        };
        if vendor.is_empty() {
            return Err(SchemaKeyError::EmptyPart("vendor"));
        }
        if name.is_empty() {
            return Err(SchemaKeyError::EmptyPart("name"));
        }
        if format != JSON_SCHEMA_FORMAT {
            return Err(SchemaKeyError::Format(format.to_string()));
        }
        let numbers: Vec<u32> = version
            .split('-')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                part.parse().ok()
            })
            .collect::<Option<_>>()
            .ok_or_else(|| SchemaKeyError::Version(version.to_string()))?;
        let [model, revision, addition] = numbers[..] else {
            return Err(SchemaKeyError::Version(version.to_string()));
        };
        let model_text = version.split('-').next().unwrap_or(version);
        Ok(Self {
            vendor,
            name,
            model_text,
            model,
            revision,
            addition,
        })
    }

    /// Property name the enrichment process gives entities of this schema.
    pub fn property_name(&self) -> String {
        let flat = format!("{}_{}_{}", self.vendor, self.name, self.model_text).replace('.', "_");
        format!("{CONTEXTS_PREFIX}{}", to_snake_case(&flat).to_lowercase())
    }
}

/// Reduces a rule key to the entity property name it refers to.
///
/// - `contexts_*` keys are already canonical and returned unchanged.
/// - `iglu:` URIs become `contexts_<vendor>_<name>_<model>` in snake case.
/// - Anything else (atomic fields, `unstruct_event_*` properties) is returned
///   unchanged.
///
/// `iglu:` keys that do not parse as a schema URI are reduced character by
/// character instead.
pub fn canonicalize(key: &str) -> String {
    if key.starts_with(CONTEXTS_PREFIX) || !key.starts_with(IGLU_PREFIX) {
        return key.to_string();
    }
    match SchemaKey::parse(key) {
        Ok(schema) => schema.property_name(),
        Err(_) => lenient_property_name(key),
    }
}

/// Canonicalization for malformed `iglu:` keys: drop the prefix and the first
/// `jsonschema/`, flatten `.` and `/` to `_`, cut the two last `-` segments
/// and snake-case the rest. Yields `contexts_` alone when no `-` is left to cut.
fn lenient_property_name(key: &str) -> String {
    let path = key
        .strip_prefix(IGLU_PREFIX)
        .unwrap_or(key)
        .replacen("jsonschema/", "", 1);
    let flat: String = path
        .chars()
        .map(|c| if c == '.' || c == '/' { '_' } else { c })
        .collect();
    let model = cut_last_dash_segment(cut_last_dash_segment(&flat));
    format!("{CONTEXTS_PREFIX}{}", to_snake_case(model).to_lowercase())
}

fn cut_last_dash_segment(value: &str) -> &str {
    value.rfind('-').map_or("", |idx| &value[..idx])
}

/// Inserts `_` before every upper-case letter that is neither the first
/// character nor already preceded by `_`.
fn to_snake_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    let mut previous: Option<char> = None;
    for c in value.chars() {
        if c.is_uppercase() && previous.is_some_and(|p| p != '_') {
            out.push('_');
        }
        out.push(c);
        previous = Some(c);
    }
    out
}
