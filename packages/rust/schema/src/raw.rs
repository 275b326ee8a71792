//! Ingestion-side view of the tool's documentation payload.
//!
//! Every field the tool may omit, null out, or send in more than one shape is
//! modelled here. Nothing outside this crate sees these types: they are
//! converted to the normalized model as soon as serde accepts them.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Number, Value};

/// A field that is either one string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub(crate) fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }
}

/// Collapse an optional polymorphic field to its list form.
pub(crate) fn list(field: Option<OneOrMany>) -> Vec<String> {
    field.map(OneOrMany::into_vec).unwrap_or_default()
}

/// A scalar rendered as text (`version_added` may be `2.0` or `"2.0"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Text(String),
    Number(Number),
    Bool(bool),
}

impl Scalar {
    pub(crate) fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

pub(crate) fn scalar(field: Option<Scalar>) -> String {
    field.map(Scalar::into_string).unwrap_or_default()
}

/// `choices` as a plain list, or as a mapping of choice to description.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Choices {
    List(Vec<Value>),
    Described(Map<String, Value>),
}

impl Choices {
    pub(crate) fn into_strings(self) -> Vec<String> {
        match self {
            Self::List(items) => items.iter().map(render_value).collect(),
            Self::Described(map) => map.into_iter().map(|(k, _)| k).collect(),
        }
    }
}

/// Render any JSON value as a type-erased string.
///
/// `null` becomes empty, strings are kept verbatim, everything else is written
/// as compact JSON.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Payload sections
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct RawPayload {
    pub doc: RawModuleDoc,
    #[serde(default)]
    pub examples: Option<String>,
    #[serde(default, rename = "return")]
    pub returns: Option<BTreeMap<String, RawReturn>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawModuleDoc {
    #[serde(default)]
    pub author: Option<OneOrMany>,
    pub collection: String,
    #[serde(default)]
    pub description: Option<OneOrMany>,
    #[serde(default)]
    pub has_action: Option<bool>,
    pub module: String,
    #[serde(default)]
    pub notes: Option<OneOrMany>,
    #[serde(default)]
    pub options: Option<BTreeMap<String, RawOption>>,
    #[serde(default)]
    pub requirements: Option<Vec<String>>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub version_added: Option<Scalar>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawOption {
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
    #[serde(default)]
    pub choices: Option<Choices>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub description: Option<OneOrMany>,
    #[serde(default)]
    pub elements: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub suboptions: Option<BTreeMap<String, RawOption>>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub version_added: Option<Scalar>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawReturn {
    #[serde(default)]
    pub contains: Option<BTreeMap<String, RawReturn>>,
    #[serde(default)]
    pub description: Option<OneOrMany>,
    #[serde(default)]
    pub elements: Option<String>,
    #[serde(default)]
    pub returned: Option<String>,
    #[serde(default)]
    pub sample: Option<Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub version_added: Option<Scalar>,
}
