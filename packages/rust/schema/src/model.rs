//! Normalized documentation model: the fixed schema written to disk.
//!
//! Every field is always present in serialized output, whatever the tool
//! supplied. Field order follows declaration order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::raw::{self, RawModuleDoc, RawOption, RawPayload, RawReturn};

/// Default declared type for options and return values.
pub const DEFAULT_TYPE: &str = "str";

/// Everything stored for one module in a namespace file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPayload {
    pub doc: NormalizedModuleDoc,
    pub examples: String,
    #[serde(rename = "return")]
    pub returns: BTreeMap<String, NormalizedReturn>,
}

/// Module-level documentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedModuleDoc {
    pub author: Vec<String>,
    pub collection: String,
    pub description: Vec<String>,
    pub has_action: bool,
    pub module: String,
    pub notes: Vec<String>,
    pub options: BTreeMap<String, NormalizedOption>,
    pub requirements: Vec<String>,
    pub short_description: String,
    pub version_added: String,
}

/// One configuration option of a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedOption {
    pub aliases: Vec<String>,
    pub choices: Vec<String>,
    /// Default value rendered as text; empty when the option has none.
    pub default: String,
    pub description: Vec<String>,
    pub elements: String,
    pub required: bool,
    pub suboptions: BTreeMap<String, NormalizedOption>,
    #[serde(rename = "type")]
    pub kind: String,
    pub version_added: String,
}

/// One documented return value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReturn {
    pub contains: BTreeMap<String, NormalizedReturn>,
    pub description: Vec<String>,
    pub elements: String,
    pub returned: String,
    /// Sample value rendered as text.
    pub sample: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub version_added: String,
}

// ---------------------------------------------------------------------------
// Raw → normalized
// ---------------------------------------------------------------------------

impl From<RawPayload> for NormalizedPayload {
    fn from(raw: RawPayload) -> Self {
        Self {
            doc: raw.doc.into(),
            examples: raw.examples.unwrap_or_default(),
            returns: convert_map(raw.returns),
        }
    }
}

impl From<RawModuleDoc> for NormalizedModuleDoc {
    fn from(raw: RawModuleDoc) -> Self {
        Self {
            author: raw::list(raw.author),
            collection: raw.collection,
            description: raw::list(raw.description),
            has_action: raw.has_action.unwrap_or(false),
            module: raw.module,
            notes: raw::list(raw.notes),
            options: convert_map(raw.options),
            requirements: raw.requirements.unwrap_or_default(),
            short_description: raw.short_description.unwrap_or_default(),
            version_added: raw::scalar(raw.version_added),
        }
    }
}

impl From<RawOption> for NormalizedOption {
    fn from(raw: RawOption) -> Self {
        Self {
            aliases: raw.aliases.unwrap_or_default(),
            choices: raw
                .choices
                .map(raw::Choices::into_strings)
                .unwrap_or_default(),
            default: raw
                .default
                .as_ref()
                .map(raw::render_value)
                .unwrap_or_default(),
            description: raw::list(raw.description),
            elements: raw.elements.unwrap_or_default(),
            required: raw.required.unwrap_or(false),
            suboptions: convert_map(raw.suboptions),
            kind: raw.kind.unwrap_or_else(|| DEFAULT_TYPE.to_string()),
            version_added: raw::scalar(raw.version_added),
        }
    }
}

impl From<RawReturn> for NormalizedReturn {
    fn from(raw: RawReturn) -> Self {
        Self {
            contains: convert_map(raw.contains),
            description: raw::list(raw.description),
            elements: raw.elements.unwrap_or_default(),
            returned: raw.returned.unwrap_or_default(),
            sample: raw
                .sample
                .as_ref()
                .map(raw::render_value)
                .unwrap_or_default(),
            kind: raw.kind.unwrap_or_else(|| DEFAULT_TYPE.to_string()),
            version_added: raw::scalar(raw.version_added),
        }
    }
}

fn convert_map<R, N: From<R>>(map: Option<BTreeMap<String, R>>) -> BTreeMap<String, N> {
    map.unwrap_or_default()
        .into_iter()
        .map(|(name, raw)| (name, N::from(raw)))
        .collect()
}
