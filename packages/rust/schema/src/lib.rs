//! Schema validation and normalization of module documentation.
//!
//! The documentation tool emits loosely typed JSON: fields may be missing,
//! `null`, a single string where a list is expected, or a number where a
//! string is expected. This crate accepts every shape the tool is known to
//! produce and coerces it into the fixed [`NormalizedPayload`] schema:
//!
//! 1. "string or list" fields (`author`, `description`, `notes`) become lists
//! 2. option `default` and return `sample` become strings (`null` → `""`)
//! 3. `choices` elements become strings
//! 4. absent fields take their documented defaults (`type` → `"str"`, ...)
//! 5. `suboptions` / `contains` recurse through the same rules
//!
//! Anything that fits none of the accepted shapes, or lacks `module` /
//! `collection`, is rejected with [`ModdocError::Schema`].

mod model;
mod raw;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use moddoc_shared::{ModdocError, Result};

pub use model::{
    DEFAULT_TYPE, NormalizedModuleDoc, NormalizedOption, NormalizedPayload, NormalizedReturn,
};

use raw::{RawOption, RawPayload, RawReturn};

/// Normalize one module's raw payload (`{"doc": ..., "examples": ..., "return": ...}`).
#[instrument(skip_all)]
pub fn normalize_payload(raw: Value) -> Result<NormalizedPayload> {
    let payload: RawPayload = ingest(raw)?;
    let normalized = NormalizedPayload::from(payload);

    debug!(
        module = %normalized.doc.module,
        collection = %normalized.doc.collection,
        options = normalized.doc.options.len(),
        returns = normalized.returns.len(),
        "payload normalized"
    );

    Ok(normalized)
}

/// Normalize a single option entry.
pub fn normalize_option(raw: Value) -> Result<NormalizedOption> {
    ingest::<RawOption>(raw).map(NormalizedOption::from)
}

/// Normalize a single return-value entry.
pub fn normalize_return(raw: Value) -> Result<NormalizedReturn> {
    ingest::<RawReturn>(raw).map(NormalizedReturn::from)
}

fn ingest<T: DeserializeOwned>(raw: Value) -> Result<T> {
    serde_json::from_value(raw).map_err(|e| ModdocError::schema(e.to_string()))
}
