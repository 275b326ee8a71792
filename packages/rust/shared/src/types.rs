//! Core domain types for moddoc.

use serde::{Deserialize, Serialize};

/// Separator between namespace segments in a module identifier.
pub const NAMESPACE_SEPARATOR: char = '.';

/// Bucket for identifiers that carry no namespace of their own.
///
/// No real collection uses this name, so it cannot clash with tool output.
pub const STUB_NAMESPACE: &str = "global.stub";

// ---------------------------------------------------------------------------
// ModuleId
// ---------------------------------------------------------------------------

/// A dotted module identifier as listed by the documentation tool
/// (e.g. `ansible.builtin.copy`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace the module belongs to: everything before the last separator.
    ///
    /// Identifiers without a separator, or with an empty prefix, fall back to
    /// [`STUB_NAMESPACE`].
    pub fn namespace(&self) -> &str {
        match self.0.rsplit_once(NAMESPACE_SEPARATOR) {
            Some((prefix, _)) if !prefix.is_empty() => prefix,
            _ => STUB_NAMESPACE,
        }
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ModuleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
