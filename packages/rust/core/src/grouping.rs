//! Namespace grouping.
//!
//! Partitions module identifiers into the namespaces their output files are
//! named after.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, instrument};

use moddoc_shared::{ModuleId, STUB_NAMESPACE};

/// Namespace → identifiers in that namespace, in first-seen order.
pub type NamespaceGroups = BTreeMap<String, Vec<ModuleId>>;

/// Group identifiers by namespace.
///
/// Each identifier is split at its last separator; the prefix is its
/// namespace. Identifiers without one land in [`STUB_NAMESPACE`]. Every
/// identifier appears in exactly one group, and duplicates are kept once.
#[instrument(skip_all, fields(modules = ids.len()))]
pub fn group_by_namespace(ids: &[ModuleId]) -> NamespaceGroups {
    let mut groups = NamespaceGroups::new();
    let mut seen: HashSet<&ModuleId> = HashSet::with_capacity(ids.len());

    for id in ids {
        if !seen.insert(id) {
            debug!(module = %id, "duplicate identifier, keeping first");
            continue;
        }
        groups
            .entry(id.namespace().to_string())
            .or_default()
            .push(id.clone());
    }

    if let Some(stub) = groups.get(STUB_NAMESPACE) {
        debug!(count = stub.len(), "identifiers without a namespace");
    }
    debug!(namespaces = groups.len(), "grouping complete");

    groups
}
