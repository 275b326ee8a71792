//! Output writer.
//!
//! Serializes namespace groups (or, in the flat layout, raw module documents)
//! to `<output_dir>/<name>.json`. Files are pretty-printed, keep non-ASCII
//! text as-is, and overwrite whatever was there before.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::{debug, instrument};

use moddoc_schema::NormalizedPayload;
use moddoc_shared::{ModdocError, Result};

/// Fail unless `dir` exists and is a directory. It is never created.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ModdocError::validation(format!(
            "output path '{}' is not a directory",
            dir.display()
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ModdocError::validation(
            format!("output directory '{}' does not exist", dir.display()),
        )),
        Err(e) => Err(ModdocError::io(dir, e)),
    }
}

/// Path of the JSON file for `name` inside `output_dir`.
///
/// Rejects names that would escape the directory or are not plain file names.
pub fn output_path(output_dir: &Path, name: &str) -> Result<PathBuf> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(ModdocError::validation(format!(
            "'{name}' cannot be used as an output file name"
        )));
    }
    Ok(output_dir.join(format!("{name}.json")))
}

/// Write one namespace group: module name → normalized documentation.
#[instrument(skip_all, fields(namespace = %namespace, modules = modules.len()))]
pub fn write_group(
    output_dir: &Path,
    namespace: &str,
    modules: &BTreeMap<String, NormalizedPayload>,
    indent: usize,
) -> Result<PathBuf> {
    let path = output_path(output_dir, namespace)?;
    write_json(&path, modules, indent)?;
    Ok(path)
}

/// Write one module's raw tool output unchanged (flat layout).
#[instrument(skip_all, fields(module = %name))]
pub fn write_raw(
    output_dir: &Path,
    name: &str,
    document: &serde_json::Value,
    indent: usize,
) -> Result<PathBuf> {
    let path = output_path(output_dir, name)?;
    write_json(&path, document, indent)?;
    Ok(path)
}

/// Render `data` as indented JSON.
pub fn to_pretty_json<T: Serialize + ?Sized>(data: &T, indent: usize) -> Result<Vec<u8>> {
    let indent = vec![b' '; indent];
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(&indent));
    data.serialize(&mut ser)
        .map_err(|e| ModdocError::validation(format!("JSON serialization failed: {e}")))?;
    Ok(buf)
}

/// Write a JSON file (pretty-printed).
fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T, indent: usize) -> Result<()> {
    let json = to_pretty_json(data, indent)?;
    std::fs::write(path, json).map_err(|e| ModdocError::io(path, e))?;
    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}
