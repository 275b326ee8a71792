//! Invocation of the external documentation tool.
//!
//! moddoc never links against the tool. It runs it as a subprocess twice over:
//! once to list every module ([`DocTool::list_modules`]) and once per module
//! to fetch its documentation ([`DocTool::fetch_doc`]). Only stdout is parsed;
//! stderr is kept for error messages.

use std::process::{ExitStatus, Stdio};

use serde_json::{Map, Value};
use tokio::process::Command;
use tracing::{debug, info, instrument};

use moddoc_shared::{ModdocError, ModuleId, Result, ToolConfig};

/// Longest stderr excerpt carried into an error message.
const STDERR_EXCERPT_LEN: usize = 300;

// ---------------------------------------------------------------------------
// RawDocument
// ---------------------------------------------------------------------------

/// One module's documentation exactly as the tool reported it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    /// Canonical module name (the single key of the tool output).
    pub name: String,
    /// Untyped documentation payload.
    pub payload: Value,
}

impl RawDocument {
    /// Rebuild the tool's one-entry mapping (`{name: payload}`).
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(self.name.clone(), self.payload.clone());
        Value::Object(map)
    }
}

// ---------------------------------------------------------------------------
// DocTool
// ---------------------------------------------------------------------------

/// Handle to the external documentation tool.
#[derive(Debug, Clone)]
pub struct DocTool {
    config: ToolConfig,
}

/// Captured result of one tool run.
struct ToolOutput {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl DocTool {
    /// Create a handle. Fails if the configured command is empty.
    pub fn new(config: ToolConfig) -> Result<Self> {
        if config.command.is_empty() {
            return Err(ModdocError::config("tool command must name a program"));
        }
        Ok(Self { config })
    }

    /// Printable form of the tool command, for logs.
    pub fn program(&self) -> String {
        self.config.command.join(" ")
    }

    /// List every module identifier the tool knows about.
    ///
    /// The list output is a JSON object keyed by identifier; its values are
    /// ignored.
    #[instrument(skip_all, fields(tool = %self.program()))]
    pub async fn list_modules(&self) -> Result<Vec<ModuleId>> {
        let output = self.invoke(&self.config.list_args).await?;
        let value = parse_json_output(&output, "module list")?;

        let Value::Object(map) = value else {
            return Err(ModdocError::parse(format!(
                "module list: expected a JSON object, got {}",
                json_kind(&value)
            )));
        };

        let ids: Vec<ModuleId> = map.into_iter().map(|(key, _)| ModuleId::new(key)).collect();
        info!(count = ids.len(), "listed modules");
        Ok(ids)
    }

    /// Fetch the raw documentation for one module.
    ///
    /// The tool answers with a mapping holding exactly one entry: the canonical
    /// module name and its payload.
    #[instrument(skip_all, fields(module = %id))]
    pub async fn fetch_doc(&self, id: &ModuleId) -> Result<RawDocument> {
        let mut args = Vec::with_capacity(self.config.doc_args.len() + 1);
        args.push(id.as_str().to_string());
        args.extend(self.config.doc_args.iter().cloned());

        let output = self.invoke(&args).await?;
        let value = parse_json_output(&output, id.as_str())?;

        let Value::Object(map) = value else {
            return Err(ModdocError::schema(format!(
                "{id}: expected a JSON object, got {}",
                json_kind(&value)
            )));
        };

        if map.len() != 1 {
            return Err(ModdocError::schema(format!(
                "{id}: expected exactly one documentation entry, got {}",
                map.len()
            )));
        }

        let Some((name, payload)) = map.into_iter().next() else {
            return Err(ModdocError::schema(format!("{id}: empty documentation mapping")));
        };

        debug!(canonical = %name, "fetched raw documentation");
        Ok(RawDocument { name, payload })
    }

    /// Run the tool with `args` appended to the configured command.
    async fn invoke(&self, args: &[String]) -> Result<ToolOutput> {
        let (program, leading) = self
            .config
            .command
            .split_first()
            .ok_or_else(|| ModdocError::config("tool command must name a program"))?;

        debug!(program, ?leading, ?args, "running documentation tool");

        let output = Command::new(program)
            .args(leading)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                ModdocError::invocation(format!(
                    "failed to run `{program}`: {e}. Is it installed and on PATH?"
                ))
            })?;

        Ok(ToolOutput {
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

// ---------------------------------------------------------------------------
// Output classification
// ---------------------------------------------------------------------------

/// Turn captured tool output into JSON.
///
/// - empty stdout is a parse error, whatever the exit status
/// - non-empty stdout with a failing exit status is an invocation error
/// - otherwise stdout must be UTF-8 JSON
fn parse_json_output(output: &ToolOutput, what: &str) -> Result<Value> {
    if output.stdout.trim_ascii().is_empty() {
        let mut message = format!("{what}: tool produced no output");
        if !output.status.success() {
            message.push_str(&format!(" ({})", describe_failure(output)));
        }
        return Err(ModdocError::parse(message));
    }

    if !output.status.success() {
        return Err(ModdocError::invocation(format!(
            "{what}: {}",
            describe_failure(output)
        )));
    }

    serde_json::from_slice(&output.stdout)
        .map_err(|e| ModdocError::parse(format!("{what}: invalid JSON: {e}")))
}

fn describe_failure(output: &ToolOutput) -> String {
    let status = match output.status.code() {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    };

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        return status;
    }

    let excerpt: String = stderr.chars().take(STDERR_EXCERPT_LEN).collect();
    format!("{status}: {excerpt}")
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
