//! Application configuration for moddoc.
//!
//! User config lives at `~/.moddoc/moddoc.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ModdocError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "moddoc.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".moddoc";

// ---------------------------------------------------------------------------
// Config structs (matching moddoc.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// External documentation tool invocation.
    #[serde(default)]
    pub tool: ToolConfig,

    /// Output file settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// `[tool]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Program and leading arguments, e.g. `["ansible-doc"]` or
    /// `["uv", "run", "ansible-doc"]`.
    #[serde(default = "default_command")]
    pub command: Vec<String>,

    /// Arguments that make the tool list every module as JSON.
    #[serde(default = "default_list_args")]
    pub list_args: Vec<String>,

    /// Arguments placed after the module identifier to get its JSON docs.
    #[serde(default = "default_doc_args")]
    pub doc_args: Vec<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            list_args: default_list_args(),
            doc_args: default_doc_args(),
        }
    }
}

impl ToolConfig {
    /// Replace the program, keeping the configured argument layout.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.command = vec![program.into()];
        self
    }
}

fn default_command() -> Vec<String> {
    vec!["ansible-doc".into()]
}
fn default_list_args() -> Vec<String> {
    vec!["-l".into(), "-j".into()]
}
fn default_doc_args() -> Vec<String> {
    vec!["-j".into()]
}

/// How exported documentation is laid out on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLayout {
    /// One normalized file per namespace.
    #[default]
    Grouped,
    /// One raw, unnormalized file per module.
    Flat,
}

impl std::fmt::Display for OutputLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grouped => f.write_str("grouped"),
            Self::Flat => f.write_str("flat"),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// File layout.
    #[serde(default)]
    pub layout: OutputLayout,

    /// Spaces per indentation level in written JSON.
    #[serde(default = "default_indent")]
    pub indent: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            layout: OutputLayout::default(),
            indent: default_indent(),
        }
    }
}

fn default_indent() -> usize {
    2
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum tool processes running at once within a namespace.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Export options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime export options, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// File layout.
    pub layout: OutputLayout,
    /// JSON indentation width.
    pub indent: usize,
    /// Maximum concurrent tool processes (1 = strictly sequential).
    pub concurrency: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ExportOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            layout: config.output.layout,
            indent: config.output.indent,
            concurrency: config.fetch.concurrency.max(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.moddoc/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| ModdocError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.moddoc/moddoc.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = match config_file_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(error = %e, "no home directory, using default config");
            return Ok(AppConfig::default());
        }
    };

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ModdocError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| ModdocError::config(format!("failed to parse {}: {e}", path.display())))?;

    if config.tool.command.is_empty() {
        return Err(ModdocError::config(format!(
            "{}: [tool] command must name a program",
            path.display()
        )));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("ansible-doc"));
        assert!(toml_str.contains("grouped"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.tool, ToolConfig::default());
        assert_eq!(parsed.output.indent, 2);
        assert_eq!(parsed.fetch.concurrency, 1);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[tool]
command = ["uv", "run", "ansible-doc"]

[output]
layout = "flat"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.tool.command, vec!["uv", "run", "ansible-doc"]);
        assert_eq!(config.tool.list_args, vec!["-l", "-j"]);
        assert_eq!(config.output.layout, OutputLayout::Flat);
        assert_eq!(config.output.indent, 2);
    }

    #[test]
    fn export_options_from_app_config() {
        let mut app = AppConfig::default();
        app.fetch.concurrency = 0;
        let opts = ExportOptions::from(&app);
        assert_eq!(opts.layout, OutputLayout::Grouped);
        assert_eq!(opts.indent, 2);
        // zero would stall the fetch loop
        assert_eq!(opts.concurrency, 1);
    }

    #[test]
    fn with_program_replaces_command() {
        let tool = ToolConfig::default().with_program("/opt/bin/fake-doc");
        assert_eq!(tool.command, vec!["/opt/bin/fake-doc"]);
        assert_eq!(tool.doc_args, vec!["-j"]);
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("moddoc.toml");
        std::fs::write(&path, "[fetch]\nconcurrency = 4\n").expect("write");

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.fetch.concurrency, 4);
        assert_eq!(config.tool.command, vec!["ansible-doc"]);
    }

    #[test]
    fn load_config_rejects_empty_command() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("moddoc.toml");
        std::fs::write(&path, "[tool]\ncommand = []\n").expect("write");

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("must name a program"));
    }

    #[test]
    fn load_config_reports_bad_toml() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("moddoc.toml");
        std::fs::write(&path, "[output\nindent = 2").expect("write");

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ModdocError::Config { .. }));
    }
}
