//! Shared types, error model, and configuration for moddoc.
//!
//! This crate is the foundation depended on by all other moddoc crates.
//! It provides:
//! - [`ModdocError`]: the unified error type
//! - Domain types ([`ModuleId`], namespace constants)
//! - Configuration ([`AppConfig`], [`ExportOptions`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ExportOptions, FetchConfig, OutputConfig, OutputLayout, ToolConfig, config_dir,
    config_file_path, load_config, load_config_from,
};
pub use error::{ModdocError, Result};
pub use types::{ModuleId, NAMESPACE_SEPARATOR, STUB_NAMESPACE};
