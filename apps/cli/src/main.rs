//! moddoc: export module documentation from a command-line doc tool.
//!
//! Lists every module the tool knows, fetches each one's JSON documentation,
//! normalizes it to a fixed schema, and writes one file per namespace.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
