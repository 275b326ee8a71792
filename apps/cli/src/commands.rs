//! CLI definition, tracing setup, and the export command.

use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use moddoc_core::pipeline::{ExportConfig, ExportResult, ProgressReporter, export};
use moddoc_shared::{
    AppConfig, ExportOptions, ModdocError, ModuleId, OutputLayout, load_config, load_config_from,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// moddoc: dump module documentation as normalized JSON, one file per namespace.
#[derive(Parser)]
#[command(
    name = "moddoc",
    version,
    about = "Export module documentation from a doc tool as normalized JSON files.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Existing directory to write the JSON files into.
    pub out_dir: PathBuf,

    /// Config file (defaults to ~/.moddoc/moddoc.toml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Documentation tool program, replacing the configured command.
    #[arg(long, env = "MODDOC_TOOL")]
    pub tool: Option<String>,

    /// Output layout.
    #[arg(long)]
    pub layout: Option<LayoutArg>,

    /// Maximum tool processes running at once.
    #[arg(long)]
    pub concurrency: Option<u32>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// `--layout` values.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LayoutArg {
    /// One normalized file per namespace.
    Grouped,
    /// One raw file per module.
    Flat,
}

impl From<LayoutArg> for OutputLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Grouped => OutputLayout::Grouped,
            LayoutArg::Flat => OutputLayout::Flat,
        }
    }
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "moddoc=info",
        1 => "moddoc=debug",
        _ => "moddoc=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Resolve configuration and run the export.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let app_config = resolve_config(&cli)?;

    let config = ExportConfig {
        output_dir: cli.out_dir.clone(),
        options: ExportOptions::from(&app_config),
        tool: app_config.tool,
    };

    info!(
        out_dir = %config.output_dir.display(),
        tool = %config.tool.command.join(" "),
        layout = %config.options.layout,
        concurrency = config.options.concurrency,
        "exporting module documentation"
    );

    let reporter = CliProgress::new();
    let result = export(&config, &reporter)
        .await
        .wrap_err_with(|| format!("export to '{}' failed", config.output_dir.display()))?;

    print_summary(&config.output_dir, &result);
    Ok(())
}

/// Config file values, overridden by CLI flags.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    if let Some(program) = &cli.tool {
        config.tool = config.tool.with_program(program.clone());
    }
    if let Some(layout) = cli.layout {
        config.output.layout = layout.into();
    }
    if let Some(concurrency) = cli.concurrency {
        config.fetch.concurrency = concurrency;
    }

    Ok(config)
}

fn print_summary(out_dir: &Path, result: &ExportResult) {
    println!();
    println!("  Export finished.");
    println!("  Output:     {}", out_dir.display());
    println!("  Listed:     {}", result.modules_listed);
    println!("  Namespaces: {}", result.namespaces_written);
    println!("  Modules:    {}", result.modules_written);
    println!("  Files:      {}", result.files.len());
    println!("  Failures:   {}", result.failures.len());
    for failure in &result.failures {
        println!("    - {} ({})", failure.module, failure.kind);
    }
    if !result.superseded.is_empty() {
        println!("  Replaced:   {}", result.superseded.len());
    }
    println!("  Time:       {:.1}s", result.elapsed.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn modules_listed(&self, total: usize) {
        self.spinner.set_message(format!("Listed {total} modules"));
    }

    fn module_fetched(&self, id: &ModuleId, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching [{current}/{total}] {id}"));
    }

    fn module_failed(&self, id: &ModuleId, _error: &ModdocError, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Skipped [{current}/{total}] {id}"));
    }

    fn file_written(&self, path: &Path) {
        self.spinner
            .set_message(format!("Wrote {}", path.display()));
    }

    fn done(&self, _result: &ExportResult) {
        self.spinner.finish_and_clear();
    }
}
