//! End-to-end `export` pipeline: list → group → fetch → normalize → write.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{error, info, instrument, warn};

use moddoc_schema::NormalizedPayload;
use moddoc_shared::{ExportOptions, ModdocError, ModuleId, OutputLayout, Result, ToolConfig};
use moddoc_tool::DocTool;

use crate::fetch::{fetch_many, fetch_module};
use crate::grouping::group_by_namespace;
use crate::writer;

/// Configuration for the `export` pipeline.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Existing directory the JSON files are written to.
    pub output_dir: PathBuf,
    /// External documentation tool invocation.
    pub tool: ToolConfig,
    /// Layout, indentation, and concurrency.
    pub options: ExportOptions,
}

/// A module left out of the output, with the reason.
#[derive(Debug, Clone)]
pub struct ModuleFailure {
    pub module: ModuleId,
    /// Error class (`parse`, `schema`, ...).
    pub kind: &'static str,
    pub message: String,
}

/// Result of the `export` pipeline.
#[derive(Debug, Default)]
pub struct ExportResult {
    /// Identifiers reported by the tool.
    pub modules_listed: usize,
    /// Namespace files written (grouped layout only).
    pub namespaces_written: usize,
    /// Modules present in the written files.
    pub modules_written: usize,
    /// Files written (one per namespace, or one per module in flat layout).
    pub files: Vec<PathBuf>,
    /// Modules that were skipped.
    pub failures: Vec<ModuleFailure>,
    /// Modules fetched successfully whose entry was replaced by a later
    /// module reporting the same canonical name.
    pub superseded: Vec<ModuleId>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once the tool has listed its modules.
    fn modules_listed(&self, total: usize);
    /// Called when a module's documentation is ready for writing.
    fn module_fetched(&self, id: &ModuleId, current: usize, total: usize);
    /// Called when a module is skipped.
    fn module_failed(&self, id: &ModuleId, error: &ModdocError, current: usize, total: usize);
    /// Called after each output file is written.
    fn file_written(&self, path: &Path);
    /// Called when the pipeline completes.
    fn done(&self, result: &ExportResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn modules_listed(&self, _total: usize) {}
    fn module_fetched(&self, _id: &ModuleId, _current: usize, _total: usize) {}
    fn module_failed(&self, _id: &ModuleId, _error: &ModdocError, _current: usize, _total: usize) {
    }
    fn file_written(&self, _path: &Path) {}
    fn done(&self, _result: &ExportResult) {}
}

/// Run the full `export` pipeline.
///
/// 1. Check the output directory
/// 2. List modules (any failure here aborts the run)
/// 3. Grouped layout: group by namespace, fetch + normalize, write one file
///    per namespace. Flat layout: write each raw document to its own file.
///
/// Per-module failures are logged, recorded in [`ExportResult::failures`],
/// and never stop the run.
#[instrument(skip_all, fields(output_dir = %config.output_dir.display(), layout = %config.options.layout))]
pub async fn export(
    config: &ExportConfig,
    progress: &dyn ProgressReporter,
) -> Result<ExportResult> {
    let start = Instant::now();

    writer::ensure_output_dir(&config.output_dir)?;
    let tool = DocTool::new(config.tool.clone())?;

    // --- Phase 1: Enumerate ---
    progress.phase("Listing modules");
    info!(tool = %tool.program(), "listing modules");
    let ids = tool.list_modules().await?;
    progress.modules_listed(ids.len());

    let mut run = RunState {
        result: ExportResult {
            modules_listed: ids.len(),
            ..ExportResult::default()
        },
        processed: 0,
        total: ids.len(),
        progress,
    };

    // --- Phase 2: Fetch + write ---
    match config.options.layout {
        OutputLayout::Grouped => export_grouped(config, &tool, &ids, &mut run).await?,
        OutputLayout::Flat => export_flat(config, &tool, &ids, &mut run).await?,
    }

    let mut result = run.result;
    result.elapsed = start.elapsed();
    progress.done(&result);

    info!(
        modules_listed = result.modules_listed,
        namespaces_written = result.namespaces_written,
        modules_written = result.modules_written,
        files = result.files.len(),
        failures = result.failures.len(),
        elapsed_ms = result.elapsed.as_millis(),
        "export complete"
    );

    Ok(result)
}

// ---------------------------------------------------------------------------
// Run bookkeeping
// ---------------------------------------------------------------------------

struct RunState<'a> {
    result: ExportResult,
    processed: usize,
    total: usize,
    progress: &'a dyn ProgressReporter,
}

impl RunState<'_> {
    fn fetched(&mut self, id: &ModuleId) {
        self.processed += 1;
        info!(module = %id, "fetched module documentation");
        self.progress.module_fetched(id, self.processed, self.total);
    }

    fn failed(&mut self, id: ModuleId, err: ModdocError) {
        self.processed += 1;
        error!(module = %id, kind = err.kind(), error = %err, "skipping module");
        self.progress
            .module_failed(&id, &err, self.processed, self.total);
        self.result.failures.push(ModuleFailure {
            module: id,
            kind: err.kind(),
            message: err.to_string(),
        });
    }

    fn superseded(&mut self, id: ModuleId, canonical: &str) {
        self.processed += 1;
        warn!(module = %id, canonical, "replaced by a later module with the same canonical name");
        self.result.superseded.push(id);
    }

    fn written(&mut self, path: PathBuf, modules: usize) {
        self.progress.file_written(&path);
        self.result.modules_written += modules;
        self.result.files.push(path);
    }
}

// ---------------------------------------------------------------------------
// Grouped layout
// ---------------------------------------------------------------------------

async fn export_grouped(
    config: &ExportConfig,
    tool: &DocTool,
    ids: &[ModuleId],
    run: &mut RunState<'_>,
) -> Result<()> {
    let groups = group_by_namespace(ids);
    info!(namespaces = groups.len(), "grouped modules by namespace");

    for (namespace, members) in &groups {
        // A namespace that cannot name a file is skipped before any fetch.
        if let Err(e) = writer::output_path(&config.output_dir, namespace) {
            warn!(namespace = %namespace, error = %e, "skipping namespace");
            for id in members {
                run.failed(id.clone(), ModdocError::validation(e.to_string()));
            }
            continue;
        }

        run.progress.phase(&format!("Fetching {namespace}"));

        let outcomes = fetch_many(
            tool,
            members,
            config.options.concurrency,
            |tool, id| async move { fetch_module(&tool, &id).await },
        )
        .await;

        // The last module reporting a canonical name owns its entry.
        let owners: HashMap<String, usize> = outcomes
            .iter()
            .enumerate()
            .filter_map(|(idx, (_, outcome))| Some((outcome.as_ref().ok()?.name.clone(), idx)))
            .collect();

        let mut documents: BTreeMap<String, NormalizedPayload> = BTreeMap::new();
        for (idx, (id, outcome)) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(module) if owners.get(&module.name) == Some(&idx) => {
                    run.fetched(&id);
                    documents.insert(module.name, module.payload);
                }
                Ok(module) => run.superseded(id, &module.name),
                Err(e) => run.failed(id, e),
            }
        }

        if documents.is_empty() {
            warn!(namespace = %namespace, "no documentation fetched, no file written");
            continue;
        }

        let path = writer::write_group(
            &config.output_dir,
            namespace,
            &documents,
            config.options.indent,
        )?;
        info!(namespace = %namespace, modules = documents.len(), path = %path.display(), "wrote namespace");
        run.written(path, documents.len());
        run.result.namespaces_written += 1;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Flat layout
// ---------------------------------------------------------------------------

async fn export_flat(
    config: &ExportConfig,
    tool: &DocTool,
    ids: &[ModuleId],
    run: &mut RunState<'_>,
) -> Result<()> {
    run.progress.phase("Fetching modules");

    let outcomes = fetch_many(
        tool,
        ids,
        config.options.concurrency,
        |tool, id| async move { tool.fetch_doc(&id).await },
    )
    .await;

    for (id, outcome) in outcomes {
        let raw = match outcome {
            Ok(raw) => raw,
            Err(e) => {
                run.failed(id, e);
                continue;
            }
        };

        match writer::write_raw(
            &config.output_dir,
            id.as_str(),
            &raw.to_value(),
            config.options.indent,
        ) {
            Ok(path) => {
                run.fetched(&id);
                run.written(path, 1);
            }
            Err(e @ ModdocError::Validation { .. }) => run.failed(id, e),
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const FAKE_TOOL: &str = r#"case "$1" in
  -l) echo '{"ns1.modA": {}, "ns1.modB": {}, "top": {}}' ;;
  ns1.modA) echo '{"ns1.modA": {"doc": {"module": "modA", "collection": "ns1", "description": "does A", "author": "Ann"}, "examples": "- ns1.modA:", "return": null}}' ;;
  ns1.modB) echo '{"ns1.modB": {"doc": {"module": "modB", "collection": "ns1", "options": {"n": {"type": "int", "default": 42}}}}}' ;;
  top) echo '{"top": {"doc": ' ;;
  *) exit 1 ;;
esac
"#;

    struct Fixture {
        dir: tempfile::TempDir,
        config: ExportConfig,
    }

    impl Fixture {
        fn new(script: &str) -> Self {
            let dir = tempfile::TempDir::new().unwrap();
            let script_path = dir.path().join("fake-doc.sh");
            std::fs::write(&script_path, script).unwrap();
            let output_dir = dir.path().join("out");
            std::fs::create_dir(&output_dir).unwrap();

            let config = ExportConfig {
                output_dir,
                tool: ToolConfig {
                    command: vec!["sh".into(), script_path.to_string_lossy().into_owned()],
                    ..ToolConfig::default()
                },
                options: ExportOptions::default(),
            };
            Self { dir, config }
        }

        fn out(&self, name: &str) -> PathBuf {
            self.config.output_dir.join(name)
        }

        fn read_json(&self, name: &str) -> serde_json::Value {
            let content = std::fs::read_to_string(self.out(name)).unwrap();
            serde_json::from_str(&content).unwrap()
        }
    }

    /// Records failed module identifiers.
    #[derive(Default)]
    struct RecordingProgress {
        failed: Mutex<Vec<String>>,
        fetched: Mutex<Vec<String>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, _name: &str) {}
        fn modules_listed(&self, _total: usize) {}
        fn module_fetched(&self, id: &ModuleId, _current: usize, _total: usize) {
            self.fetched.lock().unwrap().push(id.to_string());
        }
        fn module_failed(&self, id: &ModuleId, _error: &ModdocError, _current: usize, _total: usize) {
            self.failed.lock().unwrap().push(id.to_string());
        }
        fn file_written(&self, _path: &Path) {}
        fn done(&self, _result: &ExportResult) {}
    }

    #[tokio::test]
    async fn grouped_export_skips_malformed_module() {
        let fx = Fixture::new(FAKE_TOOL);
        let progress = RecordingProgress::default();

        let result = export(&fx.config, &progress).await.unwrap();

        assert_eq!(result.modules_listed, 3);
        assert_eq!(result.namespaces_written, 1);
        assert_eq!(result.modules_written, 2);
        assert_eq!(result.files, vec![fx.out("ns1.json")]);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].module.as_str(), "top");
        assert_eq!(result.failures[0].kind, "parse");
        assert_eq!(*progress.failed.lock().unwrap(), vec!["top"]);
        assert_eq!(*progress.fetched.lock().unwrap(), vec!["ns1.modA", "ns1.modB"]);

        let ns1 = fx.read_json("ns1.json");
        let modules = ns1.as_object().unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(ns1["ns1.modA"]["doc"]["description"], serde_json::json!(["does A"]));
        assert_eq!(ns1["ns1.modA"]["doc"]["author"], serde_json::json!(["Ann"]));
        assert_eq!(ns1["ns1.modA"]["return"], serde_json::json!({}));
        assert_eq!(ns1["ns1.modB"]["doc"]["options"]["n"]["default"], "42");
        assert_eq!(ns1["ns1.modB"]["doc"]["options"]["n"]["type"], "int");

        assert!(!fx.out("global.stub.json").exists());
    }

    #[tokio::test]
    async fn failing_sibling_does_not_block_namespace() {
        let script = FAKE_TOOL.replace(
            r#"ns1.modB) echo"#,
            r#"ns1.modB) exit 1 ; echo"#,
        );
        let fx = Fixture::new(&script);

        let result = export(&fx.config, &SilentProgress).await.unwrap();

        let failed: Vec<(&str, &str)> = result
            .failures
            .iter()
            .map(|f| (f.module.as_str(), f.kind))
            .collect();
        // Namespaces are processed in sorted order: `global.stub` before `ns1`.
        assert_eq!(failed, vec![("top", "parse"), ("ns1.modB", "parse")]);

        let ns1 = fx.read_json("ns1.json");
        assert!(ns1.get("ns1.modA").is_some());
        assert!(ns1.get("ns1.modB").is_none());
    }

    #[tokio::test]
    async fn concurrent_export_matches_sequential() {
        let sequential = Fixture::new(FAKE_TOOL);
        export(&sequential.config, &SilentProgress).await.unwrap();

        let mut concurrent = Fixture::new(FAKE_TOOL);
        concurrent.config.options.concurrency = 4;
        let result = export(&concurrent.config, &SilentProgress).await.unwrap();
        assert_eq!(result.failures.len(), 1);

        let a = std::fs::read(sequential.out("ns1.json")).unwrap();
        let b = std::fs::read(concurrent.out("ns1.json")).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn flat_export_writes_raw_documents() {
        let mut fx = Fixture::new(FAKE_TOOL);
        fx.config.options.layout = OutputLayout::Flat;

        let result = export(&fx.config, &SilentProgress).await.unwrap();

        assert_eq!(result.files.len(), 2);
        assert_eq!(result.namespaces_written, 0);
        assert_eq!(result.failures.len(), 1);

        // Raw pass-through: no normalization applied.
        let mod_b = fx.read_json("ns1.modB.json");
        assert_eq!(mod_b["ns1.modB"]["doc"]["options"]["n"]["default"], 42);
        assert!(mod_b["ns1.modB"].get("return").is_none());

        let mod_a = fx.read_json("ns1.modA.json");
        assert_eq!(mod_a["ns1.modA"]["doc"]["description"], "does A");
        assert!(!fx.out("top.json").exists());
        assert!(!fx.out("ns1.json").exists());
    }

    #[tokio::test]
    async fn enumeration_failure_aborts() {
        let fx = Fixture::new("echo 'ERROR! something broke'\n");
        let err = export(&fx.config, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, ModdocError::Parse { .. }));
        assert_eq!(std::fs::read_dir(&fx.config.output_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_output_dir_fails_before_listing() {
        let mut fx = Fixture::new(FAKE_TOOL);
        fx.config.output_dir = fx.dir.path().join("does-not-exist");
        fx.config.tool = ToolConfig::default().with_program("moddoc-test-no-such-program-xyz");

        let err = export(&fx.config, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, ModdocError::Validation { .. }), "got {err:?}");
        assert!(!fx.config.output_dir.exists());
    }

    #[tokio::test]
    async fn duplicate_canonical_name_keeps_last_module() {
        let script = FAKE_TOOL
            .replace(
                r#""ns1.modB": {}, "top": {}"#,
                r#""ns1.modB": {}, "ns1.alias": {}, "top": {}"#,
            )
            .replace(
                "  top)",
                "  ns1.alias) echo '{\"ns1.modA\": {\"doc\": {\"module\": \"modA\", \"collection\": \"ns1\", \"short_description\": \"from alias\"}}}' ;;\n  top)",
            );
        let fx = Fixture::new(&script);
        let progress = RecordingProgress::default();

        let result = export(&fx.config, &progress).await.unwrap();

        let superseded: Vec<&str> = result.superseded.iter().map(ModuleId::as_str).collect();
        assert_eq!(superseded, vec!["ns1.modA"]);
        assert_eq!(*progress.fetched.lock().unwrap(), vec!["ns1.modB", "ns1.alias"]);
        assert_eq!(result.modules_written, 2);

        let ns1 = fx.read_json("ns1.json");
        assert_eq!(ns1.as_object().unwrap().len(), 2);
        assert_eq!(ns1["ns1.modA"]["doc"]["short_description"], "from alias");
    }

    #[tokio::test]
    async fn schema_failure_is_recorded_per_module() {
        let script = FAKE_TOOL.replace(
            r#""module": "modA", "#,
            "",
        );
        let fx = Fixture::new(&script);

        let result = export(&fx.config, &SilentProgress).await.unwrap();

        let kinds: Vec<&str> = result.failures.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec!["parse", "schema"]);
        let ns1 = fx.read_json("ns1.json");
        assert_eq!(ns1.as_object().unwrap().len(), 1);
    }
}
