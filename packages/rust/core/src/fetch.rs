//! Per-module fetch: tool invocation + normalization, one or many at a time.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use moddoc_schema::{NormalizedPayload, normalize_payload};
use moddoc_shared::{ModdocError, ModuleId, Result};
use moddoc_tool::DocTool;

/// A module whose documentation was fetched and normalized.
#[derive(Debug, Clone)]
pub struct FetchedModule {
    /// Canonical name as reported by the tool.
    pub name: String,
    pub payload: NormalizedPayload,
}

/// Fetch and normalize one module's documentation.
///
/// Errors carry the module identifier so callers can log and skip.
#[instrument(skip_all, fields(module = %id))]
pub async fn fetch_module(tool: &DocTool, id: &ModuleId) -> Result<FetchedModule> {
    let raw = tool.fetch_doc(id).await?;

    let payload = normalize_payload(raw.payload).map_err(|e| match e {
        ModdocError::Schema { message } => ModdocError::schema(format!("{id}: {message}")),
        other => other,
    })?;

    debug!(canonical = %raw.name, "module normalized");
    Ok(FetchedModule {
        name: raw.name,
        payload,
    })
}

/// Run `op` for every identifier, returning outcomes in input order.
///
/// With `concurrency <= 1` the calls run strictly one after another. Above
/// that, up to `concurrency` calls are in flight at once.
pub async fn fetch_many<T, F, Fut>(
    tool: &DocTool,
    ids: &[ModuleId],
    concurrency: u32,
    op: F,
) -> Vec<(ModuleId, Result<T>)>
where
    F: Fn(DocTool, ModuleId) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let mut outcomes = Vec::with_capacity(ids.len());

    if concurrency <= 1 {
        for id in ids {
            let outcome = op(tool.clone(), id.clone()).await;
            outcomes.push((id.clone(), outcome));
        }
        return outcomes;
    }

    let semaphore = Arc::new(Semaphore::new(concurrency as usize));
    let mut handles = Vec::with_capacity(ids.len());

    for id in ids {
        let sem = semaphore.clone();
        let task = op(tool.clone(), id.clone());
        handles.push((
            id.clone(),
            tokio::spawn(async move {
                let _permit = sem.acquire_owned().await.map_err(|e| {
                    ModdocError::invocation(format!("fetch slot unavailable: {e}"))
                })?;
                task.await
            }),
        ));
    }

    for (id, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(ModdocError::invocation(format!(
                "{id}: fetch task failed: {e}"
            ))),
        };
        outcomes.push((id, outcome));
    }

    outcomes
}
