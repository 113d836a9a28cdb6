// ── Batch action orchestrator ──
//
// Runs one bulk operation over the current selection, folds the outcome
// into a report, prunes succeeded keys from the selection, and asks the
// owning view for a reload.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display};
use std::future::Future;
use std::hash::Hash;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::BatchConfig;
use crate::error::CoreError;
use crate::selection::SelectionSet;

/// A batch operation identifier (`uninstall`, `delete`, ...).
pub trait BatchKind: Copy + Eq + Hash + Display + Send + Sync + 'static {}

impl<T: Copy + Eq + Hash + Display + Send + Sync + 'static> BatchKind for T {}

/// Result of one key within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyOutcome {
    pub key: String,
    pub success: bool,
    pub message: String,
}

impl KeyOutcome {
    pub fn ok(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            success: true,
            message: String::new(),
        }
    }

    pub fn failed(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            success: false,
            message: message.into(),
        }
    }
}

/// What a backend reports for a completed batch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchResult {
    /// A single summary; every key is treated as succeeded.
    Aggregate(String),
    /// One outcome per key.
    PerKey(Vec<KeyOutcome>),
}

/// The external side of a batch: called once with the full key list.
pub trait BatchBackend<K: BatchKind>: Send + Sync {
    fn run_batch(
        &self,
        kind: K,
        keys: &[String],
    ) -> impl Future<Output = Result<BatchResult, CoreError>> + Send;
}

/// One-shot reload requested after a batch completes.
pub trait Reload: Send + Sync {
    fn reload(&self) -> impl Future<Output = ()> + Send;
}

/// A key that failed inside an otherwise completed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub key: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BatchOutcome {
    AllSucceeded,
    Partial,
    AllFailed,
}

/// Structured result of a completed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub kind: String,
    pub total: usize,
    pub succeeded: Vec<String>,
    pub failures: Vec<BatchFailure>,
    /// Backend summary for aggregate results.
    pub summary: Option<String>,
    #[serde(skip)]
    failure_limit: usize,
}

impl BatchReport {
    pub(crate) fn from_result(kind: &str, keys: &[String], result: BatchResult, failure_limit: usize) -> Self {
        let (succeeded, failures, summary) = match result {
            BatchResult::Aggregate(message) => (keys.to_vec(), Vec::new(), Some(message)),
            BatchResult::PerKey(outcomes) => {
                let by_key: HashMap<&str, &KeyOutcome> =
                    outcomes.iter().map(|o| (o.key.as_str(), o)).collect();
                let mut succeeded = Vec::new();
                let mut failures = Vec::new();
                for key in keys {
                    match by_key.get(key.as_str()) {
                        Some(o) if o.success => succeeded.push(key.clone()),
                        Some(o) => failures.push(BatchFailure {
                            key: key.clone(),
                            message: o.message.clone(),
                        }),
                        None => failures.push(BatchFailure {
                            key: key.clone(),
                            message: "no result reported".into(),
                        }),
                    }
                }
                (succeeded, failures, None)
            }
        };

        Self {
            kind: kind.to_owned(),
            total: keys.len(),
            succeeded,
            failures,
            summary,
            failure_limit,
        }
    }

    pub fn outcome(&self) -> BatchOutcome {
        if self.failures.is_empty() {
            BatchOutcome::AllSucceeded
        } else if self.succeeded.is_empty() {
            BatchOutcome::AllFailed
        } else {
            BatchOutcome::Partial
        }
    }

    /// `"<succeeded>/<total> succeeded"`.
    pub fn headline(&self) -> String {
        format!("{}/{} succeeded", self.succeeded.len(), self.total)
    }

    /// Failures within the report limit.
    pub fn shown_failures(&self) -> &[BatchFailure] {
        let n = self.failures.len().min(self.failure_limit);
        &self.failures[..n]
    }

    /// Failures elided from [`shown_failures`](Self::shown_failures).
    pub fn hidden_failures(&self) -> usize {
        self.failures.len().saturating_sub(self.failure_limit)
    }
}

impl Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.headline())?;
        if let Some(summary) = &self.summary {
            write!(f, "\n{summary}")?;
        }
        for failure in self.shown_failures() {
            write!(f, "\n  {}: {}", failure.key, failure.message)?;
        }
        if self.hidden_failures() > 0 {
            write!(f, "\n  ...and {} more", self.hidden_failures())?;
        }
        Ok(())
    }
}

/// Per-kind mutual exclusion and selection bookkeeping for batches.
pub struct BatchOrchestrator<K: BatchKind> {
    running: watch::Sender<HashSet<K>>,
    config: BatchConfig,
}

impl<K: BatchKind> BatchOrchestrator<K> {
    pub fn new(config: BatchConfig) -> Self {
        let (running, _) = watch::channel(HashSet::new());
        Self { running, config }
    }

    pub fn is_running(&self, kind: K) -> bool {
        self.running.borrow().contains(&kind)
    }

    pub(crate) fn failure_limit(&self) -> usize {
        self.config.failure_limit
    }

    /// Coarse flag: any batch of any kind is in progress.
    pub fn any_running(&self) -> bool {
        !self.running.borrow().is_empty()
    }

    pub fn subscribe_running(&self) -> watch::Receiver<HashSet<K>> {
        self.running.subscribe()
    }

    fn acquire(&self, kind: K) -> Result<RunningGuard<'_, K>, CoreError> {
        if self.running.send_if_modified(|set| set.insert(kind)) {
            Ok(RunningGuard {
                running: &self.running,
                kind,
            })
        } else {
            Err(CoreError::BatchInProgress {
                kind: kind.to_string(),
            })
        }
    }

    /// Run `kind` over the current selection.
    ///
    /// The backend is called once with every selected key in selection
    /// order. On a completed call, succeeded keys leave the selection and
    /// `reload` runs after the in-progress flag is released. A rejected
    /// call leaves the selection as it was and skips the reload.
    pub async fn run<B, R>(
        &self,
        kind: K,
        selection: &watch::Sender<SelectionSet>,
        backend: &B,
        reload: &R,
    ) -> Result<BatchReport, CoreError>
    where
        B: BatchBackend<K>,
        R: Reload,
    {
        let keys = selection.borrow().to_vec();
        if keys.is_empty() {
            return Err(CoreError::NoSelection);
        }

        let guard = self.acquire(kind)?;
        let operation = kind.to_string();
        debug!(kind = %operation, count = keys.len(), "batch started");

        let call = backend.run_batch(kind, &keys);
        let result = match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(CoreError::Timeout {
                    operation: operation.clone(),
                    timeout_secs: limit.as_secs(),
                }),
            },
            None => call.await,
        };

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                drop(guard);
                let e = e.during(&operation);
                warn!(kind = %operation, error = %e, "batch rejected");
                return Err(e);
            }
        };

        let report = BatchReport::from_result(&operation, &keys, result, self.config.failure_limit);
        selection.send_if_modified(|sel| sel.remove_many(report.succeeded.iter().map(String::as_str)));
        drop(guard);

        info!(
            kind = %operation,
            succeeded = report.succeeded.len(),
            failed = report.failures.len(),
            "batch finished"
        );
        reload.reload().await;
        Ok(report)
    }
}

/// Clears a kind's in-progress flag when dropped.
struct RunningGuard<'a, K: BatchKind> {
    running: &'a watch::Sender<HashSet<K>>,
    kind: K,
}

impl<K: BatchKind> Drop for RunningGuard<'_, K> {
    fn drop(&mut self) {
        let kind = self.kind;
        self.running.send_if_modified(|set| set.remove(&kind));
    }
}
