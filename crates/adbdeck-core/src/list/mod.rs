// ── List controllers ──
//
// One controller per list view: a refresh coordinator for the records,
// filter state, a selection set kept consistent with every authoritative
// snapshot, a batch orchestrator, and a notice channel for the UI.

mod devices;
mod files;
mod packages;
#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::batch::{BatchBackend, BatchKind, BatchOrchestrator, BatchOutcome, BatchReport, BatchResult};
use crate::config::{BatchConfig, CoordinatorConfig};
use crate::error::CoreError;
use crate::filter::{FilterFor, FilteredView, SortDirection, compute_visible};
use crate::record::{Listable, Record};
use crate::refresh::{PollStatus, RecordSource, RefreshCoordinator, RefreshMode, RefreshOutcome};
use crate::selection::SelectionSet;
use crate::stream::RecordStream;

pub use devices::{DeviceSource, DevicesView, NoBatch};
pub use files::{FileBatch, FileSource, FilesView, join_remote, normalize_dir, parent_dir};
pub use packages::{PackageBatch, PackageSource, PackagesView};

const NOTICE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-facing message produced at the boundary of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub detail: Option<String>,
}

impl Notice {
    fn new(level: NoticeLevel, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    fn from_error(operation: &str, error: &CoreError) -> Self {
        let level = if error.is_local() {
            NoticeLevel::Warning
        } else {
            NoticeLevel::Error
        };
        Self::new(level, format!("{operation} failed")).with_detail(error.to_string())
    }

    fn from_report(report: &BatchReport) -> Self {
        let level = match report.outcome() {
            BatchOutcome::AllSucceeded => NoticeLevel::Success,
            BatchOutcome::Partial => NoticeLevel::Warning,
            BatchOutcome::AllFailed => NoticeLevel::Error,
        };
        Self::new(level, format!("{}: {}", report.kind, report.headline())).with_detail(report.to_string())
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

/// Everything one list view needs, parameterised by its record source
/// and batch kinds.
pub struct ListController<S, K>
where
    S: RecordSource,
    S::Record: Listable,
    K: BatchKind,
{
    coordinator: RefreshCoordinator<S>,
    filter: watch::Sender<FilterFor<S::Record>>,
    selection: Arc<watch::Sender<SelectionSet>>,
    batches: BatchOrchestrator<K>,
    operations: watch::Sender<HashSet<&'static str>>,
    notices: broadcast::Sender<Notice>,
    operation_timeout: Option<Duration>,
}

impl<S, K> ListController<S, K>
where
    S: RecordSource,
    S::Record: Listable,
    K: BatchKind,
{
    pub fn new(source: S, refresh: CoordinatorConfig, batch: BatchConfig) -> Self {
        let (selection, _) = watch::channel(SelectionSet::new());
        let selection = Arc::new(selection);

        // Drop selected keys that no longer name a record.
        let reconcile = Arc::clone(&selection);
        let hook = Box::new(move |records: &[S::Record]| {
            let known: HashSet<&str> = records.iter().map(Record::key).collect();
            reconcile.send_if_modified(|sel| sel.retain_known(&known) > 0);
        });

        let (filter, _) = watch::channel(FilterFor::<S::Record>::default());
        let (operations, _) = watch::channel(HashSet::new());
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

        Self {
            coordinator: RefreshCoordinator::with_publish_hook(source, refresh, hook),
            filter,
            selection,
            operation_timeout: batch.timeout,
            batches: BatchOrchestrator::new(batch),
            operations,
            notices,
        }
    }

    pub fn coordinator(&self) -> &RefreshCoordinator<S> {
        &self.coordinator
    }

    pub fn source(&self) -> &S {
        self.coordinator.source()
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Start polling at the configured interval.
    pub fn start(&self) {
        self.coordinator.start_default();
    }

    pub fn stop(&self) {
        self.coordinator.stop();
    }

    pub fn teardown(&self) {
        self.coordinator.teardown();
    }

    pub async fn refresh_now(&self) -> RefreshOutcome {
        self.coordinator.refresh_now(RefreshMode::Visible).await
    }

    // ── Observables ─────────────────────────────────────────────────

    /// Visible records and stats for the current snapshot and filter.
    pub fn view(&self) -> FilteredView<S::Record> {
        let records = self.coordinator.current_records();
        compute_visible(&records, &self.filter.borrow())
    }

    pub fn records(&self) -> Arc<Vec<S::Record>> {
        self.coordinator.current_records()
    }

    pub fn subscribe_records(&self) -> RecordStream<S::Record> {
        self.coordinator.subscribe()
    }

    pub fn filter(&self) -> FilterFor<S::Record> {
        self.filter.borrow().clone()
    }

    pub fn subscribe_filter(&self) -> watch::Receiver<FilterFor<S::Record>> {
        self.filter.subscribe()
    }

    pub fn selection(&self) -> SelectionSet {
        self.selection.borrow().clone()
    }

    pub fn selected_keys(&self) -> Vec<String> {
        self.selection.borrow().to_vec()
    }

    pub fn subscribe_selection(&self) -> watch::Receiver<SelectionSet> {
        self.selection.subscribe()
    }

    pub fn is_all_visible_selected(&self) -> bool {
        let view = self.view();
        self.selection
            .borrow()
            .is_all_visible_selected(view.visible.iter().map(Record::key))
    }

    pub fn status(&self) -> PollStatus {
        self.coordinator.status()
    }

    /// Refreshing, running a batch of any kind, or running a single-item
    /// operation.
    pub fn is_busy(&self) -> bool {
        self.coordinator.is_refreshing()
            || self.batches.any_running()
            || !self.operations.borrow().is_empty()
    }

    pub fn is_batch_running(&self, kind: K) -> bool {
        self.batches.is_running(kind)
    }

    pub fn is_operation_running(&self, operation: &str) -> bool {
        self.operations.borrow().contains(operation)
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    // ── Selection ───────────────────────────────────────────────────

    pub fn toggle_selection(&self, key: &str) -> bool {
        let mut now_selected = false;
        self.selection.send_modify(|sel| now_selected = sel.toggle(key));
        now_selected
    }

    pub fn set_selected(&self, key: &str, included: bool) {
        self.selection.send_if_modified(|sel| {
            if sel.contains(key) == included {
                return false;
            }
            sel.set(key, included);
            true
        });
    }

    /// Check or uncheck every visible record, leaving hidden selections
    /// alone.
    pub fn select_all_visible(&self, checked: bool) {
        let view = self.view();
        self.selection
            .send_modify(|sel| sel.select_all_visible(view.visible.iter().map(Record::key), checked));
    }

    pub fn clear_selection(&self) {
        self.selection.send_if_modified(|sel| {
            let changed = !sel.is_empty();
            sel.clear();
            changed
        });
    }

    // ── Filter ──────────────────────────────────────────────────────

    pub fn set_search(&self, search: &str) {
        self.filter.send_if_modified(|f| {
            if f.search == search {
                return false;
            }
            search.clone_into(&mut f.search);
            true
        });
    }

    pub fn set_status(&self, status: <S::Record as Listable>::Status) {
        self.filter
            .send_if_modified(|f| std::mem::replace(&mut f.status, status) != status);
    }

    pub fn set_sort(&self, key: <S::Record as Listable>::SortKey, direction: SortDirection) {
        self.filter.send_if_modified(|f| {
            let changed = f.sort_key != key || f.direction != direction;
            f.sort_key = key;
            f.direction = direction;
            changed
        });
    }

    /// Column-header behaviour: the same key flips direction, a new key
    /// sorts ascending.
    pub fn toggle_sort(&self, key: <S::Record as Listable>::SortKey) {
        self.filter.send_modify(|f| {
            if f.sort_key == key {
                f.direction = f.direction.toggled();
            } else {
                f.sort_key = key;
                f.direction = SortDirection::Asc;
            }
        });
    }

    pub fn reset_filters(&self) {
        self.filter.send_if_modified(|f| {
            let default = FilterFor::<S::Record>::default();
            let changed = *f != default;
            *f = default;
            changed
        });
    }

    // ── Operations ──────────────────────────────────────────────────

    /// Run a batch of `kind` over the selection and publish a notice.
    pub async fn run_batch(&self, kind: K) -> Result<BatchReport, CoreError>
    where
        S: BatchBackend<K>,
    {
        let result = self
            .batches
            .run(kind, &self.selection, self.coordinator.source(), &self.coordinator)
            .await;
        match &result {
            Ok(report) => self.notify(Notice::from_report(report)),
            Err(e) => self.notify(Notice::from_error(&kind.to_string(), e)),
        }
        result
    }

    /// Run a single-item operation under its own busy flag. Publishes a
    /// notice and, on success, refreshes the list.
    pub async fn run_operation<F>(&self, operation: &'static str, call: F) -> Result<String, CoreError>
    where
        F: Future<Output = Result<String, CoreError>> + Send,
    {
        match self.guarded(operation, call).await {
            Ok(message) => {
                info!(operation, "operation succeeded");
                self.notify(Notice::new(NoticeLevel::Success, format!("{operation} succeeded")).with_detail(&message));
                self.coordinator.refresh_now(RefreshMode::Visible).await;
                Ok(message)
            }
            Err(e) => Err(self.rejected(operation, e)),
        }
    }

    /// Run one call over explicit items, such as host files to upload,
    /// rather than over the selection. Shares the single-operation busy
    /// flag, reports per item like a batch, and refreshes afterwards.
    pub async fn run_items<F>(
        &self,
        operation: &'static str,
        keys: &[String],
        call: F,
    ) -> Result<BatchReport, CoreError>
    where
        F: Future<Output = Result<BatchResult, CoreError>> + Send,
    {
        if keys.is_empty() {
            return Err(self.reject(operation, "nothing to do"));
        }
        let result = match self.guarded(operation, call).await {
            Ok(result) => result,
            Err(e) => return Err(self.rejected(operation, e)),
        };
        let report = BatchReport::from_result(operation, keys, result, self.batches.failure_limit());
        info!(
            operation,
            succeeded = report.succeeded.len(),
            failed = report.failures.len(),
            "items finished"
        );
        self.notify(Notice::from_report(&report));
        self.coordinator.refresh_now(RefreshMode::Visible).await;
        Ok(report)
    }

    /// Hold `operation`'s busy flag and the operation timeout around `call`.
    /// Failures come back tagged with the operation name.
    async fn guarded<T, F>(&self, operation: &'static str, call: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, CoreError>> + Send,
    {
        if !self.operations.send_if_modified(|ops| ops.insert(operation)) {
            return Err(CoreError::OperationInProgress {
                operation: operation.to_owned(),
            });
        }
        let _guard = OperationGuard {
            operations: &self.operations,
            operation,
        };

        debug!(operation, "operation started");
        let result = match self.operation_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
                Err(CoreError::Timeout {
                    operation: operation.to_owned(),
                    timeout_secs: limit.as_secs(),
                })
            }),
            None => call.await,
        };
        result.map_err(|e| e.during(operation))
    }

    /// Reject an operation locally without calling the device.
    fn reject(&self, operation: &str, message: impl Into<String>) -> CoreError {
        self.rejected(
            operation,
            CoreError::InvalidInput {
                message: message.into(),
            },
        )
    }

    /// Publish a failure notice for `error` and hand it back.
    fn rejected(&self, operation: &str, error: CoreError) -> CoreError {
        self.notify(Notice::from_error(operation, &error));
        error
    }

    fn notify(&self, notice: Notice) {
        debug!(level = %notice.level, title = %notice.title, "notice");
        // No subscribers is fine.
        let _ = self.notices.send(notice);
    }
}

impl<S, K> Drop for ListController<S, K>
where
    S: RecordSource,
    S::Record: Listable,
    K: BatchKind,
{
    fn drop(&mut self) {
        self.coordinator.teardown();
    }
}

struct OperationGuard<'a> {
    operations: &'a watch::Sender<HashSet<&'static str>>,
    operation: &'static str,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        let operation = self.operation;
        self.operations.send_if_modified(|ops| ops.remove(operation));
    }
}
