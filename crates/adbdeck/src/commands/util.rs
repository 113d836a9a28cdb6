//! Shared helpers for command handlers.

use std::collections::HashSet;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use adbdeck_core::{
    BatchBackend, BatchKind, BatchOutcome, BatchReport, ListController, Listable, Notice,
    NoticeLevel, Record, RecordSource, RefreshOutcome,
};

use crate::error::CliError;
use crate::output::Printer;

/// Load the first snapshot of a view, surfacing a failed listing as an error.
pub async fn load<S, K>(view: &ListController<S, K>) -> Result<(), CliError>
where
    S: RecordSource,
    S::Record: Listable,
    K: BatchKind,
{
    match view.refresh_now().await {
        RefreshOutcome::Failed(e) => Err(e.into()),
        RefreshOutcome::Cancelled => Err(CliError::Cancelled {
            message: format!("listing {} cancelled", view.source().label()),
        }),
        outcome => {
            debug!(?outcome, count = view.records().len(), "loaded");
            Ok(())
        }
    }
}

/// Select `keys` in a freshly loaded view. Every key must name a record.
pub fn select_known<S, K>(
    view: &ListController<S, K>,
    keys: &[String],
    resource_type: &str,
    list_command: &str,
) -> Result<(), CliError>
where
    S: RecordSource,
    S::Record: Listable,
    K: BatchKind,
{
    let records = view.records();
    let known: HashSet<&str> = records.iter().map(Record::key).collect();
    if let Some(missing) = keys.iter().find(|k| !known.contains(k.as_str())) {
        return Err(CliError::NotFound {
            resource_type: resource_type.into(),
            identifier: missing.clone(),
            list_command: list_command.into(),
        });
    }
    for key in keys {
        view.set_selected(key, true);
    }
    Ok(())
}

/// Run a batch over the current selection, print the report, and fail the
/// process unless every key succeeded.
pub async fn run_batch<S, K>(view: &ListController<S, K>, kind: K, printer: &Printer) -> Result<(), CliError>
where
    S: RecordSource + BatchBackend<K>,
    S::Record: Listable,
    K: BatchKind,
{
    let report = view.run_batch(kind).await?;
    finish(&report, printer)
}

/// Print a batch report and turn anything short of full success into an
/// error.
pub fn finish(report: &BatchReport, printer: &Printer) -> Result<(), CliError> {
    printer.report(report)?;
    match report.outcome() {
        BatchOutcome::AllSucceeded => Ok(()),
        BatchOutcome::Partial | BatchOutcome::AllFailed => Err(CliError::BatchFailed {
            headline: format!("{}: {}", report.kind, report.headline()),
        }),
    }
}

/// Refuse a destructive action unless `--yes` was passed.
pub fn confirm(action: &str, yes: bool) -> Result<(), CliError> {
    if yes {
        Ok(())
    } else {
        Err(CliError::ConfirmationRequired {
            action: action.into(),
        })
    }
}

/// Forward controller notices to the log until the channel closes.
pub async fn log_notices(mut notices: broadcast::Receiver<Notice>) {
    loop {
        match notices.recv().await {
            Ok(notice) => match notice.level {
                NoticeLevel::Info | NoticeLevel::Success => info!(%notice),
                NoticeLevel::Warning | NoticeLevel::Error => warn!(%notice),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "notices dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
