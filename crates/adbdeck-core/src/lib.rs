//! Reactive list layer between `adbdeck-api` and UI consumers.
//!
//! Every screen in adbdeck is a list of records pulled from a device that
//! changes underneath it. This crate owns the machinery those screens share:
//!
//! - **[`RefreshCoordinator`]**: single-flight polling of a [`RecordSource`]
//!   with one trailing refresh for overlapping requests, a per-call timeout,
//!   and hysteresis that holds back a lone empty result.
//!
//! - **[`compute_visible`]**: pure search, status filter and stable sort over
//!   a snapshot, with stats computed over the full record set.
//!
//! - **[`SelectionSet`]**: ordered multi-selection keyed by record identity,
//!   preserved across filter changes and reconciled against each
//!   authoritative snapshot.
//!
//! - **[`BatchOrchestrator`]**: runs one bulk operation per kind over the
//!   selection, reports per-key failures, then reloads.
//!
//! - **[`ListController`]**: ties the above together for the device,
//!   package and file views ([`DevicesView`], [`PackagesView`], [`FilesView`]).

pub mod batch;
pub mod client;
pub mod config;
mod convert;
pub mod error;
pub mod filter;
pub mod list;
pub mod model;
pub mod record;
pub mod refresh;
pub mod selection;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use batch::{
    BatchBackend, BatchFailure, BatchKind, BatchOrchestrator, BatchOutcome, BatchReport,
    BatchResult, KeyOutcome, Reload,
};
pub use client::DeviceClient;
pub use config::{BatchConfig, CoordinatorConfig, SessionConfig};
pub use error::CoreError;
pub use filter::{FilterFor, FilterState, FilteredView, SortDirection, compute_visible};
pub use list::{
    DeviceSource, DevicesView, FileBatch, FileSource, FilesView, ListController, NoBatch, Notice,
    NoticeLevel, PackageBatch, PackageSource, PackagesView,
};
pub use record::{Listable, Record};
pub use refresh::{PollStatus, RecordSource, RefreshCoordinator, RefreshMode, RefreshOutcome};
pub use selection::SelectionSet;
pub use stream::RecordStream;

pub use model::{
    Device, DeviceMode, DeviceSortKey, DeviceState, DeviceStats, DeviceStatusFilter, FileEntry,
    FileKind, FileSortKey, FileStats, FileStatusFilter, Package, PackageSortKey, PackageStats,
    PackageStatusFilter,
};

// Part of the list views' public surface.
pub use adbdeck_api::{DeviceInfo, PackageScope, RebootMode};
