// ── Domain model ──
//
// Canonical record types for the three list views. Each implements
// `Listable` so the generic filter/selection/batch machinery applies.

pub mod device;
pub mod file;
pub mod package;

pub use device::{Device, DeviceMode, DeviceSortKey, DeviceState, DeviceStats, DeviceStatusFilter};
pub use file::{FileEntry, FileKind, FileSortKey, FileStats, FileStatusFilter};
pub use package::{Package, PackageSortKey, PackageStats, PackageStatusFilter};
