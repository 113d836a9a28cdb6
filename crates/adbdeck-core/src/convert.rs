// ── API-to-domain conversions ──
//
// Turns the raw parser output of `adbdeck_api` into domain records.

use chrono::NaiveDateTime;

use adbdeck_api::{DeviceEntry, ItemOutcome, PackageEntry, RawFileEntry, RawFileKind};

use crate::batch::KeyOutcome;
use crate::model::{Device, DeviceMode, DeviceState, FileEntry, FileKind, Package};

/// Map an adb/fastboot state column onto [`DeviceState`].
fn parse_state(raw: &str) -> DeviceState {
    match raw {
        "device" => DeviceState::Ready,
        "offline" => DeviceState::Offline,
        "unauthorized" => DeviceState::Unauthorized,
        "recovery" => DeviceState::Recovery,
        "sideload" => DeviceState::Sideload,
        "bootloader" => DeviceState::Bootloader,
        "fastboot" => DeviceState::Fastboot,
        _ => DeviceState::Unknown,
    }
}

/// `ls` prints `YYYY-MM-DD HH:MM`; anything else is left unknown.
fn parse_modified(date: &str, time: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M").ok()
}

impl Device {
    pub fn from_entry(entry: DeviceEntry, mode: DeviceMode) -> Self {
        Self {
            state: parse_state(&entry.state),
            serial: entry.serial,
            mode,
        }
    }
}

impl From<PackageEntry> for Package {
    fn from(entry: PackageEntry) -> Self {
        Self {
            name: entry.name,
            enabled: entry.enabled,
        }
    }
}

impl From<RawFileKind> for FileKind {
    fn from(kind: RawFileKind) -> Self {
        match kind {
            RawFileKind::Directory => Self::Directory,
            RawFileKind::File => Self::File,
            RawFileKind::Symlink => Self::Symlink,
        }
    }
}

impl From<RawFileEntry> for FileEntry {
    fn from(raw: RawFileEntry) -> Self {
        Self {
            modified: parse_modified(&raw.date, &raw.time),
            name: raw.name,
            kind: raw.kind.into(),
            size: raw.size,
            permissions: raw.permissions,
        }
    }
}

/// Batch item outcomes carry the full device path as `target`; records
/// are keyed by name within the directory.
pub(crate) fn outcome_for_key(key: &str, outcome: ItemOutcome) -> KeyOutcome {
    if outcome.success {
        KeyOutcome::ok(key)
    } else {
        KeyOutcome::failed(key, outcome.message)
    }
}
