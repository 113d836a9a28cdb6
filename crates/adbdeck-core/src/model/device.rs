// ── Device domain types ──

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::record::{Listable, Record};

/// Which tool reported the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceMode {
    Adb,
    Fastboot,
}

/// Connection state as reported by adb or fastboot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[non_exhaustive]
pub enum DeviceState {
    /// `device`: authorized and usable.
    Ready,
    Offline,
    Unauthorized,
    Recovery,
    Sideload,
    Bootloader,
    Fastboot,
    Unknown,
}

impl DeviceState {
    /// Whether commands can be issued to the device.
    pub fn is_ready(self) -> bool {
        matches!(
            self,
            Self::Ready | Self::Recovery | Self::Sideload | Self::Bootloader | Self::Fastboot
        )
    }
}

/// A connected device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub serial: String,
    pub state: DeviceState,
    pub mode: DeviceMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DeviceStatusFilter {
    #[default]
    All,
    Ready,
    Unavailable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DeviceSortKey {
    #[default]
    Serial,
    State,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeviceStats {
    pub total: usize,
    pub ready: usize,
    pub unavailable: usize,
}

impl Record for Device {
    fn key(&self) -> &str {
        &self.serial
    }

    fn search_text(&self) -> &str {
        &self.serial
    }
}

impl Listable for Device {
    type Status = DeviceStatusFilter;
    type SortKey = DeviceSortKey;
    type Stats = DeviceStats;

    fn matches_status(&self, status: DeviceStatusFilter) -> bool {
        match status {
            DeviceStatusFilter::All => true,
            DeviceStatusFilter::Ready => self.state.is_ready(),
            DeviceStatusFilter::Unavailable => !self.state.is_ready(),
        }
    }

    fn compare(&self, other: &Self, key: DeviceSortKey) -> Ordering {
        match key {
            DeviceSortKey::Serial => self.serial.cmp(&other.serial),
            DeviceSortKey::State => self.state.to_string().cmp(&other.state.to_string()),
        }
    }

    fn tally(stats: &mut DeviceStats, record: &Self) {
        stats.total += 1;
        if record.state.is_ready() {
            stats.ready += 1;
        } else {
            stats.unavailable += 1;
        }
    }
}
