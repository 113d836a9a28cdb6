// Raw records produced by the tool output parsers.
//
// These mirror what adb prints; `adbdeck-core` converts them into its
// domain model.

use serde::{Deserialize, Serialize};

/// One line of `adb devices` / `fastboot devices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub serial: String,
    /// State column as printed (`device`, `offline`, `unauthorized`, `fastboot`, ...).
    pub state: String,
}

/// One installed package, merged from the enabled and disabled listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    pub name: String,
    pub enabled: bool,
}

/// Entry type derived from the first character of the permission string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum RawFileKind {
    Directory,
    File,
    Symlink,
}

/// One line of `ls -lA`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFileEntry {
    pub name: String,
    pub kind: RawFileKind,
    /// Byte size; absent for symlinks and unparseable columns.
    pub size: Option<u64>,
    pub permissions: String,
    pub date: String,
    pub time: String,
}

/// Which packages `pm list packages` should report.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PackageScope {
    /// Third-party packages only (`-3`).
    #[default]
    User,
    /// System packages only (`-s`).
    System,
    /// Everything.
    All,
}

impl PackageScope {
    pub(crate) fn flag(self) -> Option<&'static str> {
        match self {
            Self::User => Some("-3"),
            Self::System => Some("-s"),
            Self::All => None,
        }
    }
}

/// Result of one item of a sequential batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub target: String,
    pub success: bool,
    /// Tool output on success, failure reason otherwise.
    pub message: String,
}

impl ItemOutcome {
    pub(crate) fn ok(target: &str, message: impl Into<String>) -> Self {
        Self {
            target: target.to_owned(),
            success: true,
            message: message.into(),
        }
    }

    pub(crate) fn failed(target: &str, message: impl Into<String>) -> Self {
        Self {
            target: target.to_owned(),
            success: false,
            message: message.into(),
        }
    }
}

/// Target of `adb reboot` / `fastboot reboot`. The empty string and
/// `system` both mean a normal boot.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RebootMode {
    #[default]
    #[strum(serialize = "system", serialize = "")]
    System,
    Recovery,
    Bootloader,
    Fastboot,
    Download,
    Edl,
    Sideload,
}

impl RebootMode {
    /// Argument appended to `reboot`; `None` for a normal boot.
    pub(crate) fn arg(self) -> Option<&'static str> {
        match self {
            Self::System => None,
            Self::Recovery => Some("recovery"),
            Self::Bootloader => Some("bootloader"),
            Self::Fastboot => Some("fastboot"),
            Self::Download => Some("download"),
            Self::Edl => Some("edl"),
            Self::Sideload => Some("sideload"),
        }
    }
}

/// Hardware and build summary of one adb device. Fields the device would
/// not report are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub serial: String,
    pub model: Option<String>,
    pub brand: Option<String>,
    pub codename: Option<String>,
    pub device_name: Option<String>,
    pub android_version: Option<String>,
    pub build_number: Option<String>,
    pub security_patch: Option<String>,
    /// Battery charge in percent.
    pub battery_level: Option<u8>,
    pub ram_total_kb: Option<u64>,
    pub storage_total_kb: Option<u64>,
    pub storage_used_kb: Option<u64>,
    /// IPv4 address of `wlan0`.
    pub ip_address: Option<String>,
    pub rooted: bool,
}
