// ── Tool output parsers ──
//
// Pure functions over the text adb/fastboot print. No I/O.

use std::collections::BTreeMap;

use crate::types::{DeviceEntry, PackageEntry, RawFileEntry, RawFileKind};

const PACKAGE_PREFIX: &str = "package:";

/// Parse `adb devices`. The header line and any line that is not exactly
/// `<serial> <state>` are skipped.
pub fn parse_devices(output: &str) -> Vec<DeviceEntry> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next(), fields.next()) {
                (Some(serial), Some(state), None) => Some(DeviceEntry {
                    serial: serial.to_owned(),
                    state: state.to_owned(),
                }),
                _ => None,
            }
        })
        .collect()
}

/// Parse `fastboot devices`. There is no header; the state column is
/// optional and defaults to `fastboot`.
pub fn parse_fastboot_devices(output: &str) -> Vec<DeviceEntry> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let serial = fields.next()?;
            Some(DeviceEntry {
                serial: serial.to_owned(),
                state: fields.next().unwrap_or("fastboot").to_owned(),
            })
        })
        .collect()
}

/// Extract package names from `pm list packages` output.
pub fn parse_package_list(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix(PACKAGE_PREFIX))
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Merge the enabled (`-e`) and disabled (`-d`) listings into one list
/// ordered by package name. A package in both lists counts as disabled.
pub fn merge_packages(enabled: Vec<String>, disabled: Vec<String>) -> Vec<PackageEntry> {
    let mut merged: BTreeMap<String, bool> = BTreeMap::new();
    for name in enabled {
        merged.insert(name, true);
    }
    for name in disabled {
        merged.insert(name, false);
    }
    merged
        .into_iter()
        .map(|(name, enabled)| PackageEntry { name, enabled })
        .collect()
}

/// Extract the APK path from `pm path <package>`. Split APKs print several
/// lines; the first is the base APK.
pub fn parse_apk_path(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(PACKAGE_PREFIX))
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(str::to_owned)
}

/// Parse `ls -lA`.
///
/// Toybox prints `perm links owner group size date time name`. Lines are
/// split on runs of whitespace into at most 8 columns and the last one is
/// the name, verbatim, so names with spaces survive. `total` lines and
/// lines with fewer than 8 columns are skipped. Symlink targets (`name -> target`) are
/// stripped and symlinks carry no size.
pub fn parse_ls(output: &str) -> Vec<RawFileEntry> {
    output
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with("total"))
        .filter_map(parse_ls_line)
        .collect()
}

fn parse_ls_line(line: &str) -> Option<RawFileEntry> {
    let parts = split_fields(line, 8);
    if parts.len() < 8 {
        return None;
    }

    let permissions = parts[0];
    let kind = match permissions.chars().next() {
        Some('d') => RawFileKind::Directory,
        Some('l') => RawFileKind::Symlink,
        _ => RawFileKind::File,
    };

    let date = parts[5].to_owned();
    let time = parts[6].to_owned();
    let mut name = parts[7].to_owned();

    if kind == RawFileKind::Symlink {
        if let Some((link, _target)) = name.split_once(" -> ") {
            name = link.to_owned();
        }
    }

    let size = match kind {
        RawFileKind::Symlink => None,
        _ => parts[4].parse().ok(),
    };

    Some(RawFileEntry {
        name,
        kind,
        size,
        permissions: permissions.to_owned(),
        date,
        time,
    })
}

// ── Device info ─────────────────────────────────────────────────────

/// Parse a full `getprop` dump of `[key]: [value]` lines. Empty values
/// are dropped.
pub fn parse_getprop(output: &str) -> BTreeMap<String, String> {
    output
        .lines()
        .filter_map(|line| {
            let (key, value) = line.trim().split_once("]: [")?;
            let key = key.strip_prefix('[')?;
            let value = value.strip_suffix(']')?.trim();
            (!value.is_empty()).then(|| (key.to_owned(), value.to_owned()))
        })
        .collect()
}

/// `level: 87` from `dumpsys battery`.
pub fn parse_battery_level(output: &str) -> Option<u8> {
    output.lines().find_map(|line| {
        let (key, value) = line.trim().split_once(':')?;
        if key.trim() != "level" {
            return None;
        }
        value.trim().parse().ok()
    })
}

/// `MemTotal:  7834412 kB` from `/proc/meminfo`.
pub fn parse_mem_total_kb(output: &str) -> Option<u64> {
    output.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("MemTotal:")?;
        rest.split_whitespace().next()?.parse().ok()
    })
}

/// `(total, used)` in 1K blocks from the first data row of `df`.
pub fn parse_df(output: &str) -> Option<(u64, u64)> {
    let row = output.lines().nth(1)?;
    let mut fields = row.split_whitespace().skip(1);
    let total = fields.next()?.parse().ok()?;
    let used = fields.next()?.parse().ok()?;
    Some((total, used))
}

/// First IPv4 address from `ip addr show <iface>`.
pub fn parse_inet(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("inet ")?;
        let cidr = rest.split_whitespace().next()?;
        let addr = cidr.split('/').next()?;
        addr.parse::<std::net::Ipv4Addr>().ok().map(|ip| ip.to_string())
    })
}

/// Split on whitespace runs into at most `limit` fields; the last field
/// keeps the remainder of the line verbatim.
fn split_fields(line: &str, limit: usize) -> Vec<&str> {
    let mut fields = Vec::with_capacity(limit);
    let mut rest = line.trim_start();
    while !rest.is_empty() {
        if fields.len() + 1 == limit {
            fields.push(rest);
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                fields.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                fields.push(rest);
                break;
            }
        }
    }
    fields
}
