// ── Device operations ──
//
// Typed wrappers over the adb/fastboot commands the console issues.
// Every method is one request/response round trip (batch helpers run
// their items sequentially).

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Error;
use crate::executor::{Executor, Tool};
use crate::types::{
    DeviceEntry, DeviceInfo, ItemOutcome, PackageEntry, PackageScope, RawFileEntry, RebootMode,
};
use crate::{parse, validate};

/// Client for one adb server (and the fastboot tool beside it).
#[derive(Debug, Clone, Default)]
pub struct AdbClient {
    exec: Executor,
}

impl AdbClient {
    pub fn new(exec: Executor) -> Self {
        Self { exec }
    }

    pub fn executor(&self) -> &Executor {
        &self.exec
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub async fn devices(&self) -> Result<Vec<DeviceEntry>, Error> {
        let out = self.exec.run(Tool::Adb, &["devices"]).await?;
        Ok(parse::parse_devices(&out))
    }

    pub async fn fastboot_devices(&self) -> Result<Vec<DeviceEntry>, Error> {
        let out = self.exec.run(Tool::Fastboot, &["devices"]).await?;
        Ok(parse::parse_fastboot_devices(&out))
    }

    /// Collect build properties and live stats of one device. The queries
    /// run concurrently; a query that fails leaves its fields empty.
    pub async fn device_info(&self, serial: &str) -> Result<DeviceInfo, Error> {
        let on = Some(serial);
        let (props, battery, meminfo, df, inet, root) = tokio::join!(
            self.exec.shell(on, "getprop", &[]),
            self.exec.shell(on, "dumpsys battery", &[]),
            self.exec.shell(on, "cat /proc/meminfo", &[]),
            self.exec.shell(on, "df /data", &[]),
            self.exec.shell(on, "ip addr show wlan0", &[]),
            self.exec.shell(on, "su -c", &["id -u"]),
        );

        // Without properties the device is not answering at all.
        let props = parse::parse_getprop(&props?);
        let prop = |key: &str| props.get(key).cloned();
        let storage = df.ok().as_deref().and_then(parse::parse_df);

        let info = DeviceInfo {
            serial: prop("ro.serialno").unwrap_or_else(|| serial.to_owned()),
            model: prop("ro.product.model"),
            brand: prop("ro.product.brand"),
            codename: prop("ro.product.device"),
            device_name: prop("ro.product.name"),
            android_version: prop("ro.build.version.release"),
            build_number: prop("ro.build.id"),
            security_patch: prop("ro.build.version.security_patch"),
            battery_level: battery.ok().as_deref().and_then(parse::parse_battery_level),
            ram_total_kb: meminfo.ok().as_deref().and_then(parse::parse_mem_total_kb),
            storage_total_kb: storage.map(|(total, _)| total),
            storage_used_kb: storage.map(|(_, used)| used),
            ip_address: inet.ok().as_deref().and_then(parse::parse_inet),
            rooted: root.is_ok_and(|out| out.trim() == "0"),
        };
        debug!(serial, model = ?info.model, "device info collected");
        Ok(info)
    }

    /// `adb -s <serial> reboot [mode]`.
    pub async fn reboot(&self, serial: &str, mode: RebootMode) -> Result<String, Error> {
        let mut args = vec!["-s", serial, "reboot"];
        args.extend(mode.arg());
        info!(serial, %mode, "rebooting");
        self.exec.run(Tool::Adb, &args).await?;
        Ok(format!("Rebooting {serial} into {mode}"))
    }

    /// `fastboot -s <serial> reboot [mode]`; bootloader uses
    /// `reboot-bootloader`.
    pub async fn fastboot_reboot(&self, serial: &str, mode: RebootMode) -> Result<String, Error> {
        let mut args = vec!["-s", serial];
        match mode {
            RebootMode::Bootloader => args.push("reboot-bootloader"),
            other => {
                args.push("reboot");
                args.extend(other.arg());
            }
        }
        info!(serial, %mode, "rebooting from fastboot");
        self.exec.run(Tool::Fastboot, &args).await?;
        Ok(format!("Rebooting {serial} into {mode}"))
    }

    // ── Packages ─────────────────────────────────────────────────────

    /// List packages in `scope`, querying the enabled and disabled sets
    /// concurrently.
    pub async fn list_packages(&self, scope: PackageScope) -> Result<Vec<PackageEntry>, Error> {
        let (enabled, disabled) = tokio::join!(
            self.package_names("-e", scope),
            self.package_names("-d", scope),
        );
        let packages = parse::merge_packages(enabled?, disabled?);
        debug!(%scope, count = packages.len(), "listed packages");
        Ok(packages)
    }

    async fn package_names(&self, state_flag: &str, scope: PackageScope) -> Result<Vec<String>, Error> {
        let mut args = vec!["shell", "pm", "list", "packages", state_flag];
        args.extend(scope.flag());
        let out = self.exec.run(Tool::Adb, &args).await?;
        Ok(parse::parse_package_list(&out))
    }

    /// `adb install -r`, under the install deadline.
    pub async fn install(&self, apk: &Path) -> Result<String, Error> {
        let apk = apk.to_string_lossy();
        info!(apk = %apk, "installing package");
        let timeout = self.exec.config().install_timeout;
        let out = self
            .exec
            .run_with_timeout(Tool::Adb, &["install", "-r", &apk], timeout)
            .await?;
        if out.contains("Failure") {
            return Err(Error::CommandFailed { message: out });
        }
        Ok(out)
    }

    pub async fn uninstall(&self, package: &str) -> Result<String, Error> {
        validate::package_name(package)?;
        let out = self
            .exec
            .run(Tool::Adb, &["shell", "pm", "uninstall", package])
            .await?;
        if out.contains("Failure") {
            return Err(Error::CommandFailed { message: out });
        }
        Ok(out)
    }

    pub async fn enable(&self, package: &str) -> Result<String, Error> {
        validate::package_name(package)?;
        let out = self
            .exec
            .run(Tool::Adb, &["shell", "pm", "enable", "--user", "0", package])
            .await?;
        if out.contains("new state: enabled") {
            Ok(out)
        } else {
            Err(Error::CommandFailed {
                message: format!("failed to enable package {package}: {out}"),
            })
        }
    }

    pub async fn disable(&self, package: &str) -> Result<String, Error> {
        validate::package_name(package)?;
        let out = self
            .exec
            .run(Tool::Adb, &["shell", "pm", "disable-user", "--user", "0", package])
            .await?;
        if out.contains("new state:") {
            Ok(out)
        } else {
            Err(Error::CommandFailed {
                message: format!("failed to disable package {package}: {out}"),
            })
        }
    }

    pub async fn clear_data(&self, package: &str) -> Result<String, Error> {
        validate::package_name(package)?;
        let out = self
            .exec
            .run(Tool::Adb, &["shell", "pm", "clear", package])
            .await?;
        if out.contains("Failed") {
            return Err(Error::CommandFailed {
                message: format!("failed to clear data for {package}: {out}"),
            });
        }
        Ok("Data cleared successfully".into())
    }

    /// Resolve the base APK path of an installed package.
    pub async fn apk_path(&self, package: &str) -> Result<String, Error> {
        validate::package_name(package)?;
        let out = self
            .exec
            .run(Tool::Adb, &["shell", "pm", "path", package])
            .await?;
        parse::parse_apk_path(&out).ok_or_else(|| Error::PackagePathNotFound {
            package: package.to_owned(),
        })
    }

    /// Copy a package's base APK to `dest` on the host.
    pub async fn pull_apk(&self, package: &str, dest: &Path) -> Result<String, Error> {
        let remote = self.apk_path(package).await?;
        self.pull(&remote, dest).await?;
        Ok(format!("APK saved to {}", dest.display()))
    }

    // ── Files ────────────────────────────────────────────────────────

    pub async fn list_files(&self, dir: &str) -> Result<Vec<RawFileEntry>, Error> {
        let out = self.exec.shell(None, "ls -lA", &[dir]).await?;
        Ok(parse::parse_ls(&out))
    }

    pub async fn push(&self, local: &Path, remote: &str) -> Result<String, Error> {
        let local = local.to_string_lossy();
        let timeout = self.exec.config().transfer_timeout;
        self.exec
            .run_with_timeout(Tool::Adb, &["push", &local, remote], timeout)
            .await
    }

    pub async fn pull(&self, remote: &str, local: &Path) -> Result<String, Error> {
        let local = local.to_string_lossy();
        let timeout = self.exec.config().transfer_timeout;
        self.exec
            .run_with_timeout(Tool::Adb, &["pull", "-a", remote, &local], timeout)
            .await
    }

    pub async fn make_dir(&self, path: &str) -> Result<String, Error> {
        self.exec.shell(None, "mkdir -p", &[path]).await?;
        Ok(format!("Folder created: {path}"))
    }

    pub async fn delete(&self, path: &str) -> Result<String, Error> {
        self.exec.shell(None, "rm -rf", &[path]).await?;
        Ok(format!("Deleted: {path}"))
    }

    pub async fn rename(&self, from: &str, to: &str) -> Result<String, Error> {
        self.exec.shell(None, "mv", &[from, to]).await?;
        Ok(format!("Renamed {from} to {to}"))
    }

    /// Recursively copy `path` into the directory `dest_dir`.
    pub async fn copy(&self, path: &str, dest_dir: &str) -> Result<String, Error> {
        self.exec.shell(None, "cp -r", &[path, dest_dir]).await?;
        Ok(format!("Copied to {dest_dir}"))
    }

    /// Move `path` into the directory `dest_dir`.
    pub async fn move_into(&self, path: &str, dest_dir: &str) -> Result<String, Error> {
        self.exec.shell(None, "mv", &[path, dest_dir]).await?;
        Ok(format!("Moved to {dest_dir}"))
    }

    // ── Sequential batches ───────────────────────────────────────────

    pub async fn uninstall_many(&self, packages: &[String]) -> Vec<ItemOutcome> {
        let mut outcomes = Vec::with_capacity(packages.len());
        for pkg in packages {
            outcomes.push(outcome(pkg, self.uninstall(pkg).await));
        }
        outcomes
    }

    pub async fn enable_many(&self, packages: &[String]) -> Vec<ItemOutcome> {
        let mut outcomes = Vec::with_capacity(packages.len());
        for pkg in packages {
            outcomes.push(outcome(pkg, self.enable(pkg).await));
        }
        outcomes
    }

    /// Disable each package. Refusals from the package manager are
    /// reported as `(System app?)`.
    pub async fn disable_many(&self, packages: &[String]) -> Vec<ItemOutcome> {
        let mut outcomes = Vec::with_capacity(packages.len());
        for pkg in packages {
            let result = self.disable(pkg).await.map_err(|e| {
                let message = e.to_string();
                if message.contains("is not allowed") {
                    Error::CommandFailed {
                        message: "(System app?)".into(),
                    }
                } else {
                    e
                }
            });
            outcomes.push(outcome(pkg, result));
        }
        outcomes
    }

    pub async fn delete_many(&self, paths: &[String]) -> Vec<ItemOutcome> {
        let mut outcomes = Vec::with_capacity(paths.len());
        for path in paths {
            outcomes.push(outcome(path, self.delete(path).await));
        }
        outcomes
    }

    /// Pull each remote path into `dest_dir`.
    pub async fn pull_many(&self, paths: &[String], dest_dir: &Path) -> Vec<ItemOutcome> {
        let mut outcomes = Vec::with_capacity(paths.len());
        for path in paths {
            outcomes.push(outcome(path, self.pull(path, dest_dir).await));
        }
        outcomes
    }

    pub async fn copy_many(&self, paths: &[String], dest_dir: &str) -> Vec<ItemOutcome> {
        let mut outcomes = Vec::with_capacity(paths.len());
        for path in paths {
            outcomes.push(outcome(path, self.copy(path, dest_dir).await));
        }
        outcomes
    }

    pub async fn move_many(&self, paths: &[String], dest_dir: &str) -> Vec<ItemOutcome> {
        let mut outcomes = Vec::with_capacity(paths.len());
        for path in paths {
            outcomes.push(outcome(path, self.move_into(path, dest_dir).await));
        }
        outcomes
    }

    /// Push each host path into `remote_dir`. Outcomes are keyed by the
    /// host path as displayed.
    pub async fn push_many(&self, locals: &[PathBuf], remote_dir: &str) -> Vec<ItemOutcome> {
        let mut outcomes = Vec::with_capacity(locals.len());
        for local in locals {
            let target = local.display().to_string();
            outcomes.push(outcome(&target, self.push(local, remote_dir).await));
        }
        outcomes
    }
}

fn outcome(target: &str, result: Result<String, Error>) -> ItemOutcome {
    match result {
        Ok(message) => ItemOutcome::ok(target, message),
        Err(e) => {
            warn!(item = target, error = %e, "batch item failed");
            ItemOutcome::failed(target, e.to_string())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::executor::ExecutorConfig;

    /// An adb stand-in that appends its argument line to `calls.log`.
    #[cfg(unix)]
    fn logging_client(dir: &Path) -> AdbClient {
        use std::os::unix::fs::PermissionsExt;

        let adb = dir.join("adb");
        let log = dir.join("calls.log");
        let script = format!("#!/bin/sh\nprintf '%s\\n' \"$*\" >> '{}'\n", log.display());
        std::fs::write(&adb, script).unwrap();
        std::fs::set_permissions(&adb, std::fs::Permissions::from_mode(0o755)).unwrap();
        AdbClient::new(Executor::new(ExecutorConfig {
            adb_path: Some(adb),
            ..ExecutorConfig::default()
        }))
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_operations_accept_shell_separators_in_names() {
        let dir = tempfile::tempdir().unwrap();
        let client = logging_client(dir.path());

        client.delete("/sdcard/Tom & Jerry.mp4").await.unwrap();
        client.make_dir("/sdcard/R&D").await.unwrap();
        client.rename("/sdcard/a;b", "/sdcard/a|b").await.unwrap();
        let outcomes = client
            .copy_many(&["/sdcard/it's".into()], "/sdcard/Backup/")
            .await;
        assert!(outcomes[0].success);

        let calls = std::fs::read_to_string(dir.path().join("calls.log")).unwrap();
        assert_eq!(
            calls,
            "shell rm -rf '/sdcard/Tom & Jerry.mp4'\n\
             shell mkdir -p '/sdcard/R&D'\n\
             shell mv '/sdcard/a;b' '/sdcard/a|b'\n\
             shell cp -r '/sdcard/it'\\''s' '/sdcard/Backup/'\n"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn reboot_targets_one_serial() {
        let dir = tempfile::tempdir().unwrap();
        let client = logging_client(dir.path());

        client.reboot("R58M123", RebootMode::Recovery).await.unwrap();
        client.reboot("R58M123", RebootMode::System).await.unwrap();

        let calls = std::fs::read_to_string(dir.path().join("calls.log")).unwrap();
        assert_eq!(calls, "-s R58M123 reboot recovery\n-s R58M123 reboot\n");
    }

    #[test]
    fn outcome_maps_result() {
        let ok = outcome("a", Ok("Success".into()));
        assert!(ok.success);
        assert_eq!(ok.message, "Success");

        let failed = outcome(
            "b",
            Err(Error::CommandFailed {
                message: "busy".into(),
            }),
        );
        assert!(!failed.success);
        assert_eq!(failed.target, "b");
        assert_eq!(failed.message, "busy");
    }

    #[tokio::test]
    async fn malformed_package_names_never_reach_adb() {
        // No binary is configured or needed: validation fails first.
        let client = AdbClient::default();
        for result in [
            client.clear_data("x;reboot").await,
            client.uninstall("com.app && reboot").await,
            client.apk_path("$(id)").await,
        ] {
            assert!(matches!(result, Err(Error::InvalidPackageName { .. })));
        }
    }

    #[test]
    fn reboot_mode_parsing() {
        assert_eq!("".parse::<RebootMode>().ok(), Some(RebootMode::System));
        assert_eq!("Recovery".parse::<RebootMode>().ok(), Some(RebootMode::Recovery));
        assert!("reboot; rm".parse::<RebootMode>().is_err());
        assert_eq!(RebootMode::System.to_string(), "system");
        assert_eq!(RebootMode::System.arg(), None);
        assert_eq!(RebootMode::Edl.arg(), Some("edl"));
    }

    #[test]
    fn scope_flags() {
        assert_eq!(PackageScope::User.flag(), Some("-3"));
        assert_eq!(PackageScope::System.flag(), Some("-s"));
        assert_eq!(PackageScope::All.flag(), None);
        assert_eq!("system".parse::<PackageScope>().ok(), Some(PackageScope::System));
    }
}
