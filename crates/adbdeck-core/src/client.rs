// ── Device client seam ──
//
// The device calls the list controllers make. `AdbClient` is the real
// implementation; tests drive the controllers with an in-memory device.

use std::future::Future;
use std::path::{Path, PathBuf};

use adbdeck_api::{
    AdbClient, DeviceEntry, DeviceInfo, Error, ItemOutcome, PackageEntry, PackageScope,
    RawFileEntry, RebootMode,
};

pub trait DeviceClient: Send + Sync + 'static {
    // ── Devices ──
    fn devices(&self) -> impl Future<Output = Result<Vec<DeviceEntry>, Error>> + Send;
    fn fastboot_devices(&self) -> impl Future<Output = Result<Vec<DeviceEntry>, Error>> + Send;
    fn device_info(&self, serial: &str) -> impl Future<Output = Result<DeviceInfo, Error>> + Send;
    fn reboot(&self, serial: &str, mode: RebootMode) -> impl Future<Output = Result<String, Error>> + Send;
    fn fastboot_reboot(
        &self,
        serial: &str,
        mode: RebootMode,
    ) -> impl Future<Output = Result<String, Error>> + Send;

    // ── Packages ──
    fn list_packages(
        &self,
        scope: PackageScope,
    ) -> impl Future<Output = Result<Vec<PackageEntry>, Error>> + Send;
    fn install(&self, apk: &Path) -> impl Future<Output = Result<String, Error>> + Send;
    fn enable(&self, package: &str) -> impl Future<Output = Result<String, Error>> + Send;
    fn disable(&self, package: &str) -> impl Future<Output = Result<String, Error>> + Send;
    fn clear_data(&self, package: &str) -> impl Future<Output = Result<String, Error>> + Send;
    fn pull_apk(&self, package: &str, dest: &Path) -> impl Future<Output = Result<String, Error>> + Send;
    fn uninstall_many(&self, packages: &[String]) -> impl Future<Output = Vec<ItemOutcome>> + Send;
    fn enable_many(&self, packages: &[String]) -> impl Future<Output = Vec<ItemOutcome>> + Send;
    fn disable_many(&self, packages: &[String]) -> impl Future<Output = Vec<ItemOutcome>> + Send;

    // ── Files ──
    fn list_files(&self, dir: &str) -> impl Future<Output = Result<Vec<RawFileEntry>, Error>> + Send;
    fn make_dir(&self, path: &str) -> impl Future<Output = Result<String, Error>> + Send;
    fn rename(&self, from: &str, to: &str) -> impl Future<Output = Result<String, Error>> + Send;
    fn pull(&self, remote: &str, local: &Path) -> impl Future<Output = Result<String, Error>> + Send;
    fn delete_many(&self, paths: &[String]) -> impl Future<Output = Vec<ItemOutcome>> + Send;
    fn pull_many(&self, paths: &[String], dest_dir: &Path) -> impl Future<Output = Vec<ItemOutcome>> + Send;
    fn copy_many(&self, paths: &[String], dest_dir: &str) -> impl Future<Output = Vec<ItemOutcome>> + Send;
    fn move_many(&self, paths: &[String], dest_dir: &str) -> impl Future<Output = Vec<ItemOutcome>> + Send;
    fn push_many(
        &self,
        locals: &[PathBuf],
        remote_dir: &str,
    ) -> impl Future<Output = Vec<ItemOutcome>> + Send;
}

impl DeviceClient for AdbClient {
    fn devices(&self) -> impl Future<Output = Result<Vec<DeviceEntry>, Error>> + Send {
        AdbClient::devices(self)
    }

    fn fastboot_devices(&self) -> impl Future<Output = Result<Vec<DeviceEntry>, Error>> + Send {
        AdbClient::fastboot_devices(self)
    }

    fn device_info(&self, serial: &str) -> impl Future<Output = Result<DeviceInfo, Error>> + Send {
        AdbClient::device_info(self, serial)
    }

    fn reboot(&self, serial: &str, mode: RebootMode) -> impl Future<Output = Result<String, Error>> + Send {
        AdbClient::reboot(self, serial, mode)
    }

    fn fastboot_reboot(
        &self,
        serial: &str,
        mode: RebootMode,
    ) -> impl Future<Output = Result<String, Error>> + Send {
        AdbClient::fastboot_reboot(self, serial, mode)
    }

    fn list_packages(
        &self,
        scope: PackageScope,
    ) -> impl Future<Output = Result<Vec<PackageEntry>, Error>> + Send {
        AdbClient::list_packages(self, scope)
    }

    fn install(&self, apk: &Path) -> impl Future<Output = Result<String, Error>> + Send {
        AdbClient::install(self, apk)
    }

    fn enable(&self, package: &str) -> impl Future<Output = Result<String, Error>> + Send {
        AdbClient::enable(self, package)
    }

    fn disable(&self, package: &str) -> impl Future<Output = Result<String, Error>> + Send {
        AdbClient::disable(self, package)
    }

    fn clear_data(&self, package: &str) -> impl Future<Output = Result<String, Error>> + Send {
        AdbClient::clear_data(self, package)
    }

    fn pull_apk(&self, package: &str, dest: &Path) -> impl Future<Output = Result<String, Error>> + Send {
        AdbClient::pull_apk(self, package, dest)
    }

    fn uninstall_many(&self, packages: &[String]) -> impl Future<Output = Vec<ItemOutcome>> + Send {
        AdbClient::uninstall_many(self, packages)
    }

    fn enable_many(&self, packages: &[String]) -> impl Future<Output = Vec<ItemOutcome>> + Send {
        AdbClient::enable_many(self, packages)
    }

    fn disable_many(&self, packages: &[String]) -> impl Future<Output = Vec<ItemOutcome>> + Send {
        AdbClient::disable_many(self, packages)
    }

    fn list_files(&self, dir: &str) -> impl Future<Output = Result<Vec<RawFileEntry>, Error>> + Send {
        AdbClient::list_files(self, dir)
    }

    fn make_dir(&self, path: &str) -> impl Future<Output = Result<String, Error>> + Send {
        AdbClient::make_dir(self, path)
    }

    fn rename(&self, from: &str, to: &str) -> impl Future<Output = Result<String, Error>> + Send {
        AdbClient::rename(self, from, to)
    }

    fn pull(&self, remote: &str, local: &Path) -> impl Future<Output = Result<String, Error>> + Send {
        AdbClient::pull(self, remote, local)
    }

    fn delete_many(&self, paths: &[String]) -> impl Future<Output = Vec<ItemOutcome>> + Send {
        AdbClient::delete_many(self, paths)
    }

    fn pull_many(&self, paths: &[String], dest_dir: &Path) -> impl Future<Output = Vec<ItemOutcome>> + Send {
        AdbClient::pull_many(self, paths, dest_dir)
    }

    fn copy_many(&self, paths: &[String], dest_dir: &str) -> impl Future<Output = Vec<ItemOutcome>> + Send {
        AdbClient::copy_many(self, paths, dest_dir)
    }

    fn move_many(&self, paths: &[String], dest_dir: &str) -> impl Future<Output = Vec<ItemOutcome>> + Send {
        AdbClient::move_many(self, paths, dest_dir)
    }

    fn push_many(
        &self,
        locals: &[PathBuf],
        remote_dir: &str,
    ) -> impl Future<Output = Vec<ItemOutcome>> + Send {
        AdbClient::push_many(self, locals, remote_dir)
    }
}
