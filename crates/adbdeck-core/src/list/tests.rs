use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use adbdeck_api::{
    DeviceEntry, DeviceInfo, Error, ItemOutcome, PackageEntry, PackageScope, RawFileEntry,
    RawFileKind, RebootMode,
};
use pretty_assertions::assert_eq;

use super::*;
use crate::batch::{BatchResult, KeyOutcome};
use crate::client::DeviceClient;
use crate::model::{Package, PackageStatusFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
enum Kind {
    Uninstall,
    Disable,
}

/// In-memory package manager. Uninstall removes packages unless they are
/// listed in `refuse`.
#[derive(Default)]
struct FakeDevice {
    installed: Mutex<Vec<Package>>,
    refuse: Vec<&'static str>,
    enumerations: AtomicUsize,
    batch_delay: Duration,
    /// Results returned instead of the installed list, oldest first.
    script: Mutex<Vec<Vec<Package>>>,
}

impl FakeDevice {
    fn with(names: &[&str]) -> Self {
        Self {
            installed: Mutex::new(names.iter().map(|n| pkg(n, true)).collect()),
            ..Self::default()
        }
    }
}

fn pkg(name: &str, enabled: bool) -> Package {
    Package {
        name: name.into(),
        enabled,
    }
}

impl RecordSource for FakeDevice {
    type Record = Package;

    fn label(&self) -> &'static str {
        "packages"
    }

    async fn enumerate(&self) -> Result<Vec<Package>, CoreError> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            Ok(self.installed.lock().unwrap().clone())
        } else {
            Ok(script.remove(0))
        }
    }
}

impl BatchBackend<Kind> for FakeDevice {
    async fn run_batch(&self, kind: Kind, keys: &[String]) -> Result<BatchResult, CoreError> {
        tokio::time::sleep(self.batch_delay).await;
        let mut installed = self.installed.lock().unwrap();
        let outcomes = keys
            .iter()
            .map(|key| {
                if self.refuse.iter().any(|r| r == key) {
                    return KeyOutcome::failed(key.clone(), "busy");
                }
                match kind {
                    Kind::Uninstall => installed.retain(|p| &p.name != key),
                    Kind::Disable => installed
                        .iter_mut()
                        .filter(|p| &p.name == key)
                        .for_each(|p| p.enabled = false),
                }
                KeyOutcome::ok(key.clone())
            })
            .collect();
        Ok(BatchResult::PerKey(outcomes))
    }
}

type View = ListController<FakeDevice, Kind>;

fn view(device: FakeDevice) -> View {
    ListController::new(device, CoordinatorConfig::default(), BatchConfig::default())
}

fn visible(v: &View) -> Vec<String> {
    v.view().visible.iter().map(|p| p.name.clone()).collect()
}

#[tokio::test(start_paused = true)]
async fn partial_batch_end_to_end() {
    let v = view(FakeDevice {
        refuse: vec!["B"],
        ..FakeDevice::with(&["A", "B", "C"])
    });
    let mut notices = v.notices();
    v.refresh_now().await;
    for key in ["A", "B", "C"] {
        v.toggle_selection(key);
    }

    let report = v.run_batch(Kind::Uninstall).await.unwrap();

    assert_eq!(report.headline(), "2/3 succeeded");
    assert_eq!(v.selected_keys(), vec!["B"]);
    assert_eq!(visible(&v), vec!["B"]);
    assert_eq!(v.source().enumerations.load(Ordering::SeqCst), 2);

    let notice = notices.recv().await.unwrap();
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert_eq!(notice.title, "uninstall: 2/3 succeeded");
    assert!(notice.detail.unwrap().contains("B: busy"));
}

#[tokio::test(start_paused = true)]
async fn empty_selection_is_a_local_warning() {
    let v = view(FakeDevice::with(&["A"]));
    let mut notices = v.notices();
    v.refresh_now().await;

    let err = v.run_batch(Kind::Disable).await.unwrap_err();
    assert!(matches!(err, CoreError::NoSelection));
    assert_eq!(notices.recv().await.unwrap().level, NoticeLevel::Warning);
    assert_eq!(v.source().enumerations.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn selection_survives_filter_round_trip() {
    let v = view(FakeDevice::with(&["com.alpha", "com.beta", "org.gamma"]));
    v.refresh_now().await;
    v.toggle_selection("org.gamma");

    v.set_search("com.");
    assert_eq!(visible(&v), vec!["com.alpha", "com.beta"]);
    assert!(!v.is_all_visible_selected());
    v.select_all_visible(true);
    assert!(v.is_all_visible_selected());

    v.reset_filters();
    assert_eq!(v.selected_keys(), vec!["org.gamma", "com.alpha", "com.beta"]);

    v.set_status(PackageStatusFilter::Disabled);
    assert!(visible(&v).is_empty());
    assert!(!v.is_all_visible_selected());
    v.select_all_visible(false);
    assert_eq!(v.selected_keys().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn selection_reconciled_only_on_authoritative_snapshots() {
    let device = FakeDevice::with(&[]);
    *device.script.lock().unwrap() = vec![
        vec![pkg("A", true), pkg("B", true)],
        vec![],
        vec![],
        vec![pkg("B", true)],
    ];
    let v = view(device);

    v.refresh_now().await;
    v.toggle_selection("A");
    v.toggle_selection("B");
    v.toggle_selection("ghost");
    assert_eq!(v.selected_keys().len(), 3);

    // A single empty poll is held back and must not wipe the selection.
    v.refresh_now().await;
    assert_eq!(v.selected_keys(), vec!["A", "B", "ghost"]);

    // Confirmed empty snapshot is authoritative.
    v.refresh_now().await;
    assert!(v.selected_keys().is_empty());

    v.refresh_now().await;
    v.toggle_selection("B");
    assert_eq!(v.selected_keys(), vec!["B"]);
}

#[tokio::test(start_paused = true)]
async fn busy_while_batch_runs() {
    let v = view(FakeDevice {
        batch_delay: Duration::from_secs(2),
        ..FakeDevice::with(&["A"])
    });
    v.refresh_now().await;
    v.toggle_selection("A");
    assert!(!v.is_busy());

    let batch = v.run_batch(Kind::Disable);
    let observe = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let busy = v.is_busy();
        let running = v.is_batch_running(Kind::Disable);
        let other_kind_running = v.is_batch_running(Kind::Uninstall);
        (busy, running, other_kind_running)
    };
    let (report, (busy, running, other)) = tokio::join!(batch, observe);

    assert!(report.is_ok());
    assert!(busy && running && !other);
    assert!(!v.is_busy());
    assert!(!v.records()[0].enabled);
}

#[tokio::test(start_paused = true)]
async fn single_operation_flag_and_notice() {
    let v = view(FakeDevice::with(&["A"]));
    let mut notices = v.notices();

    let slow = v.run_operation("install", async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok("Success".to_owned())
    });
    let second = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(v.is_operation_running("install"));
        assert!(v.is_busy());
        v.run_operation("install", async { Ok(String::new()) }).await
    };
    let (first, second) = tokio::join!(slow, second);

    assert_eq!(first.unwrap(), "Success");
    assert!(matches!(second, Err(CoreError::OperationInProgress { .. })));
    assert!(!v.is_operation_running("install"));
    // The successful operation refreshed the list.
    assert_eq!(v.source().enumerations.load(Ordering::SeqCst), 1);

    let levels: Vec<NoticeLevel> = [notices.recv().await.unwrap(), notices.recv().await.unwrap()]
        .iter()
        .map(|n| n.level)
        .collect();
    assert_eq!(levels, vec![NoticeLevel::Warning, NoticeLevel::Success]);
}

#[tokio::test(start_paused = true)]
async fn failed_operation_does_not_refresh() {
    let v = view(FakeDevice::with(&["A"]));
    let err = v
        .run_operation("clear data", async {
            Err(CoreError::Rejected {
                operation: "command".into(),
                message: "Failed".into(),
            })
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "clear data failed: Failed");
    assert_eq!(v.source().enumerations.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn toggle_sort_flips_direction() {
    let v = view(FakeDevice::with(&["b", "a", "c"]));
    v.refresh_now().await;
    assert_eq!(visible(&v), vec!["a", "b", "c"]);
    v.toggle_sort(crate::model::PackageSortKey::Name);
    assert_eq!(visible(&v), vec!["c", "b", "a"]);
    v.reset_filters();
    assert_eq!(v.filter(), FilterFor::<Package>::default());
}

#[tokio::test(start_paused = true)]
async fn drop_tears_down_polling() {
    let v = view(FakeDevice::with(&["A"]));
    v.start();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let coordinator = v.coordinator().clone();
    drop(v);
    assert!(coordinator.is_torn_down());
    let calls = coordinator.source().enumerations.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(coordinator.source().enumerations.load(Ordering::SeqCst), calls);
}

// ── Views over an in-memory device ──────────────────────────────────

/// Device behind the client seam. `dirs` maps a directory path with a
/// trailing `/` to the names it holds. Every call other than a listing is
/// recorded in `calls`.
#[derive(Default)]
struct FakeClient {
    devices: Vec<DeviceEntry>,
    dirs: Mutex<HashMap<String, Vec<String>>>,
    /// Listing this directory takes a second.
    slow_dir: Option<&'static str>,
    /// Listing this scope takes a second.
    slow_scope: Option<PackageScope>,
    /// Item targets that fail.
    failing: Vec<&'static str>,
    calls: Mutex<Vec<String>>,
}

impl FakeClient {
    fn with_dirs(dirs: &[(&str, &[&str])]) -> Self {
        let dirs = dirs
            .iter()
            .map(|(dir, names)| ((*dir).to_owned(), names.iter().map(|n| (*n).to_owned()).collect()))
            .collect();
        Self {
            dirs: Mutex::new(dirs),
            ..Self::default()
        }
    }

    fn with_devices(devices: &[(&str, &str)]) -> Self {
        Self {
            devices: devices
                .iter()
                .map(|(serial, state)| DeviceEntry {
                    serial: (*serial).to_owned(),
                    state: (*state).to_owned(),
                })
                .collect(),
            ..Self::default()
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn names(&self, dir: &str) -> Vec<String> {
        self.dirs.lock().unwrap().get(dir).cloned().unwrap_or_default()
    }

    fn item(&self, target: &str, apply: impl FnOnce(&mut HashMap<String, Vec<String>>)) -> ItemOutcome {
        if self.failing.iter().any(|f| *f == target) {
            return ItemOutcome {
                target: target.to_owned(),
                success: false,
                message: "Permission denied".into(),
            };
        }
        apply(&mut self.dirs.lock().unwrap());
        ItemOutcome {
            target: target.to_owned(),
            success: true,
            message: String::new(),
        }
    }

    fn each(&self, verb: &str, targets: &[String]) -> Vec<ItemOutcome> {
        targets
            .iter()
            .map(|t| {
                self.record(format!("{verb} {t}"));
                self.item(t, |_| {})
            })
            .collect()
    }
}

/// Split `/a/b/name` into `/a/b/` and `name`.
fn split_remote(path: &str) -> (String, String) {
    let (dir, name) = path.rsplit_once('/').unwrap();
    (format!("{dir}/"), name.to_owned())
}

fn ok(message: &str) -> Result<String, Error> {
    Ok(message.to_owned())
}

impl DeviceClient for FakeClient {
    async fn devices(&self) -> Result<Vec<DeviceEntry>, Error> {
        Ok(self.devices.clone())
    }

    async fn fastboot_devices(&self) -> Result<Vec<DeviceEntry>, Error> {
        Ok(self.devices.clone())
    }

    async fn device_info(&self, serial: &str) -> Result<DeviceInfo, Error> {
        self.record(format!("info {serial}"));
        Ok(DeviceInfo {
            serial: serial.to_owned(),
            model: Some("Pixel 7".into()),
            ..DeviceInfo::default()
        })
    }

    async fn reboot(&self, serial: &str, mode: RebootMode) -> Result<String, Error> {
        self.record(format!("reboot {serial} {mode}"));
        ok("")
    }

    async fn fastboot_reboot(&self, serial: &str, mode: RebootMode) -> Result<String, Error> {
        self.record(format!("fastboot reboot {serial} {mode}"));
        ok("")
    }

    async fn list_packages(&self, scope: PackageScope) -> Result<Vec<PackageEntry>, Error> {
        if self.slow_scope == Some(scope) {
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        let names: &[&str] = match scope {
            PackageScope::User => &["com.example.notes"],
            PackageScope::System => &["android", "com.android.settings"],
            PackageScope::All => &["android", "com.android.settings", "com.example.notes"],
        };
        Ok(names
            .iter()
            .map(|n| PackageEntry {
                name: (*n).to_owned(),
                enabled: true,
            })
            .collect())
    }

    async fn install(&self, apk: &Path) -> Result<String, Error> {
        self.record(format!("install {}", apk.display()));
        ok("Success")
    }

    async fn enable(&self, package: &str) -> Result<String, Error> {
        self.record(format!("enable {package}"));
        ok("enabled")
    }

    async fn disable(&self, package: &str) -> Result<String, Error> {
        self.record(format!("disable {package}"));
        ok("disabled")
    }

    async fn clear_data(&self, package: &str) -> Result<String, Error> {
        self.record(format!("clear {package}"));
        ok("Success")
    }

    async fn pull_apk(&self, package: &str, dest: &Path) -> Result<String, Error> {
        self.record(format!("pull apk {package} {}", dest.display()));
        ok("1 file pulled")
    }

    async fn uninstall_many(&self, packages: &[String]) -> Vec<ItemOutcome> {
        self.each("uninstall", packages)
    }

    async fn enable_many(&self, packages: &[String]) -> Vec<ItemOutcome> {
        self.each("enable", packages)
    }

    async fn disable_many(&self, packages: &[String]) -> Vec<ItemOutcome> {
        self.each("disable", packages)
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<RawFileEntry>, Error> {
        if self.slow_dir == Some(dir) {
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        let dirs = self.dirs.lock().unwrap();
        let names = dirs.get(dir).ok_or_else(|| Error::CommandFailed {
            message: format!("{dir}: No such file or directory"),
        })?;
        Ok(names
            .iter()
            .map(|name| RawFileEntry {
                name: name.clone(),
                kind: if dirs.contains_key(&format!("{dir}{name}/")) {
                    RawFileKind::Directory
                } else {
                    RawFileKind::File
                },
                size: Some(0),
                permissions: "-rw-rw----".into(),
                date: "2024-01-01".into(),
                time: "12:00".into(),
            })
            .collect())
    }

    async fn make_dir(&self, path: &str) -> Result<String, Error> {
        self.record(format!("mkdir {path}"));
        ok("")
    }

    async fn rename(&self, from: &str, to: &str) -> Result<String, Error> {
        self.record(format!("rename {from} {to}"));
        ok("")
    }

    async fn pull(&self, remote: &str, local: &Path) -> Result<String, Error> {
        self.record(format!("pull {remote} {}", local.display()));
        ok("1 file pulled")
    }

    async fn delete_many(&self, paths: &[String]) -> Vec<ItemOutcome> {
        paths
            .iter()
            .map(|path| {
                self.record(format!("delete {path}"));
                let (dir, name) = split_remote(path);
                self.item(path, |dirs| dirs.entry(dir).or_default().retain(|n| *n != name))
            })
            .collect()
    }

    async fn pull_many(&self, paths: &[String], dest_dir: &Path) -> Vec<ItemOutcome> {
        let verb = format!("pull to {}", dest_dir.display());
        self.each(&verb, paths)
    }

    async fn copy_many(&self, paths: &[String], dest_dir: &str) -> Vec<ItemOutcome> {
        paths
            .iter()
            .map(|path| {
                self.record(format!("copy {path} {dest_dir}"));
                let (_, name) = split_remote(path);
                self.item(path, |dirs| dirs.entry(dest_dir.to_owned()).or_default().push(name))
            })
            .collect()
    }

    async fn move_many(&self, paths: &[String], dest_dir: &str) -> Vec<ItemOutcome> {
        paths
            .iter()
            .map(|path| {
                self.record(format!("move {path} {dest_dir}"));
                let (dir, name) = split_remote(path);
                self.item(path, |dirs| {
                    dirs.entry(dir).or_default().retain(|n| *n != name);
                    dirs.entry(dest_dir.to_owned()).or_default().push(name);
                })
            })
            .collect()
    }

    async fn push_many(&self, locals: &[PathBuf], remote_dir: &str) -> Vec<ItemOutcome> {
        locals
            .iter()
            .map(|local| {
                let target = local.display().to_string();
                self.record(format!("push {target} {remote_dir}"));
                let name = local.file_name().unwrap().to_string_lossy().into_owned();
                self.item(&target, |dirs| dirs.entry(remote_dir.to_owned()).or_default().push(name))
            })
            .collect()
    }
}

fn files_view(client: FakeClient, path: &str) -> FilesView<FakeClient> {
    ListController::new(
        FileSource::new(client, path),
        CoordinatorConfig::default(),
        BatchConfig::default(),
    )
}

fn names(records: &[crate::model::FileEntry]) -> Vec<&str> {
    records.iter().map(|f| f.name.as_str()).collect()
}

fn sdcard() -> FakeClient {
    FakeClient::with_dirs(&[
        ("/sdcard/", &["DCIM", "Backup", "a.txt", "b.txt"]),
        ("/sdcard/DCIM/", &["IMG_1.jpg"]),
        ("/sdcard/Backup/", &[]),
    ])
}

#[tokio::test(start_paused = true)]
async fn navigate_clears_selection_and_discards_stale_listing() {
    let v = files_view(
        FakeClient {
            slow_dir: Some("/sdcard/"),
            ..sdcard()
        },
        "/sdcard",
    );
    v.refresh_now().await;
    v.toggle_selection("a.txt");

    let stale = v.refresh_now();
    let navigate = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        v.navigate("/sdcard/DCIM").await
    };
    let (first, queued) = tokio::join!(stale, navigate);

    assert_eq!(queued, RefreshOutcome::Queued);
    assert_eq!(first, RefreshOutcome::Applied);
    assert_eq!(v.current_path().as_str(), "/sdcard/DCIM/");
    assert_eq!(names(&v.records()), vec!["IMG_1.jpg"]);
    assert!(v.selected_keys().is_empty());
}

#[tokio::test(start_paused = true)]
async fn go_up_stops_at_root() {
    let v = files_view(FakeClient::with_dirs(&[("/", &["sdcard"]), ("/sdcard/", &[])]), "/sdcard/");
    assert!(v.go_up().await.is_some());
    assert_eq!(v.current_path().as_str(), "/");
    assert_eq!(names(&v.records()), vec!["sdcard"]);
    assert!(v.go_up().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn blank_names_are_rejected_before_any_device_call() {
    let v = files_view(sdcard(), "/sdcard");
    let mut notices = v.notices();

    let err = v.rename("a.txt", "   ").await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput { .. }));
    let err = v.create_folder("").await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput { .. }));
    assert!(v.create_folder("..").await.is_err());

    assert!(v.source().client().calls().is_empty());
    assert_eq!(notices.recv().await.unwrap().level, NoticeLevel::Warning);
    assert!(!v.is_busy());
}

#[tokio::test(start_paused = true)]
async fn rename_and_create_folder_join_the_current_path() {
    let v = files_view(sdcard(), "/sdcard");
    v.rename("a.txt", " Tom & Jerry.txt ").await.unwrap();
    v.create_folder("R&D").await.unwrap();
    assert_eq!(
        v.source().client().calls(),
        vec!["rename /sdcard/a.txt /sdcard/Tom & Jerry.txt", "mkdir /sdcard/R&D"]
    );
}

#[tokio::test(start_paused = true)]
async fn pull_batch_without_destination_is_rejected() {
    let v = files_view(sdcard(), "/sdcard");
    v.refresh_now().await;
    v.toggle_selection("a.txt");

    let err = v.run_batch(FileBatch::Pull).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput { .. }));
    assert_eq!(v.selected_keys(), vec!["a.txt"]);
    assert!(v.source().client().calls().is_empty());

    let report = v.pull_selected(Path::new("/tmp/out")).await.unwrap();
    assert_eq!(report.succeeded, vec!["a.txt"]);
    v.pull_file("b.txt", Path::new("/tmp/b.txt")).await.unwrap();
    assert_eq!(
        v.source().client().calls(),
        vec!["pull to /tmp/out /sdcard/a.txt", "pull /sdcard/b.txt /tmp/b.txt"]
    );
}

#[tokio::test(start_paused = true)]
async fn copy_and_move_into_another_directory() {
    let v = files_view(sdcard(), "/sdcard");
    v.refresh_now().await;

    let err = v.run_batch(FileBatch::Copy).await.unwrap_err();
    assert!(matches!(err, CoreError::NoSelection));

    v.toggle_selection("a.txt");
    let report = v.copy_selected("/sdcard/Backup").await.unwrap();
    assert_eq!(report.outcome(), BatchOutcome::AllSucceeded);
    assert!(v.selected_keys().is_empty());
    assert_eq!(names(&v.records()), vec!["DCIM", "Backup", "a.txt", "b.txt"]);

    v.toggle_selection("b.txt");
    v.move_selected("/sdcard/Backup/").await.unwrap();
    assert_eq!(names(&v.records()), vec!["DCIM", "Backup", "a.txt"]);

    let client = v.source().client();
    assert_eq!(client.names("/sdcard/Backup/"), vec!["a.txt", "b.txt"]);
    assert_eq!(
        client.calls(),
        vec![
            "copy /sdcard/a.txt /sdcard/Backup/",
            "move /sdcard/b.txt /sdcard/Backup/"
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn push_many_attempts_every_item_and_reports_failures() {
    let v = files_view(
        FakeClient {
            failing: vec!["/host/locked.bin"],
            ..sdcard()
        },
        "/sdcard/Backup",
    );
    let mut notices = v.notices();
    let locals = [
        PathBuf::from("/host/one.txt"),
        PathBuf::from("/host/locked.bin"),
        PathBuf::from("/host/two.txt"),
    ];

    let report = v.push_many(&locals).await.unwrap();

    assert_eq!(report.headline(), "2/3 succeeded");
    assert_eq!(report.failures[0].key, "/host/locked.bin");
    assert_eq!(v.source().client().calls().len(), 3);
    assert_eq!(names(&v.records()), vec!["one.txt", "two.txt"]);
    let notice = notices.recv().await.unwrap();
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert_eq!(notice.title, "push: 2/3 succeeded");
    assert!(!v.is_operation_running("push"));

    assert!(matches!(v.push_many(&[]).await, Err(CoreError::InvalidInput { .. })));
}

fn packages_view(client: FakeClient) -> PackagesView<FakeClient> {
    ListController::new(
        PackageSource::new(client, PackageScope::User),
        CoordinatorConfig::default(),
        BatchConfig::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn set_scope_discards_listing_for_previous_scope() {
    let v = packages_view(FakeClient {
        slow_scope: Some(PackageScope::User),
        ..FakeClient::default()
    });

    let stale = v.refresh_now();
    let switch = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        v.set_scope(PackageScope::System).await
    };
    let (first, queued) = tokio::join!(stale, switch);

    assert_eq!(queued, RefreshOutcome::Queued);
    assert_eq!(first, RefreshOutcome::Applied);
    assert_eq!(v.scope(), PackageScope::System);
    let listed: Vec<String> = v.records().iter().map(|p| p.name.clone()).collect();
    assert_eq!(listed, vec!["android", "com.android.settings"]);
}

#[tokio::test(start_paused = true)]
async fn malformed_package_names_are_rejected_locally() {
    let v = packages_view(FakeClient::default());
    let mut notices = v.notices();

    let err = v.clear_data("x;reboot").await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput { .. }));
    assert_eq!(notices.recv().await.unwrap().level, NoticeLevel::Warning);
    assert!(v.pull_apk("com.app && reboot", Path::new("/tmp")).await.is_err());
    assert!(v.source().client().calls().is_empty());

    v.clear_data("com.example.notes").await.unwrap();
    assert_eq!(v.source().client().calls(), vec!["clear com.example.notes"]);
}

fn devices_view(source: DeviceSource<FakeClient>) -> DevicesView<FakeClient> {
    ListController::new(source, CoordinatorConfig::default(), BatchConfig::default())
}

#[tokio::test(start_paused = true)]
async fn reboot_resolves_the_target_device() {
    let v = devices_view(DeviceSource::adb(FakeClient::with_devices(&[
        ("R58M123", "device"),
        ("emulator-5554", "offline"),
    ])));
    v.refresh_now().await;

    v.reboot(None, RebootMode::Recovery).await.unwrap();
    v.reboot(Some("R58M123"), RebootMode::System).await.unwrap();
    assert!(matches!(
        v.reboot(Some("emulator-5554"), RebootMode::System).await,
        Err(CoreError::DeviceUnavailable { .. })
    ));
    assert!(matches!(
        v.reboot(Some("nope"), RebootMode::System).await,
        Err(CoreError::InvalidInput { .. })
    ));
    assert_eq!(
        v.source().client().calls(),
        vec!["reboot R58M123 recovery", "reboot R58M123 system"]
    );

    let info = v.device_info(None).await.unwrap();
    assert_eq!(info.model.as_deref(), Some("Pixel 7"));
}

#[tokio::test(start_paused = true)]
async fn ambiguous_target_needs_a_serial() {
    let v = devices_view(DeviceSource::adb(FakeClient::with_devices(&[
        ("A1", "device"),
        ("B2", "device"),
    ])));
    v.refresh_now().await;
    let err = v.reboot(None, RebootMode::Bootloader).await.unwrap_err();
    assert!(err.to_string().contains("pass a serial"));

    let empty = devices_view(DeviceSource::adb(FakeClient::default()));
    empty.refresh_now().await;
    assert!(matches!(
        empty.device_info(None).await,
        Err(CoreError::DeviceUnavailable { .. })
    ));
    assert!(v.source().client().calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn fastboot_view_reboots_through_fastboot() {
    let v = devices_view(DeviceSource::fastboot(FakeClient::with_devices(&[(
        "FA7C",
        "fastboot",
    )])));
    v.refresh_now().await;

    v.reboot(None, RebootMode::Bootloader).await.unwrap();
    assert!(matches!(
        v.device_info(None).await,
        Err(CoreError::InvalidInput { .. })
    ));
    assert_eq!(v.source().client().calls(), vec!["fastboot reboot FA7C bootloader"]);
}
