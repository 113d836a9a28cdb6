// File explorer view: directory navigation, bulk delete/pull/copy/move,
// multi-file push, and the single-entry actions.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;

use adbdeck_api::AdbClient;

use super::ListController;
use crate::batch::{BatchBackend, BatchReport, BatchResult};
use crate::client::DeviceClient;
use crate::convert::outcome_for_key;
use crate::error::CoreError;
use crate::model::FileEntry;
use crate::refresh::{RecordSource, RefreshMode, RefreshOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum FileBatch {
    Delete,
    Pull,
    Copy,
    Move,
}

/// Lists one device directory at a time.
#[derive(Debug)]
pub struct FileSource<C = AdbClient> {
    client: C,
    path: ArcSwap<String>,
    pull_destination: ArcSwap<Option<PathBuf>>,
    remote_destination: ArcSwap<Option<String>>,
}

impl<C: DeviceClient> FileSource<C> {
    pub fn new(client: C, path: &str) -> Self {
        Self {
            client,
            path: ArcSwap::from_pointee(normalize_dir(path)),
            pull_destination: ArcSwap::from_pointee(None),
            remote_destination: ArcSwap::from_pointee(None),
        }
    }

    /// Current directory, always with a trailing `/`.
    pub fn path(&self) -> Arc<String> {
        self.path.load_full()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn remote_destination(&self) -> Result<String, CoreError> {
        let dest = self.remote_destination.load_full();
        dest.as_deref()
            .map(str::to_owned)
            .ok_or_else(|| CoreError::InvalidInput {
                message: "no destination folder chosen".into(),
            })
    }
}

impl<C: DeviceClient> RecordSource for FileSource<C> {
    type Record = FileEntry;

    fn label(&self) -> &'static str {
        "files"
    }

    async fn enumerate(&self) -> Result<Vec<FileEntry>, CoreError> {
        let dir = self.path();
        let entries = self.client.list_files(&dir).await?;
        Ok(entries.into_iter().map(FileEntry::from).collect())
    }
}

impl<C: DeviceClient> BatchBackend<FileBatch> for FileSource<C> {
    async fn run_batch(&self, kind: FileBatch, keys: &[String]) -> Result<BatchResult, CoreError> {
        let dir = self.path();
        let paths: Vec<String> = keys.iter().map(|name| join_remote(&dir, name)).collect();
        let outcomes = match kind {
            FileBatch::Delete => self.client.delete_many(&paths).await,
            FileBatch::Pull => {
                let dest = self.pull_destination.load_full();
                let Some(dest) = dest.as_deref() else {
                    return Err(CoreError::InvalidInput {
                        message: "no destination folder chosen".into(),
                    });
                };
                self.client.pull_many(&paths, dest).await
            }
            FileBatch::Copy => self.client.copy_many(&paths, &self.remote_destination()?).await,
            FileBatch::Move => self.client.move_many(&paths, &self.remote_destination()?).await,
        };
        Ok(BatchResult::PerKey(
            keys.iter()
                .zip(outcomes)
                .map(|(key, outcome)| outcome_for_key(key, outcome))
                .collect(),
        ))
    }
}

pub type FilesView<C = AdbClient> = ListController<FileSource<C>, FileBatch>;

impl<C: DeviceClient> ListController<FileSource<C>, FileBatch> {
    pub fn current_path(&self) -> Arc<String> {
        self.source().path()
    }

    /// Change directory. Clears the selection, invalidates the old listing
    /// and loads the new one.
    pub async fn navigate(&self, path: &str) -> RefreshOutcome {
        let path = normalize_dir(path);
        debug!(%path, "navigate");
        self.source().path.store(Arc::new(path));
        self.clear_selection();
        self.coordinator().invalidate();
        self.coordinator().refresh_now(RefreshMode::Visible).await
    }

    /// Enter a subdirectory of the current path.
    pub async fn open(&self, name: &str) -> RefreshOutcome {
        let target = join_remote(&self.current_path(), name);
        self.navigate(&target).await
    }

    /// Go to the parent directory; `None` when already at `/`.
    pub async fn go_up(&self) -> Option<RefreshOutcome> {
        let parent = parent_dir(&self.current_path())?;
        Some(self.navigate(&parent).await)
    }

    pub async fn delete_selected(&self) -> Result<BatchReport, CoreError> {
        self.run_batch(FileBatch::Delete).await
    }

    /// Pull every selected entry into `dest` on the host.
    pub async fn pull_selected(&self, dest: &Path) -> Result<BatchReport, CoreError> {
        self.source()
            .pull_destination
            .store(Arc::new(Some(dest.to_path_buf())));
        self.run_batch(FileBatch::Pull).await
    }

    /// Copy every selected entry into another device directory.
    pub async fn copy_selected(&self, dest_dir: &str) -> Result<BatchReport, CoreError> {
        self.set_remote_destination(dest_dir);
        self.run_batch(FileBatch::Copy).await
    }

    /// Move every selected entry into another device directory.
    pub async fn move_selected(&self, dest_dir: &str) -> Result<BatchReport, CoreError> {
        self.set_remote_destination(dest_dir);
        self.run_batch(FileBatch::Move).await
    }

    fn set_remote_destination(&self, dest_dir: &str) {
        self.source()
            .remote_destination
            .store(Arc::new(Some(normalize_dir(dest_dir))));
    }

    pub async fn rename(&self, old_name: &str, new_name: &str) -> Result<String, CoreError> {
        let new_name = new_name.trim();
        if let Err(message) = validate_name(new_name) {
            return Err(self.reject("rename", message));
        }
        let dir = self.current_path();
        let from = join_remote(&dir, old_name);
        let to = join_remote(&dir, new_name);
        let client = self.source().client();
        self.run_operation("rename", async { client.rename(&from, &to).await.map_err(CoreError::from) })
            .await
    }

    pub async fn create_folder(&self, name: &str) -> Result<String, CoreError> {
        let name = name.trim();
        if let Err(message) = validate_name(name) {
            return Err(self.reject("create folder", message));
        }
        let path = join_remote(&self.current_path(), name);
        let client = self.source().client();
        self.run_operation("create folder", async { client.make_dir(&path).await.map_err(CoreError::from) })
            .await
    }

    /// Pull one entry of the current directory to `dest` on the host.
    pub async fn pull_file(&self, name: &str, dest: &Path) -> Result<String, CoreError> {
        let remote = join_remote(&self.current_path(), name);
        let client = self.source().client();
        self.run_operation("pull", async { client.pull(&remote, dest).await.map_err(CoreError::from) })
            .await
    }

    /// Push host files or folders into the current directory. Every item is
    /// attempted; the report names each one that failed.
    pub async fn push_many(&self, locals: &[PathBuf]) -> Result<BatchReport, CoreError> {
        let keys: Vec<String> = locals.iter().map(|p| p.display().to_string()).collect();
        let dir = self.current_path();
        let client = self.source().client();
        self.run_items("push", &keys, async {
            let outcomes = client.push_many(locals, &dir).await;
            Ok(BatchResult::PerKey(
                keys.iter()
                    .zip(outcomes)
                    .map(|(key, outcome)| outcome_for_key(key, outcome))
                    .collect(),
            ))
        })
        .await
    }
}

fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        Err("name cannot be empty")
    } else if name.contains('/') {
        Err("name cannot contain '/'")
    } else if name == "." || name == ".." {
        Err("reserved name")
    } else {
        Ok(())
    }
}

/// Absolute directory path with exactly one trailing `/` and no empty
/// or `.` segments. `..` segments are resolved.
pub fn normalize_dir(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        "/".to_owned()
    } else {
        format!("/{}/", segments.join("/"))
    }
}

/// Parent of a directory path; `None` at the root.
pub fn parent_dir(path: &str) -> Option<String> {
    let normalized = normalize_dir(path);
    if normalized == "/" {
        return None;
    }
    Some(normalize_dir(&format!("{normalized}..")))
}

/// Join an entry name onto a directory path.
pub fn join_remote(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn normalize() {
        assert_eq!(normalize_dir("/sdcard"), "/sdcard/");
        assert_eq!(normalize_dir("sdcard//Download/"), "/sdcard/Download/");
        assert_eq!(normalize_dir("/sdcard/./DCIM/../Music"), "/sdcard/Music/");
        assert_eq!(normalize_dir(""), "/");
        assert_eq!(normalize_dir("/.."), "/");
    }

    #[test]
    fn parents() {
        assert_eq!(parent_dir("/sdcard/Download/").as_deref(), Some("/sdcard/"));
        assert_eq!(parent_dir("/sdcard/").as_deref(), Some("/"));
        assert_eq!(parent_dir("/"), None);
    }

    #[test]
    fn joins() {
        assert_eq!(join_remote("/sdcard/", "a b.txt"), "/sdcard/a b.txt");
        assert_eq!(join_remote("/sdcard", "x"), "/sdcard/x");
    }

    #[test]
    fn names() {
        assert!(validate_name("").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("Photos 2024").is_ok());
    }
}
