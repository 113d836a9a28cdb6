// Shared process runner for the platform tools.
//
// Both adb and fastboot calls go through this module so binary discovery,
// deadlines, and stderr classification live in one place.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::Error;

/// Default deadline for short commands (`pm`, `ls`, `devices`, ...).
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);
/// Default deadline for `adb install`.
pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(15 * 60);
/// Default deadline for `adb push` / `adb pull`.
pub const DEFAULT_TRANSFER_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// The external tools this crate knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Tool {
    Adb,
    Fastboot,
}

/// Process runner configuration.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Explicit adb binary; skips discovery when set.
    pub adb_path: Option<PathBuf>,
    /// Explicit fastboot binary; skips discovery when set.
    pub fastboot_path: Option<PathBuf>,
    /// Deadline for short commands.
    pub command_timeout: Duration,
    /// Deadline for package installs.
    pub install_timeout: Duration,
    /// Deadline for file transfers.
    pub transfer_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            adb_path: None,
            fastboot_path: None,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            install_timeout: DEFAULT_INSTALL_TIMEOUT,
            transfer_timeout: DEFAULT_TRANSFER_TIMEOUT,
        }
    }
}

/// Runs adb/fastboot with deadlines and classified failures.
///
/// Cheaply cloneable; resolved binary paths are cached for the lifetime
/// of the runner.
#[derive(Debug, Clone)]
pub struct Executor {
    inner: Arc<ExecutorInner>,
}

#[derive(Debug)]
struct ExecutorInner {
    config: ExecutorConfig,
    resolved: DashMap<Tool, PathBuf>,
}

impl Executor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            inner: Arc::new(ExecutorInner {
                config,
                resolved: DashMap::new(),
            }),
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.inner.config
    }

    /// Locate the binary for `tool`, caching the answer.
    ///
    /// Search order: the configured path, then `bin/<os>/<name>` and
    /// `bin/<name>` relative to the working directory and to the running
    /// executable, then every entry of `PATH`.
    pub fn resolve(&self, tool: Tool) -> Result<PathBuf, Error> {
        if let Some(cached) = self.inner.resolved.get(&tool) {
            return Ok(cached.value().clone());
        }

        let configured = match tool {
            Tool::Adb => self.inner.config.adb_path.as_ref(),
            Tool::Fastboot => self.inner.config.fastboot_path.as_ref(),
        };

        let name = format!("{tool}{}", std::env::consts::EXE_SUFFIX);
        let found = configured
            .filter(|p| p.is_file())
            .cloned()
            .or_else(|| candidate_paths(&name).into_iter().find(|p| p.is_file()))
            .ok_or_else(|| Error::BinaryNotFound {
                name: name.clone(),
                platform: std::env::consts::OS.into(),
            })?;

        let found = std::path::absolute(&found).unwrap_or(found);
        debug!(%tool, path = %found.display(), "resolved tool binary");
        self.inner.resolved.insert(tool, found.clone());
        Ok(found)
    }

    /// Run `tool` with the default command deadline.
    pub async fn run(&self, tool: Tool, args: &[&str]) -> Result<String, Error> {
        self.run_with_timeout(tool, args, self.inner.config.command_timeout)
            .await
    }

    /// Run `tool` with an explicit deadline, returning trimmed stdout.
    ///
    /// The child is killed if the deadline passes or the returned future
    /// is dropped.
    pub async fn run_with_timeout(
        &self,
        tool: Tool,
        args: &[&str],
        timeout: Duration,
    ) -> Result<String, Error> {
        let program = self.resolve(tool)?;
        trace!(%tool, ?args, "spawning");

        let child = Command::new(&program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::Spawn {
                program: program.display().to_string(),
                source,
            })?;

        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| Error::Timeout {
                timeout_secs: timeout.as_secs(),
            })?
            .map_err(|source| Error::Spawn {
                program: program.display().to_string(),
                source,
            })?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        let message = if stderr.is_empty() {
            format!("{tool} exited with {}", output.status)
        } else {
            stderr
        };
        debug!(%tool, ?args, %message, "command failed");
        Err(Error::from_stderr(&message))
    }

    /// Run `program` on the device through `adb shell`, quoting every
    /// argument so it reaches the program as one word whatever characters
    /// it contains. `program` is passed through verbatim and must be a
    /// fixed command such as `rm -rf`.
    pub async fn shell(&self, serial: Option<&str>, program: &str, args: &[&str]) -> Result<String, Error> {
        let line = shell_line(program, args);
        let mut argv = Vec::with_capacity(4);
        if let Some(serial) = serial {
            argv.extend(["-s", serial]);
        }
        argv.extend(["shell", line.as_str()]);
        self.run(Tool::Adb, &argv).await.map_err(|e| match e {
            Error::CommandFailed { message } => Error::CommandFailed {
                message: format!("shell error: {message}"),
            },
            other => other,
        })
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

/// Quote a device path for use inside an `adb shell` command line.
pub fn quote_remote(path: &str) -> String {
    format!("'{}'", path.replace('\'', r"'\''"))
}

/// `program` followed by each argument quoted with [`quote_remote`].
pub fn shell_line(program: &str, args: &[&str]) -> String {
    let mut line = program.to_owned();
    for arg in args {
        line.push(' ');
        line.push_str(&quote_remote(arg));
    }
    line
}

fn candidate_paths(name: &str) -> Vec<PathBuf> {
    let platform = std::env::consts::OS;
    let mut roots = vec![PathBuf::from(".")];
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(dir);
    }

    let mut candidates: Vec<PathBuf> = roots
        .iter()
        .flat_map(|root| {
            [
                root.join("bin").join(platform).join(name),
                root.join("bin").join(name),
            ]
        })
        .collect();

    if let Some(path) = std::env::var_os("PATH") {
        candidates.extend(std::env::split_paths(&path).map(|dir| dir.join(name)));
    }
    candidates
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn quote_remote_escapes_single_quotes() {
        assert_eq!(quote_remote("/sdcard/My Files"), "'/sdcard/My Files'");
        assert_eq!(quote_remote("/sdcard/it's"), r"'/sdcard/it'\''s'");
    }

    #[test]
    fn configured_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("my-adb");
        std::fs::write(&fake, b"").unwrap();

        let exec = Executor::new(ExecutorConfig {
            adb_path: Some(fake.clone()),
            ..ExecutorConfig::default()
        });
        assert_eq!(exec.resolve(Tool::Adb).unwrap(), fake);
    }

    #[test]
    fn missing_configured_path_reports_tool_name() {
        let exec = Executor::new(ExecutorConfig {
            fastboot_path: Some(PathBuf::from("/definitely/not/here/fastboot-xyz")),
            ..ExecutorConfig::default()
        });
        // Falls through to discovery; on a machine without fastboot on PATH
        // the error names the tool.
        if let Err(Error::BinaryNotFound { name, .. }) = exec.resolve(Tool::Fastboot) {
            assert!(name.starts_with("fastboot"));
        }
    }

    #[test]
    fn shell_line_quotes_every_argument() {
        assert_eq!(
            shell_line("mv", &["/sdcard/Tom & Jerry.mp4", "/sdcard/R&D; x|y/"]),
            "mv '/sdcard/Tom & Jerry.mp4' '/sdcard/R&D; x|y/'"
        );
        assert_eq!(shell_line("rm -rf", &["$(reboot)"]), "rm -rf '$(reboot)'");
        assert_eq!(shell_line("getprop", &[]), "getprop");
    }

    /// Write an adb stand-in that prints each argument on its own line.
    #[cfg(unix)]
    fn echo_adb(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("adb");
        std::fs::write(&path, "#!/bin/sh\nfor a in \"$@\"; do printf '%s\\n' \"$a\"; done\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn shell_passes_separators_inside_quotes() {
        let dir = tempfile::tempdir().unwrap();
        let exec = Executor::new(ExecutorConfig {
            adb_path: Some(echo_adb(dir.path())),
            ..ExecutorConfig::default()
        });

        let out = exec
            .shell(None, "rm -rf", &["/sdcard/Tom & Jerry.mp4"])
            .await
            .unwrap();
        assert_eq!(out, "shell\nrm -rf '/sdcard/Tom & Jerry.mp4'");

        let out = exec.shell(Some("emulator-5554"), "getprop", &[]).await.unwrap();
        assert_eq!(out, "-s\nemulator-5554\nshell\ngetprop");
    }

    #[test]
    fn tool_display_is_binary_name() {
        assert_eq!(Tool::Adb.to_string(), "adb");
        assert_eq!(Tool::Fastboot.to_string(), "fastboot");
    }
}
