//! Clap derive structures for the `adbdeck` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use adbdeck_core::{
    DeviceSortKey, DeviceStatusFilter, FileSortKey, FileStatusFilter, PackageScope, PackageSortKey,
    PackageStatusFilter, RebootMode, SortDirection,
};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// adbdeck -- manage Android devices, packages and files over adb
#[derive(Debug, Parser)]
#[command(
    name = "adbdeck",
    version,
    about = "Manage Android devices, packages and files over adb",
    long_about = "A console for the Android platform tools.\n\n\
        Lists devices (adb and fastboot), manages packages in bulk and\n\
        browses the device filesystem. Requires adb on PATH, next to the\n\
        executable, or configured via --adb / config.toml.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Output format (defaults to the configured one)
    #[arg(long, short = 'o', env = "ADBDECK_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to the adb binary
    #[arg(long, value_name = "PATH", global = true)]
    pub adb: Option<PathBuf>,

    /// Path to the fastboot binary
    #[arg(long, value_name = "PATH", global = true)]
    pub fastboot: Option<PathBuf>,

    /// Command timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "FILE", env = "ADBDECK_CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List devices visible to adb
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// List devices in fastboot mode
    #[command(alias = "fb")]
    Fastboot(DevicesArgs),

    /// Manage installed packages
    #[command(alias = "pkg", alias = "p")]
    Packages(PackagesArgs),

    /// Browse and transfer device files
    #[command(alias = "f")]
    Files(FilesArgs),

    /// Show CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared ──────────────────────────────────────────────────────────

/// Search and sort arguments shared by every list command.
#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Case-insensitive substring filter
    #[arg(long, short = 'f')]
    pub search: Option<String>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

impl ViewArgs {
    pub fn direction(&self) -> SortDirection {
        if self.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

// ── Devices ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: Option<DeviceCommand>,

    /// Keep polling and reprint on every change (Ctrl-C to stop)
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Filter by availability
    #[arg(long, default_value = "all")]
    pub status: DeviceStatusArg,

    #[arg(long, default_value = "serial")]
    pub sort: DeviceSortArg,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    /// Show build and hardware details of a device
    Info {
        /// Device serial (defaults to the only ready device)
        serial: Option<String>,
    },

    /// Reboot a device, optionally into another mode
    Reboot {
        /// Device serial (defaults to the only ready device)
        serial: Option<String>,

        #[arg(long, short = 'm', default_value = "system")]
        mode: RebootArg,

        /// Confirm the reboot
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RebootArg {
    System,
    Recovery,
    Bootloader,
    Fastboot,
    Download,
    Edl,
    Sideload,
}

impl From<RebootArg> for RebootMode {
    fn from(arg: RebootArg) -> Self {
        match arg {
            RebootArg::System => Self::System,
            RebootArg::Recovery => Self::Recovery,
            RebootArg::Bootloader => Self::Bootloader,
            RebootArg::Fastboot => Self::Fastboot,
            RebootArg::Download => Self::Download,
            RebootArg::Edl => Self::Edl,
            RebootArg::Sideload => Self::Sideload,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DeviceStatusArg {
    All,
    Ready,
    Unavailable,
}

impl From<DeviceStatusArg> for DeviceStatusFilter {
    fn from(arg: DeviceStatusArg) -> Self {
        match arg {
            DeviceStatusArg::All => Self::All,
            DeviceStatusArg::Ready => Self::Ready,
            DeviceStatusArg::Unavailable => Self::Unavailable,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DeviceSortArg {
    Serial,
    State,
}

impl From<DeviceSortArg> for DeviceSortKey {
    fn from(arg: DeviceSortArg) -> Self {
        match arg {
            DeviceSortArg::Serial => Self::Serial,
            DeviceSortArg::State => Self::State,
        }
    }
}

// ── Packages ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PackagesArgs {
    #[command(subcommand)]
    pub command: PackagesCommand,
}

#[derive(Debug, Subcommand)]
pub enum PackagesCommand {
    /// List packages
    #[command(alias = "ls")]
    List {
        /// Which packages to list (defaults to the configured scope)
        #[arg(long)]
        scope: Option<ScopeArg>,

        #[arg(long, default_value = "all")]
        status: PackageStatusArg,

        #[arg(long, default_value = "name")]
        sort: PackageSortArg,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Uninstall packages
    #[command(alias = "rm")]
    Uninstall {
        #[arg(required = true)]
        packages: Vec<String>,

        /// Confirm the removal
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Disable packages for the primary user
    Disable {
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Re-enable disabled packages
    Enable {
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Install an APK from the host
    Install { apk: PathBuf },

    /// Clear a package's data
    Clear {
        package: String,

        /// Confirm wiping the data
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Copy a package's base APK to the host
    Pull {
        package: String,

        /// Host directory or file to write to
        #[arg(long, short = 'd', default_value = ".")]
        dest: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScopeArg {
    User,
    System,
    All,
}

impl From<ScopeArg> for PackageScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::User => Self::User,
            ScopeArg::System => Self::System,
            ScopeArg::All => Self::All,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PackageStatusArg {
    All,
    Enabled,
    Disabled,
}

impl From<PackageStatusArg> for PackageStatusFilter {
    fn from(arg: PackageStatusArg) -> Self {
        match arg {
            PackageStatusArg::All => Self::All,
            PackageStatusArg::Enabled => Self::Enabled,
            PackageStatusArg::Disabled => Self::Disabled,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PackageSortArg {
    Name,
    State,
}

impl From<PackageSortArg> for PackageSortKey {
    fn from(arg: PackageSortArg) -> Self {
        match arg {
            PackageSortArg::Name => Self::Name,
            PackageSortArg::State => Self::State,
        }
    }
}

// ── Files ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FilesArgs {
    #[command(subcommand)]
    pub command: FilesCommand,
}

#[derive(Debug, Subcommand)]
pub enum FilesCommand {
    /// List a directory
    Ls {
        /// Device directory (defaults to the configured path)
        path: Option<String>,

        #[arg(long, default_value = "all")]
        status: FileStatusArg,

        #[arg(long, default_value = "name")]
        sort: FileSortArg,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Delete entries from a directory
    Rm {
        #[command(flatten)]
        dir: DirArg,

        #[arg(required = true)]
        names: Vec<String>,

        /// Confirm the deletion
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Copy entries from a directory to the host
    Pull {
        #[command(flatten)]
        dir: DirArg,

        #[arg(required = true)]
        names: Vec<String>,

        /// Host directory to write to
        #[arg(long, short = 'd', default_value = ".")]
        dest: PathBuf,
    },

    /// Copy host files or folders into a directory
    Push {
        #[command(flatten)]
        dir: DirArg,

        #[arg(required = true)]
        local: Vec<PathBuf>,
    },

    /// Copy entries into another device directory
    Cp {
        #[command(flatten)]
        dir: DirArg,

        #[arg(required = true)]
        names: Vec<String>,

        /// Device directory to copy into
        #[arg(long, short = 't', value_name = "PATH")]
        to: String,
    },

    /// Move entries into another device directory
    Move {
        #[command(flatten)]
        dir: DirArg,

        #[arg(required = true)]
        names: Vec<String>,

        /// Device directory to move into
        #[arg(long, short = 't', value_name = "PATH")]
        to: String,
    },

    /// Create a folder
    Mkdir {
        #[command(flatten)]
        dir: DirArg,

        name: String,
    },

    /// Rename an entry within a directory
    Mv {
        #[command(flatten)]
        dir: DirArg,

        from: String,
        to: String,
    },
}

#[derive(Debug, Args)]
pub struct DirArg {
    /// Device directory the names refer to (defaults to the configured path)
    #[arg(long = "dir", short = 'C', value_name = "PATH")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FileStatusArg {
    All,
    Folders,
    Files,
}

impl From<FileStatusArg> for FileStatusFilter {
    fn from(arg: FileStatusArg) -> Self {
        match arg {
            FileStatusArg::All => Self::All,
            FileStatusArg::Folders => Self::Folders,
            FileStatusArg::Files => Self::Files,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FileSortArg {
    Name,
    Size,
    Date,
}

impl From<FileSortArg> for FileSortKey {
    fn from(arg: FileSortArg) -> Self {
        match arg {
            FileSortArg::Name => Self::Name,
            FileSortArg::Size => Self::Size,
            FileSortArg::Date => Self::Date,
        }
    }
}

// ── Config ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Print the config file location
    Path,

    /// Write a config file with the default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_batch_with_dir() {
        let cli = Cli::try_parse_from([
            "adbdeck", "files", "rm", "-C", "/sdcard/Download", "a.txt", "b.txt", "--yes",
        ])
        .unwrap_or_else(|e| panic!("{e}"));
        let Command::Files(FilesArgs {
            command: FilesCommand::Rm { dir, names, yes },
        }) = cli.command
        else {
            panic!("wrong command");
        };
        assert_eq!(dir.path.as_deref(), Some("/sdcard/Download"));
        assert_eq!(names, ["a.txt", "b.txt"]);
        assert!(yes);
    }

    #[test]
    fn devices_lists_without_a_subcommand() {
        let cli = Cli::try_parse_from(["adbdeck", "devices", "--watch"]).unwrap_or_else(|e| panic!("{e}"));
        let Command::Devices(args) = cli.command else {
            panic!("wrong command");
        };
        assert!(args.command.is_none());
        assert!(args.watch);
    }

    #[test]
    fn reboot_mode_is_validated() {
        let cli = Cli::try_parse_from(["adbdeck", "devices", "reboot", "R58M123", "-m", "edl", "-y"])
            .unwrap_or_else(|e| panic!("{e}"));
        let Command::Devices(DevicesArgs {
            command: Some(DeviceCommand::Reboot { serial, mode, yes }),
            ..
        }) = cli.command
        else {
            panic!("wrong command");
        };
        assert_eq!(serial.as_deref(), Some("R58M123"));
        assert_eq!(RebootMode::from(mode), RebootMode::Edl);
        assert!(yes);

        let err = Cli::try_parse_from(["adbdeck", "devices", "reboot", "--mode", "factory-reset"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn copy_needs_a_destination() {
        let err = Cli::try_parse_from(["adbdeck", "files", "cp", "a.txt"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
