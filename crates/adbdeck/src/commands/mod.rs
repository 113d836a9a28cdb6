//! Command dispatch: bridges CLI args -> list controllers -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod files;
pub mod packages;
pub mod util;

use adbdeck_api::AdbClient;
use adbdeck_core::SessionConfig;

use crate::cli::Command;
use crate::error::CliError;
use crate::output::Printer;

/// Everything a device-bound handler needs.
pub struct Context {
    pub client: AdbClient,
    pub session: SessionConfig,
    pub printer: Printer,
}

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle_adb(&args, ctx).await,
        Command::Fastboot(args) => devices::handle_fastboot(&args, ctx).await,
        Command::Packages(args) => packages::handle(args, ctx).await,
        Command::Files(args) => files::handle(args, ctx).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
