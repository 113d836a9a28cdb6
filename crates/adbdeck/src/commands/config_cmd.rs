//! Config command handlers. These never touch a device.

use adbdeck_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output::Printer;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts, printer: &Printer) -> Result<(), CliError> {
    let path = config::path(global);
    match args.command {
        ConfigCommand::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            if printer.quiet {
                return Ok(());
            }
            print!("{}", cfg.to_toml()?);
            Ok(())
        }
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            adbdeck_config::save_config(&Config::default(), &path)?;
            printer.done("config init", &format!("wrote {}", path.display()))
        }
    }
}
