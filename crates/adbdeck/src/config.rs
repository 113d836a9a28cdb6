//! CLI configuration: thin wrapper around `adbdeck_config` that applies
//! `GlobalOpts` flag overrides (--adb, --fastboot, --timeout, --output).

use std::path::PathBuf;

use clap::ValueEnum;
use tracing::warn;

use adbdeck_config::Config;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Config file in effect: `--config` / `ADBDECK_CONFIG`, else the
/// platform default.
pub fn path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(adbdeck_config::config_path)
}

/// Load the config file and apply CLI flag overrides. Flags win.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = adbdeck_config::load_config_from(&path(global))?;
    if let Some(adb) = &global.adb {
        cfg.tools.adb = Some(adb.clone());
    }
    if let Some(fastboot) = &global.fastboot {
        cfg.tools.fastboot = Some(fastboot.clone());
    }
    if let Some(secs) = global.timeout {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        cfg.timeouts.command = secs;
        cfg.timeouts.enumerate = secs;
    }
    Ok(cfg)
}

/// Output format: flag, else `defaults.output`, else table.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&cfg.defaults.output, true).unwrap_or_else(|_| {
            warn!(output = %cfg.defaults.output, "unknown output format in config, using table");
            OutputFormat::Table
        })
    })
}
