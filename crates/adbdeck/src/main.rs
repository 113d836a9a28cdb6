mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use adbdeck_api::{AdbClient, Executor};

use crate::cli::{Cli, Command};
use crate::commands::Context;
use crate::error::CliError;
use crate::output::Printer;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "adbdeck", &mut std::io::stdout());
            Ok(())
        }

        // Config commands don't need a device
        Command::Config(ref args) => {
            let format = cli.global.output.unwrap_or(cli::OutputFormat::Table);
            let printer = Printer::new(format, cli.global.color, cli.global.quiet);
            commands::config_cmd::handle(args, &cli.global, &printer)
        }

        // All other commands drive adb or fastboot
        cmd => {
            let cfg = config::load(&cli.global)?;
            let session = cfg.to_core()?;
            let format = config::output_format(&cli.global, &cfg);
            let ctx = Context {
                client: AdbClient::new(Executor::new(cfg.to_executor())),
                session,
                printer: Printer::new(format, cli.global.color, cli.global.quiet),
            };

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &ctx).await
        }
    }
}
