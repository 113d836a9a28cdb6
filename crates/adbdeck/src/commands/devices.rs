//! Device command handlers.

use owo_colors::OwoColorize;
use tabled::Tabled;
use tracing::debug;

use adbdeck_core::{Device, DeviceInfo, DeviceSource, DevicesView, ListController};

use crate::cli::{DeviceCommand, DevicesArgs};
use crate::error::CliError;
use crate::output::{Printer, human_size};

use super::{Context, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Mode")]
    mode: String,
}

impl DeviceRow {
    fn new(d: &Device, color: bool) -> Self {
        let state = d.state.to_string();
        let state = match (color, d.state.is_ready()) {
            (false, _) => state,
            (true, true) => state.green().to_string(),
            (true, false) => state.yellow().to_string(),
        };
        Self {
            serial: d.serial.clone(),
            state,
            mode: d.mode.to_string(),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle_adb(args: &DevicesArgs, ctx: &Context) -> Result<(), CliError> {
    let view = ListController::new(
        DeviceSource::adb(ctx.client.clone()),
        ctx.session.devices.clone(),
        ctx.session.batch.clone(),
    );
    dispatch(&view, args, &ctx.printer).await
}

pub async fn handle_fastboot(args: &DevicesArgs, ctx: &Context) -> Result<(), CliError> {
    let view = ListController::new(
        DeviceSource::fastboot(ctx.client.clone()),
        ctx.session.fastboot.clone(),
        ctx.session.batch.clone(),
    );
    dispatch(&view, args, &ctx.printer).await
}

async fn dispatch(view: &DevicesView, args: &DevicesArgs, printer: &Printer) -> Result<(), CliError> {
    let Some(command) = &args.command else {
        return run(view, args, printer).await;
    };
    match command {
        DeviceCommand::Info { serial } => {
            util::load(view).await?;
            let info = view.device_info(serial.as_deref()).await?;
            printer.single(&info, detail, |i| i.serial.clone())
        }
        DeviceCommand::Reboot { serial, mode, yes } => {
            util::confirm("devices reboot", *yes)?;
            util::load(view).await?;
            let message = view.reboot(serial.as_deref(), (*mode).into()).await?;
            printer.done("reboot", &message)
        }
    }
}

async fn run(view: &DevicesView, args: &DevicesArgs, printer: &Printer) -> Result<(), CliError> {
    if let Some(search) = &args.view.search {
        view.set_search(search);
    }
    view.set_status(args.status.into());
    view.set_sort(args.sort.into(), args.view.direction());

    util::load(view).await?;
    print(view, printer)?;
    if !args.watch {
        return Ok(());
    }

    // Watch: poll in the background, reprint whenever the snapshot changes
    // or a poll starts or stops failing.
    let mut records = view.subscribe_records();
    let mut status = view.coordinator().subscribe_status();
    let mut last_error = view.status().last_error;
    view.start();
    debug!(mode = %view.source().mode(), "watching devices");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = records.changed() => {
                if changed.is_none() {
                    break;
                }
                print(view, printer)?;
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let error = status.borrow_and_update().last_error.clone();
                if error != last_error {
                    last_error = error;
                    print(view, printer)?;
                }
            }
        }
    }
    view.teardown();
    Ok(())
}

fn print(view: &DevicesView, printer: &Printer) -> Result<(), CliError> {
    let filtered = view.view();
    let color = printer.color;
    printer.list(
        &filtered.visible,
        |d| DeviceRow::new(d, color),
        |d| d.serial.clone(),
    )?;
    let stats = filtered.stats;
    printer.footer(&format!(
        "{} device(s): {} ready, {} unavailable",
        stats.total, stats.ready, stats.unavailable
    ));
    if let Some(error) = view.status().last_error {
        printer.footer(&format!("last poll failed: {error}"));
    }
    Ok(())
}

fn detail(info: &DeviceInfo) -> String {
    let kb = |v: Option<u64>| v.map_or_else(|| "-".into(), |kb| human_size(kb.saturating_mul(1024)));
    let mut lines = vec![
        format!("Serial:         {}", info.serial),
        format!("Model:          {}", info.model.as_deref().unwrap_or("-")),
        format!("Brand:          {}", info.brand.as_deref().unwrap_or("-")),
        format!("Codename:       {}", info.codename.as_deref().unwrap_or("-")),
        format!("Name:           {}", info.device_name.as_deref().unwrap_or("-")),
        format!("Android:        {}", info.android_version.as_deref().unwrap_or("-")),
        format!("Build:          {}", info.build_number.as_deref().unwrap_or("-")),
        format!("Security patch: {}", info.security_patch.as_deref().unwrap_or("-")),
        format!("IP:             {}", info.ip_address.as_deref().unwrap_or("-")),
        format!(
            "Battery:        {}",
            info.battery_level.map_or_else(|| "-".into(), |b| format!("{b}%"))
        ),
        format!("RAM:            {}", kb(info.ram_total_kb)),
    ];
    if info.storage_total_kb.is_some() {
        lines.push(format!(
            "Storage:        {} used of {}",
            kb(info.storage_used_kb),
            kb(info.storage_total_kb)
        ));
    }
    lines.push(format!("Rooted:         {}", if info.rooted { "yes" } else { "no" }));
    lines.join("\n")
}
