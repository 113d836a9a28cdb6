//! Package command handlers.

use owo_colors::OwoColorize;
use tabled::Tabled;

use adbdeck_core::{ListController, Package, PackageBatch, PackageScope, PackageSource, PackagesView};

use crate::cli::{PackagesArgs, PackagesCommand};
use crate::error::CliError;

use super::{Context, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PackageRow {
    #[tabled(rename = "Package")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
}

impl PackageRow {
    fn new(p: &Package, color: bool) -> Self {
        let state = match (p.enabled, color) {
            (true, false) => "enabled".to_owned(),
            (false, false) => "disabled".to_owned(),
            (true, true) => "enabled".green().to_string(),
            (false, true) => "disabled".red().to_string(),
        };
        Self {
            name: p.name.clone(),
            state,
        }
    }
}

fn view(ctx: &Context, scope: PackageScope) -> PackagesView {
    ListController::new(
        PackageSource::new(ctx.client.clone(), scope),
        ctx.session.packages.clone(),
        ctx.session.batch.clone(),
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: PackagesArgs, ctx: &Context) -> Result<(), CliError> {
    let printer = &ctx.printer;
    match args.command {
        PackagesCommand::List {
            scope,
            status,
            sort,
            view: view_args,
        } => {
            let scope = scope.map_or(ctx.session.default_scope, PackageScope::from);
            let packages = view(ctx, scope);
            if let Some(search) = &view_args.search {
                packages.set_search(search);
            }
            packages.set_status(status.into());
            packages.set_sort(sort.into(), view_args.direction());
            util::load(&packages).await?;

            let filtered = packages.view();
            printer.list(
                &filtered.visible,
                |p| PackageRow::new(p, printer.color),
                |p| p.name.clone(),
            )?;
            let stats = filtered.stats;
            printer.footer(&format!(
                "{} {scope} package(s): {} enabled, {} disabled",
                stats.total, stats.enabled, stats.disabled
            ));
            Ok(())
        }

        PackagesCommand::Uninstall { packages, yes } => {
            util::confirm("packages uninstall", yes)?;
            bulk(ctx, &packages, PackageBatch::Uninstall).await
        }
        PackagesCommand::Disable { packages } => bulk(ctx, &packages, PackageBatch::Disable).await,
        PackagesCommand::Enable { packages } => bulk(ctx, &packages, PackageBatch::Enable).await,

        PackagesCommand::Install { apk } => {
            if !apk.is_file() {
                return Err(CliError::Validation {
                    field: "apk".into(),
                    reason: format!("{} is not a file", apk.display()),
                });
            }
            let message = view(ctx, ctx.session.default_scope).install(&apk).await?;
            printer.done("install", &message)
        }

        PackagesCommand::Clear { package, yes } => {
            util::confirm("packages clear", yes)?;
            let message = view(ctx, ctx.session.default_scope)
                .clear_data(&package)
                .await?;
            printer.done("clear data", &message)
        }

        PackagesCommand::Pull { package, dest } => {
            let message = view(ctx, ctx.session.default_scope)
                .pull_apk(&package, &dest)
                .await?;
            printer.done("pull apk", &message)
        }
    }
}

/// Select `packages` across every scope and run one batch over them.
async fn bulk(ctx: &Context, packages: &[String], kind: PackageBatch) -> Result<(), CliError> {
    let view = view(ctx, PackageScope::All);
    tokio::spawn(util::log_notices(view.notices()));
    util::load(&view).await?;
    util::select_known(&view, packages, "package", "packages list --scope all")?;
    util::run_batch(&view, kind, &ctx.printer).await
}
