//! File explorer command handlers.

use owo_colors::OwoColorize;
use tabled::Tabled;

use adbdeck_core::{FileEntry, FileKind, FileSource, FilesView, ListController};

use crate::cli::{DirArg, FilesArgs, FilesCommand};
use crate::error::CliError;
use crate::output::{Printer, human_size};

use super::{Context, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Modified")]
    modified: String,
    #[tabled(rename = "Permissions")]
    permissions: String,
}

impl FileRow {
    fn new(f: &FileEntry, color: bool) -> Self {
        let name = match (f.kind, color) {
            (FileKind::Directory, false) => format!("{}/", f.name),
            (FileKind::Directory, true) => format!("{}/", f.name).blue().bold().to_string(),
            (FileKind::Symlink, true) => f.name.cyan().to_string(),
            _ => f.name.clone(),
        };
        Self {
            name,
            size: f.size.map(human_size).unwrap_or_default(),
            modified: f
                .modified
                .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            permissions: f.permissions.clone(),
        }
    }
}

fn view(ctx: &Context, dir: Option<&str>) -> FilesView {
    let path = dir.unwrap_or(&ctx.session.default_path);
    ListController::new(
        FileSource::new(ctx.client.clone(), path),
        ctx.session.files.clone(),
        ctx.session.batch.clone(),
    )
}

/// Open `dir` and fail unless every name is an entry in it.
async fn open_with(ctx: &Context, dir: &DirArg, names: &[String]) -> Result<FilesView, CliError> {
    let files = view(ctx, dir.path.as_deref());
    tokio::spawn(util::log_notices(files.notices()));
    util::load(&files).await?;
    let list_command = format!("files ls {}", files.current_path());
    util::select_known(&files, names, "entry", &list_command)?;
    Ok(files)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: FilesArgs, ctx: &Context) -> Result<(), CliError> {
    let printer = &ctx.printer;
    match args.command {
        FilesCommand::Ls {
            path,
            status,
            sort,
            view: view_args,
        } => {
            let files = view(ctx, path.as_deref());
            if let Some(search) = &view_args.search {
                files.set_search(search);
            }
            files.set_status(status.into());
            files.set_sort(sort.into(), view_args.direction());
            util::load(&files).await?;
            print(&files, printer)
        }

        FilesCommand::Rm { dir, names, yes } => {
            util::confirm("files rm", yes)?;
            let files = open_with(ctx, &dir, &names).await?;
            let report = files.delete_selected().await?;
            util::finish(&report, printer)
        }

        FilesCommand::Pull { dir, names, dest } => {
            if !dest.is_dir() {
                return Err(CliError::Validation {
                    field: "dest".into(),
                    reason: format!("{} is not a directory", dest.display()),
                });
            }
            let files = open_with(ctx, &dir, &names).await?;
            let report = files.pull_selected(&dest).await?;
            util::finish(&report, printer)
        }

        FilesCommand::Push { dir, local } => {
            if let Some(missing) = local.iter().find(|p| !p.exists()) {
                return Err(CliError::Validation {
                    field: "local".into(),
                    reason: format!("{} does not exist", missing.display()),
                });
            }
            let files = view(ctx, dir.path.as_deref());
            tokio::spawn(util::log_notices(files.notices()));
            let report = files.push_many(&local).await?;
            util::finish(&report, printer)
        }

        FilesCommand::Cp { dir, names, to } => {
            let files = open_with(ctx, &dir, &names).await?;
            let report = files.copy_selected(&to).await?;
            util::finish(&report, printer)
        }

        FilesCommand::Move { dir, names, to } => {
            let files = open_with(ctx, &dir, &names).await?;
            let report = files.move_selected(&to).await?;
            util::finish(&report, printer)
        }

        FilesCommand::Mkdir { dir, name } => {
            let message = view(ctx, dir.path.as_deref()).create_folder(&name).await?;
            printer.done("create folder", &message)
        }

        FilesCommand::Mv { dir, from, to } => {
            let files = open_with(ctx, &dir, std::slice::from_ref(&from)).await?;
            let message = files.rename(&from, &to).await?;
            printer.done("rename", &message)
        }
    }
}

fn print(files: &FilesView, printer: &Printer) -> Result<(), CliError> {
    let filtered = files.view();
    printer.list(
        &filtered.visible,
        |f| FileRow::new(f, printer.color),
        |f| f.name.clone(),
    )?;
    let stats = filtered.stats;
    printer.footer(&format!(
        "{}: {} folder(s), {} file(s)",
        files.current_path(),
        stats.folders,
        stats.files
    ));
    Ok(())
}
