//! `clipin paste` command

use anyhow::Result;

use crate::cli::PasteArgs;
use clipin::ops::clipin_restore::{restore, RestoreOptions, RestoreReport};
use clipin::util::fs::human_bytes;
use clipin::util::shell::{Shell, Status};
use clipin::util::GlobalContext;

pub fn execute(args: PasteArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let codec = ctx.codec();
    let clipboard = ctx.clipboard()?;
    let installer = ctx.installer();

    let dest_dir = args.dir.as_deref().map(|dir| ctx.resolve_dir(dir));
    let opts = RestoreOptions::paste(dest_dir);

    let report = restore(&codec, clipboard.as_ref(), &installer, &opts)?;
    print_report(&report, false, shell)
}

/// Print a restore report for `paste` and `install`.
pub(crate) fn print_report(
    report: &RestoreReport,
    clean_requested: bool,
    shell: &Shell,
) -> Result<()> {
    if shell.is_json() {
        let mut event = serde_json::to_value(report)?;
        event["event"] = "restored".into();
        shell.json_event(&event);
        return Ok(());
    }

    if report.stale_removed > 0 {
        shell.status(
            Status::Removed,
            format!("{} stale wheel(s)", report.stale_removed),
        );
    }

    if shell.is_verbose() {
        for archive in &report.archives {
            shell.note(format!(
                "{} ({}, sha256 {})",
                archive.name,
                human_bytes(archive.size),
                archive.sha256
            ));
        }
    }

    shell.status(
        Status::Restored,
        format!(
            "{} wheel(s), {} into {}",
            report.archives.len(),
            human_bytes(report.total_bytes),
            report.directory.display()
        ),
    );

    if report.installed {
        let what = report
            .requirement
            .clone()
            .unwrap_or_else(|| format!("{} wheel(s)", report.archives.len()));
        shell.status(Status::Installed, what);

        if report.cleaned {
            shell.status(Status::Removed, report.directory.display());
        } else if clean_requested {
            shell.warn(format!("could not remove {}", report.directory.display()));
        } else {
            shell.status(Status::Kept, report.directory.display());
        }
    }

    Ok(())
}
