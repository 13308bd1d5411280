//! `clipin install` command

use anyhow::Result;

use super::paste::print_report;
use crate::cli::InstallArgs;
use clipin::ops::clipin_restore::{restore, RestoreOptions};
use clipin::util::shell::{Shell, Status};
use clipin::util::GlobalContext;

pub fn execute(args: InstallArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let codec = ctx.codec();
    let clipboard = ctx.clipboard()?;
    let installer = ctx.installer();

    // Flags can only turn config defaults off
    let defaults = &ctx.config().install;
    let opts = RestoreOptions {
        dest_dir: args.dir.as_deref().map(|dir| ctx.resolve_dir(dir)),
        install: true,
        deps: !args.no_deps,
        clean_on_success: defaults.clean && !args.no_clean,
        force_reinstall: defaults.force_reinstall && !args.no_force_reinstall,
    };

    let spinner = shell.spinner(Status::Installing, "wheels from the clipboard");
    let result = restore(&codec, clipboard.as_ref(), &installer, &opts);
    spinner.finish();

    print_report(&result?, opts.clean_on_success, shell)
}
