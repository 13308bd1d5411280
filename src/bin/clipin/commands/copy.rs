//! `clipin copy` command

use anyhow::Result;

use crate::cli::CopyArgs;
use clipin::ops::clipin_copy::{copy, CopyOptions};
use clipin::util::fs::human_bytes;
use clipin::util::shell::{Shell, Status};
use clipin::util::GlobalContext;

pub fn execute(args: CopyArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;

    // Transport: CLI > config
    let mut transport = ctx.codec().transport();
    if let Some(encoding) = args.encoding {
        transport.encoding = encoding;
    }
    if let Some(compression) = args.compression {
        transport.compression = compression;
    }
    let codec = ctx.codec().with_transport(transport);

    let fetcher = ctx.fetcher();
    let clipboard = ctx.clipboard()?;

    let opts = CopyOptions {
        requirement: args.requirement,
        include_deps: args.deps,
    };

    let spinner = shell.spinner(
        Status::Fetching,
        format!(
            "{}{}",
            opts.requirement,
            if opts.include_deps { " with dependencies" } else { "" }
        ),
    );
    let result = copy(&fetcher, &codec, clipboard.as_ref(), &opts);
    spinner.finish();
    let report = result?;

    if shell.is_json() {
        let mut event = serde_json::to_value(&report)?;
        event["event"] = "copied".into();
        shell.json_event(&event);
        return Ok(());
    }

    for archive in &report.archives {
        if shell.is_verbose() {
            shell.note(format!(
                "{} ({}, sha256 {})",
                archive.name,
                human_bytes(archive.size),
                archive.sha256
            ));
        } else {
            shell.note(&archive.name);
        }
    }

    shell.status(
        Status::Copied,
        format!(
            "{} wheel(s), {} as {} characters ({}, {}) to the {} clipboard",
            report.archives.len(),
            human_bytes(report.total_bytes),
            report.payload_len,
            report.encoding,
            report.compression,
            clipboard.name()
        ),
    );

    Ok(())
}
