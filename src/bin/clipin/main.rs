//! clipin CLI - carry Python wheels to an offline machine through the clipboard

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use clipin::core::ClipError;
use clipin::util::diagnostic;
use clipin::util::Shell;

mod cli;
mod commands;

use cli::{Cli, Commands, MessageFormat};

fn main() {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging; RUST_LOG wins over the verbosity flag
    let default_filter = if cli.verbose { "clipin=debug" } else { "clipin=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let shell = Shell::from_flags(
        cli.quiet,
        cli.verbose,
        cli.color,
        cli.message_format == MessageFormat::Json,
    );

    if let Err(e) = run(cli.command, &shell) {
        std::process::exit(report(&e, &shell));
    }
}

fn run(command: Commands, shell: &Shell) -> Result<()> {
    match command {
        Commands::Copy(args) => commands::copy::execute(args, shell),
        Commands::Install(args) => commands::install::execute(args, shell),
        Commands::Paste(args) => commands::paste::execute(args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print an error and pick the exit code for it.
fn report(err: &anyhow::Error, shell: &Shell) -> i32 {
    let (diag, code) = match err.downcast_ref::<ClipError>() {
        Some(clip) => (clip.to_diagnostic(), clip.exit_code()),
        None => (diagnostic::Diagnostic::error(format!("{:#}", err)), 1),
    };

    if shell.is_json() {
        shell.json_event(&serde_json::json!({
            "event": "error",
            "code": code,
            "message": format!("{:#}", err),
        }));
    }
    diagnostic::emit(&diag, shell.use_color());
    code
}
