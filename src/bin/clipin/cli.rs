//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use clipin::codec::{Compression, TextEncoding};
use clipin::core::RequirementSpec;
use clipin::util::shell::ColorChoice;

/// clipin - carry Python wheels to an offline machine through the clipboard
#[derive(Parser)]
#[command(name = "clipin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Print only errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Output format for reports
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download wheels for a requirement and copy them to the clipboard
    Copy(CopyArgs),

    /// Restore wheels from the clipboard and install them offline
    Install(InstallArgs),

    /// Restore wheels from the clipboard without installing
    Paste(PasteArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
#[command(group(ArgGroup::new("dependencies").required(true).args(["deps", "no_deps"])))]
pub struct CopyArgs {
    /// Requirement to download (e.g. `requests==2.32.3`)
    pub requirement: RequirementSpec,

    /// Include the full dependency closure
    #[arg(long)]
    pub deps: bool,

    /// Copy only the requested package
    #[arg(long)]
    pub no_deps: bool,

    /// Text encoding: b64, b64url, hex
    #[arg(long, value_name = "ENCODING")]
    pub encoding: Option<TextEncoding>,

    /// Compression: gz, none
    #[arg(long, value_name = "COMPRESSION")]
    pub compression: Option<Compression>,
}

#[derive(Args)]
pub struct InstallArgs {
    /// Directory to restore wheels into (default: a new temporary directory)
    #[arg(long, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Install only the top-level package, ignoring dependencies
    #[arg(long)]
    pub no_deps: bool,

    /// Keep the restored wheels after a successful install
    #[arg(long)]
    pub no_clean: bool,

    /// Skip `--force-reinstall`
    #[arg(long)]
    pub no_force_reinstall: bool,
}

#[derive(Args)]
pub struct PasteArgs {
    /// Directory to restore wheels into (default: a new temporary directory)
    #[arg(long, value_name = "PATH")]
    pub dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_copy_requires_dependency_choice() {
        assert!(Cli::try_parse_from(["clipin", "copy", "demo==1.0"]).is_err());
        assert!(
            Cli::try_parse_from(["clipin", "copy", "demo==1.0", "--deps", "--no-deps"]).is_err()
        );

        let cli = Cli::try_parse_from([
            "clipin",
            "copy",
            "demo==1.0",
            "--no-deps",
            "--encoding",
            "hex",
        ])
        .unwrap();
        match cli.command {
            Commands::Copy(args) => {
                assert!(args.no_deps);
                assert_eq!(args.encoding, Some(TextEncoding::Hex));
                assert_eq!(args.requirement.as_str(), "demo==1.0");
            }
            _ => panic!("expected copy"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "clipin",
            "paste",
            "--dir",
            "out",
            "--message-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.message_format, MessageFormat::Json);
    }
}
