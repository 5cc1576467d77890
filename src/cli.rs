//! Command-line interface definitions.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::matrix::HostId;

/// Top-level CLI entry point for the resource installer.
#[derive(Parser, Debug)]
#[command(
    name = "kitt",
    about = "Compile shared commands, agents and skills for Claude, Gemini and Copilot CLIs",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Canonical resource tree (defaults to $KITT_SOURCE, then the current directory)
    #[arg(short, long, global = true)]
    pub source: Option<PathBuf>,

    /// Config file (defaults to <source>/kitt.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Reconcile hosts one after another (hosts run in parallel by default)
    #[arg(long = "no-parallel", global = true, action = clap::ArgAction::SetFalse)]
    pub parallel: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install resources into every enabled host
    Install(InstallOpts),
    /// Print the host capability matrix
    Matrix,
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Matrix => "matrix",
            Self::Version => "version",
        }
    }
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InstallOpts {
    /// Install only into these hosts (claude, gemini, copilot)
    #[arg(long = "host", value_delimiter = ',')]
    pub hosts: Vec<HostId>,

    /// Print the install report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_install_defaults() {
        let cli = Cli::parse_from(["kitt", "install"]);
        assert!(cli.global.parallel);
        assert!(!cli.global.dry_run);
        assert!(cli.global.source.is_none());
        let Command::Install(opts) = cli.command else {
            panic!("expected install");
        };
        assert!(opts.hosts.is_empty());
        assert!(!opts.json);
    }

    #[test]
    fn parse_host_list() {
        let cli = Cli::parse_from(["kitt", "install", "--host", "claude,copilot"]);
        let Command::Install(opts) = cli.command else {
            panic!("expected install");
        };
        assert_eq!(opts.hosts, vec![HostId::Claude, HostId::Copilot]);
    }

    #[test]
    fn unknown_host_is_rejected() {
        assert!(Cli::try_parse_from(["kitt", "install", "--host", "vim"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "kitt",
            "install",
            "--dry-run",
            "--no-parallel",
            "--source",
            "/res",
            "-v",
        ]);
        assert!(cli.global.dry_run);
        assert!(!cli.global.parallel);
        assert!(cli.verbose);
        assert_eq!(cli.global.source, Some(PathBuf::from("/res")));
    }

    #[test]
    fn matrix_and_version_parse() {
        assert!(matches!(
            Cli::parse_from(["kitt", "matrix"]).command,
            Command::Matrix
        ));
        assert_eq!(Cli::parse_from(["kitt", "version"]).command.name(), "version");
    }
}
