//! `kitt` binary entry point.
use anyhow::Result;
use clap::Parser;

use kitt_cli::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    let quiet = matches!(&args.command, cli::Command::Install(opts) if opts.json);
    logging::init_subscriber(args.verbose, quiet, args.command.name());

    match args.command {
        cli::Command::Install(opts) => {
            let log = logging::Logger::new("install");
            commands::install::run(&args.global, &opts, log)
        }
        cli::Command::Matrix => {
            commands::matrix::run();
            Ok(())
        }
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
