//! `provision` binary: parses the command line and dispatches a subcommand.
use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use provision_cli::cli::{self, Cli, Command};
use provision_cli::commands;

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let (args, dropped) = cli::filter_unknown_args(std::env::args_os());
    let parsed = Cli::parse_from(args);

    let result = match parsed.command_or_default() {
        Command::Install => commands::install::run(&parsed.global, parsed.verbose, &dropped),
        Command::Backup => commands::backup::run(&parsed.global, parsed.verbose, &dropped),
        Command::Summary => commands::summary::run(&parsed.global, parsed.verbose, &dropped),
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "provision", &mut io::stdout());
            Ok(())
        }
        Command::Version => commands::version::run(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::log_fatal(parsed.verbose, &e);
            ExitCode::FAILURE
        }
    }
}
