//! `retouch` command-line editor.

mod cli;
mod commands;
mod logging;
mod steps;

use std::process::ExitCode;

use clap::Parser;

use cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    let result = match &cli.command {
        Command::Edit(args) => commands::edit(args).map(|summary| {
            log::debug!(
                "Edit finished: {} steps applied, {} notices",
                summary.applied,
                summary.notices
            );
            true
        }),
        Command::Batch(args) => commands::batch(args),
        Command::Info(args) => commands::info(args).map(|()| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::debug!("Fatal error: {:?}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
