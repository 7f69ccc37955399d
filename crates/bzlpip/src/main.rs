use std::process::ExitCode;

use anstream::eprintln;
use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;

use crate::cli::{Cli, Commands};
use crate::logging::{Level, setup_logging};
use crate::printer::Printer;
use crate::settings::{ExtractSettings, FilesystemOptions};

mod cli;
mod commands;
mod logging;
mod printer;
mod settings;

fn run(cli: Cli) -> Result<()> {
    setup_logging(Level::from_verbosity(cli.global_args.verbose))?;
    let printer = Printer::from_quiet(cli.global_args.quiet);

    match cli.command {
        Commands::Extract(args) => {
            let filesystem = FilesystemOptions::load(&cli.global_args, &args.directory)?;
            let settings = ExtractSettings::resolve(args, filesystem)?;
            commands::extract(settings, printer)
        }
        Commands::Requirements(args) => commands::requirements(args, printer),
    }
}

#[allow(clippy::print_stderr)]
fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let mut causes = err.chain();
            if let Some(err) = causes.next() {
                eprintln!("{}: {}", "error".red().bold(), err);
            }
            for err in causes {
                eprintln!("  {}: {}", "Caused by".red().bold(), err);
            }
            ExitCode::FAILURE
        }
    }
}
