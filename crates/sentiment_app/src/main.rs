mod app;
mod cli;
mod effects;
mod render;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    engine_logging::initialize(cli.log.into(), cli.log_level());

    match app::run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("sentiment: {err:#}");
            ExitCode::from(app::EXIT_STARTUP)
        }
    }
}
