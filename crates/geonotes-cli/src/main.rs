// ABOUTME: Entry point for the geonotes CLI
// ABOUTME: Loads .env and config, runs one subcommand, and maps failures to exit code 1

use clap::Parser;
use colored::Colorize;
use geonotes_cli::{Cli, Command};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // watch redraws continuously, so its logs go to a file
    if matches!(cli.command, Command::Watch { .. }) {
        geonotes_log::init_file("geonotes");
    } else {
        geonotes_log::init();
    }

    let config = match cli.client_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    match geonotes_cli::run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{} {}",
                "error:".red().bold(),
                geonotes_cli::describe_error(&e, &config.api_url)
            );
            ExitCode::FAILURE
        }
    }
}
