use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let cli = cli::Cli::parse();
    match commands::run_command(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "fatal:".red().bold(), err);
            ExitCode::from(128)
        }
    }
}
