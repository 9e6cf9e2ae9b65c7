// Standard library
use std::env;

// External crates
use clap::Parser;

// Internal imports
use dbdock_core::dbk_error;

// Local modules
mod cli;
mod commands;
mod postgres;

use cli::Args;
use commands::execute_command;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // The --debug flag is a shorthand for LOG_LEVEL=debug; an explicit
    // environment setting wins.
    if args.debug && env::var("LOG_LEVEL").is_err() {
        env::set_var("LOG_LEVEL", "debug");
    }

    // Keep the guard alive for the whole run so file logging flushes on exit.
    let _log_guard = dbdock_logging::init_subscriber();

    if let Err(e) = execute_command(args).await {
        dbk_error!("Error: {}", e);
        std::process::exit(1);
    }
}
