use clap::Parser;

// Core modules
mod cli;
mod commands;
mod config;
mod tools;

// Layered architecture
mod domain;
mod error;
mod infrastructure;
mod services;
mod ui;

use cli::Cli;
use commands::interactive;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging with LOGGING env var support
    // LOGGING=debug,info,warn,error or just LOGGING=debug
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if cli.verbose {
                "debug".to_string()
            } else {
                "warn".to_string()
            }
        });

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false) // Disable ANSI escape codes for cleaner output
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = interactive::execute(cli).await {
        ui::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
