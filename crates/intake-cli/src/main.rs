//! Intake CLI - classify a document and extract its key fields.

use clap::Parser;
use intake_cli::{config, Cli};
use tracing_subscriber::EnvFilter;

fn main() {
    // Global .env first, then the working directory's
    if let Some(home) = dirs::home_dir() {
        let _ = dotenvy::from_path(home.join(".intake/.env"));
    }
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match intake_cli::run(cli, config::api_key_from_env()) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
