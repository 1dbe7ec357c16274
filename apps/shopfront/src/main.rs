//! # Shopfront Entry Point
//!
//! Parses the command line and hands off to [`shopfront_lib::run`]. The
//! actual setup lives in lib.rs for better testability.

use std::process::ExitCode;

use clap::Parser;

use shopfront_lib::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;

    match shopfront_lib::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                match serde_json::to_string(&e) {
                    Ok(rendered) => eprintln!("{}", rendered),
                    Err(_) => eprintln!("error: {}", e.message),
                }
            } else {
                eprintln!("error: {}", e.message);
            }
            ExitCode::FAILURE
        }
    }
}
