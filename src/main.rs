//! artpath binary entrypoint.

use std::process::ExitCode;

use artifact_paths::cli_app::{Cli, run};
use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "error": err.to_string(), "code": err.code() })
                );
            } else {
                eprintln!("error: {err}");
            }
            ExitCode::FAILURE
        }
    }
}
