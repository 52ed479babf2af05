//! Binary entrypoint for the `herald` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // Secrets may live in a local .env file.
    dotenvy::dotenv().ok();
    match issue_herald::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
