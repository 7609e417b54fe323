use std::process::ExitCode;

use pomo::cli::run_cli;
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run_cli().await {
        Ok(code) => code,
        Err(e) => {
            error!("Error running cli {e:?}");
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
