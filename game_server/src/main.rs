mod domain;
mod frameworks;
mod interface_adapters;
mod use_cases;

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match frameworks::server::run_with_config().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
