use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match matchmaker::run_with_config().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
