use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    sahaay_cli::run().await
}
