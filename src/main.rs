// src/main.rs

use std::process::ExitCode;

use runhook::{cli, logging, run};

#[tokio::main]
async fn main() -> ExitCode {
    match run_main().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("runhook error: {err:?}");
            // Returning lets the runtime shut down, so children of runs
            // still in flight are killed on drop.
            ExitCode::FAILURE
        }
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    tracing::info!("Starting runhook...");
    run(args).await?;
    Ok(())
}
