use anyhow::Result;
use clap::Parser;
use quiz_forge::ai::OpenRouterProvider;
use quiz_forge::app;
use quiz_forge::cli::Cli;
use quiz_forge::logger;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    app::setup_panic_hook();

    let log_dir = cli.log_dir.clone().unwrap_or_else(logger::default_log_dir);
    let guard = logger::init(&log_dir)?;
    eprintln!(
        "Logs are being written to: {:?}",
        log_dir.join(logger::LOG_FILE_NAME)
    );

    info!(model = %cli.model, "Starting quiz-forge");
    let provider = Arc::new(OpenRouterProvider::new(cli.model_config()));
    let result = app::run(provider, cli.setup_form(), cli.model.clone()).await;

    drop(guard);
    result
}
