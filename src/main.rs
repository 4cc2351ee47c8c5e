use anyhow::Context;
use minidwh::orchestration::Orchestrator;
use minidwh::{config::Config, AppError, BatchSource, CsvBatchSource, WarehouseState};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().map_err(AppError::from)?;

    let source: Arc<dyn BatchSource> = Arc::new(CsvBatchSource::new(config.batch_dir.clone()));
    let orchestrator = Orchestrator::from_config(source, &config);
    let mut state = WarehouseState::new();

    // One JSON report per line on stdout, printed as each batch lands so that
    // an abort still shows what was applied. Logs go to stderr.
    let summary = orchestrator
        .run_all_with(&mut state, |report| match serde_json::to_string(report) {
            Ok(line) => println!("{}", line),
            Err(e) => {
                tracing::error!(batch = %report.batch_label, error = %e, "failed to encode report")
            }
        })
        .await
        .map_err(AppError::from)
        .with_context(|| format!("processing batches under {}", config.batch_dir.display()))?;

    tracing::info!(
        orders = state.fact_orders().len(),
        user_versions = state.user_history().len(),
        users = state.current_index().len(),
        failed_batches = summary.failed.len(),
        "warehouse loaded"
    );

    Ok(())
}
