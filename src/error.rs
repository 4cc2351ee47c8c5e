use crate::config::ConfigError;
use crate::datasource::SourceError;
use crate::orchestration::OrchestrationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Batch source error: {0}")]
    Source(#[from] SourceError),
    #[error("Run aborted: {0}")]
    Run(String),
}

impl From<OrchestrationError> for AppError {
    fn from(err: OrchestrationError) -> Self {
        match err {
            OrchestrationError::Source(e) => AppError::Source(e),
            batch @ OrchestrationError::Batch { .. } => AppError::Run(batch.to_string()),
        }
    }
}
