use crate::engine::StaleUserPolicy;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub batch_dir: PathBuf,
    pub stale_user_policy: StaleUserPolicy,
    pub on_batch_error: BatchErrorMode,
}

/// What the run orchestrator does when a batch contains a malformed record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchErrorMode {
    /// Stop the run at the failing batch.
    #[default]
    Abort,
    /// Record the failure and go on with the next batch.
    Continue,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let batch_dir = env_map
            .get("BATCH_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingEnv("BATCH_DIR".to_string()))?;

        let stale_user_policy = match env_map
            .get("STALE_USER_POLICY")
            .map(|s| s.as_str())
            .unwrap_or("accept")
        {
            "accept" => StaleUserPolicy::Accept,
            "reject" => StaleUserPolicy::Reject,
            other => {
                return Err(ConfigError::InvalidValue(
                    "STALE_USER_POLICY".to_string(),
                    format!("must be accept or reject, got {}", other),
                ))
            }
        };

        let on_batch_error = match env_map
            .get("ON_BATCH_ERROR")
            .map(|s| s.as_str())
            .unwrap_or("abort")
        {
            "abort" => BatchErrorMode::Abort,
            "continue" => BatchErrorMode::Continue,
            other => {
                return Err(ConfigError::InvalidValue(
                    "ON_BATCH_ERROR".to_string(),
                    format!("must be abort or continue, got {}", other),
                ))
            }
        };

        Ok(Config {
            batch_dir,
            stale_user_policy,
            on_batch_error,
        })
    }
}
