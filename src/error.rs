use thiserror::Error;

/// Failures that abort a run. Everything else the engine can recover
/// from (dangling links, exhausted correction budgets) is reported in
/// the result instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("malformed request: {0}")]
    Malformed(#[from] serde_json::Error),
}
