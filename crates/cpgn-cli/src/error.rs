//! CLI error types

use cpgn_core::{EncodeError, PartialDecode, Violation};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Decode error: {0}")]
    Decode(#[from] PartialDecode),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Cannot replay game: {0}")]
    Replay(#[from] Violation),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
