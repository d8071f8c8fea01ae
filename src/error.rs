//! Crate error types
//!
//! Only brush construction can fail. Per-event degeneracies (NaN input,
//! zero-length movement) are recovered locally inside the sessions and
//! never surface as errors.

use thiserror::Error;

/// Construction-time brush configuration errors
#[derive(Debug, Error)]
pub enum BrushError {
    #[error("texture brush requires at least one texture")]
    EmptyTextureList,

    #[error("unknown texture id: {0}")]
    UnknownTexture(String),

    #[error("invalid brush configuration: {0}")]
    InvalidConfig(String),
}
