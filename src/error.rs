//! Error types for overlay setup
//!
//! None of these reach the user. Lifecycle code logs them and leaves the
//! overlay inert.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("no global window available")]
    NoWindow,

    #[error("canvas element '{0}' not found")]
    CanvasNotFound(String),

    #[error("element '{0}' is not a canvas")]
    NotACanvas(String),

    #[error("2d drawing context unavailable")]
    ContextUnavailable,

    #[error("browser call failed: {0}")]
    Js(String),

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("setting out of range: {0}")]
    InvalidSettings(String),
}
