//! Error types for the scanview-core library.
//!
//! The overlay itself has no failure states: odd geometry and empty mark
//! lists are valid input. Errors only come from the collaborators around it
//! (configuration, resource loading, persistence and the window host).

use thiserror::Error;

/// Errors that can occur within the scanview-core library.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (unparsable or out-of-range values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A resource supplied by the host (handle glyph, frame image) could not be loaded.
    #[error("Resource error: {0}")]
    Resource(String),

    /// Image decoding or encoding failed.
    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    /// UI-related errors (window creation, event loop).
    #[error("UI error: {0}")]
    Ui(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a resource error with the given message.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Creates an image processing error with the given message.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::ImageProcessing(msg.into())
    }

    /// Creates a UI error with the given message.
    pub fn ui(msg: impl Into<String>) -> Self {
        Self::Ui(msg.into())
    }
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
