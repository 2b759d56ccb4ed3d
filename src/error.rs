//! Error types for the icon service

use std::io;
use thiserror::Error;

/// Result type for icon service operations
pub type Result<T> = std::result::Result<T, IconError>;

/// Errors that can occur while resolving or rendering an icon
#[derive(Error, Debug)]
pub enum IconError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    /// No vector-to-raster converter in this build
    #[error("Rasterization is not available")]
    RasterUnavailable,

    /// The converter rejected the SVG or failed mid-render
    #[error("Render error: {0}")]
    Render(String),

    /// Rasterization exceeded the configured time budget
    #[error("Render timed out after {seconds}s")]
    RenderTimeout { seconds: u64 },

    /// Requested raster edge is above the configured limit
    #[error("Requested size {size}px exceeds limit of {max}px")]
    SizeLimit { size: u32, max: u32 },

    /// No template file for the icon
    #[error("Icon template not found: {0}")]
    TemplateNotFound(String),

    /// Async runtime error
    #[error("Async runtime error: {0}")]
    RuntimeError(String),
}

impl IconError {
    /// True for the "converter missing" class, false for every render failure
    pub fn is_unavailable(&self) -> bool {
        matches!(self, IconError::RasterUnavailable)
    }
}

impl From<tokio::task::JoinError> for IconError {
    fn from(err: tokio::task::JoinError) -> Self {
        IconError::RuntimeError(err.to_string())
    }
}
