use thiserror::Error;

#[derive(Debug, Error)]
pub enum CloudError {
    /// The surface handed to a field cannot be drawn on
    #[error("invalid drawing surface ({width}x{height})")]
    InvalidSurface { width: u32, height: u32 },

    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    #[error("scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("scene format: {0}")]
    Json(#[from] serde_json::Error),

    #[error("remote control: {0}")]
    Remote(String),
}

pub type Result<T> = std::result::Result<T, CloudError>;
