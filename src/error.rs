use thiserror::Error;

/// Errors raised by the painting core (rendering, stylize, project export)
#[derive(Debug, Error)]
pub enum PaintError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode or decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to serialize metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Layer index {index} out of range (layer count: {count})")]
    InvalidLayer { index: usize, count: usize },

    #[error("Canvas size {width}x{height} has no pixels")]
    EmptyCanvas { width: u32, height: u32 },
}

/// Result type for painting operations
pub type PaintResult<T> = Result<T, PaintError>;
