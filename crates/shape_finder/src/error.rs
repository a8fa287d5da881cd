use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Invalid detector configuration: {0}")]
    InvalidConfig(String),

    #[error("Region {index} lies outside the {width}x{height} image")]
    RegionOutOfBounds { index: usize, width: u32, height: u32 },

    #[error("Failed to render debug image: {0}")]
    Render(String),

    #[error("Text reader failed: {0}")]
    TextReader(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DetectError>;
