use image::{GrayImage, RgbImage};
use crate::{error::Result, types::Contour};

/// Trait for grayscale enhancement steps run before binarization
pub trait ImagePreprocessor: Send + Sync {
    /// Preprocess the input image (e.g., blur, contrast equalization)
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage>;
}

/// Trait for contour extraction algorithms
pub trait ContourExtractor: Send + Sync {
    /// Extract the outermost boundaries of the ink regions (255) in a binary mask
    fn extract_contours(&self, mask: &GrayImage) -> Result<Vec<Contour>>;
}

/// Trait for the external text recognizer regions are handed to
pub trait TextReader: Send + Sync {
    /// Read the text inside one cropped region
    fn read_text(&self, region: &RgbImage) -> Result<String>;
}
