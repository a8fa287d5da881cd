//! # Hand-drawn Shape Finder
//!
//! Locates hand-drawn circles and ellipses in scanned pages and returns padded
//! regions around them, ready to be handed to a text recognizer.
//!
//! ## Core Features
//!
//! - **Multi-strategy binarization**: 17 adaptive, global and inverted thresholds
//!   compete, and the mask with the most plausible contours wins
//! - **Geometric classification**: circularity, multi-scale vertex counts, aspect
//!   ratio, compactness and extent decide what counts as round
//! - **Trait-based stages**: swap preprocessors, the contour extractor or the text
//!   reader by implementing a trait
//! - **Debug overlays**: boxes, ranks and contours drawn on a copy of the scan
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shape_finder::{Detector, DetectorConfig, load_image};
//!
//! let image = load_image("scan.png")?;
//! let detection = Detector::default().detect(&image, &DetectorConfig::default())?;
//!
//! for (rank, region) in detection.regions.iter().enumerate() {
//!     println!("{}: {} at {:?}", rank + 1, region.shape_category, region.bbox());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Detector
//!
//! ```rust,no_run
//! use shape_finder::{Detector, algorithms::*};
//!
//! let detector = Detector::builder()
//!     .add_preprocessor(GaussianBlurPreprocessor { sigma: 1.2 })
//!     .add_preprocessor(ClahePreprocessor { clip_limit: 3.0, tiles_x: 4, tiles_y: 4 })
//!     .strategies([BinarizationStrategy::Otsu, BinarizationStrategy::Fixed { threshold: 100 }])
//!     .parallel(true)
//!     .build();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod config;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod regions;
pub mod render;
pub mod text;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-exports for convenience
pub use error::{DetectError, Result};
pub use config::DetectorConfig;
pub use types::{
    Contour, ContourOutcome, Detection, DetectionStats, DetectionWarning, ShapeCategory,
    ShapeDescriptor, ShapeRegion,
};
pub use traits::*;
pub use pipeline::{Detector, builder::DetectorBuilder, load_image, load_image_from_bytes};
pub use regions::crop_all;
pub use render::{RenderOptions, render_debug, save_debug_image};
pub use text::{RegionText, read_regions};
