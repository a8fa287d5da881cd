//! Hand-off of detected regions to an external text recognizer.

use image::DynamicImage;
use serde::Serialize;
use tracing::warn;

use crate::{
    error::DetectError,
    traits::TextReader,
    types::ShapeRegion,
};

/// What the reader made of one region
#[derive(Debug, Clone, Serialize)]
pub struct RegionText {
    /// 1-based rank of the region, matching the debug overlay labels
    pub rank: usize,
    pub bbox: (u32, u32, u32, u32),
    pub text: Option<String>,
    pub error: Option<String>,
}

impl RegionText {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Crop every region and run `reader` on it.
///
/// A region that cannot be cropped or read is recorded with its error; the rest of
/// the batch still runs.
pub fn read_regions(image: &DynamicImage, regions: &[ShapeRegion], reader: &dyn TextReader) -> Vec<RegionText> {
    regions
        .iter()
        .enumerate()
        .map(|(index, region)| {
            let result = region
                .crop(image)
                .ok_or(DetectError::RegionOutOfBounds {
                    index,
                    width: image.width(),
                    height: image.height(),
                })
                .and_then(|crop| reader.read_text(&crop));

            let (text, error) = match result {
                Ok(text) => (Some(text), None),
                Err(e) => {
                    warn!("Region {} could not be read: {}", index + 1, e);
                    (None, Some(e.to_string()))
                }
            };

            RegionText {
                rank: index + 1,
                bbox: region.bbox(),
                text,
                error,
            }
        })
        .collect()
}
