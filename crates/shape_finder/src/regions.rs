//! Padded bounding regions around accepted shapes.

use image::{DynamicImage, RgbImage};

use crate::{
    error::{DetectError, Result},
    types::{Contour, ShapeDescriptor, ShapeRegion},
};

/// Smallest padding added around a shape, in pixels
pub const MIN_MARGIN: u32 = 8;

/// Padding for a `width` x `height` box: an eighth of the shorter side, at least
/// [`MIN_MARGIN`]. Pen strokes wander outside the fitted boundary and text written
/// inside must not be clipped.
pub fn margin_for(width: u32, height: u32) -> u32 {
    MIN_MARGIN.max(width.min(height) / 8)
}

/// Build the padded, image-clamped region for an accepted contour
pub fn build_region(
    contour: Contour,
    descriptor: ShapeDescriptor,
    image_width: u32,
    image_height: u32,
) -> Option<ShapeRegion> {
    let [min_x, min_y, _, _] = contour.bounds()?;
    let (width, height) = contour.bounding_size()?;
    let margin = margin_for(width, height) as i64;

    let x = (min_x as i64 - margin).max(0);
    let y = (min_y as i64 - margin).max(0);
    let width = (image_width as i64 - x).min(width as i64 + 2 * margin);
    let height = (image_height as i64 - y).min(height as i64 + 2 * margin);

    if width <= 0 || height <= 0 {
        return None;
    }

    Some(ShapeRegion {
        x: x as u32,
        y: y as u32,
        width: width as u32,
        height: height as u32,
        shape_category: descriptor.shape_category,
        source_contour: contour,
        descriptor,
    })
}

/// Largest first; the sort is stable so equal areas keep discovery order
pub fn sort_by_area(regions: &mut [ShapeRegion]) {
    regions.sort_by(|a, b| b.area().cmp(&a.area()));
}

impl ShapeRegion {
    /// Copy the region's pixels out of `image`; `None` when the region does not
    /// fit inside it
    pub fn crop(&self, image: &DynamicImage) -> Option<RgbImage> {
        let (_, _, right, bottom) = self.bbox();
        if self.width == 0 || self.height == 0 || right > image.width() || bottom > image.height() {
            return None;
        }

        Some(image.crop_imm(self.x, self.y, self.width, self.height).to_rgb8())
    }
}

/// Crop every region, in list order
pub fn crop_all(image: &DynamicImage, regions: &[ShapeRegion]) -> Result<Vec<RgbImage>> {
    regions
        .iter()
        .enumerate()
        .map(|(index, region)| {
            region.crop(image).ok_or(DetectError::RegionOutOfBounds {
                index,
                width: image.width(),
                height: image.height(),
            })
        })
        .collect()
}
