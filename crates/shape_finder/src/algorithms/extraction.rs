use image::GrayImage;
use imageproc::contours::BorderType;
use crate::{error::Result, traits::ContourExtractor, types::Contour};

/// Imageproc-based contour extractor keeping only outermost borders.
///
/// Holes and anything nested inside them are dropped: a hand-drawn ring and the
/// text written inside it both belong to the ring's outer boundary.
#[derive(Debug, Clone, Default)]
pub struct ImageprocContourExtractor;

impl ContourExtractor for ImageprocContourExtractor {
    fn extract_contours(&self, mask: &GrayImage) -> Result<Vec<Contour>> {
        let contours = imageproc::contours::find_contours::<i32>(mask);

        let result = contours
            .into_iter()
            .filter(|contour| matches!(contour.border_type, BorderType::Outer) && contour.parent.is_none())
            .map(|contour| {
                Contour::new(contour.points.iter().map(|p| [p.x, p.y]).collect())
            })
            .collect();

        Ok(result)
    }
}
