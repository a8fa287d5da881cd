use crate::{config::DetectorConfig, types::Contour};

/// Minimum contour side, as a fraction of the shorter image side, squared into an
/// area floor that scales with the image
const MIN_DIMENSION_FRACTION: f64 = 0.005;

/// Area bounds a contour has to satisfy to count as a candidate shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeFilter {
    pub min_area_ratio: f64,
    pub max_area_ratio: f64,
    pub min_absolute_area: f64,
    image_width: u32,
    image_height: u32,
}

/// Why a contour failed the size check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeRejection {
    /// Fewer than 3 points, or an area that is not a positive finite number
    Degenerate,
    RatioOutOfRange,
    BelowAbsoluteArea,
    BelowDimensionFloor,
}

impl SizeFilter {
    pub fn new(config: &DetectorConfig, image_width: u32, image_height: u32) -> Self {
        Self {
            min_area_ratio: config.min_area_ratio,
            max_area_ratio: config.max_area_ratio,
            min_absolute_area: config.min_absolute_area as f64,
            image_width,
            image_height,
        }
    }

    pub fn image_area(&self) -> f64 {
        self.image_width as f64 * self.image_height as f64
    }

    /// Area floor derived from the image dimensions alone
    pub fn dimension_floor(&self) -> f64 {
        let side = self.image_width.min(self.image_height) as f64 * MIN_DIMENSION_FRACTION;
        side * side
    }

    /// Check one contour, failing closed on malformed input
    pub fn check(&self, contour: &Contour) -> Result<f64, SizeRejection> {
        if contour.len() < 3 {
            return Err(SizeRejection::Degenerate);
        }

        let area = contour.area();
        if !area.is_finite() || area <= 0.0 {
            return Err(SizeRejection::Degenerate);
        }

        let image_area = self.image_area();
        if image_area <= 0.0 {
            return Err(SizeRejection::Degenerate);
        }

        let ratio = area / image_area;
        if ratio < self.min_area_ratio || ratio > self.max_area_ratio {
            return Err(SizeRejection::RatioOutOfRange);
        }
        if area < self.min_absolute_area {
            return Err(SizeRejection::BelowAbsoluteArea);
        }
        if area < self.dimension_floor() {
            return Err(SizeRejection::BelowDimensionFloor);
        }

        Ok(area)
    }

    pub fn accepts(&self, contour: &Contour) -> bool {
        self.check(contour).is_ok()
    }

    pub fn count_passing(&self, contours: &[Contour]) -> usize {
        contours.iter().filter(|c| self.accepts(c)).count()
    }
}
