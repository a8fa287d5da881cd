pub mod builder;

use std::path::Path;

use image::{DynamicImage, GrayImage};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    algorithms::{
        binarization::Binarizer,
        classification::describe,
        discrimination::matching_rule,
        filtering::{SizeFilter, SizeRejection},
        selection::BinarizationSelector,
    },
    config::DetectorConfig,
    error::{DetectError, Result},
    regions::{build_region, sort_by_area},
    render::{render_debug, RenderOptions},
    traits::{ContourExtractor, ImagePreprocessor},
    types::{Contour, ContourOutcome, Detection, DetectionStats, DetectionWarning},
};

/// Finds hand-drawn circles and ellipses in scanned images.
///
/// A detector holds only its processing stages. Thresholds arrive with every call
/// as a [`DetectorConfig`], and nothing is carried over from one call to the next.
pub struct Detector {
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    binarizer: Binarizer,
    contour_extractor: Box<dyn ContourExtractor>,
    parallel: bool,
    render_options: RenderOptions,
}

impl Default for Detector {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Detector {
    /// Create a new detector builder
    pub fn builder() -> builder::DetectorBuilder {
        builder::DetectorBuilder::new()
    }

    pub fn new(
        preprocessors: Vec<Box<dyn ImagePreprocessor>>,
        binarizer: Binarizer,
        contour_extractor: Box<dyn ContourExtractor>,
        parallel: bool,
        render_options: RenderOptions,
    ) -> Self {
        Self {
            preprocessors,
            binarizer,
            contour_extractor,
            parallel,
            render_options,
        }
    }

    /// Detect round shapes in a decoded image.
    ///
    /// With `config.debug` set, the result also carries an overlay of the accepted
    /// regions drawn on a copy of `image`.
    pub fn detect(&self, image: &DynamicImage, config: &DetectorConfig) -> Result<Detection> {
        let mut detection = self.detect_gray(&image.to_luma8(), config)?;

        if config.debug {
            detection.debug_image = Some(render_debug(&image.to_rgb8(), &detection.regions, &self.render_options));
        }

        Ok(detection)
    }

    /// Detect round shapes in an already grayscale image
    pub fn detect_gray(&self, image: &GrayImage, config: &DetectorConfig) -> Result<Detection> {
        config.validate()?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(DetectError::EmptyImage { width, height });
        }

        // Step 1: Grayscale enhancement
        let enhanced = self.enhance(image)?;

        // Step 2: Candidate masks, scored and reduced to one
        let candidates = self.binarizer.candidates(&enhanced, self.parallel);
        let filter = SizeFilter::new(config, width, height);
        let selector = BinarizationSelector::new(self.contour_extractor.as_ref(), filter);
        let selection = selector.select(candidates, &enhanced, self.parallel)?;

        let mut warnings = Vec::new();
        if selection.fallback {
            warnings.push(DetectionWarning::NoUsableBinarization {
                fallback: selection.strategy.name(),
                candidates: selection.candidates,
            });
        }
        info!(
            "Using binarization {} ({} valid contours)",
            selection.name(),
            selection.contour_count
        );

        // Step 3: Contours of the cleaned mask
        let contours = self.contour_extractor.extract_contours(&selection.mask)?;

        // Step 4: Size filter and shape description, per contour
        let outcomes: Vec<ContourOutcome> = if self.parallel {
            contours.par_iter().map(|c| evaluate(&filter, c)).collect()
        } else {
            contours.iter().map(|c| evaluate(&filter, c)).collect()
        };

        // Step 5: Round shapes become padded regions
        let mut stats = DetectionStats {
            candidates: selection.candidates,
            ..Default::default()
        };
        let mut regions = Vec::new();

        for (index, (contour, outcome)) in contours.into_iter().zip(outcomes).enumerate() {
            stats.record(&outcome);

            let descriptor = match outcome {
                ContourOutcome::Accepted(descriptor) => descriptor,
                ContourOutcome::RejectedForSize => {
                    if config.debug {
                        debug!("Contour {} rejected: area {:.0} out of bounds", index, contour.area());
                    }
                    continue;
                }
                ContourOutcome::RejectedForGeometry => {
                    if config.debug {
                        debug!("Contour {} rejected: degenerate geometry", index);
                    }
                    continue;
                }
            };

            let Some(rule) = matching_rule(&descriptor) else {
                stats.rejected_for_shape += 1;
                if config.debug {
                    debug!(
                        "Contour {} rejected: not round (category {}, circularity {:.3}, vertices {}, aspect {:.2})",
                        index,
                        descriptor.shape_category,
                        descriptor.circularity,
                        descriptor.vertex_count,
                        descriptor.aspect_ratio
                    );
                }
                continue;
            };

            match build_region(contour, descriptor, width, height) {
                Some(region) => {
                    if config.debug {
                        debug!(
                            "Contour {} accepted by {:?}: {} at ({}, {}) {}x{}",
                            index, rule, region.shape_category, region.x, region.y, region.width, region.height
                        );
                    }
                    stats.accepted += 1;
                    regions.push(region);
                }
                None => stats.rejected_for_geometry += 1,
            }
        }

        sort_by_area(&mut regions);

        info!(
            "Detected {} shapes from {} contours ({} too small or large, {} degenerate, {} not round)",
            regions.len(),
            stats.contours,
            stats.rejected_for_size,
            stats.rejected_for_geometry,
            stats.rejected_for_shape
        );

        Ok(Detection {
            regions,
            image_width: width,
            image_height: height,
            strategy: selection.name(),
            warnings,
            stats,
            debug_image: None,
        })
    }

    /// Run the enhancement chain
    pub fn enhance(&self, image: &GrayImage) -> Result<GrayImage> {
        let mut processed = image.clone();
        for preprocessor in &self.preprocessors {
            processed = preprocessor.preprocess(&processed)?;
        }
        Ok(processed)
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }

    /// Get information about the detector configuration
    pub fn info(&self) -> String {
        format!(
            "Detector: {} preprocessors, {} binarization strategies, parallel: {}",
            self.preprocessors.len(),
            self.binarizer.strategies.len(),
            self.parallel
        )
    }
}

/// Size filter first, then shape description. Contours with no usable area are
/// geometry failures, not size failures.
pub fn evaluate(filter: &SizeFilter, contour: &Contour) -> ContourOutcome {
    match filter.check(contour) {
        Ok(_) => {}
        Err(SizeRejection::Degenerate) => return ContourOutcome::RejectedForGeometry,
        Err(_) => return ContourOutcome::RejectedForSize,
    }
    match describe(contour) {
        Some(descriptor) => ContourOutcome::Accepted(descriptor),
        None => ContourOutcome::RejectedForGeometry,
    }
}

/// Decode an image file
pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    Ok(image::open(path)?)
}

/// Decode an in-memory image, guessing the format from its header
pub fn load_image_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_utils::{blank_scan, disk_scan, plus_scan, ring_scan, square_scan},
        types::ShapeCategory,
    };

    fn detect(image: &DynamicImage) -> Detection {
        Detector::default().detect(image, &DetectorConfig::default()).unwrap()
    }

    #[test]
    fn test_single_disk() {
        // r = 56 gives an area close to 10,000 px²
        let image = disk_scan(1000, 1000, (500, 500), 56);
        let detection = detect(&image);

        assert_eq!(detection.regions.len(), 1);
        let region = &detection.regions[0];
        assert_eq!(region.shape_category, ShapeCategory::CircleLike);
        assert!(region.descriptor.circularity > 0.8);
        let (x1, y1, x2, y2) = region.bbox();
        assert!(x1 < 444 && y1 < 444 && x2 > 556 && y2 > 556);
        assert!(detection.is_reliable());
        assert_eq!(detection.stats.accepted, 1);
        assert_eq!(detection.stats.candidates, 17);
    }

    #[test]
    fn test_blank_page_falls_back_without_error() {
        let image = DynamicImage::ImageRgb8(blank_scan(300, 200));
        let detection = detect(&image);

        assert!(detection.regions.is_empty());
        assert_eq!(detection.strategy, "otsu_fallback");
        assert!(matches!(
            detection.warnings.as_slice(),
            [DetectionWarning::NoUsableBinarization { candidates: 17, .. }]
        ));
        assert!(!detection.is_reliable());
    }

    #[test]
    fn test_thin_cross_is_rejected() {
        let image = plus_scan(400, 400, (200, 200), 240, 12);
        let detection = detect(&image);

        assert!(detection.regions.is_empty());
        assert!(detection.stats.rejected_for_shape >= 1);
    }

    #[test]
    fn test_filled_square_passes_on_circularity() {
        // π/4 circularity clears the circle_like threshold of 0.7
        let image = square_scan(1000, 1000, (450, 450), 100);
        let detection = detect(&image);

        assert_eq!(detection.regions.len(), 1);
        assert!(detection.regions[0].shape_category.is_round());
    }

    #[test]
    fn test_two_rings_give_two_regions() {
        let image = ring_scan(600, 400, &[((150, 200), 80), ((450, 200), 60)], 4);
        let detection = detect(&image);

        assert_eq!(detection.regions.len(), 2);
        assert!(detection.regions.iter().all(|r| r.shape_category == ShapeCategory::CircleLike));
        // Larger ring first
        assert!(detection.regions[0].area() >= detection.regions[1].area());
        assert!(detection.regions[0].x < 100);
        assert!(detection.regions[1].x > 350);
    }

    #[test]
    fn test_regions_stay_inside_image() {
        let image = disk_scan(300, 300, (30, 30), 25);
        let detection = detect(&image);

        assert_eq!(detection.regions.len(), 1);
        let region = &detection.regions[0];
        assert_eq!((region.x, region.y), (0, 0));
        let (_, _, right, bottom) = region.bbox();
        assert!(right <= 300 && bottom <= 300);
    }

    #[test]
    fn test_region_areas_respect_ratio_bounds() {
        let image = ring_scan(600, 400, &[((150, 200), 80), ((450, 200), 60)], 4);
        let config = DetectorConfig::default();
        let detection = Detector::default().detect(&image, &config).unwrap();
        let image_area = 600.0 * 400.0;

        assert_eq!(detection.regions.len(), 2);
        for region in &detection.regions {
            let ratio = region.descriptor.area / image_area;
            assert!(ratio >= config.min_area_ratio && ratio <= config.max_area_ratio);
        }
    }

    #[test]
    fn test_detection_is_idempotent_and_parallel_agrees() {
        let image = ring_scan(500, 300, &[((120, 150), 70), ((360, 150), 50)], 3);
        let config = DetectorConfig::default();

        let sequential = Detector::default();
        let parallel = Detector::builder().parallel(true).build();

        let first = sequential.detect(&image, &config).unwrap();
        let second = sequential.detect(&image, &config).unwrap();
        let concurrent = parallel.detect(&image, &config).unwrap();

        assert_eq!(first.regions.len(), 2);
        assert_eq!(first.regions, second.regions);
        assert_eq!(first.regions, concurrent.regions);
        assert_eq!(first.strategy, concurrent.strategy);
        assert_eq!(first.stats, concurrent.stats);
    }

    #[test]
    fn test_evaluate_separates_degenerate_from_undersized() {
        let filter = SizeFilter::new(&DetectorConfig::default(), 1000, 1000);

        let single_point = Contour::new(vec![[5, 5]]);
        let collinear = Contour::new(vec![[0, 0], [10, 0], [20, 0]]);
        assert_eq!(evaluate(&filter, &single_point), ContourOutcome::RejectedForGeometry);
        assert_eq!(evaluate(&filter, &collinear), ContourOutcome::RejectedForGeometry);

        let speck = Contour::new(vec![[0, 0], [4, 0], [4, 4], [0, 4]]);
        assert_eq!(evaluate(&filter, &speck), ContourOutcome::RejectedForSize);

        let square = Contour::new(vec![[100, 100], [200, 100], [200, 200], [100, 200]]);
        assert!(matches!(evaluate(&filter, &square), ContourOutcome::Accepted(_)));
    }

    #[test]
    fn test_invalid_config_fails_the_call() {
        let image = disk_scan(100, 100, (50, 50), 20);
        let config = DetectorConfig {
            min_area_ratio: 0.5,
            max_area_ratio: 0.1,
            ..Default::default()
        };
        assert!(matches!(
            Detector::default().detect(&image, &config),
            Err(DetectError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_image_fails_the_call() {
        let image = DynamicImage::new_rgb8(0, 0);
        assert!(matches!(
            Detector::default().detect(&image, &DetectorConfig::default()),
            Err(DetectError::EmptyImage { width: 0, height: 0 })
        ));
    }

    #[test]
    fn test_debug_image_only_when_requested() {
        let image = disk_scan(200, 200, (100, 100), 40);
        let detector = Detector::default();

        let quiet = detector.detect(&image, &DetectorConfig::default()).unwrap();
        assert!(quiet.debug_image.is_none());

        let verbose = detector.detect(&image, &DetectorConfig::default().with_debug(true)).unwrap();
        let overlay = verbose.debug_image.unwrap();
        assert_eq!(overlay.dimensions(), (200, 200));
        assert_eq!(verbose.regions, quiet.regions);
    }

    #[test]
    fn test_load_image_from_bytes_rejects_garbage() {
        assert!(matches!(
            load_image_from_bytes(b"not an image"),
            Err(DetectError::ImageLoad(_))
        ));
    }

    #[test]
    fn test_load_image_from_png_bytes() {
        let mut bytes = std::io::Cursor::new(Vec::new());
        disk_scan(64, 48, (32, 24), 10)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        let decoded = load_image_from_bytes(bytes.get_ref()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }
}
