use crate::{
    algorithms::{
        binarization::{BinarizationStrategy, Binarizer},
        extraction::ImageprocContourExtractor,
        preprocessing::{ClahePreprocessor, GaussianBlurPreprocessor},
    },
    pipeline::Detector,
    render::RenderOptions,
    traits::{ContourExtractor, ImagePreprocessor},
};

/// Builder for creating detectors with a fluent API
pub struct DetectorBuilder {
    preprocessors: Option<Vec<Box<dyn ImagePreprocessor>>>,
    strategies: Option<Vec<BinarizationStrategy>>,
    contour_extractor: Option<Box<dyn ContourExtractor>>,
    parallel: bool,
    render_options: Option<RenderOptions>,
}

impl DetectorBuilder {
    /// Create a new detector builder
    pub fn new() -> Self {
        Self {
            preprocessors: None,
            strategies: None,
            contour_extractor: None,
            parallel: false,
            render_options: None,
        }
    }

    /// Add an enhancement step. The first call replaces the default blur and CLAHE
    /// chain.
    pub fn add_preprocessor<P>(mut self, preprocessor: P) -> Self
    where
        P: ImagePreprocessor + 'static,
    {
        self.preprocessors
            .get_or_insert_with(Vec::new)
            .push(Box::new(preprocessor));
        self
    }

    /// Binarize the raw grayscale image without enhancement
    pub fn without_preprocessing(mut self) -> Self {
        self.preprocessors = Some(Vec::new());
        self
    }

    /// Replace the candidate strategy list; order decides ties
    pub fn strategies(mut self, strategies: impl IntoIterator<Item = BinarizationStrategy>) -> Self {
        self.strategies = Some(strategies.into_iter().collect());
        self
    }

    /// Set the contour extractor (replaces any existing one)
    pub fn set_contour_extractor<E>(mut self, extractor: E) -> Self
    where
        E: ContourExtractor + 'static,
    {
        self.contour_extractor = Some(Box::new(extractor));
        self
    }

    /// Generate and score candidate masks on the rayon pool
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = Some(options);
        self
    }

    /// Build the detector with default components if not specified
    pub fn build(self) -> Detector {
        let preprocessors = self.preprocessors.unwrap_or_else(|| {
            let defaults: Vec<Box<dyn ImagePreprocessor>> = vec![
                Box::new(GaussianBlurPreprocessor::default()),
                Box::new(ClahePreprocessor::default()),
            ];
            defaults
        });

        let binarizer = self.strategies
            .map(Binarizer::new)
            .unwrap_or_default();

        let contour_extractor = self.contour_extractor
            .unwrap_or_else(|| Box::new(ImageprocContourExtractor));

        Detector::new(
            preprocessors,
            binarizer,
            contour_extractor,
            self.parallel,
            self.render_options.unwrap_or_default(),
        )
    }
}

impl Default for DetectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::DetectorConfig,
        error::Result,
        test_utils::disk_scan,
        types::Contour,
    };
    use image::GrayImage;

    /// Sees nothing in any mask
    struct BlindExtractor;

    impl ContourExtractor for BlindExtractor {
        fn extract_contours(&self, _mask: &GrayImage) -> Result<Vec<Contour>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_default_build() {
        let detector = DetectorBuilder::new().build();
        assert_eq!(
            detector.info(),
            "Detector: 2 preprocessors, 17 binarization strategies, parallel: false"
        );
    }

    #[test]
    fn test_custom_stages() {
        let detector = Detector::builder()
            .add_preprocessor(GaussianBlurPreprocessor { sigma: 1.5 })
            .strategies([BinarizationStrategy::Otsu, BinarizationStrategy::Fixed { threshold: 90 }])
            .parallel(true)
            .build();
        assert_eq!(
            detector.info(),
            "Detector: 1 preprocessors, 2 binarization strategies, parallel: true"
        );
        assert!(detector.is_parallel());
    }

    #[test]
    fn test_without_preprocessing_keeps_image() {
        let detector = Detector::builder().without_preprocessing().build();
        let image = GrayImage::from_fn(16, 16, |x, y| image::Luma([(x * 16 + y) as u8]));
        assert_eq!(detector.enhance(&image).unwrap(), image);
    }

    #[test]
    fn test_contour_extractor_is_pluggable() {
        let detector = Detector::builder().set_contour_extractor(BlindExtractor).build();
        let detection = detector
            .detect(&disk_scan(200, 200, (100, 100), 40), &DetectorConfig::default())
            .unwrap();
        assert!(detection.regions.is_empty());
        assert_eq!(detection.strategy, "otsu_fallback");
    }
}
