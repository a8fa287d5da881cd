use std::collections::BTreeMap;

use image::{GrayImage, Luma};
use imageproc::contrast::{self, ThresholdType};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

/// One way of turning the enhanced grayscale image into an ink mask.
///
/// Every strategy produces 255 for ink and 0 for paper, whatever the polarity of
/// the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "family", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BinarizationStrategy {
    /// Ink where `pixel <= local_mean - constant`, the mean being Gaussian weighted
    /// over a `block_size` window
    Adaptive { block_size: u32, constant: u8 },
    /// Ink at or below the Otsu level of the image histogram
    Otsu,
    /// Ink at or below a fixed level (dark ink on light paper)
    Fixed { threshold: u8 },
    /// Ink above a fixed level (light ink on dark paper)
    Inverted { threshold: u8 },
}

use BinarizationStrategy::{Adaptive, Fixed, Inverted, Otsu};

/// Candidate order matters: on equal scores the earlier strategy wins.
pub const DEFAULT_STRATEGIES: &[BinarizationStrategy] = &[
    Adaptive { block_size: 11, constant: 2 },
    Adaptive { block_size: 11, constant: 5 },
    Adaptive { block_size: 11, constant: 8 },
    Adaptive { block_size: 15, constant: 2 },
    Adaptive { block_size: 15, constant: 5 },
    Adaptive { block_size: 15, constant: 8 },
    Adaptive { block_size: 21, constant: 2 },
    Adaptive { block_size: 21, constant: 5 },
    Adaptive { block_size: 21, constant: 8 },
    Otsu,
    Fixed { threshold: 60 },
    Fixed { threshold: 80 },
    Fixed { threshold: 100 },
    Fixed { threshold: 120 },
    Fixed { threshold: 140 },
    Inverted { threshold: 80 },
    Inverted { threshold: 120 },
];

impl BinarizationStrategy {
    /// Stable name used in logs and reports, e.g. `adaptive_15_5`
    pub fn name(&self) -> String {
        let family: &'static str = self.into();
        match self {
            Adaptive { block_size, constant } => format!("{}_{}_{}", family, block_size, constant),
            Otsu => family.to_string(),
            Fixed { threshold } | Inverted { threshold } => format!("{}_{}", family, threshold),
        }
    }

    pub fn binarize(&self, image: &GrayImage) -> GrayImage {
        match *self {
            Adaptive { block_size, constant } => {
                adaptive_threshold(image, &local_mean(image, block_size), constant)
            }
            Otsu => ink_at_or_below(image, contrast::otsu_level(image)),
            Fixed { threshold } => ink_at_or_below(image, threshold),
            Inverted { threshold } => contrast::threshold(image, threshold, ThresholdType::Binary),
        }
    }
}

/// A mask produced by one strategy, with the number of plausible contours in it
#[derive(Debug, Clone)]
pub struct Candidate {
    pub strategy: BinarizationStrategy,
    pub mask: GrayImage,
    pub contour_count: usize,
}

impl Candidate {
    pub fn name(&self) -> String {
        self.strategy.name()
    }
}

/// Generates one candidate mask per configured strategy
#[derive(Debug, Clone)]
pub struct Binarizer {
    pub strategies: Vec<BinarizationStrategy>,
}

impl Default for Binarizer {
    fn default() -> Self {
        Self::new(DEFAULT_STRATEGIES.to_vec())
    }
}

impl Binarizer {
    pub fn new(strategies: Vec<BinarizationStrategy>) -> Self {
        Self { strategies }
    }

    /// Candidate masks in strategy order.
    pub fn candidates(&self, image: &GrayImage, parallel: bool) -> Vec<Candidate> {
        // Adaptive strategies sharing a block size share one local mean
        let mut block_sizes: Vec<u32> = self.strategies
            .iter()
            .filter_map(|strategy| match strategy {
                Adaptive { block_size, .. } => Some(*block_size),
                _ => None,
            })
            .collect();
        block_sizes.sort_unstable();
        block_sizes.dedup();

        let means: BTreeMap<u32, GrayImage> = if parallel {
            block_sizes.par_iter().map(|&b| (b, local_mean(image, b))).collect()
        } else {
            block_sizes.iter().map(|&b| (b, local_mean(image, b))).collect()
        };

        let build = |strategy: &BinarizationStrategy| {
            let mask = match (*strategy, strategy_mean(strategy, &means)) {
                (Adaptive { constant, .. }, Some(mean)) => adaptive_threshold(image, mean, constant),
                _ => strategy.binarize(image),
            };
            Candidate {
                strategy: *strategy,
                mask,
                contour_count: 0,
            }
        };

        if parallel {
            self.strategies.par_iter().map(build).collect()
        } else {
            self.strategies.iter().map(build).collect()
        }
    }
}

fn strategy_mean<'a>(
    strategy: &BinarizationStrategy,
    means: &'a BTreeMap<u32, GrayImage>,
) -> Option<&'a GrayImage> {
    match strategy {
        Adaptive { block_size, .. } => means.get(block_size),
        _ => None,
    }
}

/// Gaussian weighted local mean, sigma derived from the block size the way a
/// `block_size` x `block_size` Gaussian kernel would be
pub fn local_mean(image: &GrayImage, block_size: u32) -> GrayImage {
    let sigma = 0.3 * ((block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    imageproc::filter::gaussian_blur_f32(image, sigma.max(0.1))
}

fn adaptive_threshold(image: &GrayImage, mean: &GrayImage, constant: u8) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let value = image.get_pixel(x, y)[0] as i16;
        let level = mean.get_pixel(x, y)[0] as i16 - constant as i16;
        Luma([if value <= level { 255 } else { 0 }])
    })
}

/// Dark ink: everything at or below `level` becomes 255
pub fn ink_at_or_below(image: &GrayImage, level: u8) -> GrayImage {
    contrast::threshold(image, level, ThresholdType::BinaryInverted)
}
