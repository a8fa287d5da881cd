use image::GrayImage;
use imageproc::distance_transform::Norm;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    algorithms::{
        binarization::{BinarizationStrategy, Candidate},
        filtering::SizeFilter,
    },
    error::Result,
    traits::ContourExtractor,
};

/// The mask detection continues with
#[derive(Debug, Clone)]
pub struct Selection {
    pub strategy: BinarizationStrategy,
    pub contour_count: usize,
    /// Winning mask after speckle removal and gap closing
    pub mask: GrayImage,
    /// No candidate scored above zero and the Otsu mask was used instead
    pub fallback: bool,
    pub candidates: usize,
}

impl Selection {
    pub fn name(&self) -> String {
        if self.fallback {
            format!("{}_fallback", self.strategy.name())
        } else {
            self.strategy.name()
        }
    }
}

/// Scores candidate masks by how many plausible contours they contain
pub struct BinarizationSelector<'a> {
    extractor: &'a dyn ContourExtractor,
    filter: SizeFilter,
}

impl<'a> BinarizationSelector<'a> {
    pub fn new(extractor: &'a dyn ContourExtractor, filter: SizeFilter) -> Self {
        Self { extractor, filter }
    }

    /// Number of contours in `mask` that pass the size filter
    pub fn score(&self, mask: &GrayImage) -> Result<usize> {
        let contours = self.extractor.extract_contours(mask)?;
        Ok(self.filter.count_passing(&contours))
    }

    /// Fill in `contour_count` for every candidate, keeping their order
    pub fn score_all(&self, candidates: &mut [Candidate], parallel: bool) -> Result<()> {
        let counts: Vec<usize> = if parallel {
            candidates.par_iter().map(|c| self.score(&c.mask)).collect::<Result<_>>()?
        } else {
            candidates.iter().map(|c| self.score(&c.mask)).collect::<Result<_>>()?
        };

        for (candidate, count) in candidates.iter_mut().zip(counts) {
            debug!("Binarization {}: {} valid contours", candidate.name(), count);
            candidate.contour_count = count;
        }
        Ok(())
    }

    /// Pick the highest scoring candidate; earlier candidates win ties.
    pub fn select(
        &self,
        mut candidates: Vec<Candidate>,
        enhanced: &GrayImage,
        parallel: bool,
    ) -> Result<Selection> {
        self.score_all(&mut candidates, parallel)?;
        let total = candidates.len();

        let mut best: Option<usize> = None;
        for (index, candidate) in candidates.iter().enumerate() {
            let best_count = best.map_or(0, |b| candidates[b].contour_count);
            if candidate.contour_count > best_count {
                best = Some(index);
            }
        }

        let selection = match best {
            Some(index) => {
                let winner = candidates.swap_remove(index);
                Selection {
                    strategy: winner.strategy,
                    contour_count: winner.contour_count,
                    mask: clean_mask(&winner.mask),
                    fallback: false,
                    candidates: total,
                }
            }
            None => {
                warn!(
                    "No valid contours in any of {} binarizations, falling back to Otsu",
                    total
                );
                let otsu = candidates
                    .into_iter()
                    .find(|c| c.strategy == BinarizationStrategy::Otsu)
                    .map(|c| c.mask)
                    .unwrap_or_else(|| BinarizationStrategy::Otsu.binarize(enhanced));
                Selection {
                    strategy: BinarizationStrategy::Otsu,
                    contour_count: 0,
                    mask: clean_mask(&otsu),
                    fallback: true,
                    candidates: total,
                }
            }
        };

        Ok(selection)
    }
}

/// Opening drops isolated specks, closing bridges small breaks in pen strokes.
/// The 3x3 cross is the L1 ball of radius 1.
pub fn clean_mask(mask: &GrayImage) -> GrayImage {
    let opened = imageproc::morphology::open(mask, Norm::L1, 1);
    imageproc::morphology::close(&opened, Norm::L1, 2)
}
