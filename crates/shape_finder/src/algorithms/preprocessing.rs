use image::{GrayImage, Luma};
use crate::{
    error::{DetectError, Result},
    traits::ImagePreprocessor,
};

/// Gaussian blur preprocessor for scanner noise reduction
#[derive(Debug, Clone)]
pub struct GaussianBlurPreprocessor {
    pub sigma: f32,
}

impl Default for GaussianBlurPreprocessor {
    fn default() -> Self {
        // Same smoothing as a 3x3 kernel, thin pen strokes survive it
        Self { sigma: 0.8 }
    }
}

impl ImagePreprocessor for GaussianBlurPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(DetectError::InvalidConfig(format!(
                "blur sigma must be positive (got {})",
                self.sigma
            )));
        }
        Ok(imageproc::filter::gaussian_blur_f32(image, self.sigma))
    }
}

/// Contrast limited adaptive histogram equalization.
///
/// The image is split into a `tiles_x` x `tiles_y` grid; each tile gets its own
/// equalization table with histogram bins clipped at `clip_limit` times the
/// uniform bin height, and pixels blend the tables of the four nearest tile
/// centers. This evens out illumination across a scan without amplifying flat
/// paper noise.
#[derive(Debug, Clone)]
pub struct ClahePreprocessor {
    pub clip_limit: f32,
    pub tiles_x: u32,
    pub tiles_y: u32,
}

impl Default for ClahePreprocessor {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            tiles_x: 8,
            tiles_y: 8,
        }
    }
}

impl ImagePreprocessor for ClahePreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Ok(image.clone());
        }

        // Equal tiles over the image padded up to a whole grid, so a flat page gets
        // the same table everywhere
        let grid_x = self.tiles_x.clamp(1, width) as usize;
        let grid_y = self.tiles_y.clamp(1, height) as usize;
        let tile_w = width.div_ceil(grid_x as u32);
        let tile_h = height.div_ceil(grid_y as u32);

        let mut luts = Vec::with_capacity(grid_x * grid_y);
        for ty in 0..grid_y as u32 {
            for tx in 0..grid_x as u32 {
                luts.push(self.tile_lut(image, tx * tile_w, ty * tile_h, tile_w, tile_h));
            }
        }

        let locate = |pos: u32, tile: u32, grid: usize| -> (usize, usize, f32) {
            let center = ((pos as f32 + 0.5) / tile as f32 - 0.5).max(0.0);
            let lo = (center.floor() as usize).min(grid - 1);
            if lo + 1 >= grid {
                (lo, lo, 0.0)
            } else {
                (lo, lo + 1, center - lo as f32)
            }
        };

        let equalized = GrayImage::from_fn(width, height, |x, y| {
            let value = image.get_pixel(x, y)[0] as usize;
            let (x_lo, x_hi, wx) = locate(x, tile_w, grid_x);
            let (y_lo, y_hi, wy) = locate(y, tile_h, grid_y);

            let at = |gx: usize, gy: usize| luts[gy * grid_x + gx][value] as f32;
            let top = at(x_lo, y_lo) * (1.0 - wx) + at(x_hi, y_lo) * wx;
            let bottom = at(x_lo, y_hi) * (1.0 - wx) + at(x_hi, y_hi) * wx;

            Luma([(top * (1.0 - wy) + bottom * wy).round().clamp(0.0, 255.0) as u8])
        });

        Ok(equalized)
    }
}

impl ClahePreprocessor {
    /// Clipped equalization table of one `tile_w` x `tile_h` tile. Pixels past the
    /// right or bottom edge are read from the reflected border.
    fn tile_lut(&self, image: &GrayImage, x0: u32, y0: u32, tile_w: u32, tile_h: u32) -> [u8; 256] {
        let (width, height) = image.dimensions();
        let mut histogram = [0u32; 256];
        for y in y0..y0 + tile_h {
            for x in x0..x0 + tile_w {
                let value = image.get_pixel(reflect_101(x, width), reflect_101(y, height))[0];
                histogram[value as usize] += 1;
            }
        }

        let count = tile_w * tile_h;
        let clip = ((self.clip_limit * count as f32 / 256.0) as u32).max(1);

        let mut excess = 0u32;
        for bin in histogram.iter_mut() {
            if *bin > clip {
                excess += *bin - clip;
                *bin = clip;
            }
        }

        // Spread the clipped mass evenly, leftovers on evenly spaced bins
        let per_bin = excess / 256;
        let leftover = (excess % 256) as usize;
        for bin in histogram.iter_mut() {
            *bin += per_bin;
        }
        if leftover > 0 {
            let step = (256 / leftover).max(1);
            for bin in histogram.iter_mut().step_by(step).take(leftover) {
                *bin += 1;
            }
        }

        let mut lut = [0u8; 256];
        let mut cdf = 0u32;
        for (value, bin) in histogram.iter().enumerate() {
            cdf += bin;
            lut[value] = ((cdf as f32 * 255.0 / count as f32).round()).min(255.0) as u8;
        }
        lut
    }
}

/// Mirror an index past the end of `0..len` back inside, without repeating the
/// edge pixel
fn reflect_101(pos: u32, len: u32) -> u32 {
    if len <= 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let pos = pos % period;
    if pos < len { pos } else { period - pos }
}
