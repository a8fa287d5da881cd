//! Debug overlays showing what the detector accepted.
//!
//! Rendering never feeds back into detection: a missing font only drops the labels,
//! and a failed save is reported to the caller on its own.

use std::path::Path;

use ab_glyph::FontVec;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::{debug, info};

use crate::{
    error::{DetectError, Result},
    types::ShapeRegion,
};

/// Box colors, cycled by region rank
pub const PALETTE: [Rgb<u8>; 8] = [
    Rgb([0, 255, 0]),
    Rgb([0, 0, 255]),
    Rgb([255, 0, 0]),
    Rgb([0, 255, 255]),
    Rgb([255, 0, 255]),
    Rgb([255, 255, 0]),
    Rgb([0, 128, 255]),
    Rgb([255, 0, 128]),
];

const CAPTION_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Font and stroke settings for the overlay
pub struct RenderOptions {
    /// Labels are skipped when no font is loaded
    pub font: Option<FontVec>,
    pub font_scale: f32,
    pub box_thickness: u32,
    pub draw_contours: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            font: None,
            font_scale: 20.0,
            box_thickness: 2,
            draw_contours: true,
        }
    }
}

impl RenderOptions {
    /// Load a font file for the labels
    pub fn with_font_path(font_path: &Path) -> Result<Self> {
        let data = std::fs::read(font_path)?;
        let font = FontVec::try_from_vec(data)
            .map_err(|_| DetectError::Render(format!("cannot parse font {}", font_path.display())))?;

        Ok(Self {
            font: Some(font),
            ..Self::default()
        })
    }

    /// Try a few common system font locations, falling back to unlabeled output
    pub fn with_system_font() -> Self {
        let font_paths = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "C:\\Windows\\Fonts\\arial.ttf",
        ];

        for path in &font_paths {
            if let Ok(data) = std::fs::read(path)
                && let Ok(font) = FontVec::try_from_vec(data)
            {
                info!("Loaded system font: {}", path);
                return Self {
                    font: Some(font),
                    ..Self::default()
                };
            }
        }

        debug!("No system font found, debug labels will be skipped");
        Self::default()
    }
}

/// Draw boxes, rank numbers, contours and a count caption onto a copy of `image`
pub fn render_debug(image: &RgbImage, regions: &[ShapeRegion], options: &RenderOptions) -> RgbImage {
    let mut canvas = image.clone();

    for (index, region) in regions.iter().enumerate() {
        let color = PALETTE[index % PALETTE.len()];
        draw_box(&mut canvas, region, options.box_thickness, color);

        if options.draw_contours {
            draw_contour(&mut canvas, region, color);
        }

        if let Some(font) = &options.font {
            let label_y = (region.y as i32 - options.font_scale as i32 - 4).max(0);
            draw_text_mut(
                &mut canvas,
                color,
                region.x as i32,
                label_y,
                options.font_scale,
                font,
                &(index + 1).to_string(),
            );
        }
    }

    if let Some(font) = &options.font {
        let caption = format!("Detected Shapes: {}", regions.len());
        draw_text_mut(&mut canvas, CAPTION_COLOR, 10, 10, options.font_scale * 1.4, font, &caption);
    }

    canvas
}

/// Save a rendered overlay; the format follows the file extension
pub fn save_debug_image(image: &RgbImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    image
        .save(path)
        .map_err(|e| DetectError::Render(format!("cannot save {}: {}", path.display(), e)))
}

fn draw_box(canvas: &mut RgbImage, region: &ShapeRegion, thickness: u32, color: Rgb<u8>) {
    for inset in 0..thickness {
        let (width, height) = (
            region.width.saturating_sub(2 * inset),
            region.height.saturating_sub(2 * inset),
        );
        if width == 0 || height == 0 {
            break;
        }
        let rect = Rect::at((region.x + inset) as i32, (region.y + inset) as i32).of_size(width, height);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

fn draw_contour(canvas: &mut RgbImage, region: &ShapeRegion, color: Rgb<u8>) {
    let points = &region.source_contour.points;
    if points.len() < 2 {
        return;
    }

    let closing = [points[points.len() - 1], points[0]];
    for segment in points.windows(2).chain(std::iter::once(&closing[..])) {
        let start = (segment[0][0] as f32, segment[0][1] as f32);
        let end = (segment[1][0] as f32, segment[1][1] as f32);
        draw_line_segment_mut(canvas, start, end, color);
    }
}
