use std::fmt;

use geo_types::{Coord, LineString, Polygon};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Closed outer boundary of a connected ink region, in pixel coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<[i32; 2]>,
}

impl Contour {
    pub fn new(points: Vec<[i32; 2]>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The contour as a closed geo ring (first point repeated at the end)
    pub fn to_ring(&self) -> LineString<f64> {
        let coords: Vec<Coord<f64>> = self.points
            .iter()
            .map(|&[x, y]| Coord { x: x as f64, y: y as f64 })
            .collect();

        let mut ring = LineString::new(coords);
        ring.close();
        ring
    }

    /// Convert to a geo-types Polygon for geometric operations
    pub fn to_geo_polygon(&self) -> Polygon<f64> {
        Polygon::new(self.to_ring(), vec![])
    }

    /// Enclosed area (shoelace over the boundary points)
    pub fn area(&self) -> f64 {
        use geo::Area;
        if self.points.len() < 3 {
            return 0.0;
        }
        self.to_geo_polygon().unsigned_area()
    }

    /// Length of the closed boundary, including the closing segment
    pub fn perimeter(&self) -> f64 {
        use geo::EuclideanLength;
        if self.points.len() < 2 {
            return 0.0;
        }
        self.to_ring().euclidean_length()
    }

    /// Axis-aligned bounds as `[min_x, min_y, max_x, max_y]`, inclusive
    pub fn bounds(&self) -> Option<[i32; 4]> {
        let (first, rest) = self.points.split_first()?;
        let mut bounds = [first[0], first[1], first[0], first[1]];

        for &[x, y] in rest {
            bounds[0] = bounds[0].min(x);
            bounds[1] = bounds[1].min(y);
            bounds[2] = bounds[2].max(x);
            bounds[3] = bounds[3].max(y);
        }

        Some(bounds)
    }

    /// Bounding box size in pixels, counting both edge pixels
    pub fn bounding_size(&self) -> Option<(u32, u32)> {
        let [min_x, min_y, max_x, max_y] = self.bounds()?;
        Some(((max_x - min_x + 1) as u32, (max_y - min_y + 1) as u32))
    }
}

/// Coarse shape category assigned by the classifier
#[derive(
    Debug, Clone, Copy, Default,
    PartialEq, Eq, Hash,
    Serialize, Deserialize,
    Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShapeCategory {
    CircleLike,
    EllipseLike,
    PolygonLike,
    ComplexShape,
    #[default]
    Unknown,
}

impl ShapeCategory {
    pub fn is_round(&self) -> bool {
        matches!(self, Self::CircleLike | Self::EllipseLike)
    }
}

/// Geometric measurements of one contour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeDescriptor {
    pub area: f64,
    pub perimeter: f64,
    /// `4π·area / perimeter²`; slightly above 1.0 is possible on pixel grids
    pub circularity: f64,
    pub vertex_count: usize,
    /// Long side over short side of the minimum rotated rectangle, at least 1.0
    pub aspect_ratio: f64,
    /// Area over convex hull area
    pub compactness: f64,
    /// Area over axis-aligned bounding box area
    pub extent: f64,
    pub shape_category: ShapeCategory,
}

/// What became of one contour on its way through the filters
#[derive(Debug, Clone, PartialEq)]
pub enum ContourOutcome {
    Accepted(ShapeDescriptor),
    RejectedForSize,
    RejectedForGeometry,
}

/// A padded bounding region around one accepted hand-drawn shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub shape_category: ShapeCategory,
    pub source_contour: Contour,
    pub descriptor: ShapeDescriptor,
}

impl ShapeRegion {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Corners as `(x1, y1, x2, y2)` with exclusive right/bottom edges
    pub fn bbox(&self) -> (u32, u32, u32, u32) {
        (self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// Non-fatal conditions the caller should know about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectionWarning {
    /// No candidate mask produced a single plausible contour
    NoUsableBinarization { fallback: String, candidates: usize },
}

impl fmt::Display for DetectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoUsableBinarization { fallback, candidates } => write!(
                f,
                "none of {} binarization candidates produced a valid contour, fell back to {}",
                candidates, fallback
            ),
        }
    }
}

/// Aggregate per-contour counts for one detection run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionStats {
    pub candidates: usize,
    pub contours: usize,
    pub rejected_for_size: usize,
    pub rejected_for_geometry: usize,
    pub rejected_for_shape: usize,
    pub accepted: usize,
}

impl DetectionStats {
    pub fn record(&mut self, outcome: &ContourOutcome) {
        self.contours += 1;
        match outcome {
            ContourOutcome::Accepted(_) => {}
            ContourOutcome::RejectedForSize => self.rejected_for_size += 1,
            ContourOutcome::RejectedForGeometry => self.rejected_for_geometry += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    /// Accepted regions, largest first
    pub regions: Vec<ShapeRegion>,
    pub image_width: u32,
    pub image_height: u32,
    /// Name of the binarization strategy the regions were extracted from
    pub strategy: String,
    pub warnings: Vec<DetectionWarning>,
    pub stats: DetectionStats,
    #[serde(skip)]
    pub debug_image: Option<RgbImage>,
}

impl Detection {
    pub fn is_reliable(&self) -> bool {
        self.warnings.is_empty()
    }
}
