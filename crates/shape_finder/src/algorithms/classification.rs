use std::f64::consts::PI;

use geo::{Area, ConvexHull, MinimumRotatedRect, Simplify};
use geo_types::LineString;

use crate::types::{Contour, ShapeCategory, ShapeDescriptor};

/// Contours enclosing less than this are measurement noise
pub const MIN_SHAPE_AREA: f64 = 25.0;

/// Douglas-Peucker tolerances, as fractions of the perimeter, tried when counting
/// vertices. Pen strokes are never smooth, so the coarsest approximation that still
/// forms a polygon is kept.
pub const APPROXIMATION_TOLERANCES: [f64; 5] = [0.005, 0.01, 0.02, 0.03, 0.05];

/// Measure a contour. Returns `None` for contours too small or too degenerate to
/// describe a shape.
pub fn describe(contour: &Contour) -> Option<ShapeDescriptor> {
    if contour.len() < 3 {
        return None;
    }

    let area = contour.area();
    if !area.is_finite() || area < MIN_SHAPE_AREA {
        return None;
    }

    let perimeter = contour.perimeter();
    if !perimeter.is_finite() || perimeter == 0.0 {
        return None;
    }

    let circularity = 4.0 * PI * area / (perimeter * perimeter);
    let ring = contour.to_ring();
    let vertex_count = approximate_vertex_count(&ring, perimeter)?;

    let descriptor = ShapeDescriptor {
        area,
        perimeter,
        circularity,
        vertex_count,
        aspect_ratio: aspect_ratio(&ring),
        compactness: compactness(&ring, area),
        extent: extent(contour, area),
        shape_category: categorize(circularity, vertex_count),
    };

    Some(descriptor)
}

/// Fewest vertices over all tolerances among approximations with at least 3
pub fn approximate_vertex_count(ring: &LineString<f64>, perimeter: f64) -> Option<usize> {
    APPROXIMATION_TOLERANCES
        .iter()
        .filter_map(|fraction| {
            let simplified = ring.simplify(&(fraction * perimeter));
            // Closed ring repeats its first point
            let vertices = if simplified.is_closed() {
                simplified.0.len().saturating_sub(1)
            } else {
                simplified.0.len()
            };
            (vertices >= 3).then_some(vertices)
        })
        .min()
}

/// First matching rule wins
pub fn categorize(circularity: f64, vertex_count: usize) -> ShapeCategory {
    if circularity > 0.7 {
        ShapeCategory::CircleLike
    } else if circularity > 0.4 {
        ShapeCategory::EllipseLike
    } else if vertex_count <= 6 && circularity > 0.3 {
        ShapeCategory::CircleLike
    } else if vertex_count <= 10 && circularity > 0.2 {
        ShapeCategory::EllipseLike
    } else if vertex_count <= 12 {
        ShapeCategory::PolygonLike
    } else {
        ShapeCategory::ComplexShape
    }
}

/// Long over short side of the minimum rotated rectangle; 1.0 when degenerate
fn aspect_ratio(ring: &LineString<f64>) -> f64 {
    let Some(rect) = ring.minimum_rotated_rect() else {
        return 1.0;
    };

    let corners = &rect.exterior().0;
    if corners.len() < 3 {
        return 1.0;
    }

    let side = |a: usize, b: usize| {
        let dx = corners[b].x - corners[a].x;
        let dy = corners[b].y - corners[a].y;
        (dx * dx + dy * dy).sqrt()
    };
    let (first, second) = (side(0, 1), side(1, 2));
    let (short, long) = (first.min(second), first.max(second));

    if short > 0.0 && long.is_finite() {
        long / short
    } else {
        1.0
    }
}

fn compactness(ring: &LineString<f64>, area: f64) -> f64 {
    let hull_area = ring.convex_hull().unsigned_area();
    if hull_area > 0.0 { area / hull_area } else { 0.0 }
}

fn extent(contour: &Contour, area: f64) -> f64 {
    match contour.bounding_size() {
        Some((w, h)) if w > 0 && h > 0 => area / (w as f64 * h as f64),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{circle_contour, ellipse_contour};

    fn rect(w: i32, h: i32) -> Contour {
        Contour::new(vec![[0, 0], [w, 0], [w, h], [0, h]])
    }

    #[test]
    fn test_category_rule_order() {
        assert_eq!(categorize(0.95, 40), ShapeCategory::CircleLike);
        assert_eq!(categorize(0.71, 3), ShapeCategory::CircleLike);
        assert_eq!(categorize(0.7, 40), ShapeCategory::EllipseLike);
        assert_eq!(categorize(0.41, 20), ShapeCategory::EllipseLike);
        assert_eq!(categorize(0.35, 6), ShapeCategory::CircleLike);
        assert_eq!(categorize(0.35, 7), ShapeCategory::EllipseLike);
        assert_eq!(categorize(0.25, 11), ShapeCategory::PolygonLike);
        assert_eq!(categorize(0.1, 12), ShapeCategory::PolygonLike);
        assert_eq!(categorize(0.1, 13), ShapeCategory::ComplexShape);
        assert_eq!(categorize(0.3, 6), ShapeCategory::EllipseLike);
    }

    #[test]
    fn test_circle_descriptor() {
        let descriptor = describe(&circle_contour(100.0, 100.0, 50.0, 180)).unwrap();
        assert_eq!(descriptor.shape_category, ShapeCategory::CircleLike);
        assert!(descriptor.circularity > 0.9);
        assert!(descriptor.aspect_ratio < 1.1);
        assert!(descriptor.compactness > 0.95);
        assert!((descriptor.extent - PI / 4.0).abs() < 0.05);
        assert!(descriptor.vertex_count >= 3);
    }

    #[test]
    fn test_ellipse_descriptor() {
        let descriptor = describe(&ellipse_contour(200.0, 100.0, 120.0, 40.0, 240)).unwrap();
        assert!(descriptor.aspect_ratio > 2.5 && descriptor.aspect_ratio < 3.5);
        assert!(descriptor.circularity > 0.4 && descriptor.circularity < 0.7);
        assert_eq!(descriptor.shape_category, ShapeCategory::EllipseLike);
    }

    #[test]
    fn test_square_is_circle_like_by_circularity() {
        // A square's circularity is π/4, which the first rule already accepts
        let descriptor = describe(&rect(100, 100)).unwrap();
        assert!((descriptor.circularity - PI / 4.0).abs() < 1e-9);
        assert_eq!(descriptor.vertex_count, 4);
        assert_eq!(descriptor.shape_category, ShapeCategory::CircleLike);
    }

    #[test]
    fn test_thin_rectangle_is_polygon_like() {
        let descriptor = describe(&rect(400, 10)).unwrap();
        assert!(descriptor.circularity < 0.2);
        assert!(descriptor.aspect_ratio > 30.0);
        assert_eq!(descriptor.shape_category, ShapeCategory::PolygonLike);
    }

    #[test]
    fn test_noise_and_degenerate_contours_have_no_descriptor() {
        assert!(describe(&rect(4, 4)).is_none());
        assert!(describe(&Contour::new(vec![[0, 0], [10, 0]])).is_none());
        assert!(describe(&Contour::new(vec![[0, 0], [10, 0], [20, 0], [30, 0]])).is_none());
    }

    #[test]
    fn test_multiscale_keeps_fewest_vertices() {
        let ring = circle_contour(0.0, 0.0, 80.0, 360).to_ring();
        let perimeter = ring.0.windows(2).map(|w| {
            let (dx, dy) = (w[1].x - w[0].x, w[1].y - w[0].y);
            (dx * dx + dy * dy).sqrt()
        }).sum::<f64>();

        let finest = ring.simplify(&(0.005 * perimeter)).0.len() - 1;
        let chosen = approximate_vertex_count(&ring, perimeter).unwrap();
        assert!(chosen <= finest);
        assert!(chosen >= 3);
    }
}
