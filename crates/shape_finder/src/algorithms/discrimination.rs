use crate::types::ShapeDescriptor;

/// Which rule let a shape through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundRule {
    Category,
    Circularity,
    CompactPolygon,
    FilledBox,
    RoundishPolygon,
    LowAspect,
}

/// Decide whether a described contour is a hand-drawn circle or ellipse.
///
/// Any single rule is enough. The thresholds were fitted against real scans of
/// hand-drawn marks and overlap on purpose; missing a mark costs more than
/// passing a stray polygon on to the text reader.
pub fn matching_rule(d: &ShapeDescriptor) -> Option<RoundRule> {
    if d.shape_category.is_round() {
        return Some(RoundRule::Category);
    }
    if d.circularity > 0.25 {
        return Some(RoundRule::Circularity);
    }
    if d.vertex_count <= 8 && d.compactness > 0.75 {
        return Some(RoundRule::CompactPolygon);
    }
    if d.extent > 0.6 && d.vertex_count <= 10 {
        return Some(RoundRule::FilledBox);
    }
    if d.vertex_count <= 12 && d.circularity > 0.15 && d.aspect_ratio < 4.0 && d.compactness > 0.6 {
        return Some(RoundRule::RoundishPolygon);
    }
    if d.aspect_ratio < 2.5 && d.circularity > 0.2 && d.vertex_count <= 10 {
        return Some(RoundRule::LowAspect);
    }
    None
}

pub fn is_round(d: &ShapeDescriptor) -> bool {
    matching_rule(d).is_some()
}
