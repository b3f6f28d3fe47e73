//! SVG import and preview.
//!
//! Boundaries can be drawn in any vector editor: usvg resolves CSS, then
//! each path's first subpath becomes a polygon. Element, group and
//! viewBox transforms are applied, so coordinates are those of the
//! rendered viewport. The preview renders a boundary and its pieces back
//! to SVG.
//!
//! ## Curve Flattening
//!
//! Bézier segments are flattened with lyon_geom so a drawn curve becomes a
//! dense polyline instead of its control points.

use lyon_geom::{CubicBezierSegment, QuadraticBezierSegment, point};
use thiserror::Error;
use usvg::tiny_skia_path::PathSegment;

use crate::geometry::{Point, Polygon};

/// Error type for SVG import.
///
/// ## Rust Lesson #20: Error Handling
///
/// `thiserror` derives `Display` and `std::error::Error` from the
/// `#[error(...)]` attributes, so callers can use `?` and get a readable
/// message without a hand-written `impl`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SvgError {
    #[error("SVG parse error: {0}")]
    ParseError(String),

    #[error("No polygons found in SVG")]
    NoPolygons,
}

/// Tolerance for curve flattening, in user units.
const CURVE_TOLERANCE: f32 = 0.1;

/// Consecutive points closer than this are merged.
const DEDUP_EPSILON: f64 = 1e-6;

/// Extract every closed shape in document order.
pub fn extract_polygons_from_svg(svg_content: &str) -> Result<Vec<Polygon>, SvgError> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_content, &options).map_err(|e| SvgError::ParseError(e.to_string()))?;

    let mut polygons = Vec::new();
    collect_group(tree.root(), &mut polygons);

    if polygons.is_empty() {
        Err(SvgError::NoPolygons)
    } else {
        Ok(polygons)
    }
}

/// The first shape in the document, used as a fill boundary.
pub fn extract_boundary_from_svg(svg_content: &str) -> Result<Polygon, SvgError> {
    extract_polygons_from_svg(svg_content)?
        .into_iter()
        .next()
        .ok_or(SvgError::NoPolygons)
}

fn collect_group(group: &usvg::Group, polygons: &mut Vec<Polygon>) {
    for child in group.children() {
        // ## Rust Lesson #22: Pattern Matching on Enums with Data
        //
        // usvg::Node carries different data per variant; we only care about
        // groups (recurse) and paths (convert). Text and images are skipped.
        match child {
            usvg::Node::Group(group) => collect_group(group, polygons),
            usvg::Node::Path(path) => polygons.extend(path_to_polygon(path)),
            _ => {}
        }
    }
}

/// Convert a usvg path into a polygon, flattening curves.
///
/// Only the first subpath is used; holes are not part of a boundary.
fn path_to_polygon(path: &usvg::Path) -> Option<Polygon> {
    // Path data is in the element's local space.
    let data = path.data().clone().transform(path.abs_transform())?;

    let mut points: Vec<Point> = Vec::new();
    let mut last: Option<lyon_geom::Point<f32>> = None;

    for segment in data.segments() {
        match segment {
            PathSegment::MoveTo(p) => {
                if !points.is_empty() {
                    break;
                }
                points.push(Point::new(p.x as f64, p.y as f64));
                last = Some(point(p.x, p.y));
            }
            PathSegment::LineTo(p) => {
                points.push(Point::new(p.x as f64, p.y as f64));
                last = Some(point(p.x, p.y));
            }
            PathSegment::QuadTo(ctrl, p) => {
                let to = point(p.x, p.y);
                match last {
                    Some(from) => {
                        let curve = QuadraticBezierSegment { from, ctrl: point(ctrl.x, ctrl.y), to };
                        curve.for_each_flattened(CURVE_TOLERANCE, &mut |line| {
                            points.push(Point::new(line.to.x as f64, line.to.y as f64));
                        });
                    }
                    None => points.push(Point::new(p.x as f64, p.y as f64)),
                }
                last = Some(to);
            }
            PathSegment::CubicTo(ctrl1, ctrl2, p) => {
                let to = point(p.x, p.y);
                match last {
                    Some(from) => {
                        let curve = CubicBezierSegment {
                            from,
                            ctrl1: point(ctrl1.x, ctrl1.y),
                            ctrl2: point(ctrl2.x, ctrl2.y),
                            to,
                        };
                        curve.for_each_flattened(CURVE_TOLERANCE, &mut |line| {
                            points.push(Point::new(line.to.x as f64, line.to.y as f64));
                        });
                    }
                    None => points.push(Point::new(p.x as f64, p.y as f64)),
                }
                last = Some(to);
            }
            PathSegment::Close => {}
        }
    }

    points.dedup_by(|a, b| (a.x - b.x).abs() < DEDUP_EPSILON && (a.y - b.y).abs() < DEDUP_EPSILON);

    // Curves that end on the start point leave an explicit closing vertex.
    let polygon = Polygon::from_ring(points);
    (polygon.len() >= 3).then_some(polygon)
}

// ============================================================================
// PREVIEW
// ============================================================================

/// Render the boundary (grey) and the pieces (black outlines) as an SVG document.
///
/// The viewBox is the boundary's bounding box padded by 2% on each side.
pub fn pieces_to_svg<'a>(boundary: &Polygon, pieces: impl IntoIterator<Item = &'a Polygon>) -> String {
    let (min_x, min_y, max_x, max_y) = boundary.bounding_box().unwrap_or((0.0, 0.0, 1.0, 1.0));
    let span = (max_x - min_x).max(max_y - min_y).max(f64::EPSILON);
    let pad = span * 0.02;
    let stroke = span / 1000.0;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">
"#,
        min_x - pad,
        min_y - pad,
        max_x - min_x + 2.0 * pad,
        max_y - min_y + 2.0 * pad,
    ));

    svg.push_str(&format!(
        "<g id=\"boundary\" stroke=\"#999999\" stroke-width=\"{}\" fill=\"#f4f4f4\">\n",
        stroke * 3.0
    ));
    push_path(&mut svg, boundary);
    svg.push_str("</g>\n");

    svg.push_str(&format!(
        "<g id=\"pieces\" stroke=\"black\" stroke-width=\"{stroke}\" fill=\"none\" stroke-linejoin=\"round\">\n"
    ));
    for piece in pieces {
        push_path(&mut svg, piece);
    }
    svg.push_str("</g>\n</svg>\n");
    svg
}

fn push_path(svg: &mut String, polygon: &Polygon) {
    if polygon.len() < 2 {
        return;
    }
    let d: Vec<String> = polygon
        .outer
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}{:.3},{:.3}", if i == 0 { "M" } else { "L" }, p.x, p.y))
        .collect();
    svg.push_str(&format!("  <path d=\"{} Z\"/>\n", d.join(" ")));
}

// ============================================================================
// TESTS
// ============================================================================
