use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::geometry::primitives::{Point, SPolygon};
use crate::util::EPSILON;

/// Whether to strictly inflate or deflate when making any modifications to shape.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeModifyMode {
    /// Modify the shape to be strictly larger than the original (superset).
    Inflate,
    /// Modify the shape to be strictly smaller than the original (subset).
    Deflate,
}

/// Offsets a [`SPolygon`] by a certain `distance` either inwards or outwards depending on the [`ShapeModifyMode`].
/// Corners are mitered, so an inflated shape is a superset of every point within `distance` of the original.
/// Relies on the [`geo_buffer`](https://crates.io/crates/geo-buffer) crate.
#[cfg(feature = "separation-distance")]
pub fn offset_shape(sp: &SPolygon, mode: ShapeModifyMode, distance: f64) -> Result<SPolygon> {
    use anyhow::Context;
    use itertools::Itertools;
    use ordered_float::OrderedFloat;

    let offset = match mode {
        ShapeModifyMode::Deflate => -distance,
        ShapeModifyMode::Inflate => distance,
    };

    // Convert the SPolygon to a geo_types::Polygon
    let geo_poly = geo_types::Polygon::new(
        sp.vertices.iter().map(|p| (p.0, p.1)).collect_vec().into(),
        vec![],
    );

    // Deflating can split a shape, keep the largest remaining piece
    let geo_poly_offset = geo_buffer::buffer_polygon(&geo_poly, offset)
        .0
        .into_iter()
        .map(|p| {
            p.exterior()
                .points()
                .map(|p| Point(p.x(), p.y()))
                .collect_vec()
        })
        .max_by_key(|points| OrderedFloat(SPolygon::calculate_area(points).abs()))
        .context("offsetting polygon resulted in an empty shape")?;

    SPolygon::try_new(clean_ring(geo_poly_offset))
}

#[cfg(not(feature = "separation-distance"))]
pub fn offset_shape(_sp: &SPolygon, _mode: ShapeModifyMode, _distance: f64) -> Result<SPolygon> {
    anyhow::bail!(
        "cannot offset shape without geo-buffer dependency, compile with --features separation-distance to enable this"
    )
}

/// Shrinks a convex polygon by moving every edge `distance` inwards.
/// Exact for convex shapes, returns `None` if nothing with positive area remains.
pub fn inset_convex(sp: &SPolygon, distance: f64) -> Option<SPolygon> {
    debug_assert!(sp.is_convex());
    let mut points = sp.vertices.clone();
    for e in sp.edge_iter() {
        let n = e.left_normal();
        points = clip_by_halfplane(&points, n, n.dot(&e.start) + distance);
        if points.len() < 3 {
            return None;
        }
    }
    SPolygon::try_new(clean_ring(points)).ok()
}

/// Sutherland–Hodgman clip of a convex ring: keeps the part where `normal · p >= offset`.
/// The result may collapse to fewer than 3 points (a segment, a single point or nothing).
pub fn clip_by_halfplane(points: &[Point], normal: Point, offset: f64) -> Vec<Point> {
    let dist = |p: &Point| normal.dot(p) - offset;
    let mut clipped = Vec::with_capacity(points.len() + 1);
    for (i, a) in points.iter().enumerate() {
        let b = &points[(i + 1) % points.len()];
        let (d_a, d_b) = (dist(a), dist(b));
        if d_a >= -EPSILON {
            clipped.push(*a);
        }
        if (d_a > EPSILON && d_b < -EPSILON) || (d_a < -EPSILON && d_b > EPSILON) {
            clipped.push(a.lerp(b, d_a / (d_a - d_b)));
        }
    }
    clean_ring(clipped)
}

/// Removes consecutive points (including last-first) that lie within [`EPSILON`] of each other.
pub fn clean_ring(mut points: Vec<Point>) -> Vec<Point> {
    points.dedup_by(|p, prev| p.sq_distance_to(prev) <= EPSILON * EPSILON);
    while points.len() > 1
        && points[0].sq_distance_to(&points[points.len() - 1]) <= EPSILON * EPSILON
    {
        points.pop();
    }
    points
}
