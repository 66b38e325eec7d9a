use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::geometry::geo_enums::GeoPosition;
use crate::geometry::primitives::{Edge, Point, SPolygon};
use crate::util::EPSILON;

/// Distance by which sample points are pushed off an edge into the interior of its polygon.
const SAMPLE_OFFSET: f64 = 1e3 * EPSILON;

/// True iff the interiors of `a` and `b` intersect.
/// Polygons touching along edges or in single points do not overlap.
pub fn polygons_overlap(a: &SPolygon, b: &SPolygon) -> bool {
    if !a.bbox.interiors_overlap(&b.bbox) {
        return false;
    }

    //edges crossing each other in their relative interiors
    for e_a in a.edge_iter().filter(|e| edge_bbox_near(e, b)) {
        if b.edge_iter().any(|e_b| e_a.crosses(&e_b)) {
            return true;
        }
    }

    //a vertex strictly inside the other polygon
    if a.vertices.iter().any(|v| b.position_of(v) == GeoPosition::Interior)
        || b.vertices.iter().any(|v| a.position_of(v) == GeoPosition::Interior)
    {
        return true;
    }

    //without crossings, every piece of boundary between two contact points lies entirely inside,
    //outside or on the boundary of the other polygon, so one sample point per piece decides
    boundary_sample_hits(a, b) || boundary_sample_hits(b, a)
}

/// True iff `inner` lies entirely within `container` (closed-set: touching the boundary is allowed).
pub fn polygon_encloses(container: &SPolygon, inner: &SPolygon) -> bool {
    if !container.bbox.encloses(&inner.bbox) {
        return false;
    }
    if inner
        .vertices
        .iter()
        .any(|v| container.position_of(v) == GeoPosition::Exterior)
    {
        return false;
    }
    for e_i in inner.edge_iter() {
        if container.edge_iter().any(|e_c| e_i.crosses(&e_c)) {
            return false;
        }
        let pieces = split_params(&e_i, container);
        for (t0, t1) in pieces.iter().tuple_windows() {
            let mid = e_i.start.lerp(&e_i.end, (t0 + t1) / 2.0);
            if container.position_of(&mid) == GeoPosition::Exterior {
                return false;
            }
        }
    }
    true
}

fn boundary_sample_hits(a: &SPolygon, b: &SPolygon) -> bool {
    for e_a in a.edge_iter().filter(|e| edge_bbox_near(e, b)) {
        let normal = e_a.left_normal();
        let offset = Point(normal.0 * SAMPLE_OFFSET, normal.1 * SAMPLE_OFFSET);
        for (t0, t1) in split_params(&e_a, b).iter().tuple_windows() {
            let sample = e_a.start.lerp(&e_a.end, (t0 + t1) / 2.0) + offset;
            if a.position_of(&sample) == GeoPosition::Interior
                && b.position_of(&sample) == GeoPosition::Interior
            {
                return true;
            }
        }
    }
    false
}

/// Sorted parameters (including `0.0` and `1.0`) at which the boundary of `sp` touches or crosses `edge`.
fn split_params(edge: &Edge, sp: &SPolygon) -> Vec<f64> {
    let mut params = vec![0.0, 1.0];
    for e in sp.edge_iter() {
        for p in [e.start, e.end] {
            if edge.touches_point(&p) {
                params.push(edge.project(&p).clamp(0.0, 1.0));
            }
        }
        if let Some(p) = edge.collides_at(&e) {
            params.push(edge.project(&p).clamp(0.0, 1.0));
        }
    }
    let min_gap = EPSILON / edge.length();
    params.sort_by_key(|t| OrderedFloat(*t));
    params.dedup_by(|t, prev| *t - *prev <= min_gap);
    params
}

fn edge_bbox_near(e: &Edge, sp: &SPolygon) -> bool {
    e.x_max() >= sp.bbox.x_min - EPSILON
        && e.x_min() <= sp.bbox.x_max + EPSILON
        && e.y_max() >= sp.bbox.y_min - EPSILON
        && e.y_min() <= sp.bbox.y_max + EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DTransformation;
    use crate::geometry::geo_traits::Transformable;
    use test_case::test_case;

    fn poly(points: &[(f64, f64)]) -> SPolygon {
        SPolygon::try_new(points.iter().map(|&p| p.into()).collect()).unwrap()
    }

    fn square(x: f64, y: f64, s: f64) -> SPolygon {
        poly(&[(x, y), (x + s, y), (x + s, y + s), (x, y + s)])
    }

    fn l_shape() -> SPolygon {
        poly(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 1.0),
            (1.0, 1.0),
            (1.0, 4.0),
            (0.0, 4.0),
        ])
    }

    #[test_case(square(0.0, 0.0, 1.0), square(1.0, 0.0, 1.0), false; "edge touching")]
    #[test_case(square(0.0, 0.0, 1.0), square(1.0, 1.0, 1.0), false; "corner touching")]
    #[test_case(square(0.0, 0.0, 1.0), square(2.0, 0.0, 1.0), false; "disjoint")]
    #[test_case(square(0.0, 0.0, 2.0), square(1.0, 1.0, 2.0), true; "crossing edges")]
    #[test_case(square(0.0, 0.0, 2.0), square(1.0, 0.0, 2.0), true; "sliding along shared line")]
    #[test_case(square(0.0, 0.0, 2.0), square(0.0, 0.0, 2.0), true; "identical")]
    #[test_case(square(0.0, 0.0, 4.0), square(1.0, 1.0, 1.0), true; "contained")]
    #[test_case(square(0.0, 0.0, 2.0), poly(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0)]), true; "contained sharing three edges")]
    #[test_case(l_shape(), square(1.0, 1.0, 3.0), false; "nested in the notch")]
    #[test_case(l_shape(), square(0.9, 0.9, 1.0), true; "notch corner overlap")]
    #[test_case(square(0.0, 0.0, 2.0), poly(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0)]), true; "triangle on square corners")]
    fn overlap(a: SPolygon, b: SPolygon, expected: bool) {
        assert_eq!(polygons_overlap(&a, &b), expected);
        assert_eq!(polygons_overlap(&b, &a), expected);
    }

    #[test]
    fn vertex_touching_rotated_square() {
        let diamond = square(-0.5, -0.5, 1.0)
            .transform_clone(&DTransformation::from_degrees(45.0, (0.0, 0.0)).compose());
        let half_diag = 0.5 * 2f64.sqrt();
        let right = square(half_diag, -0.5, 1.0);
        assert!(!polygons_overlap(&diamond, &right));
        let nudged = square(half_diag - 0.01, -0.5, 1.0);
        assert!(polygons_overlap(&diamond, &nudged));
    }

    #[test]
    fn enclosure() {
        let sheet = square(0.0, 0.0, 10.0);
        assert!(polygon_encloses(&sheet, &square(0.0, 0.0, 10.0)));
        assert!(polygon_encloses(&sheet, &square(9.0, 9.0, 1.0)));
        assert!(!polygon_encloses(&sheet, &square(9.5, 0.0, 1.0)));
        assert!(!polygon_encloses(&l_shape(), &square(1.5, 1.5, 1.0)));
        assert!(polygon_encloses(&l_shape(), &square(0.0, 0.0, 1.0)));
    }
}
