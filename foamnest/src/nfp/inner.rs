use ordered_float::OrderedFloat;

use crate::geometry::primitives::{Edge, Point, Rect, SPolygon};
use crate::geometry::shape_modification::{clean_ring, clip_by_halfplane};
use crate::util::EPSILON;

/// Inner-fit polygon: the convex region of reference-point positions that keep a shape inside a container.
///
/// An exactly fitting shape yields a degenerate region (a segment or a single point), which is still a valid fit.
#[derive(Clone, Debug)]
pub struct InnerFit {
    /// Vertices of the region, counterclockwise. Between 1 and n points.
    pub vertices: Vec<Point>,
    /// Half-planes `normal · p >= offset` whose intersection is the region
    constraints: Vec<(Point, f64)>,
}

impl InnerFit {
    /// True if `p` lies in the (closed) region, within [`EPSILON`]
    pub fn contains(&self, p: &Point) -> bool {
        self.constraints
            .iter()
            .all(|(n, offset)| n.dot(p) >= offset - EPSILON)
    }

    /// Boundary edges of the region, empty when it collapsed to a single point
    pub fn edges(&self) -> Vec<Edge> {
        match self.vertices.len() {
            0 | 1 => vec![],
            2 => vec![Edge {
                start: self.vertices[0],
                end: self.vertices[1],
            }],
            n => (0..n)
                .map(|i| Edge {
                    start: self.vertices[i],
                    end: self.vertices[(i + 1) % n],
                })
                .collect(),
        }
    }

    pub fn bbox(&self) -> Rect {
        Rect::bounding(&self.vertices)
    }
}

/// Computes the inner-fit polygon of `shape` (reference point at the origin, in its final orientation)
/// within a convex `container`. Returns `None` if the shape does not fit at all.
pub fn inner_fit(container: &SPolygon, shape: &SPolygon) -> Option<InnerFit> {
    debug_assert!(container.is_convex());
    let (c, s) = (container.bbox, shape.bbox);

    if container.is_axis_aligned_rect() {
        //exact computation, no intersections needed
        let x_min = c.x_min - s.x_min;
        let x_max = c.x_max - s.x_max;
        let y_min = c.y_min - s.y_min;
        let y_max = c.y_max - s.y_max;
        if x_min > x_max + EPSILON || y_min > y_max + EPSILON {
            return None;
        }
        let (x_max, y_max) = (x_max.max(x_min), y_max.max(y_min));
        let vertices = clean_ring(vec![
            Point(x_min, y_min),
            Point(x_max, y_min),
            Point(x_max, y_max),
            Point(x_min, y_max),
        ]);
        let constraints = vec![
            (Point(1.0, 0.0), x_min),
            (Point(-1.0, 0.0), -x_max),
            (Point(0.0, 1.0), y_min),
            (Point(0.0, -1.0), -y_max),
        ];
        return Some(InnerFit {
            vertices,
            constraints,
        });
    }

    //each container edge becomes a half-plane, shifted inwards by how far the shape reaches against its normal
    let constraints = container
        .edge_iter()
        .map(|e| {
            let n = e.left_normal();
            let reach = shape
                .vertices
                .iter()
                .map(|v| OrderedFloat(n.dot(v)))
                .min()
                .map_or(0.0, |r| r.0);
            (n, n.dot(&e.start) - reach)
        })
        .collect::<Vec<_>>();

    let mut region = Rect {
        x_min: c.x_min - s.x_max - 1.0,
        y_min: c.y_min - s.y_max - 1.0,
        x_max: c.x_max - s.x_min + 1.0,
        y_max: c.y_max - s.y_min + 1.0,
    }
    .corners()
    .to_vec();

    for (n, offset) in constraints.iter() {
        region = clip_by_halfplane(&region, *n, *offset);
        if region.is_empty() {
            return None;
        }
    }

    Some(InnerFit {
        vertices: region,
        constraints,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DTransformation;
    use crate::geometry::geo_traits::Transformable;

    fn rect(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> SPolygon {
        SPolygon::from(Rect::try_new(x_min, y_min, x_max, y_max).unwrap())
    }

    #[test]
    fn rectangular_sheet() {
        let sheet = rect(0.0, 0.0, 100.0, 50.0);
        let part = rect(-5.0, -2.0, 5.0, 2.0);
        let ifp = inner_fit(&sheet, &part).unwrap();
        assert_eq!(ifp.bbox(), Rect::try_new(5.0, 2.0, 95.0, 48.0).unwrap());
        assert!(ifp.contains(&Point(5.0, 2.0)));
        assert!(!ifp.contains(&Point(4.0, 2.0)));
    }

    #[test]
    fn exact_fit_is_degenerate_but_valid() {
        let sheet = rect(0.0, 0.0, 10.0, 10.0);
        let same = rect(-5.0, -5.0, 5.0, 5.0);
        let ifp = inner_fit(&sheet, &same).unwrap();
        assert_eq!(ifp.vertices, vec![Point(5.0, 5.0)]);
        assert!(ifp.edges().is_empty());

        let full_width = rect(-5.0, -1.0, 5.0, 1.0);
        let ifp = inner_fit(&sheet, &full_width).unwrap();
        assert_eq!(ifp.vertices.len(), 2);
        assert_eq!(ifp.edges().len(), 1);
    }

    #[test]
    fn too_large_has_no_fit() {
        let sheet = rect(0.0, 0.0, 10.0, 10.0);
        assert!(inner_fit(&sheet, &rect(-6.0, -1.0, 6.0, 1.0)).is_none());
    }

    #[test]
    fn convex_sheet() {
        //sheet rotated 45 degrees, so the general half-plane path is taken
        let sheet = rect(-10.0, -10.0, 10.0, 10.0)
            .transform_clone(&DTransformation::from_degrees(45.0, (0.0, 0.0)).compose());
        let part = rect(-1.0, -1.0, 1.0, 1.0);
        let ifp = inner_fit(&sheet, &part).unwrap();
        assert!(ifp.contains(&Point(0.0, 0.0)));
        let reach = 10.0 * 2f64.sqrt() - 2.0;
        assert!(ifp.contains(&Point(reach - 1e-6, 0.0)));
        assert!(!ifp.contains(&Point(reach + 1e-3, 0.0)));
        assert_eq!(ifp.vertices.len(), 4);
    }
}
