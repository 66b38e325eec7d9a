use anyhow::{Result, bail, ensure};
use itertools::Itertools;

use crate::geometry::Transformation;
use crate::geometry::geo_enums::GeoPosition;
use crate::geometry::geo_traits::{CollidesWith, Shape, Transformable};
use crate::geometry::primitives::Edge;
use crate::geometry::primitives::Point;
use crate::geometry::primitives::Rect;
use crate::util::EPSILON;

/// Geometric primitive representing a simple polygon: <https://en.wikipedia.org/wiki/Simple_polygon>
///
/// Vertices are always stored in counterclockwise order.
#[derive(Clone, Debug, PartialEq)]
pub struct SPolygon {
    /// Boundary of the polygon, counterclockwise
    pub vertices: Vec<Point>,
    /// Bounding box
    pub bbox: Rect,
    /// Area of the interior (always positive)
    pub area: f64,
}

impl SPolygon {
    /// Creates a new simple polygon from a set of points.
    /// Fails if the points do not describe a valid simple polygon
    /// (fewer than 3 points, duplicate points, no area or self-intersecting).
    /// Clockwise input is reversed to counterclockwise.
    pub fn try_new(mut points: Vec<Point>) -> Result<Self> {
        ensure!(
            points.len() >= 3,
            "simple polygon must have at least 3 points: {points:?}"
        );
        ensure!(
            points.iter().all(|p| p.is_finite()),
            "simple polygon contains non-finite coordinates: {points:?}"
        );
        ensure!(
            points.iter().unique().count() == points.len(),
            "simple polygon should not contain duplicate points: {points:?}"
        );

        let area = match SPolygon::calculate_area(&points) {
            area if area.abs() <= EPSILON => bail!("simple polygon has no area: {points:?}"),
            area if area < 0.0 => {
                //edges should always be ordered counterclockwise (positive area)
                points.reverse();
                -area
            }
            area => area,
        };

        if let Some((i, j)) = SPolygon::find_self_intersection(&points) {
            bail!("simple polygon is self-intersecting at edges {i} and {j}: {points:?}");
        }

        let bbox = Rect::bounding(&points);

        Ok(SPolygon {
            vertices: points,
            bbox,
            area,
        })
    }

    //https://en.wikipedia.org/wiki/Shoelace_formula
    //counterclockwise = positive area, clockwise = negative area
    pub fn calculate_area(points: &[Point]) -> f64 {
        let mut sigma: f64 = 0.0;
        for i in 0..points.len() {
            //next point
            let j = (i + 1) % points.len();

            let (x_i, y_i) = points[i].into();
            let (x_j, y_j) = points[j].into();

            sigma += (y_i + y_j) * (x_i - x_j)
        }

        0.5 * sigma
    }

    /// Returns a pair of edge indices that intersect while they should not, if any.
    fn find_self_intersection(points: &[Point]) -> Option<(usize, usize)> {
        let n = points.len();
        let edge = |i: usize| Edge {
            start: points[i],
            end: points[(i + 1) % n],
        };
        for i in 0..n {
            let (e_i, e_next) = (edge(i), edge((i + 1) % n));
            if e_i.length() <= EPSILON {
                return Some((i, i));
            }
            //adjacent edges may only share their common vertex, not fold back onto each other
            if e_i.side_of(&e_next.end) == 0 && e_i.direction().dot(&e_next.direction()) < 0.0 {
                return Some((i, (i + 1) % n));
            }
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                if e_i.collides_with(&edge(j)) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    pub fn vertex(&self, i: usize) -> Point {
        self.vertices[i]
    }

    pub fn edge(&self, i: usize) -> Edge {
        let j = (i + 1) % self.n_vertices();
        Edge {
            start: self.vertices[i],
            end: self.vertices[j],
        }
    }

    pub fn edge_iter(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.n_vertices()).map(move |i| self.edge(i))
    }

    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// True if no vertex makes a clockwise (reflex) turn. Collinear vertices are allowed.
    pub fn is_convex(&self) -> bool {
        let n = self.n_vertices();
        (0..n).all(|i| {
            let e = self.edge(i);
            e.side_of(&self.vertices[(i + 2) % n]) >= 0
        })
    }

    /// True if `self` is a rectangle with axis-aligned edges
    pub fn is_axis_aligned_rect(&self) -> bool {
        let corners = self.bbox.corners();
        self.n_vertices() == 4 && self.vertices.iter().all(|v| corners.contains(v))
    }

    /// Classifies `p` as inside, on the boundary (within [`EPSILON`]) or outside `self`.
    pub fn position_of(&self, p: &Point) -> GeoPosition {
        let bbox = self.bbox;
        if p.0 < bbox.x_min - EPSILON
            || p.0 > bbox.x_max + EPSILON
            || p.1 < bbox.y_min - EPSILON
            || p.1 > bbox.y_max + EPSILON
        {
            return GeoPosition::Exterior;
        }
        if self.edge_iter().any(|e| e.touches_point(p)) {
            return GeoPosition::Boundary;
        }

        //ray casting towards +x, half-open rule on the y-range of each edge
        let mut inside = false;
        for Edge { start: a, end: b } in self.edge_iter() {
            if (a.1 > p.1) != (b.1 > p.1) {
                let x_int = a.0 + (p.1 - a.1) * (b.0 - a.0) / (b.1 - a.1);
                if p.0 < x_int {
                    inside = !inside;
                }
            }
        }
        match inside {
            true => GeoPosition::Interior,
            false => GeoPosition::Exterior,
        }
    }

    /// Returns a copy of `self` translated so that its area centroid lies at the origin,
    /// together with the centroid of the original.
    pub fn centered(&self) -> (SPolygon, Point) {
        let c = self.centroid();
        let centered = self.transform_clone(&Transformation::from_translation((-c.0, -c.1)));
        (centered, c)
    }
}

impl Shape for SPolygon {
    fn centroid(&self) -> Point {
        //based on: https://en.wikipedia.org/wiki/Centroid#Of_a_polygon
        let mut c_x = 0.0;
        let mut c_y = 0.0;

        for Edge {
            start: Point(x_i, y_i),
            end: Point(x_j, y_j),
        } in self.edge_iter()
        {
            let cross = x_i * y_j - x_j * y_i;
            c_x += (x_i + x_j) * cross;
            c_y += (y_i + y_j) * cross;
        }

        Point(c_x / (6.0 * self.area), c_y / (6.0 * self.area))
    }

    fn area(&self) -> f64 {
        self.area
    }

    fn bbox(&self) -> Rect {
        self.bbox
    }
}

impl Transformable for SPolygon {
    fn transform(&mut self, t: &Transformation) -> &mut Self {
        self.vertices.iter_mut().for_each(|p| {
            p.transform(t);
        });
        self.bbox = Rect::bounding(&self.vertices);
        self
    }
}

impl CollidesWith<Point> for SPolygon {
    /// Closed-set semantics: points on the boundary collide.
    fn collides_with(&self, point: &Point) -> bool {
        self.position_of(point).is_inside()
    }
}

impl From<Rect> for SPolygon {
    fn from(r: Rect) -> Self {
        SPolygon {
            vertices: r.corners().to_vec(),
            bbox: r,
            area: r.area(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DTransformation;
    use test_case::test_case;

    fn poly(points: &[(f64, f64)]) -> Result<SPolygon> {
        SPolygon::try_new(points.iter().map(|&p| p.into()).collect())
    }

    #[test]
    fn clockwise_input_is_normalized() {
        let sp = poly(&[(0.0, 0.0), (0.0, 2.0), (3.0, 2.0), (3.0, 0.0)]).unwrap();
        assert_eq!(sp.area, 6.0);
        assert!(SPolygon::calculate_area(&sp.vertices) > 0.0);
        assert_eq!(sp.bbox, Rect::try_new(0.0, 0.0, 3.0, 2.0).unwrap());
    }

    #[test_case(&[(0.0, 0.0), (1.0, 0.0)]; "too few points")]
    #[test_case(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (1.0, 0.0)]; "duplicate point")]
    #[test_case(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]; "zero area")]
    #[test_case(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]; "bowtie")]
    #[test_case(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (2.0, 0.0), (0.0, 4.0)]; "vertex touching edge")]
    #[test_case(&[(0.0, 0.0), (f64::NAN, 0.0), (1.0, 1.0)]; "nan")]
    fn rejects_malformed(points: &[(f64, f64)]) {
        assert!(poly(points).is_err());
    }

    #[test]
    fn point_classification() {
        //L-shape
        let sp = poly(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 1.0),
            (1.0, 1.0),
            (1.0, 4.0),
            (0.0, 4.0),
        ])
        .unwrap();
        assert_eq!(sp.position_of(&Point(0.5, 3.0)), GeoPosition::Interior);
        assert_eq!(sp.position_of(&Point(3.0, 0.5)), GeoPosition::Interior);
        assert_eq!(sp.position_of(&Point(2.0, 2.0)), GeoPosition::Exterior);
        assert_eq!(sp.position_of(&Point(2.0, 1.0)), GeoPosition::Boundary);
        assert_eq!(sp.position_of(&Point(0.0, 0.0)), GeoPosition::Boundary);
        //ray passes exactly through a vertex
        assert_eq!(sp.position_of(&Point(-1.0, 1.0)), GeoPosition::Exterior);
        assert_eq!(sp.position_of(&Point(0.5, 1.0)), GeoPosition::Interior);
        assert!(sp.collides_with(&Point(4.0, 1.0)));
    }

    #[test]
    fn centering_moves_centroid_to_origin() {
        let sp = poly(&[(10.0, 10.0), (14.0, 10.0), (14.0, 12.0), (10.0, 12.0)]).unwrap();
        let (centered, c) = sp.centered();
        assert_eq!(c, Point(12.0, 11.0));
        let c2 = centered.centroid();
        assert!(c2.0.abs() < 1e-12 && c2.1.abs() < 1e-12);
        assert_eq!(centered.area, sp.area);
    }

    #[test]
    fn rotation_preserves_area_and_orientation() {
        let sp = poly(&[(0.0, 0.0), (3.0, 0.0), (0.0, 1.0)]).unwrap();
        let t = DTransformation::from_degrees(37.0, (5.0, -2.0)).compose();
        let moved = sp.transform_clone(&t);
        assert!((SPolygon::calculate_area(&moved.vertices) - sp.area).abs() < 1e-9);
        assert!(moved.is_convex());
    }
}
