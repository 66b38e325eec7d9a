use crate::geometry::Transformation;
use crate::geometry::geo_traits::{CollidesWith, DistanceTo, Transformable};
use crate::geometry::primitives::Point;
use crate::geometry::primitives::orientation;
use crate::util::EPSILON;
use anyhow::Result;
use anyhow::ensure;

/// Line segment between two [`Point`]s
#[derive(Clone, Debug, PartialEq, Copy)]
pub struct Edge {
    pub start: Point,
    pub end: Point,
}

impl Edge {
    pub fn new(start: Point, end: Point) -> Result<Self> {
        ensure!(start != end, "degenerate edge, {start:?} == {end:?}");
        Ok(Edge { start, end })
    }

    /// Direction vector from start to end
    pub fn direction(&self) -> Point {
        self.end - self.start
    }

    /// Unit normal pointing to the left of the edge (the interior side of a counterclockwise polygon)
    pub fn left_normal(&self) -> Point {
        let Point(dx, dy) = self.direction();
        let l = self.length();
        Point(-dy / l, dx / l)
    }

    /// Signed distance of `p` to the line through the edge, positive on the left side
    pub fn side_distance(&self, p: &Point) -> f64 {
        orientation(self.start, self.end, *p) / self.length()
    }

    /// -1, 0 or 1 depending on which side of the edge's line `p` lies, with [`EPSILON`] tolerance
    pub fn side_of(&self, p: &Point) -> i8 {
        match self.side_distance(p) {
            d if d > EPSILON => 1,
            d if d < -EPSILON => -1,
            _ => 0,
        }
    }

    /// Parameter `t` of the projection of `p` onto the line through the edge (`0.0` = start, `1.0` = end)
    pub fn project(&self, p: &Point) -> f64 {
        let d = self.direction();
        (*p - self.start).dot(&d) / d.dot(&d)
    }

    /// Returns the closest point which lies on the edge to the given point
    pub fn closest_point_on_edge(&self, point: &Point) -> Point {
        match self.project(point) {
            t if t <= 0.0 => self.start,
            t if t >= 1.0 => self.end,
            t => self.start.lerp(&self.end, t),
        }
    }

    /// True if `p` lies on the edge, within [`EPSILON`]
    pub fn touches_point(&self, p: &Point) -> bool {
        self.sq_distance_to(p) <= EPSILON * EPSILON
    }

    /// True if the relative interiors of both edges cross in a single point.
    /// Touching (an endpoint on the other edge) and collinear overlap are not crossings.
    pub fn crosses(&self, other: &Edge) -> bool {
        if !self.bboxes_overlap(other) {
            return false;
        }
        let (o1, o2) = (self.side_of(&other.start), self.side_of(&other.end));
        let (o3, o4) = (other.side_of(&self.start), other.side_of(&self.end));

        o1 * o2 < 0 && o3 * o4 < 0
    }

    /// Returns the intersection point of two non-parallel edges, if it exists.
    pub fn collides_at(&self, other: &Edge) -> Option<Point> {
        if !self.bboxes_overlap(other) {
            return None;
        }
        //based on: https://en.wikipedia.org/wiki/Line%E2%80%93line_intersection#Given_two_points_on_each_line_segment
        let r = self.direction();
        let s = other.direction();
        let denom = r.cross(&s);
        if denom.abs() <= f64::EPSILON * r.norm() * s.norm() {
            //parallel edges
            return None;
        }
        let qp = other.start - self.start;
        let t = qp.cross(&s) / denom;
        let u = qp.cross(&r) / denom;

        let t_tol = EPSILON / r.norm();
        let u_tol = EPSILON / s.norm();
        match (-t_tol..=1.0 + t_tol).contains(&t) && (-u_tol..=1.0 + u_tol).contains(&u) {
            true => Some(self.start.lerp(&self.end, t.clamp(0.0, 1.0))),
            false => None,
        }
    }

    pub fn x_min(&self) -> f64 {
        f64::min(self.start.0, self.end.0)
    }

    pub fn y_min(&self) -> f64 {
        f64::min(self.start.1, self.end.1)
    }

    pub fn x_max(&self) -> f64 {
        f64::max(self.start.0, self.end.0)
    }

    pub fn y_max(&self) -> f64 {
        f64::max(self.start.1, self.end.1)
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    fn bboxes_overlap(&self, other: &Edge) -> bool {
        f64::max(self.x_min(), other.x_min()) <= f64::min(self.x_max(), other.x_max()) + EPSILON
            && f64::max(self.y_min(), other.y_min())
                <= f64::min(self.y_max(), other.y_max()) + EPSILON
    }
}

impl Transformable for Edge {
    fn transform(&mut self, t: &Transformation) -> &mut Self {
        let Edge { start, end } = self;
        start.transform(t);
        end.transform(t);

        self
    }
}

impl DistanceTo<Point> for Edge {
    #[inline(always)]
    fn distance_to(&self, point: &Point) -> f64 {
        f64::sqrt(self.sq_distance_to(point))
    }

    #[inline(always)]
    fn sq_distance_to(&self, point: &Point) -> f64 {
        self.closest_point_on_edge(point).sq_distance_to(point)
    }
}

impl CollidesWith<Edge> for Edge {
    /// Closed-segment intersection: touching and collinear overlap count as a collision.
    fn collides_with(&self, other: &Edge) -> bool {
        if !self.bboxes_overlap(other) {
            return false;
        }
        let (o1, o2) = (self.side_of(&other.start), self.side_of(&other.end));
        let (o3, o4) = (other.side_of(&self.start), other.side_of(&self.end));

        if o1 * o2 < 0 && o3 * o4 < 0 {
            return true;
        }
        self.touches_point(&other.start)
            || self.touches_point(&other.end)
            || other.touches_point(&self.start)
            || other.touches_point(&self.end)
    }
}
