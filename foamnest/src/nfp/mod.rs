mod cache;
mod decomposition;
mod inner;
mod minkowski;

#[doc(inline)]
pub use cache::{IfpKey, NfpCache, NfpKey, millidegrees};
#[doc(inline)]
pub use decomposition::convex_decomposition;
#[doc(inline)]
pub use inner::{InnerFit, inner_fit};
#[doc(inline)]
pub use minkowski::{minkowski_diff_convex, no_fit_polygon};

use crate::geometry::Transformation;
use crate::geometry::geo_enums::GeoPosition;
use crate::geometry::geo_traits::Transformable;
use crate::geometry::primitives::{Edge, Point, Rect, SPolygon};

/// Outer no-fit polygon of an orbiting shape around a stationary shape.
///
/// Stored as a union of convex pieces: a reference point of the orbiting shape inside the interior
/// of any piece means the two shapes overlap, on the boundary means they touch.
#[derive(Clone, Debug)]
pub struct Nfp {
    pub pieces: Vec<SPolygon>,
    pub bbox: Rect,
}

impl Nfp {
    pub fn new(pieces: Vec<SPolygon>) -> Self {
        let bbox = pieces
            .iter()
            .map(|p| p.bbox)
            .reduce(Rect::bounding_rect)
            .unwrap_or(Rect {
                x_min: 0.0,
                y_min: 0.0,
                x_max: 0.0,
                y_max: 0.0,
            });
        Nfp { pieces, bbox }
    }

    /// Returns the NFP for a stationary shape that was moved by `(dx, dy)`
    pub fn translated(&self, (dx, dy): (f64, f64)) -> Nfp {
        let t = Transformation::from_translation((dx, dy));
        Nfp::new(self.pieces.iter().map(|p| p.transform_clone(&t)).collect())
    }

    /// True if placing the orbiting reference point at `p` causes an overlap
    pub fn interior_contains(&self, p: &Point) -> bool {
        p.0 > self.bbox.x_min
            && p.0 < self.bbox.x_max
            && p.1 > self.bbox.y_min
            && p.1 < self.bbox.y_max
            && self
                .pieces
                .iter()
                .any(|piece| piece.position_of(p) == GeoPosition::Interior)
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.pieces.iter().flat_map(|p| p.edge_iter())
    }
}
