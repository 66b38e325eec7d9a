use anyhow::{Context, Result, ensure};
use itertools::Itertools;

use crate::geometry::convex_hull::convex_hull_from_points;
use crate::geometry::primitives::SPolygon;
use crate::nfp::Nfp;

/// Minkowski sum of convex `a` with the point reflection of convex `b`: `a ⊕ (-b)`.
///
/// This is the no-fit polygon of `b` orbiting `a` when both reference points sit at the origin.
pub fn minkowski_diff_convex(a: &SPolygon, b: &SPolygon) -> Result<SPolygon> {
    let sums = a
        .vertices
        .iter()
        .cartesian_product(b.vertices.iter())
        .map(|(p, q)| *p - *q)
        .collect_vec();
    let hull = convex_hull_from_points(sums);
    SPolygon::try_new(hull).context("degenerate convex no-fit polygon")
}

/// No-fit polygon of a (decomposed) orbiting shape around a (decomposed) stationary shape.
/// Both shapes are given as convex pieces in their final orientation, with their reference points at the origin.
pub fn no_fit_polygon(stationary: &[SPolygon], orbiting: &[SPolygon]) -> Result<Nfp> {
    ensure!(
        !stationary.is_empty() && !orbiting.is_empty(),
        "no-fit polygon requires non-empty shapes"
    );
    let pieces = stationary
        .iter()
        .cartesian_product(orbiting.iter())
        .map(|(s, o)| minkowski_diff_convex(s, o))
        .collect::<Result<Vec<_>>>()?;
    let nfp = Nfp::new(pieces);
    ensure!(
        nfp.bbox.x_min.is_finite() && nfp.bbox.y_max.is_finite(),
        "no-fit polygon has non-finite bounds"
    );
    Ok(nfp)
}
