use anyhow::{Result, bail};
use itertools::Itertools;
use log::debug;

use crate::geometry::primitives::{Point, SPolygon, orientation};

/// Splits a simple polygon into convex pieces whose union is the polygon and whose interiors are disjoint.
///
/// Ear clipping produces a triangulation, after which adjacent pieces are merged across their
/// shared diagonal whenever the result stays convex (Hertel–Mehlhorn).
/// Convex polygons are returned as a single piece.
pub fn convex_decomposition(sp: &SPolygon) -> Result<Vec<SPolygon>> {
    if sp.is_convex() {
        return Ok(vec![sp.clone()]);
    }
    let points = &sp.vertices;
    let mut pieces = triangulate(points)?;

    //Hertel–Mehlhorn: merge pieces across shared diagonals while convexity is preserved
    'merging: loop {
        for (i, j) in (0..pieces.len()).tuple_combinations() {
            if let Some(merged) = merge_across_diagonal(&pieces[i], &pieces[j])
                && is_convex_ring(points, &merged)
            {
                pieces[i] = merged;
                pieces.swap_remove(j);
                continue 'merging;
            }
        }
        break;
    }

    debug!(
        "[NFP] decomposed polygon with {} vertices into {} convex pieces",
        sp.n_vertices(),
        pieces.len()
    );

    pieces
        .into_iter()
        .map(|idx| SPolygon::try_new(idx.into_iter().map(|i| points[i]).collect()))
        .collect()
}

/// Ear clipping triangulation of a counterclockwise ring, returns index triples.
fn triangulate(points: &[Point]) -> Result<Vec<Vec<usize>>> {
    let mut ring = (0..points.len()).collect_vec();
    let mut triangles = Vec::with_capacity(points.len() - 2);

    while ring.len() > 3 {
        let n = ring.len();
        let ear = (0..n).find(|&i| {
            let (prev, curr, next) = (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);
            is_ear(points, &ring, prev, curr, next)
        });
        match ear {
            Some(i) => {
                let (prev, curr, next) = (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);
                triangles.push(vec![prev, curr, next]);
                ring.remove(i);
            }
            None => {
                //a vertex on the straight line between its neighbours contributes no area
                let collinear = (0..n).find(|&i| {
                    let (prev, curr, next) = (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);
                    orientation(points[prev], points[curr], points[next]) == 0.0
                });
                match collinear {
                    Some(i) => {
                        ring.remove(i);
                    }
                    None => bail!("no ear found while triangulating polygon: {points:?}"),
                }
            }
        }
    }
    if orientation(points[ring[0]], points[ring[1]], points[ring[2]]) > 0.0 {
        triangles.push(ring);
    }
    Ok(triangles)
}

fn is_ear(points: &[Point], ring: &[usize], prev: usize, curr: usize, next: usize) -> bool {
    let (a, b, c) = (points[prev], points[curr], points[next]);
    if orientation(a, b, c) <= 0.0 {
        //reflex or collinear vertex
        return false;
    }
    //no other vertex of the ring may lie inside or on the candidate triangle
    ring.iter()
        .filter(|&&k| k != prev && k != curr && k != next)
        .all(|&k| {
            let p = points[k];
            orientation(a, b, p) < 0.0 || orientation(b, c, p) < 0.0 || orientation(c, a, p) < 0.0
        })
}

/// Merges two counterclockwise index rings that share an edge (in opposite directions).
fn merge_across_diagonal(a: &[usize], b: &[usize]) -> Option<Vec<usize>> {
    let (na, nb) = (a.len(), b.len());
    for i in 0..na {
        let (u, v) = (a[i], a[(i + 1) % na]);
        //b traverses the shared edge as v -> u
        if let Some(j) = (0..nb).find(|&j| b[j] == v && b[(j + 1) % nb] == u) {
            //walk a from v around to u, then b from u around to v (exclusive of both)
            let mut merged = (0..na).map(|k| a[(i + 1 + k) % na]).collect_vec();
            merged.extend((2..nb).map(|k| b[(j + k) % nb]));
            return Some(merged);
        }
    }
    None
}

fn is_convex_ring(points: &[Point], ring: &[usize]) -> bool {
    let n = ring.len();
    (0..n).all(|i| {
        let (a, b, c) = (points[ring[i]], points[ring[(i + 1) % n]], points[ring[(i + 2) % n]]);
        orientation(a, b, c) >= 0.0
    })
}
