use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use foamnest::entities::{Infeasibility, Instance, Layout, Part, SheetAllocator, SheetLayout};
use foamnest::geometry::DTransformation;
use foamnest::geometry::Transformation;
use foamnest::geometry::geo_traits::{CollidesWith, Transformable};
use foamnest::geometry::overlap::{polygon_encloses, polygons_overlap};
use foamnest::geometry::primitives::{Point, Rect, SPolygon};
use foamnest::nfp::{IfpKey, InnerFit, Nfp, NfpCache, NfpKey, inner_fit, millidegrees, no_fit_polygon};
use foamnest::util::EPSILON;
use itertools::Itertools;
use log::{debug, trace};
use ordered_float::OrderedFloat;

use crate::config::{Gravity, PlacementConfig};
use crate::opt::candidate::Candidate;

/// Resolution of the primary gravity axis when ranking positions.
/// Positions that differ less than this along it are ranked by the secondary axis.
const GRAVITY_SNAP: f64 = 1e-6;

/// Computes the no-fit polygon of `orbiting` (rotated by `orbiting_rot` degrees)
/// around `stationary` (rotated by `stationary_rot` degrees)
pub type NfpGenerator =
    fn(stationary: &Part, stationary_rot: f64, orbiting: &Part, orbiting_rot: f64) -> Result<Nfp>;

/// Minkowski sums of the convex pieces of both parts
pub fn decomposed_nfp(stationary: &Part, stationary_rot: f64, orbiting: &Part, orbiting_rot: f64) -> Result<Nfp> {
    no_fit_polygon(&stationary.pieces_at(stationary_rot), &orbiting.pieces_at(orbiting_rot))
}

/// Turns a [`Candidate`] into a [`Layout`] by placing its part instances one by one,
/// each at the bottom-left-most feasible position derived from no-fit polygons.
pub struct PlacementSolver<'a> {
    instance: &'a Instance,
    cache: &'a NfpCache,
    config: PlacementConfig,
    max_sheets: Option<usize>,
    nfp_generator: NfpGenerator,
}

impl<'a> PlacementSolver<'a> {
    pub fn new(
        instance: &'a Instance,
        cache: &'a NfpCache,
        config: PlacementConfig,
        max_sheets: Option<usize>,
    ) -> Self {
        Self {
            instance,
            cache,
            config,
            max_sheets,
            nfp_generator: decomposed_nfp,
        }
    }

    /// Replaces the function computing no-fit polygons that are missing from the cache
    pub fn with_nfp_generator(mut self, nfp_generator: NfpGenerator) -> Self {
        self.nfp_generator = nfp_generator;
        self
    }

    /// Builds a layout from scratch. Part instances are tried on the open sheets in order,
    /// a new sheet is opened only when none of them has room.
    ///
    /// Returns an error only when no-fit polygons keep failing after all retries.
    pub fn layout(&self, candidate: &Candidate) -> Result<Layout> {
        let mut alloc = SheetAllocator::new(self.instance, self.max_sheets);

        for gene in candidate.genes.iter() {
            let part = self
                .instance
                .part(self.instance.part_instances[gene.instance].part_id);
            //the gene's own rotation may fit where the pre-checked rotations do not
            if !self.instance.is_feasible(part.id) && self.inner_fit_at(part, quantize(gene.rotation))?.is_none() {
                alloc.mark_unplaced(gene.instance, Infeasibility::ExceedsSheet);
                continue;
            }
            let rotations = self.rotation_options(part, gene.rotation);

            let mut placed = None;
            for s in 0..alloc.n_open() {
                if let Some(dt) = self.find_position(&alloc.sheets()[s], part, &rotations)? {
                    placed = Some((s, dt));
                    break;
                }
            }

            let (s, dt) = match placed {
                Some(p) => p,
                None if !alloc.can_open() => {
                    alloc.mark_unplaced(gene.instance, Infeasibility::SheetLimitReached);
                    continue;
                }
                None => {
                    let empty = SheetLayout::new(alloc.n_open());
                    match (self.find_position(&empty, part, &rotations)?, alloc.open_sheet()) {
                        (Some(dt), Some(s)) => (s, dt),
                        (Some(_), None) => {
                            alloc.mark_unplaced(gene.instance, Infeasibility::SheetLimitReached);
                            continue;
                        }
                        (None, _) => {
                            alloc.mark_unplaced(gene.instance, Infeasibility::NoPosition);
                            continue;
                        }
                    }
                }
            };
            alloc.sheet_mut(s).place(part, gene.instance, dt);
            trace!(
                "[PS] placed instance {} ({}) on sheet {} at [{}]",
                gene.instance, part.name, s, dt
            );
        }

        //instances the candidate does not cover can never be placed
        let covered = candidate.genes.iter().map(|g| g.instance).collect::<HashSet<_>>();
        for i in self.instance.infeasible_instances() {
            if !covered.contains(&i) {
                alloc.mark_unplaced(i, Infeasibility::ExceedsSheet);
            }
        }

        Ok(alloc.finish())
    }

    /// The gene's rotation first, then the part's other feasible rotations as fallback
    fn rotation_options(&self, part: &Part, rotation: f64) -> Vec<f64> {
        let mut rotations = vec![quantize(rotation)];
        for &r in self.instance.feasible_rotations[part.id].iter() {
            let r = quantize(r);
            if !rotations.contains(&r) {
                rotations.push(r);
            }
        }
        rotations
    }

    /// Bottom-left-most feasible transformation for `part` on `sheet`, trying `rotations` in order
    pub fn find_position(
        &self,
        sheet: &SheetLayout,
        part: &Part,
        rotations: &[f64],
    ) -> Result<Option<DTransformation>> {
        for &rotation in rotations {
            if let Some((r, p)) = self.position_with_retries(sheet, part, rotation)? {
                return Ok(Some(DTransformation::from_degrees(r, p.into())));
            }
        }
        Ok(None)
    }

    /// Retries with a slightly nudged rotation when a no-fit polygon cannot be computed
    fn position_with_retries(
        &self,
        sheet: &SheetLayout,
        part: &Part,
        rotation: f64,
    ) -> Result<Option<(f64, Point)>> {
        let mut last_err = None;
        for attempt in 0..=self.config.nfp_retries {
            let r = quantize(rotation + attempt as f64 * self.config.nudge_degrees);
            match self.bottom_left_position(sheet, part, r) {
                Ok(pos) => return Ok(pos.map(|p| (r, p))),
                Err(e) => {
                    debug!(
                        "[NFP] attempt {} for part {} at {:.3}° failed: {:#}",
                        attempt, part.name, r, e
                    );
                    last_err = Some(e);
                }
            }
        }
        let err = last_err.unwrap_or_else(|| anyhow!("no attempts were made"));
        Err(err.context(format!(
            "no-fit polygons for part {} near {:.3}° failed {} times",
            part.name,
            rotation,
            self.config.nfp_retries + 1
        )))
    }

    /// Lowest-then-leftmost (or leftmost-then-lowest) point of the inner-fit polygon
    /// that lies outside the interior of every no-fit polygon on the sheet
    fn bottom_left_position(&self, sheet: &SheetLayout, part: &Part, rotation: f64) -> Result<Option<Point>> {
        let Some(ifp) = self.inner_fit_at(part, rotation)? else {
            return Ok(None);
        };

        let ifp_bbox = {
            let bbox = ifp.bbox();
            bbox.resize_by(EPSILON, EPSILON).unwrap_or(bbox)
        };

        let nfps = sheet
            .placed
            .iter()
            .filter(|pp| {
                //shapes too far away to constrain any position within the inner-fit polygon
                let reach = Rect {
                    x_min: pp.shape.bbox.x_min - part.shape.bbox.width() - part.shape.bbox.height(),
                    y_min: pp.shape.bbox.y_min - part.shape.bbox.width() - part.shape.bbox.height(),
                    x_max: pp.shape.bbox.x_max + part.shape.bbox.width() + part.shape.bbox.height(),
                    y_max: pp.shape.bbox.y_max + part.shape.bbox.width() + part.shape.bbox.height(),
                };
                reach.collides_with(&ifp_bbox)
            })
            .map(|pp| -> Result<Nfp> {
                let stationary = self.instance.part(pp.placement.part_id);
                let s_rot = pp.placement.rotation();
                let key = NfpKey::new(stationary.id, s_rot, part.id, rotation);
                let nfp = self
                    .cache
                    .nfp(key, || (self.nfp_generator)(stationary, s_rot, part, rotation))?;
                Ok(nfp.translated(pp.placement.d_transf.translation()))
            })
            .collect::<Result<Vec<Nfp>>>()?
            .into_iter()
            .filter(|nfp| nfp.bbox.collides_with(&ifp_bbox))
            .collect_vec();

        let candidates = candidate_points(&ifp, &ifp_bbox, &nfps)
            .into_iter()
            .filter(|p| ifp.contains(p) && !nfps.iter().any(|nfp| nfp.interior_contains(p)))
            .sorted_by_key(|p| self.gravity_key(p))
            .collect_vec();

        //verify with the exact overlap test, guarding against seams between no-fit polygon pieces
        for p in candidates {
            let shape = part.shape_at(&DTransformation::from_degrees(rotation, p.into()));
            if is_valid_position(&self.instance.sheet.usable, sheet, &shape) {
                return Ok(Some(p));
            }
            trace!("[PS] candidate position {p:?} for {} rejected by exact check", part.name);
        }
        Ok(None)
    }

    /// Inner-fit polygon of `part` at `rotation` on an empty sheet, `None` if it does not fit
    fn inner_fit_at(&self, part: &Part, rotation: f64) -> Result<Option<Arc<InnerFit>>> {
        self.cache.ifp(IfpKey::new(part.id, rotation), || {
            let rotated = part
                .shape
                .transform_clone(&Transformation::from_rotation(rotation.to_radians()));
            inner_fit(&self.instance.sheet.usable, &rotated)
        })
    }

    fn gravity_key(&self, p: &Point) -> (OrderedFloat<f64>, OrderedFloat<f64>) {
        let snap = |v: f64| OrderedFloat((v / GRAVITY_SNAP).round());
        match self.config.gravity {
            Gravity::BottomLeft => (snap(p.1), OrderedFloat(p.0)),
            Gravity::LeftBottom => (snap(p.0), OrderedFloat(p.1)),
        }
    }
}

/// Candidate reference-point positions: every vertex of the feasible region
/// (inner-fit polygon minus the no-fit polygons) is among these points.
fn candidate_points(ifp: &InnerFit, ifp_bbox: &Rect, nfps: &[Nfp]) -> Vec<Point> {
    let ifp_edges = ifp.edges();
    let pieces = nfps
        .iter()
        .flat_map(|nfp| nfp.pieces.iter())
        .filter(|piece| piece.bbox.collides_with(ifp_bbox))
        .collect_vec();

    let mut points = ifp.vertices.clone();

    for piece in pieces.iter() {
        points.extend(
            piece
                .vertices
                .iter()
                .filter(|v| ifp_bbox.collides_with(*v))
                .copied(),
        );
        for e in piece.edge_iter() {
            points.extend(ifp_edges.iter().filter_map(|f| e.collides_at(f)));
        }
    }

    for (a, b) in pieces.iter().tuple_combinations() {
        if !a.bbox.collides_with(&b.bbox) {
            continue;
        }
        for e_a in a.edge_iter() {
            points.extend(b.edge_iter().filter_map(|e_b| e_a.collides_at(&e_b)));
        }
    }
    points
}

/// Exact check: `shape` lies within the usable area and overlaps nothing placed on the sheet
fn is_valid_position(usable: &SPolygon, sheet: &SheetLayout, shape: &SPolygon) -> bool {
    polygon_encloses(usable, shape) && !sheet.placed.iter().any(|pp| polygons_overlap(&pp.shape, shape))
}

/// Rounds an angle to whole millidegrees, the resolution of the no-fit polygon cache keys
fn quantize(rotation: f64) -> f64 {
    millidegrees(rotation) as f64 / 1000.0
}
