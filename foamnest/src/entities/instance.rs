use anyhow::{Result, ensure};
use itertools::Itertools;
use log::{debug, warn};

use crate::entities::{Part, Sheet};
use crate::geometry::Transformation;
use crate::geometry::geo_enums::RotationSet;
use crate::geometry::geo_traits::Transformable;
use crate::nfp::{inner_fit, millidegrees};

/// One physical copy of a [`Part`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PartInstance {
    pub part_id: usize,
    /// Index of this copy among the `quantity` copies of the part
    pub copy: usize,
}

/// Static representation of a nesting job: the parts, the sheet stock and the expanded part instances.
#[derive(Clone, Debug)]
pub struct Instance {
    pub parts: Vec<Part>,
    pub sheet: Sheet,
    /// Every part expanded into its individual copies, parts in input order
    pub part_instances: Vec<PartInstance>,
    /// Per part, allowed rotations (degrees) under which it fits an empty sheet.
    /// For continuous rotation this is one representative per fitting interval,
    /// plus the right angles that fit.
    pub feasible_rotations: Vec<Vec<f64>>,
}

impl Instance {
    pub fn new(parts: Vec<Part>, sheet: Sheet) -> Result<Instance> {
        ensure!(
            parts.iter().enumerate().all(|(i, p)| p.id == i),
            "part ids must match their index"
        );

        let part_instances = parts
            .iter()
            .flat_map(|p| (0..p.quantity).map(|copy| PartInstance { part_id: p.id, copy }))
            .collect_vec();

        let feasible_rotations = parts
            .iter()
            .map(|p| Instance::fitting_rotations(p, &sheet))
            .collect_vec();

        for (part, rots) in parts.iter().zip(&feasible_rotations) {
            match rots.is_empty() {
                true => warn!(
                    "[IMPORT] part {} does not fit the sheet under any allowed rotation",
                    part.name
                ),
                false => debug!(
                    "[IMPORT] part {} fits the sheet at {} rotation(s)",
                    part.name,
                    rots.len()
                ),
            }
        }

        Ok(Instance {
            parts,
            sheet,
            part_instances,
            feasible_rotations,
        })
    }

    /// Allowed rotations of `part` for which an inner-fit polygon on the empty sheet exists
    fn fitting_rotations(part: &Part, sheet: &Sheet) -> Vec<f64> {
        let angles = part
            .allowed_rotations
            .scan_angles()
            .into_iter()
            .unique_by(|r| millidegrees(*r))
            .collect_vec();
        let fits = angles
            .iter()
            .map(|r| {
                let rotated = part
                    .shape
                    .transform_clone(&Transformation::from_rotation(r.to_radians()));
                inner_fit(&sheet.usable, &rotated).is_some()
            })
            .collect_vec();

        match part.allowed_rotations {
            RotationSet::Continuous => interval_representatives(&angles, &fits),
            _ => angles
                .into_iter()
                .zip(fits)
                .filter_map(|(r, fit)| fit.then_some(r))
                .collect(),
        }
    }

    pub fn part(&self, id: usize) -> &Part {
        &self.parts[id]
    }

    pub fn n_instances(&self) -> usize {
        self.part_instances.len()
    }

    /// True if the part fits an empty sheet in at least one allowed rotation
    pub fn is_feasible(&self, part_id: usize) -> bool {
        !self.feasible_rotations[part_id].is_empty()
    }

    /// Indices (into [`Instance::part_instances`]) of instances whose part fits the sheet
    pub fn feasible_instances(&self) -> Vec<usize> {
        (0..self.n_instances())
            .filter(|&i| self.is_feasible(self.part_instances[i].part_id))
            .collect()
    }

    /// Indices (into [`Instance::part_instances`]) of instances whose part can never be placed
    pub fn infeasible_instances(&self) -> Vec<usize> {
        (0..self.n_instances())
            .filter(|&i| !self.is_feasible(self.part_instances[i].part_id))
            .collect()
    }
}

/// Reduces a full circle of scanned angles to the middle angle of every run of consecutive fitting angles,
/// plus every fitting right angle. Runs may wrap around 0°.
fn interval_representatives(angles: &[f64], fits: &[bool]) -> Vec<f64> {
    let n = angles.len();
    let mut representatives = angles
        .iter()
        .zip(fits)
        .filter(|(r, fit)| **fit && millidegrees(**r) % 90_000 == 0)
        .map(|(r, _)| *r)
        .collect_vec();

    //start scanning at an angle that does not fit, so no run is split by the wrap-around
    if let Some(start) = fits.iter().position(|fit| !fit) {
        let mut run_start = None;
        for k in 0..=n {
            let fit = k < n && fits[(start + k) % n];
            match (fit, run_start) {
                (true, None) => run_start = Some(k),
                (false, Some(s)) => {
                    representatives.push(angles[(start + (s + k - 1) / 2) % n]);
                    run_start = None;
                }
                _ => {}
            }
        }
    }

    representatives
        .into_iter()
        .unique_by(|r| millidegrees(*r))
        .sorted_by_key(|r| millidegrees(*r))
        .collect()
}
