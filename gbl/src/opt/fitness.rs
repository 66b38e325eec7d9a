use foamnest::entities::{Infeasibility, Instance, Layout};

use crate::config::FitnessWeights;

/// Fitness of a layout that could not place every feasible part instance, before adding the number of missing instances
pub const FAILURE_PENALTY: f64 = 1e9;

/// Scalar fitness of a completed layout, lower is better.
///
/// Per used sheet: `sheet + waste * (envelope - parts) / sheet_area + compactness * envelope / sheet_area`,
/// where `envelope` is the area of the bounding box around the placed parts.
/// Since the waste and compactness fractions never exceed 1, the number of sheets dominates.
///
/// Instances that never fit a sheet ([`Infeasibility::ExceedsSheet`]) do not count against the layout.
/// Any other unplaced instance makes it a failed layout, see [`failure_fitness`].
pub fn layout_fitness(layout: &Layout, instance: &Instance, weights: &FitnessWeights) -> f64 {
    let n_failed = layout
        .unplaced
        .iter()
        .filter(|u| u.reason != Infeasibility::ExceedsSheet)
        .count();
    if n_failed > 0 {
        return failure_fitness(n_failed);
    }

    let sheet_area = instance.sheet.area();
    layout
        .sheets
        .iter()
        .map(|sl| {
            let envelope = sl.envelope(instance).map_or(0.0, |r| r.area());
            let parts = sl.parts_area(instance);
            weights.sheet
                + weights.waste * (envelope - parts).max(0.0) / sheet_area
                + weights.compactness * envelope / sheet_area
        })
        .sum()
}

/// Fitness of a failed layout, more missing instances is worse
pub fn failure_fitness(n_unplaced: usize) -> f64 {
    FAILURE_PENALTY + n_unplaced as f64
}
