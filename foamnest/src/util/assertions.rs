use std::collections::HashSet;

use itertools::Itertools;
use log::error;

use crate::entities::{Instance, Layout, SheetLayout};
use crate::geometry::overlap::{polygon_encloses, polygons_overlap};
//Various checks to verify correctness of the state of the system
//Used in debug_assertion!() blocks

/// Every part instance appears at most once, and placed + unplaced never exceeds the instance count
pub fn instance_accounting_correct(instance: &Instance, layout: &Layout) -> bool {
    let mut seen = HashSet::new();
    let placed = layout.placements().map(|p| (p.instance, p.part_id));
    let unplaced = layout.unplaced.iter().map(|u| (u.instance, u.part_id));
    for (inst, part_id) in placed.chain(unplaced) {
        if !seen.insert(inst) {
            error!("part instance {inst} occurs more than once in the layout");
            return false;
        }
        if instance.part_instances[inst].part_id != part_id {
            error!("part instance {inst} is registered with the wrong part id {part_id}");
            return false;
        }
    }
    true
}

/// No two nesting shapes on the sheet overlap
pub fn sheet_has_no_overlaps(sheet: &SheetLayout) -> bool {
    for (a, b) in sheet.placed.iter().tuple_combinations() {
        if polygons_overlap(&a.shape, &b.shape) {
            error!(
                "overlap on sheet {} between instances {} and {}",
                sheet.index, a.placement.instance, b.placement.instance
            );
            return false;
        }
    }
    true
}

/// Every nesting shape on the sheet lies within the usable region of the sheet
pub fn sheet_in_bounds(instance: &Instance, sheet: &SheetLayout) -> bool {
    for pp in sheet.placed.iter() {
        if !polygon_encloses(&instance.sheet.usable, &pp.shape) {
            error!(
                "instance {} exceeds the bounds of sheet {}",
                pp.placement.instance, sheet.index
            );
            return false;
        }
    }
    true
}

pub fn layout_is_valid(instance: &Instance, layout: &Layout) -> bool {
    instance_accounting_correct(instance, layout)
        && layout
            .sheets
            .iter()
            .enumerate()
            .all(|(i, s)| s.index == i && sheet_has_no_overlaps(s) && sheet_in_bounds(instance, s))
}
