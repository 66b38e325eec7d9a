use std::time::Duration;

use itertools::Itertools;

use crate::entities::{Instance, Layout, Part, Placement, SheetLayout};
use crate::geometry::geo_traits::Transformable;
use crate::geometry::primitives::SPolygon;
use crate::geometry::{DTransformation, Transformation};
use crate::io::ext_repr::{ExtPlacement, ExtSPolygon, ExtSheetLayout, ExtSolution, ExtUnplaced};

/// Exports a [`Layout`] by composing an [`ExtSolution`] from it.
pub fn export_solution(
    layout: &Layout,
    instance: &Instance,
    fitness: f64,
    run_time: Duration,
) -> ExtSolution {
    let sheets = layout
        .sheets
        .iter()
        .map(|sl| export_sheet_layout(sl, instance))
        .collect_vec();

    let unplaced = layout
        .unplaced
        .iter()
        .map(|u| ExtUnplaced {
            part_id: u.part_id,
            name: instance.part(u.part_id).name.clone(),
            instance: u.instance,
            reason: u.reason.to_string(),
        })
        .collect_vec();

    let used_area = layout.n_sheets() as f64 * instance.sheet.area();
    let parts_area = layout
        .sheets
        .iter()
        .map(|sl| sl.parts_area(instance))
        .sum::<f64>();
    let density = match used_area > 0.0 {
        true => parts_area / used_area,
        false => 0.0,
    };

    ExtSolution {
        sheets,
        unplaced,
        fitness,
        density,
        run_time_sec: run_time.as_secs_f64(),
    }
}

pub fn export_sheet_layout(sl: &SheetLayout, instance: &Instance) -> ExtSheetLayout {
    ExtSheetLayout {
        index: sl.index,
        material: instance.sheet.material.clone(),
        outline: export_simple_polygon(&instance.sheet.outline),
        placements: sl
            .placements()
            .map(|p| export_placement(p, instance))
            .collect(),
        density: sl.density(instance),
    }
}

pub fn export_placement(placement: &Placement, instance: &Instance) -> ExtPlacement {
    let part = instance.part(placement.part_id);
    let (x, y) = placement.d_transf.translation();
    ExtPlacement {
        part_id: part.id,
        name: part.name.clone(),
        order_ref: part.order_ref.clone(),
        instance: placement.instance,
        position: (x, y),
        rotation: placement.rotation(),
        transformation: int_to_ext_transformation(&placement.d_transf, part).into(),
        polygon: export_simple_polygon(&part.outline_at(&placement.d_transf)),
        holes: part
            .holes_at(&placement.d_transf)
            .iter()
            .map(export_simple_polygon)
            .collect(),
    }
}

pub fn export_simple_polygon(sp: &SPolygon) -> ExtSPolygon {
    ExtSPolygon(sp.vertices.iter().map(|&p| p.into()).collect())
}

/// Converts an internal transformation (applicable to the centered part) to an external transformation
/// (applicable to the part's outline as given in the input).
pub fn int_to_ext_transformation(int_transf: &DTransformation, part: &Part) -> DTransformation {
    //the centered outline is the input outline translated by -centroid:
    //R(p - c) + t = Rp + (t - Rc)
    let rotated_centroid = part
        .input_centroid
        .transform_clone(&Transformation::from_rotation(int_transf.rotation()));
    let (tx, ty) = int_transf.translation();
    DTransformation::new(
        int_transf.rotation(),
        (tx - rotated_centroid.0, ty - rotated_centroid.1),
    )
}
