use std::sync::Arc;

use crate::entities::Part;
use crate::geometry::DTransformation;
use crate::geometry::primitives::{Point, SPolygon};

/// Assignment of one part instance to a sheet at a position and rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    /// Index into [`Instance::part_instances`](crate::entities::Instance::part_instances)
    pub instance: usize,
    pub part_id: usize,
    /// Index of the sheet among the opened sheets
    pub sheet_index: usize,
    /// Rotation about the part's reference point, followed by the translation of the reference point
    pub d_transf: DTransformation,
}

impl Placement {
    /// Rotation in degrees, in `[0, 360)`
    pub fn rotation(&self) -> f64 {
        self.d_transf.rotation_degrees()
    }

    /// Position of the part's reference point on the sheet
    pub fn position(&self) -> Point {
        self.d_transf.translation().into()
    }
}

/// A [`Placement`] together with the nesting shape it occupies on the sheet
#[derive(Clone, Debug)]
pub struct PlacedPart {
    pub placement: Placement,
    /// Nesting shape of the part after the placement's transformation
    pub shape: Arc<SPolygon>,
}

impl PlacedPart {
    pub fn new(part: &Part, placement: Placement) -> Self {
        debug_assert!(part.id == placement.part_id);
        let shape = Arc::new(part.shape_at(&placement.d_transf));
        PlacedPart { placement, shape }
    }
}
