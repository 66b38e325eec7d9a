use std::fmt::Display;

use crate::entities::{Instance, Part, PlacedPart, Placement};
use crate::geometry::DTransformation;
use crate::geometry::primitives::Rect;

/// Reason why a part instance was not placed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Infeasibility {
    /// The part does not fit an empty sheet under any allowed rotation
    ExceedsSheet,
    /// The part would fit, but no more sheets may be opened
    SheetLimitReached,
    /// No feasible position was found, not even on a freshly opened sheet
    NoPosition,
    /// No layout could be computed at all, the geometry kept failing
    PlacementFailed,
}

impl Display for Infeasibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Infeasibility::ExceedsSheet => "exceeds sheet",
            Infeasibility::SheetLimitReached => "sheet limit reached",
            Infeasibility::NoPosition => "no feasible position",
            Infeasibility::PlacementFailed => "placement failed",
        };
        f.write_str(s)
    }
}

/// A part instance that could not be placed, and why
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unplaced {
    pub instance: usize,
    pub part_id: usize,
    pub reason: Infeasibility,
}

/// All parts placed on a single opened sheet
#[derive(Clone, Debug)]
pub struct SheetLayout {
    /// Index of the sheet among the opened sheets
    pub index: usize,
    pub placed: Vec<PlacedPart>,
}

impl SheetLayout {
    pub fn new(index: usize) -> Self {
        SheetLayout {
            index,
            placed: vec![],
        }
    }

    /// Registers `part` (copy `instance`) at `d_transf`. Validity is the caller's responsibility.
    pub fn place(&mut self, part: &Part, instance: usize, d_transf: DTransformation) -> &PlacedPart {
        let placement = Placement {
            instance,
            part_id: part.id,
            sheet_index: self.index,
            d_transf,
        };
        self.placed.push(PlacedPart::new(part, placement));
        &self.placed[self.placed.len() - 1]
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.placed.iter().map(|pp| &pp.placement)
    }

    /// Total cut area of the parts on this sheet
    pub fn parts_area(&self, instance: &Instance) -> f64 {
        self.placements()
            .map(|p| instance.part(p.part_id).area())
            .sum()
    }

    /// Bounding box of all placed outlines, `None` for an empty sheet
    pub fn envelope(&self, instance: &Instance) -> Option<Rect> {
        self.placements()
            .map(|p| instance.part(p.part_id).outline_at(&p.d_transf).bbox)
            .reduce(Rect::bounding_rect)
    }

    /// Fraction of the sheet area covered by parts
    pub fn density(&self, instance: &Instance) -> f64 {
        self.parts_area(instance) / instance.sheet.area()
    }
}

/// Complete result of one layout construction: all opened sheets and the instances that did not make it.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    pub sheets: Vec<SheetLayout>,
    pub unplaced: Vec<Unplaced>,
}

impl Layout {
    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.sheets.iter().flat_map(|s| s.placements())
    }

    pub fn n_placed(&self) -> usize {
        self.sheets.iter().map(|s| s.placed.len()).sum()
    }

    pub fn n_sheets(&self) -> usize {
        self.sheets.len()
    }

    pub fn n_unplaced(&self, reason: Infeasibility) -> usize {
        self.unplaced.iter().filter(|u| u.reason == reason).count()
    }
}
