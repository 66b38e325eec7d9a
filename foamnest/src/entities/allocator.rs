use log::trace;

use crate::entities::{Infeasibility, Instance, Layout, SheetLayout, Unplaced};
use crate::util::assertions;

/// Material accounting of a single opened sheet
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SheetUsage {
    pub index: usize,
    pub sheet_area: f64,
    pub parts_area: f64,
}

impl SheetUsage {
    pub fn density(&self) -> f64 {
        self.parts_area / self.sheet_area
    }

    pub fn waste(&self) -> f64 {
        self.sheet_area - self.parts_area
    }
}

/// Maintains the ordered list of opened sheets during the construction of one [`Layout`].
///
/// Sheets are only opened on request, never closed or merged.
/// An optional cap limits how many sheets may be opened.
pub struct SheetAllocator<'a> {
    instance: &'a Instance,
    max_sheets: Option<usize>,
    sheets: Vec<SheetLayout>,
    unplaced: Vec<Unplaced>,
}

impl<'a> SheetAllocator<'a> {
    pub fn new(instance: &'a Instance, max_sheets: Option<usize>) -> Self {
        SheetAllocator {
            instance,
            max_sheets,
            sheets: vec![],
            unplaced: vec![],
        }
    }

    pub fn can_open(&self) -> bool {
        self.max_sheets.is_none_or(|max| self.sheets.len() < max)
    }

    /// Opens a new (empty) sheet and returns its index, or `None` if the sheet cap is reached
    pub fn open_sheet(&mut self) -> Option<usize> {
        if !self.can_open() {
            return None;
        }
        let index = self.sheets.len();
        self.sheets.push(SheetLayout::new(index));
        trace!("[PS] opened sheet {index}");
        Some(index)
    }

    pub fn sheets(&self) -> &[SheetLayout] {
        &self.sheets
    }

    pub fn sheet_mut(&mut self, index: usize) -> &mut SheetLayout {
        &mut self.sheets[index]
    }

    pub fn n_open(&self) -> usize {
        self.sheets.len()
    }

    pub fn mark_unplaced(&mut self, instance: usize, reason: Infeasibility) {
        let part_id = self.instance.part_instances[instance].part_id;
        self.unplaced.push(Unplaced {
            instance,
            part_id,
            reason,
        });
    }

    /// Material accounting per opened sheet
    pub fn usage(&self) -> Vec<SheetUsage> {
        let sheet_area = self.instance.sheet.area();
        self.sheets
            .iter()
            .map(|s| SheetUsage {
                index: s.index,
                sheet_area,
                parts_area: s.parts_area(self.instance),
            })
            .collect()
    }

    /// Consumes the allocator, returning the finished layout.
    pub fn finish(self) -> Layout {
        let layout = Layout {
            sheets: self.sheets,
            unplaced: self.unplaced,
        };
        debug_assert!(assertions::layout_is_valid(self.instance, &layout));
        layout
    }
}
