use anyhow::{Context, Result, ensure};

use crate::geometry::primitives::{Rect, SPolygon};
use crate::geometry::shape_modification::inset_convex;

/// Stock sheet onto which parts are nested. Every opened sheet is an identical copy of this stock.
#[derive(Clone, Debug)]
pub struct Sheet {
    pub material: Option<String>,
    /// Boundary of the stock as given
    pub outline: SPolygon,
    /// Region available to the nesting shapes of the parts:
    /// the outline inset by the margin and by half the part spacing
    pub usable: SPolygon,
    pub margin: f64,
}

impl Sheet {
    /// Creates a sheet from a convex boundary. Non-convex sheets are rejected.
    pub fn try_new(
        material: Option<String>,
        outline: SPolygon,
        margin: f64,
        spacing: f64,
    ) -> Result<Sheet> {
        ensure!(
            outline.is_convex(),
            "sheet boundary must be convex: {:?}",
            outline.vertices
        );
        ensure!(margin >= 0.0 && margin.is_finite(), "invalid margin: {margin}");
        ensure!(
            spacing >= 0.0 && spacing.is_finite(),
            "invalid spacing: {spacing}"
        );

        let inset = margin + spacing / 2.0;
        let usable = match (inset > 0.0, outline.is_axis_aligned_rect()) {
            (false, _) => Some(outline.clone()),
            (true, true) => outline.bbox.resize_by(-inset, -inset).map(SPolygon::from),
            (true, false) => inset_convex(&outline, inset),
        }
        .context("sheet margin leaves no usable area on the sheet")?;

        Ok(Sheet {
            material,
            outline,
            usable,
            margin,
        })
    }

    /// Rectangular sheet of `width` by `height` with its bottom-left corner at the origin
    pub fn rectangle(
        material: Option<String>,
        width: f64,
        height: f64,
        margin: f64,
        spacing: f64,
    ) -> Result<Sheet> {
        let outline = SPolygon::from(Rect::try_new(0.0, 0.0, width, height)?);
        Sheet::try_new(material, outline, margin, spacing)
    }

    /// Area of the full stock
    pub fn area(&self) -> f64 {
        self.outline.area
    }

    pub fn width(&self) -> f64 {
        self.outline.bbox.width()
    }

    pub fn height(&self) -> f64 {
        self.outline.bbox.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives::Point;

    #[test]
    fn margin_is_inset() {
        let sheet = Sheet::rectangle(Some("PE foam".into()), 100.0, 50.0, 10.0, 0.0).unwrap();
        assert_eq!(sheet.area(), 5000.0);
        assert!((sheet.usable.area - 80.0 * 30.0).abs() < 1e-9);
        assert!(Sheet::rectangle(None, 100.0, 50.0, 25.0, 0.0).is_err());
    }

    #[test]
    fn concave_sheet_rejected() {
        let l = SPolygon::try_new(vec![
            Point(0.0, 0.0),
            Point(4.0, 0.0),
            Point(4.0, 1.0),
            Point(1.0, 1.0),
            Point(1.0, 4.0),
            Point(0.0, 4.0),
        ])
        .unwrap();
        assert!(Sheet::try_new(None, l, 0.0, 0.0).is_err());
    }
}
