use std::sync::Arc;

use anyhow::{Context, Result, ensure};

use crate::geometry::geo_enums::RotationSet;
use crate::geometry::geo_traits::Transformable;
use crate::geometry::overlap::polygon_encloses;
use crate::geometry::primitives::{Point, SPolygon};
use crate::geometry::shape_modification::{ShapeModifyMode, offset_shape};
use crate::geometry::{DTransformation, Transformation};
use crate::nfp::convex_decomposition;

/// Cut shape to be nested, expanded into `quantity` individual part instances before nesting.
///
/// All shapes are stored centered: the area centroid of the outline lies at the origin,
/// which is the reference point for positions and rotations.
#[derive(Clone, Debug)]
pub struct Part {
    pub id: usize,
    pub name: String,
    /// Reference back to the originating order line
    pub order_ref: Option<String>,
    pub quantity: usize,
    /// Outline as it will be cut
    pub outline: Arc<SPolygon>,
    /// Shape used for nesting: the outline inflated by half the part spacing
    pub shape: Arc<SPolygon>,
    /// Convex decomposition of `shape`
    pub pieces: Arc<Vec<SPolygon>>,
    /// Cut-outs inside the outline. They are exported with the part, nesting only uses the outline.
    pub holes: Arc<Vec<SPolygon>>,
    pub allowed_rotations: RotationSet,
    /// Centroid of the outline in the input coordinates
    pub input_centroid: Point,
}

impl Part {
    pub fn try_new(
        id: usize,
        name: String,
        order_ref: Option<String>,
        quantity: usize,
        outline: SPolygon,
        allowed_rotations: RotationSet,
        spacing: f64,
    ) -> Result<Part> {
        ensure!(quantity > 0, "part {name} has quantity 0");
        ensure!(
            spacing >= 0.0 && spacing.is_finite(),
            "invalid spacing: {spacing}"
        );
        let (outline, input_centroid) = outline.centered();

        let shape = if spacing > 0.0 {
            offset_shape(&outline, ShapeModifyMode::Inflate, spacing / 2.0)
                .with_context(|| format!("failed to inflate part {name}"))?
        } else {
            outline.clone()
        };
        let pieces = convex_decomposition(&shape)
            .with_context(|| format!("failed to decompose part {name}"))?;

        Ok(Part {
            id,
            name,
            order_ref,
            quantity,
            outline: Arc::new(outline),
            shape: Arc::new(shape),
            pieces: Arc::new(pieces),
            holes: Arc::new(vec![]),
            allowed_rotations,
            input_centroid,
        })
    }

    /// Attaches cut-outs, given in the same coordinates as the outline passed to [`Part::try_new`]
    pub fn with_holes(mut self, holes: Vec<SPolygon>) -> Result<Part> {
        let to_center = Transformation::from_translation((-self.input_centroid.0, -self.input_centroid.1));
        let holes = holes
            .into_iter()
            .map(|h| h.transform_clone(&to_center))
            .collect::<Vec<_>>();
        for (i, hole) in holes.iter().enumerate() {
            ensure!(
                polygon_encloses(&self.outline, hole),
                "hole {i} of part {} is not inside its outline",
                self.name
            );
        }
        self.holes = Arc::new(holes);
        Ok(self)
    }

    /// Area of the cut part: the outline minus its holes
    pub fn area(&self) -> f64 {
        self.outline.area - self.holes.iter().map(|h| h.area).sum::<f64>()
    }

    /// Nesting shape after applying `dt`
    pub fn shape_at(&self, dt: &DTransformation) -> SPolygon {
        self.shape.transform_clone(&dt.compose())
    }

    /// Cut outline after applying `dt`
    pub fn outline_at(&self, dt: &DTransformation) -> SPolygon {
        self.outline.transform_clone(&dt.compose())
    }

    /// Holes after applying `dt`
    pub fn holes_at(&self, dt: &DTransformation) -> Vec<SPolygon> {
        let t = dt.compose();
        self.holes.iter().map(|h| h.transform_clone(&t)).collect()
    }

    /// Convex pieces of the nesting shape rotated by `rotation` degrees (no translation)
    pub fn pieces_at(&self, rotation: f64) -> Vec<SPolygon> {
        let t = Transformation::from_rotation(rotation.to_radians());
        self.pieces.iter().map(|p| p.transform_clone(&t)).collect()
    }
}
