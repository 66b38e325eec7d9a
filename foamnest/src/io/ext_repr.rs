use serde::{Deserialize, Serialize};

use crate::geometry::DTransformation;

/// External representation of a nesting job: the parts to cut and the sheet stock to cut them from.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtInstance {
    /// The name of the instance
    pub name: String,
    /// Set of parts to be nested
    pub parts: Vec<ExtPart>,
    /// The sheet stock, every opened sheet is a copy of it
    pub sheet: ExtSheet,
    /// Rotations allowed for every part without an override
    #[serde(default)]
    pub rotations: ExtRotations,
    /// Minimum distance between any two parts
    #[serde(default)]
    pub spacing: f64,
}

/// External representation of a [`Part`](crate::entities::Part).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtPart {
    pub name: String,
    /// Identifier of the order line this part was derived from
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub order_ref: Option<String>,
    /// Number of copies to cut
    pub quantity: usize,
    /// Outline of the part
    pub shape: ExtShape,
    /// Overrides the instance-wide rotation set
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rotations: Option<ExtRotations>,
}

/// External representation of a [`Sheet`](crate::entities::Sheet).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtSheet {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub material: Option<String>,
    /// Boundary of the stock, must be convex
    pub shape: ExtShape,
    /// Unusable border along the edge of the sheet
    #[serde(default)]
    pub margin: f64,
}

/// Rotations (in degrees) a part is allowed to take
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "angles")]
#[serde(rename_all = "snake_case")]
pub enum ExtRotations {
    Fixed,
    Discrete(Vec<f64>),
    Continuous,
}

impl Default for ExtRotations {
    fn default() -> Self {
        ExtRotations::Discrete(vec![0.0, 90.0, 180.0, 270.0])
    }
}

/// Various ways to represent a shape
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum ExtShape {
    /// Axis-aligned rectangle. With its left bottom corner at (x_min, y_min), a width and height
    Rectangle {
        x_min: f64,
        y_min: f64,
        width: f64,
        height: f64,
    },
    /// Polygon with a single outer boundary
    SimplePolygon(ExtSPolygon),
    /// Polygon with an outer boundary and a set of holes
    Polygon(ExtPolygon),
}

/// A polygon represented as an outer boundary and a list of holes
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtPolygon {
    pub outer: ExtSPolygon,
    #[serde(default)]
    pub inner: Vec<ExtSPolygon>,
}

/// External representation of a [`SPolygon`](crate::geometry::primitives::SPolygon).
/// A polygon with no holes and no self-intersections.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExtSPolygon(pub Vec<(f64, f64)>);

/// A proper rigid transformation: a rotation about the origin followed by a translation
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ExtTransformation {
    /// The rotation angle in degrees
    pub rotation: f64,
    /// The translation vector (x, y)
    pub translation: (f64, f64),
}

impl From<DTransformation> for ExtTransformation {
    fn from(dt: DTransformation) -> Self {
        ExtTransformation {
            rotation: dt.rotation_degrees(),
            translation: dt.translation(),
        }
    }
}

/// External representation of a [`Placement`](crate::entities::Placement).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtPlacement {
    /// Index of the part in the instance
    pub part_id: usize,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub order_ref: Option<String>,
    /// Index of the part instance (copy) among all expanded part instances
    pub instance: usize,
    /// Position of the part's centroid on the sheet
    pub position: (f64, f64),
    /// Rotation about the centroid in degrees
    pub rotation: f64,
    /// Transformation mapping the part as given in the input onto the sheet
    pub transformation: ExtTransformation,
    /// The outline as it lies on the sheet
    pub polygon: ExtSPolygon,
    /// Cut-outs of the part as they lie on the sheet
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub holes: Vec<ExtSPolygon>,
}

/// External representation of a [`SheetLayout`](crate::entities::SheetLayout).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtSheetLayout {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub material: Option<String>,
    /// Boundary of the sheet
    pub outline: ExtSPolygon,
    pub placements: Vec<ExtPlacement>,
    /// Fraction of the sheet covered by parts
    pub density: f64,
}

/// A part instance that was not placed
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtUnplaced {
    pub part_id: usize,
    pub name: String,
    pub instance: usize,
    pub reason: String,
}

/// External representation of a complete nesting result
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtSolution {
    pub sheets: Vec<ExtSheetLayout>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub unplaced: Vec<ExtUnplaced>,
    /// Scalar fitness of the layout, lower is better
    pub fitness: f64,
    /// Total parts area over the total area of all used sheets
    pub density: f64,
    pub run_time_sec: f64,
}
