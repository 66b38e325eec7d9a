mod d_transformation;
mod transformation;

/// Convex hull computation
pub mod convex_hull;
/// Enums to classify geometric relations and rotation policies
pub mod geo_enums;
/// Traits shared by the geometric primitives
pub mod geo_traits;
/// Interior-overlap and containment tests between simple polygons
pub mod overlap;
/// Geometric primitives: points, edges, rectangles and simple polygons
pub mod primitives;
/// Offsetting and insetting of shapes
pub mod shape_modification;

#[doc(inline)]
pub use d_transformation::DTransformation;
#[doc(inline)]
pub use d_transformation::normalize_degrees;
#[doc(inline)]
pub use transformation::Transformation;
