#![doc = document_features::document_features!()]
//! Geometry, no-fit polygons and layout model for nesting irregular parts onto stock sheets.

/// Entities to model the sheet nesting problem: parts, sheets, placements and layouts
pub mod entities;

/// Geometric primitives and base algorithms
pub mod geometry;

/// No-fit polygons, inner-fit polygons and their cache
pub mod nfp;

/// Importing nesting jobs into and exporting layouts out of this library
pub mod io;

/// Helper functions which do not belong to any specific module
pub mod util;
