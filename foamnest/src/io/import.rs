use anyhow::{Context, Result, bail, ensure};
use float_cmp::approx_eq;
use itertools::Itertools;
use log::{info, warn};

use crate::entities::{Instance, Part, Sheet};
use crate::geometry::geo_enums::RotationSet;
use crate::geometry::normalize_degrees;
use crate::geometry::primitives::{Point, Rect, SPolygon};
use crate::io::ext_repr::{ExtInstance, ExtPart, ExtRotations, ExtSPolygon, ExtShape, ExtSheet};
use crate::util::EPSILON;

/// Converts the external representation of a nesting job into an [`Instance`].
/// All validation of the input happens here, before any search starts.
pub fn import_instance(ext_instance: &ExtInstance) -> Result<Instance> {
    let spacing = ext_instance.spacing;
    ensure!(
        spacing >= 0.0 && spacing.is_finite(),
        "invalid part spacing: {spacing}"
    );

    let sheet = import_sheet(&ext_instance.sheet, spacing)
        .context("invalid sheet")?;

    let parts = ext_instance
        .parts
        .iter()
        .enumerate()
        .map(|(id, ext_part)| {
            import_part(id, ext_part, &ext_instance.rotations, spacing)
                .with_context(|| format!("invalid part {} ({})", id, ext_part.name))
        })
        .collect::<Result<Vec<Part>>>()?;

    let instance = Instance::new(parts, sheet)?;
    info!(
        "[IMPORT] instance {} imported: {} parts, {} part instances",
        ext_instance.name,
        instance.parts.len(),
        instance.n_instances()
    );
    Ok(instance)
}

pub fn import_part(
    id: usize,
    ext_part: &ExtPart,
    default_rotations: &ExtRotations,
    spacing: f64,
) -> Result<Part> {
    let outline = import_shape(&ext_part.shape)?;
    let holes = import_holes(&ext_part.shape)?;
    let rotations = import_rotations(ext_part.rotations.as_ref().unwrap_or(default_rotations))?;
    Part::try_new(
        id,
        ext_part.name.clone(),
        ext_part.order_ref.clone(),
        ext_part.quantity,
        outline,
        rotations,
        spacing,
    )?
    .with_holes(holes)
}

pub fn import_sheet(ext_sheet: &ExtSheet, spacing: f64) -> Result<Sheet> {
    let outline = import_shape(&ext_sheet.shape)?;
    if let ExtShape::Polygon(ep) = &ext_sheet.shape {
        if !ep.inner.is_empty() {
            warn!(
                "[IMPORT] no support for sheet defects, ignoring {} hole(s) in the sheet",
                ep.inner.len()
            );
        }
    }
    Sheet::try_new(ext_sheet.material.clone(), outline, ext_sheet.margin, spacing)
}

/// Outer boundary of a shape
pub fn import_shape(ext_shape: &ExtShape) -> Result<SPolygon> {
    match ext_shape {
        ExtShape::Rectangle {
            x_min,
            y_min,
            width,
            height,
        } => {
            let rect = Rect::try_new(*x_min, *y_min, x_min + width, y_min + height)?;
            Ok(SPolygon::from(rect))
        }
        ExtShape::SimplePolygon(esp) => import_simple_polygon(esp),
        ExtShape::Polygon(ep) => import_simple_polygon(&ep.outer),
    }
}

/// Holes of a shape, only polygons have them
pub fn import_holes(ext_shape: &ExtShape) -> Result<Vec<SPolygon>> {
    match ext_shape {
        ExtShape::Polygon(ep) => ep
            .inner
            .iter()
            .enumerate()
            .map(|(i, h)| import_simple_polygon(h).with_context(|| format!("invalid hole {i}")))
            .collect(),
        _ => Ok(vec![]),
    }
}

pub fn import_rotations(ext_rotations: &ExtRotations) -> Result<RotationSet> {
    let rotations = match ext_rotations {
        ExtRotations::Fixed => RotationSet::Fixed,
        ExtRotations::Continuous => RotationSet::Continuous,
        ExtRotations::Discrete(angles) => {
            ensure!(!angles.is_empty(), "empty set of discrete rotations");
            ensure!(
                angles.iter().all(|a| a.is_finite()),
                "non-finite rotation angle in {angles:?}"
            );
            let angles = angles
                .iter()
                .map(|a| normalize_degrees(*a))
                .dedup_by(|a, b| approx_eq!(f64, *a, *b, epsilon = EPSILON))
                .collect_vec();
            match angles.as_slice() {
                [a] if *a == 0.0 => RotationSet::Fixed,
                _ => RotationSet::Discrete(angles),
            }
        }
    };
    Ok(rotations)
}

pub fn import_simple_polygon(sp: &ExtSPolygon) -> Result<SPolygon> {
    let mut points = sp.0.iter().map(|(x, y)| Point(*x, *y)).collect_vec();
    //Strip the last vertex if it is the same as the first one
    if points.len() > 1 && points[0] == points[points.len() - 1] {
        points.pop();
    }
    //Remove duplicates that are consecutive (e.g. [1, 2, 2, 3] -> [1, 2, 3])
    eliminate_degenerate_points(&mut points);
    //Bail if there are any non-consecutive duplicates.
    if points.len() != points.iter().unique().count() {
        bail!("simple polygon has non-consecutive duplicate vertices");
    }
    SPolygon::try_new(points)
}

pub fn eliminate_degenerate_points(points: &mut Vec<Point>) {
    let mut i = 0;
    while points.len() > 1 && i < points.len() {
        let j = (i + 1) % points.len();
        let (p_i, p_j) = (points[i], points[j]);
        if approx_eq!(f64, p_i.0, p_j.0, epsilon = EPSILON)
            && approx_eq!(f64, p_i.1, p_j.1, epsilon = EPSILON)
        {
            warn!(
                "[IMPORT] degenerate point of input simple polygon eliminated (idx: {}, {:?}, {:?})",
                i, p_i, p_j
            );
            points.remove(i);
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ext_repr::ExtPolygon;

    fn square_part(name: &str, size: f64, qty: usize) -> ExtPart {
        ExtPart {
            name: name.into(),
            order_ref: None,
            quantity: qty,
            shape: ExtShape::Rectangle {
                x_min: 0.0,
                y_min: 0.0,
                width: size,
                height: size,
            },
            rotations: None,
        }
    }

    fn ext_instance(parts: Vec<ExtPart>) -> ExtInstance {
        ExtInstance {
            name: "test".into(),
            parts,
            sheet: ExtSheet {
                material: Some("PU 30kg".into()),
                shape: ExtShape::Rectangle {
                    x_min: 0.0,
                    y_min: 0.0,
                    width: 100.0,
                    height: 50.0,
                },
                margin: 0.0,
            },
            rotations: ExtRotations::default(),
            spacing: 0.0,
        }
    }

    #[test]
    fn imports_valid_instance() {
        let instance = import_instance(&ext_instance(vec![
            square_part("a", 10.0, 2),
            square_part("b", 20.0, 1),
        ]))
        .unwrap();
        assert_eq!(instance.parts.len(), 2);
        assert_eq!(instance.n_instances(), 3);
        assert_eq!(instance.sheet.material.as_deref(), Some("PU 30kg"));
    }

    #[test]
    fn rejects_degenerate_part() {
        let mut part = square_part("flat", 10.0, 1);
        part.shape = ExtShape::SimplePolygon(ExtSPolygon(vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]));
        assert!(import_instance(&ext_instance(vec![part])).is_err());
    }

    #[test]
    fn rejects_self_intersecting_part() {
        let mut part = square_part("bowtie", 10.0, 1);
        part.shape = ExtShape::SimplePolygon(ExtSPolygon(vec![
            (0.0, 0.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.0, 10.0),
        ]));
        assert!(import_instance(&ext_instance(vec![part])).is_err());
    }

    #[test]
    fn closing_and_repeated_points_are_stripped() {
        let sp = ExtSPolygon(vec![
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 0.0),
            (4.0, 3.0),
            (0.0, 0.0),
        ]);
        let poly = import_simple_polygon(&sp).unwrap();
        assert_eq!(poly.n_vertices(), 3);
    }

    #[test]
    fn holes_are_carried_by_the_part() {
        let mut part = square_part("ring", 10.0, 1);
        part.shape = ExtShape::Polygon(ExtPolygon {
            outer: ExtSPolygon(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]),
            inner: vec![ExtSPolygon(vec![(2.0, 2.0), (4.0, 2.0), (4.0, 4.0)])],
        });
        //nesting uses the outer boundary
        assert_eq!(import_shape(&part.shape).unwrap().area, 100.0);

        let instance = import_instance(&ext_instance(vec![part])).unwrap();
        let ring = instance.part(0);
        assert_eq!(ring.holes.len(), 1);
        assert_eq!(ring.outline.area, 100.0);
        assert!((ring.area() - 98.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_hole_outside_part() {
        let mut part = square_part("ring", 10.0, 1);
        part.shape = ExtShape::Polygon(ExtPolygon {
            outer: ExtSPolygon(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]),
            inner: vec![ExtSPolygon(vec![(8.0, 8.0), (14.0, 8.0), (14.0, 14.0)])],
        });
        assert!(import_instance(&ext_instance(vec![part])).is_err());
    }

    #[test]
    fn rotation_sets() {
        assert_eq!(
            import_rotations(&ExtRotations::Discrete(vec![0.0])).unwrap(),
            RotationSet::Fixed
        );
        assert_eq!(
            import_rotations(&ExtRotations::Discrete(vec![-90.0, 270.0, 90.0])).unwrap(),
            RotationSet::Discrete(vec![270.0, 90.0])
        );
        assert!(import_rotations(&ExtRotations::Discrete(vec![])).is_err());
        assert!(import_rotations(&ExtRotations::Discrete(vec![f64::NAN])).is_err());
    }

    #[test]
    fn json_roundtrip_of_rotations() {
        let json = r#"{"type":"discrete","angles":[0.0,180.0]}"#;
        let r: ExtRotations = serde_json::from_str(json).unwrap();
        assert_eq!(r, ExtRotations::Discrete(vec![0.0, 180.0]));
        let c: ExtRotations = serde_json::from_str(r#"{"type":"continuous"}"#).unwrap();
        assert_eq!(c, ExtRotations::Continuous);
    }
}
