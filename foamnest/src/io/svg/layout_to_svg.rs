use std::collections::HashMap;

use svg::Document;
use svg::node::element::{Definitions, Group, Title, Use};

use crate::entities::{Instance, SheetLayout};
use crate::geometry::DTransformation;
use crate::io::svg::svg_util::{Color, SvgDrawOptions, data_to_path, simple_polygon_data};

/// Renders a single sheet and the parts placed on it.
/// Every part is defined once and referenced per placement.
pub fn layout_to_svg(sheet_layout: &SheetLayout, instance: &Instance, options: SvgDrawOptions) -> Document {
    let sheet = &instance.sheet;
    let theme = options.theme.theme();

    let bbox = sheet.outline.bbox;
    let pad = 0.025 * f64::max(bbox.width(), bbox.height());
    let vbox = (
        bbox.x_min - pad,
        bbox.y_min - pad,
        bbox.width() + 2.0 * pad,
        bbox.height() + 2.0 * pad,
    );
    let stroke_width = f64::min(bbox.width(), bbox.height()) * 0.001 * theme.stroke_width_multiplier;

    //draw sheet
    let sheet_group = {
        let title = Title::new(format!(
            "sheet {}, material: {}, bbox: [x_min: {:.3}, y_min: {:.3}, x_max: {:.3}, y_max: {:.3}]",
            sheet_layout.index,
            sheet.material.as_deref().unwrap_or("-"),
            bbox.x_min,
            bbox.y_min,
            bbox.x_max,
            bbox.y_max
        ));
        let mut group = Group::new()
            .set("id", format!("sheet_{}", sheet_layout.index))
            .add(data_to_path(
                simple_polygon_data(&sheet.outline),
                &[
                    ("fill", &*theme.sheet_fill.to_string()),
                    ("stroke", "black"),
                    ("stroke-width", &*format!("{}", 2.0 * stroke_width)),
                ],
            ))
            .add(title);
        if options.usable_area {
            group = group.add(data_to_path(
                simple_polygon_data(&sheet.usable),
                &[
                    ("fill", "none"),
                    ("stroke", &*theme.usable_stroke.to_string()),
                    ("stroke-width", &*format!("{}", stroke_width)),
                    ("stroke-dasharray", &*format!("{}", 5.0 * stroke_width)),
                    ("stroke-linecap", "round"),
                    ("stroke-linejoin", "round"),
                ],
            ));
        }
        group
    };

    //order references get a color of their own, in order of first appearance
    let mut order_colors: HashMap<&str, Color> = HashMap::new();
    for part in instance.parts.iter() {
        if let Some(order) = part.order_ref.as_deref() {
            let n = order_colors.len();
            order_colors.entry(order).or_insert_with(|| Color::from_index(n));
        }
    }

    //define every part once, in its centered coordinates
    let parts_group = {
        let mut part_defs = Definitions::new();
        for part in instance.parts.iter() {
            let fill = match (options.color_by_order, part.order_ref.as_deref()) {
                (true, Some(order)) => order_colors[order].blend(theme.part_fill),
                _ => theme.part_fill,
            };
            let mut def = Group::new()
                .set("id", format!("part_{}", part.id))
                .add(data_to_path(
                    simple_polygon_data(&part.outline),
                    &[
                        ("fill", &*fill.to_string()),
                        ("stroke-width", &*format!("{}", stroke_width)),
                        ("fill-rule", "nonzero"),
                        ("stroke", "black"),
                        ("opacity", "0.9"),
                    ],
                ));
            //cut-outs show the sheet underneath
            for (i, hole) in part.holes.iter().enumerate() {
                def = def.add(
                    data_to_path(
                        simple_polygon_data(hole),
                        &[
                            ("fill", &*theme.sheet_fill.to_string()),
                            ("stroke", "black"),
                            ("stroke-width", &*format!("{}", stroke_width)),
                        ],
                    )
                    .add(Title::new(format!("hole #{i}"))),
                );
            }
            if options.nesting_shapes && part.shape != part.outline {
                def = def.add(data_to_path(
                    simple_polygon_data(&part.shape),
                    &[
                        ("fill", "none"),
                        ("stroke", &*fill.change_brightness(0.5).to_string()),
                        ("stroke-width", &*format!("{}", 0.5 * stroke_width)),
                        ("stroke-dasharray", &*format!("{}", 2.0 * stroke_width)),
                    ],
                ));
            }
            part_defs = part_defs.add(def);
        }

        let mut group = Group::new().set("id", "parts").add(part_defs);
        for placement in sheet_layout.placements() {
            let part = instance.part(placement.part_id);
            let title = Title::new(format!(
                "part: {}, order: {}, instance: {}, transf: [{}]",
                part.name,
                part.order_ref.as_deref().unwrap_or("-"),
                placement.instance,
                placement.d_transf
            ));
            group = group.add(
                Use::new()
                    .set("transform", transform_to_svg(&placement.d_transf))
                    .set("xlink:href", format!("#part_{}", part.id))
                    .add(title),
            );
        }
        group
    };

    //flip the y-axis so the sheet's origin is in the bottom left corner
    let flipped = Group::new()
        .set(
            "transform",
            format!("translate(0 {}) scale(1 -1)", bbox.y_min + bbox.y_max),
        )
        .add(sheet_group)
        .add(parts_group);

    Document::new()
        .set("viewBox", vbox)
        .set("xmlns:xlink", "http://www.w3.org/1999/xlink")
        .add(flipped)
}

fn transform_to_svg(dt: &DTransformation) -> String {
    //https://developer.mozilla.org/en-US/docs/Web/SVG/Attribute/transform
    //operations are effectively applied from right to left
    let (tx, ty) = dt.translation();
    let r = dt.rotation_degrees();
    format!("translate({tx} {ty}), rotate({r})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Part, Sheet, SheetAllocator};
    use crate::geometry::geo_enums::RotationSet;
    use crate::geometry::primitives::{Rect, SPolygon};

    #[test]
    fn renders_every_placement() {
        let outline = SPolygon::from(Rect::try_new(0.0, 0.0, 4.0, 2.0).unwrap());
        let part = Part::try_new(0, "p".into(), Some("A".into()), 2, outline, RotationSet::Fixed, 0.0).unwrap();
        let sheet = Sheet::rectangle(None, 10.0, 10.0, 1.0, 0.0).unwrap();
        let instance = Instance::new(vec![part], sheet).unwrap();

        let mut alloc = SheetAllocator::new(&instance, None);
        let s = alloc.open_sheet().unwrap();
        for (i, y) in [2.0, 4.0].into_iter().enumerate() {
            alloc
                .sheet_mut(s)
                .place(instance.part(0), i, DTransformation::from_degrees(0.0, (3.0, y)));
        }
        let layout = alloc.finish();

        let options = SvgDrawOptions {
            color_by_order: true,
            ..SvgDrawOptions::default()
        };
        let svg = layout_to_svg(&layout.sheets[0], &instance, options).to_string();
        assert_eq!(svg.matches("<use").count(), 2);
        assert!(svg.contains("part_0"));
        assert!(svg.contains("sheet_0"));
        assert!(!svg.contains("hole #"));
    }

    #[test]
    fn renders_holes_of_parts() {
        let outline = SPolygon::from(Rect::try_new(0.0, 0.0, 6.0, 6.0).unwrap());
        let hole = SPolygon::from(Rect::try_new(2.0, 2.0, 4.0, 4.0).unwrap());
        let part = Part::try_new(0, "ring".into(), None, 1, outline, RotationSet::Fixed, 0.0)
            .unwrap()
            .with_holes(vec![hole])
            .unwrap();
        let sheet = Sheet::rectangle(None, 10.0, 10.0, 0.0, 0.0).unwrap();
        let instance = Instance::new(vec![part], sheet).unwrap();

        let mut alloc = SheetAllocator::new(&instance, None);
        let s = alloc.open_sheet().unwrap();
        alloc
            .sheet_mut(s)
            .place(instance.part(0), 0, DTransformation::from_degrees(0.0, (3.0, 3.0)));
        let layout = alloc.finish();

        let svg = layout_to_svg(&layout.sheets[0], &instance, SvgDrawOptions::default()).to_string();
        assert_eq!(svg.matches("hole #").count(), 1);
        //the hole is drawn in the part's centered coordinates
        assert!(svg.contains("M-1,-1"), "{svg}");
    }
}
