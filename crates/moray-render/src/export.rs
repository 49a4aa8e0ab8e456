//! Static SVG export with interface labels baked in.
//!
//! Floating overlay elements are not part of the canvas serialization, so
//! export recomputes every label anchor in output pixel space and injects a
//! background rectangle plus centered text per label.

use crate::anchor::{self, AnchorParams, LABEL_ARC_RATIO};
use crate::canvas::{Bounds, Canvas, escape_xml, fmt};
use crate::geometry::Point;
use crate::text::TextMeasurer;
use crate::view::RenderedEdge;
use crate::{Error, Result};
use moray_core::Theme;
use moray_core::command::ExportOptions;
use std::fmt::Write as _;

const LABEL_PAD_X: f64 = 4.0;
const LABEL_PAD_Y: f64 = 2.0;
const LABEL_FONT_SIZE: f64 = 10.0;

/// Saved per-element style values, restored after serialization.
struct StyleSnapshot {
    saved: Vec<(String, String, Option<String>)>,
}

impl StyleSnapshot {
    fn new() -> Self {
        Self { saved: Vec::new() }
    }

    fn set(&mut self, canvas: &mut impl Canvas, element: &str, property: &str, value: &str) {
        self.saved.push((
            element.to_string(),
            property.to_string(),
            canvas.style(element, property),
        ));
        canvas.set_style(element, property, value);
    }

    fn restore(self, canvas: &mut impl Canvas) {
        for (element, property, original) in self.saved.into_iter().rev() {
            match original {
                Some(value) => canvas.set_style(&element, &property, &value),
                None => canvas.remove_style(&element, &property),
            }
        }
    }
}

/// Serializes the current view with the requested style overrides.
///
/// The live view must come out visually unchanged: every mutated style is
/// saved first and restored before any error propagates.
pub fn export_svg<S: Canvas>(
    surface: &mut S,
    edges: &[RenderedEdge],
    node_ids: &[String],
    theme: &Theme,
    measurer: &dyn TextMeasurer,
    options: &ExportOptions,
) -> Result<String> {
    let mut snapshot = StyleSnapshot::new();

    for id in node_ids {
        snapshot.set(surface, id, "border-width", "0");
        if !options.include_labels {
            snapshot.set(surface, id, "label", "");
        }
        if let Some(color) = &options.font_color {
            snapshot.set(surface, id, "color", color);
        }
    }
    let thickness = fmt(options.link_thickness);
    for edge in edges {
        snapshot.set(surface, &edge.resolved.key.element_id(), "width", &thickness);
    }

    let serialized = surface.svg();
    // Restore before propagating any serialization failure.
    snapshot.restore(surface);
    let mut svg = serialized.map_err(Error::from)?;

    let scale = if options.scale > 0.0 { options.scale } else { 1.0 };
    if scale != 1.0 {
        if let Some(bounds) = surface.bounding_box() {
            svg = rescale(&svg, bounds, scale);
        }
    }

    if !options.transparent {
        let color = options
            .background_color
            .as_deref()
            .unwrap_or(&theme.background_color);
        if let Some(tag_end) = svg.find('>') {
            let rect = format!(
                r#"<rect width="100%" height="100%" fill="{}"/>"#,
                escape_xml(color)
            );
            svg.insert_str(tag_end + 1, &rect);
        }
    }

    if options.include_labels {
        if let Some(bounds) = surface.bounding_box() {
            let labels = render_labels(
                surface,
                edges,
                bounds.min_x,
                bounds.min_y,
                theme,
                measurer,
                options,
            );
            if let Some(pos) = svg.rfind("</svg>") {
                svg.insert_str(pos, &labels);
            }
        }
    }

    Ok(svg)
}

/// Rewrites the root dimensions for the requested pixel ratio and wraps the
/// ratio-1 canvas content in a matching scale transform. Injected labels are
/// emitted in output pixels and must land outside the transformed group.
fn rescale(svg: &str, bounds: Bounds, scale: f64) -> String {
    let (Some(tag_end), Some(close)) = (svg.find('>'), svg.rfind("</svg>")) else {
        return svg.to_string();
    };
    let w = fmt(bounds.width().max(1.0) * scale);
    let h = fmt(bounds.height().max(1.0) * scale);

    let mut out = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    out.push('\n');
    let _ = write!(&mut out, r#"<g transform="scale({})">"#, fmt(scale));
    out.push_str(&svg[tag_end + 1..close]);
    out.push_str("</g>\n</svg>\n");
    out
}

fn render_labels<S: Canvas>(
    surface: &S,
    edges: &[RenderedEdge],
    origin_x: f64,
    origin_y: f64,
    theme: &Theme,
    measurer: &dyn TextMeasurer,
    options: &ExportOptions,
) -> String {
    let scale = if options.scale > 0.0 { options.scale } else { 1.0 };
    let font_color = options.font_color.as_deref().unwrap_or(&theme.font_color);
    let font_size = LABEL_FONT_SIZE * scale;

    let mut out = String::new();
    out.push_str(r#"<g class="edge-labels">"#);
    for edge in edges {
        let key = &edge.resolved.key;
        let (Some(source), Some(target)) = (
            surface.node_position(&key.source),
            surface.node_position(&key.target),
        ) else {
            continue;
        };
        let endpoints = [
            (edge.resolved.source_label.as_deref(), true),
            (edge.resolved.target_label.as_deref(), false),
        ];
        for (text, from_source) in endpoints {
            let Some(text) = text else { continue };
            let (near, far) = if from_source {
                (source, target)
            } else {
                (target, source)
            };
            let anchor_point = anchor::label_anchor(
                source,
                target,
                edge.assignment,
                AnchorParams {
                    ratio: LABEL_ARC_RATIO,
                    offset: 0.0,
                    shift: anchor::shift_for(near, far),
                    from_source,
                },
            );
            let px = Point::new(
                (anchor_point.x - origin_x) * scale,
                (anchor_point.y - origin_y) * scale,
            );

            let metrics = measurer.measure(text, font_size);
            let w = metrics.width + LABEL_PAD_X * 2.0;
            let h = metrics.height + LABEL_PAD_Y * 2.0;
            let _ = write!(
                &mut out,
                r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" rx="2" fill="{fill}" stroke="{stroke}"/>"#,
                x = fmt(px.x - w / 2.0),
                y = fmt(px.y - h / 2.0),
                w = fmt(w),
                h = fmt(h),
                fill = escape_xml(&theme.label_background_color),
                stroke = escape_xml(&theme.label_border_color),
            );
            let _ = write!(
                &mut out,
                r#"<text x="{x}" y="{y}" text-anchor="middle" dominant-baseline="central" font-size="{fs}" fill="{fill}">{text}</text>"#,
                x = fmt(px.x),
                y = fmt(px.y),
                fs = fmt(font_size),
                fill = escape_xml(font_color),
                text = escape_xml(text),
            );
        }
    }
    out.push_str("</g>\n");
    out
}
