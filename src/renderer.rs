//! Stroke rasterization shared by the page cache, the selection overlay and export.
//!
//! Everything is drawn in page coordinates through a zoom transform, so a
//! stroke rendered at zoom 2.0 is exactly twice as wide on screen.

use egui::{Color32, Pos2, Rect};
use tiny_skia::{
    FillRule, LineCap, Mask, Paint, PathBuilder, Pixmap, PixmapMut, Stroke as SkStroke, Transform,
};

use crate::page::Page;
use crate::stroke::Stroke;

/// Outline color of the lasso polygon.
pub const LASSO_COLOR: Color32 = Color32::from_rgb(0, 120, 215);
const LASSO_WIDTH: f32 = 1.0;

/// Something to paint: strokes in order, optionally topped by a lasso outline.
#[derive(Debug, Clone, Copy)]
pub struct StrokeLayer<'a> {
    pub strokes: &'a [Stroke],
    pub overlay: Option<&'a [Pos2]>,
}

impl<'a> StrokeLayer<'a> {
    pub fn strokes(strokes: &'a [Stroke]) -> Self {
        Self {
            strokes,
            overlay: None,
        }
    }

    pub fn with_overlay(mut self, polygon: &'a [Pos2]) -> Self {
        self.overlay = Some(polygon);
        self
    }
}

pub(crate) fn sk_color(color: Color32) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

fn paint_for(color: Color32) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(sk_color(color));
    paint.anti_alias = true;
    paint
}

/// Pixel size of a page bitmap at `zoom`.
pub fn pixel_size(page: &Page, zoom: f32) -> (u32, u32) {
    let width = (page.width() * zoom).floor().max(1.0) as u32;
    let height = (page.height() * zoom).floor().max(1.0) as u32;
    (width, height)
}

/// Converts a page-space rect to the covering whole-pixel rect, clipped to the pixmap.
pub(crate) fn pixel_rect(rect: Rect, zoom: f32, width: u32, height: u32) -> Option<tiny_skia::IntRect> {
    if !rect.is_finite() || rect.is_negative() {
        return None;
    }
    let left = (rect.min.x * zoom).floor().max(0.0);
    let top = (rect.min.y * zoom).floor().max(0.0);
    let right = (rect.max.x * zoom).ceil().min(width as f32);
    let bottom = (rect.max.y * zoom).ceil().min(height as f32);
    if right <= left || bottom <= top {
        return None;
    }
    tiny_skia::IntRect::from_ltrb(left as i32, top as i32, right as i32, bottom as i32)
}

/// Paints one stroke as a polyline whose segment widths follow the pressure profile.
pub fn paint_stroke(target: &mut PixmapMut<'_>, stroke: &Stroke, transform: Transform, mask: Option<&Mask>) {
    let paint = paint_for(stroke.color());
    let points = stroke.points();

    if let [only] = points {
        dot(target, *only, stroke.pen_width() * stroke.pressures()[0], &paint, transform, mask);
        return;
    }

    for (i, segment) in points.windows(2).enumerate() {
        let (from, to) = (segment[0], segment[1]);
        let width = stroke.segment_width(i);
        if from == to {
            dot(target, from, width, &paint, transform, mask);
            continue;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(from.x, from.y);
        pb.line_to(to.x, to.y);
        let Some(path) = pb.finish() else {
            continue;
        };
        let sk_stroke = SkStroke {
            width: width.abs(),
            line_cap: LineCap::Round,
            ..SkStroke::default()
        };
        target.stroke_path(&path, &paint, &sk_stroke, transform, mask);
    }
}

fn dot(
    target: &mut PixmapMut<'_>,
    center: Pos2,
    width: f32,
    paint: &Paint<'_>,
    transform: Transform,
    mask: Option<&Mask>,
) {
    let radius = width.abs() / 2.0;
    if radius <= 0.0 {
        return;
    }
    if let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) {
        target.fill_path(&path, paint, FillRule::Winding, transform, mask);
    }
}

fn paint_overlay(target: &mut PixmapMut<'_>, polygon: &[Pos2], zoom: f32, mask: Option<&Mask>) {
    let Some((first, rest)) = polygon.split_first() else {
        return;
    };
    let mut pb = PathBuilder::new();
    pb.move_to(first.x * zoom, first.y * zoom);
    for point in rest {
        pb.line_to(point.x * zoom, point.y * zoom);
    }
    pb.close();
    let Some(path) = pb.finish() else {
        return;
    };
    // Outline stays one screen pixel wide regardless of zoom.
    let sk_stroke = SkStroke {
        width: LASSO_WIDTH,
        ..SkStroke::default()
    };
    target.stroke_path(&path, &paint_for(LASSO_COLOR), &sk_stroke, Transform::identity(), mask);
}

/// Paints a layer at `zoom`. When `clip` (page space) is given, only strokes
/// whose bounds touch it are painted, and only inside it.
pub fn paint_layer(target: &mut PixmapMut<'_>, layer: StrokeLayer<'_>, zoom: f32, clip: Option<Rect>) {
    let transform = Transform::from_scale(zoom, zoom);
    let mask = match clip {
        Some(rect) => match clip_mask(rect, zoom, target.width(), target.height()) {
            Some(mask) => Some(mask),
            None => return,
        },
        None => None,
    };

    for stroke in layer.strokes {
        if let Some(rect) = clip {
            if !stroke.bounds().intersects(rect) {
                continue;
            }
        }
        paint_stroke(target, stroke, transform, mask.as_ref());
    }

    if let Some(polygon) = layer.overlay {
        paint_overlay(target, polygon, zoom, mask.as_ref());
    }
}

fn clip_mask(rect: Rect, zoom: f32, width: u32, height: u32) -> Option<Mask> {
    let pixels = pixel_rect(rect, zoom, width, height)?;
    let mut mask = Mask::new(width, height)?;
    let path = PathBuilder::from_rect(pixels.to_rect());
    mask.fill_path(&path, FillRule::Winding, false, Transform::identity());
    Some(mask)
}

/// Renders a whole page at `zoom` into a fresh bitmap.
pub fn render_page(page: &Page, zoom: f32) -> Option<Pixmap> {
    let (width, height) = pixel_size(page, zoom);
    let mut pixmap = Pixmap::new(width, height)?;
    pixmap.fill(sk_color(page.background));
    paint_layer(&mut pixmap.as_mut(), StrokeLayer::strokes(&page.strokes), zoom, None);
    Some(pixmap)
}

/// Renders strokes and a lasso outline on a transparent bitmap sized like `page`.
pub fn render_overlay(page: &Page, layer: StrokeLayer<'_>, zoom: f32) -> Option<Pixmap> {
    let (width, height) = pixel_size(page, zoom);
    let mut pixmap = Pixmap::new(width, height)?;
    paint_layer(&mut pixmap.as_mut(), layer, zoom, None);
    Some(pixmap)
}
