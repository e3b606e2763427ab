use egui::{Color32, Pos2, Rect, Sense, Shape, Stroke, Vec2, pos2};
use log::warn;

use crate::app::InkApp;
use crate::layout::PageLayout;
use crate::renderer::{self, LASSO_COLOR, StrokeLayer};
use crate::texture_manager::{TextureGenerationError, TextureSlot, pixmap_image};

const CANVAS_BACKGROUND: Color32 = Color32::from_gray(96);
const FULL_UV: Rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));

/// Screen position of a page-space point.
fn to_screen(layout: &PageLayout, viewport: Rect, page: usize, pos: Pos2) -> Option<Pos2> {
    let rect = layout.page_rect(page)?;
    Some(viewport.min + (rect.min.to_vec2() + pos.to_vec2() * layout.zoom()) - layout.scroll())
}

pub fn central_panel(app: &mut InkApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none().fill(CANVAS_BACKGROUND))
        .show(ctx, |ui| {
            let viewport = ui.available_rect_before_wrap();
            app.editor.set_viewport_size(viewport.size());

            let response = ui.allocate_rect(viewport, Sense::click_and_drag());
            if response.hovered() {
                let wheel = ui.input(|i| i.smooth_scroll_delta);
                if wheel != Vec2::ZERO {
                    app.editor.scroll_by(-wheel);
                }
            }

            for event in app.input.process_input(ctx, viewport) {
                app.editor.handle_raw_event(&event);
            }

            let layout = app.editor.layout();
            paint_pages(app, ui, &layout, viewport);
            paint_selection(app, ui, &layout, viewport);
            paint_lasso(app, ui, &layout, viewport);

            if !app.editor.state().is_stable() || app.editor.is_panning() {
                ctx.request_repaint();
            }
        });
}

fn paint_pages(app: &mut InkApp, ui: &egui::Ui, layout: &PageLayout, viewport: Rect) {
    let painter = ui.painter_at(viewport);
    let offset = viewport.min.to_vec2() - layout.scroll();
    let page_count = app.editor.document().page_count();
    app.textures.retain_pages(page_count);

    for index in 0..page_count {
        let Some(rect) = layout.page_rect(index) else {
            continue;
        };
        let screen = rect.translate(offset);
        if !screen.intersects(viewport) {
            continue;
        }
        let cache = app.editor.cache();
        let Some(pixmap) = cache.page(index) else {
            continue;
        };
        let texture = app.textures.get_or_create_texture(
            TextureSlot::Page(index),
            cache.version(index),
            || pixmap_image(pixmap),
            ui.ctx(),
        );
        match texture {
            Ok(id) => {
                painter.image(id, screen, FULL_UV, Color32::WHITE);
            }
            Err(e) => warn!("Page {index} texture: {e}"),
        }
    }
}

fn paint_selection(app: &mut InkApp, ui: &egui::Ui, layout: &PageLayout, viewport: Rect) {
    let Some(selection) = app.editor.selection() else {
        app.textures.invalidate(TextureSlot::SelectionOverlay);
        return;
    };
    let page_index = app.editor.document().clamp_page(selection.page());
    let (Some(page), Some(rect)) = (app.editor.document().page(page_index), layout.page_rect(page_index)) else {
        return;
    };

    let zoom = layout.zoom();
    let texture = app.textures.get_or_create_texture(
        TextureSlot::SelectionOverlay,
        app.overlay_version.get(),
        || {
            let layer = StrokeLayer::strokes(selection.strokes()).with_overlay(selection.polygon());
            renderer::render_overlay(page, layer, zoom)
                .ok_or(TextureGenerationError::GenerationFailed)
                .and_then(|pixmap| pixmap_image(&pixmap))
        },
        ui.ctx(),
    );
    match texture {
        Ok(id) => {
            let screen = rect.translate(viewport.min.to_vec2() - layout.scroll());
            ui.painter_at(viewport).image(id, screen, FULL_UV, Color32::WHITE);
        }
        Err(e) => warn!("Selection overlay texture: {e}"),
    }
}

/// The lasso is still changing every frame, so it is drawn as an egui line.
fn paint_lasso(app: &InkApp, ui: &egui::Ui, layout: &PageLayout, viewport: Rect) {
    let Some((page, lasso)) = app.editor.state().lasso() else {
        return;
    };
    let points: Vec<Pos2> = lasso
        .iter()
        .filter_map(|p| to_screen(layout, viewport, page, *p))
        .collect();
    if points.len() < 2 {
        return;
    }
    ui.painter_at(viewport)
        .add(Shape::closed_line(points, Stroke::new(1.0, LASSO_COLOR)));
}
