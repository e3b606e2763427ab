use egui::{Pos2, Rect, Vec2, pos2, vec2};

use crate::document::Document;
use crate::renderer::pixel_size;

/// Vertical gap between pages, in screen pixels (not scaled by zoom).
pub const PAGE_GAP: f32 = 10.0;

/// Where each page bitmap sits on the scrollable canvas.
///
/// Pages are stacked top to bottom, left aligned, separated by [`PAGE_GAP`].
/// Viewport positions are relative to the visible area; canvas positions add
/// the scroll offset.
#[derive(Debug, Clone)]
pub struct PageLayout {
    zoom: f32,
    scroll: Vec2,
    pages: Vec<Rect>,
}

impl PageLayout {
    pub fn new(document: &Document, zoom: f32, scroll: Vec2) -> Self {
        let mut top = 0.0;
        let pages = document
            .pages
            .iter()
            .map(|page| {
                let (width, height) = pixel_size(page, zoom);
                let rect = Rect::from_min_size(pos2(0.0, top), vec2(width as f32, height as f32));
                top += height as f32 + PAGE_GAP;
                rect
            })
            .collect();
        Self { zoom, scroll, pages }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    /// Canvas-space rect of a page bitmap.
    pub fn page_rect(&self, page: usize) -> Option<Rect> {
        self.pages.get(page).copied()
    }

    /// Total size of the canvas: widest page by all pages plus gaps.
    pub fn canvas_size(&self) -> Vec2 {
        let width = self.pages.iter().fold(0.0_f32, |w, r| w.max(r.width()));
        let height = self.pages.last().map_or(0.0, |r| r.max.y);
        vec2(width, height)
    }

    pub fn to_canvas(&self, viewport_pos: Pos2) -> Pos2 {
        viewport_pos + self.scroll
    }

    /// Page under a canvas position; positions past the last page clamp to it.
    pub fn page_at(&self, canvas_pos: Pos2) -> usize {
        self.pages
            .iter()
            .position(|rect| canvas_pos.y < rect.max.y + PAGE_GAP)
            .unwrap_or(self.pages.len().saturating_sub(1))
    }

    /// Maps a canvas position into the page-space coordinates of `page`.
    pub fn to_page(&self, canvas_pos: Pos2, page: usize) -> Pos2 {
        let top = self.pages.get(page).map_or(0.0, |rect| rect.min.y);
        pos2(canvas_pos.x / self.zoom, (canvas_pos.y - top) / self.zoom)
    }

    /// Viewport position to (page, page-space position).
    pub fn locate(&self, viewport_pos: Pos2) -> (usize, Pos2) {
        let canvas = self.to_canvas(viewport_pos);
        let page = self.page_at(canvas);
        (page, self.to_page(canvas, page))
    }

    /// Vertical scroll offset that puts the top of `page` at the top of the viewport.
    pub fn page_top(&self, page: usize) -> Option<f32> {
        self.pages.get(page).map(|rect| rect.min.y)
    }
}
