use egui::{Vec2, vec2};
use log::debug;

use super::EditorContext;
use crate::command::Command;
use crate::event::EditorEvent;
use crate::page::Page;

pub const ZOOM_STEP: f32 = 1.2;
pub const MIN_ZOOM: f32 = 0.2;
pub const MAX_ZOOM: f32 = 8.0;

impl EditorContext {
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport
    }

    /// Records the size of the visible canvas area.
    pub fn set_viewport_size(&mut self, size: Vec2) {
        if size != self.viewport {
            self.viewport = size;
            self.set_scroll(self.scroll);
        }
    }

    /// Sets the scroll offset, clamped to the canvas.
    pub fn set_scroll(&mut self, scroll: Vec2) {
        let canvas = self.layout().canvas_size();
        let max = (canvas - self.viewport).max(Vec2::ZERO);
        let clamped = vec2(scroll.x.clamp(0.0, max.x), scroll.y.clamp(0.0, max.y));
        if clamped != self.scroll {
            self.scroll = clamped;
            self.event_bus.emit(EditorEvent::ViewChanged {
                zoom: self.zoom,
                scroll: self.scroll,
            });
        }
    }

    pub fn scroll_by(&mut self, delta: Vec2) {
        self.set_scroll(self.scroll + delta);
    }

    fn apply_zoom(&mut self, zoom: f32) {
        if zoom == self.zoom {
            return;
        }
        let ratio = zoom / self.zoom;
        debug!("Zoom {:.2} -> {:.2}", self.zoom, zoom);
        self.zoom = zoom;
        self.cache.rebuild_all(&self.document, zoom);
        self.set_scroll(self.scroll * ratio);
        self.event_bus.emit(EditorEvent::ViewChanged {
            zoom: self.zoom,
            scroll: self.scroll,
        });
    }

    pub fn zoom_in(&mut self) {
        self.apply_zoom((self.zoom * ZOOM_STEP).min(MAX_ZOOM));
    }

    pub fn zoom_out(&mut self) {
        self.apply_zoom((self.zoom / ZOOM_STEP).max(MIN_ZOOM));
    }

    /// Sets the zoom factor; values outside `[MIN_ZOOM, MAX_ZOOM]` are ignored.
    pub fn set_zoom(&mut self, zoom: f32) {
        if (MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
            self.apply_zoom(zoom);
        }
    }

    /// Scales the current page to the viewport width.
    pub fn zoom_fit_width(&mut self) {
        if self.viewport.x <= 0.0 {
            return;
        }
        let Some(page) = self.document.page(self.current_page()) else {
            return;
        };
        let zoom = (self.viewport.x / page.width()).clamp(MIN_ZOOM, MAX_ZOOM);
        self.apply_zoom(zoom);
    }

    /// The page under the centre of the viewport.
    pub fn current_page(&self) -> usize {
        self.layout().locate((self.viewport / 2.0).to_pos2()).0
    }

    /// Scrolls so the top of `page` is at the top of the viewport. Pages past
    /// the end are ignored; negative pages clamp to the first one.
    pub fn scroll_to_page(&mut self, page: isize) {
        let page = page.max(0) as usize;
        if page >= self.document.page_count() {
            return;
        }
        if let Some(top) = self.layout().page_top(page) {
            self.set_scroll(vec2(self.scroll.x, top));
        }
    }

    pub fn page_first(&mut self) {
        self.scroll_to_page(0);
    }

    pub fn page_last(&mut self) {
        self.scroll_to_page(self.document.page_count() as isize - 1);
    }

    pub fn page_up(&mut self) {
        self.scroll_to_page(self.current_page() as isize - 1);
    }

    /// Scrolls to the next page, appending one when already on the last.
    pub fn page_down(&mut self) {
        let next = self.current_page() + 1;
        if next >= self.document.page_count() {
            self.page_add_end();
        }
        self.scroll_to_page(next as isize);
    }

    fn blank_page(&self) -> Page {
        self.document
            .page(self.current_page())
            .map(Page::blank_like)
            .unwrap_or_else(|| self.settings.page_template())
    }

    fn insert_page(&mut self, index: usize) {
        if !self.accepts_edits() {
            return;
        }
        let page = self.blank_page();
        self.run(Command::AddPage { index, page });
    }

    pub fn page_add_before(&mut self) {
        self.insert_page(self.current_page());
    }

    pub fn page_add_after(&mut self) {
        self.insert_page(self.current_page() + 1);
    }

    pub fn page_add_beginning(&mut self) {
        self.insert_page(0);
    }

    pub fn page_add_end(&mut self) {
        self.insert_page(self.document.page_count());
    }

    /// Removes the current page unless it is the only one.
    pub fn page_remove(&mut self) {
        if !self.accepts_edits() {
            return;
        }
        if let Some(command) = Command::remove_page(&self.document, self.current_page()) {
            self.run(command);
            self.set_scroll(self.scroll);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Settings;

    fn editor() -> EditorContext {
        EditorContext::new(Settings::default())
    }

    #[test]
    fn zoom_steps_are_clamped() {
        let mut ed = editor();
        for _ in 0..40 {
            ed.zoom_in();
        }
        assert_eq!(ed.zoom(), MAX_ZOOM);
        for _ in 0..40 {
            ed.zoom_out();
        }
        assert_eq!(ed.zoom(), MIN_ZOOM);
    }

    #[test]
    fn set_zoom_ignores_out_of_range() {
        let mut ed = editor();
        ed.set_zoom(2.0);
        assert_eq!(ed.zoom(), 2.0);
        ed.set_zoom(100.0);
        assert_eq!(ed.zoom(), 2.0);
        assert_eq!(ed.cache().zoom(), 2.0);
    }

    #[test]
    fn fit_width_uses_viewport() {
        let mut ed = editor();
        ed.set_viewport_size(vec2(1190.0, 600.0));
        ed.zoom_fit_width();
        assert!((ed.zoom() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn page_down_appends_past_last_page() {
        let mut ed = editor();
        ed.set_viewport_size(vec2(600.0, 400.0));
        ed.page_down();
        assert_eq!(ed.document().page_count(), 2);
        assert_eq!(ed.current_page(), 1);
    }

    #[test]
    fn scroll_to_missing_page_is_ignored() {
        let mut ed = editor();
        ed.page_add_end();
        ed.scroll_to_page(1);
        let scroll = ed.scroll();
        ed.scroll_to_page(7);
        assert_eq!(ed.scroll(), scroll);
        ed.scroll_to_page(-3);
        assert_eq!(ed.scroll().y, 0.0);
    }

    #[test]
    fn last_page_cannot_be_removed() {
        let mut ed = editor();
        ed.page_remove();
        assert_eq!(ed.document().page_count(), 1);
        assert!(!ed.can_undo());
    }
}
