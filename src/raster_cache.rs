use egui::Rect;
use log::{debug, warn};
use tiny_skia::{Paint, Pixmap, Transform};

use crate::document::Document;
use crate::page::Page;
use crate::renderer::{self, StrokeLayer};
use crate::stroke::Stroke;

/// One bitmap per page, derived from the document at the current zoom.
///
/// The cache never holds state the document does not: dropping it and
/// calling [`RasterCache::rebuild_all`] gives the same pixels.
pub struct RasterCache {
    zoom: f32,
    pages: Vec<Option<Pixmap>>,
    /// Bumped whenever a page bitmap changes, so views can re-upload it.
    versions: Vec<u64>,
    next_version: u64,
}

impl std::fmt::Debug for RasterCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterCache")
            .field("zoom", &self.zoom)
            .field("pages", &self.pages.len())
            .field("versions", &self.versions)
            .finish()
    }
}

impl RasterCache {
    pub fn new(zoom: f32) -> Self {
        Self {
            zoom,
            pages: Vec::new(),
            versions: Vec::new(),
            next_version: 1,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn page(&self, index: usize) -> Option<&Pixmap> {
        self.pages.get(index).and_then(Option::as_ref)
    }

    pub fn version(&self, index: usize) -> u64 {
        self.versions.get(index).copied().unwrap_or(0)
    }

    fn bump(&mut self) -> u64 {
        let version = self.next_version;
        self.next_version += 1;
        version
    }

    fn render(page: &Page, zoom: f32) -> Option<Pixmap> {
        let pixmap = renderer::render_page(page, zoom);
        if pixmap.is_none() {
            warn!("Could not allocate bitmap for {}x{} page at zoom {}", page.width(), page.height(), zoom);
        }
        pixmap
    }

    /// Discards every bitmap and renders all pages at `zoom`.
    pub fn rebuild_all(&mut self, document: &Document, zoom: f32) {
        debug!("Rebuilding raster cache: {} pages at zoom {:.2}", document.page_count(), zoom);
        self.zoom = zoom;
        self.pages = document.pages.iter().map(|page| Self::render(page, zoom)).collect();
        self.versions = (0..self.pages.len()).map(|_| self.bump()).collect();
    }

    /// Re-renders a single page from scratch.
    pub fn rebuild_page(&mut self, document: &Document, index: usize) {
        let Some(page) = document.page(index) else {
            return;
        };
        if index >= self.pages.len() {
            self.rebuild_all(document, self.zoom);
            return;
        }
        self.pages[index] = Self::render(page, self.zoom);
        self.versions[index] = self.bump();
    }

    /// Makes room for a page inserted into the document at `index`.
    pub fn insert_page(&mut self, document: &Document, index: usize) {
        let Some(page) = document.page(index) else {
            return;
        };
        if index > self.pages.len() {
            self.rebuild_all(document, self.zoom);
            return;
        }
        let version = self.bump();
        self.pages.insert(index, Self::render(page, self.zoom));
        self.versions.insert(index, version);
    }

    /// Drops the bitmap of a page removed from the document.
    pub fn remove_page(&mut self, index: usize) {
        if index < self.pages.len() {
            self.pages.remove(index);
            self.versions.remove(index);
        }
    }

    /// Repaints the page-space `rect` of one page: background first, then the
    /// page's strokes that touch it, then `pending` (a stroke still being drawn).
    pub fn update_region(&mut self, document: &Document, index: usize, rect: Rect, pending: Option<&Stroke>) {
        let Some(page) = document.page(index) else {
            return;
        };
        let zoom = self.zoom;
        let Some(Some(pixmap)) = self.pages.get_mut(index) else {
            return;
        };
        let Some(pixels) = renderer::pixel_rect(rect, zoom, pixmap.width(), pixmap.height()) else {
            return;
        };

        let mut background = Paint::default();
        background.set_color(renderer::sk_color(page.background));
        background.anti_alias = false;
        background.blend_mode = tiny_skia::BlendMode::Source;
        pixmap.fill_rect(pixels.to_rect(), &background, Transform::identity(), None);

        let mut target = pixmap.as_mut();
        renderer::paint_layer(&mut target, StrokeLayer::strokes(&page.strokes), zoom, Some(rect));
        if let Some(stroke) = pending {
            renderer::paint_layer(&mut target, StrokeLayer::strokes(std::slice::from_ref(stroke)), zoom, Some(rect));
        }
        self.versions[index] = self.bump();
    }

    /// Page-space dirty rect covering all `strokes`.
    pub fn dirty_rect<'a>(strokes: impl IntoIterator<Item = &'a Stroke>) -> Rect {
        strokes
            .into_iter()
            .fold(Rect::NOTHING, |acc, stroke| acc.union(stroke.bounds()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Color32, pos2};

    fn doc_with_stroke() -> Document {
        let mut page = Page::new(120.0, 80.0, Color32::WHITE);
        page.strokes.push(Stroke::new(
            Color32::BLACK,
            3.0,
            vec![pos2(10.0, 10.0), pos2(100.0, 60.0)],
            vec![1.0, 0.5],
        ));
        Document::with_page(page)
    }

    #[test]
    fn rebuild_creates_one_bitmap_per_page() {
        let mut doc = doc_with_stroke();
        doc.pages.push(Page::new(120.0, 80.0, Color32::WHITE));
        let mut cache = RasterCache::new(1.0);
        cache.rebuild_all(&doc, 2.0);
        assert_eq!(cache.len(), 2);
        let bitmap = cache.page(1).expect("bitmap");
        assert_eq!((bitmap.width(), bitmap.height()), (240, 160));
    }

    #[test]
    fn incremental_update_matches_full_rebuild() {
        let mut doc = doc_with_stroke();
        let mut cache = RasterCache::new(1.0);
        cache.rebuild_all(&doc, 1.0);

        let added = Stroke::new(
            Color32::RED,
            2.0,
            vec![pos2(20.0, 70.0), pos2(60.0, 20.0)],
            vec![1.0, 1.0],
        );
        let rect = added.bounds();
        doc.pages[0].strokes.push(added);
        cache.update_region(&doc, 0, rect, None);

        let mut fresh = RasterCache::new(1.0);
        fresh.rebuild_all(&doc, 1.0);

        let a = cache.page(0).expect("bitmap").data();
        let b = fresh.page(0).expect("bitmap").data();
        let max_diff = a.iter().zip(b).map(|(x, y)| x.abs_diff(*y)).max().unwrap_or(0);
        assert!(max_diff <= 2, "max channel difference {max_diff}");
    }

    #[test]
    fn insert_and_remove_track_document() {
        let mut doc = doc_with_stroke();
        let mut cache = RasterCache::new(1.0);
        cache.rebuild_all(&doc, 1.0);

        doc.pages.insert(0, Page::new(50.0, 50.0, Color32::WHITE));
        cache.insert_page(&doc, 0);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.page(0).expect("bitmap").width(), 50);

        cache.remove_page(0);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.page(0).expect("bitmap").width(), 120);
    }

    #[test]
    fn update_bumps_version() {
        let doc = doc_with_stroke();
        let mut cache = RasterCache::new(1.0);
        cache.rebuild_all(&doc, 1.0);
        let before = cache.version(0);
        cache.update_region(&doc, 0, Rect::from_min_max(pos2(0.0, 0.0), pos2(20.0, 20.0)), None);
        assert!(cache.version(0) > before);
    }
}
