use egui::{Color32, Rect, Vec2, pos2};

use crate::stroke::Stroke;

/// Default page width in points (A4 at 72 dpi).
pub const DEFAULT_PAGE_WIDTH: f32 = 595.0;
/// Default page height in points (A4 at 72 dpi).
pub const DEFAULT_PAGE_HEIGHT: f32 = 842.0;

/// A single page: strokes in draw order over a solid background.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub strokes: Vec<Stroke>,
    pub background: Color32,
    width: f32,
    height: f32,
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT, Color32::WHITE)
    }
}

impl Page {
    pub fn new(width: f32, height: f32, background: Color32) -> Self {
        Self {
            strokes: Vec::new(),
            background,
            width,
            height,
        }
    }

    /// An empty page with the same size and background.
    pub fn blank_like(&self) -> Self {
        Self::new(self.width, self.height, self.background)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), self.size())
    }
}
