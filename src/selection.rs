use egui::{Color32, Pos2, Rect, Vec2};

use crate::geometry::hit_testing::polygon_contains;
use crate::stroke::Stroke;

/// Strokes lifted off a page by a lasso.
///
/// The strokes are owned copies; they only return to a page when the
/// selection is released.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    strokes: Vec<Stroke>,
    polygon: Vec<Pos2>,
    page: usize,
    revision: u64,
}

impl Selection {
    pub fn new(page: usize, polygon: Vec<Pos2>, strokes: Vec<Stroke>) -> Self {
        Self {
            strokes,
            polygon,
            page,
            revision: 0,
        }
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn polygon(&self) -> &[Pos2] {
        &self.polygon
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Bumped on every mutation; lets views know when to redraw the overlay.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether `pos` on `page` lies inside the lasso (even-odd rule).
    pub fn hit(&self, page: usize, pos: Pos2) -> bool {
        self.page == page && polygon_contains(&self.polygon, pos)
    }

    /// Page-space bounds of the strokes and the lasso.
    pub fn bounds(&self) -> Rect {
        let strokes = self
            .strokes
            .iter()
            .fold(Rect::NOTHING, |acc, s| acc.union(s.bounds()));
        self.polygon
            .iter()
            .fold(strokes, |acc, p| acc.union(Rect::from_min_max(*p, *p)))
    }

    pub(crate) fn translate(&mut self, delta: Vec2, page: usize) {
        for stroke in &mut self.strokes {
            stroke.translate(delta);
        }
        for point in &mut self.polygon {
            *point += delta;
        }
        self.page = page;
        self.revision += 1;
    }

    pub(crate) fn set_colors(&mut self, colors: impl IntoIterator<Item = Color32>) {
        for (stroke, color) in self.strokes.iter_mut().zip(colors) {
            stroke.set_color(color);
        }
        self.revision += 1;
    }

    pub(crate) fn rehome(&mut self, page: usize) {
        self.page = page;
        self.revision += 1;
    }

    /// Returns to an earlier snapshot of this selection.
    pub(crate) fn restore(&mut self, snapshot: &Selection) {
        self.strokes.clone_from(&snapshot.strokes);
        self.polygon.clone_from(&snapshot.polygon);
        self.page = snapshot.page;
        self.revision += 1;
    }

    pub(crate) fn into_strokes(self) -> Vec<Stroke> {
        self.strokes
    }
}

/// Holds at most one selection snapshot for copy/cut/paste.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    content: Option<Selection>,
}

impl Clipboard {
    pub fn set(&mut self, selection: Selection) {
        self.content = Some(selection);
    }

    pub fn get(&self) -> Option<&Selection> {
        self.content.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }
}
