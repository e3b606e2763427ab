use egui::{Color32, Pos2, Rect, Vec2};

/// Extra pixels around a stroke's bounds so antialiased edges are repainted.
const ANTIALIAS_MARGIN: f32 = 1.0;

/// A finished pen stroke.
///
/// Points and pressures are parallel: `pressures.len() == points.len()` holds
/// for every stroke, missing samples are padded with `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    points: Vec<Pos2>,
    pressures: Vec<f32>,
    pen_width: f32,
    color: Color32,
}

impl Stroke {
    pub fn new(color: Color32, pen_width: f32, points: Vec<Pos2>, mut pressures: Vec<f32>) -> Self {
        pressures.resize(points.len(), 1.0);
        Self {
            points,
            pressures,
            pen_width,
            color,
        }
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn pressures(&self) -> &[f32] {
        &self.pressures
    }

    pub fn pen_width(&self) -> f32 {
        self.pen_width
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    /// Effective width of segment `i` (between point `i` and `i + 1`).
    pub fn segment_width(&self, i: usize) -> f32 {
        0.5 * (self.pressures[i] + self.pressures[i + 1]) * self.pen_width
    }

    /// Widths of all segments, in point order.
    pub fn segment_widths(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.points.len().saturating_sub(1)).map(|i| self.segment_width(i))
    }

    /// Page-space bounds including the widest segment and an antialiasing margin.
    pub fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::NOTHING;
        };
        let widest = self
            .pressures
            .iter()
            .fold(0.0_f32, |acc, p| acc.max(p.abs()))
            * self.pen_width;
        let rect = self
            .points
            .iter()
            .fold(Rect::from_min_max(*first, *first), |rect, p| {
                rect.union(Rect::from_min_max(*p, *p))
            });
        rect.expand(widest / 2.0 + ANTIALIAS_MARGIN)
    }

    pub(crate) fn translate(&mut self, delta: Vec2) {
        for point in &mut self.points {
            *point += delta;
        }
    }

    pub(crate) fn set_color(&mut self, color: Color32) {
        self.color = color;
    }
}

/// A stroke that is still being drawn.
#[derive(Debug, Clone)]
pub struct MutableStroke {
    stroke: Stroke,
}

impl MutableStroke {
    pub fn new(color: Color32, pen_width: f32, start: Pos2, pressure: f32) -> Self {
        Self {
            stroke: Stroke::new(color, pen_width, vec![start], vec![pressure]),
        }
    }

    /// Appends a sample and returns the page-space rect the new segment covers.
    pub fn add_point(&mut self, point: Pos2, pressure: f32) -> Rect {
        let previous = self.stroke.points.last().copied().unwrap_or(point);
        self.stroke.points.push(point);
        self.stroke.pressures.push(pressure);

        let n = self.stroke.points.len();
        let half = if n >= 2 {
            self.stroke.segment_width(n - 2).abs() / 2.0
        } else {
            self.stroke.pen_width / 2.0
        };
        Rect::from_two_pos(previous, point).expand(half + ANTIALIAS_MARGIN)
    }

    pub fn as_stroke(&self) -> &Stroke {
        &self.stroke
    }

    pub fn into_stroke(self) -> Stroke {
        self.stroke
    }
}
