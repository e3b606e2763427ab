use egui::{Pos2, Rect, Vec2, vec2};

use crate::stroke::Stroke;

/// Side length of the eraser square, in page units.
pub const ERASER_SIZE: f32 = 10.0;

/// The eraser footprint: a square centred at the erase position plus its two diagonals.
#[derive(Debug, Clone, Copy)]
pub struct EraserSquare {
    rect: Rect,
}

impl EraserSquare {
    pub fn new(center: Pos2, size: f32) -> Self {
        Self {
            rect: Rect::from_center_size(center, vec2(size, size)),
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    fn diagonals(&self) -> [(Pos2, Pos2); 2] {
        [
            (self.rect.left_top(), self.rect.right_bottom()),
            (self.rect.right_top(), self.rect.left_bottom()),
        ]
    }

    /// A stroke is hit if any of its segments crosses a diagonal or has an
    /// endpoint inside the square.
    pub fn hits(&self, stroke: &Stroke) -> bool {
        let diagonals = self.diagonals();
        stroke.points().windows(2).any(|segment| {
            let (a, b) = (segment[0], segment[1]);
            self.rect.contains(a)
                || self.rect.contains(b)
                || diagonals
                    .iter()
                    .any(|(c, d)| segments_intersect(a, b, *c, *d))
        })
    }
}

/// Indices of strokes hit by the eraser, highest index first.
pub fn strokes_hit_by_eraser(strokes: &[Stroke], eraser: &EraserSquare) -> Vec<usize> {
    strokes
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, stroke)| eraser.hits(stroke))
        .map(|(index, _)| index)
        .collect()
}

fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Bounded intersection of segments `ab` and `cd`; parallel segments never intersect.
pub fn segments_intersect(a: Pos2, b: Pos2, c: Pos2, d: Pos2) -> bool {
    let r = b - a;
    let s = d - c;
    let denom = cross(r, s);
    if denom == 0.0 {
        return false;
    }
    let t = cross(c - a, s) / denom;
    let u = cross(c - a, r) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// Even-odd point-in-polygon test. The polygon is implicitly closed.
pub fn polygon_contains(polygon: &[Pos2], point: Pos2) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x = pj.x + (point.y - pj.y) / (pi.y - pj.y) * (pi.x - pj.x);
            if point.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// True only if every point of the stroke lies inside the lasso.
pub fn stroke_inside_polygon(stroke: &Stroke, polygon: &[Pos2]) -> bool {
    stroke
        .points()
        .iter()
        .all(|point| polygon_contains(polygon, *point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Color32, pos2};

    fn stroke(points: &[(f32, f32)]) -> Stroke {
        Stroke::new(
            Color32::BLACK,
            1.0,
            points.iter().map(|(x, y)| pos2(*x, *y)).collect(),
            Vec::new(),
        )
    }

    fn square_lasso() -> Vec<Pos2> {
        vec![
            pos2(0.0, 0.0),
            pos2(100.0, 0.0),
            pos2(100.0, 100.0),
            pos2(0.0, 100.0),
        ]
    }

    #[test]
    fn segment_crossing_diagonal_is_hit() {
        let eraser = EraserSquare::new(pos2(50.0, 50.0), ERASER_SIZE);
        let crossing = stroke(&[(40.0, 50.0), (60.0, 50.0)]);
        assert!(eraser.hits(&crossing));
    }

    #[test]
    fn endpoint_inside_square_is_hit() {
        let eraser = EraserSquare::new(pos2(50.0, 50.0), ERASER_SIZE);
        let ending_inside = stroke(&[(0.0, 0.0), (52.0, 51.0)]);
        assert!(eraser.hits(&ending_inside));
    }

    #[test]
    fn distant_stroke_survives() {
        let eraser = EraserSquare::new(pos2(50.0, 50.0), ERASER_SIZE);
        let far = stroke(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        assert!(!eraser.hits(&far));
    }

    #[test]
    fn single_point_stroke_has_no_segments() {
        let eraser = EraserSquare::new(pos2(0.0, 0.0), ERASER_SIZE);
        assert!(!eraser.hits(&stroke(&[(0.0, 0.0)])));
    }

    #[test]
    fn hits_are_returned_in_descending_order() {
        let eraser = EraserSquare::new(pos2(50.0, 50.0), ERASER_SIZE);
        let strokes = vec![
            stroke(&[(40.0, 50.0), (60.0, 50.0)]),
            stroke(&[(0.0, 0.0), (1.0, 1.0)]),
            stroke(&[(50.0, 40.0), (50.0, 60.0)]),
        ];
        assert_eq!(strokes_hit_by_eraser(&strokes, &eraser), vec![2, 0]);
    }

    #[test]
    fn polygon_even_odd() {
        let lasso = square_lasso();
        assert!(polygon_contains(&lasso, pos2(50.0, 50.0)));
        assert!(!polygon_contains(&lasso, pos2(150.0, 50.0)));
        assert!(!polygon_contains(&lasso[..2], pos2(50.0, 0.0)));
    }

    #[test]
    fn partial_overlap_excludes_stroke() {
        let lasso = square_lasso();
        assert!(stroke_inside_polygon(&stroke(&[(10.0, 10.0), (90.0, 90.0)]), &lasso));
        assert!(!stroke_inside_polygon(&stroke(&[(10.0, 10.0), (110.0, 90.0)]), &lasso));
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        assert!(!segments_intersect(
            pos2(0.0, 0.0),
            pos2(10.0, 0.0),
            pos2(0.0, 1.0),
            pos2(10.0, 1.0)
        ));
        assert!(segments_intersect(
            pos2(0.0, 0.0),
            pos2(10.0, 10.0),
            pos2(0.0, 10.0),
            pos2(10.0, 0.0)
        ));
    }
}
