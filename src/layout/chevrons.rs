//! Chevron tiling for glissando connectors
//!
//! A connector is drawn as a row of arrow-head polylines pointing along the
//! path. Arm size is fixed in pixels and only the tip positions follow the
//! endpoints, so zooming changes how many chevrons fit, never their shape.

use serde::{Deserialize, Serialize};

/// A point in scene coordinates
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One chevron: two arms meeting at `tip`
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Chevron {
    pub left: Point,
    pub tip: Point,
    pub right: Point,
}

impl Chevron {
    /// SVG `points` attribute, `left tip right`
    pub fn svg_points(&self) -> String {
        format!(
            "{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
            self.left.x, self.left.y, self.tip.x, self.tip.y, self.right.x, self.right.y
        )
    }
}

/// Chevron renderer for straight connectors
pub struct ChevronRenderer;

impl ChevronRenderer {
    /// Tile chevrons from `start` toward `end`
    ///
    /// Chevron `i` has its tip at `start + u * depth * i`, with both arms set
    /// back by `depth` along the path and spread `width / 2` to either side.
    pub fn tile(start: Point, end: Point, depth: f64, width: f64) -> Vec<Chevron> {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let length = (dx * dx + dy * dy).sqrt();

        if !(length > 0.0) || !(depth > 0.0) {
            return Vec::new();
        }

        let (ux, uy) = (dx / length, dy / length);
        // Perpendicular, rotated a quarter turn counterclockwise
        let (px, py) = (-uy, ux);
        let half = width / 2.0;
        let count = (length / depth).floor() as usize;

        (0..count)
            .map(|i| {
                let step = depth * i as f64;
                let tip = Point::new(start.x + ux * step, start.y + uy * step);
                let back = Point::new(tip.x - ux * depth, tip.y - uy * depth);
                Chevron {
                    left: Point::new(back.x + px * half, back.y + py * half),
                    tip,
                    right: Point::new(back.x - px * half, back.y - py * half),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_tiling() {
        let chevrons = ChevronRenderer::tile(Point::new(0.0, 0.0), Point::new(30.0, 0.0), 9.0, 14.0);
        assert_eq!(chevrons.len(), 3);
        assert_eq!(chevrons[0].tip, Point::new(0.0, 0.0));
        assert_eq!(chevrons[2].tip, Point::new(18.0, 0.0));
        assert_eq!(chevrons[1].left, Point::new(0.0, 7.0));
        assert_eq!(chevrons[1].right, Point::new(0.0, -7.0));
    }

    #[test]
    fn test_count_is_floor_of_length_over_depth() {
        let chevrons = ChevronRenderer::tile(Point::new(10.0, 10.0), Point::new(40.0, 50.0), 9.0, 14.0);
        // length 50
        assert_eq!(chevrons.len(), 5);
        for c in &chevrons {
            let arm = ((c.left.x - c.right.x).powi(2) + (c.left.y - c.right.y).powi(2)).sqrt();
            assert!((arm - 14.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_length_has_no_chevrons() {
        let p = Point::new(5.0, 5.0);
        assert!(ChevronRenderer::tile(p, p, 9.0, 14.0).is_empty());
        assert!(ChevronRenderer::tile(p, Point::new(8.0, 5.0), 9.0, 14.0).is_empty());
    }

    #[test]
    fn test_svg_points() {
        let c = Chevron {
            left: Point::new(1.0, 2.0),
            tip: Point::new(3.5, 4.0),
            right: Point::new(1.0, 6.0),
        };
        assert_eq!(c.svg_points(), "1.00,2.00 3.50,4.00 1.00,6.00");
    }
}
