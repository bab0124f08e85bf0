//! Drawing: the viewport transform, world-space primitives and the canvas
//! backends they end up on.

pub mod display_list;
pub mod painter;

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

pub use display_list::{DisplayList, DrawCommand};
pub use painter::{Frame, Painter, WorldRect};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Straight RGB with a fractional alpha, like CSS `rgba()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn gray(level: u8, a: f32) -> Self {
        Self::new(level, level, level, a)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub color: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Which point of the text box sits on the given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextAnchor {
    pub h: HAlign,
    pub v: VAlign,
}

/// Background grid density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridMode {
    Off,
    #[default]
    Points,
    Lines,
}

impl GridMode {
    /// Map the numeric density used by the keyboard shortcuts (0, 1, 2).
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(GridMode::Off),
            1 => Some(GridMode::Points),
            2 => Some(GridMode::Lines),
            _ => None,
        }
    }
}

/// A drawing surface in device pixels.
///
/// Angles follow the HTML canvas convention: radians, measured from the
/// positive x axis, growing clockwise on screen because y points down.
pub trait Canvas {
    fn clear(&mut self, width: f64, height: f64, color: Rgba);

    fn line(&mut self, from: Point, to: Point, width: f64, color: Rgba);

    fn rect(&mut self, min: Point, width: f64, height: f64, stroke: Option<Stroke>, fill: Option<Rgba>);

    #[allow(clippy::too_many_arguments)]
    fn arc(
        &mut self,
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
        width: f64,
        color: Rgba,
    );

    fn text(&mut self, text: &str, pos: Point, size: f64, color: Rgba, anchor: TextAnchor);
}

/// Sample a canvas-style arc into a polyline of `segments + 1` points.
pub fn arc_points(
    center: Point,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
    anticlockwise: bool,
    segments: usize,
) -> Vec<Point> {
    let segments = segments.max(1);
    let raw = if anticlockwise {
        start_angle - end_angle
    } else {
        end_angle - start_angle
    };
    let sweep = if raw.abs() >= TAU {
        TAU
    } else {
        raw.rem_euclid(TAU)
    };
    let direction = if anticlockwise { -1.0 } else { 1.0 };

    (0..=segments)
        .map(|i| {
            let angle = start_angle + direction * sweep * i as f64 / segments as f64;
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_clockwise_quarter_arc() {
        let pts = arc_points(Point::new(0.0, 0.0), 10.0, -FRAC_PI_2, 0.0, false, 8);
        assert_eq!(pts.len(), 9);
        assert!(close(pts[0], Point::new(0.0, -10.0)));
        assert!(close(pts[8], Point::new(10.0, 0.0)));
        // Passes through the upper-right quadrant.
        assert!(pts[4].x > 0.0 && pts[4].y < 0.0);
    }

    #[test]
    fn test_anticlockwise_arc_wraps() {
        // -pi/2 anticlockwise to pi is a quarter turn through the upper-left.
        let pts = arc_points(Point::new(0.0, 0.0), 1.0, -FRAC_PI_2, PI, true, 4);
        assert!(close(pts[0], Point::new(0.0, -1.0)));
        assert!(close(pts[4], Point::new(-1.0, 0.0)));
        assert!(pts[2].x < 0.0 && pts[2].y < 0.0);
    }

    #[test]
    fn test_full_circle() {
        let pts = arc_points(Point::new(5.0, 5.0), 2.0, 0.0, 2.0 * PI, false, 4);
        assert!(close(pts[0], pts[4]));
        assert!(close(pts[2], Point::new(3.0, 5.0)));
    }

    #[test]
    fn test_grid_mode_levels() {
        assert_eq!(GridMode::from_level(0), Some(GridMode::Off));
        assert_eq!(GridMode::from_level(1), Some(GridMode::Points));
        assert_eq!(GridMode::from_level(2), Some(GridMode::Lines));
        assert_eq!(GridMode::from_level(3), None);
    }

    #[test]
    fn test_rgba_with_alpha() {
        let c = Rgba::gray(128, 0.2).with_alpha(0.4);
        assert_eq!(c, Rgba::new(128, 128, 128, 0.4));
    }
}
