//! Glyph outline paths and curve flattening
//!
//! Outlines are stored in font units with Y pointing up. They are replayed
//! into a `lyon` path in scene units, and flattening turns that path into
//! closed polylines ("contours") with a fixed number of steps per curve.

use crate::foundation::math::Vec2;
use lyon_geom::{CubicBezierSegment, QuadraticBezierSegment};
use lyon_path::math::Point;
use lyon_path::{Path, PathEvent};

/// A single outline drawing command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    /// Start a new contour
    MoveTo(Vec2),
    /// Straight segment to a point
    LineTo(Vec2),
    /// Quadratic Bézier segment
    QuadTo {
        /// Control point
        ctrl: Vec2,
        /// End point
        to: Vec2,
    },
    /// Cubic Bézier segment
    CubicTo {
        /// First control point
        ctrl1: Vec2,
        /// Second control point
        ctrl2: Vec2,
        /// End point
        to: Vec2,
    },
}

/// Outline and metrics of one character
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Glyph {
    /// Horizontal advance in font units
    pub advance: f32,
    /// Outline commands in font units
    pub commands: Vec<PathCommand>,
}

/// A closed polyline; the closing edge from last to first point is implicit
pub type Contour = Vec<Vec2>;

fn point(p: Vec2) -> Point {
    Point::new(p.x, p.y)
}

fn vec2(p: Point) -> Vec2 {
    Vec2::new(p.x, p.y)
}

/// Build a `lyon` path from outline commands
///
/// Every point is mapped through `p * scale + offset`. Each `MoveTo` closes
/// the contour before it; drawing commands before the first `MoveTo` start a
/// contour at their own start point.
pub fn build_path(commands: &[PathCommand], scale: f32, offset: Vec2) -> Path {
    let map = |p: Vec2| point(p * scale + offset);
    let mut builder = Path::builder();
    let mut open = false;
    let mut pen = Vec2::zeros();

    for command in commands {
        if let PathCommand::MoveTo(p) = *command {
            if open {
                builder.end(true);
            }
            builder.begin(map(p));
            open = true;
            pen = p;
            continue;
        }
        if !open {
            builder.begin(map(pen));
            open = true;
        }
        match *command {
            PathCommand::LineTo(to) => {
                builder.line_to(map(to));
                pen = to;
            }
            PathCommand::QuadTo { ctrl, to } => {
                builder.quadratic_bezier_to(map(ctrl), map(to));
                pen = to;
            }
            PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                builder.cubic_bezier_to(map(ctrl1), map(ctrl2), map(to));
                pen = to;
            }
            PathCommand::MoveTo(_) => {}
        }
    }
    if open {
        builder.end(true);
    }
    builder.build()
}

/// Flatten a path into contours, splitting every curve into `curve_segments` pieces
///
/// Lines stay single segments. Repeated points and a closing point equal to
/// the first are dropped, and contours enclosing no area are discarded.
pub fn flatten_path(path: &Path, curve_segments: u32) -> Vec<Contour> {
    let segments = curve_segments.max(1);
    let steps = || (1..=segments).map(move |i| i as f32 / segments as f32);

    let mut contours = Vec::new();
    let mut current: Contour = Vec::new();
    for event in path.iter() {
        match event {
            PathEvent::Begin { at } => push_point(&mut current, vec2(at)),
            PathEvent::Line { to, .. } => push_point(&mut current, vec2(to)),
            PathEvent::Quadratic { from, ctrl, to } => {
                let curve = QuadraticBezierSegment { from, ctrl, to };
                for t in steps() {
                    push_point(&mut current, vec2(curve.sample(t)));
                }
            }
            PathEvent::Cubic { from, ctrl1, ctrl2, to } => {
                let curve = CubicBezierSegment { from, ctrl1, ctrl2, to };
                for t in steps() {
                    push_point(&mut current, vec2(curve.sample(t)));
                }
            }
            PathEvent::End { .. } => finish_contour(&mut contours, std::mem::take(&mut current)),
        }
    }
    finish_contour(&mut contours, current);
    contours
}

/// Flatten a glyph's outline into contours in scene units
pub fn flatten(commands: &[PathCommand], scale: f32, offset: Vec2, curve_segments: u32) -> Vec<Contour> {
    flatten_path(&build_path(commands, scale, offset), curve_segments)
}

fn push_point(contour: &mut Contour, p: Vec2) {
    if contour.last().map_or(true, |last| !same_point(*last, p)) {
        contour.push(p);
    }
}

fn finish_contour(contours: &mut Vec<Contour>, mut contour: Contour) {
    if contour.len() > 1 && same_point(contour[0], contour[contour.len() - 1]) {
        contour.pop();
    }
    if contour.len() >= 3 && signed_area(&contour).abs() > f32::EPSILON {
        contours.push(contour);
    }
}

/// True when two points coincide within a small tolerance
pub fn same_point(a: Vec2, b: Vec2) -> bool {
    (a - b).norm_squared() <= 1e-12
}

/// Shoelace area: positive for counter-clockwise contours (Y up)
pub fn signed_area(contour: &[Vec2]) -> f32 {
    let n = contour.len();
    let mut area = 0.0;
    for i in 0..n {
        let p = contour[i];
        let q = contour[(i + 1) % n];
        area += p.x * q.y - q.x * p.y;
    }
    area * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(min: f32, max: f32, ccw: bool) -> Vec<PathCommand> {
        let mut pts = vec![
            Vec2::new(min, min),
            Vec2::new(max, min),
            Vec2::new(max, max),
            Vec2::new(min, max),
        ];
        if !ccw {
            pts.reverse();
        }
        let mut cmds = vec![PathCommand::MoveTo(pts[0])];
        cmds.extend(pts[1..].iter().map(|p| PathCommand::LineTo(*p)));
        cmds.push(PathCommand::LineTo(pts[0]));
        cmds
    }

    #[test]
    fn test_flatten_drops_closing_point() {
        let contours = flatten(&square(0.0, 1.0, true), 1.0, Vec2::zeros(), 12);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 4);
    }

    #[test]
    fn test_flatten_curve_segments() {
        let cmds = vec![
            PathCommand::MoveTo(Vec2::new(0.0, 0.0)),
            PathCommand::QuadTo { ctrl: Vec2::new(1.0, 2.0), to: Vec2::new(2.0, 0.0) },
        ];
        let contours = flatten(&cmds, 1.0, Vec2::zeros(), 25);
        assert_eq!(contours[0].len(), 26);
        assert_relative_eq!(contours[0][25], Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_flatten_scale_and_offset() {
        let contours = flatten(&square(0.0, 1000.0, true), 0.001, Vec2::new(5.0, 0.0), 1);
        assert_relative_eq!(contours[0][2], Vec2::new(6.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_each_move_starts_a_contour() {
        let mut cmds = square(0.0, 10.0, true);
        cmds.extend(square(3.0, 6.0, false));
        let contours = flatten(&cmds, 1.0, Vec2::zeros(), 1);
        assert_eq!(contours.len(), 2);
        assert_relative_eq!(signed_area(&contours[0]), 100.0);
        assert_relative_eq!(signed_area(&contours[1]), -9.0);
    }

    #[test]
    fn test_cubic_flattening_follows_the_curve() {
        // Quarter circle approximation from (1, 0) to (0, 1)
        let k = 0.552_284_8;
        let cmds = vec![
            PathCommand::MoveTo(Vec2::new(0.0, 0.0)),
            PathCommand::LineTo(Vec2::new(1.0, 0.0)),
            PathCommand::CubicTo { ctrl1: Vec2::new(1.0, k), ctrl2: Vec2::new(k, 1.0), to: Vec2::new(0.0, 1.0) },
        ];
        let contours = flatten(&cmds, 1.0, Vec2::zeros(), 25);
        assert_eq!(contours[0].len(), 27);
        for p in &contours[0][2..] {
            assert_relative_eq!(p.norm(), 1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_path_without_leading_move() {
        let cmds = vec![
            PathCommand::LineTo(Vec2::new(1.0, 0.0)),
            PathCommand::LineTo(Vec2::new(1.0, 1.0)),
        ];
        let contours = flatten(&cmds, 1.0, Vec2::zeros(), 1);
        assert_eq!(contours, vec![vec![Vec2::zeros(), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0)]]);
    }

    #[test]
    fn test_degenerate_contours_are_dropped() {
        let cmds = vec![
            PathCommand::MoveTo(Vec2::new(0.0, 0.0)),
            PathCommand::LineTo(Vec2::new(1.0, 0.0)),
            PathCommand::LineTo(Vec2::new(2.0, 0.0)),
        ];
        assert!(flatten(&cmds, 1.0, Vec2::zeros(), 4).is_empty());
    }
}
