//! Progress-to-geometry math shared by every surface implementation.
//!
//! Angles follow the 2D canvas convention: `0` points along +x and positive
//! angles turn clockwise on screen because the y axis grows downward.

use std::f64::consts::TAU;

/// A position on the drawing surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Point on the circle of `radius` around `self` at `angle` radians.
    pub fn on_circle(&self, radius: f32, angle: f32) -> Point {
        Point::new(
            self.x + radius * angle.cos(),
            self.y + radius * angle.sin(),
        )
    }
}

/// Center of a `width` x `height` surface.
pub fn center(width: u32, height: u32) -> Point {
    Point::new(width as f32 / 2.0, height as f32 / 2.0)
}

/// Rounds halves toward positive infinity, matching `Math.round` in browsers.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Progress used for drawing: `progress` capped at `max`.
pub fn effective_progress(progress: f64, max: f64) -> f64 {
    progress.min(max)
}

/// Rounded integer percentage of `effective` out of `max`.
pub fn percent(effective: f64, max: f64) -> f64 {
    round_half_up(100.0 * effective / max)
}

/// Angular extent of an arc, starting at `start` and ending at `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub start: f32,
    pub end: f32,
}

impl Sweep {
    /// Sweep covering the whole circle.
    pub fn full() -> Self {
        Self {
            start: 0.0,
            end: TAU as f32,
        }
    }

    /// Sweep for `effective` progress out of `max`, from angle zero.
    ///
    /// Negative progress yields an empty sweep rather than wrapping around.
    pub fn for_progress(effective: f64, max: f64) -> Self {
        let ratio = (effective / max).clamp(0.0, 1.0);
        let ratio = if ratio.is_nan() { 0.0 } else { ratio };
        Self {
            start: 0.0,
            end: (TAU * ratio) as f32,
        }
    }

    pub fn angle(&self) -> f32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.angle() <= f32::EPSILON
    }

    pub fn is_full(&self) -> bool {
        self.angle() >= TAU as f32 - f32::EPSILON
    }
}

/// Radius of the pie wedge on a `width` x `height` surface.
pub fn pie_radius(width: u32, height: u32) -> f32 {
    width.min(height) as f32 / 2.0
}

/// Ring dimensions used by the donut shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingMetrics {
    pub radius: f32,
    pub line_width: f32,
}

impl RingMetrics {
    pub fn donut(width: u32, height: u32) -> Self {
        let side = width.min(height) as f32;
        Self {
            radius: side / 3.0,
            line_width: side / 4.0,
        }
    }
}
