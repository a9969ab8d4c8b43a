//! Arrow geometry.
//!
//! An arrow is stored as three independent line objects: the shaft and two
//! short head segments that fan out backwards from the tip.

use super::{Line, ShapeStyle};
use kurbo::{Point, Vec2};

/// Dimensions of an arrowhead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHead {
    /// Length of each head segment.
    pub length: f64,
    /// Angle between the shaft and each head segment, in radians.
    pub half_angle: f64,
}

impl Default for ArrowHead {
    fn default() -> Self {
        Self {
            length: 15.0,
            half_angle: std::f64::consts::FRAC_PI_6,
        }
    }
}

impl ArrowHead {
    /// Endpoints of the two head segments for a shaft ending at `tip`.
    pub fn barbs(&self, tail: Point, tip: Point) -> [Point; 2] {
        let angle = (tip - tail).atan2();
        let barb = |offset: f64| tip - Vec2::from_angle(angle + offset) * self.length;
        [barb(-self.half_angle), barb(self.half_angle)]
    }
}

/// Build the shaft and both head segments of an arrow.
pub fn arrow_segments(start: Point, end: Point, head: ArrowHead, style: &ShapeStyle) -> [Line; 3] {
    let [left, right] = head.barbs(start, end);
    [
        Line::with_style(start, end, style.clone()),
        Line::with_style(end, left, style.clone()),
        Line::with_style(end, right, style.clone()),
    ]
}
