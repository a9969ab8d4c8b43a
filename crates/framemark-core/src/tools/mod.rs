//! Drawing tools and interactive shape construction.

use crate::shapes::{
    ArrowHead, Freehand, Line, Rectangle, SIMPLIFY_TOLERANCE, SerializableColor, Shape,
    ShapeStyle, arrow_segments,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Pen,
    Line,
    Rectangle,
    Arrow,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::Pen,
        ToolKind::Line,
        ToolKind::Rectangle,
        ToolKind::Arrow,
    ];

    /// Whether this tool records a continuous free-draw path.
    pub fn is_free_draw(self) -> bool {
        self == ToolKind::Pen
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Pen => "pen",
            ToolKind::Line => "line",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Arrow => "arrow",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown tool: {s}"))
    }
}

/// Active tool and color, read by the builder on every new stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolState {
    pub active_tool: ToolKind,
    pub active_color: SerializableColor,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            active_tool: ToolKind::default(),
            active_color: SerializableColor::red(),
        }
    }
}

/// Size guards that discard accidental clicks and tiny drags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuilderLimits {
    /// Rectangles must be strictly wider and taller than this.
    pub min_rect_size: f64,
    /// Arrows must be strictly longer than this.
    pub min_arrow_length: f64,
    /// Arrowhead dimensions.
    pub arrow_head: ArrowHead,
}

impl Default for BuilderLimits {
    fn default() -> Self {
        Self {
            min_rect_size: 5.0,
            min_arrow_length: 10.0,
            arrow_head: ArrowHead::default(),
        }
    }
}

/// State of one pointer gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    /// Waiting for pointer-down.
    #[default]
    Idle,
    /// Recording a pen stroke.
    Drawing { points: Vec<Point> },
    /// Dragging out a line, rectangle or arrow.
    Dragging { start: Point, current: Point },
}

/// Turns pointer gestures into shapes for the active tool.
#[derive(Debug, Clone, Default)]
pub struct ShapeBuilder {
    gesture: Gesture,
    tool: ToolKind,
    style: ShapeStyle,
    limits: BuilderLimits,
}

impl ShapeBuilder {
    pub fn new(limits: BuilderLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn limits(&self) -> BuilderLimits {
        self.limits
    }

    /// Check if a gesture is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    /// Start a gesture. Tool and style are fixed for the whole gesture.
    pub fn begin(&mut self, point: Point, tool: ToolKind, style: ShapeStyle) {
        if !point.is_finite() {
            log::debug!("Ignoring gesture start at non-finite point {point:?}");
            return;
        }
        self.tool = tool;
        self.style = style;
        self.gesture = if tool.is_free_draw() {
            Gesture::Drawing {
                points: vec![point],
            }
        } else {
            Gesture::Dragging {
                start: point,
                current: point,
            }
        };
    }

    /// Advance the gesture and return the live preview, if any.
    pub fn update(&mut self, point: Point) -> Option<Shape> {
        if !point.is_finite() {
            return self.preview();
        }
        match &mut self.gesture {
            Gesture::Idle => return None,
            Gesture::Drawing { points } => {
                if points.last() != Some(&point) {
                    points.push(point);
                }
            }
            Gesture::Dragging { current, .. } => *current = point,
        }
        self.preview()
    }

    /// Preview for the gesture in progress.
    pub fn preview(&self) -> Option<Shape> {
        match &self.gesture {
            Gesture::Idle => None,
            Gesture::Drawing { points } => {
                let mut stroke = Freehand::from_points(points.clone());
                stroke.style = self.style.clone();
                Some(Shape::Freehand(stroke))
            }
            Gesture::Dragging { start, current } => {
                let (start, current) = (*start, *current);
                match self.tool {
                    ToolKind::Rectangle => {
                        let mut rect = Rectangle::from_corners(start, current);
                        rect.style = self.style.clone();
                        Some(Shape::Rectangle(rect))
                    }
                    // Arrows preview as their shaft
                    ToolKind::Line | ToolKind::Arrow => Some(Shape::Line(Line::with_style(
                        start,
                        current,
                        self.style.clone(),
                    ))),
                    ToolKind::Pen => None,
                }
            }
        }
    }

    /// Finish the gesture and return the shapes to commit. Degenerate
    /// gestures yield nothing.
    pub fn end(&mut self, point: Point) -> Vec<Shape> {
        if !point.is_finite() {
            log::debug!("Discarding gesture ending at non-finite point {point:?}");
            self.cancel();
            return Vec::new();
        }
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => Vec::new(),
            Gesture::Drawing { mut points } => {
                if points.last() != Some(&point) {
                    points.push(point);
                }
                if points.len() < 2 {
                    return Vec::new();
                }
                let mut stroke = Freehand::from_points(points);
                stroke.simplify(SIMPLIFY_TOLERANCE);
                stroke.style = self.style.clone();
                vec![Shape::Freehand(stroke)]
            }
            Gesture::Dragging { start, .. } => self.finish_drag(start, point),
        }
    }

    /// Abandon the gesture.
    pub fn cancel(&mut self) {
        self.gesture = Gesture::Idle;
    }

    fn finish_drag(&self, start: Point, end: Point) -> Vec<Shape> {
        match self.tool {
            ToolKind::Line => vec![Shape::Line(Line::with_style(
                start,
                end,
                self.style.clone(),
            ))],
            ToolKind::Rectangle => {
                let mut rect = Rectangle::from_corners(start, end);
                if !(rect.width > self.limits.min_rect_size
                    && rect.height > self.limits.min_rect_size)
                {
                    log::debug!("Discarding {}x{} rectangle", rect.width, rect.height);
                    return Vec::new();
                }
                rect.style = self.style.clone();
                vec![Shape::Rectangle(rect)]
            }
            ToolKind::Arrow => {
                let length = start.distance(end);
                if !(length > self.limits.min_arrow_length) {
                    log::debug!("Discarding arrow of length {length}");
                    return Vec::new();
                }
                arrow_segments(start, end, self.limits.arrow_head, &self.style)
                    .into_iter()
                    .map(Shape::Line)
                    .collect()
            }
            ToolKind::Pen => Vec::new(),
        }
    }
}
