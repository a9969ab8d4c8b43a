//! Scripted review sessions.
//!
//! A script is a JSON list of steps replayed against an [`Annotator`] on a
//! virtual clock, so a session can be reproduced without a video player.

use anyhow::{Context, Result};
use framemark_core::{Annotator, MouseButton, PointerEvent, ToolKind};
use kurbo::Point;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// One host interaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Playback position update.
    Time { seconds: f64 },
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    /// Down, move and up in one step.
    Drag { from: [f64; 2], to: [f64; 2] },
    Tool { tool: ToolKind },
    Color { color: String },
    Undo,
    Redo,
    Clear,
    ForceSave,
    /// Advance the virtual clock, letting debounced saves fire.
    Wait { ms: u64 },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid replay script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Run every step in order. Returns the number of steps applied.
    pub fn replay(&self, annotator: &mut Annotator) -> Result<usize> {
        let mut clock = annotator.now();
        for (index, step) in self.steps.iter().enumerate() {
            log::trace!("Step {index}: {step:?}");
            match step {
                Step::Time { seconds } => {
                    annotator.update_time(*seconds);
                }
                Step::Down { x, y } => annotator.handle_pointer(PointerEvent::Down {
                    position: Point::new(*x, *y),
                    button: MouseButton::Left,
                }),
                Step::Move { x, y } => annotator.handle_pointer(PointerEvent::Move {
                    position: Point::new(*x, *y),
                }),
                Step::Up { x, y } => annotator.handle_pointer(PointerEvent::Up {
                    position: Point::new(*x, *y),
                    button: MouseButton::Left,
                }),
                Step::Drag { from, to } => {
                    let to = Point::new(to[0], to[1]);
                    annotator.pointer_down(Point::new(from[0], from[1]));
                    annotator.pointer_move(to);
                    annotator.pointer_up(to);
                }
                Step::Tool { tool } => annotator.set_tool(*tool),
                Step::Color { color } => annotator
                    .set_color(color)
                    .with_context(|| format!("Step {index}: bad color"))?,
                Step::Undo => {
                    annotator.undo();
                }
                Step::Redo => {
                    annotator.redo();
                }
                Step::Clear => annotator.clear(),
                Step::ForceSave => {
                    annotator.force_save();
                }
                Step::Wait { ms } => {
                    clock += Duration::from_millis(*ms);
                    annotator.tick(clock);
                }
            }
        }
        Ok(self.steps.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framemark_core::{AnnotatorConfig, FrameStore};

    const SCRIPT: &str = r##"{
        "steps": [
            {"op": "tool", "tool": "line"},
            {"op": "color", "color": "#00ff00"},
            {"op": "drag", "from": [10, 10], "to": [100, 100]},
            {"op": "time", "seconds": 1.0},
            {"op": "tool", "tool": "rectangle"},
            {"op": "drag", "from": [20, 20], "to": [80, 70]},
            {"op": "wait", "ms": 150},
            {"op": "time", "seconds": 0.0}
        ]
    }"##;

    #[test]
    fn test_parse_steps() {
        let script = Script::from_json(SCRIPT).unwrap();
        assert_eq!(script.steps.len(), 8);
        assert_eq!(
            script.steps[0],
            Step::Tool {
                tool: ToolKind::Line
            }
        );
        assert_eq!(script.steps[6], Step::Wait { ms: 150 });
    }

    #[test]
    fn test_replay_stores_both_frames() {
        let script = Script::from_json(SCRIPT).unwrap();
        let mut annotator = Annotator::new(FrameStore::new(), AnnotatorConfig::default());

        assert_eq!(script.replay(&mut annotator).unwrap(), 8);
        assert_eq!(annotator.annotated_frames(), vec![0, 30]);
        assert_eq!(annotator.current_frame(), 0);
        assert_eq!(annotator.scene().len(), 1);
    }

    #[test]
    fn test_bad_color_fails_replay() {
        let script = Script::from_json(r#"{"steps": [{"op": "color", "color": "teal"}]}"#).unwrap();
        let mut annotator = Annotator::new(FrameStore::new(), AnnotatorConfig::default());
        assert!(script.replay(&mut annotator).is_err());
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        assert!(Script::from_json(r#"{"steps": [{"op": "erase"}]}"#).is_err());
    }
}
