//! Pointer events delivered by the hosting canvas.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    Down {
        position: Point,
        #[serde(default)]
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
        #[serde(default)]
        button: MouseButton,
    },
}

impl PointerEvent {
    /// Canvas position of the event.
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position, .. } => *position,
        }
    }

    /// Whether the event drives drawing (primary button or a move).
    pub fn is_primary(&self) -> bool {
        match self {
            PointerEvent::Down { button, .. } | PointerEvent::Up { button, .. } => {
                *button == MouseButton::Left
            }
            PointerEvent::Move { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_defaults_to_left() {
        let event: PointerEvent =
            serde_json::from_str(r#"{"kind":"down","position":{"x":1.0,"y":2.0}}"#).unwrap();
        assert_eq!(event.position(), Point::new(1.0, 2.0));
        assert!(event.is_primary());
    }

    #[test]
    fn test_secondary_button_is_not_primary() {
        let event = PointerEvent::Down {
            position: Point::ZERO,
            button: MouseButton::Right,
        };
        assert!(!event.is_primary());
    }
}
