use crate::dom::NodeId;

use super::timer::{TimerId, TimerPurpose};

/// Everything the page components react to.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Page ready; components set themselves up.
    Load,
    Click { target: NodeId },
    /// Key press, with the focused element if any.
    Key { key: Key, target: Option<NodeId> },
    /// Viewport size changed. The dispatcher applies the new size before
    /// components see the event.
    Resize { width: f64, height: f64 },
    /// Scroll position changed; read it from the viewport.
    Scroll,
    TouchStart { target: NodeId, y: f64 },
    TouchEnd { target: NodeId, y: f64 },
    Timer { id: TimerId, purpose: TimerPurpose },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Space,
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_name(name: &str) -> Key {
        match name {
            "Escape" | "Esc" => Key::Escape,
            "Enter" => Key::Enter,
            " " | "Space" | "Spacebar" => Key::Space,
            _ => Key::Other,
        }
    }

    /// Keys that activate a focused control the way a click does.
    pub fn activates(self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}
