//! Pointer event model
//!
//! Unified pointer events consumed by the per-element animation registry.
//! Event types are numeric ids so consumers can route them through their own
//! dispatch tables without matching on an enum they don't own.

use crate::geometry::Vec2;

/// Event type identifier
pub type EventType = u32;

/// Common event types
pub mod event_types {
    use super::EventType;

    pub const POINTER_DOWN: EventType = 1;
    pub const POINTER_UP: EventType = 2;
    pub const POINTER_MOVE: EventType = 3;
    pub const POINTER_ENTER: EventType = 4;
    pub const POINTER_LEAVE: EventType = 5;
    pub const CLICK: EventType = 6;
    /// Drag event (pointer down + move)
    pub const DRAG: EventType = 7;
    /// Drag ended (pointer up after drag); carries release velocity
    pub const DRAG_END: EventType = 8;
}

/// Pointer button involved in a down/up/click event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// A pointer event routed into the animation layer
///
/// `element` is the stable identity of the render element under the pointer,
/// as assigned by the consumer (chart, timeline, ...). `None` means the
/// pointer is over background.
#[derive(Clone, Copy, Debug)]
pub struct PointerEvent {
    pub event_type: EventType,
    /// Identity of the element under the pointer, if any
    pub element: Option<u64>,
    /// Pointer position in the consumer's coordinate space
    pub position: Vec2,
    /// Release velocity in px/s, populated for DRAG_END
    pub velocity: Vec2,
    pub button: PointerButton,
}

impl PointerEvent {
    /// Pointer moved to `position`, over `element` (or background)
    pub fn moved(element: Option<u64>, position: Vec2) -> Self {
        Self {
            event_type: event_types::POINTER_MOVE,
            element,
            position,
            velocity: Vec2::ZERO,
            button: PointerButton::Primary,
        }
    }

    /// Pointer left the consumer's area entirely
    pub fn left() -> Self {
        Self {
            event_type: event_types::POINTER_LEAVE,
            element: None,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            button: PointerButton::Primary,
        }
    }

    /// Click on `element` at `position`
    pub fn clicked(element: u64, position: Vec2) -> Self {
        Self {
            event_type: event_types::CLICK,
            element: Some(element),
            position,
            velocity: Vec2::ZERO,
            button: PointerButton::Primary,
        }
    }

    /// Drag released with the given flick velocity
    pub fn drag_ended(position: Vec2, velocity: Vec2) -> Self {
        Self {
            event_type: event_types::DRAG_END,
            element: None,
            position,
            velocity,
            button: PointerButton::Primary,
        }
    }
}
