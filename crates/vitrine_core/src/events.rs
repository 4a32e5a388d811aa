//! Input events
//!
//! Host-agnostic input delivered to the composition root. Pointer positions
//! are in client (viewport) coordinates, like `MouseEvent.clientX/Y`.

use crate::page::NodeId;
use vitrine_paint::Point;

/// Virtual key codes (platform-agnostic)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const TAB: KeyCode = KeyCode(0x09);
    pub const ENTER: KeyCode = KeyCode(0x0D);
    pub const ESCAPE: KeyCode = KeyCode(0x1B);
    pub const SPACE: KeyCode = KeyCode(0x20);

    pub const UNKNOWN: KeyCode = KeyCode(0);

    /// Keys that activate a focused element like a click does
    pub fn is_activation(self) -> bool {
        self == KeyCode::ENTER || self == KeyCode::SPACE
    }
}

/// An input event forwarded by the host
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to a client position
    PointerMove { position: Point },
    /// Pointer left the document
    PointerLeave,
    /// Primary button click on a node
    Click { target: NodeId },
    /// Key pressed while `target` has focus
    KeyDown { target: NodeId, key: KeyCode },
    /// Form control gained focus
    Focus { target: NodeId },
    /// Form control lost focus
    Blur { target: NodeId },
    /// Document scrolled to a vertical offset
    Scroll { y: f32 },
    /// Viewport resized
    Resize { width: f32, height: f32 },
}
