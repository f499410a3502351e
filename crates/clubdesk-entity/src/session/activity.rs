//! User-activity signals that keep a session alive.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A user-activity event. Any of these resets the idle timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySignal {
    /// Pointer moved.
    PointerMove,
    /// Pointer button pressed.
    PointerDown,
    /// Key pressed.
    KeyDown,
    /// Touch began.
    TouchStart,
    /// Content scrolled.
    Scroll,
    /// Click.
    Click,
}

impl ActivitySignal {
    /// Every signal the idle timer listens for.
    pub const ALL: [ActivitySignal; 6] = [
        ActivitySignal::PointerMove,
        ActivitySignal::PointerDown,
        ActivitySignal::KeyDown,
        ActivitySignal::TouchStart,
        ActivitySignal::Scroll,
        ActivitySignal::Click,
    ];

    /// Return the signal as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PointerMove => "pointer_move",
            Self::PointerDown => "pointer_down",
            Self::KeyDown => "key_down",
            Self::TouchStart => "touch_start",
            Self::Scroll => "scroll",
            Self::Click => "click",
        }
    }
}

impl fmt::Display for ActivitySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
