//! Actions and the action → gesture profiles that drive them.

use log::debug;
use std::fmt;
use std::str::FromStr;

/// Input action a gesture can trigger
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Click,
    DoubleClick,
    Drag,
    ScrollUp,
    ScrollDown,
    /// Cursor follows the hand centroid; needs no gesture
    MouseMove,
    /// An action name with no handler
    Unknown(String),
}

/// Temporal behaviour of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Fires once on the rising edge, then cools down
    OneShot,
    /// Accumulates every iteration the gesture holds
    Continuous,
    /// Pointer follow, driven by the hand position
    Cursor,
    /// Never dispatched
    Inert,
}

impl Action {
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Click | Self::DoubleClick | Self::Drag => ActionKind::OneShot,
            Self::ScrollUp | Self::ScrollDown => ActionKind::Continuous,
            Self::MouseMove => ActionKind::Cursor,
            Self::Unknown(_) => ActionKind::Inert,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Click => "click",
            Self::DoubleClick => "double_click",
            Self::Drag => "drag",
            Self::ScrollUp => "scroll_up",
            Self::ScrollDown => "scroll_down",
            Self::MouseMove => "mouse_move",
            Self::Unknown(name) => name,
        }
    }
}

impl From<&str> for Action {
    fn from(s: &str) -> Self {
        match s {
            "click" => Self::Click,
            "double_click" => Self::DoubleClick,
            "drag" => Self::Drag,
            "scroll_up" => Self::ScrollUp,
            "scroll_down" => Self::ScrollDown,
            "mouse_move" => Self::MouseMove,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl FromStr for Action {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One action bound to a gesture name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub action: Action,
    pub gesture: String,
}

/// Ordered action → gesture mapping selected at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    follow_cursor: bool,
    bindings: Vec<Binding>,
}

impl Profile {
    /// Build a profile from `(action, gesture)` pairs in order
    ///
    /// `mouse_move` turns on cursor follow whatever its gesture; a repeated
    /// action keeps its first binding.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut profile = Self::default();
        for (action, gesture) in pairs {
            let action = Action::from(action);
            match action.kind() {
                ActionKind::Cursor => profile.follow_cursor = true,
                ActionKind::Inert => debug!("No handler for action '{action}', binding ignored"),
                ActionKind::OneShot | ActionKind::Continuous => {
                    if profile.bindings.iter().any(|b| b.action == action) {
                        debug!("Action '{action}' bound twice, keeping the first gesture");
                        continue;
                    }
                    profile.bindings.push(Binding {
                        action,
                        gesture: gesture.to_string(),
                    });
                }
            }
        }
        profile
    }

    /// Stock profile for a mode name (`default`, `touch`, `scroll`)
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        let pairs: &[(&str, &str)] = match name {
            "default" => &[
                ("mouse_move", ""),
                ("scroll_down", "thumb_middle_ring_touch"),
                ("scroll_up", "fist_index_up"),
            ],
            "touch" => &[
                ("mouse_move", ""),
                ("click", "thumb_index_touch"),
                ("double_click", "thumb_middle_touch"),
                ("drag", "thumb_ring_touch"),
            ],
            "scroll" => &[
                ("scroll_down", "thumb_middle_ring_touch"),
                ("scroll_up", "fist_index_up"),
            ],
            _ => return None,
        };
        Some(Self::from_pairs(pairs.iter().copied()))
    }

    #[must_use]
    pub const fn follows_cursor(&self) -> bool {
        self.follow_cursor
    }

    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Gesture bound to an action
    #[must_use]
    pub fn gesture_for(&self, action: &Action) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| &b.action == action)
            .map(|b| b.gesture.as_str())
    }
}
