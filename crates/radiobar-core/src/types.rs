//! Core types for Radiobar

use serde::{Deserialize, Serialize};

/// Default main window width in logical pixels
pub const DEFAULT_WINDOW_WIDTH: u32 = 200;

/// Default main window height in logical pixels
pub const DEFAULT_WINDOW_HEIGHT: u32 = 300;

/// Outer bounds of a window as reported by the windowing system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// Last known position and size of the main window.
///
/// Position is absent on first run, which lets the windowing system center
/// the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

impl WindowState {
    /// Position as a pair, if the window has ever been placed
    pub fn position(&self) -> Option<(i32, i32)> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }

    /// Same size, new position
    pub fn moved_to(&self, x: i32, y: i32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..*self
        }
    }
}

impl From<Bounds> for WindowState {
    fn from(bounds: Bounds) -> Self {
        Self {
            x: Some(bounds.x),
            y: Some(bounds.y),
            width: bounds.width,
            height: bounds.height,
        }
    }
}

/// Visibility phase of the main window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowPhase {
    /// Exists but is not on screen
    Hidden,
    /// On screen
    Shown,
    /// Destroyed through an explicit close, terminal
    Destroyed,
}

impl std::fmt::Display for WindowPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowPhase::Hidden => write!(f, "hidden"),
            WindowPhase::Shown => write!(f, "shown"),
            WindowPhase::Destroyed => write!(f, "destroyed"),
        }
    }
}

/// Lifecycle of the whole session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionLifecycle {
    /// Controller built, main window not yet described
    Created,
    /// Main window exists and events are intercepted
    Running,
    /// Close interception detached, waiting for terminate
    Quiesced,
    /// Resources destroyed, process exiting
    Terminated,
}

impl SessionLifecycle {
    /// Check if transition to target state is valid
    pub fn can_transition_to(&self, target: SessionLifecycle) -> bool {
        use SessionLifecycle::*;
        matches!(
            (self, target),
            (Created, Running) |
            // Shutdown may start before the page ever loaded
            (Created, Quiesced) |
            (Running, Quiesced) |
            (Quiesced, Terminated)
        )
    }
}

impl std::fmt::Display for SessionLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionLifecycle::Created => write!(f, "created"),
            SessionLifecycle::Running => write!(f, "running"),
            SessionLifecycle::Quiesced => write!(f, "quiesced"),
            SessionLifecycle::Terminated => write!(f, "terminated"),
        }
    }
}
