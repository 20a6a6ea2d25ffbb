//! Bridge message contracts between the window process and the page
//!
//! Process-to-page messages travel as named events with a JSON payload.
//! Page-to-process messages arrive as commands; [`PageRequest`] is their
//! decoded form so the controller can dispatch them in one place.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event name for [`PageMessage::LoadLastStation`]
pub const EVENT_LOAD_LAST_STATION: &str = "load-last-station";
/// Event name for [`PageMessage::PlayLastStation`]
pub const EVENT_PLAY_LAST_STATION: &str = "play-last-station";
/// Event name for [`PageMessage::StartWindowMove`]
pub const EVENT_START_WINDOW_MOVE: &str = "start-window-move";

/// Message sent from the process to the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageMessage {
    /// Display the station as selected, without playing it
    LoadLastStation { url: String },
    /// Start playing the station
    PlayLastStation { url: String },
    /// Arm drag-to-move handling
    StartWindowMove,
}

impl PageMessage {
    /// Event name on the wire
    pub fn event_name(&self) -> &'static str {
        match self {
            PageMessage::LoadLastStation { .. } => EVENT_LOAD_LAST_STATION,
            PageMessage::PlayLastStation { .. } => EVENT_PLAY_LAST_STATION,
            PageMessage::StartWindowMove => EVENT_START_WINDOW_MOVE,
        }
    }

    /// Event payload on the wire
    pub fn payload(&self) -> Value {
        match self {
            PageMessage::LoadLastStation { url } | PageMessage::PlayLastStation { url } => {
                Value::String(url.clone())
            }
            PageMessage::StartWindowMove => Value::Null,
        }
    }
}

/// Message sent from the page to the process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageRequest {
    /// The user picked a station and playback started
    StationChanged { url: String },
    /// Request/response: current window origin
    GetWindowPosition,
    /// Move the window, fire-and-forget
    UpdateWindowPosition { x: i32, y: i32 },
}

/// Window position payload, `{ "x": .., "y": .. }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPosition {
    pub x: i32,
    pub y: i32,
}

/// Entries shared by the tray menu and the window context menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    ToggleVisibility,
    Move,
    Exit,
    About,
}

/// One row of the context menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Item(MenuAction),
    Separator,
}

/// Menu rows in display order
pub const MENU_LAYOUT: [MenuEntry; 5] = [
    MenuEntry::Item(MenuAction::ToggleVisibility),
    MenuEntry::Item(MenuAction::Move),
    MenuEntry::Item(MenuAction::Exit),
    MenuEntry::Separator,
    MenuEntry::Item(MenuAction::About),
];

impl MenuAction {
    /// Menu item id
    pub fn id(&self) -> &'static str {
        match self {
            MenuAction::ToggleVisibility => "toggle",
            MenuAction::Move => "move",
            MenuAction::Exit => "exit",
            MenuAction::About => "about",
        }
    }

    /// Label shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::ToggleVisibility => "Show/Hide",
            MenuAction::Move => "Move",
            MenuAction::Exit => "Exit",
            MenuAction::About => "About",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "toggle" => Some(MenuAction::ToggleVisibility),
            "move" => Some(MenuAction::Move),
            "exit" => Some(MenuAction::Exit),
            "about" => Some(MenuAction::About),
            _ => None,
        }
    }
}
