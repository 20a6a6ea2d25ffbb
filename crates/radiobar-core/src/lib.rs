//! Radiobar Core - Session logic for the Radiobar desktop radio player
//!
//! This crate provides everything that does not need a GUI toolkit:
//! - Persistent settings store (window geometry, last station)
//! - Window/session controller with close interception and two-phase shutdown
//! - Bridge message contracts between the window process and the page
//! - Page-side station selector and drag-to-move models
//! - Ad stripper script generation and blocked-domain filter
//! - Application configuration
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Radiobar Core                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │   Settings   │  │   Stations   │  │    Config    │           │
//! │  │    Store     │  │    Table     │  │              │           │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘           │
//! │         │                 │                 │                   │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           │                                     │
//! │                    ┌──────┴──────┐                              │
//! │                    │   Session   │──── Effects ──▶ shell        │
//! │                    │ Controller  │                              │
//! │                    └──────┬──────┘                              │
//! │                           │                                     │
//! │  ┌──────────────┐  ┌──────┴──────┐  ┌──────────────┐            │
//! │  │   Station    │  │   Bridge    │  │  Ad Stripper │            │
//! │  │   Selector   │  │  Messages   │  │  / Blocklist │            │
//! │  └──────────────┘  └─────────────┘  └──────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod types;
pub mod settings;
pub mod stations;
pub mod bridge;
pub mod session;
pub mod selector;
pub mod adblock;
pub mod dialog;
pub mod config;

pub use error::{Error, Result};
pub use types::*;
pub use settings::SettingsStore;
pub use stations::{Station, STATIONS, DEFAULT_STATION_URL};
pub use bridge::{MenuAction, MenuEntry, PageMessage, PageRequest, WindowPosition, MENU_LAYOUT};
pub use session::{CloseDecision, Effect, RequestReply, SessionController, SessionState};
pub use selector::{ClickOutcome, StationSelector, WindowDrag};
pub use adblock::{AdStripper, BlockList};
pub use dialog::{AboutDialogSpec, MainWindowSpec};
pub use config::{AppConfig, LaunchMode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
