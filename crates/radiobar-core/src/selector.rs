//! Page-side interaction models
//!
//! [`StationSelector`] is the decision table behind the row of station
//! buttons and the single audio element; [`WindowDrag`] is the
//! drag-to-move sequence of the frameless window. The bundled page script
//! follows both exactly.

use crate::{
    bridge::{PageMessage, PageRequest, WindowPosition},
    stations, Error, Result,
};
use tracing::{debug, warn};

/// Audio element state as seen by the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// Nothing playing, or the last attempt failed
    Stopped,
    /// `play()` called, promise not settled
    Starting,
    Playing,
    Paused,
}

/// What the page must do with the audio element after a click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Set the source to `url`, load it and call `play()`
    Switch { url: String },
    /// Call `pause()`
    Pause,
    /// Call `play()` on the current source without reloading
    Resume,
    /// The same station is still connecting
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptKind {
    Switch,
    Resume,
}

/// One `play()` call; only the latest ticket may settle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Attempt {
    kind: AttemptKind,
    ticket: u64,
}

/// Station buttons driving one audio element
#[derive(Debug, Clone)]
pub struct StationSelector {
    /// Current source of the audio element
    source: Option<String>,
    playback: Playback,
    /// Highlighted button
    active: Option<&'static str>,
    attempt: Option<Attempt>,
    next_ticket: u64,
}

impl Default for StationSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl StationSelector {
    pub fn new() -> Self {
        Self {
            source: None,
            playback: Playback::Stopped,
            active: None,
            attempt: None,
            next_ticket: 0,
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    /// Id of the highlighted button
    pub fn active(&self) -> Option<&'static str> {
        self.active
    }

    /// Ticket of the `play()` call in flight
    pub fn pending_ticket(&self) -> Option<u64> {
        self.attempt.map(|a| a.ticket)
    }

    fn begin(&mut self, kind: AttemptKind) {
        self.next_ticket += 1;
        self.attempt = Some(Attempt {
            kind,
            ticket: self.next_ticket,
        });
        self.playback = Playback::Starting;
    }

    /// Take the attempt if `ticket` is still the one in flight
    fn settle(&mut self, ticket: u64) -> Option<AttemptKind> {
        match self.attempt {
            Some(attempt) if attempt.ticket == ticket => {
                self.attempt = None;
                Some(attempt.kind)
            }
            _ => {
                debug!(ticket, "Dropping superseded playback attempt");
                None
            }
        }
    }

    /// Button click by station id
    pub fn click(&mut self, station_id: &str) -> Result<ClickOutcome> {
        let station =
            stations::by_id(station_id).ok_or_else(|| Error::UnknownStation(station_id.to_string()))?;
        Ok(self.select(station.url))
    }

    fn select(&mut self, url: &str) -> ClickOutcome {
        let same_source = self.source.as_deref() == Some(url);

        let outcome = match (same_source, self.playback) {
            (true, Playback::Starting) => ClickOutcome::Ignored,
            (true, Playback::Playing) => {
                self.playback = Playback::Paused;
                ClickOutcome::Pause
            }
            (true, Playback::Paused) => {
                self.begin(AttemptKind::Resume);
                ClickOutcome::Resume
            }
            // New station (superseding any attempt in flight), or a retry
            // after a failed start
            (false, _) | (true, Playback::Stopped) => {
                self.source = Some(url.to_string());
                self.begin(AttemptKind::Switch);
                ClickOutcome::Switch {
                    url: url.to_string(),
                }
            }
        };

        debug!(url, outcome = ?outcome, "Station selected");
        outcome
    }

    /// The `play()` promise for `ticket` resolved. Returns the message to
    /// send to the process, which is only produced for a station switch.
    pub fn playback_started(&mut self, ticket: u64) -> Option<PageRequest> {
        let kind = self.settle(ticket)?;
        self.playback = Playback::Playing;

        match kind {
            AttemptKind::Switch => {
                let url = self.source.clone()?;
                self.active = stations::by_url(&url).map(|s| s.id);
                Some(PageRequest::StationChanged { url })
            }
            AttemptKind::Resume => None,
        }
    }

    /// The `play()` promise for `ticket` rejected. The highlighted button is
    /// left alone.
    pub fn playback_failed(&mut self, ticket: u64, reason: &str) {
        if self.settle(ticket).is_some() {
            warn!(source = ?self.source, reason, "Playback failed to start");
            self.playback = Playback::Stopped;
        }
    }

    /// Apply a message from the process
    pub fn on_message(&mut self, msg: &PageMessage) -> Option<ClickOutcome> {
        match msg {
            PageMessage::LoadLastStation { url } => {
                if let Some(station) = stations::by_url(url) {
                    self.active = Some(station.id);
                }
                None
            }
            PageMessage::PlayLastStation { url } => {
                stations::by_url(url)?;
                let already_playing = self.source.as_deref() == Some(url.as_str())
                    && matches!(self.playback, Playback::Playing | Playback::Starting);
                if already_playing {
                    None
                } else {
                    Some(self.select(url))
                }
            }
            PageMessage::StartWindowMove => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragPhase {
    Idle,
    Armed,
    Dragging {
        origin: (i32, i32),
        pointer_start: (i32, i32),
        current: (i32, i32),
    },
}

/// Drag-to-move for a window without a native title bar.
///
/// Armed by `startWindowMove`; the next pointer-down seeds the origin from
/// `getWindowPosition`, each pointer-move yields the new window position, and
/// pointer-up ends the drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDrag {
    phase: DragPhase,
}

impl Default for WindowDrag {
    fn default() -> Self {
        Self {
            phase: DragPhase::Idle,
        }
    }
}

impl WindowDrag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self) {
        if self.phase == DragPhase::Idle {
            self.phase = DragPhase::Armed;
        }
    }

    pub fn is_armed(&self) -> bool {
        self.phase == DragPhase::Armed
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    /// Pointer pressed at screen position `pointer` while the window sits at
    /// `window_origin`. Returns false when the drag is not armed.
    pub fn pointer_down(&mut self, pointer: (i32, i32), window_origin: WindowPosition) -> bool {
        if self.phase != DragPhase::Armed {
            return false;
        }
        let origin = (window_origin.x, window_origin.y);
        self.phase = DragPhase::Dragging {
            origin,
            pointer_start: pointer,
            current: origin,
        };
        true
    }

    /// New window position for the pointer at `pointer`
    pub fn pointer_move(&mut self, pointer: (i32, i32)) -> Option<WindowPosition> {
        let DragPhase::Dragging {
            origin,
            pointer_start,
            ..
        } = self.phase
        else {
            return None;
        };
        let current = (
            origin.0 + (pointer.0 - pointer_start.0),
            origin.1 + (pointer.1 - pointer_start.1),
        );
        self.phase = DragPhase::Dragging {
            origin,
            pointer_start,
            current,
        };
        Some(WindowPosition {
            x: current.0,
            y: current.1,
        })
    }

    /// Ends the drag, returning the final position if one was in progress
    pub fn pointer_up(&mut self) -> Option<WindowPosition> {
        let phase = std::mem::replace(&mut self.phase, DragPhase::Idle);
        match phase {
            DragPhase::Dragging { current, .. } => Some(WindowPosition {
                x: current.0,
                y: current.1,
            }),
            _ => None,
        }
    }

    /// Disarm without moving
    pub fn cancel(&mut self) {
        self.phase = DragPhase::Idle;
    }
}
