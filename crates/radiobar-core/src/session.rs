//! Window/session controller - owns the main window lifecycle
//!
//! Coordinates:
//! - Geometry persistence on move, resize and close
//! - Show/hide with close interception ("minimize to tray")
//! - Focus-loss hiding gated by the About dialog
//! - Last station restore and the one-time automatic resume
//! - Two-phase shutdown: quiesce, then terminate
//!
//! The controller never touches GUI objects. Every operation returns the
//! [`Effect`]s the shell must apply, in order, once it has released the
//! controller.

use crate::{
    bridge::{MenuAction, PageMessage, PageRequest, WindowPosition},
    config::LaunchMode,
    dialog::{AboutDialogSpec, MainWindowSpec},
    settings::{SettingsStore, WINDOW_STATE_KEY},
    stations::{self, DEFAULT_STATION_URL},
    types::*,
    Error, Result,
};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Instruction for the shell
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ShowMain,
    HideMain,
    FocusMain,
    SetMainPosition { x: i32, y: i32 },
    /// Accept or refuse input on the main window while About is up
    SetMainEnabled(bool),
    SendToPage(PageMessage),
    OpenAbout(AboutDialogSpec),
    FocusAbout,
    CloseAbout,
    DestroyMain,
    Exit { code: i32 },
}

/// Whether the shell should let a close gesture through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Cancel the default close
    Prevent,
    /// Let the window close
    Allow,
}

/// Reply to a page request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestReply {
    /// Fire-and-forget request, nothing to return
    None,
    Position(WindowPosition),
}

/// All mutable session state, owned by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub lifecycle: SessionLifecycle,
    pub window: WindowPhase,
    /// About dialog open
    pub modal_open: bool,
    /// No station selected yet this session
    pub first_action_pending: bool,
    /// Close gestures are turned into hide
    pub close_intercept: bool,
    /// First page load already handled
    pub page_loaded: bool,
    /// Last known geometry, mirrors what was persisted
    pub geometry: WindowState,
    pub launch: LaunchMode,
}

impl SessionState {
    fn new(launch: LaunchMode) -> Self {
        Self {
            lifecycle: SessionLifecycle::Created,
            window: WindowPhase::Hidden,
            modal_open: false,
            first_action_pending: true,
            close_intercept: false,
            page_loaded: false,
            geometry: WindowState::default(),
            launch,
        }
    }
}

/// Controller for the single main window and its About dialog
#[derive(Debug)]
pub struct SessionController {
    state: SessionState,
    store: SettingsStore,
    page_url: Option<Url>,
}

impl SessionController {
    pub fn new(store: SettingsStore, launch: LaunchMode) -> Self {
        Self {
            state: SessionState::new(launch),
            store,
            page_url: None,
        }
    }

    /// Load a remote page instead of the bundled UI
    pub fn with_page_url(mut self, url: Option<Url>) -> Self {
        self.page_url = url;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn is_visible(&self) -> bool {
        self.state.window == WindowPhase::Shown
    }

    fn is_running(&self) -> bool {
        self.state.lifecycle == SessionLifecycle::Running
    }

    fn transition(&mut self, to: SessionLifecycle) -> Result<()> {
        let from = self.state.lifecycle;
        if !from.can_transition_to(to) {
            return Err(Error::InvalidLifecycleTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.state.lifecycle = to;
        info!(%from, %to, "Session lifecycle transition");
        Ok(())
    }

    /// Read persisted state and describe the main window to create.
    ///
    /// The window starts hidden; it is shown after the first page load.
    #[instrument(skip(self))]
    pub fn initialize(&mut self) -> Result<MainWindowSpec> {
        self.transition(SessionLifecycle::Running)?;

        let restored = self.store.get::<WindowState>(WINDOW_STATE_KEY).is_some();
        self.state.geometry = self.store.window_state();
        self.state.window = WindowPhase::Hidden;
        self.state.close_intercept = true;

        info!(
            restored,
            geometry = ?self.state.geometry,
            last_station = %self.last_station(),
            "Session initialized"
        );

        Ok(MainWindowSpec::new(
            self.state.geometry,
            restored,
            self.page_url.clone(),
        ))
    }

    /// Station to display at startup, falling back to the default
    pub fn last_station(&self) -> String {
        self.stored_station()
            .unwrap_or_else(|| DEFAULT_STATION_URL.to_string())
    }

    /// Persisted station, ignoring anything outside the station table
    fn stored_station(&self) -> Option<String> {
        self.store.last_station().filter(|url| {
            let known = stations::is_known(url);
            if !known {
                warn!(url = %url, "Ignoring unknown stored station");
            }
            known
        })
    }

    /// First page load completion: display the last station. Later loads
    /// (reloads, in-page navigation) are ignored.
    pub fn on_page_loaded(&mut self) -> Vec<Effect> {
        if !self.is_running() || self.state.page_loaded {
            return Vec::new();
        }
        self.state.page_loaded = true;

        let mut effects = vec![Effect::SendToPage(PageMessage::LoadLastStation {
            url: self.last_station(),
        })];
        if self.state.launch == LaunchMode::Normal {
            effects.extend(self.show());
        }
        effects
    }

    fn show(&mut self) -> Vec<Effect> {
        self.state.window = WindowPhase::Shown;
        vec![Effect::ShowMain, Effect::FocusMain]
    }

    fn hide(&mut self) -> Vec<Effect> {
        self.state.window = WindowPhase::Hidden;
        vec![Effect::HideMain]
    }

    /// Hide when shown; otherwise show and resume the last station
    pub fn toggle_visibility(&mut self) -> Vec<Effect> {
        if !self.is_running() {
            return Vec::new();
        }
        if self.is_visible() {
            debug!("Hiding main window");
            let mut effects = self.dismiss_about();
            effects.extend(self.hide());
            effects
        } else {
            debug!("Showing main window");
            let mut effects = self.show();
            effects.extend(self.resume_playback());
            effects
        }
    }

    /// Ask the page to play the persisted station, if there is one
    pub fn resume_playback(&self) -> Vec<Effect> {
        match self.stored_station() {
            Some(url) => vec![Effect::SendToPage(PageMessage::PlayLastStation { url })],
            None => Vec::new(),
        }
    }

    /// Record and persist the current bounds. Failures are logged only.
    pub fn persist_geometry(&mut self, bounds: Bounds) {
        if self.state.lifecycle == SessionLifecycle::Terminated {
            return;
        }
        self.persist_state(bounds.into());
    }

    /// Record where the window really is without persisting it, e.g. after
    /// the shell centred a window that had no stored position
    pub fn observe_geometry(&mut self, bounds: Bounds) {
        if self.state.lifecycle == SessionLifecycle::Terminated {
            return;
        }
        self.state.geometry = bounds.into();
    }

    fn persist_state(&mut self, geometry: WindowState) {
        self.state.geometry = geometry;
        if let Err(e) = self.store.set_window_state(&geometry) {
            warn!(error = %e, code = e.error_code(), "Failed to persist window state");
        }
    }

    /// OS or user close gesture on the main window
    pub fn on_close_requested(&mut self, bounds: Option<Bounds>) -> (CloseDecision, Vec<Effect>) {
        if !self.state.close_intercept {
            return (CloseDecision::Allow, Vec::new());
        }
        if let Some(bounds) = bounds {
            self.persist_geometry(bounds);
        }

        let mut effects = self.dismiss_about();
        effects.extend(self.hide());
        info!("Close intercepted, window hidden");
        (CloseDecision::Prevent, effects)
    }

    /// Main window lost input focus
    pub fn on_focus_lost(&mut self) -> Vec<Effect> {
        if !self.is_running() || !self.is_visible() || self.state.modal_open {
            return Vec::new();
        }
        debug!("Focus lost, hiding main window");
        self.hide()
    }

    /// Open the About dialog over a visible main window; focus it if already open
    pub fn open_about_dialog(&mut self) -> Vec<Effect> {
        if !self.is_running() {
            return Vec::new();
        }
        if self.state.modal_open {
            return vec![Effect::FocusAbout];
        }

        let mut effects = if self.is_visible() {
            Vec::new()
        } else {
            self.show()
        };
        self.state.modal_open = true;
        effects.push(Effect::SetMainEnabled(false));
        effects.push(Effect::OpenAbout(AboutDialogSpec::default()));
        effects
    }

    /// The About dialog went away
    pub fn on_about_closed(&mut self) -> Vec<Effect> {
        if !self.state.modal_open {
            return Vec::new();
        }
        self.state.modal_open = false;
        if !self.is_running() {
            return Vec::new();
        }
        let mut effects = vec![Effect::SetMainEnabled(true)];
        effects.extend(self.show());
        effects
    }

    /// Clear the modal flag before anything hides the main window
    fn dismiss_about(&mut self) -> Vec<Effect> {
        if self.state.modal_open {
            self.state.modal_open = false;
            vec![Effect::CloseAbout, Effect::SetMainEnabled(true)]
        } else {
            Vec::new()
        }
    }

    /// Arm drag-to-move in the page
    pub fn begin_window_move(&mut self) -> Vec<Effect> {
        if !self.is_running() {
            return Vec::new();
        }
        let mut effects = if self.is_visible() {
            Vec::new()
        } else {
            self.show()
        };
        effects.push(Effect::SendToPage(PageMessage::StartWindowMove));
        effects
    }

    /// Current window origin, `(0, 0)` when never placed
    pub fn window_position(&self) -> WindowPosition {
        let (x, y) = self.state.geometry.position().unwrap_or((0, 0));
        WindowPosition { x, y }
    }

    /// Move the window and persist the result
    pub fn set_position(&mut self, x: i32, y: i32) -> Vec<Effect> {
        if self.state.lifecycle == SessionLifecycle::Terminated {
            return Vec::new();
        }
        self.persist_state(self.state.geometry.moved_to(x, y));
        vec![Effect::SetMainPosition { x, y }]
    }

    /// The page started playing a station the user picked
    #[instrument(skip(self))]
    pub fn on_station_changed(&mut self, url: &str) -> Result<Vec<Effect>> {
        if !stations::is_known(url) {
            return Err(Error::UnknownStation(url.to_string()));
        }
        if let Err(e) = self.store.set_last_station(url) {
            warn!(error = %e, code = e.error_code(), "Failed to persist last station");
        }
        info!(url, "Station changed");

        if self.state.first_action_pending {
            self.state.first_action_pending = false;
            return Ok(self.resume_playback());
        }
        Ok(Vec::new())
    }

    /// Dock icon clicked (macOS) or app reactivated
    pub fn reactivate(&mut self) -> Vec<Effect> {
        if !self.is_running() || self.is_visible() {
            return Vec::new();
        }
        self.show()
    }

    /// Dispatch a page request
    pub fn handle_request(&mut self, request: PageRequest) -> Result<(RequestReply, Vec<Effect>)> {
        match request {
            PageRequest::StationChanged { url } => {
                Ok((RequestReply::None, self.on_station_changed(&url)?))
            }
            PageRequest::GetWindowPosition => {
                Ok((RequestReply::Position(self.window_position()), Vec::new()))
            }
            PageRequest::UpdateWindowPosition { x, y } => {
                Ok((RequestReply::None, self.set_position(x, y)))
            }
        }
    }

    /// Dispatch a tray or context menu action
    pub fn handle_menu(&mut self, action: MenuAction, bounds: Option<Bounds>) -> Result<Vec<Effect>> {
        match action {
            MenuAction::ToggleVisibility => Ok(self.toggle_visibility()),
            MenuAction::Move => Ok(self.begin_window_move()),
            MenuAction::About => Ok(self.open_about_dialog()),
            MenuAction::Exit => self.request_close(bounds),
        }
    }

    /// First shutdown phase: detach close interception and save final state
    pub fn quiesce(&mut self, bounds: Option<Bounds>) -> Result<Vec<Effect>> {
        self.transition(SessionLifecycle::Quiesced)?;
        self.state.close_intercept = false;
        if let Some(bounds) = bounds {
            self.persist_geometry(bounds);
        }
        Ok(self.dismiss_about())
    }

    /// Second shutdown phase: destroy the main window and exit
    pub fn terminate(&mut self) -> Result<Vec<Effect>> {
        self.transition(SessionLifecycle::Terminated)?;
        self.state.window = WindowPhase::Destroyed;
        Ok(vec![Effect::DestroyMain, Effect::Exit { code: 0 }])
    }

    /// The only path that really closes the main window
    pub fn request_close(&mut self, bounds: Option<Bounds>) -> Result<Vec<Effect>> {
        let mut effects = self.quiesce(bounds)?;
        effects.extend(self.terminate()?);
        Ok(effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stations::STATIONS;

    fn running() -> SessionController {
        let mut controller = SessionController::new(SettingsStore::in_memory(), LaunchMode::Normal);
        controller.initialize().unwrap();
        controller
    }

    #[test]
    fn test_initialize_twice_fails() {
        let mut controller = running();
        assert!(matches!(
            controller.initialize(),
            Err(Error::InvalidLifecycleTransition { .. })
        ));
    }

    #[test]
    fn test_first_page_load_displays_and_shows() {
        let mut controller = running();
        let effects = controller.on_page_loaded();
        assert_eq!(
            effects,
            vec![
                Effect::SendToPage(PageMessage::LoadLastStation {
                    url: DEFAULT_STATION_URL.into()
                }),
                Effect::ShowMain,
                Effect::FocusMain,
            ]
        );
        assert!(controller.on_page_loaded().is_empty());
    }

    #[test]
    fn test_hidden_launch_stays_in_tray() {
        let mut controller = SessionController::new(SettingsStore::in_memory(), LaunchMode::Hidden);
        controller.initialize().unwrap();
        let effects = controller.on_page_loaded();
        assert_eq!(effects.len(), 1);
        assert!(!controller.is_visible());
    }

    #[test]
    fn test_focus_loss_respects_modal() {
        let mut controller = running();
        controller.on_page_loaded();

        controller.open_about_dialog();
        assert!(controller.on_focus_lost().is_empty());
        assert!(controller.is_visible());

        controller.on_about_closed();
        assert_eq!(controller.on_focus_lost(), vec![Effect::HideMain]);
    }

    #[test]
    fn test_about_opens_over_hidden_window() {
        let mut controller = running();
        let effects = controller.open_about_dialog();
        assert_eq!(effects[0], Effect::ShowMain);
        assert!(matches!(effects.last(), Some(Effect::OpenAbout(_))));
        assert_eq!(controller.open_about_dialog(), vec![Effect::FocusAbout]);
    }

    #[test]
    fn test_close_with_about_open_clears_modal_first() {
        let mut controller = running();
        controller.open_about_dialog();

        let (decision, effects) = controller.on_close_requested(None);
        assert_eq!(decision, CloseDecision::Prevent);
        assert_eq!(
            effects,
            vec![Effect::CloseAbout, Effect::SetMainEnabled(true), Effect::HideMain]
        );
        assert!(!controller.state().modal_open);

        // The dialog's own close notification arrives later and is a no-op
        assert!(controller.on_about_closed().is_empty());
        assert!(!controller.is_visible());
    }

    #[test]
    fn test_toggle_hide_closes_about() {
        let mut controller = running();
        controller.on_page_loaded();
        controller.open_about_dialog();

        let effects = controller.toggle_visibility();
        assert_eq!(
            effects,
            vec![Effect::CloseAbout, Effect::SetMainEnabled(true), Effect::HideMain]
        );
        assert_eq!(controller.state().window, WindowPhase::Hidden);
        assert!(!controller.state().modal_open);

        // Showing again does not bring the dialog back
        let effects = controller.toggle_visibility();
        assert!(!effects.iter().any(|e| matches!(e, Effect::OpenAbout(_))));
    }

    #[test]
    fn test_main_disabled_while_about_open() {
        let mut controller = running();
        controller.on_page_loaded();

        let effects = controller.open_about_dialog();
        assert_eq!(effects[0], Effect::SetMainEnabled(false));
        assert!(matches!(effects[1], Effect::OpenAbout(_)));

        assert_eq!(
            controller.on_about_closed(),
            vec![Effect::SetMainEnabled(true), Effect::ShowMain, Effect::FocusMain]
        );
    }

    #[test]
    fn test_observed_geometry_seeds_position_without_persisting() {
        let mut controller = running();
        controller.observe_geometry(Bounds::new(860, 390, 200, 300));
        assert_eq!(controller.window_position(), WindowPosition { x: 860, y: 390 });
        assert_eq!(controller.store().window_state(), WindowState::default());
    }

    #[test]
    fn test_terminate_requires_quiesce() {
        let mut controller = running();
        assert!(controller.terminate().is_err());
        controller.quiesce(None).unwrap();
        assert_eq!(
            controller.terminate().unwrap(),
            vec![Effect::DestroyMain, Effect::Exit { code: 0 }]
        );
        assert!(controller.request_close(None).is_err());
    }

    #[test]
    fn test_close_allowed_after_quiesce() {
        let mut controller = running();
        controller.quiesce(None).unwrap();
        let (decision, effects) = controller.on_close_requested(None);
        assert_eq!(decision, CloseDecision::Allow);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_unknown_station_is_rejected() {
        let mut controller = running();
        assert!(matches!(
            controller.on_station_changed("https://example.test/not-a-station"),
            Err(Error::UnknownStation(_))
        ));
        assert_eq!(controller.store().last_station(), None);
    }

    #[test]
    fn test_stored_unknown_station_falls_back() {
        let mut store = SettingsStore::in_memory();
        store.set_last_station("https://example.test/gone").unwrap();
        let mut controller = SessionController::new(store, LaunchMode::Normal);
        controller.initialize().unwrap();
        assert_eq!(controller.last_station(), DEFAULT_STATION_URL);
        assert!(controller.resume_playback().is_empty());
    }

    #[test]
    fn test_menu_dispatch() {
        let mut controller = running();
        let effects = controller.handle_menu(MenuAction::Move, None).unwrap();
        assert_eq!(
            effects,
            vec![
                Effect::ShowMain,
                Effect::FocusMain,
                Effect::SendToPage(PageMessage::StartWindowMove)
            ]
        );

        let effects = controller
            .handle_menu(MenuAction::Exit, Some(Bounds::new(1, 2, 200, 300)))
            .unwrap();
        assert_eq!(effects.last(), Some(&Effect::Exit { code: 0 }));
        assert_eq!(controller.state().window, WindowPhase::Destroyed);
    }

    #[test]
    fn test_request_dispatch() {
        let mut controller = running();
        let (reply, effects) = controller
            .handle_request(PageRequest::UpdateWindowPosition { x: 40, y: 60 })
            .unwrap();
        assert_eq!(reply, RequestReply::None);
        assert_eq!(effects, vec![Effect::SetMainPosition { x: 40, y: 60 }]);

        let (reply, _) = controller.handle_request(PageRequest::GetWindowPosition).unwrap();
        assert_eq!(reply, RequestReply::Position(WindowPosition { x: 40, y: 60 }));

        let (_, effects) = controller
            .handle_request(PageRequest::StationChanged {
                url: STATIONS[2].url.into(),
            })
            .unwrap();
        assert_eq!(
            effects,
            vec![Effect::SendToPage(PageMessage::PlayLastStation {
                url: STATIONS[2].url.into()
            })]
        );
    }

    #[test]
    fn test_reactivate_shows_hidden_window() {
        let mut controller = running();
        assert_eq!(controller.reactivate(), vec![Effect::ShowMain, Effect::FocusMain]);
        assert!(controller.reactivate().is_empty());
    }
}
