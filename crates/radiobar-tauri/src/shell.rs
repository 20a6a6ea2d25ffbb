//! Tauri glue for the session controller
//!
//! Builds the windows, turns window/menu/page-load events into controller
//! calls and applies the returned effects. The controller lock is always
//! released before any window is touched.

use anyhow::{anyhow, Context};
use radiobar_core::{
    config::CONFIG_FILE_NAME,
    dialog::{is_external_link, ABOUT_WINDOW_LABEL, MAIN_WINDOW_LABEL},
    settings::SETTINGS_FILE_NAME,
    AboutDialogSpec, AdStripper, AppConfig, Bounds, CloseDecision, Effect, LaunchMode,
    MainWindowSpec, MenuAction, SessionController, SettingsStore, DEFAULT_WINDOW_HEIGHT,
    DEFAULT_WINDOW_WIDTH,
};
use std::path::PathBuf;
use std::sync::Mutex;
use tauri::{
    webview::PageLoadEvent, App, AppHandle, Emitter, Manager, PhysicalPosition, PhysicalSize,
    RunEvent, WebviewUrl, WebviewWindow, WebviewWindowBuilder, Window, WindowEvent,
};
use tauri_plugin_autostart::ManagerExt;
use tauri_plugin_opener::OpenerExt;
use tracing::{debug, info, warn};

/// Options taken from the command line
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub launch: LaunchMode,
    pub config_path: Option<PathBuf>,
}

/// Shared application state
pub struct AppState {
    pub session: Mutex<SessionController>,
}

/// Run `f` against the controller. `None` before setup has managed the state.
pub fn with_session<T>(app: &AppHandle, f: impl FnOnce(&mut SessionController) -> T) -> Option<T> {
    let state = app.try_state::<AppState>()?;
    let mut session = state
        .session
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    Some(f(&mut session))
}

/// Read config and settings, build the main window and the tray
pub fn setup(app: &mut App, options: LaunchOptions) -> anyhow::Result<()> {
    let handle = app.handle().clone();

    let config_path = match options.config_path {
        Some(path) => path,
        None => handle
            .path()
            .app_config_dir()
            .context("no app config directory")?
            .join(CONFIG_FILE_NAME),
    };
    let config = AppConfig::load_or_default(&config_path);
    let page_url = config.page_url().unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring pageUrl");
        None
    });

    let settings_path = handle
        .path()
        .app_data_dir()
        .context("no app data directory")?
        .join(SETTINGS_FILE_NAME);
    info!(settings = %settings_path.display(), config = %config_path.display(), "Paths resolved");

    let mut controller =
        SessionController::new(SettingsStore::open(settings_path), options.launch)
            .with_page_url(page_url);
    let spec = controller.initialize()?;

    // Managed before the window exists so the first page load finds it
    app.manage(AppState {
        session: Mutex::new(controller),
    });

    build_main_window(&handle, &spec, &config.ad_stripper())?;

    crate::tray::build(&handle)?;
    sync_autostart(&handle, config.autostart);

    Ok(())
}

fn build_main_window(
    app: &AppHandle,
    spec: &MainWindowSpec,
    stripper: &AdStripper,
) -> anyhow::Result<WebviewWindow> {
    let url = match &spec.page_url {
        Some(url) => WebviewUrl::External(url.clone()),
        None => WebviewUrl::App("index.html".into()),
    };
    let blocklist = stripper.blocklist().clone();

    let mut builder = WebviewWindowBuilder::new(app, spec.label, url)
        .title(spec.title)
        .inner_size(DEFAULT_WINDOW_WIDTH as f64, DEFAULT_WINDOW_HEIGHT as f64)
        .decorations(spec.decorations)
        .visible(spec.visible)
        .skip_taskbar(spec.skip_taskbar)
        .initialization_script(&stripper.init_script())
        .on_navigation(move |url| !blocklist.should_block(url.as_str()))
        .on_page_load(|window, payload| {
            if matches!(payload.event(), PageLoadEvent::Finished) {
                debug!(url = %payload.url(), "Page loaded");
                let app = window.app_handle();
                let effects = with_session(app, |s| s.on_page_loaded()).unwrap_or_default();
                apply(app, effects);
            }
        });

    if spec.state.position().is_none() {
        builder = builder.center();
    }

    let window = builder.build().context("failed to create main window")?;

    // Stored geometry is in physical pixels, as reported by the move/resize
    // events. It is saved from the outer size; the window is frameless, so
    // setting the inner size restores the same bounds.
    if spec.restored {
        window.set_size(PhysicalSize::new(spec.state.width, spec.state.height))?;
        if let Some((x, y)) = spec.state.position() {
            window.set_position(PhysicalPosition::new(x, y))?;
        }
    }

    // Where the window really landed, e.g. after centring on first run
    if let Some(bounds) = bounds_of(window.outer_position(), window.outer_size()) {
        with_session(app, |s| s.observe_geometry(bounds));
    }

    info!(restored = spec.restored, geometry = ?spec.state, "Main window created");
    Ok(window)
}

fn open_about(app: &AppHandle, spec: &AboutDialogSpec) -> anyhow::Result<()> {
    let main = main_window(app)?;
    let links = app.clone();

    WebviewWindowBuilder::new(app, spec.label, WebviewUrl::App(spec.page.into()))
        .title(spec.title)
        .inner_size(spec.width, spec.height)
        .resizable(spec.resizable)
        .minimizable(spec.minimizable)
        .maximizable(false)
        .skip_taskbar(true)
        .parent(&main)?
        .on_navigation(move |url| {
            if !is_external_link(url) {
                return true;
            }
            info!(url = %url, "Opening link in default browser");
            if let Err(e) = links.opener().open_url(url.as_str(), None::<&str>) {
                warn!(url = %url, error = %e, "Failed to open link");
            }
            false
        })
        .build()
        .context("failed to create About dialog")?;

    Ok(())
}

fn main_window(app: &AppHandle) -> anyhow::Result<WebviewWindow> {
    app.get_webview_window(MAIN_WINDOW_LABEL)
        .ok_or_else(|| anyhow!("main window is gone"))
}

/// Outer bounds from position/size queries; zero sizes (minimized) are ignored
fn bounds_of(
    position: tauri::Result<PhysicalPosition<i32>>,
    size: tauri::Result<PhysicalSize<u32>>,
) -> Option<Bounds> {
    let (position, size) = (position.ok()?, size.ok()?);
    if size.width == 0 || size.height == 0 {
        return None;
    }
    Some(Bounds::new(position.x, position.y, size.width, size.height))
}

/// Live outer bounds of the main window
pub fn main_bounds(app: &AppHandle) -> Option<Bounds> {
    let window = main_window(app).ok()?;
    bounds_of(window.outer_position(), window.outer_size())
}

/// Apply controller effects in order. Failures are logged and skipped.
pub fn apply(app: &AppHandle, effects: Vec<Effect>) {
    for effect in effects {
        if let Err(e) = apply_one(app, &effect) {
            warn!(effect = ?effect, error = %e, "Failed to apply effect");
            if let Effect::OpenAbout(_) = effect {
                // No dialog to wait for: re-enable the main window
                let undo = with_session(app, |s| s.on_about_closed()).unwrap_or_default();
                apply(app, undo);
            }
        }
    }
}

fn apply_one(app: &AppHandle, effect: &Effect) -> anyhow::Result<()> {
    match effect {
        Effect::ShowMain => main_window(app)?.show()?,
        Effect::HideMain => main_window(app)?.hide()?,
        Effect::FocusMain => main_window(app)?.set_focus()?,
        Effect::SetMainEnabled(enabled) => main_window(app)?.set_enabled(*enabled)?,
        Effect::SetMainPosition { x, y } => {
            main_window(app)?.set_position(PhysicalPosition::new(*x, *y))?
        }
        Effect::SendToPage(msg) => {
            debug!(event = msg.event_name(), "Sending to page");
            app.emit_to(MAIN_WINDOW_LABEL, msg.event_name(), msg.payload())?
        }
        Effect::OpenAbout(spec) => open_about(app, spec)?,
        Effect::FocusAbout => {
            if let Some(about) = app.get_webview_window(ABOUT_WINDOW_LABEL) {
                about.set_focus()?;
            }
        }
        Effect::CloseAbout => {
            if let Some(about) = app.get_webview_window(ABOUT_WINDOW_LABEL) {
                about.destroy()?;
            }
        }
        Effect::DestroyMain => main_window(app)?.destroy()?,
        Effect::Exit { code } => {
            info!(code, "Exiting");
            app.exit(*code);
        }
    }
    Ok(())
}

/// Global window event listener
pub fn on_window_event(window: &Window, event: &WindowEvent) {
    let app = window.app_handle();
    match window.label() {
        MAIN_WINDOW_LABEL => on_main_window_event(app, window, event),
        ABOUT_WINDOW_LABEL => {
            if let WindowEvent::Destroyed = event {
                debug!("About dialog closed");
                let effects = with_session(app, |s| s.on_about_closed()).unwrap_or_default();
                apply(app, effects);
            }
        }
        _ => {}
    }
}

fn on_main_window_event(app: &AppHandle, window: &Window, event: &WindowEvent) {
    match event {
        WindowEvent::Moved(_) | WindowEvent::Resized(_) => {
            if let Some(bounds) = bounds_of(window.outer_position(), window.outer_size()) {
                with_session(app, |s| s.persist_geometry(bounds));
            }
        }
        WindowEvent::CloseRequested { api, .. } => {
            let bounds = bounds_of(window.outer_position(), window.outer_size());
            let (decision, effects) = with_session(app, |s| s.on_close_requested(bounds))
                .unwrap_or((CloseDecision::Allow, Vec::new()));
            if decision == CloseDecision::Prevent {
                api.prevent_close();
            }
            apply(app, effects);
        }
        WindowEvent::Focused(false) => {
            let effects = with_session(app, |s| s.on_focus_lost()).unwrap_or_default();
            apply(app, effects);
        }
        _ => {}
    }
}

/// Tray and context menu clicks
pub fn on_menu_event(app: &AppHandle, id: &str) {
    let Some(action) = MenuAction::from_id(id) else {
        debug!(id, "Ignoring unknown menu item");
        return;
    };
    info!(action = action.id(), "Menu action");
    dispatch(app, action);
}

/// Run a menu action against the controller and apply the result
pub fn dispatch(app: &AppHandle, action: MenuAction) {
    let bounds = main_bounds(app);
    match with_session(app, |s| s.handle_menu(action, bounds)) {
        Some(Ok(effects)) => apply(app, effects),
        Some(Err(e)) => warn!(action = action.id(), error = %e, "Menu action rejected"),
        None => warn!(action = action.id(), "Session not ready"),
    }
}

/// Application-level events
#[cfg_attr(not(target_os = "macos"), allow(unused_variables))]
pub fn on_run_event(app: &AppHandle, event: RunEvent) {
    match event {
        #[cfg(target_os = "macos")]
        RunEvent::Reopen { .. } => {
            let effects = with_session(app, |s| s.reactivate()).unwrap_or_default();
            apply(app, effects);
        }
        RunEvent::Exit => info!("Radiobar exited"),
        _ => {}
    }
}

/// Register or unregister launch at login to match the configuration
fn sync_autostart(app: &AppHandle, enabled: bool) {
    if cfg!(debug_assertions) {
        debug!(enabled, "Skipping autostart registration in debug build");
        return;
    }

    let launcher = app.autolaunch();
    let result = match launcher.is_enabled() {
        Ok(current) if current == enabled => Ok(()),
        Ok(_) if enabled => launcher.enable(),
        Ok(_) => launcher.disable(),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => info!(enabled, "Autostart registration in sync"),
        Err(e) => warn!(enabled, error = %e, "Failed to update autostart registration"),
    }
}
