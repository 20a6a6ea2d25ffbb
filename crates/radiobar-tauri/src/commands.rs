//! Tauri IPC commands
//!
//! The page side of the bridge. Station playback itself is handled by the
//! audio element in the frontend; these commands only carry the
//! page-to-process messages into the session controller.

use crate::shell::{apply, main_bounds, with_session};
use radiobar_core::{session::RequestReply, stations::STATIONS, PageRequest};
use serde::Serialize;
use tauri::{AppHandle, Manager, WebviewWindow};

/// Station info for frontend
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationInfo {
    pub id: String,
    pub url: String,
}

fn handle(app: &AppHandle, request: PageRequest) -> Result<RequestReply, String> {
    let (reply, effects) = with_session(app, |s| s.handle_request(request))
        .ok_or_else(|| "session not ready".to_string())?
        .map_err(|e| e.to_string())?;
    apply(app, effects);
    Ok(reply)
}

// ============================================================================
// Bridge commands - page to process
// ============================================================================

/// The user picked a station and it started playing
#[tauri::command]
pub fn station_changed(app: AppHandle, url: String) -> Result<(), String> {
    tracing::info!(url = %url, "Station changed by page");
    handle(&app, PageRequest::StationChanged { url }).map(|_| ())
}

/// Current window origin as `[x, y]`, read from the live window
#[tauri::command]
pub fn get_window_position(app: AppHandle) -> Result<[i32; 2], String> {
    if let Some(bounds) = main_bounds(&app) {
        with_session(&app, |s| s.observe_geometry(bounds));
    }
    match handle(&app, PageRequest::GetWindowPosition)? {
        RequestReply::Position(pos) => Ok([pos.x, pos.y]),
        RequestReply::None => Err("no position available".to_string()),
    }
}

/// Move the window during a drag
#[tauri::command]
pub fn update_window_position(app: AppHandle, x: i32, y: i32) -> Result<(), String> {
    handle(&app, PageRequest::UpdateWindowPosition { x, y }).map(|_| ())
}

// ============================================================================
// Window chrome
// ============================================================================

/// Pop up the tray menu at the cursor
#[tauri::command]
pub fn show_context_menu(window: WebviewWindow) -> Result<(), String> {
    let menu = crate::tray::build_menu(window.app_handle()).map_err(|e| e.to_string())?;
    window.popup_menu(&menu).map_err(|e| e.to_string())
}

// ============================================================================
// Info
// ============================================================================

/// Built-in station table
#[tauri::command]
pub fn get_stations() -> Vec<StationInfo> {
    STATIONS
        .iter()
        .map(|s| StationInfo {
            id: s.id.to_string(),
            url: s.url.to_string(),
        })
        .collect()
}

/// Get player version
#[tauri::command]
pub fn get_version() -> String {
    radiobar_core::VERSION.to_string()
}
