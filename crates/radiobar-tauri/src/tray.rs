//! System tray icon and the shared context menu

use radiobar_core::{MenuAction, MenuEntry, MENU_LAYOUT};
use tauri::{
    menu::{Menu, MenuItem, PredefinedMenuItem},
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
    AppHandle,
};
use tracing::debug;

const TRAY_ID: &str = "radiobar-tray";

/// Menu used by both the tray icon and the window context menu
pub fn build_menu(app: &AppHandle) -> tauri::Result<Menu<tauri::Wry>> {
    let menu = Menu::new(app)?;
    for entry in MENU_LAYOUT {
        match entry {
            MenuEntry::Item(action) => {
                let item = MenuItem::with_id(app, action.id(), action.label(), true, None::<&str>)?;
                menu.append(&item)?;
            }
            MenuEntry::Separator => menu.append(&PredefinedMenuItem::separator(app)?)?,
        }
    }
    Ok(menu)
}

/// Create the tray icon. Menu clicks reach the global menu handler; a left
/// click on the icon toggles the main window.
pub fn build(app: &AppHandle) -> tauri::Result<()> {
    let menu = build_menu(app)?;

    let mut builder = TrayIconBuilder::with_id(TRAY_ID)
        .tooltip("Radiobar")
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                debug!("Tray icon clicked");
                crate::shell::dispatch(tray.app_handle(), MenuAction::ToggleVisibility);
            }
        });

    if let Some(icon) = app.default_window_icon() {
        builder = builder.icon(icon.clone());
    }

    // Registered with the app; the handle does not need to be kept
    builder.build(app)?;
    Ok(())
}
