//! Window descriptions handed to the shell

use crate::types::WindowState;
use url::Url;

/// Label of the main window
pub const MAIN_WINDOW_LABEL: &str = "main";

/// Label of the About dialog
pub const ABOUT_WINDOW_LABEL: &str = "about";

/// How to build the main window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainWindowSpec {
    pub label: &'static str,
    pub title: &'static str,
    /// Geometry to restore
    pub state: WindowState,
    /// True when `state` came from the store rather than the defaults
    pub restored: bool,
    /// Remote page to load instead of the bundled UI
    pub page_url: Option<Url>,
    pub decorations: bool,
    pub visible: bool,
    pub skip_taskbar: bool,
}

impl MainWindowSpec {
    pub fn new(state: WindowState, restored: bool, page_url: Option<Url>) -> Self {
        Self {
            label: MAIN_WINDOW_LABEL,
            title: "Radiobar",
            state,
            restored,
            page_url,
            decorations: false,
            visible: false,
            skip_taskbar: true,
        }
    }
}

/// How to build the About dialog
#[derive(Debug, Clone, PartialEq)]
pub struct AboutDialogSpec {
    pub label: &'static str,
    pub title: &'static str,
    /// Bundled page path
    pub page: &'static str,
    pub width: f64,
    pub height: f64,
    pub resizable: bool,
    pub minimizable: bool,
}

impl Default for AboutDialogSpec {
    fn default() -> Self {
        Self {
            label: ABOUT_WINDOW_LABEL,
            title: "About Radiobar",
            page: "about.html",
            width: 400.0,
            height: 400.0,
            resizable: false,
            minimizable: false,
        }
    }
}

/// Hosts that serve the bundled pages. Windows webviews use
/// `http://tauri.localhost`, other platforms the `tauri:` scheme.
const APP_HOSTS: [&str; 2] = ["tauri.localhost", "localhost"];

/// True for web links that belong in the default browser rather than in an
/// app window.
pub fn is_external_link(url: &Url) -> bool {
    match url.scheme() {
        "http" | "https" => !url
            .host_str()
            .map(|h| APP_HOSTS.contains(&h))
            .unwrap_or(false),
        "mailto" => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_external_links() {
        assert!(is_external_link(&url("https://github.com/radiobar")));
        assert!(is_external_link(&url("http://example.test/page")));
        assert!(is_external_link(&url("mailto:someone@example.test")));
    }

    #[test]
    fn test_app_pages_stay_inside() {
        assert!(!is_external_link(&url("tauri://localhost/about.html")));
        assert!(!is_external_link(&url("http://tauri.localhost/about.html")));
        assert!(!is_external_link(&url("http://localhost:1430/about.html")));
        assert!(!is_external_link(&url("about:blank")));
    }

    #[test]
    fn test_about_dialog_geometry() {
        let spec = AboutDialogSpec::default();
        assert_eq!((spec.width, spec.height), (400.0, 400.0));
        assert!(!spec.resizable);
        assert!(!spec.minimizable);
    }

    #[test]
    fn test_main_window_is_hidden_and_frameless() {
        let spec = MainWindowSpec::new(WindowState::default(), false, None);
        assert!(!spec.visible);
        assert!(!spec.decorations);
        assert!(spec.skip_taskbar);
    }
}
