//! Application configuration
//!
//! Optional `config.json` in the app config directory. Every field has a
//! default, so a missing file or a partial file is fine.

use crate::{
    adblock::{AdStripper, BlockList, DEFAULT_AD_SELECTORS, DEFAULT_BLOCKED_DOMAINS},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use url::Url;

/// Default file name inside the app config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Argument passed to the process when launched at login
pub const HIDDEN_ARG: &str = "--hidden";

/// Lowest accepted sweep interval
const MIN_SWEEP_INTERVAL_MS: u64 = 100;

/// User-editable configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Remote page loaded in the main window instead of the bundled UI
    pub page_url: Option<String>,
    /// Register the app to start at login
    pub autostart: bool,
    /// URL substrings whose requests are cancelled
    pub blocked_domains: Vec<String>,
    /// CSS selectors removed from loaded pages
    pub ad_selectors: Vec<String>,
    /// Period of the fallback ad sweep
    pub sweep_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page_url: None,
            autostart: true,
            blocked_domains: DEFAULT_BLOCKED_DOMAINS.iter().map(|s| s.to_string()).collect(),
            ad_selectors: DEFAULT_AD_SELECTORS.iter().map(|s| s.to_string()).collect(),
            sweep_interval_ms: 1000,
        }
    }
}

impl AppConfig {
    /// Read and validate a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config = match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str::<AppConfig>(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        config.validate()?;
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Like [`AppConfig::load`] but any failure is logged and replaced by the
    /// defaults.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Invalid configuration, using defaults");
            Self::default()
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.page_url()?;
        if self.sweep_interval_ms < MIN_SWEEP_INTERVAL_MS {
            return Err(Error::config(format!(
                "sweepIntervalMs must be at least {}",
                MIN_SWEEP_INTERVAL_MS
            )));
        }
        if self.blocked_domains.iter().any(|d| d.trim().is_empty()) {
            return Err(Error::config("blockedDomains contains an empty entry"));
        }
        Ok(())
    }

    /// Parsed remote page URL, http(s) only
    pub fn page_url(&self) -> Result<Option<Url>> {
        let Some(raw) = self.page_url.as_deref() else {
            return Ok(None);
        };
        let url = Url::parse(raw)?;
        match url.scheme() {
            "http" | "https" => Ok(Some(url)),
            other => Err(Error::config(format!("pageUrl scheme {} not allowed", other))),
        }
    }

    pub fn block_list(&self) -> BlockList {
        BlockList::new(self.blocked_domains.iter().cloned())
    }

    pub fn ad_stripper(&self) -> AdStripper {
        AdStripper::new(self.ad_selectors.clone(), self.block_list())
            .with_sweep_interval_ms(self.sweep_interval_ms)
    }
}

/// How the process was started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchMode {
    /// Show the window once the page has loaded
    #[default]
    Normal,
    /// Stay in the tray until the user asks for the window
    Hidden,
}

impl LaunchMode {
    pub fn from_hidden_flag(hidden: bool) -> Self {
        if hidden {
            LaunchMode::Hidden
        } else {
            LaunchMode::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.autostart);
        assert_eq!(config.sweep_interval_ms, 1000);
        assert_eq!(config.ad_selectors, vec![".ad-top-banner".to_string()]);
        assert!(config.blocked_domains.contains(&"googletagservices.com".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{ "autostart": false, "pageUrl": "https://radio.example.test/" }"#)
            .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert!(!config.autostart);
        assert_eq!(config.sweep_interval_ms, 1000);
        assert_eq!(
            config.page_url().unwrap().map(|u| u.host_str().map(str::to_string)),
            Some(Some("radio.example.test".to_string()))
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = AppConfig {
            page_url: Some("file:///etc/passwd".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            sweep_interval_ms: 5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            blocked_domains: vec!["  ".into()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_on_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "autostart = false").unwrap();
        assert_eq!(AppConfig::load_or_default(&path), AppConfig::default());
    }

    #[test]
    fn test_launch_mode() {
        assert_eq!(LaunchMode::from_hidden_flag(true), LaunchMode::Hidden);
        assert_eq!(LaunchMode::from_hidden_flag(false), LaunchMode::Normal);
    }
}
