use std::fmt;
use std::io::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const APP_NAME: &str = "yaala";
pub const CONFIG_ENV: &str = "YAALA_CONFIG";

// User facing texts. All of them pass through the shaper before display.
pub const TITLE_GROUPS: &str = "מערכת יעלה - שליטה חטיבתית 🛡️";
pub const HEADER_GROUPS: &str = "גדודים זמינים";
pub const HINT_EXIT: &str = "0. יציאה";
pub const PROMPT_GROUP: &str = "הקלד מספר גדוד";
pub const TITLE_FILES: &str = "קבצי";
pub const HEADER_FILE_NAME: &str = "שם הקובץ";
pub const HEADER_ACTIONS: &str = "אפשרויות";
pub const HINT_BACK: &str = "0. חזרה לתפריט ראשי";
pub const PROMPT_FILE: &str = "בחר מספר לפתיחה (0 לחזרה)";
pub const PROMPT_ACK: &str = "Enter...";
pub const LABEL_SYSTEM: &str = "מערכת 🚀";
pub const LABEL_FILE: &str = "אקסל 📎";
pub const NO_LINKS: &str = "אין לינקים";
pub const NO_NAME: &str = "ללא שם";
pub const NO_FILES: &str = "אין קבצים לגדוד זה";
pub const GROUP_NOT_FOUND: &str = "גדוד לא נמצא";
pub const INVALID_CHOICE: &str = "בחירה לא חוקית";
pub const OPENING: &str = "פותח בדפדפן...";
pub const CONNECTING: &str = "מתחבר למאגר המידע החטיבתי...";
pub const LOAD_FAILED: &str = "שגיאה בטעינה:";
pub const FAREWELL: &str = "להתראות! 👋";
pub const INTERRUPTED: &str = "Exit...";

#[derive(Debug)]
pub enum YaalaError {
    IoError(Error),
    PolarsError(PolarsError),
    HttpError(reqwest::Error),
    JsonError(serde_json::Error),
    TokenError(jsonwebtoken::errors::Error),
    SourceUnavailable(String),
    MissingColumn(String),
}

impl fmt::Display for YaalaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YaalaError::IoError(e) => write!(f, "I/O error: {e}"),
            YaalaError::PolarsError(e) => write!(f, "table error: {e}"),
            YaalaError::HttpError(e) => write!(f, "request failed: {e}"),
            YaalaError::JsonError(e) => write!(f, "invalid JSON: {e}"),
            YaalaError::TokenError(e) => write!(f, "could not sign credentials: {e}"),
            YaalaError::SourceUnavailable(msg) => write!(f, "data source unavailable: {msg}"),
            YaalaError::MissingColumn(name) => write!(f, "column \"{name}\" is missing"),
        }
    }
}

impl std::error::Error for YaalaError {}

impl From<Error> for YaalaError {
    fn from(err: Error) -> Self {
        YaalaError::IoError(err)
    }
}

impl From<PolarsError> for YaalaError {
    fn from(err: PolarsError) -> Self {
        YaalaError::PolarsError(err)
    }
}

impl From<reqwest::Error> for YaalaError {
    fn from(err: reqwest::Error) -> Self {
        YaalaError::HttpError(err)
    }
}

impl From<serde_json::Error> for YaalaError {
    fn from(err: serde_json::Error) -> Self {
        YaalaError::JsonError(err)
    }
}

impl From<jsonwebtoken::errors::Error> for YaalaError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        YaalaError::TokenError(err)
    }
}

#[derive(Debug)]
pub enum Message {
    RawKey(KeyEvent),
    Interrupt,
}

/// Names of the worksheet columns the catalog is read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Setters)]
#[serde(default)]
#[setters(into)]
pub struct ColumnNames {
    pub group: String,
    pub file_name: String,
    pub description: String,
    pub system_link: String,
    pub file_link: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            group: "גדוד".to_string(),
            file_name: "שם_קובץ".to_string(),
            description: "תיאור_קובץ".to_string(),
            system_link: "לינק_מערכת".to_string(),
            file_link: "לינק_קובץ".to_string(),
        }
    }
}

/// User settings stored as settings.json in the config directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Setters)]
#[serde(default)]
#[setters(into)]
pub struct Settings {
    pub spreadsheet_id: String,
    pub worksheet: String,
    pub credentials: String,
    pub columns: ColumnNames,
    pub message_pause_ms: u64,
    pub error_pause_ms: u64,
    pub event_poll_time: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            spreadsheet_id: "1ihMDbc720k2VZZVpx2TskyOAuX8YWBJpC9Cc4kI0804".to_string(),
            worksheet: "ראשי".to_string(),
            credentials: "service_account.json".to_string(),
            columns: ColumnNames::default(),
            message_pause_ms: 1000,
            error_pause_ms: 1500,
            event_poll_time: 100,
        }
    }
}

impl Settings {
    /// `$YAALA_CONFIG`, or settings.json below the user config directory.
    pub fn default_path() -> PathBuf {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_NAME)
                .join("settings.json"),
        }
    }

    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(settings) => {
                    debug!(path = %path.display(), "Settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "Failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "No settings file found, using defaults");
                Self::default()
            }
        }
    }

    /// Write the settings as pretty JSON so a first run leaves an editable file.
    pub fn save(&self, path: &Path) {
        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(error = %e, path = %parent.display(), "Failed to create settings directory");
            return;
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    warn!(error = %e, path = %path.display(), "Failed to save settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }

    /// Credential file path with `~` and environment variables expanded.
    pub fn credentials_path(&self) -> PathBuf {
        match shellexpand::full(&self.credentials) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(e) => {
                warn!(error = %e, "Could not expand credentials path, using it verbatim");
                PathBuf::from(&self.credentials)
            }
        }
    }

    pub fn message_pause(&self) -> Duration {
        Duration::from_millis(self.message_pause_ms)
    }

    pub fn error_pause(&self) -> Duration {
        Duration::from_millis(self.error_pause_ms)
    }
}
