//! User settings, persisted as TOML.
//!
//! Settings are stored in the platform-specific config folder:
//! - macOS: ~/Library/Application Support/org.folio.Folio/
//! - Windows: %APPDATA%/folio/Folio/config/
//! - Linux: ~/.config/folio/

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use folio_core::TickSchedule;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "folio";
const APP_NAME: &str = "Folio";
const CONFIG_FILENAME: &str = "settings.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine the settings directory")]
    NoConfigDir,
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineSettings,
    pub progress: ProgressSettings,
    pub merge: MergeSettings,
}

/// The external helper that reads and merges documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub program: String,
    /// Arguments placed before the helper's own command.
    pub args: Vec<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec!["core/merger.py".to_string()],
        }
    }
}

/// Shape of the finishing animation after the engine accepts a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSettings {
    pub finish_ticks: u32,
    pub tick_interval_ms: u64,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            finish_ticks: TickSchedule::DEFAULT_TICKS,
            tick_interval_ms: 80,
        }
    }
}

impl ProgressSettings {
    pub fn schedule(&self) -> TickSchedule {
        TickSchedule::new(
            self.finish_ticks,
            Duration::from_millis(self.tick_interval_ms),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    /// Output file used when none is given.
    pub default_output_name: String,
    /// Open the output folder after a successful merge.
    pub reveal_on_success: bool,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            default_output_name: "merged_document.pdf".to_string(),
            reveal_on_success: false,
        }
    }
}

/// Default location of the settings file.
///
/// Returns `None` if the platform-specific directory cannot be determined.
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Settings file to use: `explicit` when given, the default location otherwise.
pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(settings_path)
}

/// Load settings from `path`.
///
/// Falls back to defaults when there is no path, the file does not exist or
/// it cannot be parsed.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let Some(path) = path else {
        tracing::warn!("could not determine settings path, using defaults");
        return Settings::default();
    };

    match fs::read_to_string(path) {
        Ok(content) => match parse_settings(&content) {
            Ok(settings) => {
                tracing::info!(path = %path.display(), "loaded settings");
                settings
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "failed to parse settings, using defaults");
                Settings::default()
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            Settings::default()
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "failed to read settings, using defaults");
            Settings::default()
        }
    }
}

pub fn parse_settings(content: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str(content)
}

pub fn render_settings(settings: &Settings) -> Result<String, SettingsError> {
    Ok(toml::to_string_pretty(settings)?)
}

/// Write `settings` to `path`, creating the parent directory if needed.
pub fn save_settings(settings: &Settings, path: &Path) -> Result<(), SettingsError> {
    let write_error = |source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    let content = render_settings(settings)?;
    fs::write(path, content).map_err(write_error)?;
    tracing::info!(path = %path.display(), "saved settings");
    Ok(())
}
