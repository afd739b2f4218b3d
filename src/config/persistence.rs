//! Configuration file persistence for Quire
//!
//! This module handles loading and saving the configuration file in the
//! platform-specific config directory, and resolving the managed storage
//! root, with graceful fallback to defaults.

use crate::config::Settings;
use crate::error::{Error, Result, ResultExt};
use crate::store::write_json_atomic;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the config and data directories
const APP_NAME: &str = "quire";

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Directory Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Get the platform-specific configuration directory for the application.
///
/// - **Windows**: `%APPDATA%\quire\`
/// - **macOS**: `~/Library/Application Support/quire/`
/// - **Linux**: `~/.config/quire/`
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` if the directory cannot be determined.
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the configuration file.
pub fn get_config_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Resolve the managed storage root.
///
/// Uses `settings.data_dir` when set, otherwise the platform data directory
/// (`~/.local/share/quire`, `~/Library/Application Support/quire`, ...).
pub fn get_data_dir(settings: &Settings) -> Result<PathBuf> {
    if let Some(dir) = &settings.data_dir {
        return Ok(dir.clone());
    }
    dirs::data_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

// ─────────────────────────────────────────────────────────────────────────────
// Load Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Load configuration from the default config file location.
///
/// Never fails: a missing, empty or corrupted file yields default settings
/// and the problem is logged.
pub fn load_config() -> Settings {
    get_config_file_path()
        .and_then(|path| load_config_from(&path))
        .unwrap_or_warn_default(Settings::default(), "Failed to load configuration")
}

/// Load configuration from an explicit path.
///
/// A missing or empty file is not an error and yields defaults; invalid JSON
/// is reported as `Error::ConfigParse`.
pub fn load_config_from(config_path: &Path) -> Result<Settings> {
    if !config_path.exists() {
        debug!(
            "Config file not found at {}, using defaults",
            config_path.display()
        );
        return Ok(Settings::default());
    }

    debug!("Loading config from: {}", config_path.display());

    let contents = fs::read_to_string(config_path).map_err(|e| Error::ConfigLoad {
        path: config_path.to_path_buf(),
        source: Box::new(e),
    })?;

    if contents.trim().is_empty() {
        debug!("Config file is empty, using defaults");
        return Ok(Settings::default());
    }

    let settings = Settings::from_json_sanitized(&contents).map_err(|e| {
        warn!(
            "Config file at {} contains invalid JSON: {}",
            config_path.display(),
            e
        );
        Error::ConfigParse {
            message: format!("Failed to parse config file: {}", e),
            source: Some(Box::new(e)),
        }
    })?;

    info!(
        "Configuration loaded successfully from {}",
        config_path.display()
    );
    Ok(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Save Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Save configuration to the default config file location.
pub fn save_config(settings: &Settings) -> Result<()> {
    save_config_to(&get_config_dir()?, settings)
}

/// Save configuration into `config_dir`, creating the directory if needed.
///
/// Goes through [`write_json_atomic`], so a crash mid-write leaves the
/// previous file intact.
pub fn save_config_to(config_dir: &Path, settings: &Settings) -> Result<()> {
    let config_path = config_dir.join(CONFIG_FILE_NAME);
    debug!("Saving config to: {}", config_path.display());

    write_json_atomic(&config_path, settings).map_err(|e| Error::ConfigSave {
        path: config_path.clone(),
        source: Box::new(e),
    })?;

    info!(
        "Configuration saved successfully to {}",
        config_path.display()
    );
    Ok(())
}

/// Save configuration, ignoring errors.
///
/// Returns `true` if the save was successful, `false` otherwise.
pub fn save_config_silent(settings: &Settings) -> bool {
    match save_config(settings) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to save configuration: {}", e);
            false
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_config_file_path() {
        if let Ok(path) = get_config_file_path() {
            assert!(path.ends_with("quire/config.json"));
        }
    }

    #[test]
    fn test_data_dir_override_wins() {
        let settings = Settings {
            data_dir: Some(PathBuf::from("/tmp/quire-data")),
            ..Settings::default()
        };
        assert_eq!(
            get_data_dir(&settings).unwrap(),
            PathBuf::from("/tmp/quire-data")
        );
    }

    #[test]
    fn test_load_missing_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let settings = load_config_from(&temp.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_empty_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "   \n").unwrap();
        assert_eq!(load_config_from(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_load_corrupted_config_returns_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ invalid json }").unwrap();
        assert!(matches!(
            load_config_from(&path),
            Err(Error::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_load_config_sanitizes_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{"max_recent_templates": 500}"#).unwrap();
        let settings = load_config_from(&path).unwrap();
        assert_eq!(settings.max_recent_templates, Settings::MAX_RECENT_TEMPLATES);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let config_dir = temp.path().join(APP_NAME);
        let mut original = Settings {
            seed_welcome_document: false,
            search_document_content: false,
            data_dir: Some(temp.path().join("data")),
            ..Settings::default()
        };
        original.add_recent_template("meeting-notes");

        save_config_to(&config_dir, &original).unwrap();

        assert!(!config_dir.join("config.json.tmp").exists());
        let loaded = load_config_from(&config_dir.join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    fn test_save_into_unwritable_dir_is_config_save_error() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();

        let result = save_config_to(&blocker.join(APP_NAME), &Settings::default());
        assert!(matches!(result, Err(Error::ConfigSave { .. })));
    }

    #[test]
    fn test_load_config_graceful_fallback() {
        // Always yields usable settings, whatever is on disk
        let settings = load_config();
        assert!(settings.max_recent_templates >= Settings::MIN_RECENT_TEMPLATES);
    }
}
