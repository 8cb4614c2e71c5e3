//! Widget configuration file persistence
//!
//! This module handles loading and saving the widget rule file in the
//! platform-specific configuration directory, with graceful fallback to
//! defaults when the file is missing or broken.

use crate::config::WidgetSettings;
use crate::error::{Error, Result, ResultExt};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the config directory
const APP_NAME: &str = "ferrite";

/// Widget configuration file name
const CONFIG_FILE_NAME: &str = "widgets.json";

/// Suffix of the temporary file used during atomic writes
const BACKUP_SUFFIX: &str = ".bak";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Directory Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Get the platform-specific configuration directory for the application.
///
/// - **Windows**: `%APPDATA%\ferrite\`
/// - **macOS**: `~/Library/Application Support/ferrite/`
/// - **Linux**: `~/.config/ferrite/`
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` if the config directory cannot be determined.
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the widget configuration file.
pub fn get_config_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

// ─────────────────────────────────────────────────────────────────────────────
// Load Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Load widget settings from the default location.
///
/// A missing, empty or corrupted file yields default settings; problems are
/// logged rather than returned.
pub fn load_config() -> WidgetSettings {
    get_config_file_path()
        .and_then(|path| load_config_from(&path))
        .unwrap_or_warn_default(
            WidgetSettings::default(),
            "Failed to load widget configuration",
        )
}

/// Load widget settings from `path`.
///
/// A missing or empty file yields default settings.
///
/// # Errors
///
/// - `Error::ConfigLoad`: the file exists but cannot be read
/// - `Error::ConfigParse`: the file is not valid JSON
pub fn load_config_from(path: &Path) -> Result<WidgetSettings> {
    if !path.exists() {
        debug!(
            "Widget config not found at {}, using defaults",
            path.display()
        );
        return Ok(WidgetSettings::default());
    }

    debug!("Loading widget config from: {}", path.display());

    let contents = fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    if contents.trim().is_empty() {
        debug!("Widget config is empty, using defaults");
        return Ok(WidgetSettings::default());
    }

    let settings = WidgetSettings::from_json_sanitized(&contents).map_err(|e| {
        warn!(
            "Widget config at {} contains invalid JSON: {}",
            path.display(),
            e
        );
        Error::ConfigParse {
            message: format!("Failed to parse widget config: {}", e),
            source: Some(Box::new(e)),
        }
    })?;

    info!(
        "Loaded {} widget rule(s) from {}",
        settings.rules.len(),
        path.display()
    );
    Ok(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Save Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Temporary file written next to `path` before it is renamed into place.
fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| CONFIG_FILE_NAME.into());
    name.push(BACKUP_SUFFIX);
    path.with_file_name(name)
}

/// Save widget settings to the default location.
pub fn save_config(settings: &WidgetSettings) -> Result<()> {
    save_config_to(settings, &get_config_file_path()?)
}

/// Save widget settings to `path`.
///
/// The JSON is written to a `.bak` file next to `path` first and then renamed
/// over it, so a failed write never leaves a truncated config behind. Missing
/// parent directories are created.
///
/// # Errors
///
/// Returns `Error::ConfigSave` if any step fails.
pub fn save_config_to(settings: &WidgetSettings, path: &Path) -> Result<()> {
    let config_dir = path.parent().unwrap_or_else(|| Path::new("."));
    if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
        debug!("Creating config directory: {}", config_dir.display());
        fs::create_dir_all(config_dir).map_err(|e| Error::ConfigSave {
            path: config_dir.to_path_buf(),
            source: Box::new(e),
        })?;
    }

    let backup_path = backup_path(path);

    let json = serde_json::to_string_pretty(settings).map_err(|e| Error::ConfigSave {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    fs::write(&backup_path, &json).map_err(|e| Error::ConfigSave {
        path: backup_path.clone(),
        source: Box::new(e),
    })?;

    fs::rename(&backup_path, path).map_err(|e| Error::ConfigSave {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    info!("Widget configuration saved to {}", path.display());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WidgetRuleConfig;
    use tempfile::TempDir;

    /// Helper to create a test environment with a temporary config directory.
    struct TestEnv {
        _temp_dir: TempDir,
        config_file: PathBuf,
    }

    impl TestEnv {
        fn new() -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp dir");
            let config_file = temp_dir.path().join(APP_NAME).join(CONFIG_FILE_NAME);
            Self {
                _temp_dir: temp_dir,
                config_file,
            }
        }

        fn write_config(&self, content: &str) {
            fs::create_dir_all(self.config_file.parent().unwrap()).unwrap();
            fs::write(&self.config_file, content).expect("Failed to write config");
        }
    }

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_get_config_file_path() {
        if let Ok(path) = get_config_file_path() {
            assert!(path.to_string_lossy().contains(APP_NAME));
            assert!(path.ends_with(CONFIG_FILE_NAME));
        }
    }

    #[test]
    fn test_load_missing_config_uses_defaults() {
        let env = TestEnv::new();
        let settings = load_config_from(&env.config_file).unwrap();
        assert_eq!(settings, WidgetSettings::default());
    }

    #[test]
    fn test_load_empty_config_uses_defaults() {
        let env = TestEnv::new();
        env.write_config("  \n");
        let settings = load_config_from(&env.config_file).unwrap();
        assert!(settings.rules.is_empty());
    }

    #[test]
    fn test_load_corrupted_config_returns_error() {
        init_logger();
        let env = TestEnv::new();
        env.write_config("{ not json");

        let result = load_config_from(&env.config_file);
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_load_config_sanitizes_values() {
        let env = TestEnv::new();
        env.write_config(r#"{"rules":[{"name":" math ","pattern":""},{"pattern":" #\\w+ "}]}"#);

        let settings = load_config_from(&env.config_file).unwrap();
        assert_eq!(settings.rules, vec![WidgetRuleConfig::new("rule0", r"#\w+")]);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        init_logger();
        let env = TestEnv::new();
        let mut emoji = WidgetRuleConfig::new("emoji", r":\w+:");
        emoji.enabled = false;
        let settings = WidgetSettings {
            rules: vec![WidgetRuleConfig::new("math", r"\$\S+"), emoji],
        };

        save_config_to(&settings, &env.config_file).unwrap();
        assert!(env.config_file.exists());
        assert!(!backup_path(&env.config_file).exists());

        let loaded = load_config_from(&env.config_file).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_backup_path_follows_target_name() {
        let dir = Path::new("cfg");
        assert_eq!(
            backup_path(&dir.join("widgets.json")),
            dir.join("widgets.json.bak")
        );
        assert_eq!(
            backup_path(&dir.join("team.json")),
            dir.join("team.json.bak")
        );
    }

    #[test]
    fn test_save_two_configs_in_one_directory() {
        let env = TestEnv::new();
        let other_file = env.config_file.with_file_name("team.json");

        let mine = WidgetSettings {
            rules: vec![WidgetRuleConfig::new("math", r"\$\S+")],
        };
        let team = WidgetSettings {
            rules: vec![WidgetRuleConfig::new("mention", r"@\w+")],
        };

        save_config_to(&mine, &env.config_file).unwrap();
        save_config_to(&team, &other_file).unwrap();

        assert_eq!(load_config_from(&env.config_file).unwrap(), mine);
        assert_eq!(load_config_from(&other_file).unwrap(), team);
        assert!(!backup_path(&other_file).exists());
    }

    #[test]
    fn test_save_creates_valid_json() {
        let env = TestEnv::new();
        let settings = WidgetSettings {
            rules: vec![WidgetRuleConfig::new("mention", r"@\w+")],
        };
        save_config_to(&settings, &env.config_file).unwrap();

        let contents = fs::read_to_string(&env.config_file).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["rules"][0]["name"], "mention");
        assert_eq!(value["rules"][0]["enabled"], true);
    }
}
