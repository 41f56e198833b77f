use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BudgetError, Result};

pub const DB_FILE: &str = "budget.db";
pub const LOG_FILE: &str = "budgetbook.log";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_data_dir_string")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir_string() -> String {
    default_data_dir().to_string_lossy().to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir_string(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(DB_FILE)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("budgetbook")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Development builds keep the database next to the working directory;
/// installed (release) builds use a per-user directory.
pub fn default_data_dir() -> PathBuf {
    if cfg!(debug_assertions) {
        PathBuf::from(".")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".budget_app")
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

fn load_settings_from(path: &Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(&settings_path(), settings)
}

fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| BudgetError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

/// Database location: an explicit path wins, otherwise `<data_dir>/budget.db`.
pub fn resolve_db_path(explicit: Option<&Path>, settings: &Settings) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => settings.db_path(),
    }
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/budget".to_string(),
            log_level: "debug".to_string(),
        };
        save_settings_to(&path, &settings).unwrap();
        let loaded = load_settings_from(&path);
        assert_eq!(loaded.data_dir, "/tmp/budget");
        assert_eq!(loaded.log_level, "debug");
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings_from(&dir.path().join("nope.json"));
        assert_eq!(s.log_level, "info");
        assert!(!s.data_dir.is_empty());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/test"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.log_level, "info");
        assert_eq!(s.db_path(), PathBuf::from("/tmp/test").join(DB_FILE));
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(load_settings_from(&path).log_level, "info");
    }

    #[test]
    fn test_explicit_db_path_wins() {
        let settings = Settings {
            data_dir: "/data".to_string(),
            log_level: default_log_level(),
        };
        let explicit = PathBuf::from("/elsewhere/x.db");
        assert_eq!(resolve_db_path(Some(&explicit), &settings), explicit);
        assert_eq!(resolve_db_path(None, &settings), PathBuf::from("/data/budget.db"));
    }

    #[test]
    fn test_shellexpand_leaves_plain_paths() {
        assert_eq!(shellexpand_path("/var/data"), "/var/data");
    }
}
