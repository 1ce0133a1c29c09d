use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const DEFAULT_FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_IDENTITY_BASE: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_ADVICE_BASE: &str = "https://nitinat-right-here.hf.space";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Runtime configuration shared by the TUI and CLI.
///
/// Resolution order: built-in defaults, then the optional config file at
/// `~/.config/moodlens/config.json`, then `MOODLENS_*` environment overrides.
/// A missing config file is not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub project_id: String,
    pub api_key: String,
    pub firestore_base: String,
    pub identity_base: String,
    pub advice_base: String,
    pub poll_interval_secs: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            api_key: String::new(),
            firestore_base: DEFAULT_FIRESTORE_BASE.to_string(),
            identity_base: DEFAULT_IDENTITY_BASE.to_string(),
            advice_base: DEFAULT_ADVICE_BASE.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl CoreConfig {
    /// Default on-disk location of the config file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("moodlens").join("config.json"))
    }

    /// Load from defaults, file, and environment, in that order.
    pub fn load() -> Self {
        let mut config = Self::default_path()
            .and_then(|p| Self::from_file(&p))
            .unwrap_or_default();
        config.apply_env();
        config
    }

    pub fn from_file(path: &std::path::Path) -> Option<Self> {
        let data = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&data) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("ignoring malformed config file {}: {}", path.display(), e);
                None
            }
        }
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("MOODLENS_PROJECT_ID") {
            self.project_id = v;
        }
        if let Ok(v) = std::env::var("MOODLENS_API_KEY") {
            self.api_key = v;
        }
        if let Ok(v) = std::env::var("MOODLENS_ADVICE_URL") {
            self.advice_base = v;
        }
        if let Ok(v) = std::env::var("MOODLENS_POLL_INTERVAL") {
            if let Ok(secs) = v.parse() {
                self.poll_interval_secs = secs;
            }
        }
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CoreConfig::from_file(&dir.path().join("nope.json")).is_none());
        let config = CoreConfig::default();
        assert_eq!(config.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
        assert_eq!(config.firestore_base, DEFAULT_FIRESTORE_BASE);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"project_id":"righthere-prod","api_key":"k"}"#).unwrap();

        let config = CoreConfig::from_file(&path).unwrap();
        assert_eq!(config.project_id, "righthere-prod");
        assert_eq!(config.api_key, "k");
        assert_eq!(config.advice_base, DEFAULT_ADVICE_BASE);
        assert_eq!(config.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
    }

    #[test]
    fn malformed_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(CoreConfig::from_file(&path).is_none());
    }

    #[test]
    fn poll_interval_is_clamped_to_at_least_one_second() {
        let config = CoreConfig {
            poll_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.poll_interval(), std::time::Duration::from_secs(1));
    }
}
