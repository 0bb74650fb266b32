use std::path::PathBuf;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::i18n::Language;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub reminders: RemindersConfig,
    pub notifications: NotificationConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemindersConfig {
    pub poll_interval_secs: u64,
    pub sound_name: String,
    pub relax_track: String,
    pub language: Language,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            sound_name: "default".to_string(),
            relax_track: "relax_music.mp3".to_string(),
            language: Language::Uz,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct NotificationConfig {
    /// Ntfy.sh topic for phone notifications (e.g., "dry-nights-1234")
    pub ntfy_topic: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AudioConfig {
    /// Player command, the track path is appended (e.g., "mpv --no-video")
    pub player_command: Option<String>,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dry-nights")
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // Load .env file (silently ignore if not present)
        let _ = dotenvy::dotenv();

        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dry-nights");

        let builder = Config::builder()
            // 1. Load default values
            // Storage
            .set_default(
                "storage.data_dir",
                default_data_dir().to_string_lossy().to_string(),
            )?
            // Reminders
            .set_default("reminders.poll_interval_secs", 60)?
            .set_default("reminders.sound_name", "default")?
            .set_default("reminders.relax_track", "relax_music.mp3")?
            .set_default("reminders.language", "uz")?
            // Notifications
            .set_default("notifications.ntfy_topic", None::<String>)?
            // Audio
            .set_default("audio.player_command", None::<String>)?

            // 2. Load from local config file (optional, lowest priority)
            .add_source(File::from(PathBuf::from("config.toml")).required(false))

            // 3. Load from user config directory (optional, overrides local)
            .add_source(File::from(config_dir.join("config.toml")).required(false))

            // 4. Load from Environment variables (DRYNIGHTS__REMINDERS__LANGUAGE=en)
            .add_source(Environment::with_prefix("DRYNIGHTS").separator("__"));

        let s = builder.build()?;
        Ok(s.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Default Value Tests ====================

    #[test]
    fn test_reminders_config_defaults() {
        let config = RemindersConfig::default();
        assert_eq!(config.poll_interval_secs, 60);
        assert_eq!(config.sound_name, "default");
        assert_eq!(config.relax_track, "relax_music.mp3");
        assert_eq!(config.language, Language::Uz);
    }

    #[test]
    fn test_optional_sections_default_to_none() {
        assert!(NotificationConfig::default().ntfy_topic.is_none());
        assert!(AudioConfig::default().player_command.is_none());
    }

    #[test]
    fn test_storage_default_ends_with_app_dir() {
        let config = StorageConfig::default();
        assert!(config.data_dir.ends_with("dry-nights"));
    }

    // ==================== Config Loading Tests ====================

    #[test]
    fn test_config_load_with_defaults() {
        let config = AppConfig::load().expect("Config should load");

        assert!(config.reminders.poll_interval_secs > 0);
        assert!(!config.reminders.sound_name.is_empty());
        assert!(!config.storage.data_dir.as_os_str().is_empty());
    }

    // ==================== Environment Variable Override Tests ====================

    /// Helper to safely set multiple environment variables in tests.
    fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        // SAFETY: Test environment, variables are unique to this test
        for (key, value) in vars {
            unsafe {
                std::env::set_var(key, value);
            }
        }
        let result = f();
        for (key, _) in vars {
            unsafe {
                std::env::remove_var(key);
            }
        }
        result
    }

    #[test]
    fn test_env_var_overrides_reminders() {
        let vars = [
            ("DRYNIGHTS__REMINDERS__LANGUAGE", "en"),
            ("DRYNIGHTS__REMINDERS__RELAX_TRACK", "rain.ogg"),
        ];

        let config = with_env_vars(&vars, || AppConfig::load().expect("Config should load"));

        assert_eq!(config.reminders.language, Language::En);
        assert_eq!(config.reminders.relax_track, "rain.ogg");
    }

    #[test]
    fn test_env_var_sets_ntfy_topic() {
        let vars = [("DRYNIGHTS__NOTIFICATIONS__NTFY_TOPIC", "dry-nights-test")];

        let config = with_env_vars(&vars, || AppConfig::load().expect("Config should load"));

        assert_eq!(
            config.notifications.ntfy_topic.as_deref(),
            Some("dry-nights-test")
        );
    }
}
