//! Settings persistence using TOML
//!
//! Stored in `settings.toml` under the platform config directory
//! (`~/.config/termtris/` on Linux).

use crate::game::EngineConfig;
use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SETTINGS_FILE: &str = "settings.toml";

/// Game settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub keys: KeyNames,
    pub visual: VisualSettings,
    pub gameplay: GameplaySettings,
    pub audio: AudioSettings,
}

/// Key names per intent, as written in the file.
/// Each entry may be a single name or a list of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyNames {
    #[serde(deserialize_with = "one_or_many")]
    pub move_left: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub move_right: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub soft_drop: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub hard_drop: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub rotate_cw: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub rotate_ccw: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub hold: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub pause: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub restart: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub quit: Vec<String>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(key) => vec![key],
        OneOrMany::Many(keys) => keys,
    })
}

/// Visual settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    /// Ghost piece visibility
    pub show_ghost: bool,
    /// Block style: "solid", "bracket", "round"
    pub block_style: String,
}

/// Timing settings, all in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    /// How long the input poll waits per loop iteration
    pub poll_interval_ms: u64,
    /// Minimum gap between repeats of a movement intent
    pub repeat_ms: u64,
    /// Minimum gap between repeats of pause/hold/hard drop/restart
    pub toggle_ms: u64,
    /// Duration of one row-clear animation step
    pub clear_step_ms: u64,
    /// Fastest allowed gravity interval
    pub min_fall_interval_ms: u64,
}

/// Audio settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub enabled: bool,
    /// SFX volume (0-100)
    pub sfx_volume: u32,
    /// Loop the background melody
    pub music: bool,
    /// Music volume (0-100)
    pub music_volume: u32,
}

impl Default for KeyNames {
    fn default() -> Self {
        fn keys(names: &[&str]) -> Vec<String> {
            names.iter().map(|name| name.to_string()).collect()
        }

        Self {
            move_left: keys(&["Left"]),
            move_right: keys(&["Right"]),
            soft_drop: keys(&["Down"]),
            hard_drop: keys(&["Space"]),
            rotate_cw: keys(&["Up", "x"]),
            rotate_ccw: keys(&["z"]),
            hold: keys(&["c"]),
            pause: keys(&["p", "Esc"]),
            restart: keys(&["r"]),
            quit: keys(&["q"]),
        }
    }
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            show_ghost: true,
            block_style: "solid".to_string(),
        }
    }
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            repeat_ms: 50,
            toggle_ms: 200,
            clear_step_ms: 30,
            min_fall_interval_ms: 100,
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            sfx_volume: 50,
            music: true,
            music_volume: 25,
        }
    }
}

impl Settings {
    /// Platform config directory for this game
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "termtris", "termtris").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Load settings from `dir`, falling back to defaults on any problem
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(SETTINGS_FILE);
        match Self::try_load(&path) {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                tracing::debug!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Ignoring settings at {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path).context("reading settings")?;
        let settings = toml::from_str(&contents).context("parsing settings")?;
        Ok(Some(settings))
    }

    /// Save settings to `dir`, creating it if needed
    pub fn save(&self, dir: &Path) -> anyhow::Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating config dir {}", dir.display()))?;
        let contents = toml::to_string_pretty(self).context("serializing settings")?;
        let path = dir.join(SETTINGS_FILE);
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Engine configuration for a game starting at `starting_level`
    pub fn engine_config(&self, starting_level: u32) -> EngineConfig {
        EngineConfig {
            starting_level,
            show_ghost: self.visual.show_ghost,
            clear_step: Duration::from_millis(self.gameplay.clear_step_ms),
            min_fall_interval: Duration::from_millis(self.gameplay.min_fall_interval_ms),
            ..EngineConfig::default()
        }
    }
}

impl VisualSettings {
    /// Block and ghost characters for the chosen style
    pub fn block_chars(&self) -> (&'static str, &'static str) {
        match self.block_style.as_str() {
            "bracket" => ("[]", ".."),
            "round" => ("()", ".."),
            _ => ("██", "░░"), // "solid" or unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings: Settings = toml::from_str("").expect("parse");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_single_key_or_list() {
        let settings: Settings = toml::from_str(
            r#"
            [keys]
            move_left = "a"
            rotate_cw = ["w", "Up"]
            "#,
        )
        .expect("parse");
        assert_eq!(settings.keys.move_left, vec!["a"]);
        assert_eq!(settings.keys.rotate_cw, vec!["w", "Up"]);
        assert_eq!(settings.keys.quit, vec!["q"]);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [gameplay]
            clear_step_ms = 0
            "#,
        )
        .expect("parse");
        assert_eq!(settings.gameplay.clear_step_ms, 0);
        assert_eq!(settings.gameplay.poll_interval_ms, 10);
        assert!(settings.visual.show_ghost);
    }

    #[test]
    fn test_music_can_be_turned_off() {
        let settings: Settings = toml::from_str(
            r#"
            [audio]
            music = false
            "#,
        )
        .expect("parse");
        assert!(!settings.audio.music);
        assert!(settings.audio.enabled);
        assert_eq!(settings.audio.music_volume, 25);
        assert!(Settings::default().audio.music);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut settings = Settings::default();
        settings.visual.block_style = "bracket".to_string();
        settings.audio.enabled = false;
        settings.save(dir.path()).expect("save");
        assert_eq!(Settings::load(dir.path()), settings);
    }

    #[test]
    fn test_garbage_file_falls_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(SETTINGS_FILE), "[[[ not toml").expect("write");
        assert_eq!(Settings::load(dir.path()), Settings::default());
    }

    #[test]
    fn test_engine_config_from_settings() {
        let mut settings = Settings::default();
        settings.visual.show_ghost = false;
        settings.gameplay.min_fall_interval_ms = 50;
        let config = settings.engine_config(4);
        assert_eq!(config.starting_level, 4);
        assert!(!config.show_ghost);
        assert_eq!(config.min_fall_interval, Duration::from_millis(50));
        assert_eq!(config.clear_step, Duration::from_millis(30));
    }

    #[test]
    fn test_block_chars() {
        let mut visual = VisualSettings::default();
        assert_eq!(visual.block_chars().0, "██");
        visual.block_style = "round".to_string();
        assert_eq!(visual.block_chars(), ("()", ".."));
    }
}
