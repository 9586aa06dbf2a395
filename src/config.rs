//! Application configuration

use anyhow::{bail, Context, Result};
use roomex_core::RoomConfig;
use roomex_experiment::source::DEFAULT_TRIAL_PATH;
use roomex_experiment::SequencerConfig;
use roomex_scene::MovementStep;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from the environment (and `.env`)
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Experiment server root
    pub api_base_url: String,
    /// Path of the trial endpoint under `api_base_url`
    pub trial_path: String,
    pub trial_type: String,
    /// Texture server root
    pub asset_base_url: String,
    pub fetch_timeout: Duration,
    /// Exposure of the first trial in every batch
    pub practice_duration_ms: u64,
    /// TTF/OTF used for on-screen text; screens are text-free without it
    pub font_path: Option<PathBuf>,
    /// Shows this single room instead of running the experiment
    pub dev_room: Option<RoomConfig>,
    pub movement: MovementStep,
    pub windowed: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let sequencer = SequencerConfig::default();
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            trial_path: DEFAULT_TRIAL_PATH.to_string(),
            trial_type: sequencer.trial_type,
            asset_base_url: "http://127.0.0.1:9000".to_string(),
            fetch_timeout: sequencer.fetch_timeout,
            practice_duration_ms: sequencer.practice_duration_ms,
            font_path: None,
            dev_room: None,
            movement: MovementStep::default(),
            windowed: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`], reading variables through `var`.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let var = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let fetch_timeout = match var("ROOMEX_FETCH_TIMEOUT_MS") {
            Some(ms) => Duration::from_millis(
                ms.parse()
                    .context("ROOMEX_FETCH_TIMEOUT_MS must be a number of milliseconds")?,
            ),
            None => defaults.fetch_timeout,
        };
        let practice_duration_ms = match var("ROOMEX_PRACTICE_DURATION_MS") {
            Some(ms) => ms
                .parse()
                .context("ROOMEX_PRACTICE_DURATION_MS must be a number of milliseconds")?,
            None => defaults.practice_duration_ms,
        };
        let dev_room = match var("ROOMEX_DEV_ROOM") {
            Some(json) => {
                let room: RoomConfig =
                    serde_json::from_str(&json).context("ROOMEX_DEV_ROOM must be a room JSON object")?;
                room.validate().context("ROOMEX_DEV_ROOM is not a valid room")?;
                Some(room)
            }
            None => None,
        };
        let movement = match var("ROOMEX_MOVEMENT").as_deref() {
            None | Some("per-second") => defaults.movement,
            Some("per-frame") => MovementStep::PerFrame(0.05),
            Some(other) => bail!("ROOMEX_MOVEMENT must be `per-second` or `per-frame`, got `{other}`"),
        };
        let windowed = matches!(
            var("ROOMEX_WINDOWED").as_deref(),
            Some("1" | "true" | "yes")
        );

        Ok(Self {
            api_base_url: var("ROOMEX_API_BASE_URL").unwrap_or(defaults.api_base_url),
            trial_path: var("ROOMEX_TRIAL_PATH").unwrap_or(defaults.trial_path),
            trial_type: var("ROOMEX_TRIAL_TYPE").unwrap_or(defaults.trial_type),
            asset_base_url: var("ROOMEX_ASSET_BASE_URL").unwrap_or(defaults.asset_base_url),
            fetch_timeout,
            practice_duration_ms,
            font_path: var("ROOMEX_FONT_PATH").map(PathBuf::from),
            dev_room,
            movement,
            windowed,
        })
    }

    pub fn sequencer(&self) -> SequencerConfig {
        SequencerConfig {
            trial_type: self.trial_type.clone(),
            practice_duration_ms: self.practice_duration_ms,
            fetch_timeout: self.fetch_timeout,
            ..SequencerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_vars(|k| vars.get(k).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.trial_path, "/api/make_or_get_trial");
        assert_eq!(config.trial_type, "T");
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.practice_duration_ms, 6000);
        assert!(!config.windowed);
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("ROOMEX_API_BASE_URL", "http://lab:8080"),
            ("ROOMEX_TRIAL_TYPE", "S"),
            ("ROOMEX_FETCH_TIMEOUT_MS", "2500"),
            ("ROOMEX_PRACTICE_DURATION_MS", "3000"),
            ("ROOMEX_MOVEMENT", "per-frame"),
            ("ROOMEX_WINDOWED", "1"),
            ("ROOMEX_FONT_PATH", "/usr/share/fonts/DejaVuSans.ttf"),
        ])
        .unwrap();
        assert_eq!(config.api_base_url, "http://lab:8080");
        assert_eq!(config.movement, MovementStep::PerFrame(0.05));
        assert!(config.windowed);
        assert!(config.font_path.is_some());

        let sequencer = config.sequencer();
        assert_eq!(sequencer.trial_type, "S");
        assert_eq!(sequencer.fetch_timeout, Duration::from_millis(2500));
        assert_eq!(sequencer.practice_duration_ms, 3000);
        assert_eq!(sequencer.helper_trials, 3);
    }

    #[test]
    fn dev_room_is_parsed_and_validated() {
        let config = load(&[("ROOMEX_DEV_ROOM", r#"{"width": 8, "height": 3, "depth": 5}"#)]).unwrap();
        let room = config.dev_room.unwrap();
        assert_eq!((room.width, room.height, room.depth), (8.0, 3.0, 5.0));
        assert_eq!(room.wall, 0);

        assert!(load(&[("ROOMEX_DEV_ROOM", r#"{"width": 0, "height": 3, "depth": 5}"#)]).is_err());
        assert!(load(&[("ROOMEX_DEV_ROOM", "not json")]).is_err());
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(load(&[("ROOMEX_FETCH_TIMEOUT_MS", "soon")]).is_err());
        assert!(load(&[("ROOMEX_MOVEMENT", "teleport")]).is_err());
    }

    #[test]
    fn blank_values_fall_back() {
        let config = load(&[("ROOMEX_TRIAL_TYPE", "  "), ("ROOMEX_DEV_ROOM", "")]).unwrap();
        assert_eq!(config.trial_type, "T");
        assert!(config.dev_room.is_none());
    }
}
