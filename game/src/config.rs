use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "STAIRJUMP_CONFIG_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScreenConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl ScreenConfig {
    pub fn center_x(&self) -> f64 {
        self.width / 2.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlatformSpec {
    pub x: f64,
    pub base_y: f64,
    pub amplitude: f64,
    pub frequency_hz: f64,
}

impl PlatformSpec {
    pub const fn new(x: f64, base_y: f64, frequency_hz: f64, amplitude: f64) -> Self {
        Self {
            x,
            base_y,
            amplitude,
            frequency_hz,
        }
    }
}

/// Where the player stands before the first jump. `y` is the standing surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StartSpec {
    pub x: f64,
    pub y: f64,
}

impl Default for StartSpec {
    fn default() -> Self {
        Self { x: 50.0, y: 532.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseConfig {
    pub platform_width: f64,
    pub platform_height: f64,
    #[serde(default)]
    pub start: StartSpec,
    pub platforms: Vec<PlatformSpec>,
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            platform_width: 50.0,
            platform_height: 20.0,
            start: StartSpec::default(),
            platforms: vec![
                PlatformSpec::new(100.0, 50.0, 0.5, 20.0),
                PlatformSpec::new(250.0, 120.0, 1.0, 30.0),
                PlatformSpec::new(400.0, 200.0, 1.5, 25.0),
                PlatformSpec::new(550.0, 280.0, 2.0, 15.0),
                PlatformSpec::new(700.0, 360.0, 2.5, 10.0),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TriggerConfig {
    /// Vertical gesture position below which a jump fires (screen units).
    pub jump_threshold: f64,
    /// Minimum seconds between any two accepted gestures.
    pub cooldown_sec: f64,
    /// Rightward frame-to-frame horizontal delta that counts as a swipe.
    pub swipe_threshold: f64,
    /// Gap above `jump_threshold` the hand must clear before re-arming.
    pub hysteresis: f64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            jump_threshold: 200.0,
            cooldown_sec: 0.5,
            swipe_threshold: 40.0,
            hysteresis: 40.0,
        }
    }
}

impl TriggerConfig {
    pub fn sanitized(mut self) -> Self {
        self.jump_threshold = finite_or(self.jump_threshold, 200.0);
        self.cooldown_sec = finite_or(self.cooldown_sec, 0.5).max(0.0);
        self.swipe_threshold = finite_or(self.swipe_threshold, 40.0).max(0.0);
        self.hysteresis = finite_or(self.hysteresis, 40.0).max(0.0);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct JumpConfig {
    pub duration_sec: f64,
    /// Allowed horizontal miss between the player and the target's center.
    pub landing_tolerance: f64,
    /// When set, landing also requires the player to be this close to the
    /// target's current surface.
    #[serde(default)]
    pub landing_vertical_tolerance: Option<f64>,
    pub gravity: f64,
    /// How far below the screen a falling player must drop before the run is lost.
    pub fall_margin: f64,
    pub player_radius: f64,
    /// Gesture width to jump strength factor.
    pub strength_per_width: f64,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            duration_sec: 0.28,
            landing_tolerance: 2.0,
            landing_vertical_tolerance: None,
            gravity: 1800.0,
            fall_margin: 100.0,
            player_radius: 12.0,
            strength_per_width: 2.0,
        }
    }
}

impl JumpConfig {
    pub fn sanitized(mut self) -> Self {
        let duration = finite_or(self.duration_sec, 0.28);
        self.duration_sec = if duration > 0.0 { duration } else { 0.28 };
        self.landing_tolerance = finite_or(self.landing_tolerance, 2.0).max(0.0);
        self.landing_vertical_tolerance = self
            .landing_vertical_tolerance
            .filter(|t| t.is_finite())
            .map(|t| t.max(0.0));
        let gravity = finite_or(self.gravity, 1800.0);
        self.gravity = if gravity > 0.0 { gravity } else { 1800.0 };
        self.fall_margin = finite_or(self.fall_margin, 100.0).max(0.0);
        self.player_radius = finite_or(self.player_radius, 12.0).max(0.0);
        self.strength_per_width = finite_or(self.strength_per_width, 2.0);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub max_dt: f64,
    pub target_hz: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_dt: engine::clock::DEFAULT_MAX_DT,
            target_hz: engine::clock::DEFAULT_TARGET_HZ,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub screen: ScreenConfig,
    #[serde(default)]
    pub course: CourseConfig,
    #[serde(default)]
    pub trigger: TriggerConfig,
    #[serde(default)]
    pub jump: JumpConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            screen: ScreenConfig::default(),
            course: CourseConfig::default(),
            trigger: TriggerConfig::default(),
            jump: JumpConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        let screen = ScreenConfig::default();
        if !(self.screen.width.is_finite() && self.screen.width > 0.0) {
            self.screen.width = screen.width;
        }
        if !(self.screen.height.is_finite() && self.screen.height > 0.0) {
            self.screen.height = screen.height;
        }
        self.trigger = self.trigger.sanitized();
        self.jump = self.jump.sanitized();
        self.simulation.max_dt = finite_or(self.simulation.max_dt, engine::clock::DEFAULT_MAX_DT)
            .max(0.0);
        self.simulation.target_hz = self.simulation.target_hz.clamp(1, 1000);
        self
    }

    /// Hard errors that sanitizing can't repair.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let course = &self.course;
        if course.platforms.is_empty() {
            return Err(ConfigError::Invalid("course has no platforms".to_string()));
        }
        if !(course.platform_width.is_finite() && course.platform_width > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "platform width must be positive, got {}",
                course.platform_width
            )));
        }
        for (i, p) in course.platforms.iter().enumerate() {
            let values = [p.x, p.base_y, p.amplitude, p.frequency_hz];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "platform {i} has a non-finite field"
                )));
            }
        }
        for pair in course.platforms.windows(2) {
            if pair[1].x <= pair[0].x {
                return Err(ConfigError::Invalid(format!(
                    "platforms must be ordered by ascending x ({} then {})",
                    pair[0].x, pair[1].x
                )));
            }
        }
        Ok(())
    }
}

fn default_version() -> u32 {
    1
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os(CONFIG_PATH_ENV) {
            return Self::new(explicit);
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".config");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("stairjump");
        path.push("config.json");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn try_load(&self) -> Result<GameConfig, ConfigError> {
        let bytes = fs::read(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        let config = serde_json::from_slice::<GameConfig>(&bytes)
            .map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })?
            .sanitized();
        config.validate()?;
        Ok(config)
    }

    /// Loads the config, falling back to defaults on any failure.
    pub fn load(&self) -> GameConfig {
        match self.try_load() {
            Ok(config) => config,
            Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", self.path.display());
                GameConfig::default()
            }
            Err(err) => {
                log::warn!("{err}; using default config");
                GameConfig::default()
            }
        }
    }

    pub fn save(&self, config: &GameConfig) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let text = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, text).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn unique_temp_path(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("stairjump_config_{tag}_{nanos}.json"))
    }

    #[test]
    fn default_course_matches_five_stairs() {
        let course = CourseConfig::default();
        assert_eq!(course.platforms.len(), 5);
        assert_eq!(course.platforms[1], PlatformSpec::new(250.0, 120.0, 1.0, 30.0));
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn sanitized_repairs_out_of_range_fields() {
        let config = GameConfig {
            version: 42,
            screen: ScreenConfig {
                width: 0.0,
                height: f64::NAN,
            },
            trigger: TriggerConfig {
                cooldown_sec: -3.0,
                hysteresis: -1.0,
                ..TriggerConfig::default()
            },
            jump: JumpConfig {
                duration_sec: 0.0,
                gravity: -5.0,
                landing_vertical_tolerance: Some(f64::INFINITY),
                ..JumpConfig::default()
            },
            ..GameConfig::default()
        }
        .sanitized();

        assert_eq!(config.version, 1);
        assert_eq!(config.screen, ScreenConfig::default());
        assert_eq!(config.trigger.cooldown_sec, 0.0);
        assert_eq!(config.trigger.hysteresis, 0.0);
        assert_eq!(config.jump.duration_sec, 0.28);
        assert_eq!(config.jump.gravity, 1800.0);
        assert_eq!(config.jump.landing_vertical_tolerance, None);

        let zero_gravity = JumpConfig {
            gravity: 0.0,
            ..JumpConfig::default()
        }
        .sanitized();
        assert_eq!(zero_gravity.gravity, 1800.0);
    }

    #[test]
    fn validate_rejects_empty_and_unordered_courses() {
        let mut config = GameConfig::default();
        config.course.platforms.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = GameConfig::default();
        config.course.platforms.swap(0, 1);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn serde_defaults_fill_missing_sections() {
        let parsed: GameConfig =
            serde_json::from_str(r#"{"version":1,"trigger":{"jump_threshold":150.0,"cooldown_sec":0.2,"swipe_threshold":30.0,"hysteresis":10.0}}"#)
                .expect("config JSON should parse");
        assert_eq!(parsed.trigger.jump_threshold, 150.0);
        assert_eq!(parsed.jump, JumpConfig::default());
        assert_eq!(parsed.course, CourseConfig::default());
    }

    #[test]
    fn store_save_then_load_roundtrips() {
        let path = unique_temp_path("roundtrip");
        let store = ConfigStore::new(&path);
        let mut config = GameConfig::default();
        config.trigger.cooldown_sec = 0.75;
        config.jump.landing_vertical_tolerance = Some(6.0);

        store.save(&config).expect("save config");
        let loaded = store.try_load().expect("load config");
        assert_eq!(loaded, config);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn store_load_falls_back_on_garbage() {
        let path = unique_temp_path("garbage");
        fs::write(&path, "not json").expect("write fixture");
        let store = ConfigStore::new(&path);

        assert!(matches!(store.try_load(), Err(ConfigError::Parse { .. })));
        assert_eq!(store.load(), GameConfig::default());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn store_load_missing_file_is_default() {
        let store = ConfigStore::new(unique_temp_path("missing"));
        assert_eq!(store.load(), GameConfig::default());
    }
}
