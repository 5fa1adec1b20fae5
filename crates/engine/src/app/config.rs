use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use super::actions::ActionMap;
use super::input::{ScanCode, KEY_CODE_SPACE};

pub const SLOW_FRAME_ENV_VAR: &str = "STG_SLOW_FRAME_MS";
pub const CONFIG_PATH_ENV_VAR: &str = "STG_CONFIG";
pub const DEFAULT_TARGET_FPS: u32 = 60;
const FPS_FLAG_PREFIX: &str = "-fps=";
const FALLBACK_TOGGLE_KEYS: [ScanCode; 12] = [
    ScanCode::F1,
    ScanCode::F2,
    ScanCode::F3,
    ScanCode::F4,
    ScanCode::F5,
    ScanCode::F6,
    ScanCode::F7,
    ScanCode::F8,
    ScanCode::F9,
    ScanCode::F10,
    ScanCode::F11,
    ScanCode::F12,
];

#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_fps: u32,
    pub metrics_log_interval: Duration,
    /// Debug perturbation added to the simulate phase. Not a frame cap.
    pub simulated_slow_frame_ms: u64,
    pub remap_toggle_key: ScanCode,
    pub quit_key: Option<ScanCode>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "STG".to_string(),
            window_width: 1280,
            window_height: 720,
            target_fps: DEFAULT_TARGET_FPS,
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_frame_ms: 0,
            remap_toggle_key: ScanCode::Q,
            quit_key: Some(ScanCode::ESCAPE),
        }
    }
}

/// A rejected configuration value. The previous value stays in effect; none
/// of these stop startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigAnomaly {
    #[error("invalid -fps value '{raw}' (expected a positive integer); keeping {kept}")]
    InvalidFps { raw: String, kept: u32 },
    #[error("unrecognized argument '{arg}'")]
    UnrecognizedArgument { arg: String },
    #[error("invalid {var} value '{value}'; keeping {kept_ms} ms")]
    InvalidSlowFrame {
        var: &'static str,
        value: String,
        kept_ms: u64,
    },
    #[error("unable to read {var}: {reason}")]
    UnreadableEnvVar { var: &'static str, reason: String },
    #[error("failed to read config file {path}: {reason}")]
    ConfigFileRead { path: String, reason: String },
    #[error("failed to parse config file {path} at {field}: {reason}")]
    ConfigFileParse {
        path: String,
        field: String,
        reason: String,
    },
    #[error("config field {field} rejected: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    window_title: Option<String>,
    window_width: Option<u32>,
    window_height: Option<u32>,
    target_fps: Option<u32>,
    metrics_log_interval_ms: Option<u64>,
    simulated_slow_frame_ms: Option<u64>,
    remap_toggle_key: Option<u16>,
    quit_key: Option<u16>,
}

impl LoopConfig {
    /// Defaults, then the JSON file named by [`CONFIG_PATH_ENV_VAR`], then
    /// [`SLOW_FRAME_ENV_VAR`], then command-line flags.
    pub fn resolve<I, S>(args: I) -> (Self, Vec<ConfigAnomaly>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        let mut anomalies = Vec::new();

        match env::var(CONFIG_PATH_ENV_VAR) {
            Ok(path) => anomalies.extend(config.apply_config_file(Path::new(&path))),
            Err(env::VarError::NotPresent) => {}
            Err(err) => anomalies.push(ConfigAnomaly::UnreadableEnvVar {
                var: CONFIG_PATH_ENV_VAR,
                reason: err.to_string(),
            }),
        }

        match env::var(SLOW_FRAME_ENV_VAR) {
            Ok(value) => anomalies.extend(config.apply_slow_frame_value(&value)),
            Err(env::VarError::NotPresent) => {}
            Err(err) => anomalies.push(ConfigAnomaly::UnreadableEnvVar {
                var: SLOW_FRAME_ENV_VAR,
                reason: err.to_string(),
            }),
        }

        anomalies.extend(config.apply_cli_args(args));
        (config, anomalies)
    }

    pub fn target_period(&self) -> Duration {
        target_period_for_rate(self.target_fps)
    }

    /// Recognizes `-fps=<positive integer>`. Anything else is reported and skipped.
    pub fn apply_cli_args<I, S>(&mut self, args: I) -> Vec<ConfigAnomaly>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut anomalies = Vec::new();
        for arg in args {
            let arg = arg.as_ref();
            let Some(raw) = arg.strip_prefix(FPS_FLAG_PREFIX) else {
                anomalies.push(ConfigAnomaly::UnrecognizedArgument {
                    arg: arg.to_string(),
                });
                continue;
            };
            match parse_positive(raw) {
                Some(fps) => self.target_fps = fps,
                None => anomalies.push(ConfigAnomaly::InvalidFps {
                    raw: raw.to_string(),
                    kept: self.target_fps,
                }),
            }
        }
        anomalies
    }

    pub fn apply_slow_frame_value(&mut self, value: &str) -> Option<ConfigAnomaly> {
        match value.trim().parse::<u64>() {
            Ok(ms) => {
                self.simulated_slow_frame_ms = ms;
                None
            }
            Err(_) => Some(ConfigAnomaly::InvalidSlowFrame {
                var: SLOW_FRAME_ENV_VAR,
                value: value.to_string(),
                kept_ms: self.simulated_slow_frame_ms,
            }),
        }
    }

    pub fn apply_config_file(&mut self, path: &Path) -> Vec<ConfigAnomaly> {
        match fs::read_to_string(path) {
            Ok(raw) => self.apply_config_json(&path.display().to_string(), &raw),
            Err(error) => vec![ConfigAnomaly::ConfigFileRead {
                path: path.display().to_string(),
                reason: error.to_string(),
            }],
        }
    }

    /// `origin` only labels anomalies.
    pub fn apply_config_json(&mut self, origin: &str, raw: &str) -> Vec<ConfigAnomaly> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let file = match serde_path_to_error::deserialize::<_, ConfigFile>(&mut deserializer) {
            Ok(file) => file,
            Err(error) => {
                let field = error.path().to_string();
                let source = error.into_inner();
                return vec![ConfigAnomaly::ConfigFileParse {
                    path: origin.to_string(),
                    field: if field.is_empty() { ".".to_string() } else { field },
                    reason: source.to_string(),
                }];
            }
        };
        self.apply_config_file_values(file)
    }

    fn apply_config_file_values(&mut self, file: ConfigFile) -> Vec<ConfigAnomaly> {
        let mut anomalies = Vec::new();

        if let Some(title) = file.window_title {
            self.window_title = title;
        }
        if let Some(width) = file.window_width {
            match non_zero("window_width", width) {
                Ok(width) => self.window_width = width,
                Err(anomaly) => anomalies.push(anomaly),
            }
        }
        if let Some(height) = file.window_height {
            match non_zero("window_height", height) {
                Ok(height) => self.window_height = height,
                Err(anomaly) => anomalies.push(anomaly),
            }
        }
        if let Some(fps) = file.target_fps {
            match non_zero("target_fps", fps) {
                Ok(fps) => self.target_fps = fps,
                Err(anomaly) => anomalies.push(anomaly),
            }
        }
        if let Some(interval_ms) = file.metrics_log_interval_ms {
            match non_zero("metrics_log_interval_ms", interval_ms) {
                Ok(ms) => self.metrics_log_interval = Duration::from_millis(ms),
                Err(anomaly) => anomalies.push(anomaly),
            }
        }
        if let Some(slow_ms) = file.simulated_slow_frame_ms {
            self.simulated_slow_frame_ms = slow_ms;
        }
        if let Some(raw) = file.remap_toggle_key {
            match scancode_field("remap_toggle_key", raw) {
                Ok(code) => self.remap_toggle_key = code,
                Err(anomaly) => anomalies.push(anomaly),
            }
        }
        if let Some(raw) = file.quit_key {
            match scancode_field("quit_key", raw) {
                Ok(code) => self.quit_key = Some(code),
                Err(anomaly) => anomalies.push(anomaly),
            }
        }
        if self.quit_key == Some(self.remap_toggle_key) {
            anomalies.push(ConfigAnomaly::InvalidValue {
                field: "quit_key",
                reason: format!(
                    "{} is also the remap toggle key; quit key disabled",
                    self.remap_toggle_key
                ),
            });
            self.quit_key = None;
        }

        anomalies
    }

    /// Keeps the remap toggle and quit keys off `map`. A colliding toggle key
    /// falls back to the default, then the first free function key; a colliding
    /// quit key falls back to the default or is disabled.
    pub fn reconcile_with_bindings(&mut self, map: &ActionMap) -> Vec<ConfigAnomaly> {
        let defaults = Self::default();
        let mut anomalies = Vec::new();

        if let Some(slot) = map.slot_for_source(self.remap_toggle_key) {
            let rejected = self.remap_toggle_key;
            let quit_key = self.quit_key;
            let fallback = std::iter::once(defaults.remap_toggle_key)
                .chain(FALLBACK_TOGGLE_KEYS)
                .chain((0..KEY_CODE_SPACE as u16).filter_map(ScanCode::new))
                .find(|key| map.slot_for_source(*key).is_none() && quit_key != Some(*key));
            if let Some(fallback) = fallback {
                self.remap_toggle_key = fallback;
                anomalies.push(ConfigAnomaly::InvalidValue {
                    field: "remap_toggle_key",
                    reason: format!(
                        "{rejected} is bound to action slot {}; using {fallback}",
                        slot.0
                    ),
                });
            }
        }

        if let Some(quit_key) = self.quit_key {
            if let Some(slot) = map.slot_for_source(quit_key) {
                let toggle_key = self.remap_toggle_key;
                self.quit_key = defaults.quit_key.filter(|key| {
                    map.slot_for_source(*key).is_none() && *key != toggle_key
                });
                let replacement = match self.quit_key {
                    Some(key) => format!("using {key}"),
                    None => "quit key disabled".to_string(),
                };
                anomalies.push(ConfigAnomaly::InvalidValue {
                    field: "quit_key",
                    reason: format!(
                        "{quit_key} is bound to action slot {}; {replacement}",
                        slot.0
                    ),
                });
            }
        }

        anomalies
    }
}

/// Frame budget for `fps`, rounded to the microsecond. 60 Hz gives 16 667 µs.
pub fn target_period_for_rate(fps: u32) -> Duration {
    let fps = fps.max(1);
    let micros = (1_000_000.0 / fps as f64).round() as u64;
    Duration::from_micros(micros.max(1))
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|value| *value > 0)
}

fn non_zero<T>(field: &'static str, value: T) -> Result<T, ConfigAnomaly>
where
    T: Copy + PartialEq + Default,
{
    if value == T::default() {
        Err(ConfigAnomaly::InvalidValue {
            field,
            reason: "must be greater than zero".to_string(),
        })
    } else {
        Ok(value)
    }
}

fn scancode_field(field: &'static str, raw: u16) -> Result<ScanCode, ConfigAnomaly> {
    ScanCode::new(raw).ok_or_else(|| ConfigAnomaly::InvalidValue {
        field,
        reason: format!("scancode {raw} is outside the key-code space"),
    })
}
