//! Configuration file management for sbs-merge.
//!
//! Reads/writes `~/.sbs-merge/config.yaml` with the station list, dashboard
//! address, history bounds, and reconnect timing.

use std::path::{Path, PathBuf};

use crate::aircraft::HistoryLimits;
use crate::types::SbsError;

/// Default SBS-1 output port of dump1090 and friends.
pub const DEFAULT_STATION: &str = "localhost:30003";

/// Full configuration structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub stations: Vec<String>,
    pub dashboard: DashboardConfig,
    pub history: HistoryLimits,
    pub reconnect: ReconnectConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,
}

/// Reconnect timing, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectConfig {
    pub initial_ms: u64,
    pub max_ms: u64,
    /// Consecutive failed attempts before a station is abandoned.
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        ReconnectConfig {
            initial_ms: 500,
            max_ms: 30_000,
            max_attempts: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            stations: vec![DEFAULT_STATION.into()],
            dashboard: DashboardConfig {
                host: "127.0.0.1".into(),
                port: 8888,
            },
            history: HistoryLimits::default(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Get the config directory path (`~/.sbs-merge/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".sbs-merge")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `~/.sbs-merge/config.yaml`.
///
/// Returns default config if the file doesn't exist.
pub fn load_config() -> Config {
    load_config_from(&config_file()).unwrap_or_default()
}

/// Load config from an explicit path.
pub fn load_config_from(path: &Path) -> Result<Config, SbsError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| SbsError::Config(format!("{}: {e}", path.display())))?;
    Ok(parse_config(&text))
}

/// Save config to `~/.sbs-merge/config.yaml`.
pub fn save_config(config: &Config) -> Result<PathBuf, SbsError> {
    let path = config_file();
    save_config_to(config, &path)?;
    Ok(path)
}

/// Save config to an explicit path, creating parent directories.
pub fn save_config_to(config: &Config, path: &Path) -> Result<(), SbsError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| SbsError::Config(e.to_string()))?;
    }
    std::fs::write(path, serialize_config(config)).map_err(|e| SbsError::Config(e.to_string()))
}

/// Parse simple YAML-like config text.
///
/// Unknown keys are ignored; malformed values leave the default in place.
fn parse_config(text: &str) -> Config {
    let mut config = Config::default();
    let mut current_section: Option<String> = None;
    let mut stations: Option<Vec<String>> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        // List item under `stations:`
        if let Some(item) = stripped.strip_prefix("- ") {
            if is_indented && current_section.as_deref() == Some("stations") {
                if let Some(v) = parse_string_value(item.trim()) {
                    stations.get_or_insert_with(Vec::new).push(v);
                }
            }
            continue;
        }

        let Some((key, val)) = stripped.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let val = val.trim();

        if !is_indented {
            if val.is_empty() {
                current_section = Some(key.to_string());
                if key == "stations" {
                    stations.get_or_insert_with(Vec::new);
                }
            } else {
                current_section = None;
                // Inline form: `stations: a:30003, b:30003`
                if key == "stations" {
                    stations = Some(split_station_list(val));
                }
            }
            continue;
        }

        let Some(section) = current_section.as_deref() else {
            continue;
        };
        match (section, key) {
            ("dashboard", "host") => {
                if let Some(v) = parse_string_value(val) {
                    config.dashboard.host = v;
                }
            }
            ("dashboard", "port") => {
                if let Ok(v) = val.parse() {
                    config.dashboard.port = v;
                }
            }
            ("history", "dedup_window") => {
                if let Ok(v) = val.parse() {
                    config.history.dedup_window = v;
                }
            }
            ("history", "max_trail") => {
                if let Ok(v) = val.parse() {
                    config.history.max_trail = v;
                }
            }
            ("reconnect", "initial_ms") => {
                if let Ok(v) = val.parse() {
                    config.reconnect.initial_ms = v;
                }
            }
            ("reconnect", "max_ms") => {
                if let Ok(v) = val.parse() {
                    config.reconnect.max_ms = v;
                }
            }
            ("reconnect", "max_attempts") => {
                config.reconnect.max_attempts = parse_string_value(val).and_then(|v| v.parse().ok());
            }
            _ => {}
        }
    }

    if let Some(list) = stations {
        config.stations = list;
    }
    config.history = config.history.clamped();
    config
}

/// Split a comma separated `host:port` list, dropping blanks.
pub fn split_station_list(val: &str) -> Vec<String> {
    val.split(',')
        .filter_map(|s| parse_string_value(s.trim()))
        .collect()
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    // Strip quotes
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

/// Serialize config to YAML-like text.
fn serialize_config(config: &Config) -> String {
    let mut lines = vec!["# sbs-merge configuration".to_string(), String::new()];

    lines.push("stations:".into());
    for station in &config.stations {
        lines.push(format!("  - \"{station}\""));
    }
    lines.push(String::new());

    lines.push("dashboard:".into());
    lines.push(format!("  host: \"{}\"", config.dashboard.host));
    lines.push(format!("  port: {}", config.dashboard.port));
    lines.push(String::new());

    lines.push("history:".into());
    lines.push(format!("  dedup_window: {}", config.history.dedup_window));
    lines.push(format!("  max_trail: {}", config.history.max_trail));
    lines.push(String::new());

    lines.push("reconnect:".into());
    lines.push(format!("  initial_ms: {}", config.reconnect.initial_ms));
    lines.push(format!("  max_ms: {}", config.reconnect.max_ms));
    match config.reconnect.max_attempts {
        Some(n) => lines.push(format!("  max_attempts: {n}")),
        None => lines.push("  max_attempts: null".into()),
    }

    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
