// src/config.rs
use std::fs;
use std::path::Path;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use crate::drivers::ScopeError;
/// Color used when a config carries an empty palette.
pub const FALLBACK_COLOR: &str = "#2196f3";
const DEFAULT_COLORS: [&str; 6] = [
    "#2196f3", "#f44336", "#4caf50", "#ff9800", "#9c27b0", "#00bcd4",
];
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum YScale {
    /// Leave the Y axis range to the renderer.
    Auto,
    /// Pin the Y axis to `[min, max]`.
    Fixed { min: f64, max: f64 },
}
/// Rendering parameters for one monitor plot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Samples per second of every channel.
    pub sample_rate: f64,
    /// Seconds of history kept and shown on the time axis.
    pub buffer_length: f64,
    pub colors: Vec<String>,
    pub auto_scale: bool,
    pub y_min: f64,
    pub y_max: f64,
    pub title: Option<String>,
    pub x_title: String,
    pub y_title: String,
    /// Display names by channel position; empty entries fall back to the channel name.
    pub legend_names: Vec<String>,
    pub show_legend: bool,
}
impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            sample_rate: 1000.0,
            buffer_length: 10.0,
            colors: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
            auto_scale: true,
            y_min: -10.0,
            y_max: 10.0,
            title: None,
            x_title: "Time (s)".to_owned(),
            y_title: "Voltage (V)".to_owned(),
            legend_names: Vec::new(),
            show_legend: false,
        }
    }
}
impl DisplayConfig {
    /// Maximum retained samples per channel: `floor(buffer_length * sample_rate)`.
    ///
    /// Products within a relative 1e-12 below an integer are treated as that integer
    /// so that values such as `4.35 * 100.0` or `2.01 * 1e7` do not lose a sample to
    /// float representation.
    /// Non-positive or non-finite products give zero.
    pub fn capacity(&self) -> usize {
        let raw = self.buffer_length * self.sample_rate;
        if !raw.is_finite() || raw <= 0.0 {
            return 0;
        }
        (raw + raw * 1e-12).floor() as usize
    }
    pub fn y_scale(&self) -> YScale {
        if self.auto_scale {
            YScale::Auto
        } else {
            YScale::Fixed {
                min: self.y_min,
                max: self.y_max,
            }
        }
    }
    /// Color for the channel at `index`, cycling through the palette.
    pub fn color_for(&self, index: usize) -> &str {
        if self.colors.is_empty() {
            return FALLBACK_COLOR;
        }
        &self.colors[index % self.colors.len()]
    }
    /// Legend name for the channel at `index`.
    pub fn legend_for<'a>(&'a self, index: usize, channel: &'a str) -> &'a str {
        match self.legend_names.get(index) {
            Some(name) if !name.trim().is_empty() => name.as_str(),
            _ => channel,
        }
    }
    pub fn validate(&self) -> Result<(), ScopeError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(ScopeError::InvalidSampleRate(self.sample_rate));
        }
        if !self.buffer_length.is_finite() || self.buffer_length <= 0.0 {
            return Err(ScopeError::InvalidBufferLength(self.buffer_length));
        }
        Ok(())
    }
}
/// How often and how much the monitor pulls from its source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Fetch on every tick whose counter is a multiple of this value.
    pub fetch_interval: u64,
    pub tick_interval_ms: u64,
    pub samples_per_read: usize,
    pub channels: Vec<String>,
}
impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            fetch_interval: 5,
            tick_interval_ms: 200,
            samples_per_read: 500,
            channels: (0..4).map(|i| format!("Dev1/ai{i}")).collect(),
        }
    }
}
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub display: DisplayConfig,
    pub acquisition: AcquisitionConfig,
}
impl MonitorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScopeError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: MonitorConfig = serde_json::from_str(&text)?;
        info!("loaded monitor config from {}", path.display());
        Ok(config)
    }
    /// Loads `path`, falling back to the built-in defaults when the file is
    /// missing or unreadable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    "could not load config from {}: {err}; using defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ScopeError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("saved monitor config to {}", path.display());
        Ok(())
    }
    pub fn validate(&self) -> Result<(), ScopeError> {
        self.display.validate()?;
        if self.acquisition.fetch_interval == 0 {
            return Err(ScopeError::InvalidFetchInterval);
        }
        Ok(())
    }
}
