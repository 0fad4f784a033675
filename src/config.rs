use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "VGSALES_CONFIG";

// ---------------------------------------------------------------------------
// DashboardConfig – startup settings
// ---------------------------------------------------------------------------

/// Startup settings for the dashboard. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Sales table loaded at startup.
    pub data_path: PathBuf,
    /// Decorative image shown on the landing page.
    pub image_path: PathBuf,
    /// Number of genres kept by the trend page.
    pub top_n: usize,
    /// Quantile used to cap the trend values.
    pub clip_quantile: f64,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/vgsales_cleaned.csv"),
            image_path: PathBuf::from("data/videogames.png"),
            top_n: 5,
            clip_quantile: 0.95,
            window_width: 1280.0,
            window_height: 860.0,
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config.validated())
    }

    /// Load the file named by `VGSALES_CONFIG`, or fall back to the defaults.
    pub fn from_env() -> Self {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => {
                let path = PathBuf::from(path);
                match Self::load(&path) {
                    Ok(config) => {
                        log::info!("Using configuration from {}", path.display());
                        config
                    }
                    Err(e) => {
                        log::error!("Ignoring configuration: {e:#}");
                        Self::default()
                    }
                }
            }
            None => Self::default(),
        }
    }

    /// Bring out-of-range policy values back into their valid domain.
    pub fn validated(mut self) -> Self {
        if self.top_n == 0 {
            log::warn!("top_n must be at least 1, using 1");
            self.top_n = 1;
        }
        if self.clip_quantile.is_nan() {
            let fallback = Self::default().clip_quantile;
            log::warn!("clip_quantile is NaN, using {fallback}");
            self.clip_quantile = fallback;
        } else if !(0.0..=1.0).contains(&self.clip_quantile) {
            let clamped = self.clip_quantile.clamp(0.0, 1.0);
            log::warn!(
                "clip_quantile {} outside [0, 1], using {clamped}",
                self.clip_quantile
            );
            self.clip_quantile = clamped;
        }
        self
    }

    pub fn policy(&self) -> AggregationPolicy {
        AggregationPolicy {
            top_n: self.top_n,
            clip_quantile: self.clip_quantile,
        }
    }
}

// ---------------------------------------------------------------------------
// AggregationPolicy – tunables handed to the aggregation stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationPolicy {
    pub top_n: usize,
    pub clip_quantile: f64,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        DashboardConfig::default().policy()
    }
}
