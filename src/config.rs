//! Engine settings and their YAML persistence.
//!
//! Every field has a default, so a settings file only needs to name the
//! values it overrides:
//!
//! ```yaml
//! top_categories: 15
//! trend_change_percent: 10.0
//! palette:
//!   bar: "#1f77b4"
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_CATEGORIES: usize = 10;
pub const DEFAULT_OUTLIER_Z_THRESHOLD: f64 = 3.0;
pub const DEFAULT_TREND_MIN_VALUES: usize = 10;
pub const DEFAULT_TREND_CHANGE_PERCENT: f64 = 20.0;
pub const DEFAULT_MAX_INSIGHTS: usize = 5;
pub const DEFAULT_PREVIEW_ROWS: usize = 1000;
pub const DEFAULT_MAX_INPUT_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Number of categories kept in the simple-style bar chart.
    pub top_categories: usize,
    /// Minimum z-score of a column maximum before it is reported as an outlier.
    pub outlier_z_threshold: f64,
    /// A column needs strictly more values than this for trend detection.
    pub trend_min_values: usize,
    /// Absolute half-over-half change (percent) that counts as a trend.
    pub trend_change_percent: f64,
    pub max_insights: usize,
    pub preview_rows: usize,
    /// Extra cell tokens treated as missing, compared after trimming.
    pub missing_tokens: Vec<String>,
    pub max_input_bytes: usize,
    pub palette: Palette,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            top_categories: DEFAULT_TOP_CATEGORIES,
            outlier_z_threshold: DEFAULT_OUTLIER_Z_THRESHOLD,
            trend_min_values: DEFAULT_TREND_MIN_VALUES,
            trend_change_percent: DEFAULT_TREND_CHANGE_PERCENT,
            max_insights: DEFAULT_MAX_INSIGHTS,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            missing_tokens: Vec::new(),
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            palette: Palette::default(),
        }
    }
}

impl EngineSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Opening settings file {path:?}"))?;
        Self::from_yaml_str(&raw).with_context(|| format!("Parsing settings file {path:?}"))
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Marker colors handed to renderers as minimal visual hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub bar: String,
    pub histogram: String,
    pub scatter: String,
    pub scatter_opacity: f64,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bar: "#5e30eb".to_string(),
            histogram: "#52d6fc".to_string(),
            scatter: "#d946ef".to_string(),
            scatter_opacity: 0.6,
        }
    }
}
