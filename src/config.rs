// Styling defaults loaded from an optional TOML file

use crate::classify::MAX_CLASSES;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// File looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "geostyle.toml";

/// Fallback settings for any option a command leaves out
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Ramp for graduated styles (sequential or diverging name)
    pub palette: String,
    /// Ramp for categorized styles
    pub qualitative_palette: String,
    /// Ramp for heat gradients
    pub heatmap_palette: String,
    /// Class count for graduated styles, `1..=MAX_CLASSES`
    pub classes: usize,
    pub method: String,
    /// Simplification tolerance in coordinate units
    pub tolerance: f64,
    pub invert: bool,
    /// Dash pattern for the unsimplified path in charts, e.g. "4,4"
    pub original_dash: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            palette: "Viridis".to_string(),
            qualitative_palette: "Set1".to_string(),
            heatmap_palette: "Classic".to_string(),
            classes: 5,
            method: "equal_interval".to_string(),
            tolerance: 0.0001,
            invert: false,
            original_dash: "4,4".to_string(),
        }
    }
}

impl Defaults {
    pub fn from_toml(content: &str) -> Result<Self> {
        let defaults: Defaults = toml::from_str(content).context("Failed to parse config")?;
        if defaults.classes == 0 || defaults.classes > MAX_CLASSES {
            anyhow::bail!(
                "classes must be between 1 and {}, got {}",
                MAX_CLASSES,
                defaults.classes
            );
        }
        Ok(defaults)
    }
}

/// Load defaults. An explicit `path` must exist and parse; without one,
/// `geostyle.toml` in the working directory is used when present, and a
/// broken file there only produces a warning.
pub fn load(path: Option<&Path>) -> Result<Defaults> {
    if let Some(path) = path {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let defaults = Defaults::from_toml(&content)
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        return Ok(defaults);
    }

    let fallback = Path::new(DEFAULT_CONFIG_FILE);
    let content = match std::fs::read_to_string(fallback) {
        Ok(content) => content,
        Err(_) => return Ok(Defaults::default()),
    };
    match Defaults::from_toml(&content) {
        Ok(defaults) => {
            tracing::debug!(path = DEFAULT_CONFIG_FILE, "loaded config");
            Ok(defaults)
        }
        Err(err) => {
            tracing::warn!(path = DEFAULT_CONFIG_FILE, error = %format!("{:#}", err), "ignoring invalid config");
            Ok(Defaults::default())
        }
    }
}
