//! Configuration module.
//!
//! Handles loading, validating, and merging `squeezepic.toml`. Configuration
//! is layered: stock defaults are overridden by the config file, which is
//! overridden by command-line flags.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [compression]
//! target_width = 400        # Output width in pixels (height keeps aspect)
//! start_quality = 60        # First WebP quality tried, percent
//! quality_step = 5          # Quality decrease per attempt, percent
//! quality_floor = 5         # Stop before quality reaches this, percent
//! size_budget_kb = 50       # Largest acceptable output, KiB
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::imaging::{CompressConfig, QualityLevel, SizeBudget};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "squeezepic.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration loaded from `squeezepic.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Compression loop settings (width, quality schedule, budget).
    pub compression: CompressionConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

/// Largest budget whose byte count still fits in a `u64`.
const MAX_BUDGET_KB: u64 = u64::MAX / 1024;

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.compression;
        if c.start_quality == 0 || c.start_quality > 100 {
            return Err(ConfigError::Validation(
                "compression.start_quality must be 1-100".into(),
            ));
        }
        if c.size_budget_kb == 0 {
            return Err(ConfigError::Validation(
                "compression.size_budget_kb must be non-zero".into(),
            ));
        }
        if c.size_budget_kb > MAX_BUDGET_KB {
            return Err(ConfigError::Validation(format!(
                "compression.size_budget_kb must be at most {MAX_BUDGET_KB}"
            )));
        }
        c.to_compress_config()
            .validate()
            .map_err(|e| ConfigError::Validation(format!("compression: {e}")))
    }
}

/// Compression loop settings. Qualities are whole percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    pub target_width: u32,
    pub start_quality: u32,
    pub quality_step: u32,
    pub quality_floor: u32,
    pub size_budget_kb: u64,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            target_width: 400,
            start_quality: 60,
            quality_step: 5,
            quality_floor: 5,
            size_budget_kb: 50,
        }
    }
}

impl CompressionConfig {
    pub fn to_compress_config(&self) -> CompressConfig {
        CompressConfig {
            target_width: self.target_width,
            start_quality: QualityLevel::from_percent(self.start_quality),
            quality_step: self.quality_step,
            quality_floor: self.quality_floor,
            budget: SizeBudget::from_kb(self.size_budget_kb),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel compression workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value. `Ok(None)` if it doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge each overlay onto `base` in order, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = overlays.into_iter().fold(base, merge_toml);
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let overlay = load_raw_config(path)?;
    resolve_config(stock_defaults_value(), overlay)
}

/// Command-line overrides, applied on top of the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub target_width: Option<u32>,
    pub size_budget_kb: Option<u64>,
}

impl Overrides {
    /// As a sparse TOML overlay; `None` when nothing is overridden.
    pub fn to_toml(&self) -> Option<toml::Value> {
        let mut compression = toml::map::Map::new();
        if let Some(width) = self.target_width {
            compression.insert("target_width".into(), toml::Value::Integer(width.into()));
        }
        if let Some(kb) = self.size_budget_kb {
            let kb = i64::try_from(kb).unwrap_or(i64::MAX);
            compression.insert("size_budget_kb".into(), toml::Value::Integer(kb));
        }
        if compression.is_empty() {
            return None;
        }
        let mut root = toml::map::Map::new();
        root.insert("compression".into(), toml::Value::Table(compression));
        Some(toml::Value::Table(root))
    }
}

/// Stock defaults ← config file ← command-line overrides.
pub fn load_config_with_overrides(
    path: &Path,
    overrides: &Overrides,
) -> Result<Config, ConfigError> {
    let file = load_raw_config(path)?;
    resolve_config(
        stock_defaults_value(),
        file.into_iter().chain(overrides.to_toml()),
    )
}

/// Returns a fully-commented stock `squeezepic.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# squeezepic configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Compression
# ---------------------------------------------------------------------------
[compression]
# Every output is resized to exactly this width; height keeps the aspect ratio.
target_width = 400

# WebP quality of the first attempt, in percent (60 = 0.60).
start_quality = 60

# Each attempt that is still over budget lowers the quality by this much.
quality_step = 5

# Attempts stop before quality reaches this value. If nothing fit the budget
# by then, the last attempt is kept anyway.
quality_floor = 5

# Largest acceptable output size in KiB (1 KiB = 1024 bytes).
size_budget_kb = 50

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers. Omit to use all CPU cores.
# max_processes = 4
"##
}
