//! Pipeline configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a user file only needs the keys it wants to override.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [media]
//! url_base = "/api/media/file"  # Public URL prefix stored in variant metadata
//!
//! [images]
//! quality = 85                  # Default quality for variants without their own (1-100)
//! backend = "auto"              # auto | native | portable
//! max_output_pixels = 40000000  # Largest variant area; bigger variants are skipped
//!
//! [store]
//! root = "media"                # Directory used by the filesystem object store
//!
//! [processing]
//! max_processes = 4             # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{BackendChoice, DEFAULT_MAX_OUTPUT_PIXELS, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Pipeline configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Public URL settings.
    pub media: MediaConfig,
    /// Encoding defaults and backend choice.
    pub images: ImagesConfig,
    /// Filesystem object store settings.
    pub store: StoreConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl PipelineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.images.quality) {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.images.max_output_pixels == 0 {
            return Err(ConfigError::Validation(
                "images.max_output_pixels must be at least 1".into(),
            ));
        }
        if self.store.root.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store.root must not be empty".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn default_quality(&self) -> Quality {
        Quality::new(self.images.quality)
    }
}

/// Public URL settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaConfig {
    /// Prefix joined with each variant filename to form its public URL.
    pub url_base: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            url_base: "/api/media/file".to_string(),
        }
    }
}

/// Encoding defaults and backend choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Quality for catalog entries that do not set their own.
    pub quality: u32,
    /// Codec backend: `auto` probes for the native path.
    pub backend: BackendChoice,
    /// Largest output area (width × height) a variant may have. Variants
    /// above it are skipped instead of allocated.
    pub max_output_pixels: u64,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            quality: 85,
            backend: BackendChoice::Auto,
            max_output_pixels: DEFAULT_MAX_OUTPUT_PIXELS,
        }
    }
}

/// Filesystem object store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub root: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: "media".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel variant workers.
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
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(PipelineConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
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

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<PipelineConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PipelineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# media-variants configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Public URLs
# ---------------------------------------------------------------------------
[media]
# Prefix joined with each variant filename to form the URL stored in the
# variant metadata. Use a bucket's public origin to link objects directly.
url_base = "/api/media/file"

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[images]
# Quality (1-100) for variants that do not set their own. JPEG only; PNG and
# WebP variants are lossless.
quality = 85

# Codec backend. "auto" uses the native path when available and falls back
# to the portable codecs otherwise.
backend = "auto"

# Largest variant area in pixels (width x height). A variant that would be
# bigger, e.g. the auto-height sizes of a very long strip, is skipped and
# logged instead of allocated.
max_output_pixels = 40000000

# ---------------------------------------------------------------------------
# Object store
# ---------------------------------------------------------------------------
[store]
# Directory the filesystem store writes originals and variants into.
root = "media"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel variant workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.media.url_base, "/api/media/file");
        assert_eq!(config.images.quality, 85);
        assert_eq!(config.images.backend, BackendChoice::Auto);
        assert_eq!(config.images.max_output_pixels, 40_000_000);
        assert_eq!(config.store.root, "media");
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[images]
backend = "portable"
"#;
        let config: PipelineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.images.backend, BackendChoice::Portable);
        assert_eq!(config.images.quality, 85);
        assert_eq!(config.media.url_base, "/api/media/file");
    }

    #[test]
    fn unknown_keys_rejected() {
        let toml = r#"
[images]
qualty = 70
"#;
        let result: Result<PipelineConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_quality() {
        let mut config = PipelineConfig::default();
        config.images.quality = 0;
        assert!(config.validate().is_err());
        config.images.quality = 101;
        assert!(config.validate().is_err());
        config.images.quality = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_pixel_budget() {
        let mut config = PipelineConfig::default();
        config.images.max_output_pixels = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parse_pixel_budget() {
        let config: PipelineConfig =
            toml::from_str("[images]\nmax_output_pixels = 1000\n").unwrap();
        assert_eq!(config.images.max_output_pixels, 1000);
        assert_eq!(config.images.quality, 85);
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let mut config = PipelineConfig::default();
        config.processing.max_processes = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn merge_overlays_nested_tables() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str("[media]\nurl_base = \"https://cdn\"").unwrap();
        let merged = merge_toml(base, overlay);
        let config: PipelineConfig = merged.try_into().unwrap();
        assert_eq!(config.media.url_base, "https://cdn");
        assert_eq!(config.store.root, "media");
    }

    #[test]
    fn load_config_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config.images.quality, 85);
    }

    #[test]
    fn load_config_reads_and_validates_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[images]\nquality = 150\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Validation(_))
        ));

        fs::write(&path, "[store]\nroot = \"out\"\n").unwrap();
        assert_eq!(load_config(&path).unwrap().store.root, "out");
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: PipelineConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config.images.quality, 85);
        assert_eq!(config.media.url_base, "/api/media/file");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn effective_threads_caps_at_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = ProcessingConfig {
            max_processes: Some(10_000),
        };
        assert_eq!(effective_threads(&config), cores);
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }
}
