//! Settings file handling.
//!
//! Settings live in a sparse `texprep.toml`. Stock defaults are the base
//! layer; whatever the user file contains is merged on top, then the result
//! is deserialized and validated. Command-line flags are applied last, by
//! the CLI.
//!
//! ## Config File Location
//!
//! `--config FILE` names the file explicitly (it must exist). Without the
//! flag, `texprep.toml` in the working directory is used when present.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! output_dir = "output"     # Where processed files are written
//! suffix = "_u"             # Appended to every output stem
//! format = "original"       # original | png | jpg | jpeg | webp | tiff
//! quality = 95              # JPEG quality (1-100)
//!
//! [resize]
//! # max_width = 2048        # Cap applied before rounding (>= 4)
//! # max_height = 2048
//! # preserve_aspect_ratio = true  # Defaults to true when a cap is set
//!
//! [cache]
//! capacity = 0              # Decoded images kept in memory (0 = off)
//!
//! [scan]
//! extensions = ["png", "jpg", "jpeg", "psd", "pdf", "ai"]
//! ```
//!
//! ## Partial Configuration
//!
//! ```toml
//! # Unity-style import caps, everything else stock
//! [resize]
//! max_width = 2048
//! max_height = 2048
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{NormalizationPolicy, OutputFormat};
use crate::scan::DEFAULT_SCAN_EXTENSIONS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILENAME: &str = "texprep.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Settings loaded from `texprep.toml`.
///
/// All fields have defaults. User files need only specify the values they
/// want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Output directory, created if missing.
    pub output_dir: PathBuf,
    /// Inserted between the sanitized stem and the extension.
    pub suffix: String,
    pub format: OutputFormat,
    /// JPEG quality (1-100).
    pub quality: u32,
    pub resize: ResizeConfig,
    pub cache: CacheConfig,
    pub scan: ScanConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            suffix: "_u".to_string(),
            format: OutputFormat::Original,
            quality: 95,
            resize: ResizeConfig::default(),
            cache: CacheConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl Settings {
    /// Validate semantic constraints that serde can't express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Validation(format!(
                "quality must be between 1 and 100, got {}",
                self.quality
            )));
        }
        if self.suffix.contains(['/', '\\']) {
            return Err(ConfigError::Validation(format!(
                "suffix must not contain path separators: {:?}",
                self.suffix
            )));
        }
        self.resize
            .to_policy()
            .validate()
            .map_err(|e| ConfigError::Validation(format!("resize: {e}")))?;
        if self.scan.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "scan.extensions must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Size caps and aspect handling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_aspect_ratio: Option<bool>,
}

impl ResizeConfig {
    pub fn to_policy(&self) -> NormalizationPolicy {
        NormalizationPolicy {
            max_width: self.max_width,
            max_height: self.max_height,
            preserve_aspect_ratio: self.preserve_aspect_ratio,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Number of decoded images kept in memory. `0` disables the cache.
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Extensions picked up when scanning directories, without the dot.
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_SCAN_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default settings as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(Settings::default())?)
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

/// Read a settings file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Settings, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let settings: Settings = merged.try_into()?;
    settings.validate()?;
    Ok(settings)
}

/// Path of the settings file to load, if any.
///
/// An explicit path is returned as-is; otherwise `texprep.toml` in `cwd` is
/// used when it exists.
pub fn config_path(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let candidate = cwd.join(CONFIG_FILENAME);
            candidate.is_file().then_some(candidate)
        }
    }
}

/// Load settings: stock defaults, overlaid with the settings file if one is
/// found, validated.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<Settings, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = config_path(explicit, cwd)
        .map(|path| load_raw_config(&path))
        .transpose()?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `texprep.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# texprep Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# texprep reads ./texprep.toml when it exists, or the file passed with
# --config. Command-line flags override values from this file.
# Unknown keys will cause an error.

# Directory processed files are written to. Created if missing.
output_dir = "output"

# Appended to every sanitized file stem: "Hero Idle.png" -> "Hero_Idle_u.png".
# Must not contain path separators.
suffix = "_u"

# Output container.
#   original  keep the source format and extension
#   png, jpg, jpeg, webp, tiff  re-encode and use that extension
format = "original"

# JPEG encoding quality (1 = worst, 100 = best). Other formats are lossless.
quality = 95

# ---------------------------------------------------------------------------
# Resizing
# ---------------------------------------------------------------------------
# Every output side is rounded to the nearest multiple of 4 and never moves
# more than 4 pixels from its (capped) size.
[resize]
# Caps applied before rounding. Must be at least 4. Unset = unbounded.
# 2048 matches the default Unity texture import limit.
# max_width = 2048
# max_height = 2048

# Scale the other side when a cap kicks in, and repair aspect drift after
# rounding. Defaults to true when a cap is set, false otherwise.
# preserve_aspect_ratio = true

# ---------------------------------------------------------------------------
# Decode cache
# ---------------------------------------------------------------------------
[cache]
# Number of decoded images kept in memory, keyed by file content.
# Helps when the same image appears several times in one batch. 0 = off.
capacity = 0

# ---------------------------------------------------------------------------
# Directory scanning
# ---------------------------------------------------------------------------
[scan]
# Extensions picked up when a directory is given as input (case-insensitive).
# psd, pdf and ai are listed but cannot be decoded; they are reported as
# unsupported when processed.
extensions = ["png", "jpg", "jpeg", "psd", "pdf", "ai"]
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.output_dir, PathBuf::from("output"));
        assert_eq!(settings.suffix, "_u");
        assert_eq!(settings.format, OutputFormat::Original);
        assert_eq!(settings.quality, 95);
        assert_eq!(settings.cache.capacity, 0);
        assert_eq!(
            settings.scan.extensions,
            vec!["png", "jpg", "jpeg", "psd", "pdf", "ai"]
        );
        assert_eq!(settings.resize.to_policy(), NormalizationPolicy::unbounded());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
suffix = "-tex"

[resize]
max_width = 2048
"#;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.suffix, "-tex");
        assert_eq!(settings.resize.max_width, Some(2048));
        // Defaults preserved
        assert_eq!(settings.resize.max_height, None);
        assert_eq!(settings.quality, 95);
    }

    #[test]
    fn parse_format_selector() {
        let settings: Settings = toml::from_str(r#"format = "webp""#).unwrap();
        assert_eq!(settings.format, OutputFormat::Webp);

        let result: Result<Settings, _> = toml::from_str(r#"format = "bmp""#);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<Settings, _> = toml::from_str("sufix = \"_u\"");
        assert!(result.is_err());

        let result: Result<Settings, _> = toml::from_str("[resize]\nmax_widht = 10");
        assert!(result.is_err());
    }

    #[test]
    fn resize_config_to_policy() {
        let resize = ResizeConfig {
            max_width: Some(1024),
            max_height: Some(512),
            preserve_aspect_ratio: Some(false),
        };
        let policy = resize.to_policy();
        assert_eq!(policy.max_width, Some(1024));
        assert_eq!(policy.max_height, Some(512));
        assert!(!policy.preserves_aspect_ratio());
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_accepts_defaults() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_range() {
        for quality in [0, 101] {
            let settings = Settings {
                quality,
                ..Settings::default()
            };
            assert!(matches!(
                settings.validate(),
                Err(ConfigError::Validation(_))
            ));
        }
    }

    #[test]
    fn validate_suffix_separators() {
        for suffix in ["/x", "a\\b"] {
            let settings = Settings {
                suffix: suffix.into(),
                ..Settings::default()
            };
            assert!(settings.validate().is_err(), "{suffix}");
        }
        let settings = Settings {
            suffix: String::new(),
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn validate_small_cap() {
        let mut settings = Settings::default();
        settings.resize.max_height = Some(3);
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("resize"), "{err}");
    }

    #[test]
    fn validate_empty_extensions() {
        let mut settings = Settings::default();
        settings.scan.extensions.clear();
        assert!(settings.validate().is_err());
    }

    // =========================================================================
    // Merging
    // =========================================================================

    #[test]
    fn merge_overrides_nested_keys_only() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str("[cache]\ncapacity = 8").unwrap();
        let settings = resolve_config(base, Some(overlay)).unwrap();
        assert_eq!(settings.cache.capacity, 8);
        assert_eq!(settings.suffix, "_u");
        assert_eq!(settings.scan, ScanConfig::default());
    }

    #[test]
    fn merge_replaces_arrays() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str("[scan]\nextensions = [\"tga\"]").unwrap();
        let settings = resolve_config(base, Some(overlay)).unwrap();
        assert_eq!(settings.scan.extensions, vec!["tga"]);
    }

    #[test]
    fn resolve_rejects_invalid_overlay() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str("quality = 0").unwrap();
        let result = resolve_config(base, Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let settings = load_config(None, tmp.path()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn load_config_reads_cwd_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            "output_dir = \"textures\"\nformat = \"png\"\n",
        )
        .unwrap();

        let settings = load_config(None, tmp.path()).unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("textures"));
        assert_eq!(settings.format, OutputFormat::Png);
        assert_eq!(settings.suffix, "_u");
    }

    #[test]
    fn load_config_explicit_path_wins() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "suffix = \"_cwd\"").unwrap();
        let explicit = tmp.path().join("other.toml");
        fs::write(&explicit, "suffix = \"_explicit\"").unwrap();

        let settings = load_config(Some(&explicit), tmp.path()).unwrap();
        assert_eq!(settings.suffix, "_explicit");
    }

    #[test]
    fn load_config_missing_explicit_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("missing.toml")), tmp.path());
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "this is not valid toml [[[").unwrap();

        let result = load_config(None, tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // Stock config
    // =========================================================================

    #[test]
    fn stock_config_toml_matches_defaults() {
        let parsed: Settings = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn stock_defaults_value_round_trips() {
        let value = stock_defaults_value().unwrap();
        let settings: Settings = value.try_into().unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.validate().is_ok());
    }
}
