//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults
//! describe the production site; a `config.toml` in the project directory
//! only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_title = "thenexus.tv"
//! base_url = "https://thenexus.tv"   # Absolute origin used in feeds
//! episodes_per_page = 50              # Page size of the episode listing
//! assets_dir = "assets"               # Copied verbatim to the output root
//!
//! [feed]
//! author = "The Nexus"
//! language = "en-us"
//! category = "Technology"
//! archive_notice = "is no longer active. ..."  # Appended to the series name
//!
//! [colors.light]
//! background = "#ffffff"
//! text = "#111827"
//! text_muted = "#6b7280"
//! border = "#e5e7eb"
//! link = "#2563eb"
//! link_hover = "#1e40af"
//! accent = "#3b82f6"                  # Player waveform bars
//!
//! [colors.dark]
//! # same keys as [colors.light]
//!
//! [processing]
//! max_processes = 4                   # Max render threads (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

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

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Title shown in the page header and `<title>`.
    pub site_title: String,
    /// Absolute site origin, no trailing slash. Feeds need absolute links.
    pub base_url: String,
    /// Episodes per listing page.
    pub episodes_per_page: usize,
    /// Directory (relative to the project directory) copied to the output root.
    pub assets_dir: String,
    /// RSS channel metadata.
    pub feed: FeedConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Parallel rendering settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_title: "thenexus.tv".to_string(),
            base_url: "https://thenexus.tv".to_string(),
            episodes_per_page: 50,
            assets_dir: "assets".to_string(),
            feed: FeedConfig::default(),
            colors: ColorConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.episodes_per_page == 0 {
            return Err(ConfigError::Validation(
                "episodes_per_page must be at least 1".into(),
            ));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ConfigError::Validation(
                "base_url must be an absolute http(s) URL".into(),
            ));
        }
        if self.base_url.ends_with('/') {
            return Err(ConfigError::Validation(
                "base_url must not end with '/'".into(),
            ));
        }
        Ok(())
    }
}

/// RSS channel metadata shared by every series feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// `itunes:author` and `itunes:owner` name of the channel.
    pub author: String,
    pub language: String,
    /// `itunes:category` text.
    pub category: String,
    /// Tombstone description, following the series name.
    pub archive_notice: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            author: "The Nexus".to_string(),
            language: "en-us".to_string(),
            category: "Technology".to_string(),
            archive_notice: "is no longer active. The complete archive of all episodes is preserved at thenexus.tv.".to_string(),
        }
    }
}

/// Parallel rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of render threads.
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

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Secondary text: dates, credits, pagination.
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
    /// Player waveform and progress bar.
    pub accent: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111827".to_string(),
            text_muted: "#6b7280".to_string(),
            border: "#e5e7eb".to_string(),
            link: "#2563eb".to_string(),
            link_hover: "#1e40af".to_string(),
            accent: "#3b82f6".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#1c1917".to_string(),
            text: "#e7e5e4".to_string(),
            text_muted: "#a8a29e".to_string(),
            border: "#44403c".to_string(),
            link: "#60a5fa".to_string(),
            link_hover: "#93c5fd".to_string(),
            accent: "#60a5fa".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
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

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory, layered over stock defaults.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    let overlay = load_raw_config(dir)?;
    if overlay.is_some() {
        tracing::debug!(dir = %dir.display(), "using config.toml");
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# nexus-archive Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Title shown in every page header.
site_title = "thenexus.tv"

# Absolute origin of the published site, without a trailing slash.
# Feed links and enclosures are built from it.
base_url = "https://thenexus.tv"

# Number of episodes per page on /episodes/.
episodes_per_page = 50

# Directory copied verbatim into the output root (favicon, fonts, ...).
assets_dir = "assets"

# ---------------------------------------------------------------------------
# RSS feeds (/series/{slug}/feed-fringe.xml)
# ---------------------------------------------------------------------------
[feed]
author = "The Nexus"
language = "en-us"
category = "Technology"
# Tombstone item text, shown after the series name.
archive_notice = "is no longer active. The complete archive of all episodes is preserved at thenexus.tv."

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#111827"
text_muted = "#6b7280"    # Dates, credits, pagination
border = "#e5e7eb"
link = "#2563eb"
link_hover = "#1e40af"
accent = "#3b82f6"        # Player waveform

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#1c1917"
text = "#e7e5e4"
text_muted = "#a8a29e"
border = "#44403c"
link = "#60a5fa"
link_hover = "#93c5fd"
accent = "#60a5fa"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render threads.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    let vars = |scheme: &ColorScheme, indent: &str| {
        [
            ("bg", &scheme.background),
            ("text", &scheme.text),
            ("text-muted", &scheme.text_muted),
            ("border", &scheme.border),
            ("link", &scheme.link),
            ("link-hover", &scheme.link_hover),
            ("accent", &scheme.accent),
        ]
        .iter()
        .map(|(name, value)| format!("{indent}--color-{name}: {value};"))
        .collect::<Vec<_>>()
        .join("\n")
    };
    format!(
        ":root {{\n{}\n}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{}\n    }}\n}}",
        vars(&colors.light, "    "),
        vars(&colors.dark, "        "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_production_site() {
        let config = SiteConfig::default();
        assert_eq!(config.site_title, "thenexus.tv");
        assert_eq!(config.episodes_per_page, 50);
        assert_eq!(config.feed.author, "The Nexus");
        config.validate().unwrap();
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
episodes_per_page = 25

[colors.dark]
accent = "#ff0000"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.episodes_per_page, 25);
        assert_eq!(config.colors.dark.accent, "#ff0000");
        // Default values preserved
        assert_eq!(config.colors.dark.background, "#1c1917");
        assert_eq!(config.site_title, "thenexus.tv");
    }

    #[test]
    fn unknown_keys_rejected() {
        let toml = r#"
[feed]
autor = "typo"
"#;
        assert!(toml::from_str::<SiteConfig>(toml).is_err());
    }

    #[test]
    fn zero_page_size_rejected() {
        let config = SiteConfig {
            episodes_per_page: 0,
            ..SiteConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn base_url_must_be_absolute_without_trailing_slash() {
        let relative = SiteConfig {
            base_url: "/site".to_string(),
            ..SiteConfig::default()
        };
        assert!(relative.validate().is_err());

        let trailing = SiteConfig {
            base_url: "https://example.com/".to_string(),
            ..SiteConfig::default()
        };
        assert!(trailing.validate().is_err());
    }

    #[test]
    fn merge_overlays_nested_tables() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str(
            r#"
[feed]
language = "en-gb"
"#,
        )
        .unwrap();
        let config = resolve_config(base, Some(overlay)).unwrap();
        assert_eq!(config.feed.language, "en-gb");
        assert_eq!(config.feed.author, "The Nexus");
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.base_url, "https://thenexus.tv");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
site_title = "Archive"
base_url = "https://archive.example.com"
"#,
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site_title, "Archive");
        assert_eq!(config.base_url, "https://archive.example.com");
        assert_eq!(config.episodes_per_page, 50);
    }

    #[test]
    fn load_config_surfaces_validation_errors() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "episodes_per_page = 0\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn load_config_rejects_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "site_title = [").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.site_title, defaults.site_title);
        assert_eq!(config.feed.archive_notice, defaults.feed.archive_notice);
        assert_eq!(config.colors.dark.accent, defaults.colors.dark.accent);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn color_css_has_both_schemes() {
        let mut colors = ColorConfig::default();
        colors.light.accent = "#010203".to_string();
        let css = generate_color_css(&colors);
        assert!(css.contains("--color-accent: #010203;"));
        assert!(css.contains("--color-accent: #60a5fa;"));
        assert!(css.contains("prefers-color-scheme: dark"));
    }

    #[test]
    fn effective_threads_never_zero() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }
}
