//! Configuration file support for pagemark.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/pagemark/config.toml`. Settings include tool defaults for new
//! overlays, zoom and page layout, model checks, scene ordering and autosave.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod types;

pub use enums::ColorSpec;
pub use types::{
    AnnotationDefaults, AutosaveConfig, DefaultsConfig, FormDefaults, ImageDefaults, ModelConfig,
    SceneConfig, ShapeDefaults, TextDefaults, ViewConfig,
};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::{JsonSchema, Schema};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [defaults.text]
/// font_size = 18.0
/// color = "#1c2230"
///
/// [defaults.annotation]
/// color = [245, 158, 11]
///
/// [view]
/// initial_scale = 1.5
///
/// [scene]
/// preserve_list_order = true
///
/// [autosave]
/// enabled = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// Defaults for overlays created by tools
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Zoom and page layout
    #[serde(default)]
    pub view: ViewConfig,

    /// Model error handling
    #[serde(default)]
    pub model: ModelConfig,

    /// Scene reconciliation
    #[serde(default)]
    pub scene: SceneConfig,

    /// Document autosave
    #[serde(default)]
    pub autosave: AutosaveConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value (or reset to their
    /// default) and a warning is logged.
    ///
    /// Validated ranges:
    /// - `defaults.text.font_size`: 6.0 - 144.0
    /// - `defaults.shape.stroke_width`: 0.0 - 50.0
    /// - `defaults.annotation.thickness`: 0.5 - 20.0
    /// - box sizes and `defaults.image.max_width`: 1.0 - 4000.0
    /// - `view.min_scale` <= `view.initial_scale` <= `view.max_scale`, all positive
    pub fn validate_and_clamp(&mut self) {
        let text = &mut self.defaults.text;
        if !(6.0..=144.0).contains(&text.font_size) {
            warn!(
                "Invalid defaults.text.font_size {:.1}, clamping to 6.0-144.0 range",
                text.font_size
            );
            text.font_size = if text.font_size.is_nan() {
                TextDefaults::default().font_size
            } else {
                text.font_size.clamp(6.0, 144.0)
            };
        }

        let shape = &mut self.defaults.shape;
        if !(0.0..=50.0).contains(&shape.stroke_width) {
            warn!(
                "Invalid defaults.shape.stroke_width {:.1}, clamping to 0.0-50.0 range",
                shape.stroke_width
            );
            shape.stroke_width = if shape.stroke_width.is_nan() {
                ShapeDefaults::default().stroke_width
            } else {
                shape.stroke_width.clamp(0.0, 50.0)
            };
        }

        let annotation = &mut self.defaults.annotation;
        if !(0.5..=20.0).contains(&annotation.thickness) {
            warn!(
                "Invalid defaults.annotation.thickness {:.1}, clamping to 0.5-20.0 range",
                annotation.thickness
            );
            annotation.thickness = if annotation.thickness.is_nan() {
                AnnotationDefaults::default().thickness
            } else {
                annotation.thickness.clamp(0.5, 20.0)
            };
        }

        let sizes = [
            ("defaults.text.width", &mut self.defaults.text.width),
            ("defaults.text.height", &mut self.defaults.text.height),
            ("defaults.shape.width", &mut self.defaults.shape.width),
            ("defaults.shape.height", &mut self.defaults.shape.height),
            ("defaults.annotation.width", &mut self.defaults.annotation.width),
            ("defaults.annotation.height", &mut self.defaults.annotation.height),
            ("defaults.form.width", &mut self.defaults.form.width),
            ("defaults.form.height", &mut self.defaults.form.height),
            ("defaults.image.max_width", &mut self.defaults.image.max_width),
        ];
        for (name, value) in sizes {
            if !(1.0..=4000.0).contains(&*value) {
                warn!("Invalid {name} {:.1}, clamping to 1.0-4000.0 range", *value);
                *value = if value.is_nan() {
                    1.0
                } else {
                    (*value).clamp(1.0, 4000.0)
                };
            }
        }

        let colors = [
            (
                "defaults.text.color",
                &mut self.defaults.text.color,
                TextDefaults::default().color,
            ),
            (
                "defaults.shape.stroke",
                &mut self.defaults.shape.stroke,
                ShapeDefaults::default().stroke,
            ),
            (
                "defaults.shape.fill",
                &mut self.defaults.shape.fill,
                ShapeDefaults::default().fill,
            ),
            (
                "defaults.annotation.color",
                &mut self.defaults.annotation.color,
                AnnotationDefaults::default().color,
            ),
        ];
        for (name, value, fallback) in colors {
            if !value.is_valid() {
                warn!(
                    "Invalid {name} {:?}, falling back to '{}'",
                    value,
                    fallback.to_css()
                );
                *value = fallback;
            }
        }

        if self.defaults.text.font_family.trim().is_empty() {
            warn!("Empty defaults.text.font_family, falling back to 'Inter'");
            self.defaults.text.font_family = TextDefaults::default().font_family;
        }
        if self.defaults.form.name_prefix.trim().is_empty() {
            warn!("Empty defaults.form.name_prefix, falling back to 'field'");
            self.defaults.form.name_prefix = FormDefaults::default().name_prefix;
        }

        let view = &mut self.view;
        let view_defaults = ViewConfig::default();
        if !(view.min_scale.is_finite() && view.min_scale > 0.0) {
            warn!(
                "Invalid view.min_scale {}, falling back to {}",
                view.min_scale, view_defaults.min_scale
            );
            view.min_scale = view_defaults.min_scale;
        }
        if !(view.max_scale.is_finite() && view.max_scale >= view.min_scale) {
            warn!(
                "Invalid view.max_scale {}, falling back to {}",
                view.max_scale,
                view_defaults.max_scale.max(view.min_scale)
            );
            view.max_scale = view_defaults.max_scale.max(view.min_scale);
        }
        if !(view.min_scale..=view.max_scale).contains(&view.initial_scale) {
            warn!(
                "Invalid view.initial_scale {}, clamping to {}-{} range",
                view.initial_scale, view.min_scale, view.max_scale
            );
            view.initial_scale = if view.initial_scale.is_nan() {
                view_defaults.initial_scale.clamp(view.min_scale, view.max_scale)
            } else {
                view.initial_scale.clamp(view.min_scale, view.max_scale)
            };
        }
        for (name, value, fallback) in [
            ("view.page_width", &mut view.page_width, view_defaults.page_width),
            ("view.page_height", &mut view.page_height, view_defaults.page_height),
        ] {
            if !(value.is_finite() && *value > 0.0) {
                warn!("Invalid {name} {}, falling back to {fallback}", *value);
                *value = fallback;
            }
        }

        if self.autosave.file_name.trim().is_empty()
            || self.autosave.file_name.contains(['/', '\\'])
        {
            warn!(
                "Invalid autosave.file_name '{}', falling back to 'autosave.json'",
                self.autosave.file_name
            );
            self.autosave.file_name = AutosaveConfig::default().file_name;
        }
        if self.autosave.max_file_size_bytes == 0 {
            warn!("autosave.max_file_size_bytes is 0; autosave will skip every save");
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/pagemark/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("pagemark");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Loads and validates configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config = Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config.validate_and_clamp();

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Parses a TOML document without validating it.
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Saves the current configuration to the default location.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory cannot be created
    /// - The config cannot be serialized to TOML
    /// - The file cannot be written
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// JSON schema describing the configuration file.
    pub fn json_schema() -> Schema {
        schemars::schema_for!(Config)
    }
}
