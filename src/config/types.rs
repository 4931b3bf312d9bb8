//! Configuration type definitions.

use super::enums::ColorSpec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Defaults applied when tools create new overlays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub text: TextDefaults,

    #[serde(default)]
    pub shape: ShapeDefaults,

    #[serde(default)]
    pub annotation: AnnotationDefaults,

    #[serde(default)]
    pub form: FormDefaults,

    #[serde(default)]
    pub image: ImageDefaults,
}

/// Text tool defaults.
///
/// Box sizes are given in view pixels and converted to page points at the
/// zoom level in effect when the text is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TextDefaults {
    /// Font size in page points (valid range: 6.0 - 144.0)
    #[serde(default = "default_font_size")]
    pub font_size: f64,

    /// Text color
    #[serde(default = "default_ink")]
    pub color: ColorSpec,

    /// Font family used when an overlay does not name one
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Content of a freshly placed text box
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Initial box width in view pixels
    #[serde(default = "default_text_width")]
    pub width: f64,

    /// Initial box height in view pixels
    #[serde(default = "default_text_height")]
    pub height: f64,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            color: default_ink(),
            font_family: default_font_family(),
            placeholder: default_placeholder(),
            width: default_text_width(),
            height: default_text_height(),
        }
    }
}

/// Shape tool defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ShapeDefaults {
    #[serde(default = "default_ink")]
    pub stroke: ColorSpec,

    /// Stroke width in pixels, not scaled with zoom (valid range: 0.0 - 50.0)
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,

    #[serde(default = "default_shape_fill")]
    pub fill: ColorSpec,

    #[serde(default = "default_shape_width")]
    pub width: f64,

    #[serde(default = "default_shape_height")]
    pub height: f64,
}

impl Default for ShapeDefaults {
    fn default() -> Self {
        Self {
            stroke: default_ink(),
            stroke_width: default_stroke_width(),
            fill: default_shape_fill(),
            width: default_shape_width(),
            height: default_shape_height(),
        }
    }
}

/// Annotate tool defaults (highlights).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnnotationDefaults {
    #[serde(default = "default_annotation_color")]
    pub color: ColorSpec,

    #[serde(default = "default_annotation_thickness")]
    pub thickness: f64,

    #[serde(default = "default_annotation_width")]
    pub width: f64,

    #[serde(default = "default_annotation_height")]
    pub height: f64,
}

impl Default for AnnotationDefaults {
    fn default() -> Self {
        Self {
            color: default_annotation_color(),
            thickness: default_annotation_thickness(),
            width: default_annotation_width(),
            height: default_annotation_height(),
        }
    }
}

/// Form tool defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormDefaults {
    #[serde(default = "default_form_width")]
    pub width: f64,

    #[serde(default = "default_form_height")]
    pub height: f64,

    /// Generated field names look like `<prefix>-1`, `<prefix>-2`, ...
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            width: default_form_width(),
            height: default_form_height(),
            name_prefix: default_name_prefix(),
        }
    }
}

/// Image and signature placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImageDefaults {
    /// Widest an inserted image may be, in view pixels
    #[serde(default = "default_image_max_width")]
    pub max_width: f64,
}

impl Default for ImageDefaults {
    fn default() -> Self {
        Self {
            max_width: default_image_max_width(),
        }
    }
}

/// Zoom and page layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ViewConfig {
    /// Zoom applied when a document opens
    #[serde(default = "default_initial_scale")]
    pub initial_scale: f64,

    #[serde(default = "default_min_scale")]
    pub min_scale: f64,

    #[serde(default = "default_max_scale")]
    pub max_scale: f64,

    /// Page width in points used when no renderer reports one (US Letter)
    #[serde(default = "default_page_width")]
    pub page_width: f64,

    #[serde(default = "default_page_height")]
    pub page_height: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            initial_scale: default_initial_scale(),
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            page_width: default_page_width(),
            page_height: default_page_height(),
        }
    }
}

/// Overlay model checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModelConfig {
    /// Panic on model errors (duplicate ids, unknown ids, type-changing updates).
    /// When unset, enabled for debug builds only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_checks: Option<bool>,
}

impl ModelConfig {
    pub fn strict(&self) -> bool {
        self.strict_checks.unwrap_or(cfg!(debug_assertions))
    }
}

/// Scene reconciliation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SceneConfig {
    /// Keep node stacking order equal to overlay list order
    #[serde(default = "default_preserve_list_order")]
    pub preserve_list_order: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            preserve_list_order: default_preserve_list_order(),
        }
    }
}

/// Document autosave settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AutosaveConfig {
    #[serde(default)]
    pub enabled: bool,

    /// File name inside the data directory
    #[serde(default = "default_autosave_file")]
    pub file_name: String,

    /// Saves larger than this are skipped with a warning
    #[serde(default = "default_autosave_max_bytes")]
    pub max_file_size_bytes: u64,

    /// Keep the previous save as `<file>.bak`
    #[serde(default = "default_keep_backup")]
    pub keep_backup: bool,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            file_name: default_autosave_file(),
            max_file_size_bytes: default_autosave_max_bytes(),
            keep_backup: default_keep_backup(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_font_size() -> f64 {
    20.0
}

fn default_ink() -> ColorSpec {
    ColorSpec::Name("#1c2230".to_string())
}

fn default_font_family() -> String {
    "Inter".to_string()
}

fn default_placeholder() -> String {
    "New text".to_string()
}

fn default_text_width() -> f64 {
    200.0
}

fn default_text_height() -> f64 {
    40.0
}

fn default_stroke_width() -> f64 {
    2.0
}

fn default_shape_fill() -> ColorSpec {
    ColorSpec::Name("transparent".to_string())
}

fn default_shape_width() -> f64 {
    180.0
}

fn default_shape_height() -> f64 {
    80.0
}

fn default_annotation_color() -> ColorSpec {
    ColorSpec::Name("#f59e0b".to_string())
}

fn default_annotation_thickness() -> f64 {
    1.0
}

fn default_annotation_width() -> f64 {
    220.0
}

fn default_annotation_height() -> f64 {
    36.0
}

fn default_form_width() -> f64 {
    240.0
}

fn default_form_height() -> f64 {
    44.0
}

fn default_name_prefix() -> String {
    "field".to_string()
}

fn default_image_max_width() -> f64 {
    240.0
}

fn default_initial_scale() -> f64 {
    1.2
}

fn default_min_scale() -> f64 {
    0.1
}

fn default_max_scale() -> f64 {
    8.0
}

fn default_page_width() -> f64 {
    612.0
}

fn default_page_height() -> f64 {
    792.0
}

fn default_preserve_list_order() -> bool {
    true
}

fn default_autosave_file() -> String {
    "autosave.json".to_string()
}

fn default_autosave_max_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_keep_backup() -> bool {
    true
}
