//! Configuration merging and the per-kind config union.
//!
//! User configuration is merged onto a template derived from the typed
//! default of the chart kind. The template decides the shape: user keys the
//! template does not know are dropped, invalid leaves keep the default.

use crate::{ChartError, ChartKind, Result, colors, options::*};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// TREE-SHAKING MERGE
// ============================================================================

/// Merge `user` onto `default`, keeping exactly the key shape of `default`.
///
/// - scalar leaves take the user value when it is valid for the leaf
/// - array leaves are replaced wholesale by a user array
/// - object leaves recurse; unknown user keys are dropped
pub fn merge_config(user: &Value, default: &Value) -> Value {
    match default {
        Value::Object(defaults) => {
            let Some(overrides) = user.as_object() else {
                return default.clone();
            };
            let merged: Map<String, Value> = defaults
                .iter()
                .map(|(key, default_value)| {
                    let value = match overrides.get(key) {
                        Some(user_value) => merge_config(user_value, default_value),
                        None => default_value.clone(),
                    };
                    (key.clone(), value)
                })
                .collect();
            Value::Object(merged)
        }
        Value::Array(_) => {
            if user.is_array() {
                user.clone()
            } else {
                default.clone()
            }
        }
        _ => {
            if is_valid_leaf(user, default) {
                user.clone()
            } else {
                default.clone()
            }
        }
    }
}

/// A user leaf is valid when it is non-null, finite, and of the same JSON
/// kind as the default leaf. Integer defaults only accept integers.
pub fn is_valid_leaf(user: &Value, default: &Value) -> bool {
    match (user, default) {
        (Value::Null, _) => false,
        (Value::Bool(_), Value::Bool(_)) => true,
        (Value::String(_), Value::String(_)) => true,
        (Value::Number(u), Value::Number(d)) => {
            if d.is_u64() {
                u.is_u64()
            } else if d.is_i64() {
                u.is_i64() || u.is_u64()
            } else {
                u.as_f64().is_some_and(f64::is_finite)
            }
        }
        (Value::Array(_) | Value::Object(_), _) => false,
        (_, Value::Null) => true,
        _ => false,
    }
}

/// Parse a `config` attribute payload.
///
/// Accepts a JSON object or a JSON string holding a JSON object. Anything that
/// parses but is not an object yields an empty override set.
pub fn parse_config_attribute(text: &str) -> Result<Value> {
    let parsed: Value =
        serde_json::from_str(text.trim()).map_err(|source| ChartError::ConfigParse { source })?;

    let parsed = match parsed {
        Value::String(inner) => serde_json::from_str(inner.trim())
            .map_err(|source| ChartError::ConfigParse { source })?,
        other => other,
    };

    if parsed.is_object() {
        Ok(parsed)
    } else {
        tracing::debug!("config payload is not an object, using defaults");
        Ok(Value::Object(Map::new()))
    }
}

/// Override set seeding the canvas size from declared container dimensions
pub fn canvas_seed(width: Option<f64>, height: Option<f64>) -> Value {
    let mut canvas = Map::new();
    if let Some(w) = width.filter(|w| w.is_finite()) {
        canvas.insert("width".into(), Value::from(w));
    }
    if let Some(h) = height.filter(|h| h.is_finite()) {
        canvas.insert("height".into(), Value::from(h));
    }
    let mut root = Map::new();
    root.insert("canvas".into(), Value::Object(canvas));
    Value::Object(root)
}

// ============================================================================
// SHARED SUB-CONFIGS
// ============================================================================

/// Padding between the full canvas and the drawing area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self { top, right, bottom, left }
    }

    pub const fn uniform(padding: f64) -> Self {
        Self::new(padding, padding, padding, padding)
    }

    pub const fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self::uniform(24.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
    pub background: String,
    pub color: String,
    pub font_family: String,
    pub palette: Vec<String>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 512.0,
            height: 512.0,
            padding: Padding::default(),
            background: colors::BG_PANEL.to_string(),
            color: colors::TEXT_PRIMARY.to_string(),
            font_family: "inherit".to_string(),
            palette: colors::default_palette(),
        }
    }
}

impl CanvasConfig {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TitleConfig {
    pub show: bool,
    pub text: String,
    pub subtitle: String,
    pub font_size: f64,
    pub color: String,
    /// Render as an embedded HTML block instead of SVG text
    pub use_div: bool,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            show: true,
            text: String::new(),
            subtitle: String::new(),
            font_size: 18.0,
            color: colors::TEXT_PRIMARY.to_string(),
            use_div: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegendConfig {
    pub show: bool,
    pub font_size: f64,
    pub color: String,
    pub show_value: bool,
    pub show_percentage: bool,
    pub use_div: bool,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            show: true,
            font_size: 12.0,
            color: colors::TEXT_PRIMARY.to_string(),
            show_value: true,
            show_percentage: true,
            use_div: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TooltipConfig {
    pub show: bool,
    pub show_value: bool,
    pub show_percentage: bool,
    pub rounding_value: usize,
    pub rounding_percentage: usize,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            show: true,
            show_value: true,
            show_percentage: true,
            rounding_value: 0,
            rounding_percentage: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolkitConfig {
    pub show: bool,
    pub show_table: bool,
    pub show_labels_toggle: bool,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            show: true,
            show_table: true,
            show_labels_toggle: true,
        }
    }
}

/// Restyle applied to primitives while one of them is hovered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HoverConfig {
    pub enabled: bool,
    /// Blur (px) applied to the non-hovered primitives
    pub blur: f64,
    /// Opacity applied to the non-hovered primitives
    pub opacity: f64,
    /// Scale applied to the hovered primitive (1 = none)
    pub scale: f64,
    pub drop_shadow: bool,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            blur: 2.0,
            opacity: 0.5,
            scale: 1.05,
            drop_shadow: true,
        }
    }
}

// ============================================================================
// PER-KIND CONFIG UNION
// ============================================================================

/// Resolved configuration for one chart instance
#[derive(Debug, Clone, PartialEq)]
pub enum ChartConfig {
    Donut(DonutConfig),
    Gauge(GaugeConfig),
    RadialBar(RadialBarConfig),
    VerticalBar(VerticalBarConfig),
    Waffle(WaffleConfig),
    Xy(XyConfig),
}

macro_rules! each_config {
    ($self:expr, $cfg:ident => $body:expr) => {
        match $self {
            ChartConfig::Donut($cfg) => $body,
            ChartConfig::Gauge($cfg) => $body,
            ChartConfig::RadialBar($cfg) => $body,
            ChartConfig::VerticalBar($cfg) => $body,
            ChartConfig::Waffle($cfg) => $body,
            ChartConfig::Xy($cfg) => $body,
        }
    };
}

impl ChartConfig {
    /// Typed default for a chart kind
    pub fn default_for(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Donut => Self::Donut(DonutConfig::default()),
            ChartKind::Gauge => Self::Gauge(GaugeConfig::default()),
            ChartKind::RadialBar => Self::RadialBar(RadialBarConfig::default()),
            ChartKind::VerticalBar => Self::VerticalBar(VerticalBarConfig::default()),
            ChartKind::Waffle => Self::Waffle(WaffleConfig::default()),
            ChartKind::Xy => Self::Xy(XyConfig::default()),
        }
    }

    pub fn kind(&self) -> ChartKind {
        match self {
            Self::Donut(_) => ChartKind::Donut,
            Self::Gauge(_) => ChartKind::Gauge,
            Self::RadialBar(_) => ChartKind::RadialBar,
            Self::VerticalBar(_) => ChartKind::VerticalBar,
            Self::Waffle(_) => ChartKind::Waffle,
            Self::Xy(_) => ChartKind::Xy,
        }
    }

    /// JSON template (the serialized typed default) for a chart kind
    pub fn template(kind: ChartKind) -> Result<Value> {
        Self::default_for(kind).to_value()
    }

    /// Template with the canvas size seeded from container dimensions
    pub fn seeded_template(kind: ChartKind, width: Option<f64>, height: Option<f64>) -> Result<Value> {
        let template = Self::template(kind)?;
        Ok(merge_config(&canvas_seed(width, height), &template))
    }

    /// Merge user overrides onto a template and deserialize the result
    pub fn resolve(kind: ChartKind, template: &Value, user: &Value) -> Result<Self> {
        let merged = merge_config(user, template);
        let shape_error = |source| ChartError::ConfigShape {
            kind: kind.to_string(),
            source,
        };

        Ok(match kind {
            ChartKind::Donut => Self::Donut(serde_json::from_value(merged).map_err(shape_error)?),
            ChartKind::Gauge => Self::Gauge(serde_json::from_value(merged).map_err(shape_error)?),
            ChartKind::RadialBar => {
                Self::RadialBar(serde_json::from_value(merged).map_err(shape_error)?)
            }
            ChartKind::VerticalBar => {
                Self::VerticalBar(serde_json::from_value(merged).map_err(shape_error)?)
            }
            ChartKind::Waffle => Self::Waffle(serde_json::from_value(merged).map_err(shape_error)?),
            ChartKind::Xy => Self::Xy(serde_json::from_value(merged).map_err(shape_error)?),
        })
    }

    pub fn to_value(&self) -> Result<Value> {
        let kind = self.kind();
        each_config!(self, cfg => serde_json::to_value(cfg)).map_err(|source| {
            ChartError::ConfigShape {
                kind: kind.to_string(),
                source,
            }
        })
    }

    pub fn canvas(&self) -> &CanvasConfig {
        each_config!(self, cfg => &cfg.canvas)
    }

    pub fn title(&self) -> &TitleConfig {
        each_config!(self, cfg => &cfg.title)
    }

    pub fn legend(&self) -> &LegendConfig {
        each_config!(self, cfg => &cfg.legend)
    }

    pub fn tooltip(&self) -> &TooltipConfig {
        each_config!(self, cfg => &cfg.tooltip)
    }

    pub fn toolkit(&self) -> &ToolkitConfig {
        each_config!(self, cfg => &cfg.toolkit)
    }

    pub fn hover(&self) -> &HoverConfig {
        each_config!(self, cfg => &cfg.hover)
    }

    pub fn palette(&self) -> &[String] {
        &self.canvas().palette
    }
}
