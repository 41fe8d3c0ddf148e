//! Typed configuration per chart kind.
//!
//! The serialized `Default` of each struct is the merge template for that
//! kind, so every key a user may override is declared here.

use crate::{colors, config::*};
use serde::{Deserialize, Serialize};

// ============================================================================
// DONUT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DonutConfig {
    pub canvas: CanvasConfig,
    pub title: TitleConfig,
    pub legend: LegendConfig,
    pub tooltip: TooltipConfig,
    pub toolkit: ToolkitConfig,
    pub hover: HoverConfig,
    /// Ring thickness in px
    pub arc_width: f64,
    pub show_data_labels: bool,
    /// Distance of the label anchor outside the ring
    pub label_offset: f64,
    /// Labels of segments under this percentage are hidden
    pub hide_label_under: f64,
    pub rounding_value: usize,
    pub rounding_percentage: usize,
    pub show_total: bool,
    pub show_average: bool,
    pub use_gradient: bool,
    pub gradient_intensity: f64,
}

impl Default for DonutConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default().with_padding(Padding::uniform(64.0)),
            title: TitleConfig::default(),
            legend: LegendConfig::default(),
            tooltip: TooltipConfig::default(),
            toolkit: ToolkitConfig::default(),
            hover: HoverConfig::default(),
            arc_width: 64.0,
            show_data_labels: true,
            label_offset: 24.0,
            hide_label_under: 3.0,
            rounding_value: 0,
            rounding_percentage: 0,
            show_total: true,
            show_average: false,
            use_gradient: true,
            gradient_intensity: 40.0,
        }
    }
}

// ============================================================================
// GAUGE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GaugeAnimationConfig {
    pub enabled: bool,
    /// Rating units added per frame at start
    pub speed: f64,
    /// Speed increase per frame
    pub acceleration: f64,
}

impl Default for GaugeAnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 1.0,
            acceleration: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GaugeConfig {
    pub canvas: CanvasConfig,
    pub title: TitleConfig,
    pub legend: LegendConfig,
    pub tooltip: TooltipConfig,
    pub toolkit: ToolkitConfig,
    pub hover: HoverConfig,
    pub arc_width: f64,
    /// Pointer length as a ratio of the gauge radius
    pub pointer_size: f64,
    pub pointer_stroke_width: f64,
    pub pointer_color: String,
    pub show_markers: bool,
    pub marker_offset: f64,
    pub rounding_value: usize,
    pub animation: GaugeAnimationConfig,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::sized(512.0, 320.0).with_padding(Padding::new(64.0, 48.0, 24.0, 48.0)),
            title: TitleConfig::default(),
            legend: LegendConfig::default(),
            tooltip: TooltipConfig::default(),
            toolkit: ToolkitConfig {
                show_labels_toggle: false,
                ..Default::default()
            },
            hover: HoverConfig::default(),
            arc_width: 32.0,
            pointer_size: 0.9,
            pointer_stroke_width: 6.0,
            pointer_color: colors::POINTER.to_string(),
            show_markers: true,
            marker_offset: 16.0,
            rounding_value: 0,
            animation: GaugeAnimationConfig::default(),
        }
    }
}

// ============================================================================
// RADIAL BAR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadialBarConfig {
    pub canvas: CanvasConfig,
    pub title: TitleConfig,
    pub legend: LegendConfig,
    pub tooltip: TooltipConfig,
    pub toolkit: ToolkitConfig,
    pub hover: HoverConfig,
    /// Track stroke width as a ratio of the ring spacing
    pub track_ratio: f64,
    pub gutter_color: String,
    pub show_labels: bool,
    pub rounding_percentage: usize,
}

impl Default for RadialBarConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default().with_padding(Padding::uniform(48.0)),
            title: TitleConfig::default(),
            legend: LegendConfig::default(),
            tooltip: TooltipConfig::default(),
            toolkit: ToolkitConfig::default(),
            hover: HoverConfig::default(),
            track_ratio: 0.7,
            gutter_color: colors::GUTTER.to_string(),
            show_labels: true,
            rounding_percentage: 1,
        }
    }
}

// ============================================================================
// VERTICAL BAR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VerticalBarConfig {
    pub canvas: CanvasConfig,
    pub title: TitleConfig,
    pub legend: LegendConfig,
    pub tooltip: TooltipConfig,
    pub toolkit: ToolkitConfig,
    pub hover: HoverConfig,
    pub bar_height: f64,
    pub bar_gap: f64,
    pub show_children: bool,
    /// Lightening applied to child rows relative to the parent color
    pub child_lighten: f64,
    pub show_values: bool,
    pub rounding_value: usize,
    pub rounding_percentage: usize,
}

impl Default for VerticalBarConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default().with_padding(Padding::new(48.0, 64.0, 24.0, 128.0)),
            title: TitleConfig::default(),
            legend: LegendConfig::default(),
            tooltip: TooltipConfig::default(),
            toolkit: ToolkitConfig::default(),
            hover: HoverConfig::default(),
            bar_height: 24.0,
            bar_gap: 8.0,
            show_children: true,
            child_lighten: 0.35,
            show_values: true,
            rounding_value: 0,
            rounding_percentage: 1,
        }
    }
}

// ============================================================================
// WAFFLE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WaffleConfig {
    pub canvas: CanvasConfig,
    pub title: TitleConfig,
    pub legend: LegendConfig,
    pub tooltip: TooltipConfig,
    pub toolkit: ToolkitConfig,
    pub hover: HoverConfig,
    /// Cells per side (N for an N×N grid)
    pub grid_size: usize,
    pub cell_gap: f64,
    pub cell_radius: f64,
    pub rounding_percentage: usize,
}

impl Default for WaffleConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            title: TitleConfig::default(),
            legend: LegendConfig::default(),
            tooltip: TooltipConfig::default(),
            toolkit: ToolkitConfig::default(),
            hover: HoverConfig::default(),
            grid_size: 10,
            cell_gap: 2.0,
            cell_radius: 2.0,
            rounding_percentage: 1,
        }
    }
}

// ============================================================================
// XY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct XyGridConfig {
    pub show: bool,
    pub y_ticks: usize,
    pub stroke: String,
    pub show_x_labels: bool,
    pub show_y_labels: bool,
}

impl Default for XyGridConfig {
    fn default() -> Self {
        Self {
            show: true,
            y_ticks: 10,
            stroke: colors::GRID.to_string(),
            show_x_labels: true,
            show_y_labels: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct XyBarConfig {
    /// Share of each bar's slice left empty on both sides (0..0.5)
    pub padding_ratio: f64,
    pub radius: f64,
}

impl Default for XyBarConfig {
    fn default() -> Self {
        Self {
            padding_ratio: 0.1,
            radius: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct XyLineConfig {
    pub stroke_width: f64,
    pub use_area: bool,
    pub area_opacity: f64,
    pub show_points: bool,
    pub point_radius: f64,
}

impl Default for XyLineConfig {
    fn default() -> Self {
        Self {
            stroke_width: 2.0,
            use_area: false,
            area_opacity: 0.2,
            show_points: true,
            point_radius: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct XyProgressionConfig {
    pub show: bool,
    pub stroke_width: f64,
    pub dasharray: f64,
    pub rounding: usize,
}

impl Default for XyProgressionConfig {
    fn default() -> Self {
        Self {
            show: true,
            stroke_width: 1.0,
            dasharray: 4.0,
            rounding: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct XyConfig {
    pub canvas: CanvasConfig,
    pub title: TitleConfig,
    pub legend: LegendConfig,
    pub tooltip: TooltipConfig,
    pub toolkit: ToolkitConfig,
    pub hover: HoverConfig,
    pub grid: XyGridConfig,
    pub bar: XyBarConfig,
    pub line: XyLineConfig,
    pub plot_radius: f64,
    pub progression: XyProgressionConfig,
    /// Category labels for the x slots
    pub x_labels: Vec<String>,
    pub rounding_value: usize,
}

impl Default for XyConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::sized(800.0, 450.0).with_padding(Padding::new(48.0, 24.0, 48.0, 64.0)),
            title: TitleConfig::default(),
            legend: LegendConfig {
                show_percentage: false,
                ..Default::default()
            },
            tooltip: TooltipConfig {
                show_percentage: false,
                ..Default::default()
            },
            toolkit: ToolkitConfig::default(),
            hover: HoverConfig {
                blur: 0.0,
                ..Default::default()
            },
            grid: XyGridConfig::default(),
            bar: XyBarConfig::default(),
            line: XyLineConfig::default(),
            plot_radius: 4.0,
            progression: XyProgressionConfig::default(),
            x_labels: Vec::new(),
            rounding_value: 1,
        }
    }
}
