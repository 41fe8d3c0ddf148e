//! # viz-charts
//!
//! D3.js-style geometry engines that turn normalized datasets into
//! screen-space models, plus the SVG scene those models are drawn into.
//!
//! ## Modules
//!
//! - `chartkit` - Core primitives: scales, paths, arcs, formatters
//! - `segment` - Proportions, sorting and segregation shared by the engines
//! - `donut`, `gauge`, `radial_bar`, `xy`, `waffle`, `vertical_bar` - Engines
//! - `scene` - Render surface (node tree + SVG serialization)
//! - `draw` - Models to scene nodes, with hover targets
//! - `decorate` - Title, legend, toolkit, data table, tooltip

pub mod chartkit;
pub mod decorate;
pub mod donut;
pub mod draw;
pub mod gauge;
pub mod radial_bar;
pub mod scene;
pub mod segment;
pub mod vertical_bar;
pub mod waffle;
pub mod xy;

pub use chartkit::*;
pub use decorate::*;
pub use donut::*;
pub use draw::*;
pub use gauge::*;
pub use radial_bar::*;
pub use scene::*;
pub use segment::*;
pub use vertical_bar::*;
pub use waffle::*;
pub use xy::*;

// Re-export colors from viz-core for convenience
pub use viz_core::colors;

use viz_core::{ChartConfig, ChartData, Padding};

/// Usable plotting rectangle inside the padded canvas.
///
/// `top`/`right`/`bottom`/`left` are the padding widths, so
/// `width == full_width - left - right` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawingArea {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
    pub full_width: f64,
    pub full_height: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl DrawingArea {
    /// May be degenerate (zero or negative size) when padding exceeds the canvas
    pub fn compute(full_width: f64, full_height: f64, padding: &Padding) -> Self {
        let width = full_width - padding.left - padding.right;
        let height = full_height - padding.top - padding.bottom;
        Self {
            top: padding.top,
            left: padding.left,
            right: padding.right,
            bottom: padding.bottom,
            width,
            height,
            full_width,
            full_height,
            center_x: padding.left + width / 2.0,
            center_y: padding.top + height / 2.0,
        }
    }

    pub fn from_config(config: &ChartConfig) -> Self {
        let canvas = config.canvas();
        Self::compute(canvas.width, canvas.height, &canvas.padding)
    }

    /// Absolute x of the right edge of the drawing area
    pub fn right_edge(&self) -> f64 {
        self.left + self.width
    }

    /// Absolute y of the bottom edge of the drawing area
    pub fn bottom_edge(&self) -> f64 {
        self.top + self.height
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

impl Default for DrawingArea {
    fn default() -> Self {
        Self::compute(512.0, 512.0, &Padding::default())
    }
}

// ============================================================================
// LAYOUT DISPATCH
// ============================================================================

/// Renderable model for one chart instance
#[derive(Debug, Clone)]
pub enum ChartModel {
    Donut(DonutModel),
    Gauge(GaugeModel),
    RadialBar(RadialBarModel),
    VerticalBar(VerticalBarModel),
    Waffle(WaffleModel),
    Xy(XyModel),
    /// Config and data do not describe the same chart kind
    Empty,
}

impl ChartModel {
    /// Drawing area the model was laid out in (vertical bars grow with rows)
    pub fn area(&self) -> Option<&DrawingArea> {
        match self {
            Self::Donut(m) => Some(&m.area),
            Self::Gauge(m) => Some(&m.area),
            Self::RadialBar(m) => Some(&m.area),
            Self::VerticalBar(m) => Some(&m.area),
            Self::Waffle(m) => Some(&m.area),
            Self::Xy(m) => Some(&m.area),
            Self::Empty => None,
        }
    }
}

/// Run the geometry engine matching the config kind.
///
/// `rating` overrides the gauge pointer value while it animates.
pub fn layout(
    config: &ChartConfig,
    data: &ChartData,
    segregated: &Segregation,
    rating: Option<f64>,
) -> ChartModel {
    let area = DrawingArea::from_config(config);

    match (config, data) {
        (ChartConfig::Donut(cfg), ChartData::Items(items)) => {
            ChartModel::Donut(build_donut(items, segregated, &area, cfg))
        }
        (ChartConfig::Gauge(cfg), ChartData::Gauge(gauge)) => {
            let rating = rating.unwrap_or(gauge.value);
            ChartModel::Gauge(build_gauge(gauge, segregated, &area, cfg, rating))
        }
        (ChartConfig::RadialBar(cfg), ChartData::Items(items)) => {
            ChartModel::RadialBar(build_radial_bar(items, segregated, &area, cfg))
        }
        (ChartConfig::VerticalBar(cfg), ChartData::Items(items)) => {
            ChartModel::VerticalBar(build_vertical_bar(items, segregated, cfg))
        }
        (ChartConfig::Waffle(cfg), ChartData::Items(items)) => {
            ChartModel::Waffle(build_waffle(items, segregated, &area, cfg))
        }
        (ChartConfig::Xy(cfg), ChartData::Items(items)) => {
            ChartModel::Xy(build_xy(items, segregated, &area, cfg))
        }
        _ => {
            tracing::warn!("dataset shape does not match {} config", config.kind());
            ChartModel::Empty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use viz_core::{ChartKind, DatasetItem};

    #[test]
    fn test_drawing_area_decomposition() {
        let area = DrawingArea::compute(500.0, 300.0, &Padding::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(area.width, 440.0);
        assert_eq!(area.height, 260.0);
        assert_eq!(area.right_edge(), 480.0);
        assert_eq!(area.bottom_edge(), 270.0);
        assert_eq!(area.center_x, 260.0);
        assert_eq!(area.center_y, 140.0);
    }

    #[test]
    fn test_degenerate_area_is_returned() {
        let area = DrawingArea::compute(50.0, 50.0, &Padding::uniform(40.0));
        assert_eq!(area.width, -30.0);
        assert!(area.is_degenerate());
    }

    #[test]
    fn test_layout_dispatch_mismatch() {
        let config = ChartConfig::default_for(ChartKind::Gauge);
        let data = ChartData::Items(vec![DatasetItem::new("a", 1.0)]);
        assert!(matches!(
            layout(&config, &data, &Segregation::new(), None),
            ChartModel::Empty
        ));
    }

    #[test]
    fn test_layout_dispatch_kinds() {
        let data = ChartData::Items(vec![DatasetItem::new("a", 1.0)]);
        for &kind in ChartKind::all() {
            if kind == ChartKind::Gauge {
                continue;
            }
            let model = layout(&ChartConfig::default_for(kind), &data, &Segregation::new(), None);
            assert!(model.area().is_some(), "{kind} produced no model");
        }
    }

    proptest! {
        #[test]
        fn prop_drawing_area_decomposes(
            w in 0.0f64..4000.0, h in 0.0f64..4000.0,
            t in 0.0f64..500.0, r in 0.0f64..500.0, b in 0.0f64..500.0, l in 0.0f64..500.0,
        ) {
            let padding = Padding::new(t, r, b, l);
            let area = DrawingArea::compute(w, h, &padding);
            prop_assert!((area.width + padding.left + padding.right - w).abs() < 1e-9);
            prop_assert!((area.height + padding.top + padding.bottom - h).abs() < 1e-9);
        }
    }
}
