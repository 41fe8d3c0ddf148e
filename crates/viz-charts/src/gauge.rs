//! Gauge chart engine
//!
//! A value inside `[min, max]` mapped onto an upper half circle. The range
//! comes from the union of the series `from`/`to` boundaries.

use crate::{
    chartkit::{format_value, polar, ring_segment_path, TextAnchor},
    segment::{active_items, Segregation},
    DrawingArea,
};
use std::f64::consts::PI;
use viz_core::{GaugeConfig, GaugeDataset};

/// Angular span of the dial
pub const GAUGE_SPAN: f64 = 0.975 * PI;

/// Screen angle of `min`: the span is centered on the upper half circle
pub const GAUGE_PHASE: f64 = PI + (PI - GAUGE_SPAN) / 2.0;

/// Room kept under the dial center for the value text
const VALUE_BAND_RATIO: f64 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct GaugeArc {
    pub index: usize,
    pub dataset_id: String,
    pub name: String,
    pub color: String,
    pub from: f64,
    pub to: f64,
    pub start_angle: f64,
    pub sweep: f64,
    pub path: String,
}

/// Step marker at a segment boundary
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeMarker {
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub anchor: TextAnchor,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaugePointer {
    pub angle: f64,
    pub base: (f64, f64),
    pub tip: (f64, f64),
    pub stroke_width: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaugeModel {
    pub min: f64,
    pub max: f64,
    /// Target value from the dataset
    pub value: f64,
    /// Value the pointer currently shows (differs while animating)
    pub rating: f64,
    pub center: (f64, f64),
    pub radius: f64,
    pub arcs: Vec<GaugeArc>,
    pub markers: Vec<GaugeMarker>,
    pub pointer: GaugePointer,
    pub value_text: String,
    pub area: DrawingArea,
}

/// `(min, max)` over every `from`/`to` boundary; `(0, 0)` without any
pub fn range_bounds(dataset: &GaugeDataset) -> (f64, f64) {
    let bounds = dataset
        .series
        .iter()
        .flat_map(|item| [item.from, item.to])
        .flatten()
        .filter(|v| v.is_finite());

    bounds
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })
        .unwrap_or((0.0, 0.0))
}

/// Position of `value` inside the range, clamped to 0..=1
pub fn range_ratio(value: f64, min: f64, max: f64) -> f64 {
    let extent = max - min;
    if extent <= 0.0 || !extent.is_finite() || !value.is_finite() {
        return 0.0;
    }
    ((value - min) / extent).clamp(0.0, 1.0)
}

/// Pointer screen angle for a rating
pub fn rating_angle(rating: f64, min: f64, max: f64) -> f64 {
    GAUGE_PHASE + range_ratio(rating, min, max) * GAUGE_SPAN
}

/// Lay out the dial for the target value, with the pointer at `rating`.
/// Segment sweeps are `(to - from) / (max - min)` of the span, which is the
/// `(to - from) / max` rule whenever the range starts at 0.
pub fn build_gauge(
    dataset: &GaugeDataset,
    segregated: &Segregation,
    area: &DrawingArea,
    config: &GaugeConfig,
    rating: f64,
) -> GaugeModel {
    let (min, max) = range_bounds(dataset);
    let extent = max - min;

    let radius = (area.width / 2.0)
        .min(area.height * (1.0 - VALUE_BAND_RATIO))
        .max(0.0);
    let center = (area.center_x, area.top + radius);
    let inner = (radius - config.arc_width).max(0.0);

    let arcs: Vec<GaugeArc> = active_items(&dataset.series, segregated)
        .into_iter()
        .map(|(index, item)| {
            let from = item.from.unwrap_or(min);
            let to = item.to.unwrap_or(from);
            let start_angle = rating_angle(from, min, max);
            let sweep = if extent > 0.0 {
                ((to - from) / extent * GAUGE_SPAN).max(0.0)
            } else {
                0.0
            };

            GaugeArc {
                index,
                dataset_id: item.dataset_id.clone(),
                name: item.name.clone(),
                color: item.color.clone(),
                from,
                to,
                start_angle,
                sweep,
                path: ring_segment_path(center.0, center.1, radius, inner, start_angle, sweep),
            }
        })
        .collect();

    let markers = if config.show_markers {
        step_markers(&arcs, center, radius + config.marker_offset, min, max, config)
    } else {
        Vec::new()
    };

    let angle = rating_angle(rating, min, max);
    let pointer = GaugePointer {
        angle,
        base: center,
        tip: polar(center.0, center.1, radius * config.pointer_size, angle),
        stroke_width: config.pointer_stroke_width,
        color: config.pointer_color.clone(),
    };

    GaugeModel {
        min,
        max,
        value: dataset.value,
        rating,
        center,
        radius,
        arcs,
        markers,
        pointer,
        value_text: format_value(rating, config.rounding_value),
        area: *area,
    }
}

/// One marker per distinct boundary value
fn step_markers(
    arcs: &[GaugeArc],
    center: (f64, f64),
    radius: f64,
    min: f64,
    max: f64,
    config: &GaugeConfig,
) -> Vec<GaugeMarker> {
    let mut steps: Vec<f64> = arcs.iter().flat_map(|arc| [arc.from, arc.to]).collect();
    steps.sort_by(f64::total_cmp);
    steps.dedup();

    steps
        .into_iter()
        .map(|value| {
            let (x, y) = polar(center.0, center.1, radius, rating_angle(value, min, max));
            GaugeMarker {
                value,
                x,
                y,
                anchor: TextAnchor::around(x, center.0, 2.0),
                text: format_value(value, config.rounding_value),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use viz_core::dataset::normalize_gauge;

    fn dataset() -> GaugeDataset {
        normalize_gauge(
            &json!({
                "value": 4.2,
                "series": [
                    { "name": "low", "from": 0, "to": 3 },
                    { "name": "mid", "from": 3, "to": 4 },
                    { "name": "high", "from": 4, "to": 5 }
                ]
            }),
            &[],
        )
    }

    fn area() -> DrawingArea {
        DrawingArea::from_config(&viz_core::ChartConfig::Gauge(GaugeConfig::default()))
    }

    #[test]
    fn test_range_bounds_union() {
        assert_eq!(range_bounds(&dataset()), (0.0, 5.0));
        assert_eq!(range_bounds(&GaugeDataset::default()), (0.0, 0.0));
    }

    #[test]
    fn test_span_and_phase() {
        assert!((GAUGE_PHASE - (PI + 0.0125 * PI)).abs() < 1e-12);
        assert!((rating_angle(0.0, 0.0, 5.0) - GAUGE_PHASE).abs() < 1e-12);
        assert!((rating_angle(5.0, 0.0, 5.0) - (GAUGE_PHASE + GAUGE_SPAN)).abs() < 1e-12);
        // Midpoint points straight up
        assert!((rating_angle(2.5, 0.0, 5.0) - 1.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_ratings_are_clamped() {
        assert_eq!(range_ratio(-3.0, 0.0, 5.0), 0.0);
        assert_eq!(range_ratio(9.0, 0.0, 5.0), 1.0);
        assert_eq!(range_ratio(1.0, 2.0, 2.0), 0.0);
    }

    #[test]
    fn test_segment_sweeps_follow_range() {
        let model = build_gauge(&dataset(), &Segregation::new(), &area(), &GaugeConfig::default(), 4.2);
        assert_eq!(model.arcs.len(), 3);
        let total: f64 = model.arcs.iter().map(|arc| arc.sweep).sum();
        assert!((total - GAUGE_SPAN).abs() < 1e-12);
        assert!((model.arcs[0].sweep - 3.0 / 5.0 * GAUGE_SPAN).abs() < 1e-12);
        assert!((model.arcs[1].start_angle - rating_angle(3.0, 0.0, 5.0)).abs() < 1e-12);
    }

    #[test]
    fn test_offset_range_sweeps_over_extent() {
        let offset = normalize_gauge(
            &json!({ "value": 12, "series": [{ "from": 10, "to": 15 }, { "from": 15, "to": 20 }] }),
            &[],
        );
        let model = build_gauge(&offset, &Segregation::new(), &area(), &GaugeConfig::default(), 12.0);
        assert!((model.arcs[0].sweep - GAUGE_SPAN / 2.0).abs() < 1e-12);
        assert!((model.arcs[0].start_angle - GAUGE_PHASE).abs() < 1e-12);
    }

    #[test]
    fn test_markers_at_distinct_boundaries() {
        let model = build_gauge(&dataset(), &Segregation::new(), &area(), &GaugeConfig::default(), 4.2);
        let values: Vec<f64> = model.markers.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![0.0, 3.0, 4.0, 5.0]);
        assert_eq!(model.markers[0].anchor, TextAnchor::End);
        assert_eq!(model.markers[3].anchor, TextAnchor::Start);
    }

    #[test]
    fn test_pointer_tracks_rating() {
        let config = GaugeConfig::default();
        let model = build_gauge(&dataset(), &Segregation::new(), &area(), &config, 2.5);
        let (tx, ty) = model.pointer.tip;
        assert!((tx - model.center.0).abs() < 1e-9);
        assert!((model.center.1 - ty - model.radius * config.pointer_size).abs() < 1e-9);
        assert_eq!(model.value, 4.2);
        assert_eq!(model.rating, 2.5);

        let settled = build_gauge(&dataset(), &Segregation::new(), &area(), &config, 4.2);
        assert_eq!(settled.value_text, "4");
    }

    #[test]
    fn test_dial_stays_in_upper_half() {
        let model = build_gauge(&dataset(), &Segregation::new(), &area(), &GaugeConfig::default(), 0.0);
        for marker in &model.markers {
            assert!(marker.y <= model.center.1 + 1e-9);
        }
        assert!(model.center.1 + 1e-9 >= model.area.top + model.radius);
    }
}
