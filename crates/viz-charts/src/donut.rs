//! Donut chart engine
//!
//! Segments run clockwise from 12 o'clock, sorted by descending value.
//! Each segment's start is the cumulative proportion of the segments before
//! it, its sweep its own proportion of the full turn.

use crate::{
    chartkit::{clock_angle, format_percentage, format_value, polar, ring_segment_path, TextAnchor},
    segment::{active_items, proportion, sort_descending, Segregation, Totals},
    DrawingArea,
};
use std::f64::consts::TAU;
use viz_core::{DatasetItem, DonutConfig};

/// Labels within this distance of the centerline are centered
const ANCHOR_TOLERANCE: f64 = 4.0;

/// Vertical shift applied to labels near the top or bottom of the ring
const LABEL_NUDGE: f64 = 12.0;

/// Share of the label radius past which a label counts as top/bottom extreme
const EXTREME_RATIO: f64 = 0.85;

/// Data label outside the ring
#[derive(Debug, Clone, PartialEq)]
pub struct ArcLabel {
    pub x: f64,
    pub y: f64,
    pub anchor: TextAnchor,
    /// Point on the outer edge the label refers to
    pub marker: (f64, f64),
    pub text: String,
}

/// One donut segment
#[derive(Debug, Clone, PartialEq)]
pub struct DonutArc {
    /// Index in the dataset
    pub index: usize,
    pub dataset_id: String,
    pub name: String,
    pub color: String,
    pub value: f64,
    pub proportion: f64,
    /// Screen angle of the segment start
    pub start_angle: f64,
    pub sweep: f64,
    pub path: String,
    pub label: Option<ArcLabel>,
}

impl DonutArc {
    /// Screen angle of the bisector
    pub fn mid_angle(&self) -> f64 {
        self.start_angle + self.sweep / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonutModel {
    pub arcs: Vec<DonutArc>,
    pub totals: Totals,
    pub center: (f64, f64),
    pub outer_radius: f64,
    pub inner_radius: f64,
    pub area: DrawingArea,
}

impl DonutModel {
    pub fn proportions(&self) -> Vec<f64> {
        self.arcs.iter().map(|arc| arc.proportion).collect()
    }
}

/// Lay out donut segments over the active items
pub fn build_donut(
    items: &[DatasetItem],
    segregated: &Segregation,
    area: &DrawingArea,
    config: &DonutConfig,
) -> DonutModel {
    let mut active = active_items(items, segregated);
    sort_descending(&mut active);

    let totals = Totals::of(active.iter().map(|(_, item)| item.total()));
    let center = (area.center_x, area.center_y);
    let outer_radius = (area.width.min(area.height) / 2.0).max(0.0);
    let inner_radius = (outer_radius - config.arc_width).max(0.0);

    let mut arcs = Vec::with_capacity(active.len());
    let mut cumulative = 0.0;

    for (index, item) in active {
        let value = item.total();
        let share = proportion(value, totals.total);
        if !share.is_finite() || share <= 0.0 {
            continue;
        }

        let start_angle = clock_angle(cumulative * TAU);
        let sweep = share * TAU;
        cumulative += share;

        let path = ring_segment_path(center.0, center.1, outer_radius, inner_radius, start_angle, sweep);
        let label = config
            .show_data_labels
            .then(|| arc_label(center, outer_radius, start_angle + sweep / 2.0, share, config))
            .flatten();

        arcs.push(DonutArc {
            index,
            dataset_id: item.dataset_id.clone(),
            name: item.name.clone(),
            color: item.color.clone(),
            value,
            proportion: share,
            start_angle,
            sweep,
            path,
            label,
        });
    }

    tracing::trace!("donut layout: {} arcs, total {}", arcs.len(), totals.total);

    DonutModel {
        arcs,
        totals,
        center,
        outer_radius,
        inner_radius,
        area: *area,
    }
}

/// Label on the bisector, hidden under the configured percentage
fn arc_label(
    center: (f64, f64),
    outer_radius: f64,
    mid_angle: f64,
    share: f64,
    config: &DonutConfig,
) -> Option<ArcLabel> {
    if share * 100.0 < config.hide_label_under {
        return None;
    }

    let radius = outer_radius + config.label_offset;
    let (x, y) = polar(center.0, center.1, radius, mid_angle);
    let marker = polar(center.0, center.1, outer_radius, mid_angle);

    let nudge = if y < center.1 - radius * EXTREME_RATIO {
        -LABEL_NUDGE
    } else if y > center.1 + radius * EXTREME_RATIO {
        LABEL_NUDGE
    } else {
        0.0
    };

    Some(ArcLabel {
        x,
        y: y + nudge,
        anchor: TextAnchor::around(x, center.0, ANCHOR_TOLERANCE),
        marker,
        text: format_percentage(share, config.rounding_percentage),
    })
}

/// Text for the donut hole: total and/or average
pub fn center_lines(model: &DonutModel, config: &DonutConfig) -> Vec<String> {
    let mut lines = Vec::new();
    if config.show_total {
        lines.push(format!("Total: {}", format_value(model.totals.total, config.rounding_value)));
    }
    if config.show_average {
        lines.push(format!("Average: {}", format_value(model.totals.average, config.rounding_value)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::f64::consts::PI;
    use viz_core::{colors, dataset::normalize};

    fn area() -> DrawingArea {
        DrawingArea::compute(512.0, 512.0, &viz_core::Padding::uniform(64.0))
    }

    #[test]
    fn test_thirty_seventy_scenario() {
        let palette = colors::default_palette();
        let items = normalize(&json!([{ "value": 30 }, { "value": 70 }]), &palette);
        assert_eq!(items[0].color, palette[0]);
        assert_eq!(items[1].color, palette[1]);

        let model = build_donut(&items, &Segregation::new(), &area(), &DonutConfig::default());
        assert_eq!(model.totals.total, 100.0);
        assert_eq!(model.totals.average, 50.0);

        // Sorted descending: 70 first
        assert_eq!(model.arcs[0].index, 1);
        assert!((model.arcs[0].proportion - 0.7).abs() < 1e-12);
        assert!((model.arcs[1].proportion - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_angles_start_at_twelve_and_accumulate() {
        let items = normalize(&json!([{ "value": 1 }, { "value": 1 }]), &[]);
        let model = build_donut(&items, &Segregation::new(), &area(), &DonutConfig::default());

        assert!((model.arcs[0].start_angle - (-PI / 2.0)).abs() < 1e-12);
        assert!((model.arcs[0].sweep - PI).abs() < 1e-12);
        assert!((model.arcs[1].start_angle - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_segment_is_full_ring() {
        let items = normalize(&json!([{ "value": 5 }]), &[]);
        let model = build_donut(&items, &Segregation::new(), &area(), &DonutConfig::default());
        assert_eq!(model.arcs.len(), 1);
        assert_eq!(model.arcs[0].path.matches('A').count(), 4);
    }

    #[test]
    fn test_label_anchor_and_threshold() {
        let items = normalize(&json!([{ "value": 98 }, { "value": 2 }]), &[]);
        let model = build_donut(&items, &Segregation::new(), &area(), &DonutConfig::default());

        // 98% bisector sits just right of 6 o'clock
        let big = model.arcs[0].label.as_ref().unwrap();
        assert_eq!(big.anchor, TextAnchor::Start);
        assert!(big.y > model.center.1);
        assert_eq!(big.text, "98%");

        // 2% is under the default 3% threshold
        assert!(model.arcs[1].label.is_none());
    }

    #[test]
    fn test_bottom_label_is_nudged_down() {
        let items = normalize(&json!([{ "value": 1 }]), &[]);
        let model = build_donut(&items, &Segregation::new(), &area(), &DonutConfig::default());
        // Full ring bisector sits at 6 o'clock
        let label = model.arcs[0].label.as_ref().unwrap();
        assert!(label.y > model.center.1 + model.outer_radius + DonutConfig::default().label_offset);
        assert_eq!(label.anchor, TextAnchor::Middle);
    }

    #[test]
    fn test_zero_total_renders_placeholder() {
        let items = normalize(&json!([{ "value": 0 }, { "value": 0 }]), &[]);
        let config = DonutConfig {
            show_average: true,
            ..Default::default()
        };
        let model = build_donut(&items, &Segregation::new(), &area(), &config);
        assert!(model.arcs.is_empty());
        assert_eq!(center_lines(&model, &config), vec!["Total: 0", "Average: 0"]);

        let empty = build_donut(&[], &Segregation::new(), &area(), &config);
        assert_eq!(center_lines(&empty, &config), vec!["Total: 0", "Average: -"]);
    }

    #[test]
    fn test_segregated_items_leave_totals() {
        let items = normalize(&json!([{ "value": 30 }, { "value": 70 }]), &[]);
        let mut seg = Segregation::new();
        seg.toggle(&items[1].dataset_id);
        let model = build_donut(&items, &seg, &area(), &DonutConfig::default());
        assert_eq!(model.totals.total, 30.0);
        assert_eq!(model.arcs.len(), 1);
        assert_eq!(model.arcs[0].proportion, 1.0);

        seg.toggle(&items[1].dataset_id);
        let restored = build_donut(&items, &seg, &area(), &DonutConfig::default());
        assert_eq!(restored.totals.total, 100.0);
        assert_eq!(restored.totals.average, 50.0);
    }

    proptest! {
        #[test]
        fn prop_donut_proportions_sum_to_one(values in prop::collection::vec(0.01f64..1e6, 1..24)) {
            let data = serde_json::Value::Array(values.iter().map(|v| json!({ "value": v })).collect());
            let items = normalize(&data, &[]);
            let model = build_donut(&items, &Segregation::new(), &area(), &DonutConfig::default());
            let sum: f64 = model.proportions().iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }
    }
}
