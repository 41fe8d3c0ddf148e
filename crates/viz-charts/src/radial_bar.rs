//! Radial bar chart engine
//!
//! Concentric rings, largest value outermost. Each ring is a full gutter
//! circle under a track circle whose visible length comes from its
//! stroke-dasharray/dashoffset, rotated so tracks start at 12 o'clock.

use crate::{
    chartkit::{format_percentage, TextAnchor},
    segment::{active_items, proportion, sort_descending, Segregation, Totals},
    DrawingArea,
};
use std::f64::consts::TAU;
use viz_core::{DatasetItem, RadialBarConfig};

/// Gap between a ring's start and its label
const LABEL_GAP: f64 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RingLabel {
    pub x: f64,
    pub y: f64,
    pub anchor: TextAnchor,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub index: usize,
    pub dataset_id: String,
    pub name: String,
    pub color: String,
    pub value: f64,
    pub proportion: f64,
    pub radius: f64,
    pub circumference: f64,
    pub dasharray: f64,
    pub dashoffset: f64,
    pub stroke_width: f64,
    pub label: Option<RingLabel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadialBarModel {
    pub rings: Vec<Ring>,
    pub totals: Totals,
    pub center: (f64, f64),
    pub max_radius: f64,
    pub gutter_color: String,
    pub area: DrawingArea,
}

impl RadialBarModel {
    /// Rotation putting the dash origin at 12 o'clock
    pub fn track_transform(&self) -> String {
        format!("rotate(-90 {} {})", self.center.0, self.center.1)
    }
}

pub fn build_radial_bar(
    items: &[DatasetItem],
    segregated: &Segregation,
    area: &DrawingArea,
    config: &RadialBarConfig,
) -> RadialBarModel {
    let mut active = active_items(items, segregated);
    sort_descending(&mut active);

    let totals = Totals::of(active.iter().map(|(_, item)| item.total()));
    let center = (area.center_x, area.center_y);
    let max_radius = (area.width.min(area.height) / 2.0).max(0.0);
    let count = active.len();
    let spacing = if count == 0 { 0.0 } else { max_radius / count as f64 };

    let rings = active
        .into_iter()
        .enumerate()
        .map(|(rank, (index, item))| {
            let value = item.total();
            let share = proportion(value, totals.total);
            let radius = max_radius * (count - rank) as f64 / count as f64;
            let circumference = TAU * radius;
            let visible = if share.is_finite() { share.clamp(0.0, 1.0) } else { 0.0 };

            let label = config.show_labels.then(|| RingLabel {
                x: center.0 - LABEL_GAP,
                y: center.1 - radius,
                anchor: TextAnchor::End,
                text: format!("{} {}", item.name, format_percentage(share, config.rounding_percentage)),
            });

            Ring {
                index,
                dataset_id: item.dataset_id.clone(),
                name: item.name.clone(),
                color: item.color.clone(),
                value,
                proportion: share,
                radius,
                circumference,
                dasharray: circumference,
                dashoffset: circumference * (1.0 - visible),
                stroke_width: spacing * config.track_ratio,
                label,
            }
        })
        .collect();

    RadialBarModel {
        rings,
        totals,
        center,
        max_radius,
        gutter_color: config.gutter_color.clone(),
        area: *area,
    }
}
