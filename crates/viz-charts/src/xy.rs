//! Cartesian (xy) chart engine
//!
//! Bar, line and plot series share one grid of x slots. All y positions go
//! through a single zero baseline, which shifts up when any value is
//! negative so positive and negative values share one scale.

use crate::{
    chartkit::{area_path, format_large_number, format_percentage, format_value, line_path, LinearScale},
    segment::{active_items, Segregation},
    DrawingArea,
};
use viz_core::{DatasetItem, SeriesKind, XyConfig};

/// Vertical gap between the drawing area and the x labels
const X_LABEL_OFFSET: f64 = 20.0;

/// Horizontal gap between the drawing area and the y labels
const Y_LABEL_OFFSET: f64 = 8.0;

// ============================================================================
// ZERO BASELINE
// ============================================================================

/// Shared normalization for positive and negative values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    /// `|min|` when the minimum is negative, else 0
    pub relative_zero: f64,
    /// `max + relative_zero`
    pub absolute_max: f64,
}

impl Baseline {
    pub fn new(min: f64, max: f64) -> Self {
        let relative_zero = if min < 0.0 { min.abs() } else { 0.0 };
        Self {
            relative_zero,
            absolute_max: max + relative_zero,
        }
    }

    /// Screen y of a value inside the drawing area
    pub fn value_to_y(&self, value: f64, area: &DrawingArea) -> f64 {
        // A flat all-zero dataset still needs a finite scale
        let absolute_max = if self.absolute_max > 0.0 { self.absolute_max } else { 1.0 };
        area.bottom_edge() - area.height * (value + self.relative_zero) / absolute_max
    }
}

// ============================================================================
// MODEL
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct XyBar {
    pub slot: usize,
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Least-squares trend over a series
#[derive(Debug, Clone, PartialEq)]
pub struct Progression {
    pub slope: f64,
    pub intercept: f64,
    pub start: (f64, f64),
    pub end: (f64, f64),
    /// Relative change between the fitted first and last values
    pub trend: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XySeries {
    pub index: usize,
    pub dataset_id: String,
    pub name: String,
    pub color: String,
    pub kind: SeriesKind,
    pub values: Vec<f64>,
    /// Slot-center points for lines and plots, bar tops for bars
    pub points: Vec<(f64, f64)>,
    pub bars: Vec<XyBar>,
    pub line: Option<String>,
    pub area: Option<String>,
    pub data_labels: Vec<String>,
    pub progression: Option<Progression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XyModel {
    pub series: Vec<XySeries>,
    pub min: f64,
    pub max: f64,
    pub baseline: Baseline,
    pub zero_y: f64,
    pub slot_count: usize,
    pub slot_width: f64,
    pub y_ticks: Vec<AxisTick>,
    pub x_labels: Vec<AxisTick>,
    pub area: DrawingArea,
}

// ============================================================================
// LAYOUT
// ============================================================================

/// Finite `(min, max)` over all values; `(0, 0)` when there are none
pub fn value_extent<'a>(values: impl IntoIterator<Item = &'a f64>) -> (f64, f64) {
    values
        .into_iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })
        .unwrap_or((0.0, 0.0))
}

pub fn build_xy(
    items: &[DatasetItem],
    segregated: &Segregation,
    area: &DrawingArea,
    config: &XyConfig,
) -> XyModel {
    let active = active_items(items, segregated);

    let slot_count = active
        .iter()
        .map(|(_, item)| item.values.len())
        .max()
        .unwrap_or(0);
    let slot_width = if slot_count == 0 { 0.0 } else { area.width / slot_count as f64 };

    let (min, max) = value_extent(active.iter().flat_map(|(_, item)| item.values.iter()));
    let baseline = Baseline::new(min, max);
    let zero_y = baseline.value_to_y(0.0, area);

    let bar_count = active
        .iter()
        .filter(|(_, item)| item.series_kind() == SeriesKind::Bar)
        .count();
    let mut bar_rank = 0;

    let series = active
        .iter()
        .map(|&(index, item)| {
            let kind = item.series_kind();
            let values: Vec<f64> = item
                .values
                .iter()
                .map(|&v| if v.is_finite() { v } else { 0.0 })
                .collect();

            let mut series = XySeries {
                index,
                dataset_id: item.dataset_id.clone(),
                name: item.name.clone(),
                color: item.color.clone(),
                kind,
                points: Vec::with_capacity(values.len()),
                bars: Vec::new(),
                line: None,
                area: None,
                data_labels: values
                    .iter()
                    .map(|&v| format_value(v, config.rounding_value))
                    .collect(),
                progression: None,
                values,
            };

            match kind {
                SeriesKind::Bar => {
                    let sub_width = slot_width / bar_count.max(1) as f64;
                    let inset = sub_width * config.bar.padding_ratio.clamp(0.0, 0.49);
                    for (slot, &value) in series.values.iter().enumerate() {
                        let x = area.left + slot_width * slot as f64 + sub_width * bar_rank as f64 + inset;
                        let y = baseline.value_to_y(value, area);
                        let bar = XyBar {
                            slot,
                            value,
                            x,
                            y: y.min(zero_y),
                            width: sub_width - 2.0 * inset,
                            height: (y - zero_y).abs(),
                        };
                        series.points.push((x + bar.width / 2.0, y));
                        series.bars.push(bar);
                    }
                    bar_rank += 1;
                }
                SeriesKind::Line | SeriesKind::Plot => {
                    for (slot, &value) in series.values.iter().enumerate() {
                        let x = area.left + slot_width * slot as f64 + slot_width / 2.0;
                        series.points.push((x, baseline.value_to_y(value, area)));
                    }
                    if kind == SeriesKind::Line {
                        series.line = Some(line_path(&series.points));
                        if config.line.use_area {
                            series.area = Some(area_path(&series.points, zero_y));
                        }
                    }
                }
            }

            if item.use_progression && config.progression.show {
                series.progression =
                    linear_progression(&series.values, &series.points, &baseline, area, config);
            }

            series
        })
        .collect();

    XyModel {
        series,
        min,
        max,
        baseline,
        zero_y,
        slot_count,
        slot_width,
        y_ticks: y_ticks(min, max, &baseline, area, config),
        x_labels: x_labels(slot_count, slot_width, area, config),
        area: *area,
    }
}

/// Least-squares fit of values over their slot index, drawn between the
/// first and last plotted x. Needs at least two points.
pub fn linear_progression(
    values: &[f64],
    points: &[(f64, f64)],
    baseline: &Baseline,
    area: &DrawingArea,
    config: &XyConfig,
) -> Option<Progression> {
    let n = values.len();
    if n < 2 || points.len() != n {
        return None;
    }

    let nf = n as f64;
    let (sum_x, sum_y, sum_xy, sum_xx) = values.iter().enumerate().fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxy, sxx), (i, &y)| {
            let x = i as f64;
            (sx + x, sy + y, sxy + x * y, sxx + x * x)
        },
    );

    let denominator = nf * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }
    let slope = (nf * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / nf;

    let first = intercept;
    let last = intercept + slope * (nf - 1.0);
    let trend = if first == 0.0 { f64::NAN } else { (last - first) / first.abs() };

    Some(Progression {
        slope,
        intercept,
        start: (points[0].0, baseline.value_to_y(first, area)),
        end: (points[n - 1].0, baseline.value_to_y(last, area)),
        trend,
        label: format_percentage(trend, config.progression.rounding),
    })
}

fn y_ticks(min: f64, max: f64, baseline: &Baseline, area: &DrawingArea, config: &XyConfig) -> Vec<AxisTick> {
    if !config.grid.show {
        return Vec::new();
    }

    LinearScale::new()
        .domain(min.min(0.0), max)
        .nice_ticks(config.grid.y_ticks)
        .into_iter()
        .map(|value| AxisTick {
            value,
            x: area.left - Y_LABEL_OFFSET,
            y: baseline.value_to_y(value, area),
            text: tick_text(value, config.rounding_value),
        })
        .collect()
}

/// Thousands and above are shortened with a K/M/B suffix
fn tick_text(value: f64, rounding: usize) -> String {
    if value.abs() >= 1_000.0 {
        format_large_number(value)
    } else {
        format_value(value, rounding)
    }
}

fn x_labels(slot_count: usize, slot_width: f64, area: &DrawingArea, config: &XyConfig) -> Vec<AxisTick> {
    if !config.grid.show_x_labels {
        return Vec::new();
    }

    (0..slot_count)
        .filter_map(|slot| {
            let text = config.x_labels.get(slot)?;
            Some(AxisTick {
                value: slot as f64,
                x: area.left + slot_width * slot as f64 + slot_width / 2.0,
                y: area.bottom_edge() + X_LABEL_OFFSET,
                text: text.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use viz_core::dataset::normalize;

    fn area() -> DrawingArea {
        DrawingArea::compute(800.0, 450.0, &viz_core::Padding::new(48.0, 24.0, 48.0, 64.0))
    }

    #[test]
    fn test_zero_baseline_with_negatives() {
        let items = normalize(&json!([{ "name": "s", "values": [-5, 3, -2, 8] }]), &[]);
        let area = area();
        let model = build_xy(&items, &Segregation::new(), &area, &XyConfig::default());

        assert_eq!(model.baseline.relative_zero, 5.0);
        assert_eq!(model.baseline.absolute_max, 13.0);
        let expected = area.bottom_edge() - area.height * (5.0 / 13.0);
        assert!((model.zero_y - expected).abs() < 1e-9);
    }

    #[test]
    fn test_positive_values_sit_on_bottom() {
        let baseline = Baseline::new(2.0, 10.0);
        assert_eq!(baseline.relative_zero, 0.0);
        let area = area();
        assert_eq!(baseline.value_to_y(0.0, &area), area.bottom_edge());
        assert_eq!(baseline.value_to_y(10.0, &area), area.top);
    }

    #[test]
    fn test_flat_zero_dataset_stays_finite() {
        let items = normalize(&json!([{ "values": [0, 0] }]), &[]);
        let model = build_xy(&items, &Segregation::new(), &area(), &XyConfig::default());
        assert!(model.series[0].points.iter().all(|(x, y)| x.is_finite() && y.is_finite()));
    }

    #[test]
    fn test_bars_split_slots_and_grow_from_zero() {
        let items = normalize(
            &json!([
                { "name": "a", "values": [4, -2], "type": "bar" },
                { "name": "b", "values": [1, 2], "type": "bar" },
                { "name": "c", "values": [3, 3], "type": "line" }
            ]),
            &[],
        );
        let config = XyConfig {
            bar: viz_core::XyBarConfig { padding_ratio: 0.0, radius: 0.0 },
            ..Default::default()
        };
        let area = area();
        let model = build_xy(&items, &Segregation::new(), &area, &config);

        assert_eq!(model.slot_count, 2);
        let slot = area.width / 2.0;
        let a = &model.series[0].bars;
        let b = &model.series[1].bars;
        assert!((a[0].width - slot / 2.0).abs() < 1e-9);
        assert!((b[0].x - (area.left + slot / 2.0)).abs() < 1e-9);

        // Positive bar ends on the zero line, negative bar starts on it
        assert!((a[0].y + a[0].height - model.zero_y).abs() < 1e-9);
        assert!((a[1].y - model.zero_y).abs() < 1e-9);
        assert!(a[1].height > 0.0);

        // Lines get slot-center points and a path
        let c = &model.series[2];
        assert!((c.points[0].0 - (area.left + slot / 2.0)).abs() < 1e-9);
        assert!(c.line.as_deref().is_some_and(|p| p.starts_with('M')));
    }

    #[test]
    fn test_series_order_is_preserved() {
        let items = normalize(&json!([{ "name": "small", "values": [1] }, { "name": "big", "values": [9] }]), &[]);
        let model = build_xy(&items, &Segregation::new(), &area(), &XyConfig::default());
        let names: Vec<&str> = model.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["small", "big"]);
    }

    #[test]
    fn test_area_fill_closes_on_zero_line() {
        let items = normalize(&json!([{ "values": [1, 2, 3] }]), &[]);
        let mut config = XyConfig::default();
        config.line.use_area = true;
        let model = build_xy(&items, &Segregation::new(), &area(), &config);
        assert!(model.series[0].area.as_deref().is_some_and(|p| p.ends_with('Z')));
    }

    #[test]
    fn test_progression_on_linear_series() {
        let items = normalize(&json!([{ "values": [10, 15, 20], "useProgression": true }]), &[]);
        let model = build_xy(&items, &Segregation::new(), &area(), &XyConfig::default());
        let progression = model.series[0].progression.as_ref().unwrap();

        assert!((progression.slope - 5.0).abs() < 1e-9);
        assert!((progression.intercept - 10.0).abs() < 1e-9);
        assert!((progression.trend - 1.0).abs() < 1e-9);
        assert_eq!(progression.label, "100.0%");

        // Exact fit: the trend line runs through the plotted points
        let points = &model.series[0].points;
        assert!((progression.start.1 - points[0].1).abs() < 1e-9);
        assert!((progression.end.1 - points[2].1).abs() < 1e-9);
    }

    #[test]
    fn test_progression_needs_two_points() {
        let items = normalize(&json!([{ "values": [10], "useProgression": true }]), &[]);
        let model = build_xy(&items, &Segregation::new(), &area(), &XyConfig::default());
        assert!(model.series[0].progression.is_none());
    }

    #[test]
    fn test_y_ticks_include_zero() {
        let items = normalize(&json!([{ "values": [3, 8] }]), &[]);
        let model = build_xy(&items, &Segregation::new(), &area(), &XyConfig::default());
        assert_eq!(model.y_ticks.first().map(|t| t.value), Some(0.0));
        assert_eq!(model.y_ticks.last().map(|t| t.value), Some(8.0));
    }

    #[test]
    fn test_large_y_ticks_are_shortened() {
        let items = normalize(&json!([{ "values": [0, 5000] }]), &[]);
        let model = build_xy(&items, &Segregation::new(), &area(), &XyConfig::default());
        assert_eq!(model.y_ticks.first().map(|t| t.text.as_str()), Some("0.0"));
        assert_eq!(model.y_ticks.last().map(|t| t.text.as_str()), Some("5.00K"));
    }

    #[test]
    fn test_x_labels_from_config() {
        let items = normalize(&json!([{ "values": [1, 2, 3] }]), &[]);
        let config = XyConfig {
            x_labels: vec!["Jan".into(), "Feb".into()],
            ..Default::default()
        };
        let model = build_xy(&items, &Segregation::new(), &area(), &config);
        let labels: Vec<&str> = model.x_labels.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(labels, vec!["Jan", "Feb"]);
    }
}
