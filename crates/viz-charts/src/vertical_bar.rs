//! Vertical bar (row) chart engine
//!
//! One horizontal bar per parent category followed by its children. The
//! canvas height follows the row count, so the drawing area is recomputed
//! from the config on every layout.

use crate::{
    chartkit::{format_percentage, format_value},
    colors,
    segment::{active_items, proportion, sort_descending, Segregation, Totals},
    DrawingArea,
};
use viz_core::{DatasetItem, VerticalBarConfig};

/// Gap between a bar end and its value label
const VALUE_GAP: f64 = 6.0;

/// Gap between the drawing area and the row names
const NAME_GAP: f64 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BarRow {
    /// Index of the parent in the dataset
    pub index: usize,
    /// Index of the child under its parent, `None` for parent rows
    pub child: Option<usize>,
    pub dataset_id: String,
    pub name: String,
    pub color: String,
    pub value: f64,
    /// Share of the active total (children: share of their parent)
    pub proportion: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub name_x: f64,
    pub value_x: f64,
    pub text: String,
}

impl BarRow {
    pub fn is_child(&self) -> bool {
        self.child.is_some()
    }

    /// Vertical center of the bar
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerticalBarModel {
    pub rows: Vec<BarRow>,
    pub totals: Totals,
    pub max_value: f64,
    pub area: DrawingArea,
}

/// Canvas height needed for `rows` bars
pub fn vertical_bar_height(rows: usize, config: &VerticalBarConfig) -> f64 {
    let padding = &config.canvas.padding;
    rows as f64 * (config.bar_height + config.bar_gap) + padding.top + padding.bottom
}

pub fn build_vertical_bar(
    items: &[DatasetItem],
    segregated: &Segregation,
    config: &VerticalBarConfig,
) -> VerticalBarModel {
    let mut parents = active_items(items, segregated);
    sort_descending(&mut parents);

    let totals = Totals::of(parents.iter().map(|(_, item)| item.total()));

    // (parent index, child index, item, color)
    let mut entries: Vec<(usize, Option<usize>, &DatasetItem, String)> = Vec::new();
    for &(index, parent) in &parents {
        entries.push((index, None, parent, parent.color.clone()));
        if !config.show_children {
            continue;
        }

        let mut children: Vec<(usize, &DatasetItem)> = parent.children.iter().enumerate().collect();
        sort_descending(&mut children);
        for (child_index, child) in children {
            let color = if child.color.is_empty() {
                colors::lighten(&parent.color, config.child_lighten)
            } else {
                child.color.clone()
            };
            entries.push((index, Some(child_index), child, color));
        }
    }

    let full_height = vertical_bar_height(entries.len(), config);
    let area = DrawingArea::compute(config.canvas.width, full_height, &config.canvas.padding);
    let max_value = entries
        .iter()
        .map(|(_, _, item, _)| item.total())
        .fold(0.0, f64::max);

    let rows = entries
        .into_iter()
        .enumerate()
        .map(|(row, (index, child, item, color))| {
            let value = item.total();
            let share = match child {
                None => proportion(value, totals.total),
                Some(_) => proportion(value, items[index].total()),
            };
            let width = if max_value > 0.0 {
                (value.max(0.0) / max_value * area.width).max(0.0)
            } else {
                0.0
            };
            let x = area.left;
            let text = if config.show_values {
                format!(
                    "{} ({})",
                    format_value(value, config.rounding_value),
                    format_percentage(share, config.rounding_percentage)
                )
            } else {
                String::new()
            };

            BarRow {
                index,
                child,
                dataset_id: item.dataset_id.clone(),
                name: item.name.clone(),
                color,
                value,
                proportion: share,
                x,
                y: area.top + row as f64 * (config.bar_height + config.bar_gap),
                width,
                height: config.bar_height,
                name_x: area.left - NAME_GAP,
                value_x: x + width + VALUE_GAP,
                text,
            }
        })
        .collect();

    tracing::trace!("vertical bar layout: canvas height {}", full_height);

    VerticalBarModel {
        rows,
        totals,
        max_value,
        area,
    }
}
