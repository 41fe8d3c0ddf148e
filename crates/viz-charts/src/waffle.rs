//! Waffle chart engine
//!
//! An N×N grid of cells filled row-major by series in descending order.
//! Cell counts come from rounding the running cumulative share, so rounding
//! drift is carried forward and the counts always add up to N².

use crate::{
    segment::{active_items, proportion, sort_descending, Segregation, Totals},
    DrawingArea,
};
use viz_core::{DatasetItem, WaffleConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct WaffleSeries {
    pub index: usize,
    pub dataset_id: String,
    pub name: String,
    pub color: String,
    pub value: f64,
    pub proportion: f64,
    /// First cell position owned by the series
    pub start: usize,
    pub cells: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaffleCell {
    /// Row-major position in the grid
    pub position: usize,
    pub row: usize,
    pub col: usize,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    /// Index into `WaffleModel::series`
    pub series: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaffleModel {
    pub series: Vec<WaffleSeries>,
    pub cells: Vec<WaffleCell>,
    pub grid_size: usize,
    pub cell_size: f64,
    pub totals: Totals,
    pub area: DrawingArea,
}

/// Cells per value from cumulative rounding:
/// `round(cum_i × cells) - round(cum_{i-1} × cells)`.
///
/// The last boundary is pinned to `cells` so float error in the running sum
/// cannot lose or add a cell. A non-positive total allocates nothing.
pub fn allocate_cells(values: &[f64], cells: usize) -> Vec<usize> {
    let clean: Vec<f64> = values
        .iter()
        .map(|&v| if v.is_finite() { v.max(0.0) } else { 0.0 })
        .collect();
    let total: f64 = clean.iter().sum();
    if total <= 0.0 {
        return vec![0; values.len()];
    }

    let last = clean.len().saturating_sub(1);
    let mut cumulative = 0.0;
    let mut previous_end = 0usize;

    clean
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            cumulative += value;
            let end = if i == last {
                cells
            } else {
                ((cumulative / total * cells as f64).round() as usize).min(cells)
            };
            let count = end.saturating_sub(previous_end);
            previous_end = previous_end.max(end);
            count
        })
        .collect()
}

/// Largest grid edge drawn; bigger configured sizes are clamped
pub const MAX_GRID_SIZE: usize = 100;

pub fn build_waffle(
    items: &[DatasetItem],
    segregated: &Segregation,
    area: &DrawingArea,
    config: &WaffleConfig,
) -> WaffleModel {
    let mut active = active_items(items, segregated);
    sort_descending(&mut active);

    let grid_size = config.grid_size.clamp(1, MAX_GRID_SIZE);
    let cell_count = grid_size * grid_size;
    let totals = Totals::of(active.iter().map(|(_, item)| item.total()));
    let counts = allocate_cells(
        &active.iter().map(|(_, item)| item.total()).collect::<Vec<_>>(),
        cell_count,
    );

    let mut start = 0;
    let series: Vec<WaffleSeries> = active
        .iter()
        .zip(&counts)
        .map(|(&(index, item), &cells)| {
            let entry = WaffleSeries {
                index,
                dataset_id: item.dataset_id.clone(),
                name: item.name.clone(),
                color: item.color.clone(),
                value: item.total(),
                proportion: proportion(item.total(), totals.total),
                start,
                cells,
            };
            start += cells;
            entry
        })
        .collect();

    let cell_size = (area.width.min(area.height) / grid_size as f64).max(0.0);
    let origin_x = area.center_x - cell_size * grid_size as f64 / 2.0;
    let origin_y = area.center_y - cell_size * grid_size as f64 / 2.0;
    let gap = config.cell_gap.clamp(0.0, cell_size);

    let cells = series
        .iter()
        .enumerate()
        .flat_map(|(rank, s)| (s.start..s.start + s.cells).map(move |position| (rank, position)))
        .map(|(rank, position)| {
            let row = position / grid_size;
            let col = position % grid_size;
            WaffleCell {
                position,
                row,
                col,
                x: origin_x + col as f64 * cell_size + gap / 2.0,
                y: origin_y + row as f64 * cell_size + gap / 2.0,
                size: cell_size - gap,
                series: rank,
            }
        })
        .collect();

    WaffleModel {
        series,
        cells,
        grid_size,
        cell_size,
        totals,
        area: *area,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use viz_core::dataset::normalize;

    fn area() -> DrawingArea {
        DrawingArea::compute(512.0, 512.0, &viz_core::Padding::uniform(56.0))
    }

    #[test]
    fn test_cumulative_rounding() {
        // Thirds of 100: 33.33 -> 33, 66.67 -> 67, 100
        assert_eq!(allocate_cells(&[1.0, 1.0, 1.0], 100), vec![33, 34, 33]);
        assert_eq!(allocate_cells(&[50.0, 30.0, 20.0], 100), vec![50, 30, 20]);
        assert_eq!(allocate_cells(&[0.0, 0.0], 100), vec![0, 0]);
        assert!(allocate_cells(&[], 100).is_empty());
    }

    #[test]
    fn test_tiny_series_can_get_zero_cells() {
        let counts = allocate_cells(&[999.0, 1.0], 100);
        assert_eq!(counts, vec![100, 0]);
    }

    #[test]
    fn test_cells_are_row_major_and_sorted() {
        let items = normalize(&json!([{ "value": 25 }, { "value": 75 }]), &[]);
        let config = WaffleConfig { grid_size: 4, cell_gap: 0.0, ..Default::default() };
        let model = build_waffle(&items, &Segregation::new(), &area(), &config);

        assert_eq!(model.series[0].index, 1);
        assert_eq!(model.series[0].cells, 12);
        assert_eq!(model.series[1].start, 12);
        assert_eq!(model.cells.len(), 16);

        let cell = &model.cells[5];
        assert_eq!((cell.row, cell.col), (1, 1));
        assert_eq!(cell.size, 100.0);
        assert_eq!(cell.x, 56.0 + 100.0);
    }

    #[test]
    fn test_gap_shrinks_cells() {
        let items = normalize(&json!([{ "value": 1 }]), &[]);
        let config = WaffleConfig { grid_size: 4, cell_gap: 4.0, ..Default::default() };
        let model = build_waffle(&items, &Segregation::new(), &area(), &config);
        assert_eq!(model.cells[0].size, 96.0);
        assert_eq!(model.cells[0].x, 58.0);
    }

    #[test]
    fn test_oversized_grid_is_clamped() {
        let items = normalize(&json!([{ "value": 1 }]), &[]);
        let config = WaffleConfig { grid_size: usize::MAX, ..Default::default() };
        let model = build_waffle(&items, &Segregation::new(), &area(), &config);
        assert_eq!(model.grid_size, MAX_GRID_SIZE);
        assert_eq!(model.cells.len(), MAX_GRID_SIZE * MAX_GRID_SIZE);
    }

    proptest! {
        #[test]
        fn prop_waffle_cells_are_conserved(
            values in prop::collection::vec(0.001f64..1e7, 1..30),
            n in 1usize..40,
        ) {
            let counts = allocate_cells(&values, n * n);
            prop_assert_eq!(counts.iter().sum::<usize>(), n * n);
        }

        #[test]
        fn prop_waffle_model_fills_grid(values in prop::collection::vec(1.0f64..1000.0, 1..12)) {
            let data = serde_json::Value::Array(values.iter().map(|v| json!({ "value": v })).collect());
            let items = normalize(&data, &[]);
            let model = build_waffle(&items, &Segregation::new(), &area(), &WaffleConfig::default());
            prop_assert_eq!(model.series.iter().map(|s| s.cells).sum::<usize>(), 100);
            prop_assert_eq!(model.cells.len(), 100);
            let sum: f64 = model.series.iter().map(|s| s.proportion).sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }
    }
}
