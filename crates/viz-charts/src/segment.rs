//! Proportion, ordering and segregation policies shared by the engines

use std::collections::BTreeSet;
use viz_core::DatasetItem;

// ============================================================================
// SEGREGATION
// ============================================================================

/// Dataset ids hidden through the legend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segregation(BTreeSet<String>);

impl Segregation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, dataset_id: &str) -> bool {
        self.0.contains(dataset_id)
    }

    /// Hide a visible id or show a hidden one. Returns true when now hidden.
    pub fn toggle(&mut self, dataset_id: &str) -> bool {
        if self.0.remove(dataset_id) {
            false
        } else {
            self.0.insert(dataset_id.to_string());
            true
        }
    }

    /// Drop ids that no longer exist in the dataset
    pub fn retain_known(&mut self, items: &[DatasetItem]) {
        self.0
            .retain(|id| items.iter().any(|item| &item.dataset_id == id));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

// ============================================================================
// ACTIVE SUBSET
// ============================================================================

/// Items not hidden by segregation, paired with their dataset index
pub fn active_items<'a>(items: &'a [DatasetItem], segregated: &Segregation) -> Vec<(usize, &'a DatasetItem)> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| !segregated.contains(&item.dataset_id))
        .collect()
}

/// Stable sort by descending total
pub fn sort_descending(entries: &mut [(usize, &DatasetItem)]) {
    entries.sort_by(|(_, a), (_, b)| b.total().total_cmp(&a.total()));
}

/// `value / total`, NaN when the total is zero or not finite
pub fn proportion(value: f64, total: f64) -> f64 {
    if total == 0.0 || !total.is_finite() {
        f64::NAN
    } else {
        value / total
    }
}

/// Proportions of each value over their sum
pub fn proportions(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    values.iter().map(|&v| proportion(v, total)).collect()
}

/// Aggregates over the active subset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub total: f64,
    pub average: f64,
    pub count: usize,
}

impl Totals {
    /// Average is NaN for an empty set
    pub fn of(values: impl IntoIterator<Item = f64>) -> Self {
        let (total, count) = values
            .into_iter()
            .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
        let average = if count == 0 { f64::NAN } else { total / count as f64 };
        Self { total, average, count }
    }
}

impl Default for Totals {
    fn default() -> Self {
        Self::of(std::iter::empty())
    }
}

// ============================================================================
// LEGEND ENTRIES
// ============================================================================

/// One legend row; segregated rows keep their place with a NaN proportion
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub index: usize,
    pub dataset_id: String,
    pub name: String,
    pub color: String,
    pub value: f64,
    pub proportion: f64,
    pub segregated: bool,
}

/// Legend rows in dataset order, proportions over the active total
pub fn legend_entries(items: &[DatasetItem], segregated: &Segregation) -> Vec<LegendEntry> {
    let active_total: f64 = active_items(items, segregated)
        .iter()
        .map(|(_, item)| item.total())
        .sum();

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let hidden = segregated.contains(&item.dataset_id);
            LegendEntry {
                index,
                dataset_id: item.dataset_id.clone(),
                name: item.name.clone(),
                color: item.color.clone(),
                value: item.total(),
                proportion: if hidden {
                    f64::NAN
                } else {
                    proportion(item.total(), active_total)
                },
                segregated: hidden,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<DatasetItem> {
        let mut items = vec![
            DatasetItem::new("a", 10.0),
            DatasetItem::new("b", 30.0),
            DatasetItem::new("c", 20.0),
        ];
        for (i, item) in items.iter_mut().enumerate() {
            item.dataset_id = format!("id{i}");
        }
        items
    }

    #[test]
    fn test_toggle_is_idempotent_in_pairs() {
        let mut seg = Segregation::new();
        assert!(seg.toggle("x"));
        assert!(seg.contains("x"));
        assert!(!seg.toggle("x"));
        assert!(seg.is_empty());
    }

    #[test]
    fn test_active_items_skip_segregated() {
        let items = items();
        let mut seg = Segregation::new();
        seg.toggle("id1");
        let active = active_items(&items, &seg);
        assert_eq!(active.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_sort_descending_keeps_indices() {
        let items = items();
        let mut active = active_items(&items, &Segregation::new());
        sort_descending(&mut active);
        assert_eq!(active.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![1, 2, 0]);
    }

    #[test]
    fn test_proportions_degenerate_to_nan() {
        assert!(proportions(&[0.0, 0.0]).iter().all(|p| p.is_nan()));
        assert!(proportions(&[]).is_empty());
        assert_eq!(proportions(&[1.0, 3.0]), vec![0.25, 0.75]);
    }

    #[test]
    fn test_totals() {
        let totals = Totals::of([30.0, 70.0]);
        assert_eq!(totals.total, 100.0);
        assert_eq!(totals.average, 50.0);
        assert_eq!(totals.count, 2);
        assert!(Totals::default().average.is_nan());
    }

    #[test]
    fn test_legend_entries_mark_segregated() {
        let items = items();
        let mut seg = Segregation::new();
        seg.toggle("id1");
        let legend = legend_entries(&items, &seg);
        assert_eq!(legend.len(), 3);
        assert!(legend[1].segregated);
        assert!(legend[1].proportion.is_nan());
        assert!((legend[0].proportion - 10.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_retain_known_ids() {
        let items = items();
        let mut seg = Segregation::new();
        seg.toggle("id0");
        seg.toggle("gone");
        seg.retain_known(&items);
        assert_eq!(seg.iter().collect::<Vec<_>>(), vec!["id0"]);
    }
}
