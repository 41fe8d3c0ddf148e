//! Per-chart state record

use crate::animation::GaugeAnimation;
use serde_json::Value;
use viz_charts::{
    active_items, format_percentage, format_value, proportion, range_bounds, ChartModel, DataTable,
    DrawingArea, HoverTarget, Segregation, SvgSurface, Totals,
};
use viz_core::{ChartConfig, ChartData, ChartId, ChartKind, Result};

/// Everything one chart instance owns between renders
#[derive(Debug, Clone)]
pub struct ChartState {
    pub id: ChartId,
    pub kind: ChartKind,
    pub config: ChartConfig,
    /// Merged config JSON; later patches merge onto it
    pub raw_config: Value,
    pub raw_dataset: Value,
    pub data: ChartData,
    pub area: DrawingArea,
    pub totals: Totals,
    pub model: ChartModel,
    /// Position of the hover target under the pointer
    pub selected_index: Option<usize>,
    pub segregated: Segregation,
    pub targets: Vec<HoverTarget>,
    /// Toolkit label toggle
    pub labels_visible: bool,
    /// Bumped by every config or dataset load
    pub revision: u64,
    /// Bumped by every render pass
    pub renders: u64,
    pub animation: Option<GaugeAnimation>,
    pub surface: SvgSurface,
}

impl ChartState {
    /// Resolve the config against its template and normalize the dataset.
    /// Nothing is drawn until the pipeline runs.
    pub fn new(kind: ChartKind, template: &Value, user_config: &Value, raw_dataset: Value) -> Result<Self> {
        let config = ChartConfig::resolve(kind, template, user_config)?;
        let raw_config = config.to_value()?;
        let data = ChartData::normalize_for(kind, &raw_dataset, config.palette());
        let area = DrawingArea::from_config(&config);
        let surface = SvgSurface::new(area.full_width, area.full_height);

        let mut state = Self {
            id: ChartId::new(),
            kind,
            config,
            raw_config,
            raw_dataset,
            data,
            area,
            totals: Totals::default(),
            model: ChartModel::Empty,
            selected_index: None,
            segregated: Segregation::new(),
            targets: Vec::new(),
            labels_visible: true,
            revision: 0,
            renders: 0,
            animation: None,
            surface,
        };
        state.restart_animation();
        Ok(state)
    }

    /// Element id prefix, unique per instance
    pub fn prefix(&self) -> String {
        format!("viz-{}", self.id.short())
    }

    /// Merge a partial config onto the current one.
    /// On error the state is left untouched.
    pub fn load_config(&mut self, patch: &Value) -> Result<()> {
        let config = ChartConfig::resolve(self.kind, &self.raw_config, patch)?;
        self.raw_config = config.to_value()?;
        self.config = config;
        self.revision += 1;
        self.restart_animation();
        Ok(())
    }

    /// Replace the dataset. Segregated ids that no longer exist are dropped.
    pub fn load_dataset(&mut self, raw_dataset: Value) {
        self.data = ChartData::normalize_for(self.kind, &raw_dataset, self.config.palette());
        self.raw_dataset = raw_dataset;
        self.segregated.retain_known(self.data.items());
        self.selected_index = None;
        self.revision += 1;
        self.restart_animation();
    }

    /// Drop the drawn surface entirely; the next render starts from nothing
    pub fn discard_surface(&mut self) {
        let canvas = self.config.canvas();
        self.surface = SvgSurface::new(canvas.width, canvas.height);
        self.targets.clear();
    }

    /// Pointer value while the gauge animates
    pub fn rating(&self) -> Option<f64> {
        self.animation.as_ref().map(|a| a.rating)
    }

    pub fn is_animating(&self) -> bool {
        self.animation.as_ref().is_some_and(|a| !a.done)
    }

    fn restart_animation(&mut self) {
        self.animation = match (&self.config, &self.data) {
            (ChartConfig::Gauge(cfg), ChartData::Gauge(gauge)) if cfg.animation.enabled => {
                let (min, _) = range_bounds(gauge);
                Some(GaugeAnimation::start(min, gauge.value, &cfg.animation, self.revision))
            }
            _ => None,
        };
    }

    pub fn to_svg(&self) -> String {
        self.surface.to_svg()
    }
}

// ============================================================================
// TABLE PROJECTION
// ============================================================================

/// Row projection of the active data: header = series names, one row per
/// category (xy: per slot; gauge: from/to; others: value/percentage).
pub fn table_rows(state: &ChartState) -> DataTable {
    let tooltip = state.config.tooltip();
    let items = active_items(state.data.items(), &state.segregated);
    let value = |v: f64| format_value(v, tooltip.rounding_value);

    let mut header = vec![String::new()];
    header.extend(items.iter().map(|(_, item)| item.name.clone()));

    let rows: Vec<Vec<String>> = match &state.config {
        ChartConfig::Xy(cfg) => {
            let slots = items.iter().map(|(_, item)| item.values.len()).max().unwrap_or(0);
            (0..slots)
                .map(|slot| {
                    let label = cfg
                        .x_labels
                        .get(slot)
                        .cloned()
                        .unwrap_or_else(|| format!("#{}", slot + 1));
                    std::iter::once(label)
                        .chain(items.iter().map(|(_, item)| {
                            item.values.get(slot).map(|&v| value(v)).unwrap_or_default()
                        }))
                        .collect()
                })
                .collect()
        }
        ChartConfig::Gauge(_) => {
            let bound = |label: &str, pick: fn(&viz_core::DatasetItem) -> Option<f64>| {
                std::iter::once(label.to_string())
                    .chain(items.iter().map(|(_, item)| pick(item).map(value).unwrap_or_default()))
                    .collect::<Vec<_>>()
            };
            vec![bound("from", |item| item.from), bound("to", |item| item.to)]
        }
        _ => {
            let total: f64 = items.iter().map(|(_, item)| item.total()).sum();
            let values = std::iter::once("value".to_string())
                .chain(items.iter().map(|(_, item)| value(item.total())))
                .collect();
            let percentages = std::iter::once("percentage".to_string())
                .chain(items.iter().map(|(_, item)| {
                    format_percentage(proportion(item.total(), total), tooltip.rounding_percentage)
                }))
                .collect();
            vec![values, percentages]
        }
    };

    DataTable { header, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn donut(dataset: Value) -> ChartState {
        let template = ChartConfig::template(ChartKind::Donut).unwrap();
        ChartState::new(ChartKind::Donut, &template, &json!({}), dataset).unwrap()
    }

    #[test]
    fn test_new_normalizes_dataset() {
        let state = donut(json!([{ "name": "a", "value": 30 }, { "name": "b", "value": 70 }]));
        assert_eq!(state.data.items().len(), 2);
        assert!(state.data.items().iter().all(|item| !item.dataset_id.is_empty()));
        assert_eq!(state.revision, 0);
        assert!(state.animation.is_none());
        assert!(state.prefix().starts_with("viz-"));
    }

    #[test]
    fn test_load_config_merges_onto_current() {
        let mut state = donut(json!([]));
        state.load_config(&json!({ "arcWidth": 20 })).unwrap();
        state.load_config(&json!({ "title": { "text": "Hi" } })).unwrap();

        let ChartConfig::Donut(cfg) = &state.config else { panic!("kind changed") };
        assert_eq!(cfg.arc_width, 20.0);
        assert_eq!(cfg.title.text, "Hi");
        assert_eq!(state.revision, 2);
    }

    #[test]
    fn test_load_dataset_drops_unknown_segregation() {
        let mut state = donut(json!([{ "name": "a", "value": 1, "datasetId": "keep" }]));
        state.segregated.toggle("keep");
        state.segregated.toggle("gone");
        state.load_dataset(json!([{ "name": "a", "value": 2, "datasetId": "keep" }]));
        assert_eq!(state.segregated.iter().collect::<Vec<_>>(), vec!["keep"]);
        assert_eq!(state.revision, 1);
    }

    #[test]
    fn test_gauge_starts_animation_from_min() {
        let template = ChartConfig::template(ChartKind::Gauge).unwrap();
        let dataset = json!({ "value": 4, "series": [{ "from": 1, "to": 5 }] });
        let state = ChartState::new(ChartKind::Gauge, &template, &json!({}), dataset).unwrap();
        assert_eq!(state.rating(), Some(1.0));
        assert!(state.is_animating());

        let still = json!({ "animation": { "enabled": false } });
        let dataset = json!({ "value": 4, "series": [{ "from": 1, "to": 5 }] });
        let state = ChartState::new(ChartKind::Gauge, &template, &still, dataset).unwrap();
        assert!(state.animation.is_none());
    }

    #[test]
    fn test_table_rows_for_segments() {
        let mut state = donut(json!([
            { "name": "a", "value": 30, "datasetId": "a" },
            { "name": "b", "value": 70, "datasetId": "b" },
            { "name": "c", "value": 50, "datasetId": "c" }
        ]));
        state.segregated.toggle("c");
        let table = table_rows(&state);
        assert_eq!(table.header, vec!["", "a", "b"]);
        assert_eq!(table.rows[0], vec!["value", "30", "70"]);
        assert_eq!(table.rows[1], vec!["percentage", "30.0%", "70.0%"]);
    }

    #[test]
    fn test_table_rows_for_xy() {
        let template = ChartConfig::template(ChartKind::Xy).unwrap();
        let config = json!({ "xLabels": ["Jan"] });
        let dataset = json!([{ "name": "s", "values": [1, 2] }, { "name": "t", "values": [3] }]);
        let state = ChartState::new(ChartKind::Xy, &template, &config, dataset).unwrap();
        let table = table_rows(&state);
        assert_eq!(table.header, vec!["", "s", "t"]);
        assert_eq!(table.rows, vec![vec!["Jan", "1", "3"], vec!["#2", "2", ""]]);
    }
}
