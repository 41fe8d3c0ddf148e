//! Registry of live chart instances

use crate::attr;
use crate::instance::ChartState;
use crate::interaction::InteractionState;
use crate::pipeline::render;
use crate::reactor::{write_consumed, Container};
use serde_json::{Map, Value};
use std::collections::HashMap;
use viz_core::{
    parse_config_attribute, parse_dataset, ChartConfig, ChartError, ChartId, ChartKind, RawDataset,
    Result, CONSUMED_SENTINEL,
};

/// Every chart on the page plus the interaction state they share
#[derive(Debug, Default)]
pub struct ChartRegistry {
    charts: HashMap<ChartId, ChartState>,
    pub interaction: InteractionState,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create, render and register an instance.
    /// `width`/`height` seed the canvas size before the user config applies.
    pub fn create(
        &mut self,
        kind: ChartKind,
        user_config: &Value,
        dataset: Value,
        width: Option<f64>,
        height: Option<f64>,
    ) -> Result<ChartId> {
        let template = ChartConfig::seeded_template(kind, width, height)?;
        let mut state = ChartState::new(kind, &template, user_config, dataset)?;
        render(&mut state, &mut self.interaction);

        let id = state.id;
        tracing::info!(chart = %id, %kind, "chart created");
        self.charts.insert(id, state);
        Ok(id)
    }

    /// Initialize a chart from a container's attributes.
    ///
    /// Marks the container with `data-chart-id` and writes the consumed
    /// sentinel into `config`/`dataset` without triggering observation.
    pub fn prepare<C: Container + ?Sized>(&mut self, container: &mut C) -> Result<ChartId> {
        self.try_prepare(container).inspect_err(|e| match e {
            ChartError::DuplicateInit(id) => tracing::warn!(chart = %id, "container already prepared"),
            other => tracing::error!("chart preparation failed: {}", other),
        })
    }

    fn try_prepare<C: Container + ?Sized>(&mut self, container: &mut C) -> Result<ChartId> {
        if let Some(existing) = container.attribute(attr::CHART_ID) {
            let known = existing
                .parse::<ChartId>()
                .is_ok_and(|id| self.charts.contains_key(&id));
            if known {
                return Err(ChartError::DuplicateInit(existing));
            }
        }

        let kind: ChartKind = container
            .attribute(attr::CHART)
            .ok_or(ChartError::MissingAttribute(attr::CHART))?
            .parse()?;

        let dimension = |name: &str| {
            container
                .attribute(name)
                .and_then(|text| text.trim().trim_end_matches("px").parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v > 0.0)
        };
        let width = dimension(attr::WIDTH);
        let height = dimension(attr::HEIGHT);

        let config_text = payload(container, attr::CONFIG);
        let dataset_text = payload(container, attr::DATASET);

        let config = match &config_text {
            Some(text) => parse_config_attribute(text)?,
            None => Value::Object(Map::new()),
        };
        let dataset = match &dataset_text {
            Some(text) => parse_dataset(RawDataset::Text(text))?,
            None => Value::Null,
        };

        let id = self.create(kind, &config, dataset, width, height)?;
        container.set_attribute(attr::CHART_ID, &id.to_string());

        let consumed: Vec<&str> = [
            config_text.as_ref().map(|_| attr::CONFIG),
            dataset_text.as_ref().map(|_| attr::DATASET),
        ]
        .into_iter()
        .flatten()
        .collect();
        write_consumed(container, &consumed);

        Ok(id)
    }

    pub fn get(&self, id: ChartId) -> Option<&ChartState> {
        self.charts.get(&id)
    }

    pub fn get_mut(&mut self, id: ChartId) -> Option<&mut ChartState> {
        self.charts.get_mut(&id)
    }

    /// One instance plus the shared interaction state, borrowed together
    pub fn split_mut(&mut self, id: ChartId) -> Option<(&mut ChartState, &mut InteractionState)> {
        let state = self.charts.get_mut(&id)?;
        Some((state, &mut self.interaction))
    }

    pub fn contains(&self, id: ChartId) -> bool {
        self.charts.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = ChartId> + '_ {
        self.charts.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    /// Drop an instance. Pending animation frames for it become no-ops.
    pub fn dispose(&mut self, id: ChartId) -> bool {
        let removed = self.charts.remove(&id).is_some();
        if removed {
            self.interaction.forget(id);
            tracing::info!(chart = %id, "chart disposed");
        }
        removed
    }
}

/// Attribute payload, skipping absent and already-consumed values
fn payload<C: Container + ?Sized>(container: &C, name: &str) -> Option<String> {
    container
        .attribute(name)
        .filter(|text| text.trim() != CONSUMED_SENTINEL && !text.trim().is_empty())
}
