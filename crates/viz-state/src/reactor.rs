//! # reactor
//!
//! Reloads a chart when its `config` or `dataset` changes. `apply_config` and
//! `apply_dataset` are the entry points; [`on_attribute_changed`] adapts
//! container attribute mutations onto them.

use crate::attr;
use crate::pipeline::render;
use crate::registry::ChartRegistry;
use serde_json::Value;
use std::collections::BTreeMap;
use viz_core::{
    parse_config_attribute, parse_dataset, ChartError, ChartId, RawDataset, Result, CONSUMED_SENTINEL,
};

// ============================================================================
// STRATEGY PATTERN: Container Trait
// ============================================================================

/// Element hosting a chart
pub trait Container {
    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&mut self, name: &str, value: &str);

    /// Stop reporting attribute changes until resumed
    fn suspend_observation(&mut self);

    fn resume_observation(&mut self);
}

/// Keeps observation suspended while alive
pub struct ObservationPause<'a, C: Container + ?Sized> {
    container: &'a mut C,
}

impl<'a, C: Container + ?Sized> ObservationPause<'a, C> {
    pub fn new(container: &'a mut C) -> Self {
        container.suspend_observation();
        Self { container }
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.container.set_attribute(name, value);
    }
}

impl<C: Container + ?Sized> Drop for ObservationPause<'_, C> {
    fn drop(&mut self) {
        self.container.resume_observation();
    }
}

/// Overwrite consumed payload attributes with the sentinel, unobserved
pub fn write_consumed<C: Container + ?Sized>(container: &mut C, names: &[&str]) {
    if names.is_empty() {
        return;
    }
    let mut pause = ObservationPause::new(container);
    for name in names {
        pause.set_attribute(name, CONSUMED_SENTINEL);
    }
}

/// In-memory container recording observed attribute writes
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    attributes: BTreeMap<String, String>,
    suspended: usize,
    mutations: Vec<String>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute, not recorded as a mutation
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn is_observing(&self) -> bool {
        self.suspended == 0
    }

    /// Attribute names written while observed, oldest first
    pub fn take_mutations(&mut self) -> Vec<String> {
        std::mem::take(&mut self.mutations)
    }
}

impl Container for MemoryContainer {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
        if self.is_observing() {
            self.mutations.push(name.to_string());
        }
    }

    fn suspend_observation(&mut self) {
        self.suspended += 1;
    }

    fn resume_observation(&mut self) {
        self.suspended = self.suspended.saturating_sub(1);
    }
}

// ============================================================================
// APPLY API
// ============================================================================

/// Reloadable input of a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Config,
    Dataset,
}

impl Channel {
    pub fn attribute(&self) -> &'static str {
        match self {
            Self::Config => attr::CONFIG,
            Self::Dataset => attr::DATASET,
        }
    }

    pub fn from_attribute(name: &str) -> Option<Self> {
        match name {
            attr::CONFIG => Some(Self::Config),
            attr::DATASET => Some(Self::Dataset),
            _ => None,
        }
    }
}

/// Merge a partial config onto the instance and redraw from scratch
pub fn apply_config(registry: &mut ChartRegistry, id: ChartId, patch: &Value) -> Result<()> {
    let (state, interaction) = registry
        .split_mut(id)
        .ok_or_else(|| ChartError::UnknownInstance(id.to_string()))?;

    state.load_config(patch)?;
    state.discard_surface();
    render(state, interaction);
    tracing::info!(chart = %id, revision = state.revision, "config applied");
    Ok(())
}

/// Replace the dataset and redraw from scratch.
/// Malformed text fails before the instance is touched.
pub fn apply_dataset(registry: &mut ChartRegistry, id: ChartId, raw: RawDataset<'_>) -> Result<()> {
    if !registry.contains(id) {
        return Err(ChartError::UnknownInstance(id.to_string()));
    }
    let dataset = parse_dataset(raw)?;

    let (state, interaction) = registry
        .split_mut(id)
        .ok_or_else(|| ChartError::UnknownInstance(id.to_string()))?;
    state.load_dataset(dataset);
    state.discard_surface();
    render(state, interaction);
    tracing::info!(chart = %id, revision = state.revision, "dataset applied");
    Ok(())
}

// ============================================================================
// ATTRIBUTE ADAPTER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactorOutcome {
    /// Not a payload attribute, a sentinel, or an unprepared container
    Ignored,
    Applied(Channel),
    /// Logged; the previous render stays
    Rejected(Channel),
}

/// Handle one observed attribute change on a prepared container
pub fn on_attribute_changed<C: Container + ?Sized>(
    registry: &mut ChartRegistry,
    container: &mut C,
    name: &str,
) -> ReactorOutcome {
    let Some(channel) = Channel::from_attribute(name) else {
        return ReactorOutcome::Ignored;
    };
    let Some(id) = container
        .attribute(attr::CHART_ID)
        .and_then(|text| text.parse::<ChartId>().ok())
    else {
        tracing::debug!("{} changed on an unprepared container", name);
        return ReactorOutcome::Ignored;
    };
    let Some(text) = container.attribute(name) else {
        return ReactorOutcome::Ignored;
    };
    if text.trim() == CONSUMED_SENTINEL {
        return ReactorOutcome::Ignored;
    }

    let result = match channel {
        Channel::Config => {
            parse_config_attribute(&text).and_then(|patch| apply_config(registry, id, &patch))
        }
        Channel::Dataset => apply_dataset(registry, id, RawDataset::Text(&text)),
    };

    match result {
        Ok(()) => {
            write_consumed(container, &[channel.attribute()]);
            ReactorOutcome::Applied(channel)
        }
        Err(e) if e.is_parse_error() => {
            tracing::warn!(chart = %id, "{} kept last render: {}", name, e);
            ReactorOutcome::Rejected(channel)
        }
        Err(e) => {
            tracing::error!(chart = %id, "{} reload rejected: {}", name, e);
            ReactorOutcome::Rejected(channel)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::hover_enter;
    use serde_json::json;
    use viz_core::{ChartConfig, ChartKind};

    fn prepared() -> (ChartRegistry, MemoryContainer, ChartId) {
        let mut registry = ChartRegistry::new();
        let mut container = MemoryContainer::new()
            .with(attr::CHART, "donut")
            .with(attr::DATASET, r#"[{"name":"a","value":30},{"name":"b","value":70}]"#);
        let id = registry.prepare(&mut container).unwrap();
        container.take_mutations();
        (registry, container, id)
    }

    #[test]
    fn test_observation_pause_restores() {
        let mut container = MemoryContainer::new();
        {
            let mut pause = ObservationPause::new(&mut container);
            pause.set_attribute(attr::CONFIG, "ok");
        }
        assert!(container.is_observing());
        assert!(container.take_mutations().is_empty());

        container.set_attribute(attr::CONFIG, "{}");
        assert_eq!(container.take_mutations(), vec![attr::CONFIG]);
    }

    #[test]
    fn test_malformed_config_keeps_render() {
        let (mut registry, mut container, id) = prepared();
        let before = registry.get(id).unwrap().to_svg();

        container.set_attribute(attr::CONFIG, "{bad");
        let outcome = on_attribute_changed(&mut registry, &mut container, attr::CONFIG);

        assert_eq!(outcome, ReactorOutcome::Rejected(Channel::Config));
        assert_eq!(registry.get(id).unwrap().to_svg(), before);
        assert_eq!(registry.get(id).unwrap().revision, 0);
        assert_eq!(container.attribute(attr::CONFIG).as_deref(), Some("{bad"));
    }

    #[test]
    fn test_config_change_applies_and_consumes() {
        let (mut registry, mut container, id) = prepared();
        container.set_attribute(attr::CONFIG, r#"{"title":{"text":"Updated"}}"#);

        let outcome = on_attribute_changed(&mut registry, &mut container, attr::CONFIG);
        assert_eq!(outcome, ReactorOutcome::Applied(Channel::Config));
        assert_eq!(container.attribute(attr::CONFIG).as_deref(), Some(CONSUMED_SENTINEL));
        assert_eq!(container.take_mutations(), vec![attr::CONFIG]);

        let state = registry.get(id).unwrap();
        assert_eq!(state.config.title().text, "Updated");
        assert!(state.to_svg().contains("Updated"));

        // The sentinel write is never reacted to
        let outcome = on_attribute_changed(&mut registry, &mut container, attr::CONFIG);
        assert_eq!(outcome, ReactorOutcome::Ignored);
    }

    #[test]
    fn test_double_encoded_config() {
        let (mut registry, mut container, id) = prepared();
        container.set_attribute(attr::CONFIG, r#""{\"arcWidth\":12}""#);
        on_attribute_changed(&mut registry, &mut container, attr::CONFIG);

        let ChartConfig::Donut(cfg) = &registry.get(id).unwrap().config else {
            panic!("kind changed");
        };
        assert_eq!(cfg.arc_width, 12.0);
    }

    #[test]
    fn test_dataset_change_redraws() {
        let (mut registry, mut container, id) = prepared();
        container.set_attribute(attr::DATASET, r#"[{"name":"c","value":5}]"#);

        let outcome = on_attribute_changed(&mut registry, &mut container, attr::DATASET);
        assert_eq!(outcome, ReactorOutcome::Applied(Channel::Dataset));

        let state = registry.get(id).unwrap();
        assert_eq!(state.totals.total, 5.0);
        assert_eq!(state.targets.len(), 1);
        assert_eq!(state.revision, 1);
    }

    fn hovered(registry: &mut ChartRegistry, id: ChartId) {
        let (state, interaction) = registry.split_mut(id).unwrap();
        assert!(hover_enter(state, interaction, 0));
        assert!(registry.interaction.tooltip.visible);
    }

    #[test]
    fn test_dataset_reload_releases_tooltip() {
        let (mut registry, _, id) = prepared();
        hovered(&mut registry, id);

        apply_dataset(&mut registry, id, RawDataset::Json(json!([{ "name": "z", "value": 5 }]))).unwrap();

        assert_eq!(registry.get(id).unwrap().selected_index, None);
        let tooltip = &registry.interaction.tooltip;
        assert!(!tooltip.visible);
        assert_eq!(tooltip.owner, None);
        assert!(tooltip.content.is_none());
    }

    #[test]
    fn test_config_reload_keeps_live_tooltip() {
        let (mut registry, _, id) = prepared();
        hovered(&mut registry, id);

        apply_config(&mut registry, id, &json!({ "title": { "text": "Updated" } })).unwrap();

        assert_eq!(registry.get(id).unwrap().selected_index, Some(0));
        let tooltip = &registry.interaction.tooltip;
        assert!(tooltip.visible);
        assert_eq!(tooltip.owner, Some(id));
        assert_eq!(tooltip.content.as_ref().map(|c| c.title.as_str()), Some("b"));
    }

    #[test]
    fn test_malformed_dataset_keeps_render() {
        let (mut registry, mut container, id) = prepared();
        let before = registry.get(id).unwrap().to_svg();
        container.set_attribute(attr::DATASET, "[{\"name\": ");

        let outcome = on_attribute_changed(&mut registry, &mut container, attr::DATASET);
        assert_eq!(outcome, ReactorOutcome::Rejected(Channel::Dataset));
        assert_eq!(registry.get(id).unwrap().to_svg(), before);
    }

    #[test]
    fn test_ignored_changes() {
        let (mut registry, mut container, _) = prepared();
        assert_eq!(
            on_attribute_changed(&mut registry, &mut container, attr::WIDTH),
            ReactorOutcome::Ignored
        );

        let mut fresh = MemoryContainer::new().with(attr::CONFIG, "{}");
        assert_eq!(
            on_attribute_changed(&mut registry, &mut fresh, attr::CONFIG),
            ReactorOutcome::Ignored
        );
    }

    #[test]
    fn test_apply_to_unknown_instance() {
        let mut registry = ChartRegistry::new();
        let err = apply_config(&mut registry, ChartId::new(), &json!({})).unwrap_err();
        assert!(matches!(err, ChartError::UnknownInstance(_)));
        let err = apply_dataset(&mut registry, ChartId::new(), RawDataset::Json(json!([]))).unwrap_err();
        assert!(matches!(err, ChartError::UnknownInstance(_)));
    }

    #[test]
    fn test_apply_config_after_dispose() {
        let mut registry = ChartRegistry::new();
        let id = registry.create(ChartKind::Waffle, &json!({}), json!([]), None, None).unwrap();
        registry.dispose(id);
        assert!(apply_config(&mut registry, id, &json!({ "gridSize": 5 })).is_err());
    }
}
