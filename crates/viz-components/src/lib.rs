//! # viz-components
//!
//! Leptos host for dataviz charts.
//! The chart registry lives in a [`ChartHost`] provided through context;
//! components and declared `data-chart` containers both go through it.

pub mod chart;
pub mod dom;
pub mod scheduler;

pub use chart::*;
pub use dom::*;
pub use scheduler::*;

use leptos::prelude::*;
use std::collections::HashMap;
use viz_state::{schedule_animation, ChartRegistry, Tooltip};
use viz_core::{ChartId, Result};
use web_sys::Element;

// ============================================================================
// CHART HOST
// ============================================================================

/// Shared chart registry plus the signals views subscribe to
#[derive(Clone, Copy)]
pub struct ChartHost {
    registry: StoredValue<ChartRegistry>,
    /// Containers prepared from markup; refreshed by hand after redraws
    declared: StoredValue<HashMap<ChartId, Element>, LocalStorage>,
    /// Bumped after any redraw
    renders: RwSignal<u64>,
    /// Bumped after pointer or tooltip changes
    pointer: RwSignal<u64>,
}

impl ChartHost {
    pub fn new() -> Self {
        Self {
            registry: StoredValue::new(ChartRegistry::new()),
            declared: StoredValue::new_local(HashMap::new()),
            renders: RwSignal::new(0),
            pointer: RwSignal::new(0),
        }
    }

    /// Read the registry without notifying anyone
    pub fn with<U>(&self, f: impl FnOnce(&ChartRegistry) -> U) -> Option<U> {
        self.registry.try_with_value(f)
    }

    /// Mutate the registry and treat `id` as redrawn
    pub fn redraw<U>(&self, id: ChartId, f: impl FnOnce(&mut ChartRegistry) -> U) -> Option<U> {
        let out = self.registry.try_update_value(f);
        self.renders.update(|n| *n += 1);
        self.refresh_declared(id);
        out
    }

    /// Mutate hover, pointer or tooltip state; nothing is redrawn
    pub fn interact<U>(&self, f: impl FnOnce(&mut ChartRegistry) -> U) -> Option<U> {
        let out = self.registry.try_update_value(f);
        self.pointer.update(|n| *n += 1);
        out
    }

    /// Serialized surface of one chart; tracks redraws
    pub fn svg(&self, id: ChartId) -> String {
        self.renders.track();
        self.with(|registry| registry.get(id).map(|state| state.to_svg()))
            .flatten()
            .unwrap_or_default()
    }

    /// Shared tooltip and pointer position; tracks pointer changes
    pub fn tooltip(&self) -> (Tooltip, (f64, f64)) {
        self.pointer.track();
        self.with(|registry| (registry.interaction.tooltip.clone(), registry.interaction.pointer))
            .unwrap_or_default()
    }

    /// Run a reload, log failures and restart the gauge animation
    pub fn reload(&self, id: ChartId, f: impl FnOnce(&mut ChartRegistry) -> Result<()>) {
        match self.redraw(id, f) {
            Some(Ok(())) => self.animate(id),
            Some(Err(e)) => tracing::error!(chart = %id, "reload rejected: {}", e),
            None => tracing::warn!(chart = %id, "chart host already disposed"),
        }
    }

    /// Request frames for a running gauge animation
    pub fn animate(&self, id: ChartId) {
        let mut scheduler = RafScheduler::new(*self);
        self.with(|registry| schedule_animation(registry, id, &mut scheduler));
    }

    pub fn declare(&self, id: ChartId, element: Element) {
        self.declared.update_value(|declared| {
            declared.insert(id, element);
        });
        self.refresh_declared(id);
    }

    fn refresh_declared(&self, id: ChartId) {
        let Some(Some(element)) = self.declared.try_with_value(|declared| declared.get(&id).cloned()) else {
            return;
        };
        element.set_inner_html(&self.with(|r| r.get(id).map(|s| s.to_svg())).flatten().unwrap_or_default());
    }

    /// Drop a chart and everything the host tracks for it
    pub fn dispose(&self, id: ChartId) {
        self.declared.update_value(|declared| {
            declared.remove(&id);
        });
        self.registry.update_value(|registry| {
            registry.dispose(id);
        });
        self.renders.update(|n| *n += 1);
        self.pointer.update(|n| *n += 1);
    }
}

impl Default for ChartHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Provide the chart host to the component tree
pub fn provide_chart_host() -> ChartHost {
    let host = ChartHost::new();
    provide_context(host);
    host
}

/// Get the chart host from context
pub fn use_chart_host() -> ChartHost {
    expect_context::<ChartHost>()
}

/// Try to get the chart host from context (returns None if not provided)
pub fn try_use_chart_host() -> Option<ChartHost> {
    use_context::<ChartHost>()
}
