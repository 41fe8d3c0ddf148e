//! # pipeline
//!
//! `Normalize → Layout → Clear → Draw → Decorate → AttachInteraction`.
//!
//! Every render rebuilds the surface from scratch. Hover only restyles the
//! elements a [`HoverTarget`](viz_charts::HoverTarget) lists; legend clicks
//! and toolkit toggles go through a full render.

use crate::instance::{table_rows, ChartState};
use crate::interaction::InteractionState;
use viz_charts::{
    active_items, decorate, draw, layout, legend_entries, tooltip_html, ChartModel, DecorateContext,
    DrawOptions, Drawing, DrawingArea, HoverTarget, Surface, Totals,
};
use viz_core::colors;

/// Full render pass for one instance. A hover selection that no longer
/// exists after the pass also releases the tooltip it owned.
pub fn render(state: &mut ChartState, interaction: &mut InteractionState) {
    let _span = tracing::debug_span!("render", chart = %state.id, kind = %state.kind).entered();

    normalize_stage(state);
    layout_stage(state);
    clear_stage(state);
    let targets = draw_stage(state);
    decorate_stage(state, interaction, &targets);
    attach_stage(state, interaction, targets);

    state.renders += 1;
    tracing::debug!(renders = state.renders, "render complete");
}

// ============================================================================
// STAGES
// ============================================================================

fn normalize_stage(state: &mut ChartState) {
    state.data.reset_derived();
    state.segregated.retain_known(state.data.items());
    tracing::trace!(items = state.data.items().len(), hidden = state.segregated.len(), "normalize");
}

fn layout_stage(state: &mut ChartState) {
    let rating = state.rating();
    state.model = layout(&state.config, &state.data, &state.segregated, rating);
    state.area = state
        .model
        .area()
        .copied()
        .unwrap_or_else(|| DrawingArea::from_config(&state.config));
    state.totals = Totals::of(
        active_items(state.data.items(), &state.segregated)
            .iter()
            .map(|(_, item)| item.total()),
    );
    record_derived(state);
    tracing::trace!(total = state.totals.total, "layout");
}

/// Copy xy geometry back onto the dataset items
fn record_derived(state: &mut ChartState) {
    let ChartModel::Xy(model) = &state.model else {
        return;
    };
    let items = state.data.items_mut();
    for series in &model.series {
        let Some(item) = items.iter_mut().find(|item| item.dataset_id == series.dataset_id) else {
            continue;
        };
        item.derived.datapoints = series.points.clone();
        item.derived.data_labels = series.data_labels.clone();
        item.derived.lines = series.line.iter().cloned().collect();
        item.derived.areas = series.area.iter().cloned().collect();
    }
}

fn clear_stage(state: &mut ChartState) {
    state.surface.clear();
    state.surface.resize(state.area.full_width, state.area.full_height);
    tracing::trace!("clear");
}

fn draw_stage(state: &mut ChartState) -> Vec<HoverTarget> {
    let prefix = state.prefix();
    let options = DrawOptions {
        prefix: &prefix,
        show_labels: state.labels_visible,
    };
    let Drawing { nodes, targets } = draw(&state.model, &state.config, &options);
    tracing::trace!(nodes = nodes.len(), targets = targets.len(), "draw");
    for node in nodes {
        state.surface.append(node);
    }
    targets
}

fn decorate_stage(state: &mut ChartState, interaction: &InteractionState, targets: &[HoverTarget]) {
    let prefix = state.prefix();
    let legend = legend_entries(state.data.items(), &state.segregated);
    let table = interaction.is_table_open(state.id).then(|| table_rows(state));

    let ctx = DecorateContext {
        prefix: &prefix,
        config: &state.config,
        width: state.area.full_width,
        height: state.area.full_height,
        legend: &legend,
        targets,
        table: table.as_ref(),
    };
    decorate(&mut state.surface, &ctx);
}

fn attach_stage(state: &mut ChartState, interaction: &mut InteractionState, targets: Vec<HoverTarget>) {
    state.targets = targets;
    match state.selected_index {
        Some(position) if position < state.targets.len() => {
            if state.config.hover().enabled {
                restyle(state, Some(position));
            }
            if interaction.tooltip.owner == Some(state.id) {
                show_tooltip(state, interaction, position);
            }
        }
        _ => {
            state.selected_index = None;
            if interaction.hide_tooltip(state.id) {
                tracing::debug!(chart = %state.id, "hover selection gone, tooltip hidden");
            }
        }
    }
    tracing::trace!(targets = state.targets.len(), "attach");
}

// ============================================================================
// HOVER
// ============================================================================

/// Style for elements of the hovered target and of everything else
fn hover_styles(state: &ChartState) -> (String, String) {
    let hover = state.config.hover();

    let mut focused = format!(
        "transform:scale({});transform-origin:center;transform-box:fill-box",
        hover.scale
    );
    if hover.drop_shadow {
        focused.push_str(&format!(
            ";filter:drop-shadow(0 0 3px {})",
            colors::with_alpha(colors::TEXT_PRIMARY, 0.35)
        ));
    }

    let mut dimmed = format!("opacity:{}", hover.opacity);
    if hover.blur > 0.0 {
        dimmed.push_str(&format!(";filter:blur({}px)", hover.blur));
    }

    (focused, dimmed)
}

/// Apply (or with `None`, remove) the hover styling in place
fn restyle(state: &mut ChartState, selected: Option<usize>) {
    let (focused, dimmed) = hover_styles(state);
    let ChartState { surface, targets, .. } = state;

    for (position, target) in targets.iter().enumerate() {
        let style = match selected {
            None => None,
            Some(selected) if selected == position => Some(&focused),
            Some(_) => Some(&dimmed),
        };
        for id in &target.element_ids {
            let Some(node) = surface.find_mut(id) else {
                continue;
            };
            match style {
                Some(style) => node.set_attr("style", style),
                None => {
                    node.remove_attr("style");
                }
            }
        }
    }
}

/// Claim the shared tooltip with the content of the target at `position`
fn show_tooltip(state: &ChartState, interaction: &mut InteractionState, position: usize) {
    let tooltip = state.config.tooltip();
    let Some(target) = state.targets.get(position) else {
        return;
    };
    if tooltip.show {
        let html = tooltip_html(&target.tooltip, tooltip).to_svg();
        interaction.show_tooltip(state.id, position, target.tooltip.clone(), html);
    }
}

/// Pointer entered the hover target at `position` (the trap's `data-target`).
/// Restyles and claims the tooltip; no redraw.
pub fn hover_enter(state: &mut ChartState, interaction: &mut InteractionState, position: usize) -> bool {
    if position >= state.targets.len() {
        return false;
    }
    if state.config.hover().enabled {
        restyle(state, Some(position));
    }
    state.selected_index = Some(position);
    show_tooltip(state, interaction, position);
    tracing::trace!(chart = %state.id, position, "hover enter");
    true
}

pub fn hover_leave(state: &mut ChartState, interaction: &mut InteractionState) {
    restyle(state, None);
    state.selected_index = None;
    interaction.hide_tooltip(state.id);
}

// ============================================================================
// TOOLKIT / LEGEND MUTATIONS
// ============================================================================

/// Legend click. Returns whether the item is now hidden, `None` for an unknown id.
pub fn toggle_segregation(
    state: &mut ChartState,
    interaction: &mut InteractionState,
    dataset_id: &str,
) -> Option<bool> {
    if state.data.find(dataset_id).is_none() {
        tracing::warn!(chart = %state.id, dataset_id, "segregation toggle for unknown item");
        return None;
    }
    let hidden = state.segregated.toggle(dataset_id);
    tracing::info!(chart = %state.id, dataset_id, hidden, "segregation toggled");
    render(state, interaction);
    Some(hidden)
}

pub fn toggle_labels(state: &mut ChartState, interaction: &mut InteractionState) -> bool {
    state.labels_visible = !state.labels_visible;
    render(state, interaction);
    state.labels_visible
}

/// Open or close the data table overlay. Returns whether it is now open.
pub fn toggle_table(state: &mut ChartState, interaction: &mut InteractionState) -> bool {
    let open = interaction.toggle_table(state.id);
    render(state, interaction);
    open
}
