//! DOM adapters: the [`Container`] implementation over an element, pointer
//! and click handling shared by components and declared containers, and
//! discovery of `data-chart` markup.

use crate::ChartHost;
use viz_charts::Surface;
use viz_core::ChartId;
use viz_state::{
    attr, hover_enter, hover_leave, on_attribute_changed, toggle_labels, toggle_segregation,
    toggle_table, Container, ReactorOutcome,
};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Element, Event, MouseEvent, MutationObserver, MutationObserverInit, MutationRecord};

// ============================================================================
// CONTAINER
// ============================================================================

/// Chart container backed by a DOM element
pub struct DomContainer {
    element: Element,
    observer: Option<MutationObserver>,
}

impl DomContainer {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            observer: None,
        }
    }

    /// Container whose attribute changes are reported to `observer`
    pub fn observed(element: Element, observer: MutationObserver) -> Self {
        Self {
            element,
            observer: Some(observer),
        }
    }
}

fn observer_options() -> MutationObserverInit {
    let options = MutationObserverInit::new();
    options.set_attributes(true);
    let filter = js_sys::Array::of2(&attr::CONFIG.into(), &attr::DATASET.into());
    options.set_attribute_filter(&filter);
    options
}

impl Container for DomContainer {
    fn attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        if let Err(e) = self.element.set_attribute(name, value) {
            tracing::warn!("failed to set {}: {:?}", name, e);
        }
    }

    fn suspend_observation(&mut self) {
        if let Some(observer) = &self.observer {
            observer.disconnect();
        }
    }

    fn resume_observation(&mut self) {
        if let Some(observer) = &self.observer {
            if let Err(e) = observer.observe_with_options(&self.element, &observer_options()) {
                tracing::warn!("failed to resume observation: {:?}", e);
            }
        }
    }
}

// ============================================================================
// EVENTS
// ============================================================================

/// Value of `name` on the event target or its nearest ancestor carrying it
fn closest_attribute(event: &Event, name: &str) -> Option<String> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let element = target.closest(&format!("[{}]", name)).ok()??;
    element.get_attribute(name)
}

/// Copy hover styles from the chart surface onto live elements
pub fn sync_styles(host: ChartHost, id: ChartId) {
    let styles = host
        .with(|registry| {
            registry.get(id).map(|state| {
                state
                    .targets
                    .iter()
                    .flat_map(|target| target.element_ids.iter())
                    .map(|element_id| {
                        let style = state
                            .surface
                            .find(element_id)
                            .and_then(|node| node.get_attr("style").map(str::to_string));
                        (element_id.clone(), style)
                    })
                    .collect::<Vec<_>>()
            })
        })
        .flatten()
        .unwrap_or_default();

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    for (element_id, style) in styles {
        let Some(element) = document.get_element_by_id(&element_id) else {
            continue;
        };
        let result = match style {
            Some(style) => element.set_attribute("style", &style),
            None => element.remove_attribute("style"),
        };
        if let Err(e) = result {
            tracing::trace!("restyle of {} failed: {:?}", element_id, e);
        }
    }
}

pub fn pointer_over(host: ChartHost, id: ChartId, event: &Event) {
    let Some(position) = closest_attribute(event, "data-target").and_then(|v| v.parse::<usize>().ok()) else {
        return;
    };
    let entered = host.interact(|registry| {
        registry
            .split_mut(id)
            .is_some_and(|(state, interaction)| hover_enter(state, interaction, position))
    });
    if entered == Some(true) {
        sync_styles(host, id);
    }
}

pub fn pointer_out(host: ChartHost, id: ChartId, event: &Event) {
    if closest_attribute(event, "data-target").is_none() {
        return;
    }
    host.interact(|registry| {
        if let Some((state, interaction)) = registry.split_mut(id) {
            hover_leave(state, interaction);
        }
    });
    sync_styles(host, id);
}

pub fn pointer_move(host: ChartHost, event: &MouseEvent) {
    let (x, y) = (event.client_x() as f64, event.client_y() as f64);
    host.interact(|registry| registry.interaction.move_pointer(x, y));
}

/// Toolkit buttons and legend items
pub fn click(host: ChartHost, id: ChartId, event: &Event) {
    if let Some(action) = closest_attribute(event, "data-action") {
        host.redraw(id, |registry| {
            let Some((state, interaction)) = registry.split_mut(id) else {
                return;
            };
            match action.as_str() {
                "table" => {
                    toggle_table(state, interaction);
                }
                "labels" => {
                    toggle_labels(state, interaction);
                }
                other => tracing::debug!("unknown toolkit action {}", other),
            }
        });
        return;
    }

    if let Some(dataset_id) = closest_attribute(event, "data-dataset-id") {
        host.redraw(id, |registry| {
            if let Some((state, interaction)) = registry.split_mut(id) {
                toggle_segregation(state, interaction, &dataset_id);
            }
        });
    }
}

// ============================================================================
// DECLARED CONTAINERS
// ============================================================================

fn listen(element: &Element, event: &str, handler: impl FnMut(Event) + 'static) {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    if let Err(e) = element.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        tracing::warn!("failed to listen for {}: {:?}", event, e);
    }
    // Listeners live as long as the page
    closure.forget();
}

fn wire_events(host: ChartHost, id: ChartId, element: &Element) {
    listen(element, "mouseover", move |event: Event| pointer_over(host, id, &event));
    listen(element, "mouseout", move |event: Event| pointer_out(host, id, &event));
    listen(element, "mousemove", move |event: Event| {
        if let Some(event) = event.dyn_ref::<MouseEvent>() {
            pointer_move(host, event);
        }
    });
    listen(element, "click", move |event: Event| click(host, id, &event));
}

fn observe(host: ChartHost, element: &Element) {
    let target = element.clone();
    let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
        move |records: js_sys::Array, observer: MutationObserver| {
            for record in records.iter() {
                let Some(name) = record
                    .dyn_into::<MutationRecord>()
                    .ok()
                    .and_then(|record| record.attribute_name())
                else {
                    continue;
                };
                let Some(id) = target
                    .get_attribute(attr::CHART_ID)
                    .and_then(|text| text.parse::<ChartId>().ok())
                else {
                    continue;
                };

                let mut container = DomContainer::observed(target.clone(), observer.clone());
                let outcome = host.redraw(id, |registry| on_attribute_changed(registry, &mut container, &name));
                if let Some(ReactorOutcome::Applied(_)) = outcome {
                    host.animate(id);
                }
            }
        },
    );

    match MutationObserver::new(callback.as_ref().unchecked_ref()) {
        Ok(observer) => {
            if let Err(e) = observer.observe_with_options(element, &observer_options()) {
                tracing::warn!("failed to observe container: {:?}", e);
            }
        }
        Err(e) => tracing::warn!("MutationObserver unavailable: {:?}", e),
    }
    callback.forget();
}

/// Prepare every `[data-chart]` element not prepared yet.
/// Each one is rendered in place, observed, and wired for pointer events.
pub fn prepare_declared(host: ChartHost) -> Vec<ChartId> {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return Vec::new();
    };
    let selector = format!("[{}]:not([{}])", attr::CHART, attr::CHART_ID);
    let Ok(nodes) = document.query_selector_all(&selector) else {
        return Vec::new();
    };

    let mut prepared = Vec::new();
    for index in 0..nodes.length() {
        let Some(element) = nodes.item(index).and_then(|node| node.dyn_into::<Element>().ok()) else {
            continue;
        };

        let mut container = DomContainer::new(element.clone());
        let Some(Ok(id)) = host.interact(|registry| registry.prepare(&mut container)) else {
            continue;
        };

        host.declare(id, element.clone());
        wire_events(host, id, &element);
        observe(host, &element);
        host.animate(id);
        prepared.push(id);
    }

    tracing::info!("prepared {} declared charts", prepared.len());
    prepared
}
