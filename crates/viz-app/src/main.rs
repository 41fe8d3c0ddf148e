//! # viz-app
//!
//! Chart gallery: one host component per chart kind, a markup-declared
//! container prepared through its attributes, and buttons that reload data.

use leptos::prelude::*;
use serde_json::{json, Value};
use viz_components::{prepare_declared, provide_chart_host, Chart, ChartTooltip};
use viz_core::ChartKind;
use leptos::tachys::html::attribute::custom::custom_attribute;

fn main() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    tracing::info!("starting dataviz gallery");
    mount_to_body(App);
}

/// Rotating sample data so reloads have something to show
fn sales(round: usize) -> Value {
    let presets = [[30.0, 70.0, 45.0, 12.0], [55.0, 20.0, 38.0, 41.0], [8.0, 64.0, 22.0, 90.0]];
    let values = presets[round % presets.len()];
    json!([
        { "name": "North", "value": values[0] },
        { "name": "South", "value": values[1] },
        { "name": "East", "value": values[2] },
        { "name": "West", "value": values[3] }
    ])
}

fn rating(round: usize) -> Value {
    let values = [4.2, 1.3, 3.1];
    json!({
        "value": values[round % values.len()],
        "series": [
            { "from": 0, "to": 1.5, "color": "#ff6400" },
            { "from": 1.5, "to": 3, "color": "#ffb800" },
            { "from": 3, "to": 5, "color": "#5f8bee" }
        ]
    })
}

fn trend() -> Value {
    json!([
        { "name": "Revenue", "type": "bar", "values": [-5, 3, -2, 8, 6, 11] },
        { "name": "Margin", "type": "line", "values": [2, 4, 1, 7, 9, 10], "useProgression": true },
        { "name": "Target", "type": "plot", "values": [4, 4, 5, 6, 7, 8] }
    ])
}

fn budget() -> Value {
    json!([
        { "name": "Engineering", "children": [
            { "name": "Platform", "value": 42 },
            { "name": "Product", "value": 31 }
        ]},
        { "name": "Marketing", "value": 28 },
        { "name": "Operations", "children": [
            { "name": "Support", "value": 12 },
            { "name": "Facilities", "value": 9 }
        ]}
    ])
}

#[component]
fn App() -> impl IntoView {
    let host = provide_chart_host();
    let round = RwSignal::new(0usize);

    let segments = Signal::derive(move || sales(round.get()));
    let gauge = Signal::derive(move || rating(round.get()));
    let declared = NodeRef::<leptos::html::Div>::new();

    // Containers declared in markup are prepared once they are mounted
    Effect::new(move |_| {
        if declared.get().is_some() {
            prepare_declared(host);
        }
    });

    let reload = move |_| {
        round.update(|r| *r += 1);
        if let Some(element) = declared.get() {
            let payload = sales(round.get_untracked()).to_string();
            if let Err(e) = element.set_attribute("dataset", &payload) {
                tracing::warn!("failed to update declared chart: {:?}", e);
            }
        }
    };

    view! {
        <main class="viz-gallery">
            <header class="viz-gallery-header">
                <h1>"dataviz"</h1>
                <button on:click=reload>"Reload data"</button>
            </header>

            <section class="viz-grid">
                <Chart
                    kind=ChartKind::Donut
                    config=Signal::stored(json!({ "title": { "text": "Sales by region" } }))
                    dataset=segments
                />
                <Chart
                    kind=ChartKind::Gauge
                    config=Signal::stored(json!({ "title": { "text": "Rating" } }))
                    dataset=gauge
                />
                <Chart
                    kind=ChartKind::RadialBar
                    config=Signal::stored(json!({ "title": { "text": "Share" } }))
                    dataset=segments
                />
                <Chart
                    kind=ChartKind::Xy
                    config=Signal::stored(json!({
                        "title": { "text": "Half year" },
                        "xLabels": ["Jan", "Feb", "Mar", "Apr", "May", "Jun"]
                    }))
                    dataset=Signal::stored(trend())
                    width=800.0
                    height=450.0
                />
                <Chart
                    kind=ChartKind::VerticalBar
                    config=Signal::stored(json!({ "title": { "text": "Budget" } }))
                    dataset=Signal::stored(budget())
                />
                <div
                    node_ref=declared
                    class="viz-container"
                    data-chart="waffle"
                    {..(
                        custom_attribute("width", "400"),
                        custom_attribute("height", "400"),
                        custom_attribute("config", r#"{"title":{"text":"Declared waffle"},"gridSize":10}"#),
                        custom_attribute("dataset", sales(0).to_string()),
                    )}
                ></div>
            </section>

            <ChartTooltip />
        </main>
    }
}
