//! Chart host component and the shared tooltip overlay

use crate::dom::{click, pointer_move, pointer_out, pointer_over};
use crate::use_chart_host;
use leptos::prelude::*;
use serde_json::Value;
use viz_core::{ChartKind, RawDataset};
use viz_state::{apply_config, apply_dataset};

/// Offset of the tooltip from the pointer
const TOOLTIP_OFFSET: f64 = 14.0;

/// One chart instance. Config and dataset changes reload it in place;
/// unmounting disposes it.
#[component]
pub fn Chart(
    kind: ChartKind,
    #[prop(into)] config: Signal<Value>,
    #[prop(into)] dataset: Signal<Value>,
    /// Seeds the canvas size before the config applies
    #[prop(optional)] width: Option<f64>,
    #[prop(optional)] height: Option<f64>,
) -> impl IntoView {
    let host = use_chart_host();

    let initial_config = config.get_untracked();
    let initial_dataset = dataset.get_untracked();
    let created =
        host.interact(|registry| registry.create(kind, &initial_config, initial_dataset, width, height));

    let id = match created {
        Some(Ok(id)) => id,
        Some(Err(e)) => {
            tracing::error!("{} chart failed to initialize: {}", kind, e);
            return view! { <div class="viz-container viz-error">{e.to_string()}</div> }.into_any();
        }
        None => return view! { <div class="viz-container viz-error"></div> }.into_any(),
    };
    host.animate(id);

    // The first run of each effect sees the values the chart was created with
    Effect::new(move |previous: Option<()>| {
        let patch = config.get();
        if previous.is_some() {
            host.reload(id, |registry| apply_config(registry, id, &patch));
        }
    });
    Effect::new(move |previous: Option<()>| {
        let data = dataset.get();
        if previous.is_some() {
            host.reload(id, |registry| apply_dataset(registry, id, RawDataset::Json(data)));
        }
    });

    on_cleanup(move || host.dispose(id));

    let svg = Memo::new(move |_| host.svg(id));

    view! {
        <div
            class="viz-container"
            data-chart=kind.slug()
            data-chart-id=id.to_string()
            inner_html=move || svg.get()
            on:mouseover=move |ev| pointer_over(host, id, &ev)
            on:mouseout=move |ev| pointer_out(host, id, &ev)
            on:mousemove=move |ev| pointer_move(host, &ev)
            on:click=move |ev| click(host, id, &ev)
        ></div>
    }
    .into_any()
}

/// The single tooltip shared by every chart under the host
#[component]
pub fn ChartTooltip() -> impl IntoView {
    let host = use_chart_host();
    let tooltip = Memo::new(move |_| host.tooltip());

    view! {
        {move || {
            let (tooltip, (x, y)) = tooltip.get();
            tooltip.visible.then(|| {
                let style = format!(
                    "position:fixed;left:{}px;top:{}px;pointer-events:none;z-index:10",
                    x + TOOLTIP_OFFSET,
                    y + TOOLTIP_OFFSET,
                );
                view! { <div class="viz-tooltip-host" style=style inner_html=tooltip.html></div> }
            })
        }}
    }
}
