//! `requestAnimationFrame` frame scheduler

use crate::ChartHost;
use viz_core::ChartId;
use viz_state::{run_frame, FrameOutcome, FrameScheduler};
use wasm_bindgen::{closure::Closure, JsCast};

/// Frames per animation step
const FRAME_STEP: f64 = 1.0;

#[derive(Clone, Copy)]
pub struct RafScheduler {
    host: ChartHost,
}

impl RafScheduler {
    pub fn new(host: ChartHost) -> Self {
        Self { host }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self, id: ChartId, revision: u64) {
        let host = self.host;
        let callback = Closure::once_into_js(move || {
            let mut scheduler = RafScheduler::new(host);
            let outcome = host.redraw(id, |registry| {
                run_frame(registry, id, revision, FRAME_STEP, &mut scheduler)
            });
            if let Some(FrameOutcome::Finished) = outcome {
                tracing::debug!(chart = %id, "gauge settled");
            }
        });

        let Some(window) = web_sys::window() else {
            tracing::warn!("no window, animation frame dropped");
            return;
        };
        if let Err(e) = window.request_animation_frame(callback.unchecked_ref()) {
            tracing::warn!("requestAnimationFrame failed: {:?}", e);
        }
    }
}
