//! # viz-state
//!
//! Chart instance state and the render lifecycle for dataviz.
//! Plain Rust, no DOM: hosts feed it attribute values and events, and read
//! back the SVG surface of each instance.
//!
//! ## Modules
//!
//! - `instance` - Per-chart state record and data-table projection
//! - `registry` - Explicit registry of live instances plus shared interaction state
//! - `interaction` - Pointer, the single tooltip and open table panels
//! - `pipeline` - Normalize → Layout → Clear → Draw → Decorate → AttachInteraction
//! - `reactor` - `apply_config` / `apply_dataset` and the attribute adapter
//! - `animation` - Gauge pointer stepper and frame scheduling

pub mod animation;
pub mod instance;
pub mod interaction;
pub mod pipeline;
pub mod reactor;
pub mod registry;

pub use animation::*;
pub use instance::*;
pub use interaction::*;
pub use pipeline::*;
pub use reactor::*;
pub use registry::*;

/// Attribute names of the container contract
pub mod attr {
    /// Chart kind
    pub const CHART: &str = "data-chart";
    /// Set once prepared; holds the instance id
    pub const CHART_ID: &str = "data-chart-id";
    pub const CONFIG: &str = "config";
    pub const DATASET: &str = "dataset";
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
}
