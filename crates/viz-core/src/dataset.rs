//! Dataset parsing and normalization.
//!
//! Normalization assigns a stable `datasetId` and a palette color to every
//! item that lacks one, and clears derived geometry so each draw starts from
//! a clean slate. Re-normalizing normalized data changes nothing.

use crate::{ChartError, ChartKind, Result, colors};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// TYPES
// ============================================================================

/// Series kind for cartesian datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    #[default]
    Line,
    Bar,
    Plot,
}

/// Geometry derived during a draw; never serialized, reset before each draw
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Derived {
    pub datapoints: Vec<(f64, f64)>,
    pub data_labels: Vec<String>,
    pub lines: Vec<String>,
    pub areas: Vec<String>,
}

impl Derived {
    pub fn reset(&mut self) {
        self.datapoints.clear();
        self.data_labels.clear();
        self.lines.clear();
        self.areas.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.datapoints.is_empty()
            && self.data_labels.is_empty()
            && self.lines.is_empty()
            && self.areas.is_empty()
    }
}

/// One named series or segment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetItem {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, alias = "series", skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<f64>,
    /// Empty until normalized
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    /// Empty until normalized
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dataset_id: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SeriesKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DatasetItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<f64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub use_progression: bool,
    #[serde(skip)]
    pub derived: Derived,
}

impl DatasetItem {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            ..Default::default()
        }
    }

    /// Aggregate value: explicit `value`, else the sum of `values`, else the
    /// sum of the children's totals. Non-finite inputs count as 0.
    pub fn total(&self) -> f64 {
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        if let Some(value) = self.value {
            finite(value)
        } else if !self.values.is_empty() {
            self.values.iter().copied().map(finite).sum()
        } else {
            self.children.iter().map(DatasetItem::total).sum()
        }
    }

    /// Cartesian kind, defaulting to a line
    pub fn series_kind(&self) -> SeriesKind {
        self.kind.unwrap_or_default()
    }
}

/// Gauge datasets are a single object rather than a list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GaugeDataset {
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub series: Vec<DatasetItem>,
}

/// Normalized data held by a chart instance
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Items(Vec<DatasetItem>),
    Gauge(GaugeDataset),
}

impl ChartData {
    /// Normalize JSON into the container shape the chart kind expects
    pub fn normalize_for(kind: ChartKind, value: &Value, palette: &[String]) -> Self {
        match kind {
            ChartKind::Gauge => Self::Gauge(normalize_gauge(value, palette)),
            _ => Self::Items(normalize(value, palette)),
        }
    }

    /// Top-level items (gauge: its range series)
    pub fn items(&self) -> &[DatasetItem] {
        match self {
            Self::Items(items) => items,
            Self::Gauge(gauge) => &gauge.series,
        }
    }

    pub fn items_mut(&mut self) -> &mut [DatasetItem] {
        match self {
            Self::Items(items) => items,
            Self::Gauge(gauge) => &mut gauge.series,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Clear derived geometry on every item and child
    pub fn reset_derived(&mut self) {
        fn reset(item: &mut DatasetItem) {
            item.derived.reset();
            item.children.iter_mut().for_each(reset);
        }
        self.items_mut().iter_mut().for_each(reset);
    }

    /// Find an item by dataset id
    pub fn find(&self, dataset_id: &str) -> Option<&DatasetItem> {
        self.items().iter().find(|item| item.dataset_id == dataset_id)
    }
}

/// Raw dataset input
#[derive(Debug, Clone)]
pub enum RawDataset<'a> {
    /// JSON text, e.g. an attribute value
    Text(&'a str),
    /// Already structured data
    Json(Value),
}

// ============================================================================
// PARSING
// ============================================================================

/// Remove whitespace outside of string literals
pub fn strip_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
            out.push(c);
        } else if !c.is_whitespace() {
            out.push(c);
        }
    }

    out
}

/// Parse raw dataset input into JSON
pub fn parse_dataset(raw: RawDataset<'_>) -> Result<Value> {
    match raw {
        RawDataset::Text(text) => serde_json::from_str(&strip_whitespace(text))
            .map_err(|source| ChartError::DatasetParse { source }),
        RawDataset::Json(value) => Ok(value),
    }
}

fn next_dataset_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Normalize a list dataset. Non-array input yields an empty list; items that
/// do not have the item shape are skipped.
pub fn normalize(value: &Value, palette: &[String]) -> Vec<DatasetItem> {
    let Some(entries) = value.as_array() else {
        tracing::debug!("dataset is not an array, normalizing to empty");
        return Vec::new();
    };

    let items = entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| match DatasetItem::deserialize(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("skipping dataset item {}: {}", i, e);
                None
            }
        })
        .collect();

    normalize_items(items, palette)
}

/// Assign ids and palette colors in index order, and reset derived geometry
pub fn normalize_items(mut items: Vec<DatasetItem>, palette: &[String]) -> Vec<DatasetItem> {
    for (index, item) in items.iter_mut().enumerate() {
        if item.color.is_empty() {
            item.color = colors::palette_color(palette, index);
        }
        normalize_identity(item);
    }
    items
}

fn normalize_identity(item: &mut DatasetItem) {
    if item.dataset_id.is_empty() {
        item.dataset_id = next_dataset_id();
    }
    item.derived.reset();
    for child in &mut item.children {
        normalize_identity(child);
    }
}

/// Normalize a gauge dataset object. Non-object input yields the default.
pub fn normalize_gauge(value: &Value, palette: &[String]) -> GaugeDataset {
    if !value.is_object() {
        tracing::debug!("gauge dataset is not an object, normalizing to empty");
        return GaugeDataset::default();
    }

    match GaugeDataset::deserialize(value) {
        Ok(dataset) => GaugeDataset {
            value: if dataset.value.is_finite() { dataset.value } else { 0.0 },
            series: normalize_items(dataset.series, palette),
        },
        Err(e) => {
            tracing::warn!("gauge dataset has an invalid shape: {}", e);
            GaugeDataset::default()
        }
    }
}
