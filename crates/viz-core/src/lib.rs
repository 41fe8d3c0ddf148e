//! # viz-core
//!
//! Core domain types for the dataviz chart engine.
//! Everything in here is independent of the render surface: configuration
//! merging, dataset normalization, palettes and the error taxonomy.

pub mod colors;
pub mod config;
pub mod dataset;
pub mod error;
pub mod options;

pub use config::*;
pub use dataset::*;
pub use error::*;
pub use options::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel written back into a consumed `config` / `dataset` attribute.
pub const CONSUMED_SENTINEL: &str = "ok";

// ============================================================================
// CORE VALUE TYPES
// ============================================================================

/// Unique chart instance identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChartId(pub Uuid);

impl ChartId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short form used in element ids (`donut_1a2b3c4d`)
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for ChartId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ChartId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Supported chart families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Donut,
    Gauge,
    RadialBar,
    VerticalBar,
    Waffle,
    Xy,
}

impl ChartKind {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Donut => "Donut",
            Self::Gauge => "Gauge",
            Self::RadialBar => "Radial bar",
            Self::VerticalBar => "Vertical bar",
            Self::Waffle => "Waffle",
            Self::Xy => "XY",
        }
    }

    /// Prefix for generated element ids
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Donut => "donut",
            Self::Gauge => "gauge",
            Self::RadialBar => "radial-bar",
            Self::VerticalBar => "vertical-bar",
            Self::Waffle => "waffle",
            Self::Xy => "xy",
        }
    }

    /// All chart kinds
    pub fn all() -> &'static [Self] {
        &[
            Self::Donut,
            Self::Gauge,
            Self::RadialBar,
            Self::VerticalBar,
            Self::Waffle,
            Self::Xy,
        ]
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl std::str::FromStr for ChartKind {
    type Err = ChartError;

    /// Accepts `donut`, `radial-bar`, `RadialBar`, `radial_bar`, `line`, ...
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "donut" | "pie" => Ok(Self::Donut),
            "gauge" => Ok(Self::Gauge),
            "radialbar" | "rings" => Ok(Self::RadialBar),
            "verticalbar" => Ok(Self::VerticalBar),
            "waffle" => Ok(Self::Waffle),
            "xy" | "line" | "bar" | "plot" => Ok(Self::Xy),
            _ => Err(ChartError::UnknownChartKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_kind_parsing() {
        assert_eq!("donut".parse::<ChartKind>().unwrap(), ChartKind::Donut);
        assert_eq!("Radial-Bar".parse::<ChartKind>().unwrap(), ChartKind::RadialBar);
        assert_eq!("vertical_bar".parse::<ChartKind>().unwrap(), ChartKind::VerticalBar);
        assert_eq!("line".parse::<ChartKind>().unwrap(), ChartKind::Xy);
        assert!("heatmap".parse::<ChartKind>().is_err());
    }

    #[test]
    fn test_chart_id_roundtrip() {
        let id = ChartId::new();
        let parsed: ChartId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert_eq!(id.short().len(), 8);
    }
}
