//! Shared interaction state: pointer position, the page-wide tooltip and
//! which instances have their data table open.

use std::collections::BTreeSet;
use viz_charts::TooltipContent;
use viz_core::ChartId;

/// The single tooltip shown across all charts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tooltip {
    pub visible: bool,
    pub owner: Option<ChartId>,
    /// Hover target position inside the owning chart
    pub target: Option<usize>,
    pub content: Option<TooltipContent>,
    /// Rendered HTML for the host to place
    pub html: String,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    pub pointer: (f64, f64),
    pub tooltip: Tooltip,
    open_tables: BTreeSet<ChartId>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_pointer(&mut self, x: f64, y: f64) {
        self.pointer = (x, y);
    }

    /// Claim the tooltip for one chart; any other owner loses it
    pub fn show_tooltip(&mut self, owner: ChartId, target: usize, content: TooltipContent, html: String) {
        self.tooltip = Tooltip {
            visible: true,
            owner: Some(owner),
            target: Some(target),
            content: Some(content),
            html,
        };
    }

    /// Hide the tooltip if `owner` still holds it
    pub fn hide_tooltip(&mut self, owner: ChartId) -> bool {
        if self.tooltip.owner != Some(owner) {
            return false;
        }
        self.tooltip = Tooltip::default();
        true
    }

    /// Returns whether the table is now open
    pub fn toggle_table(&mut self, id: ChartId) -> bool {
        if self.open_tables.remove(&id) {
            false
        } else {
            self.open_tables.insert(id);
            true
        }
    }

    pub fn is_table_open(&self, id: ChartId) -> bool {
        self.open_tables.contains(&id)
    }

    /// Drop everything tied to a disposed instance
    pub fn forget(&mut self, id: ChartId) {
        self.open_tables.remove(&id);
        self.hide_tooltip(id);
    }
}
