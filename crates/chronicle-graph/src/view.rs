//! View state for a timeline viewer.
//!
//! `ViewState` holds what a viewer is looking at: camera, selection,
//! search text, filters and a highlighted path. It answers questions by
//! delegating to the graph's query layer; it never walks the graph itself.

use crate::filter::{FilterCriteria, FilterUpdate};
use crate::graph::TimelineGraph;
use chronicle_core::{Node, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

const MIN_ZOOM_FLOOR: f64 = 1e-6;

/// Camera bounds and step sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Multiplier applied by one zoom-in/zoom-out step.
    pub zoom_step: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 5.0,
            zoom_step: 1.2,
        }
    }
}

/// Everything a viewer session can change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub config: ViewConfig,
    pub pan: Position,
    pub zoom: f64,
    pub selected: Option<String>,
    pub hovered: Option<String>,
    pub search_term: String,
    pub filters: FilterCriteria,
    /// Node ids of the path currently highlighted, start to end.
    pub highlighted_path: Option<Vec<String>>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}

impl ViewState {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            config,
            pan: Position::default(),
            zoom: 1.0,
            selected: None,
            hovered: None,
            search_term: String::new(),
            filters: FilterCriteria::default(),
            highlighted_path: None,
        }
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    /// Sets the zoom level, clamped to the configured bounds. Zoom never
    /// drops to zero, whatever `min_zoom` says.
    pub fn zoom_to(&mut self, level: f64) {
        if level.is_nan() {
            return;
        }
        let min = self.config.min_zoom.max(MIN_ZOOM_FLOOR);
        self.zoom = level.min(self.config.max_zoom).max(min);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_to(self.zoom * self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_to(self.zoom / self.config.zoom_step);
    }

    /// Zooms by `factor` while keeping the screen point `focus` over the
    /// same world point.
    pub fn zoom_at(&mut self, factor: f64, focus: Position) {
        let old = self.zoom;
        self.zoom_to(old * factor);
        if old <= 0.0 {
            return;
        }
        let ratio = self.zoom / old;
        self.pan.x = focus.x - (focus.x - self.pan.x) * ratio;
        self.pan.y = focus.y - (focus.y - self.pan.y) * ratio;
    }

    /// Maps a world position to screen space.
    pub fn to_screen(&self, world: Position) -> Position {
        Position::new(
            world.x * self.zoom + self.pan.x,
            world.y * self.zoom + self.pan.y,
        )
    }

    /// Resets the camera. Selection and filters are kept.
    pub fn reset_view(&mut self) {
        self.pan = Position::default();
        self.zoom = 1.0;
    }

    /// Selects a node. Unknown ids clear the selection and return false.
    pub fn select(&mut self, graph: &TimelineGraph, id: &str) -> bool {
        if graph.contains(id) {
            self.selected = Some(id.to_string());
            true
        } else {
            debug!("Cannot select unknown node '{}'", id);
            self.selected = None;
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn hover(&mut self, id: Option<&str>) {
        self.hovered = id.map(str::to_string);
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn update_filters(&mut self, update: FilterUpdate) {
        self.filters.merge(update);
    }

    /// Highlights the shortest path between two nodes. Clears any existing
    /// highlight and returns false if there is none.
    pub fn highlight_path(&mut self, graph: &TimelineGraph, from: &str, to: &str) -> bool {
        self.highlighted_path = graph
            .find_path(from, to)
            .map(|path| path.into_iter().map(str::to_string).collect());
        self.highlighted_path.is_some()
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted_path = None;
    }

    /// Nodes passing the current filters.
    pub fn visible_nodes<'g>(&self, graph: &'g TimelineGraph) -> Vec<&'g Node> {
        graph.filter_nodes(&self.filters)
    }

    /// Nodes matching the current search term.
    pub fn search_results<'g>(&self, graph: &'g TimelineGraph) -> Vec<&'g Node> {
        graph.search_nodes(&self.search_term)
    }

    /// The selected node, if it still exists.
    pub fn selected_node<'g>(&self, graph: &'g TimelineGraph) -> Option<&'g Node> {
        self.selected.as_deref().and_then(|id| graph.get(id))
    }

    /// Everything reachable from the selection.
    pub fn selected_reachable<'g>(&self, graph: &'g TimelineGraph) -> HashSet<&'g str> {
        self.selected
            .as_deref()
            .map(|id| graph.reachable_nodes(id))
            .unwrap_or_default()
    }
}
