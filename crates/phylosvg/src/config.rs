//! Configuration types for PhyloSVG tree rewriting.
//!
//! This module provides configuration structures that control graph
//! inference thresholds and how the rewritten document is styled. All types
//! implement [`serde::Deserialize`] for loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`GraphConfig`] - Distance thresholds for branch graph inference.
//! - [`SupportConfig`] - Handling of bootstrap support labels.
//! - [`GroupMarkerConfig`] - Geometry of group marker rectangles.
//! - [`StyleConfig`] - Styling of the rewritten document.
//!
//! # Example
//!
//! ```
//! # use phylosvg::config::{AppConfig, SupportMode};
//! let config = AppConfig::default();
//! assert_eq!(config.graph().branch_proximity(), 1.5);
//! assert_eq!(config.support().mode(), SupportMode::Keep);
//! ```

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Graph inference section.
    #[serde(default)]
    graph: GraphConfig,

    /// Support label section.
    #[serde(default)]
    support: SupportConfig,

    /// Group marker section.
    #[serde(default)]
    groups: GroupMarkerConfig,

    /// Style section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    ///
    /// # Arguments
    ///
    /// * `graph` - Branch graph thresholds.
    /// * `support` - Support label handling.
    /// * `groups` - Group marker geometry.
    /// * `style` - Output styling options.
    pub fn new(
        graph: GraphConfig,
        support: SupportConfig,
        groups: GroupMarkerConfig,
        style: StyleConfig,
    ) -> Self {
        Self {
            graph,
            support,
            groups,
            style,
        }
    }

    /// Returns the graph configuration.
    pub fn graph(&self) -> &GraphConfig {
        &self.graph
    }

    /// Returns the support label configuration.
    pub fn support(&self) -> &SupportConfig {
        &self.support
    }

    /// Returns the support label configuration for editing.
    pub fn support_mut(&mut self) -> &mut SupportConfig {
        &mut self.support
    }

    /// Returns the group marker configuration.
    pub fn groups(&self) -> &GroupMarkerConfig {
        &self.groups
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Returns the style configuration for editing.
    pub fn style_mut(&mut self) -> &mut StyleConfig {
        &mut self.style
    }
}

/// Distance thresholds, in document units, for branch graph inference.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Maximum end-to-start distance of a parent/child branch pair.
    branch_proximity: f64,

    /// Maximum distance between a leaf branch and its label anchor.
    leaf_label_distance: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            branch_proximity: 1.5,
            leaf_label_distance: 10.0,
        }
    }
}

impl GraphConfig {
    /// Creates a new [`GraphConfig`].
    ///
    /// # Arguments
    ///
    /// * `branch_proximity` - Threshold for parent/child edges.
    /// * `leaf_label_distance` - Threshold for leaf-to-label assignment.
    pub fn new(branch_proximity: f64, leaf_label_distance: f64) -> Self {
        Self {
            branch_proximity,
            leaf_label_distance,
        }
    }

    /// Returns the parent/child proximity threshold.
    pub fn branch_proximity(&self) -> f64 {
        self.branch_proximity
    }

    /// Returns the leaf-to-label distance threshold.
    pub fn leaf_label_distance(&self) -> f64 {
        self.leaf_label_distance
    }
}

/// What happens to bootstrap support labels when a document is rendered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportMode {
    /// Support labels are written unchanged.
    #[default]
    Keep,
    /// Support labels are dropped.
    Remove,
    /// Support labels are replaced with filled or open circles.
    Circles,
}

/// Support label handling.
///
/// In [`SupportMode::Circles`] a value above `good` becomes a filled circle,
/// a value from `poor` up to `good` an open circle, and a value below `poor`
/// is dropped.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupportConfig {
    mode: SupportMode,
    good: u32,
    poor: u32,
    circle_size: f64,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            mode: SupportMode::Keep,
            good: 90,
            poor: 50,
            circle_size: 3.0,
        }
    }
}

impl SupportConfig {
    /// Creates a new [`SupportConfig`].
    ///
    /// # Arguments
    ///
    /// * `mode` - What to do with support labels.
    /// * `good` - Values above this become filled circles.
    /// * `poor` - Values below this are dropped.
    /// * `circle_size` - Circle radius.
    pub fn new(mode: SupportMode, good: u32, poor: u32, circle_size: f64) -> Self {
        Self {
            mode,
            good,
            poor,
            circle_size,
        }
    }

    /// Returns the support mode.
    pub fn mode(&self) -> SupportMode {
        self.mode
    }

    /// Sets the support mode.
    pub fn set_mode(&mut self, mode: SupportMode) {
        self.mode = mode;
    }

    /// Returns the filled circle cutoff.
    pub fn good(&self) -> u32 {
        self.good
    }

    /// Returns the omission cutoff.
    pub fn poor(&self) -> u32 {
        self.poor
    }

    /// Returns the circle radius.
    pub fn circle_size(&self) -> f64 {
        self.circle_size
    }
}

/// Geometry of the rectangles marking group membership next to a label.
///
/// The first marker of a label is taller than the following ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GroupMarkerConfig {
    marker_width: f64,
    first_marker_height: f64,
    marker_height: f64,
}

impl Default for GroupMarkerConfig {
    fn default() -> Self {
        Self {
            marker_width: 10.0,
            first_marker_height: 14.0,
            marker_height: 7.0,
        }
    }
}

impl GroupMarkerConfig {
    /// Creates a new [`GroupMarkerConfig`].
    pub fn new(marker_width: f64, first_marker_height: f64, marker_height: f64) -> Self {
        Self {
            marker_width,
            first_marker_height,
            marker_height,
        }
    }

    /// Returns the marker width.
    pub fn marker_width(&self) -> f64 {
        self.marker_width
    }

    /// Returns the height of the first marker.
    pub fn first_marker_height(&self) -> f64 {
        self.first_marker_height
    }

    /// Returns the height of every following marker.
    pub fn marker_height(&self) -> f64 {
        self.marker_height
    }
}

/// Styling of the rewritten document.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Stroke width forced onto every branch of the no-names output.
    #[serde(default)]
    branch_stroke_width: Option<f64>,
}

impl StyleConfig {
    /// Creates a new [`StyleConfig`].
    pub fn new(branch_stroke_width: Option<f64>) -> Self {
        Self {
            branch_stroke_width,
        }
    }

    /// Returns the configured branch stroke width.
    pub fn branch_stroke_width(&self) -> Option<f64> {
        self.branch_stroke_width
    }

    /// Sets the branch stroke width.
    pub fn set_branch_stroke_width(&mut self, width: Option<f64>) {
        self.branch_stroke_width = width;
    }
}
