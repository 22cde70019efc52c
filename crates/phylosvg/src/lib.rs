//! PhyloSVG - Recolor and rewrite rendered phylogenetic tree images.
//!
//! Parsing, branch topology inference, recoloring, and rewriting for the SVG
//! files tree viewers export. The rewritten document matches the input
//! everywhere except at the edited elements.

pub mod config;

mod error;
mod export;
mod groups;
mod leaf_order;
mod structure;
mod taxonomy;

pub use phylosvg_core::{color, document, element, geometry, label};
pub use phylosvg_parser::ParsedDocument;

pub use error::PhyloSvgError;
pub use export::{RenderOptions, render, render_legend};
pub use groups::{GroupAssignment, GroupColors};
pub use leaf_order::order_labels_by_vertical_position;
pub use structure::{BranchGraph, BranchNode, GraphWarning, LeafAssignment};
pub use taxonomy::{
    RecolorOptions, RecolorSummary, TaxonomyAssignment, TaxonomyColors, UNKNOWN_TAXON, mark_bold,
    recolor_labels,
};

use log::{debug, info, trace};

use config::AppConfig;
use document::Document;
use label::{LabelInfo, LabelKind};

/// Builder for reading, editing and writing tree images.
///
/// Thresholds, support handling and marker geometry come from the
/// [`AppConfig`].
///
/// # Examples
///
/// ```rust,no_run
/// use phylosvg::{TreeImageBuilder, config::AppConfig};
///
/// let source = std::fs::read_to_string("tree.svg").expect("Failed to read");
///
/// let builder = TreeImageBuilder::new(AppConfig::default());
///
/// // Parse the image into tokens and elements
/// let (mut document, _warnings) = builder.parse(&source)
///     .expect("Failed to parse")
///     .into_parts();
///
/// // Color branches after their leaf labels
/// let graph = builder.color_branches(&mut document);
/// println!("{} branches", graph.len());
///
/// // Write the document without leaf names
/// let svg = builder.render(&document, true, None)
///     .expect("Failed to render");
///
/// // Or use default config
/// let builder = TreeImageBuilder::default();
/// ```
#[derive(Default)]
pub struct TreeImageBuilder {
    config: AppConfig,
}

impl TreeImageBuilder {
    /// Create a new builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Graph thresholds, support handling and styling
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Returns the builder configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a tree image.
    ///
    /// # Arguments
    ///
    /// * `source` - Content of the SVG file
    ///
    /// # Errors
    ///
    /// Returns [`PhyloSvgError::Parse`] when an element cannot be referenced,
    /// carrying the source for error reporting.
    ///
    /// # Examples
    ///
    /// ```
    /// use phylosvg::TreeImageBuilder;
    ///
    /// let source = "<svg>\n<text id=\"t1\" x=\"1\" y=\"2\">Leaf</text>\n</svg>\n";
    /// let parsed = TreeImageBuilder::default().parse(source).unwrap();
    /// assert_eq!(parsed.document().element_count(), 1);
    /// ```
    pub fn parse(&self, source: &str) -> Result<ParsedDocument, PhyloSvgError> {
        info!("Parsing tree image");

        let parsed = phylosvg_parser::parse(source)
            .map_err(|err| PhyloSvgError::new_parse_error(err, source))?;

        debug!(
            elements = parsed.document().element_count(),
            warnings = parsed.warnings().len();
            "Tree image parsed successfully"
        );
        trace!(document:? = parsed.document(); "Parsed document");
        Ok(parsed)
    }

    /// Build the branch graph of a document.
    pub fn build_graph(&self, document: &Document) -> BranchGraph {
        BranchGraph::build(document, self.config.graph().branch_proximity())
    }

    /// Color every branch after the labels of its leaves.
    ///
    /// Builds the branch graph, gives each leaf branch the color of its
    /// nearest leaf label, propagates colors shared by both children of a
    /// branch, and writes them to the branches' `stroke`. The configured
    /// branch stroke width, if any, is applied to every branch.
    ///
    /// Returns the graph so callers can inspect its warnings.
    pub fn color_branches(&self, document: &mut Document) -> BranchGraph {
        info!("Coloring branches");
        let mut graph = self.build_graph(document);

        let labels = leaf_labels(document);
        graph.assign_leaves_to_labels(&labels, self.config.graph().leaf_label_distance());
        graph.propagate_colors();
        graph.apply_colors(document);

        if let Some(width) = self.config.style().branch_stroke_width() {
            let updated = graph.set_stroke_width(document, width);
            debug!(width, updated; "Branch stroke width set");
        }

        if !graph.warnings().is_empty() {
            info!(warnings = graph.warnings().len(); "Branch graph has warnings");
        }
        graph
    }

    /// Rewrite a document.
    ///
    /// Support labels are handled as configured. Group markers are drawn
    /// when `groups` holds a group assignment and its colors.
    ///
    /// # Arguments
    ///
    /// * `document` - The document to write
    /// * `no_names` - Omit leaf labels
    /// * `groups` - Group membership and group colors
    ///
    /// # Errors
    ///
    /// Returns [`PhyloSvgError::MissingGroupColor`] when a label's group has
    /// no color, and [`PhyloSvgError::UnknownElement`] for a corrupt token
    /// stream.
    pub fn render(
        &self,
        document: &Document,
        no_names: bool,
        groups: Option<(&GroupAssignment, &GroupColors)>,
    ) -> Result<String, PhyloSvgError> {
        info!(no_names; "Rendering tree image");
        let mut options = RenderOptions::new()
            .with_no_names(no_names)
            .with_support(self.config.support().clone());
        if let Some((assignment, colors)) = groups {
            options = options.with_groups(assignment, colors, self.config.groups().clone());
        }
        render(document, &options)
    }

    /// Returns the sequence ids of the leaf labels, top to bottom.
    pub fn leaf_order(&self, document: &Document, preserve_pipe_format: bool) -> Vec<String> {
        order_labels_by_vertical_position(&document.labels(), preserve_pipe_format)
    }
}

/// Positioned labels that can name a leaf branch.
fn leaf_labels(document: &Document) -> Vec<LabelInfo> {
    document
        .labels()
        .into_iter()
        .filter(|label| label.kind() == LabelKind::Leaf)
        .collect()
}
