//! Branch topology inferred from stroke geometry.
//!
//! A rendered tree carries no explicit structure: every branch is an
//! independent `path` or `rect` element. This module rebuilds the forest by
//! joining a branch to a child whenever the child's stroke starts close to
//! where the parent's stroke ends, attaches leaf branches to their nearest
//! label and propagates label colors up the tree.
//!
//! # Architecture
//!
//! - [`BranchGraph`]: Owns every node in an arena. Parent and child links
//!   are arena indices, never references.
//! - [`BranchNode`]: One drawn branch with its stroke endpoints and color.
//! - [`GraphWarning`]: Recoverable inconsistencies found while building or
//!   coloring the graph.

use std::{collections::HashMap, fmt};

use log::{debug, info, warn};

use phylosvg_core::{document::Document, geometry::Point, label::LabelInfo};
use phylosvg_parser::stroke_endpoints;

// =============================================================================
// Node storage
// =============================================================================

/// Index of a node in the graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeIndex(usize);

/// Traversal state used by color propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Done,
}

/// One drawn branch of the tree.
#[derive(Debug, Clone)]
pub struct BranchNode {
    element_id: String,
    start: Point,
    end: Point,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
    color: Option<String>,
    color_resolved: bool,
    visit: Visit,
}

impl BranchNode {
    fn new(element_id: String, start: Point, end: Point) -> Self {
        Self {
            element_id,
            start,
            end,
            parent: None,
            children: Vec::new(),
            color: None,
            color_resolved: false,
            visit: Visit::Unvisited,
        }
    }

    /// Returns the id of the underlying branch element.
    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    /// Returns where the stroke starts.
    pub fn start(&self) -> Point {
        self.start
    }

    /// Returns where the stroke ends.
    pub fn end(&self) -> Point {
        self.end
    }

    /// Returns the number of inferred children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` for branches without inferred children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the color assigned to this branch, if any.
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Returns `true` once a definitive color has been fixed for this branch.
    pub fn is_color_resolved(&self) -> bool {
        self.color_resolved
    }

    /// Distance from the nearer stroke endpoint to `point`.
    fn distance_to(&self, point: Point) -> f64 {
        self.start.distance(point).min(self.end.distance(point))
    }
}

// =============================================================================
// Reporting types
// =============================================================================

/// A recoverable inconsistency in the inferred tree.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphWarning {
    /// A branch gained a third (or later) child.
    ExcessChildren {
        parent: String,
        child: String,
        children: usize,
    },
    /// A branch element has no stroke geometry and was left out of the graph.
    MissingGeometry { element_id: String },
    /// No label lies within the distance threshold of a leaf branch.
    UnmatchedLeaf { element_id: String },
    /// Color propagation reached a branch that is its own ancestor.
    ColorCycle { element_id: String },
}

impl fmt::Display for GraphWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExcessChildren {
                parent,
                child,
                children,
            } => write!(
                f,
                "branch `{parent}` has {children} children after adding `{child}`"
            ),
            Self::MissingGeometry { element_id } => {
                write!(f, "branch `{element_id}` has no usable stroke geometry")
            }
            Self::UnmatchedLeaf { element_id } => {
                write!(f, "no label found for leaf branch `{element_id}`")
            }
            Self::ColorCycle { element_id } => {
                write!(f, "branch `{element_id}` is part of a cycle")
            }
        }
    }
}

/// A leaf branch matched to the label nearest to it.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafAssignment {
    branch_id: String,
    label_id: String,
    distance: f64,
}

impl LeafAssignment {
    /// Returns the id of the leaf branch element.
    pub fn branch_id(&self) -> &str {
        &self.branch_id
    }

    /// Returns the id of the assigned text element.
    pub fn label_id(&self) -> &str {
        &self.label_id
    }

    /// Returns the distance between the branch and the label anchor.
    pub fn distance(&self) -> f64 {
        self.distance
    }
}

// =============================================================================
// Graph
// =============================================================================

/// Forest of branches inferred from stroke endpoints.
///
/// Nodes are kept in document order; each node has at most one parent.
#[derive(Debug, Clone, Default)]
pub struct BranchGraph {
    nodes: Vec<BranchNode>,
    index: HashMap<String, NodeIndex>,
    warnings: Vec<GraphWarning>,
}

impl BranchGraph {
    /// Build the graph over the `path` and `rect` elements of a document.
    ///
    /// Elements without stroke geometry are skipped with a
    /// [`GraphWarning::MissingGeometry`].
    pub fn build(document: &Document, proximity_threshold: f64) -> Self {
        let mut warnings = Vec::new();
        let mut segments = Vec::new();
        for (element_id, element) in document.branch_elements() {
            match stroke_endpoints(element) {
                Some((start, end)) => segments.push((element_id, start, end)),
                None => {
                    warn!(element_id; "Branch has no usable stroke geometry");
                    warnings.push(GraphWarning::MissingGeometry {
                        element_id: element_id.to_string(),
                    });
                }
            }
        }

        let mut graph = Self::from_segments(segments, proximity_threshold);
        warnings.append(&mut graph.warnings);
        graph.warnings = warnings;
        graph
    }

    /// Build the graph over `(element_id, start, end)` stroke segments.
    ///
    /// For every ordered pair `(i, j)` of distinct segments whose distance
    /// from the end of `i` to the start of `j` is below
    /// `proximity_threshold`, `j` becomes a child of `i`. A later qualifying
    /// pair moves `j` to its new parent, so the last pair in iteration order
    /// wins rather than the nearest one.
    pub fn from_segments<I, S>(segments: I, proximity_threshold: f64) -> Self
    where
        I: IntoIterator<Item = (S, Point, Point)>,
        S: Into<String>,
    {
        let mut graph = Self::default();
        for (element_id, start, end) in segments {
            let element_id = element_id.into();
            if graph.index.contains_key(&element_id) {
                warn!(element_id; "Ignoring repeated branch segment");
                continue;
            }
            graph
                .index
                .insert(element_id.clone(), NodeIndex(graph.nodes.len()));
            graph.nodes.push(BranchNode::new(element_id, start, end));
        }

        let count = graph.nodes.len();
        for i in 0..count {
            for j in 0..count {
                if i == j {
                    continue;
                }
                let distance = graph.nodes[i].end.distance(graph.nodes[j].start);
                if distance < proximity_threshold {
                    graph.attach(NodeIndex(i), NodeIndex(j));
                }
            }
        }

        info!(
            branches = graph.nodes.len(),
            leaves = graph.leaves().count();
            "Branch graph built"
        );
        graph
    }

    /// Make `child` a child of `parent`, detaching it from any earlier parent.
    fn attach(&mut self, parent: NodeIndex, child: NodeIndex) {
        if let Some(previous) = self.nodes[child.0].parent {
            self.nodes[previous.0]
                .children
                .retain(|&sibling| sibling != child);
        }
        self.nodes[child.0].parent = Some(parent);

        let parent_node = &mut self.nodes[parent.0];
        parent_node.children.push(child);
        if parent_node.children.len() > 2 {
            let warning = GraphWarning::ExcessChildren {
                parent: parent_node.element_id.clone(),
                child: self.nodes[child.0].element_id.clone(),
                children: self.nodes[parent.0].children.len(),
            };
            warn!(warning:%; "Branch is not binary");
            self.warnings.push(warning);
        }
    }

    /// Returns the number of branches in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no branches.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node of a branch element.
    pub fn node(&self, element_id: &str) -> Option<&BranchNode> {
        self.index.get(element_id).map(|index| &self.nodes[index.0])
    }

    /// Iterates over every branch in document order.
    pub fn nodes(&self) -> impl Iterator<Item = &BranchNode> {
        self.nodes.iter()
    }

    /// Iterates over the leaf branches in document order.
    pub fn leaves(&self) -> impl Iterator<Item = &BranchNode> {
        self.nodes.iter().filter(|node| node.is_leaf())
    }

    /// Returns the element id of a branch's parent.
    pub fn parent_of(&self, element_id: &str) -> Option<&str> {
        let parent = self.node(element_id)?.parent?;
        Some(&self.nodes[parent.0].element_id)
    }

    /// Returns the element ids of a branch's children, in insertion order.
    pub fn children_of(&self, element_id: &str) -> Vec<&str> {
        self.node(element_id)
            .map(|node| {
                node.children
                    .iter()
                    .map(|child| self.nodes[child.0].element_id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the warnings collected so far.
    pub fn warnings(&self) -> &[GraphWarning] {
        &self.warnings
    }

    /// Give every leaf branch the color of its nearest label.
    ///
    /// For each leaf the label with the strictly smallest distance below
    /// `distance_threshold` wins, measured from the nearer stroke endpoint
    /// to the label anchor; on ties the first label seen is kept. A leaf is
    /// only marked as resolved when its label has a `fill` color. Leaves
    /// without a qualifying label are reported as
    /// [`GraphWarning::UnmatchedLeaf`].
    pub fn assign_leaves_to_labels(
        &mut self,
        labels: &[LabelInfo],
        distance_threshold: f64,
    ) -> Vec<LeafAssignment> {
        let mut assignments = Vec::new();
        let mut unmatched = Vec::new();

        for node in self.nodes.iter_mut().filter(|node| node.is_leaf()) {
            let mut best: Option<(&LabelInfo, f64)> = None;
            for label in labels {
                let distance = node.distance_to(label.position());
                let closer = best.is_none_or(|(_, best_distance)| distance < best_distance);
                if distance < distance_threshold && closer {
                    best = Some((label, distance));
                }
            }

            match best {
                Some((label, distance)) => {
                    node.color = label.color().map(str::to_string);
                    node.color_resolved = node.color.is_some();
                    assignments.push(LeafAssignment {
                        branch_id: node.element_id.clone(),
                        label_id: label.element_id().to_string(),
                        distance,
                    });
                }
                None => {
                    warn!(element_id = node.element_id; "No label found for leaf branch");
                    unmatched.push(GraphWarning::UnmatchedLeaf {
                        element_id: node.element_id.clone(),
                    });
                }
            }
        }

        info!(
            assigned = assignments.len(),
            unmatched = unmatched.len();
            "Leaf branches matched to labels"
        );
        self.warnings.extend(unmatched);
        assignments
    }

    /// Propagate colors upward from every branch, in sorted element id order.
    ///
    /// Returns the number of branches that adopted a color from their
    /// children.
    pub fn propagate_colors(&mut self) -> usize {
        let mut order: Vec<NodeIndex> = (0..self.nodes.len()).map(NodeIndex).collect();
        order.sort_by(|a, b| self.nodes[a.0].element_id.cmp(&self.nodes[b.0].element_id));

        let resolved_before = self.resolved_count();
        for index in order {
            self.propagate_color(index);
        }
        let adopted = self.resolved_count() - resolved_before;
        debug!(adopted; "Colors propagated");
        adopted
    }

    /// Resolve the color of the subtree rooted at `element_id`.
    ///
    /// Returns `false` if the branch is unknown.
    pub fn propagate_color_from(&mut self, element_id: &str) -> bool {
        match self.index.get(element_id).copied() {
            Some(index) => {
                self.propagate_color(index);
                true
            }
            None => false,
        }
    }

    /// Post-order walk with an explicit stack.
    ///
    /// A branch with exactly two children adopts their color only when both
    /// are resolved to the same color. Every branch is visited once;
    /// reaching a branch that is still in progress means the links form a
    /// cycle, which is reported and cut.
    fn propagate_color(&mut self, root: NodeIndex) {
        if self.nodes[root.0].visit != Visit::Unvisited {
            return;
        }

        let mut stack = vec![(root, false)];
        while let Some((index, expanded)) = stack.pop() {
            if expanded {
                self.resolve_from_children(index);
                self.nodes[index.0].visit = Visit::Done;
                continue;
            }
            if self.nodes[index.0].visit != Visit::Unvisited {
                continue;
            }

            self.nodes[index.0].visit = Visit::InProgress;
            stack.push((index, true));
            if self.nodes[index.0].children.len() != 2 {
                continue;
            }
            for position in (0..2).rev() {
                let child = self.nodes[index.0].children[position];
                let visit = self.nodes[child.0].visit;
                match visit {
                    Visit::Unvisited => stack.push((child, false)),
                    Visit::InProgress => self.report_cycle(child),
                    Visit::Done => {}
                }
            }
        }
    }

    fn resolve_from_children(&mut self, index: NodeIndex) {
        let node = &self.nodes[index.0];
        if node.color_resolved {
            return;
        }
        let &[first, second] = node.children.as_slice() else {
            return;
        };
        let (first, second) = (&self.nodes[first.0], &self.nodes[second.0]);
        if !(first.color_resolved && second.color_resolved) || first.color != second.color {
            return;
        }

        let color = first.color.clone();
        let node = &mut self.nodes[index.0];
        node.color_resolved = color.is_some();
        node.color = color;
    }

    fn report_cycle(&mut self, index: NodeIndex) {
        let element_id = self.nodes[index.0].element_id.clone();
        warn!(element_id; "Branch is part of a cycle, skipping its subtree");
        self.warnings.push(GraphWarning::ColorCycle { element_id });
    }

    fn resolved_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.color_resolved).count()
    }

    /// Write every resolved branch color into the element's `stroke`.
    ///
    /// Returns the number of elements updated.
    pub fn apply_colors(&self, document: &mut Document) -> usize {
        let updated = self
            .nodes
            .iter()
            .filter(|node| node.color_resolved)
            .filter_map(|node| Some((node.element_id.as_str(), node.color.as_deref()?)))
            .filter(|(element_id, color)| {
                document
                    .element_mut(element_id)
                    .is_some_and(|element| element.set_style_property("stroke", *color))
            })
            .count();
        info!(updated; "Branch colors applied");
        updated
    }

    /// Overwrite the `stroke-width` of every branch in the graph.
    ///
    /// Returns the number of elements updated.
    pub fn set_stroke_width(&self, document: &mut Document, width: f64) -> usize {
        let width = width.to_string();
        self.nodes
            .iter()
            .filter(|node| {
                document
                    .element_mut(&node.element_id)
                    .is_some_and(|element| element.set_style_property("stroke-width", width.as_str()))
            })
            .count()
    }
}
