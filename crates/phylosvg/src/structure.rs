//! Tree structure recovered from a rendered document.

mod branch_graph;

pub use branch_graph::{BranchGraph, BranchNode, GraphWarning, LeafAssignment};
