//! PhyloSVG Core Types and Definitions
//!
//! This crate provides the foundational types for reading and editing
//! rendered phylogenetic tree images. It includes:
//!
//! - **Elements**: Tagged graphic primitives with attributes and style maps ([`element::Element`])
//! - **Documents**: Token stream plus element table ([`document::Document`])
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Labels**: Label classification and sequence identifier extraction ([`label`] module)

pub mod color;
pub mod document;
pub mod element;
pub mod geometry;
pub mod label;
