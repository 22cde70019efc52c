//! # PhyloSVG Parser
//!
//! Parser for the line-oriented SVG subset that tree viewers write when they
//! export a rendered phylogenetic tree. The parser extracts the `text`,
//! `path` and `rect` elements the engine edits and keeps every other line as
//! literal text, so a parsed document can be written back unchanged.
//!
//! ## Usage
//!
//! ```
//! # use phylosvg_parser::{parse, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = concat!(
//!         "<svg>\n",
//!         "<path id=\"path1\" d=\"M 0,0 5,0\" style=\"stroke:#000000\" />\n",
//!         "<text id=\"text1\" x=\"6\" y=\"0\" style=\"fill:#ff0000\">Leaf</text>\n",
//!         "</svg>\n",
//!     );
//!
//!     let parsed = parse(source)?;
//!     assert_eq!(parsed.document().element_count(), 2);
//!     Ok(())
//! }
//! ```

mod document;
mod element_parser;
pub mod error;
pub mod path_data;
mod span;

pub use document::{ParsedDocument, parse};
pub use element_parser::parse_element;
pub use path_data::stroke_endpoints;
pub use span::Span;
