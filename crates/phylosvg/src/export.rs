//! Writing documents back out.
//!
//! - [`render`] rewrites a parsed tree document, token by token.
//! - [`render_legend`] draws a standalone taxonomy color legend.

mod legend;
mod rewrite;

pub use legend::render_legend;
pub use rewrite::{RenderOptions, render};
