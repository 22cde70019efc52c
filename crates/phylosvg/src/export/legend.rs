//! Taxonomy color legend.

use log::debug;
use svg::node::element as svg_element;

use crate::taxonomy::TaxonomyColors;

/// Width of one monospace character at the legend font size.
const LETTER_WIDTH: f64 = 14.39;
/// Height of one legend row.
const LETTER_HEIGHT: f64 = 19.2;
/// Width of a color swatch, in characters.
const SWATCH_LETTERS: f64 = 5.0;
/// Gap between a swatch and its name.
const SPACER: f64 = 20.0;
/// Margin around the legend.
const FIELD: f64 = 5.0;
const TEXT_STYLE: &str = "font-size:24px; font-family:Courier New";

/// Render a standalone SVG legend with one swatch and name per taxon, in
/// table order.
///
/// # Examples
///
/// ```
/// use phylosvg::{TaxonomyColors, render_legend};
///
/// let colors = TaxonomyColors::parse("255\t0\t0\tProteobacteria\n").unwrap();
/// let legend = render_legend(&colors);
/// assert!(legend.contains("Proteobacteria"));
/// assert!(legend.contains("#ff0000"));
/// ```
pub fn render_legend(colors: &TaxonomyColors) -> String {
    let swatch_width = LETTER_WIDTH * SWATCH_LETTERS;
    let longest_name = colors
        .iter()
        .map(|(taxon, _)| taxon.chars().count())
        .max()
        .unwrap_or_default();

    let width = swatch_width + SPACER + longest_name as f64 * LETTER_WIDTH + FIELD * 2.0;
    let height = LETTER_HEIGHT * colors.len() as f64 + FIELD * 2.0;

    let mut document = svg::Document::new()
        .set("width", format!("{}px", width.trunc()))
        .set("height", format!("{}px", height.trunc()));

    for (row, (taxon, color)) in colors.iter().enumerate() {
        let row = row as f64;
        let swatch = svg_element::Rectangle::new()
            .set("x", FIELD)
            .set("y", row * LETTER_HEIGHT + FIELD)
            .set("width", format!("{swatch_width:.2}px"))
            .set("height", format!("{LETTER_HEIGHT:.2}px"))
            .set("stroke", "none")
            .set("fill", color);
        let name = svg_element::Text::new(taxon)
            .set("x", FIELD + swatch_width + SPACER)
            .set("y", (row + 1.0) * LETTER_HEIGHT)
            .set("fill", "black")
            .set("style", TEXT_STYLE);
        document = document.add(swatch).add(name);
    }

    debug!(taxa = colors.len(), width, height; "Legend rendered");
    document.to_string()
}
