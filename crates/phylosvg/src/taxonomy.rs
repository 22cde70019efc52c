//! Label recoloring by taxonomy.
//!
//! Two tab-separated tables drive recoloring:
//!
//! ```text
//! # taxonomy colors: R, G, B, taxon
//! 255	0	0	Proteobacteria
//! 0	0	255	Firmicutes
//! 128	128	128	Unknown
//!
//! # assignment: sequence id, lineage ranks
//! WP_000001.1	Bacteria	Proteobacteria	Gammaproteobacteria
//! ```
//!
//! A label takes the color of the phylum its sequence is assigned to, falling
//! back to the domain when the phylum has no color.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, info, warn};

use phylosvg_core::{
    color::Color,
    document::Document,
    element::{Element, ElementKind},
    label::{TECHNICAL_MARKER, sequence_id_from_text},
};

use crate::error::PhyloSvgError;

/// Taxon whose color is given to unassigned leaf labels.
pub const UNKNOWN_TAXON: &str = "Unknown";

/// Lineage head that is always used as is, without looking at the phylum.
const VIRUSES: &str = "Viruses";

/// Minimum length of the prefix before `_` for it to be stored as a short id.
const MIN_SHORT_ID_LEN: usize = 5;

/// Labels at most this long are left alone when they have no assignment.
const MAX_UNASSIGNED_LABEL_LEN: usize = 5;

/// Map of taxon name to color, in table order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxonomyColors {
    colors: IndexMap<String, Color>,
}

impl TaxonomyColors {
    /// Parse a `R<TAB>G<TAB>B<TAB>Taxon` table.
    ///
    /// Blank lines and lines starting with `#` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PhyloSvgError::Table`] for a line without exactly four
    /// fields or with a channel outside `0..=255`.
    pub fn parse(source: &str) -> Result<Self, PhyloSvgError> {
        let mut colors = IndexMap::new();
        for (number, line) in table_lines(source) {
            let fields: Vec<&str> = line.split('\t').collect();
            let &[red, green, blue, taxon] = fields.as_slice() else {
                return Err(PhyloSvgError::table_error(
                    "taxonomy color",
                    number,
                    format!("expected 4 tab-separated fields, found {}", fields.len()),
                ));
            };
            let channel = |value: &str| {
                value.trim().parse::<u8>().map_err(|err| {
                    PhyloSvgError::table_error(
                        "taxonomy color",
                        number,
                        format!("invalid color channel `{value}`: {err}"),
                    )
                })
            };
            let color = Color::from_rgb(channel(red)?, channel(green)?, channel(blue)?);
            colors.insert(taxon.to_string(), color);
        }
        debug!(taxa = colors.len(); "Taxonomy colors read");
        Ok(Self { colors })
    }

    /// Returns the color of a taxon.
    pub fn get(&self, taxon: &str) -> Option<Color> {
        self.colors.get(taxon).copied()
    }

    /// Returns `true` if the taxon has a color.
    pub fn contains(&self, taxon: &str) -> bool {
        self.colors.contains_key(taxon)
    }

    /// Iterates over `(taxon, color)` in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Color)> {
        self.colors.iter().map(|(taxon, color)| (taxon.as_str(), *color))
    }

    /// Returns the number of taxa.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Color)> for TaxonomyColors {
    fn from_iter<I: IntoIterator<Item = (S, Color)>>(iter: I) -> Self {
        Self {
            colors: iter
                .into_iter()
                .map(|(taxon, color)| (taxon.into(), color))
                .collect(),
        }
    }
}

/// Map of sequence id to lineage.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyAssignment {
    by_id: HashMap<String, Vec<String>>,
    by_short_id: HashMap<String, Vec<String>>,
}

impl TaxonomyAssignment {
    /// Create an empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `id<TAB>rank<TAB>rank...` table.
    ///
    /// Blank lines and lines starting with `#` are ignored; lines without a
    /// tab are logged and skipped.
    pub fn parse(source: &str) -> Self {
        let mut assignment = Self::new();
        let mut skipped = 0;
        for (number, line) in table_lines(source) {
            match line.split_once('\t') {
                Some((id, lineage)) => {
                    assignment.insert(id, lineage.split('\t').map(str::to_string).collect());
                }
                None => {
                    warn!(line = number; "Taxonomy assignment line has no lineage, skipping");
                    skipped += 1;
                }
            }
        }
        info!(ids = assignment.by_id.len(), skipped; "Taxonomy assignment read");
        assignment
    }

    /// Assign a lineage to a sequence id.
    ///
    /// The lineage is stored under the full id and the id without its
    /// version suffix (`WP_000001` for `WP_000001.1`). When the unversioned
    /// id has a prefix before `_` of at least five characters, the lineage
    /// is also stored under that short id, so `W9Y1V1` is found for
    /// `W9Y1V1_9EURO` while `CRP` is not registered for `CRP_ECOLI`.
    pub fn insert(&mut self, id: &str, lineage: Vec<String>) {
        self.by_id.insert(id.to_string(), lineage.clone());

        let unversioned = before(id, '.');
        let short_id = before(unversioned, '_');
        if short_id != unversioned && short_id.chars().count() >= MIN_SHORT_ID_LEN {
            self.by_short_id
                .insert(short_id.to_string(), lineage.clone());
        }
        self.by_id.insert(unversioned.to_string(), lineage);
    }

    /// Find the lineage of a label's sequence id.
    ///
    /// Tries the id cut at the first `-`, then the short id before the first
    /// `_`, then the id cut at the first `.`.
    pub fn lookup(&self, sequence_id: &str) -> Option<&[String]> {
        self.by_id
            .get(before(sequence_id, '-'))
            .or_else(|| self.by_short_id.get(before(sequence_id, '_')))
            .or_else(|| self.by_id.get(before(sequence_id, '.')))
            .map(Vec::as_slice)
    }

    /// Returns the number of ids, not counting short ids.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns `true` if nothing is assigned.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Font size of Swiss-Prot entry names under [`RecolorOptions::with_uniprot_fonts`].
const SWISSPROT_FONT_SIZE: &str = "10px";

/// Font size of unassigned PDB chain labels.
const PDB_FONT_SIZE: &str = "12px";

/// Font rules applied while recoloring.
///
/// By default unassigned PDB chain labels (`2cgp_A|Escherichia coli`) are
/// set in bold Arial; Swiss-Prot entry names are left as they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecolorOptions {
    uniprot_fonts: bool,
    pdb_fonts: bool,
}

impl Default for RecolorOptions {
    fn default() -> Self {
        Self {
            uniprot_fonts: false,
            pdb_fonts: true,
        }
    }
}

impl RecolorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set recolored Swiss-Prot entry names (`CRP_ECOLI`) in bold 10px
    /// Arial, so they stand out among RefSeq and numeric ids.
    pub fn with_uniprot_fonts(mut self, enabled: bool) -> Self {
        self.uniprot_fonts = enabled;
        self
    }

    /// Set unassigned PDB chain labels in bold 12px Arial.
    pub fn with_pdb_fonts(mut self, enabled: bool) -> Self {
        self.pdb_fonts = enabled;
        self
    }
}

/// Counts reported by [`recolor_labels`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecolorSummary {
    recolored: usize,
    defaulted: usize,
    missing_color: usize,
    emphasized: usize,
}

impl RecolorSummary {
    /// Labels colored after their assigned taxon.
    pub fn recolored(&self) -> usize {
        self.recolored
    }

    /// Unassigned labels given the `Unknown` color.
    pub fn defaulted(&self) -> usize {
        self.defaulted
    }

    /// Assigned labels whose taxon has no color.
    pub fn missing_color(&self) -> usize {
        self.missing_color
    }

    /// Labels whose font was changed by a [`RecolorOptions`] rule.
    pub fn emphasized(&self) -> usize {
        self.emphasized
    }
}

/// Sequence id without a `-start-end` range suffix.
fn without_range(sequence_id: &str) -> &str {
    sequence_id
        .split_once('-')
        .map_or(sequence_id, |(head, _)| head)
}

/// Swiss-Prot entry names are upper case with a short mnemonic before the
/// `_`. Two-letter RefSeq prefixes, numeric ids and scale captions are not.
fn is_swissprot_name(sequence_id: &str) -> bool {
    let id = without_range(sequence_id);
    let prefix = id.split_once('_').map_or(id, |(head, _)| head);
    let prefix_len = prefix.chars().count();
    prefix_len < 5
        && prefix_len != 2
        && !id.contains("scale")
        && prefix.parse::<i64>().is_err()
        && id == id.to_uppercase()
}

/// PDB chain ids are a four-character entry code and a one-character chain.
fn is_pdb_chain(sequence_id: &str) -> bool {
    let id = without_range(sequence_id);
    let Some((code, rest)) = id.split_once('_') else {
        return false;
    };
    let chain = rest.split(['_', '|']).next().unwrap_or_default();
    code.chars().count() == 4 && chain.chars().count() == 1
}

fn set_bold_arial(element: &mut Element, size: &str) -> bool {
    element.set_style_property("font-family", "Arial")
        && element.set_style_property("font-size", size)
        && element.set_style_property("font-weight", "bold")
}

/// Chooses the rank whose color a lineage is drawn with.
///
/// Viruses and single-rank lineages use the first rank; otherwise the
/// second rank (the phylum) when it has a color, else the first.
fn color_rank<'a>(lineage: &'a [String], colors: &TaxonomyColors) -> Option<&'a str> {
    let rank = match lineage {
        [] => return None,
        [domain, ..] if domain == VIRUSES => domain,
        [domain] => domain,
        [domain, phylum, ..] => {
            if colors.contains(phylum) {
                phylum
            } else {
                domain
            }
        }
    };
    Some(rank.as_str())
}

/// Recolor every text label after the taxonomy of its sequence.
///
/// Each label loses its `stroke` style property. Labels with an assigned
/// lineage get the `fill` color of that lineage. Unassigned labels are left
/// alone when they name a taxon, are technical, or are at most five
/// characters long (support values); the rest get the [`UNKNOWN_TAXON`]
/// color. The font rules of `options` apply to recolored and defaulted
/// labels respectively.
pub fn recolor_labels(
    document: &mut Document,
    colors: &TaxonomyColors,
    assignment: &TaxonomyAssignment,
    options: RecolorOptions,
) -> RecolorSummary {
    let mut summary = RecolorSummary::default();
    let unknown = colors.get(UNKNOWN_TAXON);

    let labels = document
        .elements_mut()
        .filter(|(_, element)| element.kind() == Some(ElementKind::Text));
    for (element_id, element) in labels {
        element.remove_style_property("stroke");

        let text = element.label_text().to_string();
        let sequence_id = sequence_id_from_text(&text, false, false);

        if let Some(lineage) = assignment.lookup(&sequence_id) {
            let Some(rank) = color_rank(lineage, colors) else {
                continue;
            };
            match colors.get(rank) {
                Some(color) => {
                    if element.set_style_property("fill", color.to_string()) {
                        summary.recolored += 1;
                    }
                    if options.uniprot_fonts
                        && is_swissprot_name(&sequence_id)
                        && set_bold_arial(element, SWISSPROT_FONT_SIZE)
                    {
                        summary.emphasized += 1;
                    }
                }
                None => {
                    warn!(element_id, sequence_id, taxon = rank; "No color found for taxon");
                    summary.missing_color += 1;
                }
            }
        } else if colors.contains(text.trim()) || sequence_id.contains(TECHNICAL_MARKER) {
            debug!(element_id, text; "Label is a taxon name or technical, not recoloring");
        } else if text.chars().count() > MAX_UNASSIGNED_LABEL_LEN {
            match unknown {
                Some(color) => {
                    warn!(element_id, sequence_id; "No taxonomy for sequence, using default color");
                    if element.set_style_property("fill", color.to_string()) {
                        summary.defaulted += 1;
                    }
                    if options.pdb_fonts
                        && is_pdb_chain(&sequence_id)
                        && set_bold_arial(element, PDB_FONT_SIZE)
                    {
                        summary.emphasized += 1;
                    }
                }
                None => {
                    warn!(element_id, sequence_id; "No taxonomy for sequence and no `Unknown` color");
                }
            }
        }
    }

    info!(
        recolored = summary.recolored,
        defaulted = summary.defaulted,
        missing_color = summary.missing_color,
        emphasized = summary.emphasized;
        "Labels recolored"
    );
    summary
}

/// Set `font-weight:bold` on every text label containing `|mark|`.
///
/// Returns the number of labels marked.
pub fn mark_bold(document: &mut Document, mark: &str) -> usize {
    let needle = format!("|{mark}|");
    let mut marked = 0;
    for (_, element) in document.elements_mut() {
        if element.kind() == Some(ElementKind::Text)
            && element.label_text().contains(&needle)
            && element.set_style_property("font-weight", "bold")
        {
            marked += 1;
        }
    }
    info!(mark, marked; "Labels marked bold");
    marked
}

/// Yields `(line_number, line)` for the data lines of a table, 1-based.
pub(crate) fn table_lines(source: &str) -> impl Iterator<Item = (usize, &str)> {
    source
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

/// The part of `id` before the first `separator`.
fn before(id: &str, separator: char) -> &str {
    id.split_once(separator).map_or(id, |(head, _)| head)
}

#[cfg(test)]
mod tests {
    use phylosvg_core::element::Element;

    use super::*;

    const COLORS: &str = "\
# R\tG\tB\tTaxon
255\t0\t0\tProteobacteria
0\t0\t255\tBacteria

0\t128\t0\tViruses
128\t128\t128\tUnknown
";

    fn document(labels: &[(&str, &str)]) -> Document {
        let mut document = Document::new();
        for (id, text) in labels {
            let element = Element::new("text")
                .with_attribute("id", *id)
                .with_attribute("x", "0")
                .with_attribute("y", "0")
                .with_attribute("style", "fill:#000000;stroke:#000000;stroke-width:0.5")
                .with_content(*text);
            document.push_element(ElementKind::Text, *id, element).unwrap();
        }
        document
    }

    fn fill(document: &Document, id: &str) -> Option<String> {
        document
            .element(id)
            .and_then(|element| element.style_property("fill"))
            .map(str::to_string)
    }

    #[test]
    fn test_parse_colors() {
        let colors = TaxonomyColors::parse(COLORS).unwrap();
        assert_eq!(colors.len(), 4);
        assert_eq!(colors.get("Proteobacteria"), Some(Color::from_rgb(255, 0, 0)));
        let order: Vec<_> = colors.iter().map(|(taxon, _)| taxon).collect();
        assert_eq!(order, vec!["Proteobacteria", "Bacteria", "Viruses", "Unknown"]);
    }

    #[test]
    fn test_parse_colors_rejects_bad_lines() {
        let err = TaxonomyColors::parse("255\t0\t0\n").unwrap_err();
        assert!(matches!(err, PhyloSvgError::Table { line: 1, .. }));

        let err = TaxonomyColors::parse("# header\n256\t0\t0\tX\n").unwrap_err();
        assert!(matches!(err, PhyloSvgError::Table { line: 2, .. }));
    }

    #[test]
    fn test_assignment_keys() {
        let assignment = TaxonomyAssignment::parse(
            "WP_000001.1\tBacteria\tProteobacteria\nW9Y1V1_9EURO\tEukaryota\nCRP_ECOLI\tBacteria\nbroken line\n",
        );
        let lineage = assignment.lookup("WP_000001.1").unwrap();
        assert_eq!(lineage, ["Bacteria", "Proteobacteria"]);
        assert!(assignment.lookup("WP_000001.2").is_some());
        assert!(assignment.lookup("W9Y1V1").is_some());
        assert!(assignment.lookup("CRP").is_none());
        assert!(assignment.lookup("CRP_ECOLI").is_some());
        assert!(assignment.lookup("broken").is_none());
    }

    #[test]
    fn test_lookup_strips_range_dash() {
        let mut assignment = TaxonomyAssignment::new();
        assignment.insert("123456789", vec!["Bacteria".to_string()]);
        assert!(assignment.lookup("123456789-1").is_some());
    }

    #[test]
    fn test_color_rank() {
        let colors = TaxonomyColors::parse(COLORS).unwrap();
        let lineage = |ranks: &[&str]| ranks.iter().map(|rank| rank.to_string()).collect::<Vec<_>>();

        assert_eq!(color_rank(&lineage(&["Bacteria", "Proteobacteria"]), &colors), Some("Proteobacteria"));
        assert_eq!(color_rank(&lineage(&["Bacteria", "Firmicutes"]), &colors), Some("Bacteria"));
        assert_eq!(color_rank(&lineage(&["Viruses", "Proteobacteria"]), &colors), Some("Viruses"));
        assert_eq!(color_rank(&lineage(&["Archaea"]), &colors), Some("Archaea"));
        assert_eq!(color_rank(&[], &colors), None);
    }

    #[test]
    fn test_recolor_labels() {
        let colors = TaxonomyColors::parse(COLORS).unwrap();
        let assignment = TaxonomyAssignment::parse(
            "WP_000001.1\tBacteria\tProteobacteria\nWP_000002.1\tArchaea\tEuryarchaeota\n",
        );
        let mut document = document(&[
            ("t1", " WP_000001.1 Escherichia coli"),
            ("t2", "WP_000002.1"),
            ("t3", "XP_999999.1 Unassigned"),
            ("t4", "87"),
            ("t5", "Proteobacteria"),
            ("t6", "Tree_scale: 0.1"),
        ]);

        let summary = recolor_labels(&mut document, &colors, &assignment, RecolorOptions::new());
        assert_eq!(summary.recolored(), 1);
        assert_eq!(summary.missing_color(), 1);
        assert_eq!(summary.defaulted(), 1);
        assert_eq!(summary.emphasized(), 0);

        assert_eq!(fill(&document, "t1").as_deref(), Some("#ff0000"));
        assert_eq!(fill(&document, "t2").as_deref(), Some("#000000"));
        assert_eq!(fill(&document, "t3").as_deref(), Some("#808080"));
        assert_eq!(fill(&document, "t4").as_deref(), Some("#000000"));
        assert_eq!(fill(&document, "t5").as_deref(), Some("#000000"));
        assert_eq!(fill(&document, "t6").as_deref(), Some("#000000"));

        for id in ["t1", "t4", "t6"] {
            let element = document.element(id).unwrap();
            assert_eq!(element.style_property("stroke"), None);
            assert_eq!(element.style_property("stroke-width"), Some("0.5"));
        }
    }

    fn font<'a>(document: &'a Document, id: &str) -> (Option<&'a str>, Option<&'a str>, Option<&'a str>) {
        let element = document.element(id).unwrap();
        (
            element.style_property("font-family"),
            element.style_property("font-size"),
            element.style_property("font-weight"),
        )
    }

    #[test]
    fn test_swissprot_and_pdb_id_shapes() {
        assert!(is_swissprot_name("CRP_ECOLI"));
        assert!(is_swissprot_name("CRP_ECOLI-12-200"));
        assert!(!is_swissprot_name("WP_000001.1"));
        assert!(!is_swissprot_name("123_ECOLI"));
        assert!(!is_swissprot_name("W9Y1V1_9EURO"));
        assert!(!is_swissprot_name("Crp_ecoli"));

        assert!(is_pdb_chain("2cgp_A"));
        assert!(is_pdb_chain("2CGP_B_x"));
        assert!(!is_pdb_chain("2cgp_AB"));
        assert!(!is_pdb_chain("WP_000001.1"));
        assert!(!is_pdb_chain("2cgp"));
    }

    #[test]
    fn test_uniprot_fonts() {
        let colors = TaxonomyColors::parse(COLORS).unwrap();
        let assignment = TaxonomyAssignment::parse(
            "CRP_ECOLI\tBacteria\tProteobacteria\nWP_000001.1\tBacteria\tProteobacteria\n",
        );
        let labels = [("t1", "CRP_ECOLI|Escherichia coli"), ("t2", "WP_000001.1|Escherichia coli")];

        let mut plain = document(&labels);
        recolor_labels(&mut plain, &colors, &assignment, RecolorOptions::new());
        assert_eq!(font(&plain, "t1"), (None, None, None));

        let mut marked = document(&labels);
        let options = RecolorOptions::new().with_uniprot_fonts(true);
        let summary = recolor_labels(&mut marked, &colors, &assignment, options);
        assert_eq!(summary.recolored(), 2);
        assert_eq!(summary.emphasized(), 1);
        assert_eq!(font(&marked, "t1"), (Some("Arial"), Some("10px"), Some("bold")));
        assert_eq!(font(&marked, "t2"), (None, None, None));
    }

    #[test]
    fn test_unassigned_pdb_chain_is_bold() {
        let colors = TaxonomyColors::parse(COLORS).unwrap();
        let assignment = TaxonomyAssignment::new();
        let labels = [("t1", "2cgp_A|Escherichia coli"), ("t2", "XP_999999.1 Unassigned")];

        let mut tree = document(&labels);
        let summary = recolor_labels(&mut tree, &colors, &assignment, RecolorOptions::new());
        assert_eq!(summary.defaulted(), 2);
        assert_eq!(summary.emphasized(), 1);
        assert_eq!(fill(&tree, "t1").as_deref(), Some("#808080"));
        assert_eq!(font(&tree, "t1"), (Some("Arial"), Some("12px"), Some("bold")));
        assert_eq!(font(&tree, "t2"), (None, None, None));

        let mut unchanged = document(&labels);
        let options = RecolorOptions::new().with_pdb_fonts(false);
        recolor_labels(&mut unchanged, &colors, &assignment, options);
        assert_eq!(font(&unchanged, "t1"), (None, None, None));
    }

    #[test]
    fn test_mark_bold() {
        let mut document = document(&[
            ("t1", "WP_1.1|COG0001|Escherichia"),
            ("t2", "WP_2.1|COG0002|Escherichia"),
            ("t3", "COG0001 without pipes"),
        ]);
        assert_eq!(mark_bold(&mut document, "COG0001"), 1);
        assert_eq!(
            document.element("t1").unwrap().style_property("font-weight"),
            Some("bold")
        );
        assert_eq!(document.element("t3").unwrap().style_property("font-weight"), None);
    }
}
