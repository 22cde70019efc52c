//! Token-by-token rewriting of a parsed tree document.
//!
//! Literal tokens are copied verbatim. Element references are resolved
//! against the document's element table and written as one tag per line,
//! ended with the terminator of the line they were read from. A document
//! whose elements were already single-line tags without indentation comes
//! back unchanged, `\r\n` line endings included.

use log::{info, warn};

use phylosvg_core::{
    document::{Document, LineEnding, Token},
    element::{Element, ElementKind},
    geometry::Point,
    label::{self, LabelKind},
};

use crate::{
    config::{GroupMarkerConfig, SupportConfig, SupportMode},
    error::PhyloSvgError,
    groups::{GroupAssignment, GroupColors},
};

/// Group tables and marker geometry used to draw group markers.
#[derive(Debug, Clone)]
struct GroupMarkers<'a> {
    assignment: &'a GroupAssignment,
    colors: &'a GroupColors,
    geometry: GroupMarkerConfig,
}

/// Options controlling [`render`].
///
/// The default options write every element unchanged.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions<'a> {
    no_names: bool,
    support: SupportConfig,
    groups: Option<GroupMarkers<'a>>,
}

impl<'a> RenderOptions<'a> {
    /// Create options that change nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Omit leaf name labels.
    pub fn with_no_names(mut self, no_names: bool) -> Self {
        self.no_names = no_names;
        self
    }

    /// Set how support labels are written.
    pub fn with_support(mut self, support: SupportConfig) -> Self {
        self.support = support;
        self
    }

    /// Draw group markers in front of labels whose sequence has a group.
    pub fn with_groups(
        mut self,
        assignment: &'a GroupAssignment,
        colors: &'a GroupColors,
        geometry: GroupMarkerConfig,
    ) -> Self {
        self.groups = Some(GroupMarkers {
            assignment,
            colors,
            geometry,
        });
        self
    }
}

/// Rewrite a document.
///
/// - Leaf labels are dropped when `no_names` is set; support values and
///   other numeric labels are kept.
/// - Support labels are kept, dropped or replaced by a circle at the same
///   position in the token stream, depending on the [`SupportMode`].
/// - A label whose sequence has groups is preceded by one marker rectangle
///   per group and shifted right to make room for them. Markers are written
///   even when the label itself is dropped.
///
/// # Errors
///
/// Returns [`PhyloSvgError::UnknownElement`] for a token that names an
/// element missing from the table, and
/// [`PhyloSvgError::MissingGroupColor`] for a group without a color.
pub fn render(document: &Document, options: &RenderOptions<'_>) -> Result<String, PhyloSvgError> {
    let mut renderer = Renderer::new(options);
    for token in document.tokens() {
        match token {
            Token::Literal(text) => renderer.out.push_str(text),
            Token::ElementRef { kind, id, line_end } => {
                let element = document
                    .element(id)
                    .ok_or_else(|| PhyloSvgError::UnknownElement { id: id.clone() })?;
                renderer.line_end = *line_end;
                match kind {
                    ElementKind::Text => renderer.label(element)?,
                    ElementKind::Path | ElementKind::Rect => renderer.write_element(element),
                }
            }
        }
    }

    info!(
        bytes = renderer.out.len(),
        group_markers = renderer.markers,
        support_circles = renderer.circles;
        "Document rendered"
    );
    Ok(renderer.out)
}

struct Renderer<'o, 'a> {
    options: &'o RenderOptions<'a>,
    out: String,
    /// Terminator of the element being written.
    line_end: LineEnding,
    /// Labels that received group markers so far.
    markers: usize,
    circles: usize,
}

impl<'o, 'a> Renderer<'o, 'a> {
    fn new(options: &'o RenderOptions<'a>) -> Self {
        Self {
            options,
            out: String::new(),
            line_end: LineEnding::Lf,
            markers: 0,
            circles: 0,
        }
    }

    fn write_element(&mut self, element: &Element) {
        self.out.push_str(&element.to_tag_string());
        self.out.push_str(self.line_end.as_str());
    }

    /// Writes an element inserted before the current one.
    fn insert_element(&mut self, element: &Element) {
        self.out.push_str(&element.to_tag_string());
        self.out.push_str(self.line_end.line_break());
    }

    fn label(&mut self, element: &Element) -> Result<(), PhyloSvgError> {
        let options = self.options;
        let shifted = match &options.groups {
            Some(groups) => self.group_markers(element, groups)?,
            None => None,
        };
        let element = shifted.as_ref().unwrap_or(element);

        if label::classify(element) == LabelKind::SupportValue {
            match options.support.mode() {
                SupportMode::Keep => self.write_element(element),
                SupportMode::Remove => {}
                SupportMode::Circles => self.support_circle(element),
            }
            return Ok(());
        }

        if !(options.no_names && label::is_leaf(element)) {
            self.write_element(element);
        }
        Ok(())
    }

    /// Writes the markers of a grouped label and returns the label moved to
    /// the right of them.
    fn group_markers(
        &mut self,
        element: &Element,
        groups: &GroupMarkers<'_>,
    ) -> Result<Option<Element>, PhyloSvgError> {
        let sequence_id = label::extract_sequence_id(element, false, false);
        let Some(names) = groups.assignment.groups_of(&sequence_id) else {
            return Ok(None);
        };
        let Some(anchor) = element.anchor() else {
            warn!(element_id = element.id().unwrap_or_default(), sequence_id; "Grouped label has no position, skipping markers");
            return Ok(None);
        };

        self.markers += 1;
        let geometry = &groups.geometry;
        let width = geometry.marker_width();
        for (position, name) in names.iter().enumerate() {
            let color =
                groups
                    .colors
                    .get(name)
                    .ok_or_else(|| PhyloSvgError::MissingGroupColor {
                        group: name.clone(),
                        sequence_id: sequence_id.clone(),
                    })?;
            let height = if position == 0 {
                geometry.first_marker_height()
            } else {
                geometry.marker_height()
            };
            let origin = Point::new(
                anchor.x() + width + width * position as f64,
                anchor.y() - height,
            );
            let marker = Element::new("rect")
                .with_attribute("style", format!("fill:{color};opacity:1.0"))
                .with_attribute("id", format!("group_marker{}_{position}", self.markers))
                .with_attribute("width", width.to_string())
                .with_attribute("height", height.to_string())
                .with_attribute("x", origin.x().to_string())
                .with_attribute("y", origin.y().to_string());
            self.insert_element(&marker);
        }

        let mut shifted = element.clone();
        let x = anchor.x() + (names.len() + 1) as f64 * width;
        shifted.set_attribute("x", x.to_string());
        Ok(Some(shifted))
    }

    fn support_circle(&mut self, element: &Element) {
        let options = self.options;
        let support = &options.support;
        let Some(value) = label::support_value(element.label_text()) else {
            return;
        };
        if value < support.poor() {
            return;
        }
        let Some(anchor) = element.anchor() else {
            warn!(element_id = element.id().unwrap_or_default(); "Support label has no position, keeping it");
            self.write_element(element);
            return;
        };

        self.circles += 1;
        let fill = if value > support.good() {
            "#000000"
        } else {
            "#ffffff"
        };
        let size = support.circle_size();
        let circle = Element::new("circle")
            .with_attribute("r", size.to_string())
            .with_attribute("cx", (anchor.x() + size).to_string())
            .with_attribute("cy", (anchor.y() - size).to_string())
            .with_attribute(
                "style",
                format!("fill:{fill};fill-opacity:1;stroke:#000000;stroke-width:1"),
            )
            .with_attribute("id", format!("support_circle{}", self.circles));
        self.write_element(&circle);
    }
}
