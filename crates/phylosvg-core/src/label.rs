//! Label semantics.
//!
//! Text elements in a rendered tree are leaf names, numeric support values
//! on internal nodes, or technical markers left behind by the rendering tool
//! (the `Tree_scale` caption). This module classifies them and extracts the
//! sequence identifier a leaf label stands for.
//!
//! # Identifier conventions
//!
//! Leaf labels have accumulated several naming conventions:
//!
//! | Label content | Identifier |
//! |---------------|------------|
//! | `14590307 Pyrococcus horikoshii` | `14590307_Pyrococcus_horikoshii` |
//! | `123456789\|Escherichia coli` | `123456789` |
//! | `YP_000001.1 1-150` | `YP_000001.1` (or `YP_000001.1_1-150` with the range kept) |
//! | `WP 1.1\|Vibrio\|x` with the pipe format preserved | `WP_1.1\\\|Vibrio` |

use std::sync::OnceLock;

use regex::Regex;

use crate::{element::Element, geometry::Point};

/// Substring that marks a label as technical rather than a leaf name.
pub const TECHNICAL_MARKER: &str = "Tree_scale";

/// Classification of a text label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    /// Candidate leaf name.
    Leaf,
    /// Bootstrap or confidence value in `[0, 100]`.
    SupportValue,
    /// Caption or scale marker produced by the rendering tool.
    Technical,
}

fn re_numeric_annotation() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| {
        Regex::new(r"^(?:[0-9]+[.,][0-9]+|[0-9]+$)").expect("numeric annotation regex is valid")
    })
}

fn re_range_suffix() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| Regex::new(r"^[0-9]+-[0-9]+$").expect("range suffix regex is valid"))
}

/// Returns the support value of a label, if its trimmed text is an integer
/// in `[0, 100]`.
///
/// # Examples
///
/// ```
/// use phylosvg_core::label::support_value;
///
/// assert_eq!(support_value(" 87"), Some(87));
/// assert_eq!(support_value("100"), Some(100));
/// assert_eq!(support_value("101"), None);
/// assert_eq!(support_value("0.87"), None);
/// ```
pub fn support_value(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    text.parse::<u32>().ok().filter(|value| *value <= 100)
}

/// Classify label text.
///
/// Support values take precedence, then technical markers; everything else
/// is a leaf candidate.
pub fn classify_text(text: &str) -> LabelKind {
    if support_value(text).is_some() {
        LabelKind::SupportValue
    } else if text.contains(TECHNICAL_MARKER) {
        LabelKind::Technical
    } else {
        LabelKind::Leaf
    }
}

/// Classify a text element by its [`label_text`](Element::label_text).
pub fn classify(element: &Element) -> LabelKind {
    classify_text(element.label_text())
}

/// Returns `true` unless the label text starts like a numeric annotation
/// (`0.95`, `0,95`) or is a plain integer.
pub fn is_leaf_text(text: &str) -> bool {
    !re_numeric_annotation().is_match(text.trim())
}

/// Element form of [`is_leaf_text`].
pub fn is_leaf(element: &Element) -> bool {
    is_leaf_text(element.label_text())
}

/// Extract the sequence identifier from label text.
///
/// - With a `|` in the text, only the first field is used, unless
///   `preserve_pipe_format` is set and there are exactly three fields: then
///   the first two are joined with an escaped pipe (`\|`, ready for regular
///   expression search) and spaces become underscores.
/// - A trailing space-separated `start-end` token is a sequence range. It is
///   dropped, or appended with an underscore when `keep_range_suffix` is set.
/// - The remaining space-separated tokens are joined with underscores.
///
/// # Examples
///
/// ```
/// use phylosvg_core::label::sequence_id_from_text;
///
/// assert_eq!(sequence_id_from_text("123456789|Escherichia coli", false, false), "123456789");
/// assert_eq!(sequence_id_from_text("YP_000001.1 1-150", false, true), "YP_000001.1_1-150");
/// assert_eq!(sequence_id_from_text("YP_000001.1 1-150", false, false), "YP_000001.1");
/// assert_eq!(sequence_id_from_text("WP 1.1|Vibrio|x", true, false), r"WP_1.1\|Vibrio");
/// ```
pub fn sequence_id_from_text(text: &str, preserve_pipe_format: bool, keep_range_suffix: bool) -> String {
    let trimmed = text.trim();

    if preserve_pipe_format && trimmed.matches('|').count() == 2 {
        if let Some((head, _)) = trimmed.rsplit_once('|') {
            return head.replace('|', r"\|").replace(' ', "_");
        }
    }

    let head = trimmed.split('|').next().unwrap_or_default();
    let mut fields: Vec<&str> = head.split(' ').collect();

    let range = match fields.last() {
        Some(last) if re_range_suffix().is_match(last) => fields.pop(),
        _ => None,
    };

    let mut id = fields.join("_");
    if let (true, Some(range)) = (keep_range_suffix, range) {
        id.push('_');
        id.push_str(range);
    }
    id
}

/// Element form of [`sequence_id_from_text`].
pub fn extract_sequence_id(element: &Element, preserve_pipe_format: bool, keep_range_suffix: bool) -> String {
    sequence_id_from_text(element.label_text(), preserve_pipe_format, keep_range_suffix)
}

/// A derived view of one positioned text label.
///
/// Computed on demand from a text [`Element`]; never stored in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelInfo {
    element_id: String,
    position: Point,
    color: Option<String>,
    text: String,
    kind: LabelKind,
    is_leaf: bool,
}

impl LabelInfo {
    /// Build the label view of an element.
    ///
    /// Returns `None` for elements that are not `text`, lack an `id`, or
    /// whose `x`/`y` attributes are not numbers.
    pub fn from_element(element: &Element) -> Option<Self> {
        if element.name() != "text" {
            return None;
        }
        let text = element.label_text();
        Some(Self {
            element_id: element.id()?.to_string(),
            position: element.anchor()?,
            color: element.style_property("fill").map(str::to_string),
            text: text.to_string(),
            kind: classify_text(text),
            is_leaf: is_leaf_text(text),
        })
    }

    /// Returns the id of the underlying text element.
    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    /// Returns the anchor coordinate.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Returns the foreground (`fill`) color.
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Returns the label text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the label classification.
    pub fn kind(&self) -> LabelKind {
        self.kind
    }

    /// Returns `true` if the text does not look like a numeric annotation.
    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    /// Extract the sequence identifier of this label.
    pub fn sequence_id(&self, preserve_pipe_format: bool, keep_range_suffix: bool) -> String {
        sequence_id_from_text(&self.text, preserve_pipe_format, keep_range_suffix)
    }
}
