//! In-memory model of one tagged graphic primitive.
//!
//! An [`Element`] is a text label, a path or a rect taken from a tree image,
//! together with its attributes, nested child elements and optional text
//! content. Elements are created once by the parser, edited in place by the
//! coloring and annotation passes, and serialized back with
//! [`Element::to_tag_string`].
//!
//! # Attributes
//!
//! Attributes keep their document order. The `style` attribute is special:
//! it is split into a [`Style`] map of CSS-like `key:value` declarations so
//! individual properties (`fill`, `stroke`, `stroke-width`, ...) can be
//! edited without touching the rest of the declaration list.
//!
//! # Serialization
//!
//! ```
//! use phylosvg_core::element::Element;
//!
//! let label = Element::new("text")
//!     .with_attribute("id", "text12")
//!     .with_attribute("style", "font-size:12px;fill:#ff0000")
//!     .with_content(" 14590307 Pyrococcus horikoshii");
//! assert_eq!(
//!     label.to_tag_string(),
//!     r#"<text id="text12" style="font-size:12px;fill:#ff0000"> 14590307 Pyrococcus horikoshii</text>"#
//! );
//!
//! let branch = Element::new("path").with_attribute("id", "path3").with_attribute("d", "M 0,0 5,0");
//! assert_eq!(branch.to_tag_string(), r#"<path id="path3" d="M 0,0 5,0" />"#);
//! ```

use std::{borrow::Cow, fmt, fmt::Write as _};

use indexmap::IndexMap;
use log::warn;

use crate::geometry::Point;

/// The element types the engine extracts from a document.
///
/// Every other tag is opaque and passes through as literal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A `<text>` label: leaf name, support value or technical marker.
    Text,
    /// A `<path>` branch segment.
    Path,
    /// A `<rect>` branch segment or box.
    Rect,
}

impl ElementKind {
    /// Returns the kind for a tag name, or `None` for unsupported tags.
    pub fn from_tag_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Self::Text),
            "path" => Some(Self::Path),
            "rect" => Some(Self::Rect),
            _ => None,
        }
    }

    /// Returns the tag name for this kind.
    pub fn tag_name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Path => "path",
            Self::Rect => "rect",
        }
    }

    /// Returns `true` for kinds that take part in branch graph inference.
    pub fn is_branch(self) -> bool {
        matches!(self, Self::Path | Self::Rect)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_name())
    }
}

/// Parsed value of a `style` attribute.
///
/// Declarations keep their original order. A declaration without a `:`
/// separator is malformed; it is kept verbatim (as a key with no value) so
/// that serialization does not lose it. A trailing `;` is kept as well.
///
/// # Examples
///
/// ```
/// use phylosvg_core::element::Style;
///
/// let mut style = Style::parse("fill:none;stroke:#000000;stroke-width:0.54px");
/// assert_eq!(style.get("stroke"), Some("#000000"));
///
/// style.set("stroke", "#ff0000");
/// assert_eq!(style.to_string(), "fill:none;stroke:#ff0000;stroke-width:0.54px");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    declarations: IndexMap<String, Option<String>>,
    trailing_separator: bool,
}

impl Style {
    /// Parse a `;`-separated declaration list.
    ///
    /// Leading `;` and empty declarations are dropped. A trailing `;` is
    /// remembered and written back. Each declaration is split on its first
    /// `:`.
    pub fn parse(style: &str) -> Self {
        let mut declarations = IndexMap::new();
        for piece in style.trim_matches(';').split(';') {
            if piece.is_empty() {
                continue;
            }
            match piece.split_once(':') {
                Some((key, value)) => {
                    declarations.insert(key.to_string(), Some(value.to_string()));
                }
                None => {
                    declarations.insert(piece.to_string(), None);
                }
            }
        }
        Self {
            trailing_separator: style.ends_with(';'),
            declarations,
        }
    }

    /// Returns the value of a declaration.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.declarations.get(key).and_then(|value| value.as_deref())
    }

    /// Sets a declaration, keeping its position if it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.declarations.insert(key.into(), Some(value.into()));
    }

    /// Removes a declaration, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.declarations.shift_remove(key).flatten()
    }

    /// Returns `true` if the style has no declarations.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Iterates over well-formed `(key, value)` declarations.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|value| (key.as_str(), value)))
    }

    /// Iterates over declarations that had no `:` separator.
    pub fn malformed(&self) -> impl Iterator<Item = &str> {
        self.declarations
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| key.as_str())
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.declarations.iter().enumerate() {
            if index > 0 {
                f.write_char(';')?;
            }
            f.write_str(key)?;
            if let Some(value) = value {
                write!(f, ":{value}")?;
            }
        }
        if self.trailing_separator && !self.declarations.is_empty() {
            f.write_char(';')?;
        }
        Ok(())
    }
}

/// Value of one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// A raw string value, serialized as-is.
    Plain(String),
    /// The parsed `style` attribute.
    Style(Style),
}

impl AttributeValue {
    /// Returns the raw string if this is a plain value.
    pub fn as_plain(&self) -> Option<&str> {
        match self {
            Self::Plain(value) => Some(value),
            Self::Style(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(value) => f.write_str(value),
            Self::Style(style) => fmt::Display::fmt(style, f),
        }
    }
}

/// One parsed tag with attributes, nested children and optional content.
///
/// An element with `Some` content serializes with an open/close tag pair;
/// one with `None` content serializes as a self-closing tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: IndexMap<String, AttributeValue>,
    children: Vec<Element>,
    content: Option<String>,
}

impl Element {
    /// Create an element with the given tag name and nothing else.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            content: None,
        }
    }

    /// Builder form of [`set_attribute`](Self::set_attribute).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder form of [`add_child`](Self::add_child).
    pub fn with_child(mut self, child: Element) -> Self {
        self.add_child(child);
        self
    }

    /// Builder form of [`set_content`](Self::set_content).
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Returns the tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the supported kind of this element, if any.
    pub fn kind(&self) -> Option<ElementKind> {
        ElementKind::from_tag_name(&self.name)
    }

    /// Returns the `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.plain_attribute("id")
    }

    /// Returns an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Iterates over attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns the raw value of a non-style attribute.
    pub fn plain_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(AttributeValue::as_plain)
    }

    /// Returns an attribute parsed as a number.
    pub fn number_attribute(&self, name: &str) -> Option<f64> {
        self.plain_attribute(name)?.trim().parse().ok()
    }

    /// Returns the (`x`, `y`) anchor of the element, if both parse as numbers.
    pub fn anchor(&self) -> Option<Point> {
        Some(Point::new(
            self.number_attribute("x")?,
            self.number_attribute("y")?,
        ))
    }

    /// Sets an attribute.
    ///
    /// A `style` attribute is parsed into a [`Style`] map; every other
    /// attribute is stored as a plain string. An existing attribute keeps
    /// its position.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let value = if name == "style" {
            AttributeValue::Style(Style::parse(&value))
        } else {
            AttributeValue::Plain(value)
        };
        self.attributes.insert(name, value);
    }

    /// Returns the parsed style map.
    pub fn style(&self) -> Option<&Style> {
        match self.attributes.get("style") {
            Some(AttributeValue::Style(style)) => Some(style),
            _ => None,
        }
    }

    /// Returns the parsed style map for editing.
    pub fn style_mut(&mut self) -> Option<&mut Style> {
        match self.attributes.get_mut("style") {
            Some(AttributeValue::Style(style)) => Some(style),
            _ => None,
        }
    }

    /// Returns one style property.
    pub fn style_property(&self, key: &str) -> Option<&str> {
        self.style()?.get(key)
    }

    /// Sets one style property.
    ///
    /// Returns `false`, leaving the element untouched, when the element has
    /// no `style` attribute to edit.
    pub fn set_style_property(&mut self, key: &str, value: impl Into<String>) -> bool {
        if let Some(style) = self.style_mut() {
            style.set(key, value);
            return true;
        }
        warn!(
            element_id = self.id().unwrap_or_default(),
            property = key;
            "Cannot set style property, element has no style attribute"
        );
        false
    }

    /// Removes one style property, returning its value.
    pub fn remove_style_property(&mut self, key: &str) -> Option<String> {
        self.style_mut()?.remove(key)
    }

    /// Returns the nested child elements.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Appends a nested child element.
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Returns the text content, `None` for self-closing elements.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Replaces the text content.
    pub fn set_content(&mut self, content: Option<String>) {
        self.content = content;
    }

    /// Returns the text a reader sees for this element.
    ///
    /// This is the element's own content when it has any non-blank text,
    /// otherwise the first nested child that has some (labels written as
    /// `<text><tspan>name</tspan></text>`), otherwise the empty string.
    pub fn label_text(&self) -> &str {
        match self.content.as_deref() {
            Some(content) if !content.trim().is_empty() => content,
            _ => self
                .children
                .iter()
                .map(Element::label_text)
                .find(|text| !text.trim().is_empty())
                .unwrap_or_default(),
        }
    }

    /// Serialize the element back to a single-line tag.
    ///
    /// Attributes are written in their current order, the style map is
    /// re-joined with `:` and `;`, children come before the content text,
    /// and content passes through [`normalize_pipe_label`].
    ///
    /// A style keeps its declarations and a trailing `;`. Empty
    /// declarations (`;;`) and a leading `;` are not written back.
    pub fn to_tag_string(&self) -> String {
        let mut tag = String::new();
        // Writing to a String cannot fail.
        let _ = self.write_tag(&mut tag);
        tag
    }

    fn write_tag(&self, out: &mut String) -> fmt::Result {
        write!(out, "<{}", self.name)?;
        for (key, value) in &self.attributes {
            write!(out, " {key}=\"{value}\"")?;
        }
        match &self.content {
            Some(content) => {
                out.push('>');
                for child in &self.children {
                    child.write_tag(out)?;
                }
                out.push_str(&normalize_pipe_label(content));
                write!(out, "</{}>", self.name)
            }
            None => {
                out.push_str(" />");
                Ok(())
            }
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_tag_string())
    }
}

/// Identifier fix-up applied to label content containing a `|`.
///
/// Labels such as `XP 002951836.1|Volvox carteri` carry a sequence
/// identifier before the first pipe whose internal spaces were introduced
/// by the tree renderer. The part before the first `|` is trimmed, its
/// spaces become underscores, and a single leading space is restored.
/// Content without a pipe is returned unchanged. The rule is idempotent.
///
/// # Examples
///
/// ```
/// use phylosvg_core::element::normalize_pipe_label;
///
/// assert_eq!(
///     normalize_pipe_label("XP 002951836.1 |Volvox carteri"),
///     " XP_002951836.1|Volvox carteri"
/// );
/// assert_eq!(normalize_pipe_label(" 14590307 Pyrococcus"), " 14590307 Pyrococcus");
/// ```
pub fn normalize_pipe_label(content: &str) -> Cow<'_, str> {
    match content.split_once('|') {
        Some((head, tail)) => Cow::Owned(format!(" {}|{tail}", head.trim().replace(' ', "_"))),
        None => Cow::Borrowed(content),
    }
}
