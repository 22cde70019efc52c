//! Linear reconstruction of a tree image.
//!
//! A [`Document`] is the token stream produced by the parser plus the table
//! of extracted elements. Literal tokens hold input lines that the engine
//! does not understand; element references are resolved against the table
//! when the document is rendered, so edits made to an element in the table
//! show up at the element's original position.

use indexmap::IndexMap;

use crate::{
    element::{Element, ElementKind},
    label::LabelInfo,
};

/// One unit of the document's reconstruction order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Unmodified input text, including its line terminator.
    Literal(String),
    /// Placeholder for an element in the element table.
    ElementRef {
        kind: ElementKind,
        id: String,
        line_end: LineEnding,
    },
}

/// Terminator of the input line an element ended on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
    /// Last line of an input without a trailing newline.
    None,
}

impl LineEnding {
    /// Returns the terminator of `line`.
    ///
    /// # Examples
    ///
    /// ```
    /// use phylosvg_core::document::LineEnding;
    ///
    /// assert_eq!(LineEnding::of_line("<svg>\r\n"), LineEnding::CrLf);
    /// assert_eq!(LineEnding::of_line("<svg>\n"), LineEnding::Lf);
    /// assert_eq!(LineEnding::of_line("</svg>"), LineEnding::None);
    /// ```
    pub fn of_line(line: &str) -> Self {
        if line.ends_with("\r\n") {
            Self::CrLf
        } else if line.ends_with('\n') {
            Self::Lf
        } else {
            Self::None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::None => "",
        }
    }

    /// The terminator for a line inserted before this one.
    pub fn line_break(self) -> &'static str {
        match self {
            Self::None => "\n",
            other => other.as_str(),
        }
    }
}

/// Token stream and element table of one parsed tree image.
///
/// The document owns both. Elements are looked up by id and never
/// duplicated; the table iterates in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    tokens: Vec<Token>,
    elements: IndexMap<String, Element>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append literal text to the token stream.
    ///
    /// Consecutive literals are not merged; each call becomes one token.
    pub fn push_literal(&mut self, text: impl Into<String>) {
        self.tokens.push(Token::Literal(text.into()));
    }

    /// Append an element reference ending its line with `\n` and store the
    /// element in the table.
    ///
    /// The element is handed back as `Err` when its id is already taken, so
    /// the caller can decide what to do with it.
    pub fn push_element(
        &mut self,
        kind: ElementKind,
        id: impl Into<String>,
        element: Element,
    ) -> Result<(), Element> {
        self.push_element_with_line_end(kind, id, element, LineEnding::Lf)
    }

    /// Like [`push_element`](Self::push_element), keeping the terminator of
    /// the input line the element ended on.
    pub fn push_element_with_line_end(
        &mut self,
        kind: ElementKind,
        id: impl Into<String>,
        element: Element,
        line_end: LineEnding,
    ) -> Result<(), Element> {
        let id = id.into();
        if self.elements.contains_key(&id) {
            return Err(element);
        }
        self.tokens.push(Token::ElementRef {
            kind,
            id: id.clone(),
            line_end,
        });
        self.elements.insert(id, element);
        Ok(())
    }

    /// Returns the token stream.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns `true` if an element with this id exists.
    pub fn contains_element(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    /// Returns the element with the given id.
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Returns the element with the given id for editing.
    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    /// Iterates over `(id, element)` pairs in document order.
    pub fn elements(&self) -> impl Iterator<Item = (&str, &Element)> {
        self.elements.iter().map(|(id, element)| (id.as_str(), element))
    }

    /// Iterates over `(id, element)` pairs in document order for editing.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = (&str, &mut Element)> {
        self.elements
            .iter_mut()
            .map(|(id, element)| (id.as_str(), element))
    }

    /// Returns the number of extracted elements.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Iterates over the `text` elements in document order.
    pub fn text_elements(&self) -> impl Iterator<Item = (&str, &Element)> {
        self.elements()
            .filter(|(_, element)| element.kind() == Some(ElementKind::Text))
    }

    /// Iterates over the `path` and `rect` elements in document order.
    pub fn branch_elements(&self) -> impl Iterator<Item = (&str, &Element)> {
        self.elements()
            .filter(|(_, element)| element.kind().is_some_and(ElementKind::is_branch))
    }

    /// Computes the label view of every positioned text element.
    pub fn labels(&self) -> Vec<LabelInfo> {
        self.text_elements()
            .filter_map(|(_, element)| LabelInfo::from_element(element))
            .collect()
    }
}
