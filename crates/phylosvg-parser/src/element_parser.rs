//! Parsing of a single tag span into an [`Element`].
//!
//! A tag span is the complete text of one element, possibly joined from
//! several input lines, for example
//! `<text id="text12" x="36.1" y="28.2" style="fill:#ff0000"> Leaf</text>`.
//!
//! Nested tags are located with a first-match search for their closing tag,
//! parsed recursively and cut out of the parent span before the parent's own
//! attributes and content are read.

use std::sync::OnceLock;

use regex::Regex;

use phylosvg_core::element::Element;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, Result},
    span::Span,
};

fn re_nested_opener() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| Regex::new(r"<[A-Za-z]+").expect("nested opener regex is valid"))
}

fn re_attribute() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| {
        Regex::new(r#"([^\s="<>/]+)="([^"]*)""#).expect("attribute regex is valid")
    })
}

/// Parse one tag span into an element.
///
/// The element must carry an `id` attribute. Recoverable problems
/// (malformed style declarations, nested tags without a closer) are logged
/// and otherwise ignored; use the document parser to collect them.
///
/// # Errors
///
/// Returns an [`ErrorCode::E001`] diagnostic when the element has no `id`.
///
/// # Examples
///
/// ```
/// use phylosvg_parser::parse_element;
///
/// let element = parse_element(r#"<text id="t1" x="1" y="2" style="fill:#ff0000"> Leaf</text>"#).unwrap();
/// assert_eq!(element.id(), Some("t1"));
/// assert_eq!(element.content(), Some(" Leaf"));
/// assert_eq!(element.style_property("fill"), Some("#ff0000"));
///
/// assert!(parse_element(r#"<path d="M 0,0 1,1" />"#).is_err());
/// ```
pub fn parse_element(tag_span: &str) -> Result<Element> {
    let mut collector = DiagnosticCollector::new();
    parse_element_in(tag_span, Span::new(0..tag_span.len()), &mut collector)
}

/// Parse one tag span, reporting warnings to `collector`.
///
/// `source_span` locates the element in the original input and is used for
/// every diagnostic label.
pub(crate) fn parse_element_in(
    tag_span: &str,
    source_span: Span,
    collector: &mut DiagnosticCollector,
) -> Result<Element> {
    let element = parse_tag(tag_span, source_span, collector);
    if element.id().is_none() {
        return Err(Diagnostic::error(format!(
            "`{}` element has no `id` attribute",
            element.name()
        ))
        .with_code(ErrorCode::E001)
        .with_label(source_span, "element without id")
        .with_help("every text, path and rect element needs a unique id"));
    }
    Ok(element)
}

fn parse_tag(tag_span: &str, source_span: Span, collector: &mut DiagnosticCollector) -> Element {
    let (remaining, children) = excise_children(tag_span, source_span, collector);

    let name = tag_name(&remaining);
    let mut element = Element::new(name);

    let head_end = opening_tag_end(&remaining);
    for capture in re_attribute().captures_iter(&remaining[..head_end]) {
        element.set_attribute(&capture[1], &capture[2]);
    }

    if let Some(style) = element.style() {
        for declaration in style.malformed() {
            collector.emit(
                Diagnostic::warning(format!(
                    "style declaration `{declaration}` has no `:` separator"
                ))
                .with_code(ErrorCode::E005)
                .with_label(source_span, "in this element")
                .with_help("the declaration is kept verbatim"),
            );
        }
    }

    for child in children {
        element.add_child(child);
    }

    let closer = format!("</{name}>");
    if remaining.contains(&closer) {
        let body = remaining.get(head_end + 1..).unwrap_or_default();
        let content = body.split('<').next().unwrap_or_default();
        element.set_content(Some(content.to_string()));
    }

    element
}

/// Cut nested tags out of `tag_span`, returning the remaining text and the
/// parsed children in document order.
fn excise_children(
    tag_span: &str,
    source_span: Span,
    collector: &mut DiagnosticCollector,
) -> (String, Vec<Element>) {
    let mut remaining = tag_span.to_string();
    let mut children = Vec::new();
    // Skip the element's own opener.
    let mut cursor = 1;

    while cursor < remaining.len() {
        let Some(opener) = re_nested_opener().find_at(&remaining, cursor) else {
            break;
        };
        let start = opener.start();
        let closer = format!("</{}>", &opener.as_str()[1..]);

        match remaining[opener.end()..].find(&closer) {
            Some(offset) => {
                let end = opener.end() + offset + closer.len();
                children.push(parse_tag(&remaining[start..end], source_span, collector));
                remaining.replace_range(start..end, "");
                cursor = start;
            }
            None => {
                collector.emit(
                    Diagnostic::warning(format!(
                        "nested tag `{}` has no matching `{closer}`",
                        opener.as_str()
                    ))
                    .with_code(ErrorCode::E006)
                    .with_label(source_span, "in this element")
                    .with_help("the nested tag is left in place"),
                );
                cursor = opener.end();
            }
        }
    }

    (remaining, children)
}

/// The tag name: the text after `<` up to whitespace, `>` or `/`.
fn tag_name(tag_span: &str) -> &str {
    let rest = tag_span.trim_start().trim_start_matches('<');
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Byte index of the `>` closing the opening tag, ignoring `>` inside
/// quoted attribute values; the span length if there is none.
fn opening_tag_end(tag_span: &str) -> usize {
    let mut in_quotes = false;
    for (index, byte) in tag_span.bytes().enumerate() {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b'>' if !in_quotes => return index,
            _ => {}
        }
    }
    tag_span.len()
}
