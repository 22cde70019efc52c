//! Line-oriented document parser.
//!
//! The parser walks the input one line at a time. Lines holding a complete
//! `text` or `path` element become element references; a bare `<text`,
//! `<path` or `<rect` line opens an accumulation buffer that collects lines
//! until one of them closes the element. Every other line is kept verbatim
//! as a literal token, so tags the engine does not edit pass through
//! untouched.

use std::collections::HashMap;

use log::{debug, info};

use phylosvg_core::{
    document::{Document, LineEnding},
    element::ElementKind,
};

use crate::{
    element_parser::parse_element_in,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
};

const CLOSING_MARKERS: [&str; 4] = ["</text>", "</path>", "</rect>", "/>"];

/// A parsed document together with the warnings found while parsing it.
#[derive(Debug)]
pub struct ParsedDocument {
    document: Document,
    warnings: Vec<Diagnostic>,
}

impl ParsedDocument {
    /// Returns the parsed document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Returns the recoverable problems found while parsing.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Splits into the document and the warnings.
    pub fn into_parts(self) -> (Document, Vec<Diagnostic>) {
        (self.document, self.warnings)
    }
}

/// Parse a tree image into a token stream and element table.
///
/// # Errors
///
/// Returns a [`ParseError`] holding every diagnostic of the parse when at
/// least one supported element has no `id` ([`ErrorCode::E001`]). All other
/// problems are warnings returned with the document:
///
/// - [`ErrorCode::E002`]: duplicate id; the later element is kept as literal text
/// - [`ErrorCode::E003`]: element still open at the end of the input
/// - [`ErrorCode::E004`]: element opener while another element is open
/// - [`ErrorCode::E005`]: malformed `style` declaration
/// - [`ErrorCode::E006`]: nested tag without closing tag
///
/// # Examples
///
/// ```
/// use phylosvg_core::document::Token;
/// use phylosvg_parser::parse;
///
/// let source = "<svg>\n<text\n id=\"text1\"\n x=\"5\" y=\"6\">Leaf</text>\n</svg>\n";
/// let parsed = parse(source).unwrap();
///
/// let tokens = parsed.document().tokens();
/// assert_eq!(tokens.len(), 3);
/// assert!(matches!(&tokens[1], Token::ElementRef { id, .. } if id == "text1"));
/// assert!(parsed.warnings().is_empty());
/// ```
pub fn parse(source: &str) -> Result<ParsedDocument, ParseError> {
    info!(bytes = source.len(); "Parsing document");

    let mut parser = DocumentParser::default();
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        parser.line(line, offset);
        offset += line.len();
    }
    parser.finish()
}

/// An element whose lines are still being collected.
#[derive(Debug)]
struct OpenElement<'a> {
    kind: ElementKind,
    lines: Vec<&'a str>,
    span: Span,
}

impl<'a> OpenElement<'a> {
    fn new(kind: ElementKind, line: &'a str, offset: usize) -> Self {
        Self {
            kind,
            lines: vec![line],
            span: line_span(line, offset),
        }
    }

    fn push(&mut self, line: &'a str, offset: usize) {
        self.lines.push(line);
        self.span = self.span.union(line_span(line, offset));
    }

    /// The tag span: trimmed lines joined with single spaces.
    fn joined(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Default)]
struct DocumentParser<'a> {
    document: Document,
    collector: DiagnosticCollector,
    open: Option<OpenElement<'a>>,
    defined: HashMap<String, Span>,
}

impl<'a> DocumentParser<'a> {
    fn line(&mut self, line: &'a str, offset: usize) {
        let trimmed = line.trim();

        if let Some(mut open) = self.open.take() {
            if let Some(kind) = bare_opener(trimmed) {
                self.abandon(open, line_span(line, offset));
                self.open = Some(OpenElement::new(kind, line, offset));
                return;
            }
            open.push(line, offset);
            if closes_element(trimmed) {
                let text = open.joined();
                self.add_element(open.kind, &text, open.span, &open.lines);
            } else {
                self.open = Some(open);
            }
            return;
        }

        if let Some(kind) = single_line_kind(trimmed) {
            self.add_element(kind, trimmed, line_span(line, offset), &[line]);
        } else if let Some(kind) = bare_opener(trimmed) {
            self.open = Some(OpenElement::new(kind, line, offset));
        } else {
            self.document.push_literal(line);
        }
    }

    fn add_element(&mut self, kind: ElementKind, text: &str, span: Span, lines: &[&'a str]) {
        let element = match parse_element_in(text, span, &mut self.collector) {
            Ok(element) => element,
            Err(diagnostic) => {
                self.collector.emit(diagnostic);
                self.push_literals(lines);
                return;
            }
        };

        let id = element.id().unwrap_or_default().to_string();
        let line_end = lines
            .last()
            .map_or(LineEnding::None, |line| LineEnding::of_line(line));
        match self
            .document
            .push_element_with_line_end(kind, id.clone(), element, line_end)
        {
            Ok(()) => {
                self.defined.insert(id, span);
            }
            Err(_) => {
                let mut diagnostic =
                    Diagnostic::warning(format!("element id `{id}` is used more than once"))
                        .with_code(ErrorCode::E002)
                        .with_label(span, "duplicate element")
                        .with_help("the duplicate is kept as literal text and will not be edited");
                if let Some(first) = self.defined.get(&id) {
                    diagnostic = diagnostic.with_secondary_label(*first, "first defined here");
                }
                self.collector.emit(diagnostic);
                self.push_literals(lines);
            }
        }
    }

    fn abandon(&mut self, open: OpenElement<'a>, opener: Span) {
        self.collector.emit(
            Diagnostic::warning(format!(
                "`{}` element was not closed before the next element started",
                open.kind
            ))
            .with_code(ErrorCode::E004)
            .with_label(open.span, "abandoned element")
            .with_secondary_label(opener, "next element starts here")
            .with_help("the abandoned lines are kept as literal text"),
        );
        self.push_literals(&open.lines);
    }

    fn push_literals(&mut self, lines: &[&str]) {
        for line in lines {
            self.document.push_literal(*line);
        }
    }

    fn finish(mut self) -> Result<ParsedDocument, ParseError> {
        if let Some(open) = self.open.take() {
            self.collector.emit(
                Diagnostic::warning(format!("`{}` element is never closed", open.kind))
                    .with_code(ErrorCode::E003)
                    .with_label(open.span, "unterminated element")
                    .with_help("the buffered lines are kept as literal text"),
            );
            self.push_literals(&open.lines);
        }

        let warnings = self.collector.finish()?;
        debug!(
            elements = self.document.element_count(),
            tokens = self.document.tokens().len(),
            warnings = warnings.len();
            "Document parsed"
        );
        Ok(ParsedDocument {
            document: self.document,
            warnings,
        })
    }
}

/// Span of a line without its line terminator.
fn line_span(line: &str, offset: usize) -> Span {
    Span::new(offset..offset + line.trim_end_matches(['\n', '\r']).len())
}

fn bare_opener(trimmed: &str) -> Option<ElementKind> {
    match trimmed {
        "<text" => Some(ElementKind::Text),
        "<path" => Some(ElementKind::Path),
        "<rect" => Some(ElementKind::Rect),
        _ => None,
    }
}

/// Kind of a complete element written on one line.
fn single_line_kind(trimmed: &str) -> Option<ElementKind> {
    match trimmed.split(' ').next() {
        Some("<text") if trimmed.ends_with("</text>") => Some(ElementKind::Text),
        Some("<path") if trimmed.ends_with("/>") => Some(ElementKind::Path),
        _ => None,
    }
}

fn closes_element(trimmed: &str) -> bool {
    CLOSING_MARKERS
        .iter()
        .any(|marker| trimmed.contains(*marker))
}

#[cfg(test)]
mod tests {
    use phylosvg_core::document::Token;

    use super::*;

    fn element_ids(parsed: &ParsedDocument) -> Vec<String> {
        parsed
            .document()
            .tokens()
            .iter()
            .filter_map(|token| match token {
                Token::ElementRef { id, .. } => Some(id.clone()),
                Token::Literal(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_single_line_elements() {
        let source = concat!(
            "<svg>\n",
            "  <path id=\"p1\" d=\"M 0,0 5,0\" />\n",
            "  <text id=\"t1\" x=\"6\" y=\"0\">Leaf</text>\n",
            "</svg>\n",
        );
        let parsed = parse(source).unwrap();
        let document = parsed.document();

        assert_eq!(document.tokens().len(), 4);
        assert_eq!(document.tokens()[0], Token::Literal("<svg>\n".to_string()));
        assert_eq!(
            document.tokens()[1],
            Token::ElementRef {
                kind: ElementKind::Path,
                id: "p1".to_string(),
                line_end: LineEnding::Lf,
            }
        );
        assert_eq!(document.element("t1").unwrap().content(), Some("Leaf"));
        assert!(parsed.warnings().is_empty());
    }

    #[test]
    fn test_multiline_element_is_joined() {
        let source = concat!(
            "<text\n",
            "   id=\"text2993\"\n",
            "   style=\"font-size:12.7px;fill:#ff0000\"\n",
            "   y=\"28.297134\"\n",
            "   x=\"36.190319\"\n",
            "   xml:space=\"preserve\"> 14590307 Pyrococcus horikoshii OT3</text>\n",
        );
        let parsed = parse(source).unwrap();
        let element = parsed.document().element("text2993").unwrap();

        assert_eq!(parsed.document().tokens().len(), 1);
        assert_eq!(element.style_property("fill"), Some("#ff0000"));
        assert_eq!(element.content(), Some(" 14590307 Pyrococcus horikoshii OT3"));
    }

    #[test]
    fn test_multiline_rect() {
        let source = "<rect\n id=\"rect1\"\n x=\"1\" y=\"2\" width=\"3\" height=\"4\" />\n";
        let parsed = parse(source).unwrap();
        assert_eq!(
            parsed.document().tokens(),
            &[Token::ElementRef {
                kind: ElementKind::Rect,
                id: "rect1".to_string(),
                line_end: LineEnding::Lf,
            }]
        );
    }

    #[test]
    fn test_crlf_line_endings_are_recorded() {
        let source = "<svg>\r\n<text id=\"t1\" x=\"5\" y=\"5\">A</text>\r\n<path\r\n id=\"p1\"\r\n d=\"M 0,0 H 5\" />";
        let parsed = parse(source).unwrap();
        let tokens = parsed.document().tokens();

        assert_eq!(tokens[0], Token::Literal("<svg>\r\n".to_string()));
        assert!(matches!(
            &tokens[1],
            Token::ElementRef { id, line_end: LineEnding::CrLf, .. } if id == "t1"
        ));
        assert!(matches!(
            &tokens[2],
            Token::ElementRef { id, line_end: LineEnding::None, .. } if id == "p1"
        ));
        assert_eq!(parsed.document().element("t1").unwrap().content(), Some("A"));
    }

    #[test]
    fn test_other_tags_pass_through() {
        let source = concat!(
            "<g id=\"layer1\">\n",
            "<circle id=\"c1\" r=\"3\" />\n",
            "<rect id=\"r1\" x=\"0\" y=\"0\" width=\"1\" height=\"1\" />\n",
            "</g>\n",
        );
        let parsed = parse(source).unwrap();
        assert_eq!(parsed.document().tokens().len(), 4);
        assert_eq!(parsed.document().element_count(), 0);
    }

    #[test]
    fn test_missing_id_is_fatal() {
        let source = "<svg>\n<text x=\"1\" y=\"1\">Leaf</text>\n<path d=\"M 0,0 1,1\" />\n";
        let err = parse(source).unwrap_err();

        assert_eq!(err.errors().count(), 2);
        let first = err.errors().next().unwrap();
        assert_eq!(first.code(), Some(ErrorCode::E001));
        assert_eq!(first.labels()[0].span(), Span::new(6..35));
    }

    #[test]
    fn test_duplicate_id_is_literal() {
        let source = concat!(
            "<text id=\"t1\" x=\"0\" y=\"0\">A</text>\n",
            "<text id=\"t1\" x=\"0\" y=\"9\">B</text>\n",
        );
        let parsed = parse(source).unwrap();

        assert_eq!(element_ids(&parsed), vec!["t1"]);
        assert_eq!(
            parsed.document().tokens()[1],
            Token::Literal("<text id=\"t1\" x=\"0\" y=\"9\">B</text>\n".to_string())
        );
        assert_eq!(parsed.warnings().len(), 1);
        assert_eq!(parsed.warnings()[0].code(), Some(ErrorCode::E002));
        assert_eq!(parsed.warnings()[0].labels().len(), 2);
    }

    #[test]
    fn test_unterminated_element_is_literal() {
        let source = "<svg>\n<path\n id=\"p1\"\n";
        let parsed = parse(source).unwrap();

        assert_eq!(parsed.document().element_count(), 0);
        assert_eq!(
            parsed.document().tokens(),
            &[
                Token::Literal("<svg>\n".to_string()),
                Token::Literal("<path\n".to_string()),
                Token::Literal(" id=\"p1\"\n".to_string()),
            ]
        );
        assert_eq!(parsed.warnings()[0].code(), Some(ErrorCode::E003));
    }

    #[test]
    fn test_abandoned_element() {
        let source = concat!(
            "<text\n",
            " id=\"t1\"\n",
            "<path\n",
            " id=\"p1\" d=\"M 0,0 1,0\" />\n",
        );
        let parsed = parse(source).unwrap();

        assert_eq!(element_ids(&parsed), vec!["p1"]);
        assert_eq!(parsed.document().tokens().len(), 3);
        assert_eq!(parsed.warnings().len(), 1);
        assert_eq!(parsed.warnings()[0].code(), Some(ErrorCode::E004));
    }

    #[test]
    fn test_warnings_from_element_parser_are_collected() {
        let source = "<path id=\"p1\" style=\"fill:none;oops\" d=\"M 0,0 1,0\" />\n";
        let parsed = parse(source).unwrap();
        assert_eq!(parsed.warnings().len(), 1);
        assert_eq!(parsed.warnings()[0].code(), Some(ErrorCode::E005));
    }

    #[test]
    fn test_stray_closer_is_literal() {
        let parsed = parse("</text>\n").unwrap();
        assert_eq!(
            parsed.document().tokens(),
            &[Token::Literal("</text>\n".to_string())]
        );
    }

    #[test]
    fn test_last_line_without_newline() {
        let parsed = parse("<svg>\n</svg>").unwrap();
        assert_eq!(
            parsed.document().tokens().last(),
            Some(&Token::Literal("</svg>".to_string()))
        );
    }
}
