//! Integration tests for the TreeImageBuilder API
//!
//! These tests run small rendered trees through parsing, coloring and
//! rewriting the way the command line tool does.

use proptest::prelude::*;

use phylosvg::{
    GroupAssignment, GroupColors, PhyloSvgError, TreeImageBuilder,
    config::{AppConfig, GraphConfig, StyleConfig, SupportConfig, SupportMode},
    label::sequence_id_from_text,
};

/// A root branch splitting into two leaves, labelled at their tips.
fn cherry(fill_a: &str, fill_b: &str) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<svg width=\"100\" height=\"50\">\n",
            "<g id=\"tree\">\n",
            "<path id=\"root\" d=\"M 0,5 10,5\" style=\"fill:none;stroke:#000000\" />\n",
            "<path id=\"leaf_a\" d=\"M 10,5 10,0 20,0\" style=\"fill:none;stroke:#000000\" />\n",
            "<path id=\"leaf_b\" d=\"M 10,5 10,10 20,10\" style=\"fill:none;stroke:#000000\" />\n",
            "<text id=\"t_a\" x=\"21\" y=\"0\" style=\"fill:{}\">Leaf_A</text>\n",
            "<text id=\"t_b\" x=\"21\" y=\"10\" style=\"fill:{}\">Leaf_B</text>\n",
            "</g>\n",
            "</svg>\n",
        ),
        fill_a, fill_b
    )
}

#[test]
fn test_builder_api_exists() {
    let _builder = TreeImageBuilder::default();
}

#[test]
fn test_shared_leaf_color_reaches_root() {
    let builder = TreeImageBuilder::default();
    let (mut document, warnings) = builder
        .parse(&cherry("#ff0000", "#ff0000"))
        .expect("Failed to parse tree")
        .into_parts();
    assert!(warnings.is_empty());

    let graph = builder.color_branches(&mut document);
    assert_eq!(graph.children_of("root"), vec!["leaf_a", "leaf_b"]);
    assert!(graph.warnings().is_empty());

    for id in ["root", "leaf_a", "leaf_b"] {
        let element = document.element(id).unwrap();
        assert_eq!(element.style_property("stroke"), Some("#ff0000"), "{id}");
    }
}

#[test]
fn test_mixed_leaf_colors_stop_at_fork() {
    let builder = TreeImageBuilder::default();
    let (mut document, _) = builder
        .parse(&cherry("#ff0000", "#0000ff"))
        .unwrap()
        .into_parts();

    let graph = builder.color_branches(&mut document);

    assert_eq!(
        document.element("leaf_a").unwrap().style_property("stroke"),
        Some("#ff0000")
    );
    assert_eq!(
        document.element("leaf_b").unwrap().style_property("stroke"),
        Some("#0000ff")
    );
    assert_eq!(
        document.element("root").unwrap().style_property("stroke"),
        Some("#000000")
    );
    assert!(!graph.node("root").unwrap().is_color_resolved());
}

#[test]
fn test_stroke_width_from_config() {
    let config = AppConfig::new(
        GraphConfig::default(),
        SupportConfig::default(),
        Default::default(),
        StyleConfig::new(Some(2.5)),
    );
    let builder = TreeImageBuilder::new(config);
    let (mut document, _) = builder
        .parse(&cherry("#ff0000", "#ff0000"))
        .unwrap()
        .into_parts();

    builder.color_branches(&mut document);

    let svg = builder.render(&document, false, None).unwrap();
    assert_eq!(svg.matches("stroke-width:2.5").count(), 3);
}

#[test]
fn test_unmatched_leaf_is_reported() {
    let builder = TreeImageBuilder::new(AppConfig::new(
        GraphConfig::new(1.5, 0.5),
        SupportConfig::default(),
        Default::default(),
        StyleConfig::default(),
    ));
    let (mut document, _) = builder
        .parse(&cherry("#ff0000", "#ff0000"))
        .unwrap()
        .into_parts();

    let graph = builder.color_branches(&mut document);
    assert_eq!(graph.warnings().len(), 2);
    assert_eq!(
        document.element("leaf_a").unwrap().style_property("stroke"),
        Some("#000000")
    );
}

#[test]
fn test_canonical_document_round_trips() {
    let source = cherry("#ff0000", "#00ff00");
    let builder = TreeImageBuilder::default();
    let (document, _) = builder.parse(&source).unwrap().into_parts();

    let svg = builder.render(&document, false, None).unwrap();
    assert_eq!(svg, source);
}

#[test]
fn test_crlf_document_round_trips() {
    let source = cherry("#ff0000", "#00ff00").replace('\n', "\r\n");
    let builder = TreeImageBuilder::default();
    let (document, warnings) = builder.parse(&source).unwrap().into_parts();
    assert!(warnings.is_empty());

    let svg = builder.render(&document, false, None).unwrap();
    assert_eq!(svg, source);
}

#[test]
fn test_round_trip_normalizes_pipe_labels() {
    let source = concat!(
        "<svg>\n",
        "<text id=\"t1\" x=\"5\" y=\"5\">XP 002951836.1 |Volvox carteri</text>\n",
        "</svg>\n",
    );
    let builder = TreeImageBuilder::default();
    let (document, _) = builder.parse(source).unwrap().into_parts();

    let svg = builder.render(&document, false, None).unwrap();
    assert!(svg.contains("> XP_002951836.1|Volvox carteri</text>"));
}

#[test]
fn test_support_circles_and_no_names() {
    let source = concat!(
        "<svg>\n",
        "<text id=\"t1\" x=\"10\" y=\"20\" style=\"fill:#000000\">87</text>\n",
        "<text id=\"t2\" x=\"30\" y=\"40\" style=\"fill:#000000\">95</text>\n",
        "<text id=\"t3\" x=\"50\" y=\"60\" style=\"fill:#000000\">10</text>\n",
        "<text id=\"t4\" x=\"70\" y=\"80\" style=\"fill:#000000\">Leaf_A</text>\n",
        "</svg>\n",
    );
    let config = AppConfig::new(
        GraphConfig::default(),
        SupportConfig::new(SupportMode::Circles, 90, 50, 3.0),
        Default::default(),
        StyleConfig::default(),
    );
    let builder = TreeImageBuilder::new(config);
    let (document, _) = builder.parse(source).unwrap().into_parts();

    let svg = builder.render(&document, true, None).unwrap();
    assert_eq!(svg.matches("<circle").count(), 2);
    assert!(svg.contains("cx=\"13\" cy=\"17\" style=\"fill:#ffffff"));
    assert!(svg.contains("cx=\"33\" cy=\"37\" style=\"fill:#000000"));
    assert!(!svg.contains("Leaf_A"));
}

#[test]
fn test_group_markers_through_builder() {
    let source = concat!(
        "<svg>\n",
        "<text id=\"t1\" x=\"100\" y=\"50\" style=\"fill:#000000\">WP_1.1</text>\n",
        "</svg>\n",
    );
    let builder = TreeImageBuilder::default();
    let (document, _) = builder.parse(source).unwrap().into_parts();
    let assignment = GroupAssignment::parse("WP_1.1\tClade_A\n").unwrap();

    let colors = GroupColors::parse("Clade_A\t#ff0000\n").unwrap();
    let svg = builder
        .render(&document, false, Some((&assignment, &colors)))
        .unwrap();
    assert!(svg.contains("id=\"group_marker1_0\""));
    assert!(svg.contains("x=\"120\" y=\"50\""));

    let err = builder
        .render(&document, false, Some((&assignment, &GroupColors::default())))
        .unwrap_err();
    assert!(matches!(err, PhyloSvgError::MissingGroupColor { .. }));
}

#[test]
fn test_leaf_order_skips_technical_and_support_labels() {
    let source = concat!(
        "<svg>\n",
        "<text id=\"t1\" x=\"0\" y=\"30\">YP_000003.1 1-150</text>\n",
        "<text id=\"t2\" x=\"0\" y=\"10\">14590307 Pyrococcus horikoshii</text>\n",
        "<text id=\"t3\" x=\"0\" y=\"5\">Tree_scale: 0.1</text>\n",
        "<text id=\"t4\" x=\"0\" y=\"20\">123456789|Escherichia coli</text>\n",
        "<text id=\"t5\" x=\"0\" y=\"15\">87</text>\n",
        "</svg>\n",
    );
    let builder = TreeImageBuilder::default();
    let (document, _) = builder.parse(source).unwrap().into_parts();

    assert_eq!(
        builder.leaf_order(&document, false),
        vec![
            "14590307_Pyrococcus_horikoshii",
            "123456789",
            "YP_000003.1_1-150",
        ]
    );
}

#[test]
fn test_sequence_id_conventions() {
    assert_eq!(
        sequence_id_from_text(" 14590307 Pyrococcus horikoshii", false, false),
        "14590307_Pyrococcus_horikoshii"
    );
    assert_eq!(
        sequence_id_from_text("XP_002951836.1|Volvox carteri|Chlorophyta", true, false),
        r"XP_002951836.1\|Volvox_carteri"
    );
    assert_eq!(
        sequence_id_from_text("XP_002951836.1|Volvox carteri|Chlorophyta", false, false),
        "XP_002951836.1"
    );
}

#[test]
fn test_parse_error_keeps_source() {
    let source = "<svg>\n<text x=\"1\" y=\"2\">No id</text>\n</svg>\n";
    let err = TreeImageBuilder::default().parse(source).unwrap_err();
    match err {
        PhyloSvgError::Parse { err, src } => {
            assert_eq!(src, source);
            assert!(err.errors().count() >= 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// One line of a generated tree image that is already in canonical form,
/// except for rect elements, which are read from several lines.
#[derive(Debug, Clone)]
enum CanonicalLine {
    GroupStart,
    GroupEnd,
    Comment(String),
    Circle,
    RectLiteral,
    Rect { x: u16, y: u16, style: String },
    Text { x: u16, y: u16, style: String, content: String },
    Path { x: u16, y: u16, length: u16, style: String },
}

impl CanonicalLine {
    /// Returns the source text and the expected rendering, each ending
    /// with `line_end`.
    fn write(&self, index: usize, line_end: &str) -> (String, String) {
        let line = match self {
            Self::GroupStart => format!("<g id=\"g{index}\">"),
            Self::GroupEnd => "</g>".to_string(),
            Self::Comment(text) => format!("<!-- {text} -->"),
            Self::Circle => format!("<circle id=\"c{index}\" r=\"3\" cx=\"1\" cy=\"2\" />"),
            Self::RectLiteral => format!(
                "<rect id=\"r{index}\" x=\"0\" y=\"0\" width=\"4\" height=\"2\" />"
            ),
            Self::Rect { x, y, style } => {
                let source = format!(
                    "<rect{line_end}   id=\"r{index}\"{line_end}   x=\"{x}\" y=\"{y}\" width=\"4\" height=\"2\"{line_end}   style=\"{style}\" />{line_end}"
                );
                let expected = format!(
                    "<rect id=\"r{index}\" x=\"{x}\" y=\"{y}\" width=\"4\" height=\"2\" style=\"{style}\" />{line_end}"
                );
                return (source, expected);
            }
            Self::Text { x, y, style, content } => format!(
                "<text id=\"t{index}\" x=\"{x}\" y=\"{y}\" style=\"{style}\">{content}</text>"
            ),
            Self::Path { x, y, length, style } => format!(
                "<path id=\"p{index}\" d=\"M {x},{y} H {}\" style=\"{style}\" />",
                x + length
            ),
        };
        let line = format!("{line}{line_end}");
        (line.clone(), line)
    }
}

fn style_map() -> impl Strategy<Value = String> {
    (
        prop::sample::subsequence(vec!["fill", "stroke", "stroke-width", "opacity"], 1..=4),
        "#[0-9a-f]{6}",
        any::<bool>(),
    )
        .prop_map(|(keys, color, trailing)| {
            let mut style = keys
                .iter()
                .map(|key| match *key {
                    "stroke-width" => format!("{key}:0.5px"),
                    "opacity" => format!("{key}:1"),
                    _ => format!("{key}:{color}"),
                })
                .collect::<Vec<_>>()
                .join(";");
            if trailing {
                style.push(';');
            }
            style
        })
}

fn label_content() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z][A-Za-z0-9_.]{0,12}",
        ("[A-Z]{2}_[0-9]{3,6}\\.[0-9]", "[A-Z][a-z]{1,9}( [a-z]{1,9})?")
            .prop_map(|(id, name)| format!(" {id}|{name}")),
    ]
}

fn canonical_line() -> impl Strategy<Value = CanonicalLine> {
    prop_oneof![
        Just(CanonicalLine::GroupStart),
        Just(CanonicalLine::GroupEnd),
        "[a-z]{1,8}( [a-z]{1,8}){0,3}".prop_map(CanonicalLine::Comment),
        Just(CanonicalLine::Circle),
        Just(CanonicalLine::RectLiteral),
        (0u16..500, 0u16..500, style_map())
            .prop_map(|(x, y, style)| CanonicalLine::Rect { x, y, style }),
        (0u16..500, 0u16..500, style_map(), label_content()).prop_map(
            |(x, y, style, content)| CanonicalLine::Text { x, y, style, content }
        ),
        (0u16..500, 0u16..500, 1u16..50, style_map()).prop_map(|(x, y, length, style)| {
            CanonicalLine::Path { x, y, length, style }
        }),
    ]
}

proptest! {
    #[test]
    fn prop_canonical_documents_render_unchanged(
        lines in prop::collection::vec(canonical_line(), 0..24),
        crlf in any::<bool>(),
    ) {
        let line_end = if crlf { "\r\n" } else { "\n" };
        let mut source = format!("<svg width=\"500\" height=\"500\">{line_end}");
        let mut expected = source.clone();
        for (index, line) in lines.iter().enumerate() {
            let (source_line, expected_line) = line.write(index, line_end);
            source.push_str(&source_line);
            expected.push_str(&expected_line);
        }
        for text in [&mut source, &mut expected] {
            text.push_str("</svg>");
            text.push_str(line_end);
        }

        let builder = TreeImageBuilder::default();
        let (document, warnings) = builder.parse(&source).unwrap().into_parts();
        prop_assert!(warnings.is_empty());

        let svg = builder.render(&document, false, None).unwrap();
        prop_assert_eq!(svg, expected);
    }
}
