//! Leaf order as drawn on the tree.

use std::cmp::Ordering;

use log::{debug, info};

use phylosvg_core::label::{LabelInfo, LabelKind};

/// Returns the sequence identifiers of the leaf labels, top to bottom.
///
/// Labels are sorted stably by ascending `y`. Support values, numeric
/// annotations and technical labels are skipped. Identifiers keep their
/// range suffix; `preserve_pipe_format` keeps the leading pipe fields as
/// described in [`phylosvg_core::label::sequence_id_from_text`].
///
/// # Examples
///
/// ```
/// use phylosvg::order_labels_by_vertical_position;
/// use phylosvg_core::{element::Element, label::LabelInfo};
///
/// let label = |id: &str, y: &str, text: &str| {
///     let element = Element::new("text")
///         .with_attribute("id", id)
///         .with_attribute("x", "0")
///         .with_attribute("y", y)
///         .with_content(text);
///     LabelInfo::from_element(&element).unwrap()
/// };
///
/// let labels = [
///     label("t1", "40", "YP_000002.1"),
///     label("t2", "10", "YP_000001.1 1-150"),
///     label("t3", "20", "87"),
/// ];
/// assert_eq!(
///     order_labels_by_vertical_position(&labels, false),
///     vec!["YP_000001.1_1-150", "YP_000002.1"]
/// );
/// ```
pub fn order_labels_by_vertical_position(
    labels: &[LabelInfo],
    preserve_pipe_format: bool,
) -> Vec<String> {
    let mut leaves: Vec<&LabelInfo> = labels
        .iter()
        .filter(|label| {
            let keep = label.kind() == LabelKind::Leaf && label.is_leaf();
            if !keep {
                debug!(element_id = label.element_id(), kind:? = label.kind(); "Label is not a leaf");
            }
            keep
        })
        .collect();
    leaves.sort_by(|a, b| by_vertical_position(a, b));

    let order: Vec<String> = leaves
        .into_iter()
        .map(|label| label.sequence_id(preserve_pipe_format, true))
        .collect();
    info!(leaves = order.len(); "Leaf order computed");
    order
}

fn by_vertical_position(a: &LabelInfo, b: &LabelInfo) -> Ordering {
    a.position().y().total_cmp(&b.position().y())
}
