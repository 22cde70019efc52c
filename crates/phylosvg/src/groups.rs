//! Group membership and group colors for marker rectangles.
//!
//! ```text
//! # membership: sequence id, groups in marker order
//! WP_000001.1	Clade_A	Mobile
//!
//! # colors: group, any CSS color
//! Clade_A	rgb(255,0,0)
//! Mobile	#00aa00
//! ```

use std::collections::HashMap;

use log::debug;

use phylosvg_core::color::Color;

use crate::{error::PhyloSvgError, taxonomy::table_lines};

/// Map of sequence id to the groups it belongs to.
///
/// Group order is kept as given; markers are drawn left to right in that
/// order.
#[derive(Debug, Clone, Default)]
pub struct GroupAssignment {
    groups: HashMap<String, Vec<String>>,
}

impl GroupAssignment {
    /// Parse a `sequence_id<TAB>group[<TAB>group...]` table.
    ///
    /// Blank lines and lines starting with `#` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PhyloSvgError::Table`] for a line without any group.
    pub fn parse(source: &str) -> Result<Self, PhyloSvgError> {
        let mut groups = HashMap::new();
        for (number, line) in table_lines(source) {
            let mut fields = line.split('\t').map(str::trim).filter(|field| !field.is_empty());
            let Some(sequence_id) = fields.next() else {
                continue;
            };
            let names: Vec<String> = fields.map(str::to_string).collect();
            if names.is_empty() {
                return Err(PhyloSvgError::table_error(
                    "group",
                    number,
                    format!("sequence `{sequence_id}` has no group"),
                ));
            }
            groups.insert(sequence_id.to_string(), names);
        }
        debug!(sequences = groups.len(); "Group assignment read");
        Ok(Self { groups })
    }

    /// Returns the groups of a sequence, in marker order.
    pub fn groups_of(&self, sequence_id: &str) -> Option<&[String]> {
        self.groups.get(sequence_id).map(Vec::as_slice)
    }

    /// Returns the number of sequences with a group.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if no sequence has a group.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<String>)> for GroupAssignment {
    fn from_iter<I: IntoIterator<Item = (S, Vec<String>)>>(iter: I) -> Self {
        Self {
            groups: iter
                .into_iter()
                .map(|(sequence_id, groups)| (sequence_id.into(), groups))
                .collect(),
        }
    }
}

/// Map of group name to marker color.
#[derive(Debug, Clone, Default)]
pub struct GroupColors {
    colors: HashMap<String, Color>,
}

impl GroupColors {
    /// Parse a `group<TAB>color` table.
    ///
    /// # Errors
    ///
    /// Returns [`PhyloSvgError::Table`] for a line that is not two fields or
    /// whose color cannot be parsed.
    pub fn parse(source: &str) -> Result<Self, PhyloSvgError> {
        let mut colors = HashMap::new();
        for (number, line) in table_lines(source) {
            let Some((group, color)) = line.split_once('\t') else {
                return Err(PhyloSvgError::table_error(
                    "group color",
                    number,
                    "expected `group<TAB>color`",
                ));
            };
            let color = Color::new(color)
                .map_err(|err| PhyloSvgError::table_error("group color", number, err))?;
            colors.insert(group.trim().to_string(), color);
        }
        debug!(groups = colors.len(); "Group colors read");
        Ok(Self { colors })
    }

    /// Returns the color of a group.
    pub fn get(&self, group: &str) -> Option<Color> {
        self.colors.get(group).copied()
    }

    /// Returns the number of groups.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns `true` if no group has a color.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Color)> for GroupColors {
    fn from_iter<I: IntoIterator<Item = (S, Color)>>(iter: I) -> Self {
        Self {
            colors: iter
                .into_iter()
                .map(|(group, color)| (group.into(), color))
                .collect(),
        }
    }
}
