//! Stroke geometry of branch elements.
//!
//! Branches are drawn as `path` elements whose `d` attribute is a single
//! move command followed by coordinate pairs:
//!
//! ```text
//! d="m 283.68839,33.110976 0,-11.282258 35.52229,0"   relative: deltas accumulate
//! d="M 215.20166,168.35235 190.59946,149.6766"        absolute: last pair is the end
//! ```
//!
//! or as `rect` elements, whose stroke runs from (`x`, `y`) to
//! (`x + width`, `y + height`).

use winnow::{
    Parser as _,
    ascii::{float, multispace0, multispace1},
    combinator::{alt, preceded, repeat, separated_pair},
    error::ModalResult,
};

use phylosvg_core::{
    element::{Element, ElementKind},
    geometry::Point,
};

/// Coordinate mode of a move command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMode {
    /// `M`: every pair is an absolute position.
    Absolute,
    /// `m`: pairs after the first are deltas.
    Relative,
}

/// Parsed `d` attribute of a branch path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathData {
    mode: MoveMode,
    first: Point,
    rest: Vec<Point>,
}

impl PathData {
    /// Returns the move mode.
    pub fn mode(&self) -> MoveMode {
        self.mode
    }

    /// Returns the first coordinate pair, where the stroke starts.
    pub fn start(&self) -> Point {
        self.first
    }

    /// Returns where the stroke ends.
    ///
    /// Absolute mode uses the last pair verbatim; relative mode adds every
    /// following delta to the first pair.
    pub fn end(&self) -> Point {
        match self.mode {
            MoveMode::Absolute => self.rest.last().copied().unwrap_or(self.first),
            MoveMode::Relative => self
                .rest
                .iter()
                .fold(self.first, |end, delta| end.add_point(*delta)),
        }
    }
}

fn number(input: &mut &str) -> ModalResult<f64> {
    float.parse_next(input)
}

fn coordinate_pair(input: &mut &str) -> ModalResult<Point> {
    separated_pair(number, (multispace0, ',', multispace0), number)
        .map(|(x, y)| Point::new(x, y))
        .parse_next(input)
}

fn move_mode(input: &mut &str) -> ModalResult<MoveMode> {
    alt(('M'.value(MoveMode::Absolute), 'm'.value(MoveMode::Relative))).parse_next(input)
}

fn path_data(input: &mut &str) -> ModalResult<PathData> {
    (
        preceded(multispace0, move_mode),
        preceded(multispace0, coordinate_pair),
        repeat(0.., preceded(multispace1, coordinate_pair)),
        multispace0,
    )
        .map(|(mode, first, rest, _)| PathData { mode, first, rest })
        .parse_next(input)
}

/// Parse the `d` attribute of a branch path.
///
/// Returns `None` unless the data is one `M`/`m` command followed by
/// `x,y` pairs.
///
/// # Examples
///
/// ```
/// use phylosvg_core::geometry::Point;
/// use phylosvg_parser::path_data::parse_path_data;
///
/// let data = parse_path_data("M 0,0 3,4").unwrap();
/// assert_eq!(data.start(), Point::new(0.0, 0.0));
/// assert_eq!(data.end(), Point::new(3.0, 4.0));
///
/// assert!(parse_path_data("C 1,2 3,4 5,6").is_none());
/// ```
pub fn parse_path_data(d: &str) -> Option<PathData> {
    path_data.parse(d).ok()
}

/// Returns the `(start, end)` coordinates of a branch element's stroke.
///
/// `None` for text elements and for branches without usable geometry.
pub fn stroke_endpoints(element: &Element) -> Option<(Point, Point)> {
    match element.kind()? {
        ElementKind::Path => {
            let data = parse_path_data(element.plain_attribute("d")?)?;
            Some((data.start(), data.end()))
        }
        ElementKind::Rect => {
            let start = element.anchor()?;
            let size = Point::new(
                element.number_attribute("width")?,
                element.number_attribute("height")?,
            );
            Some((start, start.add_point(size)))
        }
        ElementKind::Text => None,
    }
}
