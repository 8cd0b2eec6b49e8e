use std::num::NonZero;

use ndarray::Ix;

type Coord = usize;
pub(crate) type Dimension = NonZero<Coord>;

/// Points closer than this many grid units along both axes share a [`PointKey`].
pub const KEY_RESOLUTION: f64 = 1e-6;

#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug)]
/// The location `(top, left)` of a cell. The top left cell is at `(0, 0)`.
///
/// Ordering is row-major, which is also the scan order used when partitioning the grid into regions.
pub struct CellLocation {
    /// Row index.
    pub top: Coord,
    /// Column index.
    pub left: Coord,
}

impl CellLocation {
    /// Construct a location from its row and column.
    pub const fn new(top: Coord, left: Coord) -> Self {
        Self { top, left }
    }

    pub(crate) fn as_index(&self) -> (Ix, Ix) {
        (self.top, self.left)
    }

    pub(crate) fn within(&self, dims: (Dimension, Dimension)) -> bool {
        self.top < dims.0.get() && self.left < dims.1.get()
    }
}

impl From<(Ix, Ix)> for CellLocation {
    fn from(value: (Ix, Ix)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// A real-valued point `(top, left)` in grid units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    /// Vertical coordinate, growing downwards.
    pub top: f64,
    /// Horizontal coordinate, growing rightwards.
    pub left: f64,
}

impl Position {
    /// Construct a position from its coordinates.
    pub const fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: Position) -> f64 {
        (self.top - other.top).hypot(self.left - other.left)
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(&self, other: Position, t: f64) -> Position {
        Position::new(
            self.top + (other.top - self.top) * t,
            self.left + (other.left - self.left) * t,
        )
    }
}

impl From<(f64, f64)> for Position {
    fn from(value: (f64, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// An axis-aligned rectangle in grid units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    /// Top edge.
    pub top: f64,
    /// Left edge.
    pub left: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Rect {
    /// Construct a rectangle from its top left corner and size.
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self { top, left, width, height }
    }

    /// The unit square occupied by the cell at `location`.
    pub fn of_cell(location: CellLocation) -> Self {
        Self::new(location.top as f64, location.left as f64, 1.0, 1.0)
    }

    /// The point halfway across both axes.
    pub fn center(&self) -> Position {
        Position::new(self.top + self.height / 2.0, self.left + self.width / 2.0)
    }

    /// The four corners, clockwise from the top left.
    pub fn corners(&self) -> [Position; 4] {
        [
            Position::new(self.top, self.left),
            Position::new(self.top, self.left + self.width),
            Position::new(self.top + self.height, self.left + self.width),
            Position::new(self.top + self.height, self.left),
        ]
    }

    /// The smallest rectangle containing every point of `points`, or [`None`] if there are none.
    pub fn bounding(points: impl IntoIterator<Item = Position>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (mut min, mut max) = (first, first);
        for point in points {
            min.top = min.top.min(point.top);
            min.left = min.left.min(point.left);
            max.top = max.top.max(point.top);
            max.left = max.left.max(point.left);
        }

        Some(Self::new(min.top, min.left, max.left - min.left, max.top - min.top))
    }
}

/// A straight segment between two positions, as drawn by a user or emitted by a path search.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Line {
    /// Where the line begins.
    pub start: Position,
    /// Where the line ends.
    pub end: Position,
}

impl Line {
    /// Construct a line from its endpoints.
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// The canonical identity of a point: its normalized coordinates quantized to [`KEY_RESOLUTION`].
///
/// Two positions the puzzle's [`Wrap`](crate::wrap::Wrap) rules consider equal produce the same key.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PointKey {
    /// Quantized vertical coordinate.
    pub top: i64,
    /// Quantized horizontal coordinate.
    pub left: i64,
}

impl PointKey {
    /// Quantize `position` as is, without applying any wrap rules.
    pub fn quantize(position: Position) -> Self {
        Self {
            top: quantize(position.top),
            left: quantize(position.left),
        }
    }
}

pub(crate) fn quantize(coord: f64) -> i64 {
    (coord / KEY_RESOLUTION).round() as i64
}
