use indexmap::IndexMap;

use crate::border::{BorderSegment, EdgeKey};
use crate::location::{CellLocation, PointKey, Position, Rect};

/// The declared shape of a cell: one or more closed polygon loops and a rectangle for placing content.
///
/// Loops never repeat their first point at the end.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellBounds {
    /// Closed polygon loops, in declaration order.
    pub loops: Vec<Vec<Position>>,
    /// Where cell content such as digits is placed.
    pub interior: Rect,
}

impl CellBounds {
    /// The unit square of the cell at `location`.
    pub fn square(location: CellLocation) -> Self {
        let interior = Rect::of_cell(location);
        Self {
            loops: vec![interior.corners().to_vec()],
            interior,
        }
    }

    /// Custom bounds. Use [`TopologyBuilder::custom_bounds`](crate::TopologyBuilder::custom_bounds) to attach them to a cell.
    pub fn custom(loops: Vec<Vec<Position>>, interior: Rect) -> Self {
        Self { loops, interior }
    }

    /// The interior anchor point.
    pub fn center(&self) -> Position {
        self.interior.center()
    }
}

/// Everything the topology index knows about one cell.
#[derive(Clone, Debug)]
pub struct CellTopology {
    pub(crate) location: CellLocation,
    pub(crate) bounds: CellBounds,
    pub(crate) custom: bool,
    pub(crate) center: PointKey,
    pub(crate) neighbors: Vec<CellLocation>,
    pub(crate) borders: IndexMap<EdgeKey, Vec<BorderSegment>>,
}

impl CellTopology {
    pub(crate) fn new(location: CellLocation, bounds: CellBounds, custom: bool, center: PointKey) -> Self {
        Self {
            location,
            bounds,
            custom,
            center,
            neighbors: Vec::new(),
            borders: IndexMap::new(),
        }
    }

    /// Where this cell sits in the grid.
    pub fn location(&self) -> CellLocation {
        self.location
    }

    /// Normalized bounds, with closing points stripped.
    pub fn bounds(&self) -> &CellBounds {
        &self.bounds
    }

    /// Whether the bounds were declared by the puzzle rather than synthesized as a unit square.
    pub fn is_custom(&self) -> bool {
        self.custom
    }

    /// Key of the center point, usable with [`GridTopology::point_by_key`](crate::GridTopology::point_by_key).
    pub fn center_key(&self) -> PointKey {
        self.center
    }

    /// Adjacent cells, in the order they were discovered.
    pub fn neighbors(&self) -> &[CellLocation] {
        &self.neighbors
    }

    /// Traced borders touching this cell, grouped by their corner pair.
    ///
    /// A pair usually has one border, but distinct polylines may join the same two corners.
    pub fn borders(&self) -> &IndexMap<EdgeKey, Vec<BorderSegment>> {
        &self.borders
    }

    /// Traced borders shared with `other`.
    pub fn borders_with(&self, other: CellLocation) -> impl Iterator<Item = &BorderSegment> {
        self.borders.values().flatten().filter(move |segment| segment.cells.contains(&other))
    }
}
