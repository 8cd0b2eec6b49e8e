use indexmap::IndexSet;
use strum::{Display, VariantArray};

use crate::location::{CellLocation, PointKey, Position};

/// How a point participates in the grid.
#[derive(Copy, Clone, Debug, Display, VariantArray, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[strum(serialize_all = "lowercase")]
pub enum PointKind {
    /// A cell's interior anchor.
    Center,
    /// A true corner: a vertex of a plain square cell, or where more than two raw edges meet.
    Corner,
    /// A point partway along one logical edge between two corners.
    Border,
}

/// How two points in the point graph are linked.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PointLink {
    /// One raw polygon edge.
    Edge,
    /// A whole traced border, from corner to corner.
    Segment,
    /// The centers of two adjacent cells.
    Center,
}

/// An interned point.
#[derive(Clone, Debug)]
pub struct PointInfo {
    pub(crate) key: PointKey,
    pub(crate) position: Position,
    pub(crate) cells: IndexSet<CellLocation>,
    pub(crate) kind: PointKind,
    pub(crate) neighbors: IndexSet<PointKey>,
    // set while interning; forces corner status
    pub(crate) touches_plain_cell: bool,
}

impl PointInfo {
    pub(crate) fn new(key: PointKey, position: Position) -> Self {
        Self {
            key,
            position,
            cells: IndexSet::new(),
            kind: PointKind::Border,
            neighbors: IndexSet::new(),
            touches_plain_cell: false,
        }
    }

    /// The interning key.
    pub fn key(&self) -> PointKey {
        self.key
    }

    /// The normalized position of the first declaration of this point.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Cells having this point as a vertex, or the single cell it is the center of.
    pub fn cells(&self) -> &IndexSet<CellLocation> {
        &self.cells
    }

    /// Center, corner or border.
    pub fn kind(&self) -> PointKind {
        self.kind
    }

    /// Points one raw edge, traced border or center link away, in discovery order.
    pub fn neighbors(&self) -> &IndexSet<PointKey> {
        &self.neighbors
    }
}
