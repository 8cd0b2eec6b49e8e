use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;

use crate::border::{BorderSegment, EdgeKey};
use crate::cell::CellTopology;
use crate::location::{CellLocation, Dimension, PointKey, Position};
use crate::point::{PointInfo, PointLink};
use crate::wrap::Wrap;

/// The adjacency model of a puzzle grid, interning points according to the wrap rules `W`.
/// See the [`Wrap`] trait for more information.
///
/// [`GridTopology`] objects should be built using a [`TopologyBuilder`](crate::TopologyBuilder).
/// They never change afterwards; every query takes `&self` and returns freshly allocated results,
/// so one index can be shared freely between readers.
#[derive(Clone, Debug)]
pub struct GridTopology<W: Wrap> {
    pub(crate) wrap: W,
    pub(crate) dims: (Dimension, Dimension),
    pub(crate) cells: Array2<CellTopology>,
    pub(crate) points: IndexMap<PointKey, PointInfo>,
    pub(crate) point_graph: UnGraphMap<PointKey, PointLink>,
    pub(crate) cell_graph: UnGraphMap<CellLocation, ()>,
}

impl<W: Wrap> GridTopology<W> {
    /// Grid dimensions in `(rows, columns)` order.
    pub fn dims(&self) -> (usize, usize) {
        (self.dims.0.get(), self.dims.1.get())
    }

    /// The wrap rules points were interned with.
    pub fn wrap(&self) -> &W {
        &self.wrap
    }

    /// The cell at `location`, or [`None`] outside the grid.
    pub fn cell(&self, location: CellLocation) -> Option<&CellTopology> {
        self.cells.get(location.as_index())
    }

    /// Every cell in scan order (top-to-bottom, left-to-right).
    pub fn cells(&self) -> impl Iterator<Item = &CellTopology> {
        self.cells.iter()
    }

    /// Cells adjacent to `location`, in discovery order. Empty outside the grid.
    pub fn neighbors(&self, location: CellLocation) -> &[CellLocation] {
        match self.cell(location) {
            Some(cell) => cell.neighbors(),
            None => &[],
        }
    }

    /// Whether `a` and `b` share an edge or were declared extra neighbors.
    pub fn are_neighbors(&self, a: CellLocation, b: CellLocation) -> bool {
        self.cell_graph.contains_edge(a, b)
    }

    /// The interned point at `position`, if any cell declares it.
    pub fn point_info(&self, position: Position) -> Option<&PointInfo> {
        self.points.get(&self.wrap.key(position))
    }

    /// The interned point with `key`, e.g. a cell's [`center_key`](CellTopology::center_key).
    pub fn point_by_key(&self, key: PointKey) -> Option<&PointInfo> {
        self.points.get(&key)
    }

    /// Every interned point, in the order it was first declared.
    pub fn points(&self) -> impl Iterator<Item = &PointInfo> {
        self.points.values()
    }

    /// How the points at `a` and `b` are directly linked, if at all.
    pub fn point_link(&self, a: Position, b: Position) -> Option<PointLink> {
        self.point_graph.edge_weight(self.wrap.key(a), self.wrap.key(b)).copied()
    }

    /// The key a closed-edge set uses for the border from corner `a` to corner `b`.
    pub fn edge_key(&self, a: Position, b: Position) -> EdgeKey {
        EdgeKey::new(self.wrap.key(a), self.wrap.key(b))
    }

    /// Traced borders of `a` having `b` on their other side.
    pub fn borders_between(&self, a: CellLocation, b: CellLocation) -> Vec<&BorderSegment> {
        self.cell(a).map(|cell| cell.borders_with(b).collect()).unwrap_or_default()
    }

    /// Every traced border once, as first seen scanning the cells.
    pub fn segments(&self) -> Vec<&BorderSegment> {
        let mut seen = IndexSet::new();
        self.cells.iter()
            .flat_map(|cell| cell.borders.values().flatten())
            .filter(|segment| {
                let polyline = segment.points.iter().map(|point| self.wrap.key(*point)).collect_vec();
                seen.insert((segment.key, polyline))
            })
            .collect()
    }
}
