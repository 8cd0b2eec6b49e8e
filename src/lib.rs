#![warn(missing_docs)]

//! # `gridtopo`
//!
//! The shape and adjacency model behind puzzle grids whose cells may be plain unit squares or arbitrary polygons.
//! Begin by describing the grid with a [`TopologyBuilder`], declaring custom polygons for irregular cells and, where the
//! puzzle wraps around, the [`Wrap`] rules deciding which coordinates denote the same point.
//! [`build()`](TopologyBuilder::build) yields an immutable [`GridTopology`] answering every query in this crate.
//!
//! # Internals
//! Construction runs once per puzzle:
//!
//! 1. Every cell's bounds are normalized into polygon loops; plain cells become unit squares.
//! 2. Every vertex and cell center is interned by its [`PointKey`], so cells declaring the same point share one node.
//! Points are classified as centers, corners (vertices of plain cells, or where more than two raw edges meet) and
//! border points (everything else, normally partway along a shared edge).
//! 3. Cells sharing a raw edge become neighbors, along with any declared extra neighbors. Centers of neighboring cells
//! are linked in the point graph.
//! 4. From every corner, chains of border points are walked to the next corner. Each such [`BorderSegment`] is keyed by
//! its corner pair ([`EdgeKey`]) and recorded on every cell along it, together with the cells on the other side.
//!
//! Queries then run against the finished index:
//! [`path`](GridTopology::path) snaps a drag to real edges with a breadth-first search,
//! [`region_at`](GridTopology::region_at) and [`all_regions`](GridTopology::all_regions) flood fill cells across every
//! border not in a caller-supplied closed set, and [`merged_line_groups`](GridTopology::merged_line_groups) joins
//! independently drawn segments between centers into paths and loops.

pub use border::{BorderSegment, EdgeKey};
pub use bounds::{BoundsMemo, TransformedBounds};
pub use builder::TopologyBuilder;
pub use cell::{CellBounds, CellTopology};
pub use error::{BuilderInvalidReason, TopologyError};
pub use location::{CellLocation, Line, PointKey, Position, Rect, KEY_RESOLUTION};
pub use merge::LineGroup;
pub use point::{PointInfo, PointKind, PointLink};
pub use region::Regions;
pub use topology::GridTopology;
pub use wrap::{Planar, Wrap, Wraparound};

pub(crate) mod border;
pub(crate) mod bounds;
pub mod builder;
pub(crate) mod cell;
pub(crate) mod error;
pub(crate) mod location;
pub(crate) mod merge;
pub(crate) mod path;
pub(crate) mod point;
pub(crate) mod region;
mod tests;
pub(crate) mod topology;
#[cfg(feature = "wasm")]
pub mod wasm;
pub mod wrap;
