use std::collections::HashMap;
use std::num::NonZero;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;
use strum::VariantArray;
use tracing::{debug, warn};

use crate::border::{trace_borders, EdgeKey};
use crate::cell::{CellBounds, CellTopology};
use crate::error::{BuilderInvalidReason, TopologyError};
use crate::location::{CellLocation, Dimension, PointKey, Position, Rect};
use crate::point::{PointInfo, PointKind, PointLink};
use crate::topology::GridTopology;
use crate::wrap::{Planar, Wrap};

type ExtraNeighbors = Arc<dyn Fn(CellLocation) -> Vec<CellLocation> + Send + Sync>;

/// Collects a puzzle's static geometry and builds its [`GridTopology`].
///
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at some point.
/// Once a builder becomes invalid it ignores further features; [`build`](Self::build) then reports every reason.
#[derive(Clone)]
pub struct TopologyBuilder<W: Wrap> {
    // rows, columns
    dims: (Dimension, Dimension),
    wrap: W,
    custom: HashMap<CellLocation, CellBounds>,
    extra_neighbors: Option<ExtraNeighbors>,
    strict: bool,
    invalid_reasons: Vec<BuilderInvalidReason>,
}

impl Default for TopologyBuilder<Planar> {
    fn default() -> Self {
        Self::with_dims((NonZero::<usize>::MIN, NonZero::<usize>::MIN))
    }
}

impl TopologyBuilder<Planar> {
    /// A flat grid of plain squares with the specified dimensions, in `(rows, columns)` order.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self::new(dims, Planar)
    }
}

impl<W: Wrap> TopologyBuilder<W> {
    /// A grid of plain squares with the specified dimensions, in `(rows, columns)` order, interning points by `wrap`.
    pub fn new(dims: (Dimension, Dimension), wrap: W) -> Self {
        Self {
            dims,
            wrap,
            custom: HashMap::new(),
            extra_neighbors: None,
            strict: false,
            invalid_reasons: Vec::new(),
        }
    }

    /// Replace the unit square of the cell at `location` with arbitrary polygon `loops` and an `interior` rect.
    ///
    /// A loop may repeat its first point at the end; the duplicate is dropped.
    /// May cause the builder to enter a [`FeatureOutOfBounds`](BuilderInvalidReason::FeatureOutOfBounds) invalid state.
    pub fn custom_bounds(&mut self, location: CellLocation, loops: Vec<Vec<Position>>, interior: Rect) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if !location.within(self.dims) {
            self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds(location));
            return self;
        }

        self.custom.insert(location, CellBounds::custom(loops, interior));
        self
    }

    /// Declare adjacency that does not follow from shared edges, e.g. faces of a cube net.
    ///
    /// `neighbors` is called once per cell during [`build`](Self::build).
    /// Results outside the grid, or equal to the cell itself, are skipped with a warning.
    pub fn extra_neighbors<F>(&mut self, neighbors: F) -> &mut Self
    where
        F: Fn(CellLocation) -> Vec<CellLocation> + Send + Sync + 'static,
    {
        self.extra_neighbors = Some(Arc::new(neighbors));
        self
    }

    /// Fail the build when a border chain cannot be traced to a corner, instead of omitting it.
    pub fn strict(&mut self, strict: bool) -> &mut Self {
        self.strict = strict;
        self
    }

    /// Convert the state of this builder into a [`GridTopology`].
    pub fn build(&self) -> Result<GridTopology<W>, TopologyError> {
        if !self.invalid_reasons.is_empty() {
            return Err(TopologyError::InvalidBuilder { reasons: self.invalid_reasons.clone() });
        }

        let (rows, columns) = (self.dims.0.get(), self.dims.1.get());
        let bounds = Array2::from_shape_fn((rows, columns), |index| {
            let location = CellLocation::from(index);
            match self.custom.get(&location) {
                Some(custom) => (strip_closing_points(&self.wrap, custom), true),
                None => (CellBounds::square(location), false),
            }
        });

        let mut geometry = RawGeometry::default();
        let mut centers = Array2::from_elem((rows, columns), PointKey { top: 0, left: 0 });
        for (index, (cell_bounds, custom)) in bounds.indexed_iter() {
            let location = CellLocation::from(index);
            for polygon in &cell_bounds.loops {
                let keys = polygon.iter()
                    .map(|position| geometry.intern_vertex(&self.wrap, *position, location, !custom))
                    .collect_vec();
                if keys.len() < 2 {
                    continue;
                }
                for (a, b) in keys.iter().circular_tuple_windows::<(_, _)>() {
                    geometry.add_edge(*a, *b, location);
                }
            }
            centers[index] = geometry.intern_center(&self.wrap, cell_bounds.center(), location);
        }
        geometry.classify();

        let mut cell_graph: UnGraphMap<CellLocation, ()> = UnGraphMap::with_capacity(
            bounds.len(),
            // naively allocate for a complete grid of this size, which usually isn't too far off
            (rows - 1) * columns + (columns - 1) * rows,
        );
        for (index, _) in bounds.indexed_iter() {
            cell_graph.add_node(CellLocation::from(index));
        }
        for edge_cells in geometry.edges.values() {
            for (a, b) in edge_cells.iter().tuple_combinations::<(_, _)>() {
                cell_graph.add_edge(*a, *b, ());
            }
        }
        if let Some(extra) = &self.extra_neighbors {
            for (index, _) in bounds.indexed_iter() {
                let location = CellLocation::from(index);
                for other in extra(location) {
                    if other == location || !other.within(self.dims) {
                        warn!(?location, ?other, "skipping extra neighbor outside the grid or equal to the cell");
                        continue;
                    }
                    cell_graph.add_edge(location, other, ());
                }
            }
        }

        let mut cells = Array2::from_shape_fn((rows, columns), |index| {
            let location = CellLocation::from(index);
            let (cell_bounds, custom) = &bounds[index];
            let mut cell = CellTopology::new(location, cell_bounds.clone(), *custom, centers[index]);
            cell.neighbors = cell_graph.neighbors(location).collect();
            cell
        });

        let segments = trace_borders(&geometry, &self.wrap, &mut cells, self.strict)?;

        let mut point_graph: UnGraphMap<PointKey, PointLink> =
            UnGraphMap::with_capacity(geometry.points.len(), geometry.edges.len());
        for key in geometry.points.keys() {
            point_graph.add_node(*key);
        }
        for edge in geometry.edges.keys() {
            let (a, b) = edge.ends();
            point_graph.add_edge(a, b, PointLink::Edge);
        }
        for segment in &segments {
            let (a, b) = segment.ends();
            if a != b && !point_graph.contains_edge(a, b) {
                point_graph.add_edge(a, b, PointLink::Segment);
            }
        }
        for (a, b, _) in cell_graph.all_edges() {
            let (a, b) = (centers[a.as_index()], centers[b.as_index()]);
            if a != b {
                point_graph.add_edge(a, b, PointLink::Center);
            }
        }

        let mut points = geometry.points;
        for point in points.values_mut() {
            point.neighbors = point_graph.neighbors(point.key).collect();
        }

        debug!(
            rows,
            columns,
            points = points.len(),
            raw_edges = geometry.edges.len(),
            segments = segments.len(),
            kinds = ?PointKind::VARIANTS.iter()
                .map(|kind| (*kind, points.values().filter(|point| point.kind == *kind).count()))
                .collect_vec(),
            "built grid topology",
        );

        Ok(GridTopology {
            wrap: self.wrap.clone(),
            dims: self.dims,
            cells,
            points,
            point_graph,
            cell_graph,
        })
    }
}

fn strip_closing_points<W: Wrap>(wrap: &W, bounds: &CellBounds) -> CellBounds {
    let loops = bounds.loops.iter()
        .map(|polygon| {
            let mut polygon = polygon.clone();
            if polygon.len() > 1 {
                if let (Some(first), Some(last)) = (polygon.first(), polygon.last()) {
                    if wrap.key(*first) == wrap.key(*last) {
                        polygon.pop();
                    }
                }
            }
            polygon
        })
        .collect();

    CellBounds::custom(loops, bounds.interior)
}

/// Interned points and raw polygon edges, before any tracing.
#[derive(Default)]
pub(crate) struct RawGeometry {
    pub(crate) points: IndexMap<PointKey, PointInfo>,
    // raw edge -> cells having it on their boundary
    pub(crate) edges: IndexMap<EdgeKey, IndexSet<CellLocation>>,
    incident: IndexMap<PointKey, IndexSet<EdgeKey>>,
}

impl RawGeometry {
    fn intern<W: Wrap>(&mut self, wrap: &W, position: Position) -> &mut PointInfo {
        let key = wrap.key(position);
        self.points.entry(key).or_insert_with(|| PointInfo::new(key, wrap.normalize(position)))
    }

    fn intern_vertex<W: Wrap>(&mut self, wrap: &W, position: Position, cell: CellLocation, plain: bool) -> PointKey {
        let point = self.intern(wrap, position);
        point.cells.insert(cell);
        point.touches_plain_cell |= plain;
        point.key
    }

    fn intern_center<W: Wrap>(&mut self, wrap: &W, position: Position, cell: CellLocation) -> PointKey {
        let point = self.intern(wrap, position);
        point.cells.insert(cell);
        point.kind = PointKind::Center;
        point.key
    }

    fn add_edge(&mut self, a: PointKey, b: PointKey, cell: CellLocation) {
        if a == b {
            return;
        }
        let edge = EdgeKey::new(a, b);
        self.edges.entry(edge).or_default().insert(cell);
        self.incident.entry(a).or_default().insert(edge);
        self.incident.entry(b).or_default().insert(edge);
    }

    fn classify(&mut self) {
        for point in self.points.values_mut() {
            if point.kind == PointKind::Center {
                continue;
            }
            let degree = self.incident.get(&point.key).map_or(0, IndexSet::len);
            point.kind = if point.touches_plain_cell || degree > 2 {
                PointKind::Corner
            } else {
                PointKind::Border
            };
        }
    }

    pub(crate) fn kind_of(&self, point: PointKey) -> Option<PointKind> {
        self.points.get(&point).map(|point| point.kind)
    }

    pub(crate) fn position_of(&self, point: PointKey) -> Position {
        self.points.get(&point).map(|point| point.position).unwrap_or_default()
    }

    /// Raw edges touching `point`, in discovery order.
    pub(crate) fn incident(&self, point: PointKey) -> impl Iterator<Item = &EdgeKey> {
        self.incident.get(&point).into_iter().flatten()
    }

    pub(crate) fn cells_of(&self, edge: EdgeKey) -> impl Iterator<Item = &CellLocation> {
        self.edges.get(&edge).into_iter().flatten()
    }
}
