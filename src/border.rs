use std::collections::HashSet;

use indexmap::IndexSet;
use itertools::Itertools;
use ndarray::Array2;
use tracing::warn;
use unordered_pair::UnorderedPair;

use crate::builder::RawGeometry;
use crate::cell::CellTopology;
use crate::error::TopologyError;
use crate::location::{CellLocation, PointKey, Position};
use crate::point::PointKind;
use crate::wrap::Wrap;

/// The identity of an edge: the unordered pair of its end points.
///
/// Raw polygon edges are keyed by their two vertices, traced borders by their two corners.
/// On a grid of plain squares the two coincide.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct EdgeKey(UnorderedPair<PointKey>);

impl EdgeKey {
    /// The key of the edge between `a` and `b`, in either order.
    pub fn new(a: PointKey, b: PointKey) -> Self {
        Self(UnorderedPair::from((a, b)))
    }

    /// Both ends, lower key first.
    pub fn ends(&self) -> (PointKey, PointKey) {
        let UnorderedPair(a, b) = self.0;
        if a <= b { (a, b) } else { (b, a) }
    }

    /// The end opposite `end`. If `end` is not an end of this edge, the lower end is returned.
    pub fn other(&self, end: PointKey) -> PointKey {
        let (low, high) = self.ends();
        if low == end { high } else { low }
    }
}

/// One traced border: the polyline between two corners, as seen from one of the cells along it.
#[derive(Clone, Debug, PartialEq)]
pub struct BorderSegment {
    pub(crate) key: EdgeKey,
    pub(crate) points: Vec<Position>,
    pub(crate) label: Position,
    pub(crate) cells: IndexSet<CellLocation>,
}

impl BorderSegment {
    /// The corner pair identifying this border, as used in closed-edge sets.
    pub fn key(&self) -> EdgeKey {
        self.key
    }

    /// The full polyline from one corner to the other, including any border points in between.
    pub fn points(&self) -> &[Position] {
        &self.points
    }

    /// The point halfway along the polyline, measured by Euclidean length.
    pub fn label_point(&self) -> Position {
        self.label
    }

    /// The cells on the other side of this border.
    pub fn cells(&self) -> &IndexSet<CellLocation> {
        &self.cells
    }
}

struct Trace {
    keys: Vec<PointKey>,
    edges: Vec<EdgeKey>,
}

struct DeadEnd {
    stuck_at: PointKey,
    steps: usize,
}

fn walk(geometry: &RawGeometry, corner: PointKey, first: EdgeKey) -> Result<Trace, DeadEnd> {
    let mut keys = vec![corner];
    let mut edges = vec![first];
    let mut previous = first;
    let mut current = first.other(corner);
    // a border chain visits every point at most once
    let limit = geometry.points.len();

    loop {
        keys.push(current);
        if geometry.kind_of(current) != Some(PointKind::Border) {
            return Ok(Trace { keys, edges });
        }
        if edges.len() > limit {
            return Err(DeadEnd { stuck_at: current, steps: edges.len() });
        }

        match geometry.incident(current).find(|edge| **edge != previous) {
            None => return Err(DeadEnd { stuck_at: current, steps: edges.len() }),
            Some(next) => {
                edges.push(*next);
                previous = *next;
                current = next.other(current);
            }
        }
    }
}

pub(crate) fn label_point(points: &[Position]) -> Position {
    let total: f64 = points.iter().tuple_windows::<(_, _)>().map(|(a, b)| a.distance(*b)).sum();
    let mut remaining = total / 2.0;

    for (a, b) in points.iter().tuple_windows::<(_, _)>() {
        let length = a.distance(*b);
        if length > 0.0 && length >= remaining {
            return a.lerp(*b, remaining / length);
        }
        remaining -= length;
    }

    points.first().copied().unwrap_or_default()
}

/// Trace every border starting at a corner, storing the result on each cell along it.
///
/// Returns the distinct corner pairs that were successfully traced, in discovery order.
pub(crate) fn trace_borders<W: Wrap>(
    geometry: &RawGeometry,
    wrap: &W,
    cells: &mut Array2<CellTopology>,
    strict: bool,
) -> Result<Vec<EdgeKey>, TopologyError> {
    let mut traced: IndexSet<EdgeKey> = IndexSet::new();
    // raw edges already covered by a successful trace; the walk from the far corner is skipped
    let mut walked: HashSet<EdgeKey> = HashSet::new();

    let corners = geometry.points.values()
        .filter(|point| point.kind == PointKind::Corner)
        .map(|point| point.key)
        .collect_vec();

    for corner in corners {
        for first in geometry.incident(corner) {
            if walked.contains(first) {
                continue;
            }
            let trace = match walk(geometry, corner, *first) {
                Ok(trace) => trace,
                Err(DeadEnd { stuck_at, steps }) => {
                    let from = geometry.position_of(corner);
                    let stuck_at = geometry.position_of(stuck_at);
                    if strict {
                        return Err(TopologyError::UnterminatedBorder { from, stuck_at, steps });
                    }
                    warn!(?from, ?stuck_at, steps, "border chain does not reach a corner; omitting it");
                    continue;
                }
            };

            let (Some(start), Some(end)) = (trace.keys.first(), trace.keys.last()) else {
                continue;
            };
            let key = EdgeKey::new(*start, *end);
            traced.insert(key);
            walked.extend(trace.edges.iter().copied());

            let mut points = Vec::with_capacity(trace.keys.len());
            for point in &trace.keys {
                let position = geometry.position_of(*point);
                points.push(match points.last() {
                    Some(previous) => wrap.normalize_near(position, *previous),
                    None => position,
                });
            }
            let label = label_point(&points);

            let along: IndexSet<CellLocation> = trace.edges.iter()
                .flat_map(|edge| geometry.cells_of(*edge))
                .copied()
                .collect();

            for cell in &along {
                let Some(topology) = cells.get_mut(cell.as_index()) else {
                    continue;
                };
                // several polylines may join the same corner pair, e.g. both sides of a lens-shaped cell
                topology.borders.entry(key).or_default().push(BorderSegment {
                    key,
                    points: points.clone(),
                    label,
                    cells: along.iter().filter(|other| *other != cell).copied().collect(),
                });
            }
        }
    }

    Ok(traced.into_iter().collect())
}
