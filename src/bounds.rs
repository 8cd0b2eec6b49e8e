use ndarray::Array2;

use crate::location::{Position, Rect};
use crate::topology::GridTopology;
use crate::wrap::Wrap;

/// A cell's bounds mapped into display space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformedBounds {
    /// Every loop, point by point.
    pub loops: Vec<Vec<Position>>,
    /// Bounding rect of the transformed corners of the interior rect.
    pub interior: Rect,
}

impl<W: Wrap> GridTopology<W> {
    /// Map every cell's bounds through `transform`. Indexed like the grid, `[(top, left)]`.
    ///
    /// The topology itself never depends on display transforms; this exists for callers placing content.
    pub fn transformed_bounds<F>(&self, transform: F) -> Array2<TransformedBounds>
    where
        F: Fn(Position) -> Position,
    {
        self.cells.map(|cell| {
            let bounds = cell.bounds();
            TransformedBounds {
                loops: bounds.loops.iter()
                    .map(|polygon| polygon.iter().map(|point| transform(*point)).collect())
                    .collect(),
                interior: Rect::bounding(bounds.interior.corners().map(&transform)).unwrap_or_default(),
            }
        })
    }
}

/// Transformed bounds cached together with the key they were computed for.
///
/// Callers that redraw often keep one of these and pass the identity of their current transform as `K`;
/// the bounds are recomputed only when the key changes.
#[derive(Clone, Debug)]
pub struct BoundsMemo<K> {
    cached: Option<(K, Array2<TransformedBounds>)>,
}

impl<K> Default for BoundsMemo<K> {
    fn default() -> Self {
        Self { cached: None }
    }
}

impl<K: PartialEq> BoundsMemo<K> {
    /// An empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bounds for `key`, computing them with `transform` unless they are already cached for an equal key.
    pub fn get_or_compute<W, F>(&mut self, key: K, topology: &GridTopology<W>, transform: F) -> &Array2<TransformedBounds>
    where
        W: Wrap,
        F: Fn(Position) -> Position,
    {
        if !matches!(&self.cached, Some((cached_key, _)) if *cached_key == key) {
            self.cached = None;
        }

        let (_, bounds) = self.cached.get_or_insert_with(|| (key, topology.transformed_bounds(transform)));
        bounds
    }

    /// The key of the cached bounds, if any.
    pub fn key(&self) -> Option<&K> {
        self.cached.as_ref().map(|(key, _)| key)
    }

    /// Drop the cached bounds.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
