//! JavaScript bindings for hosting the topology in a browser UI.
//!
//! Positions cross the boundary as flat `f64` arrays of `(top, left)` pairs.

use std::collections::HashSet;
use std::num::NonZero;

use itertools::Itertools;
use js_sys::{Array, Float64Array};
use wasm_bindgen::prelude::*;

use crate::border::EdgeKey;
use crate::builder::TopologyBuilder;
use crate::location::{Line, Position};
use crate::topology::GridTopology;
use crate::wrap::Planar;

/// A flat grid of plain square cells.
#[wasm_bindgen]
pub struct PlainGrid {
    topology: GridTopology<Planar>,
}

fn lines_from_flat(flat: &[f64]) -> Vec<Line> {
    flat.chunks_exact(4)
        .map(|quad| Line::new(Position::new(quad[0], quad[1]), Position::new(quad[2], quad[3])))
        .collect_vec()
}

fn flatten(points: impl IntoIterator<Item = Position>) -> Float64Array {
    let flat = points.into_iter().flat_map(|point| [point.top, point.left]).collect_vec();
    Float64Array::from(flat.as_slice())
}

#[wasm_bindgen]
impl PlainGrid {
    /// Build a `rows` by `columns` grid.
    #[wasm_bindgen(constructor)]
    pub fn new(rows: usize, columns: usize) -> Result<PlainGrid, JsError> {
        let dims = NonZero::new(rows)
            .zip(NonZero::new(columns))
            .ok_or_else(|| JsError::new("grid dimensions must be non-zero"))?;
        let topology = TopologyBuilder::with_dims(dims).build()?;

        Ok(Self { topology })
    }

    /// Region index of every cell in scan order, given closed borders as `[top1, left1, top2, left2, ...]`.
    #[wasm_bindgen(js_name = regionIndices)]
    pub fn region_indices(&self, closed: &[f64]) -> Vec<u32> {
        let closed: HashSet<EdgeKey> = lines_from_flat(closed).into_iter()
            .map(|line| self.topology.edge_key(line.start, line.end))
            .collect();
        let regions = self.topology.all_regions(&closed);

        self.topology.cells()
            .map(|cell| regions.region_of(cell.location()).map_or(u32::MAX, |index| index as u32))
            .collect()
    }

    /// Points of the path snapped from `(startTop, startLeft)` to `(endTop, endLeft)`; empty if there is none.
    #[wasm_bindgen(js_name = getPath)]
    pub fn path(&self, start_top: f64, start_left: f64, end_top: f64, end_left: f64) -> Float64Array {
        let path = self.topology.path(Line::new(
            Position::new(start_top, start_left),
            Position::new(end_top, end_left),
        ));
        let first = path.first().map(|line| line.start);

        flatten(first.into_iter().chain(path.iter().map(|line| line.end)))
    }

    /// Merge lines given as `[top1, left1, top2, left2, ...]`; one array of flat points per group.
    #[wasm_bindgen(js_name = mergedLineGroups)]
    pub fn merged_line_groups(&self, lines: &[f64]) -> Array {
        let groups = Array::new();
        for group in self.topology.merged_line_groups(&lines_from_flat(lines)) {
            groups.push(&flatten(group.points));
        }

        groups
    }
}
