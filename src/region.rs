use std::collections::{HashSet, VecDeque};

use ndarray::Array2;

use crate::border::EdgeKey;
use crate::location::CellLocation;
use crate::topology::GridTopology;
use crate::wrap::Wrap;

/// A partition of every cell of a grid into regions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Regions {
    regions: Vec<Vec<CellLocation>>,
    lookup: Array2<usize>,
}

impl Regions {
    /// The regions, ordered by their first cell in scan order.
    pub fn regions(&self) -> &[Vec<CellLocation>] {
        &self.regions
    }

    /// Index into [`regions`](Self::regions) of the region containing `location`.
    pub fn region_of(&self, location: CellLocation) -> Option<usize> {
        self.lookup.get(location.as_index()).copied()
    }

    /// The region containing `location`.
    pub fn region_containing(&self, location: CellLocation) -> Option<&[CellLocation]> {
        self.region_of(location)
            .and_then(|index| self.regions.get(index))
            .map(Vec::as_slice)
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether there are no regions. Never true for a built grid.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl<W: Wrap> GridTopology<W> {
    fn is_walled_off(&self, from: CellLocation, to: CellLocation, closed: &HashSet<EdgeKey>) -> bool {
        self.cell(from)
            .is_some_and(|cell| cell.borders_with(to).any(|segment| closed.contains(&segment.key)))
    }

    /// The region containing `start`: every cell reachable from it without crossing a `closed` border.
    ///
    /// Cells appear in the order the flood fill reached them, beginning with `start`.
    /// Neighbors sharing no traced border, such as declared extra neighbors, are always reachable.
    /// Empty if `start` is outside the grid.
    pub fn region_at(&self, closed: &HashSet<EdgeKey>, start: CellLocation) -> Vec<CellLocation> {
        if self.cell(start).is_none() {
            return Vec::new();
        }

        let mut region = vec![start];
        let mut seen = HashSet::from([start]);
        let mut frontier = VecDeque::from([start]);

        while let Some(current) = frontier.pop_front() {
            for neighbor in self.neighbors(current) {
                if seen.contains(neighbor) || self.is_walled_off(current, *neighbor, closed) {
                    continue;
                }
                seen.insert(*neighbor);
                region.push(*neighbor);
                frontier.push_back(*neighbor);
            }
        }

        region
    }

    /// Partition the whole grid by `closed` borders.
    ///
    /// Regions are grown from the first unassigned cell in scan order until every cell belongs to one.
    pub fn all_regions(&self, closed: &HashSet<EdgeKey>) -> Regions {
        let mut lookup = Array2::from_elem(self.cells.raw_dim(), usize::MAX);
        let mut regions = Vec::new();

        for (index, cell) in self.cells.indexed_iter() {
            if lookup[index] != usize::MAX {
                continue;
            }
            let region = self.region_at(closed, cell.location);
            for member in &region {
                lookup[member.as_index()] = regions.len();
            }
            regions.push(region);
        }

        Regions { regions, lookup }
    }
}
