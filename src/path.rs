use std::collections::VecDeque;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::location::{Line, PointKey, Position};
use crate::topology::GridTopology;
use crate::wrap::Wrap;

impl<W: Wrap> GridTopology<W> {
    /// Snap `line` to real edges: the shortest chain of point-graph links from its start to its end.
    ///
    /// Each emitted point is normalized near the previous one, starting near `line.start`, so a path crossing a wraparound
    /// seam stays in the caller's coordinate space.
    /// Returns an empty path if either end is not an interned point, if they coincide, or if the end is unreachable.
    pub fn path(&self, line: Line) -> Vec<Line> {
        let (start, end) = (self.wrap.key(line.start), self.wrap.key(line.end));
        if start == end || !self.points.contains_key(&start) || !self.points.contains_key(&end) {
            return Vec::new();
        }

        let Some(keys) = self.shortest_point_chain(start, end) else {
            return Vec::new();
        };

        let mut positions: Vec<Position> = Vec::with_capacity(keys.len());
        for key in keys {
            let position = self.points.get(&key).map(|point| point.position).unwrap_or_default();
            let anchor = positions.last().copied().unwrap_or(line.start);
            positions.push(self.wrap.normalize_near(position, anchor));
        }

        positions.into_iter()
            .tuple_windows::<(_, _)>()
            .map(|(a, b)| Line::new(a, b))
            .collect_vec()
    }

    // breadth-first, neighbors in insertion order
    fn shortest_point_chain(&self, start: PointKey, end: PointKey) -> Option<Vec<PointKey>> {
        let mut predecessors: IndexMap<PointKey, Option<PointKey>> = IndexMap::new();
        predecessors.insert(start, None);
        let mut frontier = VecDeque::from([start]);

        while let Some(current) = frontier.pop_front() {
            if current == end {
                break;
            }
            for neighbor in self.point_graph.neighbors(current) {
                if !predecessors.contains_key(&neighbor) {
                    predecessors.insert(neighbor, Some(current));
                    frontier.push_back(neighbor);
                }
            }
        }

        if !predecessors.contains_key(&end) {
            return None;
        }

        let mut chain = vec![end];
        let mut current = end;
        while let Some(Some(previous)) = predecessors.get(&current) {
            chain.push(*previous);
            current = *previous;
        }
        chain.reverse();

        Some(chain)
    }
}
