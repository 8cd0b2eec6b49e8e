use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};

use crate::border::EdgeKey;
use crate::location::{Line, PointKey, Position};
use crate::point::PointKind;
use crate::topology::GridTopology;
use crate::wrap::Wrap;

/// A maximal run of connected segments, assembled from independently drawn lines.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineGroup {
    /// Segments in walk order.
    pub lines: Vec<Line>,
    /// Points in walk order. A loop does not repeat its first point at the end.
    pub points: Vec<Position>,
    /// The walk started at a point with exactly two connections and came back to it.
    pub is_loop: bool,
    /// The walk started at a point with more than two connections.
    pub is_branching: bool,
}

impl<W: Wrap> GridTopology<W> {
    fn is_center(&self, key: PointKey) -> bool {
        self.points.get(&key).is_some_and(|point| point.kind == PointKind::Center)
    }

    /// Group `lines` running between cell centers into paths and loops.
    ///
    /// Lines with an end that is not a center point are ignored.
    /// Walks start at branch points first, then at path ends, then anywhere; ties go to the point seen first in `lines`.
    pub fn merged_line_groups(&self, lines: &[Line]) -> Vec<LineGroup> {
        let mut connections: IndexMap<PointKey, IndexSet<PointKey>> = IndexMap::new();
        let mut positions: IndexMap<PointKey, Position> = IndexMap::new();

        for line in lines {
            let (a, b) = (self.wrap.key(line.start), self.wrap.key(line.end));
            if a == b || !self.is_center(a) || !self.is_center(b) {
                continue;
            }
            connections.entry(a).or_default().insert(b);
            connections.entry(b).or_default().insert(a);
            positions.entry(a).or_insert(line.start);
            positions.entry(b).or_insert(line.end);
        }

        let mut consumed: HashSet<EdgeKey> = HashSet::new();
        let mut visited: HashSet<PointKey> = HashSet::new();
        let mut groups = Vec::new();

        let has_unconsumed = |point: &PointKey, consumed: &HashSet<EdgeKey>| {
            connections.get(point).is_some_and(|others| {
                others.iter().any(|other| !consumed.contains(&EdgeKey::new(*point, *other)))
            })
        };

        loop {
            let pick = |degree: fn(usize) -> bool, consumed: &HashSet<EdgeKey>| {
                connections.iter()
                    .find(|(point, others)| degree(others.len()) && has_unconsumed(*point, consumed))
                    .map(|(point, _)| *point)
            };
            let Some(start) = pick(|degree| degree > 2, &consumed)
                .or_else(|| pick(|degree| degree == 1, &consumed))
                .or_else(|| pick(|_| true, &consumed))
            else {
                break;
            };

            let start_degree = connections.get(&start).map_or(0, IndexSet::len);
            let mut walk = vec![start];
            visited.insert(start);
            let mut current = start;

            loop {
                let next = connections.get(&current).and_then(|others| {
                    others.iter().find(|other| !consumed.contains(&EdgeKey::new(current, **other))).copied()
                });
                let Some(next) = next else {
                    break;
                };

                consumed.insert(EdgeKey::new(current, next));
                walk.push(next);
                current = next;

                let is_branch = connections.get(&next).map_or(0, IndexSet::len) > 2;
                if !visited.insert(next) || is_branch {
                    break;
                }
            }

            let is_loop = start_degree == 2 && walk.len() > 2 && walk.last() == Some(&start);
            groups.push(self.line_group(&walk, &positions, is_loop, start_degree > 2));
        }

        groups
    }

    fn line_group(
        &self,
        walk: &[PointKey],
        positions: &IndexMap<PointKey, Position>,
        is_loop: bool,
        is_branching: bool,
    ) -> LineGroup {
        let mut points: Vec<Position> = Vec::with_capacity(walk.len());
        for key in walk {
            let position = positions.get(key).copied().unwrap_or_default();
            points.push(match points.last() {
                Some(previous) => self.wrap.normalize_near(position, *previous),
                None => self.wrap.normalize(position),
            });
        }

        let lines = points.windows(2).map(|pair| Line::new(pair[0], pair[1])).collect();
        if is_loop {
            points.pop();
        }

        LineGroup { lines, points, is_loop, is_branching }
    }
}
