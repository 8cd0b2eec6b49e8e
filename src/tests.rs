#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashSet;
    use std::num::NonZero;

    use approx::assert_relative_eq;
    use tracing_subscriber::EnvFilter;

    use crate::builder::TopologyBuilder;
    use crate::error::{BuilderInvalidReason, TopologyError};
    use crate::location::{CellLocation, Line, Position, Rect};
    use crate::point::{PointKind, PointLink};
    use crate::topology::GridTopology;
    use crate::wrap::{Planar, Wraparound};
    use crate::bounds::BoundsMemo;
    use crate::border::EdgeKey;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn dims(rows: usize, columns: usize) -> (NonZero<usize>, NonZero<usize>) {
        (NonZero::new(rows).unwrap(), NonZero::new(columns).unwrap())
    }

    fn plain(rows: usize, columns: usize) -> GridTopology<Planar> {
        init_tracing();
        TopologyBuilder::with_dims(dims(rows, columns)).build().unwrap()
    }

    fn at(top: f64, left: f64) -> Position {
        Position::new(top, left)
    }

    fn cell(top: usize, left: usize) -> CellLocation {
        CellLocation::new(top, left)
    }

    fn center(location: CellLocation) -> Position {
        at(location.top as f64 + 0.5, location.left as f64 + 0.5)
    }

    // the four walls inside a 2x2 grid
    fn inner_walls(topology: &GridTopology<Planar>) -> HashSet<EdgeKey> {
        HashSet::from([
            topology.edge_key(at(0.0, 1.0), at(1.0, 1.0)),
            topology.edge_key(at(1.0, 1.0), at(2.0, 1.0)),
            topology.edge_key(at(1.0, 0.0), at(1.0, 1.0)),
            topology.edge_key(at(1.0, 1.0), at(1.0, 2.0)),
        ])
    }

    // two custom cells side by side, sharing an edge with a midpoint at (0.5, 1)
    fn notched_pair() -> TopologyBuilder<Planar> {
        let mut builder = TopologyBuilder::with_dims(dims(1, 2));
        builder
            .custom_bounds(
                cell(0, 0),
                vec![vec![at(0.0, 0.0), at(0.0, 1.0), at(0.5, 1.0), at(1.0, 1.0), at(1.0, 0.0)]],
                Rect::of_cell(cell(0, 0)),
            )
            .custom_bounds(
                cell(0, 1),
                vec![vec![at(0.0, 1.0), at(0.0, 2.0), at(1.0, 2.0), at(1.0, 1.0), at(0.5, 1.0), at(0.0, 1.0)]],
                Rect::of_cell(cell(0, 1)),
            );
        builder
    }

    #[test]
    fn plain_grid_points_are_corners_or_centers() {
        let topology = plain(3, 3);

        let corners = topology.points().filter(|point| point.kind() == PointKind::Corner).count();
        let centers = topology.points().filter(|point| point.kind() == PointKind::Center).count();
        assert_eq!(corners, 16);
        assert_eq!(centers, 9);
        assert_eq!(topology.points().count(), 25);
    }

    #[test]
    fn shared_vertices_are_interned_once() {
        let topology = plain(2, 2);

        let middle = topology.point_info(at(1.0, 1.0)).unwrap();
        assert_eq!(middle.cells().len(), 4);
        assert_eq!(middle.kind(), PointKind::Corner);

        let nudged = topology.point_info(at(1.0 + 1e-9, 1.0)).unwrap();
        assert_eq!(nudged.key(), middle.key());

        assert!(topology.point_info(at(0.25, 0.25)).is_none());
    }

    #[test]
    fn plain_neighbors() {
        let topology = plain(3, 3);

        let mut middle = topology.neighbors(cell(1, 1)).to_vec();
        middle.sort();
        assert_eq!(middle, vec![cell(0, 1), cell(1, 0), cell(1, 2), cell(2, 1)]);
        assert_eq!(topology.neighbors(cell(0, 0)).len(), 2);
        assert!(!topology.are_neighbors(cell(0, 0), cell(1, 1)));
        assert!(topology.neighbors(cell(7, 7)).is_empty());

        for a in topology.cells() {
            for b in a.neighbors() {
                assert!(topology.neighbors(*b).contains(&a.location()));
            }
        }
    }

    #[test]
    fn center_points_link_like_their_cells() {
        let topology = plain(2, 2);

        let info = topology.point_info(center(cell(0, 0))).unwrap();
        assert_eq!(info.kind(), PointKind::Center);
        assert_eq!(info.cells().len(), 1);
        assert_eq!(info.neighbors().len(), 2);
        assert_eq!(topology.point_link(center(cell(0, 0)), center(cell(0, 1))), Some(PointLink::Center));
        assert_eq!(topology.point_link(center(cell(0, 0)), center(cell(1, 1))), None);
    }

    #[test]
    fn path_between_adjacent_centers() {
        let topology = plain(3, 3);

        let path = topology.path(Line::new(center(cell(0, 0)), center(cell(0, 1))));
        assert_eq!(path, vec![Line::new(at(0.5, 0.5), at(0.5, 1.5))]);
    }

    #[test]
    fn path_along_edges() {
        let topology = plain(2, 2);

        let path = topology.path(Line::new(at(0.0, 0.0), at(0.0, 2.0)));
        assert_eq!(path, vec![
            Line::new(at(0.0, 0.0), at(0.0, 1.0)),
            Line::new(at(0.0, 1.0), at(0.0, 2.0)),
        ]);
    }

    #[test]
    fn path_is_deterministic() {
        let topology = plain(4, 4);

        let line = Line::new(at(0.0, 0.0), at(3.0, 4.0));
        let first = topology.path(line);
        assert_eq!(first.len(), 7);
        for _ in 0..5 {
            assert_eq!(topology.path(line), first);
        }
    }

    #[test]
    fn path_unreachable_or_unknown() {
        let topology = plain(2, 2);

        // centers and corners live in separate components
        assert!(topology.path(Line::new(center(cell(0, 0)), at(0.0, 0.0))).is_empty());
        assert!(topology.path(Line::new(at(0.0, 0.0), at(0.3, 0.3))).is_empty());
        assert!(topology.path(Line::new(at(1.0, 1.0), at(1.0, 1.0))).is_empty());
    }

    #[test]
    fn open_grid_is_one_region() {
        let topology = plain(2, 2);

        let regions = topology.all_regions(&HashSet::new());
        assert_eq!(regions.len(), 1);
        assert_eq!(regions.regions()[0].len(), 4);
        assert_eq!(regions.region_of(cell(1, 1)), Some(0));
    }

    #[test]
    fn closing_every_inner_wall_isolates_cells() {
        let topology = plain(2, 2);

        let regions = topology.all_regions(&inner_walls(&topology));
        assert_eq!(regions.len(), 4);
        assert!(regions.regions().iter().all(|region| region.len() == 1));
        assert_eq!(regions.regions()[0], vec![cell(0, 0)]);
        assert_eq!(regions.region_of(cell(1, 0)), Some(2));
        assert_eq!(regions.region_containing(cell(0, 1)), Some(&[cell(0, 1)][..]));
    }

    #[test]
    fn regions_split_along_closed_walls() {
        let topology = plain(2, 2);

        let one_wall = HashSet::from([topology.edge_key(at(0.0, 1.0), at(1.0, 1.0))]);
        assert_eq!(topology.all_regions(&one_wall).len(), 1);

        let column_wall = HashSet::from([
            topology.edge_key(at(0.0, 1.0), at(1.0, 1.0)),
            topology.edge_key(at(1.0, 1.0), at(2.0, 1.0)),
        ]);
        let regions = topology.all_regions(&column_wall);
        assert_eq!(regions.regions(), &[vec![cell(0, 0), cell(1, 0)], vec![cell(0, 1), cell(1, 1)]]);

        let region = topology.region_at(&column_wall, cell(1, 1));
        assert_eq!(region, vec![cell(1, 1), cell(0, 1)]);
        assert!(topology.region_at(&column_wall, cell(9, 9)).is_empty());
    }

    #[test]
    fn merges_a_straight_path() {
        let topology = plain(1, 4);

        let a = center(cell(0, 0));
        let b = center(cell(0, 1));
        let c = center(cell(0, 2));
        let d = center(cell(0, 3));
        let groups = topology.merged_line_groups(&[Line::new(a, b), Line::new(b, c), Line::new(c, d)]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].points, vec![a, b, c, d]);
        assert_eq!(groups[0].lines.len(), 3);
        assert!(!groups[0].is_loop);
        assert!(!groups[0].is_branching);
    }

    #[test]
    fn merges_out_of_order_segments_from_a_path_end() {
        let topology = plain(1, 4);

        let a = center(cell(0, 0));
        let b = center(cell(0, 1));
        let c = center(cell(0, 2));
        let d = center(cell(0, 3));
        let groups = topology.merged_line_groups(&[Line::new(c, b), Line::new(d, c), Line::new(a, b)]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].points, vec![d, c, b, a]);
    }

    #[test]
    fn merges_a_loop() {
        let topology = plain(2, 2);

        let a = center(cell(0, 0));
        let b = center(cell(0, 1));
        let c = center(cell(1, 1));
        let d = center(cell(1, 0));
        let groups = topology.merged_line_groups(&[
            Line::new(a, b),
            Line::new(b, c),
            Line::new(c, d),
            Line::new(d, a),
        ]);

        assert_eq!(groups.len(), 1);
        assert!(groups[0].is_loop);
        assert!(!groups[0].is_branching);
        assert_eq!(groups[0].points, vec![a, b, c, d]);
        assert_eq!(groups[0].lines.len(), 4);
        assert_eq!(groups[0].lines[3], Line::new(d, a));
    }

    #[test]
    fn merges_branches_from_the_branch_point() {
        let topology = plain(3, 3);

        let hub = center(cell(1, 1));
        let arms = [center(cell(0, 1)), center(cell(1, 0)), center(cell(1, 2))];
        let lines = arms.iter().map(|arm| Line::new(*arm, hub)).collect::<Vec<_>>();
        let groups = topology.merged_line_groups(&lines);

        assert_eq!(groups.len(), 3);
        for (group, arm) in groups.iter().zip(arms) {
            assert!(group.is_branching);
            assert!(!group.is_loop);
            assert_eq!(group.points, vec![hub, arm]);
        }
    }

    #[test]
    fn merging_ignores_lines_off_centers() {
        let topology = plain(2, 2);

        let groups = topology.merged_line_groups(&[
            Line::new(at(0.0, 0.0), at(0.0, 1.0)),
            Line::new(center(cell(0, 0)), at(1.0, 1.0)),
        ]);
        assert!(groups.is_empty());
    }

    #[test]
    fn plain_borders() {
        let topology = plain(2, 2);

        let between = topology.borders_between(cell(0, 0), cell(0, 1));
        assert_eq!(between.len(), 1);
        assert_eq!(between[0].points().len(), 2);
        assert_relative_eq!(between[0].label_point().top, 0.5);
        assert_relative_eq!(between[0].label_point().left, 1.0);
        assert_eq!(between[0].key(), topology.edge_key(at(1.0, 1.0), at(0.0, 1.0)));

        assert_eq!(topology.segments().len(), 12);
        assert!(topology.cell(cell(0, 0)).unwrap().borders().values().flatten().any(|segment| segment.cells().is_empty()));
    }

    #[test]
    fn custom_cells_trace_through_border_points() {
        init_tracing();
        let topology = notched_pair().build().unwrap();

        assert_eq!(topology.point_info(at(0.5, 1.0)).unwrap().kind(), PointKind::Border);
        assert_eq!(topology.point_info(at(0.0, 1.0)).unwrap().kind(), PointKind::Corner);
        assert_eq!(topology.point_info(at(1.0, 1.0)).unwrap().kind(), PointKind::Corner);
        assert_eq!(topology.point_info(at(0.0, 0.0)).unwrap().kind(), PointKind::Border);

        // the closing point repeated in the declaration is dropped
        assert_eq!(topology.cell(cell(0, 1)).unwrap().bounds().loops[0].len(), 5);
        assert!(topology.cell(cell(0, 1)).unwrap().is_custom());

        assert!(topology.are_neighbors(cell(0, 0), cell(0, 1)));
        let between = topology.borders_between(cell(0, 0), cell(0, 1));
        assert_eq!(between.len(), 1);
        assert_eq!(between[0].points().len(), 3);
        assert_relative_eq!(between[0].label_point().top, 0.5);
        assert_relative_eq!(between[0].label_point().left, 1.0);
        assert_eq!(topology.borders_between(cell(0, 1), cell(0, 0))[0].key(), between[0].key());

        assert_eq!(topology.point_link(at(0.0, 1.0), at(1.0, 1.0)), Some(PointLink::Segment));
        assert_eq!(
            topology.path(Line::new(at(0.0, 1.0), at(1.0, 1.0))),
            vec![Line::new(at(0.0, 1.0), at(1.0, 1.0))],
        );

        let wall = HashSet::from([between[0].key()]);
        assert_eq!(topology.all_regions(&wall).len(), 2);
        assert_eq!(topology.all_regions(&HashSet::new()).len(), 1);
    }

    // a lens-shaped middle cell; both of its sides run from corner (0, 1) to corner (1, 1), as do the outer walls
    fn lens() -> TopologyBuilder<Planar> {
        let mut builder = TopologyBuilder::with_dims(dims(1, 3));
        builder
            .custom_bounds(
                cell(0, 0),
                vec![vec![at(0.0, 1.0), at(0.0, 0.0), at(1.0, 0.0), at(1.0, 1.0), at(0.5, 0.9)]],
                Rect::of_cell(cell(0, 0)),
            )
            .custom_bounds(
                cell(0, 1),
                vec![vec![at(0.0, 1.0), at(0.5, 0.9), at(1.0, 1.0), at(0.5, 1.1)]],
                Rect::new(0.25, 0.95, 0.1, 0.5),
            )
            .custom_bounds(
                cell(0, 2),
                vec![vec![at(0.0, 1.0), at(0.5, 1.1), at(1.0, 1.0), at(1.0, 3.0), at(0.0, 3.0)]],
                Rect::of_cell(cell(0, 2)),
            );
        builder
    }

    #[test]
    fn borders_sharing_a_corner_pair_are_all_kept() {
        init_tracing();
        let topology = lens().build().unwrap();
        let (left, middle, right) = (cell(0, 0), cell(0, 1), cell(0, 2));
        let key = topology.edge_key(at(0.0, 1.0), at(1.0, 1.0));

        assert_eq!(topology.point_info(at(0.5, 0.9)).unwrap().kind(), PointKind::Border);
        assert_eq!(topology.point_info(at(0.5, 1.1)).unwrap().kind(), PointKind::Border);
        assert!(topology.are_neighbors(left, middle));
        assert!(topology.are_neighbors(middle, right));
        assert!(!topology.are_neighbors(left, right));

        assert_eq!(topology.cell(middle).unwrap().borders()[&key].len(), 2);
        assert_eq!(topology.borders_between(middle, left).len(), 1);
        assert_eq!(topology.borders_between(middle, right).len(), 1);
        assert_eq!(topology.borders_between(right, middle)[0].key(), key);
        assert_relative_eq!(topology.borders_between(right, middle)[0].label_point().left, 1.1, epsilon = 1e-9);
        assert_eq!(topology.segments().len(), 4);
        assert!(topology.segments().iter().all(|segment| segment.key() == key));
    }

    #[test]
    fn regions_do_not_depend_on_the_starting_cell() {
        init_tracing();
        let topology = lens().build().unwrap();
        let closed = HashSet::from([topology.edge_key(at(0.0, 1.0), at(1.0, 1.0))]);

        for location in [cell(0, 0), cell(0, 1), cell(0, 2)] {
            assert_eq!(topology.region_at(&closed, location), vec![location]);
        }
        assert_eq!(topology.all_regions(&closed).len(), 3);
        assert_eq!(topology.region_at(&HashSet::new(), cell(0, 2)).len(), 3);
        assert_eq!(topology.all_regions(&HashSet::new()).len(), 1);
    }

    #[test]
    fn crossing_borders_with_one_label_stay_distinct() {
        init_tracing();
        // two crossing polylines from (0, 1) to (1, 1), both halfway at (0.5, 1) like the plain edge beside them
        let topology = TopologyBuilder::with_dims(dims(1, 2))
            .custom_bounds(
                cell(0, 1),
                vec![vec![at(0.0, 1.0), at(0.2, 0.8), at(0.8, 1.2), at(1.0, 1.0), at(0.8, 0.8), at(0.2, 1.2)]],
                Rect::of_cell(cell(0, 1)),
            )
            .build()
            .unwrap();
        let key = topology.edge_key(at(0.0, 1.0), at(1.0, 1.0));

        let sharing = topology.segments().into_iter().filter(|segment| segment.key() == key).collect::<Vec<_>>();
        assert_eq!(sharing.len(), 3);
        for segment in &sharing {
            assert_relative_eq!(segment.label_point().top, 0.5, epsilon = 1e-9);
            assert_relative_eq!(segment.label_point().left, 1.0, epsilon = 1e-9);
        }
        assert_eq!(topology.segments().len(), 6);
    }

    #[test]
    fn label_point_sits_halfway_along_the_polyline() {
        let label = crate::border::label_point(&[at(0.0, 0.0), at(0.0, 3.0), at(1.0, 3.0)]);
        assert_relative_eq!(label.top, 0.0);
        assert_relative_eq!(label.left, 2.0);
    }

    fn spurred() -> TopologyBuilder<Planar> {
        let mut builder = TopologyBuilder::with_dims(dims(1, 1));
        builder.custom_bounds(
            cell(0, 0),
            vec![
                vec![at(0.0, 0.0), at(0.0, 1.0), at(1.0, 1.0), at(1.0, 0.0)],
                vec![at(0.0, 1.0), at(0.3, 0.6)],
            ],
            Rect::of_cell(cell(0, 0)),
        );
        builder
    }

    #[test]
    fn dead_end_borders_are_skipped() {
        init_tracing();
        let topology = spurred().build().unwrap();

        assert_eq!(topology.point_info(at(0.0, 1.0)).unwrap().kind(), PointKind::Corner);
        assert_eq!(topology.point_info(at(0.3, 0.6)).unwrap().kind(), PointKind::Border);
        // only the loop around the cell survives
        assert_eq!(topology.segments().len(), 1);
        assert_eq!(topology.segments()[0].points().len(), 5);
    }

    #[test]
    fn dead_end_borders_fail_strict_builds() {
        init_tracing();
        let result = spurred().strict(true).build();

        match result {
            Err(TopologyError::UnterminatedBorder { from, stuck_at, steps }) => {
                assert_eq!(from, at(0.0, 1.0));
                assert_eq!(stuck_at, at(0.3, 0.6));
                assert_eq!(steps, 1);
            }
            other => panic!("expected an unterminated border, got {other:?}"),
        }
    }

    #[test]
    fn custom_bounds_out_of_bounds() {
        let result = TopologyBuilder::with_dims(dims(2, 2))
            .custom_bounds(cell(5, 5), vec![], Rect::default())
            .custom_bounds(cell(0, 0), vec![], Rect::default())
            .build();

        match result {
            Err(TopologyError::InvalidBuilder { reasons }) => {
                assert_eq!(reasons, vec![BuilderInvalidReason::FeatureOutOfBounds(cell(5, 5))]);
            }
            other => panic!("expected an invalid builder, got {other:?}"),
        }
    }

    #[test]
    fn empty_loops_yield_cells_without_borders() {
        init_tracing();
        let topology = TopologyBuilder::with_dims(dims(1, 2))
            .custom_bounds(cell(0, 1), vec![vec![]], Rect::of_cell(cell(0, 1)))
            .build()
            .unwrap();

        let empty = topology.cell(cell(0, 1)).unwrap();
        assert!(empty.borders().is_empty());
        assert!(empty.neighbors().is_empty());
        assert_eq!(topology.all_regions(&HashSet::new()).len(), 2);
    }

    #[test]
    fn torus_neighbors_wrap_around() {
        init_tracing();
        let topology = TopologyBuilder::new(dims(3, 3), Wraparound::torus(3, 3)).build().unwrap();

        assert_eq!(topology.points().count(), 18);
        for location in topology.cells() {
            assert_eq!(location.neighbors().len(), 4);
        }
        assert!(topology.are_neighbors(cell(0, 0), cell(2, 0)));
        assert!(topology.are_neighbors(cell(0, 0), cell(0, 2)));

        // the path leaves through the left seam and stays in the caller's coordinates
        let path = topology.path(Line::new(center(cell(0, 0)), center(cell(0, 2))));
        assert_eq!(path.len(), 1);
        assert_relative_eq!(path[0].end.top, 0.5);
        assert_relative_eq!(path[0].end.left, -0.5);
    }

    #[test]
    fn cylinder_wraps_horizontally_only() {
        init_tracing();
        let topology = TopologyBuilder::new(dims(3, 3), Wraparound::horizontal(3)).build().unwrap();

        let mut neighbors = topology.neighbors(cell(0, 0)).to_vec();
        neighbors.sort();
        assert_eq!(neighbors, vec![cell(0, 1), cell(0, 2), cell(1, 0)]);
        assert!(!topology.are_neighbors(cell(0, 0), cell(2, 0)));
    }

    #[test]
    fn planar_positions_ignore_the_anchor() {
        use crate::wrap::Wrap;

        assert_eq!(Planar.normalize_near(at(0.5, -0.5), at(10.0, 10.0)), at(0.5, -0.5));
        let wrapped = Wraparound::horizontal(3).normalize_near(at(0.5, 2.5), at(0.5, 0.5));
        assert_relative_eq!(wrapped.left, -0.5, epsilon = 1e-9);
    }

    #[test]
    fn extra_neighbors_ignore_walls() {
        init_tracing();
        let topology = TopologyBuilder::with_dims(dims(2, 2))
            .extra_neighbors(|location| match (location.top, location.left) {
                (0, 0) => vec![CellLocation::new(1, 1), CellLocation::new(5, 5), location],
                _ => vec![],
            })
            .build()
            .unwrap();

        assert!(topology.are_neighbors(cell(0, 0), cell(1, 1)));
        assert!(topology.neighbors(cell(1, 1)).contains(&cell(0, 0)));
        assert!(topology.borders_between(cell(0, 0), cell(1, 1)).is_empty());

        let regions = topology.all_regions(&inner_walls(&topology));
        assert_eq!(regions.len(), 3);
        assert_eq!(regions.region_of(cell(0, 0)), regions.region_of(cell(1, 1)));
    }

    #[test]
    fn transformed_bounds_and_memo() {
        let topology = plain(2, 2);
        let calls = Cell::new(0);
        let scale = |factor: f64| {
            let calls = &calls;
            move |position: Position| {
                calls.set(calls.get() + 1);
                at(position.top * factor, position.left * factor)
            }
        };

        let bounds = topology.transformed_bounds(scale(10.0));
        let bottom_left = &bounds[(1, 0)];
        assert_eq!(bottom_left.interior, Rect::new(10.0, 0.0, 10.0, 10.0));
        assert_eq!(bottom_left.loops[0][2], at(20.0, 10.0));

        let mut memo = BoundsMemo::new();
        calls.set(0);
        memo.get_or_compute(10, &topology, scale(10.0));
        let computed = calls.get();
        assert!(computed > 0);
        memo.get_or_compute(10, &topology, scale(10.0));
        assert_eq!(calls.get(), computed);
        assert_eq!(memo.get_or_compute(20, &topology, scale(20.0))[(0, 0)].interior, Rect::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(calls.get(), computed * 2);
        assert_eq!(memo.key(), Some(&20));

        memo.invalidate();
        assert_eq!(memo.key(), None);
    }

    #[test]
    fn topology_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GridTopology<Planar>>();
        assert_send_sync::<GridTopology<Wraparound>>();
    }
}
