//! End-to-end simplification scenarios.

mod common;

use std::f64::consts::PI;

use common::assert_valid;
use nalgebra::Point2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use trellis::prelude::*;

fn vertex_near(board: &Board, p: Point2<f64>) -> VertexId {
    board
        .vertex_ids()
        .min_by(|&a, &b| {
            let da = (board.position(a) - p).norm();
            let db = (board.position(b) - p).norm();
            da.total_cmp(&db)
        })
        .unwrap()
}

/// A regular hexagon cut into two pentagons by an edge between the
/// midpoints of two opposite sides.
fn subdivided_hexagon() -> (Board, Point2<f64>, Point2<f64>) {
    let c: Vec<Point2<f64>> = (0..6)
        .map(|k| {
            let angle = PI / 3.0 * k as f64;
            Point2::new(angle.cos(), angle.sin())
        })
        .collect();
    let m1 = nalgebra::center(&c[0], &c[1]);
    let m2 = nalgebra::center(&c[3], &c[4]);

    let polygons = vec![vec![m1, c[1], c[2], c[3], m2], vec![m2, c[4], c[5], c[0], m1]];
    let board = polygon_board(&polygons, &PolygonBoardOptions::default()).unwrap();
    (board, m1, m2)
}

#[test]
fn test_two_by_two_grid_collapses_to_one_face() {
    let board = square_board(2, 2).unwrap();
    assert_eq!(board.num_vertices(), 9);
    assert_eq!(board.num_edges(), 12);
    assert_eq!(board.num_faces(), 4);
    assert_eq!(board.outer_boundary().len(), 8);
    assert!(board.inner_boundaries().is_empty());

    // Every interior edge dead, the border drawn as line
    let mut layout = LayoutBoard::new(
        &board,
        |e| if board.edge(e).is_boundary() { EdgeState::Black } else { EdgeState::Red },
        |_| None,
    );
    let report = layout.collapse_dead_zones().unwrap();
    assert_eq!(report.interior, 1);
    assert_eq!(report.exterior, 0);

    let result = layout.board();
    assert_eq!(result.num_faces(), 1);
    assert_eq!(result.num_vertices(), 8);
    assert_eq!(result.num_edges(), 8);
    let (_, face) = result.faces().next().unwrap();
    assert_eq!(face.half_edges.len(), 8);
    assert!((result.signed_area() - 4.0).abs() < 1e-12);

    // Nothing interior survives
    assert!(result.edges().all(|(_, e)| e.is_boundary()));
    assert!(result.vertex_ids().all(|v| result.is_boundary_vertex(v)));
    assert_valid("collapsed 2x2", result);
}

#[test]
fn test_subdivided_hexagon_loses_its_midpoints() {
    let (board, m1, m2) = subdivided_hexagon();
    assert_eq!(board.num_vertices(), 8);
    assert_eq!(board.num_edges(), 9);
    assert_eq!(board.num_faces(), 2);
    let area = board.signed_area();

    let (a, b) = (vertex_near(&board, m1), vertex_near(&board, m2));
    let subdivision = board.half_edge_between(a, b).map(|he| board.half_edge(he).edge).unwrap();

    let mut layout = LayoutBoard::new(
        &board,
        |e| if e == subdivision { EdgeState::Red } else { EdgeState::White },
        |_| None,
    );
    let report = layout.collapse_dead_zones().unwrap();
    assert_eq!(report.interior, 1);
    assert_eq!(layout.board().num_faces(), 1);
    assert_eq!(layout.board().num_vertices(), 8);
    assert_eq!(layout.board().degree(a), 2);
    assert_eq!(layout.board().degree(b), 2);

    assert!(layout.merge_degree_two(a).unwrap());
    assert!(layout.merge_degree_two(b).unwrap());

    let result = layout.board();
    assert_eq!(result.num_vertices(), board.num_vertices() - 2);
    assert_eq!(result.num_faces(), 1);
    let (_, face) = result.faces().next().unwrap();
    assert_eq!(face.half_edges.len(), 6);
    assert_eq!(result.outer_boundary().len(), 6);
    assert!((result.signed_area() - area).abs() < 1e-9 * area);
    assert_valid("hexagon", result);
}

#[test]
fn test_dead_column_opens_to_the_exterior() {
    // Left column of a 3x3 grid is dead, including its border; the rest is line
    let board = square_board(3, 3).unwrap();
    let left_column = |e: EdgeId| {
        let edge = board.edge(e);
        let (s, t) = (board.vertex(edge.start).logical, board.vertex(edge.end).logical);
        s.x == 0 || t.x == 0
    };
    let mut layout = LayoutBoard::new(
        &board,
        |e| if left_column(e) { EdgeState::Red } else { EdgeState::Black },
        |_| None,
    );

    let report = layout.collapse_dead_zones().unwrap();
    assert_eq!(report.exterior, 1);
    assert_eq!(report.interior, 0);

    let result = layout.board();
    assert_eq!(result.num_faces(), 6);
    assert_eq!(result.num_vertices(), 12);
    assert_eq!(result.num_edges(), 17);
    assert_eq!(result.outer_boundary().len(), 10);
    assert!(result.inner_boundaries().is_empty());
    assert!((result.signed_area() - 6.0).abs() < 1e-12);
    assert!(result.find_vertex(LatticeCoord::new(0, 1)).is_none());
    assert_valid("opened column", result);
}

#[test]
fn test_clue_blocks_collapse_until_cleared() {
    let board = square_board(2, 2).unwrap();
    let corner = board.find_face(LatticeCoord::new(0, 0)).unwrap();
    let mut layout = LayoutBoard::new(
        &board,
        |e| if board.edge(e).is_boundary() { EdgeState::Black } else { EdgeState::Red },
        |f| if f == corner { Some(2) } else { None },
    );

    // The clue keeps the corner face and its edges alive
    let options = SimplifyOptions::default().with_clear_faces(false).with_merge_degree_two(false);
    layout.simplify(&options).unwrap();
    assert_eq!(layout.board().num_faces(), 2);
    assert_valid("partial", layout.board());

    // Every edge is decided, so clearing the clue frees the rest
    let report = layout.simplify(&options.with_clear_faces(true)).unwrap();
    assert_eq!(report.faces_cleared, 1);
    assert_eq!(layout.board().num_faces(), 1);
    assert_valid("cleared", layout.board());
}

#[test]
fn test_random_simplification_keeps_board_valid() {
    for seed in 0..12 {
        let mut rng = StdRng::seed_from_u64(seed);
        let board = square_board(6, 5).unwrap();

        let states: Vec<EdgeState> = board
            .edge_ids()
            .map(|e| {
                if board.edge(e).is_boundary() {
                    EdgeState::Black
                } else {
                    match rng.gen_range(0..5) {
                        0 => EdgeState::White,
                        1 => EdgeState::Black,
                        _ => EdgeState::Red,
                    }
                }
            })
            .collect();
        let values: Vec<Option<u32>> = board
            .face_ids()
            .map(|_| if rng.gen_bool(0.25) { Some(rng.gen_range(0..4)) } else { None })
            .collect();

        let edge_ids: Vec<EdgeId> = board.edge_ids().collect();
        let face_ids: Vec<FaceId> = board.face_ids().collect();
        let mut layout = LayoutBoard::new(
            &board,
            |e| states[edge_ids.iter().position(|&x| x == e).unwrap()],
            |f| values[face_ids.iter().position(|&x| x == f).unwrap()],
        );
        let area = layout.board().signed_area();
        let name = format!("seed {}", seed);

        for _ in 0..4 {
            layout.clear_satisfied_faces();
            assert_valid(&name, layout.board());

            layout.collapse_dead_zones().unwrap();
            assert_valid(&name, layout.board());

            layout.merge_degree_two_vertices().unwrap();
            assert_valid(&name, layout.board());
            assert!(layout.board().signed_area() > 0.0, "{}", name);
        }

        // Collapse alone never changes the covered area
        let mut collapse_only = LayoutBoard::new(
            &board,
            |e| states[edge_ids.iter().position(|&x| x == e).unwrap()],
            |f| values[face_ids.iter().position(|&x| x == f).unwrap()],
        );
        collapse_only
            .simplify(&SimplifyOptions::default().with_merge_degree_two(false))
            .unwrap();
        assert!((collapse_only.board().signed_area() - area).abs() < 1e-9 * area, "{}", name);
        assert_valid(&name, collapse_only.board());
    }
}

#[test]
fn test_simplify_then_relax() {
    let board = hex_board(2).unwrap();
    let mut layout = LayoutBoard::new(
        &board,
        |e| if board.edge(e).is_boundary() { EdgeState::Black } else { EdgeState::Red },
        |_| None,
    );
    let report = layout.simplify(&SimplifyOptions::default().with_merge_degree_two(false)).unwrap();
    assert_eq!(report.interior_zones, 1);
    assert_eq!(layout.board().num_faces(), 1);

    let area = layout.board().signed_area();
    let relax_report = layout.relax(&RelaxOptions::default().with_iterations(100));
    assert!(relax_report.iterations <= 100);
    assert!((layout.board().signed_area() - area).abs() < 1e-9 * area);
    assert_valid("relaxed hex", layout.board());
}
