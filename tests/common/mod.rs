//! Shared helpers for the integration tests.

#![allow(dead_code)]

use trellis::prelude::*;

/// Boards of every flavour the crate builds.
pub fn sample_boards() -> Vec<(&'static str, Board)> {
    let options = PolygonBoardOptions::default();
    vec![
        ("square 1x1", square_board(1, 1).unwrap()),
        ("square 4x3", square_board(4, 3).unwrap()),
        ("hex 1", hex_board(1).unwrap()),
        ("hex 3", hex_board(3).unwrap()),
        ("triangular", tiling_board(&TilingUnit::triangular(), 3, &options).unwrap()),
        ("rhombille", tiling_board(&TilingUnit::rhombille(), 2, &options).unwrap()),
    ]
}

/// Panic with the board name if validation fails.
pub fn assert_valid(name: &str, board: &Board) {
    if let Err(violation) = validate(board) {
        panic!("{}: {}", name, violation);
    }
}
