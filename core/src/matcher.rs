use alloc::collections::{BTreeSet, VecDeque};

use crate::*;

/// Minimum straight run length that qualifies a cell as a match anchor.
pub const MIN_RUN: usize = 3;

/// Finds every cell that participates in a ≥3 straight run of identical
/// regular tokens, extended to the full 4-directionally connected component
/// of that token. Specials and empty cells never anchor a run and never
/// join a component.
pub fn find_removable_set(board: &Board) -> BTreeSet<Coord2> {
    let mut removable = BTreeSet::new();
    let mut visited: BTreeSet<Coord2> = BTreeSet::new();

    for coords in board.iter_coords() {
        if visited.contains(&coords) || !board[coords].is_regular() {
            continue;
        }
        if axis_run(board, coords, (0, 1)) >= MIN_RUN || axis_run(board, coords, (1, 0)) >= MIN_RUN
        {
            collect_component(board, coords, &mut visited, &mut removable);
        }
    }

    removable
}

/// Length of the maximal identical-token run through `start` along `axis`,
/// scanning outward in both directions.
fn axis_run(board: &Board, start: Coord2, axis: (isize, isize)) -> usize {
    let token = board[start];
    let size = board.size();
    let mut count = 1;

    for delta in [axis, (-axis.0, -axis.1)] {
        let mut cursor = start;
        while let Some(next) = apply_delta(cursor, delta, (size, size)) {
            if board[next] != token {
                break;
            }
            count += 1;
            cursor = next;
        }
    }

    count
}

fn collect_component(
    board: &Board,
    start: Coord2,
    visited: &mut BTreeSet<Coord2>,
    out: &mut BTreeSet<Coord2>,
) {
    let token = board[start];
    visited.insert(start);
    out.insert(start);

    let mut to_visit = VecDeque::from([start]);
    while let Some(coords) = to_visit.pop_front() {
        for next in board.iter_neighbors(coords) {
            if board[next] == token && visited.insert(next) {
                out.insert(next);
                to_visit.push_back(next);
            }
        }
    }
}
