use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Match shapes that spawn a special token.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPattern {
    Line4(Axis),
    Line5(Axis),
    LShape,
    TShape,
}

impl MatchPattern {
    pub const fn spawned_token(self) -> Token {
        match self {
            Self::Line4(Axis::Horizontal) => Token::RowClear,
            Self::Line4(Axis::Vertical) => Token::ColClear,
            Self::Line5(_) => Token::Wildcard,
            Self::LShape | Self::TShape => Token::Bomb3x3,
        }
    }
}

/// A special token to be written back after the cycle's drop and refill.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialSpawn {
    pub pos: Coord2,
    pub pattern: MatchPattern,
}

impl SpecialSpawn {
    pub const fn token(self) -> Token {
        self.pattern.spawned_token()
    }
}

/// Classifies a pre-expansion removal set. Lines beat shapes; a 5-run beats
/// a 4-run; rows are scanned before columns. At most one spawn per cycle.
pub fn classify(cells: &BTreeSet<Coord2>) -> Option<SpecialSpawn> {
    if cells.len() < 4 {
        return None;
    }

    // BTreeSet iteration is row-major, so both groupings collect sorted lists.
    let mut rows: BTreeMap<Coord, Vec<Coord>> = BTreeMap::new();
    let mut cols: BTreeMap<Coord, Vec<Coord>> = BTreeMap::new();
    for &(row, col) in cells {
        rows.entry(row).or_default().push(col);
        cols.entry(col).or_default().push(row);
    }

    for target in [5usize, 4] {
        for (&row, line) in &rows {
            if let Some(middle) = find_run(line, target) {
                return Some(SpecialSpawn {
                    pos: (row, line[middle]),
                    pattern: line_pattern(target, Axis::Horizontal),
                });
            }
        }
        for (&col, line) in &cols {
            if let Some(middle) = find_run(line, target) {
                return Some(SpecialSpawn {
                    pos: (line[middle], col),
                    pattern: line_pattern(target, Axis::Vertical),
                });
            }
        }
    }

    if cells.len() == 5 {
        classify_cluster(cells)
    } else {
        None
    }
}

const fn line_pattern(target: usize, axis: Axis) -> MatchPattern {
    if target == 5 {
        MatchPattern::Line5(axis)
    } else {
        MatchPattern::Line4(axis)
    }
}

/// Index of the middle cell of the first qualifying maximal consecutive run
/// in a sorted line: length ≥5 for the 5 target, exactly 4 for the 4 target.
fn find_run(sorted: &[Coord], target: usize) -> Option<usize> {
    let mut start = 0;
    while start < sorted.len() {
        let mut end = start + 1;
        while end < sorted.len() && sorted[end] == sorted[end - 1] + 1 {
            end += 1;
        }
        let len = end - start;
        let qualifies = if target == 5 { len >= 5 } else { len == 4 };
        if qualifies {
            return Some(start + len / 2);
        }
        start = end;
    }
    None
}

const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ORTHOGONALS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// L/T detection for an exactly-5-cell cluster: a junction cell with at
/// least 3 of its 4-neighbors in the set; a present diagonal neighbor makes
/// it an L, an absent one a T.
fn classify_cluster(cells: &BTreeSet<Coord2>) -> Option<SpecialSpawn> {
    for &coords in cells {
        let junction_arms = ORTHOGONALS
            .iter()
            .filter_map(|&delta| offset(coords, delta))
            .filter(|next| cells.contains(next))
            .count();
        if junction_arms < 3 {
            continue;
        }
        let has_diagonal = DIAGONALS
            .iter()
            .filter_map(|&delta| offset(coords, delta))
            .any(|next| cells.contains(&next));
        let pattern = if has_diagonal {
            MatchPattern::LShape
        } else {
            MatchPattern::TShape
        };
        return Some(SpecialSpawn {
            pos: coords,
            pattern,
        });
    }
    None
}

fn offset((row, col): Coord2, (dr, dc): (i8, i8)) -> Option<Coord2> {
    Some((row.checked_add_signed(dr)?, col.checked_add_signed(dc)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(cells: &[Coord2]) -> BTreeSet<Coord2> {
        cells.iter().copied().collect()
    }

    #[test]
    fn horizontal_four_spawns_row_clear_at_the_middle() {
        let spawn = classify(&set(&[(2, 1), (2, 2), (2, 3), (2, 4)])).unwrap();

        assert_eq!(spawn.pattern, MatchPattern::Line4(Axis::Horizontal));
        assert_eq!(spawn.pos, (2, 3));
        assert_eq!(spawn.token(), Token::RowClear);
    }

    #[test]
    fn vertical_four_spawns_col_clear() {
        let spawn = classify(&set(&[(1, 5), (2, 5), (3, 5), (4, 5)])).unwrap();

        assert_eq!(spawn.pattern, MatchPattern::Line4(Axis::Vertical));
        assert_eq!(spawn.pos, (3, 5));
        assert_eq!(spawn.token(), Token::ColClear);
    }

    #[test]
    fn five_line_spawns_wildcard_and_beats_a_four_run() {
        let spawn = classify(&set(&[(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)])).unwrap();
        assert_eq!(spawn.pattern, MatchPattern::Line5(Axis::Horizontal));
        assert_eq!(spawn.pos, (0, 2));
        assert_eq!(spawn.token(), Token::Wildcard);

        // Vertical 5-run and horizontal 4-run in the same set: 5 wins.
        let mixed = set(&[
            (0, 3),
            (1, 3),
            (2, 3),
            (3, 3),
            (4, 3),
            (2, 4),
            (2, 5),
            (2, 6),
        ]);
        let spawn = classify(&mixed).unwrap();
        assert_eq!(spawn.pattern, MatchPattern::Line5(Axis::Vertical));
        assert_eq!(spawn.pos, (2, 3));
    }

    #[test]
    fn t_cluster_spawns_bomb_at_the_junction() {
        let spawn = classify(&set(&[(0, 0), (0, 1), (0, 2), (1, 1), (2, 1)])).unwrap();

        assert_eq!(spawn.pattern, MatchPattern::TShape);
        assert_eq!(spawn.pos, (0, 1));
        assert_eq!(spawn.token(), Token::Bomb3x3);
    }

    #[test]
    fn diagonal_neighbor_marks_the_cluster_as_an_l() {
        let spawn = classify(&set(&[(0, 1), (1, 1), (2, 1), (1, 2), (2, 2)])).unwrap();

        assert_eq!(spawn.pattern, MatchPattern::LShape);
        assert_eq!(spawn.pos, (1, 1));
    }

    #[test]
    fn plain_three_run_and_blocks_spawn_nothing() {
        assert_eq!(classify(&set(&[(0, 0), (0, 1), (0, 2)])), None);
        // 2x3 block: two 3-runs but no 4-run and not a 5-cell cluster.
        assert_eq!(
            classify(&set(&[(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)])),
            None
        );
    }
}
