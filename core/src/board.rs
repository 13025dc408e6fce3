use alloc::vec::Vec;
use core::ops::{Index, IndexMut};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Square grid of tokens, row 0 at the top.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Token>,
}

impl Board {
    pub fn filled(size: Coord, token: Token) -> Self {
        Self {
            cells: Array2::from_elem((size as usize, size as usize), token),
        }
    }

    pub fn from_tokens(size: Coord, tokens: &[Token]) -> Result<Self> {
        if tokens.len() != mult(size, size) as usize {
            return Err(GameError::InvalidBoardShape);
        }
        let cells = Array2::from_shape_vec((size as usize, size as usize), tokens.to_vec())
            .map_err(|_| GameError::InvalidBoardShape)?;
        Ok(Self { cells })
    }

    /// Builds a board from one text row per board row, one glyph per cell
    /// (`R O Y G B P` colors, `H V X W` specials, `.` empty).
    pub fn parse(rows: &[&str]) -> Result<Self> {
        let size: Coord = rows
            .len()
            .try_into()
            .map_err(|_| GameError::InvalidBoardShape)?;
        let mut tokens = Vec::with_capacity(mult(size, size) as usize);
        for row in rows {
            if row.chars().count() != rows.len() {
                return Err(GameError::InvalidBoardShape);
            }
            for glyph in row.chars() {
                tokens.push(Token::from_glyph(glyph)?);
            }
        }
        Self::from_tokens(size, &tokens)
    }

    pub fn size(&self) -> Coord {
        self.cells.dim().0.try_into().unwrap()
    }

    pub fn total_cells(&self) -> CellCount {
        self.cells.len().try_into().unwrap()
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        let size = self.size();
        coords.0 < size && coords.1 < size
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn token_at(&self, coords: Coord2) -> Token {
        self.cells[coords.to_nd_index()]
    }

    pub fn set_token(&mut self, coords: Coord2, token: Token) {
        self.cells[coords.to_nd_index()] = token;
    }

    pub fn swap_tokens(&mut self, a: Coord2, b: Coord2) {
        let held = self[a];
        self[a] = self[b];
        self[b] = held;
    }

    /// Row-major iterator over every cell coordinate.
    pub fn iter_coords(&self) -> impl Iterator<Item = Coord2> + use<> {
        let size = self.size();
        (0..size).flat_map(move |row| (0..size).map(move |col| (row, col)))
    }

    pub fn positions_of(&self, color: Color) -> Vec<Coord2> {
        self.iter_coords()
            .filter(|&coords| self[coords] == Token::Regular(color))
            .collect()
    }

    pub fn count_color(&self, color: Color) -> CellCount {
        self.cells
            .iter()
            .filter(|&&token| token == Token::Regular(color))
            .count()
            .try_into()
            .unwrap()
    }

    pub fn is_fully_populated(&self) -> bool {
        self.cells.iter().all(|token| !token.is_empty())
    }

    /// Compacts every column downward, preserving the relative order of the
    /// surviving tokens and leaving empties at the top.
    pub fn apply_gravity(&mut self) {
        let size = self.size();
        for col in 0..size {
            let mut write = size;
            for row in (0..size).rev() {
                let token = self[(row, col)];
                if token.is_empty() {
                    continue;
                }
                write -= 1;
                if write != row {
                    self[(write, col)] = token;
                    self[(row, col)] = Token::Empty;
                }
            }
        }
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        let size = self.size();
        NeighborIter::new(coords, (size, size))
    }
}

impl Index<Coord2> for Board {
    type Output = Token;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

impl IndexMut<Coord2> for Board {
    fn index_mut(&mut self, coords: Coord2) -> &mut Self::Output {
        &mut self.cells[coords.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_maps_glyphs_to_tokens() {
        let board = Board::parse(&["RG.W", "OYBP", "HVX.", "GGBB"]).unwrap();

        assert_eq!(board.size(), 4);
        assert_eq!(board[(0, 0)], Token::Regular(Color::Red));
        assert_eq!(board[(0, 2)], Token::Empty);
        assert_eq!(board[(0, 3)], Token::Wildcard);
        assert_eq!(board[(2, 0)], Token::RowClear);
        assert_eq!(board[(2, 1)], Token::ColClear);
        assert_eq!(board[(2, 2)], Token::Bomb3x3);
    }

    #[test]
    fn parse_rejects_ragged_rows_and_unknown_glyphs() {
        assert_eq!(
            Board::parse(&["RG", "R"]),
            Err(GameError::InvalidBoardShape)
        );
        assert_eq!(
            Board::parse(&["RZ", "GG"]),
            Err(GameError::UnknownToken('Z'))
        );
    }

    #[test]
    fn from_tokens_checks_length() {
        assert_eq!(
            Board::from_tokens(3, &[Token::Empty; 8]),
            Err(GameError::InvalidBoardShape)
        );
    }

    #[test]
    fn gravity_compacts_columns_preserving_order() {
        let mut board = Board::parse(&["R.G.", ".O..", "Y.B.", "...."]).unwrap();

        board.apply_gravity();

        assert_eq!(board[(2, 0)], Token::Regular(Color::Red));
        assert_eq!(board[(3, 0)], Token::Regular(Color::Yellow));
        assert_eq!(board[(3, 1)], Token::Regular(Color::Orange));
        assert_eq!(board[(2, 2)], Token::Regular(Color::Green));
        assert_eq!(board[(3, 2)], Token::Regular(Color::Blue));
        for row in 0..2 {
            for col in 0..4 {
                assert_eq!(board[(row, col)], Token::Empty);
            }
        }
        assert_eq!(board[(3, 3)], Token::Empty);
    }

    #[test]
    fn positions_and_counts_track_colors() {
        let board = Board::parse(&["RGR", "GRG", "RGR"]).unwrap();

        assert_eq!(board.count_color(Color::Red), 5);
        assert_eq!(
            board.positions_of(Color::Green),
            alloc::vec![(0, 1), (1, 0), (1, 2), (2, 1)]
        );
        assert!(board.is_fully_populated());
    }

    #[test]
    fn bounds_checks_reject_outside_coordinates() {
        let board = Board::filled(4, Token::Regular(Color::Blue));

        assert!(board.contains((3, 3)));
        assert!(!board.contains((4, 0)));
        assert_eq!(board.validate_coords((0, 4)), Err(GameError::InvalidCoords));
    }
}
