use serde::{Deserialize, Serialize};

use crate::{GameError, Result};

/// The six match colors of regular tokens.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl Color {
    pub const ALL: [Color; 6] = [
        Color::Red,
        Color::Orange,
        Color::Yellow,
        Color::Green,
        Color::Blue,
        Color::Purple,
    ];
}

/// Canonical cell content stored by the board.
///
/// Regular tokens carry the color identity used for matching and objectives.
/// Special tokens have no color; they are created by match patterns and only
/// leave the board when a removal set sweeps them in. `Empty` marks a cell
/// mid-resolution, pending drop and refill.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    Regular(Color),
    RowClear,
    ColClear,
    Bomb3x3,
    Wildcard,
    Empty,
}

impl Token {
    pub const fn is_regular(self) -> bool {
        matches!(self, Self::Regular(_))
    }

    pub const fn color(self) -> Option<Color> {
        match self {
            Self::Regular(color) => Some(color),
            _ => None,
        }
    }

    pub const fn is_special(self) -> bool {
        matches!(
            self,
            Self::RowClear | Self::ColClear | Self::Bomb3x3 | Self::Wildcard
        )
    }

    /// Specials that expand to a removal footprint when swept into a set.
    /// The wildcard is excluded: it acts only through swaps.
    pub const fn is_expanding(self) -> bool {
        matches!(self, Self::RowClear | Self::ColClear | Self::Bomb3x3)
    }

    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn from_glyph(glyph: char) -> Result<Self> {
        Ok(match glyph {
            'R' => Self::Regular(Color::Red),
            'O' => Self::Regular(Color::Orange),
            'Y' => Self::Regular(Color::Yellow),
            'G' => Self::Regular(Color::Green),
            'B' => Self::Regular(Color::Blue),
            'P' => Self::Regular(Color::Purple),
            'H' => Self::RowClear,
            'V' => Self::ColClear,
            'X' => Self::Bomb3x3,
            'W' => Self::Wildcard,
            '.' => Self::Empty,
            _ => return Err(GameError::UnknownToken(glyph)),
        })
    }
}

impl Default for Token {
    fn default() -> Self {
        Self::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specials_have_no_color_identity() {
        for token in [
            Token::RowClear,
            Token::ColClear,
            Token::Bomb3x3,
            Token::Wildcard,
        ] {
            assert!(token.is_special());
            assert!(!token.is_regular());
            assert_eq!(token.color(), None);
        }
        assert!(!Token::Wildcard.is_expanding());
        assert!(Token::Bomb3x3.is_expanding());
    }

    #[test]
    fn glyphs_round_trip_known_tokens() {
        assert_eq!(Token::from_glyph('B'), Ok(Token::Regular(Color::Blue)));
        assert_eq!(Token::from_glyph('W'), Ok(Token::Wildcard));
        assert_eq!(Token::from_glyph('.'), Ok(Token::Empty));
        assert_eq!(Token::from_glyph('Z'), Err(GameError::UnknownToken('Z')));
    }
}
