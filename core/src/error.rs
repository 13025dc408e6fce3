use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Unknown token glyph {0:?}")]
    UnknownToken(char),
}

pub type Result<T> = core::result::Result<T, GameError>;
