#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use board::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use matcher::*;
pub use objective::*;
pub use pattern::*;
pub use snapshot::*;
pub use token::*;
pub use types::*;

mod board;
mod engine;
mod error;
mod generator;
mod matcher;
mod objective;
mod pattern;
mod snapshot;
mod token;
mod types;

pub const DEFAULT_GRID_SIZE: Coord = 8;
pub const MIN_GRID_SIZE: Coord = 5;
pub const MAX_GRID_SIZE: Coord = 32;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub seed: u64,
    pub size: Coord,
}

impl GameConfig {
    pub const fn new_unchecked(seed: u64, size: Coord) -> Self {
        Self { seed, size }
    }

    pub fn new(seed: u64, size: Coord) -> Self {
        let size = size.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE);
        Self::new_unchecked(seed, size)
    }

    pub const fn with_default_size(seed: u64) -> Self {
        Self::new_unchecked(seed, DEFAULT_GRID_SIZE)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size, self.size)
    }
}
