use rand::Rng;

use crate::*;

pub use random::*;

mod random;

/// Strategy for producing the opening board of a session.
pub trait BoardGenerator {
    fn generate<R: Rng>(&self, size: Coord, rng: &mut R) -> Board;
}
