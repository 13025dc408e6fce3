use rand::prelude::*;
use smallvec::SmallVec;

use super::*;

/// Upper bound on opening-board attempts before accepting a board that still
/// holds ready-made matches; the first post-swap scan resolves them.
pub const MAX_GENERATION_ATTEMPTS: u32 = 150;

/// Fills the board with uniformly random regular colors and rejects boards
/// containing a ≥3 run, up to the attempt bound.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RandomBoardGenerator;

impl BoardGenerator for RandomBoardGenerator {
    fn generate<R: Rng>(&self, size: Coord, rng: &mut R) -> Board {
        let mut board = random_fill(size, rng);
        let mut attempt = 1;
        while !find_removable_set(&board).is_empty() {
            if attempt >= MAX_GENERATION_ATTEMPTS {
                log::warn!(
                    "opening board still has matches after {} attempts, accepting it",
                    MAX_GENERATION_ATTEMPTS
                );
                break;
            }
            board = random_fill(size, rng);
            attempt += 1;
        }
        board
    }
}

fn random_fill<R: Rng>(size: Coord, rng: &mut R) -> Board {
    let mut board = Board::filled(size, Token::Empty);
    for coords in board.iter_coords() {
        board.set_token(coords, Token::Regular(random_color(rng)));
    }
    board
}

pub fn random_color<R: Rng>(rng: &mut R) -> Color {
    Color::ALL[rng.random_range(0..Color::ALL.len())]
}

/// Refill draw for an empty cell. Colors that would complete an immediate
/// 3-run with the two settled cells directly above, or the two directly to
/// the left, are excluded; if that ever empties the candidate list the draw
/// falls back to an unconstrained color. The lookahead is exactly those two
/// directions; matches formed to the right or below are tolerated.
pub fn refill_token<R: Rng>(board: &Board, coords: Coord2, rng: &mut R) -> Token {
    let (row, col) = coords;
    let mut candidates: SmallVec<[Color; 6]> = SmallVec::from_slice(&Color::ALL);

    if row >= 2 {
        exclude_pair(
            &mut candidates,
            board[(row - 1, col)],
            board[(row - 2, col)],
        );
    }
    if col >= 2 {
        exclude_pair(
            &mut candidates,
            board[(row, col - 1)],
            board[(row, col - 2)],
        );
    }

    if candidates.is_empty() {
        return Token::Regular(random_color(rng));
    }
    Token::Regular(candidates[rng.random_range(0..candidates.len())])
}

fn exclude_pair(candidates: &mut SmallVec<[Color; 6]>, near: Token, far: Token) {
    if near == far {
        if let Some(color) = near.color() {
            candidates.retain(|&mut candidate| candidate != color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        let mut a = SmallRng::seed_from_u64(9);
        let mut b = SmallRng::seed_from_u64(9);

        let first = RandomBoardGenerator.generate(8, &mut a);
        let second = RandomBoardGenerator.generate(8, &mut b);

        assert_eq!(first, second);
    }

    #[test]
    fn generated_boards_start_without_matches() {
        for seed in 0..3 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let board = RandomBoardGenerator.generate(8, &mut rng);

            assert!(board.is_fully_populated());
            assert!(find_removable_set(&board).is_empty());
        }
    }

    #[test]
    fn refill_avoids_completing_a_left_pair() {
        let board = Board::parse(&[
            "RR.YOYOY",
            "GPGPGPGP",
            "YOYOYOYO",
            "PGPGPGPG",
            "OYOYOYOY",
            "GPGPGPGP",
            "YOYOYOYO",
            "PGPGPGPG",
        ])
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(1);

        for _ in 0..32 {
            let token = refill_token(&board, (0, 2), &mut rng);
            assert!(token.is_regular());
            assert_ne!(token, Token::Regular(Color::Red));
        }
    }

    #[test]
    fn refill_avoids_completing_an_upward_pair() {
        let board = Board::parse(&[
            "BGOYOYOY",
            "BPGPGPGP",
            ".OYOYOYO",
            "PGPGPGPG",
            "OYOYOYOY",
            "GPGPGPGP",
            "YOYOYOYO",
            "PGPGPGPG",
        ])
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(2);

        for _ in 0..32 {
            assert_ne!(
                refill_token(&board, (2, 0), &mut rng),
                Token::Regular(Color::Blue)
            );
        }
    }

    #[test]
    fn refill_ignores_special_pairs() {
        let board = Board::parse(&[
            "HH.YOYOY",
            "GPGPGPGP",
            "YOYOYOYO",
            "PGPGPGPG",
            "OYOYOYOY",
            "GPGPGPGP",
            "YOYOYOYO",
            "PGPGPGPG",
        ])
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(3);

        // All six colors stay available next to a special pair.
        let token = refill_token(&board, (0, 2), &mut rng);
        assert!(token.is_regular());
    }
}
