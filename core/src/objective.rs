use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

pub const OBJECTIVE_COUNT: usize = 3;
pub const MIN_TARGET_COUNT: CellCount = 10;
pub const MAX_TARGET_COUNT: CellCount = 25;

/// Average tokens cleared by one productive swap, used as the base of the
/// step-budget estimate.
const TOKENS_PER_SWAP: f64 = 3.5;
/// Difficulty factor: smaller grants more steps for the same objectives.
const STEP_CALCULATION_FACTOR: f64 = 0.7;
/// Normalizer applied to per-color positional dispersion.
const DISPERSION_SCALE: f64 = 50.0;

/// A collect-N-of-a-color session goal. Progress saturates at `required`
/// and never decreases.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    target_color: Color,
    required: CellCount,
    current: CellCount,
}

impl Objective {
    pub const fn new(target_color: Color, required: CellCount) -> Self {
        Self {
            target_color,
            required,
            current: 0,
        }
    }

    pub const fn target_color(&self) -> Color {
        self.target_color
    }

    pub const fn required(&self) -> CellCount {
        self.required
    }

    pub const fn current(&self) -> CellCount {
        self.current
    }

    pub const fn is_completed(&self) -> bool {
        self.current >= self.required
    }

    pub(crate) fn add_progress(&mut self, amount: CellCount) {
        self.current = (self.current + amount).min(self.required);
    }
}

/// Draws three objectives with distinct target colors and required counts
/// uniform in `[MIN_TARGET_COUNT, MAX_TARGET_COUNT]`.
pub fn draw_objectives<R: Rng>(rng: &mut R) -> [Objective; OBJECTIVE_COUNT] {
    let mut colors = Color::ALL;
    for i in 0..OBJECTIVE_COUNT {
        let j = rng.random_range(i..colors.len());
        colors.swap(i, j);
    }
    core::array::from_fn(|i| {
        Objective::new(
            colors[i],
            rng.random_range(MIN_TARGET_COUNT..=MAX_TARGET_COUNT),
        )
    })
}

/// Derives the session's swap budget from the objective totals and how
/// scattered each target color sits on the realized board. More dispersed
/// boards grant more steps. Clamped to
/// `[max(10, total/5), min(80, total/2)]`.
pub fn calculate_step_budget(board: &Board, objectives: &[Objective]) -> u32 {
    let total_required: u32 = objectives.iter().map(|obj| u32::from(obj.required())).sum();
    let base_steps = f64::from(total_required) / TOKENS_PER_SWAP;

    let mut distribution_factor = 1.0;
    for objective in objectives {
        let positions = board.positions_of(objective.target_color());
        if positions.is_empty() {
            continue;
        }
        let n = positions.len() as f64;
        let avg_row = positions.iter().map(|&(row, _)| f64::from(row)).sum::<f64>() / n;
        let avg_col = positions.iter().map(|&(_, col)| f64::from(col)).sum::<f64>() / n;
        let dispersion = positions
            .iter()
            .map(|&(row, col)| {
                let dr = f64::from(row) - avg_row;
                let dc = f64::from(col) - avg_col;
                dr * dr + dc * dc
            })
            .sum::<f64>()
            / n;
        distribution_factor += dispersion / DISPERSION_SCALE;
    }

    let calculated = base_steps * distribution_factor / STEP_CALCULATION_FACTOR;
    let floor = 10u32.max(total_required / 5);
    let ceiling = 80u32.min(total_required / 2);
    calculated.min(f64::from(ceiling)).max(f64::from(floor)) as u32
}
