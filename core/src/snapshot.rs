use serde::{Deserialize, Serialize};

use crate::*;

/// A host-facing view of the whole session, detached from the engine. Serde
/// round-trips it unchanged, so hosts can persist or ship it as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub config: GameConfig,
    pub board: Board,
    pub objectives: [Objective; OBJECTIVE_COUNT],
    pub score: u32,
    pub combo_count: u32,
    pub steps_remaining: u32,
    pub max_steps: u32,
    pub chain_depth: u8,
    pub selected_cell: Option<Coord2>,
    pub phase: Phase,
    pub status: SessionStatus,
}

impl Snapshot {
    pub fn from_engine(engine: &GameEngine) -> Self {
        Self {
            config: engine.config(),
            board: engine.board().clone(),
            objectives: *engine.objectives(),
            score: engine.score(),
            combo_count: engine.combo_count(),
            steps_remaining: engine.steps_remaining(),
            max_steps: engine.max_steps(),
            chain_depth: engine.chain_depth(),
            selected_cell: engine.selected_cell(),
            phase: engine.phase(),
            status: engine.status(),
        }
    }
}
