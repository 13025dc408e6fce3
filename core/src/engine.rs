use alloc::collections::{BTreeSet, VecDeque};
use alloc::vec;
use alloc::vec::Vec;
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Cap on cascade cycles triggered by a single swap.
pub const MAX_CHAIN_DEPTH: u8 = 20;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    AwaitingSecondSelection,
    Resolving,
}

impl Default for Phase {
    fn default() -> Self {
        Self::Idle
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Active,
    Won,
    Lost,
}

impl SessionStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Discrete state transitions emitted with each cascade cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CellsRemoved(Vec<Coord2>),
    SpecialTokenCreated(Coord2, Token),
    ObjectiveUpdated(usize, CellCount),
    StepConsumed(u32),
    GameOver(bool),
}

/// One settled cascade cycle: the board after drop/refill plus everything
/// that happened during the cycle. Hosts animate between these.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CycleSnapshot {
    pub board: Board,
    pub score: u32,
    pub combo_count: u32,
    pub steps_remaining: u32,
    pub chain_depth: u8,
    pub events: Vec<GameEvent>,
}

/// Full resolution of one productive swap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub cycles: Vec<CycleSnapshot>,
    pub status: SessionStatus,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SelectOutcome {
    /// Input absorbed without effect: out of bounds, mid-resolution, or the
    /// session already ended.
    Ignored,
    Selected(Coord2),
    Deselected,
    /// The swap produced no match and was undone; no step consumed.
    SwapReverted,
    Resolved(Resolution),
}

/// Wildcard-initiated removals skip classification and special expansion on
/// their opening cycle; follow-up cycles run the full pipeline.
#[derive(Copy, Clone, PartialEq)]
enum CyclePipeline {
    Full,
    WildcardEntry,
}

/// Owns one match-three session: board, objectives, step budget, score, and
/// the selection state machine. Every public operation runs to a stable
/// state before returning.
#[derive(Clone, Debug)]
pub struct GameEngine {
    config: GameConfig,
    rng: SmallRng,
    board: Board,
    objectives: [Objective; OBJECTIVE_COUNT],
    score: u32,
    combo_count: u32,
    steps_remaining: u32,
    max_steps: u32,
    chain_depth: u8,
    selected: Option<Coord2>,
    phase: Phase,
    status: SessionStatus,
}

impl GameEngine {
    /// Starts a session: objectives first, then the opening board, then the
    /// step budget derived from the realized board.
    pub fn new(config: GameConfig) -> Self {
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let objectives = draw_objectives(&mut rng);
        let board = RandomBoardGenerator.generate(config.size, &mut rng);
        Self::assemble(config, rng, board, objectives)
    }

    /// Builds a session around an explicit board and objective set. The
    /// step budget is still derived from the board.
    pub fn from_parts(
        seed: u64,
        board: Board,
        objectives: [Objective; OBJECTIVE_COUNT],
    ) -> Self {
        let config = GameConfig::new_unchecked(seed, board.size());
        let rng = SmallRng::seed_from_u64(seed);
        Self::assemble(config, rng, board, objectives)
    }

    fn assemble(
        config: GameConfig,
        rng: SmallRng,
        board: Board,
        objectives: [Objective; OBJECTIVE_COUNT],
    ) -> Self {
        let max_steps = calculate_step_budget(&board, &objectives);
        Self {
            config,
            rng,
            board,
            objectives,
            score: 0,
            combo_count: 0,
            steps_remaining: max_steps,
            max_steps,
            chain_depth: 0,
            selected: None,
            phase: Phase::Idle,
            status: SessionStatus::Active,
        }
    }

    /// Discards the session wholesale and starts a fresh one. The new seed
    /// comes from the session's own stream, so a replay from the original
    /// seed reproduces every restart. Legal in every phase and status; this
    /// is the only cancellation path.
    pub fn restart(&mut self) -> Snapshot {
        let seed = self.rng.next_u64();
        *self = Self::new(GameConfig::new_unchecked(seed, self.config.size));
        self.snapshot()
    }

    /// Drives the selection state machine. First pick arms a cell, a second
    /// adjacent pick swaps; a non-adjacent pick re-arms, picking the same
    /// cell deselects.
    pub fn select_cell(&mut self, coords: Coord2) -> SelectOutcome {
        if self.status.is_finished() || !self.board.contains(coords) {
            return SelectOutcome::Ignored;
        }

        match self.phase {
            Phase::Resolving => SelectOutcome::Ignored,
            Phase::Idle => {
                self.selected = Some(coords);
                self.phase = Phase::AwaitingSecondSelection;
                SelectOutcome::Selected(coords)
            }
            Phase::AwaitingSecondSelection => {
                let Some(first) = self.selected else {
                    self.selected = Some(coords);
                    return SelectOutcome::Selected(coords);
                };
                if first == coords {
                    self.selected = None;
                    self.phase = Phase::Idle;
                    SelectOutcome::Deselected
                } else if !is_adjacent(first, coords) {
                    self.selected = Some(coords);
                    SelectOutcome::Selected(coords)
                } else {
                    self.resolve_swap(first, coords)
                }
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_engine(self)
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn objectives(&self) -> &[Objective; OBJECTIVE_COUNT] {
        &self.objectives
    }

    pub fn objectives_completed(&self) -> usize {
        self.objectives
            .iter()
            .filter(|obj| obj.is_completed())
            .count()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn combo_count(&self) -> u32 {
        self.combo_count
    }

    pub fn steps_remaining(&self) -> u32 {
        self.steps_remaining
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    pub fn chain_depth(&self) -> u8 {
        self.chain_depth
    }

    pub fn selected_cell(&self) -> Option<Coord2> {
        self.selected
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    fn resolve_swap(&mut self, first: Coord2, second: Coord2) -> SelectOutcome {
        self.selected = None;
        self.phase = Phase::Resolving;
        let token_a = self.board[first];
        let token_b = self.board[second];
        self.board.swap_tokens(first, second);

        if token_a == Token::Wildcard || token_b == Token::Wildcard {
            let initial = self.wildcard_removal_set(first, second, token_a, token_b);
            if initial.is_empty() {
                self.board.swap_tokens(first, second);
                self.phase = Phase::Idle;
                return SelectOutcome::SwapReverted;
            }
            let resolution =
                self.resolve_cascade(initial, Vec::new(), CyclePipeline::WildcardEntry);
            return SelectOutcome::Resolved(resolution);
        }

        let matched = find_removable_set(&self.board);
        if matched.is_empty() {
            self.board.swap_tokens(first, second);
            self.phase = Phase::Idle;
            return SelectOutcome::SwapReverted;
        }

        self.steps_remaining -= 1;
        let events = vec![GameEvent::StepConsumed(self.steps_remaining)];
        let resolution = self.resolve_cascade(matched, events, CyclePipeline::Full);
        SelectOutcome::Resolved(resolution)
    }

    /// Removal set for a swap involving at least one wildcard. The board has
    /// already been swapped: `token_a` now sits at `second`, `token_b` at
    /// `first`.
    fn wildcard_removal_set(
        &self,
        first: Coord2,
        second: Coord2,
        token_a: Token,
        token_b: Token,
    ) -> BTreeSet<Coord2> {
        if token_a == Token::Wildcard && token_b == Token::Wildcard {
            return self.board.iter_coords().collect();
        }

        let (other, other_pos) = if token_a == Token::Wildcard {
            (token_b, first)
        } else {
            (token_a, second)
        };

        if let Some(color) = other.color() {
            // Clears the swapped token too; the wildcard itself survives.
            self.board.positions_of(color).into_iter().collect()
        } else if other.is_expanding() {
            special_footprint(&self.board, other_pos, other)
        } else {
            BTreeSet::new()
        }
    }

    /// The remove → drop → refill → re-scan loop, bounded by
    /// `MAX_CHAIN_DEPTH`. Emits one snapshot per cycle.
    fn resolve_cascade(
        &mut self,
        initial: BTreeSet<Coord2>,
        mut events: Vec<GameEvent>,
        entry: CyclePipeline,
    ) -> Resolution {
        let mut cycles: Vec<CycleSnapshot> = Vec::new();
        let mut working = initial;
        let mut pipeline = entry;

        loop {
            let spawn = match pipeline {
                CyclePipeline::Full => classify(&working),
                CyclePipeline::WildcardEntry => None,
            };
            if pipeline == CyclePipeline::Full {
                expand_special_triggers(&self.board, &mut working);
            }

            let removed: Vec<Coord2> = working.iter().copied().collect();
            // removed * 10 * (1 + 0.2 * floor(combo / 3)), in integer form.
            self.score += removed.len() as u32 * 2 * (5 + self.combo_count / 3);
            self.combo_count += 1;
            events.push(GameEvent::CellsRemoved(removed));

            let mut credited = [0 as CellCount; OBJECTIVE_COUNT];
            for &pos in &working {
                if let Some(color) = self.board[pos].color() {
                    if let Some(index) = self
                        .objectives
                        .iter()
                        .position(|obj| obj.target_color() == color)
                    {
                        credited[index] += 1;
                    }
                }
            }
            for (index, amount) in credited.into_iter().enumerate() {
                if amount > 0 {
                    self.objectives[index].add_progress(amount);
                    events.push(GameEvent::ObjectiveUpdated(
                        index,
                        self.objectives[index].current(),
                    ));
                }
            }
            if self.status == SessionStatus::Active
                && self.objectives.iter().all(Objective::is_completed)
            {
                self.status = SessionStatus::Won;
                events.push(GameEvent::GameOver(true));
            }

            for &pos in &working {
                self.board.set_token(pos, Token::Empty);
            }
            self.board.apply_gravity();
            self.refill_empty_cells();
            if let Some(spawn) = spawn {
                let token = spawn.token();
                self.board.set_token(spawn.pos, token);
                events.push(GameEvent::SpecialTokenCreated(spawn.pos, token));
            }

            cycles.push(CycleSnapshot {
                board: self.board.clone(),
                score: self.score,
                combo_count: self.combo_count,
                steps_remaining: self.steps_remaining,
                chain_depth: self.chain_depth,
                events: core::mem::take(&mut events),
            });

            if self.status == SessionStatus::Won {
                break;
            }

            let next = find_removable_set(&self.board);
            if next.is_empty() || self.chain_depth >= MAX_CHAIN_DEPTH {
                break;
            }
            self.chain_depth += 1;
            working = next;
            pipeline = CyclePipeline::Full;
        }

        log::debug!("cascade settled after {} cycles", cycles.len());
        self.chain_depth = 0;
        self.combo_count = 0;
        self.phase = Phase::Idle;
        if self.status == SessionStatus::Active && self.steps_remaining == 0 {
            self.status = SessionStatus::Lost;
            if let Some(last) = cycles.last_mut() {
                last.events.push(GameEvent::GameOver(false));
            }
        }

        Resolution {
            cycles,
            status: self.status,
        }
    }

    /// Fills empties column by column, top-down, so the left and upward
    /// lookahead of `refill_token` sees settled cells.
    fn refill_empty_cells(&mut self) {
        let size = self.board.size();
        for col in 0..size {
            for row in 0..size {
                if self.board[(row, col)].is_empty() {
                    let token = refill_token(&self.board, (row, col), &mut self.rng);
                    self.board.set_token((row, col), token);
                }
            }
        }
    }
}

/// Cells cleared by activating an expanding special at `pos`: its full row,
/// full column, or the 3x3 neighborhood clipped at the edges.
fn special_footprint(board: &Board, pos: Coord2, token: Token) -> BTreeSet<Coord2> {
    let size = board.size();
    let mut cells = BTreeSet::new();
    match token {
        Token::RowClear => {
            for col in 0..size {
                cells.insert((pos.0, col));
            }
        }
        Token::ColClear => {
            for row in 0..size {
                cells.insert((row, pos.1));
            }
        }
        Token::Bomb3x3 => {
            for dr in -1..=1 {
                for dc in -1..=1 {
                    if let Some(coords) = apply_delta(pos, (dr, dc), (size, size)) {
                        cells.insert(coords);
                    }
                }
            }
        }
        _ => {}
    }
    cells
}

/// Grows a removal set by the footprints of every expanding special it
/// holds, iterating until no unprocessed special remains; footprints can
/// sweep further specials into the set.
fn expand_special_triggers(board: &Board, set: &mut BTreeSet<Coord2>) {
    let mut queue: VecDeque<Coord2> = set
        .iter()
        .copied()
        .filter(|&pos| board[pos].is_expanding())
        .collect();
    let mut processed: BTreeSet<Coord2> = BTreeSet::new();

    while let Some(pos) = queue.pop_front() {
        if !processed.insert(pos) {
            continue;
        }
        for cell in special_footprint(board, pos, board[pos]) {
            if set.insert(cell) && board[cell].is_expanding() {
                queue.push_back(cell);
            }
        }
    }
}
