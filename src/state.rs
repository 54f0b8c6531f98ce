use std::fmt::Display;
use crate::board::{Board, Clues};
use crate::core::{Actor, Error, Index, Player};
use crate::graph;
use crate::visibility;

/// Lives lost for attempting a placement that duplicates a value in its row
/// or column. The board is left untouched.
pub const CONFLICT_PENALTY: u32 = 10;
/// Lives lost, per axis, when a placement completes a line whose visibility
/// count misses its clue. The placement stands.
pub const VISIBILITY_PENALTY: u32 = 15;
/// Lives lost for having no legal move at the start of a turn.
pub const DEADLOCK_PENALTY: u32 = 5;

/// Score awarded per completed axis whose visibility validates.
pub const AXIS_SCORE: u32 = 15;
/// Score awarded for a plain placement that completes nothing.
pub const PLACEMENT_SCORE: u32 = 1;

const OUT_OF_BOUNDS: Error = Error::new_const("cell index out of bounds");
const VALUE_OUT_OF_RANGE: Error = Error::new_const("height must be in 1..=N");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenaltyKind {
    Conflict,
    Visibility,
    Deadlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Penalty {
    pub kind: PenaltyKind,
    pub amount: u32,
}

/// What `apply_move` did. Violations are outcomes, not errors: the engine
/// keeps running and the caller decides how to present them.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The piece was placed. `penalties` carries a visibility penalty per
    /// completed axis that missed its clue; the placement stands regardless.
    Placed {
        score_gain: u32,
        row_completed: bool,
        col_completed: bool,
        penalties: Vec<Penalty>,
    },
    /// Target cell already holds a value. No state change, no penalty.
    CellFilled,
    /// The placement would duplicate a value in its row or column. The board
    /// is unchanged; the acting player paid the penalty.
    Conflict(Penalty),
}

impl MoveOutcome {
    pub fn accepted(&self) -> bool {
        matches!(self, MoveOutcome::Placed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Human,
    Machine,
    Draw,
}

impl Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Winner::Human => write!(f, "HUMAN WINS"),
            Winner::Machine => write!(f, "CPU WINS"),
            Winner::Draw => write!(f, "DRAW"),
        }
    }
}

/// The whole observable game: board, clues, both players, whose turn it is,
/// and the two presentation strings. Mutated only through `apply_move` and
/// the penalty paths; strategies read it and write nothing but their
/// rationale (via the engine).
#[derive(Debug, Clone)]
pub struct GameState<const N: usize> {
    board: Board<N>,
    clues: Clues<N>,
    human: Player,
    machine: Player,
    is_human_turn: bool,
    status_message: String,
    machine_rationale: String,
}

impl<const N: usize> GameState<N> {
    pub fn new(clues: Clues<N>) -> Self {
        Self::with_board(clues, Board::new())
    }

    /// Starts from a part-filled position. The caller is trusted to supply a
    /// board that already satisfies the Latin-partial invariant.
    pub fn with_board(clues: Clues<N>, board: Board<N>) -> Self {
        GameState {
            board,
            clues,
            human: Player::new(),
            machine: Player::new(),
            is_human_turn: true,
            status_message: String::new(),
            machine_rationale: String::new(),
        }
    }

    pub fn board(&self) -> &Board<N> {
        &self.board
    }

    pub fn clues(&self) -> &Clues<N> {
        &self.clues
    }

    pub fn player(&self, actor: Actor) -> &Player {
        match actor {
            Actor::Human => &self.human,
            Actor::Machine => &self.machine,
        }
    }

    fn player_mut(&mut self, actor: Actor) -> &mut Player {
        match actor {
            Actor::Human => &mut self.human,
            Actor::Machine => &mut self.machine,
        }
    }

    pub fn is_human_turn(&self) -> bool {
        self.is_human_turn
    }

    pub fn set_human_turn(&mut self, human: bool) {
        self.is_human_turn = human;
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn set_status_message<S: Into<String>>(&mut self, msg: S) {
        self.status_message = msg.into();
    }

    pub fn machine_rationale(&self) -> &str {
        &self.machine_rationale
    }

    pub fn set_machine_rationale<S: Into<String>>(&mut self, text: S) {
        self.machine_rationale = text.into();
    }

    /// Attempts a placement for `actor`. Contract violations (bad index or
    /// height) are errors; everything the rules can say about a move comes
    /// back as a `MoveOutcome`.
    pub fn apply_move(&mut self, index: Index, v: u8, actor: Actor) -> Result<MoveOutcome, Error> {
        if index[0] >= N || index[1] >= N {
            return Err(OUT_OF_BOUNDS);
        }
        if v < 1 || v as usize > N {
            return Err(VALUE_OUT_OF_RANGE);
        }
        if !self.board.is_cell_empty(index) {
            self.status_message = "Cell already filled!".to_string();
            return Ok(MoveOutcome::CellFilled);
        }
        if graph::has_conflict(&self.board, index, v) {
            let penalty = self.apply_penalty(
                actor,
                PenaltyKind::Conflict,
                CONFLICT_PENALTY,
                "constraint violation",
            );
            return Ok(MoveOutcome::Conflict(penalty));
        }

        self.board.set(index, v);
        let [row, col] = index;
        let row_completed = self.board.row_complete(row);
        let col_completed = self.board.col_complete(col);

        let mut score_gain = 0;
        let mut penalties = Vec::new();
        if row_completed {
            if self.row_visibility_valid(row) {
                score_gain += AXIS_SCORE;
            } else {
                penalties.push(self.apply_penalty(
                    actor,
                    PenaltyKind::Visibility,
                    VISIBILITY_PENALTY,
                    "row visibility violation",
                ));
            }
        }
        if col_completed {
            if self.col_visibility_valid(col) {
                score_gain += AXIS_SCORE;
            } else {
                penalties.push(self.apply_penalty(
                    actor,
                    PenaltyKind::Visibility,
                    VISIBILITY_PENALTY,
                    "column visibility violation",
                ));
            }
        }
        if !row_completed && !col_completed {
            score_gain = PLACEMENT_SCORE;
        }
        self.player_mut(actor).add_score(score_gain);

        self.status_message = if !penalties.is_empty() {
            match actor {
                Actor::Human => format!(
                    "Move placed but violated clues! -{} lives per axis",
                    VISIBILITY_PENALTY
                ),
                Actor::Machine => format!(
                    "CPU violated clues! -{} lives per axis",
                    VISIBILITY_PENALTY
                ),
            }
        } else {
            match actor {
                Actor::Human => format!("Valid move! +{} points", score_gain),
                Actor::Machine => format!("CPU scored +{} points", score_gain),
            }
        };

        Ok(MoveOutcome::Placed { score_gain, row_completed, col_completed, penalties })
    }

    /// True iff `actor` has no legal placement anywhere; applies the
    /// deadlock penalty and writes the skip message when so.
    pub fn check_for_deadlock(&mut self, actor: Actor) -> bool {
        if graph::has_any_legal_move(&self.board) {
            return false;
        }
        self.apply_penalty(
            actor,
            PenaltyKind::Deadlock,
            DEADLOCK_PENALTY,
            "deadlock, no legal moves",
        );
        self.status_message = match actor {
            Actor::Human => format!("Deadlock! No legal moves (-{} lives), turn skipped", DEADLOCK_PENALTY),
            Actor::Machine => format!("CPU deadlocked! No legal moves (-{} lives), turn skipped", DEADLOCK_PENALTY),
        };
        true
    }

    /// Empty cell plus no row/column conflict. Visibility is deliberately
    /// not consulted here: unfinished lines are only scored on completion.
    /// See `placement_feasible` for the stricter advisory check.
    pub fn check_legal_move(&self, index: Index, v: u8) -> bool {
        self.board.is_cell_empty(index) && !graph::has_conflict(&self.board, index, v)
    }

    /// Advisory feasibility check: legal, and no clue on either affected
    /// axis is already unsatisfiable given the filled prefixes the placement
    /// would leave. `apply_move` never consults this; callers can, to warn a
    /// player before a doomed line is locked in.
    pub fn placement_feasible(&self, index: Index, v: u8) -> bool {
        if !self.check_legal_move(index, v) {
            return false;
        }
        let mut scratch = self.board.clone();
        scratch.set(index, v);
        placement_feasible_on(&scratch, &self.clues, index)
    }

    pub fn row_visibility_valid(&self, row: usize) -> bool {
        let (forward, reverse) = self.clues.row_pair(row);
        visibility::line_visibility_valid(&self.board.row_line(row), forward, reverse)
    }

    pub fn col_visibility_valid(&self, col: usize) -> bool {
        let (forward, reverse) = self.clues.col_pair(col);
        visibility::line_visibility_valid(&self.board.col_line(col), forward, reverse)
    }

    /// Whole-board check: every line complete and every clue met.
    pub fn board_visibility_valid(&self) -> bool {
        if !self.board.is_full() {
            return false;
        }
        (0..N).all(|i| self.row_visibility_valid(i) && self.col_visibility_valid(i))
    }

    pub fn has_any_legal_move(&self) -> bool {
        graph::has_any_legal_move(&self.board)
    }

    pub fn is_game_over(&self) -> bool {
        self.human.is_depleted()
            || self.machine.is_depleted()
            || self.board.is_full()
            || !graph::has_any_legal_move(&self.board)
    }

    /// Resolves a finished game; None while play can continue. Double KO is
    /// a draw; a sole depleted pool loses; otherwise an exhausted board is
    /// settled on score plus a tenth of the remaining lives.
    pub fn winner(&self) -> Option<Winner> {
        let human_out = self.human.is_depleted();
        let machine_out = self.machine.is_depleted();
        if human_out && machine_out {
            return Some(Winner::Draw);
        }
        if human_out {
            return Some(Winner::Machine);
        }
        if machine_out {
            return Some(Winner::Human);
        }
        if self.board.is_full() || !graph::has_any_legal_move(&self.board) {
            return Some(match self.human.total().cmp(&self.machine.total()) {
                std::cmp::Ordering::Greater => Winner::Human,
                std::cmp::Ordering::Less => Winner::Machine,
                std::cmp::Ordering::Equal => Winner::Draw,
            });
        }
        None
    }

    fn apply_penalty(
        &mut self,
        actor: Actor,
        kind: PenaltyKind,
        amount: u32,
        reason: &str,
    ) -> Penalty {
        let lives = self.player_mut(actor).deduct_lives(amount);
        self.status_message = match actor {
            Actor::Human => format!("{} (-{} lives), lives left: {}", reason, amount, lives),
            Actor::Machine => format!("CPU {} (-{} lives), lives left: {}", reason, amount, lives),
        };
        Penalty { kind, amount }
    }
}

/// Prefix-feasibility over the row and column through `index` on an already
/// scribbled board. Shared by `GameState::placement_feasible` and the
/// trap-setter's pruning, which works on scratch boards.
pub fn placement_feasible_on<const N: usize>(
    board: &Board<N>,
    clues: &Clues<N>,
    index: Index,
) -> bool {
    let [row, col] = index;
    let row_line = board.row_line(row);
    let (left, right) = clues.row_pair(row);
    if visibility::clue_prefix_infeasible(&row_line, left) {
        return false;
    }
    let mut rev_row = row_line;
    rev_row.reverse();
    if visibility::clue_prefix_infeasible(&rev_row, right) {
        return false;
    }
    let col_line = board.col_line(col);
    let (top, bottom) = clues.col_pair(col);
    if visibility::clue_prefix_infeasible(&col_line, top) {
        return false;
    }
    let mut rev_col = col_line;
    rev_col.reverse();
    if visibility::clue_prefix_infeasible(&rev_col, bottom) {
        return false;
    }
    true
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_util {
    use super::*;

    /// Forces a life pool, for positions that tests cannot reach through
    /// legal play alone.
    pub fn set_lives<const N: usize>(state: &mut GameState<N>, actor: Actor, lives: u32) {
        match actor {
            Actor::Human => state.human.lives = lives,
            Actor::Machine => state.machine.lives = lives,
        }
    }
}
