use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use vec_box::vec_box;
use crate::board::Board;
use crate::branch_bound::BranchAndBound;
use crate::completion::CompletionGreedy;
use crate::core::{Actor, Error, Index};
use crate::dnc::DivideAndConquer;
use crate::dp::DynamicProgramming;
use crate::forward_check::ForwardCheck;
use crate::generator::{self, Puzzle};
use crate::mrv::MrvGreedy;
use crate::score_greedy::ScoreGreedy;
use crate::state::{GameState, MoveOutcome};
use crate::strategy::{Strategy, StrategyKind};
use crate::survival::SurvivalGreedy;
use crate::trap_setter::TrapSetter;

const GAME_OVER: Error = Error::new_const("game is over; reset to continue");

/// Where the turn cycle stands. The deadlock states are passed through
/// inside `declare_deadlock` (penalty applied, then the turn moves on);
/// `GameOver` is terminal until `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    HumanToMove,
    HumanDeadlock,
    MachineToMove,
    MachineDeadlock,
    GameOver,
}

/// The facade the presentation layer talks to: owns the game state and one
/// instance of every strategy, dispatches picks and heat-maps by
/// `StrategyKind`, and keeps the turn machine in step with the rules.
pub struct Engine<const N: usize> {
    state: GameState<N>,
    solution: Board<N>,
    strategies: Vec<Box<dyn Strategy<N>>>,
    turn: TurnState,
}

fn strategy_registry<const N: usize>() -> Vec<Box<dyn Strategy<N>>> {
    vec_box![
        CompletionGreedy,
        SurvivalGreedy,
        ScoreGreedy,
        MrvGreedy,
        DynamicProgramming,
        DivideAndConquer,
        ForwardCheck,
        BranchAndBound,
        TrapSetter,
    ]
}

impl<const N: usize> Engine<N> {
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let Puzzle { clues, solution } = generator::generate(&mut rng);
        Engine {
            state: GameState::new(clues),
            solution,
            strategies: strategy_registry(),
            turn: TurnState::HumanToMove,
        }
    }

    /// Regenerates the puzzle and starts the duel over. The only way out of
    /// `GameOver`.
    pub fn reset(&mut self, seed: u64) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let Puzzle { clues, solution } = generator::generate(&mut rng);
        self.state = GameState::new(clues);
        self.solution = solution;
        self.turn = TurnState::HumanToMove;
    }

    pub fn state(&self) -> &GameState<N> {
        &self.state
    }

    /// The witness square the clues were derived from; for reveal features.
    pub fn solution(&self) -> &Board<N> {
        &self.solution
    }

    pub fn turn(&self) -> TurnState {
        self.turn
    }

    fn strategy(&self, kind: StrategyKind) -> &dyn Strategy<N> {
        self.strategies
            .iter()
            .find(|s| s.kind() == kind)
            .map(|s| s.as_ref())
            .expect("registry holds every strategy kind")
    }

    /// Asks a strategy for its move and records its rationale. None when no
    /// legal candidate exists (the caller handles the turn skip).
    pub fn find_best_move(&mut self, kind: StrategyKind) -> Option<(Index, u8)> {
        if self.turn == TurnState::GameOver {
            return None;
        }
        let pick = self.strategy(kind).choose(&self.state)?;
        self.state.set_machine_rationale(pick.rationale);
        Some((pick.index, pick.value))
    }

    /// Heat-map score for one cell under a strategy's cheap horizon.
    pub fn evaluate_cell(&self, kind: StrategyKind, index: Index) -> f64 {
        self.strategy(kind).evaluate_cell(&self.state, index)
    }

    /// Full heat-map: filled cells 0, negatives clamped to 0, and the
    /// maximum normalised to exactly 1.0 whenever any cell is warm at all.
    pub fn heatmap(&self, kind: StrategyKind) -> [[f64; N]; N] {
        let strategy = self.strategy(kind);
        let mut grid = [[0.0f64; N]; N];
        let mut max = 0.0f64;
        for r in 0..N {
            for c in 0..N {
                if self.state.board().is_cell_empty([r, c]) {
                    let score = strategy.evaluate_cell(&self.state, [r, c]).max(0.0);
                    grid[r][c] = score;
                    max = max.max(score);
                }
            }
        }
        if max > 0.0 {
            for row in grid.iter_mut() {
                for cell in row.iter_mut() {
                    *cell /= max;
                }
            }
        }
        grid
    }

    /// Plays a move for `actor` and advances the turn machine: an accepted
    /// placement passes the turn, a rejection leaves it (lives may have
    /// dropped), and any terminal condition locks the engine in `GameOver`.
    pub fn apply_move(&mut self, index: Index, v: u8, actor: Actor) -> Result<MoveOutcome, Error> {
        if self.turn == TurnState::GameOver {
            return Err(GAME_OVER);
        }
        let outcome = self.state.apply_move(index, v, actor)?;
        if outcome.accepted() {
            self.state.set_human_turn(actor == Actor::Machine);
        }
        self.sync_turn();
        Ok(outcome)
    }

    /// Checks `actor` for deadlock; when deadlocked the penalty lands, the
    /// deadlock state is recorded, and the turn passes to the opponent (or
    /// the game ends, when the board is exhausted for both players). Once a
    /// life pool is empty nothing more can be declared.
    pub fn declare_deadlock(&mut self, actor: Actor) -> bool {
        if self.state.player(Actor::Human).is_depleted()
            || self.state.player(Actor::Machine).is_depleted()
        {
            return false;
        }
        if !self.state.check_for_deadlock(actor) {
            return false;
        }
        self.turn = match actor {
            Actor::Human => TurnState::HumanDeadlock,
            Actor::Machine => TurnState::MachineDeadlock,
        };
        self.state.set_human_turn(actor == Actor::Machine);
        self.sync_turn();
        true
    }

    fn sync_turn(&mut self) {
        self.turn = if self.state.is_game_over() {
            TurnState::GameOver
        } else if self.state.is_human_turn() {
            TurnState::HumanToMove
        } else {
            TurnState::MachineToMove
        };
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_util {
    use super::*;
    use crate::board::Clues;

    /// Engine wrapped around a hand-built position instead of a generated
    /// puzzle. The solution square is left empty; tests that need one
    /// should go through `Engine::new`.
    pub fn engine_from_state<const N: usize>(state: GameState<N>) -> Engine<N> {
        let mut engine = Engine {
            state,
            solution: Board::new(),
            strategies: strategy_registry(),
            turn: TurnState::HumanToMove,
        };
        engine.sync_turn();
        engine
    }

    pub fn engine_with_board<const N: usize>(clues: Clues<N>, board: Board<N>) -> Engine<N> {
        engine_from_state(GameState::with_board(clues, board))
    }
}

#[cfg(test)]
mod test {
    use super::test_util::*;
    use super::*;
    use strum::IntoEnumIterator;
    use crate::board::Clues;
    use crate::core::INITIAL_LIVES;
    use crate::state::test_util::set_lives;
    use crate::state::{Penalty, PenaltyKind, Winner, CONFLICT_PENALTY, DEADLOCK_PENALTY};
    use crate::survival::emergency_multiplier;

    #[test]
    fn test_new_engine_is_playable_and_deterministic() {
        let mut a: Engine<4> = Engine::new(42);
        let mut b: Engine<4> = Engine::new(42);
        assert_eq!(a.state().clues(), b.state().clues());
        assert_eq!(a.turn(), TurnState::HumanToMove);
        let mv_a = a.find_best_move(StrategyKind::DynamicProgramming).unwrap();
        let mv_b = b.find_best_move(StrategyKind::DynamicProgramming).unwrap();
        assert_eq!(mv_a, mv_b);
        assert!(a.state().machine_rationale().contains("DYNAMIC PROGRAMMING"));
    }

    #[test]
    fn test_reset_matches_fresh_engine() {
        let mut engine: Engine<4> = Engine::new(3);
        engine.apply_move([0, 0], 1, Actor::Human).unwrap();
        engine.reset(42);
        let fresh: Engine<4> = Engine::new(42);
        assert_eq!(engine.state().clues(), fresh.state().clues());
        assert!(engine.state().board().empty_cells().len() == 16);
        assert_eq!(engine.turn(), TurnState::HumanToMove);
    }

    #[test]
    fn test_every_strategy_returns_a_legal_opening() {
        let engine: Engine<4> = Engine::new(7);
        for kind in StrategyKind::iter() {
            let pick = engine.strategy(kind).choose(engine.state()).unwrap();
            assert!(
                engine.state().check_legal_move(pick.index, pick.value),
                "{:?} suggested an illegal move",
                kind
            );
            assert!(!pick.rationale.is_empty());
        }
    }

    #[test]
    fn test_conflict_penalty_through_facade() {
        let mut engine = engine_with_board(Clues::unconstrained(), Board::<4>::new());
        let outcome = engine.apply_move([0, 0], 2, Actor::Human).unwrap();
        assert!(outcome.accepted());
        assert_eq!(engine.turn(), TurnState::MachineToMove);
        // The same player blunders into a conflict: lives drop, grid and
        // turn stay.
        let outcome = engine.apply_move([0, 3], 2, Actor::Human).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Conflict(Penalty { kind: PenaltyKind::Conflict, amount: CONFLICT_PENALTY })
        );
        assert_eq!(engine.state().board().get([0, 3]), None);
        assert_eq!(engine.state().player(Actor::Human).lives, INITIAL_LIVES - 10);
        assert_eq!(engine.turn(), TurnState::MachineToMove);
    }

    #[test]
    fn test_deadlock_passes_turn_with_penalty() {
        // Both empty cells are blocked; the human must declare.
        let stuck = Board::from_rows([
            [0, 1, 2, 3],
            [4, 0, 1, 2],
            [2, 3, 4, 1],
            [1, 2, 3, 4],
        ]);
        let mut engine = engine_with_board(Clues::unconstrained(), stuck);
        // A stuck board is game over by exhaustion, so hand the human one
        // live option elsewhere first.
        let live = Board::from_rows([
            [0, 1, 2, 3],
            [4, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        let mut live_engine = engine_with_board(Clues::unconstrained(), live);
        assert!(!live_engine.declare_deadlock(Actor::Human));
        assert_eq!(live_engine.state().player(Actor::Human).lives, INITIAL_LIVES);

        // The stuck board: deadlock fires, penalty lands, game ends by
        // exhaustion (no legal move remains for anyone).
        assert!(engine.declare_deadlock(Actor::Human));
        assert_eq!(engine.state().player(Actor::Human).lives, INITIAL_LIVES - DEADLOCK_PENALTY);
        assert_eq!(engine.turn(), TurnState::GameOver);
    }

    #[test]
    fn test_game_over_rejects_moves_until_reset() {
        let full = Board::from_rows([
            [1, 2, 3, 4],
            [2, 3, 4, 1],
            [3, 4, 1, 2],
            [4, 1, 2, 3],
        ]);
        let mut engine = engine_with_board(Clues::unconstrained(), full);
        assert_eq!(engine.turn(), TurnState::GameOver);
        assert!(engine.find_best_move(StrategyKind::Completion).is_none());
        assert!(engine.apply_move([0, 0], 1, Actor::Human).is_err());
        assert_eq!(engine.state().winner(), Some(Winner::Draw));
        engine.reset(1);
        assert_eq!(engine.turn(), TurnState::HumanToMove);
    }

    #[test]
    fn test_life_depletion_ends_game() {
        let mut state: GameState<4> = GameState::new(Clues::unconstrained());
        set_lives(&mut state, Actor::Machine, 5);
        let mut engine = engine_from_state(state);
        // Machine throws away its last lives on a conflict.
        engine.apply_move([0, 0], 1, Actor::Human).unwrap();
        let outcome = engine.apply_move([0, 1], 1, Actor::Machine).unwrap();
        assert!(matches!(outcome, MoveOutcome::Conflict(_)));
        assert_eq!(engine.state().player(Actor::Machine).lives, 0);
        assert_eq!(engine.turn(), TurnState::GameOver);
        assert_eq!(engine.state().winner(), Some(Winner::Human));
    }

    #[test]
    fn test_heatmap_normalised_to_one() {
        let engine: Engine<4> = Engine::new(11);
        for kind in StrategyKind::iter() {
            let heat = engine.heatmap(kind);
            let max = heat.iter().flatten().cloned().fold(0.0f64, f64::max);
            assert_eq!(max, 1.0, "heatmap of {:?} not normalised", kind);
            assert!(heat.iter().flatten().all(|&h| (0.0..=1.0).contains(&h)));
        }
    }

    #[test]
    fn test_heatmap_zero_on_filled_and_exhausted() {
        let mut engine = engine_with_board(Clues::unconstrained(), Board::<4>::new());
        engine.apply_move([1, 1], 3, Actor::Human).unwrap();
        let heat = engine.heatmap(StrategyKind::ScoreGreedy);
        assert_eq!(heat[1][1], 0.0);

        let full = Board::from_rows([
            [1, 2, 3, 4],
            [2, 3, 4, 1],
            [3, 4, 1, 2],
            [4, 1, 2, 3],
        ]);
        let engine = engine_with_board(Clues::unconstrained(), full);
        let heat = engine.heatmap(StrategyKind::ScoreGreedy);
        assert!(heat.iter().flatten().all(|&h| h == 0.0));
    }

    #[test]
    fn test_heatmap_snapshot_agrees_with_choice() {
        // No apply_move in between: the strategy's pick must sit on a cell
        // the heat-map ranks strictly warm.
        let mut engine: Engine<4> = Engine::new(23);
        let heat = engine.heatmap(StrategyKind::DivideAndConquer);
        let (index, _) = engine.find_best_move(StrategyKind::DivideAndConquer).unwrap();
        assert!(heat[index[0]][index[1]] > 0.0);
    }

    #[test]
    fn test_survival_emergency_dominates_completion() {
        // Machine on its last legs: the survival multiplier is 4.0 and its
        // chosen cell's score dwarfs what completion sees in the same spot.
        let mut state: GameState<4> = GameState::new(Clues::unconstrained());
        set_lives(&mut state, Actor::Machine, 10);
        let engine = engine_from_state(state);
        assert_eq!(emergency_multiplier(10), 4.0);
        let survival_pick = engine.strategy(StrategyKind::Survival).choose(engine.state()).unwrap();
        let survival_score =
            engine.evaluate_cell(StrategyKind::Survival, survival_pick.index);
        let completion_best = engine
            .state()
            .board()
            .empty_cells()
            .into_iter()
            .map(|i| engine.evaluate_cell(StrategyKind::Completion, i))
            .fold(0.0f64, f64::max);
        assert!(survival_score > completion_best);
        assert!(survival_pick.rationale.contains("CRITICAL"));
    }

    #[test]
    fn test_every_strategy_takes_the_forced_last_cell() {
        // One empty cell; its only height finishes row and column with
        // clues that validate. Whatever the heuristic, this is the move.
        let board = Board::from_rows([
            [1, 2, 3, 4],
            [2, 3, 4, 1],
            [3, 4, 1, 2],
            [4, 1, 2, 0],
        ]);
        let clues = Clues::new([4, 3, 2, 1], [1, 2, 2, 2], [1, 2, 2, 2], [4, 3, 2, 1]);
        let engine = engine_with_board(clues, board);
        for kind in StrategyKind::iter() {
            let pick = engine.strategy(kind).choose(engine.state()).unwrap();
            assert_eq!((pick.index, pick.value), ([3, 3], 3), "{:?} missed the forced move", kind);
        }
    }

    #[test]
    fn test_strategies_never_mutate_visible_state() {
        let mut engine: Engine<4> = Engine::new(99);
        let board_before = engine.state().board().clone();
        let lives_before = (
            engine.state().player(Actor::Human).lives,
            engine.state().player(Actor::Machine).lives,
        );
        for kind in StrategyKind::iter() {
            let _ = engine.heatmap(kind);
            let _ = engine.find_best_move(kind);
        }
        assert_eq!(*engine.state().board(), board_before);
        assert_eq!(
            lives_before,
            (
                engine.state().player(Actor::Human).lives,
                engine.state().player(Actor::Machine).lives,
            )
        );
    }
}
