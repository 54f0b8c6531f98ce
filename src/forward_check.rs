use crate::board::{Board, Clues};
use crate::core::Index;
use crate::graph;
use crate::ranker::{sort_score_centric, MoveCandidate};
use crate::reward::{immediate_reward, SEARCH_REWARDS};
use crate::state::GameState;
use crate::strategy::{Pick, Strategy, StrategyKind};

/// Lookahead horizon shared with branch-and-bound.
pub const DEPTH_CAP: usize = 3;
/// Discount applied per ply below the top level.
pub const PLY_WEIGHT: f64 = 0.5;

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SearchStats {
    pub nodes: usize,
    pub pruned: usize,
}

/// True when some empty cell has been left with no legal height, which is
/// the forward-check condition: any branch that does this is dead weight.
pub(crate) fn strands_a_cell<const N: usize>(board: &Board<N>) -> bool {
    board
        .empty_cells()
        .into_iter()
        .any(|index| graph::legal_count(board, index) == 0)
}

/// Depth-first search over every legal placement with a depth cap,
/// half-weighting each further ply, pruning conflicts and branches that
/// immediately strand a cell. Place/undo on the one scratch board.
pub struct ForwardCheck;

impl ForwardCheck {
    fn backtrack<const N: usize>(
        board: &mut Board<N>,
        clues: &Clues<N>,
        depth: usize,
        stats: &mut SearchStats,
    ) -> f64 {
        if depth >= DEPTH_CAP {
            return 0.0;
        }
        let mut best = 0.0f64;
        for index in board.empty_cells() {
            let opts = graph::legal_count(board, index);
            for v in 1..=N as u8 {
                if graph::has_conflict(board, index, v) {
                    stats.pruned += 1;
                    continue;
                }
                board.set(index, v);
                stats.nodes += 1;
                if strands_a_cell(board) {
                    stats.pruned += 1;
                    board.clear(index);
                    continue;
                }
                let value = immediate_reward(board, clues, index, opts, &SEARCH_REWARDS)
                    + PLY_WEIGHT * Self::backtrack(board, clues, depth + 1, stats);
                board.clear(index);
                best = best.max(value);
            }
        }
        best
    }
}

impl<const N: usize> Strategy<N> for ForwardCheck {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ForwardCheck
    }

    fn choose(&self, state: &GameState<N>) -> Option<Pick> {
        let mut stats = SearchStats::default();
        let mut scratch = state.board().clone();
        let mut candidates = Vec::new();
        for index in state.board().empty_cells() {
            let opts = graph::legal_count(&scratch, index);
            for v in 1..=N as u8 {
                if graph::has_conflict(&scratch, index, v) {
                    stats.pruned += 1;
                    continue;
                }
                scratch.set(index, v);
                stats.nodes += 1;
                // No forward-check prune at the top: even a stranding move
                // must stay on the candidate list when it is all there is.
                let total = immediate_reward(&scratch, state.clues(), index, opts, &SEARCH_REWARDS)
                    + Self::backtrack(&mut scratch, state.clues(), 1, &mut stats);
                scratch.clear(index);
                let mut cand = MoveCandidate::new(index, v, total);
                cand.mrv_count = opts;
                candidates.push(cand);
            }
        }
        if candidates.is_empty() {
            return None;
        }
        sort_score_centric::<N>(&mut candidates);
        let best = &candidates[0];
        let rationale = format!(
            "BACKTRACKING (FORWARD CHECK)\n\
             ------------------------\n \
             Move: {} at ({}, {})\n \
             Branch score: {:.1}\n\
             ------------------------\n \
             Nodes explored: {}\n \
             Branches pruned: {}\n \
             Search depth: {} plies\n\
             ------------------------\n\
             Strategy: depth-first search that undoes bad moves instantly\n\
             and drops branches stranding any cell.",
            best.value,
            best.index[0] + 1,
            best.index[1] + 1,
            best.score,
            stats.nodes,
            stats.pruned,
            DEPTH_CAP,
        );
        Some(Pick { index: best.index, value: best.value, rationale })
    }

    fn evaluate_cell(&self, state: &GameState<N>, index: Index) -> f64 {
        if !state.board().is_cell_empty(index) {
            return 0.0;
        }
        let mut scratch = state.board().clone();
        let opts = graph::legal_count(&scratch, index);
        let mut max = 0.0f64;
        for v in graph::legal_values(state.board(), index).iter() {
            scratch.set(index, v);
            max = max.max(immediate_reward(&scratch, state.clues(), index, opts, &SEARCH_REWARDS));
            scratch.clear(index);
        }
        max
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::board::Clues;
    use crate::state::GameState;

    #[test]
    fn test_strands_a_cell() {
        // (0,0) needs a 4 but its column already has one.
        let stranded: Board<4> = Board::from_rows([
            [0, 1, 2, 3],
            [4, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        assert!(strands_a_cell(&stranded));
        let open: Board<4> = Board::new();
        assert!(!strands_a_cell(&open));
    }

    #[test]
    fn test_picks_legal_move_and_reports_counters() {
        let board = Board::from_rows([
            [0, 3, 1, 4],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        let state = GameState::with_board(
            Clues::new([0; 4], [1, 0, 0, 0], [0; 4], [3, 0, 0, 0]),
            board,
        );
        let pick = ForwardCheck.choose(&state).unwrap();
        assert!(state.check_legal_move(pick.index, pick.value));
        assert!(pick.rationale.contains("BACKTRACKING"));
        assert!(pick.rationale.contains("Nodes explored"));
        // Completing the row with matching clues is the standout branch.
        assert_eq!(pick.index, [0, 0]);
        assert_eq!(pick.value, 2);
    }

    #[test]
    fn test_scratch_exploration_leaves_state_alone() {
        let state: GameState<4> = GameState::new(Clues::unconstrained());
        let before = state.board().clone();
        let _ = ForwardCheck.choose(&state).unwrap();
        assert_eq!(*state.board(), before);
    }

    #[test]
    fn test_forced_final_move_taken() {
        let board = Board::from_rows([
            [1, 2, 3, 4],
            [2, 3, 4, 1],
            [3, 4, 1, 2],
            [4, 1, 2, 0],
        ]);
        // Hostile clues: the only move closes both lines invalidly.
        let state = GameState::with_board(
            Clues::new([0, 0, 0, 4], [0; 4], [0; 4], [0, 0, 0, 4]),
            board,
        );
        let pick = ForwardCheck.choose(&state).unwrap();
        assert_eq!(pick.index, [3, 3]);
        assert_eq!(pick.value, 3);
    }
}
