use crate::board::{Board, Clues};
use crate::core::Index;
use crate::graph;
use crate::reward::{immediate_reward, RewardTable, SEARCH_REWARDS};
use crate::state::GameState;
use crate::strategy::{Pick, Strategy, StrategyKind};
use crate::forward_check::{DEPTH_CAP, PLY_WEIGHT};
use crate::visibility;

/// Same search shape as the forward-check backtracker, plus a sound
/// optimistic bound: a branch is skipped as soon as even an
/// all-completions-valid remainder could not beat the best sibling already
/// explored.
pub struct BranchAndBound;

#[derive(Debug, Default, Clone, Copy)]
struct BoundedStats {
    nodes: usize,
    pruned: usize,
}

/// The most a single move could ever be worth: base, both completion
/// bonuses, the double bonus, and a visibility bonus per axis. The axis
/// bonus counts only while some line of that orientation has a satisfiable
/// clue pair at all. Penalties are negative, so leaving them out keeps this
/// an upper bound.
fn optimistic_step<const N: usize>(clues: &Clues<N>, table: &RewardTable) -> f64 {
    let mut step = table.base + table.row_complete + table.col_complete + table.double_complete;
    if (0..N).any(|r| {
        let (left, right) = clues.row_pair(r);
        visibility::clue_pair_possible(N as u8, left, right)
    }) {
        step += table.vis_valid;
    }
    if (0..N).any(|c| {
        let (top, bottom) = clues.col_pair(c);
        visibility::clue_pair_possible(N as u8, top, bottom)
    }) {
        step += table.vis_valid;
    }
    step
}

/// Upper bound on what the search can return from `depth`: one optimistic
/// step per remaining ply, discounted like the search itself.
fn bound_from(step: f64, depth: usize) -> f64 {
    if depth >= DEPTH_CAP {
        return 0.0;
    }
    step + PLY_WEIGHT * bound_from(step, depth + 1)
}

impl BranchAndBound {
    fn search<const N: usize>(
        board: &mut Board<N>,
        clues: &Clues<N>,
        depth: usize,
        step: f64,
        stats: &mut BoundedStats,
    ) -> f64 {
        if depth >= DEPTH_CAP {
            return 0.0;
        }
        // Running lower bound over the siblings of this node.
        let mut best = 0.0f64;
        let future_cap = bound_from(step, depth + 1);
        for index in board.empty_cells() {
            let opts = graph::legal_count(board, index);
            for v in 1..=N as u8 {
                if graph::has_conflict(board, index, v) {
                    stats.pruned += 1;
                    continue;
                }
                board.set(index, v);
                stats.nodes += 1;
                let imm = immediate_reward(board, clues, index, opts, &SEARCH_REWARDS);
                if imm + PLY_WEIGHT * future_cap <= best {
                    // Even a perfect remainder cannot top the best sibling.
                    stats.pruned += 1;
                    board.clear(index);
                    continue;
                }
                let value =
                    imm + PLY_WEIGHT * Self::search(board, clues, depth + 1, step, stats);
                board.clear(index);
                best = best.max(value);
            }
        }
        best
    }
}

impl<const N: usize> Strategy<N> for BranchAndBound {
    fn kind(&self) -> StrategyKind {
        StrategyKind::BranchAndBound
    }

    fn choose(&self, state: &GameState<N>) -> Option<Pick> {
        let step = optimistic_step(state.clues(), &SEARCH_REWARDS);
        let mut stats = BoundedStats::default();
        let mut scratch = state.board().clone();
        let future_cap = bound_from(step, 1);
        let mut best: Option<(Index, u8, f64)> = None;
        for index in state.board().empty_cells() {
            let opts = graph::legal_count(&scratch, index);
            for v in 1..=N as u8 {
                if graph::has_conflict(&scratch, index, v) {
                    stats.pruned += 1;
                    continue;
                }
                scratch.set(index, v);
                stats.nodes += 1;
                let imm = immediate_reward(&scratch, state.clues(), index, opts, &SEARCH_REWARDS);
                let bound = imm + PLY_WEIGHT * future_cap;
                let beaten = best.map_or(false, |(_, _, s)| bound <= s);
                if beaten {
                    stats.pruned += 1;
                    scratch.clear(index);
                    continue;
                }
                let total =
                    imm + PLY_WEIGHT * Self::search(&mut scratch, state.clues(), 1, step, &mut stats);
                scratch.clear(index);
                // Strictly-greater keeps the first of equals: row-major,
                // heights ascending, so the pick is deterministic.
                if best.map_or(true, |(_, _, s)| total > s) {
                    best = Some((index, v, total));
                }
            }
        }
        let (index, value, score) = best?;
        let rationale = format!(
            "BRANCH & BOUND\n\
             ------------------------\n \
             Move: {} at ({}, {})\n \
             Bounded score: {:.1}\n\
             ------------------------\n \
             Nodes explored: {}\n \
             Branches pruned: {}\n \
             Bound per ply: {:.1} (optimistic)\n\
             ------------------------\n\
             Strategy: depth-first search that skips branches whose\n\
             optimistic bound cannot beat the best sibling.",
            value,
            index[0] + 1,
            index[1] + 1,
            score,
            stats.nodes,
            stats.pruned,
            step,
        );
        Some(Pick { index, value, rationale })
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
