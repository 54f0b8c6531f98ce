use std::collections::HashMap;
use crate::board::{Board, Clues};
use crate::core::Index;
use crate::graph;
use crate::ranker::MoveCandidate;
use crate::reward::{immediate_reward, DP_REWARDS};
use crate::state::GameState;
use crate::strategy::{Pick, Strategy, StrategyKind};

/// Discount applied to each further ply of lookahead.
pub const FUTURE_WEIGHT: f64 = 0.6;
/// Lookahead horizon: plies at and beyond this depth are worth 0.
pub const DEPTH_CAP: usize = 3;
/// The heat-map runs a cheaper horizon: one ply shallower, half the weight.
const HEAT_FUTURE_WEIGHT: f64 = FUTURE_WEIGHT / 2.0;

/// Memoised bounded lookahead: every candidate is scored as its immediate
/// reward plus the best discounted future reachable within the horizon,
/// with subtree values cached under the board's base-(N+1) key. The memo
/// lives for one invocation and dies with it.
pub struct DynamicProgramming;

struct DpRun<'a, const N: usize> {
    clues: &'a Clues<N>,
    memo: HashMap<u64, f64>,
    memo_hits: usize,
    nodes: usize,
}

impl<'a, const N: usize> DpRun<'a, N> {
    fn new(clues: &'a Clues<N>) -> Self {
        DpRun { clues, memo: HashMap::new(), memo_hits: 0, nodes: 0 }
    }

    /// Best cumulative discounted reward reachable from this position.
    /// Exploration is place/undo on the one scratch board.
    fn dp_value(&mut self, board: &mut Board<N>, depth: usize) -> f64 {
        if depth >= DEPTH_CAP {
            return 0.0;
        }
        let key = board.encode_key();
        if let Some(&cached) = self.memo.get(&key) {
            self.memo_hits += 1;
            return cached;
        }
        let mut best = 0.0f64;
        for index in board.empty_cells() {
            let opts = graph::legal_count(board, index);
            for v in graph::legal_values(board, index).iter() {
                board.set(index, v);
                self.nodes += 1;
                let value = immediate_reward(board, self.clues, index, opts, &DP_REWARDS)
                    + FUTURE_WEIGHT * self.dp_value(board, depth + 1);
                board.clear(index);
                best = best.max(value);
            }
        }
        self.memo.insert(key, best);
        best
    }
}

/// Raw lookahead value of a position from the given depth, on a fresh memo.
/// Mostly useful to tests and analysis; `choose` drives the same machinery.
pub fn dp_value<const N: usize>(board: &Board<N>, clues: &Clues<N>, depth: usize) -> f64 {
    let mut run = DpRun::new(clues);
    let mut scratch = board.clone();
    run.dp_value(&mut scratch, depth)
}

impl<const N: usize> Strategy<N> for DynamicProgramming {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DynamicProgramming
    }

    fn choose(&self, state: &GameState<N>) -> Option<Pick> {
        let mut run = DpRun::new(state.clues());
        let mut scratch = state.board().clone();
        let mut candidates = Vec::new();
        for index in state.board().empty_cells() {
            let opts = graph::legal_count(&scratch, index);
            for v in graph::legal_values(&scratch, index).iter() {
                scratch.set(index, v);
                let immediate = immediate_reward(&scratch, state.clues(), index, opts, &DP_REWARDS);
                let future = run.dp_value(&mut scratch, 1);
                scratch.clear(index);
                let mut cand = MoveCandidate::new(index, v, immediate + future);
                cand.mrv_count = opts;
                candidates.push(cand);
            }
        }
        if candidates.is_empty() {
            return None;
        }
        // Best total first; among equals prefer the forcing move (fewest
        // options), then fixed positional order for determinism.
        candidates.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.mrv_count.cmp(&b.mrv_count))
                .then(a.index[0].cmp(&b.index[0]))
                .then(a.index[1].cmp(&b.index[1]))
                .then(a.value.cmp(&b.value))
        });
        let best = &candidates[0];
        // Re-derive the split for the report; the memo is still warm.
        scratch.set(best.index, best.value);
        let immediate =
            immediate_reward(&scratch, state.clues(), best.index, best.mrv_count, &DP_REWARDS);
        let future = run.dp_value(&mut scratch, 1);
        scratch.clear(best.index);
        let rationale = format!(
            "DYNAMIC PROGRAMMING\n\
             ------------------------\n \
             Move: {} at ({}, {})\n \
             Immediate reward: {:.1}\n \
             Discounted future: {:.1}\n \
             Total: {:.1}\n\
             ------------------------\n \
             Candidates scored: {}\n \
             Memo entries: {}, hits: {}\n \
             Nodes expanded: {}\n\
             ------------------------\n\
             Strategy: memoised lookahead over a {}-ply horizon.",
            best.value,
            best.index[0] + 1,
            best.index[1] + 1,
            immediate,
            future,
            best.score,
            candidates.len(),
            run.memo.len(),
            run.memo_hits,
            run.nodes,
            DEPTH_CAP,
        );
        Some(Pick { index: best.index, value: best.value, rationale })
    }

    fn evaluate_cell(&self, state: &GameState<N>, index: Index) -> f64 {
        if !state.board().is_cell_empty(index) {
            return 0.0;
        }
        let mut run = DpRun::new(state.clues());
        let mut scratch = state.board().clone();
        let opts = graph::legal_count(&scratch, index);
        let mut max = 0.0f64;
        for v in graph::legal_values(&scratch, index).iter() {
            scratch.set(index, v);
            let immediate = immediate_reward(&scratch, state.clues(), index, opts, &DP_REWARDS);
            let future = run.dp_value(&mut scratch, DEPTH_CAP - 1);
            scratch.clear(index);
            max = max.max(immediate + HEAT_FUTURE_WEIGHT * future);
        }
        max
    }
}
