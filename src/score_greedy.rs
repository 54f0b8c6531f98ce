use crate::core::Index;
use crate::graph;
use crate::ranker::{sort_score_centric, MoveCandidate};
use crate::state::GameState;
use crate::strategy::{Pick, Strategy, StrategyKind};
use crate::visibility;

const BASE_POINTS: f64 = 1.0;
const AXIS_POINTS: f64 = 10.0;
/// The gamble: claimed for a completed axis unless the clue pair is
/// impossible for every arrangement, which is the only cheap certainty.
const CLUE_GAMBLE_POINTS: f64 = 15.0;
const DOUBLE_POINTS: f64 = 25.0;
const CRAMPED_PENALTY: f64 = -5.0;

/// Chases immediate points: completions are gold, and the clue bonus is
/// claimed optimistically whenever the clue pair is satisfiable at all.
/// The only concession to caution is a small discount on cramped cells.
pub struct ScoreGreedy;

impl ScoreGreedy {
    fn move_score<const N: usize>(state: &GameState<N>, index: Index, v: u8) -> f64 {
        let mut scratch = state.board().clone();
        scratch.set(index, v);
        let [row, col] = index;
        let mut score = BASE_POINTS;

        let row_done = scratch.row_complete(row);
        let col_done = scratch.col_complete(col);
        if row_done {
            score += AXIS_POINTS;
            let (left, right) = state.clues().row_pair(row);
            if visibility::clue_pair_possible(N as u8, left, right) {
                score += CLUE_GAMBLE_POINTS;
            }
        }
        if col_done {
            score += AXIS_POINTS;
            let (top, bottom) = state.clues().col_pair(col);
            if visibility::clue_pair_possible(N as u8, top, bottom) {
                score += CLUE_GAMBLE_POINTS;
            }
        }
        if row_done && col_done {
            score += DOUBLE_POINTS;
        }
        if graph::legal_count(state.board(), index) <= 2 {
            score += CRAMPED_PENALTY;
        }
        score
    }
}

impl<const N: usize> Strategy<N> for ScoreGreedy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ScoreGreedy
    }

    fn choose(&self, state: &GameState<N>) -> Option<Pick> {
        let mut candidates = Vec::new();
        for index in state.board().empty_cells() {
            let legal = graph::legal_values(state.board(), index);
            for v in legal.iter() {
                let mut cand = MoveCandidate::new(index, v, Self::move_score(state, index, v));
                cand.mrv_count = legal.len();
                candidates.push(cand);
            }
        }
        if candidates.is_empty() {
            return None;
        }
        sort_score_centric::<N>(&mut candidates);
        let best = &candidates[0];
        let mut scratch = state.board().clone();
        scratch.set(best.index, best.value);
        let row_done = scratch.row_complete(best.index[0]);
        let col_done = scratch.col_complete(best.index[1]);
        let rationale = format!(
            "SCORE GREEDY\n\
             ------------------------\n \
             Move: {} at ({}, {})\n \
             Legal options: {}{}\n\
             {}{}{} \
             Projected score: {:.1}\n\
             ------------------------\n\
             Strategy: maximise immediate points.",
            best.value,
            best.index[0] + 1,
            best.index[1] + 1,
            best.mrv_count,
            if best.mrv_count <= 2 { " -> cramped, -5" } else { "" },
            if row_done { " Completes the row (+10, +15 gamble)\n" } else { "" },
            if col_done { " Completes the column (+10, +15 gamble)\n" } else { "" },
            if row_done && col_done { " Double completion (+25)\n" } else { "" },
            best.score,
        );
        Some(Pick { index: best.index, value: best.value, rationale })
    }

    fn evaluate_cell(&self, state: &GameState<N>, index: Index) -> f64 {
        if !state.board().is_cell_empty(index) {
            return 0.0;
        }
        let mut max = 0.0f64;
        for v in graph::legal_values(state.board(), index).iter() {
            max = max.max(Self::move_score(state, index, v));
        }
        max
    }
}
