use crate::core::Index;
use crate::graph;
use crate::ranker::{sort_score_centric, MoveCandidate};
use crate::state::GameState;
use crate::strategy::{Pick, Strategy, StrategyKind};

/// How strongly a nearly-finished line pulls: 100 / (empties + 1) per axis.
const LINE_PULL: f64 = 100.0;
/// Bonus per axis with exactly one empty cell left.
const LAST_CELL_BONUS: f64 = 50.0;
/// Extra bonus when the cell is the last one of both its row and column.
const CROSSING_BONUS: f64 = 100.0;
/// Fraction of the visibility-penalty risk subtracted from a move's score.
const RISK_WEIGHT: f64 = 0.3;
/// Risk mass per axis that would complete with a failed clue (mirrors the
/// 15-life visibility penalty).
const RISK_PER_AXIS: f64 = 15.0;

/// Rushes lines to completion: cells sitting in nearly-full rows and columns
/// score high, lightly discounted by the risk that finishing a line right
/// now would blow its clue.
pub struct CompletionGreedy;

impl CompletionGreedy {
    fn cell_score<const N: usize>(state: &GameState<N>, index: Index) -> CellScore {
        let [row, col] = index;
        let empty_row = state.board().empty_in_row(row);
        let empty_col = state.board().empty_in_col(col);
        let row_priority = LINE_PULL / (empty_row as f64 + 1.0);
        let col_priority = LINE_PULL / (empty_col as f64 + 1.0);
        let mut bonus = 0.0;
        if empty_row == 1 {
            bonus += LAST_CELL_BONUS;
        }
        if empty_col == 1 {
            bonus += LAST_CELL_BONUS;
        }
        if empty_row == 1 && empty_col == 1 {
            bonus += CROSSING_BONUS;
        }
        CellScore { empty_row, empty_col, row_priority, col_priority, bonus }
    }

    /// Lives-at-stake risk of playing `v` here: +15 per axis this placement
    /// would complete with a failed visibility clue.
    fn visibility_risk<const N: usize>(state: &GameState<N>, index: Index, v: u8) -> f64 {
        let mut scratch = state.board().clone();
        scratch.set(index, v);
        let [row, col] = index;
        let mut risk = 0.0;
        if scratch.row_complete(row) {
            let (left, right) = state.clues().row_pair(row);
            if !crate::visibility::line_visibility_valid(&scratch.row_line(row), left, right) {
                risk += RISK_PER_AXIS;
            }
        }
        if scratch.col_complete(col) {
            let (top, bottom) = state.clues().col_pair(col);
            if !crate::visibility::line_visibility_valid(&scratch.col_line(col), top, bottom) {
                risk += RISK_PER_AXIS;
            }
        }
        risk
    }
}

struct CellScore {
    empty_row: usize,
    empty_col: usize,
    row_priority: f64,
    col_priority: f64,
    bonus: f64,
}

impl CellScore {
    fn total(&self) -> f64 {
        self.row_priority + self.col_priority + self.bonus
    }
}

impl<const N: usize> Strategy<N> for CompletionGreedy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Completion
    }

    fn choose(&self, state: &GameState<N>) -> Option<Pick> {
        let mut candidates = Vec::new();
        for index in state.board().empty_cells() {
            let cell = Self::cell_score(state, index);
            for v in graph::legal_values(state.board(), index).iter() {
                let risk = Self::visibility_risk(state, index, v);
                let adjusted = cell.total() - RISK_WEIGHT * risk;
                let mut cand = MoveCandidate::new(index, v, adjusted);
                cand.mrv_count = graph::legal_count(state.board(), index);
                candidates.push(cand);
            }
        }
        if candidates.is_empty() {
            return None;
        }
        sort_score_centric::<N>(&mut candidates);
        let best = &candidates[0];
        let cell = Self::cell_score(state, best.index);
        let risk = Self::visibility_risk(state, best.index, best.value);
        let rationale = format!(
            "COMPLETION GREEDY\n\
             ------------------------\n \
             Cell: ({}, {}) = {}\n \
             Row empty: {} -> priority {:.1}\n \
             Col empty: {} -> priority {:.1}\n \
             Completion bonus: {:.1}\n \
             Visibility risk: {:.1}\n \
             Adjusted score: {:.1}\n\
             ------------------------\n\
             Strategy: rush rows and columns to completion.{}",
            best.index[0] + 1,
            best.index[1] + 1,
            best.value,
            cell.empty_row,
            cell.row_priority,
            cell.empty_col,
            cell.col_priority,
            cell.bonus,
            risk,
            best.score,
            if risk > 0.0 { "\nWarning: finishing this line risks a clue penalty." } else { "" },
        );
        Some(Pick { index: best.index, value: best.value, rationale })
    }

    fn evaluate_cell(&self, state: &GameState<N>, index: Index) -> f64 {
        if !state.board().is_cell_empty(index) {
            return 0.0;
        }
        Self::cell_score(state, index).total()
    }
}
