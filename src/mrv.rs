use crate::core::Index;
use crate::graph;
use crate::ranker::{sort_score_centric, MoveCandidate};
use crate::state::GameState;
use crate::strategy::{Pick, Strategy, StrategyKind};

/// Numerator of the inverse-options formula: fewer legal heights at a cell
/// means a higher priority.
const MRV_SCALE: f64 = 1000.0;
const DEAD_CELL_SCORE: f64 = -1000.0;

/// Minimum-remaining-values heuristic: attack the most constrained cell
/// before the options dry up, playing its smallest unused height.
pub struct MrvGreedy;

impl MrvGreedy {
    fn mrv_score(legal: usize) -> f64 {
        if legal == 0 {
            DEAD_CELL_SCORE
        } else {
            MRV_SCALE / (legal as f64 + 1.0)
        }
    }

    fn constraint_label(legal: usize) -> &'static str {
        match legal {
            0 => "dead cell, avoid",
            1 => "forced move",
            2 => "very constrained",
            3 => "moderately constrained",
            _ => "less constrained",
        }
    }
}

impl<const N: usize> Strategy<N> for MrvGreedy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Mrv
    }

    fn choose(&self, state: &GameState<N>) -> Option<Pick> {
        let mut candidates = Vec::new();
        for index in state.board().empty_cells() {
            let legal = graph::legal_values(state.board(), index);
            if legal.is_empty() {
                // Scored at -1000 and filtered, like any other dead end.
                continue;
            }
            let Some(value) = legal.smallest() else { continue };
            let mut cand = MoveCandidate::new(index, value, Self::mrv_score(legal.len()));
            cand.mrv_count = legal.len();
            candidates.push(cand);
        }
        if candidates.is_empty() {
            return None;
        }
        // The inverse formula already turns "fewest options" into "highest
        // score", so the shared score-centric order does the rest.
        sort_score_centric::<N>(&mut candidates);
        let best = &candidates[0];
        let rationale = format!(
            "MRV GREEDY\n\
             ------------------------\n \
             Cell: ({}, {}) = {}\n \
             Legal options: {} ({})\n \
             MRV score: {:.0} / ({} + 1) = {:.1}\n\
             ------------------------\n\
             Strategy: fill the most constrained cells first.",
            best.index[0] + 1,
            best.index[1] + 1,
            best.value,
            best.mrv_count,
            Self::constraint_label(best.mrv_count),
            MRV_SCALE,
            best.mrv_count,
            best.score,
        );
        Some(Pick { index: best.index, value: best.value, rationale })
    }

    fn evaluate_cell(&self, state: &GameState<N>, index: Index) -> f64 {
        if !state.board().is_cell_empty(index) {
            return 0.0;
        }
        Self::mrv_score(graph::legal_count(state.board(), index)).max(0.0)
    }
}
