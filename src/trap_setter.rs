use crate::board::{Board, Clues};
use crate::core::Index;
use crate::forward_check::SearchStats;
use crate::graph;
use crate::ranker::{sort_lcv, sort_mrv, MoveCandidate};
use crate::state::{placement_feasible_on, GameState};
use crate::strategy::{Pick, Strategy, StrategyKind};

/// Cap on counted futures per candidate, so early turns stay bounded.
pub const SOLUTION_LIMIT: usize = 50;

/// The adversarial pick: exhaustive DFS, ordered by the MRV cell order and
/// the LCV value order, counting how many valid completed boards survive
/// each candidate move. It then plays the move leaving the opponent the
/// fewest live futures, without quite collapsing the board to none.
pub struct TrapSetter;

/// Counts complete valid boards reachable from this position, up to
/// `limit`. Branches are pruned on conflicts and on clue pairs that the
/// filled prefix of a line has already made impossible; since every line's
/// completion passes that exact check, any full board reached here is
/// fully valid.
fn count_futures<const N: usize>(
    board: &mut Board<N>,
    clues: &Clues<N>,
    stats: &mut SearchStats,
    limit: usize,
) -> usize {
    let empties = board.empty_cells();
    if empties.is_empty() {
        return 1;
    }
    // Most constrained cell first; empties are row-major so ties are stable.
    let cell = *empties
        .iter()
        .min_by_key(|&&index| graph::legal_count(board, index))
        .unwrap();
    let mut total = 0;
    for v in graph::legal_values(board, cell).iter() {
        board.set(cell, v);
        stats.nodes += 1;
        if !placement_feasible_on(board, clues, cell) {
            stats.pruned += 1;
            board.clear(cell);
            continue;
        }
        total += count_futures(board, clues, stats, limit - total);
        board.clear(cell);
        if total >= limit {
            return total;
        }
    }
    total
}

impl<const N: usize> Strategy<N> for TrapSetter {
    fn kind(&self) -> StrategyKind {
        StrategyKind::TrapSetter
    }

    fn choose(&self, state: &GameState<N>) -> Option<Pick> {
        let mut stats = SearchStats::default();
        let mut scratch = state.board().clone();

        // MRV over cells, LCV over each cell's heights: the enumeration
        // order doubles as the deterministic tie-break.
        let mut cells = Vec::new();
        for index in state.board().empty_cells() {
            let legal = graph::legal_count(&scratch, index);
            if legal == 0 {
                continue;
            }
            let mut cand = MoveCandidate::new(index, 0, 0.0);
            cand.mrv_count = legal;
            cells.push(cand);
        }
        sort_mrv::<N>(&mut cells);

        let mut evaluated: Vec<(Index, u8, usize)> = Vec::new();
        for cell in &cells {
            let mut values = Vec::new();
            for v in graph::legal_values(&scratch, cell.index).iter() {
                scratch.set(cell.index, v);
                let mut cand = MoveCandidate::new(cell.index, v, 0.0);
                cand.lcv_score = graph::board_legal_placements(&scratch);
                scratch.clear(cell.index);
                values.push(cand);
            }
            sort_lcv(&mut values);
            for cand in &values {
                scratch.set(cand.index, cand.value);
                let futures = count_futures(&mut scratch, state.clues(), &mut stats, SOLUTION_LIMIT);
                scratch.clear(cand.index);
                evaluated.push((cand.index, cand.value, futures));
            }
        }
        if evaluated.is_empty() {
            return None;
        }

        // Starve the opponent: fewest futures that still keep the board
        // solvable. If every candidate kills the board, keep the one with
        // the most futures (the least catastrophic of them).
        let mut best: Option<(Index, u8, usize)> = None;
        for &(index, value, futures) in &evaluated {
            if futures == 0 {
                continue;
            }
            if best.map_or(true, |(_, _, f)| futures < f) {
                best = Some((index, value, futures));
            }
        }
        let (index, value, futures) = best.unwrap_or_else(|| {
            let mut fallback = evaluated[0];
            for &cand in &evaluated {
                if cand.2 > fallback.2 {
                    fallback = cand;
                }
            }
            fallback
        });

        let futures_text = if futures >= SOLUTION_LIMIT {
            format!("{}+", SOLUTION_LIMIT)
        } else {
            futures.to_string()
        };
        let rationale = format!(
            "TRAP SETTER\n\
             ------------------------\n \
             Move: {} at ({}, {})\n \
             Futures remaining: {}\n\
             ------------------------\n \
             Nodes explored: {}\n \
             Branches pruned: {}\n \
             Candidates weighed: {}\n\
             ------------------------\n\
             Strategy: DFS ordered by MRV and LCV, starving the opponent\n\
             of valid completions.",
            value,
            index[0] + 1,
            index[1] + 1,
            futures_text,
            stats.nodes,
            stats.pruned,
            evaluated.len(),
        );
        Some(Pick { index, value, rationale })
    }

    fn evaluate_cell(&self, state: &GameState<N>, index: Index) -> f64 {
        if !state.board().is_cell_empty(index) {
            return 0.0;
        }
        let mut stats = SearchStats::default();
        let mut scratch = state.board().clone();
        let mut best: Option<usize> = None;
        for v in graph::legal_values(state.board(), index).iter() {
            scratch.set(index, v);
            let futures = count_futures(&mut scratch, state.clues(), &mut stats, SOLUTION_LIMIT);
            scratch.clear(index);
            if futures >= 1 && best.map_or(true, |f| futures < f) {
                best = Some(futures);
            }
        }
        match best {
            // The tighter the squeeze, the hotter the cell.
            Some(futures) => SOLUTION_LIMIT.saturating_sub(futures) as f64,
            None => 0.0,
        }
    }
}
