use crate::core::Index;
use crate::graph;
use crate::ranker::{cmp_score_centric, sort_score_centric, MoveCandidate};
use crate::reward::{immediate_reward, DNC_REWARDS};
use crate::state::GameState;
use crate::strategy::{Pick, Strategy, StrategyKind};

/// Bonus granted to the champion of the quadrant with the most empty cells.
const CONTROL_BONUS: f64 = 5.0;

/// Divide and conquer: score every legal move quadrant by quadrant, crown a
/// local champion in each, hand the emptiest quadrant a control bonus, and
/// merge the champions into one global winner.
pub struct DivideAndConquer;

#[derive(Debug, Clone, Copy)]
struct Quadrant {
    rows: (usize, usize),
    cols: (usize, usize),
}

impl DivideAndConquer {
    fn quadrants<const N: usize>() -> [Quadrant; 4] {
        let half = N.div_ceil(2);
        [
            Quadrant { rows: (0, half), cols: (0, half) },
            Quadrant { rows: (0, half), cols: (half, N) },
            Quadrant { rows: (half, N), cols: (0, half) },
            Quadrant { rows: (half, N), cols: (half, N) },
        ]
    }

    /// All scored legal moves inside one region. Regions wider than 2x2
    /// recurse into their own four sub-regions; at N=4 the base case is
    /// immediate.
    fn solve_region<const N: usize>(
        state: &GameState<N>,
        quad: Quadrant,
        moves: &mut Vec<MoveCandidate>,
    ) {
        let (r_start, r_end) = quad.rows;
        let (c_start, c_end) = quad.cols;
        let mut scratch = state.board().clone();
        for r in r_start..r_end {
            for c in c_start..c_end {
                if !scratch.is_cell_empty([r, c]) {
                    continue;
                }
                let opts = graph::legal_count(&scratch, [r, c]);
                for v in graph::legal_values(state.board(), [r, c]).iter() {
                    scratch.set([r, c], v);
                    let score = immediate_reward(&scratch, state.clues(), [r, c], opts, &DNC_REWARDS);
                    scratch.clear([r, c]);
                    let mut cand = MoveCandidate::new([r, c], v, score);
                    cand.mrv_count = opts;
                    moves.push(cand);
                }
            }
        }
        if r_end - r_start > 2 && c_end - c_start > 2 {
            let r_mid = (r_start + r_end) / 2;
            let c_mid = (c_start + c_end) / 2;
            for sub in [
                Quadrant { rows: (r_start, r_mid), cols: (c_start, c_mid) },
                Quadrant { rows: (r_start, r_mid), cols: (c_mid, c_end) },
                Quadrant { rows: (r_mid, r_end), cols: (c_start, c_mid) },
                Quadrant { rows: (r_mid, r_end), cols: (c_mid, c_end) },
            ] {
                Self::solve_region(state, sub, moves);
            }
        }
    }

    fn empty_in_quadrant<const N: usize>(state: &GameState<N>, quad: Quadrant) -> usize {
        let mut count = 0;
        for r in quad.rows.0..quad.rows.1 {
            for c in quad.cols.0..quad.cols.1 {
                if state.board().is_cell_empty([r, c]) {
                    count += 1;
                }
            }
        }
        count
    }
}

impl<const N: usize> Strategy<N> for DivideAndConquer {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DivideAndConquer
    }

    fn choose(&self, state: &GameState<N>) -> Option<Pick> {
        let quads = Self::quadrants::<N>();
        let empties: Vec<usize> = quads.iter().map(|&q| Self::empty_in_quadrant(state, q)).collect();
        let richest = empties.iter().copied().max().unwrap_or(0);

        let mut champions = Vec::new();
        let mut summaries = Vec::new();
        let mut total_moves = 0;
        for (q, &quad) in quads.iter().enumerate() {
            let mut moves = Vec::new();
            Self::solve_region(state, quad, &mut moves);
            total_moves += moves.len();
            if moves.is_empty() {
                summaries.push(format!(
                    " Q{} [r{}-{} c{}-{}]: no moves (empty={})",
                    q + 1,
                    quad.rows.0 + 1,
                    quad.rows.1,
                    quad.cols.0 + 1,
                    quad.cols.1,
                    empties[q],
                ));
                continue;
            }
            sort_score_centric::<N>(&mut moves);
            let mut champ = moves[0].clone();
            // Controlling the richest quadrant is worth a little extra.
            if empties[q] == richest {
                champ.score += CONTROL_BONUS;
            }
            summaries.push(format!(
                " Q{} [r{}-{} c{}-{}]: best={}@({},{}) score={:.1} empty={}",
                q + 1,
                quad.rows.0 + 1,
                quad.rows.1,
                quad.cols.0 + 1,
                quad.cols.1,
                champ.value,
                champ.index[0] + 1,
                champ.index[1] + 1,
                champ.score,
                empties[q],
            ));
            champions.push(champ);
        }
        if champions.is_empty() {
            return None;
        }
        // Merge step: best score wins; ties go to the champion with more
        // options left (more control), then the usual positional order.
        champions.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(b.mrv_count.cmp(&a.mrv_count))
                .then_with(|| cmp_score_centric::<N>(a, b))
        });
        let best = &champions[0];
        let rationale = format!(
            "DIVIDE & CONQUER\n\
             ------------------------\n \
             Move: {} at ({}, {})\n \
             Score: {:.1}\n \
             Legal options: {}\n\
             ------------------------\n\
             Quadrant analysis:\n{}\n \
             Total moves scanned: {}\n\
             ------------------------\n\
             Strategy: local champions per quadrant, merged globally.",
            best.value,
            best.index[0] + 1,
            best.index[1] + 1,
            best.score,
            best.mrv_count,
            summaries.join("\n"),
            total_moves,
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
            max = max.max(immediate_reward(&scratch, state.clues(), index, opts, &DNC_REWARDS));
            scratch.clear(index);
        }
        max
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::board::{Board, Clues};

    #[test]
    fn test_finds_move_and_reports_quadrants() {
        let state: GameState<4> = GameState::new(Clues::unconstrained());
        let pick = DivideAndConquer.choose(&state).unwrap();
        assert!(pick.value >= 1 && pick.value <= 4);
        assert!(pick.rationale.contains("DIVIDE & CONQUER"));
        assert!(pick.rationale.contains("Q1"));
        assert!(pick.rationale.contains("Q4"));
    }

    #[test]
    fn test_completion_dominates_merge() {
        // The only near-complete line sits in Q1; its completion reward
        // should out-merge every open-cell candidate.
        let board = Board::from_rows([
            [0, 3, 1, 4],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        // Completing [2,3,1,4] reads 3 from the left; give it the matching
        // clue so the visibility bonus also lands.
        let state = GameState::with_board(
            Clues::new([0; 4], [1, 0, 0, 0], [0; 4], [3, 0, 0, 0]),
            board,
        );
        let pick = DivideAndConquer.choose(&state).unwrap();
        assert_eq!(pick.index, [0, 0]);
        assert_eq!(pick.value, 2);
    }

    #[test]
    fn test_quadrants_cover_board_without_overlap() {
        let quads = DivideAndConquer::quadrants::<4>();
        let mut seen = [[0u8; 4]; 4];
        for quad in quads {
            for r in quad.rows.0..quad.rows.1 {
                for c in quad.cols.0..quad.cols.1 {
                    seen[r][c] += 1;
                }
            }
        }
        assert!(seen.iter().all(|row| row.iter().all(|&n| n == 1)));
    }

    #[test]
    fn test_empty_quadrant_reported_without_candidates() {
        // Q4 fully filled; the other quadrants still produce moves.
        let board = Board::from_rows([
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 1, 2],
            [0, 0, 3, 4],
        ]);
        let state = GameState::with_board(Clues::unconstrained(), board);
        let pick = DivideAndConquer.choose(&state).unwrap();
        assert!(pick.rationale.contains("no moves"));
        assert!(pick.index[0] < 2 || pick.index[1] < 2);
    }

    #[test]
    fn test_no_moves_on_full_board() {
        let full = Board::from_rows([
            [1, 2, 3, 4],
            [2, 3, 4, 1],
            [3, 4, 1, 2],
            [4, 1, 2, 3],
        ]);
        let state = GameState::with_board(Clues::unconstrained(), full);
        assert!(DivideAndConquer.choose(&state).is_none());
    }
}
