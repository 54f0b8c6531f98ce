use crate::core::{Actor, Index};
use crate::graph;
use crate::ranker::{sort_score_centric, MoveCandidate};
use crate::state::GameState;
use crate::strategy::{Pick, Strategy, StrategyKind};

/// Safety weight per legal height still open at a cell.
const SAFETY_PER_OPTION: f64 = 25.0;
/// Score for a cell with no legal height at all; filtered before sorting.
const DEATH_TRAP_SCORE: f64 = -1000.0;

/// Plays for the life pool, not the scoreboard: the fewer lives the machine
/// has left, the harder it leans towards cells with many legal heights,
/// always choosing the smallest legal height (the least committal one).
pub struct SurvivalGreedy;

/// Emergency multiplier, stepped on the machine's remaining lives.
pub fn emergency_multiplier(lives: u32) -> f64 {
    match lives {
        0..=15 => 4.0,
        16..=30 => 3.0,
        31..=50 => 2.0,
        51..=75 => 1.5,
        _ => 1.0,
    }
}

/// Tier label matching `emergency_multiplier`, surfaced in the rationale.
pub fn emergency_tier(lives: u32) -> &'static str {
    match lives {
        0..=15 => "CRITICAL",
        16..=30 => "EMERGENCY",
        31..=50 => "WARNING",
        51..=75 => "ALERT",
        _ => "SAFE",
    }
}

impl SurvivalGreedy {
    fn survival_score<const N: usize>(state: &GameState<N>, index: Index) -> f64 {
        let legal = graph::legal_count(state.board(), index);
        if legal == 0 {
            return DEATH_TRAP_SCORE;
        }
        let lives = state.player(Actor::Machine).lives;
        let safety = SAFETY_PER_OPTION * legal as f64;
        let pressure = (100.0 - lives as f64) / 20.0;
        safety * emergency_multiplier(lives) + pressure
    }
}

impl<const N: usize> Strategy<N> for SurvivalGreedy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Survival
    }

    fn choose(&self, state: &GameState<N>) -> Option<Pick> {
        let lives = state.player(Actor::Machine).lives;
        let mut candidates = Vec::new();
        for index in state.board().empty_cells() {
            let score = Self::survival_score(state, index);
            if score <= DEATH_TRAP_SCORE {
                // A cell with no legal height is a trap, not a move.
                continue;
            }
            let legal = graph::legal_values(state.board(), index);
            let Some(value) = legal.smallest() else { continue };
            let mut cand = MoveCandidate::new(index, value, score);
            cand.mrv_count = legal.len();
            candidates.push(cand);
        }
        if candidates.is_empty() {
            return None;
        }
        sort_score_centric::<N>(&mut candidates);
        let best = &candidates[0];
        let rationale = format!(
            "SURVIVAL GREEDY - {}\n\
             ------------------------\n \
             Cell: ({}, {}) = {}\n \
             CPU lives: {}\n \
             Legal options: {}\n \
             Base safety: {:.1}\n \
             Emergency multiplier: x{:.1}\n \
             Lives pressure: +{:.1}\n \
             Final score: {:.1}\n\
             ------------------------\n\
             Strategy: maximise survival, avoid penalties at all costs.",
            emergency_tier(lives),
            best.index[0] + 1,
            best.index[1] + 1,
            best.value,
            lives,
            best.mrv_count,
            SAFETY_PER_OPTION * best.mrv_count as f64,
            emergency_multiplier(lives),
            (100.0 - lives as f64) / 20.0,
            best.score,
        );
        Some(Pick { index: best.index, value: best.value, rationale })
    }

    fn evaluate_cell(&self, state: &GameState<N>, index: Index) -> f64 {
        if !state.board().is_cell_empty(index) {
            return 0.0;
        }
        Self::survival_score(state, index)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::board::{Board, Clues};
    use crate::state::test_util::set_lives;

    #[test]
    fn test_multiplier_steps() {
        assert_eq!(emergency_multiplier(10), 4.0);
        assert_eq!(emergency_multiplier(15), 4.0);
        assert_eq!(emergency_multiplier(16), 3.0);
        assert_eq!(emergency_multiplier(30), 3.0);
        assert_eq!(emergency_multiplier(50), 2.0);
        assert_eq!(emergency_multiplier(75), 1.5);
        assert_eq!(emergency_multiplier(76), 1.0);
        assert_eq!(emergency_multiplier(100), 1.0);
        assert_eq!(emergency_tier(10), "CRITICAL");
        assert_eq!(emergency_tier(100), "SAFE");
    }

    #[test]
    fn test_picks_safest_cell_with_smallest_value() {
        // (3,3)'s row and column are nearly full, so it has one option;
        // open cells keep all four.
        let board = Board::from_rows([
            [0, 0, 0, 4],
            [0, 0, 0, 1],
            [0, 0, 0, 2],
            [4, 1, 2, 0],
        ]);
        let state = GameState::with_board(Clues::unconstrained(), board);
        let pick = SurvivalGreedy.choose(&state).unwrap();
        // The most central wide-open cell wins; smallest legal height.
        assert_eq!(pick.index, [1, 1]);
        assert_eq!(pick.value, 2);
        assert!(pick.rationale.contains("SURVIVAL GREEDY"));
    }

    #[test]
    fn test_death_traps_filtered() {
        // (0,0) is blocked outright: row holds 1,2,3 and column holds 4.
        let board = Board::from_rows([
            [0, 1, 2, 3],
            [4, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        let state = GameState::with_board(Clues::unconstrained(), board);
        assert_eq!(
            SurvivalGreedy.evaluate_cell(&state, [0, 0]),
            DEATH_TRAP_SCORE
        );
        let pick = SurvivalGreedy.choose(&state).unwrap();
        assert_ne!(pick.index, [0, 0]);
    }

    #[test]
    fn test_emergency_raises_scores() {
        let mut state: GameState<4> = GameState::new(Clues::unconstrained());
        let calm = SurvivalGreedy.evaluate_cell(&state, [0, 0]);
        set_lives(&mut state, Actor::Machine, 10);
        let desperate = SurvivalGreedy.evaluate_cell(&state, [0, 0]);
        // 4 options: 100 * 1.0 + 0 vs 100 * 4.0 + 4.5.
        assert_eq!(calm, 100.0);
        assert_eq!(desperate, 404.5);
        assert!(state
            .machine_rationale()
            .is_empty());
    }
}
