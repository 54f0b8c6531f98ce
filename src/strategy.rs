use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display, EnumCount, EnumIter};
use crate::core::Index;
use crate::state::GameState;

/// A strategy's answer for one machine turn: where to play, what to play,
/// and the human-readable account of why. The engine copies the rationale
/// into `GameState::machine_rationale`; strategies themselves never touch
/// the state.
#[derive(Debug, Clone, PartialEq)]
pub struct Pick {
    pub index: Index,
    pub value: u8,
    pub rationale: String,
}

/// The selectable move-pickers. The primitive conversions let a presentation
/// layer bind these to a numbered widget row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive, Display, EnumCount, EnumIter,
)]
#[repr(u8)]
pub enum StrategyKind {
    Completion,
    Survival,
    ScoreGreedy,
    Mrv,
    DynamicProgramming,
    DivideAndConquer,
    ForwardCheck,
    BranchAndBound,
    TrapSetter,
}

/// One interchangeable move-picker. Implementations read the state, explore
/// hypotheticals on scratch copies of the board, and return their pick; the
/// caller-visible grid is never mutated from here.
pub trait Strategy<const N: usize> {
    fn kind(&self) -> StrategyKind;

    /// The best move available, or None when no legal candidate exists.
    fn choose(&self, state: &GameState<N>) -> Option<Pick>;

    /// Heat-map score for one cell: 0 for filled cells, otherwise the
    /// strategy-specific desirability of the best legal height there
    /// (possibly under a cheaper horizon than `choose`).
    fn evaluate_cell(&self, state: &GameState<N>, index: Index) -> f64;
}

#[cfg(test)]
mod test {
    use super::*;
    use strum::{EnumCount as _, IntoEnumIterator};

    #[test]
    fn test_kind_roundtrips_through_u8() {
        for kind in StrategyKind::iter() {
            let raw: u8 = kind.into();
            assert_eq!(StrategyKind::try_from(raw).unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_count() {
        assert_eq!(StrategyKind::COUNT, 9);
        assert!(StrategyKind::try_from(StrategyKind::COUNT as u8).is_err());
    }
}
