use crate::board::{Board, Clues};
use crate::core::Index;
use crate::visibility;

/// The shared reward language of the look-ahead strategies. Every constant a
/// strategy feeds into `immediate_reward` lives in one of these published
/// tables, so tests can pin them and nothing is inlined at call sites.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardTable {
    pub base: f64,
    pub row_complete: f64,
    pub col_complete: f64,
    pub vis_valid: f64,
    pub double_complete: f64,
    /// Applied when the cell had at most one legal height.
    pub tight_penalty: f64,
    /// Applied when the cell had exactly two legal heights.
    pub low_penalty: f64,
}

/// Dynamic programming variant; the one table that pays 30 for a double
/// completion.
pub const DP_REWARDS: RewardTable = RewardTable {
    base: 1.0,
    row_complete: 12.0,
    col_complete: 12.0,
    vis_valid: 18.0,
    double_complete: 30.0,
    tight_penalty: -12.0,
    low_penalty: -6.0,
};

/// Divide-and-conquer variant.
pub const DNC_REWARDS: RewardTable = RewardTable {
    base: 1.0,
    row_complete: 12.0,
    col_complete: 12.0,
    vis_valid: 18.0,
    double_complete: 28.0,
    tight_penalty: -10.0,
    low_penalty: -5.0,
};

/// Backtracking and branch-and-bound variant.
pub const SEARCH_REWARDS: RewardTable = RewardTable {
    base: 1.0,
    row_complete: 12.0,
    col_complete: 12.0,
    vis_valid: 18.0,
    double_complete: 28.0,
    tight_penalty: -12.0,
    low_penalty: -5.0,
};

/// Immediate reward for the placement already scribbled onto `after` at
/// `index`. `opts` is the count of legal heights at the cell before the
/// placement; since a placement never changes its own peers, the count reads
/// the same on the post-move board. Pure and side-effect-free.
pub fn immediate_reward<const N: usize>(
    after: &Board<N>,
    clues: &Clues<N>,
    index: Index,
    opts: usize,
    table: &RewardTable,
) -> f64 {
    let [row, col] = index;
    let mut score = table.base;

    let row_done = after.row_complete(row);
    let col_done = after.col_complete(col);

    if row_done {
        score += table.row_complete;
        let (left, right) = clues.row_pair(row);
        if visibility::line_visibility_valid(&after.row_line(row), left, right) {
            score += table.vis_valid;
        }
    }
    if col_done {
        score += table.col_complete;
        let (top, bottom) = clues.col_pair(col);
        if visibility::line_visibility_valid(&after.col_line(col), top, bottom) {
            score += table.vis_valid;
        }
    }
    if row_done && col_done {
        score += table.double_complete;
    }

    if opts <= 1 {
        score += table.tight_penalty;
    } else if opts <= 2 {
        score += table.low_penalty;
    }

    score
}
