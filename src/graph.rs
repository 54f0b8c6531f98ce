use crate::board::Board;
use crate::core::{Index, ValueSet};

/// The constraint relation between cells: two distinct cells are peers when
/// they share a row or a column. The relation is recomputed on demand with
/// two line scans rather than materialised as vertices and edges; at the
/// sizes this engine supports, the scans are the representation.

/// True iff some peer of `index` currently holds `v`. The cell itself is
/// never inspected, so the test reads the same whether the cell is empty or
/// mid-hypothesis. O(N).
pub fn has_conflict<const N: usize>(board: &Board<N>, index: Index, v: u8) -> bool {
    let [row, col] = index;
    for c in 0..N {
        if c != col && board.height([row, c]) == v {
            return true;
        }
    }
    for r in 0..N {
        if r != row && board.height([r, col]) == v {
            return true;
        }
    }
    false
}

/// The set of heights in 1..=N placeable at a cell without a peer conflict.
/// Cell emptiness is deliberately not consulted; callers filter on that.
pub fn legal_values<const N: usize>(board: &Board<N>, index: Index) -> ValueSet {
    let mut vs = ValueSet::full(N);
    let [row, col] = index;
    for c in 0..N {
        if c != col {
            let h = board.height([row, c]);
            if h != 0 {
                vs.remove(h);
            }
        }
    }
    for r in 0..N {
        if r != row {
            let h = board.height([r, col]);
            if h != 0 {
                vs.remove(h);
            }
        }
    }
    vs
}

pub fn legal_count<const N: usize>(board: &Board<N>, index: Index) -> usize {
    legal_values(board, index).len()
}

/// Total count of conflict-free (empty cell, value) placements on the whole
/// board, the "least constraining value" measure: the more placements a
/// hypothetical move leaves behind, the less it constrains everyone else.
pub fn board_legal_placements<const N: usize>(board: &Board<N>) -> usize {
    let mut count = 0;
    for r in 0..N {
        for c in 0..N {
            if board.is_cell_empty([r, c]) {
                count += legal_count(board, [r, c]);
            }
        }
    }
    count
}

pub fn has_any_legal_move<const N: usize>(board: &Board<N>) -> bool {
    for r in 0..N {
        for c in 0..N {
            if board.is_cell_empty([r, c]) && legal_count(board, [r, c]) > 0 {
                return true;
            }
        }
    }
    false
}
