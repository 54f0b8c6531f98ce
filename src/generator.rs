use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use crate::board::{Board, Clues};
use crate::graph;
use crate::visibility::count_visible;

/// A freshly generated duel: the clue set handed to the players plus the
/// witness square the clues were derived from. Consistency is by
/// construction, since every clue is a visibility count of the witness.
#[derive(Debug, Clone, PartialEq)]
pub struct Puzzle<const N: usize> {
    pub clues: Clues<N>,
    pub solution: Board<N>,
}

/// Generates a random valid Latin square by shuffled backtracking and reads
/// the clues off it. All randomness comes from the caller's seeded rng; the
/// same seed always yields the same puzzle.
pub fn generate<const N: usize>(rng: &mut ChaCha20Rng) -> Puzzle<N> {
    let mut board = Board::new();
    if !fill(&mut board, 0, rng) {
        // Cannot happen for N <= 6, but the generator refuses to panic over
        // a puzzle: fall back to the cyclic square.
        board = fallback_square();
    }
    Puzzle { clues: derive_clues(&board), solution: board }
}

fn fill<const N: usize>(board: &mut Board<N>, cell: usize, rng: &mut ChaCha20Rng) -> bool {
    if cell == N * N {
        return true;
    }
    let index = [cell / N, cell % N];
    let mut values: Vec<u8> = (1..=N as u8).collect();
    values.shuffle(rng);
    for v in values {
        if !graph::has_conflict(board, index, v) {
            board.set(index, v);
            if fill(board, cell + 1, rng) {
                return true;
            }
            board.clear(index);
        }
    }
    false
}

/// The ever-valid cyclic square: row r holds r+1, r+2, ..., wrapping.
pub fn fallback_square<const N: usize>() -> Board<N> {
    let mut board = Board::new();
    for r in 0..N {
        for c in 0..N {
            board.set([r, c], (((r + c) % N) + 1) as u8);
        }
    }
    board
}

/// Reads all four clue edges off a completed square.
pub fn derive_clues<const N: usize>(board: &Board<N>) -> Clues<N> {
    let mut top = [0u8; N];
    let mut right = [0u8; N];
    let mut bottom = [0u8; N];
    let mut left = [0u8; N];
    for i in 0..N {
        let row = board.row_line(i);
        left[i] = count_visible(&row, false) as u8;
        right[i] = count_visible(&row, true) as u8;
        let col = board.col_line(i);
        top[i] = count_visible(&col, false) as u8;
        bottom[i] = count_visible(&col, true) as u8;
    }
    Clues::new(top, right, bottom, left)
}
