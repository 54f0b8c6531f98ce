use std::collections::HashMap;
use std::sync::Mutex;
use crate::core::MAX_SIZE;

/// Counts the towers visible along a line, scanning front-to-back (or
/// back-to-front when `reverse`). A tower is visible when it strictly
/// exceeds every tower scanned before it. Empty cells carry height 0: they
/// never occlude anything, and they are never visible themselves.
pub fn count_visible(line: &[u8], reverse: bool) -> usize {
    let mut visible = 0;
    let mut max_h = 0u8;
    let mut scan = |h: u8| {
        if h > max_h {
            max_h = h;
            visible += 1;
        }
    };
    if reverse {
        for &h in line.iter().rev() {
            scan(h);
        }
    } else {
        for &h in line.iter() {
            scan(h);
        }
    }
    visible
}

/// Whether a fully filled line satisfies its clue pair. A clue of 0 means
/// "no constraint at that edge"; otherwise the scan from that edge must
/// match exactly. Callers only invoke this on completed lines.
pub fn line_visibility_valid(line: &[u8], forward_clue: u8, reverse_clue: u8) -> bool {
    if forward_clue != 0 && count_visible(line, false) != forward_clue as usize {
        return false;
    }
    if reverse_clue != 0 && count_visible(line, true) != reverse_clue as usize {
        return false;
    }
    true
}

/// Towers already locked in as visible along the filled prefix of a line.
/// The scan stops at the first empty cell; whatever comes later can only add
/// visibility, never take it away from this prefix.
pub fn visible_in_prefix(line: &[u8]) -> usize {
    let mut visible = 0;
    let mut max_h = 0u8;
    for &h in line {
        if h == 0 {
            break;
        }
        if h > max_h {
            max_h = h;
            visible += 1;
        }
    }
    visible
}

/// Upper bound on the final visibility count of a partially filled line:
/// every cell past the filled prefix could in principle step above the
/// running maximum.
pub fn max_possible_visible(line: &[u8]) -> usize {
    let filled = line.iter().take_while(|&&h| h != 0).count();
    visible_in_prefix(line) + (line.len() - filled)
}

/// Whether a clue is already unsatisfiable given the filled prefix of a
/// line. Conservative: only the prefix is consulted, so `false` does not
/// promise the clue can still be met, but `true` is definitive.
pub fn clue_prefix_infeasible(line: &[u8], clue: u8) -> bool {
    if clue == 0 {
        return false;
    }
    let clue = clue as usize;
    clue < visible_in_prefix(line) || clue > max_possible_visible(line)
}

lazy_static::lazy_static! {
    // Census of permutations of 1..=n by their (front, back) visibility
    // counts, built once per board side on first use.
    static ref PAIR_CENSUS: Mutex<HashMap<u8, HashMap<(u8, u8), usize>>> = {
        Mutex::new(HashMap::new())
    };
}

fn census_for(n: u8) -> HashMap<(u8, u8), usize> {
    fn permute(vals: &mut Vec<u8>, k: usize, counts: &mut HashMap<(u8, u8), usize>) {
        if k == vals.len() {
            let front = count_visible(vals, false) as u8;
            let back = count_visible(vals, true) as u8;
            *counts.entry((front, back)).or_insert(0) += 1;
            return;
        }
        for i in k..vals.len() {
            vals.swap(k, i);
            permute(vals, k + 1, counts);
            vals.swap(k, i);
        }
    }
    let mut counts = HashMap::new();
    let mut vals: Vec<u8> = (1..=n).collect();
    permute(&mut vals, 0, &mut counts);
    counts
}

/// How many permutations of 1..=n realise the given clue pair. A clue of 0
/// acts as a wildcard, matching every count from that edge.
pub fn clue_pair_count(n: u8, front: u8, back: u8) -> usize {
    debug_assert!(n >= 1 && n as usize <= MAX_SIZE);
    let mut census = PAIR_CENSUS.lock().unwrap();
    let table = census.entry(n).or_insert_with(|| census_for(n));
    table
        .iter()
        .filter(|((f, b), _)| (front == 0 || *f == front) && (back == 0 || *b == back))
        .map(|(_, count)| count)
        .sum()
}

/// Whether any line of 1..=n at all can satisfy the clue pair. This is the
/// cheap, content-blind check behind Score-Greedy's gamble and the
/// branch-and-bound bound tightening.
pub fn clue_pair_possible(n: u8, front: u8, back: u8) -> bool {
    clue_pair_count(n, front, back) > 0
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_count_visible_basic() {
        assert_eq!(count_visible(&[1, 2, 3, 4], false), 4);
        assert_eq!(count_visible(&[1, 2, 3, 4], true), 1);
        assert_eq!(count_visible(&[2, 3, 1, 4], false), 3);
        assert_eq!(count_visible(&[4, 3, 2, 1], false), 1);
        assert_eq!(count_visible(&[3, 1, 4, 2], true), 2);
    }

    #[test]
    fn test_count_visible_zeros_never_count() {
        assert_eq!(count_visible(&[0, 0, 0, 0], false), 0);
        // A zero after a tower cannot exceed the running max.
        assert_eq!(count_visible(&[2, 0, 3, 0], false), 2);
        // Leading zeros do not occlude the first tower.
        assert_eq!(count_visible(&[0, 0, 1, 3], false), 2);
    }

    #[test]
    fn test_line_visibility_valid() {
        let line = [2, 3, 1, 4];
        assert!(line_visibility_valid(&line, 3, 1));
        assert!(!line_visibility_valid(&line, 2, 1));
        assert!(!line_visibility_valid(&line, 3, 2));
        // Zero clues are unconstrained.
        assert!(line_visibility_valid(&line, 0, 0));
        assert!(line_visibility_valid(&line, 3, 0));
        assert!(line_visibility_valid(&line, 0, 1));
    }

    #[test]
    fn test_prefix_bounds() {
        // Prefix [2, 3], two more cells to fill.
        let line = [2, 3, 0, 1];
        assert_eq!(visible_in_prefix(&line), 2);
        assert_eq!(max_possible_visible(&line), 4);
        assert!(!clue_prefix_infeasible(&line, 2));
        assert!(!clue_prefix_infeasible(&line, 4));
        assert!(clue_prefix_infeasible(&line, 1));
        assert!(!clue_prefix_infeasible(&line, 0));
    }

    #[test]
    fn test_prefix_infeasible_above_max() {
        // Fully filled line: prefix bounds are exact.
        let line = [4, 3, 2, 1];
        assert_eq!(visible_in_prefix(&line), 1);
        assert_eq!(max_possible_visible(&line), 1);
        assert!(clue_prefix_infeasible(&line, 2));
        assert!(!clue_prefix_infeasible(&line, 1));
    }

    #[test]
    fn test_clue_pair_census() {
        // Front 1 means the tallest tower leads the line, so the reverse
        // scan always sees at least two towers.
        assert!(!clue_pair_possible(4, 1, 1));
        assert!(clue_pair_possible(4, 1, 2));
        // Only the ascending line shows all four; its back count is 1.
        assert_eq!(clue_pair_count(4, 4, 1), 1);
        assert!(!clue_pair_possible(4, 4, 4));
        assert!(!clue_pair_possible(4, 3, 3));
        assert!(clue_pair_possible(4, 2, 3));
    }

    #[test]
    fn test_clue_pair_wildcards() {
        // Wildcards marginalise over the free edge: 4! lines in total.
        assert_eq!(clue_pair_count(4, 0, 0), 24);
        let marginal: usize = (1..=4).map(|b| clue_pair_count(4, 2, b)).sum();
        assert_eq!(clue_pair_count(4, 2, 0), marginal);
    }
}
