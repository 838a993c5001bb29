//! Monte-Carlo equity estimation: hand vs hand, and hand vs range.
//!
//! Concrete two-card combos are materialized from each canonical hand lazily
//! and only when equity calculation needs them, per the canonical-hand
//! abstraction's whole point. When no non-colliding materialization exists
//! for a pairing, the pairing "contributes nothing": a hand-vs-hand equity
//! of 0.5 flagged unresolved, or omission from a hand-vs-range weighted
//! average.

use crate::canonical::CanonicalHand;
use crate::card::{Board, Card, Deck, HoleCards};
use crate::hand_eval;
use crate::range::Range;
use rand::Rng;

/// Result of a hand-vs-hand equity estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityEstimate {
    /// Hero's equity share, in `[0, 1]`.
    pub equity: f64,
    /// `true` if no non-colliding combo pairing existed, in which case
    /// `equity` is the fallback value 0.5 per the boundary error table.
    pub unresolved: bool,
}

/// All `(hero_combo, villain_combo)` pairs that don't collide with each
/// other or with cards already on the board.
fn valid_combo_pairs(
    hero: CanonicalHand,
    villain: CanonicalHand,
    board: &Board,
) -> Vec<(HoleCards, HoleCards)> {
    let hero_combos = hero.enumerate_unblocked_combos(board.cards());
    let villain_combos = villain.enumerate_unblocked_combos(board.cards());

    let mut pairs = Vec::new();
    for &h in &hero_combos {
        for &v in &villain_combos {
            if !h.conflicts_with(&v) {
                pairs.push((h, v));
            }
        }
    }
    pairs
}

/// Monte-Carlo equity of `hero` vs `villain` on `board`, using `samples`
/// trials. Draws a random valid combo pairing per trial, then deals the
/// remaining board cards uniformly without replacement.
pub fn equity_vs_hand(
    hero: CanonicalHand,
    villain: CanonicalHand,
    board: &Board,
    samples: usize,
    rng: &mut impl Rng,
) -> EquityEstimate {
    let pairs = valid_combo_pairs(hero, villain, board);
    if pairs.is_empty() {
        return EquityEstimate {
            equity: 0.5,
            unresolved: true,
        };
    }

    let mut wins = 0.0;
    for _ in 0..samples {
        let &(hero_combo, villain_combo) = &pairs[rng.gen_range(0..pairs.len())];

        let dead: Vec<Card> = hero_combo
            .cards()
            .iter()
            .chain(villain_combo.cards().iter())
            .chain(board.cards().iter())
            .copied()
            .collect();
        let mut deck = Deck::without(&dead);
        deck.shuffle(rng);

        let mut full_board: Vec<Card> = board.cards().to_vec();
        while full_board.len() < 5 {
            full_board.push(deck.deal().expect("deck has enough cards to complete board"));
        }

        let hero_hand: Vec<Card> = hero_combo.cards().iter().chain(full_board.iter()).copied().collect();
        let villain_hand: Vec<Card> = villain_combo.cards().iter().chain(full_board.iter()).copied().collect();

        match hand_eval::compare(&hero_hand, &villain_hand) {
            r if r > 0 => wins += 1.0,
            0 => wins += 0.5,
            _ => {}
        }
    }

    EquityEstimate {
        equity: wins / samples as f64,
        unresolved: false,
    }
}

/// Weighted average of hero-vs-hand equities over a villain range's
/// non-zero canonical hands. Canonical hands with no valid combo pairing
/// against `hero` (fully blocked) are skipped, per spec §4.3.
pub fn equity_vs_range(
    hero: CanonicalHand,
    villain_range: &Range,
    board: &Board,
    samples_per_hand: usize,
    rng: &mut impl Rng,
) -> EquityEstimate {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    let mut any_resolved = false;

    for (villain, weight) in villain_range.iter_nonzero() {
        let estimate = equity_vs_hand(hero, villain, board, samples_per_hand, rng);
        if estimate.unresolved {
            continue;
        }
        any_resolved = true;
        weighted_sum += weight * estimate.equity;
        weight_total += weight;
    }

    if !any_resolved || weight_total <= 0.0 {
        return EquityEstimate {
            equity: 0.5,
            unresolved: true,
        };
    }

    EquityEstimate {
        equity: weighted_sum / weight_total,
        unresolved: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn aa_dominates_kk_heads_up() {
        let mut rng = StdRng::seed_from_u64(42);
        let aa = CanonicalHand::new(12, 12, false);
        let kk = CanonicalHand::new(11, 11, false);
        let board = Board::new();

        let estimate = equity_vs_hand(aa, kk, &board, 2000, &mut rng);
        assert!(!estimate.unresolved);
        // S5: equity of AA vs KK should land around 0.80-0.84.
        assert!(
            estimate.equity > 0.75 && estimate.equity < 0.90,
            "AA equity {} out of expected range",
            estimate.equity
        );
    }

    #[test]
    fn equity_is_unbiased_around_half_on_symmetric_matchup() {
        let mut rng = StdRng::seed_from_u64(7);
        let aks = CanonicalHand::new(12, 11, true);
        let board = Board::new();
        let estimate = equity_vs_hand(aks, aks, &board, 4000, &mut rng);
        assert!(!estimate.unresolved);
        assert!((estimate.equity - 0.5).abs() < 0.05);
    }

    #[test]
    fn equity_vs_range_weights_by_range_probability() {
        let mut rng = StdRng::seed_from_u64(99);
        let aa = CanonicalHand::new(12, 12, false);
        let range = Range::from_notation("KK,QQ").unwrap();
        let board = Board::new();
        let estimate = equity_vs_range(aa, &range, &board, 500, &mut rng);
        assert!(!estimate.unresolved);
        assert!(estimate.equity > 0.7);
    }
}
