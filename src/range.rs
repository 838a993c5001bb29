//! Weighted range model: a distribution over the 169 canonical hands,
//! parsed from a compact textual notation.

use crate::canonical::{all_canonical_hands, CanonicalHand};
use rand::Rng;

/// A weighted distribution over the 169 canonical starting hands.
///
/// All 169 keys are always present; an absent hand is weight 0. Weights are
/// non-negative and not required to sum to 1 — [`Range::sample`] normalizes
/// implicitly by picking proportionally among the non-zero entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    weights: [f64; 169],
}

impl Default for Range {
    fn default() -> Self {
        Self::empty()
    }
}

impl Range {
    /// A range with every weight at zero.
    pub fn empty() -> Self {
        Self { weights: [0.0; 169] }
    }

    /// A range with every canonical hand at weight 1.
    pub fn all() -> Self {
        Self { weights: [1.0; 169] }
    }

    /// Current weight of a canonical hand (0 if never set).
    pub fn weight(&self, hand: CanonicalHand) -> f64 {
        self.weights[hand.index() as usize]
    }

    /// Set a canonical hand's weight directly.
    pub fn set_weight(&mut self, hand: CanonicalHand, weight: f64) {
        self.weights[hand.index() as usize] = weight.max(0.0);
    }

    /// Parse comma-separated range notation. Unknown or malformed tokens
    /// are skipped silently — callers validate ranges upstream.
    pub fn from_notation(notation: &str) -> Result<Self, std::convert::Infallible> {
        let mut range = Self::empty();
        for part in notation.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            range.apply_token(part);
        }
        Ok(range)
    }

    fn apply_token(&mut self, token: &str) {
        if let Some((hand_part, weight_part)) = token.split_once(':') {
            if let Ok(weight) = weight_part.trim().parse::<f64>() {
                for hand in parse_single_hand(hand_part.trim()) {
                    self.set_weight(hand, weight);
                }
            }
            return;
        }

        if let Some((lo, hi)) = token.split_once('-') {
            for hand in parse_range_token(lo.trim(), hi.trim()) {
                self.set_weight(hand, 1.0);
            }
            return;
        }

        if let Some(base) = token.strip_suffix('+') {
            for hand in parse_plus_token(base.trim()) {
                self.set_weight(hand, 1.0);
            }
            return;
        }

        for hand in parse_single_hand(token) {
            self.set_weight(hand, 1.0);
        }
    }

    /// Non-zero `(canonical hand, weight)` pairs.
    pub fn iter_nonzero(&self) -> impl Iterator<Item = (CanonicalHand, f64)> + '_ {
        all_canonical_hands().filter_map(move |h| {
            let w = self.weight(h);
            if w > 0.0 {
                Some((h, w))
            } else {
                None
            }
        })
    }

    /// Divide every weight by their sum, so they sum to 1. A no-op on an
    /// empty range (every weight already 0).
    pub fn normalize(&mut self) {
        let total: f64 = self.weights.iter().sum();
        if total > 0.0 {
            for w in self.weights.iter_mut() {
                *w /= total;
            }
        }
    }

    /// Sum of concrete combos across all non-zero hands, weighted by each
    /// hand's weight.
    pub fn combo_count(&self) -> f64 {
        self.iter_nonzero()
            .map(|(h, w)| w * h.num_combos() as f64)
            .sum()
    }

    /// Draw a canonical hand proportionally to weight. Returns `None` if
    /// every weight is zero (an empty range, per the `EmptyRange` boundary
    /// error).
    pub fn sample(&self, rng: &mut impl Rng) -> Option<CanonicalHand> {
        let total: f64 = self.weights.iter().sum();
        if total <= 0.0 {
            return None;
        }
        let mut target = rng.gen_range(0.0..total);
        for hand in all_canonical_hands() {
            let w = self.weight(hand);
            if w <= 0.0 {
                continue;
            }
            if target < w {
                return Some(hand);
            }
            target -= w;
        }
        // Floating-point edge case: fall back to the last non-zero hand.
        self.iter_nonzero().last().map(|(h, _)| h)
    }
}

/// A single token: a pair (`"AA"`), a suited/offsuit hand (`"AKs"`,
/// `"AKo"`), or shorthand meaning both (`"AK"`).
fn parse_single_hand(s: &str) -> Vec<CanonicalHand> {
    let chars: Vec<char> = s.chars().collect();
    match chars.len() {
        2 => {
            let (r1, r2) = match (
                CanonicalHand::parse_rank(chars[0]),
                CanonicalHand::parse_rank(chars[1]),
            ) {
                (Some(a), Some(b)) => (a, b),
                _ => return Vec::new(),
            };
            if r1 == r2 {
                vec![CanonicalHand::new(r1, r2, false)]
            } else {
                // Shorthand: both suited and offsuit variants.
                vec![
                    CanonicalHand::new(r1, r2, true),
                    CanonicalHand::new(r1, r2, false),
                ]
            }
        }
        3 => {
            let (r1, r2) = match (
                CanonicalHand::parse_rank(chars[0]),
                CanonicalHand::parse_rank(chars[1]),
            ) {
                (Some(a), Some(b)) => (a, b),
                _ => return Vec::new(),
            };
            let suited = match chars[2].to_ascii_lowercase() {
                's' => true,
                'o' => false,
                _ => return Vec::new(),
            };
            if r1 == r2 {
                return Vec::new();
            }
            vec![CanonicalHand::new(r1, r2, suited)]
        }
        _ => Vec::new(),
    }
}

/// A range token `lo-hi`: a pair range (`"AA-JJ"`) or a combo range sharing
/// the same high rank and suitedness (`"AKs-ATs"`).
fn parse_range_token(lo: &str, hi: &str) -> Vec<CanonicalHand> {
    let lo_hands = parse_single_hand(lo);
    let hi_hands = parse_single_hand(hi);
    if lo_hands.len() != 1 || hi_hands.len() != 1 {
        return Vec::new();
    }
    let lo = lo_hands[0];
    let hi = hi_hands[0];

    if lo.is_pair() && hi.is_pair() {
        let (low, high) = if lo.rank1() <= hi.rank1() {
            (lo.rank1(), hi.rank1())
        } else {
            (hi.rank1(), lo.rank1())
        };
        return (low..=high).map(|r| CanonicalHand::new(r, r, false)).collect();
    }

    if !lo.is_pair() && !hi.is_pair() && lo.is_suited() == hi.is_suited() && lo.rank1() == hi.rank1() {
        let suited = lo.is_suited();
        let high_rank = lo.rank1();
        let (low, high) = if lo.rank2() <= hi.rank2() {
            (lo.rank2(), hi.rank2())
        } else {
            (hi.rank2(), lo.rank2())
        };
        return (low..=high)
            .filter(|&r2| r2 != high_rank)
            .map(|r2| CanonicalHand::new(high_rank, r2, suited))
            .collect();
    }

    Vec::new()
}

/// A plus token `base+`: `"TT+"` (all pairs TT..AA) or `"AQs+"` (same high
/// rank and suitedness, second rank at least the stated one).
fn parse_plus_token(base: &str) -> Vec<CanonicalHand> {
    let hands = parse_single_hand(base);
    if hands.len() == 1 && hands[0].is_pair() {
        let rank = hands[0].rank1();
        return (rank..=12).map(|r| CanonicalHand::new(r, r, false)).collect();
    }
    if hands.len() == 1 {
        let hand = hands[0];
        let high_rank = hand.rank1();
        let min_low = hand.rank2();
        return (min_low..high_rank)
            .map(|r2| CanonicalHand::new(high_rank, r2, hand.is_suited()))
            .collect();
    }
    // Shorthand plus ("AK+") is ambiguous on suitedness in the source
    // grammar; expand both variants.
    if hands.len() == 2 {
        let mut out = Vec::new();
        for hand in hands {
            let high_rank = hand.rank1();
            let min_low = hand.rank2();
            out.extend((min_low..high_rank).map(|r2| CanonicalHand::new(high_rank, r2, hand.is_suited())));
        }
        return out;
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn single_pair_token() {
        let range = Range::from_notation("AA").unwrap();
        let aa = CanonicalHand::new(12, 12, false);
        assert_eq!(range.weight(aa), 1.0);
        assert_eq!(range.combo_count(), 6.0); // S2
    }

    #[test]
    fn suited_and_offsuit_tokens() {
        let range = Range::from_notation("AKs,AKo").unwrap();
        assert_eq!(range.combo_count(), 16.0); // 4 + 12, S2
    }

    #[test]
    fn shorthand_expands_both_variants() {
        let range = Range::from_notation("AK").unwrap();
        let aks = CanonicalHand::new(12, 11, true);
        let ako = CanonicalHand::new(12, 11, false);
        assert_eq!(range.weight(aks), 1.0);
        assert_eq!(range.weight(ako), 1.0);
    }

    #[test]
    fn weighted_token() {
        let range = Range::from_notation("AA:0.5").unwrap();
        let aa = CanonicalHand::new(12, 12, false);
        assert_eq!(range.weight(aa), 0.5);
    }

    #[test]
    fn pair_range_token() {
        let range = Range::from_notation("AA-JJ").unwrap();
        let count = range.iter_nonzero().count();
        assert_eq!(count, 4); // AA, KK, QQ, JJ — S2
    }

    #[test]
    fn combo_range_token() {
        let range = Range::from_notation("AKs-ATs").unwrap();
        let count = range.iter_nonzero().count();
        assert_eq!(count, 4); // AKs, AQs, AJs, ATs
    }

    #[test]
    fn plus_token() {
        let range = Range::from_notation("AKo+").unwrap();
        let nonzero: Vec<_> = range.iter_nonzero().collect();
        assert_eq!(nonzero.len(), 1); // {AKo} — S2
        assert_eq!(nonzero[0].0.to_string(), "AKo");
    }

    #[test]
    fn unknown_tokens_are_skipped() {
        let range = Range::from_notation("ZZ,AA").unwrap();
        assert_eq!(range.iter_nonzero().count(), 1);
    }

    #[test]
    fn sample_only_draws_nonzero_hands() {
        let range = Range::from_notation("AA,KK").unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let hand = range.sample(&mut rng).unwrap();
            assert!(hand.is_pair());
            assert!(hand.rank1() == 12 || hand.rank1() == 11);
        }
    }

    #[test]
    fn normalize_divides_by_sum() {
        let mut range = Range::from_notation("AA:2.0,KK:2.0").unwrap();
        range.normalize();
        let aa = CanonicalHand::new(12, 12, false);
        let kk = CanonicalHand::new(11, 11, false);
        assert!((range.weight(aa) - 0.5).abs() < 1e-12);
        assert!((range.weight(kk) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn normalize_is_noop_on_empty_range() {
        let mut range = Range::empty();
        range.normalize();
        assert_eq!(range.iter_nonzero().count(), 0);
    }

    #[test]
    fn empty_range_samples_none() {
        let range = Range::empty();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(range.sample(&mut rng).is_none());
    }
}
