//! 5-to-7 card poker hand evaluation.
//!
//! Hands are ranked into a single packed `u32` so that integer comparison
//! reproduces standard poker hand ordering exactly: `category << 20 |
//! kicker1 << 16 | kicker2 << 12 | ...`.

use crate::card::Card;
use std::cmp::Ordering;

/// Hand rank categories, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandCategory {
    /// No pair, flush, or straight.
    HighCard = 0,
    /// Exactly one pair.
    OnePair = 1,
    /// Two distinct pairs.
    TwoPair = 2,
    /// Three cards of one rank.
    ThreeOfAKind = 3,
    /// Five consecutive ranks, any suits.
    Straight = 4,
    /// Five cards of one suit.
    Flush = 5,
    /// A three-of-a-kind plus a pair.
    FullHouse = 6,
    /// Four cards of one rank.
    FourOfAKind = 7,
    /// Five consecutive ranks of one suit.
    StraightFlush = 8,
}

impl HandCategory {
    /// Human-readable category name.
    pub fn name(&self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::OnePair => "One Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
        }
    }
}

/// A totally-ordered poker hand rank. Higher is stronger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandRank(u32);

impl HandRank {
    fn new(category: HandCategory, kickers: &[u8]) -> Self {
        let mut value = (category as u32) << 20;
        for (i, &k) in kickers.iter().take(5).enumerate() {
            value |= (k as u32) << (16 - i * 4);
        }
        Self(value)
    }

    /// Raw comparable value.
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The hand's category.
    pub fn category(&self) -> HandCategory {
        match self.0 >> 20 {
            0 => HandCategory::HighCard,
            1 => HandCategory::OnePair,
            2 => HandCategory::TwoPair,
            3 => HandCategory::ThreeOfAKind,
            4 => HandCategory::Straight,
            5 => HandCategory::Flush,
            6 => HandCategory::FullHouse,
            7 => HandCategory::FourOfAKind,
            _ => HandCategory::StraightFlush,
        }
    }
}

impl PartialOrd for HandRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandRank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

/// Evaluate a 5-card hand.
pub fn evaluate_5(cards: &[Card; 5]) -> HandRank {
    let mut rank_counts = [0u8; 13];
    let mut suit_counts = [0u8; 4];
    let mut rank_bits = 0u16;

    for card in cards {
        rank_counts[card.rank() as usize] += 1;
        suit_counts[card.suit() as usize] += 1;
        rank_bits |= 1 << card.rank();
    }

    let is_flush = suit_counts.iter().any(|&c| c >= 5);
    let straight_high = find_straight(rank_bits);
    let is_straight = straight_high.is_some();

    if is_flush && is_straight {
        return HandRank::new(HandCategory::StraightFlush, &[straight_high.unwrap()]);
    }

    let mut quads = Vec::new();
    let mut trips = Vec::new();
    let mut pairs = Vec::new();
    let mut singles = Vec::new();

    for rank in (0..13u8).rev() {
        match rank_counts[rank as usize] {
            4 => quads.push(rank),
            3 => trips.push(rank),
            2 => pairs.push(rank),
            1 => singles.push(rank),
            _ => {}
        }
    }

    if !quads.is_empty() {
        let kicker = trips
            .first()
            .or(pairs.first())
            .or(singles.first())
            .copied()
            .unwrap_or(0);
        return HandRank::new(HandCategory::FourOfAKind, &[quads[0], kicker]);
    }

    if !trips.is_empty() && (!pairs.is_empty() || trips.len() > 1) {
        let pair_rank = if trips.len() > 1 { trips[1] } else { pairs[0] };
        return HandRank::new(HandCategory::FullHouse, &[trips[0], pair_rank]);
    }

    if is_flush {
        let flush_suit = suit_counts.iter().position(|&c| c >= 5).unwrap() as u8;
        let mut flush_ranks: Vec<u8> = cards
            .iter()
            .filter(|c| c.suit() == flush_suit)
            .map(|c| c.rank())
            .collect();
        flush_ranks.sort_by(|a, b| b.cmp(a));
        return HandRank::new(HandCategory::Flush, &flush_ranks);
    }

    if is_straight {
        return HandRank::new(HandCategory::Straight, &[straight_high.unwrap()]);
    }

    if !trips.is_empty() {
        let kickers: Vec<u8> = pairs.iter().chain(singles.iter()).take(2).copied().collect();
        return HandRank::new(
            HandCategory::ThreeOfAKind,
            &[
                trips[0],
                kickers.first().copied().unwrap_or(0),
                kickers.get(1).copied().unwrap_or(0),
            ],
        );
    }

    if pairs.len() >= 2 {
        let kicker = pairs.get(2).or(singles.first()).copied().unwrap_or(0);
        return HandRank::new(HandCategory::TwoPair, &[pairs[0], pairs[1], kicker]);
    }

    if pairs.len() == 1 {
        let kickers: Vec<u8> = singles.iter().take(3).copied().collect();
        return HandRank::new(
            HandCategory::OnePair,
            &[
                pairs[0],
                kickers.first().copied().unwrap_or(0),
                kickers.get(1).copied().unwrap_or(0),
                kickers.get(2).copied().unwrap_or(0),
            ],
        );
    }

    HandRank::new(HandCategory::HighCard, &singles)
}

/// Evaluate a 6-card hand (best 5-card sub-hand).
pub fn evaluate_6(cards: &[Card; 6]) -> HandRank {
    let mut best = HandRank::new(HandCategory::HighCard, &[]);
    for skip in 0..6 {
        let hand: Vec<Card> = cards
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != skip)
            .map(|(_, &c)| c)
            .collect();
        let rank = evaluate_5(&[hand[0], hand[1], hand[2], hand[3], hand[4]]);
        if rank > best {
            best = rank;
        }
    }
    best
}

/// Evaluate a 7-card hand (best 5-card sub-hand); brute-forces all C(7,5)=21
/// combinations.
pub fn evaluate_7(cards: &[Card; 7]) -> HandRank {
    let mut best = HandRank::new(HandCategory::HighCard, &[]);
    for i in 0..7 {
        for j in (i + 1)..7 {
            for k in (j + 1)..7 {
                for l in (k + 1)..7 {
                    for m in (l + 1)..7 {
                        let hand = [cards[i], cards[j], cards[k], cards[l], cards[m]];
                        let rank = evaluate_5(&hand);
                        if rank > best {
                            best = rank;
                        }
                    }
                }
            }
        }
    }
    best
}

/// Evaluate any 5, 6, or 7 card hand.
pub fn evaluate(cards: &[Card]) -> HandRank {
    match cards.len() {
        5 => evaluate_5(&[cards[0], cards[1], cards[2], cards[3], cards[4]]),
        6 => evaluate_6(&[cards[0], cards[1], cards[2], cards[3], cards[4], cards[5]]),
        7 => evaluate_7(&[
            cards[0], cards[1], cards[2], cards[3], cards[4], cards[5], cards[6],
        ]),
        n => panic!("hand evaluation requires 5, 6, or 7 cards, got {}", n),
    }
}

/// Compare two hands: positive if `hand1` wins, negative if `hand2` wins,
/// zero for a tie.
pub fn compare(hand1: &[Card], hand2: &[Card]) -> i32 {
    match evaluate(hand1).cmp(&evaluate(hand2)) {
        Ordering::Greater => 1,
        Ordering::Less => -1,
        Ordering::Equal => 0,
    }
}

/// Highest straight in a 13-bit rank-presence mask, or `None`. The return
/// value is the rank index (0=2 .. 12=A) of the straight's top card; the
/// wheel (A-2-3-4-5) is weakest and reports `3` (the `5`'s rank index).
fn find_straight(rank_bits: u16) -> Option<u8> {
    for high in (4..=12u8).rev() {
        let mask = 0b11111u16 << (high - 4);
        if (rank_bits & mask) == mask {
            return Some(high);
        }
    }
    const WHEEL_MASK: u16 = 0b1_0000_0000_1111;
    if (rank_bits & WHEEL_MASK) == WHEEL_MASK {
        return Some(3);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards_from_str(s: &str) -> Vec<Card> {
        s.split_whitespace().map(|c| Card::from_str(c).unwrap()).collect()
    }

    fn arr5(cards: &[Card]) -> [Card; 5] {
        [cards[0], cards[1], cards[2], cards[3], cards[4]]
    }

    #[test]
    fn categorizes_each_hand_type() {
        assert_eq!(
            evaluate_5(&arr5(&cards_from_str("As Kd Qh Jc 9s"))).category(),
            HandCategory::HighCard
        );
        assert_eq!(
            evaluate_5(&arr5(&cards_from_str("As Ad Kh Qc Js"))).category(),
            HandCategory::OnePair
        );
        assert_eq!(
            evaluate_5(&arr5(&cards_from_str("As Ad Kh Kc Js"))).category(),
            HandCategory::TwoPair
        );
        assert_eq!(
            evaluate_5(&arr5(&cards_from_str("As Ad Ah Kc Js"))).category(),
            HandCategory::ThreeOfAKind
        );
        assert_eq!(
            evaluate_5(&arr5(&cards_from_str("Ts 9d 8h 7c 6s"))).category(),
            HandCategory::Straight
        );
        assert_eq!(
            evaluate_5(&arr5(&cards_from_str("As Ks 9s 7s 2s"))).category(),
            HandCategory::Flush
        );
        assert_eq!(
            evaluate_5(&arr5(&cards_from_str("As Ad Ah Kc Kd"))).category(),
            HandCategory::FullHouse
        );
        assert_eq!(
            evaluate_5(&arr5(&cards_from_str("As Ad Ah Ac Ks"))).category(),
            HandCategory::FourOfAKind
        );
        assert_eq!(
            evaluate_5(&arr5(&cards_from_str("9s 8s 7s 6s 5s"))).category(),
            HandCategory::StraightFlush
        );
    }

    #[test]
    fn wheel_straight_ranks_below_six_high() {
        let wheel = evaluate_5(&arr5(&cards_from_str("5c 4d 3h 2s As")));
        let six_high = evaluate_5(&arr5(&cards_from_str("6c 5d 4h 3s 2d")));
        let trips = evaluate_5(&arr5(&cards_from_str("7c 7d 7h 2s 3d")));
        assert_eq!(wheel.category(), HandCategory::Straight);
        assert_eq!(six_high.category(), HandCategory::Straight);
        assert!(wheel > trips);
        assert!(wheel < six_high);
    }

    #[test]
    fn six_high_straight_flush_is_detected() {
        let six_high_sf = evaluate_5(&arr5(&cards_from_str("6s 5s 4s 3s 2s")));
        assert_eq!(six_high_sf.category(), HandCategory::StraightFlush);
    }

    #[test]
    fn ace_without_deuce_is_not_a_wheel() {
        // A-3-4-5-K has no straight: the wheel needs a real deuce, not just an ace.
        let hand = evaluate_5(&arr5(&cards_from_str("As 3d 4h 5c Ks")));
        assert_eq!(hand.category(), HandCategory::HighCard);
    }

    #[test]
    fn royal_flush_beats_straight_flush() {
        let royal = evaluate_5(&arr5(&cards_from_str("As Ks Qs Js Ts")));
        let king_high_sf = evaluate_5(&arr5(&cards_from_str("Kh Qh Jh Th 9h")));
        assert!(royal > king_high_sf);
    }

    #[test]
    fn quads_beat_full_house() {
        let quads = evaluate_5(&arr5(&cards_from_str("5c 5d 5h 5s 2d")));
        let full_house = evaluate_5(&arr5(&cards_from_str("Ac Ad Ah Kc Kd")));
        assert!(quads > full_house);
    }

    #[test]
    fn compares_7_card_hands() {
        let hero = cards_from_str("Ah As Ad Ac Kh Qs Jd");
        assert_eq!(evaluate(&hero).category(), HandCategory::FourOfAKind);

        let villain = cards_from_str("Kh Kd Ac Qd Jd Td 9d");
        assert!(compare(&hero, &villain) > 0);
    }

    #[test]
    fn evaluate_6_matches_best_5_subset() {
        let six = cards_from_str("As Ad Ah Kc Kd 2s");
        assert_eq!(evaluate_6(&[six[0], six[1], six[2], six[3], six[4], six[5]]).category(), HandCategory::FullHouse);
    }
}
