//! Card, hole-card, board, and deck primitives.
//!
//! Cards are packed into a single `u8` (`rank * 4 + suit`), matching the
//! standard 0..52 card-id encoding. Parsing accepts the two-character poker
//! notation (`"As"`, `"Th"`, `"2c"`) and rejects anything else with
//! [`SolverError::BadCardFormat`].

use crate::error::SolverError;
use std::fmt;

/// Rank of the deuce, for readability at call sites.
pub const RANK_2: u8 = 0;
/// Rank of the ten.
pub const RANK_T: u8 = 8;
/// Rank of the ace.
pub const RANK_A: u8 = 12;

/// Clubs suit id.
pub const SUIT_CLUBS: u8 = 0;
/// Diamonds suit id.
pub const SUIT_DIAMONDS: u8 = 1;
/// Hearts suit id.
pub const SUIT_HEARTS: u8 = 2;
/// Spades suit id.
pub const SUIT_SPADES: u8 = 3;

const RANK_CHARS: [char; 13] = [
    '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A',
];
const SUIT_CHARS: [char; 4] = ['c', 'd', 'h', 's'];

/// A single playing card, packed as `rank * 4 + suit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card {
    id: u8,
}

impl Card {
    /// Build a card from a 0..13 rank and a 0..4 suit.
    pub fn new(rank: u8, suit: u8) -> Self {
        debug_assert!(rank < 13 && suit < 4);
        Self {
            id: rank * 4 + suit,
        }
    }

    /// Build a card from its 0..52 id.
    pub fn from_id(id: u8) -> Self {
        debug_assert!(id < 52);
        Self { id }
    }

    /// Parse a two-character card string such as `"As"`.
    pub fn from_str(s: &str) -> Result<Self, SolverError> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 2 {
            return Err(SolverError::BadCardFormat(s.to_string()));
        }
        let rank = RANK_CHARS
            .iter()
            .position(|&c| c == chars[0].to_ascii_uppercase())
            .ok_or_else(|| SolverError::BadCardFormat(s.to_string()))?;
        let suit = SUIT_CHARS
            .iter()
            .position(|&c| c == chars[1].to_ascii_lowercase())
            .ok_or_else(|| SolverError::BadCardFormat(s.to_string()))?;
        Ok(Self::new(rank as u8, suit as u8))
    }

    /// The 0..52 card id.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// 0..13 rank (2=0 .. A=12).
    pub fn rank(&self) -> u8 {
        self.id / 4
    }

    /// 0..4 suit (c=0, d=1, h=2, s=3).
    pub fn suit(&self) -> u8 {
        self.id % 4
    }

    /// Rank character, e.g. `'A'`.
    pub fn rank_char(&self) -> char {
        RANK_CHARS[self.rank() as usize]
    }

    /// Suit character, e.g. `'s'`.
    pub fn suit_char(&self) -> char {
        SUIT_CHARS[self.suit() as usize]
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank_char(), self.suit_char())
    }
}

/// A player's two private cards, higher rank stored first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HoleCards {
    card1: Card,
    card2: Card,
}

impl HoleCards {
    /// Build from two cards, ordering higher rank first.
    pub fn new(a: Card, b: Card) -> Self {
        if a.rank() >= b.rank() {
            Self {
                card1: a,
                card2: b,
            }
        } else {
            Self {
                card1: b,
                card2: a,
            }
        }
    }

    /// Parse a four-character hole-card string such as `"AhKs"`.
    pub fn from_str(s: &str) -> Result<Self, SolverError> {
        if s.len() != 4 {
            return Err(SolverError::BadCardFormat(s.to_string()));
        }
        let c1 = Card::from_str(&s[0..2])?;
        let c2 = Card::from_str(&s[2..4])?;
        if c1 == c2 {
            return Err(SolverError::BadCardFormat(s.to_string()));
        }
        Ok(Self::new(c1, c2))
    }

    /// Whether both cards share a suit.
    pub fn is_suited(&self) -> bool {
        self.card1.suit() == self.card2.suit()
    }

    /// Whether both cards share a rank.
    pub fn is_pair(&self) -> bool {
        self.card1.rank() == self.card2.rank()
    }

    /// The higher-rank card.
    pub fn high(&self) -> Card {
        self.card1
    }

    /// The lower-rank card.
    pub fn low(&self) -> Card {
        self.card2
    }

    /// Both cards as a fixed-size array.
    pub fn cards(&self) -> [Card; 2] {
        [self.card1, self.card2]
    }

    /// Whether this holding contains the given card.
    pub fn contains(&self, card: Card) -> bool {
        self.card1 == card || self.card2 == card
    }

    /// Whether this holding shares a card with `other`.
    pub fn conflicts_with(&self, other: &HoleCards) -> bool {
        self.contains(other.card1) || self.contains(other.card2)
    }
}

impl fmt::Display for HoleCards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.card1, self.card2)
    }
}

/// Which betting round a state belongs to, implied by board length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Street {
    /// 0 board cards.
    Preflop,
    /// 3 board cards.
    Flop,
    /// 4 board cards.
    Turn,
    /// 5 board cards.
    River,
}

impl Street {
    /// The street implied by a board card count.
    pub fn from_board_len(len: usize) -> Result<Self, SolverError> {
        match len {
            0 => Ok(Street::Preflop),
            3 => Ok(Street::Flop),
            4 => Ok(Street::Turn),
            5 => Ok(Street::River),
            n => Err(SolverError::ConflictingBoard(format!(
                "board must have 0, 3, 4, or 5 cards, got {}",
                n
            ))),
        }
    }

    /// Index used for keying (0=preflop .. 3=river).
    pub fn index(&self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 1,
            Street::Turn => 2,
            Street::River => 3,
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
        };
        write!(f, "{}", s)
    }
}

/// The community board: 0, 3, 4, or 5 distinct cards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    cards: Vec<Card>,
}

impl Board {
    /// An empty (preflop) board.
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    /// Build a board from cards already collected, validating count and
    /// uniqueness.
    pub fn from_cards(cards: Vec<Card>) -> Result<Self, SolverError> {
        Street::from_board_len(cards.len())?;
        let mut seen = cards.clone();
        seen.sort();
        seen.dedup();
        if seen.len() != cards.len() {
            return Err(SolverError::ConflictingBoard(
                "duplicate card on board".to_string(),
            ));
        }
        Ok(Self { cards })
    }

    /// Parse a space-separated board string such as `"Kd Qc 2s"`.
    pub fn from_str(s: &str) -> Result<Self, SolverError> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::new());
        }
        let cards: Result<Vec<Card>, SolverError> =
            s.split_whitespace().map(Card::from_str).collect();
        Self::from_cards(cards?)
    }

    /// Number of cards currently on the board.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the board is empty (preflop).
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The board's cards in order dealt.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Whether the board contains the given card.
    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    /// The street implied by the current card count.
    pub fn street(&self) -> Street {
        Street::from_board_len(self.cards.len()).expect("board length kept valid by construction")
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strs: Vec<String> = self.cards.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", strs.join(" "))
    }
}

/// A deck of the 52 cards not already dealt to hands or the board.
///
/// Built with [`Deck::without`], which compacts the undealt cards to the
/// front so [`Deck::deal`] and [`Deck::deal_n`] are O(1) per card.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// The full, unshuffled 52-card deck.
    pub fn full() -> Self {
        let cards = (0..52u8).map(Card::from_id).collect();
        Self { cards }
    }

    /// A deck containing every card except `dead`.
    pub fn without(dead: &[Card]) -> Self {
        let cards = (0..52u8)
            .map(Card::from_id)
            .filter(|c| !dead.contains(c))
            .collect();
        Self { cards }
    }

    /// Remaining undealt cards.
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Shuffle in place using the given RNG.
    pub fn shuffle(&mut self, rng: &mut impl rand::Rng) {
        use rand::seq::SliceRandom;
        self.cards.shuffle(rng);
    }

    /// Deal a single card from the front, if any remain.
    pub fn deal(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            None
        } else {
            Some(self.cards.remove(0))
        }
    }

    /// Deal `n` cards from the front.
    pub fn deal_n(&mut self, n: usize) -> Vec<Card> {
        let take = n.min(self.cards.len());
        self.cards.drain(0..take).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_round_trip() {
        let c = Card::from_str("As").unwrap();
        assert_eq!(c.rank(), RANK_A);
        assert_eq!(c.suit(), SUIT_SPADES);
        assert_eq!(c.to_string(), "As");
    }

    #[test]
    fn card_rejects_bad_input() {
        assert!(Card::from_str("Zz").is_err());
        assert!(Card::from_str("A").is_err());
        assert!(Card::from_str("Ass").is_err());
    }

    #[test]
    fn hole_cards_orders_high_first() {
        let hc = HoleCards::new(Card::from_str("2c").unwrap(), Card::from_str("Ad").unwrap());
        assert_eq!(hc.high().rank(), RANK_A);
        assert_eq!(hc.low().rank(), RANK_2);
    }

    #[test]
    fn hole_cards_suited_and_pair() {
        let suited = HoleCards::from_str("AsKs").unwrap();
        assert!(suited.is_suited());
        assert!(!suited.is_pair());

        let pair = HoleCards::from_str("AsAd").unwrap();
        assert!(pair.is_pair());
    }

    #[test]
    fn board_validates_length() {
        assert!(Board::from_str("Kd Qc").is_err());
        assert!(Board::from_str("Kd Qc 2s").is_ok());
        assert!(Board::from_str("").unwrap().is_empty());
    }

    #[test]
    fn board_rejects_duplicate_card() {
        assert!(Board::from_str("Kd Kd 2s").is_err());
    }

    #[test]
    fn board_street_matches_length() {
        assert_eq!(Board::new().street(), Street::Preflop);
        assert_eq!(Board::from_str("Kd Qc 2s").unwrap().street(), Street::Flop);
        assert_eq!(
            Board::from_str("Kd Qc 2s 3h").unwrap().street(),
            Street::Turn
        );
        assert_eq!(
            Board::from_str("Kd Qc 2s 3h 4d").unwrap().street(),
            Street::River
        );
    }

    #[test]
    fn deck_without_excludes_dead_cards() {
        let dead = [Card::from_str("As").unwrap(), Card::from_str("Ks").unwrap()];
        let deck = Deck::without(&dead);
        assert_eq!(deck.remaining(), 50);
        assert!(!deck.cards.contains(&dead[0]));
    }

    #[test]
    fn deck_deal_n_shrinks_remaining() {
        let mut deck = Deck::full();
        let dealt = deck.deal_n(5);
        assert_eq!(dealt.len(), 5);
        assert_eq!(deck.remaining(), 47);
    }
}
