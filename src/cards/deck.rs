use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::card::{Card, Suit, ACE, KING};
use super::names::random_deck_name;

/// Number of cards Glitchjack decks draw, independent of deck type.
const GLITCH_DECK_SIZE: usize = 52;

/// Deck composition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckType {
    /// 52 cards, every rank and suit.
    Standard,
    /// 48 cards, all rank-10 cards removed.
    Spanish21,
}

impl DeckType {
    pub fn cards_per_deck(self) -> usize {
        match self {
            DeckType::Standard => 52,
            DeckType::Spanish21 => 48,
        }
    }

    fn includes_rank(self, rank: u8) -> bool {
        match self {
            DeckType::Standard => true,
            DeckType::Spanish21 => rank != 10,
        }
    }

    pub fn parse(value: &str) -> Option<DeckType> {
        match value {
            "standard" => Some(DeckType::Standard),
            "spanish21" => Some(DeckType::Spanish21),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeckType::Standard => "standard",
            DeckType::Spanish21 => "spanish21",
        }
    }
}

/// An ordered pile of cards. The head of the vector is the top of the deck.
#[derive(Clone, Debug)]
pub struct Deck {
    pub name: String,
    pub deck_type: DeckType,
    pub(crate) cards: Vec<Card>,
}

impl Deck {
    /// Build a deck of `copies` concatenated full sets for `deck_type`, in
    /// canonical order. `copies` of zero is coerced to one. The deck gets a
    /// random two-word name.
    pub fn new(copies: usize, deck_type: DeckType, rng: &mut impl Rng) -> Self {
        let mut deck = Self {
            name: random_deck_name(rng),
            deck_type,
            cards: Vec::new(),
        };
        deck.rebuild(copies);
        deck
    }

    /// A Glitchjack deck: 52 cards, each sampled uniformly (with replacement)
    /// from the 52 rank-suit combinations. Duplicates are expected and some
    /// cards may be absent.
    pub fn glitch(rng: &mut impl Rng) -> Self {
        let mut cards = Vec::with_capacity(GLITCH_DECK_SIZE);
        for _ in 0..GLITCH_DECK_SIZE {
            let rank = rng.gen_range(ACE..=KING);
            let suit = Suit::ALL[rng.gen_range(0..Suit::ALL.len())];
            cards.push(Card::new(rank, suit));
        }
        Self {
            name: random_deck_name(rng),
            deck_type: DeckType::Standard,
            cards,
        }
    }

    /// Uniform random permutation of the remaining cards.
    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        self.cards.shuffle(rng);
    }

    /// Remove and return the top card.
    pub fn deal(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            None
        } else {
            Some(self.cards.remove(0))
        }
    }

    /// Rebuild the composition from scratch, discarding whatever is left.
    pub fn reset(&mut self, copies: usize, deck_type: DeckType) {
        self.deck_type = deck_type;
        self.rebuild(copies);
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn rebuild(&mut self, copies: usize) {
        let copies = copies.max(1);
        self.cards.clear();
        self.cards
            .reserve(copies * self.deck_type.cards_per_deck());
        for _ in 0..copies {
            for suit in Suit::ALL {
                for rank in ACE..=KING {
                    if self.deck_type.includes_rank(rank) {
                        self.cards.push(Card::new(rank, suit));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashMap;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    fn card_counts(cards: &[Card]) -> HashMap<(u8, Suit), usize> {
        let mut counts = HashMap::new();
        for card in cards {
            *counts.entry((card.rank, card.suit)).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn standard_deck_has_fifty_two_cards_per_copy() {
        for copies in 1..=4 {
            let deck = Deck::new(copies, DeckType::Standard, &mut rng());
            assert_eq!(deck.remaining(), copies * 52);
        }
    }

    #[test]
    fn spanish21_deck_omits_tens() {
        let deck = Deck::new(2, DeckType::Spanish21, &mut rng());
        assert_eq!(deck.remaining(), 96);
        assert!(deck.cards.iter().all(|card| card.rank != 10));
    }

    #[test]
    fn zero_copies_is_coerced_to_one() {
        let deck = Deck::new(0, DeckType::Standard, &mut rng());
        assert_eq!(deck.remaining(), 52);
    }

    #[test]
    fn deal_removes_from_the_head() {
        let mut deck = Deck::new(1, DeckType::Standard, &mut rng());
        let expected = deck.cards[0];
        assert_eq!(deck.deal(), Some(expected));
        assert_eq!(deck.remaining(), 51);
    }

    #[test]
    fn dealing_an_empty_deck_returns_none() {
        let mut deck = Deck::new(1, DeckType::Standard, &mut rng());
        for _ in 0..52 {
            assert!(deck.deal().is_some());
        }
        assert!(deck.is_empty());
        assert_eq!(deck.deal(), None);
    }

    #[test]
    fn shuffle_preserves_the_multiset_of_cards() {
        let mut deck = Deck::new(3, DeckType::Standard, &mut rng());
        let before = card_counts(&deck.cards);
        deck.shuffle(&mut StdRng::seed_from_u64(99));
        assert_eq!(card_counts(&deck.cards), before);
    }

    #[test]
    fn shuffled_top_card_is_roughly_uniform_over_seeds() {
        // Over many seeds each card should land on top a few times; a fixed
        // top card would mean the shuffle ignored the RNG.
        let mut tops = HashMap::new();
        for seed in 0..520 {
            let mut deck = Deck::new(1, DeckType::Standard, &mut rng());
            deck.shuffle(&mut StdRng::seed_from_u64(seed));
            let top = deck.cards[0];
            *tops.entry((top.rank, top.suit)).or_insert(0usize) += 1;
        }
        assert!(tops.len() > 40, "only {} distinct top cards", tops.len());
        assert!(tops.values().all(|&n| n < 40));
    }

    #[test]
    fn reset_restores_canonical_size_after_dealing() {
        let mut deck = Deck::new(1, DeckType::Standard, &mut rng());
        for _ in 0..10 {
            deck.deal();
        }
        deck.reset(2, DeckType::Spanish21);
        assert_eq!(deck.deck_type, DeckType::Spanish21);
        assert_eq!(deck.remaining(), 96);
    }

    #[test]
    fn glitch_deck_draws_fifty_two_with_replacement() {
        let mut seen_duplicate = false;
        for seed in 0..20 {
            let deck = Deck::glitch(&mut StdRng::seed_from_u64(seed));
            assert_eq!(deck.remaining(), 52);
            if card_counts(&deck.cards).values().any(|&n| n > 1) {
                seen_duplicate = true;
            }
        }
        // The birthday problem makes an all-distinct 52-card draw vanishingly
        // unlikely; twenty draws without a duplicate means sampling without
        // replacement.
        assert!(seen_duplicate);
    }

    #[test]
    fn glitch_decks_cover_the_card_space_over_many_draws() {
        let mut counts = HashMap::new();
        for seed in 0..200 {
            let deck = Deck::glitch(&mut StdRng::seed_from_u64(seed));
            for card in &deck.cards {
                *counts.entry((card.rank, card.suit)).or_insert(0usize) += 1;
            }
        }
        assert_eq!(counts.len(), 52);
        // 10400 samples over 52 cells, expectation 200 per cell.
        assert!(counts.values().all(|&n| n > 100 && n < 320));
    }
}
