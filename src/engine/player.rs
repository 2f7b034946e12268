use uuid::Uuid;

use crate::cards::{Card, ACE};

/// Reserved id of the per-game dealer.
pub const DEALER_ID: &str = "dealer";

/// A participant holding an ordered hand of cards. Cards are identified in
/// requests by their index into the hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub hand: Vec<Card>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            hand: Vec::new(),
        }
    }

    pub fn dealer() -> Self {
        Self {
            id: DEALER_ID.to_string(),
            name: "Dealer".to_string(),
            hand: Vec::new(),
        }
    }

    pub fn add_card(&mut self, card: Card) {
        self.hand.push(card);
    }

    /// Remove the card at `index`, shifting subsequent cards down. Out of
    /// range returns `None`.
    pub fn remove_card(&mut self, index: usize) -> Option<Card> {
        if index < self.hand.len() {
            Some(self.hand.remove(index))
        } else {
            None
        }
    }

    pub fn hand_size(&self) -> usize {
        self.hand.len()
    }

    pub fn clear_hand(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.hand)
    }

    /// Blackjack total and whether the hand is a natural blackjack.
    ///
    /// Aces start at 11; while the total is over 21 and an ace is still
    /// counted high, one ace is demoted to 1. A natural is a total of 21 on
    /// exactly two cards.
    pub fn blackjack_hand_value(&self) -> (u32, bool) {
        let mut total = 0u32;
        let mut high_aces = 0u32;
        for card in &self.hand {
            total += card.blackjack_value();
            if card.rank == ACE {
                high_aces += 1;
            }
        }
        while total > 21 && high_aces > 0 {
            total -= 10;
            high_aces -= 1;
        }
        let is_blackjack = total == 21 && self.hand.len() == 2;
        (total, is_blackjack)
    }

    pub fn is_busted(&self) -> bool {
        self.blackjack_hand_value().0 > 21
    }

    pub fn has_blackjack(&self) -> bool {
        self.blackjack_hand_value().1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Suit, JACK, QUEEN};

    fn hand(player: &mut Player, cards: &[(u8, Suit)]) {
        for &(rank, suit) in cards {
            player.add_card(Card::new(rank, suit));
        }
    }

    #[test]
    fn ace_is_demoted_only_when_needed() {
        // A♠ 7♣ 5♦ totals 13, not 23.
        let mut player = Player::new("s2");
        hand(
            &mut player,
            &[(ACE, Suit::Spades), (7, Suit::Clubs), (5, Suit::Diamonds)],
        );
        let (total, is_blackjack) = player.blackjack_hand_value();
        assert_eq!(total, 13);
        assert!(!is_blackjack);
        assert!(!player.is_busted());
    }

    #[test]
    fn ace_stays_high_when_the_hand_allows_it() {
        let mut player = Player::new("soft");
        hand(&mut player, &[(ACE, Suit::Spades), (7, Suit::Clubs)]);
        assert_eq!(player.blackjack_hand_value().0, 18);
    }

    #[test]
    fn multiple_aces_demote_one_at_a_time() {
        let mut player = Player::new("aces");
        hand(
            &mut player,
            &[(ACE, Suit::Spades), (ACE, Suit::Hearts), (9, Suit::Clubs)],
        );
        // 11 + 1 + 9
        assert_eq!(player.blackjack_hand_value().0, 21);
    }

    #[test]
    fn natural_blackjack_requires_exactly_two_cards() {
        let mut natural = Player::new("nat");
        hand(&mut natural, &[(ACE, Suit::Spades), (QUEEN, Suit::Hearts)]);
        assert!(natural.has_blackjack());

        let mut three_card = Player::new("slow");
        hand(
            &mut three_card,
            &[(7, Suit::Spades), (JACK, Suit::Hearts), (4, Suit::Clubs)],
        );
        assert_eq!(three_card.blackjack_hand_value(), (21, false));
    }

    #[test]
    fn remove_card_shifts_and_rejects_out_of_range() {
        let mut player = Player::new("p");
        hand(
            &mut player,
            &[(2, Suit::Hearts), (3, Suit::Hearts), (4, Suit::Hearts)],
        );
        assert_eq!(player.remove_card(1), Some(Card::new(3, Suit::Hearts)));
        assert_eq!(player.hand[1], Card::new(4, Suit::Hearts));
        assert_eq!(player.remove_card(5), None);
        assert_eq!(player.hand_size(), 2);
    }

    #[test]
    fn clear_hand_returns_the_cards() {
        let mut player = Player::new("p");
        hand(&mut player, &[(2, Suit::Hearts), (3, Suit::Hearts)]);
        let cleared = player.clear_hand();
        assert_eq!(cleared.len(), 2);
        assert_eq!(player.hand_size(), 0);
    }
}
