use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cards::{Card, Deck, DeckType};
use crate::errors::{GameError, GameResult};

use super::cribbage::CribbageState;
use super::player::{Player, DEALER_ID};

/// Id of the discard pile every game is constructed with.
pub const MAIN_PILE_ID: &str = "main";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Blackjack,
    Cribbage,
    Glitchjack,
    Poker,
    War,
    GoFish,
}

impl GameType {
    pub fn parse(value: &str) -> Option<GameType> {
        match value {
            "blackjack" => Some(GameType::Blackjack),
            "cribbage" => Some(GameType::Cribbage),
            "glitchjack" => Some(GameType::Glitchjack),
            "poker" => Some(GameType::Poker),
            "war" => Some(GameType::War),
            "go_fish" => Some(GameType::GoFish),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameType::Blackjack => "blackjack",
            GameType::Cribbage => "cribbage",
            GameType::Glitchjack => "glitchjack",
            GameType::Poker => "poker",
            GameType::War => "war",
            GameType::GoFish => "go_fish",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    InProgress,
    Finished,
}

/// An append-only pile of discarded cards; the top is the last card added.
#[derive(Clone, Debug)]
pub struct DiscardPile {
    pub id: String,
    pub name: String,
    pub cards: Vec<Card>,
}

impl DiscardPile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cards: Vec::new(),
        }
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn top_card(&self) -> Option<&Card> {
        self.cards.last()
    }
}

/// A single game session: deck, players, dealer, discard piles, and the
/// per-game rule state. Sessions are handed out by the registry behind a
/// mutex; every operation on one is atomic with respect to the others.
#[derive(Clone, Debug)]
pub struct Game {
    pub id: Uuid,
    pub game_type: GameType,
    pub status: GameStatus,
    pub deck: Deck,
    pub players: Vec<Player>,
    pub dealer: Player,
    pub discard_piles: Vec<DiscardPile>,
    pub max_players: usize,
    pub current_player: usize,
    pub cribbage: Option<CribbageState>,
    pub created: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
}

impl Game {
    /// Create a session with a freshly composed (unshuffled) deck. Glitchjack
    /// games ignore `copies` and draw their 52-card with-replacement deck.
    pub fn new(
        game_type: GameType,
        copies: usize,
        deck_type: DeckType,
        max_players: usize,
        rng: &mut impl Rng,
        now: DateTime<Utc>,
    ) -> Self {
        let deck = match game_type {
            GameType::Glitchjack => Deck::glitch(rng),
            _ => Deck::new(copies, deck_type, rng),
        };
        Self {
            id: Uuid::new_v4(),
            game_type,
            status: GameStatus::Waiting,
            deck,
            players: Vec::new(),
            dealer: Player::dealer(),
            discard_piles: vec![DiscardPile::new(MAIN_PILE_ID, "Main")],
            max_players,
            current_player: 0,
            cribbage: None,
            created: now,
            last_used: now,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_used = now;
    }

    /// Add a player with a fresh UUID. Fails when the table is full.
    pub fn add_player(&mut self, name: impl Into<String>) -> GameResult<&Player> {
        if self.players.len() >= self.max_players {
            return Err(GameError::precondition("game is full"));
        }
        self.players.push(Player::new(name));
        Ok(self.players.last().expect("player just pushed"))
    }

    /// Resolve a player by id; `"dealer"` resolves the dealer.
    pub fn player(&self, id: &str) -> Option<&Player> {
        if id == DEALER_ID {
            Some(&self.dealer)
        } else {
            self.players.iter().find(|p| p.id == id)
        }
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        if id == DEALER_ID {
            Some(&mut self.dealer)
        } else {
            self.players.iter_mut().find(|p| p.id == id)
        }
    }

    /// Index of a non-dealer player.
    pub fn player_index(&self, id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    /// Remove a player by id. The dealer is not removable.
    pub fn remove_player(&mut self, id: &str) -> GameResult<Player> {
        if id == DEALER_ID {
            return Err(GameError::invalid_argument("the dealer cannot be removed"));
        }
        match self.player_index(id) {
            Some(index) => Ok(self.players.remove(index)),
            None => Err(GameError::not_found(format!("player {id} not found"))),
        }
    }

    /// Deal one card from the deck to a player's hand, atomically: the player
    /// is resolved before the deck is touched.
    pub fn deal_to_player(&mut self, id: &str, face_up: bool) -> GameResult<Card> {
        if self.player(id).is_none() {
            return Err(GameError::not_found(format!("player {id} not found")));
        }
        let mut card = self
            .deck
            .deal()
            .ok_or_else(|| GameError::exhausted("no cards remaining in deck"))?;
        card.face_up = face_up;
        self.player_mut(id)
            .expect("player presence checked above")
            .add_card(card);
        Ok(card)
    }

    /// Move a card from a player's hand onto a discard pile.
    pub fn discard_from_player(
        &mut self,
        player_id: &str,
        card_index: usize,
        pile_id: &str,
    ) -> GameResult<Card> {
        if self.discard_pile(pile_id).is_none() {
            return Err(GameError::not_found(format!(
                "discard pile {pile_id} not found"
            )));
        }
        let player = self
            .player_mut(player_id)
            .ok_or_else(|| GameError::not_found(format!("player {player_id} not found")))?;
        let card = player.remove_card(card_index).ok_or_else(|| {
            GameError::invalid_argument(format!("card index {card_index} out of range"))
        })?;
        self.discard_pile_mut(pile_id)
            .expect("pile presence checked above")
            .add_card(card);
        Ok(card)
    }

    pub fn add_discard_pile(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> GameResult<&DiscardPile> {
        let id = id.into();
        if self.discard_pile(&id).is_some() {
            return Err(GameError::invalid_argument(format!(
                "discard pile {id} already exists"
            )));
        }
        self.discard_piles.push(DiscardPile::new(id, name));
        Ok(self.discard_piles.last().expect("pile just pushed"))
    }

    pub fn discard_pile(&self, id: &str) -> Option<&DiscardPile> {
        self.discard_piles.iter().find(|p| p.id == id)
    }

    pub fn discard_pile_mut(&mut self, id: &str) -> Option<&mut DiscardPile> {
        self.discard_piles.iter_mut().find(|p| p.id == id)
    }
}
