//! Request and response bodies. Responses are built from domain state with
//! `from_domain`-style constructors; the wire never sees the identity of a
//! face-down card.

use std::collections::BTreeMap;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cards::{Card, DeckType};
use crate::catalogue::{CustomCard, CustomDeck, RankValue};
use crate::engine::blackjack::BlackjackOutcome;
use crate::engine::cribbage::{CribbagePhase, CribbageState};
use crate::engine::session::{DiscardPile, Game, GameStatus, GameType};
use crate::engine::Player;

// ---------------------------------------------------------------------------
// Requests

#[derive(Debug, Default, Deserialize)]
pub struct CreateGameRequest {
    pub game_type: Option<String>,
    pub deck_type: Option<String>,
    pub decks: Option<i64>,
    pub max_players: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AddPlayerRequest {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DealRequest {
    pub count: Option<i64>,
    pub face_up: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetDeckRequest {
    pub decks: Option<i64>,
    pub deck_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DiscardRequest {
    pub indices: Vec<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    pub card_index: usize,
}

#[derive(Debug, Deserialize)]
pub struct DiscardToPileRequest {
    pub card_index: usize,
    pub pile_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddPileRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateDeckRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddCustomCardRequest {
    pub name: String,
    pub rank: Option<RankValue>,
    pub suit: Option<String>,
    pub attributes: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListCardsQuery {
    pub include_deleted: Option<bool>,
}

// ---------------------------------------------------------------------------
// Card views

/// Image URL sizes served for standard cards.
const IMAGE_SIZES: [&str; 3] = ["icon", "small", "large"];

#[derive(Debug, Serialize)]
pub struct CardImages {
    pub icon: String,
    pub small: String,
    pub large: String,
}

impl CardImages {
    fn front(base: &str, card: &Card) -> Self {
        let mut urls = IMAGE_SIZES.iter().map(|size| {
            format!(
                "{base}/static/cards/{size}/{rank}_{suit}.png",
                rank = card.rank,
                suit = card.suit.as_u8()
            )
        });
        Self {
            icon: urls.next().expect("three sizes"),
            small: urls.next().expect("three sizes"),
            large: urls.next().expect("three sizes"),
        }
    }

    fn back(base: &str) -> Self {
        let mut urls = IMAGE_SIZES
            .iter()
            .map(|size| format!("{base}/static/cards/{size}/back.png"));
        Self {
            icon: urls.next().expect("three sizes"),
            small: urls.next().expect("three sizes"),
            large: urls.next().expect("three sizes"),
        }
    }
}

/// A single card as seen by API callers. Face-down cards carry no rank or
/// suit and image links point at the card back.
#[derive(Debug, Serialize)]
pub struct CardResponse {
    pub rank: Option<u8>,
    pub suit: Option<u8>,
    pub face_up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<CardImages>,
}

impl CardResponse {
    pub fn from_card(card: &Card, base_url: Option<&str>) -> Self {
        if card.is_revealed() {
            Self {
                rank: Some(card.rank),
                suit: Some(card.suit.as_u8()),
                face_up: true,
                images: base_url.map(|base| CardImages::front(base, card)),
            }
        } else {
            Self {
                rank: None,
                suit: None,
                face_up: false,
                images: base_url.map(CardImages::back),
            }
        }
    }

    fn from_cards(cards: &[Card], base_url: Option<&str>) -> Vec<Self> {
        cards
            .iter()
            .map(|card| Self::from_card(card, base_url))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Game views

#[derive(Debug, Serialize)]
pub struct PlayerResponse {
    pub id: String,
    pub name: String,
    pub hand: Vec<CardResponse>,
    pub hand_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand_value: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_blackjack: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_busted: Option<bool>,
}

impl PlayerResponse {
    pub fn from_domain(player: &Player, game_type: GameType, base_url: Option<&str>) -> Self {
        let blackjack = matches!(game_type, GameType::Blackjack | GameType::Glitchjack);
        let (total, natural) = player.blackjack_hand_value();
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            hand: CardResponse::from_cards(&player.hand, base_url),
            hand_size: player.hand_size(),
            hand_value: blackjack.then_some(total),
            has_blackjack: blackjack.then_some(natural),
            is_busted: blackjack.then_some(total > 21),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DiscardPileResponse {
    pub id: String,
    pub name: String,
    pub card_count: usize,
    pub cards: Vec<CardResponse>,
}

impl DiscardPileResponse {
    pub fn from_domain(pile: &DiscardPile, base_url: Option<&str>) -> Self {
        Self {
            id: pile.id.clone(),
            name: pile.name.clone(),
            card_count: pile.cards.len(),
            cards: CardResponse::from_cards(&pile.cards, base_url),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CribbageStateResponse {
    pub phase: CribbagePhase,
    pub dealer: usize,
    pub crib: Vec<CardResponse>,
    pub starter: Option<CardResponse>,
    pub played_cards: Vec<CardResponse>,
    pub play_total: u32,
    pub play_count: u32,
    pub scores: [u32; 2],
    pub game_score: u32,
    pub last_to_play: Option<usize>,
}

impl CribbageStateResponse {
    pub fn from_domain(state: &CribbageState, base_url: Option<&str>) -> Self {
        Self {
            phase: state.phase,
            dealer: state.dealer,
            crib: CardResponse::from_cards(&state.crib, base_url),
            starter: state
                .starter
                .as_ref()
                .map(|card| CardResponse::from_card(card, base_url)),
            played_cards: CardResponse::from_cards(&state.played_cards, base_url),
            play_total: state.play_total,
            play_count: state.play_count,
            scores: state.scores,
            game_score: state.game_score,
            last_to_play: state.last_to_play,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GameSummaryResponse {
    pub id: Uuid,
    pub game_type: GameType,
    pub status: GameStatus,
    pub deck_name: String,
    pub deck_type: DeckType,
    pub max_players: usize,
    pub current_players: usize,
    pub remaining_cards: usize,
    pub created: DateTime<Utc>,
}

impl GameSummaryResponse {
    pub fn from_domain(game: &Game) -> Self {
        Self {
            id: game.id,
            game_type: game.game_type,
            status: game.status,
            deck_name: game.deck.name.clone(),
            deck_type: game.deck.deck_type,
            max_players: game.max_players,
            current_players: game.players.len(),
            remaining_cards: game.deck.remaining(),
            created: game.created,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GameStateResponse {
    #[serde(flatten)]
    pub summary: GameSummaryResponse,
    pub players: Vec<PlayerResponse>,
    pub dealer: PlayerResponse,
    pub discard_piles: Vec<DiscardPileResponse>,
    pub current_player: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cribbage_state: Option<CribbageStateResponse>,
}

impl GameStateResponse {
    pub fn from_domain(game: &Game, base_url: Option<&str>) -> Self {
        Self {
            summary: GameSummaryResponse::from_domain(game),
            players: game
                .players
                .iter()
                .map(|player| PlayerResponse::from_domain(player, game.game_type, base_url))
                .collect(),
            dealer: PlayerResponse::from_domain(&game.dealer, game.game_type, base_url),
            discard_piles: game
                .discard_piles
                .iter()
                .map(|pile| DiscardPileResponse::from_domain(pile, base_url))
                .collect(),
            current_player: game.current_player,
            cribbage_state: game
                .cribbage
                .as_ref()
                .map(|state| CribbageStateResponse::from_domain(state, base_url)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DealResponse {
    pub cards: Vec<CardResponse>,
    pub remaining_cards: usize,
}

#[derive(Debug, Serialize)]
pub struct BlackjackResultsResponse {
    pub results: HashMap<String, BlackjackOutcome>,
}

#[derive(Debug, Serialize)]
pub struct CribbagePlayResponse {
    /// Points pegged by the play just made.
    pub points: u32,
    pub state: GameStateResponse,
}

// ---------------------------------------------------------------------------
// Custom deck views

#[derive(Debug, Serialize)]
pub struct CustomDeckResponse {
    pub id: Uuid,
    pub name: String,
    pub card_count: usize,
    pub created: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
}

impl CustomDeckResponse {
    pub fn from_domain(deck: &CustomDeck) -> Self {
        Self {
            id: deck.id,
            name: deck.name.clone(),
            card_count: deck.card_count(),
            created: deck.created,
            last_used: deck.last_used,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomCardListResponse {
    pub cards: Vec<CustomCard>,
}
