//! The custom-deck catalogue: named decks of free-form card records with
//! monotonically allocated indices and tombstone deletion.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{GameError, GameResult};

/// Most non-deleted cards a deck will hold.
pub const MAX_LIVE_CARDS: usize = 2000;
/// Most attributes a single card will hold.
pub const MAX_ATTRIBUTES: usize = 100;
pub const MAX_ATTRIBUTE_KEY_LEN: usize = 50;
pub const MAX_ATTRIBUTE_VALUE_LEN: usize = 200;

/// A card rank as supplied by the caller: a number, or free-form text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RankValue {
    Number(i64),
    Text(String),
}

impl RankValue {
    pub fn is_numeric(&self) -> bool {
        matches!(self, RankValue::Number(_))
    }
}

/// A free-form card record. Deleted cards stay in place as tombstones so
/// their index remains queryable and is never reused.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CustomCard {
    pub index: u64,
    pub name: String,
    pub rank: Option<RankValue>,
    pub suit: String,
    /// Whether the card could participate in a standard card game: a
    /// numeric rank and a non-empty suit.
    pub game_compatible: bool,
    pub attributes: BTreeMap<String, String>,
    pub deleted: bool,
}

/// A named catalogue of custom cards.
#[derive(Clone, Debug)]
pub struct CustomDeck {
    pub id: Uuid,
    pub name: String,
    pub cards: Vec<CustomCard>,
    next_index: u64,
    pub created: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
}

impl CustomDeck {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            cards: Vec::new(),
            next_index: 0,
            created: now,
            last_used: now,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_used = now;
    }

    /// Append a card under the next monotonic index.
    pub fn add_card(
        &mut self,
        name: impl Into<String>,
        rank: Option<RankValue>,
        suit: impl Into<String>,
        attributes: BTreeMap<String, String>,
    ) -> GameResult<&CustomCard> {
        if self.card_count() >= MAX_LIVE_CARDS {
            return Err(GameError::exhausted(format!(
                "deck is full ({MAX_LIVE_CARDS} cards)"
            )));
        }
        if attributes.len() > MAX_ATTRIBUTES {
            return Err(GameError::exhausted(format!(
                "too many attributes (limit {MAX_ATTRIBUTES})"
            )));
        }
        for (key, value) in &attributes {
            if key.is_empty() || key.len() > MAX_ATTRIBUTE_KEY_LEN {
                return Err(GameError::invalid_argument(format!(
                    "attribute key must be 1..={MAX_ATTRIBUTE_KEY_LEN} characters"
                )));
            }
            if value.len() > MAX_ATTRIBUTE_VALUE_LEN {
                return Err(GameError::invalid_argument(format!(
                    "attribute value must be at most {MAX_ATTRIBUTE_VALUE_LEN} characters"
                )));
            }
        }

        let suit = suit.into();
        let game_compatible =
            rank.as_ref().map(RankValue::is_numeric).unwrap_or(false) && !suit.is_empty();
        let card = CustomCard {
            index: self.next_index,
            name: name.into(),
            rank,
            suit,
            game_compatible,
            attributes,
            deleted: false,
        };
        self.next_index += 1;
        self.cards.push(card);
        Ok(self.cards.last().expect("card just pushed"))
    }

    /// Look up a card by its assigned index, tombstoned or not.
    pub fn card(&self, index: u64) -> Option<&CustomCard> {
        self.cards.iter().find(|card| card.index == index)
    }

    /// Tombstone a card. Deleting a missing or already-deleted card is
    /// reported as not found.
    pub fn delete_card(&mut self, index: u64) -> GameResult<()> {
        match self.cards.iter_mut().find(|card| card.index == index) {
            Some(card) if !card.deleted => {
                card.deleted = true;
                Ok(())
            }
            _ => Err(GameError::not_found(format!("card {index} not found"))),
        }
    }

    /// Cards in insertion order, skipping tombstones unless asked for.
    pub fn list_cards(&self, include_deleted: bool) -> Vec<&CustomCard> {
        self.cards
            .iter()
            .filter(|card| include_deleted || !card.deleted)
            .collect()
    }

    /// Number of non-deleted cards.
    pub fn card_count(&self) -> usize {
        self.cards.iter().filter(|card| !card.deleted).count()
    }
}
