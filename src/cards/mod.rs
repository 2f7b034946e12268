//! Cards, decks, and deck naming.

mod card;
mod deck;
mod names;

pub use card::{Card, Rank, Suit, ACE, JACK, KING, QUEEN};
pub use deck::{Deck, DeckType};
pub use names::random_deck_name;
