//! Blackjack turn flow. Glitchjack games run through the same engine; only
//! the deck composition differs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{GameError, GameResult};

use super::session::{Game, GameStatus};

/// Dealer draws to 17 and stands on all 17s, soft included.
const DEALER_STAND_TOTAL: u32 = 17;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlackjackOutcome {
    Bust,
    Blackjack,
    Win,
    Push,
    Lose,
}

impl Game {
    /// Deal the opening hands and begin play.
    ///
    /// Each player receives two face-up cards; the dealer receives a
    /// face-down hole card and then a face-up card. The full deal is checked
    /// against the deck before any card moves, so a short deck fails without
    /// mutating the game.
    pub fn start_blackjack(&mut self) -> GameResult<()> {
        if self.status != GameStatus::Waiting {
            return Err(GameError::precondition("game has already started"));
        }
        if self.players.is_empty() {
            return Err(GameError::precondition("no players in game"));
        }
        let needed = 2 * (self.players.len() + 1);
        if self.deck.remaining() < needed {
            return Err(GameError::exhausted("not enough cards to start the game"));
        }

        for round in 0..2 {
            let ids: Vec<String> = self.players.iter().map(|p| p.id.clone()).collect();
            for id in ids {
                self.deal_to_player(&id, true)?;
            }
            // Round zero is the dealer's hole card.
            self.deal_to_player(super::player::DEALER_ID, round == 1)?;
        }

        self.status = GameStatus::InProgress;
        self.current_player = 0;
        Ok(())
    }

    /// Deal one face-up card to the player. A player who busts is implicitly
    /// stood: if it was their turn, the turn advances (and the dealer plays
    /// once the last player has acted).
    pub fn player_hit(&mut self, player_id: &str) -> GameResult<()> {
        if self.status != GameStatus::InProgress {
            return Err(GameError::precondition("game is not in progress"));
        }
        let index = self
            .player_index(player_id)
            .ok_or_else(|| GameError::not_found(format!("player {player_id} not found")))?;
        self.deal_to_player(player_id, true)?;
        if self.players[index].is_busted() && index == self.current_player {
            self.advance_turn();
        }
        Ok(())
    }

    /// Stand the current player and advance the turn. The dealer plays after
    /// the last player stands.
    pub fn player_stand(&mut self, player_id: &str) -> GameResult<()> {
        if self.status != GameStatus::InProgress {
            return Err(GameError::precondition("game is not in progress"));
        }
        let index = self
            .player_index(player_id)
            .ok_or_else(|| GameError::not_found(format!("player {player_id} not found")))?;
        if index != self.current_player {
            return Err(GameError::precondition("not your turn"));
        }
        self.advance_turn();
        Ok(())
    }

    fn advance_turn(&mut self) {
        self.current_player += 1;
        if self.current_player >= self.players.len() {
            self.play_dealer();
        }
    }

    /// Reveal the hole card and draw until the dealer reaches 17, then finish
    /// the game. Drawing also stops if the deck runs dry.
    fn play_dealer(&mut self) {
        if let Some(hole) = self.dealer.hand.first_mut() {
            hole.face_up = true;
        }
        while self.dealer.blackjack_hand_value().0 < DEALER_STAND_TOTAL {
            match self.deck.deal() {
                Some(mut card) => {
                    card.face_up = true;
                    self.dealer.add_card(card);
                }
                None => break,
            }
        }
        self.status = GameStatus::Finished;
    }

    /// Classify every player's outcome against the dealer. Only valid once
    /// the game is finished.
    pub fn blackjack_results(&self) -> GameResult<HashMap<String, BlackjackOutcome>> {
        if self.status != GameStatus::Finished {
            return Err(GameError::precondition("game is not finished"));
        }
        let (dealer_total, dealer_blackjack) = self.dealer.blackjack_hand_value();
        let dealer_busted = dealer_total > 21;

        let mut results = HashMap::with_capacity(self.players.len());
        for player in &self.players {
            let (total, natural) = player.blackjack_hand_value();
            let outcome = if total > 21 {
                BlackjackOutcome::Bust
            } else if natural && !dealer_blackjack {
                BlackjackOutcome::Blackjack
            } else if dealer_busted || total > dealer_total {
                BlackjackOutcome::Win
            } else if total == dealer_total {
                BlackjackOutcome::Push
            } else {
                BlackjackOutcome::Lose
            };
            results.insert(player.id.clone(), outcome);
        }
        Ok(results)
    }
}
