//! Cribbage for two players: deal, discard to the crib, the starter cut,
//! pegging to 31, and show scoring, first to 121.

pub mod scoring;


use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, JACK};
use crate::errors::{GameError, GameResult};

use self::scoring::{pegging_points, show_points};
use super::session::{Game, GameStatus, GameType};

pub const CRIBBAGE_PLAYERS: usize = 2;
pub const DEAL_SIZE: usize = 6;
pub const PLAY_LIMIT: u32 = 31;
pub const DEFAULT_GAME_SCORE: u32 = 121;

const CRIB_SIZE: usize = 4;
const HIS_HEELS_POINTS: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CribbagePhase {
    Deal,
    Discard,
    Play,
    Show,
    Finished,
}

/// Per-hand and per-game cribbage state, owned by the game session.
#[derive(Clone, Debug)]
pub struct CribbageState {
    pub phase: CribbagePhase,
    /// Index of the dealing player; alternates each hand.
    pub dealer: usize,
    pub crib: Vec<Card>,
    pub starter: Option<Card>,
    /// Cards laid in the current pegging round, newest last.
    pub played_cards: Vec<Card>,
    pub play_total: u32,
    pub play_count: u32,
    pub scores: [u32; 2],
    pub game_score: u32,
    pub last_to_play: Option<usize>,
    /// The four cards each player kept, snapshotted when pegging begins and
    /// restored for the show.
    kept_hands: [Vec<Card>; 2],
}

impl CribbageState {
    fn new() -> Self {
        Self {
            phase: CribbagePhase::Deal,
            dealer: 0,
            crib: Vec::new(),
            starter: None,
            played_cards: Vec::new(),
            play_total: 0,
            play_count: 0,
            scores: [0, 0],
            game_score: DEFAULT_GAME_SCORE,
            last_to_play: None,
            kept_hands: [Vec::new(), Vec::new()],
        }
    }

    pub fn non_dealer(&self) -> usize {
        (self.dealer + 1) % CRIBBAGE_PLAYERS
    }
}

/// Scores credited during one show, and the match state afterwards.
#[derive(Clone, Debug, Serialize)]
pub struct ShowResult {
    /// Hand points per player index; zero for hands the count-out cut off.
    pub hand_points: [u32; 2],
    /// Crib points credited to the dealer, absent if the count-out came
    /// first.
    pub crib_points: Option<u32>,
    pub scores: [u32; 2],
    pub winner: Option<usize>,
}

impl Game {
    /// Begin a cribbage match: exactly two players, dealer starts at index 0,
    /// six cards each dealt in alternation starting with the non-dealer. The
    /// full deal plus the starter cut is checked against the deck before any
    /// card moves.
    pub fn start_cribbage(&mut self) -> GameResult<()> {
        if self.game_type != GameType::Cribbage {
            return Err(GameError::precondition("not a cribbage game"));
        }
        if self.status != GameStatus::Waiting {
            return Err(GameError::precondition("game has already started"));
        }
        if self.players.len() != CRIBBAGE_PLAYERS {
            return Err(GameError::precondition(
                "cribbage requires exactly 2 players",
            ));
        }
        if self.deck.remaining() < CRIBBAGE_PLAYERS * DEAL_SIZE + 1 {
            return Err(GameError::exhausted("not enough cards to start the game"));
        }

        self.cribbage = Some(CribbageState::new());
        self.status = GameStatus::InProgress;
        self.deal_hands()
    }

    /// Deal the next hand after a show has rotated the dealer. The deck is
    /// rebuilt and shuffled, then six cards go to each player.
    pub fn deal_cribbage_hand(&mut self, rng: &mut impl Rng) -> GameResult<()> {
        let state = self.cribbage_state()?;
        if state.phase != CribbagePhase::Deal {
            return Err(GameError::precondition("not in deal phase"));
        }
        let copies = 1;
        let deck_type = self.deck.deck_type;
        self.deck.reset(copies, deck_type);
        self.deck.shuffle(rng);
        for player in &mut self.players {
            player.clear_hand();
        }
        self.deal_hands()
    }

    /// Discard exactly two cards from a six-card hand into the crib. When
    /// both players have discarded, the starter is cut ("his heels" pays the
    /// dealer two for a jack) and pegging begins with the non-dealer.
    pub fn cribbage_discard(&mut self, player_id: &str, indices: &[usize]) -> GameResult<()> {
        if self.cribbage_state()?.phase != CribbagePhase::Discard {
            return Err(GameError::precondition("not in discard phase"));
        }
        let index = self.cribbage_player_index(player_id)?;
        if indices.len() != 2 {
            return Err(GameError::invalid_argument(
                "must discard exactly two cards",
            ));
        }
        if indices[0] == indices[1] {
            return Err(GameError::invalid_argument(
                "discard indices must be distinct",
            ));
        }
        let hand_size = self.players[index].hand_size();
        if hand_size != DEAL_SIZE {
            return Err(GameError::precondition("player has already discarded"));
        }
        if indices.iter().any(|&i| i >= hand_size) {
            return Err(GameError::invalid_argument("card index out of range"));
        }

        let mut order = [indices[0], indices[1]];
        order.sort_unstable_by(|a, b| b.cmp(a));
        for &i in &order {
            let card = self.players[index]
                .remove_card(i)
                .expect("index bounds checked above");
            self.cribbage_mut().crib.push(card);
        }

        if self.cribbage_mut().crib.len() == CRIB_SIZE {
            self.cut_starter()?;
        }
        Ok(())
    }

    fn cut_starter(&mut self) -> GameResult<()> {
        let mut starter = self
            .deck
            .deal()
            .ok_or_else(|| GameError::exhausted("no cards remaining in deck"))?;
        starter.face_up = true;

        let state = self.cribbage_mut();
        state.starter = Some(starter);
        let dealer = state.dealer;

        if starter.rank == JACK && self.award_points(dealer, HIS_HEELS_POINTS) {
            return Ok(());
        }

        let kept = [
            self.players[0].hand.clone(),
            self.players[1].hand.clone(),
        ];
        let state = self.cribbage_mut();
        state.kept_hands = kept;
        state.phase = CribbagePhase::Play;
        self.current_player = self.cribbage_mut().non_dealer();
        Ok(())
    }

    /// Lay a card on the pegging pile. Scores fifteens, thirty-ones, pairs,
    /// and runs for the player, enforcing the 31 cap. Returns the points
    /// pegged by this play.
    pub fn cribbage_play(&mut self, player_id: &str, card_index: usize) -> GameResult<u32> {
        if self.cribbage_state()?.phase != CribbagePhase::Play {
            return Err(GameError::precondition("not in play phase"));
        }
        let index = self.cribbage_player_index(player_id)?;
        if index != self.current_player {
            return Err(GameError::precondition("not your turn"));
        }
        let card = match self.players[index].hand.get(card_index) {
            Some(card) => *card,
            None => {
                return Err(GameError::invalid_argument(format!(
                    "card index {card_index} out of range"
                )))
            }
        };
        let value = card.cribbage_value();
        if self.cribbage_state()?.play_total + value > PLAY_LIMIT {
            return Err(GameError::precondition("card would exceed 31"));
        }

        let mut card = self.players[index]
            .remove_card(card_index)
            .expect("index bounds checked above");
        card.face_up = true;
        let state = self.cribbage_mut();
        state.played_cards.push(card);
        state.play_total += value;
        state.play_count += 1;
        state.last_to_play = Some(index);

        let points = pegging_points(&self.cribbage_mut().played_cards);
        if points > 0 && self.award_points(index, points) {
            return Ok(points);
        }

        let hands_empty = self.players.iter().all(|p| p.hand.is_empty());
        if self.cribbage_mut().play_total == PLAY_LIMIT || hands_empty {
            self.reset_play_round();
            if self.status == GameStatus::Finished {
                return Ok(points);
            }
        } else {
            self.current_player = (self.current_player + 1) % CRIBBAGE_PLAYERS;
        }

        if hands_empty && self.cribbage_mut().play_total == 0 {
            self.enter_show();
        }
        Ok(points)
    }

    /// Declare that the current player cannot lay a card without exceeding
    /// 31. Rejected while a legal play exists. If the opponent cannot play
    /// either, the last player to lay a card takes the go point and the
    /// round resets.
    pub fn cribbage_go(&mut self, player_id: &str) -> GameResult<()> {
        if self.cribbage_state()?.phase != CribbagePhase::Play {
            return Err(GameError::precondition("not in play phase"));
        }
        let index = self.cribbage_player_index(player_id)?;
        if index != self.current_player {
            return Err(GameError::precondition("not your turn"));
        }
        if self.can_play(index) {
            return Err(GameError::precondition(
                "you must play a card if possible",
            ));
        }

        self.current_player = (index + 1) % CRIBBAGE_PLAYERS;
        if !self.can_play(self.current_player) {
            // Neither side can play: the reset's last-card point is the go
            // point.
            self.reset_play_round();
            if self.status == GameStatus::Finished {
                return Ok(());
            }
            if self.players.iter().all(|p| p.hand.is_empty()) {
                self.enter_show();
            }
        }
        Ok(())
    }

    /// Score the show in strict order non-dealer, dealer, crib; the first
    /// player to reach the game score wins immediately and later scores are
    /// not awarded. Otherwise the dealer rotates and the next hand waits to
    /// be dealt.
    pub fn cribbage_show(&mut self) -> GameResult<ShowResult> {
        let state = self.cribbage_state()?;
        if state.phase != CribbagePhase::Show {
            return Err(GameError::precondition("not in show phase"));
        }
        let starter = state
            .starter
            .ok_or_else(|| GameError::precondition("no starter has been cut"))?;
        let dealer = state.dealer;
        let non_dealer = state.non_dealer();

        let mut result = ShowResult {
            hand_points: [0, 0],
            crib_points: None,
            scores: state.scores,
            winner: None,
        };

        let points = show_points(&self.players[non_dealer].hand, starter, false);
        result.hand_points[non_dealer] = points;
        if self.award_points(non_dealer, points) {
            return Ok(self.finish_show(result, non_dealer));
        }

        let points = show_points(&self.players[dealer].hand, starter, false);
        result.hand_points[dealer] = points;
        if self.award_points(dealer, points) {
            return Ok(self.finish_show(result, dealer));
        }

        let crib_points = show_points(&self.cribbage_mut().crib, starter, true);
        result.crib_points = Some(crib_points);
        if self.award_points(dealer, crib_points) {
            return Ok(self.finish_show(result, dealer));
        }

        self.rotate_hand();
        result.scores = self.cribbage_mut().scores;
        Ok(result)
    }

    fn finish_show(&mut self, mut result: ShowResult, winner: usize) -> ShowResult {
        result.scores = self.cribbage_mut().scores;
        result.winner = Some(winner);
        result
    }

    fn rotate_hand(&mut self) {
        for player in &mut self.players {
            player.clear_hand();
        }
        let state = self.cribbage_mut();
        state.dealer = (state.dealer + 1) % CRIBBAGE_PLAYERS;
        state.crib.clear();
        state.starter = None;
        state.played_cards.clear();
        state.play_total = 0;
        state.play_count = 0;
        state.last_to_play = None;
        state.kept_hands = [Vec::new(), Vec::new()];
        state.phase = CribbagePhase::Deal;
        self.current_player = self.cribbage_mut().non_dealer();
    }

    /// End a pegging round: the last card played earns a point unless the
    /// round ended exactly on 31 (already scored), then the count resets and
    /// play resumes with the first player still holding cards.
    fn reset_play_round(&mut self) {
        let state = self.cribbage_mut();
        let last = state.last_to_play;
        let on_thirty_one = state.play_total == PLAY_LIMIT;
        if !on_thirty_one {
            if let Some(player) = last {
                if self.award_points(player, 1) {
                    let state = self.cribbage_mut();
                    state.play_total = 0;
                    state.played_cards.clear();
                    state.last_to_play = None;
                    return;
                }
            }
        }
        let state = self.cribbage_mut();
        state.play_total = 0;
        state.played_cards.clear();
        state.last_to_play = None;
        if let Some(first) = self.players.iter().position(|p| !p.hand.is_empty()) {
            self.current_player = first;
        }
    }

    fn enter_show(&mut self) {
        let kept = std::mem::take(&mut self.cribbage_mut().kept_hands);
        for (player, hand) in self.players.iter_mut().zip(kept) {
            player.hand = hand;
        }
        let state = self.cribbage_mut();
        state.phase = CribbagePhase::Show;
        self.current_player = self.cribbage_mut().non_dealer();
    }

    /// Credit points and finish the match if the player counted out.
    fn award_points(&mut self, player: usize, points: u32) -> bool {
        let state = self.cribbage_mut();
        state.scores[player] += points;
        if state.scores[player] >= state.game_score {
            state.phase = CribbagePhase::Finished;
            self.status = GameStatus::Finished;
            true
        } else {
            false
        }
    }

    fn can_play(&self, index: usize) -> bool {
        let total = match &self.cribbage {
            Some(state) => state.play_total,
            None => return false,
        };
        self.players[index]
            .hand
            .iter()
            .any(|card| total + card.cribbage_value() <= PLAY_LIMIT)
    }

    fn deal_hands(&mut self) -> GameResult<()> {
        if self.deck.remaining() < CRIBBAGE_PLAYERS * DEAL_SIZE + 1 {
            return Err(GameError::exhausted("not enough cards to deal the hand"));
        }
        let state = self.cribbage_state()?;
        let non_dealer = state.non_dealer();
        let dealer = state.dealer;
        let order = [
            self.players[non_dealer].id.clone(),
            self.players[dealer].id.clone(),
        ];
        for _ in 0..DEAL_SIZE {
            for id in &order {
                self.deal_to_player(id, true)?;
            }
        }
        self.cribbage_mut().phase = CribbagePhase::Discard;
        self.current_player = self.cribbage_mut().non_dealer();
        Ok(())
    }

    fn cribbage_state(&self) -> GameResult<&CribbageState> {
        self.cribbage
            .as_ref()
            .ok_or_else(|| GameError::precondition("cribbage game has not started"))
    }

    fn cribbage_mut(&mut self) -> &mut CribbageState {
        self.cribbage
            .as_mut()
            .expect("cribbage state checked before mutation")
    }

    fn cribbage_player_index(&self, player_id: &str) -> GameResult<usize> {
        self.player_index(player_id)
            .ok_or_else(|| GameError::not_found(format!("player {player_id} not found")))
    }
}
