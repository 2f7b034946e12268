#![cfg(test)]

use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};

use crate::cards::{Card, DeckType, Suit, ACE, KING};
use crate::errors::GameError;

use super::blackjack::BlackjackOutcome;
use super::player::DEALER_ID;
use super::session::{Game, GameStatus, GameType, MAIN_PILE_ID};

fn new_game(game_type: GameType, max_players: usize) -> Game {
    let mut rng = StdRng::seed_from_u64(11);
    Game::new(game_type, 1, DeckType::Standard, max_players, &mut rng, Utc::now())
}

fn force_deck(game: &mut Game, cards: &[(u8, Suit)]) {
    game.deck.cards = cards.iter().map(|&(r, s)| Card::new(r, s)).collect();
}

fn add_two(game: &mut Game) -> (String, String) {
    let alice = game.add_player("Alice").unwrap().id.clone();
    let bob = game.add_player("Bob").unwrap().id.clone();
    (alice, bob)
}

#[test]
fn add_player_respects_the_cap_and_remove_restores_the_set() {
    let mut game = new_game(GameType::Blackjack, 2);
    let (alice, _bob) = add_two(&mut game);
    assert_eq!(
        game.add_player("Carol").unwrap_err(),
        GameError::precondition("game is full")
    );

    game.remove_player(&alice).unwrap();
    assert_eq!(game.players.len(), 1);
    assert!(game.player(&alice).is_none());

    let carol = game.add_player("Carol").unwrap().id.clone();
    assert_eq!(game.players.len(), 2);
    assert!(game.player(&carol).is_some());
}

#[test]
fn dealer_resolves_by_reserved_id_and_cannot_be_removed() {
    let mut game = new_game(GameType::Blackjack, 4);
    assert_eq!(game.player(DEALER_ID).unwrap().name, "Dealer");
    assert!(matches!(
        game.remove_player(DEALER_ID),
        Err(GameError::InvalidArgument(_))
    ));
}

#[test]
fn deal_to_unknown_player_leaves_the_deck_untouched() {
    let mut game = new_game(GameType::Blackjack, 4);
    let before = game.deck.remaining();
    assert!(matches!(
        game.deal_to_player("nobody", true),
        Err(GameError::NotFound(_))
    ));
    assert_eq!(game.deck.remaining(), before);
}

#[test]
fn deal_to_player_sets_face_and_moves_exactly_one_card() {
    let mut game = new_game(GameType::Blackjack, 4);
    let id = game.add_player("Alice").unwrap().id.clone();
    let card = game.deal_to_player(&id, false).unwrap();
    assert!(!card.face_up);
    assert_eq!(game.player(&id).unwrap().hand_size(), 1);
    assert_eq!(game.deck.remaining(), 51);
}

#[test]
fn discard_moves_a_card_to_the_named_pile() {
    let mut game = new_game(GameType::Poker, 4);
    let id = game.add_player("Alice").unwrap().id.clone();
    game.deal_to_player(&id, true).unwrap();

    let card = game.discard_from_player(&id, 0, MAIN_PILE_ID).unwrap();
    assert_eq!(game.player(&id).unwrap().hand_size(), 0);
    assert_eq!(game.discard_pile(MAIN_PILE_ID).unwrap().top_card(), Some(&card));

    assert!(matches!(
        game.discard_from_player(&id, 0, MAIN_PILE_ID),
        Err(GameError::InvalidArgument(_))
    ));
    assert!(matches!(
        game.discard_from_player(&id, 0, "burn"),
        Err(GameError::NotFound(_))
    ));

    game.add_discard_pile("burn", "Burn").unwrap();
    assert!(game.add_discard_pile("burn", "Burn").is_err());
}

#[test]
fn start_blackjack_needs_players() {
    let mut game = new_game(GameType::Blackjack, 4);
    assert_eq!(
        game.start_blackjack().unwrap_err(),
        GameError::precondition("no players in game")
    );
}

#[test]
fn start_blackjack_with_a_short_deck_fails_without_mutating() {
    let mut game = new_game(GameType::Blackjack, 4);
    let (alice, bob) = add_two(&mut game);
    force_deck(&mut game, &[(2, Suit::Hearts), (3, Suit::Hearts), (4, Suit::Hearts)]);

    assert!(matches!(
        game.start_blackjack(),
        Err(GameError::ResourceExhausted(_))
    ));
    assert_eq!(game.status, GameStatus::Waiting);
    assert_eq!(game.deck.remaining(), 3);
    assert_eq!(game.player(&alice).unwrap().hand_size(), 0);
    assert_eq!(game.player(&bob).unwrap().hand_size(), 0);
    assert_eq!(game.dealer.hand_size(), 0);
}

#[test]
fn blackjack_happy_path_deals_hits_and_settles() {
    let mut game = new_game(GameType::Blackjack, 4);
    let (alice, bob) = add_two(&mut game);
    force_deck(
        &mut game,
        &[
            (5, Suit::Hearts),
            (6, Suit::Hearts),
            (7, Suit::Hearts),
            (8, Suit::Hearts),
            (9, Suit::Hearts),
            (10, Suit::Hearts),
            (2, Suit::Clubs),
        ],
    );

    game.start_blackjack().unwrap();
    assert_eq!(game.status, GameStatus::InProgress);
    assert_eq!(game.current_player, 0);

    // Round one goes to the players face-up and the dealer's hole card,
    // round two finishes everyone.
    let alice_hand = &game.player(&alice).unwrap().hand;
    assert_eq!(alice_hand[0], Card::face_up(5, Suit::Hearts));
    assert_eq!(alice_hand[1], Card::face_up(8, Suit::Hearts));
    let bob_player = game.player(&bob).unwrap();
    assert_eq!(bob_player.blackjack_hand_value().0, 15);
    assert!(!game.dealer.hand[0].face_up);
    assert!(game.dealer.hand[1].face_up);
    assert_eq!(game.dealer.blackjack_hand_value().0, 17);

    // Bob may hit out of turn; he draws the 2♣ for 17.
    game.player_hit(&bob).unwrap();
    assert_eq!(game.player(&bob).unwrap().blackjack_hand_value().0, 17);

    // Bob cannot stand before Alice.
    assert_eq!(
        game.player_stand(&bob).unwrap_err(),
        GameError::precondition("not your turn")
    );
    game.player_stand(&alice).unwrap();
    game.player_stand(&bob).unwrap();

    // Dealer already holds 17 and stands; the hole card is revealed.
    assert_eq!(game.status, GameStatus::Finished);
    assert!(game.dealer.hand[0].face_up);
    assert_eq!(game.dealer.hand_size(), 2);

    let results = game.blackjack_results().unwrap();
    assert_eq!(results[&alice], BlackjackOutcome::Lose);
    assert_eq!(results[&bob], BlackjackOutcome::Push);
}

#[test]
fn busting_hit_advances_turn() {
    let mut game = new_game(GameType::Blackjack, 4);
    let id = game.add_player("Solo").unwrap().id.clone();
    force_deck(
        &mut game,
        &[
            (10, Suit::Hearts),
            (2, Suit::Clubs),
            (5, Suit::Diamonds),
            (10, Suit::Diamonds),
            (9, Suit::Spades),
            (KING, Suit::Clubs),
        ],
    );

    game.start_blackjack().unwrap();
    assert_eq!(game.player(&id).unwrap().blackjack_hand_value().0, 15);

    // The 9♠ busts the player; the implicit stand hands play to the dealer,
    // who draws the K♣ and busts in turn.
    game.player_hit(&id).unwrap();
    assert_eq!(game.status, GameStatus::Finished);
    assert!(game.player(&id).unwrap().is_busted());

    let results = game.blackjack_results().unwrap();
    assert_eq!(results[&id], BlackjackOutcome::Bust);
}

#[test]
fn natural_blackjack_beats_a_dealer_twenty_one_but_pushes_another_natural() {
    // Player natural vs dealer bust.
    let mut game = new_game(GameType::Blackjack, 4);
    let id = game.add_player("Nat").unwrap().id.clone();
    force_deck(
        &mut game,
        &[
            (ACE, Suit::Spades),
            (5, Suit::Diamonds),
            (KING, Suit::Hearts),
            (9, Suit::Clubs),
            (10, Suit::Diamonds),
        ],
    );
    game.start_blackjack().unwrap();
    game.player_stand(&id).unwrap();
    let results = game.blackjack_results().unwrap();
    assert_eq!(results[&id], BlackjackOutcome::Blackjack);

    // Both natural: push.
    let mut game = new_game(GameType::Blackjack, 4);
    let id = game.add_player("Nat").unwrap().id.clone();
    force_deck(
        &mut game,
        &[
            (ACE, Suit::Spades),
            (ACE, Suit::Diamonds),
            (KING, Suit::Hearts),
            (KING, Suit::Diamonds),
        ],
    );
    game.start_blackjack().unwrap();
    game.player_stand(&id).unwrap();
    let results = game.blackjack_results().unwrap();
    assert_eq!(results[&id], BlackjackOutcome::Push);
}

#[test]
fn results_are_only_available_once_finished() {
    let mut game = new_game(GameType::Blackjack, 4);
    game.add_player("Alice").unwrap();
    assert!(matches!(
        game.blackjack_results(),
        Err(GameError::PreconditionFailed(_))
    ));
}

#[test]
fn hit_requires_a_game_in_progress() {
    let mut game = new_game(GameType::Blackjack, 4);
    let id = game.add_player("Alice").unwrap().id.clone();
    assert_eq!(
        game.player_hit(&id).unwrap_err(),
        GameError::precondition("game is not in progress")
    );
}

#[test]
fn glitchjack_plays_through_the_blackjack_engine() {
    let mut game = new_game(GameType::Glitchjack, 4);
    assert_eq!(game.deck.remaining(), 52);

    let id = game.add_player("Glitch").unwrap().id.clone();
    game.start_blackjack().unwrap();
    assert_eq!(game.player(&id).unwrap().hand_size(), 2);
    assert_eq!(game.dealer.hand_size(), 2);

    game.player_stand(&id).unwrap();
    assert_eq!(game.status, GameStatus::Finished);
    assert!(game.dealer.blackjack_hand_value().0 >= 17 || game.deck.is_empty());
    game.blackjack_results().unwrap();
}

#[test]
fn restarting_a_started_game_is_rejected() {
    let mut game = new_game(GameType::Blackjack, 4);
    game.add_player("Alice").unwrap();
    game.start_blackjack().unwrap();
    assert_eq!(
        game.start_blackjack().unwrap_err(),
        GameError::precondition("game has already started")
    );
}
