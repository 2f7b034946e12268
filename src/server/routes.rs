use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::cards::DeckType;
use crate::catalogue::{CustomCard, CustomDeck};
use crate::engine::cribbage::ShowResult;
use crate::engine::session::{Game, GameType};
use crate::errors::GameError;
use crate::registry::{CustomDeckRegistry, GameRegistry, Handle};

use super::dto::{
    AddCustomCardRequest, AddPileRequest, AddPlayerRequest, BlackjackResultsResponse,
    CardResponse, CreateDeckRequest, CreateGameRequest, CribbagePlayResponse,
    CribbageStateResponse, CustomCardListResponse, CustomDeckResponse, DealRequest, DealResponse,
    DiscardPileResponse, DiscardRequest, DiscardToPileRequest, GameStateResponse,
    GameSummaryResponse, ListCardsQuery, PlayRequest, PlayerResponse, ResetDeckRequest,
};
use super::error::ApiError;

// Request bounds enforced at this layer.
const MAX_DECK_COPIES: i64 = 100;
const MAX_PLAYERS_LIMIT: i64 = 10;
const MAX_DEAL_COUNT: i64 = 52;
const MAX_PLAYER_NAME_LEN: usize = 50;
const MAX_DECK_NAME_LEN: usize = 128;

const DEFAULT_DECK_COPIES: i64 = 1;
const DEFAULT_MAX_PLAYERS: i64 = 4;

/// Shared state handed to every handler: the two registries, the process
/// RNG, and the optional base URL for card-image links.
pub struct ServerContext {
    pub games: GameRegistry,
    pub decks: CustomDeckRegistry,
    pub rng: Mutex<StdRng>,
    pub base_url: Option<String>,
}

impl ServerContext {
    pub fn new(rng: StdRng, base_url: Option<String>) -> Self {
        Self {
            games: GameRegistry::new("games"),
            decks: CustomDeckRegistry::new("custom_decks"),
            rng: Mutex::new(rng),
            base_url,
        }
    }

    fn base(&self) -> Option<&str> {
        self.base_url.as_deref()
    }
}

pub struct CardRoomServer {
    router: Router,
}

impl CardRoomServer {
    pub fn new(context: Arc<ServerContext>) -> Self {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let router = Router::new()
            .route("/healthz", get(healthz))
            .route("/games", post(create_game).get(list_games))
            .route("/games/:game_id", get(get_game).delete(delete_game))
            .route("/games/:game_id/shuffle", post(shuffle_deck))
            .route("/games/:game_id/deck/reset", post(reset_deck))
            .route("/games/:game_id/players", post(add_player))
            .route("/games/:game_id/players/:player_id", delete(remove_player))
            .route("/games/:game_id/players/:player_id/deal", post(deal_to_player))
            .route(
                "/games/:game_id/players/:player_id/discard",
                post(discard_to_pile),
            )
            .route("/games/:game_id/piles", post(add_pile))
            .route("/games/:game_id/piles/:pile_id", get(get_pile))
            .route("/games/:game_id/blackjack/start", post(start_blackjack))
            .route("/games/:game_id/blackjack/results", get(blackjack_results))
            .route("/games/:game_id/blackjack/:player_id/hit", post(blackjack_hit))
            .route(
                "/games/:game_id/blackjack/:player_id/stand",
                post(blackjack_stand),
            )
            .route("/games/:game_id/cribbage", get(get_cribbage))
            .route("/games/:game_id/cribbage/start", post(start_cribbage))
            .route("/games/:game_id/cribbage/deal", post(deal_cribbage))
            .route("/games/:game_id/cribbage/show", post(cribbage_show))
            .route(
                "/games/:game_id/cribbage/:player_id/discard",
                post(cribbage_discard),
            )
            .route("/games/:game_id/cribbage/:player_id/play", post(cribbage_play))
            .route("/games/:game_id/cribbage/:player_id/go", post(cribbage_go))
            .route("/decks", post(create_deck).get(list_decks))
            .route("/decks/:deck_id", get(get_deck).delete(delete_deck))
            .route("/decks/:deck_id/cards", post(add_custom_card).get(list_custom_cards))
            .route(
                "/decks/:deck_id/cards/:index",
                get(get_custom_card).delete(delete_custom_card),
            )
            .layer(Extension(context))
            .layer(middleware::from_fn(super::logging::log_requests))
            .layer(cors);

        Self { router }
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

type Ctx = Extension<Arc<ServerContext>>;

fn game_handle(ctx: &ServerContext, id: Uuid) -> Result<Handle<Game>, ApiError> {
    ctx.games
        .get(&id)
        .ok_or_else(|| ApiError::not_found(format!("game {id} not found")))
}

fn deck_handle(ctx: &ServerContext, id: Uuid) -> Result<Handle<CustomDeck>, ApiError> {
    ctx.decks
        .get(&id)
        .ok_or_else(|| ApiError::not_found(format!("deck {id} not found")))
}

fn check_name(name: &str, what: &str, max: usize) -> Result<(), ApiError> {
    let length = name.chars().count();
    if length == 0 || length > max {
        return Err(ApiError::bad_request(format!(
            "{what} must be 1..={max} characters"
        )));
    }
    Ok(())
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// Games

async fn create_game(
    Extension(ctx): Ctx,
    payload: Option<Json<CreateGameRequest>>,
) -> Result<Json<GameSummaryResponse>, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let game_type = match payload.game_type.as_deref() {
        None => GameType::Blackjack,
        Some(raw) => GameType::parse(raw)
            .ok_or_else(|| ApiError::bad_request(format!("invalid game type: {raw}")))?,
    };
    let deck_type = match payload.deck_type.as_deref() {
        None => DeckType::Standard,
        Some(raw) => DeckType::parse(raw)
            .ok_or_else(|| ApiError::bad_request(format!("invalid deck type: {raw}")))?,
    };
    let copies = payload.decks.unwrap_or(DEFAULT_DECK_COPIES);
    if !(1..=MAX_DECK_COPIES).contains(&copies) {
        return Err(ApiError::bad_request(format!(
            "decks must be between 1 and {MAX_DECK_COPIES}"
        )));
    }
    let max_players = payload.max_players.unwrap_or(DEFAULT_MAX_PLAYERS);
    if !(1..=MAX_PLAYERS_LIMIT).contains(&max_players) {
        return Err(ApiError::bad_request(format!(
            "max_players must be between 1 and {MAX_PLAYERS_LIMIT}"
        )));
    }

    let game = {
        let mut rng = ctx.rng.lock();
        Game::new(
            game_type,
            copies as usize,
            deck_type,
            max_players as usize,
            &mut *rng,
            Utc::now(),
        )
    };
    let response = GameSummaryResponse::from_domain(&game);
    ctx.games.insert(game.id, game);
    Ok(Json(response))
}

async fn list_games(Extension(ctx): Ctx) -> Json<Vec<GameSummaryResponse>> {
    let mut summaries: Vec<GameSummaryResponse> = ctx
        .games
        .list()
        .into_iter()
        .map(|(_, handle)| GameSummaryResponse::from_domain(&handle.lock()))
        .collect();
    summaries.sort_by_key(|summary| (summary.created, summary.id));
    Json(summaries)
}

async fn get_game(
    Extension(ctx): Ctx,
    Path(game_id): Path<Uuid>,
) -> Result<Json<GameStateResponse>, ApiError> {
    let handle = game_handle(&ctx, game_id)?;
    let game = handle.lock();
    Ok(Json(GameStateResponse::from_domain(&game, ctx.base())))
}

async fn delete_game(
    Extension(ctx): Ctx,
    Path(game_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if ctx.games.remove(&game_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("game {game_id} not found")))
    }
}

async fn shuffle_deck(
    Extension(ctx): Ctx,
    Path(game_id): Path<Uuid>,
) -> Result<Json<GameSummaryResponse>, ApiError> {
    let handle = game_handle(&ctx, game_id)?;
    let mut game = handle.lock();
    game.deck.shuffle(&mut *ctx.rng.lock());
    Ok(Json(GameSummaryResponse::from_domain(&game)))
}

async fn reset_deck(
    Extension(ctx): Ctx,
    Path(game_id): Path<Uuid>,
    payload: Option<Json<ResetDeckRequest>>,
) -> Result<Json<GameSummaryResponse>, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let copies = payload.decks.unwrap_or(DEFAULT_DECK_COPIES);
    if !(1..=MAX_DECK_COPIES).contains(&copies) {
        return Err(ApiError::bad_request(format!(
            "decks must be between 1 and {MAX_DECK_COPIES}"
        )));
    }

    let handle = game_handle(&ctx, game_id)?;
    let mut game = handle.lock();
    let deck_type = match payload.deck_type.as_deref() {
        None => game.deck.deck_type,
        Some(raw) => DeckType::parse(raw)
            .ok_or_else(|| ApiError::bad_request(format!("invalid deck type: {raw}")))?,
    };
    game.deck.reset(copies as usize, deck_type);
    Ok(Json(GameSummaryResponse::from_domain(&game)))
}

async fn add_player(
    Extension(ctx): Ctx,
    Path(game_id): Path<Uuid>,
    Json(payload): Json<AddPlayerRequest>,
) -> Result<Json<PlayerResponse>, ApiError> {
    check_name(&payload.name, "player name", MAX_PLAYER_NAME_LEN)?;
    let handle = game_handle(&ctx, game_id)?;
    let mut game = handle.lock();
    let game_type = game.game_type;
    let player = game.add_player(payload.name).map_err(ApiError::from)?;
    Ok(Json(PlayerResponse::from_domain(player, game_type, ctx.base())))
}

async fn remove_player(
    Extension(ctx): Ctx,
    Path((game_id, player_id)): Path<(Uuid, String)>,
) -> Result<StatusCode, ApiError> {
    let handle = game_handle(&ctx, game_id)?;
    let mut game = handle.lock();
    game.remove_player(&player_id).map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn deal_to_player(
    Extension(ctx): Ctx,
    Path((game_id, player_id)): Path<(Uuid, String)>,
    payload: Option<Json<DealRequest>>,
) -> Result<Json<DealResponse>, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let count = payload.count.unwrap_or(1);
    if !(1..=MAX_DEAL_COUNT).contains(&count) {
        return Err(ApiError::bad_request(format!(
            "count must be between 1 and {MAX_DEAL_COUNT}"
        )));
    }
    let face_up = payload.face_up.unwrap_or(true);

    let handle = game_handle(&ctx, game_id)?;
    let mut game = handle.lock();
    if game.player(&player_id).is_none() {
        return Err(ApiError::not_found(format!("player {player_id} not found")));
    }
    // The whole deal either happens or nothing does.
    if game.deck.remaining() < count as usize {
        return Err(GameError::exhausted("no cards remaining in deck").into());
    }
    let mut cards = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let card = game
            .deal_to_player(&player_id, face_up)
            .map_err(ApiError::from)?;
        cards.push(CardResponse::from_card(&card, ctx.base()));
    }
    Ok(Json(DealResponse {
        cards,
        remaining_cards: game.deck.remaining(),
    }))
}

async fn discard_to_pile(
    Extension(ctx): Ctx,
    Path((game_id, player_id)): Path<(Uuid, String)>,
    Json(payload): Json<DiscardToPileRequest>,
) -> Result<Json<DiscardPileResponse>, ApiError> {
    let pile_id = payload
        .pile_id
        .unwrap_or_else(|| crate::engine::MAIN_PILE_ID.to_string());
    let handle = game_handle(&ctx, game_id)?;
    let mut game = handle.lock();
    game.discard_from_player(&player_id, payload.card_index, &pile_id)
        .map_err(ApiError::from)?;
    let pile = game.discard_pile(&pile_id).expect("pile checked by discard");
    Ok(Json(DiscardPileResponse::from_domain(pile, ctx.base())))
}

async fn add_pile(
    Extension(ctx): Ctx,
    Path(game_id): Path<Uuid>,
    Json(payload): Json<AddPileRequest>,
) -> Result<Json<DiscardPileResponse>, ApiError> {
    check_name(&payload.name, "pile name", MAX_DECK_NAME_LEN)?;
    let handle = game_handle(&ctx, game_id)?;
    let mut game = handle.lock();
    let pile_id = Uuid::new_v4().to_string();
    let pile = game
        .add_discard_pile(pile_id, payload.name)
        .map_err(ApiError::from)?;
    Ok(Json(DiscardPileResponse::from_domain(pile, ctx.base())))
}

async fn get_pile(
    Extension(ctx): Ctx,
    Path((game_id, pile_id)): Path<(Uuid, String)>,
) -> Result<Json<DiscardPileResponse>, ApiError> {
    let handle = game_handle(&ctx, game_id)?;
    let game = handle.lock();
    let pile = game
        .discard_pile(&pile_id)
        .ok_or_else(|| ApiError::not_found(format!("discard pile {pile_id} not found")))?;
    Ok(Json(DiscardPileResponse::from_domain(pile, ctx.base())))
}

// ---------------------------------------------------------------------------
// Blackjack

async fn start_blackjack(
    Extension(ctx): Ctx,
    Path(game_id): Path<Uuid>,
) -> Result<Json<GameStateResponse>, ApiError> {
    let handle = game_handle(&ctx, game_id)?;
    let mut game = handle.lock();
    game.start_blackjack().map_err(ApiError::from)?;
    Ok(Json(GameStateResponse::from_domain(&game, ctx.base())))
}

async fn blackjack_hit(
    Extension(ctx): Ctx,
    Path((game_id, player_id)): Path<(Uuid, String)>,
) -> Result<Json<GameStateResponse>, ApiError> {
    let handle = game_handle(&ctx, game_id)?;
    let mut game = handle.lock();
    game.player_hit(&player_id).map_err(ApiError::from)?;
    Ok(Json(GameStateResponse::from_domain(&game, ctx.base())))
}

async fn blackjack_stand(
    Extension(ctx): Ctx,
    Path((game_id, player_id)): Path<(Uuid, String)>,
) -> Result<Json<GameStateResponse>, ApiError> {
    let handle = game_handle(&ctx, game_id)?;
    let mut game = handle.lock();
    game.player_stand(&player_id).map_err(ApiError::from)?;
    Ok(Json(GameStateResponse::from_domain(&game, ctx.base())))
}

async fn blackjack_results(
    Extension(ctx): Ctx,
    Path(game_id): Path<Uuid>,
) -> Result<Json<BlackjackResultsResponse>, ApiError> {
    let handle = game_handle(&ctx, game_id)?;
    let game = handle.lock();
    let results = game.blackjack_results().map_err(ApiError::from)?;
    Ok(Json(BlackjackResultsResponse { results }))
}

// ---------------------------------------------------------------------------
// Cribbage

async fn get_cribbage(
    Extension(ctx): Ctx,
    Path(game_id): Path<Uuid>,
) -> Result<Json<CribbageStateResponse>, ApiError> {
    let handle = game_handle(&ctx, game_id)?;
    let game = handle.lock();
    let state = game
        .cribbage
        .as_ref()
        .ok_or_else(|| ApiError::not_found("cribbage state not found"))?;
    Ok(Json(CribbageStateResponse::from_domain(state, ctx.base())))
}

async fn start_cribbage(
    Extension(ctx): Ctx,
    Path(game_id): Path<Uuid>,
) -> Result<Json<GameStateResponse>, ApiError> {
    let handle = game_handle(&ctx, game_id)?;
    let mut game = handle.lock();
    game.start_cribbage().map_err(ApiError::from)?;
    Ok(Json(GameStateResponse::from_domain(&game, ctx.base())))
}

async fn deal_cribbage(
    Extension(ctx): Ctx,
    Path(game_id): Path<Uuid>,
) -> Result<Json<GameStateResponse>, ApiError> {
    let handle = game_handle(&ctx, game_id)?;
    let mut game = handle.lock();
    {
        let mut rng = ctx.rng.lock();
        game.deal_cribbage_hand(&mut *rng).map_err(ApiError::from)?;
    }
    Ok(Json(GameStateResponse::from_domain(&game, ctx.base())))
}

async fn cribbage_discard(
    Extension(ctx): Ctx,
    Path((game_id, player_id)): Path<(Uuid, String)>,
    Json(payload): Json<DiscardRequest>,
) -> Result<Json<GameStateResponse>, ApiError> {
    let handle = game_handle(&ctx, game_id)?;
    let mut game = handle.lock();
    game.cribbage_discard(&player_id, &payload.indices)
        .map_err(ApiError::from)?;
    Ok(Json(GameStateResponse::from_domain(&game, ctx.base())))
}

async fn cribbage_play(
    Extension(ctx): Ctx,
    Path((game_id, player_id)): Path<(Uuid, String)>,
    Json(payload): Json<PlayRequest>,
) -> Result<Json<CribbagePlayResponse>, ApiError> {
    let handle = game_handle(&ctx, game_id)?;
    let mut game = handle.lock();
    let points = game
        .cribbage_play(&player_id, payload.card_index)
        .map_err(ApiError::from)?;
    Ok(Json(CribbagePlayResponse {
        points,
        state: GameStateResponse::from_domain(&game, ctx.base()),
    }))
}

async fn cribbage_go(
    Extension(ctx): Ctx,
    Path((game_id, player_id)): Path<(Uuid, String)>,
) -> Result<Json<GameStateResponse>, ApiError> {
    let handle = game_handle(&ctx, game_id)?;
    let mut game = handle.lock();
    game.cribbage_go(&player_id).map_err(ApiError::from)?;
    Ok(Json(GameStateResponse::from_domain(&game, ctx.base())))
}

async fn cribbage_show(
    Extension(ctx): Ctx,
    Path(game_id): Path<Uuid>,
) -> Result<Json<ShowResult>, ApiError> {
    let handle = game_handle(&ctx, game_id)?;
    let mut game = handle.lock();
    let result = game.cribbage_show().map_err(ApiError::from)?;
    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Custom decks

async fn create_deck(
    Extension(ctx): Ctx,
    Json(payload): Json<CreateDeckRequest>,
) -> Result<Json<CustomDeckResponse>, ApiError> {
    check_name(&payload.name, "deck name", MAX_DECK_NAME_LEN)?;
    let deck = CustomDeck::new(payload.name, Utc::now());
    let response = CustomDeckResponse::from_domain(&deck);
    ctx.decks.insert(deck.id, deck);
    Ok(Json(response))
}

async fn list_decks(Extension(ctx): Ctx) -> Json<Vec<CustomDeckResponse>> {
    let mut summaries: Vec<CustomDeckResponse> = ctx
        .decks
        .list()
        .into_iter()
        .map(|(_, handle)| CustomDeckResponse::from_domain(&handle.lock()))
        .collect();
    summaries.sort_by_key(|summary| (summary.created, summary.id));
    Json(summaries)
}

async fn get_deck(
    Extension(ctx): Ctx,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<CustomDeckResponse>, ApiError> {
    let handle = deck_handle(&ctx, deck_id)?;
    let deck = handle.lock();
    Ok(Json(CustomDeckResponse::from_domain(&deck)))
}

async fn delete_deck(
    Extension(ctx): Ctx,
    Path(deck_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if ctx.decks.remove(&deck_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("deck {deck_id} not found")))
    }
}

async fn add_custom_card(
    Extension(ctx): Ctx,
    Path(deck_id): Path<Uuid>,
    Json(payload): Json<AddCustomCardRequest>,
) -> Result<Json<CustomCard>, ApiError> {
    check_name(&payload.name, "card name", MAX_DECK_NAME_LEN)?;
    let handle = deck_handle(&ctx, deck_id)?;
    let mut deck = handle.lock();
    let card = deck
        .add_card(
            payload.name,
            payload.rank,
            payload.suit.unwrap_or_default(),
            payload.attributes.unwrap_or_default(),
        )
        .map_err(ApiError::from)?
        .clone();
    Ok(Json(card))
}

async fn list_custom_cards(
    Extension(ctx): Ctx,
    Path(deck_id): Path<Uuid>,
    Query(query): Query<ListCardsQuery>,
) -> Result<Json<CustomCardListResponse>, ApiError> {
    let handle = deck_handle(&ctx, deck_id)?;
    let deck = handle.lock();
    let cards = deck
        .list_cards(query.include_deleted.unwrap_or(false))
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(CustomCardListResponse { cards }))
}

async fn get_custom_card(
    Extension(ctx): Ctx,
    Path((deck_id, index)): Path<(Uuid, u64)>,
) -> Result<Json<CustomCard>, ApiError> {
    let handle = deck_handle(&ctx, deck_id)?;
    let deck = handle.lock();
    let card = deck
        .card(index)
        .cloned()
        .ok_or_else(|| ApiError::not_found(format!("card {index} not found")))?;
    Ok(Json(card))
}

async fn delete_custom_card(
    Extension(ctx): Ctx,
    Path((deck_id, index)): Path<(Uuid, u64)>,
) -> Result<StatusCode, ApiError> {
    let handle = deck_handle(&ctx, deck_id)?;
    let mut deck = handle.lock();
    deck.delete_card(index).map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}
