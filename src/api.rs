//! HTTP endpoints mapping one route per orchestrator operation.
//!
//! Handlers stay thin: decode the request body, run exactly one state
//! operation, and return either a snapshot or an error body. Rule violations
//! become 400 `{"error": message}`, broken invariants 500 with the same
//! shape.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

use crate::error::{GameError, GameResult};
use crate::protocol::*;
use crate::state::AppState;
use crate::types::{BribeContent, GameState, PlayerState, PromptSelection};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/games", post(create_game))
        .route("/api/games/{game_id}", get(get_game))
        .route("/api/games/{game_id}/join", post(join_game))
        .route("/api/games/{game_id}/start", post(start_game))
        .route("/api/games/{game_id}/settings", post(update_settings))
        .route("/api/games/{game_id}/prompts", post(confirm_prompt))
        .route("/api/games/{game_id}/submissions", post(submit_bribe))
        .route("/api/games/{game_id}/votes", post(cast_vote))
        .route("/api/games/{game_id}/advance", post(advance))
        .route("/api/games/{game_id}/connection", post(update_connection))
        .route("/api/games/{game_id}/kick", post(kick_player))
        .route("/api/library/prompts", get(list_prompts))
        .with_state(state)
}

async fn create_game(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateGameRequest>,
) -> GameResult<Json<GameState>> {
    let snapshot = state
        .create_game(&request.host_name, request.settings)
        .await?;
    Ok(Json(snapshot))
}

async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> GameResult<Json<GameState>> {
    Ok(Json(state.get_game(&game_id).await?))
}

// The path segment shared with the other routes carries the join code here,
// not the game id.
async fn join_game(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Json(request): Json<JoinGameRequest>,
) -> GameResult<Json<JoinGameResponse>> {
    let player = state
        .join_game(&code, &request.name, request.player_id.as_deref())
        .await?;
    let snapshot = state.get_game_by_code(&code).await?;
    Ok(Json(JoinGameResponse {
        player,
        state: snapshot,
    }))
}

async fn start_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(request): Json<StartGameRequest>,
) -> GameResult<Json<GameState>> {
    Ok(Json(state.start_game(&game_id, &request.player_id).await?))
}

async fn update_settings(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(request): Json<UpdateSettingsRequest>,
) -> GameResult<Json<GameState>> {
    Ok(Json(
        state
            .update_settings(&game_id, &request.player_id, request.settings)
            .await?,
    ))
}

async fn confirm_prompt(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(request): Json<PromptSelectionRequest>,
) -> GameResult<Json<GameState>> {
    let selection = PromptSelection::new(request.prompt, request.source)?;
    state
        .confirm_prompt(&game_id, &request.player_id, selection)
        .await?;
    Ok(Json(state.get_game(&game_id).await?))
}

async fn submit_bribe(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(request): Json<SubmitBribeRequest>,
) -> GameResult<Json<GameState>> {
    let content = match request.r#type.to_lowercase().as_str() {
        "text" => BribeContent::from_text(request.content)?,
        "image" => BribeContent::from_image(request.content)?,
        _ => {
            return Err(GameError::rule(
                "Unsupported bribe type. Use 'text' or 'image'.",
            ))
        }
    };
    state
        .submit_bribe(&game_id, &request.player_id, &request.target_id, content)
        .await?;
    Ok(Json(state.get_game(&game_id).await?))
}

async fn cast_vote(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(request): Json<VoteRequest>,
) -> GameResult<Json<GameState>> {
    state
        .cast_vote(&game_id, &request.player_id, &request.chosen_briber_id)
        .await?;
    Ok(Json(state.get_game(&game_id).await?))
}

async fn advance(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(request): Json<AdvanceRequest>,
) -> GameResult<Json<GameState>> {
    state
        .advance_from_scoreboard(&game_id, &request.player_id)
        .await?;
    Ok(Json(state.get_game(&game_id).await?))
}

async fn update_connection(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(request): Json<ConnectionUpdateRequest>,
) -> GameResult<Json<PlayerState>> {
    Ok(Json(
        state
            .update_connection(&game_id, &request.player_id, request.is_connected)
            .await?,
    ))
}

async fn kick_player(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(request): Json<KickPlayerRequest>,
) -> GameResult<Json<GameState>> {
    Ok(Json(
        state
            .remove_player(&game_id, &request.host_id, &request.player_id)
            .await?,
    ))
}

async fn list_prompts(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.prompt_library().all().to_vec())
}
