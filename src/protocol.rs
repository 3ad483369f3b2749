//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::types::{GameSettings, GameState, PlayerId, PlayerState, PromptSource};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub host_name: String,
    #[serde(default)]
    pub settings: Option<GameSettings>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub player_id: Option<PlayerId>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameResponse {
    pub player: PlayerState,
    pub state: GameState,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameRequest {
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub player_id: PlayerId,
    pub settings: GameSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSelectionRequest {
    pub player_id: PlayerId,
    pub prompt: String,
    pub source: PromptSource,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBribeRequest {
    pub player_id: PlayerId,
    pub target_id: PlayerId,
    /// "text" or "image"
    pub r#type: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub player_id: PlayerId,
    pub chosen_briber_id: PlayerId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceRequest {
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionUpdateRequest {
    pub player_id: PlayerId,
    pub is_connected: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KickPlayerRequest {
    pub host_id: PlayerId,
    pub player_id: PlayerId,
}
