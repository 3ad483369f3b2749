use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{GameError, GameResult};

/// Opaque ID types for type safety
pub type GameId = String;
pub type PlayerId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Lobby,
    PromptSelection,
    Submission,
    Voting,
    Scoreboard,
    Finished,
}

/// Per-game settings, mutable only while in the lobby.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub total_rounds: u32,
    pub prompt_selection_timer_seconds: u32,
    pub submission_timer_seconds: u32,
    pub voting_timer_seconds: u32,
    pub results_timer_seconds: u32,
    pub custom_prompts_enabled: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            total_rounds: 3,
            prompt_selection_timer_seconds: 45,
            submission_timer_seconds: 75,
            voting_timer_seconds: 60,
            results_timer_seconds: 30,
            custom_prompts_enabled: false,
        }
    }
}

impl GameSettings {
    pub fn validate(&self) -> GameResult<()> {
        if !(1..=100).contains(&self.total_rounds) {
            return Err(GameError::rule("Rounds must be between 1 and 100."));
        }

        Self::validate_timer(self.prompt_selection_timer_seconds, "prompt selection")?;
        Self::validate_timer(self.submission_timer_seconds, "submission")?;
        Self::validate_timer(self.voting_timer_seconds, "voting")?;
        Self::validate_timer(self.results_timer_seconds, "results")?;
        Ok(())
    }

    fn validate_timer(value: u32, name: &str) -> GameResult<()> {
        if value > 600 {
            return Err(GameError::rule(format!(
                "The {name} timer must be between 0 and 600 seconds."
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PromptSource {
    Library,
    Custom,
    Random,
}

/// A prompt chosen for (or synthesized for) a target player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptSelection {
    pub text: String,
    pub source: PromptSource,
}

impl PromptSelection {
    pub fn new(text: impl Into<String>, source: PromptSource) -> GameResult<Self> {
        let text = text.into();
        if source != PromptSource::Random && text.trim().is_empty() {
            return Err(GameError::rule("Prompt text cannot be empty."));
        }
        if text.len() > 200 {
            return Err(GameError::rule("Prompts may not exceed 200 characters."));
        }
        Ok(Self { text, source })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BribeKind {
    Text,
    Image,
}

/// The content of a single bribe, either freeform text or an image reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BribeContent {
    pub kind: BribeKind,
    pub content: String,
}

impl BribeContent {
    pub fn from_text(text: impl Into<String>) -> GameResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(GameError::rule("Bribe text cannot be empty."));
        }
        Ok(Self {
            kind: BribeKind::Text,
            content: text.trim().to_string(),
        })
    }

    pub fn from_image(reference: impl Into<String>) -> GameResult<Self> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err(GameError::rule("Image bribes must include a reference."));
        }
        Ok(Self {
            kind: BribeKind::Image,
            content: reference,
        })
    }
}

// ========== Snapshots ==========
//
// Everything below is an immutable projection handed to callers; the mutable
// aggregates live in state::model and never leave the registry lock.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub is_connected: bool,
    pub score: f64,
    pub is_waiting: bool,
}

/// One bribe as seen from the briber's side of the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BribeRecord {
    pub target_id: PlayerId,
    pub content: BribeContent,
    pub is_random: bool,
}

/// One bribe as presented to its target during voting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BribeForTarget {
    pub submitted_by: PlayerId,
    pub target_id: PlayerId,
    pub content: BribeContent,
    pub is_random: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundSnapshot {
    pub round_number: u32,
    pub assignments: BTreeMap<PlayerId, Vec<PlayerId>>,
    pub submissions: BTreeMap<PlayerId, Vec<BribeRecord>>,
    pub bribes_by_target: BTreeMap<PlayerId, Vec<BribeForTarget>>,
    pub pending_prompt_confirmations: BTreeSet<PlayerId>,
    pub pending_submissions: BTreeSet<PlayerId>,
    pub pending_votes: BTreeSet<PlayerId>,
    pub prompts_by_target: BTreeMap<PlayerId, PromptSelection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerScoreDelta {
    pub player_id: PlayerId,
    pub round_points: f64,
    pub total_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptResult {
    pub target_player_id: PlayerId,
    pub prompt: String,
    pub winning_player_id: PlayerId,
    pub was_random: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummary {
    pub round_number: u32,
    pub scoreboard: Vec<PlayerScoreDelta>,
    pub prompt_results: Vec<PromptResult>,
}

/// Full immutable snapshot of one game room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub id: GameId,
    pub code: String,
    pub phase: GamePhase,
    pub settings: GameSettings,
    pub current_round: u32,
    pub players: Vec<PlayerState>,
    pub round: Option<RoundSnapshot>,
    pub completed_rounds: Vec<RoundSummary>,
    pub phase_ends_at: Option<chrono::DateTime<chrono::Utc>>,
}
