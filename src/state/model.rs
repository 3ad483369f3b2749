//! Mutable aggregates owned by the registry. Nothing in this module is ever
//! handed to callers; reads go through the snapshot projection instead.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::{
    BribeContent, GamePhase, GameSettings, PlayerId, PlayerState, PromptSelection, RoundSummary,
};

pub(crate) struct Game {
    pub id: String,
    pub code: String,
    pub settings: GameSettings,
    pub phase: GamePhase,
    pub current_round_number: u32,
    pub players: Vec<Player>,
    pub active_round: Option<Round>,
    pub completed_rounds: Vec<RoundSummary>,
    pub phase_ends_at: Option<DateTime<Utc>>,
}

impl Game {
    pub fn new(code: String, settings: GameSettings) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            code,
            settings,
            phase: GamePhase::Lobby,
            current_round_number: 0,
            players: Vec::new(),
            active_round: None,
            completed_rounds: Vec::new(),
            phase_ends_at: None,
        }
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }
}

pub(crate) struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub is_connected: bool,
    pub is_waiting: bool,
    pub score: f64,
    pub join_order: usize,
    /// Past assignment targets; recorded for future fairness rules but not
    /// consulted when computing assignments.
    pub past_targets: BTreeSet<PlayerId>,
}

impl Player {
    pub fn new(name: String, is_host: bool, join_order: usize) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            name,
            is_host,
            is_connected: false,
            is_waiting: false,
            score: 0.0,
            join_order,
            past_targets: BTreeSet::new(),
        }
    }

    pub fn to_public_state(&self) -> PlayerState {
        PlayerState {
            id: self.id.clone(),
            name: self.name.clone(),
            is_host: self.is_host,
            is_connected: self.is_connected,
            score: (self.score * 100.0).round() / 100.0,
            is_waiting: self.is_waiting,
        }
    }
}

/// One bribe as stored against its briber.
#[derive(Clone)]
pub(crate) struct SubmissionEntry {
    pub briber_id: PlayerId,
    pub target_id: PlayerId,
    pub content: BribeContent,
    pub is_random: bool,
}

/// One bribe as presented to its target once submissions close.
#[derive(Clone)]
pub(crate) struct TargetBribe {
    pub submitted_by: PlayerId,
    pub target_id: PlayerId,
    pub content: BribeContent,
    pub is_random: bool,
}

pub(crate) struct Round {
    pub number: u32,
    /// Non-waiting player ids at round start, fixed for the round's lifetime
    /// modulo removal reconciliation.
    pub active_players: Vec<PlayerId>,
    pub assignments: BTreeMap<PlayerId, Vec<PlayerId>>,
    pub submissions: BTreeMap<PlayerId, BTreeMap<PlayerId, SubmissionEntry>>,
    pub bribes_by_target: BTreeMap<PlayerId, Vec<TargetBribe>>,
    pub pending_prompt_confirmations: BTreeSet<PlayerId>,
    pub pending_submissions: BTreeSet<PlayerId>,
    pub pending_votes: BTreeSet<PlayerId>,
    pub prompts_by_target: BTreeMap<PlayerId, PromptSelection>,
    /// Voter (who is also the round's bribe target) -> chosen briber.
    pub votes: BTreeMap<PlayerId, PlayerId>,
}

impl Round {
    pub fn new(number: u32, active_players: Vec<PlayerId>) -> Self {
        Self {
            number,
            active_players,
            assignments: BTreeMap::new(),
            submissions: BTreeMap::new(),
            bribes_by_target: BTreeMap::new(),
            pending_prompt_confirmations: BTreeSet::new(),
            pending_submissions: BTreeSet::new(),
            pending_votes: BTreeSet::new(),
            prompts_by_target: BTreeMap::new(),
            votes: BTreeMap::new(),
        }
    }
}
