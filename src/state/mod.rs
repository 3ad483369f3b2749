mod game;
pub(crate) mod model;
mod round;
mod score;
mod snapshot;
mod submission;
mod timer;
mod vote;

use chrono::{DateTime, Utc};
use rand::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::content::{BribeLibrary, PromptLibrary};
use crate::error::{GameError, GameResult};
use crate::types::GameId;

use model::{Game, Round};

/// Safe character set for join codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 4;

/// Shared application state: the orchestrator that owns every live game.
///
/// All games live behind a single mutex; every operation locks it for its
/// full duration and does only in-memory work inside, so operations on one
/// game are linearizable and the code index never drifts from game
/// existence.
pub struct AppState {
    registry: Mutex<Registry>,
    clock: Arc<dyn Clock>,
    prompts: PromptLibrary,
    bribes: BribeLibrary,
}

/// Live games keyed by id, with a secondary index by join code.
#[derive(Default)]
struct Registry {
    games: HashMap<GameId, Game>,
    codes: HashMap<String, GameId>,
}

impl Registry {
    fn game_mut(&mut self, id: &str) -> GameResult<&mut Game> {
        self.games
            .get_mut(id)
            .ok_or_else(|| GameError::rule("Game not found."))
    }

    fn id_by_code(&self, code: &str) -> GameResult<GameId> {
        self.codes
            .get(&code.trim().to_uppercase())
            .cloned()
            .ok_or_else(|| GameError::rule("Game not found."))
    }
}

impl AppState {
    pub fn new(clock: Arc<dyn Clock>, prompts: PromptLibrary, bribes: BribeLibrary) -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
            clock,
            prompts,
            bribes,
        }
    }

    /// State wired with the built-in content pools and the system clock.
    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(crate::clock::SystemClock),
            PromptLibrary::default_library(),
            BribeLibrary::default_library(),
        )
    }

    pub fn prompt_library(&self) -> &PromptLibrary {
        &self.prompts
    }

    async fn lock(&self) -> tokio::sync::MutexGuard<'_, Registry> {
        self.registry.lock().await
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Deadline for a phase timer; zero seconds means no deadline.
    fn phase_end(&self, seconds: u32) -> Option<DateTime<Utc>> {
        (seconds > 0).then(|| self.now() + chrono::Duration::seconds(i64::from(seconds)))
    }

    /// Generate a join code unique among live games.
    fn generate_code(registry: &Registry) -> String {
        let mut rng = rand::rng();
        loop {
            let code: String = (0..CODE_LENGTH)
                .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
                .collect();
            if !registry.codes.contains_key(&code) {
                return code;
            }
            // Collision, try again (rare with ~900k combinations)
        }
    }
}

/// Accessor for the active round; its absence in a round-scoped phase is a
/// logic defect, not a rule violation.
fn active_round_mut(game: &mut Game) -> GameResult<&mut Round> {
    game.active_round
        .as_mut()
        .ok_or_else(|| GameError::internal("active round missing for current phase"))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_use_safe_alphabet() {
        let registry = Registry::default();
        for _ in 0..50 {
            let code = AppState::generate_code(&registry);
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|c| CODE_CHARS.contains(&c)));
        }
    }

    #[tokio::test]
    async fn code_lookup_is_case_insensitive() {
        let state = test_support::fresh_state();
        let game = state.create_game("Alice", None).await.unwrap();

        let registry = state.lock().await;
        assert_eq!(
            registry.id_by_code(&game.code.to_lowercase()).unwrap(),
            game.id
        );
        assert!(registry.id_by_code("XXXX").is_err());
    }
}
