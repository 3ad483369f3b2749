use super::model::{Game, Player};
use super::AppState;
use crate::error::{GameError, GameResult};
use crate::types::{GamePhase, GameSettings, GameState, PlayerState};

impl AppState {
    /// Create a new game room with its host as the only player.
    pub async fn create_game(
        &self,
        host_name: &str,
        settings: Option<GameSettings>,
    ) -> GameResult<GameState> {
        if host_name.trim().is_empty() {
            return Err(GameError::rule("Host name is required."));
        }

        let settings = settings.unwrap_or_default();
        settings.validate()?;

        let mut registry = self.lock().await;
        let code = Self::generate_code(&registry);
        let mut game = Game::new(code.clone(), settings);
        let host = Player::new(host_name.trim().to_string(), true, 0);
        game.players.push(host);

        let snapshot = self.snapshot(&game);
        registry.codes.insert(code, game.id.clone());
        registry.games.insert(game.id.clone(), game);

        tracing::info!(game_id = %snapshot.id, code = %snapshot.code, "game created");
        Ok(snapshot)
    }

    /// Join a game by code. An existing player id (or a case-insensitive name
    /// match) reclaims the same seat, so clients survive reloads; joining
    /// outside the lobby marks the player as waiting for the next round.
    pub async fn join_game(
        &self,
        code: &str,
        player_name: &str,
        existing_player_id: Option<&str>,
    ) -> GameResult<PlayerState> {
        if code.trim().is_empty() {
            return Err(GameError::rule("Game code is required."));
        }
        if player_name.trim().is_empty() && existing_player_id.is_none() {
            return Err(GameError::rule("Player name is required."));
        }

        let mut registry = self.lock().await;
        let game_id = registry.id_by_code(code)?;
        let game = registry.game_mut(&game_id)?;

        let trimmed = player_name.trim();
        let existing = existing_player_id
            .and_then(|id| game.players.iter().position(|p| p.id == id))
            .or_else(|| {
                (!trimmed.is_empty())
                    .then(|| {
                        game.players
                            .iter()
                            .position(|p| p.name.eq_ignore_ascii_case(trimmed))
                    })
                    .flatten()
            });

        let player = match existing {
            Some(index) => {
                let player = &mut game.players[index];
                if !trimmed.is_empty() {
                    player.name = trimmed.to_string();
                }
                player
            }
            None => {
                let mut player = Player::new(trimmed.to_string(), false, game.players.len());
                player.is_waiting = game.phase != GamePhase::Lobby;
                game.players.push(player);
                game.players
                    .last_mut()
                    .ok_or_else(|| GameError::internal("player just pushed is missing"))?
            }
        };

        player.is_connected = true;
        Ok(player.to_public_state())
    }

    /// Current snapshot by id, after lazily applying any due timer transition.
    pub async fn get_game(&self, game_id: &str) -> GameResult<GameState> {
        let mut registry = self.lock().await;
        let game = registry.game_mut(game_id)?;
        self.apply_timer_transitions(game)?;
        Ok(self.snapshot(game))
    }

    /// Current snapshot by join code, after lazily applying any due timer
    /// transition.
    pub async fn get_game_by_code(&self, code: &str) -> GameResult<GameState> {
        if code.trim().is_empty() {
            return Err(GameError::rule("Game code is required."));
        }

        let mut registry = self.lock().await;
        let game_id = registry.id_by_code(code)?;
        let game = registry.game_mut(&game_id)?;
        self.apply_timer_transitions(game)?;
        Ok(self.snapshot(game))
    }

    /// Replace the settings; host only, lobby only.
    pub async fn update_settings(
        &self,
        game_id: &str,
        host_id: &str,
        settings: GameSettings,
    ) -> GameResult<GameState> {
        let mut registry = self.lock().await;
        let game = registry.game_mut(game_id)?;
        let host = game
            .player(host_id)
            .ok_or_else(|| GameError::rule("Player not recognised."))?;
        if !host.is_host {
            return Err(GameError::rule("Only the host can update settings."));
        }
        if game.phase != GamePhase::Lobby {
            return Err(GameError::rule(
                "Settings can only be modified while in the lobby.",
            ));
        }

        settings.validate()?;
        game.settings = settings;
        Ok(self.snapshot(game))
    }

    /// Flip a player's connected flag.
    pub async fn update_connection(
        &self,
        game_id: &str,
        player_id: &str,
        is_connected: bool,
    ) -> GameResult<PlayerState> {
        let mut registry = self.lock().await;
        let game = registry.game_mut(game_id)?;
        let player = game
            .player_mut(player_id)
            .ok_or_else(|| GameError::rule("Player not recognised."))?;
        player.is_connected = is_connected;
        Ok(player.to_public_state())
    }

    /// Remove a player from the game; host only, and never the host itself.
    ///
    /// If a round is active the removed player is purged from every
    /// round-scoped structure. Below three remaining actives the round is
    /// abandoned back to the lobby; otherwise submissions, votes, and bribes
    /// are wiped, assignments are recomputed for the reduced set, and the
    /// round restarts its sub-phases under the same round number.
    pub async fn remove_player(
        &self,
        game_id: &str,
        host_id: &str,
        player_to_remove: &str,
    ) -> GameResult<GameState> {
        let mut registry = self.lock().await;
        let game = registry.game_mut(game_id)?;
        let host = game
            .player(host_id)
            .ok_or_else(|| GameError::rule("Player not recognised."))?;
        if !host.is_host {
            return Err(GameError::rule("Only the host can remove players."));
        }
        let target = game
            .player(player_to_remove)
            .ok_or_else(|| GameError::rule("Player not recognised."))?;
        if target.is_host {
            return Err(GameError::rule("The host cannot remove themselves."));
        }

        let target_id = target.id.clone();
        game.players.retain(|p| p.id != target_id);

        if game.active_round.is_none() {
            return Ok(self.snapshot(game));
        }

        let round = super::active_round_mut(game)?;
        round.active_players.retain(|id| *id != target_id);
        round.assignments.remove(&target_id);
        round.submissions.remove(&target_id);
        round.prompts_by_target.remove(&target_id);
        round.pending_prompt_confirmations.remove(&target_id);
        round.pending_submissions.remove(&target_id);
        round.pending_votes.remove(&target_id);
        round.votes.remove(&target_id);
        round.bribes_by_target.remove(&target_id);

        for targets in round.assignments.values_mut() {
            targets.retain(|id| *id != target_id);
        }
        for submissions in round.submissions.values_mut() {
            submissions.remove(&target_id);
        }
        for bribes in round.bribes_by_target.values_mut() {
            bribes.retain(|b| b.submitted_by != target_id && b.target_id != target_id);
        }

        if round.active_players.len() < 3 {
            tracing::info!(game_id = %game.id, "round abandoned, too few players remain");
            game.active_round = None;
            game.phase = GamePhase::Lobby;
            game.phase_ends_at = None;
            game.current_round_number = 0;
            return Ok(self.snapshot(game));
        }

        // Restart the round's sub-phases for the reduced player set.
        round.submissions.clear();
        round.bribes_by_target.clear();
        round.votes.clear();
        round.pending_votes.clear();
        round.prompts_by_target.clear();

        self.prepare_assignments(game)?;

        if game.settings.custom_prompts_enabled {
            let round = super::active_round_mut(game)?;
            round.pending_prompt_confirmations = round.active_players.iter().cloned().collect();
            game.phase = GamePhase::PromptSelection;
            game.phase_ends_at = self.phase_end(game.settings.prompt_selection_timer_seconds);
        } else {
            self.enter_submission_phase(game)?;
        }

        Ok(self.snapshot(game))
    }
}
