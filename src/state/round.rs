use super::model::{Game, Round};
use super::AppState;
use crate::error::{GameError, GameResult};
use crate::types::{GamePhase, GameState, PromptSelection, PromptSource};

impl AppState {
    /// Start the game: host only, lobby only, at least three non-waiting
    /// players. Clears history, sets the round counter to 1, and begins the
    /// first round.
    pub async fn start_game(&self, game_id: &str, requesting_player: &str) -> GameResult<GameState> {
        let mut registry = self.lock().await;
        let game = registry.game_mut(game_id)?;
        let requester = game
            .player(requesting_player)
            .ok_or_else(|| GameError::rule("Player not part of this game."))?;
        if !requester.is_host {
            return Err(GameError::rule("Only the host can start the game."));
        }

        let active = game.players.iter().filter(|p| !p.is_waiting).count();
        if active < 3 {
            return Err(GameError::rule(
                "At least three active players are required to start the game.",
            ));
        }
        if game.phase != GamePhase::Lobby {
            return Err(GameError::rule("Game has already started."));
        }
        game.settings.validate()?;

        game.current_round_number = 1;
        for player in &mut game.players {
            player.is_waiting = false;
        }
        game.completed_rounds.clear();
        self.begin_round(game)?;

        tracing::info!(game_id = %game.id, "game started");
        Ok(self.snapshot(game))
    }

    /// Host acknowledges the scoreboard, moving to the next round or the
    /// final result.
    pub async fn advance_from_scoreboard(
        &self,
        game_id: &str,
        requesting_player: &str,
    ) -> GameResult<()> {
        let mut registry = self.lock().await;
        let game = registry.game_mut(game_id)?;
        let requester = game
            .player(requesting_player)
            .ok_or_else(|| GameError::rule("Player not recognised."))?;
        if game.phase != GamePhase::Scoreboard {
            return Err(GameError::rule("Scoreboard is not active."));
        }
        if !requester.is_host {
            return Err(GameError::rule("Only the host can advance the game."));
        }

        self.advance_to_next_round_or_finish(game)
    }

    /// Snapshot the active players, compute assignments, and enter either
    /// prompt selection or submission depending on the prompt mode.
    pub(super) fn begin_round(&self, game: &mut Game) -> GameResult<()> {
        let active_players: Vec<_> = game
            .players
            .iter()
            .filter(|p| !p.is_waiting)
            .map(|p| p.id.clone())
            .collect();
        if active_players.len() < 3 {
            return Err(GameError::rule(
                "At least three active players are required to play a round.",
            ));
        }

        game.active_round = Some(Round::new(game.current_round_number, active_players));
        for player in &mut game.players {
            player.is_waiting = false;
        }

        self.prepare_assignments(game)?;

        if game.settings.custom_prompts_enabled {
            let round = super::active_round_mut(game)?;
            round.pending_prompt_confirmations = round.active_players.iter().cloned().collect();
            game.phase = GamePhase::PromptSelection;
            game.phase_ends_at = self.phase_end(game.settings.prompt_selection_timer_seconds);
        } else {
            let round = super::active_round_mut(game)?;
            for target in round.active_players.clone() {
                let prompt =
                    PromptSelection::new(self.prompts.random_prompt(), PromptSource::Library)?;
                round.prompts_by_target.insert(target, prompt);
            }
            self.enter_submission_phase(game)?;
        }

        Ok(())
    }

    /// Cyclic assignment: order the round's players by join order and point
    /// each player at the positions 1 and d steps ahead, where the distance d
    /// cycles through 2..=n-1 with the round number. The result is 2-regular
    /// with no self-loops for any n >= 3, and for n >= 4 consecutive rounds
    /// produce different assignment sets. With exactly three players (1, 2)
    /// is the only valid pair, so every round repeats it.
    pub(super) fn prepare_assignments(&self, game: &mut Game) -> GameResult<()> {
        let mut ordered: Vec<_> = game
            .active_round
            .as_ref()
            .map(|r| r.active_players.clone())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| game.player(&id).map(|p| (p.join_order, p.id.clone())))
            .collect();
        ordered.sort_by_key(|(join_order, _)| *join_order);
        let ids: Vec<_> = ordered.into_iter().map(|(_, id)| id).collect();

        if ids.len() < 3 {
            return Err(GameError::rule(
                "At least three players are required for assignments.",
            ));
        }

        let round = super::active_round_mut(game)?;
        round.assignments.clear();

        let count = ids.len();
        let distance = if count > 3 {
            2 + (round.number as usize - 1) % (count - 2)
        } else {
            2
        };

        let mut recorded = Vec::new();
        for (i, briber) in ids.iter().enumerate() {
            let first = ids[(i + 1) % count].clone();
            let second = ids[(i + distance) % count].clone();
            round
                .assignments
                .insert(briber.clone(), vec![first.clone(), second.clone()]);
            recorded.push((briber.clone(), first, second));
        }
        round.pending_submissions = round.assignments.keys().cloned().collect();

        for (briber, first, second) in recorded {
            if let Some(player) = game.player_mut(&briber) {
                player.past_targets.insert(first);
                player.past_targets.insert(second);
            }
        }

        Ok(())
    }

    /// Close out the scoreboard: finish the game after the last round,
    /// otherwise bump the round counter and begin the next round.
    pub(super) fn advance_to_next_round_or_finish(&self, game: &mut Game) -> GameResult<()> {
        super::active_round_mut(game)?;
        game.active_round = None;
        game.phase_ends_at = None;

        if game.current_round_number >= game.settings.total_rounds {
            game.phase = GamePhase::Finished;
            tracing::info!(game_id = %game.id, "game finished");
            return Ok(());
        }

        game.current_round_number += 1;
        self.begin_round(game)
    }
}
