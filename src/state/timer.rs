use super::model::Game;
use super::AppState;
use crate::error::GameResult;
use crate::types::GamePhase;

impl AppState {
    /// Expire a due phase deadline for one game.
    pub async fn tick(&self, game_id: &str) -> GameResult<()> {
        let mut registry = self.lock().await;
        let game = registry.game_mut(game_id)?;
        self.apply_timer_transitions(game)
    }

    /// Expire due phase deadlines across every live game. Idempotent; a
    /// no-op for games without a deadline. A game whose transition fails is
    /// logged and skipped so the remaining games still advance this cycle.
    pub async fn tick_all(&self) {
        let mut registry = self.lock().await;
        for game in registry.games.values_mut() {
            if let Err(e) = self.apply_timer_transitions(game) {
                tracing::error!(game_id = %game.id, "failed to advance game timers: {e}");
            }
        }
    }

    /// Advance at most one phase boundary if the current deadline has
    /// passed. Never skips phases: a long-stalled game catches up over
    /// repeated ticks, since each transition arms the next phase's own
    /// deadline (or none).
    pub(super) fn apply_timer_transitions(&self, game: &mut Game) -> GameResult<()> {
        if matches!(game.phase, GamePhase::Lobby | GamePhase::Finished) {
            return Ok(());
        }

        match game.phase_ends_at {
            Some(deadline) if deadline <= self.now() => {}
            _ => return Ok(()),
        }

        match game.phase {
            GamePhase::PromptSelection => self.auto_complete_prompts(game),
            GamePhase::Submission => self.finalise_submissions(game),
            GamePhase::Voting => self.auto_complete_votes(game),
            GamePhase::Scoreboard => self.advance_to_next_round_or_finish(game),
            GamePhase::Lobby | GamePhase::Finished => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{manual_clock, state_with_clock};
    use crate::types::{BribeContent, GamePhase, GameSettings, GameState};
    use chrono::Duration;

    fn timed_settings() -> GameSettings {
        let mut settings = GameSettings::default();
        settings.prompt_selection_timer_seconds = 30;
        settings.submission_timer_seconds = 60;
        settings.voting_timer_seconds = 45;
        settings.results_timer_seconds = 15;
        settings.custom_prompts_enabled = true;
        settings.total_rounds = 1;
        settings
    }

    async fn timed_game(
        state: &super::AppState,
        settings: GameSettings,
    ) -> GameState {
        let game = state.create_game("Host", Some(settings)).await.unwrap();
        state.join_game(&game.code, "Bob", None).await.unwrap();
        state.join_game(&game.code, "Cara", None).await.unwrap();
        state
            .start_game(&game.id, &game.players[0].id)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn tick_before_deadline_is_noop() {
        let clock = manual_clock();
        let state = state_with_clock(clock.clone());
        let game = timed_game(&state, timed_settings()).await;

        clock.advance(Duration::seconds(29));
        state.tick(&game.id).await.unwrap();

        let snapshot = state.get_game(&game.id).await.unwrap();
        assert_eq!(snapshot.phase, GamePhase::PromptSelection);
    }

    #[tokio::test]
    async fn prompt_timer_expiry_synthesizes_random_prompts() {
        let clock = manual_clock();
        let state = state_with_clock(clock.clone());
        let game = timed_game(&state, timed_settings()).await;

        clock.advance(Duration::seconds(31));
        state.tick(&game.id).await.unwrap();

        let snapshot = state.get_game(&game.id).await.unwrap();
        assert_eq!(snapshot.phase, GamePhase::Submission);
        let round = snapshot.round.unwrap();
        assert_eq!(round.prompts_by_target.len(), 3);
        assert!(round
            .prompts_by_target
            .values()
            .all(|p| p.source == crate::types::PromptSource::Random));
    }

    #[tokio::test]
    async fn submission_timer_backfills_only_missing_pairs() {
        let clock = manual_clock();
        let state = state_with_clock(clock.clone());
        let mut settings = timed_settings();
        settings.custom_prompts_enabled = false;
        let game = timed_game(&state, settings).await;

        // One briber covers one of their two targets before the deadline.
        let round = state.get_game(&game.id).await.unwrap().round.unwrap();
        let (briber, targets) = round.assignments.iter().next().unwrap();
        let bribe = BribeContent::from_text("an early offer").unwrap();
        state
            .submit_bribe(&game.id, briber, &targets[0], bribe)
            .await
            .unwrap();

        clock.advance(Duration::seconds(61));
        state.tick(&game.id).await.unwrap();

        let snapshot = state.get_game(&game.id).await.unwrap();
        assert_eq!(snapshot.phase, GamePhase::Voting);
        let after = snapshot.round.unwrap();
        let mut genuine = 0;
        let mut random = 0;
        for bribes in after.bribes_by_target.values() {
            for bribe in bribes {
                if bribe.is_random {
                    random += 1;
                } else {
                    genuine += 1;
                }
            }
        }
        assert_eq!(genuine, 1);
        assert_eq!(random, 5, "five of six pairs were auto-filled");
    }

    #[tokio::test]
    async fn ticks_advance_one_phase_boundary_at_a_time() {
        let clock = manual_clock();
        let state = state_with_clock(clock.clone());
        let game = timed_game(&state, timed_settings()).await;

        // Stall far beyond the prompt deadline; a single tick still moves
        // only to Submission, which re-arms its own deadline from now.
        clock.advance(Duration::seconds(3_600));
        state.tick(&game.id).await.unwrap();
        let snapshot = state.get_game_by_code(&game.code).await.unwrap();
        assert_eq!(snapshot.phase, GamePhase::Submission);
        assert!(snapshot.phase_ends_at.is_some());

        // A redundant tick with no due deadline is a no-op.
        state.tick(&game.id).await.unwrap();
        assert_eq!(
            state.get_game(&game.id).await.unwrap().phase,
            GamePhase::Submission
        );

        clock.advance(Duration::seconds(61));
        state.tick(&game.id).await.unwrap();
        assert_eq!(
            state.get_game(&game.id).await.unwrap().phase,
            GamePhase::Voting
        );

        clock.advance(Duration::seconds(46));
        state.tick(&game.id).await.unwrap();
        clock.advance(Duration::seconds(16));
        state.tick(&game.id).await.unwrap();
        let snapshot = state.get_game(&game.id).await.unwrap();
        assert_eq!(snapshot.phase, GamePhase::Finished);
        assert_eq!(snapshot.completed_rounds.len(), 1);
    }

    #[tokio::test]
    async fn zero_timer_means_no_deadline() {
        let clock = manual_clock();
        let state = state_with_clock(clock.clone());
        let mut settings = timed_settings();
        settings.custom_prompts_enabled = false;
        settings.submission_timer_seconds = 0;
        let game = timed_game(&state, settings).await;

        let snapshot = state.get_game(&game.id).await.unwrap();
        assert_eq!(snapshot.phase, GamePhase::Submission);
        assert!(snapshot.phase_ends_at.is_none());

        clock.advance(Duration::days(1));
        state.tick(&game.id).await.unwrap();
        assert_eq!(
            state.get_game(&game.id).await.unwrap().phase,
            GamePhase::Submission
        );
    }

    #[tokio::test]
    async fn tick_all_covers_every_game() {
        let clock = manual_clock();
        let state = state_with_clock(clock.clone());
        let first = timed_game(&state, timed_settings()).await;
        let second = timed_game(&state, timed_settings()).await;

        clock.advance(Duration::seconds(31));
        state.tick_all().await;

        assert_eq!(
            state.get_game(&first.id).await.unwrap().phase,
            GamePhase::Submission
        );
        assert_eq!(
            state.get_game(&second.id).await.unwrap().phase,
            GamePhase::Submission
        );
    }

    #[tokio::test]
    async fn scoreboard_timer_finishes_single_round_game() {
        let clock = manual_clock();
        let state = state_with_clock(clock.clone());
        let mut settings = timed_settings();
        settings.custom_prompts_enabled = false;
        let game = timed_game(&state, settings).await;

        clock.advance(Duration::seconds(61));
        state.tick(&game.id).await.unwrap(); // submission closes
        clock.advance(Duration::seconds(46));
        state.tick(&game.id).await.unwrap(); // votes auto-resolve
        clock.advance(Duration::seconds(16));
        state.tick(&game.id).await.unwrap(); // scoreboard expires

        let snapshot = state.get_game(&game.id).await.unwrap();
        assert_eq!(snapshot.phase, GamePhase::Finished);
        assert!(snapshot.round.is_none());
    }
}
