use super::model::{Game, SubmissionEntry, TargetBribe};
use super::AppState;
use crate::error::{GameError, GameResult};
use crate::types::{BribeContent, GamePhase, PromptSelection, PromptSource};

impl AppState {
    /// Record a player's prompt choice. Library-sourced text must exist in
    /// the catalog; confirmations from players no longer pending are ignored
    /// so client retries stay harmless.
    pub async fn confirm_prompt(
        &self,
        game_id: &str,
        player_id: &str,
        selection: PromptSelection,
    ) -> GameResult<()> {
        let mut registry = self.lock().await;
        let game = registry.game_mut(game_id)?;
        if game.phase != GamePhase::PromptSelection {
            return Err(GameError::rule("Prompt selection is not active."));
        }

        let round = super::active_round_mut(game)?;
        if !round.pending_prompt_confirmations.contains(player_id) {
            return Ok(());
        }

        if selection.source == PromptSource::Library && !self.prompts.contains(&selection.text) {
            return Err(GameError::rule(
                "Prompt must come from the library when that source is selected.",
            ));
        }

        round
            .prompts_by_target
            .insert(player_id.to_string(), selection);
        round.pending_prompt_confirmations.remove(player_id);
        if round.pending_prompt_confirmations.is_empty() {
            self.enter_submission_phase(game)?;
        }
        Ok(())
    }

    /// Record one bribe from `player_id` aimed at `target_id`. Once a player
    /// has covered both assigned targets they leave the pending set; when the
    /// set empties the phase closes.
    pub async fn submit_bribe(
        &self,
        game_id: &str,
        player_id: &str,
        target_id: &str,
        content: BribeContent,
    ) -> GameResult<()> {
        let mut registry = self.lock().await;
        let game = registry.game_mut(game_id)?;
        if game.phase != GamePhase::Submission {
            return Err(GameError::rule(
                "Submissions are not being accepted right now.",
            ));
        }

        let round = super::active_round_mut(game)?;
        let assigned = round
            .assignments
            .get(player_id)
            .is_some_and(|targets| targets.iter().any(|t| t == target_id));
        if !assigned {
            return Err(GameError::rule("Target not assigned to player."));
        }

        let submissions = round.submissions.entry(player_id.to_string()).or_default();
        submissions.insert(
            target_id.to_string(),
            SubmissionEntry {
                briber_id: player_id.to_string(),
                target_id: target_id.to_string(),
                content,
                is_random: false,
            },
        );

        let assigned_count = round
            .assignments
            .get(player_id)
            .map(Vec::len)
            .unwrap_or_default();
        if round
            .submissions
            .get(player_id)
            .map(|s| s.len())
            .unwrap_or_default()
            == assigned_count
        {
            round.pending_submissions.remove(player_id);
        }

        if round.pending_submissions.is_empty() {
            self.finalise_submissions(game)?;
        }
        Ok(())
    }

    /// Timer expiry during prompt selection: every still-pending target gets
    /// a synthesized random prompt, then the phase advances.
    pub(super) fn auto_complete_prompts(&self, game: &mut Game) -> GameResult<()> {
        let round = super::active_round_mut(game)?;
        for pending in std::mem::take(&mut round.pending_prompt_confirmations) {
            let prompt = PromptSelection::new(self.prompts.random_prompt(), PromptSource::Random)?;
            round.prompts_by_target.insert(pending, prompt);
        }
        self.enter_submission_phase(game)
    }

    /// Close the submission phase: back-fill every missing (briber, target)
    /// pair with a synthesized bribe flagged random, group all submissions by
    /// target sorted by submitter id so ordering is deterministic, and open
    /// voting for every target that has bribes to judge.
    pub(super) fn finalise_submissions(&self, game: &mut Game) -> GameResult<()> {
        let round = super::active_round_mut(game)?;

        let assignments = round.assignments.clone();
        for (briber, targets) in assignments {
            let submissions = round.submissions.entry(briber.clone()).or_default();
            for target in targets {
                if !submissions.contains_key(&target) {
                    submissions.insert(
                        target.clone(),
                        SubmissionEntry {
                            briber_id: briber.clone(),
                            target_id: target,
                            content: self.bribes.random_bribe(),
                            is_random: true,
                        },
                    );
                }
            }
        }

        round.bribes_by_target.clear();
        for submissions in round.submissions.values() {
            for entry in submissions.values() {
                round
                    .bribes_by_target
                    .entry(entry.target_id.clone())
                    .or_default()
                    .push(TargetBribe {
                        submitted_by: entry.briber_id.clone(),
                        target_id: entry.target_id.clone(),
                        content: entry.content.clone(),
                        is_random: entry.is_random,
                    });
            }
        }
        for bribes in round.bribes_by_target.values_mut() {
            bribes.sort_by(|a, b| a.submitted_by.cmp(&b.submitted_by));
        }

        round.pending_votes = round.bribes_by_target.keys().cloned().collect();
        round.pending_submissions.clear();
        round.votes.clear();
        game.phase = GamePhase::Voting;
        game.phase_ends_at = self.phase_end(game.settings.voting_timer_seconds);
        Ok(())
    }

    /// Enter the submission phase, synthesizing assignments and prompts if a
    /// restart left them empty.
    pub(super) fn enter_submission_phase(&self, game: &mut Game) -> GameResult<()> {
        if super::active_round_mut(game)?.assignments.is_empty() {
            self.prepare_assignments(game)?;
        }

        let round = super::active_round_mut(game)?;
        if round.prompts_by_target.is_empty() {
            for target in round.active_players.clone() {
                let prompt =
                    PromptSelection::new(self.prompts.random_prompt(), PromptSource::Random)?;
                round.prompts_by_target.insert(target, prompt);
            }
        }

        round.pending_prompt_confirmations.clear();
        game.phase = GamePhase::Submission;
        game.phase_ends_at = self.phase_end(game.settings.submission_timer_seconds);
        Ok(())
    }
}
