use super::model::Game;
use super::AppState;
use crate::error::{GameError, GameResult};
use crate::types::GamePhase;

impl AppState {
    /// Record a target's pick among the bribes addressed to them. Voting
    /// closes once every target with bribes has voted.
    pub async fn cast_vote(
        &self,
        game_id: &str,
        voter_id: &str,
        chosen_briber: &str,
    ) -> GameResult<()> {
        let mut registry = self.lock().await;
        let game = registry.game_mut(game_id)?;
        if game.phase != GamePhase::Voting {
            return Err(GameError::rule("Voting is not open."));
        }

        let round = super::active_round_mut(game)?;
        let bribes = round
            .bribes_by_target
            .get(voter_id)
            .ok_or_else(|| GameError::rule("Player has no bribes to vote on."))?;
        if !bribes.iter().any(|b| b.submitted_by == chosen_briber) {
            return Err(GameError::rule("Selected bribe does not exist."));
        }

        round
            .votes
            .insert(voter_id.to_string(), chosen_briber.to_string());
        round.pending_votes.remove(voter_id);
        if round.pending_votes.is_empty() {
            self.complete_voting(game)?;
        }
        Ok(())
    }

    /// Timer expiry during voting: every still-pending voter falls back to
    /// the first bribe in sorted order, then scoring runs.
    pub(super) fn auto_complete_votes(&self, game: &mut Game) -> GameResult<()> {
        let round = super::active_round_mut(game)?;
        for pending in std::mem::take(&mut round.pending_votes) {
            let first = round
                .bribes_by_target
                .get(&pending)
                .and_then(|bribes| bribes.first())
                .ok_or_else(|| GameError::internal("pending voter has no bribes"))?;
            round.votes.insert(pending, first.submitted_by.clone());
        }
        self.complete_voting(game)
    }
}
