use std::collections::HashMap;

use super::model::Game;
use super::AppState;
use crate::error::{GameError, GameResult};
use crate::types::{GamePhase, PlayerId, PlayerScoreDelta, PromptResult, RoundSummary};

impl AppState {
    /// Score the round and move to the scoreboard.
    ///
    /// The winning bribe per target is the recorded vote (auto-resolution has
    /// already filled in missing votes by this point). A genuine winner earns
    /// 1.0, a synthesized one 0.5. The scoreboard orders players by
    /// cumulative total descending, ties broken by join order.
    pub(super) fn complete_voting(&self, game: &mut Game) -> GameResult<()> {
        let mut round_scores: HashMap<PlayerId, f64> = game
            .players
            .iter()
            .map(|p| (p.id.clone(), 0.0))
            .collect();

        let round = super::active_round_mut(game)?;
        let votes = round.votes.clone();
        let mut winners = Vec::new();
        for (target, briber) in &votes {
            let bribe = round
                .bribes_by_target
                .get(target)
                .and_then(|bribes| bribes.iter().find(|b| b.submitted_by == *briber))
                .ok_or_else(|| GameError::internal("vote refers to a missing bribe"))?;
            let points = if bribe.is_random { 0.5 } else { 1.0 };
            *round_scores.entry(briber.clone()).or_insert(0.0) += points;
            winners.push((briber.clone(), points));
        }

        let prompt_results: Vec<PromptResult> = round
            .bribes_by_target
            .iter()
            .map(|(target, bribes)| {
                let winning_briber = votes
                    .get(target)
                    .cloned()
                    .or_else(|| bribes.first().map(|b| b.submitted_by.clone()))
                    .ok_or_else(|| GameError::internal("target has no bribes to resolve"))?;
                let bribe = bribes
                    .iter()
                    .find(|b| b.submitted_by == winning_briber)
                    .ok_or_else(|| GameError::internal("winning briber has no bribe"))?;
                Ok(PromptResult {
                    target_player_id: target.clone(),
                    prompt: round
                        .prompts_by_target
                        .get(target)
                        .map(|p| p.text.clone())
                        .unwrap_or_default(),
                    winning_player_id: winning_briber,
                    was_random: bribe.is_random,
                })
            })
            .collect::<GameResult<_>>()?;

        let round_number = round.number;

        for (briber, points) in winners {
            if let Some(player) = game.player_mut(&briber) {
                player.score += points;
            }
        }

        let mut scoreboard: Vec<(usize, PlayerScoreDelta)> = round_scores
            .into_iter()
            .filter_map(|(player_id, round_points)| {
                game.player(&player_id).map(|player| {
                    (
                        player.join_order,
                        PlayerScoreDelta {
                            player_id,
                            round_points,
                            total_score: player.score,
                        },
                    )
                })
            })
            .collect();
        // Highest total first; ties resolve by join order so the ordering is
        // stable across runs.
        scoreboard.sort_by(|(order_a, a), (order_b, b)| {
            b.total_score
                .partial_cmp(&a.total_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(order_a.cmp(order_b))
        });

        game.completed_rounds.push(RoundSummary {
            round_number,
            scoreboard: scoreboard.into_iter().map(|(_, delta)| delta).collect(),
            prompt_results,
        });
        game.phase = GamePhase::Scoreboard;
        game.phase_ends_at = self.phase_end(game.settings.results_timer_seconds);
        Ok(())
    }
}
