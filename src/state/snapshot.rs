use super::model::{Game, Round};
use super::AppState;
use crate::types::{BribeForTarget, BribeRecord, GameState, RoundSnapshot};

impl AppState {
    /// Deep-copied immutable projection of a game; the only shape that ever
    /// leaves the registry lock.
    pub(super) fn snapshot(&self, game: &Game) -> GameState {
        GameState {
            id: game.id.clone(),
            code: game.code.clone(),
            phase: game.phase,
            settings: game.settings.clone(),
            current_round: game.current_round_number,
            players: game.players.iter().map(|p| p.to_public_state()).collect(),
            round: game.active_round.as_ref().map(round_snapshot),
            completed_rounds: game.completed_rounds.clone(),
            phase_ends_at: game.phase_ends_at,
        }
    }
}

fn round_snapshot(round: &Round) -> RoundSnapshot {
    RoundSnapshot {
        round_number: round.number,
        assignments: round.assignments.clone(),
        submissions: round
            .submissions
            .iter()
            .map(|(briber, entries)| {
                (
                    briber.clone(),
                    entries
                        .values()
                        .map(|entry| BribeRecord {
                            target_id: entry.target_id.clone(),
                            content: entry.content.clone(),
                            is_random: entry.is_random,
                        })
                        .collect(),
                )
            })
            .collect(),
        bribes_by_target: round
            .bribes_by_target
            .iter()
            .map(|(target, bribes)| {
                (
                    target.clone(),
                    bribes
                        .iter()
                        .map(|b| BribeForTarget {
                            submitted_by: b.submitted_by.clone(),
                            target_id: b.target_id.clone(),
                            content: b.content.clone(),
                            is_random: b.is_random,
                        })
                        .collect(),
                )
            })
            .collect(),
        pending_prompt_confirmations: round.pending_prompt_confirmations.clone(),
        pending_submissions: round.pending_submissions.clone(),
        pending_votes: round.pending_votes.clone(),
        prompts_by_target: round.prompts_by_target.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::fresh_state;
    use crate::types::{BribeContent, GameState};

    #[tokio::test]
    async fn mid_round_snapshot_round_trips_through_json() {
        let state = fresh_state();
        let game = state.create_game("Host", None).await.unwrap();
        state.join_game(&game.code, "Bob", None).await.unwrap();
        state.join_game(&game.code, "Cara", None).await.unwrap();
        state
            .start_game(&game.id, &game.players[0].id)
            .await
            .unwrap();

        // Submit a single bribe so the snapshot carries partial state.
        let round = state.get_game(&game.id).await.unwrap().round.unwrap();
        let (briber, targets) = round.assignments.iter().next().unwrap();
        let bribe = BribeContent::from_text("a mid-round offer").unwrap();
        state
            .submit_bribe(&game.id, briber, &targets[0], bribe)
            .await
            .unwrap();

        let snapshot = state.get_game(&game.id).await.unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: GameState = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, snapshot);
        let before = snapshot.round.unwrap();
        let after = restored.round.unwrap();
        assert_eq!(after.assignments, before.assignments);
        assert_eq!(after.pending_submissions, before.pending_submissions);
        assert_eq!(restored.phase_ends_at, snapshot.phase_ends_at);
    }

    #[tokio::test]
    async fn snapshot_is_detached_from_live_state() {
        let state = fresh_state();
        let game = state.create_game("Host", None).await.unwrap();
        state.join_game(&game.code, "Bob", None).await.unwrap();
        state.join_game(&game.code, "Cara", None).await.unwrap();
        let before = state
            .start_game(&game.id, &game.players[0].id)
            .await
            .unwrap();

        let round = before.round.clone().unwrap();
        let (briber, targets) = round.assignments.iter().next().unwrap();
        let bribe = BribeContent::from_text("later offer").unwrap();
        state
            .submit_bribe(&game.id, briber, &targets[0], bribe)
            .await
            .unwrap();

        // The earlier snapshot must not reflect the later mutation.
        assert!(before.round.unwrap().submissions.is_empty());
    }
}
